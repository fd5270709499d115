//! Library-wide error types and [`From`] impls

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::NaiveDateTime;
use thiserror::Error;

/// Name of the exclusion constraint keeping active bookings from overlapping
pub const BOOKING_OVERLAP_CONSTRAINT: &str = "booking_no_overlap";

/// Top level application error, can be converted into a [`Response`]
#[derive(Debug, Error)]
pub enum Error {
	/// Request/operation forbidden
	#[error("forbidden")]
	Forbidden,
	/// An error that should never happen
	#[error("{0}")]
	Infallible(String),
	/// Opaque internal server error
	#[error("internal server error")]
	InternalServerError,
	/// Resource not found
	#[error("not found - {0}")]
	NotFound(String),
	/// Missing or malformed principal
	#[error(transparent)]
	PrincipalError(#[from] PrincipalError),
	/// The entity is not in a state that allows this operation
	#[error(transparent)]
	InvalidState(#[from] InvalidStateError),
	/// The requested time window collides with an existing booking
	#[error(transparent)]
	Conflict(#[from] ConflictError),
	/// Resource could not be validated
	#[error("{0}")]
	ValidationError(String),
}

impl Error {
	/// Return a unique identifying code for this error
	///
	/// When modifying this function the error code should only ever increase,
	/// an error code should never be reused once its assigned to avoid
	/// unexpectedly breaking the frontend
	#[must_use]
	pub fn code(&self) -> i32 {
		match self {
			Self::Forbidden => 1,
			Self::Infallible(_) => 2,
			Self::InternalServerError => 3,
			Self::NotFound(_) => 4,
			Self::PrincipalError(e) => {
				match e {
					PrincipalError::MissingPrincipal => 5,
					PrincipalError::MalformedPrincipal(_) => 6,
					PrincipalError::UnknownProfile(_) => 7,
				}
			},
			Self::InvalidState(e) => {
				match e {
					InvalidStateError::ResourceUnderMaintenance(_) => 8,
					InvalidStateError::ResourceClosed(_) => 9,
					InvalidStateError::RequestAlreadyReviewed { .. } => 10,
					InvalidStateError::BookingNotActive { .. } => 11,
				}
			},
			Self::Conflict(e) => {
				match e {
					ConflictError::Overlapping { .. } => 12,
					ConflictError::ConcurrentBooking => 13,
				}
			},
			Self::ValidationError(_) => 14,
		}
	}

	/// Return additional information about the error
	#[must_use]
	pub fn info(&self) -> Option<String> {
		match self {
			Self::NotFound(m) | Self::ValidationError(m) => Some(m.to_owned()),
			Self::InvalidState(e) => {
				match e {
					InvalidStateError::ResourceUnderMaintenance(id)
					| InvalidStateError::ResourceClosed(id) => {
						Some(serde_json::json!({"resourceId": id}).to_string())
					},
					InvalidStateError::RequestAlreadyReviewed {
						request_id,
						status,
					} => {
						Some(
							serde_json::json!({
								"requestId": request_id,
								"status": status,
							})
							.to_string(),
						)
					},
					InvalidStateError::BookingNotActive { booking_id, status } => {
						Some(
							serde_json::json!({
								"bookingId": booking_id,
								"status": status,
							})
							.to_string(),
						)
					},
				}
			},
			Self::Conflict(e) => {
				match e {
					ConflictError::Overlapping { resource_id, start, end } => {
						Some(
							serde_json::json!({
								"resourceId": resource_id,
								"start": start,
								"end": end,
								"waitlistAvailable": true,
							})
							.to_string(),
						)
					},
					ConflictError::ConcurrentBooking => {
						Some(
							serde_json::json!({"waitlistAvailable": true})
								.to_string(),
						)
					},
				}
			},
			_ => None,
		}
	}

	/// The HTTP status this error is reported with
	#[must_use]
	pub fn status_code(&self) -> StatusCode {
		match self {
			Self::InternalServerError | Self::Infallible(_) => {
				StatusCode::INTERNAL_SERVER_ERROR
			},
			Self::PrincipalError(_) => StatusCode::UNAUTHORIZED,
			Self::Forbidden => StatusCode::FORBIDDEN,
			Self::NotFound(_) => StatusCode::NOT_FOUND,
			Self::InvalidState(_) | Self::Conflict(_) => StatusCode::CONFLICT,
			Self::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
		}
	}
}

/// Convert an error into a [`Response`]
impl IntoResponse for Error {
	fn into_response(self) -> Response {
		debug!("{self:?}");

		let status = self.status_code();

		let data = serde_json::json!({
			"message": self.to_string(),
			"code": self.code(),
			"info": self.info(),
		});

		(status, axum::Json(data)).into_response()
	}
}

/// Any error related to the principal supplied by the gateway
#[derive(Debug, Error)]
pub enum PrincipalError {
	#[error("missing principal")]
	MissingPrincipal,
	#[error("malformed principal -- {0}")]
	MalformedPrincipal(String),
	#[error("no profile with id {0} was found")]
	UnknownProfile(i32),
}

/// Any rejection caused by the lifecycle state of an entity
#[derive(Debug, Error)]
pub enum InvalidStateError {
	#[error("resource is under maintenance and cannot be booked")]
	ResourceUnderMaintenance(i32),
	#[error("resource is closed and cannot be booked")]
	ResourceClosed(i32),
	#[error("booking request has already been {status}")]
	RequestAlreadyReviewed { request_id: i32, status: &'static str },
	#[error("booking is already {status}")]
	BookingNotActive { booking_id: i32, status: &'static str },
}

/// A requested time window collides with an active booking
#[derive(Debug, Error)]
pub enum ConflictError {
	#[error("resource is not available at this time")]
	Overlapping {
		resource_id: i32,
		start:       NaiveDateTime,
		end:         NaiveDateTime,
	},
	#[error("resource was booked concurrently for this time")]
	ConcurrentBooking,
}

/// A list of possible internal errors
///
/// API end users should never see these details
#[derive(Debug, Error)]
pub enum InternalServerError {
	/// Unknown database constraint violation
	#[error("constraint error -- {0:?}")]
	ConstraintError(String),
	/// Error executing some database operation
	#[error("database error -- {0:?}")]
	DatabaseError(diesel::result::Error),
	/// Error interacting with a database connection
	#[error("database interaction error -- {0:?}")]
	DatabaseInteractionError(deadpool_diesel::InteractError),
	/// Error acquiring database pool connection
	#[error("database pool error -- {0:?}")]
	PoolError(deadpool_diesel::PoolError),
}

// Map internal server errors to application errors
impl From<InternalServerError> for Error {
	fn from(value: InternalServerError) -> Self {
		error!("internal server error -- {value}");

		Self::InternalServerError
	}
}

/// Map validation errors to application errors
impl From<validator::ValidationErrors> for Error {
	fn from(err: validator::ValidationErrors) -> Self {
		let errs = err.field_errors();
		let repr = errs
			.values()
			.map(|v| {
				v.iter()
					.map(ToString::to_string)
					.collect::<Vec<String>>()
					.join("\n")
			})
			.collect::<Vec<String>>()
			.join("\n");

		Self::ValidationError(repr)
	}
}

/// Map database interaction errors to application errors
impl From<deadpool_diesel::InteractError> for Error {
	fn from(value: deadpool_diesel::InteractError) -> Self {
		InternalServerError::DatabaseInteractionError(value).into()
	}
}

/// Map database result errors to application errors.
impl From<diesel::result::Error> for Error {
	fn from(err: diesel::result::Error) -> Self {
		match &err {
			// No rows returned by query that expected at least one
			diesel::result::Error::NotFound => {
				Self::NotFound("no context provided".to_string())
			},
			// Two active bookings overlapping, raised by the exclusion
			// constraint when a concurrent writer got there first
			diesel::result::Error::DatabaseError(_, info)
				if info.constraint_name() == Some(BOOKING_OVERLAP_CONSTRAINT) =>
			{
				ConflictError::ConcurrentBooking.into()
			},
			// Foreign key constraint violation
			diesel::result::Error::DatabaseError(
				diesel::result::DatabaseErrorKind::ForeignKeyViolation,
				info,
			) => Self::ValidationError(info.message().to_string()),
			// Check constraint violation
			diesel::result::Error::DatabaseError(
				diesel::result::DatabaseErrorKind::CheckViolation,
				info,
			) => {
				let constraint =
					info.constraint_name().unwrap_or("unknown").to_string();

				InternalServerError::ConstraintError(constraint).into()
			},
			_ => InternalServerError::DatabaseError(err).into(),
		}
	}
}

impl From<deadpool_diesel::PoolError> for Error {
	fn from(value: deadpool_diesel::PoolError) -> Self {
		InternalServerError::PoolError(value).into()
	}
}
