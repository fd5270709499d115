//! Controllers for [`BookingRequest`]s

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use booking_request::{BookingRequest, NewBookingRequest};
use chrono::Utc;
use common::{DbPool, Error};
use db::NotificationCategory;
use validator::Validate;

use crate::controllers::notify_admins;
use crate::notifier::Notifier;
use crate::principal::Principal;
use crate::schemas::booking::CreateBookingRequest;
use crate::schemas::booking_request::{
	ApprovedRequestResponse,
	BookingRequestQuery,
	BookingRequestResponse,
};

/// Submit a booking request for manual review
#[instrument(skip(pool, notifier))]
pub async fn submit_booking_request(
	State(pool): State<DbPool>,
	State(notifier): State<Notifier>,
	principal: Principal,
	Json(request): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, Error> {
	request.validate()?;

	let conn = pool.get().await?;

	let now = Utc::now().naive_utc();

	let new_request = NewBookingRequest {
		profile_id:  principal.profile_id,
		resource_id: request.resource_id,
		start_time:  request.start_time,
		end_time:    request.end_time,
		purpose:     request.purpose,
		priority:    principal.role.into(),
	};

	let submitted = new_request.submit(now, &conn).await?;

	notify_admins(
		&notifier,
		&conn,
		principal.profile_id,
		&format!(
			"Booking request {} for resource {} awaits review",
			submitted.primitive.id, submitted.primitive.resource_id
		),
	)
	.await;

	let response: BookingRequestResponse = submitted.into();

	Ok((StatusCode::CREATED, Json(response)))
}

/// Get the booking requests of the caller
#[instrument(skip(pool))]
pub async fn get_my_booking_requests(
	State(pool): State<DbPool>,
	principal: Principal,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let requests =
		BookingRequest::for_profile(principal.profile_id, &conn).await?;
	let response: Vec<BookingRequestResponse> =
		requests.into_iter().map(Into::into).collect();

	Ok((StatusCode::OK, Json(response)))
}

/// Get a single booking request, only its requester or an admin may see it
#[instrument(skip(pool))]
pub async fn get_booking_request(
	State(pool): State<DbPool>,
	principal: Principal,
	Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let request = BookingRequest::get_by_id(id, &conn).await?;

	if request.primitive.profile_id != principal.profile_id
		&& !principal.is_admin()
	{
		return Err(Error::Forbidden);
	}

	let response: BookingRequestResponse = request.into();

	Ok((StatusCode::OK, Json(response)))
}

/// Get every booking request, optionally only those in one status
#[instrument(skip(pool))]
pub async fn get_booking_requests(
	State(pool): State<DbPool>,
	Query(query): Query<BookingRequestQuery>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let requests = BookingRequest::get_all(query.status, &conn).await?;
	let response: Vec<BookingRequestResponse> =
		requests.into_iter().map(Into::into).collect();

	Ok((StatusCode::OK, Json(response)))
}

#[instrument(skip(pool, notifier))]
pub async fn approve_booking_request(
	State(pool): State<DbPool>,
	State(notifier): State<Notifier>,
	principal: Principal,
	Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let now = Utc::now().naive_utc();

	let approved = BookingRequest::approve(id, principal.profile_id, now, &conn)
		.await?
		.ok_or_else(|| Error::NotFound(format!("booking request with id {id}")))?;

	notifier.notify(
		approved.request.profile_id,
		NotificationCategory::Booking,
		format!(
			"Your request for resource {} from {} to {} was approved",
			approved.request.resource_id,
			approved.request.start_time,
			approved.request.end_time
		),
	);

	let response = ApprovedRequestResponse::new(approved, now);

	Ok((StatusCode::OK, Json(response)))
}

#[instrument(skip(pool, notifier))]
pub async fn reject_booking_request(
	State(pool): State<DbPool>,
	State(notifier): State<Notifier>,
	principal: Principal,
	Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let now = Utc::now().naive_utc();

	let rejected = BookingRequest::reject(id, principal.profile_id, now, &conn)
		.await?
		.ok_or_else(|| Error::NotFound(format!("booking request with id {id}")))?;

	notifier.notify(
		rejected.primitive.profile_id,
		NotificationCategory::Booking,
		format!(
			"Your request for resource {} from {} to {} was rejected",
			rejected.primitive.resource_id,
			rejected.primitive.start_time,
			rejected.primitive.end_time
		),
	);

	let response: BookingRequestResponse = rejected.into();

	Ok((StatusCode::OK, Json(response)))
}
