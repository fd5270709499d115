//! Controllers for [`Booking`]s

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use booking::{
	Booking,
	BookingFilter,
	BookingOverride,
	OverrideOutcome,
	OverrideTarget,
};
use booking_request::NewBookingRequest;
use chrono::Utc;
use common::{DbPool, Error};
use db::NotificationCategory;
use validator::Validate;

use crate::controllers::notify_admins;
use crate::notifier::Notifier;
use crate::principal::Principal;
use crate::schemas::booking::{
	BookingResponse,
	CancelBookingResponse,
	CreateBookingRequest,
	OverrideResponse,
	OverrideWindowRequest,
};
use crate::schemas::booking_request::ApprovedRequestResponse;

/// Book a resource straight away
///
/// Creates a request and approves it in the same unit of work, the caller
/// either gets an active booking or a typed rejection.
#[instrument(skip(pool, notifier))]
pub async fn create_booking(
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

	let approved = new_request.book_instantly(now, &conn).await?;
	let booking = &approved.booking;

	notifier.notify(
		principal.profile_id,
		NotificationCategory::Booking,
		format!(
			"Your booking of resource {} from {} to {} is confirmed",
			booking.resource_id, booking.start_time, booking.end_time
		),
	);

	notify_admins(
		&notifier,
		&conn,
		principal.profile_id,
		&format!(
			"Profile {} booked resource {} from {} to {}",
			principal.profile_id,
			booking.resource_id,
			booking.start_time,
			booking.end_time
		),
	)
	.await;

	let response = ApprovedRequestResponse::new(approved, now);

	Ok((StatusCode::CREATED, Json(response)))
}

/// Get the bookings of the caller
#[instrument(skip(pool))]
pub async fn get_my_bookings(
	State(pool): State<DbPool>,
	principal: Principal,
	Query(filter): Query<BookingFilter>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let now = Utc::now().naive_utc();

	let bookings =
		Booking::for_profile(principal.profile_id, filter, now, &conn).await?;

	Ok((StatusCode::OK, Json(BookingResponse::from_all(bookings, now))))
}

/// Get every booking
#[instrument(skip(pool))]
pub async fn get_all_bookings(
	State(pool): State<DbPool>,
	Query(filter): Query<BookingFilter>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let now = Utc::now().naive_utc();

	let bookings = Booking::get_all(filter, now, &conn).await?;

	Ok((StatusCode::OK, Json(BookingResponse::from_all(bookings, now))))
}

/// Cancel a booking and hand its slot to the next waiter
#[instrument(skip(pool, notifier))]
pub async fn cancel_booking(
	State(pool): State<DbPool>,
	State(notifier): State<Notifier>,
	principal: Principal,
	Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let booking = Booking::get_by_id(id, &conn).await?.primitive;

	if !principal.owns_or_is_privileged(booking.profile_id) {
		return Err(Error::Forbidden);
	}

	let now = Utc::now().naive_utc();

	let cancelled = Booking::cancel(id, now, &conn).await?;

	notifier.notify(
		cancelled.booking.profile_id,
		NotificationCategory::Booking,
		format!(
			"Your booking of resource {} from {} to {} was cancelled",
			cancelled.booking.resource_id,
			cancelled.booking.start_time,
			cancelled.booking.end_time
		),
	);

	if let Some(entry) = &cancelled.promoted {
		notify_promoted(&notifier, entry.profile_id, entry.resource_id);
	}

	let response = CancelBookingResponse::new(cancelled, now);

	Ok((StatusCode::OK, Json(response)))
}

/// Take over the window of an existing booking
#[instrument(skip(pool, notifier))]
pub async fn override_booking(
	State(pool): State<DbPool>,
	State(notifier): State<Notifier>,
	principal: Principal,
	Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let now = Utc::now().naive_utc();

	let outcome = BookingOverride {
		target:   OverrideTarget::Booking { booking_id: id },
		actor_id: principal.profile_id,
	}
	.apply(now, &conn)
	.await?;

	notify_override(&notifier, &outcome);

	Ok((StatusCode::CREATED, Json(OverrideResponse::new(outcome, now))))
}

/// Take over an arbitrary window on a resource
#[instrument(skip(pool, notifier))]
pub async fn override_window(
	State(pool): State<DbPool>,
	State(notifier): State<Notifier>,
	principal: Principal,
	Json(request): Json<OverrideWindowRequest>,
) -> Result<impl IntoResponse, Error> {
	request.validate()?;

	let conn = pool.get().await?;

	let now = Utc::now().naive_utc();

	let outcome = BookingOverride {
		target:   OverrideTarget::Window {
			resource_id: request.resource_id,
			start_time:  request.start_time,
			end_time:    request.end_time,
		},
		actor_id: principal.profile_id,
	}
	.apply(now, &conn)
	.await?;

	notify_override(&notifier, &outcome);

	Ok((StatusCode::CREATED, Json(OverrideResponse::new(outcome, now))))
}

fn notify_promoted(notifier: &Notifier, profile_id: i32, resource_id: i32) {
	notifier.notify(
		profile_id,
		NotificationCategory::Waitlist,
		format!(
			"A slot opened up on resource {resource_id}, you have been taken \
			 off the waitlist and can book it now"
		),
	);
}

fn notify_override(notifier: &Notifier, outcome: &OverrideOutcome) {
	for displaced in &outcome.displaced {
		notifier.notify(
			displaced.profile_id,
			NotificationCategory::Booking,
			format!(
				"Your booking of resource {} from {} to {} was cancelled by a \
				 staff override",
				displaced.resource_id, displaced.start_time, displaced.end_time
			),
		);
	}

	for entry in &outcome.promoted {
		notify_promoted(notifier, entry.profile_id, entry.resource_id);
	}

	notifier.notify(
		outcome.booking.profile_id,
		NotificationCategory::Booking,
		format!(
			"Your override booking of resource {} from {} to {} is confirmed",
			outcome.booking.resource_id,
			outcome.booking.start_time,
			outcome.booking.end_time
		),
	);
}
