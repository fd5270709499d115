use ::common::{ConflictError, DbConn, Error};
use axum::http::StatusCode;
use booking::NewBooking;
use campus_booking::schemas::booking::{
	BookingResponse,
	CancelBookingResponse,
	OverrideResponse,
};
use campus_booking::schemas::booking_request::ApprovedRequestResponse;
use campus_booking::schemas::waitlist::WaitlistEntryResponse;
use chrono::NaiveDateTime;
use db::{BookingRequestStatus, BookingStatus, ResourceStatus};
use primitive_booking::PrimitiveBooking;
use serde_json::{Value, json};

mod common;

use common::{TestEnv, hours_from_now};

#[tokio::test(flavor = "multi_thread")]
async fn create_booking() {
	let env = TestEnv::new().await;
	let resource = env.create_resource(ResourceStatus::Active).await;
	let p = env.profiles;

	let response = env
		.expect_notifications_to(&[p.student, p.admin], async || {
			env.book(p.student, resource.id, hours_from_now(2), hours_from_now(3))
				.await
		})
		.await;

	assert_eq!(response.status_code(), StatusCode::CREATED);

	let body = response.json::<ApprovedRequestResponse>();

	assert_eq!(body.request.status, BookingRequestStatus::Approved);
	assert_eq!(body.request.reviewed_by, None);
	assert_eq!(body.booking.request_id, Some(body.request.id));
	assert_eq!(body.booking.profile_id, p.student);
	assert_eq!(body.booking.status, BookingStatus::Active);
	assert!(!body.booking.currently_active);
}

#[tokio::test(flavor = "multi_thread")]
async fn create_overlapping_booking() {
	let env = TestEnv::new().await;
	let resource = env.create_resource(ResourceStatus::Active).await;
	let p = env.profiles;

	let response = env
		.book(p.student, resource.id, hours_from_now(2), hours_from_now(4))
		.await;

	assert_eq!(response.status_code(), StatusCode::CREATED);

	let response = env
		.expect_no_notification(async || {
			env.book(
				p.other_student,
				resource.id,
				hours_from_now(3),
				hours_from_now(5),
			)
			.await
		})
		.await;

	assert_eq!(response.status_code(), StatusCode::CONFLICT);
	assert_eq!(response.json::<Value>()["code"], 12);
}

#[tokio::test(flavor = "multi_thread")]
async fn create_touching_booking() {
	let env = TestEnv::new().await;
	let resource = env.create_resource(ResourceStatus::Active).await;
	let p = env.profiles;

	let first = env
		.book(p.student, resource.id, hours_from_now(2), hours_from_now(3))
		.await;
	let second = env
		.book(p.other_student, resource.id, hours_from_now(3), hours_from_now(4))
		.await;

	assert_eq!(first.status_code(), StatusCode::CREATED);
	assert_eq!(second.status_code(), StatusCode::CREATED);
}

#[tokio::test(flavor = "multi_thread")]
async fn create_booking_on_unavailable_resource() {
	let env = TestEnv::new().await;
	let maintained = env.create_resource(ResourceStatus::UnderMaintenance).await;
	let closed = env.create_resource(ResourceStatus::Closed).await;
	let p = env.profiles;

	let response = env
		.book(p.student, maintained.id, hours_from_now(2), hours_from_now(3))
		.await;

	assert_eq!(response.status_code(), StatusCode::CONFLICT);
	assert_eq!(response.json::<Value>()["code"], 8);

	let response = env
		.book(p.student, closed.id, hours_from_now(2), hours_from_now(3))
		.await;

	assert_eq!(response.status_code(), StatusCode::CONFLICT);
	assert_eq!(response.json::<Value>()["code"], 9);
}

#[tokio::test(flavor = "multi_thread")]
async fn create_booking_inverted_window() {
	let env = TestEnv::new().await;
	let resource = env.create_resource(ResourceStatus::Active).await;

	let response = env
		.book(
			env.profiles.student,
			resource.id,
			hours_from_now(3),
			hours_from_now(2),
		)
		.await;

	assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test(flavor = "multi_thread")]
async fn create_booking_unknown_resource() {
	let env = TestEnv::new().await;

	let response = env
		.book(env.profiles.student, 9999, hours_from_now(2), hours_from_now(3))
		.await;

	assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn get_my_bookings() {
	let env = TestEnv::new().await;
	let resource = env.create_resource(ResourceStatus::Active).await;
	let p = env.profiles;

	env.book(p.student, resource.id, hours_from_now(2), hours_from_now(3))
		.await;
	env.book(p.student, resource.id, hours_from_now(5), hours_from_now(6))
		.await;
	env.book(p.other_student, resource.id, hours_from_now(8), hours_from_now(9))
		.await;

	let response = env.get_as("/bookings/me", p.student).await;

	assert_eq!(response.status_code(), StatusCode::OK);

	let body = response.json::<Vec<BookingResponse>>();

	assert_eq!(body.len(), 2);
	assert!(body.iter().all(|b| b.profile_id == p.student));
}

#[tokio::test(flavor = "multi_thread")]
async fn get_all_bookings_requires_privilege() {
	let env = TestEnv::new().await;
	let resource = env.create_resource(ResourceStatus::Active).await;
	let p = env.profiles;

	env.book(p.student, resource.id, hours_from_now(2), hours_from_now(3))
		.await;

	let response = env.get_as("/bookings", p.student).await;

	assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

	let response = env
		.get_as("/bookings", p.faculty)
		.add_query_param("resourceId", resource.id)
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);
	assert_eq!(response.json::<Vec<BookingResponse>>().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn cancel_booking() {
	let env = TestEnv::new().await;
	let resource = env.create_resource(ResourceStatus::Active).await;
	let p = env.profiles;

	let booking = env
		.book(p.student, resource.id, hours_from_now(2), hours_from_now(3))
		.await
		.json::<ApprovedRequestResponse>()
		.booking;

	let path = format!("/bookings/{}/cancel", booking.id);

	let response = env.post_as(&path, p.other_student).await;

	assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

	let response = env
		.expect_notifications_to(&[p.student], async || {
			env.post_as(&path, p.student).await
		})
		.await;

	assert_eq!(response.status_code(), StatusCode::OK);

	let body = response.json::<CancelBookingResponse>();

	assert_eq!(body.booking.status, BookingStatus::Cancelled);
	assert!(body.booking.cancelled_at.is_some());
	assert!(body.promoted.is_none());

	let response = env.post_as(&path, p.student).await;

	assert_eq!(response.status_code(), StatusCode::CONFLICT);
	assert_eq!(response.json::<Value>()["code"], 11);
}

#[tokio::test(flavor = "multi_thread")]
async fn cancel_booking_frees_window() {
	let env = TestEnv::new().await;
	let resource = env.create_resource(ResourceStatus::Active).await;
	let p = env.profiles;

	let booking = env
		.book(p.student, resource.id, hours_from_now(2), hours_from_now(3))
		.await
		.json::<ApprovedRequestResponse>()
		.booking;

	env.post_as(&format!("/bookings/{}/cancel", booking.id), p.faculty)
		.await;

	let response = env
		.book(p.other_student, resource.id, hours_from_now(2), hours_from_now(3))
		.await;

	assert_eq!(response.status_code(), StatusCode::CREATED);
}

#[tokio::test(flavor = "multi_thread")]
async fn store_rejects_overlapping_active_bookings() {
	let env = TestEnv::new().await;
	let resource = env.create_resource(ResourceStatus::Active).await;
	let p = env.profiles;

	let conn = env.pool.get().await.unwrap();

	// Inserted without the resource lock, only the store stands in the way
	let start = hours_from_now(2);

	insert_active(&conn, resource.id, p.student, start, hours_from_now(3))
		.await
		.unwrap();

	let overlapping = insert_active(
		&conn,
		resource.id,
		p.other_student,
		start,
		hours_from_now(4),
	)
	.await;

	assert!(matches!(
		overlapping,
		Err(Error::Conflict(ConflictError::ConcurrentBooking))
	));

	let touching = insert_active(
		&conn,
		resource.id,
		p.other_student,
		hours_from_now(3),
		hours_from_now(4),
	)
	.await;

	assert!(touching.is_ok());
}

#[tokio::test(flavor = "multi_thread")]
async fn cancel_booking_promotes_one_waiter() {
	let env = TestEnv::new().await;
	let resource = env.create_resource(ResourceStatus::Active).await;
	let p = env.profiles;

	let first = env
		.book(p.student, resource.id, hours_from_now(2), hours_from_now(3))
		.await
		.json::<ApprovedRequestResponse>()
		.booking;
	let second = env
		.book(p.student, resource.id, hours_from_now(4), hours_from_now(5))
		.await
		.json::<ApprovedRequestResponse>()
		.booking;

	env.join_waitlist(p.other_student, resource.id).await;
	env.join_waitlist(p.faculty, resource.id).await;

	let response = env
		.expect_notifications_to(&[p.student, p.other_student], async || {
			env.post_as(&format!("/bookings/{}/cancel", first.id), p.student)
				.await
		})
		.await;

	let promoted = response.json::<CancelBookingResponse>().promoted.unwrap();

	assert_eq!(promoted.profile_id, p.other_student);

	let remaining = env
		.get_as("/waitlist/me", p.faculty)
		.await
		.json::<Vec<WaitlistEntryResponse>>();

	assert_eq!(remaining.len(), 1);

	let promoted = env
		.post_as(&format!("/bookings/{}/cancel", second.id), p.student)
		.await
		.json::<CancelBookingResponse>()
		.promoted
		.unwrap();

	assert_eq!(promoted.profile_id, p.faculty);

	let third = env
		.book(p.student, resource.id, hours_from_now(6), hours_from_now(7))
		.await
		.json::<ApprovedRequestResponse>()
		.booking;

	let response = env
		.post_as(&format!("/bookings/{}/cancel", third.id), p.student)
		.await;

	assert!(response.json::<CancelBookingResponse>().promoted.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn override_booking() {
	let env = TestEnv::new().await;
	let resource = env.create_resource(ResourceStatus::Active).await;
	let p = env.profiles;

	let booking = env
		.book(p.student, resource.id, hours_from_now(2), hours_from_now(3))
		.await
		.json::<ApprovedRequestResponse>()
		.booking;

	let path = format!("/bookings/{}/override", booking.id);

	let response = env.post_as(&path, p.other_student).await;

	assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

	let response = env
		.expect_notifications_to(&[p.student, p.faculty], async || {
			env.post_as(&path, p.faculty).await
		})
		.await;

	assert_eq!(response.status_code(), StatusCode::CREATED);

	let body = response.json::<OverrideResponse>();

	assert_eq!(body.booking.profile_id, p.faculty);
	assert_eq!(body.booking.request_id, None);
	assert_eq!(body.booking.start_time, booking.start_time);
	assert_eq!(body.displaced.len(), 1);
	assert_eq!(body.displaced[0].id, booking.id);
	assert_eq!(body.displaced[0].status, BookingStatus::Cancelled);
	assert!(body.promoted.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn override_window() {
	let env = TestEnv::new().await;
	let resource = env.create_resource(ResourceStatus::Active).await;
	let p = env.profiles;

	env.book(p.student, resource.id, hours_from_now(2), hours_from_now(3))
		.await;
	env.book(p.other_student, resource.id, hours_from_now(3), hours_from_now(4))
		.await;
	env.join_waitlist(p.student, resource.id).await;

	let response = env
		.post_as("/bookings/override", p.admin)
		.json(&json!({
			"resourceId": resource.id,
			"startTime": hours_from_now(2),
			"endTime": hours_from_now(4),
		}))
		.await;

	assert_eq!(response.status_code(), StatusCode::CREATED);

	let body = response.json::<OverrideResponse>();

	assert_eq!(body.displaced.len(), 2);
	assert_eq!(body.promoted.len(), 1);
	assert_eq!(body.promoted[0].profile_id, p.student);
}

#[tokio::test(flavor = "multi_thread")]
async fn override_window_supersedes_own_booking() {
	let env = TestEnv::new().await;
	let resource = env.create_resource(ResourceStatus::Active).await;
	let p = env.profiles;

	let own = env
		.book(p.faculty, resource.id, hours_from_now(2), hours_from_now(3))
		.await
		.json::<ApprovedRequestResponse>()
		.booking;
	let other = env
		.book(p.other_student, resource.id, hours_from_now(3), hours_from_now(4))
		.await
		.json::<ApprovedRequestResponse>()
		.booking;
	env.join_waitlist(p.student, resource.id).await;

	// The actor only hears about the new booking, not about losing the old one
	let receivers = [p.student, p.other_student, p.faculty];
	let response = env
		.expect_notifications_to(&receivers, async || {
			env.post_as("/bookings/override", p.faculty)
				.json(&json!({
					"resourceId": resource.id,
					"startTime": hours_from_now(2),
					"endTime": hours_from_now(4),
				}))
				.await
		})
		.await;

	assert_eq!(response.status_code(), StatusCode::CREATED);

	let body = response.json::<OverrideResponse>();

	assert_eq!(body.booking.profile_id, p.faculty);
	assert_eq!(body.displaced.len(), 1);
	assert_eq!(body.displaced[0].id, other.id);
	assert_eq!(body.superseded.len(), 1);
	assert_eq!(body.superseded[0].id, own.id);
	assert_eq!(body.superseded[0].status, BookingStatus::Cancelled);
	assert_eq!(body.promoted.len(), 1);
	assert_eq!(body.promoted[0].profile_id, p.student);
}

#[tokio::test(flavor = "multi_thread")]
async fn override_window_on_closed_resource() {
	let env = TestEnv::new().await;
	let resource = env.create_resource(ResourceStatus::Closed).await;

	let response = env
		.post_as("/bookings/override", env.profiles.admin)
		.json(&json!({
			"resourceId": resource.id,
			"startTime": hours_from_now(2),
			"endTime": hours_from_now(3),
		}))
		.await;

	assert_eq!(response.status_code(), StatusCode::CONFLICT);
	assert_eq!(response.json::<Value>()["code"], 9);
}

async fn insert_active(
	conn: &DbConn,
	resource_id: i32,
	profile_id: i32,
	start_time: NaiveDateTime,
	end_time: NaiveDateTime,
) -> Result<PrimitiveBooking, Error> {
	conn.interact(move |conn| {
		NewBooking {
			request_id: None,
			resource_id,
			profile_id,
			start_time,
			end_time,
		}
		.insert_in(conn)
	})
	.await
	.unwrap()
}
