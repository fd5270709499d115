use booking_request::{ApprovedRequest, BookingRequest};
use chrono::NaiveDateTime;
use db::{BookingPriority, BookingRequestStatus};
use primitive_booking_request::PrimitiveBookingRequest;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::schemas::booking::BookingResponse;

#[skip_serializing_none]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequestResponse {
	pub id:          i32,
	pub profile_id:  i32,
	pub resource_id: i32,
	pub start_time:  NaiveDateTime,
	pub end_time:    NaiveDateTime,
	pub purpose:     String,
	pub priority:    BookingPriority,
	pub status:      BookingRequestStatus,
	pub reviewed_by: Option<i32>,
	pub reviewed_at: Option<NaiveDateTime>,
	pub created_at:  NaiveDateTime,
}

impl From<PrimitiveBookingRequest> for BookingRequestResponse {
	fn from(request: PrimitiveBookingRequest) -> Self {
		Self {
			id:          request.id,
			profile_id:  request.profile_id,
			resource_id: request.resource_id,
			start_time:  request.start_time,
			end_time:    request.end_time,
			purpose:     request.purpose,
			priority:    request.priority,
			status:      request.status,
			reviewed_by: request.reviewed_by,
			reviewed_at: request.reviewed_at,
			created_at:  request.created_at,
		}
	}
}

impl From<BookingRequest> for BookingRequestResponse {
	fn from(value: BookingRequest) -> Self { value.primitive.into() }
}

/// A request together with the booking its approval produced
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedRequestResponse {
	pub request: BookingRequestResponse,
	pub booking: BookingResponse,
}

impl ApprovedRequestResponse {
	#[must_use]
	pub fn new(approved: ApprovedRequest, now: NaiveDateTime) -> Self {
		Self {
			request: approved.request.into(),
			booking: BookingResponse::new(approved.booking, now),
		}
	}
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequestQuery {
	pub status: Option<BookingRequestStatus>,
}
