use booking::{Booking, CancelledBooking, OverrideOutcome};
use chrono::NaiveDateTime;
use db::BookingStatus;
use primitive_booking::PrimitiveBooking;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use validator::Validate;

use crate::schemas::validate_window;
use crate::schemas::waitlist::WaitlistEntryResponse;

#[skip_serializing_none]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
	pub id:               i32,
	pub request_id:       Option<i32>,
	pub resource_id:      i32,
	pub profile_id:       i32,
	pub start_time:       NaiveDateTime,
	pub end_time:         NaiveDateTime,
	pub status:           BookingStatus,
	pub currently_active: bool,
	pub created_at:       NaiveDateTime,
	pub completed_at:     Option<NaiveDateTime>,
	pub cancelled_at:     Option<NaiveDateTime>,
	pub reminder_sent:    bool,
}

impl BookingResponse {
	/// Build a response for a booking as observed at `now`
	#[must_use]
	pub fn new(booking: PrimitiveBooking, now: NaiveDateTime) -> Self {
		Self {
			currently_active: booking.is_currently_active(now),
			id:               booking.id,
			request_id:       booking.request_id,
			resource_id:      booking.resource_id,
			profile_id:       booking.profile_id,
			start_time:       booking.start_time,
			end_time:         booking.end_time,
			status:           booking.status,
			created_at:       booking.created_at,
			completed_at:     booking.completed_at,
			cancelled_at:     booking.cancelled_at,
			reminder_sent:    booking.reminder_sent,
		}
	}

	#[must_use]
	pub fn from_all(bookings: Vec<Booking>, now: NaiveDateTime) -> Vec<Self> {
		bookings.into_iter().map(|b| Self::new(b.primitive, now)).collect()
	}
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelBookingResponse {
	pub booking:  BookingResponse,
	pub promoted: Option<WaitlistEntryResponse>,
}

impl CancelBookingResponse {
	#[must_use]
	pub fn new(cancelled: CancelledBooking, now: NaiveDateTime) -> Self {
		Self {
			booking:  BookingResponse::new(cancelled.booking, now),
			promoted: cancelled.promoted.map(Into::into),
		}
	}
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideResponse {
	pub booking:    BookingResponse,
	pub displaced:  Vec<BookingResponse>,
	pub superseded: Vec<BookingResponse>,
	pub promoted:   Vec<WaitlistEntryResponse>,
}

impl OverrideResponse {
	#[must_use]
	pub fn new(outcome: OverrideOutcome, now: NaiveDateTime) -> Self {
		Self {
			booking:    BookingResponse::new(outcome.booking, now),
			displaced:  outcome
				.displaced
				.into_iter()
				.map(|b| BookingResponse::new(b, now))
				.collect(),
			superseded: outcome
				.superseded
				.into_iter()
				.map(|b| BookingResponse::new(b, now))
				.collect(),
			promoted:   outcome.promoted.into_iter().map(Into::into).collect(),
		}
	}
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_create_booking"))]
pub struct CreateBookingRequest {
	pub resource_id: i32,
	pub start_time:  NaiveDateTime,
	pub end_time:    NaiveDateTime,
	#[validate(length(
		max = 512,
		message = "purpose can be at most 512 characters long",
		code = "purpose-length"
	))]
	#[serde(default)]
	pub purpose:     String,
}

fn validate_create_booking(
	request: &CreateBookingRequest,
) -> Result<(), validator::ValidationError> {
	validate_window(request.start_time, request.end_time)
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_override_window"))]
pub struct OverrideWindowRequest {
	pub resource_id: i32,
	pub start_time:  NaiveDateTime,
	pub end_time:    NaiveDateTime,
}

fn validate_override_window(
	request: &OverrideWindowRequest,
) -> Result<(), validator::ValidationError> {
	validate_window(request.start_time, request.end_time)
}

#[cfg(test)]
mod tests {
	use chrono::NaiveDate;

	use super::*;

	fn at(hour: u32) -> NaiveDateTime {
		NaiveDate::from_ymd_opt(2025, 3, 14)
			.unwrap()
			.and_hms_opt(hour, 0, 0)
			.unwrap()
	}

	#[test]
	fn inverted_booking_window_is_rejected() {
		let request = CreateBookingRequest {
			resource_id: 1,
			start_time:  at(11),
			end_time:    at(10),
			purpose:     "study group".to_string(),
		};

		assert!(request.validate().is_err());
	}

	#[test]
	fn booking_request_parses_camel_case() {
		let request: CreateBookingRequest = serde_json::from_value(
			serde_json::json!({
				"resourceId": 4,
				"startTime": "2025-03-14T10:00:00",
				"endTime": "2025-03-14T11:00:00",
			}),
		)
		.unwrap();

		assert_eq!(request.resource_id, 4);
		assert!(request.purpose.is_empty());
		assert!(request.validate().is_ok());
	}
}
