#[macro_use]
extern crate tracing;

use chrono::NaiveDateTime;
use common::{DbConn, Error, InvalidStateError};
use db::{BookingPriority, BookingRequestStatus, booking_request};
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = booking_request)]
#[diesel(check_for_backend(Pg))]
pub struct PrimitiveBookingRequest {
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

impl PrimitiveBookingRequest {
	/// Get a [`PrimitiveBookingRequest`] by its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(r_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let request = conn
			.interact(move |conn| {
				use self::booking_request::dsl::*;

				booking_request
					.find(r_id)
					.select(Self::as_select())
					.get_result(conn)
			})
			.await??;

		Ok(request)
	}

	/// Reject a review of a request that is no longer pending
	///
	/// # Errors
	/// Fails if this request was already approved or rejected
	pub fn ensure_pending(&self) -> Result<(), Error> {
		if self.status == BookingRequestStatus::Pending {
			return Ok(());
		}

		Err(InvalidStateError::RequestAlreadyReviewed {
			request_id: self.id,
			status:     self.status.as_str(),
		}
		.into())
	}
}
