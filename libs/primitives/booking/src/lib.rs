#[macro_use]
extern crate tracing;

use chrono::{NaiveDateTime, TimeDelta};
use common::{DbConn, Error};
use db::{BookingStatus, booking};
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = booking)]
#[diesel(check_for_backend(Pg))]
pub struct PrimitiveBooking {
	pub id:            i32,
	pub request_id:    Option<i32>,
	pub resource_id:   i32,
	pub profile_id:    i32,
	pub start_time:    NaiveDateTime,
	pub end_time:      NaiveDateTime,
	pub status:        BookingStatus,
	pub created_at:    NaiveDateTime,
	pub completed_at:  Option<NaiveDateTime>,
	pub cancelled_at:  Option<NaiveDateTime>,
	pub reminder_sent: bool,
}

impl PrimitiveBooking {
	/// Get a [`PrimitiveBooking`] by its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(b_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let booking = conn
			.interact(move |conn| {
				use self::booking::dsl::*;

				booking.find(b_id).select(Self::as_select()).get_result(conn)
			})
			.await??;

		Ok(booking)
	}

	/// Whether this booking is taking place right now
	///
	/// Both ends of the window are inclusive, unlike the overlap test used
	/// for conflict detection.
	#[must_use]
	pub fn is_currently_active(&self, now: NaiveDateTime) -> bool {
		self.status == BookingStatus::Active
			&& self.start_time <= now
			&& now <= self.end_time
	}

	/// Whether a reminder should go out for this booking at `now`
	#[must_use]
	pub fn reminder_due(&self, now: NaiveDateTime, lead: TimeDelta) -> bool {
		if self.reminder_sent || self.status != BookingStatus::Active {
			return false;
		}

		let until_start = self.start_time - now;

		until_start > TimeDelta::zero() && until_start <= lead
	}
}

#[cfg(test)]
mod tests {
	use chrono::NaiveDate;

	use super::*;

	fn at(hour: u32, minute: u32) -> NaiveDateTime {
		NaiveDate::from_ymd_opt(2025, 3, 14)
			.unwrap()
			.and_hms_opt(hour, minute, 0)
			.unwrap()
	}

	fn booking(start: NaiveDateTime, end: NaiveDateTime) -> PrimitiveBooking {
		PrimitiveBooking {
			id:            1,
			request_id:    Some(1),
			resource_id:   1,
			profile_id:    1,
			start_time:    start,
			end_time:      end,
			status:        BookingStatus::Active,
			created_at:    at(8, 0),
			completed_at:  None,
			cancelled_at:  None,
			reminder_sent: false,
		}
	}

	#[test]
	fn currently_active_includes_both_ends() {
		let b = booking(at(10, 0), at(11, 0));

		assert!(b.is_currently_active(at(10, 0)));
		assert!(b.is_currently_active(at(10, 30)));
		assert!(b.is_currently_active(at(11, 0)));
		assert!(!b.is_currently_active(at(9, 59)));
		assert!(!b.is_currently_active(at(11, 1)));
	}

	#[test]
	fn cancelled_booking_is_never_currently_active() {
		let mut b = booking(at(10, 0), at(11, 0));
		b.status = BookingStatus::Cancelled;

		assert!(!b.is_currently_active(at(10, 30)));
	}

	#[test]
	fn reminder_due_within_lead() {
		let b = booking(at(10, 0), at(11, 0));
		let lead = TimeDelta::hours(1);

		assert!(b.reminder_due(at(9, 0), lead));
		assert!(b.reminder_due(at(9, 59), lead));
		assert!(!b.reminder_due(at(8, 59), lead));
	}

	#[test]
	fn reminder_not_due_once_started() {
		let b = booking(at(10, 0), at(11, 0));
		let lead = TimeDelta::hours(1);

		assert!(!b.reminder_due(at(10, 0), lead));
		assert!(!b.reminder_due(at(10, 30), lead));
	}

	#[test]
	fn reminder_never_sent_twice() {
		let mut b = booking(at(10, 0), at(11, 0));
		b.reminder_sent = true;

		assert!(!b.reminder_due(at(9, 30), TimeDelta::hours(1)));
	}
}
