use chrono::NaiveDateTime;
use common::{DbConn, Error, InvalidStateError};
use db::{BookingStatus, booking};
use diesel::prelude::*;
use primitive_booking::PrimitiveBooking;
use primitive_waitlist::PrimitiveWaitlistEntry;
use resource::Resource;
use serde::{Deserialize, Serialize};
use waitlist::WaitlistEntry;

use crate::{Booking, NewBooking};

/// Which active bookings an override displaces
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum OverrideTarget {
	/// Exactly one booking, its window is taken over
	Booking { booking_id: i32 },
	/// Every active booking on a resource colliding with a window
	Window {
		resource_id: i32,
		start_time:  NaiveDateTime,
		end_time:    NaiveDateTime,
	},
}

/// A privileged takeover of a time window on a resource
#[derive(Clone, Copy, Debug)]
pub struct BookingOverride {
	pub target:   OverrideTarget,
	/// The staff member the replacement booking is made for
	pub actor_id: i32,
}

/// The result of applying a [`BookingOverride`]
#[derive(Clone, Debug)]
pub struct OverrideOutcome {
	pub booking:    PrimitiveBooking,
	/// Bookings of other profiles that were cancelled
	pub displaced:  Vec<PrimitiveBooking>,
	/// Colliding bookings of the actor, replaced by the new booking
	pub superseded: Vec<PrimitiveBooking>,
	/// Waiters promoted as a result of the displaced bookings, one per
	/// displaced booking at most
	pub promoted:   Vec<PrimitiveWaitlistEntry>,
}

impl BookingOverride {
	/// Cancel the targeted bookings and book their window for the actor
	///
	/// The whole takeover happens under the resource lock, so no other writer
	/// can slip a booking into the freed window before the replacement lands.
	/// The resource must still accept bookings.
	#[instrument(skip(conn))]
	pub async fn apply(
		self,
		now: NaiveDateTime,
		conn: &DbConn,
	) -> Result<OverrideOutcome, Error> {
		let outcome = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(|conn| self.apply_in(conn, now))
			})
			.await??;

		info!(
			"override by {} created booking {} displacing {:?}",
			self.actor_id,
			outcome.booking.id,
			outcome.displaced.iter().map(|b| b.id).collect::<Vec<_>>()
		);

		Ok(outcome)
	}

	fn apply_in(
		self,
		conn: &mut PgConnection,
		now: NaiveDateTime,
	) -> Result<OverrideOutcome, Error> {
		let (r_id, start, end) = match self.target {
			OverrideTarget::Booking { booking_id } => {
				let target = booking::table
					.find(booking_id)
					.select(PrimitiveBooking::as_select())
					.get_result(conn)
					.optional()?
					.ok_or_else(|| {
						Error::NotFound(format!("booking with id {booking_id}"))
					})?;

				// An expired but unreconciled booking counts as completed
				let target_status = match target.status {
					BookingStatus::Active if target.end_time < now => {
						BookingStatus::Completed
					},
					target_status => target_status,
				};

				if target_status != BookingStatus::Active {
					return Err(InvalidStateError::BookingNotActive {
						booking_id,
						status: target_status.as_str(),
					}
					.into());
				}

				(target.resource_id, target.start_time, target.end_time)
			},
			OverrideTarget::Window { resource_id, start_time, end_time } => {
				(resource_id, start_time, end_time)
			},
		};

		let resource = Resource::lock_for_booking(conn, r_id)?;

		resource.ensure_bookable()?;

		Booking::reconcile_expired_in(conn, now)?;

		let conflicts = Booking::conflicting_in(conn, r_id, start, end, now)?;

		let mut displaced = Vec::with_capacity(conflicts.len());
		let mut superseded = vec![];
		let mut promoted = vec![];

		for conflict in conflicts {
			use self::booking::dsl::*;

			let cancelled = diesel::update(booking.find(conflict.id))
				.set((
					status.eq(BookingStatus::Cancelled),
					cancelled_at.eq(Some(now)),
				))
				.returning(PrimitiveBooking::as_returning())
				.get_result(conn)?;

			// The actor keeps the slot, nothing opens up for the waitlist
			if cancelled.profile_id == self.actor_id {
				superseded.push(cancelled);

				continue;
			}

			if let Some(entry) = WaitlistEntry::promote_next_in(conn, r_id)? {
				promoted.push(entry);
			}

			displaced.push(cancelled);
		}

		let booking = NewBooking {
			request_id:  None,
			resource_id: r_id,
			profile_id:  self.actor_id,
			start_time:  start,
			end_time:    end,
		}
		.insert_in(conn)?;

		Ok(OverrideOutcome { booking, displaced, superseded, promoted })
	}
}
