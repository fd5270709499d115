#[macro_use]
extern crate tracing;

use chrono::{NaiveDateTime, TimeDelta};
use common::{ConflictError, DbConn, Error, InvalidStateError};
use db::{BookingStatus, booking};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use models_common::{BoxedCondition, ToFilter};
use primitive_booking::PrimitiveBooking;
use primitive_waitlist::PrimitiveWaitlistEntry;
use resource::Resource;
use serde::{Deserialize, Serialize};
use waitlist::WaitlistEntry;

mod r#override;

pub use r#override::*;

/// Whether a requested `[start, end)` window collides with an existing one
///
/// The requested start lies inside the existing window, or the requested end
/// does, or the requested window swallows the existing one. Windows that only
/// touch at an endpoint do not collide.
#[must_use]
pub fn overlaps(
	requested_start: NaiveDateTime,
	requested_end: NaiveDateTime,
	existing_start: NaiveDateTime,
	existing_end: NaiveDateTime,
) -> bool {
	let start_inside =
		requested_start >= existing_start && requested_start < existing_end;
	let end_inside =
		requested_end > existing_start && requested_end <= existing_end;
	let contains =
		requested_start <= existing_start && requested_end >= existing_end;

	start_inside || end_inside || contains
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingFilter {
	pub status:      Option<BookingStatus>,
	pub resource_id: Option<i32>,
}

impl ToFilter<booking::table> for BookingFilter {
	type SqlType = Bool;

	fn to_filter(&self) -> BoxedCondition<booking::table, Self::SqlType> {
		let mut filter: BoxedCondition<booking::table, Self::SqlType> =
			Box::new(true.into_sql::<Bool>());

		if let Some(status) = self.status {
			filter = Box::new(filter.and(booking::status.eq(status)));
		}

		if let Some(r_id) = self.resource_id {
			filter = Box::new(filter.and(booking::resource_id.eq(r_id)));
		}

		filter
	}
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Booking {
	pub primitive: PrimitiveBooking,
}

/// The result of cancelling a [`Booking`]
#[derive(Clone, Debug)]
pub struct CancelledBooking {
	pub booking:  PrimitiveBooking,
	/// The waiter removed from the resource's queue, if anyone was waiting
	pub promoted: Option<PrimitiveWaitlistEntry>,
}

impl Booking {
	/// Get a [`Booking`] given its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(b_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let primitive =
			PrimitiveBooking::get_by_id(b_id, conn).await.map_err(|e| {
				match e {
					Error::NotFound(_) => {
						Error::NotFound(format!("booking with id {b_id}"))
					},
					e => e,
				}
			})?;

		Ok(Self { primitive })
	}

	/// Mark every active booking that ended before `now` as completed
	///
	/// # Errors
	/// Fails if the update fails
	pub fn reconcile_expired_in(
		conn: &mut PgConnection,
		now: NaiveDateTime,
	) -> QueryResult<usize> {
		use self::booking::dsl::*;

		diesel::update(
			booking
				.filter(status.eq(BookingStatus::Active))
				.filter(end_time.lt(now)),
		)
		.set((status.eq(BookingStatus::Completed), completed_at.eq(Some(now))))
		.execute(conn)
	}

	/// Mark every active booking that ended before `now` as completed and
	/// return how many were transitioned
	#[instrument(skip(conn))]
	pub async fn reconcile_expired(
		now: NaiveDateTime,
		conn: &DbConn,
	) -> Result<usize, Error> {
		let count = conn
			.interact(move |conn| Self::reconcile_expired_in(conn, now))
			.await??;

		if count > 0 {
			info!("completed {count} expired bookings");
		}

		Ok(count)
	}

	/// Get the active bookings on a resource that collide with a window
	///
	/// Bookings that already ended cannot collide and are never loaded.
	///
	/// # Errors
	/// Fails if the query fails
	pub fn conflicting_in(
		conn: &mut PgConnection,
		r_id: i32,
		start: NaiveDateTime,
		end: NaiveDateTime,
		now: NaiveDateTime,
	) -> QueryResult<Vec<PrimitiveBooking>> {
		use self::booking::dsl::*;

		let candidates = booking
			.filter(resource_id.eq(r_id))
			.filter(status.eq(BookingStatus::Active))
			.filter(end_time.gt(now))
			.select(PrimitiveBooking::as_select())
			.get_results(conn)?;

		let conflicts = candidates
			.into_iter()
			.filter(|b| overlaps(start, end, b.start_time, b.end_time))
			.collect();

		Ok(conflicts)
	}

	/// Fail with a [`ConflictError`] if the window collides with an active
	/// booking on the resource
	///
	/// # Errors
	/// Fails if the window is taken or the query fails
	pub fn ensure_available_in(
		conn: &mut PgConnection,
		r_id: i32,
		start: NaiveDateTime,
		end: NaiveDateTime,
		now: NaiveDateTime,
	) -> Result<(), Error> {
		let conflicts = Self::conflicting_in(conn, r_id, start, end, now)?;

		if conflicts.is_empty() {
			return Ok(());
		}

		debug!(
			"window {start} - {end} on resource {r_id} collides with bookings \
			 {:?}",
			conflicts.iter().map(|b| b.id).collect::<Vec<_>>()
		);

		Err(ConflictError::Overlapping { resource_id: r_id, start, end }.into())
	}

	/// Check whether a window on a resource is free of active bookings
	///
	/// This only answers the time question, resource status is checked
	/// separately by the caller.
	#[instrument(skip(conn))]
	pub async fn is_available(
		r_id: i32,
		start: NaiveDateTime,
		end: NaiveDateTime,
		now: NaiveDateTime,
		conn: &DbConn,
	) -> Result<bool, Error> {
		let conflicts = conn
			.interact(move |conn| {
				Self::conflicting_in(conn, r_id, start, end, now)
			})
			.await??;

		Ok(conflicts.is_empty())
	}

	/// Get all the bookings of a profile, newest first
	#[instrument(skip(conn))]
	pub async fn for_profile(
		p_id: i32,
		filter: BookingFilter,
		now: NaiveDateTime,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let bookings = conn
			.interact(move |conn| {
				use self::booking::dsl::*;

				Self::reconcile_expired_in(conn, now)?;

				booking
					.filter(profile_id.eq(p_id))
					.filter(filter.to_filter())
					.order((created_at.desc(), id.desc()))
					.select(PrimitiveBooking::as_select())
					.get_results(conn)
			})
			.await??
			.into_iter()
			.map(|primitive| Self { primitive })
			.collect();

		Ok(bookings)
	}

	/// Get all bookings, newest first
	#[instrument(skip(conn))]
	pub async fn get_all(
		filter: BookingFilter,
		now: NaiveDateTime,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let bookings = conn
			.interact(move |conn| {
				use self::booking::dsl::*;

				Self::reconcile_expired_in(conn, now)?;

				booking
					.filter(filter.to_filter())
					.order((created_at.desc(), id.desc()))
					.select(PrimitiveBooking::as_select())
					.get_results(conn)
			})
			.await??
			.into_iter()
			.map(|primitive| Self { primitive })
			.collect();

		Ok(bookings)
	}

	/// Get the active bookings on a resource that have not ended yet
	#[instrument(skip(conn))]
	pub async fn upcoming_for_resource(
		r_id: i32,
		now: NaiveDateTime,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let bookings = conn
			.interact(move |conn| {
				use self::booking::dsl::*;

				booking
					.filter(resource_id.eq(r_id))
					.filter(status.eq(BookingStatus::Active))
					.filter(end_time.gt(now))
					.order((start_time.asc(), id.asc()))
					.select(PrimitiveBooking::as_select())
					.get_results(conn)
			})
			.await??
			.into_iter()
			.map(|primitive| Self { primitive })
			.collect();

		Ok(bookings)
	}

	/// Cancel an active booking and free its slot on the resource
	///
	/// # Errors
	/// Fails if the booking is already completed or cancelled
	pub fn cancel_in(
		conn: &mut PgConnection,
		b_id: i32,
		now: NaiveDateTime,
	) -> Result<CancelledBooking, Error> {
		use self::booking::dsl::*;

		let current = booking
			.find(b_id)
			.for_update()
			.select(PrimitiveBooking::as_select())
			.get_result(conn)
			.optional()?
			.ok_or_else(|| Error::NotFound(format!("booking with id {b_id}")))?;

		// A booking that ran out but was never reconciled is completed, not
		// cancellable
		let current_status =
			if current.status == BookingStatus::Active && current.end_time < now {
				Self::reconcile_expired_in(conn, now)?;

				BookingStatus::Completed
			} else {
				current.status
			};

		if current_status != BookingStatus::Active {
			return Err(InvalidStateError::BookingNotActive {
				booking_id: b_id,
				status:     current_status.as_str(),
			}
			.into());
		}

		let cancelled = diesel::update(booking.find(b_id))
			.set((status.eq(BookingStatus::Cancelled), cancelled_at.eq(Some(now))))
			.returning(PrimitiveBooking::as_returning())
			.get_result(conn)?;

		let promoted =
			WaitlistEntry::promote_next_in(conn, cancelled.resource_id)?;

		Ok(CancelledBooking { booking: cancelled, promoted })
	}

	/// Cancel an active booking, promoting the oldest waiter on its resource
	#[instrument(skip(conn))]
	pub async fn cancel(
		b_id: i32,
		now: NaiveDateTime,
		conn: &DbConn,
	) -> Result<CancelledBooking, Error> {
		let cancelled = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(|conn| {
					Self::cancel_in(conn, b_id, now)
				})
			})
			.await??;

		info!(
			"cancelled booking {} (promoted waitlist entry: {:?})",
			cancelled.booking.id,
			cancelled.promoted.as_ref().map(|w| w.id)
		);

		Ok(cancelled)
	}

	/// Get the active bookings that are owed a reminder at `now`
	#[instrument(skip(conn))]
	pub async fn reminder_candidates(
		now: NaiveDateTime,
		lead: TimeDelta,
		conn: &DbConn,
	) -> Result<Vec<PrimitiveBooking>, Error> {
		let horizon = now + lead;

		let candidates = conn
			.interact(move |conn| {
				use self::booking::dsl::*;

				booking
					.filter(status.eq(BookingStatus::Active))
					.filter(reminder_sent.eq(false))
					.filter(start_time.gt(now))
					.filter(start_time.le(horizon))
					.order((start_time.asc(), id.asc()))
					.select(PrimitiveBooking::as_select())
					.get_results(conn)
			})
			.await??
			.into_iter()
			.filter(|b| b.reminder_due(now, lead))
			.collect();

		Ok(candidates)
	}

	/// Flip the reminder flag of an active booking
	///
	/// Returns `false` if the flag was already set or the booking stopped
	/// being active, in which case no reminder should be sent.
	#[instrument(skip(conn))]
	pub async fn claim_reminder(b_id: i32, conn: &DbConn) -> Result<bool, Error> {
		let claimed = conn
			.interact(move |conn| {
				use self::booking::dsl::*;

				diesel::update(
					booking
						.find(b_id)
						.filter(status.eq(BookingStatus::Active))
						.filter(reminder_sent.eq(false)),
				)
				.set(reminder_sent.eq(true))
				.execute(conn)
			})
			.await??;

		Ok(claimed == 1)
	}
}

#[derive(Clone, Debug, Deserialize, Insertable, Serialize)]
#[diesel(table_name = booking)]
#[diesel(check_for_backend(Pg))]
pub struct NewBooking {
	pub request_id:  Option<i32>,
	pub resource_id: i32,
	pub profile_id:  i32,
	pub start_time:  NaiveDateTime,
	pub end_time:    NaiveDateTime,
}

impl NewBooking {
	/// Insert this [`NewBooking`] as an active booking
	///
	/// Must run inside a transaction holding
	/// [`Resource::lock_for_booking`] for the same resource, after the
	/// status and availability checks.
	///
	/// # Errors
	/// Fails if the insert fails, including when the store rejects an overlap
	pub fn insert_in(
		self,
		conn: &mut PgConnection,
	) -> Result<PrimitiveBooking, Error> {
		use self::booking::dsl::*;

		let inserted = diesel::insert_into(booking)
			.values(self)
			.returning(PrimitiveBooking::as_returning())
			.get_result(conn)?;

		Ok(inserted)
	}
}

/// Lock a resource and run the status gate then the availability gate
///
/// # Errors
/// Fails with an [`InvalidStateError`] for a resource that cannot be booked,
/// then with a [`ConflictError`] for a taken window
pub fn check_bookable_in(
	conn: &mut PgConnection,
	r_id: i32,
	start: NaiveDateTime,
	end: NaiveDateTime,
	now: NaiveDateTime,
) -> Result<(), Error> {
	let resource = Resource::lock_for_booking(conn, r_id)?;

	resource.ensure_bookable()?;

	Booking::ensure_available_in(conn, r_id, start, end, now)
}
