#[macro_use]
extern crate tracing;

use chrono::NaiveDateTime;
use common::{DbConn, Error};
use db::waitlist_entry;
use diesel::pg::Pg;
use diesel::prelude::*;
use primitive_waitlist::PrimitiveWaitlistEntry;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct WaitlistEntry {
	pub primitive: PrimitiveWaitlistEntry,
}

impl WaitlistEntry {
	/// Get a [`WaitlistEntry`] given its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(w_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let primitive = PrimitiveWaitlistEntry::get_by_id(w_id, conn)
			.await
			.map_err(|e| {
				match e {
					Error::NotFound(_) => {
						Error::NotFound(format!("waitlist entry with id {w_id}"))
					},
					e => e,
				}
			})?;

		Ok(Self { primitive })
	}

	/// Get all [`WaitlistEntry`]s of a profile, newest first
	#[instrument(skip(conn))]
	pub async fn for_profile(
		p_id: i32,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let entries = conn
			.interact(move |conn| {
				use self::waitlist_entry::dsl::*;

				waitlist_entry
					.filter(profile_id.eq(p_id))
					.order((created_at.desc(), id.desc()))
					.select(PrimitiveWaitlistEntry::as_select())
					.get_results(conn)
			})
			.await??
			.into_iter()
			.map(|primitive| Self { primitive })
			.collect();

		Ok(entries)
	}

	/// Get the queue of a resource in promotion order
	#[instrument(skip(conn))]
	pub async fn for_resource(
		r_id: i32,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let entries = conn
			.interact(move |conn| {
				use self::waitlist_entry::dsl::*;

				waitlist_entry
					.filter(resource_id.eq(r_id))
					.order((created_at.asc(), id.asc()))
					.select(PrimitiveWaitlistEntry::as_select())
					.get_results(conn)
			})
			.await??
			.into_iter()
			.map(|primitive| Self { primitive })
			.collect();

		Ok(entries)
	}

	/// Remove the oldest entry waiting on a resource and return it
	///
	/// Promotion is FIFO over the whole resource, the window the waiter
	/// originally asked for is not matched against the freed booking.
	/// Exactly one entry is removed per call.
	///
	/// # Errors
	/// Fails if the underlying queries fail
	pub fn promote_next_in(
		conn: &mut PgConnection,
		r_id: i32,
	) -> QueryResult<Option<PrimitiveWaitlistEntry>> {
		use self::waitlist_entry::dsl::*;

		let next = waitlist_entry
			.filter(resource_id.eq(r_id))
			.order((created_at.asc(), id.asc()))
			.for_update()
			.skip_locked()
			.select(PrimitiveWaitlistEntry::as_select())
			.first(conn)
			.optional()?;

		if let Some(entry) = &next {
			diesel::delete(waitlist_entry.find(entry.id)).execute(conn)?;
		}

		Ok(next)
	}

	/// Delete a [`WaitlistEntry`] given its id
	#[instrument(skip(conn))]
	pub async fn delete_by_id(w_id: i32, conn: &DbConn) -> Result<(), Error> {
		let deleted = conn
			.interact(move |conn| {
				use self::waitlist_entry::dsl::*;

				diesel::delete(waitlist_entry.find(w_id)).execute(conn)
			})
			.await??;

		if deleted == 0 {
			return Err(Error::NotFound(format!(
				"waitlist entry with id {w_id}"
			)));
		}

		info!("deleted waitlist entry with id {w_id}");

		Ok(())
	}
}

#[derive(Clone, Debug, Deserialize, Insertable, Serialize)]
#[diesel(table_name = waitlist_entry)]
#[diesel(check_for_backend(Pg))]
pub struct NewWaitlistEntry {
	pub profile_id:  i32,
	pub resource_id: i32,
	pub start_time:  Option<NaiveDateTime>,
	pub end_time:    Option<NaiveDateTime>,
}

impl NewWaitlistEntry {
	/// Insert this [`NewWaitlistEntry`] at the back of its resource's queue
	#[instrument(skip(conn))]
	pub async fn insert(self, conn: &DbConn) -> Result<WaitlistEntry, Error> {
		let entry = conn
			.interact(|conn| {
				use self::waitlist_entry::dsl::*;

				diesel::insert_into(waitlist_entry)
					.values(self)
					.returning(PrimitiveWaitlistEntry::as_returning())
					.get_result(conn)
			})
			.await??;

		info!("created waitlist entry {entry:?}");

		Ok(WaitlistEntry { primitive: entry })
	}
}
