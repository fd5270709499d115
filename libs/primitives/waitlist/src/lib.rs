#[macro_use]
extern crate tracing;

use chrono::NaiveDateTime;
use common::{DbConn, Error};
use db::waitlist_entry;
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = waitlist_entry)]
#[diesel(check_for_backend(Pg))]
pub struct PrimitiveWaitlistEntry {
	pub id:          i32,
	pub profile_id:  i32,
	pub resource_id: i32,
	pub start_time:  Option<NaiveDateTime>,
	pub end_time:    Option<NaiveDateTime>,
	pub created_at:  NaiveDateTime,
}

impl PrimitiveWaitlistEntry {
	/// Get a [`PrimitiveWaitlistEntry`] by its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(w_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let entry = conn
			.interact(move |conn| {
				use self::waitlist_entry::dsl::*;

				waitlist_entry
					.find(w_id)
					.select(Self::as_select())
					.get_result(conn)
			})
			.await??;

		Ok(entry)
	}
}
