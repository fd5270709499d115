#[macro_use]
extern crate tracing;

use chrono::NaiveDateTime;
use common::{DbConn, Error, InvalidStateError};
use db::{ResourceStatus, resource};
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = resource)]
#[diesel(check_for_backend(Pg))]
pub struct PrimitiveResource {
	pub id:                 i32,
	pub name:               String,
	pub resource_type:      String,
	pub building:           String,
	pub room:               Option<String>,
	pub capacity:           i32,
	pub description:        Option<String>,
	pub status:             ResourceStatus,
	pub maintenance_set_by: Option<i32>,
	pub maintenance_set_at: Option<NaiveDateTime>,
	pub created_at:         NaiveDateTime,
	pub updated_at:         NaiveDateTime,
}

impl PrimitiveResource {
	/// Get a [`PrimitiveResource`] by its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(r_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let resource = conn
			.interact(move |conn| {
				use self::resource::dsl::*;

				resource.find(r_id).select(Self::as_select()).get_result(conn)
			})
			.await??;

		Ok(resource)
	}

	/// Reject new bookings unless this resource is active
	///
	/// # Errors
	/// Fails with an [`InvalidStateError`] naming why the resource cannot be
	/// booked
	pub fn ensure_bookable(&self) -> Result<(), Error> {
		match self.status {
			ResourceStatus::Active => Ok(()),
			ResourceStatus::UnderMaintenance => {
				Err(InvalidStateError::ResourceUnderMaintenance(self.id).into())
			},
			ResourceStatus::Closed => {
				Err(InvalidStateError::ResourceClosed(self.id).into())
			},
		}
	}
}
