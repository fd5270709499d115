#[macro_use]
extern crate tracing;

use chrono::NaiveDateTime;
use common::{DbConn, Error};
use db::{ResourceStatus, resource};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use models_common::{BoxedCondition, ToFilter};
use primitive_resource::PrimitiveResource;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceFilter {
	pub resource_type: Option<String>,
	pub building:      Option<String>,
	pub status:        Option<ResourceStatus>,
}

impl ToFilter<resource::table> for ResourceFilter {
	type SqlType = Bool;

	fn to_filter(&self) -> BoxedCondition<resource::table, Self::SqlType> {
		let mut filter: BoxedCondition<resource::table, Self::SqlType> =
			Box::new(true.into_sql::<Bool>());

		if let Some(r_type) = self.resource_type.clone() {
			filter = Box::new(filter.and(resource::resource_type.eq(r_type)));
		}

		if let Some(building) = self.building.clone() {
			filter = Box::new(filter.and(resource::building.eq(building)));
		}

		if let Some(status) = self.status {
			filter = Box::new(filter.and(resource::status.eq(status)));
		}

		filter
	}
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Resource {
	pub primitive: PrimitiveResource,
}

impl Resource {
	/// Get a [`Resource`] given its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(r_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let primitive =
			PrimitiveResource::get_by_id(r_id, conn).await.map_err(|e| {
				match e {
					Error::NotFound(_) => {
						Error::NotFound(format!("resource with id {r_id}"))
					},
					e => e,
				}
			})?;

		Ok(Self { primitive })
	}

	/// Get all [`Resource`]s matching a filter, ordered by name
	#[instrument(skip(conn))]
	pub async fn get_all(
		filter: ResourceFilter,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let resources = conn
			.interact(move |conn| {
				use self::resource::dsl::*;

				resource
					.filter(filter.to_filter())
					.order((name.asc(), id.asc()))
					.select(PrimitiveResource::as_select())
					.get_results(conn)
			})
			.await??
			.into_iter()
			.map(|primitive| Self { primitive })
			.collect();

		Ok(resources)
	}

	/// Lock a resource row for the rest of the surrounding transaction
	///
	/// Every workflow that creates an active booking goes through this lock,
	/// so the availability check and the insert that follows cannot
	/// interleave with another writer on the same resource.
	///
	/// # Errors
	/// Fails with [`Error::NotFound`] if the resource does not exist
	pub fn lock_for_booking(
		conn: &mut PgConnection,
		r_id: i32,
	) -> Result<PrimitiveResource, Error> {
		use self::resource::dsl::*;

		resource
			.find(r_id)
			.for_update()
			.select(PrimitiveResource::as_select())
			.get_result(conn)
			.optional()?
			.ok_or_else(|| Error::NotFound(format!("resource with id {r_id}")))
	}

	/// Change the operational status of a [`Resource`]
	///
	/// Moving to [`ResourceStatus::UnderMaintenance`] records who did it and
	/// when, moving back to [`ResourceStatus::Active`] clears that record.
	#[instrument(skip(conn))]
	pub async fn update_status(
		r_id: i32,
		new_status: ResourceStatus,
		actor: Option<i32>,
		now: NaiveDateTime,
		conn: &DbConn,
	) -> Result<Self, Error> {
		let resource = conn
			.interact(move |conn| {
				use self::resource::dsl::*;

				let target = resource.find(r_id);

				let updated = match new_status {
					ResourceStatus::UnderMaintenance => {
						diesel::update(target)
							.set((
								status.eq(new_status),
								maintenance_set_by.eq(actor),
								maintenance_set_at.eq(Some(now)),
								updated_at.eq(now),
							))
							.returning(PrimitiveResource::as_returning())
							.get_result(conn)
					},
					ResourceStatus::Active => {
						diesel::update(target)
							.set((
								status.eq(new_status),
								maintenance_set_by.eq(None::<i32>),
								maintenance_set_at.eq(None::<NaiveDateTime>),
								updated_at.eq(now),
							))
							.returning(PrimitiveResource::as_returning())
							.get_result(conn)
					},
					ResourceStatus::Closed => {
						diesel::update(target)
							.set((status.eq(new_status), updated_at.eq(now)))
							.returning(PrimitiveResource::as_returning())
							.get_result(conn)
					},
				};

				updated.optional()
			})
			.await??
			.ok_or_else(|| Error::NotFound(format!("resource with id {r_id}")))?;

		info!("set status of resource {r_id} to {new_status:?}");

		Ok(Self { primitive: resource })
	}

	/// Delete a [`Resource`] given its id
	#[instrument(skip(conn))]
	pub async fn delete_by_id(r_id: i32, conn: &DbConn) -> Result<(), Error> {
		let deleted = conn
			.interact(move |conn| {
				use self::resource::dsl::*;

				diesel::delete(resource.find(r_id)).execute(conn)
			})
			.await??;

		if deleted == 0 {
			return Err(Error::NotFound(format!("resource with id {r_id}")));
		}

		info!("deleted resource with id {r_id}");

		Ok(())
	}
}

#[derive(Clone, Debug, Deserialize, Insertable, Serialize)]
#[diesel(table_name = resource)]
#[diesel(check_for_backend(Pg))]
pub struct NewResource {
	pub name:          String,
	pub resource_type: String,
	pub building:      String,
	pub room:          Option<String>,
	pub capacity:      i32,
	pub description:   Option<String>,
	pub status:        ResourceStatus,
}

impl NewResource {
	/// Insert this [`NewResource`]
	#[instrument(skip(conn))]
	pub async fn insert(self, conn: &DbConn) -> Result<Resource, Error> {
		let resource = conn
			.interact(|conn| {
				use self::resource::dsl::*;

				diesel::insert_into(resource)
					.values(self)
					.returning(PrimitiveResource::as_returning())
					.get_result(conn)
			})
			.await??;

		info!("created resource {resource:?}");

		Ok(Resource { primitive: resource })
	}
}

/// The fields of a [`Resource`] that can be edited directly
///
/// Status changes go through [`Resource::update_status`] instead. For the
/// nullable columns `None` leaves the value alone and `Some(None)` clears it.
#[derive(AsChangeset, Clone, Debug, Deserialize, Serialize)]
#[diesel(table_name = resource)]
pub struct ResourceUpdate {
	pub name:          Option<String>,
	pub resource_type: Option<String>,
	pub building:      Option<String>,
	#[serde(default, with = "::serde_with::rust::double_option")]
	pub room:          Option<Option<String>>,
	pub capacity:      Option<i32>,
	#[serde(default, with = "::serde_with::rust::double_option")]
	pub description:   Option<Option<String>>,
	pub updated_at:    NaiveDateTime,
}

impl ResourceUpdate {
	/// Apply this update to the [`Resource`] with the given id
	#[instrument(skip(conn))]
	pub async fn apply_to(
		self,
		r_id: i32,
		conn: &DbConn,
	) -> Result<Resource, Error> {
		let resource = conn
			.interact(move |conn| {
				use self::resource::dsl::*;

				diesel::update(resource.find(r_id))
					.set(self)
					.returning(PrimitiveResource::as_returning())
					.get_result(conn)
					.optional()
			})
			.await??
			.ok_or_else(|| Error::NotFound(format!("resource with id {r_id}")))?;

		info!("updated resource {resource:?}");

		Ok(Resource { primitive: resource })
	}
}
