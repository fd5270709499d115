//! Controllers for [`Resource`]s

use std::collections::BTreeSet;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, NoContent};
use booking::Booking;
use chrono::{NaiveDateTime, Utc};
use common::{DbPool, Error};
use db::{NotificationCategory, ResourceStatus};
use resource::{NewResource, Resource, ResourceFilter, ResourceUpdate};
use validator::Validate;
use waitlist::WaitlistEntry;

use crate::notifier::Notifier;
use crate::principal::Principal;
use crate::schemas::resource::{
	AvailabilityQuery,
	AvailabilityResponse,
	CreateResourceRequest,
	ResourceResponse,
	UpdateResourceRequest,
	UpdateResourceStatusRequest,
};
use crate::schemas::waitlist::WaitlistEntryResponse;

/// Get all [`Resource`]s
#[instrument(skip(pool))]
pub async fn get_resources(
	State(pool): State<DbPool>,
	Query(filter): Query<ResourceFilter>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let resources = Resource::get_all(filter, &conn).await?;
	let response: Vec<ResourceResponse> =
		resources.into_iter().map(Into::into).collect();

	Ok((StatusCode::OK, Json(response)))
}

#[instrument(skip(pool))]
pub async fn get_resource(
	State(pool): State<DbPool>,
	Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let resource = Resource::get_by_id(id, &conn).await?;
	let response: ResourceResponse = resource.into();

	Ok((StatusCode::OK, Json(response)))
}

/// Check whether a window on a resource can still be booked
///
/// A resource that does not accept bookings is reported as such before any
/// window is looked at.
#[instrument(skip(pool))]
pub async fn check_resource_availability(
	State(pool): State<DbPool>,
	Path(id): Path<i32>,
	Query(query): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, Error> {
	query.validate()?;

	let conn = pool.get().await?;

	let resource = Resource::get_by_id(id, &conn).await?;

	resource.primitive.ensure_bookable()?;

	let now = Utc::now().naive_utc();

	let available =
		Booking::is_available(id, query.start_time, query.end_time, now, &conn)
			.await?;

	let response = AvailabilityResponse {
		resource_id: id,
		start_time: query.start_time,
		end_time: query.end_time,
		available,
	};

	Ok((StatusCode::OK, Json(response)))
}

#[instrument(skip(pool))]
pub async fn create_resource(
	State(pool): State<DbPool>,
	Json(request): Json<CreateResourceRequest>,
) -> Result<impl IntoResponse, Error> {
	request.validate()?;

	let conn = pool.get().await?;

	let new_resource: NewResource = request.into();
	let resource = new_resource.insert(&conn).await?;
	let response: ResourceResponse = resource.into();

	Ok((StatusCode::CREATED, Json(response)))
}

#[instrument(skip(pool))]
pub async fn update_resource(
	State(pool): State<DbPool>,
	Path(id): Path<i32>,
	Json(request): Json<UpdateResourceRequest>,
) -> Result<impl IntoResponse, Error> {
	request.validate()?;

	let conn = pool.get().await?;

	let update: ResourceUpdate = request.into();
	let resource = update.apply_to(id, &conn).await?;
	let response: ResourceResponse = resource.into();

	Ok((StatusCode::OK, Json(response)))
}

#[instrument(skip(pool))]
pub async fn delete_resource(
	State(pool): State<DbPool>,
	Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	Resource::delete_by_id(id, &conn).await?;

	Ok((StatusCode::NO_CONTENT, NoContent))
}

/// Change the status of a [`Resource`]
///
/// Holders of upcoming bookings are told when their resource stops accepting
/// bookings, their bookings themselves are left untouched.
#[instrument(skip(pool, notifier))]
pub async fn update_resource_status(
	State(pool): State<DbPool>,
	State(notifier): State<Notifier>,
	principal: Principal,
	Path(id): Path<i32>,
	Json(request): Json<UpdateResourceStatusRequest>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let now = Utc::now().naive_utc();

	let previous = Resource::get_by_id(id, &conn).await?.primitive.status;

	let resource = Resource::update_status(
		id,
		request.status,
		Some(principal.profile_id),
		now,
		&conn,
	)
	.await?;

	drop(conn);

	if previous == ResourceStatus::Active
		&& request.status != ResourceStatus::Active
	{
		let reason = match request.status {
			ResourceStatus::UnderMaintenance => "under maintenance",
			_ => "closed",
		};

		notify_holders(
			&notifier,
			&pool,
			id,
			now,
			&format!(
				"{} is now {reason}, your upcoming booking there may be \
				 affected",
				resource.primitive.name
			),
		)
		.await;
	}

	let response: ResourceResponse = resource.into();

	Ok((StatusCode::OK, Json(response)))
}

/// Get the waitlist of a [`Resource`] in promotion order
#[instrument(skip(pool))]
pub async fn get_resource_waitlist(
	State(pool): State<DbPool>,
	Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let entries = WaitlistEntry::for_resource(id, &conn).await?;
	let response: Vec<WaitlistEntryResponse> =
		entries.into_iter().map(Into::into).collect();

	Ok((StatusCode::OK, Json(response)))
}

/// Profiles holding an upcoming active booking on a resource
async fn upcoming_holders(
	pool: &DbPool,
	r_id: i32,
	now: NaiveDateTime,
) -> Result<BTreeSet<i32>, Error> {
	let conn = pool.get().await?;

	let holders = Booking::upcoming_for_resource(r_id, now, &conn)
		.await?
		.into_iter()
		.map(|b| b.primitive.profile_id)
		.collect();

	Ok(holders)
}

/// Notify every holder of an upcoming booking on a resource
///
/// The status change has committed by the time this runs, so a failed
/// lookup is logged and never reported to the caller.
async fn notify_holders(
	notifier: &Notifier,
	pool: &DbPool,
	r_id: i32,
	now: NaiveDateTime,
	message: &str,
) {
	match upcoming_holders(pool, r_id, now).await {
		Ok(holders) => {
			notifier.notify_all(holders, NotificationCategory::Admin, message);
		},
		Err(e) => {
			error!("could not look up holders of resource {r_id}: {e:?}");
		},
	}
}

#[cfg(test)]
mod tests {
	use deadpool_diesel::postgres::{Manager, Pool};

	use super::*;

	#[tokio::test]
	async fn failed_holder_lookup_is_swallowed() {
		let manager = Manager::new(
			"postgres://campus@127.0.0.1:1/campus",
			deadpool_diesel::Runtime::Tokio1,
		);
		let pool = Pool::builder(manager).build().unwrap();

		let (notifier, mut rx) = Notifier::detached(4);

		notify_holders(
			&notifier,
			&pool,
			1,
			Utc::now().naive_utc(),
			"resource closed",
		)
		.await;

		assert!(rx.try_recv().is_err());
	}
}
