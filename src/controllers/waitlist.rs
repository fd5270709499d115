//! Controllers for [`WaitlistEntry`]s

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, NoContent};
use common::{DbPool, Error};
use db::NotificationCategory;
use resource::Resource;
use validator::Validate;
use waitlist::{NewWaitlistEntry, WaitlistEntry};

use crate::notifier::Notifier;
use crate::principal::Principal;
use crate::schemas::waitlist::{
	CreateWaitlistEntryRequest,
	WaitlistEntryResponse,
};

/// Put the caller at the back of a resource's waitlist
#[instrument(skip(pool, notifier))]
pub async fn join_waitlist(
	State(pool): State<DbPool>,
	State(notifier): State<Notifier>,
	principal: Principal,
	Json(request): Json<CreateWaitlistEntryRequest>,
) -> Result<impl IntoResponse, Error> {
	request.validate()?;

	let conn = pool.get().await?;

	let resource = Resource::get_by_id(request.resource_id, &conn).await?;

	let entry = NewWaitlistEntry {
		profile_id:  principal.profile_id,
		resource_id: request.resource_id,
		start_time:  request.start_time,
		end_time:    request.end_time,
	}
	.insert(&conn)
	.await?;

	notifier.notify(
		principal.profile_id,
		NotificationCategory::Waitlist,
		format!(
			"You were added to the waitlist of {}, you will be notified when \
			 a booking is cancelled",
			resource.primitive.name
		),
	);

	let response: WaitlistEntryResponse = entry.into();

	Ok((StatusCode::CREATED, Json(response)))
}

/// Get the waitlist entries of the caller
#[instrument(skip(pool))]
pub async fn get_my_waitlist_entries(
	State(pool): State<DbPool>,
	principal: Principal,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let entries = WaitlistEntry::for_profile(principal.profile_id, &conn).await?;
	let response: Vec<WaitlistEntryResponse> =
		entries.into_iter().map(Into::into).collect();

	Ok((StatusCode::OK, Json(response)))
}

/// Remove a waitlist entry, only its owner or an admin may do so
#[instrument(skip(pool))]
pub async fn leave_waitlist(
	State(pool): State<DbPool>,
	principal: Principal,
	Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let entry = WaitlistEntry::get_by_id(id, &conn).await?;

	if entry.primitive.profile_id != principal.profile_id
		&& !principal.is_admin()
	{
		return Err(Error::Forbidden);
	}

	WaitlistEntry::delete_by_id(id, &conn).await?;

	Ok((StatusCode::NO_CONTENT, NoContent))
}
