//! Controllers for the notification inbox

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, NoContent};
use chrono::Utc;
use common::{DbPool, Error};
use notification::Notification;
use serde_json::json;

use crate::principal::Principal;
use crate::schemas::notification::{NotificationQuery, NotificationResponse};

#[instrument(skip(pool))]
pub async fn get_my_notifications(
	State(pool): State<DbPool>,
	principal: Principal,
	Query(query): Query<NotificationQuery>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let notifications = Notification::for_profile(
		principal.profile_id,
		query.unread_only,
		&conn,
	)
	.await?;
	let response: Vec<NotificationResponse> =
		notifications.into_iter().map(Into::into).collect();

	Ok((StatusCode::OK, Json(response)))
}

#[instrument(skip(pool))]
pub async fn read_notification(
	State(pool): State<DbPool>,
	principal: Principal,
	Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let now = Utc::now().naive_utc();

	let notification =
		Notification::mark_read(id, principal.profile_id, now, &conn).await?;
	let response: NotificationResponse = notification.into();

	Ok((StatusCode::OK, Json(response)))
}

#[instrument(skip(pool))]
pub async fn read_all_notifications(
	State(pool): State<DbPool>,
	principal: Principal,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let now = Utc::now().naive_utc();

	let count =
		Notification::mark_all_read(principal.profile_id, now, &conn).await?;

	Ok((StatusCode::OK, Json(json!({ "read": count }))))
}

#[instrument(skip(pool))]
pub async fn delete_notification(
	State(pool): State<DbPool>,
	principal: Principal,
	Path(id): Path<i32>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	Notification::delete_by_id(id, principal.profile_id, &conn).await?;

	Ok((StatusCode::NO_CONTENT, NoContent))
}
