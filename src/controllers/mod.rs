//! Defines controller functions that correspond to individual routes

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::{DbConn, DbPool, Error};
use db::{NotificationCategory, ProfileRole};
use diesel::{RunQueryDsl, sql_query};
use profile::Profile;
use serde_json::{Value, json};

use crate::notifier::Notifier;

pub mod admin;
pub mod booking;
pub mod booking_request;
pub mod notification;
pub mod resource;
pub mod waitlist;

/// Check if the database connection and webserver are functional
pub(crate) async fn healthcheck(
	State(pool): State<DbPool>,
) -> Result<(StatusCode, Json<Value>), Error> {
	let conn = pool.get().await?;

	conn.interact(|conn| sql_query("SELECT 1").execute(conn)).await??;

	Ok((StatusCode::OK, Json(json!({ "status": "ok" }))))
}

/// Notify every admin except `skip`
///
/// Looking up the admins happens after the triggering operation committed,
/// so a failure here is logged and never reported to the caller.
pub(crate) async fn notify_admins(
	notifier: &Notifier,
	conn: &DbConn,
	skip: i32,
	message: &str,
) {
	match Profile::get_by_role(ProfileRole::Admin, conn).await {
		Ok(admins) => {
			notifier.notify_all(
				admins
					.into_iter()
					.map(|a| a.profile.id)
					.filter(|id| *id != skip),
				NotificationCategory::Admin,
				message,
			);
		},
		Err(e) => error!("could not look up admins to notify: {e:?}"),
	}
}
