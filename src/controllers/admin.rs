//! On-demand maintenance tasks

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use booking::Booking;
use chrono::Utc;
use common::{DbPool, Error};
use serde_json::json;

use crate::scheduler::ReminderScheduler;

/// Complete every active booking that already ended
#[instrument(skip(pool))]
pub async fn reconcile_bookings(
	State(pool): State<DbPool>,
) -> Result<impl IntoResponse, Error> {
	let conn = pool.get().await?;

	let completed =
		Booking::reconcile_expired(Utc::now().naive_utc(), &conn).await?;

	Ok((StatusCode::OK, Json(json!({ "completed": completed }))))
}

/// Run a reminder sweep now
///
/// Shares its guard with the periodic sweep, a sweep that is already
/// running makes this one report itself as skipped.
#[instrument(skip(reminders))]
pub async fn sweep_reminders(
	State(reminders): State<ReminderScheduler>,
) -> Result<impl IntoResponse, Error> {
	let report = reminders.run_sweep(Utc::now().naive_utc()).await?;

	Ok((StatusCode::OK, Json(report)))
}
