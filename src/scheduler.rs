//! Periodic reminder sweep

use std::sync::Arc;
use std::time::Duration;

use booking::Booking;
use chrono::{NaiveDateTime, TimeDelta, Utc};
use common::{DbPool, Error};
use db::NotificationCategory;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;

use crate::notifier::Notifier;

/// The outcome of a single reminder sweep
#[derive(
	Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize,
)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
	/// Whether the sweep was skipped because another one was still running
	pub skipped:   bool,
	pub completed: usize,
	pub reminded:  usize,
}

/// Sends reminders for imminent bookings
///
/// At most one sweep runs at a time, whether it was started by the timer or
/// by hand. A sweep that finds another one running is skipped.
#[derive(Clone)]
pub struct ReminderScheduler {
	pool:     DbPool,
	notifier: Notifier,
	lead:     TimeDelta,
	guard:    Arc<Mutex<()>>,
}

impl ReminderScheduler {
	#[must_use]
	pub fn new(pool: DbPool, notifier: Notifier, lead: TimeDelta) -> Self {
		Self { pool, notifier, lead, guard: Arc::new(Mutex::new(())) }
	}

	/// Run one sweep at `now`
	///
	/// Expired bookings are completed first, then every active booking that
	/// starts within the lead time and has not been reminded is claimed and
	/// its holder notified.
	///
	/// # Errors
	/// Fails if the store cannot be reached, reminders already sent stay sent
	#[instrument(skip(self))]
	pub async fn run_sweep(
		&self,
		now: NaiveDateTime,
	) -> Result<SweepReport, Error> {
		let Ok(_running) = self.guard.try_lock() else {
			warn!("previous reminder sweep still running, skipping");

			return Ok(SweepReport { skipped: true, ..Default::default() });
		};

		let conn = self.pool.get().await?;

		let completed = Booking::reconcile_expired(now, &conn).await?;

		let candidates =
			Booking::reminder_candidates(now, self.lead, &conn).await?;

		let mut reminded = 0;

		for candidate in candidates {
			// Another writer may have cancelled or reminded it since it was
			// loaded
			match Booking::claim_reminder(candidate.id, &conn).await {
				Ok(true) => {},
				Ok(false) => continue,
				Err(e) => {
					error!(
						"could not claim reminder for booking {}: {e:?}",
						candidate.id
					);

					continue;
				},
			}

			self.notifier.notify(
				candidate.profile_id,
				NotificationCategory::Reminder,
				format!(
					"Reminder: your booking of resource {} starts at {}",
					candidate.resource_id, candidate.start_time
				),
			);

			reminded += 1;
		}

		info!(
			"reminder sweep completed {completed} bookings, sent {reminded} \
			 reminders"
		);

		Ok(SweepReport { skipped: false, completed, reminded })
	}

	/// Start an infinitely looping sweep task
	pub fn spawn(self, interval: Duration) -> tokio::task::JoinHandle<()> {
		tokio::spawn(async move {
			let mut ticker = tokio::time::interval(interval);
			ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

			loop {
				ticker.tick().await;

				if let Err(e) = self.run_sweep(Utc::now().naive_utc()).await {
					error!("reminder sweep failed: {e:?}");
				}
			}
		})
	}
}

#[cfg(test)]
mod tests {
	use chrono::NaiveDate;
	use deadpool_diesel::postgres::{Manager, Pool};

	use super::*;

	fn detached_scheduler() -> ReminderScheduler {
		let manager = Manager::new(
			"postgres://unreachable/campus",
			deadpool_diesel::Runtime::Tokio1,
		);
		let pool = Pool::builder(manager).build().unwrap();

		let (notifier, _rx) = Notifier::detached(4);

		ReminderScheduler::new(pool, notifier, TimeDelta::hours(1))
	}

	#[tokio::test]
	async fn overlapping_sweep_is_skipped() {
		let scheduler = detached_scheduler();
		let now = NaiveDate::from_ymd_opt(2025, 3, 14)
			.unwrap()
			.and_hms_opt(9, 0, 0)
			.unwrap();

		let running = scheduler.guard.clone();
		let _held = running.try_lock().unwrap();

		let report = scheduler.run_sweep(now).await.unwrap();

		assert_eq!(report, SweepReport {
			skipped:   true,
			completed: 0,
			reminded:  0,
		});
	}

	#[tokio::test]
	async fn clones_share_one_guard() {
		let scheduler = detached_scheduler();
		let clone = scheduler.clone();

		let _held = scheduler.guard.try_lock().unwrap();

		assert!(clone.guard.try_lock().is_err());
	}
}
