//! Fire-and-forget notification dispatch

use std::sync::Arc;

use common::DbPool;
use db::NotificationCategory;
use notification::NewNotification;
use parking_lot::{Condvar, Mutex};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::{Config, NotificationSink};

/// A single notification addressed to a profile
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Notice {
	pub profile_id: i32,
	pub category:   NotificationCategory,
	pub message:    String,
}

/// A basic interface to notify profiles of booking events
///
/// Notifying never fails the caller, a full or closed queue only gets logged.
#[derive(Clone, Debug)]
pub struct Notifier {
	send_queue: mpsc::Sender<Notice>,
}

/// A fake inbox to keep track of notifications sent in tests
#[derive(Default)]
pub struct StubInbox {
	pub inbox:  Mutex<Vec<Notice>>,
	pub signal: Condvar,
}

impl Notifier {
	/// Create a new notifier and spawn its delivery task
	///
	/// # Panics
	/// Panics if a stub inbox is expected but not provided
	#[must_use]
	pub fn new(
		config: &Config,
		pool: DbPool,
		stub_inbox: Option<Arc<StubInbox>>,
	) -> Self {
		let (tx, rx) = mpsc::channel(config.notification_queue_size);

		match (config.notification_sink, stub_inbox) {
			(NotificationSink::Stub, Some(stub_inbox)) => {
				tokio::spawn(Self::start_sender(rx, pool, Some(stub_inbox)));
			},
			(NotificationSink::Stub, None) => panic!("MISSING STUB INBOX"),
			(NotificationSink::Store, _) => {
				tokio::spawn(Self::start_sender(rx, pool, None));
			},
		}

		Self { send_queue: tx }
	}

	/// Queue a notification for a profile
	pub fn notify(
		&self,
		profile_id: i32,
		category: NotificationCategory,
		message: impl Into<String>,
	) {
		let notice = Notice { profile_id, category, message: message.into() };

		match self.send_queue.try_send(notice) {
			Ok(()) => {},
			Err(TrySendError::Full(notice)) => {
				warn!("notification queue full, dropped {notice:?}");
			},
			Err(TrySendError::Closed(notice)) => {
				error!("notification queue closed, dropped {notice:?}");
			},
		}
	}

	/// Queue the same notification for several profiles
	pub fn notify_all(
		&self,
		profile_ids: impl IntoIterator<Item = i32>,
		category: NotificationCategory,
		message: &str,
	) {
		for profile_id in profile_ids {
			self.notify(profile_id, category, message);
		}
	}

	/// Create a notifier without a delivery task, handing out the receiving
	/// end of its queue instead
	#[cfg(test)]
	pub(crate) fn detached(capacity: usize) -> (Self, mpsc::Receiver<Notice>) {
		let (tx, rx) = mpsc::channel(capacity);

		(Self { send_queue: tx }, rx)
	}

	/// Start an infinitely looping delivery task
	#[instrument(skip_all)]
	async fn start_sender(
		mut rx: mpsc::Receiver<Notice>,
		pool: DbPool,
		stub_inbox: Option<Arc<StubInbox>>,
	) -> impl Send + 'static {
		while let Some(notice) = rx.recv().await {
			if let Err(e) = Self::store(&notice, &pool).await {
				error!("error storing notification {notice:?}: {e:?}");
			}

			if let Some(stub_inbox) = &stub_inbox {
				info!(target: "[STUB_NOTIFIER]", "sent notification {notice:?}");

				let mut inbox = stub_inbox.inbox.lock();
				inbox.push(notice);
				stub_inbox.signal.notify_all();
			}
		}
	}

	async fn store(notice: &Notice, pool: &DbPool) -> Result<(), common::Error> {
		let conn = pool.get().await?;

		NewNotification {
			profile_id: notice.profile_id,
			category:   notice.category,
			message:    notice.message.clone(),
		}
		.insert(&conn)
		.await?;

		Ok(())
	}
}
