use std::sync::Arc;
use std::time::{Duration, Instant};

use campus_booking::notifier::{Notice, StubInbox};

/// Run `f` and assert that exactly the given profiles got notified, in any
/// order, while it ran
#[allow(dead_code)]
pub async fn expect_notifications_to<F, R, T>(
	stub_inbox: Arc<StubInbox>,
	receivers: &[i32],
	f: F,
) -> T
where
	F: FnOnce() -> R,
	R: Future<Output = T>,
{
	let inbox_size = settle(&stub_inbox);

	let result = f().await;

	let expected = inbox_size + receivers.len();
	let deadline = Instant::now() + Duration::from_secs(2);

	let mut inbox = stub_inbox.inbox.lock();
	while inbox.len() < expected {
		let wait_res = stub_inbox.signal.wait_until(&mut inbox, deadline);

		assert!(!wait_res.timed_out(), "timed out waiting for notifications");
	}

	// Give stragglers a moment so unexpected extra notices get caught too
	stub_inbox.signal.wait_for(&mut inbox, Duration::from_millis(200));

	let mut sent: Vec<i32> =
		inbox[inbox_size..].iter().map(|n| n.profile_id).collect();
	let mut receivers = receivers.to_vec();

	sent.sort_unstable();
	receivers.sort_unstable();

	assert_eq!(sent, receivers, "unexpected notification receivers");

	result
}

/// Run `f` and assert that nobody got notified while it ran
#[allow(dead_code)]
pub async fn expect_no_notification<F, R, T>(
	stub_inbox: Arc<StubInbox>,
	f: F,
) -> T
where
	F: FnOnce() -> R,
	R: Future<Output = T>,
{
	let inbox_size = settle(&stub_inbox);

	let result = f().await;

	// Wait for up to 1 second or until a condvar notification is received to
	// make sure no queued notices are missed
	let mut inbox = stub_inbox.inbox.lock();
	if inbox.len() == inbox_size {
		stub_inbox.signal.wait_for(&mut inbox, Duration::from_secs(1));
	}

	assert_eq!(inbox_size, inbox.len(), "expected no notifications");

	result
}

/// Wait until notices from earlier requests stopped arriving and return the
/// size of the inbox
fn settle(stub_inbox: &StubInbox) -> usize {
	let mut inbox = stub_inbox.inbox.lock();

	while !stub_inbox
		.signal
		.wait_for(&mut inbox, Duration::from_millis(200))
		.timed_out()
	{}

	inbox.len()
}

/// Every notice sent to a profile so far
#[allow(dead_code)]
pub fn notices_for(stub_inbox: &StubInbox, profile_id: i32) -> Vec<Notice> {
	stub_inbox
		.inbox
		.lock()
		.iter()
		.filter(|n| n.profile_id == profile_id)
		.cloned()
		.collect()
}
