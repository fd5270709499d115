use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, Method};
use axum_test::{TestRequest, TestResponse, TestServer};
use campus_booking::notifier::{Notifier, StubInbox};
use campus_booking::principal::PRINCIPAL_ID_HEADER;
use campus_booking::scheduler::ReminderScheduler;
use campus_booking::schemas::resource::ResourceResponse;
use campus_booking::{AppState, Config, NotificationSink, routes};
use chrono::{NaiveDateTime, TimeDelta, Timelike, Utc};
use common::DbPool;
use db::{ProfileRole, ResourceStatus};
use profile::NewProfile;
use resource::NewResource;
use serde_json::json;

pub mod wrappers;

mod mock_db;

use mock_db::{DATABASE_PROVIDER, DatabaseGuard};

/// Ids of the profiles every test environment starts with
#[derive(Clone, Copy, Debug)]
pub struct TestProfiles {
	pub student:       i32,
	pub other_student: i32,
	pub faculty:       i32,
	pub admin:         i32,
}

#[allow(dead_code)]
pub struct TestEnv {
	pub app:        TestServer,
	pub db_guard:   DatabaseGuard,
	pub pool:       DbPool,
	pub stub_inbox: Arc<StubInbox>,
	pub reminders:  ReminderScheduler,
	pub profiles:   TestProfiles,
}

#[allow(dead_code)]
impl TestEnv {
	/// Get a test environment with a fresh database for running tests
	///
	/// # Panics
	/// Panics if building the database, the profiles or the server fails
	pub async fn new() -> Self {
		let mut config = Config::from_env();
		config.notification_sink = NotificationSink::Stub;

		let db_guard = (*DATABASE_PROVIDER).acquire().await;
		let pool = db_guard.create_pool().await;

		let profiles = {
			let conn = pool.get().await.unwrap();

			let insert = async |username: &str, role: ProfileRole| {
				NewProfile {
					username: username.to_string(),
					email:    Some(format!("{username}@campus.example")),
					role,
				}
				.insert(&conn)
				.await
				.unwrap()
				.profile
				.id
			};

			TestProfiles {
				student:       insert("student", ProfileRole::Student).await,
				other_student: insert("other", ProfileRole::Student).await,
				faculty:       insert("faculty", ProfileRole::Faculty).await,
				admin:         insert("admin", ProfileRole::Admin).await,
			}
		};

		let stub_inbox = config.create_stub_inbox();
		let notifier = Notifier::new(&config, pool.clone(), stub_inbox.clone());

		let reminders = ReminderScheduler::new(
			pool.clone(),
			notifier.clone(),
			config.reminder_lead,
		);

		let state = AppState {
			config,
			database_pool: pool.clone(),
			notifier,
			reminders: reminders.clone(),
		};
		let app = routes::get_app_router(state);

		let test_server = TestServer::builder().build(app).unwrap();

		TestEnv {
			app: test_server,
			db_guard,
			pool,
			stub_inbox: stub_inbox.unwrap(),
			reminders,
			profiles,
		}
	}

	/// Start a request on behalf of a profile
	pub fn request_as(
		&self,
		method: Method,
		path: &str,
		profile_id: i32,
	) -> TestRequest {
		self.app.method(method, path).add_header(
			HeaderName::from_static(PRINCIPAL_ID_HEADER),
			HeaderValue::from(profile_id),
		)
	}

	pub fn get_as(&self, path: &str, profile_id: i32) -> TestRequest {
		self.request_as(Method::GET, path, profile_id)
	}

	pub fn post_as(&self, path: &str, profile_id: i32) -> TestRequest {
		self.request_as(Method::POST, path, profile_id)
	}

	pub fn delete_as(&self, path: &str, profile_id: i32) -> TestRequest {
		self.request_as(Method::DELETE, path, profile_id)
	}

	/// Insert a resource with the given status
	pub async fn create_resource(
		&self,
		status: ResourceStatus,
	) -> ResourceResponse {
		let conn = self.pool.get().await.unwrap();

		NewResource {
			name:          "Seminar room".to_string(),
			resource_type: "room".to_string(),
			building:      "Plateau".to_string(),
			room:          Some("0.12".to_string()),
			capacity:      24,
			description:   None,
			status,
		}
		.insert(&conn)
		.await
		.unwrap()
		.into()
	}

	/// Book a window on a resource through the fast path
	pub async fn book(
		&self,
		profile_id: i32,
		resource_id: i32,
		start_time: NaiveDateTime,
		end_time: NaiveDateTime,
	) -> TestResponse {
		self.post_as("/bookings", profile_id)
			.json(&json!({
				"resourceId": resource_id,
				"startTime": start_time,
				"endTime": end_time,
				"purpose": "study session",
			}))
			.await
	}

	/// Join the waitlist of a resource without a preferred window
	pub async fn join_waitlist(
		&self,
		profile_id: i32,
		resource_id: i32,
	) -> TestResponse {
		self.post_as("/waitlist", profile_id)
			.json(&json!({ "resourceId": resource_id }))
			.await
	}

	pub async fn expect_notifications_to<F, R, T>(
		&self,
		receivers: &[i32],
		f: F,
	) -> T
	where
		F: FnOnce() -> R,
		R: Future<Output = T>,
	{
		wrappers::expect_notifications_to(self.stub_inbox.clone(), receivers, f)
			.await
	}

	pub async fn expect_no_notification<F, R, T>(&self, f: F) -> T
	where
		F: FnOnce() -> R,
		R: Future<Output = T>,
	{
		wrappers::expect_no_notification(self.stub_inbox.clone(), f).await
	}
}

/// A whole-second timestamp `hours` away from now
#[allow(dead_code)]
#[must_use]
pub fn hours_from_now(hours: i64) -> NaiveDateTime {
	minutes_from_now(hours * 60)
}

/// A whole-second timestamp `minutes` away from now
#[allow(dead_code)]
#[must_use]
pub fn minutes_from_now(minutes: i64) -> NaiveDateTime {
	let now = Utc::now().naive_utc();
	let now = now.with_nanosecond(0).unwrap_or(now);

	now + TimeDelta::minutes(minutes)
}
