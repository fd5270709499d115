use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use deadpool_diesel::postgres::{Manager, Pool};
use tracing::Level;

use crate::notifier::StubInbox;

/// Where dispatched notifications end up
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NotificationSink {
	/// Persist notifications as in-app notification rows
	Store,
	/// Persist notifications and mirror them into a [`StubInbox`]
	Stub,
}

impl FromStr for NotificationSink {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"store" => Ok(Self::Store),
			"stub" => Ok(Self::Stub),
			_ => Err(format!("unknown notification sink '{s}'")),
		}
	}
}

#[derive(Clone, Debug)]
pub struct Config {
	pub database_url: String,
	pub bind_address: String,
	pub log_level:    Level,

	pub notification_queue_size: usize,
	pub notification_sink:       NotificationSink,

	pub reminder_interval: Duration,
	pub reminder_lead:     TimeDelta,

	pub request_timeout: Duration,
}

impl Config {
	fn get_env_var(var: &str) -> String {
		std::env::var(var).unwrap_or_else(|_| panic!("{var} must be set"))
	}

	fn get_env_var_or<T>(var: &str, default: T) -> T
	where
		T: FromStr,
		T::Err: std::fmt::Display,
	{
		match std::env::var(var) {
			Ok(value) => {
				value.parse::<T>().unwrap_or_else(|e| {
					panic!("{var} has an invalid value '{value}' -- {e}")
				})
			},
			Err(_) => default,
		}
	}

	/// Create a new [`Config`] from environment variables
	///
	/// # Panics
	/// Panics if a required environment variable is missing or any variable
	/// holds an unparseable value
	#[must_use]
	pub fn from_env() -> Self {
		let database_url = Self::get_env_var("DATABASE_URL");
		let bind_address =
			Self::get_env_var_or("BIND_ADDRESS", "0.0.0.0:80".to_string());
		let log_level = Self::get_env_var_or("LOG_LEVEL", Level::DEBUG);

		let notification_queue_size =
			Self::get_env_var_or("NOTIFICATION_QUEUE_SIZE", 256);
		let notification_sink =
			Self::get_env_var_or("NOTIFICATION_SINK", NotificationSink::Store);

		let reminder_interval = Duration::from_secs(Self::get_env_var_or(
			"REMINDER_INTERVAL_SECONDS",
			300,
		));
		let reminder_lead =
			TimeDelta::minutes(Self::get_env_var_or("REMINDER_LEAD_MINUTES", 60));

		let request_timeout = Duration::from_secs(Self::get_env_var_or(
			"REQUEST_TIMEOUT_SECONDS",
			10,
		));

		Self {
			database_url,
			bind_address,
			log_level,
			notification_queue_size,
			notification_sink,
			reminder_interval,
			reminder_lead,
			request_timeout,
		}
	}

	/// Create a database pool for the given config
	///
	/// # Panics
	/// Panics if creating the pool fails
	#[must_use]
	pub fn create_database_pool(&self) -> Pool {
		let manager = Manager::new(
			self.database_url.to_string(),
			deadpool_diesel::Runtime::Tokio1,
		);

		Pool::builder(manager)
			.build()
			.unwrap_or_else(|e| panic!("COULD NOT BUILD DATABASE POOL -- {e}"))
	}

	/// Create a stub inbox if notifications are configured to go to one
	#[must_use]
	pub fn create_stub_inbox(&self) -> Option<Arc<StubInbox>> {
		match self.notification_sink {
			NotificationSink::Stub => Some(Arc::new(StubInbox::default())),
			NotificationSink::Store => None,
		}
	}
}
