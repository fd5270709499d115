use chrono::NaiveDateTime;
use db::NotificationCategory;
use notification::Notification;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
	pub id:         i32,
	pub category:   NotificationCategory,
	pub message:    String,
	pub created_at: NaiveDateTime,
	pub read_at:    Option<NaiveDateTime>,
}

impl From<Notification> for NotificationResponse {
	fn from(value: Notification) -> Self {
		let notification = value.primitive;

		Self {
			id:         notification.id,
			category:   notification.category,
			message:    notification.message,
			created_at: notification.created_at,
			read_at:    notification.read_at,
		}
	}
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationQuery {
	#[serde(default)]
	pub unread_only: bool,
}
