use chrono::NaiveDateTime;
use db::{NotificationCategory, notification};
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = notification)]
#[diesel(check_for_backend(Pg))]
pub struct PrimitiveNotification {
	pub id:         i32,
	pub profile_id: i32,
	pub category:   NotificationCategory,
	pub message:    String,
	pub created_at: NaiveDateTime,
	pub read_at:    Option<NaiveDateTime>,
}
