use chrono::NaiveDateTime;
use db::{ProfileRole, profile};
use diesel::pg::Pg;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
	Clone, Debug, Deserialize, Identifiable, Queryable, Selectable, Serialize,
)]
#[diesel(table_name = profile)]
#[diesel(check_for_backend(Pg))]
pub struct PrimitiveProfile {
	pub id:         i32,
	pub username:   String,
	pub email:      Option<String>,
	pub role:       ProfileRole,
	pub created_at: NaiveDateTime,
}
