use chrono::NaiveDateTime;
use primitive_waitlist::PrimitiveWaitlistEntry;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use validator::Validate;
use waitlist::WaitlistEntry;

use crate::schemas::validate_window;

#[skip_serializing_none]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistEntryResponse {
	pub id:          i32,
	pub profile_id:  i32,
	pub resource_id: i32,
	pub start_time:  Option<NaiveDateTime>,
	pub end_time:    Option<NaiveDateTime>,
	pub created_at:  NaiveDateTime,
}

impl From<PrimitiveWaitlistEntry> for WaitlistEntryResponse {
	fn from(entry: PrimitiveWaitlistEntry) -> Self {
		Self {
			id:          entry.id,
			profile_id:  entry.profile_id,
			resource_id: entry.resource_id,
			start_time:  entry.start_time,
			end_time:    entry.end_time,
			created_at:  entry.created_at,
		}
	}
}

impl From<WaitlistEntry> for WaitlistEntryResponse {
	fn from(value: WaitlistEntry) -> Self { value.primitive.into() }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_waitlist_window"))]
pub struct CreateWaitlistEntryRequest {
	pub resource_id: i32,
	pub start_time:  Option<NaiveDateTime>,
	pub end_time:    Option<NaiveDateTime>,
}

/// A waiter either names a full window or none at all
fn validate_waitlist_window(
	request: &CreateWaitlistEntryRequest,
) -> Result<(), validator::ValidationError> {
	match (request.start_time, request.end_time) {
		(Some(start), Some(end)) => validate_window(start, end),
		(None, None) => Ok(()),
		_ => {
			Err(validator::ValidationError::new("window").with_message(
				"start and end time must be given together".into(),
			))
		},
	}
}
