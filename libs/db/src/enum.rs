use std::str::FromStr;

use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};

#[derive(
	Clone, Copy, DbEnum, Debug, Default, Deserialize, PartialEq, Eq, Serialize,
)]
#[ExistingTypePath = "crate::sql_types::ProfileRole"]
#[serde(rename_all = "snake_case")]
pub enum ProfileRole {
	#[default]
	Student,
	Faculty,
	Staff,
	Admin,
}

impl ProfileRole {
	/// Whether this role may see every booking and override bookings
	#[must_use]
	pub fn is_privileged(self) -> bool {
		matches!(self, Self::Faculty | Self::Admin)
	}
}

impl FromStr for ProfileRole {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"student" => Ok(Self::Student),
			"faculty" => Ok(Self::Faculty),
			"staff" => Ok(Self::Staff),
			"admin" => Ok(Self::Admin),
			_ => Err(format!("unknown role '{s}'")),
		}
	}
}

#[derive(
	Clone, Copy, DbEnum, Debug, Default, Deserialize, PartialEq, Eq, Serialize,
)]
#[ExistingTypePath = "crate::sql_types::ResourceStatus"]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
	#[default]
	Active,
	UnderMaintenance,
	Closed,
}

#[derive(
	Clone, Copy, DbEnum, Debug, Default, Deserialize, PartialEq, Eq, Serialize,
)]
#[ExistingTypePath = "crate::sql_types::BookingRequestStatus"]
#[serde(rename_all = "snake_case")]
pub enum BookingRequestStatus {
	#[default]
	Pending,
	Approved,
	Rejected,
}

impl BookingRequestStatus {
	#[must_use]
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Pending => "pending",
			Self::Approved => "approved",
			Self::Rejected => "rejected",
		}
	}
}

#[derive(
	Clone, Copy, DbEnum, Debug, Default, Deserialize, PartialEq, Eq, Serialize,
)]
#[ExistingTypePath = "crate::sql_types::BookingStatus"]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
	#[default]
	Active,
	Completed,
	Cancelled,
}

impl BookingStatus {
	#[must_use]
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Active => "active",
			Self::Completed => "completed",
			Self::Cancelled => "cancelled",
		}
	}
}

/// Priority recorded on a booking request
///
/// Stored for tie-breaking between requesters, nothing reads it back yet
#[derive(
	Clone, Copy, DbEnum, Debug, Default, Deserialize, PartialEq, Eq, Serialize,
)]
#[ExistingTypePath = "crate::sql_types::BookingPriority"]
#[serde(rename_all = "snake_case")]
pub enum BookingPriority {
	#[default]
	Student,
	Faculty,
}

impl From<ProfileRole> for BookingPriority {
	fn from(role: ProfileRole) -> Self {
		match role {
			ProfileRole::Faculty => Self::Faculty,
			_ => Self::Student,
		}
	}
}

#[derive(
	Clone, Copy, DbEnum, Debug, Default, Deserialize, PartialEq, Eq, Serialize,
)]
#[ExistingTypePath = "crate::sql_types::NotificationCategory"]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
	#[default]
	Booking,
	Waitlist,
	Reminder,
	Admin,
}
