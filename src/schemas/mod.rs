use chrono::NaiveDateTime;
use validator::ValidationError;

pub mod booking;
pub mod booking_request;
pub mod notification;
pub mod resource;
pub mod waitlist;

/// Check that a time window ends strictly after it starts
fn validate_window(
	start_time: NaiveDateTime,
	end_time: NaiveDateTime,
) -> Result<(), ValidationError> {
	if end_time <= start_time {
		return Err(ValidationError::new("window")
			.with_message("end time must be after start time".into()));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use chrono::NaiveDate;

	use super::*;

	#[test]
	fn empty_and_inverted_windows_are_rejected() {
		let day = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
		let ten = day.and_hms_opt(10, 0, 0).unwrap();
		let eleven = day.and_hms_opt(11, 0, 0).unwrap();

		assert!(validate_window(ten, eleven).is_ok());
		assert!(validate_window(ten, ten).is_err());
		assert!(validate_window(eleven, ten).is_err());
	}
}
