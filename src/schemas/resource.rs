use chrono::{NaiveDateTime, Utc};
use db::ResourceStatus;
use resource::{NewResource, Resource, ResourceUpdate};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use validator::Validate;

use crate::schemas::validate_window;

#[skip_serializing_none]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceResponse {
	pub id:                 i32,
	pub name:               String,
	pub resource_type:      String,
	pub building:           String,
	pub room:               Option<String>,
	pub capacity:           i32,
	pub description:        Option<String>,
	pub status:             ResourceStatus,
	pub maintenance_set_by: Option<i32>,
	pub maintenance_set_at: Option<NaiveDateTime>,
	pub created_at:         NaiveDateTime,
	pub updated_at:         NaiveDateTime,
}

impl From<Resource> for ResourceResponse {
	fn from(value: Resource) -> Self {
		let resource = value.primitive;

		Self {
			id:                 resource.id,
			name:               resource.name,
			resource_type:      resource.resource_type,
			building:           resource.building,
			room:               resource.room,
			capacity:           resource.capacity,
			description:        resource.description,
			status:             resource.status,
			maintenance_set_by: resource.maintenance_set_by,
			maintenance_set_at: resource.maintenance_set_at,
			created_at:         resource.created_at,
			updated_at:         resource.updated_at,
		}
	}
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateResourceRequest {
	#[validate(length(
		min = 1,
		max = 128,
		message = "name must be between 1 and 128 characters long",
		code = "name-length"
	))]
	pub name:          String,
	#[validate(length(
		min = 1,
		max = 64,
		message = "resource type must be between 1 and 64 characters long",
		code = "resource-type-length"
	))]
	pub resource_type: String,
	#[validate(length(
		min = 1,
		max = 128,
		message = "building must be between 1 and 128 characters long",
		code = "building-length"
	))]
	pub building:      String,
	pub room:          Option<String>,
	#[validate(range(
		min = 1,
		message = "capacity must be positive",
		code = "capacity-range"
	))]
	pub capacity:      i32,
	pub description:   Option<String>,
	pub status:        Option<ResourceStatus>,
}

impl From<CreateResourceRequest> for NewResource {
	fn from(value: CreateResourceRequest) -> Self {
		Self {
			name:          value.name,
			resource_type: value.resource_type,
			building:      value.building,
			room:          value.room,
			capacity:      value.capacity,
			description:   value.description,
			status:        value.status.unwrap_or_default(),
		}
	}
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResourceRequest {
	#[validate(length(
		min = 1,
		max = 128,
		message = "name must be between 1 and 128 characters long",
		code = "name-length"
	))]
	pub name:          Option<String>,
	#[validate(length(
		min = 1,
		max = 64,
		message = "resource type must be between 1 and 64 characters long",
		code = "resource-type-length"
	))]
	pub resource_type: Option<String>,
	#[validate(length(
		min = 1,
		max = 128,
		message = "building must be between 1 and 128 characters long",
		code = "building-length"
	))]
	pub building:      Option<String>,
	/// `null` clears the room, leaving it out keeps the current one
	#[serde(default, with = "::serde_with::rust::double_option")]
	pub room:          Option<Option<String>>,
	#[validate(range(
		min = 1,
		message = "capacity must be positive",
		code = "capacity-range"
	))]
	pub capacity:      Option<i32>,
	#[serde(default, with = "::serde_with::rust::double_option")]
	pub description:   Option<Option<String>>,
}

impl From<UpdateResourceRequest> for ResourceUpdate {
	fn from(value: UpdateResourceRequest) -> Self {
		Self {
			name:          value.name,
			resource_type: value.resource_type,
			building:      value.building,
			room:          value.room,
			capacity:      value.capacity,
			description:   value.description,
			updated_at:    Utc::now().naive_utc(),
		}
	}
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResourceStatusRequest {
	pub status: ResourceStatus,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_availability_query"))]
pub struct AvailabilityQuery {
	pub start_time: NaiveDateTime,
	pub end_time:   NaiveDateTime,
}

fn validate_availability_query(
	query: &AvailabilityQuery,
) -> Result<(), validator::ValidationError> {
	validate_window(query.start_time, query.end_time)
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
	pub resource_id: i32,
	pub start_time:  NaiveDateTime,
	pub end_time:    NaiveDateTime,
	pub available:   bool,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn blank_names_and_zero_capacity_are_rejected() {
		let request = CreateResourceRequest {
			name:          String::new(),
			resource_type: "room".to_string(),
			building:      "Plateau".to_string(),
			room:          None,
			capacity:      0,
			description:   None,
			status:        None,
		};

		let errors = request.validate().unwrap_err();
		let fields = errors.field_errors();

		assert!(fields.contains_key("name"));
		assert!(fields.contains_key("capacity"));
		assert!(!fields.contains_key("building"));
	}

	#[test]
	fn empty_update_is_valid() {
		assert!(UpdateResourceRequest::default().validate().is_ok());
	}

	#[test]
	fn null_clears_and_absent_keeps_optional_fields() {
		let request: UpdateResourceRequest =
			serde_json::from_str(r#"{ "room": null }"#).unwrap();

		assert_eq!(request.room, Some(None));
		assert_eq!(request.description, None);

		let request: UpdateResourceRequest =
			serde_json::from_str(r#"{ "description": "Quiet" }"#).unwrap();

		assert_eq!(request.room, None);
		assert_eq!(request.description, Some(Some("Quiet".to_string())));
	}
}
