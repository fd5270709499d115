//! Principals supplied by the upstream gateway

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use common::{Error, PrincipalError};
use db::ProfileRole;

/// Header carrying the authenticated profile id
pub const PRINCIPAL_ID_HEADER: &str = "x-campus-user-id";
/// Header carrying the role of the authenticated profile
pub const PRINCIPAL_ROLE_HEADER: &str = "x-campus-user-role";

/// The authenticated caller of a request
///
/// Stored as an [`Extension`](axum::Extension) by the
/// [`AuthLayer`](crate::middleware::AuthLayer), controllers ask for it in
/// their arguments.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Principal {
	pub profile_id: i32,
	pub role:       ProfileRole,
}

impl Principal {
	/// Whether this principal may act on a record owned by `owner`
	#[must_use]
	pub fn owns_or_is_privileged(&self, owner: i32) -> bool {
		self.profile_id == owner || self.role.is_privileged()
	}

	#[must_use]
	pub fn is_admin(&self) -> bool { self.role == ProfileRole::Admin }
}

/// Read the claimed profile id and role from the principal headers
///
/// # Errors
/// Fails if the id header is missing or either header is malformed
pub fn parse_principal_headers(
	headers: &HeaderMap,
) -> Result<(i32, Option<ProfileRole>), PrincipalError> {
	let Some(raw_id) = headers.get(PRINCIPAL_ID_HEADER) else {
		return Err(PrincipalError::MissingPrincipal);
	};

	let profile_id = raw_id
		.to_str()
		.ok()
		.and_then(|id| id.trim().parse::<i32>().ok())
		.ok_or_else(|| {
			PrincipalError::MalformedPrincipal(format!(
				"{PRINCIPAL_ID_HEADER} is not a valid id"
			))
		})?;

	let role = match headers.get(PRINCIPAL_ROLE_HEADER) {
		Some(raw_role) => {
			let role = raw_role
				.to_str()
				.map_err(|e| PrincipalError::MalformedPrincipal(e.to_string()))?
				.trim()
				.parse::<ProfileRole>()
				.map_err(PrincipalError::MalformedPrincipal)?;

			Some(role)
		},
		None => None,
	};

	Ok((profile_id, role))
}

impl<S> FromRequestParts<S> for Principal
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(
		parts: &mut Parts,
		_state: &S,
	) -> Result<Self, Self::Rejection> {
		parts
			.extensions
			.get::<Self>()
			.copied()
			.ok_or_else(|| PrincipalError::MissingPrincipal.into())
	}
}

#[cfg(test)]
mod tests {
	use axum::http::HeaderValue;

	use super::*;

	fn headers(id: Option<&str>, role: Option<&str>) -> HeaderMap {
		let mut headers = HeaderMap::new();

		if let Some(id) = id {
			headers.insert(PRINCIPAL_ID_HEADER, HeaderValue::from_str(id).unwrap());
		}

		if let Some(role) = role {
			headers
				.insert(PRINCIPAL_ROLE_HEADER, HeaderValue::from_str(role).unwrap());
		}

		headers
	}

	#[test]
	fn missing_id_is_missing_principal() {
		let err = parse_principal_headers(&headers(None, Some("admin")));

		assert!(matches!(err, Err(PrincipalError::MissingPrincipal)));
	}

	#[test]
	fn non_numeric_id_is_malformed() {
		let err = parse_principal_headers(&headers(Some("abc"), None));

		assert!(matches!(err, Err(PrincipalError::MalformedPrincipal(_))));
	}

	#[test]
	fn unknown_role_is_malformed() {
		let err = parse_principal_headers(&headers(Some("4"), Some("dean")));

		assert!(matches!(err, Err(PrincipalError::MalformedPrincipal(_))));
	}

	#[test]
	fn role_header_is_optional() {
		let parsed = parse_principal_headers(&headers(Some(" 12 "), None));

		assert_eq!(parsed.unwrap(), (12, None));

		let parsed =
			parse_principal_headers(&headers(Some("12"), Some("faculty")));

		assert_eq!(parsed.unwrap(), (12, Some(ProfileRole::Faculty)));
	}

	#[test]
	fn privileged_roles_may_act_for_others() {
		let student = Principal { profile_id: 1, role: ProfileRole::Student };
		let faculty = Principal { profile_id: 2, role: ProfileRole::Faculty };

		assert!(student.owns_or_is_privileged(1));
		assert!(!student.owns_or_is_privileged(2));
		assert!(faculty.owns_or_is_privileged(1));
	}
}
