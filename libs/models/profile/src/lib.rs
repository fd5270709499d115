#[macro_use]
extern crate tracing;

use common::{DbConn, Error};
use db::{ProfileRole, profile};
use diesel::pg::Pg;
use diesel::prelude::*;
use primitive_profile::PrimitiveProfile;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Profile {
	pub profile: PrimitiveProfile,
}

impl Profile {
	/// Get a [`Profile`] given its id, if it exists
	#[instrument(skip(conn))]
	pub async fn find_by_id(
		p_id: i32,
		conn: &DbConn,
	) -> Result<Option<Self>, Error> {
		let profile = conn
			.interact(move |conn| {
				use self::profile::dsl::*;

				profile
					.find(p_id)
					.select(PrimitiveProfile::as_select())
					.get_result(conn)
					.optional()
			})
			.await??;

		Ok(profile.map(|profile| Self { profile }))
	}

	/// Get every [`Profile`] holding the given role
	#[instrument(skip(conn))]
	pub async fn get_by_role(
		p_role: ProfileRole,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let profiles = conn
			.interact(move |conn| {
				use self::profile::dsl::*;

				profile
					.filter(role.eq(p_role))
					.order(id.asc())
					.select(PrimitiveProfile::as_select())
					.get_results(conn)
			})
			.await??
			.into_iter()
			.map(|profile| Self { profile })
			.collect();

		Ok(profiles)
	}
}

#[derive(Clone, Debug, Deserialize, Insertable, Serialize)]
#[diesel(table_name = profile)]
#[diesel(check_for_backend(Pg))]
pub struct NewProfile {
	pub username: String,
	pub email:    Option<String>,
	pub role:     ProfileRole,
}

impl NewProfile {
	/// Insert this [`NewProfile`]
	#[instrument(skip(conn))]
	pub async fn insert(self, conn: &DbConn) -> Result<Profile, Error> {
		let profile = conn
			.interact(|conn| {
				use self::profile::dsl::*;

				diesel::insert_into(profile)
					.values(self)
					.returning(PrimitiveProfile::as_returning())
					.get_result(conn)
			})
			.await??;

		info!("created profile {profile:?}");

		Ok(Profile { profile })
	}
}
