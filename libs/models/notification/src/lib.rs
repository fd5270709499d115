#[macro_use]
extern crate tracing;

use chrono::NaiveDateTime;
use common::{DbConn, Error};
use db::{NotificationCategory, notification};
use diesel::pg::Pg;
use diesel::prelude::*;
use primitive_notification::PrimitiveNotification;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Notification {
	pub primitive: PrimitiveNotification,
}

impl Notification {
	/// Get all notifications of a profile, newest first
	#[instrument(skip(conn))]
	pub async fn for_profile(
		p_id: i32,
		unread_only: bool,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let notifications = conn
			.interact(move |conn| {
				use self::notification::dsl::*;

				let mut query = notification
					.filter(profile_id.eq(p_id))
					.select(PrimitiveNotification::as_select())
					.order((created_at.desc(), id.desc()))
					.into_boxed();

				if unread_only {
					query = query.filter(read_at.is_null());
				}

				query.get_results(conn)
			})
			.await??
			.into_iter()
			.map(|primitive| Self { primitive })
			.collect();

		Ok(notifications)
	}

	/// Mark a single notification of a profile as read
	///
	/// Reading an already read notification keeps its original timestamp.
	#[instrument(skip(conn))]
	pub async fn mark_read(
		n_id: i32,
		p_id: i32,
		now: NaiveDateTime,
		conn: &DbConn,
	) -> Result<Self, Error> {
		let notif = conn
			.interact(move |conn| {
				use self::notification::dsl::*;

				diesel::update(
					notification
						.find(n_id)
						.filter(profile_id.eq(p_id))
						.filter(read_at.is_null()),
				)
				.set(read_at.eq(Some(now)))
				.execute(conn)?;

				notification
					.find(n_id)
					.filter(profile_id.eq(p_id))
					.select(PrimitiveNotification::as_select())
					.get_result(conn)
					.optional()
			})
			.await??
			.ok_or_else(|| {
				Error::NotFound(format!("notification with id {n_id}"))
			})?;

		Ok(Self { primitive: notif })
	}

	/// Mark every unread notification of a profile as read
	#[instrument(skip(conn))]
	pub async fn mark_all_read(
		p_id: i32,
		now: NaiveDateTime,
		conn: &DbConn,
	) -> Result<usize, Error> {
		let count = conn
			.interact(move |conn| {
				use self::notification::dsl::*;

				diesel::update(
					notification
						.filter(profile_id.eq(p_id))
						.filter(read_at.is_null()),
				)
				.set(read_at.eq(Some(now)))
				.execute(conn)
			})
			.await??;

		Ok(count)
	}

	/// Delete a notification owned by a profile
	#[instrument(skip(conn))]
	pub async fn delete_by_id(
		n_id: i32,
		p_id: i32,
		conn: &DbConn,
	) -> Result<(), Error> {
		let deleted = conn
			.interact(move |conn| {
				use self::notification::dsl::*;

				diesel::delete(
					notification.find(n_id).filter(profile_id.eq(p_id)),
				)
				.execute(conn)
			})
			.await??;

		if deleted == 0 {
			return Err(Error::NotFound(format!(
				"notification with id {n_id}"
			)));
		}

		Ok(())
	}
}

#[derive(Clone, Debug, Deserialize, Insertable, Serialize)]
#[diesel(table_name = notification)]
#[diesel(check_for_backend(Pg))]
pub struct NewNotification {
	pub profile_id: i32,
	pub category:   NotificationCategory,
	pub message:    String,
}

impl NewNotification {
	/// Insert this [`NewNotification`] into a profile's inbox
	#[instrument(skip(conn))]
	pub async fn insert(self, conn: &DbConn) -> Result<Notification, Error> {
		let notif = conn
			.interact(|conn| {
				use self::notification::dsl::*;

				diesel::insert_into(notification)
					.values(self)
					.returning(PrimitiveNotification::as_returning())
					.get_result(conn)
			})
			.await??;

		debug!("stored notification {notif:?}");

		Ok(Notification { primitive: notif })
	}
}
