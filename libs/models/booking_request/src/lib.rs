#[macro_use]
extern crate tracing;

use booking::{Booking, NewBooking, check_bookable_in};
use chrono::NaiveDateTime;
use common::{DbConn, Error};
use db::{BookingPriority, BookingRequestStatus, booking_request};
use diesel::pg::Pg;
use diesel::prelude::*;
use primitive_booking::PrimitiveBooking;
use primitive_booking_request::PrimitiveBookingRequest;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct BookingRequest {
	pub primitive: PrimitiveBookingRequest,
}

/// A request that was approved together with the booking it produced
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovedRequest {
	pub request: PrimitiveBookingRequest,
	pub booking: PrimitiveBooking,
}

impl BookingRequest {
	/// Get a [`BookingRequest`] given its id
	#[instrument(skip(conn))]
	pub async fn get_by_id(r_id: i32, conn: &DbConn) -> Result<Self, Error> {
		let primitive = PrimitiveBookingRequest::get_by_id(r_id, conn)
			.await
			.map_err(|e| {
				match e {
					Error::NotFound(_) => {
						Error::NotFound(format!("booking request with id {r_id}"))
					},
					e => e,
				}
			})?;

		Ok(Self { primitive })
	}

	/// Get all [`BookingRequest`]s, optionally only those in one status,
	/// oldest first
	#[instrument(skip(conn))]
	pub async fn get_all(
		req_status: Option<BookingRequestStatus>,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let requests = conn
			.interact(move |conn| {
				use self::booking_request::dsl::*;

				let mut query = booking_request
					.select(PrimitiveBookingRequest::as_select())
					.order((created_at.asc(), id.asc()))
					.into_boxed();

				if let Some(req_status) = req_status {
					query = query.filter(status.eq(req_status));
				}

				query.get_results(conn)
			})
			.await??
			.into_iter()
			.map(|primitive| Self { primitive })
			.collect();

		Ok(requests)
	}

	/// Get all [`BookingRequest`]s made by a profile, newest first
	#[instrument(skip(conn))]
	pub async fn for_profile(
		p_id: i32,
		conn: &DbConn,
	) -> Result<Vec<Self>, Error> {
		let requests = conn
			.interact(move |conn| {
				use self::booking_request::dsl::*;

				booking_request
					.filter(profile_id.eq(p_id))
					.order((created_at.desc(), id.desc()))
					.select(PrimitiveBookingRequest::as_select())
					.get_results(conn)
			})
			.await??
			.into_iter()
			.map(|primitive| Self { primitive })
			.collect();

		Ok(requests)
	}

	/// Approve a pending request and create its booking
	///
	/// The resource is locked and both booking gates run again, a request
	/// that sat in the queue may have lost its window or its resource in the
	/// meantime. Returns `None` if no request with this id exists.
	///
	/// # Errors
	/// Fails if the request was already reviewed or can no longer be booked
	pub fn approve_in(
		conn: &mut PgConnection,
		r_id: i32,
		reviewer: Option<i32>,
		now: NaiveDateTime,
	) -> Result<Option<ApprovedRequest>, Error> {
		use self::booking_request::dsl::*;

		let Some(request) = booking_request
			.find(r_id)
			.for_update()
			.select(PrimitiveBookingRequest::as_select())
			.get_result(conn)
			.optional()?
		else {
			return Ok(None);
		};

		request.ensure_pending()?;

		Booking::reconcile_expired_in(conn, now)?;

		check_bookable_in(
			conn,
			request.resource_id,
			request.start_time,
			request.end_time,
			now,
		)?;

		let request = diesel::update(booking_request.find(r_id))
			.set((
				status.eq(BookingRequestStatus::Approved),
				reviewed_by.eq(reviewer),
				reviewed_at.eq(Some(now)),
			))
			.returning(PrimitiveBookingRequest::as_returning())
			.get_result(conn)?;

		let booking = NewBooking {
			request_id:  Some(request.id),
			resource_id: request.resource_id,
			profile_id:  request.profile_id,
			start_time:  request.start_time,
			end_time:    request.end_time,
		}
		.insert_in(conn)?;

		Ok(Some(ApprovedRequest { request, booking }))
	}

	/// Approve a pending request on behalf of a reviewer
	#[instrument(skip(conn))]
	pub async fn approve(
		r_id: i32,
		reviewer: i32,
		now: NaiveDateTime,
		conn: &DbConn,
	) -> Result<Option<ApprovedRequest>, Error> {
		let approved = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(|conn| {
					Self::approve_in(conn, r_id, Some(reviewer), now)
				})
			})
			.await??;

		if let Some(approved) = &approved {
			info!(
				"request {} approved by {reviewer}, created booking {}",
				approved.request.id, approved.booking.id
			);
		}

		Ok(approved)
	}

	/// Reject a pending request, no booking is created
	///
	/// Returns `None` if no request with this id exists.
	#[instrument(skip(conn))]
	pub async fn reject(
		r_id: i32,
		reviewer: i32,
		now: NaiveDateTime,
		conn: &DbConn,
	) -> Result<Option<Self>, Error> {
		let rejected = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(|conn| {
					use self::booking_request::dsl::*;

					let Some(request) = booking_request
						.find(r_id)
						.for_update()
						.select(PrimitiveBookingRequest::as_select())
						.get_result(conn)
						.optional()?
					else {
						return Ok(None);
					};

					request.ensure_pending()?;

					let request = diesel::update(booking_request.find(r_id))
						.set((
							status.eq(BookingRequestStatus::Rejected),
							reviewed_by.eq(Some(reviewer)),
							reviewed_at.eq(Some(now)),
						))
						.returning(PrimitiveBookingRequest::as_returning())
						.get_result(conn)?;

					Ok(Some(request))
				})
			})
			.await??;

		if rejected.is_some() {
			info!("request {r_id} rejected by {reviewer}");
		}

		Ok(rejected.map(|primitive| Self { primitive }))
	}
}

#[derive(Clone, Debug, Deserialize, Insertable, Serialize)]
#[diesel(table_name = booking_request)]
#[diesel(check_for_backend(Pg))]
pub struct NewBookingRequest {
	pub profile_id:  i32,
	pub resource_id: i32,
	pub start_time:  NaiveDateTime,
	pub end_time:    NaiveDateTime,
	pub purpose:     String,
	pub priority:    BookingPriority,
}

impl NewBookingRequest {
	/// Insert this request as pending after the resource status and the
	/// window availability were checked under the resource lock
	fn submit_in(
		self,
		conn: &mut PgConnection,
		now: NaiveDateTime,
	) -> Result<PrimitiveBookingRequest, Error> {
		use self::booking_request::dsl::*;

		Booking::reconcile_expired_in(conn, now)?;

		check_bookable_in(
			conn,
			self.resource_id,
			self.start_time,
			self.end_time,
			now,
		)?;

		let request = diesel::insert_into(booking_request)
			.values(self)
			.returning(PrimitiveBookingRequest::as_returning())
			.get_result(conn)?;

		Ok(request)
	}

	/// Submit this request for manual review
	#[instrument(skip(conn))]
	pub async fn submit(
		self,
		now: NaiveDateTime,
		conn: &DbConn,
	) -> Result<BookingRequest, Error> {
		let request = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(|conn| self.submit_in(conn, now))
			})
			.await??;

		info!("submitted booking request {request:?}");

		Ok(BookingRequest { primitive: request })
	}

	/// Submit this request and approve it straight away
	///
	/// Creating and approving happen in one transaction, either both the
	/// approved request and its booking exist afterwards or neither does.
	#[instrument(skip(conn))]
	pub async fn book_instantly(
		self,
		now: NaiveDateTime,
		conn: &DbConn,
	) -> Result<ApprovedRequest, Error> {
		let approved = conn
			.interact(move |conn| {
				conn.transaction::<_, Error, _>(|conn| {
					let request = self.submit_in(conn, now)?;

					BookingRequest::approve_in(conn, request.id, None, now)?
						.ok_or_else(|| {
							Error::Infallible(format!(
								"booking request {} vanished during approval",
								request.id
							))
						})
				})
			})
			.await??;

		info!(
			"booked resource {} instantly for profile {}, booking {}",
			approved.booking.resource_id,
			approved.booking.profile_id,
			approved.booking.id
		);

		Ok(approved)
	}
}
