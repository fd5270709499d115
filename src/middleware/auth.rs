//! Middleware to resolve the gateway principal and store it on the request

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::extract::Request;
use axum::http::{HeaderMap, Response};
use axum::response::IntoResponse;
use common::{Error, PrincipalError};
use profile::Profile;
use tower::{Layer, Service};

use crate::AppState;
use crate::principal::{Principal, parse_principal_headers};

/// Middleware layer that guarantees a request carries a principal belonging
/// to a known profile
///
/// The gateway in front of this service authenticates callers and forwards
/// their id and role as headers. The stored role of the profile is
/// authoritative, a role header that disagrees with it is rejected.
///
/// The resolved [`Principal`] is stored as an
/// [`Extension`](axum::Extension)
#[derive(Clone)]
pub struct AuthLayer {
	state: AppState,
}

impl AuthLayer {
	#[must_use]
	pub fn new(state: AppState) -> Self { Self { state } }
}

impl<S> Layer<S> for AuthLayer {
	type Service = AuthMiddleware<S>;

	fn layer(&self, inner: S) -> Self::Service {
		AuthMiddleware { inner, state: self.state.clone() }
	}
}

#[derive(Clone)]
pub struct AuthMiddleware<S> {
	inner: S,
	state: AppState,
}

impl<S> AuthMiddleware<S> {
	async fn resolve(
		headers: &HeaderMap,
		state: &AppState,
	) -> Result<Principal, Error> {
		let (profile_id, claimed_role) = parse_principal_headers(headers)?;

		let conn = state.database_pool.get().await?;

		let Some(profile) = Profile::find_by_id(profile_id, &conn).await? else {
			warn!("got request for unknown profile {profile_id}");

			return Err(PrincipalError::UnknownProfile(profile_id).into());
		};

		let role = profile.profile.role;

		if let Some(claimed_role) = claimed_role
			&& claimed_role != role
		{
			warn!(
				"profile {profile_id} claimed role {claimed_role:?} but holds \
				 {role:?}"
			);

			return Err(PrincipalError::MalformedPrincipal(
				"role does not match profile".to_string(),
			)
			.into());
		}

		Ok(Principal { profile_id, role })
	}
}

impl<S> Service<Request<Body>> for AuthMiddleware<S>
where
	S: Service<Request, Response = Response<Body>> + Clone + Send + 'static,
	S::Future: Send + 'static,
{
	type Error = S::Error;
	type Future = Pin<
		Box<
			dyn Future<Output = Result<Self::Response, Self::Error>>
				+ Send
				+ 'static,
		>,
	>;
	type Response = S::Response;

	fn poll_ready(
		&mut self,
		cx: &mut Context<'_>,
	) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	#[instrument(skip_all)]
	fn call(&mut self, mut req: Request<Body>) -> Self::Future {
		let cloned_inner = self.inner.clone();
		let mut inner = std::mem::replace(&mut self.inner, cloned_inner);

		let state = self.state.clone();

		Box::pin(async move {
			let headers = req.headers().clone();

			let principal = match Self::resolve(&headers, &state).await {
				Ok(p) => p,
				Err(e) => return Ok(e.into_response()),
			};

			req.extensions_mut().insert(principal);

			inner.call(req).await
		})
	}
}
