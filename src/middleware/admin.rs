use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use common::Error;
use db::ProfileRole;
use tower::{Layer, Service};

use crate::principal::Principal;

/// Only lets requests through whose principal is an admin
///
/// Must be layered inside an [`AuthLayer`](crate::middleware::AuthLayer)
#[derive(Clone, Copy, Debug, Default)]
pub struct AdminLayer;

/// Only lets requests through whose principal is faculty or an admin
///
/// Must be layered inside an [`AuthLayer`](crate::middleware::AuthLayer)
#[derive(Clone, Copy, Debug, Default)]
pub struct PrivilegedLayer;

impl<S> Layer<S> for AdminLayer {
	type Service = RoleMiddleware<S>;

	fn layer(&self, inner: S) -> Self::Service {
		RoleMiddleware { inner, allows: |role| role == ProfileRole::Admin }
	}
}

impl<S> Layer<S> for PrivilegedLayer {
	type Service = RoleMiddleware<S>;

	fn layer(&self, inner: S) -> Self::Service {
		RoleMiddleware { inner, allows: ProfileRole::is_privileged }
	}
}

#[derive(Clone)]
pub struct RoleMiddleware<S> {
	inner:  S,
	allows: fn(ProfileRole) -> bool,
}

impl<S> Service<Request<Body>> for RoleMiddleware<S>
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
	fn call(&mut self, req: Request<Body>) -> Self::Future {
		let cloned_inner = self.inner.clone();
		let mut inner = std::mem::replace(&mut self.inner, cloned_inner);

		let allows = self.allows;

		Box::pin(async move {
			let Some(principal) = req.extensions().get::<Principal>() else {
				debug!("principal not found in request extensions");

				return Ok(Error::Forbidden.into_response());
			};

			if !allows(principal.role) {
				debug!(
					"profile {} with role {:?} denied",
					principal.profile_id, principal.role
				);

				return Ok(Error::Forbidden.into_response());
			}

			inner.call(req).await
		})
	}
}
