use axum::Router;
use axum::routing::{delete, get, post};
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::controllers::admin::{reconcile_bookings, sweep_reminders};
use crate::controllers::booking::{
	cancel_booking,
	create_booking,
	get_all_bookings,
	get_my_bookings,
	override_booking,
	override_window,
};
use crate::controllers::booking_request::{
	approve_booking_request,
	get_booking_request,
	get_booking_requests,
	get_my_booking_requests,
	reject_booking_request,
	submit_booking_request,
};
use crate::controllers::healthcheck;
use crate::controllers::notification::{
	delete_notification,
	get_my_notifications,
	read_all_notifications,
	read_notification,
};
use crate::controllers::resource::{
	check_resource_availability,
	create_resource,
	delete_resource,
	get_resource,
	get_resource_waitlist,
	get_resources,
	update_resource,
	update_resource_status,
};
use crate::controllers::waitlist::{
	get_my_waitlist_entries,
	join_waitlist,
	leave_waitlist,
};
use crate::middleware::{AdminLayer, AuthLayer, PrivilegedLayer};

/// Get the app router
pub fn get_app_router(state: AppState) -> Router {
	let api_routes = Router::new()
		.route("/healthcheck", get(healthcheck))
		.nest("/resources", resource_routes(&state))
		.nest("/bookings", booking_routes(&state))
		.nest("/booking-requests", booking_request_routes(&state))
		.nest("/waitlist", waitlist_routes(&state))
		.nest("/notifications", notification_routes(&state))
		.nest("/admin", admin_routes(&state));

	Router::new()
		.merge(api_routes)
		.layer(
			ServiceBuilder::new()
				.layer(TraceLayer::new_for_http())
				.layer(TimeoutLayer::new(state.config.request_timeout))
				.layer(CompressionLayer::new()),
		)
		.with_state(state)
}

/// Resource routes, writes are admin only
fn resource_routes(state: &AppState) -> Router<AppState> {
	let protected = Router::new()
		.route("/", post(create_resource))
		.route("/{id}", delete(delete_resource).patch(update_resource))
		.route("/{id}/status", post(update_resource_status))
		.route("/{id}/waitlist", get(get_resource_waitlist))
		.route_layer(AdminLayer);

	Router::new()
		.route("/", get(get_resources))
		.route("/{id}", get(get_resource))
		.route("/{id}/availability", get(check_resource_availability))
		.merge(protected)
		.route_layer(AuthLayer::new(state.clone()))
}

/// Booking routes, listing everything and overrides are faculty or admin only
fn booking_routes(state: &AppState) -> Router<AppState> {
	let privileged = Router::new()
		.route("/", get(get_all_bookings))
		.route("/override", post(override_window))
		.route("/{id}/override", post(override_booking))
		.route_layer(PrivilegedLayer);

	Router::new()
		.route("/", post(create_booking))
		.route("/me", get(get_my_bookings))
		.route("/{id}/cancel", post(cancel_booking))
		.merge(privileged)
		.route_layer(AuthLayer::new(state.clone()))
}

/// Booking request routes, reviewing is admin only
fn booking_request_routes(state: &AppState) -> Router<AppState> {
	let protected = Router::new()
		.route("/", get(get_booking_requests))
		.route("/{id}/approve", post(approve_booking_request))
		.route("/{id}/reject", post(reject_booking_request))
		.route_layer(AdminLayer);

	Router::new()
		.route("/", post(submit_booking_request))
		.route("/me", get(get_my_booking_requests))
		.route("/{id}", get(get_booking_request))
		.merge(protected)
		.route_layer(AuthLayer::new(state.clone()))
}

/// Waitlist routes
fn waitlist_routes(state: &AppState) -> Router<AppState> {
	Router::new()
		.route("/", post(join_waitlist))
		.route("/me", get(get_my_waitlist_entries))
		.route("/{id}", delete(leave_waitlist))
		.route_layer(AuthLayer::new(state.clone()))
}

/// Notification inbox routes
fn notification_routes(state: &AppState) -> Router<AppState> {
	Router::new()
		.route("/me", get(get_my_notifications))
		.route("/read-all", post(read_all_notifications))
		.route("/{id}/read", post(read_notification))
		.route("/{id}", delete(delete_notification))
		.route_layer(AuthLayer::new(state.clone()))
}

/// Maintenance routes
fn admin_routes(state: &AppState) -> Router<AppState> {
	Router::new()
		.route("/bookings/reconcile", post(reconcile_bookings))
		.route("/reminders/sweep", post(sweep_reminders))
		.route_layer(AdminLayer)
		.route_layer(AuthLayer::new(state.clone()))
}
