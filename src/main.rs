#[macro_use]
extern crate tracing;

use campus_booking::notifier::Notifier;
use campus_booking::scheduler::ReminderScheduler;
use campus_booking::{AppState, Config, routes};
use tokio::net::TcpListener;
use tokio::signal;
use tokio::signal::unix::SignalKind;

#[tokio::main]
async fn main() {
	// Load the configuration from the environment,
	// and create a database pool.
	let config = Config::from_env();

	// Set up the tracing subscriber.
	// This will print out all logs to the console.
	tracing_subscriber::fmt()
		.pretty()
		.with_thread_names(true)
		.with_max_level(config.log_level)
		.init();

	let database_pool = config.create_database_pool();

	let stub_inbox = config.create_stub_inbox();

	let notifier = Notifier::new(&config, database_pool.clone(), stub_inbox);

	// Start the reminder sweep in the background, the admin endpoint shares
	// its guard through the app state.
	let reminders = ReminderScheduler::new(
		database_pool.clone(),
		notifier.clone(),
		config.reminder_lead,
	);
	reminders.clone().spawn(config.reminder_interval);

	let bind_address = config.bind_address.clone();

	// Create the app router and listener.
	let router = routes::get_app_router(AppState {
		config,
		database_pool,
		notifier,
		reminders,
	});

	let listener = TcpListener::bind(&bind_address).await.unwrap();

	// Start the server.
	debug!("listening on {}", listener.local_addr().unwrap());
	axum::serve(listener, router)
		.with_graceful_shutdown(shutdown_handler())
		.await
		.unwrap();
}

/// Gracefully shutdown the server on SIGINT or SIGTERM.
async fn shutdown_handler() {
	let ctrl_c = async {
		signal::ctrl_c().await.expect("COULD NOT INSTALL CTRL+C HANDLER");
	};

	let terminate = async {
		signal::unix::signal(SignalKind::terminate())
			.expect("COULD NOT INSTALL TERMINATE SIGNAL HANDLER")
			.recv()
			.await;
	};

	tokio::select! {
		() = ctrl_c => {},
		() = terminate => {},
	}
}
