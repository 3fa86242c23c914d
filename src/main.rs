#![warn(clippy::pedantic)]

mod config;
mod error;
mod extract;
mod images;
mod openapi;
mod ratelimit;
mod route;
mod token;

use std::sync::Arc;

use aide::{
	axum::{routing::get, ApiRouter},
	openapi::OpenApi,
};
use axum::{
	http::{header, HeaderValue, Method},
	Extension, Router,
};
use tower::ServiceBuilder;
use tower_http::{
	compression::CompressionLayer,
	cors::CorsLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	services::{ServeDir, ServeFile},
	trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub use error::AppError;

use config::Config;
use images::ImageService;

pub type Database = sqlx::Pool<sqlx::Postgres>;
pub type AppState = State;

/// The shared application state.
///
/// This should contain all shared dependencies that handlers need to access,
/// such as a database connection pool, the runtime configuration, or
/// clients for the external collaborators.
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub database: Database,
	pub config: Arc<Config>,
	pub http: reqwest::Client,
	pub images: ImageService,
}

/// Builds the application router around the shared state.
///
/// Everything except the rate limiter lives here; the limiter keys on
/// the peer address, which only exists on a real socket, so `main`
/// layers it on top.
fn app(state: State) -> Router {
	let mut api = OpenApi::default();

	let cors = CorsLayer::new()
		.allow_origin(
			state
				.config
				.frontend_url
				.parse::<HeaderValue>()
				.expect("FRONTEND_URL must be a valid origin"),
		)
		.allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
		.allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
		.allow_credentials(true);

	ApiRouter::new()
		.nest("/auth", route::auth::routes())
		.nest("/api/blogs", route::blog::routes())
		.nest("/api/users", route::user::routes())
		.nest("/api/upload", route::upload::routes())
		.nest("/docs", route::docs::routes())
		.route("/health", get(health))
		.finish_api_with(&mut api, openapi::docs)
		.layer(Extension(Arc::new(api)))
		.fallback_service(
			// The single-page client owns every unmatched path.
			ServeDir::new("public").not_found_service(ServeFile::new("public/index.html")),
		)
		.layer(
			ServiceBuilder::new()
				.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
				.layer(PropagateRequestIdLayer::x_request_id())
				.layer(TraceLayer::new_for_http())
				.layer(CompressionLayer::new())
				.layer(cors),
		)
		.with_state(state)
}

/// Liveness probe.
async fn health() -> extract::Json<serde_json::Value> {
	extract::Json(serde_json::json!({ "status": "OK", "message": "Blog API is running" }))
}

#[tokio::main]
async fn main() {
	dotenvy::dotenv().ok();

	tracing_subscriber::registry()
		.with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.with(tracing_subscriber::fmt::layer().with_ansi(true))
		.init();

	let config = Arc::new(Config::from_env());

	let database = Database::connect(&config.database_url)
		.await
		.expect("failed to connect to database");

	sqlx::migrate!()
		.run(&database)
		.await
		.expect("failed to run migrations");

	let http = reqwest::Client::new();
	let state = State {
		images: ImageService::new(http.clone(), config.images.clone()),
		database,
		http,
		config: config.clone(),
	};

	let governor = ratelimit::default();
	ratelimit::cleanup_old_limits(&[&governor]);

	let app = app(state).layer(tower_governor::GovernorLayer { config: governor });

	let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
		.await
		.expect("failed to bind to port");

	tracing::info!("listening on port {}", config.port);

	axum::serve(
		listener,
		app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
	)
	.await
	.unwrap();
}

#[cfg(test)]
pub mod test {
	pub use axum_test::TestServer;
	pub use serde_json::json;

	use std::sync::Arc;

	use crate::{config, images::ImageService, Database, State};

	pub fn config() -> config::Config {
		config::Config {
			port: 0,
			database_url: "postgres://localhost/test".into(),
			jwt_secret: "test-secret".into(),
			frontend_url: "http://localhost:3000".into(),
			google: config::Google {
				client_id: "test-client".into(),
				client_secret: "test-client-secret".into(),
				callback_url: "http://localhost:3000/auth/google/callback".into(),
			},
			images: config::Images {
				cloud_name: "test-cloud".into(),
				api_key: "test-key".into(),
				api_secret: "test-image-secret".into(),
				folder: "blog-app".into(),
			},
		}
	}

	/// A pool that never connects; tests only exercise paths that
	/// reject before touching storage.
	pub fn database() -> Database {
		Database::connect_lazy("postgres://localhost/test").expect("failed to build lazy pool")
	}

	pub fn app(database: Database) -> TestServer {
		let config = Arc::new(config());
		let http = reqwest::Client::new();

		let state = State {
			images: ImageService::new(http.clone(), config.images.clone()),
			database,
			http,
			config,
		};

		TestServer::new(crate::app(state)).expect("failed to build test server")
	}
}

#[cfg(test)]
mod app_test {
	use crate::test::*;

	#[tokio::test]
	async fn test_health() {
		let app = app(database());

		let response = app.get("/health").await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<serde_json::Value>()["status"], "OK");
	}

	#[tokio::test]
	async fn test_docs_json() {
		let app = app(database());

		let response = app.get("/docs/api.json").await;

		assert_eq!(response.status_code(), 200);

		let docs = response.json::<serde_json::Value>();

		assert_eq!(docs["info"]["title"], "Quill Open API");
	}

	#[tokio::test]
	async fn test_unmatched_paths_serve_the_client() {
		let app = app(database());

		let response = app.get("/blog/7b62c9a9-5f85-4c13-8a0a-2b3edd1b4f8d").await;

		assert_eq!(response.status_code(), 200);
		assert!(response.text().contains("<!DOCTYPE html>"));
	}
}
