#![warn(clippy::pedantic)]

mod config;
mod error;
mod extract;
mod media;
mod model;
mod openapi;
mod paginate;
mod permission;
mod query;
mod ratelimit;
mod route;
mod session;
#[cfg(test)]
mod test;
mod trace;

use std::{net::SocketAddr, sync::Arc};

use aide::{axum::ApiRouter, openapi::OpenApi};
use argon2::Argon2;
use axum::{Extension, Router};
use tower::Layer;
use tower_governor::GovernorLayer;
use tower_http::{
	compression::CompressionLayer,
	normalize_path::NormalizePathLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	services::ServeDir,
	trace::TraceLayer,
};

use crate::{config::Config, media::MediaStore};

pub type Database = sqlx::Pool<sqlx::Postgres>;
pub type AppState = State;

/// The shared application state.
///
/// Everything in here is cheap to clone, handlers pick the parts they need
/// with `State<T>`.
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub database: Database,
	pub hasher: Argon2<'static>,
	pub media: MediaStore,
}

/// Builds the application router, including the API docs and uploaded media.
///
/// Trailing slashes are trimmed before routing, so `/posts/1/` and `/posts/1`
/// match the same route.
pub fn app(state: State) -> Router {
	let mut api = OpenApi::default();
	let media_root = state.media.root().to_owned();

	let router = ApiRouter::new()
		.merge(route::post::routes())
		.merge(route::comment::routes())
		.merge(route::category::routes())
		.merge(route::profile::routes())
		.nest("/auth", route::auth::routes())
		.nest("/docs", route::docs::routes())
		.finish_api_with(&mut api, openapi::docs);

	let router = router
		.layer(Extension(Arc::new(api)))
		.nest_service("/media", ServeDir::new(media_root))
		.layer(CompressionLayer::new())
		.layer(PropagateRequestIdLayer::x_request_id())
		.layer(TraceLayer::new_for_http())
		.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
		.with_state(state);

	Router::new().fallback_service(NormalizePathLayer::trim_trailing_slash().layer(router))
}

#[tokio::main]
async fn main() {
	dotenvy::dotenv().ok();

	let config = Config::from_env().expect("invalid configuration");
	let _guard = trace::init_tracing_subscriber(config.otlp);

	let database = Database::connect(&config.database_url)
		.await
		.expect("failed to connect to database");

	sqlx::migrate!()
		.run(&database)
		.await
		.expect("failed to run migrations");

	let state = State {
		database,
		hasher: Argon2::default(),
		media: MediaStore::new(config.media_root.clone(), config.max_image_bytes),
	};

	let ratelimit = ratelimit::default();
	ratelimit::cleanup_old_limits(&[&ratelimit]);

	let app = app(state).layer(GovernorLayer { config: ratelimit });

	let listener = tokio::net::TcpListener::bind((config.host, config.port))
		.await
		.expect("failed to bind to port");

	tracing::info!(host = %config.host, port = config.port, "listening");

	axum::serve(
		listener,
		app.into_make_service_with_connect_info::<SocketAddr>(),
	)
	.await
	.expect("server error");
}
