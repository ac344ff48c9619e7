use std::sync::Arc;

use aide::{
	axum::{routing::get_with, ApiRouter},
	openapi::OpenApi,
};
use axum::{extract::Request, http::HeaderName, Extension, Router};
use tower::{Layer, ServiceBuilder};
use tower_http::{
	compression::CompressionLayer,
	normalize_path::NormalizePathLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};

use crate::{config::AdminPath, openapi, AppState};

pub mod admin;
pub mod docs;
pub mod model;
pub mod posts;
pub mod theme;

const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Builds the routing table.
///
/// Trailing slashes are trimmed before routing, so `/posts` and `/posts/`
/// reach the same handler.
pub fn app(state: AppState, admin_path: &AdminPath) -> Router {
	let mut api = OpenApi::default();

	let router = ApiRouter::new()
		.api_route(
			"/",
			get_with(posts::route::list_posts, posts::route::list_posts_docs),
		)
		.nest("/posts", posts::routes())
		.nest(&admin_path.prefix(), admin::routes())
		.nest("/grappelli", theme::routes())
		.nest("/docs", docs::routes())
		.finish_api_with(&mut api, openapi::docs)
		.layer(Extension(Arc::new(api)))
		.with_state(state);

	let middleware = ServiceBuilder::new()
		.layer(SetRequestIdLayer::new(REQUEST_ID, MakeRequestUuid))
		.layer(
			TraceLayer::new_for_http().make_span_with(|request: &Request| {
				let id = request
					.headers()
					.get(REQUEST_ID)
					.and_then(|id| id.to_str().ok())
					.unwrap_or_default();

				tracing::info_span!(
					"request",
					method = %request.method(),
					uri = %request.uri(),
					id
				)
			}),
		)
		.layer(PropagateRequestIdLayer::new(REQUEST_ID))
		.layer(CompressionLayer::new());

	// Normalization has to run before routing, so it wraps the whole router
	// rather than being one of its layers
	Router::new()
		.fallback_service(NormalizePathLayer::trim_trailing_slash().layer(router))
		.layer(middleware)
}
