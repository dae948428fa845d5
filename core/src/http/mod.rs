//! HTTP surface: the catalog read API, the upload endpoint and the plain
//! static file fallback over the artifact tree.

pub mod api;
pub mod upload;

use crate::Core;

use std::sync::Arc;

use axum::{
	extract::DefaultBodyLimit,
	http::{header, HeaderValue},
	routing::{get, post},
	Router,
};
use tower_http::{
	services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};

/// Server banner reported on every response.
pub const SERVER_UA: &str = concat!("Depot/", env!("CARGO_PKG_VERSION"));

/// Build the full router.
///
/// Anything not matched by the API or upload routes is served straight from
/// the root folder. When a proxy prefix is configured the whole surface is
/// nested below it.
pub fn router(core: Arc<Core>) -> Router {
	let files = ServeDir::new(&core.config.root_folder);

	let router = Router::new()
		// The catalog endpoint matches the whole /api prefix
		.route("/api", get(api::catalog))
		.route("/api/*rest", get(api::catalog))
		.route(
			"/upload",
			// Artifacts are multi-gigabyte disk images; the spool bounds
			// memory, not the body limit
			post(upload::handle_upload).layer(DefaultBodyLimit::disable()),
		)
		.fallback_service(files)
		.layer(SetResponseHeaderLayer::overriding(
			header::SERVER,
			HeaderValue::from_static(SERVER_UA),
		))
		.layer(TraceLayer::new_for_http())
		.with_state(core.clone());

	match core.config.proxy_prefix.as_deref() {
		Some(prefix) => Router::new().nest_service(&format!("/{prefix}"), router),
		None => router,
	}
}
