use crate::Core;

use std::sync::Arc;

use axum::{
	extract::State,
	http::{header, HeaderMap, StatusCode},
	response::{IntoResponse, Json, Response},
};

/// `GET /api` — the current catalog snapshot as a JSON array.
///
/// Only requests announcing an `application/json` content type get the
/// catalog, so the route cannot shadow a real `api` folder in the served
/// tree; everything else is a 404.
pub async fn catalog(State(core): State<Arc<Core>>, headers: HeaderMap) -> Response {
	let wants_json = headers
		.get(header::CONTENT_TYPE)
		.and_then(|value| value.to_str().ok())
		.is_some_and(|value| {
			value
				.to_ascii_lowercase()
				.starts_with("application/json")
		});

	if !wants_json {
		return StatusCode::NOT_FOUND.into_response();
	}

	let snapshot = core.store.snapshot().await;

	Json(&*snapshot).into_response()
}
