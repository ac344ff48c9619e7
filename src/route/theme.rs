//! Branding for the external admin skin, served at `/grappelli`.

use aide::axum::{routing::get_with, ApiRouter};
use axum::extract::State;
use macros::route;
use schemars::JsonSchema;
use serde::Serialize;

use crate::{extract::Json, openapi::tag, AppState, Site};

#[derive(Debug, Serialize, JsonSchema)]
pub struct Branding {
	/// The title shown in the admin header.
	pub title: String,
	/// Where the administration interface is mounted, such as `/admin`.
	pub admin_path: String,
}

pub fn routes() -> ApiRouter<AppState> {
	ApiRouter::new().api_route("/", get_with(branding, branding_docs))
}

/// Admin branding
/// Returns the title and location of the administration site.
#[route(tag = tag::SITE)]
pub async fn branding(State(site): State<Site>) -> Json<Branding> {
	Json(Branding {
		title: site.title.clone(),
		admin_path: site.path.prefix(),
	})
}
