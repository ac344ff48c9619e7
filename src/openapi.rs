use aide::{openapi::Tag, transform::TransformOpenApi};
use serde_json::json;

use crate::{
	error::{ErrorBody, Message},
	extract::Json,
};

pub mod tag {
	pub const POST: &str = "Post";
	pub const ADMIN: &str = "Admin";
	pub const SITE: &str = "Site";
}

pub fn docs(api: TransformOpenApi) -> TransformOpenApi {
	api.title("Blog")
		.summary("A minimal blog with an administration API")
		.description(include_str!("../README.md"))
		.tag(Tag {
			name: tag::POST.into(),
			description: Some("Published content".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::ADMIN.into(),
			description: Some("Content management, mounted at `URLS_ADMIN_PATH`".into()),
			..Default::default()
		})
		.tag(Tag {
			name: tag::SITE.into(),
			description: Some("Admin site branding".into()),
			..Default::default()
		})
		.default_response_with::<Json<ErrorBody<'static>>, _>(|res| {
			res.example(ErrorBody {
				errors: vec![Message::new("unknown_post").detail("post", json!(1))],
			})
		})
}
