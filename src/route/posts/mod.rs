use aide::axum::{routing::get_with, ApiRouter};
use axum::http::StatusCode;
use serde_json::json;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown post {0}")]
	UnknownPost(i64),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/", get_with(list_posts, list_posts_docs))
		.api_route("/:id", get_with(get_post, get_post_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownPost(..) => StatusCode::NOT_FOUND,
		}
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		match self {
			Self::UnknownPost(post) => {
				vec![error::Message::new("unknown_post").detail("post", json!(post))]
			}
		}
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_list_is_capped_and_newest_first() {
		let app = app();
		let author = create_user(&app, "ada").await;

		for i in 0..12 {
			create_post(&app, author, &format!("Post {i}")).await;
		}

		for path in ["/", "/posts", "/posts/"] {
			let response = app.get(path).await;

			assert_eq!(response.status_code(), 200, "{path}");

			let posts = response.json::<Vec<Value>>();
			let titles = posts
				.iter()
				.map(|post| post["title"].as_str().unwrap())
				.collect::<Vec<_>>();

			assert_eq!(titles.len(), 10, "{path}");
			assert_eq!(titles[0], "Post 11");
			assert_eq!(titles[9], "Post 2");
		}

		let response = app.get("/posts").add_query_param("page", 2).await;

		assert_eq!(response.json::<Vec<Value>>().len(), 2);
	}

	#[tokio::test]
	async fn test_list_empty() {
		let app = app();

		let response = app.get("/").await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>(), json!([]));
	}

	#[tokio::test]
	async fn test_list_rejects_large_pages() {
		let app = app();

		let response = app.get("/posts").add_query_param("size", 11).await;

		assert_eq!(response.status_code(), 400);
		assert_eq!(response.json::<Value>()["errors"][0]["field"], "size");
	}

	#[tokio::test]
	async fn test_list_filters() {
		let app = app();
		let ada = create_user(&app, "ada").await;
		let alan = create_user(&app, "alan").await;
		let first = create_post(&app, ada, "First").await;
		create_post(&app, alan, "Second").await;

		app.post(&admin(&format!("/posts/{first}/publish"))).await;

		let response = app.get("/posts").add_query_param("status", "published").await;
		let posts = response.json::<Vec<Value>>();

		assert_eq!(posts.len(), 1);
		assert_eq!(posts[0]["id"], first);

		let response = app.get("/posts").add_query_param("author", alan).await;
		let posts = response.json::<Vec<Value>>();

		assert_eq!(posts.len(), 1);
		assert_eq!(posts[0]["title"], "Second");
	}

	#[tokio::test]
	async fn test_read_post() {
		let app = app();
		let author = create_user(&app, "ada").await;
		let post = create_post(&app, author, "Notes").await;

		let tag = app
			.post(&admin("/tags"))
			.json(&json!({ "label": "math" }))
			.await
			.json::<Value>()["id"]
			.as_i64()
			.unwrap();

		app.put(&admin(&format!("/posts/{post}/tags/{tag}"))).await;
		app.post(&admin("/images"))
			.json(&json!({
				"post_id": post,
				"label": "diagram",
				"file": "images/diagram.png",
			}))
			.await;

		let response = app.get(&format!("/posts/{post}/")).await;

		assert_eq!(response.status_code(), 200);

		let body = response.json::<Value>();

		assert_eq!(body["id"], post);
		assert_eq!(body["title"], "Notes");
		assert_eq!(body["status"], "initialized");
		assert_eq!(body["tags"][0]["label"], "math");
		assert_eq!(body["images"][0]["width"], 300.0);
		assert_eq!(body["images"][0]["default"], false);
	}

	#[tokio::test]
	async fn test_read_unknown_post() {
		let app = app();

		let response = app.get("/posts/42/").await;

		assert_eq!(response.status_code(), 404);
		assert_eq!(
			response.json::<Value>(),
			json!({ "errors": [{ "content": "unknown_post", "details": { "post": 42 } }] })
		);
	}

	#[tokio::test]
	async fn test_read_invalid_id() {
		let app = app();

		assert_eq!(app.get("/posts/abc/").await.status_code(), 400);
		assert_eq!(app.get("/posts/0").await.status_code(), 400);
	}
}
