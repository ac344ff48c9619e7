//! The administration interface, mounted at `URLS_ADMIN_PATH`.

use aide::axum::{
	routing::{get_with, post_with, put_with},
	ApiRouter,
};
use axum::http::StatusCode;
use serde_json::json;

use crate::{error, AppState};

pub mod model;
pub mod route;

/// Targets named in the path that do not exist.
///
/// Unknown references inside a request body are reported by the store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown user {0}")]
	UnknownUser(i64),
	#[error("unknown post {0}")]
	UnknownPost(i64),
	#[error("unknown user {0:?}")]
	UnknownUsername(String),
	#[error("unknown tag {0}")]
	UnknownTag(i64),
	#[error("unknown category {0}")]
	UnknownCategory(i64),
	#[error("unknown category {0:?}")]
	UnknownCategoryName(String),
	#[error("unknown image {0}")]
	UnknownImage(i64),
	#[error("tag {tag} is not attached to post {post}")]
	TagNotAttached { post: i64, tag: i64 },
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/", get_with(index, index_docs))
		.api_route(
			"/users",
			get_with(list_users, list_users_docs).post_with(create_user, create_user_docs),
		)
		.api_route(
			"/users/:id",
			get_with(get_user, get_user_docs)
				.put_with(update_user, update_user_docs)
				.delete_with(delete_user, delete_user_docs),
		)
		.api_route(
			"/users/username/:username",
			get_with(get_user_by_username, get_user_by_username_docs),
		)
		.api_route(
			"/posts",
			get_with(list_posts, list_posts_docs).post_with(create_post, create_post_docs),
		)
		.api_route(
			"/posts/:id",
			get_with(get_post, get_post_docs)
				.put_with(update_post, update_post_docs)
				.delete_with(delete_post, delete_post_docs),
		)
		.api_route("/posts/:id/publish", post_with(publish_post, publish_post_docs))
		.api_route(
			"/posts/:id/unpublish",
			post_with(unpublish_post, unpublish_post_docs),
		)
		.api_route("/posts/:id/archive", post_with(archive_post, archive_post_docs))
		.api_route("/posts/:id/tags", get_with(list_post_tags, list_post_tags_docs))
		.api_route(
			"/posts/:id/tags/:tag_id",
			put_with(add_post_tag, add_post_tag_docs)
				.delete_with(remove_post_tag, remove_post_tag_docs),
		)
		.api_route(
			"/posts/:id/images",
			get_with(list_post_images, list_post_images_docs),
		)
		.api_route(
			"/tags",
			get_with(list_tags, list_tags_docs).post_with(create_tag, create_tag_docs),
		)
		.api_route(
			"/categories",
			get_with(list_categories, list_categories_docs)
				.post_with(create_category, create_category_docs),
		)
		.api_route(
			"/categories/:id",
			get_with(get_category, get_category_docs)
				.put_with(update_category, update_category_docs)
				.delete_with(delete_category, delete_category_docs),
		)
		.api_route(
			"/categories/name/:name",
			get_with(get_category_by_name, get_category_by_name_docs),
		)
		.api_route(
			"/tags/:id",
			get_with(get_tag, get_tag_docs)
				.put_with(update_tag, update_tag_docs)
				.delete_with(delete_tag, delete_tag_docs),
		)
		.api_route("/tags/name/:name", get_with(find_tags, find_tags_docs))
		.api_route(
			"/images",
			get_with(list_images, list_images_docs).post_with(create_image, create_image_docs),
		)
		.api_route(
			"/images/:id",
			put_with(update_image, update_image_docs).delete_with(delete_image, delete_image_docs),
		)
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		StatusCode::NOT_FOUND
	}

	fn errors(&self) -> Vec<error::Message<'_>> {
		let message = match self {
			Self::UnknownUser(user) => error::Message::new("unknown_user").detail("user", json!(user)),
			Self::UnknownUsername(username) => {
				error::Message::new("unknown_user").detail("username", json!(username))
			}
			Self::UnknownPost(post) => error::Message::new("unknown_post").detail("post", json!(post)),
			Self::UnknownTag(tag) => error::Message::new("unknown_tag").detail("tag", json!(tag)),
			Self::UnknownCategory(category) => {
				error::Message::new("unknown_category").detail("category", json!(category))
			}
			Self::UnknownCategoryName(name) => {
				error::Message::new("unknown_category").detail("name", json!(name))
			}
			Self::UnknownImage(image) => {
				error::Message::new("unknown_image").detail("image", json!(image))
			}
			Self::TagNotAttached { post, tag } => error::Message::new("tag_not_attached")
				.detail("post", json!(post))
				.detail("tag", json!(tag)),
		};

		vec![message]
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[tokio::test]
	async fn test_admin_is_mounted_at_configured_path() {
		let app = app();

		let response = app.get(&admin("/")).await;

		assert_eq!(response.status_code(), 200);

		let body = response.json::<Value>();

		assert_eq!(body["title"], "Blog administration");
		assert_eq!(body["models"][1]["path"], format!("/{ADMIN_PATH}/posts"));

		// Admin routes are not reachable anywhere else
		assert_eq!(app.get("/admin/").await.status_code(), 404);
		assert_eq!(app.get("/posts/users").await.status_code(), 400);
	}

	#[tokio::test]
	async fn test_index_links_answer() {
		let app = app();

		let models = app.get(&admin("/")).await.json::<Value>()["models"].clone();
		let models = models.as_array().unwrap();

		assert_eq!(models.len(), 5);

		for model in models {
			let path = model["path"].as_str().unwrap();

			assert_eq!(app.get(path).await.status_code(), 200, "{path}");
		}
	}

	#[tokio::test]
	async fn test_admin_post_routes_are_not_public_routes() {
		let app = app();
		let author = create_user(&app, "ada").await;

		for i in 0..12 {
			create_post(&app, author, &format!("Post {i}")).await;
		}

		// The admin listing pages up to 100 posts, the public one only 10
		let response = app.get(&admin("/posts")).add_query_param("size", 50).await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Vec<Value>>().len(), 12);
	}

	#[tokio::test]
	async fn test_duplicate_username() {
		let app = app();
		create_user(&app, "ada").await;

		let response = app
			.post(&admin("/users"))
			.json(&json!({ "username": "ada", "email": "other@example.com" }))
			.await;

		assert_eq!(response.status_code(), 409);
		assert_eq!(response.json::<Value>()["errors"][0]["content"], "username_taken");
	}

	#[tokio::test]
	async fn test_invalid_input() {
		let app = app();

		let response = app
			.post(&admin("/users"))
			.json(&json!({ "username": "a b", "email": "ada@example.com" }))
			.await;

		assert_eq!(response.status_code(), 400);

		let response = app
			.post(&admin("/posts"))
			.json(&json!({ "title": "Missing author" }))
			.await;

		assert_eq!(response.status_code(), 400);
	}

	#[tokio::test]
	async fn test_status_lifecycle() {
		let app = app();
		let author = create_user(&app, "ada").await;
		let post = create_post(&app, author, "Notes").await;

		let response = app.post(&admin(&format!("/posts/{post}/publish"))).await;
		let body = response.json::<Value>();

		assert_eq!(response.status_code(), 200);
		assert_eq!(body["status"], "published");

		let published_at = body["published_at"].clone();
		assert!(published_at.is_string());

		let response = app.post(&admin(&format!("/posts/{post}/unpublish"))).await;
		let body = response.json::<Value>();

		assert_eq!(response.status_code(), 200);
		assert_eq!(body["status"], "initialized");
		assert_eq!(body["published_at"], published_at);

		let response = app.post(&admin(&format!("/posts/{post}/archive"))).await;

		assert_eq!(response.json::<Value>()["status"], "archived");

		// Any status can be set directly as well
		let response = app
			.put(&admin(&format!("/posts/{post}")))
			.json(&json!({ "status": "published" }))
			.await;
		let body = response.json::<Value>();

		assert_eq!(response.status_code(), 200);
		assert_eq!(body["status"], "published");
		assert_eq!(body["published_at"], published_at);

		let response = app
			.put(&admin(&format!("/posts/{post}")))
			.json(&json!({ "status": "initialized" }))
			.await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["status"], "initialized");

		assert_eq!(
			app.post(&admin("/posts/99/unpublish")).await.status_code(),
			404
		);
	}

	#[tokio::test]
	async fn test_update_post() {
		let app = app();
		let author = create_user(&app, "ada").await;
		let post = create_post(&app, author, "Notes").await;

		let response = app
			.put(&admin(&format!("/posts/{post}")))
			.json(&json!({ "title": "Sketch of the engine" }))
			.await;
		let body = response.json::<Value>();

		assert_eq!(response.status_code(), 200);
		assert_eq!(body["title"], "Sketch of the engine");
		assert_eq!(body["status"], "initialized");

		let response = app
			.put(&admin("/posts/99"))
			.json(&json!({ "title": "Nothing" }))
			.await;

		assert_eq!(response.status_code(), 404);
	}

	#[tokio::test]
	async fn test_tag_attached_once() {
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

		let path = admin(&format!("/posts/{post}/tags/{tag}"));

		assert_eq!(app.put(&path).await.status_code(), 200);
		assert_eq!(app.put(&path).await.status_code(), 200);

		let tags = app
			.get(&admin(&format!("/posts/{post}/tags")))
			.await
			.json::<Vec<Value>>();

		assert_eq!(tags.len(), 1);
		assert_eq!(tags[0]["id"], tag);

		assert_eq!(app.delete(&path).await.status_code(), 200);
		assert_eq!(app.delete(&path).await.status_code(), 404);
		assert_eq!(
			app.put(&admin(&format!("/posts/{post}/tags/99")))
				.await
				.status_code(),
			404
		);
	}

	#[tokio::test]
	async fn test_image_and_post_deletion() {
		let app = app();
		let author = create_user(&app, "ada").await;
		let post = create_post(&app, author, "Notes").await;

		let image = |label: &'static str| {
			json!({
				"post_id": post,
				"label": label,
				"file": format!("images/{label}.png"),
			})
		};

		let first = app.post(&admin("/images")).json(&image("first")).await;
		let first = first.json::<Value>()["id"].as_i64().unwrap();
		app.post(&admin("/images")).json(&image("second")).await;

		// Deleting an image keeps the post
		assert_eq!(app.delete(&admin(&format!("/images/{first}"))).await.status_code(), 200);
		assert_eq!(app.get(&format!("/posts/{post}")).await.status_code(), 200);

		let images = app
			.get(&admin(&format!("/posts/{post}/images")))
			.await
			.json::<Vec<Value>>();

		assert_eq!(images.len(), 1);
		assert_eq!(images[0]["label"], "second");

		// Deleting the post deletes its images
		assert_eq!(app.delete(&admin(&format!("/posts/{post}"))).await.status_code(), 200);
		assert_eq!(
			app.get(&admin(&format!("/posts/{post}/images")))
				.await
				.status_code(),
			404
		);
	}

	#[tokio::test]
	async fn test_user_deletion_cascades() {
		let app = app();
		let author = create_user(&app, "ada").await;
		let post = create_post(&app, author, "Notes").await;

		assert_eq!(app.delete(&admin(&format!("/users/{author}"))).await.status_code(), 200);
		assert_eq!(app.get(&format!("/posts/{post}")).await.status_code(), 404);
		assert_eq!(app.delete(&admin(&format!("/users/{author}"))).await.status_code(), 404);
	}

	#[tokio::test]
	async fn test_unknown_author() {
		let app = app();

		let response = app
			.post(&admin("/posts"))
			.json(&json!({ "author_id": 7, "title": "Orphan", "description": "", "text": "" }))
			.await;

		assert_eq!(response.status_code(), 404);
		assert_eq!(response.json::<Value>()["errors"][0]["content"], "unknown_user");
	}

	#[tokio::test]
	async fn test_single_reads_and_lookups() {
		let app = app();
		let author = create_user(&app, "ada").await;

		let response = app.get(&admin(&format!("/users/{author}"))).await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["username"], "ada");

		let response = app.get(&admin("/users/username/ada")).await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["id"], author);

		let response = app.get(&admin("/users/username/alan")).await;

		assert_eq!(response.status_code(), 404);
		assert_eq!(
			response.json::<Value>()["errors"][0],
			json!({ "content": "unknown_user", "details": { "username": "alan" } })
		);
		assert_eq!(app.get(&admin("/users/99")).await.status_code(), 404);

		let tag = app
			.post(&admin("/tags"))
			.json(&json!({ "label": "math" }))
			.await
			.json::<Value>()["id"]
			.as_i64()
			.unwrap();
		app.post(&admin("/tags")).json(&json!({ "label": "math" })).await;

		let response = app.get(&admin(&format!("/tags/{tag}"))).await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["label"], "math");
		assert_eq!(app.get(&admin("/tags/99")).await.status_code(), 404);

		let tags = app.get(&admin("/tags/name/math")).await.json::<Vec<Value>>();

		assert_eq!(tags.len(), 2);
		assert_eq!(tags[0]["id"], tag);
		assert_eq!(
			app.get(&admin("/tags/name/poetry")).await.json::<Value>(),
			json!([])
		);
	}

	#[tokio::test]
	async fn test_user_names() {
		let app = app();

		let response = app
			.post(&admin("/users"))
			.json(&json!({
				"username": "ada",
				"email": "ada@example.com",
				"first_name": "Ada",
				"last_name": "Lovelace",
			}))
			.await;
		let body = response.json::<Value>();

		assert_eq!(response.status_code(), 200);
		assert_eq!(body["first_name"], "Ada");

		let user = body["id"].as_i64().unwrap();
		let response = app
			.put(&admin(&format!("/users/{user}")))
			.json(&json!({ "last_name": "King" }))
			.await;
		let body = response.json::<Value>();

		assert_eq!(body["first_name"], "Ada");
		assert_eq!(body["last_name"], "King");

		// Both names are optional
		let alan = create_user(&app, "alan").await;
		let body = app.get(&admin(&format!("/users/{alan}"))).await.json::<Value>();

		assert_eq!(body["first_name"], "");
	}

	#[tokio::test]
	async fn test_categories() {
		let app = app();
		let author = create_user(&app, "ada").await;
		let post = create_post(&app, author, "Notes").await;

		let response = app
			.post(&admin("/categories"))
			.json(&json!({ "name": "Engines", "description": "Difference and analytical" }))
			.await;
		let body = response.json::<Value>();

		assert_eq!(response.status_code(), 200);
		assert_eq!(body["name"], "Engines");

		let category = body["id"].as_i64().unwrap();

		let response = app
			.post(&admin("/categories"))
			.json(&json!({ "name": "Engines" }))
			.await;

		assert_eq!(response.status_code(), 409);
		assert_eq!(response.json::<Value>()["errors"][0]["content"], "category_taken");

		let response = app
			.put(&admin(&format!("/posts/{post}")))
			.json(&json!({ "category_id": category }))
			.await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["category_id"], category);

		let posts = app
			.get("/posts")
			.add_query_param("category", category)
			.await
			.json::<Vec<Value>>();

		assert_eq!(posts.len(), 1);

		let response = app
			.put(&admin(&format!("/posts/{post}")))
			.json(&json!({ "category_id": 99 }))
			.await;

		assert_eq!(response.status_code(), 404);
		assert_eq!(response.json::<Value>()["errors"][0]["content"], "unknown_category");

		let response = app.get(&admin("/categories/name/Engines")).await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["id"], category);
		assert_eq!(app.get(&admin("/categories/name/Looms")).await.status_code(), 404);

		let response = app
			.put(&admin(&format!("/categories/{category}")))
			.json(&json!({ "description": "Babbage" }))
			.await;

		assert_eq!(response.json::<Value>()["description"], "Babbage");

		// Deleting the category keeps its posts
		let path = admin(&format!("/categories/{category}"));

		assert_eq!(app.delete(&path).await.status_code(), 200);
		assert_eq!(app.get(&path).await.status_code(), 404);

		let response = app.get(&format!("/posts/{post}")).await;

		assert_eq!(response.status_code(), 200);
		assert_eq!(response.json::<Value>()["category_id"], Value::Null);
	}
}
