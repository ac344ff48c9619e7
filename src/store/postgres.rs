use sqlx::PgPool;

use super::{Error, Store};
use crate::model::{
	Category, CreateCategory, CreateImage, CreatePost, CreateTag, CreateUser, Image, Post,
	PostFilter, Tag, UpdateCategory, UpdateImage, UpdatePost, UpdateTag, UpdateUser, User,
};

/// A [`Store`] backed by PostgreSQL. The schema lives in `migrations/`.
pub struct PgStore {
	pool: PgPool,
}

impl PgStore {
	pub fn new(pool: PgPool) -> Self {
		Self { pool }
	}
}

/// Maps a constraint violation onto a store error, falling back to [`Error::Database`].
fn on_constraint(error: sqlx::Error, map: impl FnOnce(&str) -> Option<Error>) -> Error {
	if let sqlx::Error::Database(ref database) = error {
		if let Some(mapped) = database.constraint().and_then(map) {
			return mapped;
		}
	}

	Error::Database(error)
}

/// Maps the foreign keys of `post` onto the reference that could not be found.
fn on_post_reference(
	author_id: i64,
	category_id: Option<i64>,
) -> impl FnOnce(&str) -> Option<Error> {
	move |constraint| match constraint {
		"post_author_id_fkey" => Some(Error::UnknownUser(author_id)),
		"post_category_id_fkey" => category_id.map(Error::UnknownCategory),
		_ => None,
	}
}

#[axum::async_trait]
impl Store for PgStore {
	async fn list_users(&self, limit: i64, offset: i64) -> Result<Vec<User>, Error> {
		let users = sqlx::query_as::<_, User>(
			r#"
				SELECT * FROM "user"
				ORDER BY id
				LIMIT $1 OFFSET $2
			"#,
		)
		.bind(limit)
		.bind(offset)
		.fetch_all(&self.pool)
		.await?;

		Ok(users)
	}

	async fn get_user(&self, id: i64) -> Result<Option<User>, Error> {
		let user = sqlx::query_as::<_, User>(r#"SELECT * FROM "user" WHERE id = $1"#)
			.bind(id)
			.fetch_optional(&self.pool)
			.await?;

		Ok(user)
	}

	async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, Error> {
		let user = sqlx::query_as::<_, User>(r#"SELECT * FROM "user" WHERE username = $1"#)
			.bind(username)
			.fetch_optional(&self.pool)
			.await?;

		Ok(user)
	}

	async fn create_user(&self, input: CreateUser) -> Result<User, Error> {
		sqlx::query_as::<_, User>(
			r#"
				INSERT INTO "user" (username, email, first_name, last_name)
				VALUES ($1, $2, $3, $4)
				RETURNING *
			"#,
		)
		.bind(input.username)
		.bind(input.email)
		.bind(input.first_name)
		.bind(input.last_name)
		.fetch_one(&self.pool)
		.await
		.map_err(|e| {
			on_constraint(e, |constraint| {
				(constraint == "user_username_key").then_some(Error::UsernameTaken)
			})
		})
	}

	async fn update_user(&self, id: i64, input: UpdateUser) -> Result<Option<User>, Error> {
		sqlx::query_as::<_, User>(
			r#"
				UPDATE "user"
				SET username = COALESCE($1, username),
					email = COALESCE($2, email),
					first_name = COALESCE($3, first_name),
					last_name = COALESCE($4, last_name)
				WHERE id = $5
				RETURNING *
			"#,
		)
		.bind(input.username)
		.bind(input.email)
		.bind(input.first_name)
		.bind(input.last_name)
		.bind(id)
		.fetch_optional(&self.pool)
		.await
		.map_err(|e| {
			on_constraint(e, |constraint| {
				(constraint == "user_username_key").then_some(Error::UsernameTaken)
			})
		})
	}

	async fn delete_user(&self, id: i64) -> Result<bool, Error> {
		let result = sqlx::query(r#"DELETE FROM "user" WHERE id = $1"#)
			.bind(id)
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected() > 0)
	}

	async fn list_posts(
		&self,
		filter: PostFilter,
		limit: i64,
		offset: i64,
	) -> Result<Vec<Post>, Error> {
		let posts = sqlx::query_as::<_, Post>(
			r#"
				SELECT * FROM post
				WHERE ($1::post_status IS NULL OR status = $1)
					AND ($2::BIGINT IS NULL OR author_id = $2)
					AND ($3::BIGINT IS NULL OR category_id = $3)
					AND ($4::BIGINT IS NULL OR EXISTS (
						SELECT 1 FROM post_tag
						WHERE post_tag.post_id = post.id AND post_tag.tag_id = $4
					))
				ORDER BY created_at DESC, id DESC
				LIMIT $5 OFFSET $6
			"#,
		)
		.bind(filter.status)
		.bind(filter.author_id)
		.bind(filter.category_id)
		.bind(filter.tag_id)
		.bind(limit)
		.bind(offset)
		.fetch_all(&self.pool)
		.await?;

		Ok(posts)
	}

	async fn get_post(&self, id: i64) -> Result<Option<Post>, Error> {
		let post = sqlx::query_as::<_, Post>("SELECT * FROM post WHERE id = $1")
			.bind(id)
			.fetch_optional(&self.pool)
			.await?;

		Ok(post)
	}

	async fn create_post(&self, input: CreatePost) -> Result<Post, Error> {
		let on_reference = on_post_reference(input.author_id, input.category_id);

		sqlx::query_as::<_, Post>(
			r#"
				INSERT INTO post
					(author_id, category_id, title, description, text, status, published_at)
				VALUES ($1, $2, $3, $4, $5, $6, CASE WHEN $6 = 'pub'::post_status THEN now() END)
				RETURNING *
			"#,
		)
		.bind(input.author_id)
		.bind(input.category_id)
		.bind(input.title)
		.bind(input.description)
		.bind(input.text)
		.bind(input.status)
		.fetch_one(&self.pool)
		.await
		.map_err(|e| on_constraint(e, on_reference))
	}

	async fn update_post(&self, id: i64, input: UpdatePost) -> Result<Option<Post>, Error> {
		let on_reference = on_post_reference(
			input.author_id.unwrap_or_default(),
			input.category_id.flatten(),
		);

		// `published_at` is only stamped the first time the post is published
		sqlx::query_as::<_, Post>(
			r#"
				UPDATE post
				SET author_id = COALESCE($1, author_id),
					category_id = CASE WHEN $2 THEN $3 ELSE category_id END,
					title = COALESCE($4, title),
					description = COALESCE($5, description),
					text = COALESCE($6, text),
					status = COALESCE($7, status),
					published_at = CASE
						WHEN $7 = 'pub'::post_status AND published_at IS NULL THEN now()
						ELSE published_at
					END,
					updated_at = now()
				WHERE id = $8
				RETURNING *
			"#,
		)
		.bind(input.author_id)
		.bind(input.category_id.is_some())
		.bind(input.category_id.flatten())
		.bind(input.title)
		.bind(input.description)
		.bind(input.text)
		.bind(input.status)
		.bind(id)
		.fetch_optional(&self.pool)
		.await
		.map_err(|e| on_constraint(e, on_reference))
	}

	async fn delete_post(&self, id: i64) -> Result<bool, Error> {
		let result = sqlx::query("DELETE FROM post WHERE id = $1")
			.bind(id)
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected() > 0)
	}

	async fn list_categories(&self, limit: i64, offset: i64) -> Result<Vec<Category>, Error> {
		let categories = sqlx::query_as::<_, Category>(
			r#"
				SELECT * FROM category
				ORDER BY name
				LIMIT $1 OFFSET $2
			"#,
		)
		.bind(limit)
		.bind(offset)
		.fetch_all(&self.pool)
		.await?;

		Ok(categories)
	}

	async fn get_category(&self, id: i64) -> Result<Option<Category>, Error> {
		let category = sqlx::query_as::<_, Category>("SELECT * FROM category WHERE id = $1")
			.bind(id)
			.fetch_optional(&self.pool)
			.await?;

		Ok(category)
	}

	async fn get_category_by_name(&self, name: &str) -> Result<Option<Category>, Error> {
		let category = sqlx::query_as::<_, Category>("SELECT * FROM category WHERE name = $1")
			.bind(name)
			.fetch_optional(&self.pool)
			.await?;

		Ok(category)
	}

	async fn create_category(&self, input: CreateCategory) -> Result<Category, Error> {
		sqlx::query_as::<_, Category>(
			r#"
				INSERT INTO category (name, description)
				VALUES ($1, $2)
				RETURNING *
			"#,
		)
		.bind(input.name)
		.bind(input.description)
		.fetch_one(&self.pool)
		.await
		.map_err(|e| {
			on_constraint(e, |constraint| {
				(constraint == "category_name_key").then_some(Error::CategoryTaken)
			})
		})
	}

	async fn update_category(
		&self,
		id: i64,
		input: UpdateCategory,
	) -> Result<Option<Category>, Error> {
		sqlx::query_as::<_, Category>(
			r#"
				UPDATE category
				SET name = COALESCE($1, name),
					description = COALESCE($2, description),
					updated_at = now()
				WHERE id = $3
				RETURNING *
			"#,
		)
		.bind(input.name)
		.bind(input.description)
		.bind(id)
		.fetch_optional(&self.pool)
		.await
		.map_err(|e| {
			on_constraint(e, |constraint| {
				(constraint == "category_name_key").then_some(Error::CategoryTaken)
			})
		})
	}

	async fn delete_category(&self, id: i64) -> Result<bool, Error> {
		let result = sqlx::query("DELETE FROM category WHERE id = $1")
			.bind(id)
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected() > 0)
	}

	async fn list_tags(&self, limit: i64, offset: i64) -> Result<Vec<Tag>, Error> {
		let tags = sqlx::query_as::<_, Tag>(
			r#"
				SELECT * FROM tag
				ORDER BY label, id
				LIMIT $1 OFFSET $2
			"#,
		)
		.bind(limit)
		.bind(offset)
		.fetch_all(&self.pool)
		.await?;

		Ok(tags)
	}

	async fn get_tag(&self, id: i64) -> Result<Option<Tag>, Error> {
		let tag = sqlx::query_as::<_, Tag>("SELECT * FROM tag WHERE id = $1")
			.bind(id)
			.fetch_optional(&self.pool)
			.await?;

		Ok(tag)
	}

	async fn find_tags(&self, label: &str) -> Result<Vec<Tag>, Error> {
		let tags = sqlx::query_as::<_, Tag>("SELECT * FROM tag WHERE label = $1 ORDER BY id")
			.bind(label)
			.fetch_all(&self.pool)
			.await?;

		Ok(tags)
	}

	async fn create_tag(&self, input: CreateTag) -> Result<Tag, Error> {
		let tag = sqlx::query_as::<_, Tag>("INSERT INTO tag (label) VALUES ($1) RETURNING *")
			.bind(input.label)
			.fetch_one(&self.pool)
			.await?;

		Ok(tag)
	}

	async fn update_tag(&self, id: i64, input: UpdateTag) -> Result<Option<Tag>, Error> {
		let tag = sqlx::query_as::<_, Tag>(
			r#"
				UPDATE tag
				SET label = COALESCE($1, label)
				WHERE id = $2
				RETURNING *
			"#,
		)
		.bind(input.label)
		.bind(id)
		.fetch_optional(&self.pool)
		.await?;

		Ok(tag)
	}

	async fn delete_tag(&self, id: i64) -> Result<bool, Error> {
		let result = sqlx::query("DELETE FROM tag WHERE id = $1")
			.bind(id)
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected() > 0)
	}

	async fn post_tags(&self, post_id: i64) -> Result<Vec<Tag>, Error> {
		let tags = sqlx::query_as::<_, Tag>(
			r#"
				SELECT tag.* FROM tag
				JOIN post_tag ON post_tag.tag_id = tag.id
				WHERE post_tag.post_id = $1
				ORDER BY tag.label, tag.id
			"#,
		)
		.bind(post_id)
		.fetch_all(&self.pool)
		.await?;

		Ok(tags)
	}

	async fn add_post_tag(&self, post_id: i64, tag_id: i64) -> Result<(), Error> {
		sqlx::query(
			r#"
				INSERT INTO post_tag (post_id, tag_id)
				VALUES ($1, $2)
				ON CONFLICT DO NOTHING
			"#,
		)
		.bind(post_id)
		.bind(tag_id)
		.execute(&self.pool)
		.await
		.map_err(|e| {
			on_constraint(e, |constraint| match constraint {
				"post_tag_post_id_fkey" => Some(Error::UnknownPost(post_id)),
				"post_tag_tag_id_fkey" => Some(Error::UnknownTag(tag_id)),
				_ => None,
			})
		})?;

		Ok(())
	}

	async fn remove_post_tag(&self, post_id: i64, tag_id: i64) -> Result<bool, Error> {
		let result = sqlx::query("DELETE FROM post_tag WHERE post_id = $1 AND tag_id = $2")
			.bind(post_id)
			.bind(tag_id)
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected() > 0)
	}

	async fn list_images(&self, limit: i64, offset: i64) -> Result<Vec<Image>, Error> {
		let images = sqlx::query_as::<_, Image>(
			r#"
				SELECT * FROM image
				ORDER BY id
				LIMIT $1 OFFSET $2
			"#,
		)
		.bind(limit)
		.bind(offset)
		.fetch_all(&self.pool)
		.await?;

		Ok(images)
	}

	async fn post_images(&self, post_id: i64) -> Result<Vec<Image>, Error> {
		let images = sqlx::query_as::<_, Image>(
			r#"
				SELECT * FROM image
				WHERE post_id = $1
				ORDER BY is_default DESC, id
			"#,
		)
		.bind(post_id)
		.fetch_all(&self.pool)
		.await?;

		Ok(images)
	}

	async fn create_image(&self, input: CreateImage) -> Result<Image, Error> {
		let post_id = input.post_id;

		sqlx::query_as::<_, Image>(
			r#"
				INSERT INTO image (post_id, label, file, is_default, width, length)
				VALUES ($1, $2, $3, $4, $5, $6)
				RETURNING *
			"#,
		)
		.bind(post_id)
		.bind(input.label)
		.bind(input.file)
		.bind(input.is_default)
		.bind(input.width)
		.bind(input.length)
		.fetch_one(&self.pool)
		.await
		.map_err(|e| {
			on_constraint(e, |constraint| {
				(constraint == "image_post_id_fkey").then_some(Error::UnknownPost(post_id))
			})
		})
	}

	async fn update_image(&self, id: i64, input: UpdateImage) -> Result<Option<Image>, Error> {
		let image = sqlx::query_as::<_, Image>(
			r#"
				UPDATE image
				SET label = COALESCE($1, label),
					file = COALESCE($2, file),
					is_default = COALESCE($3, is_default),
					width = COALESCE($4, width),
					length = COALESCE($5, length),
					updated_at = now()
				WHERE id = $6
				RETURNING *
			"#,
		)
		.bind(input.label)
		.bind(input.file)
		.bind(input.is_default)
		.bind(input.width)
		.bind(input.length)
		.bind(id)
		.fetch_optional(&self.pool)
		.await?;

		Ok(image)
	}

	async fn delete_image(&self, id: i64) -> Result<bool, Error> {
		let result = sqlx::query("DELETE FROM image WHERE id = $1")
			.bind(id)
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected() > 0)
	}
}
