use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use tokio::sync::RwLock;

use super::{Error, Store};
use crate::model::{
	Category, CreateCategory, CreateImage, CreatePost, CreateTag, CreateUser, Image, Post,
	PostFilter, PostStatus, Tag, Timestamped, UpdateCategory, UpdateImage, UpdatePost, UpdateTag,
	UpdateUser, User,
};

#[derive(Default)]
struct Tables {
	users: BTreeMap<i64, User>,
	posts: BTreeMap<i64, Post>,
	categories: BTreeMap<i64, Category>,
	tags: BTreeMap<i64, Tag>,
	images: BTreeMap<i64, Image>,
	/// (post id, tag id)
	post_tags: BTreeSet<(i64, i64)>,
	sequences: Sequences,
}

/// Per-table id sequences, starting at 1 like `BIGSERIAL`.
#[derive(Default)]
struct Sequences {
	user: i64,
	post: i64,
	category: i64,
	tag: i64,
	image: i64,
}

fn next(sequence: &mut i64) -> i64 {
	*sequence += 1;
	*sequence
}

fn page<T: Clone>(items: impl Iterator<Item = T>, limit: i64, offset: i64) -> Vec<T> {
	let offset = usize::try_from(offset).unwrap_or(0);
	let limit = usize::try_from(limit).unwrap_or(0);

	items.skip(offset).take(limit).collect()
}

impl Tables {
	/// Checks the users and categories a post would point at.
	fn check_post_references(
		&self,
		author_id: Option<i64>,
		category_id: Option<i64>,
	) -> Result<(), Error> {
		if let Some(author_id) = author_id.filter(|id| !self.users.contains_key(id)) {
			return Err(Error::UnknownUser(author_id));
		}

		if let Some(category_id) = category_id.filter(|id| !self.categories.contains_key(id)) {
			return Err(Error::UnknownCategory(category_id));
		}

		Ok(())
	}

	fn remove_post(&mut self, id: i64) -> bool {
		if self.posts.remove(&id).is_none() {
			return false;
		}

		self.images.retain(|_, image| image.post_id != id);
		self.post_tags.retain(|(post_id, _)| *post_id != id);

		true
	}
}

/// A [`Store`] that keeps everything in memory.
///
/// Used when no database is configured. Data is lost on process restart.
#[derive(Default)]
pub struct MemoryStore {
	tables: RwLock<Tables>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[axum::async_trait]
impl Store for MemoryStore {
	async fn list_users(&self, limit: i64, offset: i64) -> Result<Vec<User>, Error> {
		let tables = self.tables.read().await;

		Ok(page(tables.users.values().cloned(), limit, offset))
	}

	async fn get_user(&self, id: i64) -> Result<Option<User>, Error> {
		Ok(self.tables.read().await.users.get(&id).cloned())
	}

	async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, Error> {
		let tables = self.tables.read().await;

		Ok(tables
			.users
			.values()
			.find(|user| user.username == username)
			.cloned())
	}

	async fn create_user(&self, input: CreateUser) -> Result<User, Error> {
		let mut tables = self.tables.write().await;

		if tables.users.values().any(|user| user.username == input.username) {
			return Err(Error::UsernameTaken);
		}

		let user = User {
			id: next(&mut tables.sequences.user),
			username: input.username,
			email: input.email,
			first_name: input.first_name,
			last_name: input.last_name,
			created_at: Utc::now(),
		};

		tables.users.insert(user.id, user.clone());

		Ok(user)
	}

	async fn update_user(&self, id: i64, input: UpdateUser) -> Result<Option<User>, Error> {
		let mut tables = self.tables.write().await;

		if let Some(ref username) = input.username {
			if tables
				.users
				.values()
				.any(|user| user.id != id && &user.username == username)
			{
				return Err(Error::UsernameTaken);
			}
		}

		let Some(user) = tables.users.get_mut(&id) else {
			return Ok(None);
		};

		if let Some(username) = input.username {
			user.username = username;
		}

		if let Some(email) = input.email {
			user.email = email;
		}

		if let Some(first_name) = input.first_name {
			user.first_name = first_name;
		}

		if let Some(last_name) = input.last_name {
			user.last_name = last_name;
		}

		Ok(Some(user.clone()))
	}

	async fn delete_user(&self, id: i64) -> Result<bool, Error> {
		let mut tables = self.tables.write().await;

		if tables.users.remove(&id).is_none() {
			return Ok(false);
		}

		let posts = tables
			.posts
			.values()
			.filter(|post| post.author_id == id)
			.map(|post| post.id)
			.collect::<Vec<_>>();

		for post in posts {
			tables.remove_post(post);
		}

		Ok(true)
	}

	async fn list_posts(
		&self,
		filter: PostFilter,
		limit: i64,
		offset: i64,
	) -> Result<Vec<Post>, Error> {
		let tables = self.tables.read().await;

		let mut posts = tables
			.posts
			.values()
			.filter(|post| {
				filter.matches(post, |tag_id| tables.post_tags.contains(&(post.id, tag_id)))
			})
			.collect::<Vec<_>>();

		posts.sort_by(|a, b| {
			b.created_at
				.cmp(&a.created_at)
				.then_with(|| b.id.cmp(&a.id))
		});

		Ok(page(posts.into_iter().cloned(), limit, offset))
	}

	async fn get_post(&self, id: i64) -> Result<Option<Post>, Error> {
		Ok(self.tables.read().await.posts.get(&id).cloned())
	}

	async fn create_post(&self, input: CreatePost) -> Result<Post, Error> {
		let mut tables = self.tables.write().await;

		tables.check_post_references(Some(input.author_id), input.category_id)?;

		let now = Utc::now();
		let post = Post {
			id: next(&mut tables.sequences.post),
			author_id: input.author_id,
			category_id: input.category_id,
			title: input.title,
			description: input.description,
			text: input.text,
			status: input.status,
			published_at: (input.status == PostStatus::Published).then_some(now),
			created_at: now,
			updated_at: now,
		};

		tables.posts.insert(post.id, post.clone());

		Ok(post)
	}

	async fn update_post(&self, id: i64, input: UpdatePost) -> Result<Option<Post>, Error> {
		let mut tables = self.tables.write().await;

		// References are checked before anything is written
		tables.check_post_references(input.author_id, input.category_id.flatten())?;

		let Some(post) = tables.posts.get_mut(&id) else {
			return Ok(None);
		};

		let now = Utc::now();

		if let Some(status) = input.status {
			post.set_status(status, now);
		}

		if let Some(author_id) = input.author_id {
			post.author_id = author_id;
		}

		if let Some(category_id) = input.category_id {
			post.category_id = category_id;
		}

		if let Some(title) = input.title {
			post.title = title;
		}

		if let Some(description) = input.description {
			post.description = description;
		}

		if let Some(text) = input.text {
			post.text = text;
		}

		post.touch(now);

		Ok(Some(post.clone()))
	}

	async fn delete_post(&self, id: i64) -> Result<bool, Error> {
		Ok(self.tables.write().await.remove_post(id))
	}

	async fn list_categories(&self, limit: i64, offset: i64) -> Result<Vec<Category>, Error> {
		let tables = self.tables.read().await;

		let mut categories = tables.categories.values().collect::<Vec<_>>();
		categories.sort_by(|a, b| a.name.cmp(&b.name));

		Ok(page(categories.into_iter().cloned(), limit, offset))
	}

	async fn get_category(&self, id: i64) -> Result<Option<Category>, Error> {
		Ok(self.tables.read().await.categories.get(&id).cloned())
	}

	async fn get_category_by_name(&self, name: &str) -> Result<Option<Category>, Error> {
		let tables = self.tables.read().await;

		Ok(tables
			.categories
			.values()
			.find(|category| category.name == name)
			.cloned())
	}

	async fn create_category(&self, input: CreateCategory) -> Result<Category, Error> {
		let mut tables = self.tables.write().await;

		if tables
			.categories
			.values()
			.any(|category| category.name == input.name)
		{
			return Err(Error::CategoryTaken);
		}

		let now = Utc::now();
		let category = Category {
			id: next(&mut tables.sequences.category),
			name: input.name,
			description: input.description,
			created_at: now,
			updated_at: now,
		};

		tables.categories.insert(category.id, category.clone());

		Ok(category)
	}

	async fn update_category(
		&self,
		id: i64,
		input: UpdateCategory,
	) -> Result<Option<Category>, Error> {
		let mut tables = self.tables.write().await;

		if let Some(ref name) = input.name {
			if tables
				.categories
				.values()
				.any(|category| category.id != id && &category.name == name)
			{
				return Err(Error::CategoryTaken);
			}
		}

		let Some(category) = tables.categories.get_mut(&id) else {
			return Ok(None);
		};

		if let Some(name) = input.name {
			category.name = name;
		}

		if let Some(description) = input.description {
			category.description = description;
		}

		category.touch(Utc::now());

		Ok(Some(category.clone()))
	}

	async fn delete_category(&self, id: i64) -> Result<bool, Error> {
		let mut tables = self.tables.write().await;

		if tables.categories.remove(&id).is_none() {
			return Ok(false);
		}

		for post in tables.posts.values_mut() {
			if post.category_id == Some(id) {
				post.category_id = None;
			}
		}

		Ok(true)
	}

	async fn list_tags(&self, limit: i64, offset: i64) -> Result<Vec<Tag>, Error> {
		let tables = self.tables.read().await;

		let mut tags = tables.tags.values().collect::<Vec<_>>();
		tags.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.id.cmp(&b.id)));

		Ok(page(tags.into_iter().cloned(), limit, offset))
	}

	async fn get_tag(&self, id: i64) -> Result<Option<Tag>, Error> {
		Ok(self.tables.read().await.tags.get(&id).cloned())
	}

	async fn find_tags(&self, label: &str) -> Result<Vec<Tag>, Error> {
		let tables = self.tables.read().await;

		Ok(tables
			.tags
			.values()
			.filter(|tag| tag.label == label)
			.cloned()
			.collect())
	}

	async fn create_tag(&self, input: CreateTag) -> Result<Tag, Error> {
		let mut tables = self.tables.write().await;

		let tag = Tag {
			id: next(&mut tables.sequences.tag),
			label: input.label,
		};

		tables.tags.insert(tag.id, tag.clone());

		Ok(tag)
	}

	async fn update_tag(&self, id: i64, input: UpdateTag) -> Result<Option<Tag>, Error> {
		let mut tables = self.tables.write().await;

		let Some(tag) = tables.tags.get_mut(&id) else {
			return Ok(None);
		};

		if let Some(label) = input.label {
			tag.label = label;
		}

		Ok(Some(tag.clone()))
	}

	async fn delete_tag(&self, id: i64) -> Result<bool, Error> {
		let mut tables = self.tables.write().await;

		if tables.tags.remove(&id).is_none() {
			return Ok(false);
		}

		tables.post_tags.retain(|(_, tag_id)| *tag_id != id);

		Ok(true)
	}

	async fn post_tags(&self, post_id: i64) -> Result<Vec<Tag>, Error> {
		let tables = self.tables.read().await;

		let mut tags = tables
			.post_tags
			.iter()
			.filter(|(post, _)| *post == post_id)
			.filter_map(|(_, tag_id)| tables.tags.get(tag_id))
			.collect::<Vec<_>>();
		tags.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.id.cmp(&b.id)));

		Ok(tags.into_iter().cloned().collect())
	}

	async fn add_post_tag(&self, post_id: i64, tag_id: i64) -> Result<(), Error> {
		let mut tables = self.tables.write().await;

		if !tables.posts.contains_key(&post_id) {
			return Err(Error::UnknownPost(post_id));
		}

		if !tables.tags.contains_key(&tag_id) {
			return Err(Error::UnknownTag(tag_id));
		}

		tables.post_tags.insert((post_id, tag_id));

		Ok(())
	}

	async fn remove_post_tag(&self, post_id: i64, tag_id: i64) -> Result<bool, Error> {
		Ok(self.tables.write().await.post_tags.remove(&(post_id, tag_id)))
	}

	async fn list_images(&self, limit: i64, offset: i64) -> Result<Vec<Image>, Error> {
		let tables = self.tables.read().await;

		Ok(page(tables.images.values().cloned(), limit, offset))
	}

	async fn post_images(&self, post_id: i64) -> Result<Vec<Image>, Error> {
		let tables = self.tables.read().await;

		let mut images = tables
			.images
			.values()
			.filter(|image| image.post_id == post_id)
			.collect::<Vec<_>>();
		images.sort_by(|a, b| b.is_default.cmp(&a.is_default).then_with(|| a.id.cmp(&b.id)));

		Ok(images.into_iter().cloned().collect())
	}

	async fn create_image(&self, input: CreateImage) -> Result<Image, Error> {
		let mut tables = self.tables.write().await;

		if !tables.posts.contains_key(&input.post_id) {
			return Err(Error::UnknownPost(input.post_id));
		}

		let now = Utc::now();
		let image = Image {
			id: next(&mut tables.sequences.image),
			post_id: input.post_id,
			label: input.label,
			file: input.file,
			is_default: input.is_default,
			width: input.width,
			length: input.length,
			created_at: now,
			updated_at: now,
		};

		tables.images.insert(image.id, image.clone());

		Ok(image)
	}

	async fn update_image(&self, id: i64, input: UpdateImage) -> Result<Option<Image>, Error> {
		let mut tables = self.tables.write().await;

		let Some(image) = tables.images.get_mut(&id) else {
			return Ok(None);
		};

		if let Some(label) = input.label {
			image.label = label;
		}

		if let Some(file) = input.file {
			image.file = file;
		}

		if let Some(is_default) = input.is_default {
			image.is_default = is_default;
		}

		if let Some(width) = input.width {
			image.width = width;
		}

		if let Some(length) = input.length {
			image.length = length;
		}

		image.touch(Utc::now());

		Ok(Some(image.clone()))
	}

	async fn delete_image(&self, id: i64) -> Result<bool, Error> {
		Ok(self.tables.write().await.images.remove(&id).is_some())
	}
}

#[cfg(test)]
mod test {
	use super::*;

	async fn seed(store: &MemoryStore) -> (User, Post) {
		let user = store
			.create_user(CreateUser {
				username: "ada".into(),
				email: "ada@example.com".into(),
				first_name: "Ada".into(),
				last_name: "Lovelace".into(),
			})
			.await
			.unwrap();

		let post = store
			.create_post(CreatePost {
				author_id: user.id,
				category_id: None,
				title: "Notes".into(),
				description: "On the engine".into(),
				text: "...".into(),
				status: PostStatus::Initialized,
			})
			.await
			.unwrap();

		(user, post)
	}

	fn image(post_id: i64) -> CreateImage {
		CreateImage {
			post_id,
			label: "diagram".into(),
			file: "images/diagram.png".into(),
			is_default: false,
			width: 300.0,
			length: 300.0,
		}
	}

	fn category(name: &str) -> CreateCategory {
		CreateCategory {
			name: name.into(),
			description: String::new(),
		}
	}

	#[tokio::test]
	async fn test_tag_attached_once() {
		let store = MemoryStore::new();
		let (_, post) = seed(&store).await;
		let tag = store
			.create_tag(CreateTag {
				label: "math".into(),
			})
			.await
			.unwrap();

		store.add_post_tag(post.id, tag.id).await.unwrap();
		store.add_post_tag(post.id, tag.id).await.unwrap();

		assert_eq!(store.post_tags(post.id).await.unwrap(), vec![tag]);
	}

	#[tokio::test]
	async fn test_image_delete_keeps_post() {
		let store = MemoryStore::new();
		let (_, post) = seed(&store).await;
		let image = store.create_image(image(post.id)).await.unwrap();

		assert_eq!(store.list_images(10, 0).await.unwrap().len(), 1);
		assert!(store.delete_image(image.id).await.unwrap());
		assert!(store.get_post(post.id).await.unwrap().is_some());
		assert!(store.post_images(post.id).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn test_post_delete_cascades() {
		let store = MemoryStore::new();
		let (_, post) = seed(&store).await;
		let image = store.create_image(image(post.id)).await.unwrap();

		assert!(store.delete_post(post.id).await.unwrap());
		assert!(store.post_images(post.id).await.unwrap().is_empty());
		assert!(!store.delete_image(image.id).await.unwrap());
	}

	#[tokio::test]
	async fn test_user_delete_cascades() {
		let store = MemoryStore::new();
		let (user, post) = seed(&store).await;

		assert!(store.delete_user(user.id).await.unwrap());
		assert!(store.get_post(post.id).await.unwrap().is_none());
	}

	#[tokio::test]
	async fn test_unknown_references() {
		let store = MemoryStore::new();
		let (_, post) = seed(&store).await;

		assert!(matches!(
			store.add_post_tag(post.id, 42).await,
			Err(Error::UnknownTag(42))
		));
		assert!(matches!(
			store.create_image(image(42)).await,
			Err(Error::UnknownPost(42))
		));
	}

	#[tokio::test]
	async fn test_status_moves_back_and_forth() {
		let store = MemoryStore::new();
		let (_, post) = seed(&store).await;

		let published = store
			.update_post(post.id, UpdatePost::status_change(PostStatus::Published))
			.await
			.unwrap()
			.unwrap();
		let first = published.published_at.unwrap();

		let unpublished = store
			.update_post(post.id, UpdatePost::status_change(PostStatus::Initialized))
			.await
			.unwrap()
			.unwrap();

		assert_eq!(unpublished.status, PostStatus::Initialized);
		assert_eq!(unpublished.published_at, Some(first));

		store
			.update_post(post.id, UpdatePost::status_change(PostStatus::Archived))
			.await
			.unwrap();

		let republished = store
			.update_post(post.id, UpdatePost::status_change(PostStatus::Published))
			.await
			.unwrap()
			.unwrap();

		assert_eq!(republished.status, PostStatus::Published);
		assert_eq!(republished.published_at, Some(first));
	}

	#[tokio::test]
	async fn test_failed_update_leaves_post() {
		let store = MemoryStore::new();
		let (_, post) = seed(&store).await;

		let mut update = UpdatePost::status_change(PostStatus::Published);
		update.title = Some("Moved".into());
		update.author_id = Some(42);

		assert!(matches!(
			store.update_post(post.id, update).await,
			Err(Error::UnknownUser(42))
		));

		let mut update = UpdatePost::status_change(PostStatus::Published);
		update.category_id = Some(Some(7));

		assert!(matches!(
			store.update_post(post.id, update).await,
			Err(Error::UnknownCategory(7))
		));

		let post = store.get_post(post.id).await.unwrap().unwrap();
		assert_eq!(post.title, "Notes");
		assert_eq!(post.status, PostStatus::Initialized);
		assert_eq!(post.published_at, None);
	}

	#[tokio::test]
	async fn test_category_delete_keeps_posts() {
		let store = MemoryStore::new();
		let (_, post) = seed(&store).await;
		let engines = store.create_category(category("Engines")).await.unwrap();

		let mut update = UpdatePost::status_change(PostStatus::Initialized);
		update.category_id = Some(Some(engines.id));
		store.update_post(post.id, update).await.unwrap();

		let filter = PostFilter {
			category_id: Some(engines.id),
			..PostFilter::default()
		};

		assert_eq!(store.list_posts(filter, 10, 0).await.unwrap().len(), 1);
		assert!(store.delete_category(engines.id).await.unwrap());

		let post = store.get_post(post.id).await.unwrap().unwrap();
		assert_eq!(post.category_id, None);
	}

	#[tokio::test]
	async fn test_category_names_are_unique() {
		let store = MemoryStore::new();
		store.create_category(category("Engines")).await.unwrap();
		let looms = store.create_category(category("Looms")).await.unwrap();

		assert!(matches!(
			store.create_category(category("Engines")).await,
			Err(Error::CategoryTaken)
		));

		let rename = UpdateCategory {
			name: Some("Engines".into()),
			description: None,
		};

		assert!(matches!(
			store.update_category(looms.id, rename).await,
			Err(Error::CategoryTaken)
		));
		assert_eq!(
			store.get_category_by_name("Looms").await.unwrap(),
			Some(looms)
		);
	}

	#[tokio::test]
	async fn test_lookups() {
		let store = MemoryStore::new();
		let (user, _) = seed(&store).await;

		let first = store
			.create_tag(CreateTag {
				label: "math".into(),
			})
			.await
			.unwrap();
		let second = store
			.create_tag(CreateTag {
				label: "math".into(),
			})
			.await
			.unwrap();

		assert_eq!(store.find_tags("math").await.unwrap(), vec![first.clone(), second]);
		assert!(store.find_tags("poetry").await.unwrap().is_empty());
		assert_eq!(store.get_tag(first.id).await.unwrap(), Some(first));

		let found = store.get_user_by_username("ada").await.unwrap().unwrap();
		assert_eq!(found.id, user.id);
		assert_eq!(found.last_name, "Lovelace");
		assert!(store.get_user_by_username("alan").await.unwrap().is_none());
		assert!(store.get_user(user.id).await.unwrap().is_some());
	}
}
