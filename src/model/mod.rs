//! Entities stored by the blog, shared by the public handlers and the admin.

mod category;
mod image;
mod post;
mod tag;
mod user;

pub use category::{Category, CreateCategory, UpdateCategory};
pub use image::{CreateImage, Image, UpdateImage};
pub use post::{CreatePost, Post, PostDetail, PostFilter, PostStatus, UpdatePost};
pub use tag::{CreateTag, Tag, UpdateTag};
pub use user::{CreateUser, UpdateUser, User};

use chrono::{DateTime, Utc};

/// An entity that tracks when it was created and last written.
///
/// Every write to the entity must go through [`Timestamped::touch`] (or the
/// equivalent `updated_at = now()` in SQL) so `updated_at` never lags behind.
pub trait Timestamped {
	fn touch(&mut self, now: DateTime<Utc>);
}

macro_rules! timestamped {
	($($ty:ty),+ $(,)?) => {
		$(
			impl Timestamped for $ty {
				fn touch(&mut self, now: DateTime<Utc>) {
					self.updated_at = now;
				}
			}
		)+
	};
}

timestamped!(Post, Image, Category);
