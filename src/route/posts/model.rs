pub use crate::route::model::{IdInput, Paginate, PostFilterInput};

/// The most posts the public listing returns at once.
pub const PAGE_SIZE: i64 = 10;
