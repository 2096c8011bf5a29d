pub mod filesystem;
pub mod index;
pub mod templates;

pub use filesystem::{slugify, ActivityStorage};
pub use index::{ActivityIndex, IndexedActivity};
