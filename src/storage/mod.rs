pub mod memory;
pub mod text_cache;

pub use memory::{DocumentIndex, IndexCache};
pub use text_cache::{TextCache, TextCacheStats};
