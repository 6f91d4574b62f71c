//! Asset and resource management system
//!
//! Provides path-keyed resource caching with:
//! - Shared, reference-counted asset handles
//! - One memoizing cache per asset type with pluggable loaders
//! - Disposal on eviction

mod handle;
mod storage;

pub use handle::AssetHandle;
pub use storage::{
    Asset, AssetCache, AssetError, AssetLoader, AssetServer, FileLoader, executable_dir,
    normalize_path,
};
