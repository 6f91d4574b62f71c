//! Asset cache and server
//!
//! One [`AssetCache`] per asset type memoizes loads under a normalized
//! absolute path. The [`AssetServer`] keeps one cache per type.

use std::any::{Any, TypeId};
use std::fmt;
use std::path::{Component, Path, PathBuf};

use rustc_hash::FxHashMap;

use super::handle::AssetHandle;

/// Asset loading error
#[derive(Debug)]
pub enum AssetError {
    /// Nothing exists at the path
    NotFound(PathBuf),
    /// The loader could not decode the resource
    Load { path: PathBuf, reason: String },
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "Asset not found: {}", path.display()),
            Self::Load { path, reason } => {
                write!(f, "Failed to load {}: {reason}", path.display())
            }
        }
    }
}

impl std::error::Error for AssetError {}

/// A loadable resource.
///
/// `dispose` releases anything held outside the value itself; it runs when
/// the cache evicts the entry.
pub trait Asset: Send + Sync + 'static {
    fn dispose(&self) {}
}

impl Asset for Vec<u8> {}

impl Asset for String {}

/// Type-specific loader from an absolute path
pub trait AssetLoader<T>: Send + Sync {
    fn load(&self, path: &Path) -> Result<T, AssetError>;
}

impl<T, F> AssetLoader<T> for F
where
    F: Fn(&Path) -> Result<T, AssetError> + Send + Sync,
{
    fn load(&self, path: &Path) -> Result<T, AssetError> {
        self(path)
    }
}

/// Reads whole files as raw bytes
#[derive(Debug, Clone, Copy, Default)]
pub struct FileLoader;

impl AssetLoader<Vec<u8>> for FileLoader {
    fn load(&self, path: &Path) -> Result<Vec<u8>, AssetError> {
        std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AssetError::NotFound(path.to_path_buf()),
            _ => AssetError::Load {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
        })
    }
}

/// Directory holding the running executable
#[must_use]
pub fn executable_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_default()
}

fn is_drive_rooted(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Resolve `raw` to the cache key used for it.
///
/// `file://` and `file:///` prefixes are stripped. Absolute and
/// drive-rooted paths are kept as given; anything else has its leading
/// separators trimmed and is joined onto `base`.
#[must_use]
pub fn normalize_path(raw: &str, base: &Path) -> PathBuf {
    let mut path = raw.trim();
    if let Some(rest) = path.strip_prefix("file:///")
        && is_drive_rooted(rest)
    {
        path = rest;
    } else if let Some(rest) = path.strip_prefix("file://") {
        path = rest;
    }

    if is_drive_rooted(path) || Path::new(path).is_absolute() {
        return PathBuf::from(path);
    }

    let relative = path.trim_start_matches(['/', '\\']);
    lexical_clean(&base.join(relative))
}

/// Drop `.` segments and fold `..` into the preceding segment
fn lexical_clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Path-keyed memoizing cache for one asset type
pub struct AssetCache<T: Asset> {
    loader: Box<dyn AssetLoader<T>>,
    base_dir: PathBuf,
    entries: FxHashMap<PathBuf, AssetHandle<T>>,
}

impl<T: Asset> AssetCache<T> {
    /// Cache resolving relative paths against the executable directory
    pub fn new(loader: impl AssetLoader<T> + 'static) -> Self {
        Self::with_base_dir(loader, executable_dir())
    }

    /// Cache resolving relative paths against `base_dir`
    pub fn with_base_dir(loader: impl AssetLoader<T> + 'static, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            loader: Box::new(loader),
            base_dir: base_dir.into(),
            entries: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Cache key for `path`
    #[must_use]
    pub fn normalize(&self, path: &str) -> PathBuf {
        normalize_path(path, &self.base_dir)
    }

    /// Fetch an asset, loading it on a miss or when `reload` is set.
    ///
    /// Returns `None` if the loader fails. A failed reload keeps the
    /// previously cached entry.
    pub fn get(&mut self, path: &str, reload: bool) -> Option<AssetHandle<T>> {
        let key = self.normalize(path);
        if !reload && let Some(handle) = self.entries.get(&key) {
            return Some(handle.clone());
        }

        match self.loader.load(&key) {
            Ok(asset) => {
                log::debug!("Loaded asset {}", key.display());
                let handle = AssetHandle::new(asset);
                self.entries.insert(key, handle.clone());
                Some(handle)
            }
            Err(e) => {
                log::warn!("{e}");
                None
            }
        }
    }

    /// Cached entry without loading
    #[must_use]
    pub fn peek(&self, path: &str) -> Option<&AssetHandle<T>> {
        self.entries.get(&self.normalize(path))
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(&self.normalize(path))
    }

    /// Dispose and evict an entry; returns false if it was not cached
    pub fn unload(&mut self, path: &str) -> bool {
        let key = self.normalize(path);
        match self.entries.remove(&key) {
            Some(handle) => {
                log::debug!("Disposing asset {}", key.display());
                handle.dispose();
                true
            }
            None => false,
        }
    }

    /// Dispose and evict every entry; the cache stays usable
    pub fn clear(&mut self) {
        for (path, handle) in self.entries.drain() {
            log::debug!("Disposing asset {}", path.display());
            handle.dispose();
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, &AssetHandle<T>)> {
        self.entries.iter().map(|(path, handle)| (path.as_path(), handle))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: Asset> fmt::Debug for AssetCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetCache")
            .field("base_dir", &self.base_dir)
            .field("entries", &self.entries.len())
            .finish()
    }
}

/// Type-erased view of a cache held by the server
trait ErasedCache: Send + Sync {
    fn clear(&mut self);
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Asset> ErasedCache for AssetCache<T> {
    fn clear(&mut self) {
        AssetCache::clear(self);
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Holds one cache per asset type
#[derive(Default)]
pub struct AssetServer {
    caches: FxHashMap<TypeId, Box<dyn ErasedCache>>,
}

impl AssetServer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the cache for `T`, replacing (and clearing) any previous one
    pub fn register<T: Asset>(&mut self, cache: AssetCache<T>) {
        if let Some(mut old) = self.caches.insert(TypeId::of::<T>(), Box::new(cache)) {
            old.clear();
        }
    }

    /// Cache for `T`, if one was registered
    pub fn cache<T: Asset>(&mut self) -> Option<&mut AssetCache<T>> {
        self.caches
            .get_mut(&TypeId::of::<T>())
            .and_then(|cache| cache.as_any_mut().downcast_mut::<AssetCache<T>>())
    }

    /// Fetch through the cache for `T`
    pub fn get<T: Asset>(&mut self, path: &str, reload: bool) -> Option<AssetHandle<T>> {
        match self.cache::<T>() {
            Some(cache) => cache.get(path, reload),
            None => {
                log::warn!("No asset cache registered for {}", std::any::type_name::<T>());
                None
            }
        }
    }

    /// Clear every registered cache
    pub fn clear(&mut self) {
        for cache in self.caches.values_mut() {
            cache.clear();
        }
    }
}

impl fmt::Debug for AssetServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetServer")
            .field("caches", &self.caches.len())
            .finish()
    }
}
