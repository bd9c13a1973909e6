use serde_json::{Map, Value};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// Blog entry id -> ISO-8601 timestamp of its last commit
pub type UpdatedAtMap = Map<String, Value>;

/// Where the generated updated-at JSON comes from.
pub trait UpdatedAtSource: Send + Sync {
    fn read_json(&self) -> io::Result<String>;
}

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UpdatedAtSource for FileSource {
    fn read_json(&self) -> io::Result<String> {
        std::fs::read_to_string(&self.path)
    }
}

impl UpdatedAtSource for Box<dyn UpdatedAtSource> {
    fn read_json(&self) -> io::Result<String> {
        (**self).read_json()
    }
}

/// Loads the map once and keeps it until `clear_cache` is called.
pub struct UpdatedAtLoader<S> {
    source: S,
    fallback: Arc<UpdatedAtMap>,
    cache: Mutex<Option<Arc<UpdatedAtMap>>>,
}

impl<S: UpdatedAtSource> UpdatedAtLoader<S> {
    pub fn new(source: S) -> Self {
        Self::with_fallback(source, UpdatedAtMap::new())
    }

    pub fn with_fallback(source: S, fallback: UpdatedAtMap) -> Self {
        Self {
            source,
            fallback: Arc::new(fallback),
            cache: Mutex::new(None),
        }
    }

    /// Unreadable files, bad JSON and non-object JSON all yield the fallback,
    /// which is then cached like a successful read.
    pub fn map(&self) -> Arc<UpdatedAtMap> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(map) = cache.as_ref() {
            return map.clone();
        }

        let map = match self.load() {
            Some(map) => Arc::new(map),
            None => self.fallback.clone(),
        };
        *cache = Some(map.clone());
        map
    }

    fn load(&self) -> Option<UpdatedAtMap> {
        let raw = match self.source.read_json() {
            Ok(raw) => raw,
            Err(err) => {
                tracing::debug!(error = %err, "updated-at map unreadable, using fallback");
                return None;
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Some(map),
            Ok(_) => {
                tracing::warn!("updated-at map is not a JSON object, using fallback");
                None
            }
            Err(err) => {
                tracing::warn!(error = %err, "updated-at map is not valid JSON, using fallback");
                None
            }
        }
    }

    pub fn blog_updated_at(&self, entry_id: &str) -> Option<String> {
        self.map()
            .get(entry_id)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    pub fn clear_cache(&self) {
        *self.cache.lock().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

/// Picks the generated file location for either the app or the repo root.
pub fn default_updated_at_path(cwd: &Path, exists: impl Fn(&Path) -> bool) -> PathBuf {
    let candidates = [
        cwd.join("src").join("generated").join("blog-updated-at.json"),
        cwd.join("apps").join("web").join("src").join("generated").join("blog-updated-at.json"),
    ];

    candidates
        .iter()
        .find(|p| exists(p))
        .unwrap_or(&candidates[0])
        .clone()
}
