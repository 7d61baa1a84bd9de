//! Fetching schema documents by URI, and caching them once fetched.
//!
//! A [`LoaderRegistry`] holds an ordered list of [`Loader`]s and a cache of every schema it has
//! imported, keyed by URI. The cache is what lets a schema reference itself (directly or through
//! a chain of `extends`) without looping forever: the second request for a URI returns the
//! already-loaded instance.
//!
//! ```
//! # use jschema::loader::*;
//! # fn main() -> jschema::Result<()> {
//! let mut memory = MemoryLoader::new();
//! memory.insert_schema("http://example.com/person", r#"{"type":"object"}"#);
//!
//! let mut registry = LoaderRegistry::new();
//! registry.add_loader(memory);
//!
//! let schema = registry.import("http://example.com/person")?;
//! assert_eq!(schema.id.as_deref(), Some("http://example.com/person"));
//! # Ok(())
//! # }
//! ```

mod file;
#[cfg(feature = "http")]
mod http;
mod memory;

pub use self::file::FileLoader;
#[cfg(feature = "http")]
pub use self::http::HttpLoader;
pub use self::memory::{MemoryLoader, RequestLog};

use crate::error::{Error, Result};
use crate::schema::Schema;
use crate::uri::Uri;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, trace};

/// The only media type a loaded schema document may have.
pub const SCHEMA_MEDIA_TYPE: &str = "application/schema+json";

/// Raw content produced by a [`Loader`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resource {
    pub body: Vec<u8>,
    /// Media type reported for the body, possibly with parameters like `; charset=utf-8`.
    pub content_type: Option<String>,
}

impl Resource {
    pub fn new(body: impl Into<Vec<u8>>, content_type: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            content_type: Some(content_type.into()),
        }
    }

    /// Content tagged with [`SCHEMA_MEDIA_TYPE`].
    pub fn schema(body: impl Into<Vec<u8>>) -> Self {
        Self::new(body, SCHEMA_MEDIA_TYPE)
    }

    /// The media type without any parameters.
    pub fn media_type(&self) -> Option<&str> {
        self.content_type
            .as_deref()
            .map(|ct| ct.split(';').next().unwrap_or_default().trim())
    }
}

/// Retrieves raw schema content for a URI.
pub trait Loader: Send + Sync {
    /// Fetch the content at `uri`. Failures should be reported as [`Error::ResourceNotFound`].
    fn load(&self, uri: &str) -> Result<Resource>;

    /// Whether this loader should be asked for `uri` at all.
    fn supports(&self, uri: &str) -> bool;
}

/// Ordered loaders plus the URI-keyed schema cache.
#[derive(Default)]
pub struct LoaderRegistry {
    loaders: Vec<Box<dyn Loader>>,
    cache: RwLock<HashMap<String, Arc<Schema>>>,
}

impl fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let cached: Vec<String> = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        f.debug_struct("LoaderRegistry")
            .field("loaders", &self.loaders.len())
            .field("cached", &cached)
            .finish()
    }
}

impl LoaderRegistry {
    /// A registry with no loaders. Every uncached import fails until one is added.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry that can read local files, and fetch over HTTP when the `http` feature is on.
    pub fn with_default_loaders() -> Self {
        let mut registry = Self::new();
        #[cfg(feature = "http")]
        match HttpLoader::new() {
            Ok(http) => registry.add_loader(http),
            Err(e) => tracing::warn!("HTTP schema loader unavailable: {}", e),
        }
        registry.add_loader(FileLoader::new());
        registry
    }

    /// Append a loader. Loaders are tried in the order they were added.
    pub fn add_loader(&mut self, loader: impl Loader + 'static) {
        self.loaders.push(Box::new(loader));
    }

    /// Replace every loader.
    pub fn set_loaders(&mut self, loaders: Vec<Box<dyn Loader>>) {
        self.loaders = loaders;
    }

    /// Put a schema in the cache under `uri`, unless one is already there. Returns whichever
    /// schema ends up cached.
    pub fn register(&self, uri: &str, schema: Schema) -> Arc<Schema> {
        self.insert(Uri::without_fragment(uri), Arc::new(schema))
    }

    /// The cached schema for `uri`, if it has been imported or registered.
    pub fn cached(&self, uri: &str) -> Option<Arc<Schema>> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(Uri::without_fragment(uri))
            .cloned()
    }

    pub fn clear_cache(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Get the schema at `uri`, loading it through the first supporting loader if it isn't
    /// cached yet.
    ///
    /// The loaded schema's `id` is set to `uri` (without its fragment), so relative references
    /// inside it resolve against where it was actually found.
    pub fn import(&self, uri: &str) -> Result<Arc<Schema>> {
        let key = Uri::without_fragment(uri);
        if let Some(schema) = self.cached(key) {
            trace!(uri = key, "schema cache hit");
            return Ok(schema);
        }

        let loader = self
            .loaders
            .iter()
            .find(|loader| loader.supports(key))
            .ok_or_else(|| {
                debug!(uri = key, "no loader supports this URI");
                Error::ResourceNotFound(key.to_string())
            })?;
        debug!(uri = key, "loading schema");
        let resource = loader.load(key)?;

        let media_type = resource.media_type().unwrap_or_default();
        if !media_type.eq_ignore_ascii_case(SCHEMA_MEDIA_TYPE) {
            return Err(Error::InvalidSchemaMediaType {
                expected: SCHEMA_MEDIA_TYPE.to_string(),
                actual: media_type.to_string(),
            });
        }

        let text = std::str::from_utf8(&resource.body)
            .map_err(|e| Error::JsonDecoding(format!("{} is not UTF-8: {}", key, e)))?;
        let schema = Schema::from_json_str(text)?.id(key);
        Ok(self.insert(key, Arc::new(schema)))
    }

    fn insert(&self, key: &str, schema: Arc<Schema>) -> Arc<Schema> {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        cache.entry(key.to_string()).or_insert(schema).clone()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::schema::SimpleType;

    const PARENT: &str = r#"{
        "type":"object",
        "title":"parent",
        "properties":{"parentProp":{"type":"boolean"}}
    }"#;

    fn registry_with(loader: MemoryLoader) -> LoaderRegistry {
        let mut registry = LoaderRegistry::new();
        registry.add_loader(loader);
        registry
    }

    #[test]
    fn import_sets_id_and_caches() {
        let mut memory = MemoryLoader::new();
        memory.insert_schema("http://some.host.at/somewhere/parent", PARENT);
        let log = memory.request_log();
        let registry = registry_with(memory);

        let first = registry
            .import("http://some.host.at/somewhere/parent#/x")
            .unwrap();
        assert_eq!(
            first.id.as_deref(),
            Some("http://some.host.at/somewhere/parent")
        );
        assert_eq!(first.title.as_deref(), Some("parent"));

        let second = registry.import("http://some.host.at/somewhere/parent").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(log.requests(), vec!["http://some.host.at/somewhere/parent"]);
    }

    #[test]
    fn wrong_media_type() {
        let mut memory = MemoryLoader::new();
        memory.insert("http://some.host.at/somewhere/parent", PARENT, "text/html");
        let registry = registry_with(memory);
        let err = registry
            .import("http://some.host.at/somewhere/parent")
            .unwrap_err();
        match err {
            Error::InvalidSchemaMediaType { expected, actual } => {
                assert_eq!(expected, SCHEMA_MEDIA_TYPE);
                assert_eq!(actual, "text/html");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn media_type_parameters_are_ignored() {
        let mut memory = MemoryLoader::new();
        memory.insert(
            "http://h/s",
            "{}",
            "Application/Schema+JSON; charset=utf-8",
        );
        let registry = registry_with(memory);
        assert!(registry.import("http://h/s").is_ok());
    }

    #[test]
    fn bad_body_is_a_decoding_error() {
        let mut memory = MemoryLoader::new();
        memory.insert_schema("http://h/s", "<html>");
        let registry = registry_with(memory);
        assert!(matches!(
            registry.import("http://h/s"),
            Err(Error::JsonDecoding(_))
        ));
        assert!(registry.cached("http://h/s").is_none());
    }

    #[test]
    fn empty_registry_finds_nothing() {
        let registry = LoaderRegistry::new();
        assert!(matches!(
            registry.import("http://some.host.at/somewhere/parent"),
            Err(Error::ResourceNotFound(_))
        ));
    }

    #[test]
    fn register_is_insert_if_absent() {
        let registry = LoaderRegistry::new();
        let first = registry.register("http://h/a", Schema::new().kind(SimpleType::String));
        let second = registry.register("http://h/a", Schema::new().kind(SimpleType::Integer));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.type_name(), Some("string"));
        assert!(registry.import("http://h/a").is_ok());

        registry.clear_cache();
        assert!(registry.cached("http://h/a").is_none());
    }

    #[test]
    fn first_supporting_loader_wins() {
        let mut a = MemoryLoader::new();
        a.insert_schema("http://h/a", r#"{"title":"from a"}"#);
        let mut b = MemoryLoader::new();
        b.insert_schema("http://h/a", r#"{"title":"from b"}"#);
        b.insert_schema("http://h/b", r#"{"title":"only b"}"#);

        let mut registry = LoaderRegistry::new();
        registry.set_loaders(vec![Box::new(a), Box::new(b)]);
        assert_eq!(
            registry.import("http://h/a").unwrap().title.as_deref(),
            Some("from a")
        );
        assert_eq!(
            registry.import("http://h/b").unwrap().title.as_deref(),
            Some("only b")
        );
    }

    #[test]
    fn concurrent_imports_converge() {
        let mut memory = MemoryLoader::new();
        memory.insert_schema("http://h/shared", PARENT);
        let registry = Arc::new(registry_with(memory));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.import("http://h/shared").unwrap())
            })
            .collect();
        let schemas: Vec<Arc<Schema>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let cached = registry.cached("http://h/shared").unwrap();
        for schema in schemas {
            assert!(Arc::ptr_eq(&schema, &cached));
        }
    }
}
