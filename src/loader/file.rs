use super::{Loader, Resource, SCHEMA_MEDIA_TYPE};
use crate::error::{Error, Result};
use crate::uri::Uri;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Reads schema documents from the local filesystem.
///
/// Accepts `file://` URIs and plain paths. Relative paths are taken from the root directory, if
/// one is set, or else the working directory. Files ending in `.json` are reported as
/// [`SCHEMA_MEDIA_TYPE`]; anything else as `application/octet-stream` unless a content type
/// override is set.
#[derive(Clone, Debug, Default)]
pub struct FileLoader {
    root: Option<PathBuf>,
    content_type: Option<String>,
}

impl FileLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative paths against `root`.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Report this content type for every file.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    fn path_for(&self, uri: &str) -> PathBuf {
        let uri = Uri::without_fragment(uri);
        let raw = uri.strip_prefix("file://").unwrap_or(uri);
        let path = Path::new(raw);
        match self.root {
            Some(ref root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl Loader for FileLoader {
    fn load(&self, uri: &str) -> Result<Resource> {
        let path = self.path_for(uri);
        let body = std::fs::read(&path).map_err(|e| {
            warn!(path = %path.display(), "unable to read schema file: {}", e);
            Error::ResourceNotFound(uri.to_string())
        })?;
        let content_type = match self.content_type {
            Some(ref ct) => ct.clone(),
            None if path.extension().is_some_and(|ext| ext == "json") => {
                SCHEMA_MEDIA_TYPE.to_string()
            }
            None => "application/octet-stream".to_string(),
        };
        Ok(Resource::new(body, content_type))
    }

    fn supports(&self, uri: &str) -> bool {
        let scheme = Uri::parse(uri).scheme;
        scheme.is_empty() || scheme.eq_ignore_ascii_case("file")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("jschema-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn supported_uris() {
        let loader = FileLoader::new();
        assert!(loader.supports("file:///tmp/schema.json"));
        assert!(loader.supports("schemas/person.json"));
        assert!(!loader.supports("http://example.com/schema"));
    }

    #[test]
    fn reads_json_files() {
        let dir = scratch_dir("file-loader");
        std::fs::write(dir.join("a.json"), r#"{"type":"string"}"#).unwrap();
        std::fs::write(dir.join("a.txt"), "{}").unwrap();

        let loader = FileLoader::new().root(&dir);
        let resource = loader.load("a.json").unwrap();
        assert_eq!(resource.body, br#"{"type":"string"}"#);
        assert_eq!(resource.media_type(), Some(SCHEMA_MEDIA_TYPE));

        let uri = format!("file://{}", dir.join("a.json").display());
        assert!(loader.load(&uri).is_ok());

        let resource = loader.load("a.txt").unwrap();
        assert_eq!(resource.media_type(), Some("application/octet-stream"));
        let resource = FileLoader::new()
            .root(&dir)
            .content_type(SCHEMA_MEDIA_TYPE)
            .load("a.txt")
            .unwrap();
        assert_eq!(resource.media_type(), Some(SCHEMA_MEDIA_TYPE));

        assert!(matches!(
            loader.load("missing.json"),
            Err(Error::ResourceNotFound(_))
        ));
        std::fs::remove_dir_all(&dir).ok();
    }
}
