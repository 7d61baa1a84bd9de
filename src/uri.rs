//! URI parsing and relative reference resolution.
//!
//! Schema references (`extends`, `$ref`, `id`) may be relative. They are resolved against the
//! `id` of the schema that contains them, which the loader sets to the URI the schema was loaded
//! from. Only the handful of operations that schema linking needs are here; this is not a general
//! purpose URI library.

use crate::error::{Error, Result};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

fn uri_grammar() -> &'static Regex {
    static GRAMMAR: OnceLock<Regex> = OnceLock::new();
    GRAMMAR.get_or_init(|| {
        Regex::new(r"^(([^:/?#]+):)?(//([^/?#]*))?([^?#]*)(\?([^#]*))?(#(.*))?")
            .expect("URI grammar is a valid regular expression")
    })
}

/// The five main components of a URI.
///
/// Missing scheme and path are empty strings. Authority, query and fragment are `None` when
/// absent, so that `file:///`, `?` and `#` with nothing after them survive a round trip, and
/// `urn:` style URIs never gain a `//`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Uri {
    pub scheme: String,
    pub authority: Option<String>,
    pub path: String,
    pub query: Option<String>,
    pub fragment: Option<String>,
}

impl Uri {
    /// Split a URI into its components. Never fails; anything that doesn't fit the grammar ends
    /// up in the path.
    pub fn parse(uri: &str) -> Uri {
        let caps = match uri_grammar().captures(uri) {
            Some(caps) => caps,
            None => return Uri::default(),
        };
        let group = |i: usize| caps.get(i).map(|m| m.as_str().to_string());
        Uri {
            scheme: group(2).unwrap_or_default(),
            authority: caps.get(3).map(|_| group(4).unwrap_or_default()),
            path: group(5).unwrap_or_default(),
            query: group(7),
            fragment: group(9),
        }
    }

    /// Build a URI string from components: `scheme:`, then `//authority` when there is one,
    /// the path, and `?query` and `#fragment` only when present.
    pub fn generate(&self) -> String {
        let mut uri = format!("{}:", self.scheme);
        if let Some(ref authority) = self.authority {
            uri.push_str("//");
            uri.push_str(authority);
        }
        uri.push_str(&self.path);
        if let Some(ref query) = self.query {
            uri.push('?');
            uri.push_str(query);
        }
        if let Some(ref fragment) = self.fragment {
            uri.push('#');
            uri.push_str(fragment);
        }
        uri
    }

    /// A URI is valid only if it has a scheme. Bare paths like `"/"` are not.
    pub fn is_valid(uri: &str) -> bool {
        !Uri::parse(uri).scheme.is_empty()
    }

    /// Remove `./` segments and collapse doubled slashes. `../` segments are left alone.
    pub fn normalize_path(path: &str) -> String {
        let mut out = String::with_capacity(path.len());
        let mut rest = path;
        while !rest.is_empty() {
            let at_segment_start = out.is_empty() || out.ends_with('/');
            if at_segment_start && rest.starts_with("./") {
                rest = &rest[2..];
                continue;
            }
            let mut chars = rest.chars();
            if let Some(c) = chars.next() {
                if !(c == '/' && out.ends_with('/')) {
                    out.push(c);
                }
            }
            rest = chars.as_str();
        }
        out
    }

    /// Split a path on `/`.
    pub fn path_segments(path: &str) -> Vec<&str> {
        path.split('/').collect()
    }

    /// Glue a relative path onto the directory of `base_path`, consuming one base segment per
    /// leading `../`.
    pub fn add_path(relative: &str, base_path: &str) -> Result<String> {
        let relative = Uri::normalize_path(relative);
        let base_path = if base_path.is_empty() { "/" } else { base_path };
        let segments = Uri::path_segments(base_path);

        let mut rest = relative.as_str();
        let mut levels_up = 1;
        while let Some(stripped) = rest.strip_prefix("../") {
            rest = stripped;
            levels_up += 1;
        }
        if rest == ".." {
            rest = "";
            levels_up += 1;
        }
        if levels_up >= segments.len() {
            return Err(Error::UriResolution {
                uri: relative.clone(),
                base: base_path.to_string(),
            });
        }

        let kept = &segments[..segments.len() - levels_up];
        Ok(format!("{}/{}", kept.join("/"), rest))
    }

    /// The URI with any `#fragment` removed.
    pub fn without_fragment(uri: &str) -> &str {
        match uri.find('#') {
            Some(index) => &uri[..index],
            None => uri,
        }
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.generate())
    }
}

/// Resolves schema references against a base URI.
#[derive(Clone, Copy, Debug, Default)]
pub struct UriResolver;

impl UriResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve `uri` against `base`. Without a base, or when `uri` already has a scheme, `uri` is
    /// returned unchanged.
    pub fn resolve(&self, uri: &str, base: Option<&str>) -> Result<String> {
        let base = match base {
            Some(base) if !base.is_empty() => base,
            _ => return Ok(uri.to_string()),
        };
        if Uri::is_valid(uri) {
            return Ok(uri.to_string());
        }

        let base = Uri::parse(base);
        if base.scheme.is_empty() {
            return Err(Error::UriResolution {
                uri: uri.to_string(),
                base: base.path,
            });
        }
        if let Some(network_path) = uri.strip_prefix("//") {
            return Ok(format!("{}://{}", base.scheme, network_path));
        }

        let reference = Uri::parse(uri);
        let resolved = if reference.path.is_empty() {
            Uri {
                query: reference.query.or(base.query),
                fragment: reference.fragment,
                ..base
            }
        } else if reference.path.starts_with('/') {
            Uri {
                path: Uri::normalize_path(&reference.path),
                query: reference.query,
                fragment: reference.fragment,
                ..base
            }
        } else {
            Uri {
                path: Uri::add_path(&reference.path, &base.path).map_err(|_| {
                    Error::UriResolution {
                        uri: uri.to_string(),
                        base: base.generate(),
                    }
                })?,
                query: reference.query,
                fragment: reference.fragment,
                ..base
            }
        };
        Ok(resolved.generate())
    }

    pub fn is_valid(&self, uri: &str) -> bool {
        Uri::is_valid(uri)
    }
}
