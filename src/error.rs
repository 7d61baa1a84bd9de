use std::fmt;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Structural failures that stop a check from running at all.
///
/// Data that doesn't match a schema is never reported through this type; those mismatches are
/// collected as [`ValidationError`][crate::ValidationError]s instead.
#[derive(Debug)]
pub enum Error {
    /// Schema text or loaded schema content wasn't valid JSON.
    JsonDecoding(String),
    /// A relative URI couldn't be resolved against its base, usually because it climbed above the
    /// base's root with too many `../` segments.
    UriResolution { uri: String, base: String },
    /// No loader could produce content for the URI, or the loader that tried failed.
    ResourceNotFound(String),
    /// A loader returned content with a media type other than
    /// [`SCHEMA_MEDIA_TYPE`][crate::loader::SCHEMA_MEDIA_TYPE].
    InvalidSchemaMediaType { expected: String, actual: String },
    /// A caller-supplied argument made the check impossible, such as a missing schema.
    InvalidArgument(String),
    /// The schema decoded as JSON but isn't a usable schema document.
    InvalidSchema(String),
    /// An `extends` or `$ref` string isn't a URI that can be loaded.
    InvalidSourceUri(String),
    /// Schema/value nesting went past the configured depth limit.
    SchemaTooDeep { max: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::JsonDecoding(ref err) => write!(f, "JSON decoding failed: {}", err),
            Error::UriResolution { ref uri, ref base } => {
                write!(f, "Unable to resolve URI '{}' from base '{}'", uri, base)
            }
            Error::ResourceNotFound(ref uri) => write!(
                f,
                "Unable to load \"{}\". No loader was able to process this resource.",
                uri
            ),
            Error::InvalidSchemaMediaType {
                ref expected,
                ref actual,
            } => write!(f, "Media type {} expected but got {}", expected, actual),
            Error::InvalidArgument(ref err) => write!(f, "Invalid argument: {}", err),
            Error::InvalidSchema(ref err) => write!(f, "Invalid schema: {}", err),
            Error::InvalidSourceUri(ref uri) => write!(f, "\"{}\" is not a valid URI.", uri),
            Error::SchemaTooDeep { max } => {
                write!(f, "Schema nesting exceeded the depth limit of {}", max)
            }
        }
    }
}

impl std::error::Error for Error {}

impl std::convert::From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::JsonDecoding(e.to_string())
    }
}

impl std::convert::From<regex::Error> for Error {
    fn from(e: regex::Error) -> Self {
        Self::InvalidSchema(format!("bad regular expression: {}", e))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_messages() {
        let err = Error::UriResolution {
            uri: "../../x".into(),
            base: "http://host/a".into(),
        };
        assert_eq!(
            err.to_string(),
            "Unable to resolve URI '../../x' from base 'http://host/a'"
        );
        let err = Error::InvalidSchemaMediaType {
            expected: "application/schema+json".into(),
            actual: "text/html".into(),
        };
        assert_eq!(
            err.to_string(),
            "Media type application/schema+json expected but got text/html"
        );
    }

    #[test]
    fn from_serde_json() {
        let err: Error = serde_json::from_str::<serde_json::Value>("<html>")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::JsonDecoding(_)));
    }
}
