use super::{Loader, Resource, SCHEMA_MEDIA_TYPE};
use crate::error::{Error, Result};
use crate::uri::Uri;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::{debug, warn};

/// Fetches schema documents over HTTP(S), asking for [`SCHEMA_MEDIA_TYPE`].
///
/// Uses a blocking client, so it must not be called from inside an async runtime.
#[derive(Clone, Debug)]
pub struct HttpLoader {
    client: Client,
}

impl HttpLoader {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::InvalidArgument(format!("unable to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    /// Use an already-configured client, for custom timeouts or proxies.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Loader for HttpLoader {
    fn load(&self, uri: &str) -> Result<Resource> {
        let not_found = || Error::ResourceNotFound(uri.to_string());
        let response = self
            .client
            .get(uri)
            .header(ACCEPT, SCHEMA_MEDIA_TYPE)
            .send()
            .map_err(|e| {
                warn!(uri, "schema request failed: {}", e);
                not_found()
            })?;
        let status = response.status();
        if !status.is_success() {
            debug!(uri, %status, "schema request returned an error status");
            return Err(not_found());
        }
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().map_err(|e| {
            warn!(uri, "schema response body unreadable: {}", e);
            not_found()
        })?;
        Ok(Resource {
            body: body.to_vec(),
            content_type,
        })
    }

    fn supports(&self, uri: &str) -> bool {
        let scheme = Uri::parse(uri).scheme;
        scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")
    }
}
