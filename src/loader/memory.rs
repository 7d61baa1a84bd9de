use super::{Loader, Resource};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Shared record of every URI a [`MemoryLoader`] was asked to load, in order.
#[derive(Clone, Debug, Default)]
pub struct RequestLog(Arc<Mutex<Vec<String>>>);

impl RequestLog {
    pub fn requests(&self) -> Vec<String> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn push(&self, uri: &str) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(uri.to_string());
    }
}

/// Serves schema documents from a fixed in-memory table.
///
/// Handy for bundling schemas into a binary, and for tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryLoader {
    resources: HashMap<String, Resource>,
    log: RequestLog,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` at `uri` with the given content type.
    pub fn insert(
        &mut self,
        uri: impl Into<String>,
        body: impl Into<Vec<u8>>,
        content_type: impl Into<String>,
    ) {
        self.resources
            .insert(uri.into(), Resource::new(body, content_type));
    }

    /// Serve `body` at `uri` as a schema document.
    pub fn insert_schema(&mut self, uri: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.resources.insert(uri.into(), Resource::schema(body));
    }

    /// A handle on the log of load requests, which stays readable after the loader has been
    /// handed to a registry.
    pub fn request_log(&self) -> RequestLog {
        self.log.clone()
    }
}

impl Loader for MemoryLoader {
    fn load(&self, uri: &str) -> Result<Resource> {
        self.log.push(uri);
        self.resources
            .get(uri)
            .cloned()
            .ok_or_else(|| Error::ResourceNotFound(uri.to_string()))
    }

    fn supports(&self, uri: &str) -> bool {
        self.resources.contains_key(uri)
    }
}
