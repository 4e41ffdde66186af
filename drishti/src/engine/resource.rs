//! Resource retrieval for model files.
//!
//! Understands `file://` URIs, `package://<name>/<path>` URIs resolved
//! against registered package roots, and plain filesystem paths.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Resolves and reads resource URIs.
#[derive(Debug, Clone, Default)]
pub struct ResourceRetriever {
    packages: HashMap<String, PathBuf>,
}

impl ResourceRetriever {
    /// Create a retriever with no package roots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the root directory of a package for `package://` URIs.
    pub fn with_package(mut self, name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        self.packages.insert(name.into(), root.into());
        self
    }

    /// Map a URI to a local path without touching the filesystem.
    pub fn resolve(&self, uri: &str) -> Result<PathBuf> {
        if let Some(path) = uri.strip_prefix("file://") {
            return Ok(PathBuf::from(path));
        }

        if let Some(rest) = uri.strip_prefix("package://") {
            let (name, relative) = rest.split_once('/').ok_or_else(|| Error::Resource {
                uri: uri.to_string(),
                reason: "package URI has no path".to_string(),
            })?;
            let root = self.packages.get(name).ok_or_else(|| Error::Resource {
                uri: uri.to_string(),
                reason: format!("unknown package '{name}'"),
            })?;
            return Ok(root.join(relative));
        }

        if let Some((scheme, _)) = uri.split_once("://") {
            return Err(Error::Resource {
                uri: uri.to_string(),
                reason: format!("unsupported scheme '{scheme}'"),
            });
        }

        Ok(PathBuf::from(uri))
    }

    /// Read the whole resource as text.
    pub fn fetch_string(&self, uri: &str) -> Result<String> {
        let path = self.resolve(uri)?;
        read_to_string(uri, &path)
    }

    /// Check that a resource resolves to an existing file.
    pub fn exists(&self, uri: &str) -> bool {
        self.resolve(uri).map(|p| p.is_file()).unwrap_or(false)
    }
}

fn read_to_string(uri: &str, path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::Resource {
        uri: uri.to_string(),
        reason: e.to_string(),
    })
}
