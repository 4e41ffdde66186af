//! Model registry.
//!
//! Populated once at startup from the configured model list and read-only
//! afterwards. The recognition driver registers the geometries with the
//! engine; the publisher looks up mesh URIs for markers.

use std::collections::HashMap;

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use super::resource::ResourceRetriever;
use crate::error::{Error, Result};

/// One configured model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Unique label reported with detections
    pub label: String,
    /// Geometry resource: ASCII point list in millimetres
    pub model_uri: String,
    /// Visualization mesh resource
    pub mesh_uri: String,
}

/// Model point set in millimetres.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelGeometry {
    pub points_mm: Vec<Point3<f64>>,
}

impl ModelGeometry {
    /// Parse an ASCII point list.
    ///
    /// One point per line as `x y z` (further columns such as normals are
    /// ignored). Blank lines and lines starting with `#` are skipped.
    pub fn parse(text: &str) -> std::result::Result<Self, String> {
        let mut points_mm = Vec::new();
        for (n, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let coords: Vec<f64> = line
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|s| !s.is_empty())
                .take(3)
                .map(str::parse::<f64>)
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| format!("line {}: {}", n + 1, e))?;
            let [x, y, z] = coords[..] else {
                return Err(format!("line {}: expected 3 coordinates", n + 1));
            };
            points_mm.push(Point3::new(x, y, z));
        }
        if points_mm.is_empty() {
            return Err("no points".to_string());
        }
        Ok(Self { points_mm })
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points_mm.len()
    }

    /// Check if geometry has no points.
    pub fn is_empty(&self) -> bool {
        self.points_mm.is_empty()
    }
}

/// Registered model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelEntry {
    pub label: String,
    pub geometry: ModelGeometry,
    pub mesh_uri: String,
}

/// Label-keyed model store, iterated in registration order.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    entries: Vec<ModelEntry>,
    index: HashMap<String, usize>,
}

impl ModelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every configured model.
    ///
    /// A model whose geometry cannot be fetched or parsed is logged and
    /// skipped; loading never aborts.
    pub fn load(configs: &[ModelConfig], retriever: &ResourceRetriever) -> Self {
        let mut registry = Self::new();
        for config in configs {
            match Self::load_one(config, retriever) {
                Ok(entry) => {
                    log::info!(
                        "Loaded model \"{}\" ({} points) from {}",
                        entry.label,
                        entry.geometry.len(),
                        config.model_uri
                    );
                    if let Err(e) = registry.insert(entry) {
                        log::error!("{}", e);
                    }
                }
                Err(e) => log::error!("{}", e),
            }
        }
        registry
    }

    fn load_one(config: &ModelConfig, retriever: &ResourceRetriever) -> Result<ModelEntry> {
        let model_load = |reason: String| Error::ModelLoad {
            label: config.label.clone(),
            reason,
        };

        let text = retriever
            .fetch_string(&config.model_uri)
            .map_err(|e| model_load(e.to_string()))?;
        let geometry = ModelGeometry::parse(&text).map_err(model_load)?;
        if !retriever.exists(&config.mesh_uri) {
            log::warn!(
                "Mesh for model \"{}\" not found at {}; markers will reference it anyway",
                config.label,
                config.mesh_uri
            );
        }

        Ok(ModelEntry {
            label: config.label.clone(),
            geometry,
            mesh_uri: config.mesh_uri.clone(),
        })
    }

    /// Add a model; labels must be unique.
    pub fn insert(&mut self, entry: ModelEntry) -> Result<()> {
        if self.index.contains_key(&entry.label) {
            return Err(Error::ModelLoad {
                label: entry.label,
                reason: "duplicate label".to_string(),
            });
        }
        self.index.insert(entry.label.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    /// Look up a model by label.
    pub fn get(&self, label: &str) -> Option<&ModelEntry> {
        self.index.get(label).map(|&i| &self.entries[i])
    }

    /// Mesh resource for `label`.
    pub fn mesh_uri(&self, label: &str) -> Option<&str> {
        self.get(label).map(|e| e.mesh_uri.as_str())
    }

    /// Iterate models in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ModelEntry> {
        self.entries.iter()
    }

    /// Registered labels in registration order.
    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    /// Number of models.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn model_file(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn test_parse_geometry() {
        let g = ModelGeometry::parse("# mug\n1 2 3\n\n4.5,5,6 0 0 1\n").unwrap();
        assert_eq!(
            g.points_mm,
            vec![Point3::new(1.0, 2.0, 3.0), Point3::new(4.5, 5.0, 6.0)]
        );
    }

    #[test]
    fn test_parse_rejects_bad_lines() {
        assert!(ModelGeometry::parse("1 2\n").is_err());
        assert!(ModelGeometry::parse("1 two 3\n").is_err());
        assert!(ModelGeometry::parse("# only a comment\n").is_err());
    }

    #[test]
    fn test_load_skips_failing_models() {
        let good = model_file("0 0 0\n10 0 0\n0 10 0\n");
        let bad = model_file("not a point\n");
        let configs = vec![
            ModelConfig {
                label: "mug".into(),
                model_uri: format!("file://{}", good.path().display()),
                mesh_uri: "package://models/mug.stl".into(),
            },
            ModelConfig {
                label: "bowl".into(),
                model_uri: format!("file://{}", bad.path().display()),
                mesh_uri: "package://models/bowl.stl".into(),
            },
            ModelConfig {
                label: "plate".into(),
                model_uri: "/missing/plate.xyz".into(),
                mesh_uri: "package://models/plate.stl".into(),
            },
        ];

        let registry = ModelRegistry::load(&configs, &ResourceRetriever::new());

        assert_eq!(registry.labels(), vec!["mug"]);
        assert_eq!(registry.mesh_uri("mug"), Some("package://models/mug.stl"));
        assert_eq!(registry.get("mug").unwrap().geometry.len(), 3);
        assert!(registry.get("bowl").is_none());
    }

    #[test]
    fn test_duplicate_label_rejected() {
        let mut registry = ModelRegistry::new();
        let entry = ModelEntry {
            label: "mug".into(),
            geometry: ModelGeometry::default(),
            mesh_uri: "m.stl".into(),
        };
        registry.insert(entry.clone()).unwrap();
        assert!(registry.insert(entry).is_err());
        assert_eq!(registry.len(), 1);
    }
}
