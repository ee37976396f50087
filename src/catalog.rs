//! Model catalog loading and lookup
//!
//! The catalog is a YAML document (conventionally `<model_root>/db/model_db.yml`)
//! with a top-level `models` list. Each entry names at minimum a `framework`
//! and a `model_name`; any further fields are kept as free-form metadata.
//!
//! The catalog is a pure data load: it is built once at startup, is immutable
//! afterwards, and is safe to share by reference across lookups.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BatchProbeError, ProbeResult};

/// Inference frameworks known to the benchmarking executable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    Caffe,
    Caffe2,
    Tensorflow,
    Darknet,
}

impl Framework {
    /// All supported frameworks, in catalog order
    pub const ALL: [Framework; 4] = [
        Framework::Caffe,
        Framework::Caffe2,
        Framework::Tensorflow,
        Framework::Darknet,
    ];

    /// The name used on the benchmarking executable's command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Framework::Caffe => "caffe",
            Framework::Caffe2 => "caffe2",
            Framework::Tensorflow => "tensorflow",
            Framework::Darknet => "darknet",
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Framework {
    type Err = BatchProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "caffe" => Ok(Framework::Caffe),
            "caffe2" => Ok(Framework::Caffe2),
            "tensorflow" => Ok(Framework::Tensorflow),
            "darknet" => Ok(Framework::Darknet),
            other => Err(BatchProbeError::UnknownFramework(other.to_string())),
        }
    }
}

/// One catalog entry: a model known to the benchmarking executable
///
/// Immutable once loaded. `metadata` carries whatever extra fields the
/// catalog author recorded (input shapes, weight files, notes); this crate
/// never interprets them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRecord {
    pub framework: Framework,
    pub model_name: String,
    #[serde(flatten, default)]
    pub metadata: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Deserialize)]
struct ModelDb {
    models: Vec<ModelRecord>,
}

/// Two-level lookup of catalog entries: framework, then model name
#[derive(Debug, Default)]
pub struct ModelCatalog {
    models: HashMap<Framework, HashMap<String, ModelRecord>>,
}

impl ModelCatalog {
    /// Conventional catalog location under a model root directory
    pub fn default_path(model_root: &Path) -> PathBuf {
        model_root.join("db").join("model_db.yml")
    }

    /// Load the catalog from a YAML file
    pub fn load(path: &Path) -> ProbeResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| {
            BatchProbeError::CatalogRead {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::parse(&text, path)
    }

    /// Parse a catalog from YAML text (used directly by tests)
    pub fn from_str(yaml: &str) -> ProbeResult<Self> {
        Self::parse(yaml, Path::new("<inline>"))
    }

    fn parse(yaml: &str, path: &Path) -> ProbeResult<Self> {
        let db: ModelDb =
            serde_yaml::from_str(yaml).map_err(|err| BatchProbeError::CatalogParse {
                path: path.to_path_buf(),
                message: err.to_string(),
            })?;

        let mut models: HashMap<Framework, HashMap<String, ModelRecord>> = HashMap::new();
        for record in db.models {
            models
                .entry(record.framework)
                .or_default()
                .insert(record.model_name.clone(), record);
        }
        Ok(ModelCatalog { models })
    }

    /// Look up a single record
    pub fn lookup(&self, framework: Framework, model_name: &str) -> Option<&ModelRecord> {
        self.models.get(&framework)?.get(model_name)
    }

    /// Frameworks present in the catalog, sorted
    pub fn frameworks(&self) -> Vec<Framework> {
        let mut frameworks: Vec<Framework> = self.models.keys().copied().collect();
        frameworks.sort();
        frameworks
    }

    /// All records for one framework, sorted by model name
    pub fn models_for(&self, framework: Framework) -> Vec<&ModelRecord> {
        let mut records: Vec<&ModelRecord> = self
            .models
            .get(&framework)
            .map(|by_name| by_name.values().collect())
            .unwrap_or_default();
        records.sort_by(|a, b| a.model_name.cmp(&b.model_name));
        records
    }

    /// Resolve a CLI selection into concrete records.
    ///
    /// Three modes: explicit framework + model, explicit framework (all of
    /// its models), or neither (every catalog entry). A named model that is
    /// absent from a framework simply contributes nothing — selecting an
    /// unknown model is a no-op, not an error.
    pub fn select(&self, framework: Option<Framework>, model: Option<&str>) -> Vec<&ModelRecord> {
        let frameworks = match framework {
            Some(fw) => vec![fw],
            None => self.frameworks(),
        };

        let mut selected = Vec::new();
        for fw in frameworks {
            match model {
                Some(name) => {
                    if let Some(record) = self.lookup(fw, name) {
                        selected.push(record);
                    }
                }
                None => selected.extend(self.models_for(fw)),
            }
        }
        selected
    }

    /// Total number of catalog entries
    pub fn len(&self) -> usize {
        self.models.values().map(|by_name| by_name.len()).sum()
    }

    /// True when the catalog holds no entries
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
