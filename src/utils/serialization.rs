//! # Layer Serialization Utilities
//!
//! Configuration export/import for layers, plus the registry that maps a
//! layer class name back to a reconstruction function when a saved model is
//! loaded. Uses `serde` for serialization and `bincode` as the binary format.

use crate::nn::{FeatureReversalNoise, LayerError, Module};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;

// --- Error Type ---
#[derive(thiserror::Error, Debug)]
pub enum SerializationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error (bincode): {0}")]
    Bincode(#[from] bincode::Error),
    #[error("missing config key '{0}'")]
    MissingKey(String),
    #[error("config key '{key}' is not {expected}")]
    WrongType { key: String, expected: &'static str },
    #[error("no layer class '{0}' is registered")]
    UnknownClass(String),
    #[error("layer class '{0}' is already registered")]
    AlreadyRegistered(String),
    #[error(transparent)]
    Layer(#[from] LayerError),
}

/// A single configuration field value.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum ConfigValue {
    Int(i64),
    Float(f64),
    Str(String),
}

/// Serializable layer configuration: an ordered mapping from field name to
/// value, exactly sufficient to reconstruct an equivalent layer.
///
/// Uses `BTreeMap` for deterministic key order (helpful for diffs and a
/// stable on-disk layout).
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct LayerConfig(BTreeMap<String, ConfigValue>);

impl LayerConfig {
    pub fn new() -> Self {
        LayerConfig(BTreeMap::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: ConfigValue) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.0.get(key)
    }

    /// Reads an integer field as a `usize`.
    pub fn get_usize(&self, key: &str) -> Result<usize, SerializationError> {
        match self.0.get(key) {
            Some(ConfigValue::Int(v)) => {
                usize::try_from(*v).map_err(|_| SerializationError::WrongType {
                    key: key.to_string(),
                    expected: "a non-negative integer",
                })
            }
            Some(_) => Err(SerializationError::WrongType {
                key: key.to_string(),
                expected: "an integer",
            }),
            None => Err(SerializationError::MissingKey(key.to_string())),
        }
    }

    /// Reads a float field.
    pub fn get_float(&self, key: &str) -> Result<f64, SerializationError> {
        match self.0.get(key) {
            Some(ConfigValue::Float(v)) => Ok(*v),
            Some(_) => Err(SerializationError::WrongType {
                key: key.to_string(),
                expected: "a float",
            }),
            None => Err(SerializationError::MissingKey(key.to_string())),
        }
    }

    /// Reads an optional string field; absent or mistyped keys read as `None`.
    pub fn get_opt_str(&self, key: &str) -> Option<&str> {
        match self.0.get(key) {
            Some(ConfigValue::Str(s)) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Reconstruction function registered for one layer class.
pub type LayerBuilder = fn(&LayerConfig) -> Result<Arc<dyn Module>, SerializationError>;

fn build_feature_reversal_noise(
    config: &LayerConfig,
) -> Result<Arc<dyn Module>, SerializationError> {
    Ok(Arc::new(FeatureReversalNoise::from_config(config)?))
}

/// Maps layer class names to reconstruction functions.
///
/// The host builds one registry at startup and hands it to [`load`].
/// Registering the same class name twice is an error, so registration must
/// happen exactly once per layer type.
#[derive(Default)]
pub struct LayerRegistry {
    builders: BTreeMap<String, LayerBuilder>,
}

impl LayerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        LayerRegistry {
            builders: BTreeMap::new(),
        }
    }

    /// Creates a registry with this crate's layer pre-registered.
    pub fn with_builtin() -> Self {
        let mut builders = BTreeMap::new();
        builders.insert(
            FeatureReversalNoise::CLASS_NAME.to_string(),
            build_feature_reversal_noise as LayerBuilder,
        );
        LayerRegistry { builders }
    }

    /// Registers a reconstruction function under a class name.
    pub fn register(
        &mut self,
        class_name: &str,
        builder: LayerBuilder,
    ) -> Result<(), SerializationError> {
        if self.builders.contains_key(class_name) {
            return Err(SerializationError::AlreadyRegistered(class_name.to_string()));
        }
        self.builders.insert(class_name.to_string(), builder);
        Ok(())
    }

    /// Rebuilds a layer from its class name and saved configuration.
    pub fn build(
        &self,
        class_name: &str,
        config: &LayerConfig,
    ) -> Result<Arc<dyn Module>, SerializationError> {
        let builder = self
            .builders
            .get(class_name)
            .ok_or_else(|| SerializationError::UnknownClass(class_name.to_string()))?;
        builder(config)
    }
}

/// On-disk record for a single saved layer.
#[derive(Serialize, Deserialize, Debug)]
struct SavedLayer {
    class_name: String,
    config: LayerConfig,
}

/// Saves a layer's class name and configuration to a file.
pub fn save<P: AsRef<Path>>(module: &dyn Module, path: P) -> Result<(), SerializationError> {
    let saved = SavedLayer {
        class_name: module.class_name().to_string(),
        config: module.get_config(),
    };
    let file = File::create(path.as_ref())?;
    let writer = BufWriter::new(file);
    bincode::serialize_into(writer, &saved)?;
    Ok(())
}

/// Loads a saved layer from a file, dispatching reconstruction through the
/// registry.
pub fn load<P: AsRef<Path>>(
    registry: &LayerRegistry,
    path: P,
) -> Result<Arc<dyn Module>, SerializationError> {
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);
    let saved: SavedLayer = bincode::deserialize_from(reader)?;
    registry.build(&saved.class_name, &saved.config)
}
