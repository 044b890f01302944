//! TOML policy configuration handler
//!
//! Each TOML table is a namespace and each key an option:
//!
//! ```toml
//! [Essentials]
//! AutoPassMajorityVote = true
//! AutoPassRequireParticipation = 0.5
//! MaximumTeamsize = 8
//! ```
//!
//! Values may be written as native TOML scalars or as strings; both are
//! exposed as text through `PolicyEffects::option`. The handler can be
//! reloaded in place so that edits take effect on the next lookup.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use warden_core::{ConfigError, PolicyEffects};

type Namespaces = BTreeMap<String, BTreeMap<String, String>>;

/// Policy handler backed by a TOML document
#[derive(Debug, Default)]
pub struct TomlPolicyHandler {
    source: Option<PathBuf>,
    namespaces: RwLock<Namespaces>,
}

impl TomlPolicyHandler {
    /// Parse policy from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            source: None,
            namespaces: RwLock::new(parse(contents)?),
        })
    }

    /// Load policy from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let namespaces = read(&path)?;
        tracing::debug!(path = %path.display(), namespaces = namespaces.len(), "Loaded policy");
        Ok(Self {
            source: Some(path),
            namespaces: RwLock::new(namespaces),
        })
    }

    /// Re-read the backing file. A handler built from a string has nothing to
    /// reload and returns `Ok(())`.
    ///
    /// On error the previous policy stays in effect.
    pub fn reload(&self) -> Result<(), ConfigError> {
        let Some(path) = &self.source else {
            return Ok(());
        };
        let namespaces = read(path)?;
        *self.namespaces.write() = namespaces;
        tracing::info!(path = %path.display(), "Reloaded policy");
        Ok(())
    }
}

impl PolicyEffects for TomlPolicyHandler {
    fn option(&self, namespace: &str, key: &str) -> Option<String> {
        self.namespaces
            .read()
            .get(namespace)
            .and_then(|options| options.get(key))
            .cloned()
    }
}

fn read(path: &Path) -> Result<Namespaces, ConfigError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Read(format!("{}: {e}", path.display())))?;
    parse(&contents)
}

fn parse(contents: &str) -> Result<Namespaces, ConfigError> {
    let document: toml::Table = contents
        .parse()
        .map_err(|e: toml::de::Error| ConfigError::Parse(e.to_string()))?;

    let mut namespaces = Namespaces::new();
    for (namespace, value) in document {
        let toml::Value::Table(table) = value else {
            return Err(ConfigError::Parse(format!(
                "top-level key {namespace:?} must be a table"
            )));
        };
        let options = table
            .into_iter()
            .filter_map(|(key, value)| match scalar_text(&value) {
                Some(text) => Some((key, text)),
                None => {
                    tracing::warn!(%namespace, %key, "Ignoring non-scalar policy option");
                    None
                }
            })
            .collect();
        namespaces.insert(namespace, options);
    }
    Ok(namespaces)
}

fn scalar_text(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Datetime(d) => Some(d.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => None,
    }
}
