//! On-disk configuration for feed sources and alias seeds.
//!
//! `vendors.yaml` declares the feed sources the pipeline ingests;
//! `aliases.yaml` seeds the gender/color/pattern alias groups. Both are
//! upserted into the database by the `seed` command, after which the
//! database rows are authoritative (the external curation surface edits
//! them, this pipeline only reads the results).

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorEntry {
    pub name: String,
    /// Affiliate network this vendor's links are tracked through, e.g.
    /// `"tradedoubler"` or `"direct"` for the hosted redirect.
    pub affiliate_network: Option<String>,
    /// Program/site identifier within that network.
    pub affiliate_id: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl VendorEntry {
    /// Generate a URL-safe slug from the vendor name.
    #[must_use]
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }
}

#[derive(Debug, Deserialize)]
pub struct VendorsFile {
    pub vendors: Vec<VendorEntry>,
}

/// One alias group seed: a canonical key plus its synonym list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasSeed {
    pub key: String,
    #[serde(default = "default_priority")]
    pub priority: i32,
    pub aliases: Vec<String>,
}

fn default_priority() -> i32 {
    100
}

#[derive(Debug, Default, Deserialize)]
pub struct AliasSeedFile {
    #[serde(default)]
    pub gender: Vec<AliasSeed>,
    #[serde(default)]
    pub color: Vec<AliasSeed>,
    #[serde(default)]
    pub pattern: Vec<AliasSeed>,
}

/// Lowercase, non-alphanumeric-to-hyphen slug used for vendors and catalog
/// products alike.
#[must_use]
pub fn slugify(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Load and validate the vendors file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or contains
/// duplicate or empty vendor names.
pub fn load_vendors(path: &Path) -> Result<VendorsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourceFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    let file: VendorsFile = serde_yaml::from_str(&content)?;
    validate_vendors(&file)?;
    Ok(file)
}

fn validate_vendors(file: &VendorsFile) -> Result<(), ConfigError> {
    if file.vendors.is_empty() {
        return Err(ConfigError::Validation(
            "vendors file contains no vendors".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for vendor in &file.vendors {
        if vendor.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "vendor with empty name".to_string(),
            ));
        }
        if !seen.insert(vendor.slug()) {
            return Err(ConfigError::Validation(format!(
                "duplicate vendor slug: {}",
                vendor.slug()
            )));
        }
    }
    Ok(())
}

/// Load and validate the alias seed file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read or parsed, or if a
/// gender key is not one of `M`/`W`/`U`.
pub fn load_alias_seeds(path: &Path) -> Result<AliasSeedFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourceFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    let file: AliasSeedFile = serde_yaml::from_str(&content)?;
    for seed in &file.gender {
        if crate::Gender::from_code(&seed.key).is_none() {
            return Err(ConfigError::Validation(format!(
                "gender alias key must be M, W, or U, got: {}",
                seed.key
            )));
        }
    }
    Ok(file)
}
