//! Versioned keyword tables for provision and relevance matching.
//!
//! A table pairs the provision vocabulary (tag → substring patterns) with an
//! independent relevance keyword set. Every derived statistic depends on the
//! exact table used, so each table carries a version string and a SHA-256
//! fingerprint of its normalised content. Any change to the table is a
//! breaking change for downstream numbers.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// The child online safety table shipped with billscope.
const BUILTIN_TABLE: &str = include_str!("../keywords/child-online-safety-v1.json");

#[derive(Debug, Error)]
pub enum KeywordError {
    #[error("failed to read keyword table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid keyword table JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("keyword table has no version")]
    MissingVersion,

    #[error("keyword table defines no provisions")]
    NoProvisions,

    #[error("keyword table has a blank provision tag")]
    BlankProvisionTag,

    #[error("provision '{0}' has no patterns")]
    EmptyProvision(String),

    #[error("blank pattern in {0}")]
    BlankPattern(String),

    #[error("keyword table defines no relevance keywords")]
    NoRelevanceKeywords,
}

/// On-disk layout of a keyword table.
#[derive(Debug, Serialize, Deserialize)]
struct TableFile {
    version: String,
    provisions: BTreeMap<String, Vec<String>>,
    relevance: Vec<String>,
}

/// A validated keyword table.
///
/// Patterns are stored lowercased and trimmed, duplicates removed, so
/// matching is a plain substring test against lowercased text. Construction
/// fails on an empty or partial table; a `KeywordTable` value is always
/// usable for classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTable {
    version: String,
    provisions: BTreeMap<String, Vec<String>>,
    relevance: Vec<String>,
    fingerprint: String,
}

impl KeywordTable {
    /// Build and validate a table.
    pub fn new(
        version: impl Into<String>,
        provisions: BTreeMap<String, Vec<String>>,
        relevance: Vec<String>,
    ) -> Result<Self, KeywordError> {
        let version = version.into().trim().to_string();
        if version.is_empty() {
            return Err(KeywordError::MissingVersion);
        }
        if provisions.is_empty() {
            return Err(KeywordError::NoProvisions);
        }

        let mut normalised = BTreeMap::new();
        for (tag, patterns) in provisions {
            let tag = tag.trim().to_string();
            if tag.is_empty() {
                return Err(KeywordError::BlankProvisionTag);
            }
            let patterns = normalise_patterns(patterns, &format!("provision '{tag}'"))?;
            if patterns.is_empty() {
                return Err(KeywordError::EmptyProvision(tag));
            }
            normalised.insert(tag, patterns);
        }

        let relevance = normalise_patterns(relevance, "relevance keywords")?;
        if relevance.is_empty() {
            return Err(KeywordError::NoRelevanceKeywords);
        }

        let file = TableFile {
            version,
            provisions: normalised,
            relevance,
        };
        let fingerprint = hex(ring::digest::digest(&ring::digest::SHA256, &serde_json::to_vec(&file)?).as_ref());

        debug!(
            version = %file.version,
            provisions = file.provisions.len(),
            relevance = file.relevance.len(),
            %fingerprint,
            "keyword table validated"
        );

        Ok(Self {
            version: file.version,
            provisions: file.provisions,
            relevance: file.relevance,
            fingerprint,
        })
    }

    /// The table shipped with this crate (`child-online-safety-v1`).
    pub fn builtin() -> Result<Self, KeywordError> {
        Self::from_json_str(BUILTIN_TABLE)
    }

    /// Parse a table from JSON text.
    ///
    /// Expects `{"version": "...", "provisions": {"tag": ["pattern", ...]}, "relevance": [...]}`.
    pub fn from_json_str(json: &str) -> Result<Self, KeywordError> {
        let file: TableFile = serde_json::from_str(json)?;
        Self::new(file.version, file.provisions, file.relevance)
    }

    /// Load a table from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, KeywordError> {
        let json = std::fs::read_to_string(path).map_err(|source| KeywordError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Serialise the normalised table back to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, KeywordError> {
        let file = TableFile {
            version: self.version.clone(),
            provisions: self.provisions.clone(),
            relevance: self.relevance.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Hex SHA-256 of the normalised table content.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Provision tags in sorted order.
    pub fn vocabulary(&self) -> impl Iterator<Item = &str> {
        self.provisions.keys().map(|k| k.as_str())
    }

    /// Number of provision tags; the maximum possible jurisdiction score.
    pub fn vocabulary_size(&self) -> usize {
        self.provisions.len()
    }

    /// `(tag, patterns)` pairs in tag order.
    pub fn provisions(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.provisions
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn relevance(&self) -> &[String] {
        &self.relevance
    }
}

fn normalise_patterns(patterns: Vec<String>, list: &str) -> Result<Vec<String>, KeywordError> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(patterns.len());
    for p in patterns {
        let p = p.trim().to_lowercase();
        if p.is_empty() {
            return Err(KeywordError::BlankPattern(list.to_string()));
        }
        if seen.insert(p.clone()) {
            out.push(p);
        }
    }
    Ok(out)
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
