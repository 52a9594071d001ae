//! The stage content table.

use std::collections::BTreeMap;

use diancha_core::error::DomainError;
use diancha_core::stage::Stage;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// The table bundled with the engine.
pub const BUILTIN_STAGES_YAML: &str = include_str!("../../content/stages.yaml");

/// Display metadata of one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageInfo {
    /// 1-based stage ordinal.
    pub ordinal: u8,
    /// Heading.
    pub title: String,
    /// One-line instruction.
    pub description: String,
    /// Historical background.
    pub lore_text: String,
    /// Note on the tool used.
    pub tool_text: String,
}

#[derive(Debug, Deserialize)]
struct TableDocument {
    stages: Vec<StageInfo>,
}

/// Validated metadata for all ten stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTable {
    entries: BTreeMap<Stage, StageInfo>,
    version_hash: String,
}

impl ContentTable {
    /// Parses and validates a YAML table.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Content` if the document does not parse, an
    /// ordinal is out of range or repeated, a title is blank, or a stage is
    /// missing.
    pub fn from_yaml(source: &str) -> Result<Self, DomainError> {
        let document: TableDocument = serde_yaml::from_str(source)
            .map_err(|e| DomainError::Content(format!("malformed content table: {e}")))?;

        let mut entries = BTreeMap::new();
        for info in document.stages {
            let stage = Stage::from_ordinal(info.ordinal)
                .map_err(|e| DomainError::Content(e.to_string()))?;
            if info.title.trim().is_empty() {
                return Err(DomainError::Content(format!(
                    "stage {} has an empty title",
                    info.ordinal
                )));
            }
            if entries.insert(stage, info).is_some() {
                return Err(DomainError::Content(format!(
                    "duplicate entry for stage {}",
                    stage.ordinal()
                )));
            }
        }
        if let Some(missing) = Stage::ALL
            .into_iter()
            .find(|stage| !entries.contains_key(stage))
        {
            return Err(DomainError::Content(format!(
                "missing entry for stage {}",
                missing.ordinal()
            )));
        }

        Ok(Self {
            entries,
            version_hash: sha256_hex(source),
        })
    }

    /// The bundled table.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Content` if the bundled table is invalid.
    pub fn builtin() -> Result<Self, DomainError> {
        Self::from_yaml(BUILTIN_STAGES_YAML)
    }

    /// Metadata of `stage`.
    #[must_use]
    pub fn get(&self, stage: Stage) -> Option<&StageInfo> {
        self.entries.get(&stage)
    }

    /// All entries in ritual order.
    pub fn entries(&self) -> impl Iterator<Item = &StageInfo> {
        self.entries.values()
    }

    /// Lowercase hex SHA-256 of the source document.
    #[must_use]
    pub fn version_hash(&self) -> &str {
        &self.version_hash
    }
}

fn sha256_hex(source: &str) -> String {
    format!("{:x}", Sha256::digest(source.as_bytes()))
}
