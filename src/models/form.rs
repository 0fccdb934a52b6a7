//! Discovered form records

use serde::Serialize;
use std::path::{Path, PathBuf};

/// One form found on disk
///
/// For a project root the name is the form's directory name; on a device it is
/// the definition file's stem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormRecord {
    name: String,
    definition_path: PathBuf,
}

impl FormRecord {
    pub fn new(name: impl Into<String>, definition_path: impl Into<PathBuf>) -> Self {
        FormRecord {
            name: name.into(),
            definition_path: definition_path.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Path of the form definition XML file
    pub fn definition_path(&self) -> &Path {
        &self.definition_path
    }
}
