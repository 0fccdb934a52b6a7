//! Form discovery under project and device roots
//!
//! Project roots are owned by this tool, so stray files found next to form
//! directories are removed. Device storage is shared with the collection app
//! and is only ever read.

use crate::constants::{FORMS_DIR, ODK_DIR, XML_SUFFIX};
use crate::core::layout::named_child;
use crate::logger::{log_debug_verbose, log_error, log_warn};
use crate::models::FormRecord;
use crate::utils::FormError;
use std::fs;
use std::path::{Path, PathBuf};

/// Decides whether a form definition file is usable
///
/// Parsing the definition is outside this crate; implementations only report
/// whether the file can be turned into a form.
pub trait FormValidator {
    fn validate(&self, definition: &Path) -> Result<(), FormError>;
}

/// Accepts any readable, non-empty regular file
#[derive(Debug, Clone, Copy, Default)]
pub struct DefinitionFileCheck;

impl FormValidator for DefinitionFileCheck {
    fn validate(&self, definition: &Path) -> Result<(), FormError> {
        let meta = fs::metadata(definition).map_err(|e| {
            FormError::bad_definition(definition, format!("cannot read definition: {}", e))
        })?;

        if !meta.is_file() {
            return Err(FormError::bad_definition(definition, "not a regular file"));
        }
        if meta.len() == 0 {
            return Err(FormError::bad_definition(definition, "empty file"));
        }

        Ok(())
    }
}

/// Enumerates forms, skipping any the validator rejects
#[derive(Debug, Clone, Default)]
pub struct FormScanner<V = DefinitionFileCheck> {
    validator: V,
}

impl<V: FormValidator> FormScanner<V> {
    pub fn new(validator: V) -> Self {
        Self { validator }
    }

    /// Repair then enumerate `<root>/forms`
    ///
    /// Non-directory entries are deleted before enumeration. This cleanup is
    /// long-standing behaviour callers rely on; use
    /// [`enumerate_project_forms`](Self::enumerate_project_forms) to list
    /// without touching the disk.
    pub fn list_project_forms(&self, root: &Path) -> Vec<FormRecord> {
        if let Err(e) = repair_project_forms(root) {
            log_error(&format!(
                "Failed to clean forms directory under {}: {}",
                root.display(),
                e
            ));
        }
        self.enumerate_project_forms(root)
    }

    /// List `<root>/forms/<name>/<name>.xml` definitions without modifying anything
    pub fn enumerate_project_forms(&self, root: &Path) -> Vec<FormRecord> {
        let forms_dir = root.join(FORMS_DIR);
        let mut records = Vec::new();

        for path in list_children(&forms_dir) {
            if !path.is_dir() {
                continue;
            }
            let name = match path.file_name() {
                Some(name) => name.to_string_lossy().into_owned(),
                None => continue,
            };
            let definition = named_child(&path, XML_SUFFIX);
            if let Some(record) = self.admit(name, definition) {
                records.push(record);
            }
        }

        sort_by_name(records)
    }

    /// List `<device>/odk/forms/*.xml` definitions
    ///
    /// Directories and files with other extensions are ignored, never removed.
    pub fn list_device_forms(&self, device: &Path) -> Vec<FormRecord> {
        let forms_dir = device.join(ODK_DIR).join(FORMS_DIR);
        let mut records = Vec::new();

        for path in list_children(&forms_dir) {
            if !path.is_file() {
                continue;
            }
            let file_name = match path.file_name() {
                Some(name) => name.to_string_lossy(),
                None => continue,
            };
            let stem = match file_name.strip_suffix(XML_SUFFIX) {
                Some(stem) => stem.to_string(),
                None => continue,
            };
            if let Some(record) = self.admit(stem, path.clone()) {
                records.push(record);
            }
        }

        sort_by_name(records)
    }

    fn admit(&self, name: String, definition: PathBuf) -> Option<FormRecord> {
        match self.validator.validate(&definition) {
            Ok(()) => Some(FormRecord::new(name, definition)),
            Err(e) => {
                log_warn(&format!("Skipping form '{}': {}", name, e));
                None
            }
        }
    }
}

/// Delete every non-directory entry directly under `<root>/forms`
///
/// Returns the removed paths. A missing `forms/` directory is not an error.
/// Entries that cannot be read or deleted are logged and skipped; only an
/// unreadable `forms/` directory fails the repair.
pub fn repair_project_forms(root: &Path) -> Result<Vec<PathBuf>, FormError> {
    let forms_dir = root.join(FORMS_DIR);
    if !forms_dir.exists() {
        return Ok(Vec::new());
    }

    let mut removed = Vec::new();
    for entry in fs::read_dir(&forms_dir)? {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(e) => {
                log_error(&format!("Error while listing {}: {}", forms_dir.display(), e));
                continue;
            }
        };
        if path.is_dir() {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => {
                log_warn(&format!("Removed stray file {}", path.display()));
                removed.push(path);
            }
            Err(e) => log_error(&format!("Cannot remove {}: {}", path.display(), e)),
        }
    }

    Ok(removed)
}

/// Children of `dir`, or nothing if it is missing or unreadable
fn list_children(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        log_debug_verbose(&format!("No forms directory at {}", dir.display()));
        return Vec::new();
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log_error(&format!("Cannot list {}: {}", dir.display(), e));
            return Vec::new();
        }
    };

    let mut children = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => children.push(entry.path()),
            Err(e) => {
                log_error(&format!("Error while listing {}: {}", dir.display(), e));
                break;
            }
        }
    }
    children
}

fn sort_by_name(mut records: Vec<FormRecord>) -> Vec<FormRecord> {
    records.sort_by(|a, b| a.name().cmp(b.name()));
    records
}
