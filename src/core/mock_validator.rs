//! Mock form validator for testing without real form definitions
//!
//! Simulates the external definition parser: rejects chosen file names and
//! counts how often it was consulted.

use super::scanner::FormValidator;
use crate::utils::FormError;
use std::cell::Cell;
use std::path::Path;

/// Validator that rejects definitions whose file name is in a deny list
#[derive(Debug, Default)]
pub struct MockValidator {
    rejected: Vec<String>,
    calls: Cell<usize>,
}

impl MockValidator {
    /// Accept everything
    pub fn accepting() -> Self {
        Self::default()
    }

    /// Reject files named in `file_names` (e.g. `"broken.xml"`)
    pub fn rejecting(file_names: &[&str]) -> Self {
        Self {
            rejected: file_names.iter().map(|s| s.to_string()).collect(),
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl FormValidator for MockValidator {
    fn validate(&self, definition: &Path) -> Result<(), FormError> {
        self.calls.set(self.calls.get() + 1);

        let name = definition
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        if self.rejected.contains(&name) {
            return Err(FormError::bad_definition(definition, "simulated parse failure"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepting_mock_accepts_missing_files() {
        let mock = MockValidator::accepting();
        assert!(mock.validate(Path::new("/nowhere/a.xml")).is_ok());
        assert_eq!(mock.calls(), 1);
    }
}
