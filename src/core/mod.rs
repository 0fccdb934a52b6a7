//! Form storage on disk
//!
//! CRITICAL: This module MUST NOT depend on the HTTP side of the crate.

pub mod layout;
pub mod scanner;

// Test utilities standing in for the form definition parser (tests only)
#[cfg(test)]
pub mod mock_validator;

pub use layout::{
    instance_file_path, is_ancestor_device_root, is_ancestor_project_root, is_device_root,
    is_project_root, is_valid_device_root, is_valid_project_root, mount_point_prefix,
    mount_point_prefix_for, submission_envelope_path,
};
pub use scanner::{repair_project_forms, DefinitionFileCheck, FormScanner, FormValidator};
