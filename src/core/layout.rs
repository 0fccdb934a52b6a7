//! Structural classification of project and device roots
//!
//! Neither layout carries a marker or version file, so a directory is
//! recognised purely by which well-known children it holds. The rules are
//! intentionally loose enough to accept a freshly created or partially
//! populated project root.

use crate::constants::{
    ENVELOPE_SUFFIX, FORMS_DIR, INSTANCES_DIR, MACOS_MOUNT_POINT, ODK_DIR, SCRATCH_DIR,
    UNIX_MOUNT_POINT, WINDOWS_MOUNT_POINT, XML_SUFFIX,
};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Where removable storage is usually mounted on the running platform
pub fn mount_point_prefix() -> &'static str {
    mount_point_prefix_for(std::env::consts::OS)
}

/// Mount-point convention for an OS identifier as reported by `std::env::consts::OS`
pub fn mount_point_prefix_for(os: &str) -> &'static str {
    match os {
        "windows" => WINDOWS_MOUNT_POINT,
        "macos" => MACOS_MOUNT_POINT,
        _ => UNIX_MOUNT_POINT,
    }
}

/// Whether `path` has the shape of a project root
///
/// Accepted shapes:
/// - an empty directory
/// - exactly one entry, named `scratch` or `forms`
/// - `scratch` and `forms` together, with no other entry (`strict`) or at
///   most one other entry (`!strict`)
///
/// A missing path, a non-directory, or an unreadable directory is rejected.
pub fn is_project_root(path: &Path, strict: bool) -> bool {
    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(_) => return false,
    };
    let len = entries.count();

    let has_scratch = path.join(SCRATCH_DIR).exists();
    let has_forms = path.join(FORMS_DIR).exists();

    match len {
        0 => true,
        1 => has_scratch || has_forms,
        2 => has_scratch && has_forms,
        3 if !strict => has_scratch && has_forms,
        _ => false,
    }
}

/// Whether any ancestor of `path` (excluding `path` itself) is a project root
///
/// Ancestors are tested leniently (`strict = false`).
pub fn is_ancestor_project_root(path: &Path) -> bool {
    proper_ancestors(path).any(|ancestor| is_project_root(ancestor, false))
}

/// Strict project-root check that also accepts "no path selected"
pub fn is_valid_project_root(path: Option<&Path>) -> bool {
    path.is_some_and(|p| is_project_root(p, true))
}

/// Whether `path` holds `odk/instances` and `odk/forms`
pub fn is_device_root(path: &Path) -> bool {
    let odk = path.join(ODK_DIR);
    odk.exists() && odk.join(INSTANCES_DIR).exists() && odk.join(FORMS_DIR).exists()
}

/// Whether any ancestor of `path` (excluding `path` itself) is a device root
pub fn is_ancestor_device_root(path: &Path) -> bool {
    proper_ancestors(path).any(is_device_root)
}

pub fn is_valid_device_root(path: Option<&Path>) -> bool {
    path.is_some_and(is_device_root)
}

/// Absolute path of an instance's data file: `<dir>/<dir-name>.xml`
pub fn instance_file_path(instance_dir: &Path) -> PathBuf {
    absolute(named_child(instance_dir, XML_SUFFIX))
}

/// Absolute path of the submission marker: `<dir>/<dir-name>.xml.envelope`
pub fn submission_envelope_path(instance_dir: &Path) -> PathBuf {
    absolute(named_child(instance_dir, ENVELOPE_SUFFIX))
}

/// `<dir>/<dir-name><suffix>`
pub(crate) fn named_child(dir: &Path, suffix: &str) -> PathBuf {
    let mut file_name = dir
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(OsString::new);
    file_name.push(suffix);
    dir.join(file_name)
}

fn proper_ancestors(path: &Path) -> impl Iterator<Item = &Path> {
    path.ancestors()
        .skip(1)
        .filter(|ancestor| !ancestor.as_os_str().is_empty())
}

fn absolute(path: PathBuf) -> PathBuf {
    match std::path::absolute(&path) {
        Ok(abs) => abs,
        Err(_) => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn populate(root: &Path, dirs: &[&str]) {
        for d in dirs {
            fs::create_dir_all(root.join(d)).unwrap();
        }
    }

    #[test]
    fn mount_point_follows_platform() {
        assert_eq!(mount_point_prefix_for("windows"), "\\..");
        assert_eq!(mount_point_prefix_for("macos"), "/Volumes/");
        assert_eq!(mount_point_prefix_for("linux"), "/mnt/");
        assert_eq!(mount_point_prefix_for("freebsd"), "/mnt/");
    }

    #[test]
    fn missing_directory_is_not_a_project_root() {
        let temp = tempdir().unwrap();
        assert!(!is_project_root(&temp.path().join("nope"), true));
        assert!(!is_project_root(&temp.path().join("nope"), false));
    }

    #[test]
    fn empty_directory_is_a_project_root() {
        let temp = tempdir().unwrap();
        assert!(is_project_root(temp.path(), true));
        assert!(is_project_root(temp.path(), false));
    }

    #[test]
    fn single_known_child_is_a_project_root() {
        for child in ["scratch", "forms"] {
            let temp = tempdir().unwrap();
            populate(temp.path(), &[child]);
            assert!(is_project_root(temp.path(), true), "only {child}");
        }

        let temp = tempdir().unwrap();
        populate(temp.path(), &["other"]);
        assert!(!is_project_root(temp.path(), true));
        assert!(!is_project_root(temp.path(), false));
    }

    #[test]
    fn scratch_and_forms_is_a_project_root() {
        let temp = tempdir().unwrap();
        populate(temp.path(), &["scratch", "forms"]);
        assert!(is_project_root(temp.path(), true));
    }

    #[test]
    fn extra_entry_only_tolerated_when_lenient() {
        let temp = tempdir().unwrap();
        populate(temp.path(), &["scratch", "forms"]);
        fs::write(temp.path().join("extra"), b"x").unwrap();
        assert!(!is_project_root(temp.path(), true));
        assert!(is_project_root(temp.path(), false));

        fs::write(temp.path().join("extra2"), b"x").unwrap();
        assert!(!is_project_root(temp.path(), false));
    }

    #[test]
    fn two_entries_without_both_markers_is_rejected() {
        let temp = tempdir().unwrap();
        populate(temp.path(), &["forms", "other"]);
        assert!(!is_project_root(temp.path(), true));
        assert!(!is_project_root(temp.path(), false));
    }

    #[test]
    fn plain_file_is_not_a_project_root() {
        let temp = tempdir().unwrap();
        let file = temp.path().join("file.txt");
        fs::write(&file, b"x").unwrap();
        assert!(!is_project_root(&file, true));
    }

    #[test]
    fn valid_project_root_requires_a_path() {
        let temp = tempdir().unwrap();
        assert!(!is_valid_project_root(None));
        assert!(is_valid_project_root(Some(temp.path())));
    }

    #[test]
    fn nested_path_detects_ancestor_project_root() {
        let temp = tempdir().unwrap();
        let root = temp.path().join("project");
        populate(&root, &["scratch", "forms/household"]);
        fs::write(root.join("notes.txt"), b"x").unwrap();

        let nested = root.join("forms").join("household");
        assert!(is_ancestor_project_root(&nested));

        // the path itself is not considered, only its ancestors
        let outside = tempdir().unwrap();
        let lonely = outside.path().join("a");
        populate(&lonely, &["b", "c", "d", "e"]);
        assert!(!is_ancestor_project_root(&lonely.join("b")));
    }

    #[test]
    fn device_root_needs_instances_and_forms() {
        let temp = tempdir().unwrap();
        assert!(!is_device_root(temp.path()));

        populate(temp.path(), &["odk/forms"]);
        assert!(!is_device_root(temp.path()));

        populate(temp.path(), &["odk/instances"]);
        assert!(is_device_root(temp.path()));
        assert!(is_valid_device_root(Some(temp.path())));
        assert!(!is_valid_device_root(None));

        assert!(is_ancestor_device_root(
            &temp.path().join("odk").join("instances")
        ));
    }

    #[test]
    fn ancestor_device_check_skips_the_path_itself() {
        let temp = tempdir().unwrap();
        populate(temp.path(), &["odk/forms", "odk/instances"]);

        assert!(is_device_root(temp.path()));
        assert!(!is_ancestor_device_root(temp.path()));
    }

    #[test]
    fn partial_device_layout_is_no_ancestor() {
        let temp = tempdir().unwrap();
        populate(temp.path(), &["odk/forms"]);

        let nested = temp.path().join("odk").join("forms").join("a-media");
        assert!(!is_ancestor_device_root(&nested));
    }

    #[test]
    fn instance_paths_use_directory_name() {
        let temp = tempdir().unwrap();
        let dir = temp.path().join("uuid-1234");

        let xml = instance_file_path(&dir);
        assert!(xml.is_absolute());
        assert!(xml.ends_with("uuid-1234/uuid-1234.xml"));

        let envelope = submission_envelope_path(&dir);
        assert!(envelope.ends_with("uuid-1234/uuid-1234.xml.envelope"));
    }
}
