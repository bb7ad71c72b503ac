//! Copying a resolved template into a new project directory.
//!
//! The copy skips version-control metadata and dependency caches at every
//! depth, and keeps each file's modification time. It is not transactional:
//! an interrupted copy leaves a partial directory behind, and the existence
//! check forces the user to remove it before retrying.

use std::ffi::OsStr;
use std::fs::File;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{Result, ScaffoldError};
use crate::locator::ResolvedTemplate;

/// Directory names never copied out of a template.
pub const EXCLUDED_NAMES: &[&str] = &[".git", ".hg", ".svn", "node_modules"];

/// Copy `template` into `target`, which must not exist yet.
pub fn materialize(template: &ResolvedTemplate, target: &Path) -> Result<()> {
    if path_taken(target) {
        return Err(ScaffoldError::DirectoryExists(target.to_path_buf()));
    }

    let files = copy_tree(&template.path(), target)?;
    tracing::info!(
        "copied {files} files from template '{}' to {}",
        template.name,
        target.display()
    );
    Ok(())
}

/// Whether anything, including a dangling symlink, already occupies `path`.
pub(crate) fn path_taken(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}

/// Recursively copy `src` onto `dst`, overwriting files that already exist.
///
/// Returns the number of files copied.
pub(crate) fn copy_tree(src: &Path, dst: &Path) -> Result<usize> {
    let mut files = 0;

    let walker = WalkDir::new(src)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_excluded(e.file_name()));

    for entry in walker {
        let entry = entry.map_err(|e| ScaffoldError::Copy {
            from: e.path().unwrap_or(src).to_path_buf(),
            to: dst.to_path_buf(),
            source: e.into(),
        })?;

        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(anyhow::Error::from)?;
        let dest = dst.join(relative);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&dest).map_err(|source| ScaffoldError::Copy {
                from: entry.path().to_path_buf(),
                to: dest.clone(),
                source,
            })?;
        } else {
            copy_file(entry.path(), &dest).map_err(|source| ScaffoldError::Copy {
                from: entry.path().to_path_buf(),
                to: dest.clone(),
                source,
            })?;
            files += 1;
        }
    }

    Ok(files)
}

fn is_excluded(name: &OsStr) -> bool {
    name.to_str().is_some_and(|n| EXCLUDED_NAMES.contains(&n))
}

/// Copy one file, then restore its modification time and permissions.
///
/// Permissions go last so read-only template files can still have their
/// timestamp set.
fn copy_file(from: &Path, to: &Path) -> std::io::Result<()> {
    let metadata = std::fs::metadata(from)?;
    let mut reader = File::open(from)?;
    let mut writer = File::create(to)?;
    std::io::copy(&mut reader, &mut writer)?;
    writer.set_modified(metadata.modified()?)?;
    drop(writer);
    std::fs::set_permissions(to, metadata.permissions())?;
    Ok(())
}
