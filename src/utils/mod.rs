//! File helpers shared by the commands.

use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use color_eyre::Help;
use log::{debug, warn};
use std::fmt::Debug;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempPath};

/// Create the parent directory of `path`, if it does not exist yet.
pub fn create_parent_dir<P>(path: &P) -> Result<(), Report>
where
    P: AsRef<Path> + Debug,
{
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating directory: {parent:?}");
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| eyre!("Failed to create directory: {parent:?}"))?;
        }
    }
    Ok(())
}

/// Write several files, so that either all of them are written or none are touched.
///
/// Contents are first written to temporary files next to their destinations, and
/// only moved into place once every temporary file has been written successfully.
/// If moving one of them into place fails, the files already moved are removed
/// again, and any files they replaced are restored.
///
/// ## Examples
///
/// ```rust
/// use carbfix::utils::write_files;
///
/// let dir = tempfile::tempdir()?;
/// let a = dir.path().join("a.txt");
/// let b = dir.path().join("nested/b.txt");
/// write_files(&[(a.clone(), "A\n".to_string()), (b.clone(), "B\n".to_string())])?;
/// assert_eq!(std::fs::read_to_string(&b)?, "B\n");
///
/// // b.txt is now a directory and cannot be replaced, so a.txt is restored
/// std::fs::remove_file(&b)?;
/// std::fs::create_dir(&b)?;
/// let result = write_files(&[(a.clone(), "AA\n".to_string()), (b.clone(), "BB\n".to_string())]);
/// assert!(result.is_err());
/// assert_eq!(std::fs::read_to_string(&a)?, "A\n");
/// # Ok::<(), color_eyre::eyre::Report>(())
/// ```
pub fn write_files(files: &[(PathBuf, String)]) -> Result<(), Report> {
    let mut staged = Vec::with_capacity(files.len());

    for (path, contents) in files {
        create_parent_dir(path)?;
        let mut file = NamedTempFile::new_in(staging_dir(path))
            .wrap_err_with(|| eyre!("Failed to create temporary file for: {path:?}"))
            .suggestion("Check that the output directory is writable.")?;
        file.write_all(contents.as_bytes())
            .wrap_err_with(|| eyre!("Failed to write temporary file for: {path:?}"))?;
        staged.push((file, path));
    }

    // destinations moved into place so far, with a copy of the file each one replaced
    let mut persisted: Vec<(&PathBuf, Option<TempPath>)> = Vec::with_capacity(staged.len());

    for (file, path) in staged {
        let result = backup(path).and_then(|replaced| {
            file.persist(path).wrap_err_with(|| eyre!("Failed to write: {path:?}"))?;
            Ok(replaced)
        });
        match result {
            Ok(replaced) => {
                debug!("Wrote: {path:?}");
                persisted.push((path, replaced));
            }
            Err(e) => {
                rollback(persisted);
                return Err(e);
            }
        }
    }

    Ok(())
}

/// Directory the temporary file of `path` is created in, next to its destination.
fn staging_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// Copy an existing file at `path` to a temporary file, so that it can be restored.
fn backup(path: &Path) -> Result<Option<TempPath>, Report> {
    if !path.is_file() {
        return Ok(None);
    }
    let copy = NamedTempFile::new_in(staging_dir(path))
        .wrap_err_with(|| eyre!("Failed to create backup file for: {path:?}"))?
        .into_temp_path();
    std::fs::copy(path, &copy).wrap_err_with(|| eyre!("Failed to back up: {path:?}"))?;
    Ok(Some(copy))
}

/// Undo the files written by an unsuccessful [`write_files`].
fn rollback(persisted: Vec<(&PathBuf, Option<TempPath>)>) {
    for (path, replaced) in persisted.into_iter().rev() {
        let result = match replaced {
            Some(copy) => copy.persist(path).map_err(|e| e.error),
            None => std::fs::remove_file(path),
        };
        match result {
            Ok(()) => debug!("Rolled back: {path:?}"),
            Err(e) => warn!("Failed to roll back {path:?}: {e}"),
        }
    }
}

/// Write a single file, leaving nothing behind on failure.
pub fn write_file<P>(path: &P, contents: &str) -> Result<(), Report>
where
    P: AsRef<Path> + Debug,
{
    write_files(&[(path.as_ref().to_path_buf(), contents.to_string())])
}
