//! Picking a free target path and renaming the source document onto it.
//!
//! Resolution and rename are two separate filesystem operations, so another
//! process can create the chosen path in between (time-of-check/time-of-use).
//! That window is accepted for a single-shot interactive tool; nothing here
//! uses create-exclusive semantics.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::title::MAX_FILENAME_LENGTH;

/// What [`rename_to_title`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameOutcome {
    Renamed { from: PathBuf, to: PathBuf },
    /// The document already carries the requested name.
    Unchanged { path: PathBuf },
}

impl RenameOutcome {
    /// Where the document lives after the operation.
    pub fn final_path(&self) -> &Path {
        match self {
            RenameOutcome::Renamed { to, .. } => to,
            RenameOutcome::Unchanged { path } => path,
        }
    }
}

fn file_name(stem: &str, extension: Option<&str>) -> String {
    match extension {
        Some(ext) if !ext.is_empty() => format!("{stem}.{ext}"),
        _ => stem.to_string(),
    }
}

fn is_occupied(path: &Path) -> io::Result<bool> {
    // symlink_metadata so a dangling symlink still counts as taken
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Longest file name, in bytes, that common filesystems accept.
pub const MAX_NAME_BYTES: usize = 255;

/// Find a path in `dir` that nothing currently occupies.
///
/// Tries `dir/stem.ext` first, then `dir/stem-1.ext`, `dir/stem-2.ext`, ...
/// until a free one turns up. Each candidate's stem is shortened with
/// [`fit_stem`] so the counter never pushes the name past
/// [`MAX_FILENAME_LENGTH`] characters or [`MAX_NAME_BYTES`] bytes. Probe
/// errors other than "not found" are returned instead of being mistaken for
/// a free slot.
pub fn resolve_unique_path(dir: &Path, stem: &str, extension: Option<&str>) -> io::Result<PathBuf> {
    let candidate = dir.join(file_name(
        &fit_stem(stem, "", extension, MAX_FILENAME_LENGTH),
        extension,
    ));
    if !is_occupied(&candidate)? {
        return Ok(candidate);
    }

    let mut counter: u64 = 1;
    loop {
        let suffix = format!("-{counter}");
        let base = fit_stem(stem, &suffix, extension, MAX_FILENAME_LENGTH);
        let candidate = dir.join(file_name(&format!("{base}{suffix}"), extension));
        if !is_occupied(&candidate)? {
            return Ok(candidate);
        }
        counter += 1;
    }
}

/// Shorten `stem` so that `stem + suffix + "." + extension` fits in
/// `limit` characters and in [`MAX_NAME_BYTES`] bytes.
///
/// The cut always lands on a char boundary; whitespace exposed by the cut
/// is trimmed.
pub fn fit_stem(stem: &str, suffix: &str, extension: Option<&str>, limit: usize) -> String {
    let ext = extension
        .filter(|e| !e.is_empty())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    let char_budget = limit
        .saturating_sub(suffix.chars().count() + ext.chars().count())
        .max(1);
    let byte_budget = MAX_NAME_BYTES
        .saturating_sub(suffix.len() + ext.len())
        .max(1);

    let mut end = 0;
    for (count, (i, c)) in stem.char_indices().enumerate() {
        if count == char_budget || i + c.len_utf8() > byte_budget {
            break;
        }
        end = i + c.len_utf8();
    }
    if end == stem.len() {
        return stem.to_string();
    }

    let cut = &stem[..end];
    let trimmed = cut.trim_end();
    if trimmed.is_empty() {
        cut.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Rename `original` to `<sanitized>.<original extension>` in the same
/// directory, stepping around existing files.
///
/// `sanitized` must already be filesystem-safe (see
/// [`sanitize_filename`](crate::title::sanitize_filename)).
pub fn rename_to_title(original: &Path, sanitized: &str) -> io::Result<RenameOutcome> {
    let dir = match original.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let extension = original.extension().map(|e| e.to_string_lossy().into_owned());
    let extension = extension.as_deref();

    let stem = fit_stem(sanitized, "", extension, MAX_FILENAME_LENGTH);

    let desired = dir.join(file_name(&stem, extension));
    if desired.file_name() == original.file_name() {
        tracing::info!(path = %original.display(), "file already has the generated name");
        return Ok(RenameOutcome::Unchanged {
            path: original.to_path_buf(),
        });
    }

    let target = resolve_unique_path(&dir, &stem, extension)?;
    tracing::debug!(from = %original.display(), to = %target.display(), "renaming");

    fs::rename(original, &target).map_err(|e| {
        io::Error::new(e.kind(), format!("could not rename file: {e}"))
    })?;

    Ok(RenameOutcome::Renamed {
        from: original.to_path_buf(),
        to: target,
    })
}
