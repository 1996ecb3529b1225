use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};

pub(crate) const STAMP_FILE_NAME: &str = ".installed-at";

pub(crate) fn remove_dir_if_exists(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err).with_context(|| format!("failed to remove {}", path.display())),
    }
}

pub(crate) fn move_dir_or_copy(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create publish parent: {}", parent.display()))?;
    }

    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(_) => {
            if let Err(err) = copy_dir_recursive(src, dst) {
                let _ = fs::remove_dir_all(dst);
                return Err(err);
            }
            fs::remove_dir_all(src)
                .with_context(|| format!("failed to cleanup staging dir: {}", src.display()))
        }
    }
}

pub(crate) fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst).with_context(|| format!("failed to create {}", dst.display()))?;
    for entry in fs::read_dir(src).with_context(|| format!("failed to read {}", src.display()))? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        let metadata = fs::symlink_metadata(&src_path)
            .with_context(|| format!("failed to stat {}", src_path.display()))?;
        if metadata.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
            continue;
        }

        #[cfg(unix)]
        if metadata.file_type().is_symlink() {
            let target = fs::read_link(&src_path)
                .with_context(|| format!("failed to read symlink {}", src_path.display()))?;
            std::os::unix::fs::symlink(&target, &dst_path).with_context(|| {
                format!(
                    "failed to create symlink {} -> {}",
                    dst_path.display(),
                    target.display()
                )
            })?;
            continue;
        }

        fs::copy(&src_path, &dst_path).with_context(|| {
            format!(
                "failed to copy {} to {}",
                src_path.display(),
                dst_path.display()
            )
        })?;
    }
    Ok(())
}

pub(crate) fn find_file_by_name(
    root: &Path,
    file_name: &str,
    max_depth: usize,
) -> Result<Option<PathBuf>> {
    if !root.is_dir() {
        return Ok(None);
    }
    find_in_dir(root, file_name, max_depth)
}

fn find_in_dir(dir: &Path, file_name: &str, depth_left: usize) -> Result<Option<PathBuf>> {
    let direct = dir.join(file_name);
    if direct.is_file() {
        return Ok(Some(direct));
    }
    if depth_left == 0 {
        return Ok(None);
    }

    let mut subdirs = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            subdirs.push(path);
        }
    }
    subdirs.sort();

    for subdir in subdirs {
        if let Some(found) = find_in_dir(&subdir, file_name, depth_left - 1)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

pub(crate) fn write_recency_stamp(bundle_dir: &Path) -> Result<()> {
    let path = bundle_dir.join(STAMP_FILE_NAME);
    fs::write(&path, format!("{}\n", unix_timestamp_nanos()?))
        .with_context(|| format!("failed to write recency stamp: {}", path.display()))
}

pub(crate) fn read_recency(bundle_dir: &Path) -> u128 {
    let path = bundle_dir.join(STAMP_FILE_NAME);
    if let Ok(raw) = fs::read_to_string(&path) {
        if let Ok(stamp) = raw.trim().parse::<u128>() {
            return stamp;
        }
    }

    fs::metadata(bundle_dir)
        .and_then(|metadata| metadata.modified())
        .ok()
        .and_then(|modified| modified.duration_since(UNIX_EPOCH).ok())
        .map(|elapsed| elapsed.as_nanos())
        .unwrap_or(0)
}

pub(crate) fn unix_timestamp_nanos() -> Result<u128> {
    Ok(SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system time is before unix epoch")?
        .as_nanos())
}
