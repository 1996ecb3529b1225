use std::fs;
use std::path::Path;
use std::process::Command;

use anyhow::{anyhow, Context, Result};
use tracing::debug;

use airbundle_core::{ArchiveType, Extractor};

pub struct ShellExtractor;

impl Extractor for ShellExtractor {
    fn extract(&self, archive_path: &Path, destination_dir: &Path) -> Result<()> {
        fs::create_dir_all(destination_dir)
            .with_context(|| format!("failed to create {}", destination_dir.display()))?;

        match ArchiveType::infer_from_path(archive_path) {
            Some(ArchiveType::TarGz) | Some(ArchiveType::TarZst) => {
                extract_tar(archive_path, destination_dir)
            }
            Some(ArchiveType::Zip) | None => extract_zip(archive_path, destination_dir),
        }
    }
}

fn extract_zip(archive_path: &Path, dst: &Path) -> Result<()> {
    if cfg!(windows) {
        let mut command = build_powershell_expand_command(archive_path, dst);
        if run_command(
            &mut command,
            "failed to extract zip archive with powershell",
        )
        .is_ok()
        {
            return Ok(());
        }
    }

    let mut unzip_command = build_unzip_extract_command(archive_path, dst);
    match run_command(
        &mut unzip_command,
        "failed to extract zip archive with unzip",
    ) {
        Ok(()) => return Ok(()),
        Err(err) => debug!("unzip extraction failed, trying tar: {err:#}"),
    }

    run_command(
        &mut build_tar_extract_command(archive_path, dst),
        "failed to extract zip archive with tar fallback",
    )
}

fn extract_tar(archive_path: &Path, dst: &Path) -> Result<()> {
    run_command(
        &mut build_tar_extract_command(archive_path, dst),
        "failed to extract tar archive",
    )
}

pub(crate) fn build_tar_extract_command(archive_path: &Path, dst: &Path) -> Command {
    let mut command = Command::new("tar");
    command.arg("-xf").arg(archive_path).arg("-C").arg(dst);
    command
}

pub(crate) fn build_unzip_extract_command(archive_path: &Path, dst: &Path) -> Command {
    let mut command = Command::new("unzip");
    command.arg("-q").arg(archive_path).arg("-d").arg(dst);
    command
}

pub(crate) fn build_powershell_expand_command(archive_path: &Path, dst: &Path) -> Command {
    let mut command = Command::new("powershell");
    command.arg("-NoProfile").arg("-Command").arg(format!(
        "Expand-Archive -LiteralPath '{}' -DestinationPath '{}' -Force",
        escape_ps_single_quote(archive_path),
        escape_ps_single_quote(dst)
    ));
    command
}

fn run_command(command: &mut Command, context_message: &str) -> Result<()> {
    let output = command
        .output()
        .with_context(|| format!("{context_message}: command failed to start"))?;
    if output.status.success() {
        return Ok(());
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    Err(anyhow!(
        "{context_message}: status={} stdout='{}' stderr='{}'",
        output.status,
        stdout.trim(),
        stderr.trim()
    ))
}

fn escape_ps_single_quote(path: &Path) -> String {
    path.to_string_lossy().replace('\'', "''")
}
