use super::*;

use std::path::Path;

use crate::extract::{
    build_powershell_expand_command, build_tar_extract_command, build_unzip_extract_command,
};

fn collect_args(command: &std::process::Command) -> Vec<String> {
    command
        .get_args()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect()
}

#[test]
fn progress_guard_reports_monotonically() {
    let mut seen = Vec::new();
    let mut sink = |fraction: f64| seen.push(fraction);
    let mut guard = ProgressGuard::new(&mut sink);

    guard.report(0.1);
    guard.report(0.4);
    guard.report(0.3);
    guard.report(0.4);
    guard.report(0.9);

    assert_eq!(seen, vec![0.1, 0.4, 0.9]);
}

#[test]
fn progress_guard_clamps_out_of_range_values() {
    let mut seen = Vec::new();
    let mut sink = |fraction: f64| seen.push(fraction);
    let mut guard = ProgressGuard::new(&mut sink);

    guard.report(-0.5);
    guard.report(0.5);
    guard.report(7.0);
    guard.report(0.8);

    assert_eq!(seen, vec![0.5, 1.0]);
}

#[test]
fn progress_guard_finish_emits_final_one() {
    let mut seen = Vec::new();
    let mut sink = |fraction: f64| seen.push(fraction);
    let mut guard = ProgressGuard::new(&mut sink);

    guard.report(0.6);
    guard.finish();
    guard.finish();

    assert_eq!(seen, vec![0.6, 1.0]);
}

#[test]
fn progress_guard_finish_collapses_when_already_complete() {
    let mut seen = Vec::new();
    let mut sink = |fraction: f64| seen.push(fraction);
    let mut guard = ProgressGuard::new(&mut sink);

    guard.report(1.0);
    guard.finish();

    assert_eq!(seen, vec![1.0]);
}

#[test]
fn progress_guard_finish_without_reports_still_emits_one() {
    let mut seen = Vec::new();
    let mut sink = |fraction: f64| seen.push(fraction);
    let mut guard = ProgressGuard::new(&mut sink);

    guard.finish();

    assert_eq!(seen, vec![1.0]);
}

#[test]
fn tar_extract_command_shape() {
    let command = build_tar_extract_command(
        Path::new("/tmp/scratch/bundle.tar.gz"),
        Path::new("/tmp/scratch/extracted"),
    );
    assert_eq!(command.get_program(), "tar");
    assert_eq!(
        collect_args(&command),
        vec!["-xf", "/tmp/scratch/bundle.tar.gz", "-C", "/tmp/scratch/extracted"]
    );
}

#[test]
fn unzip_extract_command_shape() {
    let command = build_unzip_extract_command(
        Path::new("/tmp/scratch/bundle.zip"),
        Path::new("/tmp/scratch/extracted"),
    );
    assert_eq!(command.get_program(), "unzip");
    assert_eq!(
        collect_args(&command),
        vec!["-q", "/tmp/scratch/bundle.zip", "-d", "/tmp/scratch/extracted"]
    );
}

#[test]
fn powershell_expand_command_escapes_single_quotes() {
    let command = build_powershell_expand_command(
        Path::new("C:/tmp/it's.zip"),
        Path::new("C:/tmp/out"),
    );
    assert_eq!(command.get_program(), "powershell");
    let args = collect_args(&command);
    assert_eq!(args[0], "-NoProfile");
    assert_eq!(args[1], "-Command");
    assert!(args[2].contains("Expand-Archive"));
    assert!(args[2].contains("it''s.zip"));
}
