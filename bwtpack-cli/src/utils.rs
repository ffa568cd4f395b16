//! Utility functions for the bwtpack CLI.

use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

/// Extension given to compressed files.
pub const EXTENSION: &str = "bwp";

/// Create a byte-count progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░ ");
    pb.set_style(style);
    pb
}

/// Default output path for compression: `<input>.bwp`.
pub fn compressed_path(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".");
    name.push(EXTENSION);
    PathBuf::from(name)
}

/// Default output path for decompression: strip `.bwp`, or append `.out`.
pub fn decompressed_path(input: &Path) -> PathBuf {
    if input.extension().is_some_and(|ext| ext == EXTENSION) {
        input.with_extension("")
    } else {
        let mut name = input.as_os_str().to_owned();
        name.push(".out");
        PathBuf::from(name)
    }
}

/// Format a byte count with a binary unit.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}
