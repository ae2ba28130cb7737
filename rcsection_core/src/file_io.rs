//! # File I/O Module
//!
//! Loading configuration files and writing results, with safety features:
//! - **Input checks**: the file must exist, end in `.json` and be at most
//!   10 MiB before it is read
//! - **Atomic saves**: write to `.tmp`, sync, rename so an interrupted write
//!   never leaves a truncated file behind
//!
//! ## Example
//!
//! ```rust,no_run
//! use rcsection_core::file_io::{load_config, save_json, write_results_csv};
//! use rcsection_core::report::AnalysisReport;
//! use std::path::Path;
//!
//! let path = Path::new("section.json");
//! let file = load_config(path)?;
//! let report = AnalysisReport::generate(&file, Some(path))?;
//!
//! save_json(&report, Path::new("results/section_report.json"))?;
//! # Ok::<(), rcsection_core::errors::SectionError>(())
//! ```

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;

use crate::calculations::AnalysisResult;
use crate::config::SectionConfigFile;
use crate::errors::{SectionError, SectionResult};
use crate::units::{KilonewtonMeters, NewtonMillimeters};

/// Largest configuration file accepted (bytes)
pub const MAX_CONFIG_SIZE: u64 = 10 * 1024 * 1024;

/// Header row of exported moment-curvature CSV files
pub const CSV_HEADER: &str = "curvature,epsilon0,moment_kNm,max_concrete_strain,min_concrete_strain,converged";

/// Load a configuration file.
///
/// # Returns
///
/// * `Ok(SectionConfigFile)` - Parsed file with all required fields present
/// * `Err(SectionError::FileError)` - Missing file, wrong extension, too large or unreadable
/// * `Err(SectionError::SerializationError)` - Invalid JSON
/// * `Err(SectionError::MissingField)` - A required field is absent
pub fn load_config(path: &Path) -> SectionResult<SectionConfigFile> {
    let display = path.display().to_string();

    let metadata = fs::metadata(path).map_err(|e| SectionError::file_error("open", &display, e.to_string()))?;
    if !metadata.is_file() {
        return Err(SectionError::file_error("open", &display, "Not a regular file"));
    }

    let is_json = path
        .extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if !is_json {
        return Err(SectionError::file_error("open", &display, "Expected a .json file"));
    }

    if metadata.len() > MAX_CONFIG_SIZE {
        return Err(SectionError::file_error(
            "open",
            &display,
            format!("File is {} bytes (maximum {} bytes)", metadata.len(), MAX_CONFIG_SIZE),
        ));
    }

    let contents = fs::read_to_string(path).map_err(|e| SectionError::file_error("read", &display, e.to_string()))?;

    let file = SectionConfigFile::from_json_str(&contents).map_err(|e| match e {
        SectionError::SerializationError { reason } => SectionError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", display, reason),
        },
        other => other,
    })?;

    info!("Loaded configuration '{}' from {}", file.section_name, display);
    Ok(file)
}

/// Write `contents` to `path` atomically.
///
/// 1. Create the parent directory if needed
/// 2. Write to `<path>.tmp`
/// 3. Sync to disk (fsync)
/// 4. Rename over `path`
pub fn write_atomic(path: &Path, contents: &[u8]) -> SectionResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            SectionError::file_error("create directory", parent.display().to_string(), e.to_string())
        })?;
    }

    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        SectionError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(contents).map_err(|e| {
        SectionError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        SectionError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        SectionError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Serialize any value as pretty JSON and save it atomically.
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> SectionResult<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_atomic(path, json.as_bytes())?;
    info!("Saved {}", path.display());
    Ok(())
}

/// Render a sweep as CSV: one row per record, moments in kN·m. The last
/// column is 1 for steps in equilibrium and 0 for steps left on a residual
/// jump.
pub fn results_to_csv(result: &AnalysisResult) -> String {
    let mut csv = String::with_capacity(64 * (result.len() + 1));
    csv.push_str(CSV_HEADER);
    csv.push('\n');
    for record in result.records() {
        let moment = KilonewtonMeters::from(NewtonMillimeters(record.moment));
        // writing to a String cannot fail
        let _ = writeln!(
            csv,
            "{:e},{:e},{},{:e},{:e},{}",
            record.curvature,
            record.epsilon0,
            moment.value(),
            record.max_strain,
            record.min_strain,
            u8::from(record.converged)
        );
    }
    csv
}

/// Export a sweep as CSV, written atomically.
pub fn write_results_csv(result: &AnalysisResult, path: &Path) -> SectionResult<()> {
    write_atomic(path, results_to_csv(result).as_bytes())?;
    info!("Exported {} rows to {}", result.len(), path.display());
    Ok(())
}

/// Default CSV name for a section: spaces become underscores.
pub fn default_csv_name(section_name: &str) -> String {
    format!("{}_results.csv", section_name.trim().replace(' ', "_"))
}
