use super::ui;
use crate::core::export::{DEFAULT_FILE_NAME, save_csv};
use crate::pipeline::RateFetch;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Splits an explicit output path into directory and file name, or falls
/// back to the default file under `export_dir`.
fn resolve_target(output: Option<&Path>, export_dir: &str) -> Result<(PathBuf, String)> {
    match output {
        Some(path) => {
            let file_name = path
                .file_name()
                .with_context(|| format!("Output path has no file name: {}", path.display()))?;
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            Ok((dir.to_path_buf(), file_name.to_string_lossy().into_owned()))
        }
        None => Ok((PathBuf::from(export_dir), DEFAULT_FILE_NAME.to_string())),
    }
}

pub fn run(fetch: &RateFetch, output: Option<&Path>, export_dir: &str) -> Result<PathBuf> {
    super::print_fetch_warnings(fetch);

    let (dir, file_name) = resolve_target(output, export_dir)?;
    let path = save_csv(&fetch.series, &dir, &file_name)?;

    println!(
        "Exported {} {} observations to {}",
        fetch.series.len(),
        ui::source_label(fetch.source_kind()),
        ui::style_text(&path.display().to_string(), ui::StyleType::Label)
    );
    Ok(path)
}
