//! Options files.

use std::path::Path;

use anyhow::{bail, Context, Result};
use tabxl_sheet::ConvertOptions;

/// Load conversion options from a `.json`, `.yaml` or `.yml` file.
pub fn load_options(path: &Path) -> Result<ConvertOptions> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("json") => serde_json::from_str(&text)
            .with_context(|| format!("Invalid JSON config: {}", path.display())),
        Some("yaml" | "yml") => serde_yaml::from_str(&text)
            .with_context(|| format!("Invalid YAML config: {}", path.display())),
        _ => bail!(
            "Unsupported config file '{}': expected .json, .yaml or .yml",
            path.display()
        ),
    }
}
