//! Vendor catalog synchronization.
//!
//! Downloads a chemistry catalog CSV and stores it under the runtime
//! resource directory, where `CatalogSet` prefers it over the builtin
//! copy on the next load.

use crate::marker_catalog::{runtime_catalog_path, Catalog};
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyncReport {
    pub format: String,
    pub source: String,
    pub output: String,
    pub entry_count: usize,
}

/// Validates fetched catalog text and writes the runtime resource file.
/// Text that does not parse to at least one entry is rejected, keeping
/// the builtin catalog in effect.
pub fn write_catalog_resource(
    format: &str,
    source: &str,
    text: &str,
    out_dir: &Path,
) -> Result<SyncReport> {
    let catalog = Catalog::from_csv_text(format, text)
        .with_context(|| format!("Catalog from {source} does not parse"))?;
    if catalog.is_empty() {
        return Err(anyhow!("Catalog from {source} has no entries"));
    }
    fs::create_dir_all(out_dir)
        .with_context(|| format!("Could not create {}", out_dir.display()))?;
    let output = runtime_catalog_path(out_dir, format);
    fs::write(&output, text).with_context(|| format!("Could not write {}", output.display()))?;
    tracing::info!(
        "synced {} {format} entries to {}",
        catalog.len(),
        output.display()
    );
    Ok(SyncReport {
        format: format.to_string(),
        source: source.to_string(),
        output: output.display().to_string(),
        entry_count: catalog.len(),
    })
}

/// Fetches a catalog CSV over HTTP and installs it as the runtime
/// override for `format`.
pub fn sync_catalog(format: &str, url: &str, out_dir: &Path) -> Result<SyncReport> {
    let response = reqwest::blocking::get(url)
        .with_context(|| format!("Could not fetch {url}"))?
        .error_for_status()
        .with_context(|| format!("Catalog server rejected {url}"))?;
    let text = response
        .text()
        .with_context(|| format!("Could not read catalog body from {url}"))?;
    write_catalog_resource(format, url, &text, out_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_catalog_resource() {
        let dir = tempfile::tempdir().unwrap();
        let text = "catalogue_number,totalseq_id,marker,clone,reactivity,barcode\n\
                    123456,A0001,CD3,UCHT1,Human,CTCATTGTAACTCCT\n";
        let report =
            write_catalog_resource("totalseq_a", "unit-test", text, dir.path()).unwrap();
        assert_eq!(report.entry_count, 1);
        assert_eq!(report.format, "totalseq_a");
        let written = fs::read_to_string(runtime_catalog_path(dir.path(), "totalseq_a")).unwrap();
        assert_eq!(written, text);
    }

    #[test]
    fn test_empty_catalog_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let header_only = "catalogue_number,totalseq_id,marker,clone,reactivity,barcode\n";
        assert!(write_catalog_resource("totalseq_a", "unit-test", header_only, dir.path()).is_err());
        assert!(!runtime_catalog_path(dir.path(), "totalseq_a").exists());
    }
}
