//! Reference marker catalogs, one per TotalSeq chemistry format.
//!
//! Builtin catalogs ship embedded in the binary; a runtime file under
//! `data/resources/` replaces a builtin catalog when present (see
//! `catalog_sync` for how those files get there).

use anyhow::Result;
use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

pub const CHEMISTRY_FORMATS: [&str; 4] =
    ["totalseq_a", "totalseq_b", "totalseq_c", "totalseq_d"];

pub const DEFAULT_CATALOG_RESOURCE_DIR: &str = "data/resources";

const BUILTIN_TOTALSEQ_A: &str = include_str!("../assets/catalogs/totalseq_a.csv");
const BUILTIN_TOTALSEQ_B: &str = include_str!("../assets/catalogs/totalseq_b.csv");
const BUILTIN_TOTALSEQ_C: &str = include_str!("../assets/catalogs/totalseq_c.csv");
const BUILTIN_TOTALSEQ_D: &str = include_str!("../assets/catalogs/totalseq_d.csv");

const HUMAN_REACTIVITIES: [&str; 4] =
    ["Human", "Human and mouse", "Isotype control", "Epitope"];
const MOUSE_REACTIVITIES: [&str; 4] =
    ["Mouse", "Human and mouse", "Isotype control", "Epitope"];

/// One vendor catalog row, kept verbatim as loaded.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub catalogue_number: String,
    pub totalseq_id: String,
    pub marker: String,
    pub clone: String,
    pub reactivity: String,
    pub barcode: String,
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    format: String,
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Parses the vendor CSV layout: one header line (discarded), then
    /// positional `catalogue_number,totalseq_id,marker,clone,reactivity,
    /// barcode` rows. Rows with fewer than six fields keep their empty
    /// trailing fields; blank lines are skipped.
    pub fn from_csv_text(format: &str, text: &str) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());
        let mut entries = vec![];
        for record in rdr.records() {
            let record = record?;
            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }
            let field = |i: usize| record.get(i).unwrap_or_default().to_string();
            entries.push(CatalogEntry {
                catalogue_number: field(0),
                totalseq_id: field(1),
                marker: field(2),
                clone: field(3),
                reactivity: field(4),
                barcode: field(5),
            });
        }
        Ok(Self {
            format: format.to_string(),
            entries,
        })
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Restricts the catalog to entries compatible with a species.
    /// "Human" and "Mouse" filter on reactivity; anything else (including
    /// an unset species) keeps every entry.
    pub fn species_subset(&self, species: &str) -> Catalog {
        let keep: Option<&[&str]> = match species {
            "Human" => Some(&HUMAN_REACTIVITIES),
            "Mouse" => Some(&MOUSE_REACTIVITIES),
            _ => None,
        };
        let entries = match keep {
            Some(reactivities) => self
                .entries
                .iter()
                .filter(|e| reactivities.contains(&e.reactivity.as_str()))
                .cloned()
                .collect(),
            None => self.entries.clone(),
        };
        Self {
            format: self.format.clone(),
            entries,
        }
    }

    /// Typeahead lookup: case-insensitive substring match on catalogue
    /// number, marker name or clone. An empty query matches nothing.
    pub fn search(&self, query: &str) -> Vec<&CatalogEntry> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return vec![];
        }
        self.entries
            .iter()
            .filter(|e| {
                e.catalogue_number.to_lowercase().contains(&query)
                    || e.marker.to_lowercase().contains(&query)
                    || e.clone.to_lowercase().contains(&query)
            })
            .collect()
    }
}

pub fn runtime_catalog_path(dir: &Path, format: &str) -> PathBuf {
    dir.join(format!("{format}.catalog.csv"))
}

/// All known chemistry catalogs, keyed by format.
#[derive(Clone, Debug)]
pub struct CatalogSet {
    catalogs: HashMap<String, Catalog>,
}

impl CatalogSet {
    pub fn builtin() -> Self {
        let mut catalogs = HashMap::new();
        for (format, text) in [
            ("totalseq_a", BUILTIN_TOTALSEQ_A),
            ("totalseq_b", BUILTIN_TOTALSEQ_B),
            ("totalseq_c", BUILTIN_TOTALSEQ_C),
            ("totalseq_d", BUILTIN_TOTALSEQ_D),
        ] {
            let catalog =
                Catalog::from_csv_text(format, text).expect("Builtin catalog is malformed");
            catalogs.insert(format.to_string(), catalog);
        }
        Self { catalogs }
    }

    /// Replaces builtin catalogs with synced runtime files where a
    /// non-empty, parseable one exists.
    pub fn with_runtime_overrides(mut self, dir: &Path) -> Self {
        for format in CHEMISTRY_FORMATS {
            let path = runtime_catalog_path(dir, format);
            let Ok(text) = fs::read_to_string(&path) else {
                continue;
            };
            match Catalog::from_csv_text(format, &text) {
                Ok(catalog) if !catalog.is_empty() => {
                    self.catalogs.insert(format.to_string(), catalog);
                }
                Ok(_) => {
                    tracing::warn!("ignoring empty runtime catalog {}", path.display());
                }
                Err(e) => {
                    tracing::warn!("ignoring runtime catalog {}: {e}", path.display());
                }
            }
        }
        self
    }

    pub fn get(&self, format: &str) -> Option<&Catalog> {
        self.catalogs.get(format)
    }

    pub fn formats(&self) -> Vec<String> {
        let mut formats: Vec<String> = self.catalogs.keys().cloned().collect();
        formats.sort_unstable();
        formats
    }
}

impl Default for CatalogSet {
    fn default() -> Self {
        Self::builtin().with_runtime_overrides(Path::new(DEFAULT_CATALOG_RESOURCE_DIR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_catalogs() {
        let catalogs = CatalogSet::builtin();
        assert_eq!(
            catalogs.formats(),
            ["totalseq_a", "totalseq_b", "totalseq_c", "totalseq_d"]
        );
        let a = catalogs.get("totalseq_a").unwrap();
        assert!(a
            .entries()
            .iter()
            .any(|e| e.marker == "CD3" && e.clone == "UCHT1"));
        assert!(a.entries().iter().all(|e| !e.barcode.is_empty()));
        let d = catalogs.get("totalseq_d").unwrap();
        assert!(d.entries().iter().all(|e| e.totalseq_id.starts_with('D')));
    }

    #[test]
    fn test_species_subset_human_excludes_mouse_only() {
        let catalog = CatalogSet::builtin().get("totalseq_a").unwrap().clone();
        let human = catalog.species_subset("Human");
        assert!(!human.is_empty());
        assert!(human.entries().iter().all(|e| e.reactivity != "Mouse"));
        assert!(human
            .entries()
            .iter()
            .any(|e| e.reactivity == "Isotype control"));
        assert!(human.entries().iter().any(|e| e.reactivity == "Epitope"));
    }

    #[test]
    fn test_species_subset_mouse_excludes_human_only() {
        let catalog = CatalogSet::builtin().get("totalseq_a").unwrap().clone();
        let mouse = catalog.species_subset("Mouse");
        assert!(mouse.entries().iter().all(|e| e.reactivity != "Human"));
        assert!(mouse
            .entries()
            .iter()
            .any(|e| e.reactivity == "Human and mouse"));
    }

    #[test]
    fn test_species_subset_unset_keeps_everything() {
        let catalog = CatalogSet::builtin().get("totalseq_a").unwrap().clone();
        assert_eq!(catalog.species_subset("").len(), catalog.len());
        assert_eq!(catalog.species_subset("Rat").len(), catalog.len());
    }

    #[test]
    fn test_search() {
        let catalog = CatalogSet::builtin().get("totalseq_a").unwrap().clone();
        assert!(catalog.search("").is_empty());
        assert!(catalog.search("   ").is_empty());
        assert!(!catalog.search("cd3").is_empty());
        assert_eq!(catalog.search("300475").len(), 1);
        assert!(catalog
            .search("ucht1")
            .iter()
            .all(|e| e.clone.eq_ignore_ascii_case("UCHT1")));
        assert!(catalog.search("no such marker").is_empty());
    }

    #[test]
    fn test_short_rows_keep_empty_trailing_fields() {
        let text = "catalogue_number,totalseq_id,marker,clone,reactivity,barcode\n\
                    123456,A0001,CD3\n";
        let catalog = Catalog::from_csv_text("totalseq_a", text).unwrap();
        assert_eq!(catalog.len(), 1);
        let entry = &catalog.entries()[0];
        assert_eq!(entry.marker, "CD3");
        assert_eq!(entry.clone, "");
        assert_eq!(entry.reactivity, "");
        assert_eq!(entry.barcode, "");
    }

    #[test]
    fn test_runtime_override_replaces_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let path = runtime_catalog_path(dir.path(), "totalseq_a");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "catalogue_number,totalseq_id,marker,clone,reactivity,barcode").unwrap();
        writeln!(file, "999999,A9999,CD999,X1,Human,AAAAACCCCCGGGGG").unwrap();

        let catalogs = CatalogSet::builtin().with_runtime_overrides(dir.path());
        let a = catalogs.get("totalseq_a").unwrap();
        assert_eq!(a.len(), 1);
        assert_eq!(a.entries()[0].marker, "CD999");
        // Formats without a runtime file keep their builtin entries.
        assert!(catalogs.get("totalseq_b").unwrap().len() > 1);
    }

    #[test]
    fn test_empty_runtime_override_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = runtime_catalog_path(dir.path(), "totalseq_b");
        std::fs::write(&path, "catalogue_number,totalseq_id,marker,clone,reactivity,barcode\n")
            .unwrap();

        let catalogs = CatalogSet::builtin().with_runtime_overrides(dir.path());
        assert!(catalogs.get("totalseq_b").unwrap().len() > 1);
    }
}
