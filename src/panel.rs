//! The selected-marker row store behind the ADT panel form.

use crate::{marker_catalog::CatalogEntry, marker_name::normalize_marker_name};
use serde::{Deserialize, Serialize};

/// One selected marker. `normalized_name` starts as the normalizer's
/// output and may be overwritten verbatim by the user afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelRow {
    pub marker: String,
    pub normalized_name: String,
    pub totalseq_id: String,
    pub catalogue_number: String,
    pub clone: String,
    pub reactivity: String,
    pub barcode: String,
}

impl PanelRow {
    pub fn from_entry(entry: &CatalogEntry) -> Self {
        Self {
            marker: entry.marker.clone(),
            normalized_name: normalize_marker_name(&entry.marker),
            totalseq_id: entry.totalseq_id.clone(),
            catalogue_number: entry.catalogue_number.clone(),
            clone: entry.clone.clone(),
            reactivity: entry.reactivity.clone(),
            barcode: entry.barcode.clone(),
        }
    }

    /// Hashtag reagents pool at the end of every exported panel. The
    /// check is case-sensitive, matching how catalogs name them.
    pub fn is_hashtag(&self) -> bool {
        self.marker.contains("Hashtag")
    }
}

/// Ordered, mutable collection of selected markers. Insertion order is
/// kept as-is; export ordering is computed separately.
#[derive(Clone, Debug, Default)]
pub struct Panel {
    rows: Vec<PanelRow>,
}

impl Panel {
    pub fn add_entry(&mut self, entry: &CatalogEntry) {
        self.rows.push(PanelRow::from_entry(entry));
    }

    pub fn rows(&self) -> &[PanelRow] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [PanelRow] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Overwrites a row's normalized name without re-normalizing; user
    /// overrides are intentional.
    pub fn set_normalized_name(&mut self, index: usize, name: &str) -> bool {
        match self.rows.get_mut(index) {
            Some(row) => {
                row.normalized_name = name.to_string();
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, index: usize) -> Option<PanelRow> {
        if index < self.rows.len() {
            Some(self.rows.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    /// Export ordering: non-hashtag rows sorted ascending by normalized
    /// name (case-insensitive), then hashtag rows in insertion order.
    pub fn export_order(&self) -> Vec<&PanelRow> {
        let (hashtags, mut markers): (Vec<&PanelRow>, Vec<&PanelRow>) =
            self.rows.iter().partition(|row| row.is_hashtag());
        markers.sort_by_key(|row| row.normalized_name.to_lowercase());
        markers.into_iter().chain(hashtags).collect()
    }
}
