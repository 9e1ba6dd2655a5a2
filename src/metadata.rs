//! Experiment metadata sheet rows and their validation.

use serde::{Deserialize, Serialize};

pub const METADATA_FIELDS: [&str; 11] = [
    "assay",
    "experiment_id",
    "historical_number",
    "replicate",
    "modality",
    "chemistry",
    "index_type",
    "index",
    "species",
    "n_donors",
    "adt_file",
];

/// Exported stand-in for a field the user left empty. The row still
/// fails validation; the sentinel only shapes what a line would read.
pub const EMPTY_FIELD_SENTINEL: &str = "NA";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataRow {
    pub assay: String,
    pub experiment_id: String,
    pub historical_number: String,
    pub replicate: String,
    pub modality: String,
    pub chemistry: String,
    pub index_type: String,
    pub index: String,
    pub species: String,
    pub n_donors: String,
    pub adt_file: String,
}

impl MetadataRow {
    /// Field values in header order.
    pub fn values(&self) -> [&str; 11] {
        [
            self.assay.as_str(),
            self.experiment_id.as_str(),
            self.historical_number.as_str(),
            self.replicate.as_str(),
            self.modality.as_str(),
            self.chemistry.as_str(),
            self.index_type.as_str(),
            self.index.as_str(),
            self.species.as_str(),
            self.n_donors.as_str(),
            self.adt_file.as_str(),
        ]
    }

    /// Reads all eleven fields, substituting the `NA` sentinel for empty
    /// ones. The verdict is false if any field was empty, and `missing`
    /// names them for UI flagging.
    pub fn validate(&self) -> RowValidation {
        let mut valid = true;
        let mut missing = vec![];
        let values = METADATA_FIELDS
            .iter()
            .zip(self.values())
            .map(|(field, value)| {
                if value.is_empty() {
                    valid = false;
                    missing.push((*field).to_string());
                    EMPTY_FIELD_SENTINEL.to_string()
                } else {
                    value.to_string()
                }
            })
            .collect();
        RowValidation {
            valid,
            values,
            missing,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowValidation {
    pub valid: bool,
    pub values: Vec<String>,
    pub missing: Vec<String>,
}

/// Ordered store of metadata rows; rows export in insertion order.
#[derive(Clone, Debug, Default)]
pub struct MetadataSheet {
    rows: Vec<MetadataRow>,
}

impl MetadataSheet {
    pub fn add_row(&mut self) -> &mut MetadataRow {
        self.rows.push(MetadataRow::default());
        self.rows.last_mut().unwrap()
    }

    pub fn rows(&self) -> &[MetadataRow] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [MetadataRow] {
        &mut self.rows
    }

    pub fn remove(&mut self, index: usize) -> Option<MetadataRow> {
        if index < self.rows.len() {
            Some(self.rows.remove(index))
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
