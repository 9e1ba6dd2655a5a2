//! CSV export engine: turns the row stores into pipeline-specific
//! artifacts. All exports are all-or-nothing; a failed validation or a
//! missing selection produces no file at all.

use crate::{
    error::{ExportError, RowIssue},
    metadata::{MetadataRow, METADATA_FIELDS},
    panel::Panel,
};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub const METADATA_FILENAME: &str = "metadata.csv";
pub const DEFAULT_PANEL_BASENAME: &str = "adt_list";

/// Downstream pipeline the panel CSV is written for.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Cellranger,
    Kallisto,
    Tapestri,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [
        OutputFormat::Cellranger,
        OutputFormat::Kallisto,
        OutputFormat::Tapestri,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Cellranger => "cellranger",
            OutputFormat::Kallisto => "kallisto",
            OutputFormat::Tapestri => "tapestri",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cellranger" => Ok(OutputFormat::Cellranger),
            "kallisto" => Ok(OutputFormat::Kallisto),
            "tapestri" => Ok(OutputFormat::Tapestri),
            other => Err(ExportError::UnknownOutputFormat(other.to_string())),
        }
    }
}

/// Final bytes plus the filename they should land under. Writing is the
/// artifact writer's job, not the export engine's.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub filename: String,
    pub contents: String,
}

/// Read 2 barcode pattern for the cellranger feature reference.
/// Chemistries outside the TotalSeq A/B/C families get an empty pattern.
fn barcode_pattern(chemistry_format: &str) -> &'static str {
    if chemistry_format.contains("totalseq_a") {
        "5P(BC)"
    } else if chemistry_format.contains("totalseq_b") || chemistry_format.contains("totalseq_c") {
        "5PNNNNNNNNNN(BC)"
    } else {
        ""
    }
}

/// Serializes the panel for one downstream pipeline. Fails before any
/// row processing when no output format is selected, or when a tapestri
/// export is requested against a non-totalseq_d catalog.
pub fn export_panel(
    panel: &Panel,
    output_format: Option<OutputFormat>,
    chemistry_format: &str,
    base_name: &str,
) -> Result<Artifact, ExportError> {
    let output_format = output_format.ok_or(ExportError::MissingOutputFormat)?;
    if output_format == OutputFormat::Tapestri && !chemistry_format.contains("totalseq_d") {
        return Err(ExportError::ChemistryMismatch(chemistry_format.to_string()));
    }

    let rows = panel.export_order();
    let mut contents = String::new();
    match output_format {
        OutputFormat::Cellranger => {
            contents.push_str("id,name,read,pattern,sequence,feature_type\n");
            let pattern = barcode_pattern(chemistry_format);
            for row in rows {
                let name = row.normalized_name.trim();
                let barcode = row.barcode.trim();
                contents.push_str(&format!(
                    "{name},{name},R2,{pattern},{barcode},Antibody Capture\n"
                ));
            }
        }
        OutputFormat::Kallisto => {
            contents.push_str("Feature Barcode name,Feature Barcode sequence\n");
            for row in rows {
                contents.push_str(&format!(
                    "{},{}\n",
                    row.normalized_name.trim(),
                    row.barcode.trim()
                ));
            }
        }
        OutputFormat::Tapestri => {
            contents.push_str("ID,Name,Sequence\n");
            for row in rows {
                contents.push_str(&format!(
                    "D{},{},{}\n",
                    row.totalseq_id.trim(),
                    row.normalized_name.trim(),
                    row.barcode.trim()
                ));
            }
        }
    }

    let base_name = base_name.trim();
    let base_name = if base_name.is_empty() {
        DEFAULT_PANEL_BASENAME
    } else {
        base_name
    };
    Ok(Artifact {
        filename: format!("{base_name}.csv"),
        contents,
    })
}

/// Serializes the metadata sheet. Any invalid row aborts the whole
/// export; the error carries every offending row and its empty fields.
pub fn export_metadata(rows: &[MetadataRow]) -> Result<Artifact, ExportError> {
    let mut issues = vec![];
    let mut lines = vec![METADATA_FIELDS.join(",")];
    for (index, row) in rows.iter().enumerate() {
        let verdict = row.validate();
        if verdict.valid {
            lines.push(verdict.values.iter().join(","));
        } else {
            issues.push(RowIssue {
                row: index,
                missing: verdict.missing,
            });
        }
    }
    if !issues.is_empty() {
        return Err(ExportError::InvalidRows(issues));
    }
    let mut contents = lines.join("\n");
    contents.push('\n');
    Ok(Artifact {
        filename: METADATA_FILENAME.to_string(),
        contents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker_catalog::CatalogEntry;

    fn entry(marker: &str, totalseq_id: &str, barcode: &str) -> CatalogEntry {
        CatalogEntry {
            catalogue_number: "100000".to_string(),
            totalseq_id: totalseq_id.to_string(),
            marker: marker.to_string(),
            clone: "X1".to_string(),
            reactivity: "Human".to_string(),
            barcode: barcode.to_string(),
        }
    }

    fn one_row_panel(marker: &str, totalseq_id: &str, barcode: &str) -> Panel {
        let mut panel = Panel::default();
        panel.add_entry(&entry(marker, totalseq_id, barcode));
        panel
    }

    #[test]
    fn test_missing_output_format_fails_first() {
        let panel = one_row_panel("CD3", "A0034", "AAACCCTTT");
        assert_eq!(
            export_panel(&panel, None, "totalseq_a", "x"),
            Err(ExportError::MissingOutputFormat)
        );
    }

    #[test]
    fn test_cellranger_totalseq_a_line() {
        let panel = one_row_panel("CD3", "A0001", "AAACCCTTT");
        let artifact = export_panel(
            &panel,
            Some(OutputFormat::Cellranger),
            "totalseq_a",
            "",
        )
        .unwrap();
        assert_eq!(artifact.filename, "adt_list.csv");
        assert_eq!(
            artifact.contents,
            "id,name,read,pattern,sequence,feature_type\n\
             CD3,CD3,R2,5P(BC),AAACCCTTT,Antibody Capture\n"
        );
    }

    #[test]
    fn test_cellranger_totalseq_b_and_c_pattern() {
        for chemistry in ["totalseq_b", "totalseq_c"] {
            let panel = one_row_panel("CD3", "B0001", "AAACCCTTT");
            let artifact =
                export_panel(&panel, Some(OutputFormat::Cellranger), chemistry, "p").unwrap();
            assert!(artifact
                .contents
                .contains("CD3,CD3,R2,5PNNNNNNNNNN(BC),AAACCCTTT,Antibody Capture"));
        }
    }

    #[test]
    fn test_cellranger_unknown_chemistry_blank_pattern() {
        let panel = one_row_panel("CD3", "A0001", "AAACCCTTT");
        let artifact =
            export_panel(&panel, Some(OutputFormat::Cellranger), "custom_kit", "p").unwrap();
        assert!(artifact
            .contents
            .contains("CD3,CD3,R2,,AAACCCTTT,Antibody Capture"));
    }

    #[test]
    fn test_kallisto_layout() {
        let panel = one_row_panel("CD4", "A0002", "GGGTTTAAA");
        let artifact =
            export_panel(&panel, Some(OutputFormat::Kallisto), "totalseq_a", "my panel").unwrap();
        assert_eq!(artifact.filename, "my panel.csv");
        assert_eq!(
            artifact.contents,
            "Feature Barcode name,Feature Barcode sequence\nCD4,GGGTTTAAA\n"
        );
    }

    #[test]
    fn test_tapestri_prefixes_totalseq_id() {
        let panel = one_row_panel("CD4", "D001", "GGGTTTAAA");
        let artifact =
            export_panel(&panel, Some(OutputFormat::Tapestri), "totalseq_d", "t").unwrap();
        assert_eq!(
            artifact.contents,
            "ID,Name,Sequence\nDD001,CD4,GGGTTTAAA\n"
        );
    }

    #[test]
    fn test_tapestri_rejects_other_chemistries() {
        let panel = one_row_panel("CD4", "A0002", "GGGTTTAAA");
        assert_eq!(
            export_panel(&panel, Some(OutputFormat::Tapestri), "totalseq_a", "t"),
            Err(ExportError::ChemistryMismatch("totalseq_a".to_string()))
        );
    }

    #[test]
    fn test_panel_rows_are_ordered_and_trimmed() {
        let mut panel = Panel::default();
        panel.add_entry(&entry("CD3", "A0001", " CTCATTGTAACTCCT "));
        panel.add_entry(&entry("Hashtag 1", "A0251", "GTCAACTCTTTAGCG"));
        panel.add_entry(&entry("CD4", "A0002", "TGTTCCCGCTCAACT"));
        let artifact =
            export_panel(&panel, Some(OutputFormat::Kallisto), "totalseq_a", "").unwrap();
        assert_eq!(
            artifact.contents,
            "Feature Barcode name,Feature Barcode sequence\n\
             CD3,CTCATTGTAACTCCT\n\
             CD4,TGTTCCCGCTCAACT\n\
             Hashtag1,GTCAACTCTTTAGCG\n"
        );
    }

    #[test]
    fn test_output_format_round_trip() {
        for format in OutputFormat::ALL {
            assert_eq!(format.as_str().parse::<OutputFormat>().unwrap(), format);
        }
        assert_eq!(
            "excel".parse::<OutputFormat>(),
            Err(ExportError::UnknownOutputFormat("excel".to_string()))
        );
    }

    #[test]
    fn test_metadata_export_aborts_on_invalid_row() {
        let complete = MetadataRow {
            assay: "CITE-seq".to_string(),
            experiment_id: "EXP042".to_string(),
            historical_number: "7".to_string(),
            replicate: "1".to_string(),
            modality: "RNA+ADT".to_string(),
            chemistry: "totalseq_a".to_string(),
            index_type: "dual".to_string(),
            index: "SI-TT-A1".to_string(),
            species: "Human".to_string(),
            n_donors: "4".to_string(),
            adt_file: "adt_list.csv".to_string(),
        };
        let partial = MetadataRow {
            assay: "CITE-seq".to_string(),
            ..Default::default()
        };

        let err = export_metadata(&[complete.clone(), partial]).unwrap_err();
        match err {
            ExportError::InvalidRows(issues) => {
                assert_eq!(issues.len(), 1);
                assert_eq!(issues[0].row, 1);
                assert_eq!(issues[0].missing.len(), 10);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let artifact = export_metadata(&[complete]).unwrap();
        assert_eq!(artifact.filename, "metadata.csv");
        assert_eq!(
            artifact.contents,
            "assay,experiment_id,historical_number,replicate,modality,chemistry,index_type,index,species,n_donors,adt_file\n\
             CITE-seq,EXP042,7,1,RNA+ADT,totalseq_a,dual,SI-TT-A1,Human,4,adt_list.csv\n"
        );
    }

    #[test]
    fn test_metadata_rows_keep_insertion_order() {
        let mut first = MetadataRow::default();
        let mut second = MetadataRow::default();
        for row in [&mut first, &mut second] {
            row.assay = "CITE-seq".to_string();
            row.experiment_id = "EXP001".to_string();
            row.historical_number = "1".to_string();
            row.replicate = "1".to_string();
            row.modality = "RNA+ADT".to_string();
            row.chemistry = "totalseq_a".to_string();
            row.index_type = "dual".to_string();
            row.index = "SI-TT-A1".to_string();
            row.species = "Human".to_string();
            row.n_donors = "2".to_string();
            row.adt_file = "adt_list.csv".to_string();
        }
        first.experiment_id = "EXP002".to_string();
        let artifact = export_metadata(&[first, second]).unwrap();
        let lines: Vec<&str> = artifact.contents.lines().collect();
        assert!(lines[1].contains("EXP002"));
        assert!(lines[2].contains("EXP001"));
    }
}
