use thiserror::Error;

/// Points at a row that failed validation and names its empty fields,
/// so frontends can flag it for correction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowIssue {
    pub row: usize,
    pub missing: Vec<String>,
}

/// Everything that can abort an export. All variants are terminal to the
/// triggering action and leave the session usable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExportError {
    #[error("no output format selected")]
    MissingOutputFormat,
    #[error("unknown output format '{0}'")]
    UnknownOutputFormat(String),
    #[error("tapestri panels require a totalseq_d catalog, not '{0}'")]
    ChemistryMismatch(String),
    #[error("{} row(s) are missing required fields", .0.len())]
    InvalidRows(Vec<RowIssue>),
}
