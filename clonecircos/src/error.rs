use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Error occurring while turning a lineage table into Circos artifacts.
#[derive(Debug)]
pub enum CircosError {
    /// A required column is absent after column name normalization.
    MissingColumn(String),
    /// The dataset has no rows left to place on the karyotype.
    EmptyDataset,
    /// The hue range name is not one of the known ranges.
    UnknownRange(String),
    /// A view that generates links has no hue range configured.
    MissingHueRange(String),
    /// The `timepoint` cell of given row is null or has no numeric day
    /// segment.
    InvalidTimepoint { row: usize, value: Option<String> },
    /// The output location is not an existing directory.
    NotADirectory(PathBuf),
    /// I/O error occurred when reading or writing an artifact.
    IoError(std::io::Error),
    /// The delimited input or output could not be processed.
    CsvError(csv::Error),
}

impl From<std::io::Error> for CircosError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

impl From<csv::Error> for CircosError {
    fn from(e: csv::Error) -> Self {
        Self::CsvError(e)
    }
}

impl Display for CircosError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CircosError::MissingColumn(name) => write!(f, "Missing required column: `{}`", name),
            CircosError::EmptyDataset => write!(f, "Dataset has no rows"),
            CircosError::UnknownRange(name) => write!(f, "Unknown hue range: `{}`", name),
            CircosError::MissingHueRange(view) => {
                write!(f, "View `{}` generates links but has no hue range", view)
            }
            CircosError::InvalidTimepoint { row, value } => match value {
                Some(value) => write!(f, "Invalid timepoint in row {}: `{}`", row, value),
                None => write!(f, "Missing timepoint in row {}", row),
            },
            CircosError::NotADirectory(path) => {
                write!(f, "Path: {} does not point to a directory", path.display())
            }
            CircosError::IoError(e) => write!(f, "IO error: {}", e),
            CircosError::CsvError(e) => write!(f, "CSV error: {}", e),
        }
    }
}

impl Error for CircosError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CircosError::IoError(e) => Some(e),
            CircosError::CsvError(e) => Some(e),
            _ => None,
        }
    }
}

/// The result of a pipeline operation.
pub type CircosResult<T> = Result<T, CircosError>;

/// Condition worth reporting that does not abort the pipeline.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum PipelineWarning {
    /// A configured `spec_list` matched none of the rows it was applied to.
    ///
    /// Whether that is a legitimately empty view or a misconfiguration is up
    /// to the caller.
    UnresolvedFilter {
        view: String,
        spec_list: Vec<String>,
    },
}

impl Display for PipelineWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineWarning::UnresolvedFilter { view, spec_list } => write!(
                f,
                "Spec filter [{}] of view `{}` matched no rows",
                spec_list.join(", "),
                view
            ),
        }
    }
}
