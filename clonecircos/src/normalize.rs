use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use itertools::Itertools;
use log::{debug, info, warn};

use crate::config::ViewConfig;
use crate::error::{CircosError, CircosResult, PipelineWarning};
use crate::record::{CircosTime, CloneId, SequenceRecord};
use crate::table::RawTable;

pub const TIMEPOINT_COLUMN: &str = "timepoint";
pub const CLONE_COLUMN: &str = "clone";
pub const SPEC_COLUMN: &str = "spec";
pub const SEQ_ID_COLUMN: &str = "seq_id";

/// Columns every input table must have after column name normalization.
pub const REQUIRED_COLUMNS: [&str; 4] = [TIMEPOINT_COLUMN, CLONE_COLUMN, SPEC_COLUMN, SEQ_ID_COLUMN];

const DERIVED_COLUMNS: [&str; 3] = ["circos_time", "total_clone_count", "timepoint_clone_count"];

/// Cleaned, sorted dataset with the derived per-clone statistics.
///
/// Records are ordered by (`timepoint`, `timepoint_clone_count`, `clone`),
/// nulls first, with ties kept in input order; band placement relies on this
/// order.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NormalizedDataset {
    columns: Vec<String>,
    records: Vec<SequenceRecord>,
}

impl NormalizedDataset {
    /// Normalizes the column names, drops empty rows, derives `circos_time`
    /// and the clone counts, and sorts the rows.
    pub fn from_table(table: &RawTable) -> CircosResult<Self> {
        let (columns, rows) = table.cleaned().into_parts();

        let index_of = |name: &str| {
            columns
                .iter()
                .position(|column| column == name)
                .ok_or_else(|| CircosError::MissingColumn(name.to_owned()))
        };
        let timepoint_index = index_of(TIMEPOINT_COLUMN)?;
        let clone_index = index_of(CLONE_COLUMN)?;
        let spec_index = index_of(SPEC_COLUMN)?;
        let seq_id_index = index_of(SEQ_ID_COLUMN)?;

        let mut records = Vec::with_capacity(rows.len());
        for (row, cells) in rows.into_iter().enumerate() {
            let timepoint = cells[timepoint_index]
                .clone()
                .ok_or(CircosError::InvalidTimepoint { row, value: None })?;
            let circos_time = CircosTime::from_timepoint(&timepoint).ok_or_else(|| {
                CircosError::InvalidTimepoint {
                    row,
                    value: Some(timepoint.clone()),
                }
            })?;

            records.push(SequenceRecord::new(
                timepoint,
                cells[clone_index].as_deref().map(CloneId::from),
                cells[spec_index].clone(),
                cells[seq_id_index].clone(),
                circos_time,
                cells,
            ));
        }

        Self::count_clones(&mut records);
        records.sort_by(|a, b| {
            a.timepoint()
                .cmp(b.timepoint())
                .then_with(|| a.timepoint_clone_count().cmp(&b.timepoint_clone_count()))
                .then_with(|| a.clone_id().cmp(&b.clone_id()))
        });

        debug!("Normalized {} rows", records.len());
        Ok(Self { columns, records })
    }

    fn count_clones(records: &mut [SequenceRecord]) {
        let counts: Vec<(Option<usize>, Option<usize>)> = {
            let total = records
                .iter()
                .filter_map(SequenceRecord::clone_id)
                .counts();
            let per_timepoint = records
                .iter()
                .filter_map(|record| record.clone_id().map(|clone| (record.timepoint(), clone)))
                .counts();

            records
                .iter()
                .map(|record| match record.clone_id() {
                    Some(clone) => (
                        total.get(clone).copied(),
                        per_timepoint.get(&(record.timepoint(), clone)).copied(),
                    ),
                    None => (None, None),
                })
                .collect()
        };

        for (record, (total, per_timepoint)) in records.iter_mut().zip(counts) {
            record.set_counts(total, per_timepoint);
        }
    }

    /// Applies the view's `spec_list`, if any.
    ///
    /// A filter that keeps no rows of a non-empty dataset is reported as
    /// [`PipelineWarning::UnresolvedFilter`].
    #[must_use]
    pub fn for_view(self, view: &ViewConfig) -> Normalization {
        let spec_list = match view.spec_list() {
            Some(spec_list) => spec_list,
            None => {
                return Normalization {
                    dataset: self,
                    warnings: Vec::new(),
                }
            }
        };

        let was_empty = self.is_empty();
        let dataset = self.filter_specs(spec_list);
        let mut warnings = Vec::new();
        if dataset.is_empty() && !was_empty {
            let warning = PipelineWarning::UnresolvedFilter {
                view: view.output_file_name().to_owned(),
                spec_list: spec_list.to_vec(),
            };
            warn!("{}", warning);
            warnings.push(warning);
        }

        debug!(
            "View `{}` keeps {} rows",
            view.output_file_name(),
            dataset.len()
        );
        Normalization { dataset, warnings }
    }

    /// Returns a dataset with only the records whose `spec` is in
    /// `spec_list`, in unchanged order.
    #[must_use]
    pub fn filter_specs(&self, spec_list: &[String]) -> Self {
        Self {
            columns: self.columns.clone(),
            records: self
                .records
                .iter()
                .filter(|record| record.matches_spec(spec_list))
                .cloned()
                .collect(),
        }
    }

    /// Writes the dataset, with its derived columns, as a comma-separated
    /// file with a header line.
    pub fn write_csv<W: Write>(&self, writer: W) -> CircosResult<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(self.columns.iter().map(String::as_str).chain(DERIVED_COLUMNS))?;

        for record in &self.records {
            let cells = record.cells().iter().map(|cell| cell.clone().unwrap_or_default());
            let derived = [
                record.circos_time().to_string(),
                count_to_string(record.total_clone_count()),
                count_to_string(record.timepoint_clone_count()),
            ];
            csv_writer.write_record(cells.chain(derived))?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Names of the normalized input columns.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn records(&self) -> &[SequenceRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct non-null clones, in order of first appearance.
    #[must_use]
    pub fn distinct_clones(&self) -> Vec<&CloneId> {
        self.records
            .iter()
            .filter_map(SequenceRecord::clone_id)
            .unique()
            .collect()
    }

    /// Distinct Circos times, in order of first appearance.
    #[must_use]
    pub fn circos_times(&self) -> Vec<&CircosTime> {
        self.records
            .iter()
            .map(SequenceRecord::circos_time)
            .unique()
            .collect()
    }

    pub(crate) fn into_records(self) -> Vec<SequenceRecord> {
        self.records
    }
}

fn count_to_string(count: Option<usize>) -> String {
    count.map(|count| count.to_string()).unwrap_or_default()
}

/// Normalized dataset of a single view, with any warnings raised on the way.
#[derive(Debug, Clone)]
pub struct Normalization {
    pub dataset: NormalizedDataset,
    pub warnings: Vec<PipelineWarning>,
}

/// Normalizes an already parsed table for given view.
///
/// # Examples
/// ```
/// use clonecircos::config::ViewConfig;
/// use clonecircos::normalize::normalize;
/// use clonecircos::table::RawTable;
///
/// let mut table = RawTable::new(["Timepoint", "Clone", "Spec", "Seq ID"]);
/// table.push_row([Some("S1-001"), Some("A"), Some("x"), Some("2")]);
/// table.push_row([Some("S1-000"), Some("A"), Some("x"), Some("1")]);
///
/// let normalization = normalize(&table, &ViewConfig::builder("all").build()).unwrap();
/// let seq_ids: Vec<_> = normalization.dataset.records().iter().map(|r| r.seq_id()).collect();
/// assert_eq!(seq_ids, [Some("1"), Some("2")]);
/// ```
pub fn normalize(table: &RawTable, view: &ViewConfig) -> CircosResult<Normalization> {
    Ok(NormalizedDataset::from_table(table)?.for_view(view))
}

/// Reads a comma-separated input file and normalizes it for given view.
///
/// The sorted dataset is additionally written to `audit_path` before the
/// view's filter is applied.
pub fn normalize_csv_file(
    input: &Path,
    view: &ViewConfig,
    audit_path: &Path,
) -> CircosResult<Normalization> {
    let table = RawTable::from_csv_reader(BufReader::new(File::open(input)?))?;
    let dataset = NormalizedDataset::from_table(&table)?;

    dataset.write_csv(File::create(audit_path)?)?;
    info!("Sorted dataset written to {}", audit_path.display());

    Ok(dataset.for_view(view))
}
