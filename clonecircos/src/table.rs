use std::io::Read;

use itertools::Itertools;
use log::debug;

use crate::error::CircosResult;

/// A single nullable cell of a [`RawTable`].
pub type Cell = Option<String>;

/// Tabular dataset as parsed from a spreadsheet or delimited file, before any
/// normalization.
///
/// Every row has exactly as many cells as there are columns; missing trailing
/// cells are stored as nulls.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RawTable {
    /// Creates a new, row-less `RawTable` with given column names.
    ///
    /// # Examples
    /// ```
    /// use clonecircos::table::RawTable;
    ///
    /// let table = RawTable::new(["Timepoint", "Clone"]);
    /// assert_eq!(table.columns(), &["Timepoint", "Clone"]);
    /// assert!(table.is_empty());
    /// ```
    #[must_use]
    pub fn new<I, T>(columns: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            columns: columns.into_iter().map_into().collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row. Cells beyond the number of columns are discarded and
    /// missing cells are filled with nulls.
    ///
    /// # Examples
    /// ```
    /// use clonecircos::table::RawTable;
    ///
    /// let mut table = RawTable::new(["timepoint", "clone", "spec"]);
    /// table.push_row([Some("S1-000"), None]);
    /// assert_eq!(table.cell(0, 0), Some("S1-000"));
    /// assert_eq!(table.cell(0, 2), None);
    /// ```
    pub fn push_row<I, T>(&mut self, cells: I) -> &mut Self
    where
        I: IntoIterator<Item = Option<T>>,
        T: Into<String>,
    {
        let mut row: Vec<Cell> = cells
            .into_iter()
            .take(self.columns.len())
            .map(|cell| cell.map(Into::into))
            .collect();
        row.resize(self.columns.len(), None);
        self.rows.push(row);
        self
    }

    /// Reads a comma-separated file with a header line. Empty fields become
    /// nulls.
    pub fn from_csv_reader<R: Read>(reader: R) -> CircosResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let mut table = Self::new(csv_reader.headers()?.iter());
        for record in csv_reader.records() {
            let record = record?;
            table.push_row(
                record
                    .iter()
                    .map(|field| Some(field).filter(|field| !field.is_empty())),
            );
        }

        debug!(
            "Read {} rows with {} columns",
            table.len(),
            table.columns.len()
        );
        Ok(table)
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Returns the index of the column with exactly given name.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Returns the value of given cell, or `None` if it is null or out of
    /// bounds.
    #[must_use]
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .and_then(|cell| cell.as_deref())
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns a copy of this table with all column names passed through
    /// [`normalize_column_name`] and rows consisting only of nulls removed.
    #[must_use]
    pub fn cleaned(&self) -> Self {
        Self {
            columns: self
                .columns
                .iter()
                .map(|column| normalize_column_name(column))
                .collect(),
            rows: self
                .rows
                .iter()
                .filter(|row| row.iter().any(Option::is_some))
                .cloned()
                .collect(),
        }
    }

    pub(crate) fn into_parts(self) -> (Vec<String>, Vec<Vec<Cell>>) {
        (self.columns, self.rows)
    }
}

/// Normalizes a column name: trims surrounding whitespace, lowercases it and
/// replaces spaces and hyphens with underscores.
///
/// # Examples
/// ```
/// use clonecircos::table::normalize_column_name;
///
/// assert_eq!(normalize_column_name("  Seq ID "), "seq_id");
/// assert_eq!(normalize_column_name("Time-Point"), "time_point");
/// ```
#[must_use]
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_").replace('-', "_")
}
