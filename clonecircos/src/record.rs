use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use derive_more::Deref;

use crate::table::Cell;

/// Identifier grouping sequences that share a lineage.
///
/// Identifiers that both parse as numbers are ordered numerically; numbers
/// come before any non-numeric identifier, which are ordered by text. Two
/// identifiers are equal only if their texts are.
#[derive(Deref, Debug, Clone, Eq, PartialEq, Hash)]
pub struct CloneId(String);

impl CloneId {
    /// Creates a new `CloneId` instance.
    ///
    /// # Examples
    /// ```
    /// use clonecircos::record::CloneId;
    ///
    /// assert!(CloneId::new("9") < CloneId::new("10"));
    /// assert!(CloneId::new("10") < CloneId::new("A"));
    /// ```
    #[must_use]
    pub fn new<T: Into<String>>(id: T) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn numeric(&self) -> Option<f64> {
        self.0
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
    }
}

impl Ord for CloneId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.total_cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for CloneId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for CloneId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CloneId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

const CIRCOS_TIME_PREFIX: &str = "Day";

/// Timepoint label as rendered on the karyotype, e.g. `Day007`.
///
/// Ordered by the numeric day index first, and by the label text second.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct CircosTime {
    label: String,
    day: u64,
}

impl CircosTime {
    /// Derives the Circos time from a `<group>-<NNN>` timepoint. The second
    /// hyphen-separated segment is the day and must consist of digits only,
    /// fitting in a `u64`.
    ///
    /// # Examples
    /// ```
    /// use clonecircos::record::CircosTime;
    ///
    /// let time = CircosTime::from_timepoint("S1-007").unwrap();
    /// assert_eq!(time.as_str(), "Day007");
    /// assert_eq!(time.day_index(), 7);
    /// assert!(CircosTime::from_timepoint("S1").is_none());
    /// assert!(CircosTime::from_timepoint("S1-x").is_none());
    /// ```
    #[must_use]
    pub fn from_timepoint(timepoint: &str) -> Option<Self> {
        let segment = timepoint.split('-').nth(1)?;
        if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let day = segment.parse().ok()?;

        Some(Self {
            label: format!("{}{}", CIRCOS_TIME_PREFIX, segment),
            day,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.label
    }

    /// Returns the integer day index, e.g. `7` for `Day007`.
    #[must_use]
    pub fn day_index(&self) -> u64 {
        self.day
    }
}

impl Ord for CircosTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.day
            .cmp(&other.day)
            .then_with(|| self.label.cmp(&other.label))
    }
}

impl PartialOrd for CircosTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for CircosTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// One observed sequence, together with the columns derived from the whole
/// dataset during normalization.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SequenceRecord {
    timepoint: String,
    clone: Option<CloneId>,
    spec: Option<String>,
    seq_id: Option<String>,
    circos_time: CircosTime,
    total_clone_count: Option<usize>,
    timepoint_clone_count: Option<usize>,
    cells: Vec<Cell>,
}

impl SequenceRecord {
    #[must_use]
    pub(crate) fn new(
        timepoint: String,
        clone: Option<CloneId>,
        spec: Option<String>,
        seq_id: Option<String>,
        circos_time: CircosTime,
        cells: Vec<Cell>,
    ) -> Self {
        Self {
            timepoint,
            clone,
            spec,
            seq_id,
            circos_time,
            total_clone_count: None,
            timepoint_clone_count: None,
            cells,
        }
    }

    pub(crate) fn set_counts(&mut self, total: Option<usize>, per_timepoint: Option<usize>) {
        self.total_clone_count = total;
        self.timepoint_clone_count = per_timepoint;
    }

    #[must_use]
    pub fn timepoint(&self) -> &str {
        &self.timepoint
    }

    #[must_use]
    pub fn clone_id(&self) -> Option<&CloneId> {
        self.clone.as_ref()
    }

    #[must_use]
    pub fn spec(&self) -> Option<&str> {
        self.spec.as_deref()
    }

    #[must_use]
    pub fn seq_id(&self) -> Option<&str> {
        self.seq_id.as_deref()
    }

    #[must_use]
    pub fn circos_time(&self) -> &CircosTime {
        &self.circos_time
    }

    /// Number of rows in the whole dataset sharing this row's clone; `None`
    /// for rows without a clone.
    #[must_use]
    pub fn total_clone_count(&self) -> Option<usize> {
        self.total_clone_count
    }

    /// Number of rows sharing this row's timepoint and clone; `None` for rows
    /// without a clone.
    #[must_use]
    pub fn timepoint_clone_count(&self) -> Option<usize> {
        self.timepoint_clone_count
    }

    /// All cells of the normalized input row, including passthrough columns.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Returns whether both records belong to the same, non-null clone. A
    /// null clone never matches, not even another null clone.
    #[must_use]
    pub fn shares_clone_with(&self, other: &SequenceRecord) -> bool {
        matches!((&self.clone, &other.clone), (Some(a), Some(b)) if a == b)
    }

    /// Returns whether this record's `spec` is one of given values.
    #[must_use]
    pub fn matches_spec(&self, spec_list: &[String]) -> bool {
        self.spec
            .as_ref()
            .map_or(false, |spec| spec_list.contains(spec))
    }
}
