use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::io::Write;

use log::{debug, trace};

use crate::error::{CircosError, CircosResult};
use crate::normalize::NormalizedDataset;
use crate::record::{CircosTime, SequenceRecord};
use crate::tsv::tsv_writer;

const BAND_HEADER: [&str; 7] = [
    "#band",
    "circos_time",
    "seq_id",
    "seq_id",
    "band_start",
    "band_stop",
    "band_color",
];

/// One of the two alternating band colors.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BandColor {
    /// `gneg`; the color of the very first band.
    Light,
    /// `gpos25`.
    Dark,
}

impl BandColor {
    pub const FIRST: BandColor = BandColor::Light;

    #[must_use]
    pub fn opposite(&self) -> Self {
        match self {
            BandColor::Light => BandColor::Dark,
            BandColor::Dark => BandColor::Light,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            BandColor::Light => "gneg",
            BandColor::Dark => "gpos25",
        }
    }
}

impl Display for BandColor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A segment of a chromosome representing a single sequence.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Band {
    chromosome: CircosTime,
    seq_id: Option<String>,
    start: usize,
    color: BandColor,
}

impl Band {
    #[must_use]
    pub fn chromosome(&self) -> &CircosTime {
        &self.chromosome
    }

    #[must_use]
    pub fn seq_id(&self) -> Option<&str> {
        self.seq_id.as_deref()
    }

    /// 0-based position of the band within its chromosome.
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    #[must_use]
    pub fn stop(&self) -> usize {
        self.start + 1
    }

    #[must_use]
    pub fn color(&self) -> BandColor {
        self.color
    }

    fn to_row(&self) -> [String; 7] {
        let seq_id = self.seq_id.clone().unwrap_or_default();
        [
            "band".to_owned(),
            self.chromosome.to_string(),
            seq_id.clone(),
            seq_id,
            self.start.to_string(),
            self.stop().to_string(),
            self.color.to_string(),
        ]
    }
}

/// A normalized record together with the band placed for it.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BandedRecord {
    pub record: SequenceRecord,
    pub band: Band,
}

/// Normalized dataset extended with one band per record, in unchanged row
/// order.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BandedDataset {
    rows: Vec<BandedRecord>,
}

impl BandedDataset {
    /// Places a band for every record of the dataset.
    ///
    /// Positions restart at 0 on each chromosome and follow the row order;
    /// colors follow [`band_colors`].
    pub fn from_dataset(dataset: NormalizedDataset) -> CircosResult<Self> {
        if dataset.is_empty() {
            return Err(CircosError::EmptyDataset);
        }

        let records = dataset.into_records();
        let colors = band_colors(&records);

        let mut next_start: HashMap<CircosTime, usize> = HashMap::new();
        let rows: Vec<BandedRecord> = records
            .into_iter()
            .zip(colors)
            .map(|(record, color)| {
                let counter = next_start.entry(record.circos_time().clone()).or_insert(0);
                let start = *counter;
                *counter += 1;

                let band = Band {
                    chromosome: record.circos_time().clone(),
                    seq_id: record.seq_id().map(str::to_owned),
                    start,
                    color,
                };
                BandedRecord { record, band }
            })
            .collect();

        debug!(
            "Placed {} bands on {} chromosomes",
            rows.len(),
            next_start.len()
        );
        Ok(Self { rows })
    }

    #[must_use]
    pub fn rows(&self) -> &[BandedRecord] {
        &self.rows
    }

    pub fn bands(&self) -> impl Iterator<Item = &Band> + '_ {
        self.rows.iter().map(|row| &row.band)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Writes the band section: a commented header line followed by one
    /// `band` line per record.
    pub fn write_bands<W: Write>(&self, writer: W) -> CircosResult<()> {
        let mut tsv = tsv_writer(writer);
        tsv.write_record(BAND_HEADER)?;
        for band in self.bands() {
            tsv.write_record(band.to_row())?;
        }

        tsv.flush()?;
        Ok(())
    }
}

/// Colors consecutive records: the first record gets [`BandColor::FIRST`],
/// and each following one keeps the previous color if it belongs to the same
/// clone as the previous record, and switches color otherwise. Null clones
/// never match.
#[must_use]
pub fn band_colors(records: &[SequenceRecord]) -> Vec<BandColor> {
    records
        .iter()
        .scan(
            None::<(&SequenceRecord, BandColor)>,
            |previous, record| {
                let color = match *previous {
                    None => BandColor::FIRST,
                    Some((previous, color)) if previous.shares_clone_with(record) => color,
                    Some((_, color)) => {
                        trace!("Clone run ends before {:?}", record.seq_id());
                        color.opposite()
                    }
                };
                *previous = Some((record, color));
                Some(color)
            },
        )
        .collect()
}
