use std::collections::HashMap;
use std::io::Write;

use itertools::Itertools;
use log::{debug, warn};

use crate::band::BandedDataset;
use crate::config::ViewConfig;
use crate::error::{CircosError, CircosResult, PipelineWarning};
use crate::hue::Hue;
use crate::karyotype::Karyotype;
use crate::record::{CircosTime, CloneId};
use crate::tsv::tsv_writer;

pub(crate) const LINK_HEADER: [&str; 7] = [
    "#circos_time",
    "band_start",
    "band_stop",
    "circos_time_2",
    "band_start_2",
    "band_stop_2",
    "link_color",
];

/// The interval covered by all bands of a clone at a single timepoint.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CloneSpan {
    circos_time: CircosTime,
    clone_id: CloneId,
    start: usize,
    stop: usize,
}

impl CloneSpan {
    #[must_use]
    pub fn circos_time(&self) -> &CircosTime {
        &self.circos_time
    }

    #[must_use]
    pub fn clone_id(&self) -> &CloneId {
        &self.clone_id
    }

    /// Smallest band start of the clone at this timepoint.
    #[must_use]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Largest band stop of the clone at this timepoint.
    #[must_use]
    pub fn stop(&self) -> usize {
        self.stop
    }
}

/// An arc between two consecutive appearances of the same clone.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Link {
    from: CloneSpan,
    to: CloneSpan,
    hue: Hue,
}

impl Link {
    #[must_use]
    pub fn clone_id(&self) -> &CloneId {
        &self.from.clone_id
    }

    #[must_use]
    pub fn from(&self) -> &CloneSpan {
        &self.from
    }

    #[must_use]
    pub fn to(&self) -> &CloneSpan {
        &self.to
    }

    #[must_use]
    pub fn hue(&self) -> Hue {
        self.hue
    }

    fn to_row(&self) -> [String; 7] {
        [
            self.from.circos_time.to_string(),
            self.from.start.to_string(),
            self.from.stop.to_string(),
            self.to.circos_time.to_string(),
            self.to.start.to_string(),
            self.to.stop.to_string(),
            self.hue.link_color(),
        ]
    }
}

/// Links of a single view, ordered by origin timepoint and origin band start.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LinkSet {
    view: String,
    spans: Vec<CloneSpan>,
    links: Vec<Link>,
    warnings: Vec<PipelineWarning>,
}

impl LinkSet {
    /// Generates the links of given view from a band-enriched dataset.
    ///
    /// Rows are restricted to the view's `spec_list` (if any) and to non-null
    /// clones. Each clone's spans are paired with the clone's next appearance
    /// in time, which may skip timepoints the clone is absent from. Every
    /// clone gets its own hue, evenly spaced over the view's hue range.
    pub fn generate(dataset: &BandedDataset, view: &ViewConfig) -> CircosResult<Self> {
        let range = view
            .hue_range()?
            .ok_or_else(|| CircosError::MissingHueRange(view.output_file_name().to_owned()))?;

        let mut warnings = Vec::new();
        let rows = dataset.rows().iter().filter(|row| {
            view.spec_list()
                .map_or(true, |spec_list| row.record.matches_spec(spec_list))
        });
        if let Some(spec_list) = view.spec_list() {
            if !dataset.is_empty() && rows.clone().next().is_none() {
                let warning = PipelineWarning::UnresolvedFilter {
                    view: view.output_file_name().to_owned(),
                    spec_list: spec_list.to_vec(),
                };
                warn!("{}", warning);
                warnings.push(warning);
            }
        }

        let mut index: HashMap<(&CircosTime, &CloneId), usize> = HashMap::new();
        let mut spans: Vec<CloneSpan> = Vec::new();
        for row in rows {
            let clone = match row.record.clone_id() {
                Some(clone) => clone,
                None => continue,
            };
            let time = row.band.chromosome();
            let (start, stop) = (row.band.start(), row.band.stop());

            match index.get(&(time, clone)) {
                Some(&position) => {
                    let span = &mut spans[position];
                    span.start = span.start.min(start);
                    span.stop = span.stop.max(stop);
                }
                None => {
                    index.insert((time, clone), spans.len());
                    spans.push(CloneSpan {
                        circos_time: time.clone(),
                        clone_id: clone.clone(),
                        start,
                        stop,
                    });
                }
            }
        }
        spans.sort_by(|a, b| {
            a.clone_id
                .cmp(&b.clone_id)
                .then_with(|| a.circos_time.cmp(&b.circos_time))
        });

        let clones: Vec<&CloneId> = spans.iter().map(|span| &span.clone_id).dedup().collect();
        let hues: HashMap<&CloneId, Hue> = clones
            .iter()
            .copied()
            .zip(range.hues(clones.len()))
            .collect();

        let mut links: Vec<Link> = spans
            .iter()
            .tuple_windows()
            .filter(|(from, to)| from.clone_id == to.clone_id)
            .map(|(from, to)| Link {
                from: from.clone(),
                to: to.clone(),
                hue: hues[&from.clone_id],
            })
            .collect();
        links.sort_by(|a, b| {
            a.from
                .circos_time
                .cmp(&b.from.circos_time)
                .then_with(|| a.from.start.cmp(&b.from.start))
        });

        debug!(
            "View `{}`: {} clone spans, {} clones, {} links",
            view.output_file_name(),
            spans.len(),
            clones.len(),
            links.len()
        );
        Ok(Self {
            view: view.output_file_name().to_owned(),
            spans,
            links,
            warnings,
        })
    }

    /// Name of the view these links were generated for.
    #[must_use]
    pub fn view(&self) -> &str {
        &self.view
    }

    #[must_use]
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Clone spans, ordered by clone and then by timepoint.
    #[must_use]
    pub fn spans(&self) -> &[CloneSpan] {
        &self.spans
    }

    #[must_use]
    pub fn warnings(&self) -> &[PipelineWarning] {
        &self.warnings
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Returns the links that skip over at least one chromosome of the
    /// karyotype, i.e. connect appearances of a clone that is absent at some
    /// timepoint in between.
    #[must_use]
    pub fn gap_bridging<'a>(&'a self, karyotype: &Karyotype) -> Vec<&'a Link> {
        let mut times: Vec<&CircosTime> = karyotype.chromosomes().iter().map(|c| c.id()).collect();
        times.sort();

        self.links
            .iter()
            .filter(|link| {
                let from = times.binary_search(&&link.from.circos_time);
                let to = times.binary_search(&&link.to.circos_time);
                matches!((from, to), (Ok(from), Ok(to)) if to > from + 1)
            })
            .collect()
    }

    /// Writes the header followed by one line per link.
    pub fn write<W: Write>(&self, writer: W) -> CircosResult<()> {
        let mut tsv = tsv_writer(writer);
        tsv.write_record(LINK_HEADER)?;
        self.write_rows(&mut tsv)?;
        tsv.flush()?;
        Ok(())
    }

    pub(crate) fn write_rows<W: Write>(&self, tsv: &mut csv::Writer<W>) -> CircosResult<()> {
        for link in &self.links {
            tsv.write_record(link.to_row())?;
        }
        Ok(())
    }
}
