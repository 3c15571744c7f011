use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use crate::band::BandedDataset;
use crate::config::ViewConfig;
use crate::error::{CircosError, CircosResult, PipelineWarning};
use crate::karyotype::Karyotype;
use crate::link::LinkSet;
use crate::link_log::LinkLog;
use crate::normalize::{normalize, normalize_csv_file, Normalization};
use crate::table::RawTable;
use crate::tsv::open_append;

pub const KARYOTYPE_FILE_NAME: &str = "my_karyotype.txt";
pub const BANDS_FILE_NAME: &str = "bands.txt";
pub const CUMULATIVE_LINKS_FILE_NAME: &str = "links.txt";

/// Names of the artifacts written into an existing output directory.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct OutputLayout {
    dir: PathBuf,
}

impl OutputLayout {
    /// Creates a layout for given directory, which must already exist.
    pub fn new<P: Into<PathBuf>>(dir: P) -> CircosResult<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(CircosError::NotADirectory(dir));
        }

        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Karyotype file; the band section is appended to it.
    #[must_use]
    pub fn karyotype(&self) -> PathBuf {
        self.dir.join(KARYOTYPE_FILE_NAME)
    }

    #[must_use]
    pub fn bands(&self) -> PathBuf {
        self.dir.join(BANDS_FILE_NAME)
    }

    /// Per-run link file of given view, overwritten on every run.
    #[must_use]
    pub fn links(&self, view_name: &str) -> PathBuf {
        self.dir.join(format!("links_{}.txt", view_name))
    }

    /// Link file accumulating the links of all views.
    #[must_use]
    pub fn cumulative_links(&self) -> PathBuf {
        self.dir.join(CUMULATIVE_LINKS_FILE_NAME)
    }

    /// Audit copy of the sorted input of given view.
    #[must_use]
    pub fn sorted_dataset(&self, view_name: &str) -> PathBuf {
        self.dir.join(format!("sorted_timepoints_{}.csv", view_name))
    }
}

/// How the cumulative link file is treated at the start of a view run.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum LinkLogMode {
    /// Replace the file, so it only holds the links of this run.
    Fresh,
    /// Keep appending to the file, growing it with every run.
    Append,
}

/// A builder for [`PipelineParams`].
#[derive(Debug, Clone)]
pub struct PipelineParamsBuilder {
    link_log_mode: LinkLogMode,
}

impl PipelineParamsBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            link_log_mode: LinkLogMode::Fresh,
        }
    }

    pub fn link_log_mode(&mut self, link_log_mode: LinkLogMode) -> &mut Self {
        self.link_log_mode = link_log_mode;
        self
    }

    #[must_use]
    pub fn build(&self) -> PipelineParams {
        PipelineParams {
            link_log_mode: self.link_log_mode,
        }
    }
}

impl Default for PipelineParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Pipeline run params.
#[derive(Debug, Clone)]
pub struct PipelineParams {
    link_log_mode: LinkLogMode,
}

impl PipelineParams {
    #[must_use]
    pub fn builder() -> PipelineParamsBuilder {
        PipelineParamsBuilder::new()
    }

    #[must_use]
    pub fn link_log_mode(&self) -> LinkLogMode {
        self.link_log_mode
    }
}

impl Default for PipelineParams {
    fn default() -> Self {
        PipelineParamsBuilder::default().build()
    }
}

/// Summary of a single view run.
#[derive(Debug, Clone, Default)]
pub struct ViewReport {
    pub view: String,
    pub chromosomes: usize,
    pub bands: usize,
    /// Number of links per link-generating view.
    pub links: Vec<(String, usize)>,
    pub warnings: Vec<PipelineWarning>,
    pub written: Vec<PathBuf>,
}

impl ViewReport {
    /// Returns whether the view was skipped because its filter left no rows.
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        self.bands == 0
    }
}

/// Runs a single view on an already parsed table.
///
/// Writes the karyotype (with the bands appended), the band file, and for
/// every view of `link_views` that has a hue range, its link file plus its
/// share of the cumulative link file. Hue ranges are checked before anything
/// is written. A view whose filter matches no rows is skipped with a warning
/// and writes nothing.
///
/// The cumulative link file is opened according to `params` for this call
/// only; see [`run_view_with_log`] for retrying a failed run.
pub fn run_view(
    table: &RawTable,
    view: &ViewConfig,
    link_views: &[ViewConfig],
    layout: &OutputLayout,
    params: &PipelineParams,
) -> CircosResult<ViewReport> {
    validate_views(view, link_views)?;
    let normalization = normalize(table, view)?;
    run_normalized(normalization, view, link_views, layout, params, None)
}

/// Same as [`run_view`], but appends to a cumulative link log owned by the
/// caller instead of opening one.
///
/// A log handle appends each view at most once, so retrying a run that
/// failed partway through the same handle does not duplicate the links
/// already appended.
pub fn run_view_with_log(
    table: &RawTable,
    view: &ViewConfig,
    link_views: &[ViewConfig],
    layout: &OutputLayout,
    link_log: &mut LinkLog,
) -> CircosResult<ViewReport> {
    validate_views(view, link_views)?;
    let normalization = normalize(table, view)?;
    run_normalized(
        normalization,
        view,
        link_views,
        layout,
        &PipelineParams::default(),
        Some(link_log),
    )
}

/// Runs a single view on a comma-separated input file, additionally writing
/// the sorted dataset for auditing.
///
/// The audit file holds the whole sorted input before the view's filter, so
/// it is written, and listed in the report, even if the view is then skipped.
pub fn run_view_csv(
    input: &Path,
    view: &ViewConfig,
    link_views: &[ViewConfig],
    layout: &OutputLayout,
    params: &PipelineParams,
) -> CircosResult<ViewReport> {
    validate_views(view, link_views)?;
    let audit_path = layout.sorted_dataset(view.output_file_name());
    let normalization = normalize_csv_file(input, view, &audit_path)?;

    let mut report = run_normalized(normalization, view, link_views, layout, params, None)?;
    report.written.insert(0, audit_path);
    Ok(report)
}

fn validate_views(view: &ViewConfig, link_views: &[ViewConfig]) -> CircosResult<()> {
    view.validate()?;
    for link_view in link_views {
        if link_view.hue_range()?.is_none() {
            debug!(
                "View `{}` has no hue range, no links will be generated for it",
                link_view.output_file_name()
            );
        }
    }
    Ok(())
}

fn run_normalized(
    normalization: Normalization,
    view: &ViewConfig,
    link_views: &[ViewConfig],
    layout: &OutputLayout,
    params: &PipelineParams,
    link_log: Option<&mut LinkLog>,
) -> CircosResult<ViewReport> {
    let Normalization { dataset, warnings } = normalization;
    let mut report = ViewReport {
        view: view.output_file_name().to_owned(),
        warnings,
        ..ViewReport::default()
    };

    if dataset.is_empty() && !report.warnings.is_empty() {
        warn!(
            "Skipping view `{}`: no rows left after filtering",
            report.view
        );
        return Ok(report);
    }

    let karyotype = Karyotype::from_dataset(&dataset)?;
    let karyotype_path = layout.karyotype();
    karyotype.write(BufWriter::new(File::create(&karyotype_path)?))?;
    report.chromosomes = karyotype.len();

    let banded = BandedDataset::from_dataset(dataset)?;
    let bands_path = layout.bands();
    banded.write_bands(BufWriter::new(File::create(&bands_path)?))?;
    banded.write_bands(BufWriter::new(open_append(&karyotype_path)?))?;
    report.bands = banded.len();
    info!(
        "View `{}`: wrote {} chromosomes to {} and {} bands to {}",
        report.view,
        report.chromosomes,
        karyotype_path.display(),
        report.bands,
        bands_path.display()
    );
    report.written.push(karyotype_path);
    report.written.push(bands_path);

    let link_views: Vec<&ViewConfig> = link_views
        .iter()
        .filter(|link_view| link_view.generates_links())
        .collect();
    if link_views.is_empty() {
        return Ok(report);
    }

    let mut opened_log;
    let link_log = match link_log {
        Some(link_log) => link_log,
        None => {
            opened_log = match params.link_log_mode {
                LinkLogMode::Fresh => LinkLog::create(layout.cumulative_links())?,
                LinkLogMode::Append => LinkLog::append_to(layout.cumulative_links())?,
            };
            &mut opened_log
        }
    };
    for link_view in link_views {
        let links = LinkSet::generate(&banded, link_view)?;
        let links_path = layout.links(link_view.output_file_name());
        links.write(BufWriter::new(File::create(&links_path)?))?;
        link_log.append(&links)?;

        debug!(
            "View `{}`: {} of {} links bridge a missing timepoint",
            link_view.output_file_name(),
            links.gap_bridging(&karyotype).len(),
            links.len()
        );
        info!(
            "View `{}`: wrote {} links to {}",
            link_view.output_file_name(),
            links.len(),
            links_path.display()
        );
        report.warnings.extend(links.warnings().iter().cloned());
        report
            .links
            .push((link_view.output_file_name().to_owned(), links.len()));
        report.written.push(links_path);
    }
    report.written.push(link_log.path().to_path_buf());

    Ok(report)
}

/// Outcome of one view of a sample run.
#[derive(Debug)]
pub struct ViewOutcome {
    pub view: String,
    pub result: CircosResult<ViewReport>,
}

/// Runs every view of a sample. Views generating links also act as the link
/// views of every other view.
///
/// `layout_for` gives the output directory of each view. A failing view does
/// not stop the others; each outcome is returned for the caller to act upon.
pub fn run_sample<F>(
    table: &RawTable,
    views: &[ViewConfig],
    mut layout_for: F,
    params: &PipelineParams,
) -> Vec<ViewOutcome>
where
    F: FnMut(&ViewConfig) -> CircosResult<OutputLayout>,
{
    let link_views: Vec<ViewConfig> = views
        .iter()
        .filter(|view| view.generates_links())
        .cloned()
        .collect();

    views
        .iter()
        .map(|view| {
            let result = layout_for(view)
                .and_then(|layout| run_view(table, view, &link_views, &layout, params));
            if let Err(e) = &result {
                error!("View `{}` failed: {}", view.output_file_name(), e);
            }

            ViewOutcome {
                view: view.output_file_name().to_owned(),
                result,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::_internal_test_data::{
        table_from_rows, LINEAGE_CSV, LINEAGE_DP_LINKS, LINEAGE_KARYOTYPE, LINEAGE_SP_LINKS,
        LINEAGE_TABLE,
    };
    use crate::config::ViewConfig;
    use crate::error::{CircosError, PipelineWarning};
    use crate::link_log::LinkLog;
    use crate::pipeline::{
        run_sample, run_view, run_view_csv, run_view_with_log, LinkLogMode, OutputLayout,
        PipelineParams,
    };

    fn link_views() -> Vec<ViewConfig> {
        vec![
            ViewConfig::builder("sp").spec_list(["sp"]).color("red").build(),
            ViewConfig::builder("dp").spec_list(["dp"]).color("blue").build(),
        ]
    }

    #[test]
    fn test_layout_requires_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file");
        fs::write(&file, "").unwrap();

        assert!(matches!(
            OutputLayout::new(&file),
            Err(CircosError::NotADirectory(_))
        ));
        assert!(matches!(
            OutputLayout::new(dir.path().join("missing")),
            Err(CircosError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_layout_names() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(dir.path()).unwrap();

        assert_eq!(layout.karyotype(), dir.path().join("my_karyotype.txt"));
        assert_eq!(layout.bands(), dir.path().join("bands.txt"));
        assert_eq!(layout.links("spec_1"), dir.path().join("links_spec_1.txt"));
        assert_eq!(layout.cumulative_links(), dir.path().join("links.txt"));
        assert_eq!(
            layout.sorted_dataset("all-data"),
            dir.path().join("sorted_timepoints_all-data.csv")
        );
    }

    #[test]
    fn test_run_view() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(dir.path()).unwrap();
        let view = ViewConfig::builder("all").build();

        let report = run_view(
            &LINEAGE_TABLE,
            &view,
            &link_views(),
            &layout,
            &PipelineParams::default(),
        )
        .unwrap();

        assert_eq!(report.chromosomes, 3);
        assert_eq!(report.bands, 12);
        assert_eq!(
            report.links,
            [("sp".to_owned(), 3), ("dp".to_owned(), 1)]
        );
        assert!(report.warnings.is_empty());
        assert_eq!(
            fs::read_to_string(layout.karyotype()).unwrap(),
            LINEAGE_KARYOTYPE
        );
        assert_eq!(
            fs::read_to_string(layout.links("sp")).unwrap(),
            LINEAGE_SP_LINKS
        );
        assert_eq!(
            fs::read_to_string(layout.links("dp")).unwrap(),
            LINEAGE_DP_LINKS
        );
        assert_eq!(report.written.len(), 5);
    }

    #[test]
    fn test_unknown_range_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(dir.path()).unwrap();
        let view = ViewConfig::builder("all").build();
        let link_views = [ViewConfig::builder("bad").color("infrared").build()];

        let result = run_view(
            &LINEAGE_TABLE,
            &view,
            &link_views,
            &layout,
            &PipelineParams::default(),
        );

        assert!(matches!(result, Err(CircosError::UnknownRange(_))));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_empty_dataset_fails() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(dir.path()).unwrap();

        let result = run_view(
            &table_from_rows(&[]),
            &ViewConfig::builder("all").build(),
            &[],
            &layout,
            &PipelineParams::default(),
        );

        assert!(matches!(result, Err(CircosError::EmptyDataset)));
    }

    #[test]
    fn test_unresolved_filter_skips_view() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(dir.path()).unwrap();
        let view = ViewConfig::builder("h7").spec_list(["H7 sp"]).build();

        let report = run_view(
            &LINEAGE_TABLE,
            &view,
            &link_views(),
            &layout,
            &PipelineParams::default(),
        )
        .unwrap();

        assert!(report.is_skipped());
        assert!(matches!(
            report.warnings[..],
            [PipelineWarning::UnresolvedFilter { .. }]
        ));
        assert!(report.written.is_empty());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_fresh_link_log_does_not_accumulate() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(dir.path()).unwrap();
        let view = ViewConfig::builder("all").build();
        let views = link_views();
        let link_views = &views[..1];

        for _ in 0..2 {
            run_view(
                &LINEAGE_TABLE,
                &view,
                link_views,
                &layout,
                &PipelineParams::default(),
            )
            .unwrap();
        }

        assert_eq!(
            fs::read_to_string(layout.cumulative_links()).unwrap(),
            LINEAGE_SP_LINKS
        );
    }

    #[test]
    fn test_append_link_log_accumulates() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(dir.path()).unwrap();
        let view = ViewConfig::builder("all").build();
        let views = link_views();
        let link_views = &views[..1];
        let params = PipelineParams::builder()
            .link_log_mode(LinkLogMode::Append)
            .build();

        for _ in 0..2 {
            run_view(&LINEAGE_TABLE, &view, link_views, &layout, &params).unwrap();
        }

        let content = fs::read_to_string(layout.cumulative_links()).unwrap();
        assert_eq!(content.matches("#circos_time").count(), 1);
        assert_eq!(content.lines().count(), 1 + 2 * 3);
        // the per-run file is still overwritten
        assert_eq!(
            fs::read_to_string(layout.links("sp")).unwrap(),
            LINEAGE_SP_LINKS
        );
    }

    #[test]
    fn test_run_view_csv_writes_audit_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("sample_input.csv");
        fs::write(&input, LINEAGE_CSV).unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        let layout = OutputLayout::new(&out).unwrap();
        let view = ViewConfig::builder("sp").spec_list(["sp"]).color("red").build();

        let report = run_view_csv(
            &input,
            &view,
            &[view.clone()],
            &layout,
            &PipelineParams::default(),
        )
        .unwrap();

        assert_eq!(report.written[0], layout.sorted_dataset("sp"));
        assert_eq!(report.bands, 7);
        let audit = fs::read_to_string(layout.sorted_dataset("sp")).unwrap();
        // header plus all twelve rows, before filtering
        assert_eq!(audit.lines().count(), 13);
        assert!(audit.starts_with(
            "timepoint,clone,spec,seq_id,isotype,circos_time,total_clone_count,timepoint_clone_count\n"
        ));
    }

    #[test]
    fn test_retry_through_same_log_does_not_duplicate_links() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(dir.path()).unwrap();
        let view = ViewConfig::builder("all").build();
        let mut link_log = LinkLog::append_to(layout.cumulative_links()).unwrap();

        // a directory in place of the dp link file fails the run after sp
        // has been appended
        fs::create_dir(layout.links("dp")).unwrap();
        let result = run_view_with_log(
            &LINEAGE_TABLE,
            &view,
            &link_views(),
            &layout,
            &mut link_log,
        );
        assert!(matches!(result, Err(CircosError::IoError(_))));
        assert!(link_log.contains_view("sp"));
        assert!(!link_log.contains_view("dp"));

        fs::remove_dir(layout.links("dp")).unwrap();
        let report =
            run_view_with_log(&LINEAGE_TABLE, &view, &link_views(), &layout, &mut link_log)
                .unwrap();

        assert_eq!(
            report.links,
            [("sp".to_owned(), 3), ("dp".to_owned(), 1)]
        );
        let content = fs::read_to_string(layout.cumulative_links()).unwrap();
        assert_eq!(content.matches("#circos_time").count(), 1);
        assert_eq!(content.lines().count(), 1 + 3 + 1);
        assert_eq!(
            fs::read_to_string(layout.links("dp")).unwrap(),
            LINEAGE_DP_LINKS
        );
    }

    #[test]
    fn test_skipped_csv_view_lists_only_audit_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("sample_input.csv");
        fs::write(&input, LINEAGE_CSV).unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        let layout = OutputLayout::new(&out).unwrap();
        let view = ViewConfig::builder("h7").spec_list(["H7 sp"]).build();

        let report =
            run_view_csv(&input, &view, &[], &layout, &PipelineParams::default()).unwrap();

        assert!(report.is_skipped());
        assert_eq!(report.written, [layout.sorted_dataset("h7")]);
        assert_eq!(fs::read_dir(&out).unwrap().count(), 1);
        assert!(!layout.karyotype().exists());
    }

    #[test]
    fn test_run_sample_continues_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let views = vec![
            ViewConfig::builder("missing").build(),
            ViewConfig::builder("sp").spec_list(["sp"]).color("red").build(),
        ];

        let outcomes = run_sample(
            &LINEAGE_TABLE,
            &views,
            |view| {
                let path = dir.path().join(view.output_file_name());
                if view.output_file_name() != "missing" {
                    fs::create_dir_all(&path)?;
                }
                OutputLayout::new(path)
            },
            &PipelineParams::default(),
        );

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].view, "missing");
        assert!(matches!(
            outcomes[0].result,
            Err(CircosError::NotADirectory(_))
        ));
        let report = outcomes[1].result.as_ref().unwrap();
        assert_eq!(report.links, [("sp".to_owned(), 3)]);
    }
}
