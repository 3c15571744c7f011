use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CircosResult;
use crate::hue::HueRange;

/// Configuration of a single "view" of a sample: which rows it keeps, how its
/// artifacts are named and which hue range its links are colored with.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    output_file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    spec_list: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    circos_conf_file: Option<PathBuf>,
}

impl ViewConfig {
    /// Returns new builder for `ViewConfig`.
    ///
    /// # Examples
    /// ```
    /// use clonecircos::config::ViewConfig;
    ///
    /// let view = ViewConfig::builder("h7")
    ///     .spec_list(["H7 sp", "sp"])
    ///     .color("red_orange")
    ///     .build();
    /// assert_eq!(view.output_file_name(), "h7");
    /// assert!(view.generates_links());
    /// ```
    #[must_use]
    pub fn builder<T: Into<String>>(output_file_name: T) -> ViewConfigBuilder {
        ViewConfigBuilder::new(output_file_name)
    }

    /// The view set the plots are usually made with: everything, plus two
    /// views restricted to one `spec` feature each.
    #[must_use]
    pub fn default_views() -> Vec<ViewConfig> {
        vec![
            ViewConfig::builder("all-data")
                .circos_conf_file("circos.conf")
                .build(),
            ViewConfig::builder("spec_1")
                .spec_list(["H7 sp", "spec_1"])
                .color("red_orange")
                .circos_conf_file("circos_h7.conf")
                .build(),
            ViewConfig::builder("spec_2")
                .spec_list(["H7 dp", "spec_2"])
                .color("blue")
                .circos_conf_file("circos_stem.conf")
                .build(),
        ]
    }

    /// Reads a JSON array of views.
    pub fn read_views<R: Read>(reader: R) -> anyhow::Result<Vec<ViewConfig>> {
        let views: Vec<ViewConfig> = serde_json::from_reader(reader)?;
        for view in &views {
            view.validate()?;
        }
        Ok(views)
    }

    /// Writes given views as a JSON array.
    pub fn write_views<W: Write>(views: &[ViewConfig], mut writer: W) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut writer, views)?;
        writer.flush()?;
        Ok(())
    }

    #[must_use]
    pub fn output_file_name(&self) -> &str {
        &self.output_file_name
    }

    #[must_use]
    pub fn spec_list(&self) -> Option<&[String]> {
        self.spec_list.as_deref()
    }

    #[must_use]
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    /// Renderer configuration file; carried along for the renderer, never read
    /// by the pipeline.
    #[must_use]
    pub fn circos_conf_file(&self) -> Option<&Path> {
        self.circos_conf_file.as_deref()
    }

    /// Returns whether links are generated for this view, i.e. whether it has a
    /// hue range.
    #[must_use]
    pub fn generates_links(&self) -> bool {
        self.color.is_some()
    }

    /// Resolves the configured hue range, if any.
    pub fn hue_range(&self) -> CircosResult<Option<HueRange>> {
        self.color.as_deref().map(str::parse::<HueRange>).transpose()
    }

    /// Checks that the configured hue range name is known.
    pub fn validate(&self) -> CircosResult<()> {
        self.hue_range().map(|_| ())
    }
}

/// A builder for [`ViewConfig`].
#[derive(Debug, Clone)]
pub struct ViewConfigBuilder {
    output_file_name: String,
    spec_list: Option<Vec<String>>,
    color: Option<String>,
    circos_conf_file: Option<PathBuf>,
}

impl ViewConfigBuilder {
    /// Returns a new instance of `ViewConfigBuilder`.
    #[must_use]
    pub fn new<T: Into<String>>(output_file_name: T) -> Self {
        Self {
            output_file_name: output_file_name.into(),
            spec_list: None,
            color: None,
            circos_conf_file: None,
        }
    }

    /// Restricts the view to rows whose `spec` is one of given values.
    pub fn spec_list<I, T>(&mut self, spec_list: I) -> &mut Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.spec_list = Some(spec_list.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the hue range name used to color the links of this view.
    pub fn color<T: Into<String>>(&mut self, color: T) -> &mut Self {
        self.color = Some(color.into());
        self
    }

    pub fn circos_conf_file<T: Into<PathBuf>>(&mut self, circos_conf_file: T) -> &mut Self {
        self.circos_conf_file = Some(circos_conf_file.into());
        self
    }

    /// Builds and returns [`ViewConfig`].
    #[must_use]
    pub fn build(&self) -> ViewConfig {
        ViewConfig {
            output_file_name: self.output_file_name.clone(),
            spec_list: self.spec_list.clone(),
            color: self.color.clone(),
            circos_conf_file: self.circos_conf_file.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::config::ViewConfig;
    use crate::error::CircosError;
    use crate::hue::HueRange;

    #[test]
    fn test_builder() {
        let view = ViewConfig::builder("stem")
            .spec_list(["H7 dp", "dp"])
            .color("blue")
            .circos_conf_file("circos_stem.conf")
            .build();

        assert_eq!(view.output_file_name(), "stem");
        assert_eq!(
            view.spec_list(),
            Some(["H7 dp".to_owned(), "dp".to_owned()].as_slice())
        );
        assert_eq!(view.color(), Some("blue"));
        assert_eq!(view.circos_conf_file(), Some(Path::new("circos_stem.conf")));
        assert_eq!(view.hue_range().unwrap(), Some(HueRange::Blue));
    }

    #[test]
    fn test_view_without_color_does_not_generate_links() {
        let view = ViewConfig::builder("all").build();

        assert!(!view.generates_links());
        assert_eq!(view.hue_range().unwrap(), None);
        assert!(view.validate().is_ok());
    }

    #[test]
    fn test_validate_unknown_range() {
        let view = ViewConfig::builder("x").color("teal").build();

        assert!(matches!(
            view.validate(),
            Err(CircosError::UnknownRange(name)) if name == "teal"
        ));
    }

    #[test]
    fn test_default_views() {
        let views = ViewConfig::default_views();

        assert_eq!(views.len(), 3);
        assert!(!views[0].generates_links());
        assert!(views[1..].iter().all(ViewConfig::generates_links));
        assert!(views.iter().all(|view| view.validate().is_ok()));
    }

    #[test]
    fn test_write_and_read_views() {
        let views = ViewConfig::default_views();

        let mut data = Vec::new();
        ViewConfig::write_views(&views, &mut data).unwrap();
        let views_2 = ViewConfig::read_views(data.as_slice()).unwrap();

        assert_eq!(views, views_2);
    }

    #[test]
    fn test_read_views_minimal() {
        let json = r#"[{"output_file_name": "all"}, {"output_file_name": "h7", "spec_list": ["sp"], "color": "red"}]"#;
        let views = ViewConfig::read_views(json.as_bytes()).unwrap();

        assert_eq!(views[0], ViewConfig::builder("all").build());
        assert_eq!(views[1].spec_list(), Some(["sp".to_owned()].as_slice()));
    }

    #[test]
    fn test_read_views_rejects_unknown_range() {
        let json = r#"[{"output_file_name": "h7", "color": "ultraviolet"}]"#;

        assert!(ViewConfig::read_views(json.as_bytes()).is_err());
    }
}
