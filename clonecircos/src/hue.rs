use std::fmt::{Display, Formatter};
use std::str::FromStr;

use derive_more::Deref;
use serde::{Deserialize, Serialize};

use crate::error::{CircosError, CircosResult};

/// Named interval of the 0-360 color wheel that link hues are drawn from.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HueRange {
    All,
    RedYellow,
    YellowGreen,
    GreenBlue,
    BluePurple,
    PurplePink,
    Blue,
    Red,
    RedOrange,
}

impl HueRange {
    pub const VALUES: [HueRange; 9] = [
        HueRange::All,
        HueRange::RedYellow,
        HueRange::YellowGreen,
        HueRange::GreenBlue,
        HueRange::BluePurple,
        HueRange::PurplePink,
        HueRange::Blue,
        HueRange::Red,
        HueRange::RedOrange,
    ];

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            HueRange::All => "all",
            HueRange::RedYellow => "red_yellow",
            HueRange::YellowGreen => "yellow_green",
            HueRange::GreenBlue => "green_blue",
            HueRange::BluePurple => "blue_purple",
            HueRange::PurplePink => "purple_pink",
            HueRange::Blue => "blue",
            HueRange::Red => "red",
            HueRange::RedOrange => "red_orange",
        }
    }

    /// Returns the `[low, high]` interval of this range.
    #[must_use]
    pub fn bounds(&self) -> (u16, u16) {
        match self {
            HueRange::All => (0, 360),
            HueRange::RedYellow => (0, 60),
            HueRange::YellowGreen => (60, 140),
            HueRange::GreenBlue => (140, 255),
            HueRange::BluePurple => (185, 275),
            HueRange::PurplePink => (275, 310),
            HueRange::Blue => (185, 235),
            HueRange::Red => (0, 20),
            HueRange::RedOrange => (0, 30),
        }
    }

    /// Returns `count` hues evenly spaced over this range, both ends included.
    /// A single hue is the low end of the range.
    ///
    /// # Examples
    /// ```
    /// use clonecircos::hue::{Hue, HueRange};
    ///
    /// assert_eq!(HueRange::Red.hues(3), [Hue::new(0), Hue::new(10), Hue::new(20)]);
    /// assert_eq!(HueRange::Blue.hues(1), [Hue::new(185)]);
    /// assert!(HueRange::All.hues(0).is_empty());
    /// ```
    #[must_use]
    pub fn hues(&self, count: usize) -> Vec<Hue> {
        let (low, high) = self.bounds();
        if count == 1 {
            return vec![Hue(low)];
        }

        let step = f64::from(high - low) / (count as f64 - 1.0);
        (0..count)
            .map(|index| Hue((f64::from(low) + step * index as f64).round() as u16))
            .collect()
    }
}

impl FromStr for HueRange {
    type Err = CircosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HueRange::VALUES
            .into_iter()
            .find(|range| range.name() == s)
            .ok_or_else(|| CircosError::UnknownRange(s.to_owned()))
    }
}

impl Display for HueRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A position on the color wheel, displayed as a Circos hue color name
/// (`hue000`-`hue360`).
#[derive(Deref, Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Hue(u16);

impl Hue {
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }

    /// Returns the link color token for this hue, e.g. `color=hue010_a2`.
    #[must_use]
    pub fn link_color(&self) -> String {
        format!("color={}_a2", self)
    }
}

impl Display for Hue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "hue{:03}", self.0)
    }
}

/// Returns `count` hues evenly spaced over the range named `range_name`.
///
/// # Examples
/// ```
/// use clonecircos::hue::hues;
///
/// let tokens: Vec<String> = hues(3, "red").unwrap().iter().map(|hue| hue.to_string()).collect();
/// assert_eq!(tokens, ["hue000", "hue010", "hue020"]);
/// assert!(hues(3, "teal").is_err());
/// ```
pub fn hues(count: usize, range_name: &str) -> CircosResult<Vec<Hue>> {
    let range: HueRange = range_name.parse()?;
    Ok(range.hues(count))
}
