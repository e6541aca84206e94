//! Adjustable filter parameters for a capture
//!
//! This struct stores the twelve slider values that shape a photo.
//! It is serialized to JSON (see `codec.rs`) and stored with every
//! captured photo, so the gallery remembers what was applied.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Value used when a filter is toggled on from zero
const TOGGLE_ON_VALUE: u16 = 50;

/// All filter parameters for a capture
///
/// Percentages are whole numbers. `opacity`, `saturation`, `brightness`
/// and `contrast` are identity at 100; everything else is identity at 0.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterModel {
    // ========== Declarative stack ==========

    /// Color inversion strength (0 to 100 %)
    pub invert: u16,

    /// Overall opacity (0 to 200 %)
    /// - Values above 100 render like 100
    pub opacity: u16,

    /// Color saturation (0 to 200 %)
    /// - 0 = grayscale, 100 = original, 200 = double saturation
    pub saturation: u16,

    /// Brightness (0 to 200 %)
    pub brightness: u16,

    /// Contrast (0 to 200 %)
    pub contrast: u16,

    /// Gaussian blur radius in pixels (0 to 20)
    pub blur: u16,

    /// Grayscale mix (0 to 100 %)
    pub grayscale: u16,

    /// Sepia tint mix (0 to 100 %)
    pub sepia: u16,

    // ========== Channel boosts ==========
    // These need direct pixel access and are applied after the stack.

    /// Additive boost to the red channel (0 to 100 %)
    pub red_boost: u16,

    /// Additive boost to the green channel (0 to 100 %)
    pub green_boost: u16,

    /// Additive boost to the blue channel (0 to 100 %)
    pub blue_boost: u16,

    /// Additive boost to red and green together (0 to 100 %)
    pub yellow_boost: u16,
}

impl Default for FilterModel {
    /// Create the identity model (no visible change)
    fn default() -> Self {
        Self {
            invert: 0,
            opacity: 100,
            saturation: 100,
            brightness: 100,
            contrast: 100,
            blur: 0,
            grayscale: 0,
            sepia: 0,
            red_boost: 0,
            green_boost: 0,
            blue_boost: 0,
            yellow_boost: 0,
        }
    }
}

impl FilterModel {
    /// Create new default filters
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether any parameter differs from its default
    pub fn is_active(&self) -> bool {
        *self != Self::default()
    }

    /// Reset all filters to default
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Read a single parameter
    pub fn get(&self, key: FilterKey) -> u16 {
        match key {
            FilterKey::Invert => self.invert,
            FilterKey::Opacity => self.opacity,
            FilterKey::Saturation => self.saturation,
            FilterKey::Brightness => self.brightness,
            FilterKey::Contrast => self.contrast,
            FilterKey::Blur => self.blur,
            FilterKey::Grayscale => self.grayscale,
            FilterKey::Sepia => self.sepia,
            FilterKey::RedBoost => self.red_boost,
            FilterKey::GreenBoost => self.green_boost,
            FilterKey::BlueBoost => self.blue_boost,
            FilterKey::YellowBoost => self.yellow_boost,
        }
    }

    /// Set a single parameter, clamped to its declared range
    pub fn set(&mut self, key: FilterKey, value: u16) {
        let value = key.clamp(value);
        let slot = match key {
            FilterKey::Invert => &mut self.invert,
            FilterKey::Opacity => &mut self.opacity,
            FilterKey::Saturation => &mut self.saturation,
            FilterKey::Brightness => &mut self.brightness,
            FilterKey::Contrast => &mut self.contrast,
            FilterKey::Blur => &mut self.blur,
            FilterKey::Grayscale => &mut self.grayscale,
            FilterKey::Sepia => &mut self.sepia,
            FilterKey::RedBoost => &mut self.red_boost,
            FilterKey::GreenBoost => &mut self.green_boost,
            FilterKey::BlueBoost => &mut self.blue_boost,
            FilterKey::YellowBoost => &mut self.yellow_boost,
        };
        *slot = value;
    }

    /// Builder-style variant of [`FilterModel::set`]
    pub fn with(mut self, key: FilterKey, value: u16) -> Self {
        self.set(key, value);
        self
    }

    /// Flip a filter on or off
    ///
    /// A positive value drops to 0; zero jumps to 50.
    pub fn toggle(&mut self, key: FilterKey) {
        let next = if self.get(key) > 0 { 0 } else { TOGGLE_ON_VALUE };
        self.set(key, next);
    }

    /// Copy of this model with every parameter forced into its range
    pub fn clamped(&self) -> Self {
        FilterKey::ALL
            .iter()
            .fold(*self, |model, &key| model.with(key, self.get(key)))
    }
}

/// Names the twelve filter parameters, in slider display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    Invert,
    Opacity,
    Saturation,
    Brightness,
    Contrast,
    Blur,
    Grayscale,
    Sepia,
    RedBoost,
    GreenBoost,
    BlueBoost,
    YellowBoost,
}

impl FilterKey {
    /// Every key in display order
    pub const ALL: [FilterKey; 12] = [
        FilterKey::Invert,
        FilterKey::Opacity,
        FilterKey::Saturation,
        FilterKey::Brightness,
        FilterKey::Contrast,
        FilterKey::Blur,
        FilterKey::Grayscale,
        FilterKey::Sepia,
        FilterKey::RedBoost,
        FilterKey::GreenBoost,
        FilterKey::BlueBoost,
        FilterKey::YellowBoost,
    ];

    /// Field name used in the serialized form
    pub fn name(self) -> &'static str {
        match self {
            FilterKey::Invert => "invert",
            FilterKey::Opacity => "opacity",
            FilterKey::Saturation => "saturation",
            FilterKey::Brightness => "brightness",
            FilterKey::Contrast => "contrast",
            FilterKey::Blur => "blur",
            FilterKey::Grayscale => "grayscale",
            FilterKey::Sepia => "sepia",
            FilterKey::RedBoost => "red_boost",
            FilterKey::GreenBoost => "green_boost",
            FilterKey::BlueBoost => "blue_boost",
            FilterKey::YellowBoost => "yellow_boost",
        }
    }

    /// Human-readable slider label
    pub fn label(self) -> &'static str {
        match self {
            FilterKey::Invert => "Invert",
            FilterKey::Opacity => "Opacity",
            FilterKey::Saturation => "Saturation",
            FilterKey::Brightness => "Brightness",
            FilterKey::Contrast => "Contrast",
            FilterKey::Blur => "Blur",
            FilterKey::Grayscale => "Grayscale",
            FilterKey::Sepia => "Sepia",
            FilterKey::RedBoost => "Red",
            FilterKey::GreenBoost => "Green",
            FilterKey::BlueBoost => "Blue",
            FilterKey::YellowBoost => "Yellow",
        }
    }

    /// Valid slider range
    pub fn range(self) -> RangeInclusive<u16> {
        match self {
            FilterKey::Blur => 0..=20,
            FilterKey::Opacity
            | FilterKey::Saturation
            | FilterKey::Brightness
            | FilterKey::Contrast => 0..=200,
            _ => 0..=100,
        }
    }

    /// Identity value for this parameter
    pub fn default_value(self) -> u16 {
        FilterModel::default().get(self)
    }

    /// Force a value into this parameter's range
    pub fn clamp(self, value: u16) -> u16 {
        let range = self.range();
        value.clamp(*range.start(), *range.end())
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterKey::ALL
            .into_iter()
            .find(|key| key.name() == s)
            .ok_or_else(|| format!("unknown filter: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_inactive() {
        let filters = FilterModel::default();
        assert!(!filters.is_active());
    }

    #[test]
    fn test_any_nudge_is_active() {
        for key in FilterKey::ALL {
            let default = key.default_value();
            let nudged = if default == 0 { 1 } else { default - 1 };
            let filters = FilterModel::default().with(key, nudged);
            assert!(filters.is_active(), "{} should be active", key);
        }

        // Above-identity values count too
        assert!(FilterModel::default().with(FilterKey::Opacity, 150).is_active());
    }

    #[test]
    fn test_set_clamps_to_range() {
        let mut filters = FilterModel::default();
        filters.set(FilterKey::Blur, 90);
        filters.set(FilterKey::Contrast, 500);
        filters.set(FilterKey::Sepia, 101);

        assert_eq!(filters.blur, 20);
        assert_eq!(filters.contrast, 200);
        assert_eq!(filters.sepia, 100);
    }

    #[test]
    fn test_clamped_repairs_direct_construction() {
        let filters = FilterModel {
            invert: 300,
            opacity: 999,
            ..FilterModel::default()
        };

        let repaired = filters.clamped();
        assert_eq!(repaired.invert, 100);
        assert_eq!(repaired.opacity, 200);
        assert_eq!(repaired.saturation, 100);
    }

    #[test]
    fn test_toggle() {
        let mut filters = FilterModel::default();

        filters.toggle(FilterKey::Sepia);
        assert_eq!(filters.sepia, 50);

        filters.toggle(FilterKey::Sepia);
        assert_eq!(filters.sepia, 0);

        // Identity-at-100 parameters switch off as well
        filters.toggle(FilterKey::Opacity);
        assert_eq!(filters.opacity, 0);
    }

    #[test]
    fn test_reset() {
        let mut filters = FilterModel::default()
            .with(FilterKey::Invert, 40)
            .with(FilterKey::YellowBoost, 10);
        assert!(filters.is_active());

        filters.reset();

        assert_eq!(filters, FilterModel::default());
    }

    #[test]
    fn test_key_names_round_trip() {
        for key in FilterKey::ALL {
            assert_eq!(key.name().parse::<FilterKey>(), Ok(key));
        }
        assert!("vermelho".parse::<FilterKey>().is_err());
    }

    #[test]
    fn test_ranges_and_labels() {
        assert_eq!(FilterKey::Blur.range(), 0..=20);
        assert_eq!(FilterKey::Brightness.range(), 0..=200);
        assert_eq!(FilterKey::RedBoost.range(), 0..=100);
        assert_eq!(FilterKey::YellowBoost.label(), "Yellow");
    }
}
