//! Declarative filter stack
//!
//! Turns filter settings into an ordered list of stackable operations, the
//! same list a rendering surface with a CSS-style `filter` property would
//! apply. Order is significant: each operation works on the output of the
//! previous one.
//!
//! Channel boosts are not part of the stack (no declarative primitive adds
//! to a single channel); see `bake.rs`.

use std::fmt;

use crate::color::ColorOp;
use crate::state::filters::FilterModel;

/// One stackable filter operation, amounts as stored in the model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Percent
    Invert(u16),
    /// Percent
    Opacity(u16),
    /// Percent
    Saturate(u16),
    /// Percent
    Brightness(u16),
    /// Percent
    Contrast(u16),
    /// Radius in pixels
    Blur(u16),
    /// Percent
    Grayscale(u16),
    /// Percent
    Sepia(u16),
}

impl FilterOp {
    /// CSS function name
    pub fn name(&self) -> &'static str {
        match self {
            FilterOp::Invert(_) => "invert",
            FilterOp::Opacity(_) => "opacity",
            FilterOp::Saturate(_) => "saturate",
            FilterOp::Brightness(_) => "brightness",
            FilterOp::Contrast(_) => "contrast",
            FilterOp::Blur(_) => "blur",
            FilterOp::Grayscale(_) => "grayscale",
            FilterOp::Sepia(_) => "sepia",
        }
    }

    /// Whether this operation leaves every pixel unchanged
    ///
    /// Opacity is capped at 100%, so anything at or above it is a no-op.
    pub fn is_identity(&self) -> bool {
        match *self {
            FilterOp::Invert(v) | FilterOp::Blur(v) | FilterOp::Grayscale(v) | FilterOp::Sepia(v) => {
                v == 0
            }
            FilterOp::Opacity(v) => v >= 100,
            FilterOp::Saturate(v) | FilterOp::Brightness(v) | FilterOp::Contrast(v) => v == 100,
        }
    }

    /// Per-pixel color operation, or `None` for blur
    pub fn color_op(&self) -> Option<ColorOp> {
        let fraction = |percent: u16| percent as f32 / 100.0;
        match *self {
            FilterOp::Invert(v) => Some(ColorOp::invert(fraction(v))),
            FilterOp::Opacity(v) => Some(ColorOp::opacity(fraction(v))),
            FilterOp::Saturate(v) => Some(ColorOp::saturate(fraction(v))),
            FilterOp::Brightness(v) => Some(ColorOp::brightness(fraction(v))),
            FilterOp::Contrast(v) => Some(ColorOp::contrast(fraction(v))),
            FilterOp::Grayscale(v) => Some(ColorOp::grayscale(fraction(v))),
            FilterOp::Sepia(v) => Some(ColorOp::sepia(fraction(v))),
            FilterOp::Blur(_) => None,
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FilterOp::Blur(radius) => write!(f, "blur({}px)", radius),
            FilterOp::Invert(v)
            | FilterOp::Opacity(v)
            | FilterOp::Saturate(v)
            | FilterOp::Brightness(v)
            | FilterOp::Contrast(v)
            | FilterOp::Grayscale(v)
            | FilterOp::Sepia(v) => write!(f, "{}({}%)", self.name(), v),
        }
    }
}

/// Build the ordered operation list for the given filters
///
/// Order: invert?, opacity, saturate, brightness, contrast, blur?,
/// grayscale?, sepia?. The optional operations are only emitted when
/// their value is above zero; the other four are always emitted.
pub fn compose_stack(filters: &FilterModel) -> Vec<FilterOp> {
    let mut ops = Vec::with_capacity(8);

    if filters.invert > 0 {
        ops.push(FilterOp::Invert(filters.invert));
    }

    ops.push(FilterOp::Opacity(filters.opacity));
    ops.push(FilterOp::Saturate(filters.saturation));
    ops.push(FilterOp::Brightness(filters.brightness));
    ops.push(FilterOp::Contrast(filters.contrast));

    if filters.blur > 0 {
        ops.push(FilterOp::Blur(filters.blur));
    }
    if filters.grayscale > 0 {
        ops.push(FilterOp::Grayscale(filters.grayscale));
    }
    if filters.sepia > 0 {
        ops.push(FilterOp::Sepia(filters.sepia));
    }

    ops
}

/// CSS `filter` property value for the given filters
pub fn css_filter(filters: &FilterModel) -> String {
    compose_stack(filters)
        .iter()
        .map(FilterOp::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::filters::FilterKey;

    #[test]
    fn test_default_stack() {
        let ops = compose_stack(&FilterModel::default());
        assert_eq!(
            ops,
            vec![
                FilterOp::Opacity(100),
                FilterOp::Saturate(100),
                FilterOp::Brightness(100),
                FilterOp::Contrast(100),
            ]
        );
        assert!(ops.iter().all(FilterOp::is_identity));
        assert_eq!(
            css_filter(&FilterModel::default()),
            "opacity(100%) saturate(100%) brightness(100%) contrast(100%)"
        );
    }

    #[test]
    fn test_full_stack_order() {
        let filters = FilterModel::default()
            .with(FilterKey::Sepia, 10)
            .with(FilterKey::Grayscale, 20)
            .with(FilterKey::Blur, 3)
            .with(FilterKey::Invert, 40)
            .with(FilterKey::Contrast, 120);

        let names: Vec<&str> = compose_stack(&filters).iter().map(FilterOp::name).collect();
        assert_eq!(
            names,
            [
                "invert",
                "opacity",
                "saturate",
                "brightness",
                "contrast",
                "blur",
                "grayscale",
                "sepia"
            ]
        );
        assert_eq!(
            css_filter(&filters),
            "invert(40%) opacity(100%) saturate(100%) brightness(100%) contrast(120%) blur(3px) grayscale(20%) sepia(10%)"
        );
    }

    #[test]
    fn test_boosts_are_not_stacked() {
        let filters = FilterModel::default()
            .with(FilterKey::RedBoost, 50)
            .with(FilterKey::YellowBoost, 50);

        assert_eq!(compose_stack(&filters), compose_stack(&FilterModel::default()));
    }

    #[test]
    fn test_blur_has_no_color_op() {
        assert!(FilterOp::Blur(4).color_op().is_none());
        assert!(FilterOp::Sepia(4).color_op().is_some());
    }

    #[test]
    fn test_identity_detection() {
        assert!(FilterOp::Opacity(150).is_identity());
        assert!(!FilterOp::Opacity(99).is_identity());
        assert!(!FilterOp::Saturate(0).is_identity());
        assert!(!FilterOp::Blur(1).is_identity());
    }
}
