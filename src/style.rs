//! Style declaration resolver (`key:value;key:value`)
use crate::{Anomaly, Diagnostics, RGBA, Scalar, utils::clamp};
use std::fmt;

/// Default stroke width used when declaration does not specify one
pub const DEFAULT_STROKE_WIDTH: Scalar = 1.0;

/// Paint of a fill or stroke channel
///
/// `None` (explicit `none` value) and `Unset` (key absent) both disable the channel,
/// but they are kept apart so the declaration can be reproduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Paint {
    #[default]
    Unset,
    None,
    Color(RGBA),
}

impl Paint {
    /// Color if channel is painted with a non-transparent color
    pub fn color(self) -> Option<RGBA> {
        match self {
            Paint::Color(color) if !color.is_transparent() => Some(color),
            _ => None,
        }
    }

    fn parse(value: &str) -> Option<Self> {
        if value.eq_ignore_ascii_case("none") {
            return Some(Paint::None);
        }
        value.parse().ok().map(Paint::Color)
    }
}

impl fmt::Display for Paint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Paint::Unset => Ok(()),
            Paint::None => write!(f, "none"),
            Paint::Color(color) => write!(f, "{}", color),
        }
    }
}

/// Resolved presentation attributes of a shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub fill: Paint,
    pub stroke: Paint,
    pub stroke_width: Scalar,
    /// element opacity multiplied by the `opacity` property
    pub opacity: Scalar,
    pub fill_opacity: Scalar,
    pub stroke_opacity: Scalar,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: Paint::Unset,
            stroke: Paint::Unset,
            stroke_width: DEFAULT_STROKE_WIDTH,
            opacity: 1.0,
            fill_opacity: 1.0,
            stroke_opacity: 1.0,
        }
    }
}

impl Style {
    /// Filled with `color`, no stroke
    pub fn fill(color: RGBA) -> Self {
        Self {
            fill: Paint::Color(color),
            ..Self::default()
        }
    }

    /// Stroked with `color` of the given `width`, no fill
    pub fn stroke(color: RGBA, width: Scalar) -> Self {
        Self {
            stroke: Paint::Color(color),
            stroke_width: width.max(0.0),
            ..Self::default()
        }
    }

    /// Parse style declaration
    ///
    /// Recognized keys are `fill`, `stroke`, `stroke-width`, `opacity`, `fill-opacity`
    /// and `stroke-opacity`, unknown keys are ignored. Values which can not be parsed are
    /// reported and leave the property at its default. Resulting opacity is the product of
    /// `element_opacity` and the `opacity` property.
    pub fn parse(decl: &str, element_opacity: Scalar, diag: &mut impl Diagnostics) -> Self {
        let mut style = Self::default();
        let mut opacity = 1.0;
        for item in decl.split(';') {
            let Some((key, value)) = item.split_once(':') else {
                if !item.trim().is_empty() {
                    diag.report(Anomaly::InvalidStyleValue {
                        key: item.trim().to_owned(),
                        value: String::new(),
                    });
                }
                continue;
            };
            let key = key.trim().to_ascii_lowercase();
            let value = value.trim();
            let parsed = match key.as_str() {
                "fill" => Paint::parse(value).map(|paint| style.fill = paint),
                "stroke" => Paint::parse(value).map(|paint| style.stroke = paint),
                "stroke-width" => parse_length(value).map(|width| style.stroke_width = width.max(0.0)),
                "opacity" => parse_opacity(value).map(|value| opacity = value),
                "fill-opacity" => parse_opacity(value).map(|value| style.fill_opacity = value),
                "stroke-opacity" => {
                    parse_opacity(value).map(|value| style.stroke_opacity = value)
                }
                _ => {
                    tracing::trace!(key = %key, "[style] ignored property");
                    Some(())
                }
            };
            if parsed.is_none() {
                diag.report(Anomaly::InvalidStyleValue {
                    key,
                    value: value.to_owned(),
                });
            }
        }
        style.opacity = clamp(element_opacity, 0.0, 1.0) * opacity;
        style
    }

    /// Effective fill color with opacity folded into alpha
    ///
    /// `None` if fill is unset, `none` or completely transparent.
    pub fn fill_color(&self) -> Option<[f32; 4]> {
        effective_color(self.fill, self.opacity * self.fill_opacity)
    }

    /// Effective stroke color with opacity folded into alpha
    ///
    /// `None` if stroke is unset, `none`, completely transparent or has no width.
    pub fn stroke_color(&self) -> Option<[f32; 4]> {
        if self.stroke_width <= 0.0 {
            return None;
        }
        effective_color(self.stroke, self.opacity * self.stroke_opacity)
    }
}

fn effective_color(paint: Paint, opacity: Scalar) -> Option<[f32; 4]> {
    let [r, g, b, a] = paint.color()?.to_f32();
    let alpha = a * opacity as f32;
    (alpha > 0.0).then_some([r, g, b, alpha])
}

fn parse_number(value: &str) -> Option<Scalar> {
    let number = lexical_core::parse::<Scalar>(value.trim().as_bytes()).ok()?;
    number.is_finite().then_some(number)
}

/// Length in user units, `px` suffix is accepted
fn parse_length(value: &str) -> Option<Scalar> {
    parse_number(value.strip_suffix("px").unwrap_or(value))
}

/// Opacity number or percentage, clamped to `0.0..=1.0`
fn parse_opacity(value: &str) -> Option<Scalar> {
    let opacity = match value.strip_suffix('%') {
        Some(percent) => parse_number(percent)? / 100.0,
        None => parse_number(value)?,
    };
    Some(clamp(opacity, 0.0, 1.0))
}
