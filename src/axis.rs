//! Axis tick selection, gridlines and labels.

use std::sync::Arc;

use chrono::DateTime;

use crate::geom::{Vec2, lerp};
use crate::layout::GraphLayout;
use crate::render::{Color, Surface, SurfaceGuard};
use crate::transform::Projection;
use crate::view::Range;

/// Minimum number of divisions a coarser step must produce to be chosen.
pub const TICK_DENSITY: f64 = 5.0;
/// Step multipliers tried from coarsest to finest.
const STEP_CANDIDATES: [f64; 3] = [5.0, 2.5, 1.0];

/// Label box height in pixels.
const LABEL_HEIGHT: f64 = 12.0;
/// Label width per character when the surface cannot measure text.
const LABEL_CHAR_WIDTH: f64 = 5.0;

const AXIS_COLOR: Color = Color::BLACK;
const EVEN_GRID_COLOR: Color = Color::from_rgb8(128, 128, 128, 0.5);
const ODD_GRID_COLOR: Color = Color::from_rgb8(190, 190, 190, 0.5);
const ZERO_LINE_COLOR: Color = Color::from_rgb8(64, 64, 64, 0.5);

/// Direction an axis runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisDirection {
    /// X axis, drawn below the content.
    Horizontal,
    /// Y axis, drawn left of the content.
    Vertical,
}

impl AxisDirection {
    /// Component index of the direction (0 for x, 1 for y).
    pub fn index(self) -> usize {
        match self {
            Self::Horizontal => 0,
            Self::Vertical => 1,
        }
    }

    /// Label offset as a fraction of the label box size.
    fn label_offset(self) -> Vec2 {
        match self {
            Self::Horizontal => Vec2::new(-0.5, 1.1),
            Self::Vertical => Vec2::new(-0.5, -0.25),
        }
    }
}

/// Formatter for axis tick labels.
///
/// Every variant receives the tick value and the integer and fraction digit
/// counts chosen for the current tick step.
#[derive(Clone, Default)]
pub enum AxisFormatter {
    /// Fixed-point value with the tick step's fraction digits.
    #[default]
    Normal,
    /// Value as unix seconds, shown as a UTC `YYYY-MM-DD` date.
    Day,
    /// Custom formatter callback `(value, integer_digits, fraction_digits)`.
    Custom(Arc<dyn Fn(f64, u32, usize) -> String + Send + Sync>),
}

impl AxisFormatter {
    /// Build a custom formatter from a closure.
    pub fn custom(formatter: impl Fn(f64, u32, usize) -> String + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(formatter))
    }

    /// Format a tick value for display.
    pub fn format(&self, value: f64, integer_digits: u32, fraction_digits: usize) -> String {
        match self {
            Self::Normal => format!("{value:.fraction_digits$}"),
            Self::Day => match DateTime::from_timestamp(value.floor() as i64, 0) {
                Some(date) => date.format("%Y-%m-%d").to_string(),
                None => format!("{value:.fraction_digits$}"),
            },
            Self::Custom(formatter) => formatter(value, integer_digits, fraction_digits),
        }
    }
}

impl std::fmt::Debug for AxisFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "AxisFormatter::Normal"),
            Self::Day => write!(f, "AxisFormatter::Day"),
            Self::Custom(_) => write!(f, "AxisFormatter::Custom(..)"),
        }
    }
}

/// Tick step and index range for one visible axis range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSpec {
    /// Distance between ticks.
    pub step: f64,
    /// `floor(log10(span))` of the visible range.
    pub exponent: i32,
    /// Integer digits for labels.
    pub integer_digits: u32,
    /// Fraction digits for labels.
    pub fraction_digits: usize,
    /// First tick index, inclusive.
    pub start: i64,
    /// Last tick index, exclusive.
    pub end: i64,
}

impl TickSpec {
    /// Value of tick `index`.
    pub fn value(&self, index: i64) -> f64 {
        index as f64 * self.step
    }

    /// Tick indices in drawing order.
    pub fn indices(&self) -> std::ops::Range<i64> {
        self.start..self.end
    }

    /// Whether the zero tick is in range.
    pub fn contains_zero(&self) -> bool {
        self.start <= 0 && 0 < self.end
    }
}

/// Pick the tick step for `range`.
///
/// The step is the coarsest of `{5, 2.5, 1} * 10^exponent` that still splits
/// the range into at least [`TICK_DENSITY`] divisions, falling back to
/// `10^exponent`. Returns `None` for empty or non-finite ranges.
pub fn select_ticks(range: Range) -> Option<TickSpec> {
    if !range.is_valid() {
        return None;
    }
    let span = range.span();
    let exponent = span.log10().floor() as i32;
    let unit = 10_f64.powi(exponent);
    let step = STEP_CANDIDATES
        .iter()
        .map(|candidate| candidate * unit)
        .find(|candidate| span / candidate >= TICK_DENSITY)
        .unwrap_or(unit);

    let (integer_digits, fraction_digits) = if exponent < 0 {
        (0, 1 + exponent.unsigned_abs() as usize)
    } else {
        (exponent.unsigned_abs(), 0)
    };

    Some(TickSpec {
        step,
        exponent,
        integer_digits,
        fraction_digits,
        start: (range.min / step).ceil() as i64,
        end: (range.max / step).ceil() as i64,
    })
}

/// Draws one graph axis with its ticks, gridlines and labels.
#[derive(Debug, Clone)]
pub struct AxisRenderer {
    direction: AxisDirection,
    formatter: AxisFormatter,
}

impl AxisRenderer {
    /// Create an axis renderer with the normal formatter.
    pub fn new(direction: AxisDirection) -> Self {
        Self {
            direction,
            formatter: AxisFormatter::default(),
        }
    }

    /// Access the axis direction.
    pub fn direction(&self) -> AxisDirection {
        self.direction
    }

    /// Access the label formatter.
    pub fn formatter(&self) -> &AxisFormatter {
        &self.formatter
    }

    /// Replace the label formatter. Tick selection is unaffected.
    pub fn set_formatter(&mut self, formatter: AxisFormatter) {
        self.formatter = formatter;
    }

    /// Set the label formatter.
    pub fn with_formatter(mut self, formatter: AxisFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// Draw the axis.
    ///
    /// `lower_left` and `upper_right` bound the axis gutter in graph space;
    /// gridlines extend from the gutter's far edge to `main_upper_right`.
    /// The surface must be in world space.
    pub fn draw(
        &self,
        layout: &GraphLayout,
        projection: &Projection,
        surface: &mut dyn Surface,
        lower_left: Vec2,
        upper_right: Vec2,
        main_upper_right: Vec2,
    ) {
        let dir = self.direction.index();
        let cross = 1 - dir;
        let swap = self.direction == AxisDirection::Vertical;
        let v_min = lower_left.get(dir);
        let v_max = upper_right.get(dir);
        let near = lower_left.get(cross);
        let far = upper_right.get(cross);
        let border = main_upper_right.get(cross);
        let at = |along: f64, across: f64| layout.to_ndc(Vec2::new(along, across).swapped_if(swap));

        let pixel = projection.pixel_size();
        let line_base = pixel.mean();

        let mut surface = SurfaceGuard::new(surface);
        surface.set_line_width(2.0 * line_base);
        surface.set_stroke_color(AXIS_COLOR);
        surface.begin_path();
        surface.move_to(at(v_min, far));
        surface.line_to(at(v_max, far));
        surface.stroke();

        let Some(ticks) = select_ticks(Range::new(v_min, v_max)) else {
            return;
        };

        for i in ticks.indices() {
            let (weight, p) = if i == 0 {
                (3.0, 0.5)
            } else if i % 2 == 0 {
                (2.0, 0.5)
            } else {
                (1.0, 0.75)
            };
            let v = ticks.value(i);
            surface.set_line_width(weight * line_base);
            surface.begin_path();
            surface.move_to(at(v, lerp(near, far, p)));
            surface.line_to(at(v, far));
            surface.stroke();
        }

        for (parity, color) in [(0, EVEN_GRID_COLOR), (1, ODD_GRID_COLOR)] {
            surface.set_stroke_color(color);
            surface.set_line_width(line_base);
            surface.begin_path();
            for i in ticks.indices() {
                if i == 0 || i.rem_euclid(2) != parity {
                    continue;
                }
                let v = ticks.value(i);
                surface.move_to(at(v, far));
                surface.line_to(at(v, border));
            }
            surface.stroke();
        }

        if ticks.contains_zero() {
            surface.set_stroke_color(ZERO_LINE_COLOR);
            surface.set_line_width(3.0 * line_base);
            surface.begin_path();
            surface.move_to(at(0.0, far));
            surface.line_to(at(0.0, border));
            surface.stroke();
        }

        let offset = self.direction.label_offset();
        surface.set_fill_color(AXIS_COLOR);
        for i in ticks.indices().filter(|i| i % 2 == 0) {
            let v = ticks.value(i);
            let label = self
                .formatter
                .format(v, ticks.integer_digits, ticks.fraction_digits);
            let mut label_space = SurfaceGuard::new(&mut *surface);
            label_space.translate(at(v, lerp(near, far, 0.5)));
            label_space.scale(Vec2::new(pixel.x, -pixel.y));
            let width = label_space
                .measure_text(&label)
                .unwrap_or(label.chars().count() as f64 * LABEL_CHAR_WIDTH);
            label_space.fill_text(&label, Vec2::new(width * offset.x, LABEL_HEIGHT * offset.y));
        }
    }
}
