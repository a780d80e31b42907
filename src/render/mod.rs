//! Drawing surface contract and backend-agnostic render primitives.
//!
//! Everything in the viewport and graph pipeline draws through the
//! [`Surface`] trait: an immediate-mode 2D surface with a canvas-style state
//! stack. [`RecordingSurface`] implements it by flattening draw calls into a
//! [`RenderList`] of device-space commands that a backend (such as the GPUI
//! backend) paints, and that tests can inspect directly.

mod recorder;

pub use recorder::RecordingSurface;

use std::ops::{Deref, DerefMut};

use crate::geom::{ScreenPoint, ScreenRect, Vec2, Vec3};

/// RGBA color.
///
/// All components are expected to be in the 0.0..=1.0 range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
    /// Alpha channel.
    pub a: f32,
}

impl Color {
    /// Create a new color.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Create a color from 8-bit channels and a unit alpha.
    pub const fn from_rgb8(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, a)
    }

    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Copy with a different alpha.
    #[must_use]
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Pack the color channels into bytes, flooring after clamping to `[0, 255]`.
    pub fn to_rgb8(self) -> [u8; 3] {
        let packed = (Vec3::new(f64::from(self.r), f64::from(self.g), f64::from(self.b)) * 255.0)
            .clamp_scalar(0.0, 255.0)
            .floor();
        [packed.x as u8, packed.y as u8, packed.z as u8]
    }

    /// CSS color string: `rgb(r,g,b)` when opaque, `rgba(r,g,b,a)` otherwise.
    pub fn to_css(self) -> String {
        let [r, g, b] = self.to_rgb8();
        if self.a >= 1.0 {
            format!("rgb({r},{g},{b})")
        } else {
            format!("rgba({r},{g},{b},{})", self.a)
        }
    }
}

impl From<Vec3> for Color {
    fn from(v: Vec3) -> Self {
        Self::rgb(v.x as f32, v.y as f32, v.z as f32)
    }
}

/// Text measurement provided by a backend.
pub trait TextMeasurer {
    /// Measure `text` at `size` pixels, returning `(width, height)`.
    fn measure(&self, text: &str, size: f32) -> (f32, f32);
}

/// An immediate-mode 2D drawing surface.
///
/// Coordinates passed to path and rectangle calls are in the current user
/// space, i.e. they go through the transform built up with
/// [`translate`](Surface::translate) and [`scale`](Surface::scale).
/// [`save`](Surface::save) / [`restore`](Surface::restore) cover the
/// transform, colors, line width and clip region.
pub trait Surface {
    /// Backing size in pixels.
    fn size(&self) -> Vec2;

    /// Start a new frame. Surfaces that retain output discard the previous
    /// frame here.
    fn begin_frame(&mut self) {}

    /// Push the current drawing state.
    fn save(&mut self);
    /// Pop the most recently saved drawing state. No-op on an empty stack.
    fn restore(&mut self);

    /// Append a translation to the current transform.
    fn translate(&mut self, offset: Vec2);
    /// Append a non-uniform scale to the current transform.
    fn scale(&mut self, factor: Vec2);
    /// Reset the current transform to identity (device pixels, y down).
    fn reset_transform(&mut self);

    /// Start a new, empty path.
    fn begin_path(&mut self);
    /// Begin a new subpath at `point`.
    fn move_to(&mut self, point: Vec2);
    /// Add a straight segment to `point`.
    fn line_to(&mut self, point: Vec2);
    /// Add a circular arc; angles in radians, counter-clockwise in user space.
    fn arc(&mut self, center: Vec2, radius: f64, start_angle: f64, end_angle: f64);
    /// Add a closed rectangular subpath.
    fn rect(&mut self, origin: Vec2, size: Vec2);
    /// Close the current subpath.
    fn close_path(&mut self);

    /// Intersect the clip region with the current path.
    fn clip(&mut self);
    /// Fill the current path with the fill color.
    fn fill(&mut self);
    /// Stroke the current path with the stroke color and line width.
    fn stroke(&mut self);

    /// Fill a rectangle without touching the current path.
    fn fill_rect(&mut self, origin: Vec2, size: Vec2);
    /// Stroke a rectangle without touching the current path.
    fn stroke_rect(&mut self, origin: Vec2, size: Vec2);
    /// Clear a rectangle to transparent.
    fn clear_rect(&mut self, origin: Vec2, size: Vec2);

    /// Set the fill color (alpha included).
    fn set_fill_color(&mut self, color: Color);
    /// Set the stroke color (alpha included).
    fn set_stroke_color(&mut self, color: Color);
    /// Set the line width in user-space units.
    fn set_line_width(&mut self, width: f64);

    /// Width of `text` in user-space units, if the surface can measure text.
    fn measure_text(&self, _text: &str) -> Option<f64> {
        None
    }

    /// Draw `text` with its baseline origin at `at`. Returns `false` when the
    /// surface cannot draw text.
    fn fill_text(&mut self, _text: &str, _at: Vec2) -> bool {
        false
    }
}

/// Scoped save/restore of a surface's drawing state.
///
/// The state is saved on construction and restored on drop, so nothing set
/// through the guard can leak out of the scope, whatever path the scope is
/// left by.
pub struct SurfaceGuard<'a> {
    surface: &'a mut (dyn Surface + 'a),
}

impl<'a> SurfaceGuard<'a> {
    /// Save the surface state and return a guard that restores it.
    pub fn new(surface: &'a mut (dyn Surface + 'a)) -> Self {
        surface.save();
        Self { surface }
    }
}

impl<'a> Deref for SurfaceGuard<'a> {
    type Target = dyn Surface + 'a;

    fn deref(&self) -> &Self::Target {
        self.surface
    }
}

impl<'a> DerefMut for SurfaceGuard<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.surface
    }
}

impl Drop for SurfaceGuard<'_> {
    fn drop(&mut self) {
        self.surface.restore();
    }
}

impl std::fmt::Debug for SurfaceGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurfaceGuard").finish_non_exhaustive()
    }
}

/// Stroke styling in device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    /// Stroke color.
    pub color: Color,
    /// Stroke width in pixels.
    pub width: f32,
}

/// A line segment in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    /// Segment start.
    pub start: ScreenPoint,
    /// Segment end.
    pub end: ScreenPoint,
}

impl LineSegment {
    /// Create a new line segment.
    pub fn new(start: ScreenPoint, end: ScreenPoint) -> Self {
        Self { start, end }
    }
}

/// Device-space render command.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Start clipping to a rectangle (already intersected with any outer clip).
    ClipRect(ScreenRect),
    /// End the innermost clip.
    ClipEnd,
    /// Clear a rectangle to transparent.
    Clear(ScreenRect),
    /// Draw line segments.
    LineSegments {
        /// Segments to draw.
        segments: Vec<LineSegment>,
        /// Styling for the segments.
        stroke: Stroke,
    },
    /// Fill a closed polygon.
    Polygon {
        /// Polygon vertices.
        points: Vec<ScreenPoint>,
        /// Fill color.
        color: Color,
    },
    /// Fill an axis-aligned rectangle.
    FillRect {
        /// Rectangle bounds.
        rect: ScreenRect,
        /// Fill color.
        color: Color,
    },
    /// Draw text.
    Text {
        /// Top-left corner of the text box.
        position: ScreenPoint,
        /// Text content.
        text: String,
        /// Text color.
        color: Color,
        /// Font size in pixels.
        size: f32,
    },
}

/// Aggregated render commands.
#[derive(Debug, Default, Clone)]
pub struct RenderList {
    commands: Vec<RenderCommand>,
}

impl RenderList {
    /// Create an empty render list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a render command.
    pub fn push(&mut self, command: RenderCommand) {
        self.commands.push(command);
    }

    /// Access all render commands.
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Number of recorded commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Check whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Clip a segment to a rectangle (Cohen–Sutherland).
pub(crate) fn clip_segment(
    mut start: ScreenPoint,
    mut end: ScreenPoint,
    rect: ScreenRect,
) -> Option<(ScreenPoint, ScreenPoint)> {
    const LEFT: u8 = 1;
    const RIGHT: u8 = 2;
    const TOP: u8 = 4;
    const BOTTOM: u8 = 8;

    let region_code = |point: ScreenPoint| {
        let mut code = 0;
        if point.x < rect.min.x {
            code |= LEFT;
        } else if point.x > rect.max.x {
            code |= RIGHT;
        }
        if point.y < rect.min.y {
            code |= TOP;
        } else if point.y > rect.max.y {
            code |= BOTTOM;
        }
        code
    };

    let mut out_start = region_code(start);
    let mut out_end = region_code(end);

    loop {
        if (out_start | out_end) == 0 {
            return Some((start, end));
        }
        if (out_start & out_end) != 0 {
            return None;
        }

        let out_code = if out_start != 0 { out_start } else { out_end };
        let (x, y) = if (out_code & TOP) != 0 {
            (
                start.x + (end.x - start.x) * (rect.min.y - start.y) / (end.y - start.y),
                rect.min.y,
            )
        } else if (out_code & BOTTOM) != 0 {
            (
                start.x + (end.x - start.x) * (rect.max.y - start.y) / (end.y - start.y),
                rect.max.y,
            )
        } else if (out_code & RIGHT) != 0 {
            (
                rect.max.x,
                start.y + (end.y - start.y) * (rect.max.x - start.x) / (end.x - start.x),
            )
        } else {
            (
                rect.min.x,
                start.y + (end.y - start.y) * (rect.min.x - start.x) / (end.x - start.x),
            )
        };

        let new_point = ScreenPoint::new(x, y);
        if out_code == out_start {
            start = new_point;
            out_start = region_code(start);
        } else {
            end = new_point;
            out_end = region_code(end);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_packing() {
        assert_eq!(Color::rgb(0.8, 0.8, 0.8).to_rgb8(), [204, 204, 204]);
        assert_eq!(Color::rgb(1.5, -0.2, 0.5).to_rgb8(), [255, 0, 127]);
        assert_eq!(Color::BLACK.to_css(), "rgb(0,0,0)");
        assert_eq!(Color::new(0.5, 0.5, 0.5, 0.5).to_css(), "rgba(127,127,127,0.5)");
        assert_eq!(Color::from_rgb8(0, 255, 0, 1.0).to_rgb8(), [0, 255, 0]);
    }

    #[test]
    fn clip_segment_inside() {
        let rect = ScreenRect::new(ScreenPoint::new(0.0, 0.0), ScreenPoint::new(10.0, 10.0));
        let start = ScreenPoint::new(2.0, 2.0);
        let end = ScreenPoint::new(8.0, 8.0);
        let clipped = clip_segment(start, end, rect).expect("segment should clip");
        assert_eq!(clipped.0, start);
        assert_eq!(clipped.1, end);
    }

    #[test]
    fn clip_segment_crossing() {
        let rect = ScreenRect::new(ScreenPoint::new(0.0, 0.0), ScreenPoint::new(10.0, 10.0));
        let clipped = clip_segment(ScreenPoint::new(-5.0, 5.0), ScreenPoint::new(15.0, 5.0), rect)
            .expect("segment crosses the rect");
        assert_eq!(clipped.0, ScreenPoint::new(0.0, 5.0));
        assert_eq!(clipped.1, ScreenPoint::new(10.0, 5.0));
        assert!(clip_segment(ScreenPoint::new(-5.0, -5.0), ScreenPoint::new(-1.0, 20.0), rect).is_none());
    }
}
