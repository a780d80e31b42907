//! Plot styles: how a series is turned into drawing calls.

use std::f64::consts::TAU;

use crate::geom::Vec2;
use crate::layout::GraphLayout;
use crate::render::{Color, Surface, SurfaceGuard};
use crate::transform::Projection;

/// Line styling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    /// Stroke color.
    pub color: Color,
    /// Stroke width in screen pixels, kept constant under zoom.
    pub width: f64,
}

impl LineStyle {
    /// Create a line style.
    pub fn new(color: Color, width: f64) -> Self {
        Self { color, width }
    }
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 1.0,
        }
    }
}

/// Marker shape for scatter plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerShape {
    /// Circle marker.
    Circle,
    /// Square marker.
    Square,
    /// Cross marker.
    Cross,
}

/// Marker styling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    /// Marker color.
    pub color: Color,
    /// Marker size in screen pixels.
    pub size: f64,
    /// Marker shape.
    pub shape: MarkerShape,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            size: 4.0,
            shape: MarkerShape::Circle,
        }
    }
}

/// Rendering strategy for one series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlotStyle {
    /// Connected polyline through the points.
    Line(LineStyle),
    /// Independent markers at each point.
    Scatter(MarkerStyle),
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self::Line(LineStyle::default())
    }
}

impl From<LineStyle> for PlotStyle {
    fn from(style: LineStyle) -> Self {
        Self::Line(style)
    }
}

impl From<MarkerStyle> for PlotStyle {
    fn from(style: MarkerStyle) -> Self {
        Self::Scatter(style)
    }
}

impl PlotStyle {
    /// Draw `points` (graph space) onto a world-space surface.
    pub fn plot(
        &self,
        layout: &GraphLayout,
        projection: &Projection,
        surface: &mut dyn Surface,
        points: &[Vec2],
    ) {
        if points.is_empty() {
            return;
        }
        let mut surface = SurfaceGuard::new(surface);
        match self {
            Self::Line(style) => plot_line(style, layout, projection, &mut *surface, points),
            Self::Scatter(style) => plot_markers(style, layout, projection, &mut *surface, points),
        }
    }
}

fn plot_line(
    style: &LineStyle,
    layout: &GraphLayout,
    projection: &Projection,
    surface: &mut dyn Surface,
    points: &[Vec2],
) {
    surface.begin_path();
    let mut iter = points.iter();
    if let Some(first) = iter.next() {
        surface.move_to(layout.to_ndc(*first));
    }
    for point in iter {
        surface.line_to(layout.to_ndc(*point));
    }
    surface.set_line_width(style.width * projection.pixel_size().mean());
    surface.set_stroke_color(style.color);
    surface.stroke();
}

fn plot_markers(
    style: &MarkerStyle,
    layout: &GraphLayout,
    projection: &Projection,
    surface: &mut dyn Surface,
    points: &[Vec2],
) {
    let pixel = projection.pixel_size();
    let half = style.size * 0.5;
    surface.set_fill_color(style.color);
    surface.set_stroke_color(style.color);
    for point in points {
        // Marker geometry is laid out in screen pixels around the point.
        let mut marker = SurfaceGuard::new(&mut *surface);
        marker.translate(layout.to_ndc(*point));
        marker.scale(pixel);
        match style.shape {
            MarkerShape::Circle => {
                marker.begin_path();
                marker.arc(Vec2::ZERO, half, 0.0, TAU);
                marker.close_path();
                marker.fill();
            }
            MarkerShape::Square => {
                marker.fill_rect(Vec2::splat(-half), Vec2::splat(style.size));
            }
            MarkerShape::Cross => {
                marker.set_line_width(1.0);
                marker.begin_path();
                marker.move_to(Vec2::new(-half, 0.0));
                marker.line_to(Vec2::new(half, 0.0));
                marker.move_to(Vec2::new(0.0, -half));
                marker.line_to(Vec2::new(0.0, half));
                marker.stroke();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RecordingSurface, RenderCommand};
    use crate::view::ViewTransform;

    fn setup(transform: ViewTransform) -> (GraphLayout, Projection, RecordingSurface) {
        let projection = Projection::new(Vec2::new(400.0, 400.0), transform);
        let layout = GraphLayout {
            lower_left: Vec2::new(0.0, 0.0),
            upper_right: Vec2::new(10.0, 10.0),
            ..GraphLayout::default()
        };
        let mut surface = RecordingSurface::new(400.0, 400.0);
        projection.apply_window_matrix(&mut surface);
        projection.apply_view_matrix(&mut surface);
        (layout, projection, surface)
    }

    fn stroke_widths(surface: &RecordingSurface) -> Vec<f32> {
        surface
            .commands()
            .iter()
            .filter_map(|command| match command {
                RenderCommand::LineSegments { stroke, .. } => Some(stroke.width),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn empty_series_draws_nothing() {
        let (layout, projection, mut surface) = setup(ViewTransform::IDENTITY);
        PlotStyle::default().plot(&layout, &projection, &mut surface, &[]);
        assert!(surface.commands().is_empty());
        assert_eq!(surface.save_depth(), 0);
    }

    #[test]
    fn line_connects_points_in_order() {
        let (layout, projection, mut surface) = setup(ViewTransform::IDENTITY);
        let points = [Vec2::new(0.0, 0.0), Vec2::new(5.0, 5.0), Vec2::new(10.0, 0.0)];
        PlotStyle::default().plot(&layout, &projection, &mut surface, &points);
        match &surface.commands()[0] {
            RenderCommand::LineSegments { segments, stroke } => {
                assert_eq!(segments.len(), 2);
                assert_eq!(segments[0].end, segments[1].start);
                assert_eq!(stroke.color, Color::BLACK);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn line_width_is_constant_under_zoom() {
        let style = PlotStyle::Line(LineStyle::new(Color::rgb(1.0, 0.0, 0.0), 2.0));
        let points = [Vec2::new(1.0, 1.0), Vec2::new(9.0, 9.0)];
        for scale in [0.25, 1.0, 8.0] {
            let transform = ViewTransform::new(Vec2::ZERO, Vec2::splat(scale));
            let (layout, projection, mut surface) = setup(transform);
            style.plot(&layout, &projection, &mut surface, &points);
            let widths = stroke_widths(&surface);
            assert!((widths[0] - 2.0).abs() < 1e-4, "scale {scale}: {widths:?}");
        }
    }

    #[test]
    fn markers_are_drawn_per_point() {
        let (layout, projection, mut surface) = setup(ViewTransform::IDENTITY);
        let points = [Vec2::new(2.0, 2.0), Vec2::new(8.0, 8.0)];
        let circles = PlotStyle::Scatter(MarkerStyle::default());
        circles.plot(&layout, &projection, &mut surface, &points);
        let polygons = surface
            .commands()
            .iter()
            .filter(|command| matches!(command, RenderCommand::Polygon { .. }))
            .count();
        assert_eq!(polygons, 2);

        let (layout, projection, mut surface) = setup(ViewTransform::IDENTITY);
        let squares = PlotStyle::from(MarkerStyle {
            shape: MarkerShape::Square,
            size: 6.0,
            ..MarkerStyle::default()
        });
        squares.plot(&layout, &projection, &mut surface, &points[..1]);
        match surface.commands()[0] {
            RenderCommand::FillRect { rect, .. } => {
                assert!((rect.width() - 6.0).abs() < 1e-4);
                assert!((rect.height() - 6.0).abs() < 1e-4);
            }
            ref other => panic!("unexpected command {other:?}"),
        }
    }
}
