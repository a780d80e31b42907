//! Auto-fit layout mapping graph space into the viewport's world space.

use tracing::debug;

use crate::geom::Vec2;
use crate::series::Series;
use crate::transform::Projection;
use crate::view::ViewTransform;

/// Content spans below this are widened by one unit.
pub const DEGENERATE_SPAN: f64 = 0.001;

/// Pixel margins used when fitting content into the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMargins {
    /// Height reserved for the horizontal axis, in pixels.
    pub axis_gutter_x: f64,
    /// Width reserved for the vertical axis, in pixels.
    pub axis_gutter_y: f64,
    /// Extra padding around the content, in pixels.
    pub padding: f64,
}

impl Default for LayoutMargins {
    fn default() -> Self {
        Self {
            axis_gutter_x: 40.0,
            axis_gutter_y: 40.0,
            padding: 5.0,
        }
    }
}

/// Graph-space rectangle mapped onto world NDC `[-1, 1]`.
///
/// `lower_left` and `upper_right` are the graph-space points that land on
/// world `(-1, -1)` and `(1, 1)`. They always span a strictly positive area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphLayout {
    /// Graph point mapped to world `(-1, -1)`.
    pub lower_left: Vec2,
    /// Graph point mapped to world `(1, 1)`.
    pub upper_right: Vec2,
    /// Lower corner of the fitted content bounds.
    pub content_min: Vec2,
    /// Upper corner of the fitted content bounds.
    pub content_max: Vec2,
    /// Height reserved for the horizontal axis, in pixels.
    pub axis_gutter_x: f64,
    /// Width reserved for the vertical axis, in pixels.
    pub axis_gutter_y: f64,
}

impl Default for GraphLayout {
    fn default() -> Self {
        Self {
            lower_left: Vec2::ZERO,
            upper_right: Vec2::ONE,
            content_min: Vec2::ZERO,
            content_max: Vec2::ONE,
            axis_gutter_x: 0.0,
            axis_gutter_y: 0.0,
        }
    }
}

impl GraphLayout {
    /// Fit all points of `series` into the area of `projection` left after the
    /// axis gutters and padding.
    ///
    /// The fit is computed against the identity view transform, so panning
    /// and zooming never change the layout.
    pub fn fit<'a>(
        series: impl IntoIterator<Item = &'a Series>,
        projection: &Projection,
        margins: &LayoutMargins,
    ) -> Self {
        let (content_min, content_max) = content_bounds(series);
        let client_size = projection.size();
        if !(client_size.x > 0.0 && client_size.y > 0.0 && client_size.is_finite()) {
            debug!(width = client_size.x, height = client_size.y, "empty surface, identity fit");
            return Self {
                lower_left: content_min,
                upper_right: content_max,
                content_min,
                content_max,
                axis_gutter_x: margins.axis_gutter_x,
                axis_gutter_y: margins.axis_gutter_y,
            };
        }

        let identity = ViewTransform::IDENTITY;
        let pad = margins.padding;
        let ll_client = Vec2::new(margins.axis_gutter_y + pad, margins.axis_gutter_x + pad);
        // Surfaces smaller than the margins still get a one pixel target.
        let ur_client = (client_size - pad).max(ll_client + 1.0);
        let ll_target = projection.client_to_world_with(ll_client, &identity);
        let ur_target = projection.client_to_world_with(ur_client, &identity);
        let target_size = ur_target - ll_target;
        let target_center = ll_target + target_size * 0.5;

        // Solve for the graph rectangle whose NDC mapping puts the content
        // box onto the target box.
        let size = (content_max - content_min) / (target_size * 0.5);
        let center = (content_min + content_max) * 0.5 - target_center * size * 0.5;

        let layout = Self {
            lower_left: center - size * 0.5,
            upper_right: center + size * 0.5,
            content_min,
            content_max,
            axis_gutter_x: margins.axis_gutter_x,
            axis_gutter_y: margins.axis_gutter_y,
        };
        debug!(
            lower_left = ?layout.lower_left,
            upper_right = ?layout.upper_right,
            "graph layout computed"
        );
        layout
    }

    /// Graph space to world NDC.
    pub fn to_ndc(&self, point: Vec2) -> Vec2 {
        (point - self.lower_left) * 2.0 / (self.upper_right - self.lower_left) - 1.0
    }

    /// World NDC to graph space.
    pub fn from_ndc(&self, point: Vec2) -> Vec2 {
        self.lower_left + (self.upper_right - self.lower_left) * (point + 1.0) * 0.5
    }
}

/// Union bounds of all points, widened where degenerate.
fn content_bounds<'a>(series: impl IntoIterator<Item = &'a Series>) -> (Vec2, Vec2) {
    let bounds = series
        .into_iter()
        .filter_map(Series::bounds)
        .reduce(|(min_a, max_a), (min_b, max_b)| (min_a.min(min_b), max_a.max(max_b)));
    let (min, mut max) = bounds.unwrap_or((Vec2::ZERO, Vec2::ZERO));
    if (max.x - min.x).abs() < DEGENERATE_SPAN {
        max.x += 1.0;
    }
    if (max.y - min.y).abs() < DEGENERATE_SPAN {
        max.y += 1.0;
    }
    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projection() -> Projection {
        Projection::new(Vec2::new(800.0, 600.0), ViewTransform::IDENTITY)
    }

    fn tent() -> Series {
        Series::from_points("tent", [(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]).unwrap()
    }

    #[test]
    fn ndc_conversion_roundtrip() {
        let layout = GraphLayout {
            lower_left: Vec2::new(-3.0, 10.0),
            upper_right: Vec2::new(5.0, 12.0),
            ..GraphLayout::default()
        };
        assert_eq!(layout.to_ndc(Vec2::new(-3.0, 10.0)), Vec2::new(-1.0, -1.0));
        assert_eq!(layout.to_ndc(Vec2::new(5.0, 12.0)), Vec2::new(1.0, 1.0));
        let p = Vec2::new(0.7, 11.1);
        assert!(layout.from_ndc(layout.to_ndc(p)).approx_eq(p, 1e-12));
    }

    #[test]
    fn content_lands_on_padded_target() {
        let projection = projection();
        let series = [tent()];
        let layout = GraphLayout::fit(&series, &projection, &LayoutMargins::default());

        let min_client = projection.world_to_client(layout.to_ndc(Vec2::new(0.0, 0.0)));
        let max_client = projection.world_to_client(layout.to_ndc(Vec2::new(2.0, 1.0)));
        assert!(min_client.approx_eq(Vec2::new(45.0, 45.0), 1e-9), "{min_client:?}");
        assert!(max_client.approx_eq(Vec2::new(795.0, 595.0), 1e-9), "{max_client:?}");

        assert!(layout.lower_left.y <= 0.0);
        assert!(layout.upper_right.y >= 1.0);
        assert_eq!(layout.axis_gutter_x, 40.0);
    }

    #[test]
    fn fit_is_idempotent() {
        let projection = projection();
        let series = [tent(), Series::from_y("y", [4.0, -2.0, 7.5]).unwrap()];
        let margins = LayoutMargins::default();
        let first = GraphLayout::fit(&series, &projection, &margins);
        let second = GraphLayout::fit(&series, &projection, &margins);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_content_defaults_to_unit_box() {
        let layout = GraphLayout::fit(std::iter::empty(), &projection(), &LayoutMargins::default());
        assert_eq!(layout.content_min, Vec2::ZERO);
        assert_eq!(layout.content_max, Vec2::ONE);
        assert!(layout.upper_right.x > layout.lower_left.x);
        assert!(layout.upper_right.y > layout.lower_left.y);
    }

    fn assert_ordered(layout: &GraphLayout) {
        assert!(layout.lower_left.is_finite() && layout.upper_right.is_finite(), "{layout:?}");
        assert!(layout.upper_right.x > layout.lower_left.x, "{layout:?}");
        assert!(layout.upper_right.y > layout.lower_left.y, "{layout:?}");
    }

    #[test]
    fn surface_smaller_than_margins_keeps_order() {
        let projection = Projection::new(Vec2::new(40.0, 40.0), ViewTransform::IDENTITY);
        let layout = GraphLayout::fit([&tent()], &projection, &LayoutMargins::default());
        assert_ordered(&layout);
        let min_client = projection.world_to_client(layout.to_ndc(Vec2::ZERO));
        let max_client = projection.world_to_client(layout.to_ndc(Vec2::new(2.0, 1.0)));
        assert!((max_client - min_client).approx_eq(Vec2::ONE, 1e-9), "{min_client:?}");
    }

    #[test]
    fn empty_surface_falls_back_to_content_box() {
        let projection = Projection::new(Vec2::ZERO, ViewTransform::IDENTITY);
        let layout = GraphLayout::fit([&tent()], &projection, &LayoutMargins::default());
        assert_ordered(&layout);
        assert_eq!(layout.lower_left, Vec2::ZERO);
        assert_eq!(layout.upper_right, Vec2::new(2.0, 1.0));
    }

    #[test]
    fn degenerate_axis_is_widened() {
        let flat = Series::from_points("flat", [(2.0, 3.0), (4.0, 3.0005)]).unwrap();
        let layout = GraphLayout::fit([&flat], &projection(), &LayoutMargins::default());
        assert_eq!(layout.content_min, Vec2::new(2.0, 3.0));
        assert_eq!(layout.content_max.x, 4.0);
        assert!((layout.content_max.y - 4.0005).abs() < 1e-12);
    }
}
