//! Graph widget: an auto-fitting Cartesian graph on top of a [`Viewport`].

use tracing::debug;

use crate::axis::{AxisDirection, AxisFormatter, AxisRenderer};
use crate::geom::Vec2;
use crate::interaction::{EventDisposition, PointerEvent, WheelEvent};
use crate::layout::{GraphLayout, LayoutMargins};
use crate::render::{Color, Surface, SurfaceGuard};
use crate::series::{Series, SeriesError, SeriesId};
use crate::style::PlotStyle;
use crate::transform::Projection;
use crate::view::ViewTransform;
use crate::viewport::{Viewport, ViewportConfig, ViewportHooks};

/// Configuration for a [`Graph`].
#[derive(Debug, Clone)]
pub struct GraphConfig {
    /// Axis gutters and padding used by the auto-fit layout.
    pub margins: LayoutMargins,
    /// Background color.
    pub clear_color: Color,
    /// Draw the viewport minimap.
    pub show_minimap: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            margins: LayoutMargins::default(),
            clear_color: Color::rgb(0.8, 0.8, 0.8),
            show_minimap: false,
        }
    }
}

impl GraphConfig {
    fn viewport_config(&self) -> ViewportConfig {
        ViewportConfig {
            clear_color: self.clear_color,
            show_minimap: self.show_minimap,
            ..ViewportConfig::default()
        }
    }
}

/// A series paired with the style it is drawn with.
#[derive(Debug, Clone)]
pub struct Plot {
    /// The plotted data.
    pub series: Series,
    /// How the data is drawn.
    pub style: PlotStyle,
}

/// Graph content drawn by the viewport: plots, axes and the cached layout.
#[derive(Debug, Clone)]
pub struct GraphContent {
    plots: Vec<Plot>,
    layout: Option<GraphLayout>,
    margins: LayoutMargins,
    x_axis: AxisRenderer,
    y_axis: AxisRenderer,
    debug_text: Option<String>,
}

impl GraphContent {
    fn new(margins: LayoutMargins) -> Self {
        Self {
            plots: Vec::new(),
            layout: None,
            margins,
            x_axis: AxisRenderer::new(AxisDirection::Horizontal),
            y_axis: AxisRenderer::new(AxisDirection::Vertical),
            debug_text: None,
        }
    }

    /// Registered plots in drawing order.
    pub fn plots(&self) -> &[Plot] {
        &self.plots
    }

    /// The current layout, if it is up to date.
    pub fn layout(&self) -> Option<&GraphLayout> {
        self.layout.as_ref()
    }

    /// Mark the layout for recomputation on the next draw.
    pub fn invalidate(&mut self) {
        self.layout = None;
    }

    /// Compute the layout now, whether or not it is stale.
    pub fn compute_layout(&self, projection: &Projection) -> GraphLayout {
        GraphLayout::fit(
            self.plots.iter().map(|plot| &plot.series),
            projection,
            &self.margins,
        )
    }

    fn current_layout(&self, projection: &Projection) -> GraphLayout {
        self.layout
            .unwrap_or_else(|| self.compute_layout(projection))
    }
}

impl ViewportHooks for GraphContent {
    fn on_size_change(&mut self, _projection: &Projection) {
        self.invalidate();
    }

    fn on_draw_start(&mut self, projection: &Projection) {
        if self.layout.is_none() {
            self.layout = Some(self.compute_layout(projection));
        }
    }

    fn on_draw(&self, projection: &Projection, surface: &mut dyn Surface) {
        let layout = self.current_layout(projection);
        let size = projection.size();
        let gutters = Vec2::new(layout.axis_gutter_y, layout.axis_gutter_x);
        let to_graph = |point: Vec2| layout.from_ndc(projection.client_to_world(point));
        let main_upper_right = to_graph(size);

        self.x_axis.draw(
            &layout,
            projection,
            surface,
            to_graph(Vec2::new(gutters.x, 0.0)),
            to_graph(Vec2::new(size.x, gutters.y)),
            main_upper_right,
        );
        self.y_axis.draw(
            &layout,
            projection,
            surface,
            to_graph(Vec2::new(0.0, gutters.y)),
            to_graph(Vec2::new(gutters.x, size.y)),
            main_upper_right,
        );

        if let Some(text) = &self.debug_text {
            let mut overlay = SurfaceGuard::new(&mut *surface);
            overlay.reset_transform();
            overlay.set_fill_color(Color::BLACK);
            overlay.fill_text(text, size * 0.5 + 10.0);
        }

        let mut content = SurfaceGuard::new(surface);
        let content_ll = projection.client_to_world(gutters);
        let content_ur = projection.client_to_world(size);
        content.begin_path();
        content.rect(content_ll, content_ur - content_ll);
        content.clip();
        for plot in &self.plots {
            plot.style
                .plot(&layout, projection, &mut *content, plot.series.points());
        }
    }
}

/// An auto-fitting Cartesian graph with axes, gridlines and plots.
#[derive(Debug)]
pub struct Graph<S> {
    viewport: Viewport<S, GraphContent>,
}

impl<S: Surface> Graph<S> {
    /// Create a graph drawing onto `surface` with the default configuration.
    pub fn new(surface: S) -> Self {
        Self::with_config(surface, GraphConfig::default())
    }

    /// Create a graph with a custom configuration.
    pub fn with_config(surface: S, config: GraphConfig) -> Self {
        let content = GraphContent::new(config.margins);
        Self {
            viewport: Viewport::with_config(surface, content, config.viewport_config()),
        }
    }

    /// Access the underlying viewport.
    pub fn viewport(&self) -> &Viewport<S, GraphContent> {
        &self.viewport
    }

    /// Access the underlying viewport mutably.
    pub fn viewport_mut(&mut self) -> &mut Viewport<S, GraphContent> {
        &mut self.viewport
    }

    /// Access the graph content.
    pub fn content(&self) -> &GraphContent {
        self.viewport.content()
    }

    /// Add a series drawn with `style`, invalidate the layout and redraw.
    pub fn add_plot(&mut self, series: Series, style: impl Into<PlotStyle>) -> SeriesId {
        let id = series.id();
        debug!(?id, points = series.len(), "plot added");
        self.viewport.content_mut().plots.push(Plot {
            series,
            style: style.into(),
        });
        self.graph_changed();
        id
    }

    /// Add a series with the default line style.
    pub fn add_series(&mut self, series: Series) -> SeriesId {
        self.add_plot(series, PlotStyle::default())
    }

    /// Validate `points` into a series and add it with `style`.
    pub fn add_points<I, P>(
        &mut self,
        name: impl Into<String>,
        points: I,
        style: impl Into<PlotStyle>,
    ) -> Result<SeriesId, SeriesError>
    where
        I: IntoIterator<Item = P>,
        P: Into<Vec2>,
    {
        let series = Series::from_points(name, points)?;
        Ok(self.add_plot(series, style))
    }

    /// Append points to an existing series. Returns `Ok(None)` for unknown ids.
    ///
    /// A batch with any invalid point is rejected whole.
    pub fn extend_series<I, P>(
        &mut self,
        id: SeriesId,
        points: I,
    ) -> Result<Option<usize>, SeriesError>
    where
        I: IntoIterator<Item = P>,
        P: Into<Vec2>,
    {
        let content = self.viewport.content_mut();
        let Some(plot) = content.plots.iter_mut().find(|plot| plot.series.id() == id) else {
            return Ok(None);
        };
        let added = plot.series.extend(points)?;
        self.graph_changed();
        Ok(Some(added))
    }

    /// Remove one plot. Returns the removed series if it existed.
    pub fn remove_plot(&mut self, id: SeriesId) -> Option<Series> {
        let plots = &mut self.viewport.content_mut().plots;
        let index = plots.iter().position(|plot| plot.series.id() == id)?;
        let removed = plots.remove(index);
        self.graph_changed();
        Some(removed.series)
    }

    /// Remove all plots, invalidate the layout and redraw.
    pub fn clear_plots(&mut self) {
        debug!("plots cleared");
        self.viewport.content_mut().plots.clear();
        self.graph_changed();
    }

    /// The layout as of the last draw.
    pub fn layout(&self) -> Option<&GraphLayout> {
        self.content().layout()
    }

    /// Client pixels (origin bottom-left) to graph space.
    pub fn client_to_graph(&self, point: Vec2) -> Vec2 {
        let projection = self.viewport.projection();
        self.content()
            .current_layout(projection)
            .from_ndc(projection.client_to_world(point))
    }

    /// Set the X axis label formatter.
    pub fn set_x_formatter(&mut self, formatter: AxisFormatter) {
        self.viewport.content_mut().x_axis.set_formatter(formatter);
        self.viewport.refresh();
    }

    /// Set the Y axis label formatter.
    pub fn set_y_formatter(&mut self, formatter: AxisFormatter) {
        self.viewport.content_mut().y_axis.set_formatter(formatter);
        self.viewport.refresh();
    }

    /// Show `text` in the middle of the surface, or hide it with `None`.
    pub fn set_debug_text(&mut self, text: Option<String>) {
        self.viewport.content_mut().debug_text = text;
        self.viewport.refresh();
    }

    /// Replace the view transform and redraw.
    pub fn set_transform(&mut self, transform: ViewTransform) {
        self.viewport.set_transform(transform);
    }

    /// Render one frame.
    pub fn draw(&mut self) {
        self.viewport.draw();
    }

    /// Start receiving input events.
    pub fn attach(&mut self) {
        self.viewport.attach();
    }

    /// Stop receiving input events, aborting any active gesture.
    pub fn detach(&mut self) {
        self.viewport.detach();
    }

    /// Forward a pointer press to the viewport.
    pub fn on_pointer_down(&mut self, event: &PointerEvent) -> EventDisposition {
        self.viewport.on_pointer_down(event)
    }

    /// Forward pointer motion to the viewport.
    pub fn on_pointer_move(&mut self, event: &PointerEvent) -> EventDisposition {
        self.viewport.on_pointer_move(event)
    }

    /// Forward a pointer release to the viewport.
    pub fn on_pointer_up(&mut self, event: &PointerEvent) -> EventDisposition {
        self.viewport.on_pointer_up(event)
    }

    /// Forward a wheel step to the viewport.
    pub fn on_wheel(&mut self, event: &WheelEvent) -> EventDisposition {
        self.viewport.on_wheel(event)
    }

    fn graph_changed(&mut self) {
        self.viewport.content_mut().invalidate();
        self.viewport.refresh();
    }
}

/// Builder for configuring a graph before construction.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    config: GraphConfig,
    x_formatter: AxisFormatter,
    y_formatter: AxisFormatter,
    plots: Vec<Plot>,
}

impl GraphBuilder {
    /// Start building a graph with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the graph configuration.
    pub fn config(mut self, config: GraphConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the X axis label formatter.
    pub fn x_formatter(mut self, formatter: AxisFormatter) -> Self {
        self.x_formatter = formatter;
        self
    }

    /// Set the Y axis label formatter.
    pub fn y_formatter(mut self, formatter: AxisFormatter) -> Self {
        self.y_formatter = formatter;
        self
    }

    /// Add a series drawn with `style`.
    pub fn plot(mut self, series: Series, style: impl Into<PlotStyle>) -> Self {
        self.plots.push(Plot {
            series,
            style: style.into(),
        });
        self
    }

    /// Build the graph over `surface`. Nothing is drawn until the first
    /// [`Graph::draw`].
    pub fn build<S: Surface>(self, surface: S) -> Graph<S> {
        let mut graph = Graph::with_config(surface, self.config);
        let content = graph.viewport.content_mut();
        content.x_axis.set_formatter(self.x_formatter);
        content.y_axis.set_formatter(self.y_formatter);
        content.plots = self.plots;
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::Modifiers;
    use crate::render::{RecordingSurface, RenderCommand};
    use crate::style::{MarkerShape, MarkerStyle};

    fn graph() -> Graph<RecordingSurface> {
        let mut graph = Graph::new(RecordingSurface::new(800.0, 600.0));
        graph.attach();
        graph
    }

    fn tent() -> Series {
        Series::from_points("tent", [(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]).unwrap()
    }

    #[test]
    fn single_line_is_fully_contained() {
        let mut graph = graph();
        graph.add_series(tent());
        let layout = graph.layout().copied().unwrap();
        assert!(layout.lower_left.y <= 0.0);
        assert!(layout.upper_right.y >= 1.0);
        assert_eq!(layout.content_min, Vec2::ZERO);
        assert_eq!(layout.content_max, Vec2::new(2.0, 1.0));
    }

    #[test]
    fn clearing_restores_unit_box() {
        let mut graph = graph();
        let id = graph.add_series(tent());
        graph.clear_plots();
        let layout = graph.layout().copied().unwrap();
        assert_eq!(layout.content_min, Vec2::ZERO);
        assert_eq!(layout.content_max, Vec2::ONE);
        assert!(graph.content().plots().is_empty());
        assert!(graph.remove_plot(id).is_none());
    }

    #[test]
    fn layout_survives_pan_and_zoom() {
        let mut graph = graph();
        graph.add_series(tent());
        let before = graph.layout().copied();
        graph.on_pointer_down(&PointerEvent::new(400.0, 300.0, Modifiers::SHIFT));
        graph.on_pointer_move(&PointerEvent::new(420.0, 280.0, Modifiers::SHIFT));
        graph.on_pointer_up(&PointerEvent::new(420.0, 280.0, Modifiers::SHIFT));
        graph.on_wheel(&WheelEvent {
            delta: 3.0,
            modifiers: Modifiers::NONE,
        });
        assert_eq!(graph.layout().copied(), before);
        assert_ne!(graph.viewport().transform(), ViewTransform::IDENTITY);
    }

    #[test]
    fn resize_invalidates_layout() {
        let mut graph = graph();
        graph.add_series(tent());
        let before = graph.layout().copied();
        graph.viewport_mut().surface_mut().set_size(1000.0, 500.0);
        graph.draw();
        assert_ne!(graph.layout().copied(), before);
    }

    #[test]
    fn client_to_graph_inverts_layout() {
        let mut graph = graph();
        graph.add_series(tent());
        let corner = graph.client_to_graph(Vec2::new(45.0, 45.0));
        assert!(corner.approx_eq(Vec2::ZERO, 1e-9), "{corner:?}");
        let far = graph.client_to_graph(Vec2::new(795.0, 595.0));
        assert!(far.approx_eq(Vec2::new(2.0, 1.0), 1e-9), "{far:?}");
    }

    #[test]
    fn invalid_points_are_rejected_before_plotting() {
        let mut graph = graph();
        let err = graph
            .add_points("bad", [(0.0, 1.0), (f64::NAN, 2.0)], PlotStyle::default())
            .unwrap_err();
        assert_eq!(err, SeriesError::NonFinite { index: 1 });
        assert!(graph.content().plots().is_empty());
    }

    #[test]
    fn extending_a_series_relayouts() {
        let mut graph = graph();
        let id = graph.add_series(tent());
        assert_eq!(graph.extend_series(id, [(4.0, 3.0)]).unwrap(), Some(1));
        let layout = graph.layout().copied().unwrap();
        assert_eq!(layout.content_max, Vec2::new(4.0, 3.0));
    }

    #[test]
    fn rejected_extension_keeps_series_and_layout() {
        let mut graph = graph();
        let id = graph.add_points("one", [(0.0, 0.0)], PlotStyle::default()).unwrap();
        let before = graph.layout().copied();
        let err = graph
            .extend_series(id, [(1.0, 1.0), (50.0, 50.0), (f64::NAN, 0.0)])
            .unwrap_err();
        assert_eq!(err, SeriesError::NonFinite { index: 3 });
        let series = &graph.content().plots()[0].series;
        assert_eq!(series.len(), 1);
        assert_eq!(series.bounds(), Some((Vec2::ZERO, Vec2::ZERO)));
        assert_eq!(graph.layout().copied(), before);
    }

    #[test]
    fn frame_draws_axes_labels_and_plots() {
        let mut graph = GraphBuilder::default()
            .x_formatter(AxisFormatter::custom(|value, _, _| format!("x={value}")))
            .plot(tent(), PlotStyle::default())
            .plot(
                tent(),
                MarkerStyle {
                    shape: MarkerShape::Square,
                    ..MarkerStyle::default()
                },
            )
            .build(RecordingSurface::new(800.0, 600.0));
        graph.set_debug_text(Some("frame".to_string()));

        let commands = graph.viewport().surface().commands();
        match &commands[1] {
            RenderCommand::FillRect { color, .. } => {
                assert_eq!(*color, Color::rgb(0.8, 0.8, 0.8));
            }
            other => panic!("unexpected command {other:?}"),
        }
        let texts: Vec<&str> = commands
            .iter()
            .filter_map(|command| match command {
                RenderCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect();
        assert!(texts.contains(&"x=0"));
        assert!(texts.contains(&"x=2"));
        assert!(texts.contains(&"frame"));
        assert!(commands.iter().any(|c| matches!(c, RenderCommand::ClipRect(_))));
        let squares = commands
            .iter()
            .filter(|c| matches!(c, RenderCommand::FillRect { .. }))
            .count();
        // Background plus one square per point.
        assert_eq!(squares, 4);
        assert_eq!(graph.viewport().surface().save_depth(), 0);
    }

    #[test]
    fn debug_text_is_drawn_in_surface_pixels() {
        let mut graph = graph();
        graph.set_debug_text(Some("hello".to_string()));
        let position = graph
            .viewport()
            .surface()
            .commands()
            .iter()
            .find_map(|command| match command {
                RenderCommand::Text { text, position, .. } if text == "hello" => Some(*position),
                _ => None,
            })
            .unwrap();
        // Baseline at (410, 310); the box top sits one ascent above it.
        assert!((position.x - 410.0).abs() < 1e-3);
        assert!((position.y - (310.0 - 12.0 * 0.8)).abs() < 1e-3);
    }
}
