use gpui::{AppContext, Application, Bounds, WindowBounds, WindowOptions, px, size};

use view2d_graph::gpui_backend::GpuiGraphView;
use view2d_graph::{
    AxisFormatter, Color, GraphBuilder, LineStyle, MarkerShape, MarkerStyle, Range,
    RecordingSurface, Series,
};

fn main() {
    Application::new().run(|cx| {
        let options = WindowOptions {
            window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
                None,
                size(px(720.0), px(480.0)),
                cx,
            ))),
            ..Default::default()
        };

        cx.open_window(options, |_window, cx| {
            let wave = Series::from_fn("sin", f64::sin, Range::new(0.0, 12.0), 400).unwrap();
            let samples = Series::from_y("samples", [0.2, 0.9, -0.4, 0.6, -0.8, 0.1]).unwrap();

            let graph = GraphBuilder::new()
                .y_formatter(AxisFormatter::custom(|value, _, digits| {
                    format!("{value:.digits$}")
                }))
                .plot(wave, LineStyle::new(Color::new(0.2, 0.45, 0.85, 1.0), 2.0))
                .plot(
                    samples,
                    MarkerStyle {
                        color: Color::new(0.85, 0.3, 0.2, 1.0),
                        size: 6.0,
                        shape: MarkerShape::Square,
                    },
                )
                .build(RecordingSurface::new(720.0, 480.0));

            cx.new(|_| GpuiGraphView::new(graph))
        })
        .unwrap();
    });
}
