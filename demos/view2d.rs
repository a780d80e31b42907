use std::f64::consts::TAU;

use gpui::{AppContext, Application, Bounds, WindowBounds, WindowOptions, px, size};

use view2d_graph::gpui_backend::GpuiViewportView;
use view2d_graph::{Color, Projection, RecordingSurface, Surface, Vec2, Viewport, ViewportHooks};

/// Unit square outline with a filled rectangle and circle inside.
struct TestPattern;

impl ViewportHooks for TestPattern {
    fn on_draw(&self, projection: &Projection, surface: &mut dyn Surface) {
        surface.set_line_width(projection.pixel_size().mean());
        surface.set_stroke_color(Color::BLACK);
        surface.stroke_rect(Vec2::splat(-1.0), Vec2::splat(2.0));

        surface.set_fill_color(Color::rgb(1.0, 0.0, 0.0));
        surface.fill_rect(Vec2::new(-0.75, -0.5), Vec2::new(0.5, 1.0));

        surface.set_fill_color(Color::rgb(0.0, 0.0, 1.0));
        surface.begin_path();
        surface.arc(Vec2::new(0.4, 0.0), 0.3, 0.0, TAU);
        surface.close_path();
        surface.fill();
    }
}

fn main() {
    Application::new().run(|cx| {
        let options = WindowOptions {
            window_bounds: Some(WindowBounds::Windowed(Bounds::centered(
                None,
                size(px(640.0), px(480.0)),
                cx,
            ))),
            ..Default::default()
        };

        cx.open_window(options, |_window, cx| {
            let viewport = Viewport::new(RecordingSurface::new(640.0, 480.0), TestPattern);
            cx.new(|_| GpuiViewportView::new(viewport))
        })
        .unwrap();
    });
}
