//! view2d_graph is an interactive 2D viewport with an auto-fitting graph on top.
//! Drawing goes through the [`Surface`] trait so the core stays backend-agnostic;
//! the optional `gpui` feature provides a GPUI view.

#![forbid(unsafe_code)]

pub mod axis;
pub mod geom;
pub mod interaction;
pub mod layout;
pub mod plot;
pub mod render;
pub mod series;
pub mod style;
pub mod transform;
pub mod view;
pub mod viewport;

#[cfg(feature = "gpui")]
pub mod gpui_backend;

pub use axis::{AxisDirection, AxisFormatter, AxisRenderer, TickSpec, select_ticks};
pub use geom::{ScreenPoint, ScreenRect, Vec2, Vec3};
pub use interaction::{
    EventDisposition, Gesture, GestureMode, Modifiers, PointerEvent, WheelEvent, WheelZoom,
};
pub use layout::{GraphLayout, LayoutMargins};
pub use plot::{Graph, GraphBuilder, GraphConfig, GraphContent, Plot};
pub use render::{
    Color, LineSegment, RecordingSurface, RenderCommand, RenderList, Stroke, Surface,
    SurfaceGuard, TextMeasurer,
};
pub use series::{Series, SeriesError, SeriesId};
pub use style::{LineStyle, MarkerShape, MarkerStyle, PlotStyle};
pub use transform::Projection;
pub use view::{Range, ViewTransform};
pub use viewport::{MinimapCorner, MinimapLayout, Viewport, ViewportConfig, ViewportHooks};
