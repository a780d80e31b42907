//! GPUI integration for view2d_graph.
//!
//! The view records each frame through a [`RecordingSurface`](crate::render::RecordingSurface)
//! and replays the device-space commands with GPUI paint calls. Mouse and
//! wheel input is forwarded to the wrapped [`Viewport`](crate::viewport::Viewport).

mod config;
mod paint;
mod text;
mod view;

pub use config::GpuiViewConfig;
pub use view::{GpuiGraphView, GpuiViewportView, ViewHandle, ViewportHost};
