use std::sync::{Arc, RwLock};

use gpui::prelude::*;
use gpui::{
    MouseButton, MouseDownEvent, MouseMoveEvent, MouseUpEvent, Pixels, Point, ScrollWheelEvent,
    Window, canvas, div, point, px,
};
use tracing::trace;

use crate::geom::clamp;
use crate::interaction::{EventDisposition, Modifiers, PointerEvent, WheelEvent};
use crate::plot::{Graph, GraphContent};
use crate::render::{RecordingSurface, RenderList, Surface};
use crate::viewport::{Viewport, ViewportHooks};

use super::config::GpuiViewConfig;
use super::paint::paint_commands;
use super::text::GpuiTextMeasurer;

/// Something that owns a recording [`Viewport`] the GPUI view can drive.
pub trait ViewportHost: 'static {
    /// Content hooks of the hosted viewport.
    type Hooks: ViewportHooks;

    /// The hosted viewport.
    fn host_viewport(&self) -> &Viewport<RecordingSurface, Self::Hooks>;

    /// The hosted viewport, mutably.
    fn host_viewport_mut(&mut self) -> &mut Viewport<RecordingSurface, Self::Hooks>;
}

impl<H: ViewportHooks + 'static> ViewportHost for Viewport<RecordingSurface, H> {
    type Hooks = H;

    fn host_viewport(&self) -> &Viewport<RecordingSurface, H> {
        self
    }

    fn host_viewport_mut(&mut self) -> &mut Viewport<RecordingSurface, H> {
        self
    }
}

impl ViewportHost for Graph<RecordingSurface> {
    type Hooks = GraphContent;

    fn host_viewport(&self) -> &Viewport<RecordingSurface, GraphContent> {
        self.viewport()
    }

    fn host_viewport_mut(&mut self) -> &mut Viewport<RecordingSurface, GraphContent> {
        self.viewport_mut()
    }
}

/// A GPUI view around a [`Graph`].
pub type GpuiGraphView = GpuiViewportView<Graph<RecordingSurface>>;

#[derive(Debug, Clone, Copy)]
struct CanvasState {
    origin: Point<Pixels>,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            origin: point(px(0.0), px(0.0)),
        }
    }
}

/// A GPUI view that draws a hosted viewport and forwards pan/zoom input to it.
///
/// The host is attached on construction. Dropping the view does not detach
/// it; call [`ViewHandle::write`] with
/// [`Viewport::detach`] if the host outlives the view.
pub struct GpuiViewportView<T: ViewportHost> {
    host: Arc<RwLock<T>>,
    canvas: Arc<RwLock<CanvasState>>,
    config: GpuiViewConfig,
}

impl<T: ViewportHost> GpuiViewportView<T> {
    /// Create a view with the default [`GpuiViewConfig`].
    pub fn new(host: T) -> Self {
        Self::with_config(host, GpuiViewConfig::default())
    }

    /// Create a view with a custom configuration.
    pub fn with_config(mut host: T, config: GpuiViewConfig) -> Self {
        host.host_viewport_mut().attach();
        Self {
            host: Arc::new(RwLock::new(host)),
            canvas: Arc::new(RwLock::new(CanvasState::default())),
            config,
        }
    }

    /// Get a handle for mutating the hosted viewport or graph.
    pub fn handle(&self) -> ViewHandle<T> {
        ViewHandle {
            host: Arc::clone(&self.host),
        }
    }

    fn pointer_event(&self, position: Point<Pixels>, modifiers: &gpui::Modifiers) -> PointerEvent {
        let origin = self
            .canvas
            .read()
            .map(|canvas| canvas.origin)
            .unwrap_or_else(|_| point(px(0.0), px(0.0)));
        PointerEvent::new(
            f64::from(f32::from(position.x - origin.x)),
            f64::from(f32::from(position.y - origin.y)),
            map_modifiers(modifiers),
        )
    }

    fn dispatch(
        &mut self,
        cx: &mut Context<Self>,
        f: impl FnOnce(&mut Viewport<RecordingSurface, T::Hooks>) -> EventDisposition,
    ) {
        let Ok(mut host) = self.host.write() else {
            return;
        };
        let (disposition, changed) = dispatch_event(host.host_viewport_mut(), f);
        if disposition.prevent_default() {
            cx.stop_propagation();
        }
        if changed {
            cx.notify();
        }
    }

    fn on_mouse_down(&mut self, ev: &MouseDownEvent, cx: &mut Context<Self>) {
        let event = self.pointer_event(ev.position, &ev.modifiers);
        self.dispatch(cx, |viewport| viewport.on_pointer_down(&event));
    }

    fn on_mouse_move(&mut self, ev: &MouseMoveEvent, cx: &mut Context<Self>) {
        let event = self.pointer_event(ev.position, &ev.modifiers);
        self.dispatch(cx, |viewport| viewport.on_pointer_move(&event));
    }

    fn on_mouse_up(&mut self, ev: &MouseUpEvent, cx: &mut Context<Self>) {
        let event = self.pointer_event(ev.position, &ev.modifiers);
        self.dispatch(cx, |viewport| viewport.on_pointer_up(&event));
    }

    fn on_scroll(&mut self, ev: &ScrollWheelEvent, cx: &mut Context<Self>) {
        let line_height = self.config.wheel_line_height_px;
        let delta = ev.delta.pixel_delta(px(line_height));
        // Scrolling away from the user zooms in.
        let max_notches = self.config.max_wheel_notches;
        let notches = clamp(
            f64::from(f32::from(delta.y) / line_height),
            -max_notches,
            max_notches,
        );
        if notches.abs() < 0.01 {
            return;
        }
        trace!(notches, "wheel");
        let event = WheelEvent {
            delta: notches,
            modifiers: map_modifiers(&ev.modifiers),
        };
        self.dispatch(cx, |viewport| viewport.on_wheel(&event));
    }
}

impl<T: ViewportHost> Render for GpuiViewportView<T> {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let host = Arc::clone(&self.host);
        let canvas_state = Arc::clone(&self.canvas);
        let config = self.config.clone();
        let paint_config = self.config.clone();

        div()
            .size_full()
            .child(
                canvas(
                    move |bounds, window, _| {
                        if let Ok(mut canvas_state) = canvas_state.write() {
                            canvas_state.origin = bounds.origin;
                        }
                        let Ok(mut host) = host.write() else {
                            return RenderList::new();
                        };
                        let viewport = host.host_viewport_mut();
                        let surface = viewport.surface_mut();
                        surface.set_size(
                            f64::from(f32::from(bounds.size.width)),
                            f64::from(f32::from(bounds.size.height)),
                        );
                        surface.set_font_size(config.font_size);
                        surface.set_measurer(Some(Box::new(GpuiTextMeasurer::new(
                            window.text_system().clone(),
                        ))));
                        viewport.draw();
                        viewport.surface_mut().take_commands()
                    },
                    move |bounds, commands, window, cx| {
                        paint_commands(&commands, bounds.origin, &paint_config, window, cx);
                    },
                )
                .size_full(),
            )
            .on_mouse_down(
                MouseButton::Left,
                cx.listener(|this, ev, _, cx| {
                    this.on_mouse_down(ev, cx);
                }),
            )
            .on_mouse_move(cx.listener(|this, ev, _, cx| {
                this.on_mouse_move(ev, cx);
            }))
            .on_mouse_up(
                MouseButton::Left,
                cx.listener(|this, ev, _, cx| {
                    this.on_mouse_up(ev, cx);
                }),
            )
            .on_mouse_up_out(
                MouseButton::Left,
                cx.listener(|this, ev, _, cx| {
                    this.on_mouse_up(ev, cx);
                }),
            )
            .on_scroll_wheel(cx.listener(|this, ev, _, cx| {
                this.on_scroll(ev, cx);
            }))
    }
}

/// A handle for mutating the host held inside a [`GpuiViewportView`].
///
/// The handle clones cheaply. Returns `None` if the host lock is poisoned.
pub struct ViewHandle<T> {
    host: Arc<RwLock<T>>,
}

impl<T> Clone for ViewHandle<T> {
    fn clone(&self) -> Self {
        Self {
            host: Arc::clone(&self.host),
        }
    }
}

impl<T> ViewHandle<T> {
    /// Read the host state.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> Option<R> {
        let host = self.host.read().ok()?;
        Some(f(&host))
    }

    /// Mutate the host state.
    pub fn write<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut host = self.host.write().ok()?;
        Some(f(&mut host))
    }
}

/// Run one event handler, reporting whether it moved the view.
fn dispatch_event<S: Surface, H: ViewportHooks>(
    viewport: &mut Viewport<S, H>,
    f: impl FnOnce(&mut Viewport<S, H>) -> EventDisposition,
) -> (EventDisposition, bool) {
    let before = viewport.transform();
    let disposition = f(viewport);
    (disposition, viewport.transform() != before)
}

fn map_modifiers(modifiers: &gpui::Modifiers) -> Modifiers {
    Modifiers {
        shift: modifiers.shift,
        alt: modifiers.alt,
        meta: modifiers.platform,
        ctrl: modifiers.control,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> Graph<RecordingSurface> {
        let mut graph = Graph::new(RecordingSurface::new(800.0, 600.0));
        graph.attach();
        graph
    }

    #[test]
    fn hover_without_gesture_needs_no_redraw() {
        let mut graph = graph();
        let hover = PointerEvent::new(200.0, 100.0, Modifiers::NONE);
        let (disposition, changed) =
            dispatch_event(graph.viewport_mut(), |viewport| viewport.on_pointer_move(&hover));
        assert_eq!(disposition, EventDisposition::Consumed);
        assert!(!changed);
    }

    #[test]
    fn drag_and_wheel_request_redraw() {
        let mut graph = graph();
        let press = PointerEvent::new(400.0, 300.0, Modifiers::SHIFT);
        let (_, changed) =
            dispatch_event(graph.viewport_mut(), |viewport| viewport.on_pointer_down(&press));
        assert!(!changed);
        let drag = PointerEvent::new(450.0, 300.0, Modifiers::SHIFT);
        let (_, changed) =
            dispatch_event(graph.viewport_mut(), |viewport| viewport.on_pointer_move(&drag));
        assert!(changed);

        let wheel = WheelEvent {
            delta: 1.0,
            modifiers: Modifiers::NONE,
        };
        graph.on_pointer_up(&drag);
        let (_, changed) =
            dispatch_event(graph.viewport_mut(), |viewport| viewport.on_wheel(&wheel));
        assert!(changed);
    }
}
