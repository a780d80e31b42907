//! Interactive pan/zoom viewport.
//!
//! A [`Viewport`] owns its drawing surface, the live [`ViewTransform`], the
//! active [`Gesture`] and a content implementation of [`ViewportHooks`].
//! Every input event that changes the transform triggers one synchronous
//! redraw through [`Viewport::draw`].

use tracing::{debug, trace};

use crate::geom::Vec2;
use crate::interaction::{
    EventDisposition, Gesture, GestureMode, PointerEvent, WheelEvent, WheelZoom,
};
use crate::render::{Color, Surface, SurfaceGuard};
use crate::transform::Projection;
use crate::view::ViewTransform;

/// Content callbacks invoked by a [`Viewport`] during its render loop.
///
/// Drawing hooks receive the surface already set up for world space.
pub trait ViewportHooks {
    /// Called when the surface size changed, before the frame is drawn.
    fn on_size_change(&mut self, _projection: &Projection) {}

    /// Called at the start of every frame.
    fn on_draw_start(&mut self, _projection: &Projection) {}

    /// Draw the main view content in world space.
    fn on_draw(&self, projection: &Projection, surface: &mut dyn Surface);

    /// Draw the minimap content. Defaults to the main view content.
    fn on_draw_preview(&self, projection: &Projection, surface: &mut dyn Surface) {
        self.on_draw(projection, surface);
    }
}

/// Corner of the surface the minimap is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MinimapCorner {
    /// Top-left corner.
    TopLeft,
    /// Top-right corner.
    TopRight,
    /// Bottom-left corner.
    BottomLeft,
    /// Bottom-right corner.
    #[default]
    BottomRight,
}

/// Configuration for a [`Viewport`].
#[derive(Debug, Clone)]
pub struct ViewportConfig {
    /// Background color the surface is cleared to every frame.
    pub clear_color: Color,
    /// Draw the minimap overlay.
    pub show_minimap: bool,
    /// Minimap inset size in pixels.
    pub minimap_size: Vec2,
    /// Distance between the minimap and the surface edges, in pixels.
    pub minimap_margin: f64,
    /// Corner the minimap is anchored to.
    pub minimap_corner: MinimapCorner,
    /// Backing panel color behind the minimap.
    pub minimap_panel_color: Color,
    /// Stroke color of the current-view indicator.
    pub minimap_indicator_color: Color,
    /// Mouse wheel zoom parameters.
    pub wheel: WheelZoom,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            clear_color: Color::WHITE,
            show_minimap: true,
            minimap_size: Vec2::new(60.0, 60.0),
            minimap_margin: 5.0,
            minimap_corner: MinimapCorner::default(),
            minimap_panel_color: Color::from_rgb8(128, 128, 128, 0.5),
            minimap_indicator_color: Color::from_rgb8(128, 128, 128, 1.0),
            wheel: WheelZoom::default(),
        }
    }
}

/// Minimap placement in window pixels (origin bottom-left).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimapLayout {
    /// Lower-left corner of the inset.
    pub position: Vec2,
    /// Size of the inset.
    pub size: Vec2,
    /// Lower-left corner of the aspect-corrected content area.
    pub content_position: Vec2,
    /// Size of the aspect-corrected content area.
    pub content_size: Vec2,
}

impl MinimapLayout {
    fn new(config: &ViewportConfig, projection: &Projection) -> Self {
        let surface = projection.size();
        let size = config.minimap_size;
        let margin = config.minimap_margin;
        let x = match config.minimap_corner {
            MinimapCorner::TopLeft | MinimapCorner::BottomLeft => margin,
            MinimapCorner::TopRight | MinimapCorner::BottomRight => surface.x - size.x - margin,
        };
        let y = match config.minimap_corner {
            MinimapCorner::BottomLeft | MinimapCorner::BottomRight => margin,
            MinimapCorner::TopLeft | MinimapCorner::TopRight => surface.y - size.y - margin,
        };
        let position = Vec2::new(x, y);

        let mut content_size = size;
        if projection.aspect() > 1.0 {
            content_size.y /= projection.aspect();
        } else {
            content_size.x *= projection.aspect();
        }
        let content_position = position + (size - content_size) * 0.5;

        Self {
            position,
            size,
            content_position,
            content_size,
        }
    }

    /// Current-view indicator corners in window pixels.
    ///
    /// The visible world rectangle is mapped into the content area, rounded
    /// outward (floor / ceil) and clamped to the inset bounds.
    pub fn indicator(&self, projection: &Projection) -> (Vec2, Vec2) {
        let (ll, ur) = projection.visible_world_rect();
        let ll = projection
            .world_to_preview(ll, self.content_position, self.content_size)
            .floor();
        let ur = projection
            .world_to_preview(ur, self.content_position, self.content_size)
            .ceil();
        let upper = self.position + self.size;
        (ll.clamp(self.position, upper), ur.clamp(self.position, upper))
    }
}

/// A pan/zoom viewport over a drawing surface.
pub struct Viewport<S, H> {
    surface: S,
    content: H,
    config: ViewportConfig,
    projection: Projection,
    gesture: Option<Gesture>,
    attached: bool,
}

impl<S: Surface, H: ViewportHooks> Viewport<S, H> {
    /// Create a detached viewport drawing `content` onto `surface`.
    pub fn new(surface: S, content: H) -> Self {
        Self::with_config(surface, content, ViewportConfig::default())
    }

    /// Create a detached viewport with a custom configuration.
    pub fn with_config(surface: S, content: H, config: ViewportConfig) -> Self {
        Self {
            surface,
            content,
            config,
            projection: Projection::default(),
            gesture: None,
            attached: false,
        }
    }

    /// Start receiving input events.
    pub fn attach(&mut self) {
        if !self.attached {
            debug!("viewport attached");
        }
        self.attached = true;
    }

    /// Stop receiving input events, aborting any active gesture.
    pub fn detach(&mut self) {
        self.abort_gesture();
        if self.attached {
            debug!("viewport detached");
        }
        self.attached = false;
    }

    /// Whether input handlers currently act on events.
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Access the configuration.
    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// Access the configuration mutably. Takes effect on the next draw.
    pub fn config_mut(&mut self) -> &mut ViewportConfig {
        &mut self.config
    }

    /// Access the content hooks.
    pub fn content(&self) -> &H {
        &self.content
    }

    /// Access the content hooks mutably.
    pub fn content_mut(&mut self) -> &mut H {
        &mut self.content
    }

    /// Access the drawing surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Access the drawing surface mutably.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Size, aspect and transform as of the last draw.
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// The live view transform.
    pub fn transform(&self) -> ViewTransform {
        self.projection.transform()
    }

    /// The active gesture, if any.
    pub fn gesture(&self) -> Option<&Gesture> {
        self.gesture.as_ref()
    }

    /// Replace the view transform and redraw.
    pub fn set_transform(&mut self, transform: ViewTransform) {
        self.projection = self.projection.with_transform(transform);
        self.refresh();
    }

    /// Redraw synchronously.
    pub fn refresh(&mut self) {
        self.draw();
    }

    /// World-space extent of one client pixel.
    pub fn pixel_size(&self) -> Vec2 {
        self.projection.pixel_size()
    }

    /// Client pixels (origin bottom-left) to NDC.
    pub fn client_to_ndc(&self, point: Vec2) -> Vec2 {
        self.projection.client_to_ndc(point)
    }

    /// Client pixels (origin bottom-left) to world space.
    pub fn client_to_world(&self, point: Vec2) -> Vec2 {
        self.projection.client_to_world(point)
    }

    /// World space to client pixels (origin bottom-left).
    pub fn world_to_client(&self, point: Vec2) -> Vec2 {
        self.projection.world_to_client(point)
    }

    /// World space to pixels of a minimap drawn at `pos` with `size`.
    pub fn world_to_preview(&self, point: Vec2, pos: Vec2, size: Vec2) -> Vec2 {
        self.projection.world_to_preview(point, pos, size)
    }

    /// World coordinates of the visible client rectangle.
    pub fn visible_world_rect(&self) -> (Vec2, Vec2) {
        self.projection.visible_world_rect()
    }

    /// Minimap placement for the current surface size.
    pub fn minimap_layout(&self) -> MinimapLayout {
        MinimapLayout::new(&self.config, &self.projection)
    }

    /// Render one frame.
    pub fn draw(&mut self) {
        self.surface.begin_frame();
        let size = self.surface.size();
        if size != self.projection.size() {
            debug!(width = size.x, height = size.y, "viewport size changed");
            self.projection = self.projection.with_size(size);
            self.content.on_size_change(&self.projection);
        }
        self.content.on_draw_start(&self.projection);

        let projection = self.projection;
        trace!(transform = ?projection.transform(), "viewport draw");

        let mut frame = SurfaceGuard::new(&mut self.surface);
        {
            let mut view = SurfaceGuard::new(&mut *frame);
            projection.apply_window_matrix(&mut *view);
            view.clear_rect(Vec2::ZERO, size);
            view.set_fill_color(self.config.clear_color);
            view.fill_rect(Vec2::ZERO, size);

            projection.apply_view_matrix(&mut *view);
            self.content.on_draw(&projection, &mut *view);
        }

        if self.config.show_minimap {
            draw_minimap(&self.config, &self.content, &projection, &mut *frame);
        }
    }

    /// Handle a pointer press. Aborts the active gesture, then starts a pan
    /// (shift) or zoom (alt / meta) gesture.
    pub fn on_pointer_down(&mut self, event: &PointerEvent) -> EventDisposition {
        if !self.attached {
            return EventDisposition::Ignored;
        }
        if self.abort_gesture() {
            self.refresh();
        }
        if let Some(mode) = GestureMode::from_modifiers(event.modifiers) {
            let start = self.flip(event.position);
            debug!(?mode, x = start.x, y = start.y, "gesture started");
            self.gesture = Some(Gesture::begin(mode, start, self.transform()));
        }
        EventDisposition::Consumed
    }

    /// Handle pointer motion, updating the active gesture.
    pub fn on_pointer_move(&mut self, event: &PointerEvent) -> EventDisposition {
        if !self.attached {
            return EventDisposition::Ignored;
        }
        if let Some(gesture) = self.gesture {
            let target = gesture.target(&self.projection, self.flip(event.position));
            self.set_transform(target);
        }
        EventDisposition::Consumed
    }

    /// Handle a pointer release, committing the active gesture.
    pub fn on_pointer_up(&mut self, event: &PointerEvent) -> EventDisposition {
        if !self.attached {
            return EventDisposition::Ignored;
        }
        if let Some(gesture) = self.gesture.take() {
            let target = gesture.target(&self.projection, self.flip(event.position));
            debug!(mode = ?gesture.mode(), "gesture committed");
            self.set_transform(target);
        }
        EventDisposition::Consumed
    }

    /// Handle a wheel step. Ignored while a gesture is active.
    pub fn on_wheel(&mut self, event: &WheelEvent) -> EventDisposition {
        if !self.attached {
            return EventDisposition::Ignored;
        }
        if self.gesture.is_none() {
            let target = self.config.wheel.apply(self.transform(), event);
            self.set_transform(target);
        }
        EventDisposition::Consumed
    }

    /// Revert to the active gesture's captured transform. Returns whether a
    /// gesture was active.
    fn abort_gesture(&mut self) -> bool {
        let Some(gesture) = self.gesture.take() else {
            return false;
        };
        debug!(mode = ?gesture.mode(), "gesture aborted");
        self.projection = self.projection.with_transform(gesture.captured());
        true
    }

    /// Client position (origin top-left) to client pixels with y up.
    fn flip(&self, position: Vec2) -> Vec2 {
        Vec2::new(position.x, self.projection.size().y - 1.0 - position.y)
    }
}

fn draw_minimap<H: ViewportHooks>(
    config: &ViewportConfig,
    content: &H,
    projection: &Projection,
    surface: &mut dyn Surface,
) {
    let layout = MinimapLayout::new(config, projection);
    let mut window = SurfaceGuard::new(surface);
    projection.apply_window_matrix(&mut *window);

    let panel_origin = layout.position - 1.0;
    let panel_size = layout.size + 2.0;
    window.set_fill_color(config.minimap_panel_color);
    window.fill_rect(panel_origin, panel_size);
    window.set_line_width(1.0);
    window.set_stroke_color(Color::BLACK);
    window.stroke_rect(panel_origin, panel_size);

    {
        let mut preview = SurfaceGuard::new(&mut *window);
        preview.begin_path();
        preview.rect(layout.content_position, layout.content_size);
        preview.clip();
        preview.begin_path();
        projection.apply_preview_matrix(
            &mut *preview,
            layout.content_position,
            layout.content_size,
        );
        content.on_draw_preview(projection, &mut *preview);
    }

    let (ll, ur) = layout.indicator(projection);
    window.set_stroke_color(config.minimap_indicator_color);
    window.set_line_width(1.0);
    window.stroke_rect(ll, ur - ll);
}

impl<S, H> std::fmt::Debug for Viewport<S, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewport")
            .field("projection", &self.projection)
            .field("gesture", &self.gesture)
            .field("attached", &self.attached)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::interaction::Modifiers;
    use crate::render::{RecordingSurface, RenderCommand};

    #[derive(Default)]
    struct Probe {
        size_changes: usize,
        draw_starts: usize,
        draws: Cell<usize>,
        previews: Cell<usize>,
    }

    impl ViewportHooks for Probe {
        fn on_size_change(&mut self, _projection: &Projection) {
            self.size_changes += 1;
        }

        fn on_draw_start(&mut self, _projection: &Projection) {
            self.draw_starts += 1;
        }

        fn on_draw(&self, _projection: &Projection, surface: &mut dyn Surface) {
            self.draws.set(self.draws.get() + 1);
            surface.set_fill_color(Color::rgb(0.0, 0.0, 0.8));
            surface.fill_rect(Vec2::new(-0.5, -0.5), Vec2::ONE);
        }

        fn on_draw_preview(&self, projection: &Projection, surface: &mut dyn Surface) {
            self.previews.set(self.previews.get() + 1);
            self.on_draw(projection, surface);
        }
    }

    fn viewport() -> Viewport<RecordingSurface, Probe> {
        let mut viewport = Viewport::new(RecordingSurface::new(800.0, 600.0), Probe::default());
        viewport.attach();
        viewport.draw();
        viewport
    }

    fn press(x: f64, y: f64, modifiers: Modifiers) -> PointerEvent {
        PointerEvent::new(x, y, modifiers)
    }

    #[test]
    fn draw_runs_hooks_in_order() {
        let mut viewport = viewport();
        assert_eq!(viewport.content().size_changes, 1);
        assert_eq!(viewport.content().draw_starts, 1);
        assert_eq!(viewport.content().draws.get(), 2);
        assert_eq!(viewport.content().previews.get(), 1);
        assert_eq!(viewport.surface().save_depth(), 0);

        viewport.refresh();
        assert_eq!(viewport.content().size_changes, 1);
        assert_eq!(viewport.content().draw_starts, 2);

        viewport.surface_mut().set_size(400.0, 400.0);
        viewport.refresh();
        assert_eq!(viewport.content().size_changes, 2);
        assert_eq!(viewport.projection().aspect(), 1.0);
    }

    #[test]
    fn frame_starts_with_clear_and_background() {
        let mut viewport = viewport();
        viewport.config_mut().show_minimap = false;
        viewport.draw();
        let commands = viewport.surface().commands();
        assert!(matches!(commands[0], RenderCommand::Clear(_)));
        match &commands[1] {
            RenderCommand::FillRect { color, .. } => assert_eq!(*color, Color::WHITE),
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(viewport.content().previews.get(), 1);
    }

    #[test]
    fn each_draw_replaces_the_previous_frame() {
        let mut viewport = viewport();
        let frame_len = viewport.surface().commands().len();
        assert!(frame_len > 0);
        for _ in 0..5 {
            viewport.refresh();
        }
        let wheel = WheelEvent {
            delta: 1.0,
            modifiers: Modifiers::NONE,
        };
        for _ in 0..20 {
            viewport.on_wheel(&wheel);
        }
        assert_eq!(viewport.surface().commands().len(), frame_len);
    }

    #[test]
    fn pan_gesture_commits_on_release() {
        let mut viewport = viewport();
        viewport.on_pointer_down(&press(400.0, 300.0, Modifiers::SHIFT));
        assert_eq!(viewport.gesture().map(Gesture::mode), Some(GestureMode::Pan));
        viewport.on_pointer_move(&press(440.0, 300.0, Modifiers::SHIFT));
        viewport.on_pointer_up(&press(480.0, 240.0, Modifiers::NONE));
        assert!(viewport.gesture().is_none());
        // Moving the pointer up on screen pans the view up (y flipped).
        assert!(viewport.transform().translation().approx_eq(Vec2::new(0.2, 0.2), 1e-12));
    }

    #[test]
    fn plain_press_starts_nothing() {
        let mut viewport = viewport();
        let disposition = viewport.on_pointer_down(&press(10.0, 10.0, Modifiers::NONE));
        assert!(disposition.prevent_default());
        assert!(viewport.gesture().is_none());
        viewport.on_pointer_move(&press(200.0, 200.0, Modifiers::NONE));
        assert_eq!(viewport.transform(), ViewTransform::IDENTITY);
    }

    #[test]
    fn new_gesture_aborts_active_one() {
        let mut viewport = viewport();
        let before = ViewTransform::new(Vec2::new(0.1, -0.1), Vec2::new(2.0, 2.0));
        viewport.set_transform(before);

        viewport.on_pointer_down(&press(100.0, 100.0, Modifiers::SHIFT));
        viewport.on_pointer_move(&press(300.0, 50.0, Modifiers::SHIFT));
        assert_ne!(viewport.transform(), before);

        viewport.on_pointer_down(&press(500.0, 500.0, Modifiers::ALT));
        assert_eq!(viewport.transform(), before);
        assert_eq!(viewport.gesture().map(Gesture::captured), Some(before));
    }

    #[test]
    fn wheel_is_ignored_during_gesture() {
        let mut viewport = viewport();
        let wheel = WheelEvent {
            delta: 1.0,
            modifiers: Modifiers::NONE,
        };
        viewport.on_wheel(&wheel);
        assert!(viewport.transform().scale().approx_eq(Vec2::splat(1.03), 1e-12));

        viewport.on_pointer_down(&press(10.0, 10.0, Modifiers::ALT));
        let during = viewport.transform();
        viewport.on_wheel(&wheel);
        assert_eq!(viewport.transform(), during);
    }

    #[test]
    fn detach_aborts_and_ignores_events() {
        let mut viewport = viewport();
        viewport.on_pointer_down(&press(100.0, 100.0, Modifiers::SHIFT));
        viewport.on_pointer_move(&press(300.0, 300.0, Modifiers::SHIFT));
        viewport.detach();
        assert!(!viewport.is_attached());
        assert!(viewport.gesture().is_none());
        assert_eq!(viewport.transform(), ViewTransform::IDENTITY);

        let disposition = viewport.on_pointer_down(&press(100.0, 100.0, Modifiers::SHIFT));
        assert_eq!(disposition, EventDisposition::Ignored);
        assert!(viewport.gesture().is_none());

        viewport.attach();
        let disposition = viewport.on_pointer_down(&press(100.0, 100.0, Modifiers::SHIFT));
        assert_eq!(disposition, EventDisposition::Consumed);
        assert!(viewport.gesture().is_some());
    }

    #[test]
    fn minimap_defaults_to_bottom_right() {
        let viewport = viewport();
        let layout = viewport.minimap_layout();
        assert_eq!(layout.position, Vec2::new(735.0, 5.0));
        assert_eq!(layout.size, Vec2::new(60.0, 60.0));
        assert!(layout.content_size.approx_eq(Vec2::new(60.0, 45.0), 1e-12));
        assert!(layout.content_position.approx_eq(Vec2::new(735.0, 12.5), 1e-12));
    }

    #[test]
    fn minimap_indicator_is_clamped_to_inset() {
        let mut viewport = viewport();
        for transform in [
            ViewTransform::IDENTITY,
            ViewTransform::new(Vec2::new(3.0, -2.0), Vec2::splat(0.05)),
            ViewTransform::new(Vec2::new(-0.4, 0.9), Vec2::splat(40.0)),
        ] {
            viewport.set_transform(transform);
            let layout = viewport.minimap_layout();
            let (ll, ur) = layout.indicator(viewport.projection());
            let upper = layout.position + layout.size;
            for corner in [ll, ur] {
                assert!(corner.x >= layout.position.x && corner.x <= upper.x);
                assert!(corner.y >= layout.position.y && corner.y <= upper.y);
            }
            assert_eq!(ll, ll.floor());
            assert_eq!(ur, ur.ceil());
        }
    }

    #[test]
    fn zoomed_out_indicator_covers_whole_inset() {
        let mut viewport = viewport();
        viewport.set_transform(ViewTransform::new(Vec2::ZERO, Vec2::splat(0.1)));
        let layout = viewport.minimap_layout();
        let (ll, ur) = layout.indicator(viewport.projection());
        assert_eq!(ll, layout.position);
        assert_eq!(ur, layout.position + layout.size);
    }

    #[test]
    fn content_clip_is_closed_after_draw() {
        struct Clipping;

        impl ViewportHooks for Clipping {
            fn on_draw(&self, _projection: &Projection, surface: &mut dyn Surface) {
                surface.scale(Vec2::new(3.0, 3.0));
                surface.begin_path();
                surface.rect(Vec2::new(-0.5, -0.5), Vec2::ONE);
                surface.clip();
            }
        }

        let mut viewport = Viewport::new(RecordingSurface::new(200.0, 100.0), Clipping);
        viewport.draw();
        let surface = viewport.surface();
        assert_eq!(surface.save_depth(), 0);
        let count = |wanted: fn(&RenderCommand) -> bool| {
            surface.commands().iter().filter(|c| wanted(c)).count()
        };
        let opened = count(|c| matches!(c, RenderCommand::ClipRect(_)));
        let closed = count(|c| matches!(c, RenderCommand::ClipEnd));
        // Main view, minimap inset and the content clip inside the minimap.
        assert_eq!(opened, 3);
        assert_eq!(opened, closed);
    }
}
