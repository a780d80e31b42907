//! Pointer input types and the pan/zoom gesture state machine.
//!
//! A [`Gesture`] lives from pointer-down to pointer-up. It captures the view
//! transform at its start and computes every update from that snapshot, so an
//! aborted gesture can restore the exact starting transform and gestures never
//! compose with one another.

use crate::geom::Vec2;
use crate::transform::Projection;
use crate::view::ViewTransform;

/// Wheel zoom step per unit of wheel delta.
pub const WHEEL_ZOOM_STEP: f64 = 0.03;
/// Extra factor applied to wheel deltas while shift is held.
pub const FINE_WHEEL_FACTOR: f64 = 0.1;
/// Smallest zoom factor a single wheel event can apply.
pub const MIN_WHEEL_FACTOR: f64 = 0.1;

/// Keyboard modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
}

impl Modifiers {
    /// No modifiers held.
    pub const NONE: Self = Self {
        shift: false,
        alt: false,
        meta: false,
        ctrl: false,
    };

    /// Only shift held.
    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    /// Only alt held.
    pub const ALT: Self = Self {
        alt: true,
        ..Self::NONE
    };
}

/// A pointer event in client pixels (origin top-left, y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Position relative to the top-left corner of the surface.
    pub position: Vec2,
    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Create a pointer event.
    pub fn new(x: f64, y: f64, modifiers: Modifiers) -> Self {
        Self {
            position: Vec2::new(x, y),
            modifiers,
        }
    }
}

/// A mouse wheel event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    /// Signed wheel delta in notches; positive zooms in.
    pub delta: f64,
    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

/// What the host should do with an input event after the viewport saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    /// The viewport handled the event; suppress default handling.
    Consumed,
    /// The viewport is detached and ignored the event.
    Ignored,
}

impl EventDisposition {
    /// Whether the host should prevent its default handling.
    pub fn prevent_default(self) -> bool {
        self == Self::Consumed
    }
}

/// Kind of transform a gesture drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureMode {
    /// Drag translates the view 1:1 in NDC.
    Pan,
    /// Vertical drag zooms exponentially around the world origin.
    Zoom,
}

impl GestureMode {
    /// Select a mode from held modifiers: shift pans, alt or meta zooms.
    pub fn from_modifiers(modifiers: Modifiers) -> Option<Self> {
        if modifiers.shift {
            Some(Self::Pan)
        } else if modifiers.alt || modifiers.meta {
            Some(Self::Zoom)
        } else {
            None
        }
    }
}

/// A live pan or zoom gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gesture {
    mode: GestureMode,
    start: Vec2,
    captured: ViewTransform,
}

impl Gesture {
    /// Begin a gesture at `start` (client pixels, y up) over `captured`.
    pub fn begin(mode: GestureMode, start: Vec2, captured: ViewTransform) -> Self {
        Self {
            mode,
            start,
            captured,
        }
    }

    /// The gesture mode.
    pub fn mode(&self) -> GestureMode {
        self.mode
    }

    /// Client position where the gesture started.
    pub fn start(&self) -> Vec2 {
        self.start
    }

    /// Transform at the start of the gesture; restored on abort.
    pub fn captured(&self) -> ViewTransform {
        self.captured
    }

    /// Transform the gesture produces with the pointer at `point`.
    ///
    /// Both ends of the drag are converted with the same projection, so the
    /// result depends only on the start point, `point` and the captured
    /// snapshot.
    pub fn target(&self, projection: &Projection, point: Vec2) -> ViewTransform {
        let delta = projection.client_to_ndc(point) - projection.client_to_ndc(self.start);
        match self.mode {
            GestureMode::Pan => self
                .captured
                .with_translation(self.captured.translation() + delta),
            GestureMode::Zoom => {
                let captured_scale = self.captured.scale();
                let scale = (captured_scale.ln() + delta.y).exp();
                ViewTransform::new(
                    self.captured.translation() * (scale / captured_scale),
                    scale,
                )
            }
        }
    }
}

/// Wheel zoom parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelZoom {
    /// Zoom step per unit of wheel delta.
    pub step: f64,
    /// Factor applied to the delta while shift is held.
    pub fine_factor: f64,
}

impl Default for WheelZoom {
    fn default() -> Self {
        Self {
            step: WHEEL_ZOOM_STEP,
            fine_factor: FINE_WHEEL_FACTOR,
        }
    }
}

impl WheelZoom {
    /// Apply a wheel event to `transform`, zooming around the world origin.
    ///
    /// The factor is `1 + step * delta`, with the delta reduced by
    /// `fine_factor` when shift is held. The factor never drops below
    /// [`MIN_WHEEL_FACTOR`], so the scale stays positive. Non-finite deltas
    /// leave the transform unchanged.
    pub fn apply(&self, transform: ViewTransform, event: &WheelEvent) -> ViewTransform {
        let mut delta = event.delta;
        if event.modifiers.shift {
            delta *= self.fine_factor;
        }
        let factor = 1.0 + self.step * delta;
        if !factor.is_finite() {
            return transform;
        }
        transform.zoomed(factor.max(MIN_WHEEL_FACTOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn projection() -> Projection {
        Projection::new(
            Vec2::new(800.0, 600.0),
            ViewTransform::new(Vec2::new(0.1, 0.2), Vec2::new(1.5, 3.0)),
        )
    }

    #[test]
    fn modifiers_select_mode() {
        assert_eq!(GestureMode::from_modifiers(Modifiers::NONE), None);
        assert_eq!(GestureMode::from_modifiers(Modifiers::SHIFT), Some(GestureMode::Pan));
        assert_eq!(GestureMode::from_modifiers(Modifiers::ALT), Some(GestureMode::Zoom));
        let meta = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert_eq!(GestureMode::from_modifiers(meta), Some(GestureMode::Zoom));
    }

    #[test]
    fn pan_moves_translation_by_ndc_delta() {
        let projection = projection();
        let gesture = Gesture::begin(GestureMode::Pan, Vec2::new(400.0, 300.0), projection.transform());
        let moved = gesture.target(&projection, Vec2::new(480.0, 240.0));
        assert!(moved.translation().approx_eq(Vec2::new(0.3, 0.0), 1e-12));
        assert_eq!(moved.scale(), projection.transform().scale());
    }

    #[test]
    fn pan_back_to_start_is_exact() {
        let projection = projection();
        let captured = projection.transform();
        let gesture = Gesture::begin(GestureMode::Pan, Vec2::new(123.0, 45.0), captured);
        let away = gesture.target(&projection, Vec2::new(700.0, 512.0));
        assert_ne!(away, captured);
        let back = gesture.target(&projection.with_transform(away), Vec2::new(123.0, 45.0));
        assert_eq!(back, captured);
    }

    #[test]
    fn zoom_is_monotonic_and_uniform() {
        let projection = projection();
        let captured = projection.transform();
        let gesture = Gesture::begin(GestureMode::Zoom, Vec2::new(400.0, 300.0), captured);
        let ratio = captured.scale().x / captured.scale().y;
        let mut previous = captured;
        for step in 1..10 {
            let next = gesture.target(&projection, Vec2::new(400.0, 300.0 + 20.0 * step as f64));
            assert!(next.scale().x > previous.scale().x);
            assert!(next.scale().y > previous.scale().y);
            assert!((next.scale().x / next.scale().y - ratio).abs() < 1e-12);
            previous = next;
        }
        let shrunk = gesture.target(&projection, Vec2::new(400.0, 100.0));
        assert!(shrunk.scale().x < captured.scale().x);
    }

    #[test]
    fn zoom_anchors_at_world_origin() {
        let projection = projection();
        let captured = projection.transform();
        let gesture = Gesture::begin(GestureMode::Zoom, Vec2::new(10.0, 10.0), captured);
        let zoomed = gesture.target(&projection, Vec2::new(10.0, 250.0));
        let factor = zoomed.scale() / captured.scale();
        assert!(zoomed.translation().approx_eq(captured.translation() * factor, 1e-12));
        // The world origin stays put on screen.
        let before = projection.world_to_client(Vec2::ZERO);
        let after = projection.with_transform(zoomed).world_to_client(Vec2::ZERO);
        let scaled = projection.ndc_to_client(projection.client_to_ndc(before) * factor);
        assert!(after.approx_eq(scaled, 1e-9));
    }

    #[test]
    fn wheel_zoom_factor() {
        let base = ViewTransform::new(Vec2::new(1.0, -1.0), Vec2::new(2.0, 2.0));
        let event = WheelEvent {
            delta: 2.0,
            modifiers: Modifiers::NONE,
        };
        let zoomed = WheelZoom::default().apply(base, &event);
        assert!(zoomed.scale().approx_eq(Vec2::new(2.12, 2.12), 1e-12));
        assert!(zoomed.translation().approx_eq(Vec2::new(1.06, -1.06), 1e-12));

        let fine = WheelEvent {
            delta: 2.0,
            modifiers: Modifiers::SHIFT,
        };
        let zoomed = WheelZoom::default().apply(base, &fine);
        assert!(zoomed.scale().approx_eq(Vec2::new(2.012, 2.012), 1e-12));
    }

    #[test]
    fn large_negative_wheel_keeps_scale_positive() {
        let base = ViewTransform::new(Vec2::new(0.5, 0.5), Vec2::ONE);
        let flick = WheelEvent {
            delta: -40.0,
            modifiers: Modifiers::NONE,
        };
        let zoomed = WheelZoom::default().apply(base, &flick);
        assert!(zoomed.scale().is_finite());
        assert!(zoomed.scale().x > 0.0 && zoomed.scale().y > 0.0);
        assert!(zoomed.scale().approx_eq(Vec2::splat(MIN_WHEEL_FACTOR), 1e-12));

        // A drag zoom on top of the clamped scale stays finite.
        let projection = Projection::new(Vec2::new(800.0, 600.0), zoomed);
        let gesture = Gesture::begin(GestureMode::Zoom, Vec2::new(400.0, 300.0), zoomed);
        let dragged = gesture.target(&projection, Vec2::new(400.0, 420.0));
        assert!(dragged.scale().is_finite());
        assert!(dragged.translation().is_finite());

        let nan = WheelEvent {
            delta: f64::NAN,
            modifiers: Modifiers::NONE,
        };
        assert_eq!(WheelZoom::default().apply(base, &nan), base);
    }
}
