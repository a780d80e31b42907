//! Coordinate pipeline between client pixels, NDC and world space.
//!
//! Client pixels have their origin at the bottom-left (the viewport flips
//! incoming pointer positions before they reach this module). NDC spans
//! `[-1, 1]` across the canvas. World space is NDC with the view transform
//! and aspect correction removed:
//! `world = (ndc - translation) / (scale * aspect_scale)`.

use crate::geom::Vec2;
use crate::render::Surface;
use crate::view::ViewTransform;

/// Canvas geometry plus the live view transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    size: Vec2,
    aspect: f64,
    transform: ViewTransform,
}

impl Default for Projection {
    fn default() -> Self {
        Self::new(Vec2::ONE, ViewTransform::IDENTITY)
    }
}

impl Projection {
    /// Create a projection for a canvas of `size` pixels.
    pub fn new(size: Vec2, transform: ViewTransform) -> Self {
        Self {
            size,
            aspect: size.x / size.y,
            transform,
        }
    }

    /// Canvas size in pixels.
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Width over height.
    pub fn aspect(&self) -> f64 {
        self.aspect
    }

    /// The live view transform.
    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    /// Copy with a different canvas size.
    #[must_use]
    pub fn with_size(self, size: Vec2) -> Self {
        Self::new(size, self.transform)
    }

    /// Copy with a different view transform.
    #[must_use]
    pub fn with_transform(self, transform: ViewTransform) -> Self {
        Self { transform, ..self }
    }

    /// Per-axis correction keeping a world unit square undistorted.
    pub fn aspect_scale(&self) -> Vec2 {
        if self.aspect > 1.0 {
            Vec2::new(1.0 / self.aspect, 1.0)
        } else {
            Vec2::new(1.0, self.aspect)
        }
    }

    /// Client pixels to NDC. Independent of the view transform.
    pub fn client_to_ndc(&self, point: Vec2) -> Vec2 {
        point / self.size * 2.0 - 1.0
    }

    /// NDC to client pixels.
    pub fn ndc_to_client(&self, ndc: Vec2) -> Vec2 {
        (ndc + 1.0) * 0.5 * self.size
    }

    /// Client pixels to world space under the live transform.
    pub fn client_to_world(&self, point: Vec2) -> Vec2 {
        self.client_to_world_with(point, &self.transform)
    }

    /// Client pixels to world space under an arbitrary transform.
    pub fn client_to_world_with(&self, point: Vec2, transform: &ViewTransform) -> Vec2 {
        let ndc = self.client_to_ndc(point);
        (ndc - transform.translation()) / (transform.scale() * self.aspect_scale())
    }

    /// World space to client pixels under the live transform.
    pub fn world_to_client(&self, point: Vec2) -> Vec2 {
        self.world_to_client_with(point, &self.transform)
    }

    /// World space to client pixels under an arbitrary transform.
    pub fn world_to_client_with(&self, point: Vec2, transform: &ViewTransform) -> Vec2 {
        let ndc = point * (transform.scale() * self.aspect_scale()) + transform.translation();
        self.ndc_to_client(ndc)
    }

    /// World space to minimap pixels, for a minimap drawn at `pos` with `size`.
    ///
    /// The minimap shows world space at the identity transform.
    pub fn world_to_preview(&self, point: Vec2, pos: Vec2, size: Vec2) -> Vec2 {
        (point * self.aspect_scale() + 1.0) * 0.5 * size + pos
    }

    /// World-space extent of one client pixel.
    pub fn pixel_size(&self) -> Vec2 {
        self.client_to_world(Vec2::ONE) - self.client_to_world(Vec2::ZERO)
    }

    /// World coordinates of the client corners `(0, 0)` and `size`.
    pub fn visible_world_rect(&self) -> (Vec2, Vec2) {
        (self.client_to_world(Vec2::ZERO), self.client_to_world(self.size))
    }

    /// Set up window space: pixels, y up, centered on pixel centers.
    pub fn apply_window_matrix(&self, surface: &mut dyn Surface) {
        surface.translate(Vec2::new(0.5, 0.5));
        surface.translate(Vec2::new(0.0, self.size.y));
        surface.scale(Vec2::new(1.0, -1.0));
    }

    /// Map world space onto the window matrix through the live transform.
    pub fn apply_view_matrix(&self, surface: &mut dyn Surface) {
        surface.scale(self.size);
        surface.scale(Vec2::splat(0.5));
        surface.translate(Vec2::ONE);
        surface.translate(self.transform.translation());
        surface.scale(self.transform.scale() * self.aspect_scale());
    }

    /// Map world space at identity into the minimap rectangle.
    pub fn apply_preview_matrix(&self, surface: &mut dyn Surface, pos: Vec2, size: Vec2) {
        surface.translate(pos);
        surface.scale(size);
        surface.scale(Vec2::splat(0.5));
        surface.translate(Vec2::ONE);
        surface.scale(self.aspect_scale());
    }
}
