//! View transforms and numeric ranges.

use crate::geom::Vec2;

/// Numeric range with inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
}

impl Range {
    /// Create a new range, swapping bounds if needed.
    pub fn new(mut min: f64, mut max: f64) -> Self {
        if min > max {
            std::mem::swap(&mut min, &mut max);
        }
        Self { min, max }
    }

    /// Span of the range.
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Check whether both bounds are finite.
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Check whether the range has positive span and finite bounds.
    pub fn is_valid(&self) -> bool {
        self.is_finite() && self.span() > 0.0
    }
}

/// Immutable pan/zoom state of a viewport.
///
/// Maps normalized device coordinates to world space as
/// `world = (ndc - translation) / (scale * aspect_correction)`. Every change
/// produces a new value; a gesture's captured snapshot can never alias the
/// live transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    translation: Vec2,
    scale: Vec2,
}

impl ViewTransform {
    /// The identity transform: no translation, unit scale.
    pub const IDENTITY: Self = Self {
        translation: Vec2::ZERO,
        scale: Vec2::ONE,
    };

    /// Create a transform from a translation (in NDC units) and a per-axis scale.
    pub fn new(translation: Vec2, scale: Vec2) -> Self {
        Self { translation, scale }
    }

    /// Translation in normalized device units.
    pub fn translation(&self) -> Vec2 {
        self.translation
    }

    /// Per-axis scale factor.
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Copy with a different translation.
    #[must_use]
    pub fn with_translation(self, translation: Vec2) -> Self {
        Self { translation, ..self }
    }

    /// Copy with a different scale.
    #[must_use]
    pub fn with_scale(self, scale: Vec2) -> Self {
        Self { scale, ..self }
    }

    /// Multiply translation and scale uniformly by `factor`.
    ///
    /// This zooms around the world origin.
    #[must_use]
    pub fn zoomed(self, factor: f64) -> Self {
        Self {
            translation: self.translation * factor,
            scale: self.scale * factor,
        }
    }

    /// Check whether `other` differs from `self` by at most `eps` per component.
    pub fn approx_eq(&self, other: &Self, eps: f64) -> bool {
        self.translation.approx_eq(other.translation, eps) && self.scale.approx_eq(other.scale, eps)
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
