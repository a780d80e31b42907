//! Geometric primitives used by the viewport and graph pipeline.
//!
//! [`Vec2`] and [`Vec3`] are plain component-wise vectors. All arithmetic
//! operators act per component, which is how scales, aspect corrections and
//! colors are combined throughout the crate. Screen-space types are used by
//! render backends only.

use std::ops::{Add, Div, Mul, Neg, Sub};

/// Linear interpolation between `a` and `b`.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// Clamp `value` into `[lower, upper]`.
///
/// Unlike [`f64::clamp`] this never panics when `lower > upper`; the lower
/// bound wins.
pub fn clamp(value: f64, lower: f64, upper: f64) -> f64 {
    lower.max(upper.min(value))
}

/// A 2D vector or point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0);
    /// The all-ones vector.
    pub const ONE: Self = Self::new(1.0, 1.0);

    /// Create a new vector.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector with both components set to `v`.
    pub const fn splat(v: f64) -> Self {
        Self::new(v, v)
    }

    /// Component by index (0 = x, anything else = y).
    pub fn get(self, index: usize) -> f64 {
        if index == 0 { self.x } else { self.y }
    }

    /// Swap components when `swap` is set.
    pub fn swapped_if(self, swap: bool) -> Self {
        if swap { Self::new(self.y, self.x) } else { self }
    }

    /// Component-wise minimum.
    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Component-wise maximum.
    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }

    /// Component-wise clamp into `[lower, upper]`.
    pub fn clamp(self, lower: Self, upper: Self) -> Self {
        Self::new(clamp(self.x, lower.x, upper.x), clamp(self.y, lower.y, upper.y))
    }

    /// Component-wise floor.
    pub fn floor(self) -> Self {
        Self::new(self.x.floor(), self.y.floor())
    }

    /// Component-wise ceiling.
    pub fn ceil(self) -> Self {
        Self::new(self.x.ceil(), self.y.ceil())
    }

    /// Component-wise natural logarithm.
    pub fn ln(self) -> Self {
        Self::new(self.x.ln(), self.y.ln())
    }

    /// Component-wise `e^v`.
    pub fn exp(self) -> Self {
        Self::new(self.x.exp(), self.y.exp())
    }

    /// Squared length.
    pub fn length_squared(self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Euclidean length.
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Mean of the two components.
    pub fn mean(self) -> f64 {
        (self.x + self.y) * 0.5
    }

    /// Component-wise linear interpolation.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self::new(lerp(self.x, other.x, t), lerp(self.y, other.y, t))
    }

    /// Check whether both components are finite.
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Check whether both components are within `eps` of `other`.
    pub fn approx_eq(self, other: Self, eps: f64) -> bool {
        (self.x - other.x).abs() <= eps && (self.y - other.y).abs() <= eps
    }
}

impl From<(f64, f64)> for Vec2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<[f64; 2]> for Vec2 {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<Vec2> for kurbo::Point {
    fn from(v: Vec2) -> Self {
        kurbo::Point::new(v.x, v.y)
    }
}

impl From<kurbo::Point> for Vec2 {
    fn from(p: kurbo::Point) -> Self {
        Vec2::new(p.x, p.y)
    }
}

/// A 3D vector, used mostly for RGB triples.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    /// X (or red) component.
    pub x: f64,
    /// Y (or green) component.
    pub y: f64,
    /// Z (or blue) component.
    pub z: f64,
}

impl Vec3 {
    /// Create a new vector.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Component-wise minimum.
    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    /// Component-wise maximum.
    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    /// Clamp every component into `[lower, upper]`.
    pub fn clamp_scalar(self, lower: f64, upper: f64) -> Self {
        Self::new(
            clamp(self.x, lower, upper),
            clamp(self.y, lower, upper),
            clamp(self.z, lower, upper),
        )
    }

    /// Component-wise floor.
    pub fn floor(self) -> Self {
        Self::new(self.x.floor(), self.y.floor(), self.z.floor())
    }

    /// Component-wise ceiling.
    pub fn ceil(self) -> Self {
        Self::new(self.x.ceil(), self.y.ceil(), self.z.ceil())
    }
}

macro_rules! impl_vec_ops {
    ($ty:ident { $($field:ident),+ }) => {
        impl Add for $ty {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Self { $($field: self.$field + rhs.$field),+ }
            }
        }

        impl Add<f64> for $ty {
            type Output = Self;
            fn add(self, rhs: f64) -> Self {
                Self { $($field: self.$field + rhs),+ }
            }
        }

        impl Sub for $ty {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                Self { $($field: self.$field - rhs.$field),+ }
            }
        }

        impl Sub<f64> for $ty {
            type Output = Self;
            fn sub(self, rhs: f64) -> Self {
                Self { $($field: self.$field - rhs),+ }
            }
        }

        impl Mul for $ty {
            type Output = Self;
            fn mul(self, rhs: Self) -> Self {
                Self { $($field: self.$field * rhs.$field),+ }
            }
        }

        impl Mul<f64> for $ty {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self {
                Self { $($field: self.$field * rhs),+ }
            }
        }

        impl Div for $ty {
            type Output = Self;
            fn div(self, rhs: Self) -> Self {
                Self { $($field: self.$field / rhs.$field),+ }
            }
        }

        impl Div<f64> for $ty {
            type Output = Self;
            fn div(self, rhs: f64) -> Self {
                Self { $($field: self.$field / rhs),+ }
            }
        }

        impl Neg for $ty {
            type Output = Self;
            fn neg(self) -> Self {
                Self { $($field: -self.$field),+ }
            }
        }
    };
}

impl_vec_ops!(Vec2 { x, y });
impl_vec_ops!(Vec3 { x, y, z });

/// A point in screen space (device pixels, y down).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    /// X value in screen pixels.
    pub x: f32,
    /// Y value in screen pixels.
    pub y: f32,
}

impl ScreenPoint {
    /// Create a new screen point.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A rectangle in screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    /// Top-left corner.
    pub min: ScreenPoint,
    /// Bottom-right corner.
    pub max: ScreenPoint,
}

impl ScreenRect {
    /// Create a new screen rectangle from corners.
    pub fn new(min: ScreenPoint, max: ScreenPoint) -> Self {
        Self { min, max }
    }

    /// Build a normalized rectangle from two arbitrary corners.
    pub fn from_corners(a: ScreenPoint, b: ScreenPoint) -> Self {
        Self::new(
            ScreenPoint::new(a.x.min(b.x), a.y.min(b.y)),
            ScreenPoint::new(a.x.max(b.x), a.y.max(b.y)),
        )
    }

    /// Rectangle width in pixels.
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Rectangle height in pixels.
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Check whether the rectangle has positive area.
    pub fn is_valid(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }

    /// Intersection of two rectangles; may be empty (invalid).
    pub fn intersect(&self, other: &Self) -> Self {
        let min = ScreenPoint::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y));
        let max = ScreenPoint::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y));
        Self::new(min, ScreenPoint::new(max.x.max(min.x), max.y.max(min.y)))
    }

    /// Check whether the point lies inside the rectangle (inclusive).
    pub fn contains(&self, point: ScreenPoint) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}
