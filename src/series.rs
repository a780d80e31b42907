//! Data series storage.
//!
//! Series are validated at the registration boundary: every point that makes
//! it into a [`Series`] has finite coordinates, so layout and rendering never
//! see malformed data.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::geom::Vec2;
use crate::view::Range;

static SERIES_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeriesId(u64);

impl SeriesId {
    fn next() -> Self {
        Self(SERIES_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Errors raised when building or extending a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SeriesError {
    /// A coordinate is NaN or infinite.
    #[error("point {index} has a non-finite coordinate")]
    NonFinite {
        /// Index of the offending point.
        index: usize,
    },
    /// A flat coordinate list ended halfway through a point.
    #[error("flat coordinate list has odd length {len}")]
    MissingCoordinate {
        /// Length of the rejected list.
        len: usize,
    },
}

/// Ordered, append-only sequence of 2D points with incremental bounds.
#[derive(Debug, Clone)]
pub struct Series {
    id: SeriesId,
    name: String,
    points: Vec<Vec2>,
    bounds: Option<(Vec2, Vec2)>,
}

impl Series {
    /// Create an empty series.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SeriesId::next(),
            name: name.into(),
            points: Vec::new(),
            bounds: None,
        }
    }

    /// Build a series from explicit points.
    pub fn from_points<I, P>(name: impl Into<String>, points: I) -> Result<Self, SeriesError>
    where
        I: IntoIterator<Item = P>,
        P: Into<Vec2>,
    {
        let mut series = Self::new(name);
        series.extend(points)?;
        Ok(series)
    }

    /// Build a series from Y values; X is the value index.
    pub fn from_y<I, T>(name: impl Into<String>, values: I) -> Result<Self, SeriesError>
    where
        I: IntoIterator<Item = T>,
        T: Into<f64>,
    {
        Self::from_points(
            name,
            values
                .into_iter()
                .enumerate()
                .map(|(index, y)| Vec2::new(index as f64, y.into())),
        )
    }

    /// Build a series from interleaved `[x0, y0, x1, y1, ...]` coordinates.
    pub fn from_flat(name: impl Into<String>, coords: &[f64]) -> Result<Self, SeriesError> {
        if coords.len() % 2 != 0 {
            return Err(SeriesError::MissingCoordinate { len: coords.len() });
        }
        Self::from_points(
            name,
            coords.chunks_exact(2).map(|pair| Vec2::new(pair[0], pair[1])),
        )
    }

    /// Build a series by sampling `function` at `samples` evenly spaced X values.
    pub fn from_fn(
        name: impl Into<String>,
        function: impl Fn(f64) -> f64,
        x_range: Range,
        samples: usize,
    ) -> Result<Self, SeriesError> {
        let step = if samples > 1 {
            x_range.span() / (samples - 1) as f64
        } else {
            0.0
        };
        Self::from_points(
            name,
            (0..samples).map(|i| {
                let x = x_range.min + step * i as f64;
                Vec2::new(x, function(x))
            }),
        )
    }

    /// Access the series identifier.
    pub fn id(&self) -> SeriesId {
        self.id
    }

    /// Access the series name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Access the points in insertion order.
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check whether the series has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Component-wise minimum and maximum over all points.
    pub fn bounds(&self) -> Option<(Vec2, Vec2)> {
        self.bounds
    }

    /// Append a point, returning its index.
    pub fn push(&mut self, point: impl Into<Vec2>) -> Result<usize, SeriesError> {
        let point = point.into();
        let index = self.points.len();
        if !point.is_finite() {
            return Err(SeriesError::NonFinite { index });
        }
        self.commit(point);
        Ok(index)
    }

    /// Append several points, returning how many were added.
    ///
    /// The batch is validated as a whole: if any point is rejected the series
    /// is left unchanged.
    pub fn extend<I, P>(&mut self, points: I) -> Result<usize, SeriesError>
    where
        I: IntoIterator<Item = P>,
        P: Into<Vec2>,
    {
        let start_len = self.points.len();
        let batch: Vec<Vec2> = points.into_iter().map(Into::into).collect();
        if let Some(offset) = batch.iter().position(|point| !point.is_finite()) {
            return Err(SeriesError::NonFinite {
                index: start_len + offset,
            });
        }

        self.points.reserve(batch.len());
        for point in &batch {
            self.commit(*point);
        }
        Ok(batch.len())
    }

    fn commit(&mut self, point: Vec2) {
        self.points.push(point);
        self.bounds = Some(match self.bounds {
            None => (point, point),
            Some((min, max)) => (min.min(point), max.max(point)),
        });
    }
}
