use core::ops;

/// The extent of a [`Box`](crate::geom::Box) along one axis, for
/// [`Box::from_intervals()`](crate::geom::Box::from_intervals).
///
/// A missing bound means the box is unbounded in that direction.
/// Intervals are most conveniently written as Rust ranges:
///
/// ```
/// use ndbox::geom::Interval;
///
/// assert_eq!(Interval::from(0.0..10.0), Interval::new(Some(0.0), Some(10.0)));
/// assert_eq!(Interval::from(..5.0).lower(), f64::NEG_INFINITY);
/// assert_eq!(Interval::from(..), Interval::UNBOUNDED);
/// ```
///
/// Whether a range is inclusive makes no difference, since boxes always include their
/// boundary.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Interval {
    lower: Option<f64>,
    upper: Option<f64>,
    step: Option<f64>,
}

impl Interval {
    /// The interval containing every coordinate.
    pub const UNBOUNDED: Self = Self::new(None, None);

    #[allow(missing_docs)]
    #[inline]
    pub const fn new(lower: Option<f64>, upper: Option<f64>) -> Self {
        Self {
            lower,
            upper,
            step: None,
        }
    }

    /// Sets a sampling step for this interval.
    ///
    /// Boxes are continuous, so the only step they accept is 1 (the same as no step);
    /// any other step makes [`Box::from_intervals()`](crate::geom::Box::from_intervals) fail.
    #[inline]
    #[must_use]
    pub const fn step_by(self, step: f64) -> Self {
        Self {
            step: Some(step),
            ..self
        }
    }

    /// The lower bound, or negative infinity if unbounded below.
    #[inline]
    pub fn lower(&self) -> f64 {
        self.lower.unwrap_or(f64::NEG_INFINITY)
    }

    /// The upper bound, or positive infinity if unbounded above.
    #[inline]
    pub fn upper(&self) -> f64 {
        self.upper.unwrap_or(f64::INFINITY)
    }

    /// The step set by [`Interval::step_by()`], if any.
    #[inline]
    pub fn step(&self) -> Option<f64> {
        self.step
    }
}

impl From<ops::Range<f64>> for Interval {
    #[inline]
    fn from(range: ops::Range<f64>) -> Self {
        Self::new(Some(range.start), Some(range.end))
    }
}
impl From<ops::RangeInclusive<f64>> for Interval {
    #[inline]
    fn from(range: ops::RangeInclusive<f64>) -> Self {
        Self::new(Some(*range.start()), Some(*range.end()))
    }
}
impl From<ops::RangeFrom<f64>> for Interval {
    #[inline]
    fn from(range: ops::RangeFrom<f64>) -> Self {
        Self::new(Some(range.start), None)
    }
}
impl From<ops::RangeTo<f64>> for Interval {
    #[inline]
    fn from(range: ops::RangeTo<f64>) -> Self {
        Self::new(None, Some(range.end))
    }
}
impl From<ops::RangeToInclusive<f64>> for Interval {
    #[inline]
    fn from(range: ops::RangeToInclusive<f64>) -> Self {
        Self::new(None, Some(range.end))
    }
}
impl From<ops::RangeFull> for Interval {
    #[inline]
    fn from(_: ops::RangeFull) -> Self {
        Self::UNBOUNDED
    }
}
