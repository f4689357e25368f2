use alloc::vec::Vec;
use core::fmt;
use core::hash::{Hash, Hasher};

use crate::geom::abstract_box::{self, BoxTensors};
use crate::geom::{AbstractBox, ConstructionError, ConstructionKind, Geometry, Interval};
use crate::tensor::{Dim, Shape, ShapeError, Tensor, VECTOR, spatial_axis_name};

/// Axis-aligned box(es) defined by their `lower` and `upper` corners.
///
/// The corners may be batched independently: for example, a `lower` tensor with a
/// `points` batch dimension and an unbatched `upper` defines one box per point, all
/// sharing the same upper corner.
///
/// Each box includes its boundary. `lower <= upper` is assumed, not checked.
///
/// ```
/// use ndbox::geom::{AbstractBox, Box, Geometry};
/// use ndbox::tensor::Tensor;
///
/// let b = Box::from_lower_upper([0.0, 0.0], [10.0, 20.0]);
/// assert_eq!(b.center(), &Tensor::from([5.0, 10.0]));
/// assert_eq!(b.lies_inside(&Tensor::from([15.0, 10.0])).unwrap(), Tensor::scalar(false));
/// ```
#[derive(Clone)]
pub struct Box {
    tensors: BoxTensors,
}

impl Box {
    /// Constructs a [`Box`] from its corners.
    ///
    /// Each corner may be a scalar (the same bound on every axis), an array of
    /// per-axis bounds, or a [`Tensor`].
    ///
    /// Returns an error if the corners cannot be broadcast against each other.
    #[allow(clippy::missing_inline_in_public_items, reason = "is generic already")]
    pub fn new(
        lower: impl Into<Tensor>,
        upper: impl Into<Tensor>,
    ) -> Result<Self, ConstructionError> {
        BoxTensors::from_lower_upper(lower.into(), upper.into()).map(Self::from_tensors)
    }

    /// Constructs a [`Box`] from its corners.
    ///
    /// Panics if the corners cannot be broadcast against each other;
    /// [`Box::new()`] is the non-panicking version.
    #[track_caller]
    #[allow(clippy::missing_inline_in_public_items, reason = "is generic already")]
    pub fn from_lower_upper(lower: impl Into<Tensor>, upper: impl Into<Tensor>) -> Self {
        match Self::new(lower, upper) {
            Ok(b) => b,
            Err(error) => panic!("Box::from_lower_upper: {error}"),
        }
    }

    /// Constructs a [`Box`] from its lower corner and its size.
    #[allow(clippy::missing_inline_in_public_items, reason = "is generic already")]
    pub fn from_lower_size(
        lower: impl Into<Tensor>,
        size: impl Into<Tensor>,
    ) -> Result<Self, ConstructionError> {
        let lower: Tensor = lower.into();
        let upper = lower.try_add(&size.into())?;
        Self::new(lower, upper)
    }

    /// Constructs an unbatched [`Box`] with one axis per interval.
    ///
    /// ```
    /// use ndbox::geom::{AbstractBox, Box, Interval};
    /// use ndbox::tensor::Tensor;
    ///
    /// let half_space = Box::from_intervals([Interval::from(..5.0), Interval::from(..)]).unwrap();
    /// assert_eq!(half_space.upper(), &Tensor::from([5.0, f64::INFINITY]));
    /// ```
    ///
    /// Returns an error if an interval has a step other than 1.
    #[allow(clippy::missing_inline_in_public_items, reason = "is generic already")]
    pub fn from_intervals<I: Into<Interval>>(
        intervals: impl IntoIterator<Item = I>,
    ) -> Result<Self, ConstructionError> {
        let intervals: Vec<Interval> = intervals.into_iter().map(Into::into).collect();
        for (axis, interval) in intervals.iter().enumerate() {
            match interval.step() {
                None => {}
                Some(step) if step == 1.0 => {}
                Some(step) => {
                    return Err(ConstructionError::new(ConstructionKind::Step { axis, step }));
                }
            }
        }
        Self::new(
            Tensor::vector(intervals.iter().map(Interval::lower)),
            Tensor::vector(intervals.iter().map(Interval::upper)),
        )
    }

    pub(crate) fn from_tensors(tensors: BoxTensors) -> Self {
        Self { tensors }
    }

    /// Returns this box with one coordinate axis removed, lowering its rank by 1.
    ///
    /// ```
    /// use ndbox::geom::Box;
    ///
    /// let b = Box::from_lower_upper([0.0, 0.0, 0.0], [1.0, 2.0, 3.0]);
    /// assert_eq!(b.without_axis(1).unwrap(), Box::from_lower_upper([0.0, 0.0], [1.0, 3.0]));
    /// ```
    #[allow(clippy::missing_inline_in_public_items)]
    pub fn without_axis(&self, axis: usize) -> Result<Self, ConstructionError> {
        let rank = self.rank();
        if axis >= rank {
            return Err(ConstructionError::new(ConstructionKind::AxisOutOfRange {
                axis,
                rank,
            }));
        }
        let kept: Vec<usize> = (0..rank).filter(|&other| other != axis).collect();
        Self::new(
            select_axes(self.lower(), &kept)?,
            select_axes(self.upper(), &kept)?,
        )
    }
}

/// Keeps only the listed `vector` components, unless there is a single one for every axis.
fn select_axes(corner: &Tensor, axes: &[usize]) -> Result<Tensor, ShapeError> {
    if corner.shape().size_of(VECTOR) == Some(1) {
        Ok(corner.clone())
    } else {
        corner.select(VECTOR, axes)
    }
}

impl AbstractBox for Box {
    #[inline]
    fn lower(&self) -> &Tensor {
        &self.tensors.lower
    }

    #[inline]
    fn upper(&self) -> &Tensor {
        &self.tensors.upper
    }

    #[inline]
    fn half_size(&self) -> &Tensor {
        &self.tensors.half_size
    }

    #[inline]
    fn size(&self) -> &Tensor {
        &self.tensors.size
    }

    #[inline]
    fn shifted(&self, delta: &Tensor) -> Result<Self, ConstructionError> {
        Self::new(self.lower().try_add(delta)?, self.upper().try_add(delta)?)
    }

    #[inline]
    fn unstack(&self, dim: &str) -> Result<Vec<Self>, ShapeError> {
        Ok(self
            .tensors
            .unstack(dim)?
            .into_iter()
            .map(Self::from_tensors)
            .collect())
    }
}

impl Geometry for Box {
    /// The batch and spatial dimensions of the corners, including the `vector` dimension.
    #[inline]
    fn shape(&self) -> &Shape {
        &self.tensors.shape
    }

    #[inline]
    fn center(&self) -> &Tensor {
        &self.tensors.center
    }

    #[inline]
    fn bounding_radius(&self) -> Tensor {
        abstract_box::bounding_radius(self)
    }

    #[inline]
    fn bounding_half_extent(&self) -> Tensor {
        abstract_box::bounding_half_extent(self)
    }

    #[inline]
    fn lies_inside(&self, point: &Tensor) -> Result<Tensor<bool>, ShapeError> {
        abstract_box::lies_inside(self, point)
    }

    #[inline]
    fn approximate_signed_distance(&self, point: &Tensor) -> Result<Tensor, ShapeError> {
        abstract_box::approximate_signed_distance(self, point)
    }

    #[inline]
    fn as_box(&self) -> Option<&dyn AbstractBox> {
        Some(self)
    }
}

/// Boxes are equal if they have the same shape and their corners are
/// [close](Tensor::close).
impl PartialEq for Box {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape()
            && self.lower().close(other.lower())
            && self.upper().close(other.upper())
    }
}

/// Only the shape is hashed, since equal boxes may have slightly different corners.
impl Hash for Box {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.shape().hash(state);
    }
}

impl fmt::Debug for Box {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.shape().non_channel().volume() == 1 {
            let mut tuple = f.debug_tuple("Box");
            for axis in 0..self.rank() {
                let lower = self.get_lower(axis).ok().and_then(|t| t.as_scalar());
                let upper = self.get_upper(axis).ok().and_then(|t| t.as_scalar());
                match (lower, upper) {
                    (Some(lower), Some(upper)) => tuple.field(&(lower..=upper)),
                    _ => tuple.field(&format_args!("?")),
                };
            }
            tuple.finish()
        } else {
            f.debug_struct("Box")
                .field("shape", self.shape())
                .field("lower", self.lower())
                .field("upper", self.upper())
                .finish()
        }
    }
}

impl<U> From<euclid::Box2D<f64, U>> for Box {
    #[inline]
    fn from(value: euclid::Box2D<f64, U>) -> Self {
        Self::from_tensors(corner_tensors(
            Tensor::from(value.min),
            Tensor::from(value.max),
            2,
        ))
    }
}

impl<U> From<euclid::Box3D<f64, U>> for Box {
    #[inline]
    fn from(value: euclid::Box3D<f64, U>) -> Self {
        Self::from_tensors(corner_tensors(
            Tensor::from(value.min),
            Tensor::from(value.max),
            3,
        ))
    }
}

/// Infallible construction for corners known to be unbatched vectors of equal rank.
fn corner_tensors(lower: Tensor, upper: Tensor, rank: usize) -> BoxTensors {
    let size = Tensor::vector(
        lower
            .values()
            .iter()
            .zip(upper.values())
            .map(|(l, u)| u - l),
    );
    let center = Tensor::vector(
        lower
            .values()
            .iter()
            .zip(upper.values())
            .map(|(l, u)| (l + u) * 0.5),
    );
    let shape = (0..rank).fold(Shape::SCALAR.with_dim(Dim::vector(rank)), |shape, axis| {
        shape.with_dim(Dim::spatial(spatial_axis_name(axis), 1))
    });
    BoxTensors {
        half_size: &size * 0.5,
        size,
        center,
        lower,
        upper,
        shape,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::DimKind;
    use alloc::string::ToString as _;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn scalar_corners_broadcast() {
        let b = Box::from_lower_upper(0.0, [1.0, 2.0, 3.0]);
        assert_eq!(b.rank(), 3);
        assert_eq!(b.size(), &Tensor::from([1.0, 2.0, 3.0]));
        assert_eq!(
            b.shape(),
            &Shape::new([
                Dim::spatial("x", 1),
                Dim::spatial("y", 1),
                Dim::spatial("z", 1),
                Dim::vector(3)
            ])
            .unwrap()
        );
    }

    #[test]
    fn new_incompatible() {
        let error = Box::new([0.0, 0.0], [1.0, 1.0, 1.0]).unwrap_err();
        assert_eq!(
            error.to_string(),
            "dimension \"vector\" has incompatible sizes 2 and 3"
        );
    }

    #[test]
    #[should_panic = "Box::from_lower_upper: dimension \"vector\" has incompatible sizes 2 and 3"]
    fn from_lower_upper_panic_message() {
        Box::from_lower_upper([0.0, 0.0], [1.0, 1.0, 1.0]);
    }

    #[test]
    fn from_lower_size() {
        assert_eq!(
            Box::from_lower_size([1.0, 2.0], [3.0, 4.0]).unwrap(),
            Box::from_lower_upper([1.0, 2.0], [4.0, 6.0])
        );
    }

    #[test]
    fn from_intervals() {
        let b = Box::from_intervals([0.0..10.0, 0.0..20.0]).unwrap();
        assert_eq!(b, Box::from_lower_upper([0.0, 0.0], [10.0, 20.0]));

        let half = Box::from_intervals([Interval::from(..5.0), Interval::from(1.0..)]).unwrap();
        assert_eq!(half.lower(), &Tensor::from([f64::NEG_INFINITY, 1.0]));
        assert_eq!(half.upper(), &Tensor::from([5.0, f64::INFINITY]));
    }

    #[test]
    fn from_intervals_step() {
        assert!(Box::from_intervals([Interval::from(0.0..1.0).step_by(1.0)]).is_ok());
        assert_eq!(
            Box::from_intervals([Interval::from(0.0..1.0), Interval::from(0.0..4.0).step_by(2.0)])
                .unwrap_err()
                .to_string(),
            "interval for axis 1 has step 2, but only a step of 1 is supported"
        );
    }

    #[test]
    fn without_axis() {
        let b = Box::from_lower_upper([0.0, 0.0, 0.0], [1.0, 2.0, 3.0]);
        let projected = b.without_axis(1).unwrap();
        assert_eq!(projected, Box::from_lower_upper([0.0, 0.0], [1.0, 3.0]));
        assert_eq!(projected.rank(), 2);
        assert_eq!(
            b.without_axis(3).unwrap_err().to_string(),
            "axis 3 is out of range for a box of rank 3"
        );
    }

    #[test]
    fn shifted() {
        let b = Box::from_lower_upper([0.0, 0.0], [1.0, 1.0]);
        assert_eq!(
            b.shifted(&Tensor::from([2.0, -1.0])).unwrap(),
            Box::from_lower_upper([2.0, -1.0], [3.0, 0.0])
        );
    }

    #[test]
    fn equality_compares_both_corners() {
        let a = Box::from_lower_upper([0.0, 0.0], [1.0, 1.0]);
        let b = Box::from_lower_upper([0.0, 0.0], [1.0, 2.0]);
        assert_ne!(a, b);
        assert_eq!(a, Box::from_lower_upper([1e-12, 0.0], [1.0, 1.0 + 1e-9]));
    }

    #[test]
    fn equality_is_symmetric() {
        let a = Box::from_lower_upper([1e6], [2e6]);
        let b = Box::from_lower_upper([1e6 + 10.00005], [2e6]);
        assert_eq!(a == b, b == a);
        let c = Box::from_lower_upper([1e6 + 20.0], [2e6]);
        assert_eq!(a == c, c == a);
        assert_ne!(a, c);
    }

    #[test]
    fn unstack_absent_dim() {
        let b = Box::from_lower_upper([0.0, 0.0], [1.0, 1.0]);
        assert_eq!(b.unstack("points").unwrap(), vec![b.clone()]);
    }

    #[test]
    fn debug_single() {
        let b = Box::from_lower_upper([0.0, 0.0], [10.0, 20.0]);
        assert_eq!(format!("{b:?}"), "Box(0.0..=10.0, 0.0..=20.0)");
        assert_eq!(
            format!("{b:#?}"),
            indoc! {"
                Box(
                    0.0..=10.0,
                    0.0..=20.0,
                )"
            }
        );
    }

    #[test]
    fn debug_batched() {
        let lower = Tensor::from_vec(
            Shape::new([Dim::batch("b", 2), Dim::vector(1)]).unwrap(),
            vec![0.0, 1.0],
        )
        .unwrap();
        let b = Box::new(lower, 2.0).unwrap();
        assert_eq!(
            format!("{b:?}"),
            "Box { shape: (b:b=2, x:s=1, vector:c=1), \
                lower: Tensor { shape: (b:b=2, vector:c=1), values: [0.0, 1.0] }, \
                upper: Tensor { shape: (vector:c=1), values: [2.0] } }"
        );
    }

    #[test]
    fn from_euclid() {
        let b = Box::from(euclid::Box2D::<f64, ()>::new(
            euclid::point2(0.0, 1.0),
            euclid::point2(2.0, 4.0),
        ));
        assert_eq!(b, Box::from_lower_upper([0.0, 1.0], [2.0, 4.0]));
        assert_eq!(b.half_size(), &Tensor::from([1.0, 1.5]));

        let b = Box::from(euclid::Box3D::<f64, ()>::new(
            euclid::point3(0.0, 0.0, 0.0),
            euclid::point3(1.0, 1.0, 1.0),
        ));
        assert_eq!(b.shape().spatial_rank(), 3);
        assert_eq!(b.shape().get(VECTOR).map(Dim::kind), Some(DimKind::Channel));
    }
}
