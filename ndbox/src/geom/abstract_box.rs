use alloc::vec::Vec;

use crate::geom::{
    Box, ConstructionError, ConstructionKind, Cuboid, Geometry, GeometryError, RotatedBox,
    UnsupportedOperandError,
};
use crate::tensor::{Dim, DimKind, Shape, ShapeError, Tensor, VECTOR};

/// Behavior shared by every axis-aligned box variant, possibly batched.
///
/// Every corner and extent tensor has a [`VECTOR`] dimension holding one component per
/// coordinate axis. A `vector` dimension of size 1 means the same value on every axis.
///
/// Implementors provide the defining tensors; all other operations are derived from them.
pub trait AbstractBox: Geometry {
    /// The corner with the smallest coordinates.
    fn lower(&self) -> &Tensor;

    /// The corner with the largest coordinates.
    fn upper(&self) -> &Tensor;

    /// Half of [`size`](Self::size); the distance from the center to each face.
    fn half_size(&self) -> &Tensor;

    /// The extent along each axis, `upper - lower`.
    fn size(&self) -> &Tensor;

    /// Returns a box of the same variant translated by `delta`.
    fn shifted(&self, delta: &Tensor) -> Result<Self, ConstructionError>
    where
        Self: Sized;

    /// Splits a batched box into one box per element of the named batch dimension.
    ///
    /// If the dimension is absent, the result is this box alone.
    fn unstack(&self, dim: &str) -> Result<Vec<Self>, ShapeError>
    where
        Self: Sized;

    /// Number of coordinate axes; the size of the `vector` dimension.
    #[inline]
    fn rank(&self) -> usize {
        self.size().shape().size_of(VECTOR).unwrap_or(1)
    }

    /// Maps physical coordinates to coordinates relative to this box, in which
    /// [`lower`](Self::lower) is 0 and [`upper`](Self::upper) is 1 on every axis.
    ///
    /// Axes on which the box has zero size produce infinite or NaN results.
    #[inline]
    fn global_to_local(&self, global: &Tensor) -> Result<Tensor, ShapeError> {
        global.try_sub(self.lower())?.try_div(self.size())
    }

    /// Inverse of [`global_to_local()`](Self::global_to_local).
    #[inline]
    fn local_to_global(&self, local: &Tensor) -> Result<Tensor, ShapeError> {
        local.try_mul(self.size())?.try_add(self.lower())
    }

    /// The lower bound along one axis, without the `vector` dimension.
    ///
    /// If the box’s `vector` dimension has size 1, that single bound is returned for every
    /// `axis`.
    #[inline]
    fn get_lower(&self, axis: usize) -> Result<Tensor, ShapeError> {
        component(self.lower(), axis)
    }

    /// The upper bound along one axis, without the `vector` dimension.
    ///
    /// If the box’s `vector` dimension has size 1, that single bound is returned for every
    /// `axis`.
    #[inline]
    fn get_upper(&self, axis: usize) -> Result<Tensor, ShapeError> {
        component(self.upper(), axis)
    }

    /// Returns the same box(es) as a [`Box`], defined by its corners.
    #[inline]
    fn corner_representation(&self) -> Box {
        Box::from_tensors(BoxTensors::of(self))
    }

    /// Returns the same box(es) as a [`Cuboid`], defined by its center and half size.
    #[inline]
    fn center_representation(&self) -> Cuboid {
        Cuboid::from_tensors(BoxTensors::of(self))
    }

    /// Returns whether `other` lies entirely within this box.
    ///
    /// All batch elements are compared and the answer is `true` only if every one of
    /// them is contained.
    ///
    /// Returns an error if `other` is not a box, or if the two cannot be broadcast
    /// against each other.
    #[allow(clippy::missing_inline_in_public_items)]
    fn contains(&self, other: &dyn Geometry) -> Result<bool, GeometryError> {
        let Some(other) = other.as_box() else {
            return Err(UnsupportedOperandError {
                operand: format!("{other:?}"),
            }
            .into());
        };
        Ok(other.lower().ge(self.lower())?.all_true()
            && other.upper().le(self.upper())?.all_true())
    }

    /// Returns this box rotated about its center by `angle` radians, in the plane of
    /// the first two axes.
    #[inline]
    fn rotated(&self, angle: &Tensor) -> Result<RotatedBox, ShapeError> {
        RotatedBox::new(self.center_representation(), angle.clone())
    }
}

fn component(tensor: &Tensor, axis: usize) -> Result<Tensor, ShapeError> {
    match tensor.shape().size_of(VECTOR) {
        Some(1) => tensor.index(VECTOR, 0),
        _ => tensor.index(VECTOR, axis),
    }
}

/// [`Geometry::bounding_radius()`] of a box.
///
/// This is conservative rather than tight, so that it is valid in any rank.
pub(crate) fn bounding_radius(b: &(impl AbstractBox + ?Sized)) -> Tensor {
    b.size().max(VECTOR) * core::f64::consts::SQRT_2
}

/// [`Geometry::bounding_half_extent()`] of a box, which is its half size.
pub(crate) fn bounding_half_extent(b: &(impl AbstractBox + ?Sized)) -> Tensor {
    b.half_size().clone()
}

/// [`Geometry::lies_inside()`] of a box.
pub(crate) fn lies_inside(
    b: &(impl AbstractBox + ?Sized),
    point: &Tensor,
) -> Result<Tensor<bool>, ShapeError> {
    let inside = point.ge(b.lower())?.and(&point.le(b.upper())?)?;
    Ok(inside.all(VECTOR))
}

/// [`Geometry::approximate_signed_distance()`] of a box: the Chebyshev distance to the
/// nearest face, negative inside.
pub(crate) fn approximate_signed_distance(
    b: &(impl AbstractBox + ?Sized),
    point: &Tensor,
) -> Result<Tensor, ShapeError> {
    let distance = point.try_sub(b.center())?.abs().try_sub(b.half_size())?;
    Ok(distance.max(VECTOR))
}

/// The tensors defining a box in both representations, and the combined shape of them
/// including the `vector` dimension.
///
/// Box variants compute this once at construction so that every accessor is a field read.
#[derive(Clone, Debug)]
pub(crate) struct BoxTensors {
    pub lower: Tensor,
    pub upper: Tensor,
    pub center: Tensor,
    pub half_size: Tensor,
    pub size: Tensor,
    pub shape: Shape,
}

impl BoxTensors {
    pub fn from_lower_upper(lower: Tensor, upper: Tensor) -> Result<Self, ConstructionError> {
        let lower = as_corner(lower)?;
        let upper = as_corner(upper)?;
        let shape = lower
            .shape()
            .combined(upper.shape())?
            .fill_spatial_with_singleton()?;
        let size = upper.try_sub(&lower)?;
        Ok(Self {
            center: lower.try_add(&upper)? * 0.5,
            half_size: &size * 0.5,
            size,
            lower,
            upper,
            shape,
        })
    }

    pub fn from_center_half_size(
        center: Tensor,
        half_size: Tensor,
    ) -> Result<Self, ConstructionError> {
        let center = as_corner(center)?;
        let half_size = as_corner(half_size)?;
        let shape = center
            .shape()
            .combined(half_size.shape())?
            .fill_spatial_with_singleton()?;
        Ok(Self {
            lower: center.try_sub(&half_size)?,
            upper: center.try_add(&half_size)?,
            size: &half_size * 2.0,
            center,
            half_size,
            shape,
        })
    }

    /// Copies the tensors of an existing box.
    pub fn of(b: &(impl AbstractBox + ?Sized)) -> Self {
        Self {
            lower: b.lower().clone(),
            upper: b.upper().clone(),
            center: b.center().clone(),
            half_size: b.half_size().clone(),
            size: b.size().clone(),
            shape: b.shape().with_dim(Dim::vector(b.rank())),
        }
    }

    pub fn unstack(&self, dim: &str) -> Result<Vec<Self>, ShapeError> {
        let count = match self.shape.get(dim) {
            None => return Ok(vec![self.clone()]),
            Some(found) if found.kind() != DimKind::Batch => {
                return Err(ShapeError::WrongKind {
                    name: dim.into(),
                    expected: DimKind::Batch,
                    actual: found.kind(),
                });
            }
            Some(found) => found.size(),
        };
        let lower = slices(&self.lower, dim, count)?;
        let upper = slices(&self.upper, dim, count)?;
        let center = slices(&self.center, dim, count)?;
        let half_size = slices(&self.half_size, dim, count)?;
        let size = slices(&self.size, dim, count)?;
        let shape = self.shape.without(dim);
        Ok((0..count)
            .map(|i| Self {
                lower: lower[i].clone(),
                upper: upper[i].clone(),
                center: center[i].clone(),
                half_size: half_size[i].clone(),
                size: size[i].clone(),
                shape: shape.clone(),
            })
            .collect())
    }
}

/// Splits `tensor` along `dim` into `count` parts, repeating it where it is broadcast.
fn slices(tensor: &Tensor, dim: &str, count: usize) -> Result<Vec<Tensor>, ShapeError> {
    match tensor.shape().size_of(dim) {
        Some(size) if size == count => Ok(tensor.unstack(dim)),
        Some(_) => Ok(vec![tensor.index(dim, 0)?; count]),
        None => Ok(vec![tensor.clone(); count]),
    }
}

/// Gives `tensor` a `vector` channel dimension if it has none, so that it applies
/// equally to every axis.
fn as_corner(tensor: Tensor) -> Result<Tensor, ConstructionError> {
    match tensor.shape().get(VECTOR).map(Dim::kind) {
        None => Ok(tensor.with_singleton_dim(VECTOR, DimKind::Channel)?),
        Some(DimKind::Channel) => Ok(tensor),
        Some(kind) => Err(ConstructionError::new(ConstructionKind::NotChannel { kind })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Interval;
    use crate::tensor::Tolerance;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn unit_box() -> Box {
        Box::from_lower_upper([0.0, 0.0], [10.0, 20.0])
    }

    fn points(coordinates: &[[f64; 2]]) -> Tensor {
        Tensor::from_fn(
            Shape::new([Dim::batch("points", coordinates.len()), Dim::vector(2)]).unwrap(),
            |index| coordinates[index[0]][index[1]],
        )
    }

    #[test]
    fn derived_tensors() {
        let b = unit_box();
        assert_eq!(b.rank(), 2);
        assert_eq!(b.center(), &Tensor::from([5.0, 10.0]));
        assert_eq!(b.size(), &Tensor::from([10.0, 20.0]));
        assert_eq!(b.half_size(), &Tensor::from([5.0, 10.0]));
        assert_eq!(b.bounding_half_extent(), Tensor::from([5.0, 10.0]));
        assert!(
            b.bounding_radius()
                .close(&Tensor::scalar(20.0 * core::f64::consts::SQRT_2))
        );
    }

    #[test]
    fn local_global() {
        let b = unit_box();
        let local = b.global_to_local(&Tensor::from([5.0, 5.0])).unwrap();
        assert_eq!(local, Tensor::from([0.5, 0.25]));
        assert_eq!(
            b.local_to_global(&local).unwrap(),
            Tensor::from([5.0, 5.0])
        );
    }

    #[test]
    fn zero_size_axis_is_not_an_error() {
        let flat = Box::from_lower_upper([0.0, 1.0], [2.0, 1.0]);
        let local = flat.global_to_local(&Tensor::from([1.0, 2.0])).unwrap();
        assert_eq!(local.values()[0], 0.5);
        assert_eq!(local.values()[1], f64::INFINITY);
    }

    #[test]
    fn get_lower_upper() {
        let b = unit_box();
        assert_eq!(b.get_upper(1).unwrap(), Tensor::scalar(20.0));
        assert_eq!(
            b.get_lower(2),
            Err(ShapeError::IndexOutOfRange {
                name: VECTOR.into(),
                index: 2,
                size: 2
            })
        );

        let isotropic = Box::from_lower_upper(-1.0, 1.0);
        assert_eq!(isotropic.rank(), 1);
        for axis in 0..5 {
            assert_eq!(isotropic.get_lower(axis).unwrap(), Tensor::scalar(-1.0));
        }
    }

    #[test]
    fn lies_inside_keeps_batch_dims() {
        let b = unit_box();
        let inside = b
            .lies_inside(&points(&[[5.0, 10.0], [15.0, 10.0], [10.0, 20.0]]))
            .unwrap();
        assert_eq!(
            inside,
            Tensor::from_vec(
                Shape::new_batch([("points", 3)]).unwrap(),
                vec![true, false, true]
            )
            .unwrap()
        );
    }

    #[rstest]
    #[case([5.0, 10.0], -5.0)]
    #[case([1.0, 10.0], -1.0)]
    #[case([0.0, 3.0], 0.0)]
    #[case([-2.0, 10.0], 2.0)]
    #[case([13.0, 25.0], 5.0)]
    fn signed_distance(#[case] point: [f64; 2], #[case] expected: f64) {
        let distance = unit_box()
            .approximate_signed_distance(&Tensor::from(point))
            .unwrap();
        assert_eq!(distance, Tensor::scalar(expected));
    }

    #[rstest]
    fn signed_distance_unbounded_is_nan(#[values(-1e6, 0.0, 5.0, 10.0)] x: f64) {
        let half_line = Box::from_intervals([Interval::from(..5.0)]).unwrap();
        let distance = half_line
            .approximate_signed_distance(&Tensor::from([x]))
            .unwrap();
        assert!(distance.as_scalar().unwrap().is_nan(), "{distance:?}");
    }

    #[test]
    fn representations_agree() {
        let b = unit_box();
        let cuboid = b.center_representation();
        assert_eq!(cuboid.center(), b.center());
        assert_eq!(cuboid.half_size(), b.half_size());
        assert_eq!(cuboid.corner_representation(), b);
        assert_eq!(cuboid.shape(), &b.shape().without(VECTOR));
    }

    #[test]
    fn contains() {
        let outer = unit_box();
        let inner = Box::from_lower_upper([1.0, 1.0], [2.0, 2.0]);
        assert_eq!(outer.contains(&inner), Ok(true));
        assert_eq!(inner.contains(&outer), Ok(false));
        assert_eq!(
            outer.contains(&Cuboid::from_center_half_size([5.0, 10.0], [5.0, 10.0])),
            Ok(true)
        );
    }

    #[test]
    fn contains_requires_every_batch_element() {
        let outer = unit_box();
        let lower = points(&[[1.0, 1.0], [-1.0, 1.0]]);
        let batch = Box::new(lower, [2.0, 2.0]).unwrap();
        assert_eq!(outer.contains(&batch), Ok(false));
        assert_eq!(outer.contains(&batch.unstack("points").unwrap()[0]), Ok(true));
    }

    #[test]
    fn contains_rejects_non_box() {
        let rotated = unit_box().rotated(&Tensor::scalar(0.5)).unwrap();
        assert!(matches!(
            unit_box().contains(&rotated),
            Err(GeometryError::UnsupportedOperand(_))
        ));
    }

    #[test]
    fn contains_shape_mismatch() {
        let b3 = Box::from_lower_upper([0.0, 0.0, 0.0], [1.0, 1.0, 1.0]);
        assert!(matches!(
            unit_box().contains(&b3),
            Err(GeometryError::Shape(ShapeError::IncompatibleSize { .. }))
        ));
    }

    #[test]
    fn not_channel_vector() {
        let lower = Tensor::filled(Shape::new_batch([(VECTOR, 2)]).unwrap(), 0.0);
        assert_eq!(
            Box::new(lower, 1.0).unwrap_err(),
            ConstructionError::new(ConstructionKind::NotChannel {
                kind: DimKind::Batch
            })
        );
    }

    #[test]
    fn unstack_rejects_non_batch_dim() {
        let center = Tensor::meshgrid(&[Tensor::linspace(
            0.0,
            1.0,
            Dim::spatial("x", 3),
        )])
        .unwrap();
        let tensors = BoxTensors::from_center_half_size(center, Tensor::scalar(0.5)).unwrap();
        assert_eq!(
            tensors.unstack("x").unwrap_err(),
            ShapeError::WrongKind {
                name: "x".into(),
                expected: DimKind::Batch,
                actual: DimKind::Spatial
            }
        );
        assert_eq!(tensors.unstack("absent").unwrap().len(), 1);
    }

    #[test]
    fn unstack_repeats_broadcast_operands() {
        let upper = points(&[[1.0, 1.0], [2.0, 3.0]]);
        let b = Box::new([0.0, 0.0], upper).unwrap();
        let parts = b.unstack("points").unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1].lower(), &Tensor::from([0.0, 0.0]));
        assert_eq!(parts[1].upper(), &Tensor::from([2.0, 3.0]));
        assert!(
            parts[1]
                .center()
                .close_with(&Tensor::from([1.0, 1.5]), Tolerance::EXACT)
        );
        assert!(!parts[1].shape().contains("points"));
    }
}
