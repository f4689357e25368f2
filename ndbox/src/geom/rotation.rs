use alloc::vec::Vec;

use crate::geom::{AbstractBox, Cuboid, Geometry};
use crate::tensor::{Dim, DimKind, Shape, ShapeError, Tensor, VECTOR};

/// A box rotated about its center in the plane of its first two axes.
///
/// Produced by [`AbstractBox::rotated()`]. This is not itself an axis-aligned box,
/// so it can be queried as a [`Geometry`] but not used with [`AbstractBox::contains()`].
#[derive(Clone, Debug)]
pub struct RotatedBox {
    cuboid: Cuboid,
    /// Radians, counterclockwise from the first axis toward the second.
    angle: Tensor,
    cos: Tensor,
    sin: Tensor,
    shape: Shape,
    half_extent: Tensor,
}

impl RotatedBox {
    /// Rotates `cuboid` by `angle` radians. `angle` may be batched.
    ///
    /// Returns an error if the cuboid has fewer than two axes, or if `angle` cannot be
    /// broadcast against it.
    #[allow(clippy::missing_inline_in_public_items)]
    pub fn new(cuboid: Cuboid, angle: Tensor) -> Result<Self, ShapeError> {
        let rank = cuboid.rank();
        if rank < 2 {
            return Err(ShapeError::IndexOutOfRange {
                name: VECTOR.into(),
                index: 1,
                size: rank,
            });
        }
        let shape = cuboid.shape().combined(angle.shape())?;
        let cos = angle.map(libm::cos);
        let sin = angle.map(libm::sin);

        // Axis-aligned extent of the rotated box: each of the first two axes receives a
        // share of both half sizes.
        let half_size = cuboid.half_size();
        let half_size = half_size.broadcast_to(&half_size.shape().with_dim(Dim::vector(rank)))?;
        let (h0, h1) = (half_size.index(VECTOR, 0)?, half_size.index(VECTOR, 1)?);
        let (cos_abs, sin_abs) = (cos.abs(), sin.abs());
        let mut components = vec![
            cos_abs.try_mul(&h0)?.try_add(&sin_abs.try_mul(&h1)?)?,
            sin_abs.try_mul(&h0)?.try_add(&cos_abs.try_mul(&h1)?)?,
        ];
        for axis in 2..rank {
            components.push(half_size.index(VECTOR, axis)?);
        }
        let half_extent = Tensor::stack(&components, VECTOR, DimKind::Channel)?;

        Ok(Self {
            cuboid,
            angle,
            cos,
            sin,
            shape,
            half_extent,
        })
    }

    /// The box before rotation.
    #[inline]
    pub fn cuboid(&self) -> &Cuboid {
        &self.cuboid
    }

    /// The rotation angle in radians.
    #[inline]
    pub fn angle(&self) -> &Tensor {
        &self.angle
    }

    /// Rotates points about the center by `-angle`, into the frame in which the box is
    /// axis-aligned.
    fn to_box_frame(&self, point: &Tensor) -> Result<Tensor, ShapeError> {
        let center = self.cuboid.center();
        let offset = point.try_sub(center)?;
        let components: Vec<Tensor> = offset.unstack(VECTOR);
        let [x, y, rest @ ..] = components.as_slice() else {
            return Err(ShapeError::IndexOutOfRange {
                name: VECTOR.into(),
                index: 1,
                size: components.len(),
            });
        };
        let mut rotated = vec![
            x.try_mul(&self.cos)?.try_add(&y.try_mul(&self.sin)?)?,
            y.try_mul(&self.cos)?.try_sub(&x.try_mul(&self.sin)?)?,
        ];
        rotated.extend(rest.iter().cloned());
        Tensor::stack(&rotated, VECTOR, DimKind::Channel)?.try_add(center)
    }
}

impl Geometry for RotatedBox {
    /// The shape of the cuboid combined with the shape of the angle.
    #[inline]
    fn shape(&self) -> &Shape {
        &self.shape
    }

    #[inline]
    fn center(&self) -> &Tensor {
        self.cuboid.center()
    }

    /// Rotation does not change the distance from the center to the corners.
    #[inline]
    fn bounding_radius(&self) -> Tensor {
        self.cuboid.bounding_radius()
    }

    #[inline]
    fn bounding_half_extent(&self) -> Tensor {
        self.half_extent.clone()
    }

    #[inline]
    fn lies_inside(&self, point: &Tensor) -> Result<Tensor<bool>, ShapeError> {
        self.cuboid.lies_inside(&self.to_box_frame(point)?)
    }

    #[inline]
    fn approximate_signed_distance(&self, point: &Tensor) -> Result<Tensor, ShapeError> {
        self.cuboid
            .approximate_signed_distance(&self.to_box_frame(point)?)
    }
}
