use alloc::vec::Vec;
use core::fmt;
use core::hash::{Hash, Hasher};

use crate::geom::abstract_box::{self, BoxTensors};
use crate::geom::{AbstractBox, ConstructionError, Geometry};
use crate::tensor::{Shape, ShapeError, Tensor, VECTOR};

/// Axis-aligned box(es) defined by their `center` and `half_size`.
///
/// This describes the same regions as [`Box`](crate::geom::Box); the difference is
/// which pair of tensors is given and which is derived, and that the
/// [`shape`](Geometry::shape) of a [`Cuboid`] excludes the `vector` dimension.
#[derive(Clone)]
pub struct Cuboid {
    tensors: BoxTensors,
    /// `tensors.shape` without the `vector` dimension.
    shape: Shape,
}

impl Cuboid {
    /// Constructs a [`Cuboid`] from its center and half size.
    ///
    /// Each may be a scalar (the same value on every axis), an array of per-axis values,
    /// or a [`Tensor`].
    ///
    /// Returns an error if they cannot be broadcast against each other.
    #[allow(clippy::missing_inline_in_public_items, reason = "is generic already")]
    pub fn new(
        center: impl Into<Tensor>,
        half_size: impl Into<Tensor>,
    ) -> Result<Self, ConstructionError> {
        BoxTensors::from_center_half_size(center.into(), half_size.into()).map(Self::from_tensors)
    }

    /// Constructs a [`Cuboid`] from its center and half size.
    ///
    /// Panics if they cannot be broadcast against each other;
    /// [`Cuboid::new()`] is the non-panicking version.
    #[track_caller]
    #[allow(clippy::missing_inline_in_public_items, reason = "is generic already")]
    pub fn from_center_half_size(
        center: impl Into<Tensor>,
        half_size: impl Into<Tensor>,
    ) -> Self {
        match Self::new(center, half_size) {
            Ok(cuboid) => cuboid,
            Err(error) => panic!("Cuboid::from_center_half_size: {error}"),
        }
    }

    /// Constructs a [`Cuboid`] from its center and full size.
    #[allow(clippy::missing_inline_in_public_items, reason = "is generic already")]
    pub fn from_center_size(
        center: impl Into<Tensor>,
        size: impl Into<Tensor>,
    ) -> Result<Self, ConstructionError> {
        let size: Tensor = size.into();
        Self::new(center, size * 0.5)
    }

    pub(crate) fn from_tensors(tensors: BoxTensors) -> Self {
        Self {
            shape: tensors.shape.without(VECTOR),
            tensors,
        }
    }
}

impl AbstractBox for Cuboid {
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

    /// Moves the center; the half size is unchanged.
    #[inline]
    fn shifted(&self, delta: &Tensor) -> Result<Self, ConstructionError> {
        Self::new(self.center().try_add(delta)?, self.half_size().clone())
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

impl Geometry for Cuboid {
    /// The batch and spatial dimensions, without the `vector` dimension.
    #[inline]
    fn shape(&self) -> &Shape {
        &self.shape
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

impl PartialEq for Cuboid {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape
            && self.center().close(other.center())
            && self.half_size().close(other.half_size())
    }
}

impl Hash for Cuboid {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.shape.hash(state);
    }
}

impl fmt::Debug for Cuboid {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cuboid")
            .field("shape", &self.shape)
            .field("center", self.center())
            .field("half_size", self.half_size())
            .finish()
    }
}
