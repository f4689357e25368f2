use alloc::vec::Vec;
use core::fmt;
use core::hash::{Hash, Hasher};

use crate::geom::{
    AbstractBox, Box, ConstructionError, ConstructionKind, Cuboid, Geometry, abstract_box,
};
use crate::tensor::{DimKind, Shape, ShapeError, Tensor};

/// The cells of a regular grid dividing some bounding box, as one batched [`Cuboid`].
///
/// The cuboid has the spatial dimensions of the grid’s resolution, and one cell per
/// element of them, in addition to any batch dimensions of the bounds.
///
/// ```
/// use ndbox::geom::{AbstractBox, Box, Geometry, GridCell};
/// use ndbox::tensor::{Shape, Tensor};
///
/// let grid = GridCell::new(
///     Shape::new_spatial([("x", 4)]).unwrap(),
///     &Box::from_lower_upper([0.0], [1.0]),
/// )
/// .unwrap();
/// assert_eq!(grid.center().values(), &[0.125, 0.375, 0.625, 0.875]);
/// assert_eq!(grid.half_size(), &Tensor::from([0.125]));
/// ```
///
/// Two grids are equal when their resolutions and bounds are; the cell tensors derived
/// from those are not compared.
#[derive(Clone)]
pub struct GridCell {
    cuboid: Cuboid,
    resolution: Shape,
    bounds: Box,
}

impl GridCell {
    /// Divides `bounds` into `resolution` cells.
    ///
    /// Each dimension of `resolution` must be spatial, and there must be one for each
    /// axis of `bounds` (unless `bounds` has the same extent on every axis).
    #[allow(clippy::missing_inline_in_public_items)]
    pub fn new(resolution: Shape, bounds: &dyn AbstractBox) -> Result<Self, ConstructionError> {
        if !resolution.is_purely_spatial() {
            return Err(ConstructionError::new(
                ConstructionKind::NonSpatialResolution { resolution },
            ));
        }
        let rank = bounds.rank();
        if rank != 1 && resolution.rank() != rank {
            return Err(ConstructionError::new(ConstructionKind::RankMismatch {
                resolution,
                bounds: rank,
            }));
        }

        // Cell centers in the unit cube.
        let axes: Vec<Tensor> = resolution
            .dims()
            .iter()
            .map(|dim| {
                let n = dim.size() as f64;
                Tensor::linspace(0.5 / n, 1.0 - 0.5 / n, dim.clone())
            })
            .collect();
        let local = Tensor::meshgrid(&axes)?;

        let counts = Tensor::vector(resolution.sizes().map(|n| n as f64));
        let cuboid = Cuboid::new(
            bounds.local_to_global(&local)?,
            bounds.size().try_div(&counts)? * 0.5,
        )?;
        log::trace!(
            "divided {bounds:?} into {resolution:?}, {cells} cells",
            cells = resolution.volume(),
        );

        Ok(Self {
            cuboid,
            resolution,
            bounds: bounds.corner_representation(),
        })
    }

    /// The number of cells along each spatial dimension.
    #[inline]
    pub fn resolution(&self) -> &Shape {
        &self.resolution
    }

    /// The region the cells divide.
    #[inline]
    pub fn bounds(&self) -> &Box {
        &self.bounds
    }

    /// The size of the whole grid, which is the size of [`bounds`](Self::bounds).
    #[inline]
    pub fn grid_size(&self) -> &Tensor {
        self.bounds.size()
    }

    /// The cells as a plain [`Cuboid`].
    #[inline]
    pub fn cuboid(&self) -> &Cuboid {
        &self.cuboid
    }

    /// Returns the cells as a [`Cuboid`] with the spatial dimensions flattened into a
    /// single batch dimension named `dim_name`, for iterating over cells in a flat list.
    ///
    /// Cells are listed in row-major order of the resolution’s dimensions.
    #[allow(clippy::missing_inline_in_public_items)]
    pub fn list_cells(&self, dim_name: &str) -> Result<Cuboid, ConstructionError> {
        let spatial = self.cuboid.shape().spatial();
        let names: Vec<&str> = spatial.names().collect();
        let center = self
            .cuboid
            .center()
            .join_dims(&names, dim_name, DimKind::Batch)?;
        log::trace!("listing {spatial:?} cells as {dim_name:?}");
        Cuboid::new(center, self.cuboid.half_size().clone())
    }
}

impl AbstractBox for GridCell {
    #[inline]
    fn lower(&self) -> &Tensor {
        self.cuboid.lower()
    }

    #[inline]
    fn upper(&self) -> &Tensor {
        self.cuboid.upper()
    }

    #[inline]
    fn half_size(&self) -> &Tensor {
        self.cuboid.half_size()
    }

    #[inline]
    fn size(&self) -> &Tensor {
        self.cuboid.size()
    }

    /// Returns the grid of the same resolution over the shifted bounds.
    #[inline]
    fn shifted(&self, delta: &Tensor) -> Result<Self, ConstructionError> {
        Self::new(self.resolution.clone(), &self.bounds.shifted(delta)?)
    }

    /// Splits a grid with batched bounds into one grid per bounds element.
    ///
    /// The dimensions of the resolution cannot be unstacked; use
    /// [`list_cells()`](Self::list_cells) first to get the cells as a batch.
    #[allow(clippy::missing_inline_in_public_items)]
    fn unstack(&self, dim: &str) -> Result<Vec<Self>, ShapeError> {
        if let Some(found) = self.resolution.get(dim) {
            return Err(ShapeError::WrongKind {
                name: dim.into(),
                expected: DimKind::Batch,
                actual: found.kind(),
            });
        }
        Ok(self
            .cuboid
            .unstack(dim)?
            .into_iter()
            .zip(self.bounds.unstack(dim)?)
            .map(|(cuboid, bounds)| Self {
                cuboid,
                resolution: self.resolution.clone(),
                bounds,
            })
            .collect())
    }
}

impl Geometry for GridCell {
    #[inline]
    fn shape(&self) -> &Shape {
        self.cuboid.shape()
    }

    #[inline]
    fn center(&self) -> &Tensor {
        self.cuboid.center()
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

impl PartialEq for GridCell {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.resolution == other.resolution && self.bounds == other.bounds
    }
}

impl Hash for GridCell {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.resolution.hash(state);
        self.bounds.hash(state);
    }
}

impl fmt::Debug for GridCell {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridCell")
            .field("resolution", &self.resolution)
            .field("bounds", &self.bounds)
            .finish_non_exhaustive()
    }
}
