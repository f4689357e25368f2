use core::fmt;

use crate::geom::{AbstractBox, Box, GeometryError};
use crate::tensor::{Shape, ShapeError, Tensor};

/// A batched region of space which can be queried with points.
///
/// Points are tensors with a [`VECTOR`](crate::tensor::VECTOR) dimension; query results
/// broadcast the point’s other dimensions against the geometry’s own [`shape`](Self::shape).
pub trait Geometry: fmt::Debug {
    /// The batch and spatial dimensions over which this value holds separate geometries.
    ///
    /// Whether the `vector` dimension is included depends on the implementation.
    fn shape(&self) -> &Shape;

    /// The center point of each geometry.
    fn center(&self) -> &Tensor;

    /// Radius of a sphere around [`center`](Self::center) which encloses the geometry.
    fn bounding_radius(&self) -> Tensor;

    /// Half of the per-axis extent of an axis-aligned box around
    /// [`center`](Self::center) which encloses the geometry.
    fn bounding_half_extent(&self) -> Tensor;

    /// Whether each point lies inside (or on the surface of) the geometry.
    /// The result lacks the `vector` dimension.
    fn lies_inside(&self, point: &Tensor) -> Result<Tensor<bool>, ShapeError>;

    /// An estimate of the distance from each point to the surface of the geometry,
    /// negative inside. The result lacks the `vector` dimension.
    fn approximate_signed_distance(&self, point: &Tensor) -> Result<Tensor, ShapeError>;

    /// Returns this geometry as an axis-aligned box, if it is one.
    ///
    /// Operations which are only defined between boxes, such as
    /// [`AbstractBox::contains()`], use this to accept any `&dyn Geometry`.
    #[inline]
    fn as_box(&self) -> Option<&dyn AbstractBox> {
        None
    }
}

/// Returns the smallest [`Box`] which encloses the [bounding half
/// extent](Geometry::bounding_half_extent) of `geometry` around its center.
///
/// ```
/// use ndbox::geom::{bounding_box, AbstractBox, Cuboid};
/// use ndbox::tensor::Tensor;
///
/// let cuboid = Cuboid::from_center_half_size([1.0, 1.0], [0.5, 2.0]);
/// let bounds = bounding_box(&cuboid).unwrap();
/// assert_eq!(bounds.lower(), &Tensor::from([0.5, -1.0]));
/// assert_eq!(bounds.upper(), &Tensor::from([1.5, 3.0]));
/// ```
#[allow(clippy::missing_inline_in_public_items)]
pub fn bounding_box(geometry: &dyn Geometry) -> Result<Box, GeometryError> {
    let center = geometry.center();
    let extent = geometry.bounding_half_extent();
    Ok(Box::new(center.try_sub(&extent)?, center.try_add(&extent)?)?)
}
