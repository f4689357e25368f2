use alloc::string::String;
use core::fmt;

use crate::tensor::{DimKind, Shape, ShapeError};

/// Error when a box or grid cannot be constructed from the given input.
///
/// This may be because the defining tensors cannot be broadcast against each other,
/// or because they do not describe coordinates of a consistent rank. When the cause is
/// a [`ShapeError`], its message is shown as this error’s own.
#[derive(Clone, Debug, displaydoc::Display, PartialEq)]
#[displaydoc("{0}")]
pub struct ConstructionError(ConstructionKind);

/// Error details for [`ConstructionError`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ConstructionKind {
    Shape(ShapeError),
    AxisOutOfRange {
        axis: usize,
        rank: usize,
    },
    NotChannel {
        kind: DimKind,
    },
    NonSpatialResolution {
        resolution: Shape,
    },
    RankMismatch {
        resolution: Shape,
        bounds: usize,
    },
    Step {
        axis: usize,
        step: f64,
    },
}

impl fmt::Display for ConstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstructionKind::Shape(error) => fmt::Display::fmt(error, f),
            ConstructionKind::AxisOutOfRange { axis, rank } => {
                write!(f, "axis {axis} is out of range for a box of rank {rank}")
            }
            ConstructionKind::NotChannel { kind } => write!(
                f,
                "coordinate components must be a channel dimension, not {kind:?}"
            ),
            ConstructionKind::NonSpatialResolution { resolution } => write!(
                f,
                "grid resolution {resolution:?} must have only spatial dimensions"
            ),
            ConstructionKind::RankMismatch { resolution, bounds } => write!(
                f,
                "grid resolution {resolution:?} has rank {rank} but its bounds have rank {bounds}",
                rank = resolution.rank(),
            ),
            ConstructionKind::Step { axis, step } => write!(
                f,
                "interval for axis {axis} has step {step}, but only a step of 1 is supported"
            ),
        }
    }
}

impl ConstructionError {
    pub(crate) fn new(kind: ConstructionKind) -> Self {
        Self(kind)
    }
}

impl From<ShapeError> for ConstructionError {
    #[inline]
    fn from(error: ShapeError) -> Self {
        Self(ConstructionKind::Shape(error))
    }
}

impl core::error::Error for ConstructionError {
    #[allow(clippy::missing_inline_in_public_items)]
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match &self.0 {
            // Display is already the wrapped error’s, so skip to its source.
            ConstructionKind::Shape(error) => error.source(),
            _ => None,
        }
    }
}

/// Error when an operation that only makes sense between boxes is given some other
/// [`Geometry`](crate::geom::Geometry).
#[derive(Clone, Debug, displaydoc::Display, Eq, PartialEq)]
#[displaydoc("only boxes are supported, not {operand}")]
pub struct UnsupportedOperandError {
    /// Description of the rejected operand.
    pub(crate) operand: String,
}

impl core::error::Error for UnsupportedOperandError {}

/// Error from an operation between two geometries.
#[derive(Clone, Debug, displaydoc::Display, PartialEq)]
#[non_exhaustive]
pub enum GeometryError {
    /// {0}
    Construction(ConstructionError),
    /// {0}
    UnsupportedOperand(UnsupportedOperandError),
    /// {0}
    Shape(ShapeError),
}

impl core::error::Error for GeometryError {
    #[allow(clippy::missing_inline_in_public_items)]
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            GeometryError::Construction(error) => error.source(),
            GeometryError::UnsupportedOperand(error) => error.source(),
            GeometryError::Shape(error) => error.source(),
        }
    }
}

impl From<ConstructionError> for GeometryError {
    #[inline]
    fn from(error: ConstructionError) -> Self {
        Self::Construction(error)
    }
}

impl From<UnsupportedOperandError> for GeometryError {
    #[inline]
    fn from(error: UnsupportedOperandError) -> Self {
        Self::UnsupportedOperand(error)
    }
}

impl From<ShapeError> for GeometryError {
    #[inline]
    fn from(error: ShapeError) -> Self {
        Self::Shape(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::Dim;
    use alloc::string::ToString as _;
    use core::error::Error as _;
    use pretty_assertions::assert_eq;

    #[test]
    fn shape_error_message_is_shown() {
        let cause = ShapeError::SpatialRank {
            shape: Shape::new([Dim::spatial("u", 4), Dim::vector(2)]).unwrap(),
            spatial_rank: 1,
            vector_size: 2,
        };
        let error = ConstructionError::from(cause.clone());
        assert_eq!(error.to_string(), cause.to_string());
        assert_eq!(
            error.to_string(),
            "shape (u:s=4, vector:c=2) has 1 spatial dimensions but 2 vector components"
        );
        assert!(error.source().is_none());
    }

    #[test]
    fn axis_out_of_range_message() {
        assert_eq!(
            ConstructionError::new(ConstructionKind::AxisOutOfRange { axis: 3, rank: 3 })
                .to_string(),
            "axis 3 is out of range for a box of rank 3"
        );
    }

    #[test]
    fn resolution_messages() {
        let resolution = Shape::new([Dim::batch("b", 2)]).unwrap();
        assert_eq!(
            ConstructionError::new(ConstructionKind::NonSpatialResolution { resolution })
                .to_string(),
            "grid resolution (b:b=2) must have only spatial dimensions"
        );
        let resolution = Shape::new_spatial([("x", 4)]).unwrap();
        assert_eq!(
            ConstructionError::new(ConstructionKind::RankMismatch {
                resolution,
                bounds: 2
            })
            .to_string(),
            "grid resolution (x:s=4) has rank 1 but its bounds have rank 2"
        );
    }

    #[test]
    fn geometry_error_display_is_transparent() {
        let error = GeometryError::from(UnsupportedOperandError {
            operand: "RotatedBox".into(),
        });
        assert_eq!(error.to_string(), "only boxes are supported, not RotatedBox");
        assert!(error.source().is_none());
    }
}
