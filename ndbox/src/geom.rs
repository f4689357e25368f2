//! Axis-aligned box geometry over named-dimension tensors.
//!
//! All geometries here are *batched*: their defining tensors may carry batch and spatial
//! dimensions in addition to the [`VECTOR`](crate::tensor::VECTOR) channel, and then a
//! single value stands for one box per element of those dimensions. Queries broadcast
//! against their arguments by dimension name, so “is this point inside this box” and
//! “which of these million points is inside which of these boxes” are the same call.
//!
//! The box variants are:
//!
//! * [`Box`], defined by its `lower` and `upper` corners,
//! * [`Cuboid`], defined by its `center` and `half_size`,
//! * [`GridCell`], the cells of a regular grid partition of some bounding box.
//!
//! They share their behavior through the [`AbstractBox`] trait, and any [`Geometry`]
//! can be turned into an enclosing [`Box`] by [`bounding_box()`].

mod aab;
pub use aab::*;
mod abstract_box;
pub use abstract_box::*;
mod cuboid;
pub use cuboid::*;
mod error;
pub use error::*;
mod geometry;
pub use geometry::*;
mod grid_cell;
pub use grid_cell::*;
mod interval;
pub use interval::*;
mod rotation;
pub use rotation::*;
