//! Named-dimension arrays.
//!
//! A [`Tensor`] is a dense array whose axes are identified by name rather than by
//! position. Each axis is a [`Dim`] of some [`DimKind`]:
//!
//! * *batch* dimensions enumerate independent instances,
//! * *spatial* dimensions are the axes of a grid,
//! * *channel* dimensions hold fixed-meaning components; the geometry in this crate
//!   uses exactly one, named [`VECTOR`], for coordinate components.
//!
//! Arithmetic between tensors broadcasts over dimensions with matching names; a
//! dimension missing from one operand, or present with size 1, is repeated to match.
//! Storage and the positional array operations are provided by [`ndarray`]; this module
//! adds the names.

mod array;
pub use array::*;
mod shape;
pub use shape::*;

/// Name of the channel dimension holding the per-axis components of coordinates.
pub const VECTOR: &str = "vector";
