//! Batched N-dimensional axis-aligned boxes.
//!
//! Every geometry in this crate carries a [`Shape`](tensor::Shape) describing how many
//! boxes it stands for: a single [`Box`](geom::Box) and a box per simulation sample or
//! per grid cell are the same type and go through the same code path.
//!
//! * [`tensor`] is the named-dimension array layer (batch, spatial and channel
//!   dimensions, broadcasting by name).
//! * [`geom`] defines the [`AbstractBox`](geom::AbstractBox) contract and its
//!   variants [`Box`](geom::Box), [`Cuboid`](geom::Cuboid) and
//!   [`GridCell`](geom::GridCell).
//!
//! The crate is `no_std` compatible; enable the `std` feature when `std` is available.

#![no_std]
// Crate-specific lint settings. (General settings can be found in the workspace manifest.)
#![cfg_attr(
    not(test),
    warn(clippy::std_instead_of_core, clippy::std_instead_of_alloc)
)]
#![warn(clippy::missing_inline_in_public_items)]

#[cfg(any(feature = "std", test))]
#[cfg_attr(test, macro_use)]
extern crate std;
#[macro_use]
extern crate alloc;

pub mod geom;

pub mod tensor;

// Tensors and boxes convert from euclid points, vectors, sizes and boxes.
#[doc(hidden)]
pub use euclid;
