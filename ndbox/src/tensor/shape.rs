use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::tensor::VECTOR;

/// The role a [`Dim`] plays when tensors are combined.
///
/// The derived ordering is the canonical order of dimensions within a [`Shape`].
#[expect(clippy::exhaustive_enums)]
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, exhaust::Exhaust)]
pub enum DimKind {
    /// Independent instances, such as separate simulation samples.
    Batch,
    /// An axis of a grid or discretization.
    Spatial,
    /// Fixed-meaning components of a value, such as the [`VECTOR`] axis.
    Channel,
}

impl DimKind {
    /// Single-letter abbreviation used by [`Shape`]’s `Debug` format.
    const fn letter(self) -> char {
        match self {
            DimKind::Batch => 'b',
            DimKind::Spatial => 's',
            DimKind::Channel => 'c',
        }
    }
}

/// One named, sized axis of a [`Shape`].
#[derive(Clone, Eq, Hash, PartialEq)]
pub struct Dim {
    name: String,
    kind: DimKind,
    size: usize,
}

impl Dim {
    /// Constructs a [`Dim`] from its parts.
    #[inline]
    pub fn new(name: impl Into<String>, kind: DimKind, size: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            size,
        }
    }

    /// Constructs a [`DimKind::Batch`] dimension.
    #[inline]
    pub fn batch(name: impl Into<String>, size: usize) -> Self {
        Self::new(name, DimKind::Batch, size)
    }

    /// Constructs a [`DimKind::Spatial`] dimension.
    #[inline]
    pub fn spatial(name: impl Into<String>, size: usize) -> Self {
        Self::new(name, DimKind::Spatial, size)
    }

    /// Constructs a [`DimKind::Channel`] dimension.
    #[inline]
    pub fn channel(name: impl Into<String>, size: usize) -> Self {
        Self::new(name, DimKind::Channel, size)
    }

    /// Constructs the [`VECTOR`] channel dimension for coordinates of the given rank.
    #[inline]
    pub fn vector(rank: usize) -> Self {
        Self::channel(VECTOR, rank)
    }

    /// The name that identifies this dimension within a [`Shape`].
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this is a batch, spatial or channel dimension.
    #[inline]
    pub fn kind(&self) -> DimKind {
        self.kind
    }

    /// Number of positions along this dimension.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns a copy of this dimension with a different size.
    #[inline]
    #[must_use]
    pub fn with_size(&self, size: usize) -> Self {
        Self {
            size,
            ..self.clone()
        }
    }
}

impl fmt::Debug for Dim {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}={}", self.name, self.kind.letter(), self.size)
    }
}

/// Ordered collection of uniquely named [`Dim`]s describing the axes of a
/// [`Tensor`](crate::tensor::Tensor) or the batch layout of a geometry.
///
/// Dimensions are kept in canonical order: all batch dimensions, then spatial, then
/// channel. Within one kind, the order in which dimensions were first supplied is kept.
#[derive(Clone, Default, Eq, Hash, PartialEq)]
pub struct Shape {
    /// Invariant: names are unique and kinds are sorted.
    dims: Vec<Dim>,
}

impl Shape {
    /// The shape with no dimensions, which has a volume of 1.
    pub const SCALAR: Shape = Shape { dims: Vec::new() };

    /// Constructs a [`Shape`] from dimensions in any kind order.
    ///
    /// Returns [`Err`] if two dimensions have the same name.
    #[allow(clippy::missing_inline_in_public_items, reason = "is generic already")]
    pub fn new(dims: impl IntoIterator<Item = Dim>) -> Result<Self, ShapeError> {
        let mut dims: Vec<Dim> = dims.into_iter().collect();
        for (i, dim) in dims.iter().enumerate() {
            if dims[..i].iter().any(|earlier| earlier.name == dim.name) {
                return Err(ShapeError::DuplicateName(dim.name.clone()));
            }
        }
        dims.sort_by_key(Dim::kind);
        Ok(Self { dims })
    }

    /// Constructs a purely spatial [`Shape`], such as a grid resolution.
    ///
    /// ```
    /// use ndbox::tensor::Shape;
    ///
    /// let resolution = Shape::new_spatial([("x", 4), ("y", 3)]).unwrap();
    /// assert_eq!(resolution.volume(), 12);
    /// assert!(resolution.is_purely_spatial());
    /// ```
    #[allow(clippy::missing_inline_in_public_items, reason = "is generic already")]
    pub fn new_spatial<N: Into<String>>(
        sizes: impl IntoIterator<Item = (N, usize)>,
    ) -> Result<Self, ShapeError> {
        Self::new(sizes.into_iter().map(|(name, size)| Dim::spatial(name, size)))
    }

    /// Constructs a purely batch [`Shape`].
    #[allow(clippy::missing_inline_in_public_items, reason = "is generic already")]
    pub fn new_batch<N: Into<String>>(
        sizes: impl IntoIterator<Item = (N, usize)>,
    ) -> Result<Self, ShapeError> {
        Self::new(sizes.into_iter().map(|(name, size)| Dim::batch(name, size)))
    }

    /// The dimensions, in canonical order.
    #[inline]
    pub fn dims(&self) -> &[Dim] {
        &self.dims
    }

    /// Number of dimensions.
    #[inline]
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Number of elements a tensor of this shape holds; the product of all sizes.
    #[inline]
    pub fn volume(&self) -> usize {
        self.dims.iter().map(Dim::size).product()
    }

    /// Returns the dimension with the given name, if present.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&Dim> {
        self.dims.iter().find(|dim| dim.name == name)
    }

    /// Returns the position of the dimension with the given name, if present.
    #[inline]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.dims.iter().position(|dim| dim.name == name)
    }

    /// Returns whether a dimension with the given name is present.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the size of the dimension with the given name, if present.
    #[inline]
    pub fn size_of(&self, name: &str) -> Option<usize> {
        self.get(name).map(Dim::size)
    }

    /// Names of all dimensions, in canonical order.
    #[inline]
    pub fn names(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.dims.iter().map(Dim::name)
    }

    /// Sizes of all dimensions, in canonical order.
    #[inline]
    pub fn sizes(&self) -> impl ExactSizeIterator<Item = usize> + '_ {
        self.dims.iter().map(Dim::size)
    }

    fn filtered(&self, predicate: impl Fn(&Dim) -> bool) -> Shape {
        Shape {
            dims: self.dims.iter().filter(|dim| predicate(dim)).cloned().collect(),
        }
    }

    /// The batch dimensions of this shape.
    #[inline]
    pub fn batch(&self) -> Shape {
        self.filtered(|dim| dim.kind == DimKind::Batch)
    }

    /// The spatial dimensions of this shape.
    #[inline]
    pub fn spatial(&self) -> Shape {
        self.filtered(|dim| dim.kind == DimKind::Spatial)
    }

    /// The channel dimensions of this shape.
    #[inline]
    pub fn channel(&self) -> Shape {
        self.filtered(|dim| dim.kind == DimKind::Channel)
    }

    /// All batch and spatial dimensions of this shape.
    #[inline]
    pub fn non_channel(&self) -> Shape {
        self.filtered(|dim| dim.kind != DimKind::Channel)
    }

    /// Number of spatial dimensions.
    #[inline]
    pub fn spatial_rank(&self) -> usize {
        self.dims
            .iter()
            .filter(|dim| dim.kind == DimKind::Spatial)
            .count()
    }

    /// Returns whether every dimension is spatial.
    #[inline]
    pub fn is_purely_spatial(&self) -> bool {
        self.dims.iter().all(|dim| dim.kind == DimKind::Spatial)
    }

    /// Returns this shape without the named dimension; unchanged if it is absent.
    #[inline]
    #[must_use]
    pub fn without(&self, name: &str) -> Shape {
        self.filtered(|dim| dim.name != name)
    }

    /// Returns this shape with `dim` added at the end of its kind’s group,
    /// or replacing an existing dimension of the same name.
    #[allow(clippy::missing_inline_in_public_items)]
    #[must_use]
    pub fn with_dim(&self, dim: Dim) -> Shape {
        let mut dims = self.dims.clone();
        match dims.iter_mut().find(|existing| existing.name == dim.name) {
            Some(existing) => *existing = dim,
            None => {
                let position = dims
                    .iter()
                    .position(|existing| existing.kind > dim.kind)
                    .unwrap_or(dims.len());
                dims.insert(position, dim);
            }
        }
        dims.sort_by_key(Dim::kind);
        Shape { dims }
    }

    /// Combines two shapes into the shape that broadcasting arithmetic between
    /// tensors of these shapes produces.
    ///
    /// Dimensions are matched by name. A dimension present in both must have the same
    /// kind, and sizes which are equal or of which one is 1.
    ///
    /// ```
    /// use ndbox::tensor::{Dim, Shape};
    ///
    /// let points = Shape::new([Dim::batch("points", 5), Dim::vector(2)]).unwrap();
    /// let boxes = Shape::new([Dim::batch("boxes", 3), Dim::vector(2)]).unwrap();
    /// assert_eq!(
    ///     points.combined(&boxes).unwrap(),
    ///     Shape::new([Dim::batch("points", 5), Dim::batch("boxes", 3), Dim::vector(2)])
    ///         .unwrap(),
    /// );
    /// ```
    #[allow(clippy::missing_inline_in_public_items)]
    pub fn combined(&self, other: &Shape) -> Result<Shape, ShapeError> {
        let mut dims = self.dims.clone();
        for dim in &other.dims {
            match dims.iter_mut().find(|existing| existing.name == dim.name) {
                Some(existing) => {
                    if existing.kind != dim.kind {
                        return Err(ShapeError::KindConflict {
                            name: dim.name.clone(),
                            first: existing.kind,
                            second: dim.kind,
                        });
                    }
                    if existing.size == 1 {
                        existing.size = dim.size;
                    } else if dim.size != 1 && dim.size != existing.size {
                        return Err(ShapeError::IncompatibleSize {
                            name: dim.name.clone(),
                            first: existing.size,
                            second: dim.size,
                        });
                    }
                }
                None => dims.push(dim.clone()),
            }
        }
        dims.sort_by_key(Dim::kind);
        Ok(Shape { dims })
    }

    /// Ensures that this shape has one spatial dimension per [`VECTOR`] component.
    ///
    /// A geometry need not be anchored in space; if the shape has no spatial dimensions
    /// at all, size-1 placeholders named by [`spatial_axis_name()`] are added.
    /// A shape with some, but not the right number of, spatial dimensions is an error.
    #[allow(clippy::missing_inline_in_public_items)]
    pub fn fill_spatial_with_singleton(&self) -> Result<Shape, ShapeError> {
        let vector_size = self.size_of(VECTOR).ok_or_else(|| ShapeError::MissingDim {
            name: VECTOR.into(),
            shape: self.clone(),
        })?;
        match self.spatial_rank() {
            rank if rank == vector_size => Ok(self.clone()),
            0 => Ok((0..vector_size).fold(self.clone(), |shape, axis| {
                shape.with_dim(Dim::spatial(spatial_axis_name(axis), 1))
            })),
            spatial_rank => Err(ShapeError::SpatialRank {
                shape: self.clone(),
                spatial_rank,
                vector_size,
            }),
        }
    }
}

impl fmt::Debug for Shape {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Not `debug_tuple`, which would format a single dimension like a 1-tuple.
        f.write_str("(")?;
        for (i, dim) in self.dims.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            fmt::Debug::fmt(dim, f)?;
        }
        f.write_str(")")
    }
}

/// Conventional name of the spatial dimension for coordinate axis `axis`:
/// `x`, `y`, `z`, and then `dim3`, `dim4`, ….
#[allow(clippy::missing_inline_in_public_items)]
pub fn spatial_axis_name(axis: usize) -> String {
    match axis {
        0 => "x".into(),
        1 => "y".into(),
        2 => "z".into(),
        _ => format!("dim{axis}"),
    }
}

/// Error from combining, indexing, or reshaping [`Shape`]s and tensors.
#[derive(Clone, Debug, displaydoc::Display, Eq, PartialEq)]
#[non_exhaustive]
pub enum ShapeError {
    /// dimension {name:?} has incompatible sizes {first} and {second}
    IncompatibleSize {
        /// Name of the mismatched dimension.
        name: String,
        #[allow(missing_docs)]
        first: usize,
        #[allow(missing_docs)]
        second: usize,
    },

    /// dimension {name:?} is used both as {first:?} and as {second:?}
    KindConflict {
        /// Name of the mismatched dimension.
        name: String,
        #[allow(missing_docs)]
        first: DimKind,
        #[allow(missing_docs)]
        second: DimKind,
    },

    /// dimension name {0:?} occurs more than once
    DuplicateName(String),

    /// no dimension named {name:?} in shape {shape:?}
    MissingDim {
        /// The name that was looked up.
        name: String,
        /// The shape that lacked it.
        shape: Shape,
    },

    /// dimension {name:?} is {actual:?} but must be {expected:?}
    WrongKind {
        #[allow(missing_docs)]
        name: String,
        #[allow(missing_docs)]
        expected: DimKind,
        #[allow(missing_docs)]
        actual: DimKind,
    },

    /// index {index} is out of range for dimension {name:?} of size {size}
    IndexOutOfRange {
        #[allow(missing_docs)]
        name: String,
        #[allow(missing_docs)]
        index: usize,
        #[allow(missing_docs)]
        size: usize,
    },

    /// shape {shape:?} holds {expected} elements but {actual} were given
    DataLength {
        #[allow(missing_docs)]
        shape: Shape,
        #[allow(missing_docs)]
        expected: usize,
        #[allow(missing_docs)]
        actual: usize,
    },

    /// shape {shape:?} has {spatial_rank} spatial dimensions but {vector_size} vector components
    SpatialRank {
        #[allow(missing_docs)]
        shape: Shape,
        #[allow(missing_docs)]
        spatial_rank: usize,
        #[allow(missing_docs)]
        vector_size: usize,
    },

    /// tensor of shape {from:?} cannot be broadcast to shape {to:?}
    Broadcast {
        #[allow(missing_docs)]
        from: Shape,
        #[allow(missing_docs)]
        to: Shape,
    },

    /// cannot stack an empty list of tensors
    EmptyStack,
}

impl core::error::Error for ShapeError {}
