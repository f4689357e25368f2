use alloc::vec::Vec;
use core::fmt;
use core::ops;

use ndarray::{ArrayD, ArrayViewD, Axis, Dimension as _, IxDyn, Zip};

/// Acts as polyfill for float methods
#[cfg(not(feature = "std"))]
#[allow(unused_imports)]
use num_traits::float::FloatCore as _;

use crate::tensor::{Dim, DimKind, Shape, ShapeError, VECTOR};

/// Dense array whose axes are the named [`Dim`]s of a [`Shape`].
///
/// The elements are held in an [`ndarray::ArrayD`] with one axis per dimension, in the
/// shape’s canonical order. All binary operations match dimensions by name and broadcast
/// missing or size-1 dimensions; the position of a dimension within the shape never
/// matters to the result.
///
/// Operations never modify a tensor; they return new ones.
#[derive(Clone)]
pub struct Tensor<T = f64> {
    shape: Shape,
    /// Invariant: axis `i` has the size of `shape.dims()[i]`, and the layout is standard
    /// (row-major and contiguous).
    data: ArrayD<T>,
}

fn ix(shape: &Shape) -> IxDyn {
    IxDyn(&shape.sizes().collect::<Vec<_>>())
}

/// Broadcasts a view produced by [`Tensor::expanded()`] to the sizes of `to`.
fn broadcast<'a, T>(
    view: &'a ArrayViewD<'_, T>,
    from: &Shape,
    to: &Shape,
) -> Result<ArrayViewD<'a, T>, ShapeError> {
    view.broadcast(ix(to)).ok_or_else(|| ShapeError::Broadcast {
        from: from.clone(),
        to: to.clone(),
    })
}

impl<T> Tensor<T> {
    /// The dimensions of this tensor.
    #[inline]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// The elements of this tensor in row-major order of its dimensions.
    #[inline]
    pub fn values(&self) -> &[T] {
        // Always present, given the standard layout invariant.
        self.data.as_slice().unwrap_or_default()
    }

    /// A view of this tensor’s elements with the axes rearranged into the order of
    /// `target`, and a length-1 axis inserted for each dimension it lacks.
    ///
    /// Every dimension of this tensor must be present in `target`.
    fn expanded(&self, target: &Shape) -> ArrayViewD<'_, T> {
        let order: Vec<usize> = target
            .names()
            .filter_map(|name| self.shape.index_of(name))
            .collect();
        let mut view = self.data.view().permuted_axes(IxDyn(&order));
        for (axis, dim) in target.dims().iter().enumerate() {
            if !self.shape.contains(dim.name()) {
                view = view.insert_axis(Axis(axis));
            }
        }
        view
    }

    fn axis_of(&self, dim: &str) -> Result<usize, ShapeError> {
        self.shape
            .index_of(dim)
            .ok_or_else(|| ShapeError::MissingDim {
                name: dim.into(),
                shape: self.shape.clone(),
            })
    }
}

impl<T: Clone> Tensor<T> {
    fn from_array(shape: Shape, data: ArrayD<T>) -> Self {
        debug_assert_eq!(data.shape(), ix(&shape).slice());
        let data = if data.is_standard_layout() {
            data
        } else {
            data.as_standard_layout().into_owned()
        };
        Self { shape, data }
    }
}

impl<T: Copy> Tensor<T> {
    /// Constructs a tensor from elements in row-major order.
    ///
    /// Returns [`Err`] if the number of elements does not match the shape’s volume.
    #[allow(clippy::missing_inline_in_public_items)]
    pub fn from_vec(shape: Shape, data: Vec<T>) -> Result<Self, ShapeError> {
        let actual = data.len();
        match ArrayD::from_shape_vec(ix(&shape), data) {
            Ok(data) => Ok(Self { shape, data }),
            Err(_) => Err(ShapeError::DataLength {
                expected: shape.volume(),
                actual,
                shape,
            }),
        }
    }

    /// Constructs a tensor with every element equal to `value`.
    #[inline]
    pub fn filled(shape: Shape, value: T) -> Self {
        Self {
            data: ArrayD::from_elem(ix(&shape), value),
            shape,
        }
    }

    /// Constructs a tensor with no dimensions and a single element.
    #[inline]
    pub fn scalar(value: T) -> Self {
        Self::filled(Shape::SCALAR, value)
    }

    /// Constructs a tensor by calling `f` with the multi-index of each element.
    #[allow(clippy::missing_inline_in_public_items, reason = "is generic already")]
    pub fn from_fn(shape: Shape, mut f: impl FnMut(&[usize]) -> T) -> Self {
        Self {
            data: ArrayD::from_shape_fn(ix(&shape), |index| f(index.slice())),
            shape,
        }
    }

    /// Returns the only element, if this tensor has exactly one.
    #[inline]
    pub fn as_scalar(&self) -> Option<T> {
        match *self.values() {
            [value] => Some(value),
            _ => None,
        }
    }

    /// Applies `f` to every element.
    #[allow(clippy::missing_inline_in_public_items, reason = "is generic already")]
    pub fn map<U: Clone>(&self, f: impl FnMut(T) -> U) -> Tensor<U> {
        Tensor::from_array(self.shape.clone(), self.data.mapv(f))
    }

    /// Repeats this tensor along missing and size-1 dimensions to have exactly the
    /// `target` shape.
    #[allow(clippy::missing_inline_in_public_items)]
    pub fn broadcast_to(&self, target: &Shape) -> Result<Self, ShapeError> {
        for dim in self.shape.dims() {
            match target.get(dim.name()) {
                None => {
                    return Err(ShapeError::MissingDim {
                        name: dim.name().into(),
                        shape: target.clone(),
                    });
                }
                Some(wanted) if wanted.kind() != dim.kind() => {
                    return Err(ShapeError::KindConflict {
                        name: dim.name().into(),
                        first: dim.kind(),
                        second: wanted.kind(),
                    });
                }
                Some(_) => {}
            }
        }
        let view = self.expanded(target);
        let data = broadcast(&view, &self.shape, target)?.to_owned();
        Ok(Self::from_array(target.clone(), data))
    }

    /// Combines two tensors elementwise, broadcasting by dimension name.
    ///
    /// The result has the [combined](Shape::combined) shape of both operands.
    #[allow(clippy::missing_inline_in_public_items, reason = "is generic already")]
    pub fn zip_with<U: Copy, V: Clone>(
        &self,
        other: &Tensor<U>,
        mut f: impl FnMut(T, U) -> V,
    ) -> Result<Tensor<V>, ShapeError> {
        let shape = self.shape.combined(&other.shape)?;
        let (a, b) = (self.expanded(&shape), other.expanded(&shape));
        let data = Zip::from(broadcast(&a, &self.shape, &shape)?)
            .and(broadcast(&b, &other.shape, &shape)?)
            .map_collect(|&x, &y| f(x, y));
        Ok(Tensor::from_array(shape, data))
    }

    /// Reduces the named dimension by folding its elements with `f`, starting from
    /// `init`. The result lacks that dimension, or is unchanged if it is absent.
    fn fold_dim(&self, dim: &str, init: T, mut f: impl FnMut(T, T) -> T) -> Self {
        match self.shape.index_of(dim) {
            None => self.clone(),
            Some(axis) => Self::from_array(
                self.shape.without(dim),
                self.data
                    .fold_axis(Axis(axis), init, |&acc, &value| f(acc, value)),
            ),
        }
    }

    /// Takes the slice at position `i` of the named dimension, removing that dimension.
    #[allow(clippy::missing_inline_in_public_items)]
    pub fn index(&self, dim: &str, i: usize) -> Result<Self, ShapeError> {
        let axis = self.axis_of(dim)?;
        let size = self.shape.dims()[axis].size();
        if i >= size {
            return Err(ShapeError::IndexOutOfRange {
                name: dim.into(),
                index: i,
                size,
            });
        }
        Ok(Self::from_array(
            self.shape.without(dim),
            self.data.index_axis(Axis(axis), i).to_owned(),
        ))
    }

    /// Keeps only the listed positions of the named dimension, in the listed order.
    #[allow(clippy::missing_inline_in_public_items)]
    pub fn select(&self, dim: &str, indices: &[usize]) -> Result<Self, ShapeError> {
        let axis = self.axis_of(dim)?;
        let selected = &self.shape.dims()[axis];
        if let Some(&index) = indices.iter().find(|&&index| index >= selected.size()) {
            return Err(ShapeError::IndexOutOfRange {
                name: dim.into(),
                index,
                size: selected.size(),
            });
        }
        Ok(Self::from_array(
            self.shape.with_dim(selected.with_size(indices.len())),
            self.data.select(Axis(axis), indices),
        ))
    }

    /// Splits this tensor into one tensor per position of the named dimension.
    ///
    /// If the dimension is absent, the result is this tensor alone.
    #[allow(clippy::missing_inline_in_public_items)]
    pub fn unstack(&self, dim: &str) -> Vec<Self> {
        let Some(axis) = self.shape.index_of(dim) else {
            return vec![self.clone()];
        };
        let shape = self.shape.without(dim);
        self.data
            .axis_iter(Axis(axis))
            .map(|part| Self::from_array(shape.clone(), part.to_owned()))
            .collect()
    }

    /// Stacks tensors along a new dimension, after broadcasting them against each other.
    ///
    /// ```
    /// use ndbox::tensor::{DimKind, Tensor};
    ///
    /// let stacked = Tensor::stack(&[Tensor::scalar(1.0), Tensor::scalar(2.0)], "vector", DimKind::Channel)
    ///     .unwrap();
    /// assert_eq!(stacked, Tensor::from([1.0, 2.0]));
    /// ```
    #[allow(clippy::missing_inline_in_public_items)]
    pub fn stack(items: &[Tensor<T>], name: &str, kind: DimKind) -> Result<Self, ShapeError> {
        let (first, rest) = items.split_first().ok_or(ShapeError::EmptyStack)?;
        let combined = rest
            .iter()
            .try_fold(first.shape.clone(), |shape, item| shape.combined(&item.shape))?;
        if combined.contains(name) {
            return Err(ShapeError::DuplicateName(name.into()));
        }
        let shape = combined.with_dim(Dim::new(name, kind, items.len()));
        let axis = shape.index_of(name).unwrap_or_default();

        let expanded: Vec<ArrayViewD<'_, T>> =
            items.iter().map(|item| item.expanded(&combined)).collect();
        let parts = expanded
            .iter()
            .zip(items)
            .map(|(view, item)| broadcast(view, &item.shape, &combined))
            .collect::<Result<Vec<_>, _>>()?;
        let data = ndarray::stack(Axis(axis), &parts).map_err(|_| ShapeError::Broadcast {
            from: combined.clone(),
            to: shape.clone(),
        })?;
        Ok(Self::from_array(shape, data))
    }

    /// Flattens the listed dimensions into a single new dimension whose size is the
    /// product of theirs. Positions along the new dimension enumerate the old ones in
    /// row-major order of this tensor’s dimension order.
    #[allow(clippy::missing_inline_in_public_items)]
    pub fn join_dims(&self, dims: &[&str], name: &str, kind: DimKind) -> Result<Self, ShapeError> {
        let mut joined: Vec<usize> = dims
            .iter()
            .map(|&dim| self.axis_of(dim))
            .collect::<Result<_, _>>()?;
        joined.sort_unstable();
        joined.dedup();

        let remaining = dims
            .iter()
            .fold(self.shape.clone(), |shape, &dim| shape.without(dim));
        if remaining.contains(name) {
            return Err(ShapeError::DuplicateName(name.into()));
        }
        let size = joined
            .iter()
            .map(|&axis| self.shape.dims()[axis].size())
            .product();
        let shape = remaining.with_dim(Dim::new(name, kind, size));

        // Axes of this tensor in the order of the result, with the joined ones adjacent.
        let mut order = Vec::with_capacity(self.shape.rank());
        for dim in shape.dims() {
            if dim.name() == name {
                order.extend_from_slice(&joined);
            } else {
                order.extend(self.shape.index_of(dim.name()));
            }
        }
        let permuted = self.data.view().permuted_axes(IxDyn(&order));
        Self::from_vec(shape, permuted.iter().copied().collect())
    }

    /// Adds a dimension of size 1. The elements are unchanged.
    #[allow(clippy::missing_inline_in_public_items)]
    pub fn with_singleton_dim(&self, name: &str, kind: DimKind) -> Result<Self, ShapeError> {
        if self.shape.contains(name) {
            return Err(ShapeError::DuplicateName(name.into()));
        }
        let shape = self.shape.with_dim(Dim::new(name, kind, 1));
        let axis = shape.index_of(name).unwrap_or_default();
        Ok(Self::from_array(
            shape,
            self.data.clone().insert_axis(Axis(axis)),
        ))
    }
}

impl Tensor<f64> {
    /// Constructs a tensor with only a [`VECTOR`] dimension holding `components`.
    #[allow(clippy::missing_inline_in_public_items, reason = "is generic already")]
    pub fn vector(components: impl IntoIterator<Item = f64>) -> Self {
        let data = ndarray::Array1::from_iter(components);
        Self {
            shape: Shape::SCALAR.with_dim(Dim::vector(data.len())),
            data: data.into_dyn(),
        }
    }

    /// Constructs a one-dimensional tensor of `dim.size()` evenly spaced values from
    /// `start` to `stop` inclusive.
    ///
    /// ```
    /// use ndbox::tensor::{Dim, Tensor};
    ///
    /// let t = Tensor::linspace(0.125, 0.875, Dim::spatial("x", 4));
    /// assert_eq!(t.values(), &[0.125, 0.375, 0.625, 0.875]);
    /// ```
    #[allow(clippy::missing_inline_in_public_items)]
    pub fn linspace(start: f64, stop: f64, dim: Dim) -> Self {
        let count = dim.size();
        let step = if count > 1 {
            (stop - start) / (count - 1) as f64
        } else {
            0.0
        };
        // Not `Array1::linspace()`, which needs the `std` feature of `ndarray`.
        let data = ndarray::Array1::from_shape_fn(count, |i| start + step * i as f64);
        Self {
            shape: Shape::SCALAR.with_dim(dim),
            data: data.into_dyn(),
        }
    }

    /// Combines one-dimensional coordinate tensors into their outer-product grid.
    ///
    /// The result has every dimension of the inputs, plus a [`VECTOR`] dimension whose
    /// component `i` is taken from `axes[i]`.
    #[inline]
    pub fn meshgrid(axes: &[Tensor]) -> Result<Self, ShapeError> {
        Self::stack(axes, VECTOR, DimKind::Channel)
    }

    /// Elementwise sum, broadcasting by name.
    #[inline]
    pub fn try_add(&self, other: &Tensor) -> Result<Tensor, ShapeError> {
        self.zip_with(other, |a, b| a + b)
    }

    /// Elementwise difference, broadcasting by name.
    #[inline]
    pub fn try_sub(&self, other: &Tensor) -> Result<Tensor, ShapeError> {
        self.zip_with(other, |a, b| a - b)
    }

    /// Elementwise product, broadcasting by name.
    #[inline]
    pub fn try_mul(&self, other: &Tensor) -> Result<Tensor, ShapeError> {
        self.zip_with(other, |a, b| a * b)
    }

    /// Elementwise quotient, broadcasting by name.
    ///
    /// Division by zero produces infinities or NaN, as usual for floats.
    #[inline]
    pub fn try_div(&self, other: &Tensor) -> Result<Tensor, ShapeError> {
        self.zip_with(other, |a, b| a / b)
    }

    /// Elementwise `self >= other`.
    #[inline]
    pub fn ge(&self, other: &Tensor) -> Result<Tensor<bool>, ShapeError> {
        self.zip_with(other, |a, b| a >= b)
    }

    /// Elementwise `self <= other`.
    #[inline]
    pub fn le(&self, other: &Tensor) -> Result<Tensor<bool>, ShapeError> {
        self.zip_with(other, |a, b| a <= b)
    }

    /// Elementwise `self > other`.
    #[inline]
    pub fn gt(&self, other: &Tensor) -> Result<Tensor<bool>, ShapeError> {
        self.zip_with(other, |a, b| a > b)
    }

    /// Elementwise `self < other`.
    #[inline]
    pub fn lt(&self, other: &Tensor) -> Result<Tensor<bool>, ShapeError> {
        self.zip_with(other, |a, b| a < b)
    }

    /// Elementwise absolute value.
    #[inline]
    #[must_use]
    pub fn abs(&self) -> Tensor {
        self.map(|value| value.abs())
    }

    /// Maximum along the named dimension, which is removed. The tensor is returned
    /// unchanged if it lacks the dimension.
    ///
    /// NaN anywhere along the dimension makes the maximum NaN.
    #[inline]
    #[must_use]
    pub fn max(&self, dim: &str) -> Tensor {
        self.fold_dim(dim, f64::NEG_INFINITY, |a, b| {
            if a.is_nan() || b.is_nan() {
                f64::NAN
            } else {
                a.max(b)
            }
        })
    }

    /// Returns whether both tensors have compatible shapes and all elements are close
    /// according to [`Tolerance::default()`].
    #[inline]
    pub fn close(&self, other: &Tensor) -> bool {
        self.close_with(other, Tolerance::default())
    }

    /// Returns whether both tensors have compatible shapes and all elements are close
    /// according to `tolerance`.
    #[inline]
    pub fn close_with(&self, other: &Tensor, tolerance: Tolerance) -> bool {
        self.zip_with(other, |a, b| tolerance.accepts(a, b))
            .is_ok_and(|close| close.all_true())
    }
}

impl Tensor<bool> {
    /// Elementwise logical AND, broadcasting by name.
    #[inline]
    pub fn and(&self, other: &Tensor<bool>) -> Result<Tensor<bool>, ShapeError> {
        self.zip_with(other, |a, b| a && b)
    }

    /// Whether all elements along the named dimension are true.
    #[inline]
    #[must_use]
    pub fn all(&self, dim: &str) -> Tensor<bool> {
        self.fold_dim(dim, true, |a, b| a && b)
    }

    /// Whether every element is true.
    #[inline]
    pub fn all_true(&self) -> bool {
        self.data.iter().all(|&value| value)
    }
}

/// Tensors are equal if they have the same dimensions, in any order,
/// and equal elements at every multi-index.
impl<T: Copy + PartialEq> PartialEq for Tensor<T> {
    #[allow(clippy::missing_inline_in_public_items)]
    fn eq(&self, other: &Self) -> bool {
        self.shape.rank() == other.shape.rank()
            && self
                .shape
                .dims()
                .iter()
                .all(|dim| other.shape.get(dim.name()) == Some(dim))
            && self
                .zip_with(other, |a, b| a == b)
                .is_ok_and(|equal| equal.all_true())
    }
}

impl<T: fmt::Debug> fmt::Debug for Tensor<T> {
    #[allow(clippy::missing_inline_in_public_items)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape)
            .field("values", &self.values())
            .finish()
    }
}

macro_rules! impl_scalar_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl ops::$trait<f64> for &Tensor {
            type Output = Tensor;
            #[inline]
            fn $method(self, rhs: f64) -> Tensor {
                self.map(|value| value $op rhs)
            }
        }
        impl ops::$trait<f64> for Tensor {
            type Output = Tensor;
            #[inline]
            fn $method(mut self, rhs: f64) -> Tensor {
                self.data.mapv_inplace(|value| value $op rhs);
                self
            }
        }
    };
}
impl_scalar_op!(Add, add, +);
impl_scalar_op!(Sub, sub, -);
impl_scalar_op!(Mul, mul, *);
impl_scalar_op!(Div, div, /);

impl From<f64> for Tensor {
    #[inline]
    fn from(value: f64) -> Self {
        Self::scalar(value)
    }
}
impl From<f32> for Tensor {
    #[inline]
    fn from(value: f32) -> Self {
        Self::scalar(f64::from(value))
    }
}
impl From<i32> for Tensor {
    #[inline]
    fn from(value: i32) -> Self {
        Self::scalar(f64::from(value))
    }
}
impl<const N: usize> From<[f64; N]> for Tensor {
    #[inline]
    fn from(components: [f64; N]) -> Self {
        Self::vector(components)
    }
}
impl From<&[f64]> for Tensor {
    #[inline]
    fn from(components: &[f64]) -> Self {
        Self::vector(components.iter().copied())
    }
}
impl From<Vec<f64>> for Tensor {
    #[inline]
    fn from(components: Vec<f64>) -> Self {
        Self::vector(components)
    }
}
impl<U> From<euclid::Point2D<f64, U>> for Tensor {
    #[inline]
    fn from(point: euclid::Point2D<f64, U>) -> Self {
        Self::vector(point.to_array())
    }
}
impl<U> From<euclid::Point3D<f64, U>> for Tensor {
    #[inline]
    fn from(point: euclid::Point3D<f64, U>) -> Self {
        Self::vector(point.to_array())
    }
}
impl<U> From<euclid::Vector2D<f64, U>> for Tensor {
    #[inline]
    fn from(vector: euclid::Vector2D<f64, U>) -> Self {
        Self::vector(vector.to_array())
    }
}
impl<U> From<euclid::Vector3D<f64, U>> for Tensor {
    #[inline]
    fn from(vector: euclid::Vector3D<f64, U>) -> Self {
        Self::vector(vector.to_array())
    }
}
impl<U> From<euclid::Size2D<f64, U>> for Tensor {
    #[inline]
    fn from(size: euclid::Size2D<f64, U>) -> Self {
        Self::vector(size.to_array())
    }
}
impl<U> From<euclid::Size3D<f64, U>> for Tensor {
    #[inline]
    fn from(size: euclid::Size3D<f64, U>) -> Self {
        Self::vector(size.to_array())
    }
}

/// How far apart two floats may be while still counting as equal, for
/// [`Tensor::close_with()`] and the equality of geometries.
///
/// Values `a` and `b` are accepted when
/// `|a - b| <= absolute + relative * max(|a|, |b|)`, or when they are identical (which
/// makes equal infinities close). The test gives the same answer either way round.
#[derive(Clone, Copy, Debug, PartialEq)]
#[expect(clippy::exhaustive_structs)]
pub struct Tolerance {
    /// Allowed difference as a fraction of the larger magnitude of the two values.
    pub relative: f64,
    /// Allowed difference regardless of magnitude.
    pub absolute: f64,
}

impl Tolerance {
    /// No difference at all is accepted.
    pub const EXACT: Self = Self {
        relative: 0.0,
        absolute: 0.0,
    };

    /// Returns whether `a` and `b` are close enough to count as equal.
    #[inline]
    pub fn accepts(self, a: f64, b: f64) -> bool {
        #[allow(clippy::float_cmp)]
        let identical = a == b;
        identical || (a - b).abs() <= self.absolute + self.relative * a.abs().max(b.abs())
    }
}

impl Default for Tolerance {
    /// Relative tolerance of 1e-5 and absolute tolerance of 1e-8.
    #[inline]
    fn default() -> Self {
        Self {
            relative: 1e-5,
            absolute: 1e-8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn shape(dims: impl IntoIterator<Item = Dim>) -> Shape {
        Shape::new(dims).unwrap()
    }

    fn arange(shape: Shape) -> Tensor {
        let volume = shape.volume();
        Tensor::from_vec(shape, (0..volume).map(|i| i as f64).collect()).unwrap()
    }

    #[test]
    fn from_vec_length_mismatch() {
        let s = shape([Dim::vector(3)]);
        assert_eq!(
            Tensor::from_vec(s.clone(), vec![1.0, 2.0]).unwrap_err(),
            ShapeError::DataLength {
                shape: s,
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn zip_broadcasts_by_name() {
        let points = arange(shape([Dim::batch("points", 2), Dim::vector(3)]));
        let offset = Tensor::from([10.0, 20.0, 30.0]);
        let sum = points.try_add(&offset).unwrap();
        assert_eq!(sum.shape(), points.shape());
        assert_eq!(sum.values(), &[10.0, 21.0, 32.0, 13.0, 24.0, 35.0]);
    }

    #[test]
    fn zip_outer_product_of_distinct_dims() {
        let a = Tensor::linspace(0.0, 1.0, Dim::batch("a", 2));
        let b = Tensor::linspace(0.0, 20.0, Dim::batch("b", 3));
        let sum = a.try_add(&b).unwrap();
        assert_eq!(sum.shape(), &shape([Dim::batch("a", 2), Dim::batch("b", 3)]));
        assert_eq!(sum.values(), &[0.0, 10.0, 20.0, 1.0, 11.0, 21.0]);
    }

    #[test]
    fn zip_mismatch() {
        let a = Tensor::from([1.0, 2.0]);
        let b = Tensor::from([1.0, 2.0, 3.0]);
        assert!(matches!(
            a.try_add(&b),
            Err(ShapeError::IncompatibleSize { .. })
        ));
    }

    #[test]
    fn equality_ignores_dim_order() {
        let ab = arange(shape([Dim::batch("a", 2), Dim::batch("b", 3)]));
        let ba = Tensor::from_fn(shape([Dim::batch("b", 3), Dim::batch("a", 2)]), |i| {
            (i[1] * 3 + i[0]) as f64
        });
        assert_eq!(ab, ba);
        assert_ne!(ab, ab.clone() + 1.0);
    }

    #[test]
    fn max_and_all() {
        let t = Tensor::from_vec(
            shape([Dim::batch("b", 2), Dim::vector(3)]),
            vec![1.0, -5.0, 3.0, 0.0, 9.0, -1.0],
        )
        .unwrap();
        assert_eq!(t.max(VECTOR).values(), &[3.0, 9.0]);
        assert_eq!(t.max("b").values(), &[1.0, 9.0, 3.0]);
        assert_eq!(t.max("absent"), t);

        let positive = t.gt(&Tensor::scalar(-2.0)).unwrap();
        assert_eq!(positive.all(VECTOR).values(), &[false, true]);
        assert_eq!(positive.all("b").values(), &[true, false, true]);
        assert!(!positive.all_true());
    }

    #[test]
    fn max_propagates_nan() {
        let t = Tensor::from_vec(
            shape([Dim::batch("b", 2), Dim::vector(3)]),
            vec![1.0, f64::NAN, 3.0, f64::NEG_INFINITY, 9.0, f64::INFINITY],
        )
        .unwrap();
        let max = t.max(VECTOR);
        assert!(max.values()[0].is_nan(), "{max:?}");
        assert_eq!(max.values()[1], f64::INFINITY);
    }

    #[test]
    fn index_and_select() {
        let t = arange(shape([Dim::batch("b", 2), Dim::vector(3)]));
        assert_eq!(t.index(VECTOR, 2).unwrap().values(), &[2.0, 5.0]);
        assert_eq!(t.index("b", 1).unwrap(), Tensor::from([3.0, 4.0, 5.0]));
        assert_eq!(
            t.index(VECTOR, 3),
            Err(ShapeError::IndexOutOfRange {
                name: "vector".into(),
                index: 3,
                size: 3
            })
        );
        let selected = t.select(VECTOR, &[2, 0]).unwrap();
        assert_eq!(selected.shape().size_of(VECTOR), Some(2));
        assert_eq!(selected.values(), &[2.0, 0.0, 5.0, 3.0]);
    }

    #[test]
    fn unstack() {
        let t = arange(shape([Dim::batch("b", 2), Dim::vector(2)]));
        assert_eq!(
            t.unstack("b"),
            vec![Tensor::from([0.0, 1.0]), Tensor::from([2.0, 3.0])]
        );
        assert_eq!(t.unstack(VECTOR)[1].values(), &[1.0, 3.0]);
        assert_eq!(t.unstack("absent"), vec![t.clone()]);
    }

    #[test]
    fn meshgrid() {
        let x = Tensor::linspace(0.0, 1.0, Dim::spatial("x", 2));
        let y = Tensor::linspace(10.0, 30.0, Dim::spatial("y", 3));
        let grid = Tensor::meshgrid(&[x, y]).unwrap();
        assert_eq!(
            grid.shape(),
            &shape([Dim::spatial("x", 2), Dim::spatial("y", 3), Dim::vector(2)])
        );
        assert_eq!(
            grid.index("x", 1).unwrap().index("y", 2).unwrap(),
            Tensor::from([1.0, 30.0])
        );
    }

    #[test]
    fn stack_empty() {
        assert_eq!(
            Tensor::<f64>::stack(&[], VECTOR, DimKind::Channel),
            Err(ShapeError::EmptyStack)
        );
    }

    #[test]
    fn join_dims_row_major() {
        let grid = arange(shape([
            Dim::spatial("x", 2),
            Dim::spatial("y", 3),
            Dim::vector(1),
        ]));
        let flat = grid.join_dims(&["x", "y"], "cells", DimKind::Batch).unwrap();
        assert_eq!(
            flat.shape(),
            &shape([Dim::batch("cells", 6), Dim::vector(1)])
        );
        assert_eq!(flat.values(), grid.values());
    }

    #[test]
    fn join_dims_keeps_other_dims() {
        let t = arange(shape([Dim::spatial("x", 2), Dim::vector(2)]));
        let flat = t.join_dims(&["x"], "cells", DimKind::Batch).unwrap();
        assert_eq!(
            flat.index(VECTOR, 1).unwrap().values(),
            t.index(VECTOR, 1).unwrap().values()
        );
    }

    #[test]
    fn broadcast_to() {
        let t = Tensor::from([1.0, 2.0]);
        let target = shape([Dim::batch("b", 2), Dim::vector(2)]);
        assert_eq!(
            t.broadcast_to(&target).unwrap().values(),
            &[1.0, 2.0, 1.0, 2.0]
        );
        assert!(matches!(
            t.broadcast_to(&Shape::SCALAR),
            Err(ShapeError::MissingDim { .. })
        ));
        assert_eq!(
            t.broadcast_to(&shape([Dim::vector(3)])),
            Err(ShapeError::Broadcast {
                from: shape([Dim::vector(2)]),
                to: shape([Dim::vector(3)]),
            })
        );
    }

    #[test]
    fn scalar_ops() {
        let t = Tensor::from([1.0, -2.0]);
        assert_eq!(&t * 2.0, Tensor::from([2.0, -4.0]));
        assert_eq!(&t + 1.0, Tensor::from([2.0, -1.0]));
        assert_eq!(t.clone() / 4.0, Tensor::from([0.25, -0.5]));
        assert_eq!(t.abs(), Tensor::from([1.0, 2.0]));
    }

    #[test]
    fn tolerance() {
        let tolerance = Tolerance::default();
        assert!(tolerance.accepts(1.0 + 1e-7, 1.0));
        assert!(!tolerance.accepts(1.001, 1.0));
        assert!(tolerance.accepts(f64::INFINITY, f64::INFINITY));
        assert!(!tolerance.accepts(f64::NAN, f64::NAN));
        assert!(!Tolerance::EXACT.accepts(1.0 + 1e-12, 1.0));
        assert!(tolerance.accepts(0.0, 1e-9));
        assert!(!tolerance.accepts(0.0, 1e-7));

        let a = Tensor::from([0.1 + 0.2, 1.0]);
        assert!(a.close(&Tensor::from([0.3, 1.0])));
        assert!(!a.close(&Tensor::from([0.3, 1.0, 2.0])));
    }

    #[test]
    fn tolerance_is_symmetric() {
        let tolerance = Tolerance::default();
        let (a, b) = (1e6, 1e6 + 10.00005);
        assert_eq!(tolerance.accepts(a, b), tolerance.accepts(b, a));
        assert!(tolerance.accepts(a, b));
        for (a, b) in [(1.0, 1.0 + 1.5e-5), (-3.0, 3.0), (100.0, 100.001)] {
            assert_eq!(tolerance.accepts(a, b), tolerance.accepts(b, a), "{a} {b}");
        }
    }
}
