//! # Tagged Array
//!
//! A growable buffer whose element kind is fixed at creation: integers (`u32`),
//! floats (`f32`), owned strings, or opaque shared pointers. Every accessor family
//! (`push_*`, `pop_*`, `get_*`, `set_*`) can be called against any scalar kind and
//! converts through a fixed coercion table:
//!
//! | op \ array | Int                | Float              | Str                | Ptr        |
//! |------------|--------------------|--------------------|--------------------|------------|
//! | int        | native             | `as f32`           | decimal text       | rejected   |
//! | float      | truncating `as u32`| native             | `{:.6}` text       | rejected   |
//! | string     | leading integer    | leading float      | native (copied)    | rejected   |
//! | ptr        | rejected           | rejected           | rejected           | native     |
//!
//! `find_*` and `remove_*` do not coerce; they only match on arrays of their own kind.
//!
//! ## Capacity
//! Capacity is always zero or a multiple of 16. Whenever a required length `L`
//! reaches the current capacity the new capacity becomes `((L / 16) + 1) * 16`,
//! recomputed from `L` alone, so a far-away indexed `set` jumps straight to its
//! final size.
//!
//! ## Usage
//! ```rust
//! use voxel_core::core::array::{ArrayKind, TypedArray};
//!
//! let mut names = TypedArray::new(ArrayKind::Str);
//! names.push_int(42).unwrap();
//! names.push_float(1.5).unwrap();
//! assert_eq!(names.get_string(0).as_deref(), Some("42"));
//! assert_eq!(names.get_string(1).as_deref(), Some("1.500000"));
//! ```

mod text;

#[cfg(test)]
mod tests;

use std::{any::Any, borrow::Cow, fmt, sync::Arc};

use super::parse::{leading_float, leading_int};

pub use text::split;

/// Opaque payload stored in pointer-kind arrays. Identity, not value, is compared.
pub type Opaque = Arc<dyn Any + Send + Sync>;

/// Element kind of a [`TypedArray`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ArrayKind {
    /// `u32` elements.
    Int,
    /// `f32` elements.
    Float,
    /// Owned, nullable string elements.
    Str,
    /// Shared opaque pointers, nullable.
    Ptr,
}

impl fmt::Display for ArrayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArrayKind::Int => "integer",
            ArrayKind::Float => "float",
            ArrayKind::Str => "string",
            ArrayKind::Ptr => "pointer",
        };
        f.write_str(name)
    }
}

/// Failures reported by [`TypedArray`] mutators. The array is unchanged on error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArrayError {
    /// No coercion exists from the operation's kind to the array's kind.
    #[error("{op} operation on a {array} array")]
    KindMismatch {
        /// Kind of the array.
        array: ArrayKind,
        /// Kind the operation was called as.
        op: ArrayKind,
    },
    /// Growing the backing buffer failed.
    #[error("could not grow array to {capacity} elements")]
    Alloc {
        /// Capacity that was requested.
        capacity: usize,
    },
}

/// Result of [`TypedArray::compare`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArrayComparison {
    /// Every element matched after coercion.
    Equal,
    /// Same length, but at least one element differs.
    Mismatch,
    /// Lengths differ, or an array is missing.
    Incomparable,
}

impl ArrayComparison {
    /// The classic integer code: `0`, `1` or `-1`.
    pub fn code(self) -> i32 {
        match self {
            ArrayComparison::Equal => 0,
            ArrayComparison::Mismatch => 1,
            ArrayComparison::Incomparable => -1,
        }
    }
}

#[derive(Clone)]
enum Elements {
    Int(Vec<u32>),
    Float(Vec<f32>),
    Str(Vec<Option<String>>),
    Ptr(Vec<Option<Opaque>>),
}

/// A single-kind dynamic array with cross-kind coercion.
pub struct TypedArray {
    elements: Elements,
    capacity: usize,
}

impl Clone for TypedArray {
    /// Same result as [`TypedArray::copy`], capacity included.
    fn clone(&self) -> Self {
        let capacity = match self.len() {
            0 => 0,
            len => grown_capacity(len).unwrap_or(self.capacity),
        };
        Self {
            elements: self.elements.clone(),
            capacity,
        }
    }
}

impl fmt::Debug for TypedArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("TypedArray");
        out.field("kind", &self.kind()).field("capacity", &self.capacity);
        match &self.elements {
            Elements::Int(v) => out.field("elements", v),
            Elements::Float(v) => out.field("elements", v),
            Elements::Str(v) => out.field("elements", v),
            Elements::Ptr(v) => out.field(
                "elements",
                &v.iter()
                    .map(|p| p.as_ref().map(|p| Arc::as_ptr(p) as *const ()))
                    .collect::<Vec<_>>(),
            ),
        };
        out.finish()
    }
}

/// Capacity produced by the growth rule for a required length.
///
/// # Returns
/// The next multiple of 16 strictly above `required`, or `None` if that does not
/// fit in a `usize`.
pub fn grown_capacity(required: usize) -> Option<usize> {
    (required / 16).checked_add(1)?.checked_mul(16)
}

fn format_float(v: f32) -> String {
    format!("{:.6}", f64::from(v))
}

fn same_ptr(a: &Opaque, b: &Opaque) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

fn try_grow<E>(v: &mut Vec<E>, capacity: usize) -> Result<(), ArrayError> {
    v.try_reserve_exact(capacity.saturating_sub(v.len()))
        .map_err(|_| ArrayError::Alloc { capacity })
}

impl TypedArray {
    /// Creates an empty array of `kind` with zero capacity.
    pub fn new(kind: ArrayKind) -> Self {
        let elements = match kind {
            ArrayKind::Int => Elements::Int(Vec::new()),
            ArrayKind::Float => Elements::Float(Vec::new()),
            ArrayKind::Str => Elements::Str(Vec::new()),
            ArrayKind::Ptr => Elements::Ptr(Vec::new()),
        };
        Self {
            elements,
            capacity: 0,
        }
    }

    /// Builds a string array from `items`.
    pub fn from_strings<I, S>(items: I) -> Result<Self, ArrayError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut array = Self::new(ArrayKind::Str);
        for item in items {
            array.push_string(Some(item.as_ref()))?;
        }
        Ok(array)
    }

    /// Builds an integer array from `items`.
    pub fn from_ints<I: IntoIterator<Item = u32>>(items: I) -> Result<Self, ArrayError> {
        let mut array = Self::new(ArrayKind::Int);
        for item in items {
            array.push_int(item)?;
        }
        Ok(array)
    }

    /// Builds a pointer array from `items`.
    pub fn from_ptrs<I: IntoIterator<Item = Opaque>>(items: I) -> Result<Self, ArrayError> {
        let mut array = Self::new(ArrayKind::Ptr);
        for item in items {
            array.push_ptr(Some(item))?;
        }
        Ok(array)
    }

    /// The element kind fixed at creation.
    pub fn kind(&self) -> ArrayKind {
        match &self.elements {
            Elements::Int(_) => ArrayKind::Int,
            Elements::Float(_) => ArrayKind::Float,
            Elements::Str(_) => ArrayKind::Str,
            Elements::Ptr(_) => ArrayKind::Ptr,
        }
    }

    /// Logical number of elements.
    pub fn len(&self) -> usize {
        match &self.elements {
            Elements::Int(v) => v.len(),
            Elements::Float(v) => v.len(),
            Elements::Str(v) => v.len(),
            Elements::Ptr(v) => v.len(),
        }
    }

    /// Returns `true` when the array holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capacity as defined by the growth rule.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn mismatch(&self, op: ArrayKind) -> ArrayError {
        ArrayError::KindMismatch {
            array: self.kind(),
            op,
        }
    }

    /// Grows the backing buffer if `required` reaches the current capacity.
    fn reserve_for(&mut self, required: usize) -> Result<(), ArrayError> {
        if required < self.capacity {
            return Ok(());
        }
        let capacity = grown_capacity(required).ok_or(ArrayError::Alloc {
            capacity: usize::MAX,
        })?;
        match &mut self.elements {
            Elements::Int(v) => try_grow(v, capacity)?,
            Elements::Float(v) => try_grow(v, capacity)?,
            Elements::Str(v) => try_grow(v, capacity)?,
            Elements::Ptr(v) => try_grow(v, capacity)?,
        }
        self.capacity = capacity;
        Ok(())
    }

    /// Makes `index` addressable, filling new slots with zero/null.
    fn fill_through(&mut self, index: usize) -> Result<(), ArrayError> {
        let len = index.checked_add(1).ok_or(ArrayError::Alloc {
            capacity: usize::MAX,
        })?;
        self.fill_to(len)
    }

    /// Extends the array to `len` elements, filling new slots with zero/null.
    fn fill_to(&mut self, len: usize) -> Result<(), ArrayError> {
        if len <= self.len() {
            return Ok(());
        }
        self.reserve_for(len)?;
        match &mut self.elements {
            Elements::Int(v) => v.resize(len, 0),
            Elements::Float(v) => v.resize(len, 0.0),
            Elements::Str(v) => v.resize(len, None),
            Elements::Ptr(v) => v.resize(len, None),
        }
        Ok(())
    }

    /// Appends an integer.
    pub fn push_int(&mut self, value: u32) -> Result<(), ArrayError> {
        match self.kind() {
            ArrayKind::Int => {
                self.reserve_for(self.len() + 1)?;
                if let Elements::Int(v) = &mut self.elements {
                    v.push(value);
                }
                Ok(())
            }
            ArrayKind::Float => self.push_float(value as f32),
            ArrayKind::Str => self.push_string(Some(&value.to_string())),
            ArrayKind::Ptr => Err(self.mismatch(ArrayKind::Int)),
        }
    }

    /// Appends a float.
    pub fn push_float(&mut self, value: f32) -> Result<(), ArrayError> {
        match self.kind() {
            ArrayKind::Int => self.push_int(value as u32),
            ArrayKind::Float => {
                self.reserve_for(self.len() + 1)?;
                if let Elements::Float(v) = &mut self.elements {
                    v.push(value);
                }
                Ok(())
            }
            ArrayKind::Str => self.push_string(Some(&format_float(value))),
            ArrayKind::Ptr => Err(self.mismatch(ArrayKind::Float)),
        }
    }

    /// Appends a copy of `value`; `None` is stored as a null element.
    pub fn push_string(&mut self, value: Option<&str>) -> Result<(), ArrayError> {
        match self.kind() {
            ArrayKind::Int => self.push_int(leading_int(value.unwrap_or_default()) as u32),
            ArrayKind::Float => self.push_float(leading_float(value.unwrap_or_default()) as f32),
            ArrayKind::Str => {
                self.reserve_for(self.len() + 1)?;
                if let Elements::Str(v) = &mut self.elements {
                    v.push(value.map(str::to_owned));
                }
                Ok(())
            }
            ArrayKind::Ptr => Err(self.mismatch(ArrayKind::Str)),
        }
    }

    /// Appends a pointer without copying what it points at.
    pub fn push_ptr(&mut self, value: Option<Opaque>) -> Result<(), ArrayError> {
        if self.kind() != ArrayKind::Ptr {
            return Err(self.mismatch(ArrayKind::Ptr));
        }
        self.reserve_for(self.len() + 1)?;
        if let Elements::Ptr(v) = &mut self.elements {
            v.push(value);
        }
        Ok(())
    }

    /// Reads element `index` as an integer; `0` when absent or on a pointer array.
    pub fn get_int(&self, index: usize) -> u32 {
        self.read_int(index).unwrap_or(0)
    }

    /// Reads element `index` as a float; `0.0` when absent or on a pointer array.
    pub fn get_float(&self, index: usize) -> f32 {
        self.read_float(index).unwrap_or(0.0)
    }

    /// Reads element `index` as text. Borrowed from string arrays, formatted otherwise.
    pub fn get_string(&self, index: usize) -> Option<Cow<'_, str>> {
        match &self.elements {
            Elements::Int(v) => v.get(index).map(|n| Cow::Owned(n.to_string())),
            Elements::Float(v) => v.get(index).map(|f| Cow::Owned(format_float(*f))),
            Elements::Str(v) => v.get(index)?.as_deref().map(Cow::Borrowed),
            Elements::Ptr(_) => None,
        }
    }

    /// Reads element `index` of a pointer array.
    pub fn get_ptr(&self, index: usize) -> Option<Opaque> {
        match &self.elements {
            Elements::Ptr(v) => v.get(index)?.clone(),
            _ => None,
        }
    }

    fn read_int(&self, index: usize) -> Option<u32> {
        match &self.elements {
            Elements::Int(v) => v.get(index).copied(),
            Elements::Float(v) => v.get(index).map(|f| *f as u32),
            Elements::Str(v) => v
                .get(index)
                .map(|s| leading_int(s.as_deref().unwrap_or_default()) as u32),
            Elements::Ptr(_) => None,
        }
    }

    fn read_float(&self, index: usize) -> Option<f32> {
        match &self.elements {
            Elements::Int(v) => v.get(index).map(|n| *n as f32),
            Elements::Float(v) => v.get(index).copied(),
            Elements::Str(v) => v
                .get(index)
                .map(|s| leading_float(s.as_deref().unwrap_or_default()) as f32),
            Elements::Ptr(_) => None,
        }
    }

    /// Removes the last element and returns it as an integer.
    pub fn pop_int(&mut self) -> Option<u32> {
        let value = self.read_int(self.len().checked_sub(1)?)?;
        self.truncate_last();
        Some(value)
    }

    /// Removes the last element and returns it as a float.
    pub fn pop_float(&mut self) -> Option<f32> {
        let value = self.read_float(self.len().checked_sub(1)?)?;
        self.truncate_last();
        Some(value)
    }

    /// Removes the last element and returns it as text.
    ///
    /// A null string element is removed and reported as `None`.
    pub fn pop_string(&mut self) -> Option<String> {
        match self.kind() {
            ArrayKind::Str => match &mut self.elements {
                Elements::Str(v) => v.pop().flatten(),
                _ => None,
            },
            ArrayKind::Ptr => None,
            ArrayKind::Int | ArrayKind::Float => {
                let value = self.get_string(self.len().checked_sub(1)?)?.into_owned();
                self.truncate_last();
                Some(value)
            }
        }
    }

    /// Removes the last element of a pointer array.
    pub fn pop_ptr(&mut self) -> Option<Opaque> {
        match &mut self.elements {
            Elements::Ptr(v) => v.pop().flatten(),
            _ => None,
        }
    }

    fn truncate_last(&mut self) {
        match &mut self.elements {
            Elements::Int(v) => {
                v.pop();
            }
            Elements::Float(v) => {
                v.pop();
            }
            Elements::Str(v) => {
                v.pop();
            }
            Elements::Ptr(v) => {
                v.pop();
            }
        }
    }

    /// Stores an integer at `index`, extending the array with zero/null slots.
    ///
    /// # Arguments
    /// * `index` - Slot to write. Anything past the end grows the array by the
    ///   growth rule and zero-fills the gap.
    /// * `value` - Coerced to the array's kind as for [`TypedArray::push_int`].
    ///
    /// # Returns
    /// `ArrayError::KindMismatch` on a pointer array, `ArrayError::Alloc` if the
    /// array cannot grow that far. The array is unchanged on error.
    pub fn set_int(&mut self, index: usize, value: u32) -> Result<(), ArrayError> {
        match self.kind() {
            ArrayKind::Int => {
                self.fill_through(index)?;
                if let Elements::Int(v) = &mut self.elements {
                    v[index] = value;
                }
                Ok(())
            }
            ArrayKind::Float => self.set_float(index, value as f32),
            ArrayKind::Str => self.set_string(index, Some(&value.to_string())),
            ArrayKind::Ptr => Err(self.mismatch(ArrayKind::Int)),
        }
    }

    /// Stores a float at `index`, extending the array with zero/null slots.
    pub fn set_float(&mut self, index: usize, value: f32) -> Result<(), ArrayError> {
        match self.kind() {
            ArrayKind::Int => self.set_int(index, value as u32),
            ArrayKind::Float => {
                self.fill_through(index)?;
                if let Elements::Float(v) = &mut self.elements {
                    v[index] = value;
                }
                Ok(())
            }
            ArrayKind::Str => self.set_string(index, Some(&format_float(value))),
            ArrayKind::Ptr => Err(self.mismatch(ArrayKind::Float)),
        }
    }

    /// Stores a copy of `value` at `index`, extending the array with zero/null slots.
    pub fn set_string(&mut self, index: usize, value: Option<&str>) -> Result<(), ArrayError> {
        match self.kind() {
            ArrayKind::Int => self.set_int(index, leading_int(value.unwrap_or_default()) as u32),
            ArrayKind::Float => {
                self.set_float(index, leading_float(value.unwrap_or_default()) as f32)
            }
            ArrayKind::Str => {
                self.fill_through(index)?;
                if let Elements::Str(v) = &mut self.elements {
                    v[index] = value.map(str::to_owned);
                }
                Ok(())
            }
            ArrayKind::Ptr => Err(self.mismatch(ArrayKind::Str)),
        }
    }

    /// Stores a pointer at `index`, extending the array with null slots.
    pub fn set_ptr(&mut self, index: usize, value: Option<Opaque>) -> Result<(), ArrayError> {
        if self.kind() != ArrayKind::Ptr {
            return Err(self.mismatch(ArrayKind::Ptr));
        }
        self.fill_through(index)?;
        if let Elements::Ptr(v) = &mut self.elements {
            v[index] = value;
        }
        Ok(())
    }

    /// Index of the first element equal to `value` in an integer array.
    pub fn find_int(&self, value: u32) -> Option<usize> {
        match &self.elements {
            Elements::Int(v) => v.iter().position(|n| *n == value),
            _ => None,
        }
    }

    /// Index of the first element equal to `value` in a float array.
    pub fn find_float(&self, value: f32) -> Option<usize> {
        match &self.elements {
            Elements::Float(v) => v.iter().position(|f| *f == value),
            _ => None,
        }
    }

    /// Index of the first element equal to `value` in a string array.
    pub fn find_string(&self, value: Option<&str>) -> Option<usize> {
        match &self.elements {
            Elements::Str(v) => v.iter().position(|s| s.as_deref() == value),
            _ => None,
        }
    }

    /// Index of the first element pointing at the same allocation as `value`.
    pub fn find_ptr(&self, value: &Opaque) -> Option<usize> {
        match &self.elements {
            Elements::Ptr(v) => v
                .iter()
                .position(|p| p.as_ref().is_some_and(|p| same_ptr(p, value))),
            _ => None,
        }
    }

    /// Removes element `index`, shifting later elements down.
    pub fn remove_at(&mut self, index: usize) -> bool {
        if index >= self.len() {
            return false;
        }
        match &mut self.elements {
            Elements::Int(v) => {
                v.remove(index);
            }
            Elements::Float(v) => {
                v.remove(index);
            }
            Elements::Str(v) => {
                v.remove(index);
            }
            Elements::Ptr(v) => {
                v.remove(index);
            }
        }
        true
    }

    /// Removes the first occurrence of `value` from an integer array.
    pub fn remove_int(&mut self, value: u32) -> bool {
        self.find_int(value).is_some_and(|i| self.remove_at(i))
    }

    /// Removes the first occurrence of `value` from a float array.
    pub fn remove_float(&mut self, value: f32) -> bool {
        self.find_float(value).is_some_and(|i| self.remove_at(i))
    }

    /// Removes the first occurrence of `value` from a string array.
    pub fn remove_string(&mut self, value: Option<&str>) -> bool {
        self.find_string(value).is_some_and(|i| self.remove_at(i))
    }

    /// Removes the first occurrence of `value` from a pointer array.
    pub fn remove_ptr(&mut self, value: &Opaque) -> bool {
        self.find_ptr(value).is_some_and(|i| self.remove_at(i))
    }

    /// Appends `value` unless the same pointer is already present.
    ///
    /// Returns the index at which `value` now lives.
    pub fn push_unique_ptr(&mut self, value: Opaque) -> Result<usize, ArrayError> {
        if let Some(index) = self.find_ptr(&value) {
            return Ok(index);
        }
        self.push_ptr(Some(value))?;
        Ok(self.len() - 1)
    }

    /// Stores `value` in the first null slot, appending if there is none.
    pub fn insert_ptr(&mut self, value: Opaque) -> Result<usize, ArrayError> {
        if self.kind() != ArrayKind::Ptr {
            return Err(self.mismatch(ArrayKind::Ptr));
        }
        if let Elements::Ptr(v) = &mut self.elements {
            if let Some(index) = v.iter().position(Option::is_none) {
                v[index] = Some(value);
                return Ok(index);
            }
        }
        self.push_ptr(Some(value))?;
        Ok(self.len() - 1)
    }

    /// Iterates the elements of a string array; empty for other kinds.
    pub fn strings(&self) -> impl Iterator<Item = Option<&str>> + '_ {
        let items: &[Option<String>] = match &self.elements {
            Elements::Str(v) => v,
            _ => &[],
        };
        items.iter().map(Option::as_deref)
    }

    /// Compares two arrays element by element through the coercion table.
    ///
    /// Each element of `other` is read as `self`'s kind, so an integer array
    /// `[1, 2, 3]` equals a string array `["1", "2", "3"]`.
    pub fn compare(&self, other: &TypedArray) -> ArrayComparison {
        if self.len() != other.len() {
            return ArrayComparison::Incomparable;
        }
        let equal = match &self.elements {
            Elements::Int(v) => v
                .iter()
                .enumerate()
                .all(|(i, n)| other.read_int(i) == Some(*n)),
            Elements::Float(v) => v
                .iter()
                .enumerate()
                .all(|(i, f)| other.read_float(i) == Some(*f)),
            Elements::Str(v) => v.iter().enumerate().all(|(i, s)| {
                other.kind() != ArrayKind::Ptr && other.get_string(i).as_deref() == s.as_deref()
            }),
            Elements::Ptr(v) => v.iter().enumerate().all(|(i, p)| {
                other.kind() == ArrayKind::Ptr
                    && match (p, other.get_ptr(i)) {
                        (None, None) => true,
                        (Some(a), Some(b)) => same_ptr(a, &b),
                        _ => false,
                    }
            }),
        };
        if equal {
            ArrayComparison::Equal
        } else {
            ArrayComparison::Mismatch
        }
    }

    /// Deep copy that replays every element through the kind's `push`.
    pub fn copy(&self) -> Result<TypedArray, ArrayError> {
        let mut copy = TypedArray::new(self.kind());
        match &self.elements {
            Elements::Int(v) => v.iter().try_for_each(|n| copy.push_int(*n))?,
            Elements::Float(v) => v.iter().try_for_each(|f| copy.push_float(*f))?,
            Elements::Str(v) => v.iter().try_for_each(|s| copy.push_string(s.as_deref()))?,
            Elements::Ptr(v) => v.iter().try_for_each(|p| copy.push_ptr(p.clone()))?,
        }
        Ok(copy)
    }

    /// Concatenates string elements from `start` on with `glue` (default `" "`).
    ///
    /// `None` for non-string arrays or when nothing remains from `start` onward.
    /// Null elements contribute empty text.
    pub fn join(&self, glue: Option<&str>, start: usize) -> Option<String> {
        text::join(self, glue, start)
    }
}

/// Compares two optional arrays; a missing array is never comparable.
pub fn compare_opt(a: Option<&TypedArray>, b: Option<&TypedArray>) -> ArrayComparison {
    match (a, b) {
        (Some(a), Some(b)) => a.compare(b),
        _ => ArrayComparison::Incomparable,
    }
}
