use std::{collections::BTreeMap, fmt};

use crate::{metadata::typesystem::PrimitiveData, Result};

/// The captured representation of a debuggee value.
///
/// Which variant is valid for a given value is decided by its type: primitives and strings hold
/// [`ValueData::Primitive`], arrays hold [`ValueData::Array`] and classes and value types hold
/// [`ValueData::Object`]. Reference types may also be [`ValueData::Null`].
#[derive(Debug, Clone, PartialEq)]
pub enum ValueData {
    /// A null reference
    Null,
    /// The handle no longer refers to live data
    Invalid,
    /// A scalar or string
    Primitive(PrimitiveData),
    /// An array with its elements
    Array(ArrayData),
    /// A class or struct instance with its captured members
    Object(ObjectData),
}

impl ValueData {
    /// A single dimensional array of the given elements
    #[must_use]
    pub fn array(elements: Vec<ValueData>) -> Self {
        ValueData::Array(ArrayData::single(elements))
    }
}

impl From<PrimitiveData> for ValueData {
    fn from(data: PrimitiveData) -> Self {
        ValueData::Primitive(data)
    }
}

/// The lengths of each dimension of an array
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ArrayDimensions(Vec<usize>);

impl ArrayDimensions {
    /// Create from the length of each dimension
    #[must_use]
    pub fn new(lengths: Vec<usize>) -> Self {
        ArrayDimensions(lengths)
    }

    /// Number of dimensions
    #[must_use]
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Total number of elements, `None` if the product overflows `usize`
    #[must_use]
    pub fn total_count(&self) -> Option<usize> {
        self.0
            .iter()
            .try_fold(1usize, |count, &length| count.checked_mul(length))
    }

    /// Length of each dimension
    #[must_use]
    pub fn lengths(&self) -> &[usize] {
        &self.0
    }

    /// Row-major position of `indices`, or `None` if any index is out of range
    #[must_use]
    pub fn flat_index(&self, indices: &[usize]) -> Option<usize> {
        if indices.len() != self.0.len() {
            return None;
        }

        indices
            .iter()
            .zip(&self.0)
            .try_fold(0usize, |flat, (&index, &length)| {
                (index < length).then_some(flat * length + index)
            })
    }

    /// The indices of the element at row-major position `flat`
    #[must_use]
    pub fn indices_of(&self, mut flat: usize) -> Vec<usize> {
        let mut indices = vec![0; self.0.len()];
        for (slot, &length) in indices.iter_mut().zip(&self.0).rev() {
            if length > 0 {
                *slot = flat % length;
                flat /= length;
            }
        }
        indices
    }
}

impl fmt::Display for ArrayDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_indices(f, &self.0)
    }
}

/// Writes `[a, b, c]`
pub(crate) fn write_indices(f: &mut impl fmt::Write, indices: &[usize]) -> fmt::Result {
    f.write_char('[')?;
    for (position, index) in indices.iter().enumerate() {
        if position > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{index}")?;
    }
    f.write_char(']')
}

/// Formats `[a, b, c]`
pub(crate) fn format_indices(indices: &[usize]) -> String {
    let mut formatted = String::new();
    // Writing into a String can not fail
    let _ = write_indices(&mut formatted, indices);
    formatted
}

/// The elements of an array, stored in row-major order
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayData {
    dimensions: ArrayDimensions,
    elements: Vec<ValueData>,
}

impl ArrayData {
    /// Create an array of the given shape.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the array has no dimensions, the product of the
    /// dimension lengths overflows, or the number of elements does not match that product.
    pub fn new(dimensions: ArrayDimensions, elements: Vec<ValueData>) -> Result<Self> {
        if dimensions.rank() == 0 {
            return Err(malformed_error!("An array needs at least one dimension"));
        }

        let Some(count) = dimensions.total_count() else {
            return Err(malformed_error!(
                "Array dimensions {} exceed the addressable element count",
                dimensions
            ));
        };

        if count != elements.len() {
            return Err(malformed_error!(
                "Array dimensions {} hold {} elements, but {} were given",
                dimensions,
                count,
                elements.len()
            ));
        }

        Ok(ArrayData {
            dimensions,
            elements,
        })
    }

    /// A single dimensional array
    #[must_use]
    pub fn single(elements: Vec<ValueData>) -> Self {
        ArrayData {
            dimensions: ArrayDimensions::new(vec![elements.len()]),
            elements,
        }
    }

    /// The shape of the array
    #[must_use]
    pub fn dimensions(&self) -> &ArrayDimensions {
        &self.dimensions
    }

    /// All elements, row-major
    #[must_use]
    pub fn elements(&self) -> &[ValueData] {
        &self.elements
    }

    /// The element at `indices`
    #[must_use]
    pub fn get(&self, indices: &[usize]) -> Option<&ValueData> {
        self.elements.get(self.dimensions.flat_index(indices)?)
    }
}

/// The captured members of a class or struct instance.
///
/// Members that were not captured read as the default of their declared type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectData {
    members: BTreeMap<String, ValueData>,
}

impl ObjectData {
    /// An instance without captured members
    #[must_use]
    pub fn new() -> Self {
        ObjectData::default()
    }

    /// Capture a member value
    #[must_use]
    pub fn with(mut self, name: &str, data: ValueData) -> Self {
        self.members.insert(name.to_string(), data);
        self
    }

    /// Capture a member value
    pub fn insert(&mut self, name: &str, data: ValueData) {
        self.members.insert(name.to_string(), data);
    }

    /// The captured value of a member
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ValueData> {
        self.members.get(name)
    }

    /// All captured members, ordered by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValueData)> {
        self.members.iter().map(|(name, data)| (name.as_str(), data))
    }
}
