//! Debuggee value model.
//!
//! A [`Value`] is an immutable snapshot of one datum inside the paused debuggee: the
//! [`DebugType`] it was read as, the expression that produced it, and its captured
//! [`ValueData`]. Values are built and checked once, then answer every accessor totally: an
//! accessor that does not apply to the value's kind returns a typed [`crate::Error`] that the
//! dump serializer renders as `{Exception: <message>}`.
//!
//! # Examples
//!
//! ```rust
//! use debugdump::metadata::typesystem::{PrimitiveData, TypeRegistry, TypeResolver};
//! use debugdump::value::{Value, ValueData};
//!
//! let registry = TypeRegistry::new()?;
//! let resolver = TypeResolver::new(&registry);
//!
//! let elements = (0..5).map(|i| PrimitiveData::I4(i).into()).collect();
//! let array = Value::new(
//!     resolver.resolve_name("int[]")?,
//!     "array",
//!     ValueData::array(elements),
//! )?;
//!
//! assert_eq!(array.array_length()?, 5);
//! assert_eq!(array.as_string(), "{System.Int32[]}");
//! assert_eq!(array.array_elements()?[3].expression(), "array[3]");
//! assert_eq!(array.get_member_value("Length")?.as_string(), "5");
//! assert_eq!(
//!     array.primitive_value().unwrap_err().to_string(),
//!     "Value is not a primitive type"
//! );
//! # Ok::<(), debugdump::Error>(())
//! ```

mod data;

pub use data::{ArrayData, ArrayDimensions, ObjectData, ValueData};
pub(crate) use data::format_indices;

use crate::{
    metadata::typesystem::{DebugType, Intrinsic, PrimitiveData, PrimitiveKind, TypeFlavor},
    Error::{
        ArrayRankMismatch, IndexOutOfRange, MemberNotFound, NotAnArray, NotPrimitive,
        NullReference, ValueInvalid,
    },
    Result,
};

/// A snapshot of one debuggee value
#[derive(Debug, Clone)]
pub struct Value<'r> {
    ty: DebugType<'r>,
    expression: String,
    data: ValueData,
}

impl<'r> Value<'r> {
    /// Create a value, checking that `data` fits `ty`.
    ///
    /// Primitive data must match the primitive kind, array data the rank, and only reference
    /// types may be null. Object members are checked against their declared types.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the data does not fit the type.
    pub fn new(ty: DebugType<'r>, expression: &str, data: ValueData) -> Result<Self> {
        check_data(&ty, &data)?;
        Ok(Value {
            ty,
            expression: expression.to_string(),
            data,
        })
    }

    /// A null reference of the given type
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for value types.
    pub fn null(ty: DebugType<'r>, expression: &str) -> Result<Self> {
        Value::new(ty, expression, ValueData::Null)
    }

    /// A value that is no longer valid
    #[must_use]
    pub fn invalid(ty: DebugType<'r>, expression: &str) -> Self {
        Value {
            ty,
            expression: expression.to_string(),
            data: ValueData::Invalid,
        }
    }

    /// The same value under another expression
    #[must_use]
    pub fn with_expression(mut self, expression: &str) -> Self {
        self.expression = expression.to_string();
        self
    }

    /// The expression this value was produced by
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// The type this value was read as
    #[must_use]
    pub fn debug_type(&self) -> &DebugType<'r> {
        &self.ty
    }

    /// The captured data
    #[must_use]
    pub fn data(&self) -> &ValueData {
        &self.data
    }

    /// `IsNull`
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self.data, ValueData::Null)
    }

    /// `IsInvalid`
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        matches!(self.data, ValueData::Invalid)
    }

    /// The scalar of a primitive or string value; `None` for a null string.
    ///
    /// # Errors
    /// Returns [`NotPrimitive`] for composite values and [`ValueInvalid`] for invalid ones.
    pub fn primitive_value(&self) -> Result<Option<PrimitiveData>> {
        if self.is_invalid() {
            return Err(ValueInvalid);
        }
        if !self.ty.is_primitive() {
            return Err(NotPrimitive);
        }

        match &self.data {
            ValueData::Primitive(data) => Ok(Some(data.clone())),
            _ => Ok(None),
        }
    }

    /// The display text of the value.
    ///
    /// Primitives render the way the debuggee runtime formats them, arrays and objects as
    /// `{FullName}`.
    #[must_use]
    pub fn as_string(&self) -> String {
        match &self.data {
            ValueData::Null => "null".to_string(),
            ValueData::Invalid => "<invalid>".to_string(),
            ValueData::Primitive(data) => data.to_string(),
            ValueData::Array(_) | ValueData::Object(_) => format!("{{{}}}", self.ty.full_name()),
        }
    }

    fn array_data(&self) -> Result<&ArrayData> {
        if !self.ty.is_array() {
            return Err(NotAnArray);
        }

        match &self.data {
            ValueData::Array(array) => Ok(array),
            ValueData::Invalid => Err(ValueInvalid),
            _ => Err(NullReference),
        }
    }

    /// `ArrayRank`: number of dimensions
    ///
    /// # Errors
    /// Returns [`NotAnArray`] if the value's type is not an array.
    pub fn array_rank(&self) -> Result<usize> {
        let rank = self.ty.array_rank().ok_or(NotAnArray)?;
        if self.is_invalid() {
            return Err(ValueInvalid);
        }

        Ok(rank as usize)
    }

    /// `ArrayDimensions`: length of each dimension
    ///
    /// # Errors
    /// Returns [`NotAnArray`] if the value's type is not an array, [`NullReference`] for a null
    /// array.
    pub fn array_dimensions(&self) -> Result<ArrayDimensions> {
        Ok(self.array_data()?.dimensions().clone())
    }

    /// `ArrayLength`: total number of elements
    ///
    /// # Errors
    /// Returns [`NotAnArray`] if the value's type is not an array, [`NullReference`] for a null
    /// array.
    pub fn array_length(&self) -> Result<usize> {
        Ok(self.array_data()?.elements().len())
    }

    fn element_type(&self) -> Result<DebugType<'r>> {
        self.ty
            .element_type()
            .ok_or_else(|| malformed_error!("Array type {} has no element type", self.ty))
    }

    fn element_value(
        &self,
        element_type: &DebugType<'r>,
        indices: &[usize],
        data: &ValueData,
    ) -> Value<'r> {
        Value {
            ty: element_type.clone(),
            expression: format!("{}{}", self.expression, format_indices(indices)),
            data: data.clone(),
        }
    }

    /// All elements in ascending row-major order, named `expr[i]` or `expr[i, j]`
    ///
    /// # Errors
    /// Returns [`NotAnArray`] if the value's type is not an array, [`NullReference`] for a null
    /// array.
    pub fn array_elements(&self) -> Result<Vec<Value<'r>>> {
        let array = self.array_data()?;
        let element_type = self.element_type()?;

        Ok(array
            .elements()
            .iter()
            .enumerate()
            .map(|(flat, data)| {
                let indices = array.dimensions().indices_of(flat);
                self.element_value(&element_type, &indices, data)
            })
            .collect())
    }

    /// The element at `indices`
    ///
    /// # Errors
    /// Returns [`ArrayRankMismatch`] if the number of indices differs from the rank and
    /// [`IndexOutOfRange`] if an index exceeds its dimension.
    pub fn get_array_element(&self, indices: &[usize]) -> Result<Value<'r>> {
        let array = self.array_data()?;
        let dimensions = array.dimensions();
        if indices.len() != dimensions.rank() {
            return Err(ArrayRankMismatch {
                rank: dimensions.rank(),
                given: indices.len(),
            });
        }

        let data = array.get(indices).ok_or_else(|| IndexOutOfRange {
            index: format_indices(indices),
            dimensions: dimensions.to_string(),
        })?;

        Ok(self.element_value(&self.element_type()?, indices, data))
    }

    /// The value of a field or property declared on the type or any ancestor.
    ///
    /// Members that were not captured read as the default of their declared type.
    ///
    /// # Errors
    /// Returns [`MemberNotFound`] if no type in the chain declares `name`, [`NullReference`]
    /// when called on a null value.
    pub fn get_member_value(&self, name: &str) -> Result<Value<'r>> {
        if self.is_invalid() {
            return Err(ValueInvalid);
        }

        let (_, member) = self.ty.find_member(name).ok_or_else(|| MemberNotFound {
            type_name: self.ty.full_name(),
            member: name.to_string(),
        })?;

        if self.is_null() {
            return Err(NullReference);
        }

        let registry = self.ty.registry();
        let member_type = registry.describe(member.ty)?;
        let expression = format!("{}.{}", self.expression, name);

        let data = match member.intrinsic {
            Some(intrinsic) => self.intrinsic_data(intrinsic)?,
            None => match &self.data {
                ValueData::Object(object) => match object.get(name) {
                    Some(data) => data.clone(),
                    None => default_data(&member_type),
                },
                _ => default_data(&member_type),
            },
        };

        log::trace!("read {expression} as {member_type}");
        Value::new(member_type, &expression, data)
    }

    fn intrinsic_data(&self, intrinsic: Intrinsic) -> Result<ValueData> {
        let to_i32 = |count: usize| {
            i32::try_from(count)
                .map_err(|_| malformed_error!("{} does not fit into System.Int32", count))
        };

        let data = match intrinsic {
            Intrinsic::ArrayLength => PrimitiveData::I4(to_i32(self.array_length()?)?),
            Intrinsic::ArrayLongLength => PrimitiveData::I8(
                i64::try_from(self.array_length()?)
                    .map_err(|_| malformed_error!("Array length does not fit into System.Int64"))?,
            ),
            Intrinsic::ArrayRank => PrimitiveData::I4(to_i32(self.array_rank()?)?),
            Intrinsic::StringLength => match &self.data {
                ValueData::Primitive(PrimitiveData::String(text)) => {
                    PrimitiveData::I4(to_i32(text.encode_utf16().count())?)
                }
                _ => return Err(NotPrimitive),
            },
        };

        Ok(ValueData::Primitive(data))
    }
}

/// The zero value of a type
fn default_data(ty: &DebugType<'_>) -> ValueData {
    match ty.flavor() {
        TypeFlavor::Primitive(kind) => ValueData::Primitive(kind.default_data()),
        TypeFlavor::ValueType => ValueData::Object(ObjectData::new()),
        TypeFlavor::Void => ValueData::Invalid,
        _ => ValueData::Null,
    }
}

fn check_data(ty: &DebugType<'_>, data: &ValueData) -> Result<()> {
    match data {
        ValueData::Invalid => Ok(()),
        ValueData::Null if ty.is_reference() => Ok(()),
        ValueData::Null => Err(malformed_error!("A value of type {} can not be null", ty)),
        ValueData::Primitive(primitive) => {
            let fits = match ty.flavor() {
                TypeFlavor::String => primitive.as_str().is_some(),
                TypeFlavor::Primitive(kind) => primitive.kind() == Some(kind),
                _ => false,
            };
            if fits {
                Ok(())
            } else {
                Err(malformed_error!(
                    "{} is not a valid {}",
                    primitive_kind_name(primitive),
                    ty
                ))
            }
        }
        ValueData::Array(array) => {
            let rank = ty
                .array_rank()
                .ok_or_else(|| malformed_error!("{} is not an array type", ty))?;
            if rank as usize != array.dimensions().rank() {
                return Err(malformed_error!(
                    "{} has rank {}, but the data has dimensions {}",
                    ty,
                    rank,
                    array.dimensions()
                ));
            }

            let element_type = ty
                .element_type()
                .ok_or_else(|| malformed_error!("Array type {} has no element type", ty))?;
            array
                .elements()
                .iter()
                .try_for_each(|element| check_data(&element_type, element))
        }
        ValueData::Object(object) => {
            if !matches!(ty.flavor(), TypeFlavor::Class | TypeFlavor::ValueType) {
                return Err(malformed_error!("{} does not hold members", ty));
            }

            for (name, member_data) in object.iter() {
                let (_, member) = ty.find_member(name).ok_or_else(|| MemberNotFound {
                    type_name: ty.full_name(),
                    member: name.to_string(),
                })?;
                if member.intrinsic.is_some() {
                    return Err(malformed_error!(
                        "{}.{} is computed by the runtime and can not be captured",
                        ty,
                        name
                    ));
                }

                let member_type = ty.registry().describe(member.ty)?;
                check_data(&member_type, member_data)?;
            }
            Ok(())
        }
    }
}

fn primitive_kind_name(data: &PrimitiveData) -> &'static str {
    data.kind().map_or("String", |kind: PrimitiveKind| kind.name())
}
