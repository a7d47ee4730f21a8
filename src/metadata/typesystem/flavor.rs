use bitflags::bitflags;

use crate::metadata::{token::Token, typesystem::PrimitiveKind};

bitflags! {
    /// Boolean classification of a type, as reported by the `Is*` descriptor attributes.
    ///
    /// The flags are derived from the [`TypeFlavor`] and never stored separately, so they
    /// cannot disagree with it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TypeFlags: u16 {
        /// The type is an array
        const ARRAY = 0x0001;
        /// The type is a class (reference type that is not an array, pointer or interface)
        const CLASS = 0x0002;
        /// The type is a value type
        const VALUE_TYPE = 0x0004;
        /// The type has a scalar representation (includes `System.String`)
        const PRIMITIVE = 0x0008;
        /// The type is `System.String`
        const STRING = 0x0010;
        /// The type is an 8 to 64 bit integer
        const INTEGER = 0x0020;
        /// The type is an interface
        const INTERFACE = 0x0040;
        /// The type is an unmanaged pointer
        const POINTER = 0x0080;
        /// The type is `System.Void`
        const VOID = 0x0100;
    }
}

/// The kind of a type in the debuggee's type system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeFlavor {
    /// `System.Void`
    Void,
    /// One of the runtime's primitive value types
    Primitive(PrimitiveKind),
    /// `System.String`
    String,
    /// A reference type
    Class,
    /// A user-defined value type
    ValueType,
    /// An interface
    Interface,
    /// An array of `rank` dimensions
    Array {
        /// The rank (number of dimensions)
        rank: u32,
    },
    /// An unmanaged pointer
    Pointer,
}

impl TypeFlavor {
    /// Returns the classification flags of this flavor
    #[must_use]
    pub fn flags(&self) -> TypeFlags {
        match self {
            TypeFlavor::Void => TypeFlags::VOID | TypeFlags::VALUE_TYPE,
            TypeFlavor::Primitive(kind) => {
                let mut flags = TypeFlags::VALUE_TYPE | TypeFlags::PRIMITIVE;
                if kind.is_integer() {
                    flags |= TypeFlags::INTEGER;
                }
                flags
            }
            TypeFlavor::String => TypeFlags::CLASS | TypeFlags::STRING | TypeFlags::PRIMITIVE,
            TypeFlavor::Class => TypeFlags::CLASS,
            TypeFlavor::ValueType => TypeFlags::VALUE_TYPE,
            TypeFlavor::Interface => TypeFlags::INTERFACE,
            TypeFlavor::Array { .. } => TypeFlags::ARRAY,
            TypeFlavor::Pointer => TypeFlags::POINTER,
        }
    }

    /// Values of this flavor can be null
    #[must_use]
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            TypeFlavor::String
                | TypeFlavor::Class
                | TypeFlavor::Interface
                | TypeFlavor::Array { .. }
                | TypeFlavor::Pointer
        )
    }

    /// Only classes and value types belong to a module
    #[must_use]
    pub fn has_module(&self) -> bool {
        let flags = self.flags();
        flags.intersects(TypeFlags::CLASS | TypeFlags::VALUE_TYPE)
    }

    /// Other types may use this flavor as their base type
    #[must_use]
    pub fn is_inheritable(&self) -> bool {
        matches!(self, TypeFlavor::Class)
    }
}

/// Whether a member is a stored field or an evaluated property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum MemberKind {
    /// A field, read from the object's data
    Field,
    /// A property, read from the object's data or computed by the runtime
    Property,
}

/// Runtime-computed properties of core library types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intrinsic {
    /// `System.Array.Length`: total number of elements
    ArrayLength,
    /// `System.Array.LongLength`: total number of elements as `Int64`
    ArrayLongLength,
    /// `System.Array.Rank`: number of dimensions
    ArrayRank,
    /// `System.String.Length`: number of UTF-16 code units
    StringLength,
}

/// A field or property declared on a type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    /// Member name
    pub name: String,
    /// Field or property
    pub kind: MemberKind,
    /// Declared type of the member
    pub ty: Token,
    /// Set when the runtime computes the value instead of reading it
    pub intrinsic: Option<Intrinsic>,
}

impl MemberInfo {
    /// A stored field
    #[must_use]
    pub fn field(name: &str, ty: Token) -> Self {
        MemberInfo {
            name: name.to_string(),
            kind: MemberKind::Field,
            ty,
            intrinsic: None,
        }
    }

    /// A property whose value is captured in the object data
    #[must_use]
    pub fn property(name: &str, ty: Token) -> Self {
        MemberInfo {
            name: name.to_string(),
            kind: MemberKind::Property,
            ty,
            intrinsic: None,
        }
    }

    /// A property computed by the runtime
    #[must_use]
    pub fn intrinsic(name: &str, ty: Token, intrinsic: Intrinsic) -> Self {
        MemberInfo {
            name: name.to_string(),
            kind: MemberKind::Property,
            ty,
            intrinsic: Some(intrinsic),
        }
    }
}
