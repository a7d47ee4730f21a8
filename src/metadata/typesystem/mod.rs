//! Debuggee type system: the arena of type descriptors behind every inspected value.
//!
//! Types are snapshots of the debuggee's runtime types. They live in a [`TypeRegistry`] arena,
//! indexed by [`Token`], and refer to their base, element, interface and generic argument types
//! by token. A type can only be inserted after its base type, so every BaseType chain ends at a
//! root (normally `System.Object`) after a finite number of steps.
//!
//! # Key Components
//!
//! - [`RuntimeType`]: The stored descriptor of one type
//! - [`DebugType`]: A resolved view of a type, answering the descriptor attributes
//! - [`TypeRegistry`]: Central arena for all types, pre-seeded with the core library
//! - [`TypeBuilder`]: Fluent construction of classes, value types and interfaces
//! - [`TypeResolver`]: Resolves tokens and type names, walks base chains
//!
//! # Examples
//!
//! ```rust
//! use debugdump::metadata::typesystem::{TypeRegistry, TypeResolver};
//!
//! let registry = TypeRegistry::new()?;
//! let resolver = TypeResolver::new(&registry);
//!
//! let array = resolver.resolve_name("System.Int32[]")?;
//! assert!(array.is_array());
//! assert_eq!(array.base_type().unwrap().full_name(), "System.Array");
//! # Ok::<(), debugdump::Error>(())
//! ```

mod builder;
mod descriptor;
mod flavor;
mod primitives;
mod registry;
mod resolver;

use std::sync::Arc;

pub use builder::TypeBuilder;
pub use descriptor::DebugType;
pub use flavor::{Intrinsic, MemberInfo, MemberKind, TypeFlags, TypeFlavor};
pub use primitives::{PrimitiveData, PrimitiveKind};
pub use registry::{CoreType, TypeRegistry};
pub use resolver::{TypeResolver, MAX_RECURSION_DEPTH};

use crate::metadata::token::Token;

/// Reference to a `RuntimeType`
pub type RuntimeTypeRc = Arc<RuntimeType>;

/// The stored descriptor of one debuggee type.
///
/// Immutable once registered; every cross reference is a [`Token`] into the owning registry.
#[derive(Debug, Clone)]
pub struct RuntimeType {
    /// Token
    pub token: Token,
    /// Namespace (can be empty)
    pub namespace: String,
    /// Name, including array/pointer suffixes and generic arguments for constructed types
    pub name: String,
    /// The kind of type
    pub flavor: TypeFlavor,
    /// Owning binary, e.g. `mscorlib.dll`
    pub module: Option<String>,
    /// The base type aka 'extends'
    pub base: Option<Token>,
    /// Element type of arrays and pointers
    pub element: Option<Token>,
    /// All interfaces this type implements, in declaration order
    pub interfaces: Vec<Token>,
    /// Generic arguments of an instantiated generic type, in order
    pub generic_args: Vec<Token>,
    /// Declared fields and properties, in declaration order
    pub members: Vec<MemberInfo>,
}

impl RuntimeType {
    /// Create a new type without base, members or relations
    #[must_use]
    pub fn new(token: Token, flavor: TypeFlavor, namespace: &str, name: &str) -> Self {
        RuntimeType {
            token,
            namespace: namespace.to_string(),
            name: name.to_string(),
            flavor,
            module: None,
            base: None,
            element: None,
            interfaces: Vec::new(),
            generic_args: Vec::new(),
            members: Vec::new(),
        }
    }

    /// Returns the full name (Namespace.Name) of the type
    #[must_use]
    pub fn fullname(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{0}.{1}", self.namespace, self.name)
        }
    }

    /// Returns the declared member with the given name
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&MemberInfo> {
        self.members.iter().find(|member| member.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fullname() {
        let ty = RuntimeType::new(Token::new(0x0200_0001), TypeFlavor::Class, "App", "Point");
        assert_eq!(ty.fullname(), "App.Point");

        let global = RuntimeType::new(Token::new(0x0200_0002), TypeFlavor::Class, "", "Program");
        assert_eq!(global.fullname(), "Program");
    }

    #[test]
    fn test_member_lookup() {
        let mut ty = RuntimeType::new(Token::new(0x0200_0001), TypeFlavor::Class, "App", "Point");
        ty.members.push(MemberInfo::field("x", PrimitiveKind::I4.token()));
        ty.members
            .push(MemberInfo::property("Label", CoreType::String.token()));

        assert_eq!(ty.member("x").unwrap().kind, MemberKind::Field);
        assert_eq!(ty.member("Label").unwrap().kind, MemberKind::Property);
        assert!(ty.member("y").is_none());
    }
}
