//! Builder for debuggee type descriptors.
//!
//! This module provides the [`TypeBuilder`] struct, which offers a fluent API for constructing
//! classes, value types and interfaces with their members, and for deriving arrays, pointers and
//! generic instances from them. Types are registered in the [`TypeRegistry`] on [`TypeBuilder::build`],
//! or earlier when a composite type needs its element registered first.
//!
//! # Example
//!
//! ```rust
//! use debugdump::metadata::typesystem::{PrimitiveKind, TypeBuilder, TypeRegistry};
//!
//! let registry = TypeRegistry::new()?;
//! let point = TypeBuilder::new(&registry)
//!     .value_type("App", "Point")
//!     .module("App.exe")?
//!     .field("x", PrimitiveKind::I4.token())?
//!     .field("y", PrimitiveKind::I4.token())?
//!     .build()?;
//!
//! let points = TypeBuilder::new(&registry)
//!     .existing(point.token)?
//!     .multi_dimensional_array(2)?
//!     .build()?;
//! assert_eq!(points.fullname(), "App.Point[,]");
//! # Ok::<(), debugdump::Error>(())
//! ```

use crate::{
    metadata::{
        token::Token,
        typesystem::{
            CoreType, MemberInfo, PrimitiveKind, RuntimeType, RuntimeTypeRc, TypeFlavor,
            TypeRegistry,
        },
    },
    Error::{TypeError, TypeNotFound},
    Result,
};

enum Current {
    /// A new definition, registered on build
    Pending(RuntimeType),
    /// A type that is already in the registry
    Registered(RuntimeTypeRc),
}

/// Provides a fluent API for building type descriptors
pub struct TypeBuilder<'r> {
    /// Type registry for storing the types
    registry: &'r TypeRegistry,
    /// Current type being built
    current: Option<Current>,
}

impl<'r> TypeBuilder<'r> {
    /// Create a new builder with the given registry
    ///
    /// ## Arguments
    /// * 'registry' - The type registry to use
    #[must_use]
    pub fn new(registry: &'r TypeRegistry) -> Self {
        TypeBuilder {
            registry,
            current: None,
        }
    }

    /// Start from a primitive type
    ///
    /// # Errors
    /// Returns an error if the primitive type cannot be retrieved from the registry.
    pub fn primitive(mut self, primitive: PrimitiveKind) -> Result<Self> {
        self.current = Some(Current::Registered(self.registry.get_primitive(primitive)?));
        Ok(self)
    }

    /// Start from a type that is already registered
    ///
    /// # Errors
    /// Returns an error if the token is unknown.
    pub fn existing(mut self, token: Token) -> Result<Self> {
        let existing = self.registry.get(&token).ok_or(TypeNotFound(token))?;
        self.current = Some(Current::Registered(existing));
        Ok(self)
    }

    fn start(mut self, flavor: TypeFlavor, namespace: &str, name: &str) -> Self {
        let token = self.registry.next_token(Token::DEFINED);
        let mut new_type = RuntimeType::new(token, flavor, namespace, name);
        new_type.base = match flavor {
            TypeFlavor::Class => Some(CoreType::Object.token()),
            TypeFlavor::ValueType => Some(CoreType::ValueType.token()),
            _ => None,
        };

        self.current = Some(Current::Pending(new_type));
        self
    }

    /// Start building a class deriving from `System.Object`
    ///
    /// ## Arguments
    /// * 'namespace' - Namespace for a class type
    /// * 'name'      - Name for a class type
    #[must_use]
    pub fn class(self, namespace: &str, name: &str) -> Self {
        self.start(TypeFlavor::Class, namespace, name)
    }

    /// Start building a value type deriving from `System.ValueType`
    ///
    /// ## Arguments
    /// * 'namespace' - Namespace for a value type
    /// * 'name'      - Name for a value type
    #[must_use]
    pub fn value_type(self, namespace: &str, name: &str) -> Self {
        self.start(TypeFlavor::ValueType, namespace, name)
    }

    /// Start building an interface
    ///
    /// ## Arguments
    /// * 'namespace' - Namespace for an interface type
    /// * 'name'      - Name for an interface type
    #[must_use]
    pub fn interface(self, namespace: &str, name: &str) -> Self {
        self.start(TypeFlavor::Interface, namespace, name)
    }

    fn pending(&mut self) -> Result<&mut RuntimeType> {
        match self.current.as_mut() {
            Some(Current::Pending(pending)) => Ok(pending),
            Some(Current::Registered(registered)) => Err(TypeError(format!(
                "{} is already registered and can not be modified",
                registered.fullname()
            ))),
            None => Err(TypeError("No type has been started".to_string())),
        }
    }

    fn register(&mut self) -> Result<RuntimeTypeRc> {
        match self.current.take() {
            Some(Current::Pending(pending)) => self.registry.insert(pending),
            Some(Current::Registered(registered)) => Ok(registered),
            None => Err(TypeError("No type has been started".to_string())),
        }
    }

    /// The token the current type has or will be registered with
    #[must_use]
    pub fn token(&self) -> Option<Token> {
        match self.current.as_ref()? {
            Current::Pending(pending) => Some(pending.token),
            Current::Registered(registered) => Some(registered.token),
        }
    }

    /// Set the binary that owns the current type
    ///
    /// # Errors
    /// Returns an error if no new type is being built.
    pub fn module(mut self, module: &str) -> Result<Self> {
        self.pending()?.module = Some(module.to_string());
        Ok(self)
    }

    /// Specify a base type for the current type
    ///
    /// ## Arguments
    /// * `base_token` - Set the base of the type
    ///
    /// # Errors
    /// Returns an error if no new type is being built or the base token cannot be resolved.
    pub fn extends(mut self, base_token: Token) -> Result<Self> {
        if self.registry.get(&base_token).is_none() {
            return Err(TypeNotFound(base_token));
        }

        self.pending()?.base = Some(base_token);
        Ok(self)
    }

    /// Add an implemented interface
    ///
    /// # Errors
    /// Returns an error if no new type is being built.
    pub fn implements(mut self, interface: Token) -> Result<Self> {
        self.pending()?.interfaces.push(interface);
        Ok(self)
    }

    /// Declare a field
    ///
    /// # Errors
    /// Returns an error if no new type is being built.
    pub fn field(mut self, name: &str, ty: Token) -> Result<Self> {
        self.pending()?.members.push(MemberInfo::field(name, ty));
        Ok(self)
    }

    /// Declare a property
    ///
    /// # Errors
    /// Returns an error if no new type is being built.
    pub fn property(mut self, name: &str, ty: Token) -> Result<Self> {
        self.pending()?.members.push(MemberInfo::property(name, ty));
        Ok(self)
    }

    /// Replace the current type by a pointer to it
    ///
    /// # Errors
    /// Returns an error if the current type can not be registered.
    pub fn pointer(mut self) -> Result<Self> {
        let element = self.register()?;
        let pointer = self.registry.get_or_create_pointer(element.token)?;
        self.current = Some(Current::Registered(pointer));
        Ok(self)
    }

    /// Replace the current type by a single dimensional array of it
    ///
    /// # Errors
    /// Returns an error if the current type can not be registered.
    pub fn array(self) -> Result<Self> {
        self.multi_dimensional_array(1)
    }

    /// Replace the current type by an array of it with `rank` dimensions
    ///
    /// # Errors
    /// Returns an error if the current type can not be registered or the rank is 0.
    pub fn multi_dimensional_array(mut self, rank: u32) -> Result<Self> {
        let element = self.register()?;
        let array = self.registry.get_or_create_array(element.token, rank)?;
        self.current = Some(Current::Registered(array));
        Ok(self)
    }

    /// Replace the current generic type definition by its instantiation
    ///
    /// # Errors
    /// Returns an error if the definition can not be registered or an argument is unknown.
    pub fn generic_instance(mut self, arguments: &[Token]) -> Result<Self> {
        let definition = self.register()?;
        let instance = self
            .registry
            .get_or_create_generic_instance(definition.token, arguments)?;
        self.current = Some(Current::Registered(instance));
        Ok(self)
    }

    /// Register and return the built type
    ///
    /// # Errors
    /// Returns an error if no type has been started or the registry rejects it.
    pub fn build(mut self) -> Result<RuntimeTypeRc> {
        self.register()
    }
}
