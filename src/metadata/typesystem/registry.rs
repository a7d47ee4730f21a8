//! Central type registry for debuggee inspection.
//!
//! This module provides the `TypeRegistry`, the arena that owns every [`RuntimeType`] known to a
//! debugging session. Descriptors reference each other by [`Token`], never by pointer, which keeps
//! the BaseType chain a simple singly linked list through the arena.
//!
//! # Registry Architecture
//!
//! - **Token-based storage**: primary index using a skip list ordered by token
//! - **Name-based lookup**: secondary index from full name to token
//! - **Token spaces**: core library types use fixed tokens, defined and constructed types draw
//!   from separate atomic counters
//!
//! # Invariants
//!
//! - A type's base, element, interface and generic argument types are registered before it
//! - Only classes can be used as a base type
//! - Full names are unique
//!
//! Together these make every BaseType chain acyclic and finite.
//!
//! # Examples
//!
//! ```rust
//! use debugdump::metadata::typesystem::{CoreType, PrimitiveKind, TypeRegistry};
//!
//! let registry = TypeRegistry::new()?;
//! let int = registry.get_primitive(PrimitiveKind::I4)?;
//! assert_eq!(int.fullname(), "System.Int32");
//! assert_eq!(int.base, Some(CoreType::ValueType.token()));
//!
//! let array = registry.get_or_create_array(int.token, 1)?;
//! assert_eq!(array.fullname(), "System.Int32[]");
//! # Ok::<(), debugdump::Error>(())
//! ```

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use crossbeam_skiplist::SkipMap;
use dashmap::{mapref::entry::Entry, DashMap};
use strum::{EnumIter, IntoEnumIterator};

use crate::{
    metadata::{
        token::Token,
        typesystem::{
            DebugType, Intrinsic, MemberInfo, PrimitiveKind, RuntimeType, RuntimeTypeRc,
            TypeFlavor,
        },
    },
    Error::{TypeError, TypeNotFound},
    Result,
};

/// The non-primitive core library types every registry starts with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum CoreType {
    /// System.Object - root of the class hierarchy
    Object,
    /// System.ValueType - base class for value types
    ValueType,
    /// System.Enum - base class for enumerations
    Enum,
    /// System.Void
    Void,
    /// System.String
    String,
    /// System.Array - base class for all arrays
    Array,
    /// System.ICloneable
    ICloneable,
    /// System.Collections.IEnumerable
    IEnumerable,
    /// System.Collections.ICollection
    ICollection,
    /// System.Collections.IList
    IList,
}

impl CoreType {
    /// Get the token for this type
    #[must_use]
    pub fn token(&self) -> Token {
        Token::from_parts(
            Token::CORE_LIBRARY,
            match self {
                CoreType::Void => 0x01,
                CoreType::Object => 0x10,
                CoreType::String => 0x11,
                CoreType::ValueType => 0x13,
                CoreType::Enum => 0x18,
                CoreType::Array => 0x19,
                CoreType::ICloneable => 0x1A,
                CoreType::IEnumerable => 0x1B,
                CoreType::ICollection => 0x1C,
                CoreType::IList => 0x1D,
            },
        )
    }

    /// Namespace of the type
    #[must_use]
    pub fn namespace(&self) -> &'static str {
        match self {
            CoreType::IEnumerable | CoreType::ICollection | CoreType::IList => {
                "System.Collections"
            }
            _ => "System",
        }
    }

    /// Name of the type
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            CoreType::Object => "Object",
            CoreType::ValueType => "ValueType",
            CoreType::Enum => "Enum",
            CoreType::Void => "Void",
            CoreType::String => "String",
            CoreType::Array => "Array",
            CoreType::ICloneable => "ICloneable",
            CoreType::IEnumerable => "IEnumerable",
            CoreType::ICollection => "ICollection",
            CoreType::IList => "IList",
        }
    }

    fn flavor(&self) -> TypeFlavor {
        match self {
            CoreType::Object | CoreType::ValueType | CoreType::Enum | CoreType::Array => {
                TypeFlavor::Class
            }
            CoreType::Void => TypeFlavor::Void,
            CoreType::String => TypeFlavor::String,
            CoreType::ICloneable
            | CoreType::IEnumerable
            | CoreType::ICollection
            | CoreType::IList => TypeFlavor::Interface,
        }
    }

    fn base(&self) -> Option<CoreType> {
        match self {
            CoreType::Object
            | CoreType::ICloneable
            | CoreType::IEnumerable
            | CoreType::ICollection
            | CoreType::IList => None,
            CoreType::ValueType | CoreType::String | CoreType::Array => Some(CoreType::Object),
            CoreType::Enum | CoreType::Void => Some(CoreType::ValueType),
        }
    }

    fn interfaces(&self) -> Vec<CoreType> {
        match self {
            CoreType::String => vec![CoreType::ICloneable, CoreType::IEnumerable],
            CoreType::Array => vec![
                CoreType::ICloneable,
                CoreType::IList,
                CoreType::ICollection,
                CoreType::IEnumerable,
            ],
            CoreType::ICollection => vec![CoreType::IEnumerable],
            CoreType::IList => vec![CoreType::ICollection, CoreType::IEnumerable],
            _ => Vec::new(),
        }
    }

    fn members(&self) -> Vec<MemberInfo> {
        let int32 = PrimitiveKind::I4.token();
        match self {
            CoreType::Array => vec![
                MemberInfo::intrinsic("Length", int32, Intrinsic::ArrayLength),
                MemberInfo::intrinsic(
                    "LongLength",
                    PrimitiveKind::I8.token(),
                    Intrinsic::ArrayLongLength,
                ),
                MemberInfo::intrinsic("Rank", int32, Intrinsic::ArrayRank),
            ],
            CoreType::String => vec![MemberInfo::intrinsic(
                "Length",
                int32,
                Intrinsic::StringLength,
            )],
            _ => Vec::new(),
        }
    }
}

/// Central registry for every type of an inspected debuggee.
///
/// The registry is an append-only arena: types are never removed or modified once inserted,
/// so a [`DebugType`] view borrowed from it stays valid for the registry's lifetime. Insertion
/// only needs `&self`, which lets the resolver construct array and pointer types on demand
/// while values still borrow the registry.
pub struct TypeRegistry {
    /// Primary type storage indexed by tokens
    types: SkipMap<Token, RuntimeTypeRc>,
    /// Counter for tokens of defined types
    next_defined: AtomicU32,
    /// Counter for tokens of constructed types
    next_constructed: AtomicU32,
    /// Secondary index: types indexed by full name (namespace.name)
    types_by_fullname: DashMap<String, Token>,
    /// Name of the binary owning the core library types
    core_module: String,
}

impl TypeRegistry {
    /// Module name of the seeded core library
    pub const CORE_MODULE: &'static str = "mscorlib.dll";

    /// Create a new type registry with the core library types registered.
    ///
    /// The following types are available immediately:
    /// - `System.Object`, `System.ValueType`, `System.Enum`, `System.Void`
    /// - `System.String` and `System.Array` (with their intrinsic `Length` properties)
    /// - All primitives from `System.Boolean` to `System.UIntPtr`
    /// - `System.ICloneable` and the non-generic collection interfaces
    ///
    /// # Errors
    /// Returns an error if the core library types cannot be registered, which would indicate an
    /// internal inconsistency.
    pub fn new() -> Result<Self> {
        Self::with_core_module(Self::CORE_MODULE)
    }

    /// Create a new registry whose core library lives in the given module
    ///
    /// # Errors
    /// See [`TypeRegistry::new`].
    pub fn with_core_module(core_module: &str) -> Result<Self> {
        let registry = TypeRegistry {
            types: SkipMap::new(),
            next_defined: AtomicU32::new(1),
            next_constructed: AtomicU32::new(1),
            types_by_fullname: DashMap::new(),
            core_module: core_module.to_string(),
        };

        registry.initialize_core()?;
        Ok(registry)
    }

    /// Name of the binary owning the core library types
    #[must_use]
    pub fn core_module(&self) -> &str {
        &self.core_module
    }

    fn initialize_core(&self) -> Result<()> {
        // Declaration order of CoreType keeps every base ahead of its subtypes
        let (interfaces, classes): (Vec<_>, Vec<_>) = CoreType::iter()
            .partition(|core| core.flavor() == TypeFlavor::Interface);

        for core in interfaces.into_iter().chain(classes.into_iter()) {
            let mut new_type =
                RuntimeType::new(core.token(), core.flavor(), core.namespace(), core.name());
            new_type.module = Some(self.core_module.clone());
            new_type.base = core.base().map(|base| base.token());
            new_type.interfaces = core.interfaces().iter().map(CoreType::token).collect();
            new_type.members = core.members();
            self.insert(new_type)?;

            // Primitives derive from System.ValueType
            if core == CoreType::ValueType {
                for kind in PrimitiveKind::iter() {
                    let mut primitive = RuntimeType::new(
                        kind.token(),
                        TypeFlavor::Primitive(kind),
                        kind.namespace(),
                        kind.name(),
                    );
                    primitive.module = Some(self.core_module.clone());
                    primitive.base = Some(CoreType::ValueType.token());
                    self.insert(primitive)?;
                }
            }
        }

        Ok(())
    }

    /// Get the next available token in the given space
    pub(crate) fn next_token(&self, space: u8) -> Token {
        let counter = if space == Token::CONSTRUCTED {
            &self.next_constructed
        } else {
            &self.next_defined
        };

        let row = counter.fetch_add(1, Ordering::Relaxed);
        debug_assert!(row < 0x00FF_FFFF, "token space 0x{space:02x} is exhausted");
        Token::from_parts(space, row)
    }

    /// Register a new type.
    ///
    /// ## Arguments
    /// * `new_type` - The fully populated type; its token must not be in use
    ///
    /// # Errors
    /// Returns [`TypeError`] if the full name or token is taken, if a referenced type is missing
    /// or has the wrong kind, or if a class or value type has no module.
    pub fn insert(&self, new_type: RuntimeType) -> Result<RuntimeTypeRc> {
        self.validate(&new_type)?;

        match self.types_by_fullname.entry(new_type.fullname()) {
            Entry::Occupied(entry) => Err(TypeError(format!(
                "A type named {} is already registered",
                entry.key()
            ))),
            Entry::Vacant(entry) => {
                let token = new_type.token;
                let type_rc = Arc::new(new_type);
                self.types.insert(token, type_rc.clone());
                entry.insert(token);

                log::trace!("registered {} as {}", type_rc.fullname(), token);
                Ok(type_rc)
            }
        }
    }

    fn validate(&self, new_type: &RuntimeType) -> Result<()> {
        let fullname = new_type.fullname();

        if self.types.contains_key(&new_type.token) {
            return Err(TypeError(format!(
                "Token {} of {} is already in use",
                new_type.token, fullname
            )));
        }

        if let Some(base) = new_type.base {
            let base_type = self.get(&base).ok_or(TypeNotFound(base))?;
            if !base_type.flavor.is_inheritable() {
                return Err(TypeError(format!(
                    "{} can not derive from {}",
                    fullname,
                    base_type.fullname()
                )));
            }
            if matches!(new_type.flavor, TypeFlavor::Interface | TypeFlavor::Pointer) {
                return Err(TypeError(format!("{fullname} can not have a base type")));
            }
        }

        match (new_type.flavor, new_type.element) {
            (TypeFlavor::Array { rank: 0 }, _) => {
                return Err(TypeError(format!("{fullname} has an array rank of 0")));
            }
            (TypeFlavor::Array { .. } | TypeFlavor::Pointer, None) => {
                return Err(TypeError(format!("{fullname} is missing its element type")));
            }
            (_, Some(element)) => {
                self.get(&element).ok_or(TypeNotFound(element))?;
            }
            _ => {}
        }

        for interface in &new_type.interfaces {
            let interface_type = self.get(interface).ok_or(TypeNotFound(*interface))?;
            if interface_type.flavor != TypeFlavor::Interface {
                return Err(TypeError(format!(
                    "{} implements {}, which is not an interface",
                    fullname,
                    interface_type.fullname()
                )));
            }
        }

        for argument in &new_type.generic_args {
            self.get(argument).ok_or(TypeNotFound(*argument))?;
        }

        for member in &new_type.members {
            if member.ty != new_type.token && !self.types.contains_key(&member.ty) {
                return Err(TypeNotFound(member.ty));
            }
        }

        if new_type.flavor.has_module() && new_type.module.is_none() {
            return Err(TypeError(format!("{fullname} does not belong to a module")));
        }

        Ok(())
    }

    /// Get a type by its token
    #[must_use]
    pub fn get(&self, token: &Token) -> Option<RuntimeTypeRc> {
        self.types.get(token).map(|entry| entry.value().clone())
    }

    /// Get a type by its full name, e.g. `System.Int32[]`
    #[must_use]
    pub fn get_by_fullname(&self, fullname: &str) -> Option<RuntimeTypeRc> {
        let token = *self.types_by_fullname.get(fullname)?;
        self.get(&token)
    }

    /// Get a primitive type
    ///
    /// # Errors
    /// Returns [`TypeNotFound`] if the primitive has not been registered.
    pub fn get_primitive(&self, primitive: PrimitiveKind) -> Result<RuntimeTypeRc> {
        let token = primitive.token();
        self.get(&token).ok_or(TypeNotFound(token))
    }

    /// Get one of the seeded core library types
    ///
    /// # Errors
    /// Returns [`TypeNotFound`] if the type has not been registered.
    pub fn get_core(&self, core: CoreType) -> Result<RuntimeTypeRc> {
        let token = core.token();
        self.get(&token).ok_or(TypeNotFound(token))
    }

    /// Get or create the array type with the given element type and rank.
    ///
    /// Array types are named `Element[]` for rank 1 and `Element[,]` (one comma per extra
    /// dimension) otherwise, derive from `System.Array` and do not belong to a module.
    ///
    /// # Errors
    /// Returns an error if the element type is unknown or the rank is 0.
    pub fn get_or_create_array(&self, element: Token, rank: u32) -> Result<RuntimeTypeRc> {
        if rank == 0 {
            return Err(TypeError("Arrays need at least one dimension".to_string()));
        }

        let element_type = self.get(&element).ok_or(TypeNotFound(element))?;
        let suffix = format!("[{}]", ",".repeat(rank as usize - 1));
        let name = format!("{}{}", element_type.name, suffix);

        self.get_or_create(&element_type.namespace, &name, |token| {
            let mut array_type = RuntimeType::new(
                token,
                TypeFlavor::Array { rank },
                &element_type.namespace,
                &name,
            );
            array_type.base = Some(CoreType::Array.token());
            array_type.element = Some(element);
            array_type
        })
    }

    /// Get or create the unmanaged pointer type to the given element type
    ///
    /// # Errors
    /// Returns an error if the element type is unknown.
    pub fn get_or_create_pointer(&self, element: Token) -> Result<RuntimeTypeRc> {
        let element_type = self.get(&element).ok_or(TypeNotFound(element))?;
        let name = format!("{}*", element_type.name);

        self.get_or_create(&element_type.namespace, &name, |token| {
            let mut pointer_type =
                RuntimeType::new(token, TypeFlavor::Pointer, &element_type.namespace, &name);
            pointer_type.element = Some(element);
            pointer_type
        })
    }

    /// Get or create an instantiation of a generic type definition.
    ///
    /// The instance is named `Definition[Arg1,Arg2]` using the arguments' full names and shares
    /// the definition's kind, module, base type, interfaces and members.
    ///
    /// # Errors
    /// Returns an error if the definition or an argument is unknown, or no arguments are given.
    pub fn get_or_create_generic_instance(
        &self,
        definition: Token,
        arguments: &[Token],
    ) -> Result<RuntimeTypeRc> {
        if arguments.is_empty() {
            return Err(TypeError(
                "A generic instance needs at least one argument".to_string(),
            ));
        }

        let definition_type = self.get(&definition).ok_or(TypeNotFound(definition))?;
        let argument_names = arguments
            .iter()
            .map(|argument| {
                self.get(argument)
                    .map(|argument_type| argument_type.fullname())
                    .ok_or(TypeNotFound(*argument))
            })
            .collect::<Result<Vec<_>>>()?;
        let name = format!("{}[{}]", definition_type.name, argument_names.join(","));

        self.get_or_create(&definition_type.namespace, &name, |token| {
            let mut instance = RuntimeType::new(
                token,
                definition_type.flavor,
                &definition_type.namespace,
                &name,
            );
            instance.module = definition_type.module.clone();
            instance.base = definition_type.base;
            instance.interfaces = definition_type.interfaces.clone();
            instance.members = definition_type.members.clone();
            instance.generic_args = arguments.to_vec();
            instance
        })
    }

    fn get_or_create<F>(&self, namespace: &str, name: &str, create: F) -> Result<RuntimeTypeRc>
    where
        F: FnOnce(Token) -> RuntimeType,
    {
        let fullname = if namespace.is_empty() {
            name.to_string()
        } else {
            format!("{namespace}.{name}")
        };

        if let Some(existing) = self.get_by_fullname(&fullname) {
            return Ok(existing);
        }

        log::debug!("constructing type {fullname}");
        self.insert(create(self.next_token(Token::CONSTRUCTED)))
    }

    /// Get a resolved descriptor view of a type
    ///
    /// # Errors
    /// Returns [`TypeNotFound`] if the token is unknown.
    pub fn describe(&self, token: Token) -> Result<DebugType<'_>> {
        let ty = self.get(&token).ok_or(TypeNotFound(token))?;
        Ok(DebugType::new(self, ty))
    }

    /// Returns the number of registered types
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no types are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Returns all types, ordered by token
    #[must_use]
    pub fn all_types(&self) -> Vec<RuntimeTypeRc> {
        self.types
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_registry_core() {
        let registry = TypeRegistry::new().unwrap();
        assert_eq!(
            registry.len(),
            CoreType::iter().count() + PrimitiveKind::iter().count()
        );

        let object = registry.get_core(CoreType::Object).unwrap();
        assert_eq!(object.fullname(), "System.Object");
        assert!(object.base.is_none());
        assert_eq!(object.module.as_deref(), Some("mscorlib.dll"));

        let value_type = registry.get_core(CoreType::ValueType).unwrap();
        assert_eq!(value_type.base, Some(object.token));

        let int = registry.get_primitive(PrimitiveKind::I4).unwrap();
        assert_eq!(int.base, Some(value_type.token));

        let array = registry.get_by_fullname("System.Array").unwrap();
        assert_eq!(array.base, Some(object.token));
        assert_eq!(array.interfaces.len(), 4);
        assert!(array.member("Length").is_some());

        let list = registry.get_by_fullname("System.Collections.IList").unwrap();
        assert_eq!(list.flavor, TypeFlavor::Interface);
    }

    #[test]
    fn test_array_creation_is_idempotent() {
        let registry = TypeRegistry::new().unwrap();
        let int = PrimitiveKind::I4.token();

        let first = registry.get_or_create_array(int, 1).unwrap();
        let second = registry.get_or_create_array(int, 1).unwrap();
        assert_eq!(first.token, second.token);
        assert_eq!(first.fullname(), "System.Int32[]");
        assert_eq!(first.base, Some(CoreType::Array.token()));
        assert_eq!(first.element, Some(int));
        assert!(first.module.is_none());

        let matrix = registry.get_or_create_array(int, 3).unwrap();
        assert_eq!(matrix.fullname(), "System.Int32[,,]");
        assert_eq!(matrix.flavor, TypeFlavor::Array { rank: 3 });

        let jagged = registry.get_or_create_array(first.token, 1).unwrap();
        assert_eq!(jagged.fullname(), "System.Int32[][]");

        assert!(matches!(
            registry.get_or_create_array(int, 0),
            Err(Error::TypeError(_))
        ));
    }

    #[test]
    fn test_pointer_and_generic_instance() {
        let registry = TypeRegistry::new().unwrap();

        let pointer = registry
            .get_or_create_pointer(PrimitiveKind::U1.token())
            .unwrap();
        assert_eq!(pointer.fullname(), "System.Byte*");
        assert!(pointer.base.is_none());

        let mut list = RuntimeType::new(
            registry.next_token(Token::DEFINED),
            TypeFlavor::Class,
            "System.Collections.Generic",
            "List`1",
        );
        list.module = Some("mscorlib.dll".to_string());
        list.base = Some(CoreType::Object.token());
        let list = registry.insert(list).unwrap();

        let instance = registry
            .get_or_create_generic_instance(list.token, &[PrimitiveKind::I4.token()])
            .unwrap();
        assert_eq!(
            instance.fullname(),
            "System.Collections.Generic.List`1[System.Int32]"
        );
        assert_eq!(instance.generic_args, vec![PrimitiveKind::I4.token()]);
        assert_eq!(instance.flavor, TypeFlavor::Class);

        assert!(registry
            .get_or_create_generic_instance(list.token, &[])
            .is_err());
    }

    #[test]
    fn test_insert_validation() {
        let registry = TypeRegistry::new().unwrap();

        let mut duplicate = RuntimeType::new(
            registry.next_token(Token::DEFINED),
            TypeFlavor::Class,
            "System",
            "Object",
        );
        duplicate.module = Some("App.exe".to_string());
        assert!(matches!(registry.insert(duplicate), Err(Error::TypeError(_))));

        let mut sealed_base = RuntimeType::new(
            registry.next_token(Token::DEFINED),
            TypeFlavor::Class,
            "App",
            "MyInt",
        );
        sealed_base.module = Some("App.exe".to_string());
        sealed_base.base = Some(PrimitiveKind::I4.token());
        assert!(matches!(
            registry.insert(sealed_base),
            Err(Error::TypeError(_))
        ));

        let mut missing_base = RuntimeType::new(
            registry.next_token(Token::DEFINED),
            TypeFlavor::Class,
            "App",
            "Orphan",
        );
        missing_base.module = Some("App.exe".to_string());
        missing_base.base = Some(Token::new(0x0200_FFFF));
        assert!(matches!(
            registry.insert(missing_base),
            Err(Error::TypeNotFound(_))
        ));

        let no_module = RuntimeType::new(
            registry.next_token(Token::DEFINED),
            TypeFlavor::ValueType,
            "App",
            "Loose",
        );
        assert!(matches!(registry.insert(no_module), Err(Error::TypeError(_))));

        let mut bad_interface = RuntimeType::new(
            registry.next_token(Token::DEFINED),
            TypeFlavor::Class,
            "App",
            "Impl",
        );
        bad_interface.module = Some("App.exe".to_string());
        bad_interface.interfaces = vec![CoreType::Object.token()];
        assert!(matches!(
            registry.insert(bad_interface),
            Err(Error::TypeError(_))
        ));
    }

    #[test]
    fn test_token_spaces() {
        let registry = TypeRegistry::new().unwrap();
        let defined = registry.next_token(Token::DEFINED);
        let constructed = registry.next_token(Token::CONSTRUCTED);
        assert_eq!(defined.space_byte(), Token::DEFINED);
        assert_eq!(constructed.space_byte(), Token::CONSTRUCTED);
        assert_ne!(registry.next_token(Token::DEFINED), defined);
    }
}
