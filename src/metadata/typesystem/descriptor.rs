//! Resolved view of a registered type.
//!
//! A [`DebugType`] pairs a stored [`RuntimeType`] with the registry it lives in, so that
//! token references (base, element, interfaces, generic arguments) can be followed without
//! the caller touching the arena directly.

use std::fmt;

use crate::{
    metadata::{
        token::Token,
        typesystem::{
            MemberInfo, PrimitiveKind, RuntimeType, RuntimeTypeRc, TypeFlags, TypeFlavor,
            TypeRegistry, MAX_RECURSION_DEPTH,
        },
    },
    Error::NotClassOrValueType,
    Result,
};

/// A type descriptor, borrowed from its [`TypeRegistry`]
#[derive(Clone)]
pub struct DebugType<'r> {
    registry: &'r TypeRegistry,
    ty: RuntimeTypeRc,
}

impl<'r> DebugType<'r> {
    pub(crate) fn new(registry: &'r TypeRegistry, ty: RuntimeTypeRc) -> Self {
        DebugType { registry, ty }
    }

    fn related(&self, token: Token) -> Option<DebugType<'r>> {
        self.registry
            .get(&token)
            .map(|ty| DebugType::new(self.registry, ty))
    }

    /// The token of this type
    #[must_use]
    pub fn token(&self) -> Token {
        self.ty.token
    }

    /// The stored descriptor
    #[must_use]
    pub fn runtime_type(&self) -> &RuntimeTypeRc {
        &self.ty
    }

    /// The registry this type belongs to
    #[must_use]
    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    /// Namespace-qualified name, e.g. `System.Int32[]`
    #[must_use]
    pub fn full_name(&self) -> String {
        self.ty.fullname()
    }

    /// Name without namespace
    #[must_use]
    pub fn name(&self) -> &str {
        &self.ty.name
    }

    /// Namespace, possibly empty
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.ty.namespace
    }

    /// The kind of this type
    #[must_use]
    pub fn flavor(&self) -> TypeFlavor {
        self.ty.flavor
    }

    /// Classification flags of this type
    #[must_use]
    pub fn flags(&self) -> TypeFlags {
        self.ty.flavor.flags()
    }

    /// `IsArray`
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.flags().contains(TypeFlags::ARRAY)
    }

    /// `IsClass`
    #[must_use]
    pub fn is_class(&self) -> bool {
        self.flags().contains(TypeFlags::CLASS)
    }

    /// `IsValueType`
    #[must_use]
    pub fn is_value_type(&self) -> bool {
        self.flags().contains(TypeFlags::VALUE_TYPE)
    }

    /// `IsPrimitive`
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        self.flags().contains(TypeFlags::PRIMITIVE)
    }

    /// `IsString`
    #[must_use]
    pub fn is_string(&self) -> bool {
        self.flags().contains(TypeFlags::STRING)
    }

    /// `IsInteger`
    #[must_use]
    pub fn is_integer(&self) -> bool {
        self.flags().contains(TypeFlags::INTEGER)
    }

    /// `IsInterface`
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.flags().contains(TypeFlags::INTERFACE)
    }

    /// `IsPointer`
    #[must_use]
    pub fn is_pointer(&self) -> bool {
        self.flags().contains(TypeFlags::POINTER)
    }

    /// `IsVoid`
    #[must_use]
    pub fn is_void(&self) -> bool {
        self.flags().contains(TypeFlags::VOID)
    }

    /// Values of this type can be null
    #[must_use]
    pub fn is_reference(&self) -> bool {
        self.ty.flavor.is_reference()
    }

    /// Number of dimensions, if this is an array type
    #[must_use]
    pub fn array_rank(&self) -> Option<u32> {
        match self.ty.flavor {
            TypeFlavor::Array { rank } => Some(rank),
            _ => None,
        }
    }

    /// The primitive kind, if this is a primitive value type
    #[must_use]
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self.ty.flavor {
            TypeFlavor::Primitive(kind) => Some(kind),
            _ => None,
        }
    }

    /// The direct base type, `None` at the root of the hierarchy
    #[must_use]
    pub fn base_type(&self) -> Option<DebugType<'r>> {
        self.ty.base.and_then(|base| self.related(base))
    }

    /// The element type of arrays and pointers
    #[must_use]
    pub fn element_type(&self) -> Option<DebugType<'r>> {
        self.ty.element.and_then(|element| self.related(element))
    }

    /// The owning binary name.
    ///
    /// # Errors
    /// Returns [`NotClassOrValueType`] for arrays, pointers and interfaces.
    pub fn module(&self) -> Result<&str> {
        if !self.ty.flavor.has_module() {
            return Err(NotClassOrValueType);
        }

        self.ty.module.as_deref().ok_or(NotClassOrValueType)
    }

    /// Implemented interfaces, in declaration order
    #[must_use]
    pub fn interfaces(&self) -> Vec<DebugType<'r>> {
        self.ty
            .interfaces
            .iter()
            .filter_map(|token| self.related(*token))
            .collect()
    }

    /// Generic arguments, in order; empty for non-generic types
    #[must_use]
    pub fn generic_arguments(&self) -> Vec<DebugType<'r>> {
        self.ty
            .generic_args
            .iter()
            .filter_map(|token| self.related(*token))
            .collect()
    }

    /// Members declared directly on this type
    #[must_use]
    pub fn members(&self) -> &[MemberInfo] {
        &self.ty.members
    }

    /// This type followed by each of its ancestors
    #[must_use]
    pub fn base_chain(&self) -> BaseChain<'r> {
        BaseChain {
            next: Some(self.clone()),
            remaining: MAX_RECURSION_DEPTH,
        }
    }

    /// Finds a member declared on this type or any ancestor, nearest first
    #[must_use]
    pub fn find_member(&self, name: &str) -> Option<(DebugType<'r>, MemberInfo)> {
        self.base_chain().find_map(|declaring| {
            let member = declaring.ty.member(name).cloned()?;
            Some((declaring, member))
        })
    }

    /// True if `other` is this type or one of its ancestors
    #[must_use]
    pub fn is_subclass_of(&self, other: &DebugType<'_>) -> bool {
        self.base_chain().any(|ancestor| ancestor.token() == other.token())
    }
}

/// Iterator over a type and its ancestors.
///
/// Yields at most [`MAX_RECURSION_DEPTH`] types.
pub struct BaseChain<'r> {
    next: Option<DebugType<'r>>,
    remaining: usize,
}

impl<'r> Iterator for BaseChain<'r> {
    type Item = DebugType<'r>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            if let Some(cut) = self.next.take() {
                log::warn!("base chain cut at {} after {MAX_RECURSION_DEPTH} types", cut);
            }
            return None;
        }

        let current = self.next.take()?;
        self.remaining -= 1;
        self.next = current.base_type();
        Some(current)
    }
}

impl AsRef<RuntimeType> for DebugType<'_> {
    fn as_ref(&self) -> &RuntimeType {
        &self.ty
    }
}

impl PartialEq for DebugType<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.ty.token == other.ty.token
    }
}

impl Eq for DebugType<'_> {}

impl fmt::Debug for DebugType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugType")
            .field("token", &self.ty.token)
            .field("full_name", &self.ty.fullname())
            .field("flavor", &self.ty.flavor)
            .finish()
    }
}

impl fmt::Display for DebugType<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ty.fullname())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metadata::typesystem::{CoreType, TypeBuilder},
        Error,
    };

    #[test]
    fn test_array_descriptor() {
        let registry = TypeRegistry::new().unwrap();
        let array = registry
            .get_or_create_array(PrimitiveKind::I4.token(), 1)
            .unwrap();
        let array = registry.describe(array.token).unwrap();

        assert!(array.is_array());
        assert!(!array.is_class());
        assert!(!array.is_value_type());
        assert!(!array.is_primitive());
        assert_eq!(array.array_rank(), Some(1));
        assert_eq!(array.element_type().unwrap().full_name(), "System.Int32");
        assert!(matches!(array.module(), Err(Error::NotClassOrValueType)));
        assert!(array.interfaces().is_empty());

        let chain: Vec<String> = array.base_chain().map(|ty| ty.full_name()).collect();
        assert_eq!(
            chain,
            vec!["System.Int32[]", "System.Array", "System.Object"]
        );
    }

    #[test]
    fn test_primitive_descriptor() {
        let registry = TypeRegistry::new().unwrap();
        let int = registry.describe(PrimitiveKind::I4.token()).unwrap();

        assert!(int.is_value_type());
        assert!(int.is_primitive());
        assert!(int.is_integer());
        assert!(!int.is_class());
        assert_eq!(int.module().unwrap(), "mscorlib.dll");
        assert_eq!(int.primitive_kind(), Some(PrimitiveKind::I4));
        assert_eq!(int.base_type().unwrap().full_name(), "System.ValueType");
        assert!(int.element_type().is_none());
        assert_eq!(int.to_string(), "System.Int32");
    }

    #[test]
    fn test_find_member_walks_ancestors() {
        let registry = TypeRegistry::new().unwrap();
        let matrix = registry
            .get_or_create_array(PrimitiveKind::R8.token(), 2)
            .unwrap();
        let matrix = registry.describe(matrix.token).unwrap();

        let (declaring, member) = matrix.find_member("Length").unwrap();
        assert_eq!(declaring.full_name(), "System.Array");
        assert_eq!(member.ty, PrimitiveKind::I4.token());
        assert!(matrix.find_member("Count").is_none());

        let array = registry.describe(CoreType::Array.token()).unwrap();
        let object = registry.describe(CoreType::Object.token()).unwrap();
        assert!(matrix.is_subclass_of(&array));
        assert!(matrix.is_subclass_of(&object));
        assert!(!object.is_subclass_of(&array));
    }

    #[test]
    fn test_base_chain_is_depth_limited() {
        let registry = TypeRegistry::new().unwrap();
        let mut base = CoreType::Object.token();
        for level in 0..MAX_RECURSION_DEPTH + 10 {
            base = TypeBuilder::new(&registry)
                .class("Deep", &format!("Level{level}"))
                .module("Deep.dll")
                .unwrap()
                .extends(base)
                .unwrap()
                .build()
                .unwrap()
                .token;
        }

        let deepest = registry.describe(base).unwrap();
        assert_eq!(deepest.base_chain().count(), MAX_RECURSION_DEPTH);
        assert!(deepest.base_type().is_some());
    }

    #[test]
    fn test_interface_and_pointer_descriptor() {
        let registry = TypeRegistry::new().unwrap();
        let list = registry.describe(CoreType::IList.token()).unwrap();
        assert!(list.is_interface());
        assert!(list.base_type().is_none());
        assert!(matches!(list.module(), Err(Error::NotClassOrValueType)));

        let pointer = registry
            .get_or_create_pointer(PrimitiveKind::I4.token())
            .unwrap();
        let pointer = registry.describe(pointer.token).unwrap();
        assert!(pointer.is_pointer());
        assert!(pointer.base_type().is_none());
        assert_eq!(pointer.element_type().unwrap().full_name(), "System.Int32");

        let array = registry.describe(CoreType::Array.token()).unwrap();
        let names: Vec<String> = array.interfaces().iter().map(DebugType::full_name).collect();
        assert_eq!(
            names,
            vec![
                "System.ICloneable",
                "System.Collections.IList",
                "System.Collections.ICollection",
                "System.Collections.IEnumerable"
            ]
        );
    }
}
