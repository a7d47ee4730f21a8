//! The object dump serializer.
//!
//! [`ObjectDumper`] turns values and type descriptors into [`DumpNode`] trees. Every attribute
//! is read through the total accessors of [`Value`] and [`DebugType`]; an accessor that fails
//! for the kind at hand contributes `{Exception: <message>}` instead of aborting the dump, so
//! dumping never fails for a well-formed value.

use strum::{Display, EnumIter, IntoEnumIterator};

use crate::{
    dump::{DumpConfig, DumpNode, ExpandedProperties, ListStyle},
    metadata::typesystem::DebugType,
    value::Value,
    Error, Result,
};

/// Attributes of a `<Value>` element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum ValueAttribute {
    /// Length of each dimension
    ArrayDimensions,
    /// Total number of elements; the attribute name keeps its historic spelling
    #[strum(serialize = "ArrayLenght")]
    ArrayLength,
    /// Number of dimensions
    ArrayRank,
    /// Display text
    AsString,
    /// The expression that produced the value
    Expression,
    /// The value is no longer valid
    IsInvalid,
    /// The value is a null reference
    IsNull,
    /// The scalar of primitive values
    PrimitiveValue,
    /// Full name of the value's type
    Type,
}

/// Attributes of a `<DebugType>` element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum TypeAttribute {
    /// Full name of the direct base type
    BaseType,
    /// Full name of the element type of arrays and pointers
    ElementType,
    /// Namespace-qualified name
    FullName,
    /// Generic arguments
    GenericArguments,
    /// Implemented interfaces
    Interfaces,
    /// `IsArray`
    IsArray,
    /// `IsClass`
    IsClass,
    /// `IsInteger`
    IsInteger,
    /// `IsInterface`
    IsInterface,
    /// `IsPointer`
    IsPointer,
    /// `IsPrimitive`
    IsPrimitive,
    /// `IsString`
    IsString,
    /// `IsValueType`
    IsValueType,
    /// `IsVoid`
    IsVoid,
    /// Owning binary
    Module,
}

/// Renders a boolean the way the debuggee runtime does
#[must_use]
pub fn format_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Renders an accessor failure
#[must_use]
pub fn format_exception(error: &Error) -> String {
    format!("{{Exception: {error}}}")
}

fn format_result<T: ToString>(result: Result<T>) -> String {
    match result {
        Ok(value) => value.to_string(),
        Err(error) => format_exception(&error),
    }
}

fn format_optional_type(ty: Option<DebugType<'_>>) -> String {
    ty.map_or_else(|| "null".to_string(), |ty| ty.full_name())
}

/// Builds dump trees for values and type descriptors
pub struct ObjectDumper {
    config: DumpConfig,
}

impl ObjectDumper {
    /// Create a dumper with the given configuration
    #[must_use]
    pub fn new(config: DumpConfig) -> Self {
        ObjectDumper { config }
    }

    /// The configuration in use
    #[must_use]
    pub fn config(&self) -> &DumpConfig {
        &self.config
    }

    /// Dump a value as a `<Value>` element
    #[must_use]
    pub fn dump_value(&self, value: &Value<'_>) -> DumpNode {
        self.value_node(value, 0)
    }

    /// Dump a sequence of values, one `<Item>` per value
    #[must_use]
    pub fn dump_values(&self, values: &[Value<'_>]) -> Vec<DumpNode> {
        values
            .iter()
            .map(|value| DumpNode::wrap("Item", self.value_node(value, 1)))
            .collect()
    }

    /// Dump a type descriptor as a `<DebugType>` element
    #[must_use]
    pub fn dump_type(&self, ty: &DebugType<'_>) -> DumpNode {
        self.type_node(ty, 0)
    }

    /// Render a single attribute of a value
    #[must_use]
    pub fn value_attribute(&self, value: &Value<'_>, attribute: ValueAttribute) -> String {
        match attribute {
            ValueAttribute::ArrayDimensions => format_result(value.array_dimensions()),
            ValueAttribute::ArrayLength => format_result(value.array_length()),
            ValueAttribute::ArrayRank => format_result(value.array_rank()),
            ValueAttribute::AsString => value.as_string(),
            ValueAttribute::Expression => value.expression().to_string(),
            ValueAttribute::IsInvalid => format_bool(value.is_invalid()).to_string(),
            ValueAttribute::IsNull => format_bool(value.is_null()).to_string(),
            ValueAttribute::PrimitiveValue => match value.primitive_value() {
                Ok(Some(data)) => data.to_string(),
                Ok(None) => "null".to_string(),
                Err(error) => format_exception(&error),
            },
            ValueAttribute::Type => value.debug_type().full_name(),
        }
    }

    /// Render a single attribute of a type descriptor
    #[must_use]
    pub fn type_attribute(&self, ty: &DebugType<'_>, attribute: TypeAttribute) -> String {
        match attribute {
            TypeAttribute::BaseType => format_optional_type(ty.base_type()),
            TypeAttribute::ElementType => format_optional_type(ty.element_type()),
            TypeAttribute::FullName => ty.full_name(),
            TypeAttribute::GenericArguments => self.format_list(&ty.generic_arguments()),
            TypeAttribute::Interfaces => self.format_list(&ty.interfaces()),
            TypeAttribute::IsArray => format_bool(ty.is_array()).to_string(),
            TypeAttribute::IsClass => format_bool(ty.is_class()).to_string(),
            TypeAttribute::IsInteger => format_bool(ty.is_integer()).to_string(),
            TypeAttribute::IsInterface => format_bool(ty.is_interface()).to_string(),
            TypeAttribute::IsPointer => format_bool(ty.is_pointer()).to_string(),
            TypeAttribute::IsPrimitive => format_bool(ty.is_primitive()).to_string(),
            TypeAttribute::IsString => format_bool(ty.is_string()).to_string(),
            TypeAttribute::IsValueType => format_bool(ty.is_value_type()).to_string(),
            TypeAttribute::IsVoid => format_bool(ty.is_void()).to_string(),
            TypeAttribute::Module => format_result(ty.module()),
        }
    }

    fn format_list(&self, types: &[DebugType<'_>]) -> String {
        match self.config.list_style {
            ListStyle::ClrTypeName => ListStyle::CLR_LIST_NAME.to_string(),
            ListStyle::FullNames => {
                let names: Vec<String> = types.iter().map(DebugType::full_name).collect();
                format!("[{}]", names.join(", "))
            }
        }
    }

    fn depth_exceeded(&self, depth: usize) -> Option<DumpNode> {
        if depth <= self.config.max_depth {
            return None;
        }

        log::warn!("dump nesting exceeds {} levels", self.config.max_depth);
        Some(DumpNode::text(
            "Item",
            &format_exception(&Error::RecursionLimit(self.config.max_depth)),
        ))
    }

    fn value_node(&self, value: &Value<'_>, depth: usize) -> DumpNode {
        let mut node = DumpNode::new("Value");
        for attribute in ValueAttribute::iter() {
            node.set_attribute(
                &attribute.to_string(),
                self.value_attribute(value, attribute),
            );
        }

        if self.config.expand_array_elements {
            if let Ok(elements) = value.array_elements() {
                log::trace!(
                    "expanding {} elements of {}",
                    elements.len(),
                    value.expression()
                );
                for element in &elements {
                    let item = match self.depth_exceeded(depth + 2) {
                        Some(limit) => limit,
                        None => DumpNode::wrap("Item", self.value_node(element, depth + 2)),
                    };
                    node.push(item);
                }
            }
        }

        node
    }

    fn type_node(&self, ty: &DebugType<'_>, depth: usize) -> DumpNode {
        let mut node = DumpNode::new("DebugType");
        for attribute in TypeAttribute::iter() {
            node.set_attribute(&attribute.to_string(), self.type_attribute(ty, attribute));
        }

        let expanded = self.config.expanded_properties;
        if expanded.contains(ExpandedProperties::BASE_TYPE) {
            node.push(self.related_type_node("BaseType", ty.base_type(), depth));
        }
        if expanded.contains(ExpandedProperties::ELEMENT_TYPE) {
            node.push(self.related_type_node("ElementType", ty.element_type(), depth));
        }
        if expanded.contains(ExpandedProperties::GENERIC_ARGUMENTS) {
            node.push(self.type_list_node("GenericArguments", &ty.generic_arguments(), depth));
        }
        if expanded.contains(ExpandedProperties::INTERFACES) {
            node.push(self.type_list_node("Interfaces", &ty.interfaces(), depth));
        }

        node
    }

    fn related_type_node(&self, name: &str, related: Option<DebugType<'_>>, depth: usize) -> DumpNode {
        match related {
            None => DumpNode::text(name, "null"),
            Some(related) => match self.depth_exceeded(depth + 1) {
                Some(limit) => DumpNode::wrap(name, limit),
                None => DumpNode::wrap(name, self.type_node(&related, depth + 1)),
            },
        }
    }

    fn type_list_node(&self, name: &str, types: &[DebugType<'_>], depth: usize) -> DumpNode {
        let items = types
            .iter()
            .map(|ty| match self.depth_exceeded(depth + 2) {
                Some(limit) => limit,
                None => DumpNode::wrap("Item", self.type_node(ty, depth + 2)),
            })
            .collect();

        DumpNode::new(name).with_children(items)
    }
}

impl Default for ObjectDumper {
    fn default() -> Self {
        ObjectDumper::new(DumpConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dump::to_xml,
        metadata::typesystem::{TypeRegistry, TypeResolver},
        test::{array_value_process, point_process},
    };

    #[test]
    fn test_value_attributes() {
        let process = array_value_process();
        let frame = process.selected_stack_frame().unwrap();
        let array = frame.local_variable_value("array").unwrap();
        let node = ObjectDumper::new(DumpConfig::legacy()).dump_value(&array);

        assert_eq!(node.name(), "Value");
        assert_eq!(node.attribute("ArrayDimensions"), Some("[5]"));
        assert_eq!(node.attribute("ArrayLenght"), Some("5"));
        assert_eq!(node.attribute("ArrayRank"), Some("1"));
        assert_eq!(node.attribute("AsString"), Some("{System.Int32[]}"));
        assert_eq!(node.attribute("IsNull"), Some("False"));
        assert_eq!(
            node.attribute("PrimitiveValue"),
            Some("{Exception: Value is not a primitive type}")
        );
        assert!(node.children().is_empty());

        let keys: Vec<&String> = node.attributes().keys().collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(keys.len(), ValueAttribute::iter().count());
    }

    #[test]
    fn test_array_elements_expanded() {
        let process = array_value_process();
        let frame = process.selected_stack_frame().unwrap();
        let array = frame.local_variable_value("array").unwrap();
        let node = ObjectDumper::default().dump_value(&array);

        let items = node.children();
        assert_eq!(items.len(), 5);
        for (i, item) in items.iter().enumerate() {
            let element = item.child("Value").unwrap();
            assert_eq!(element.attribute("AsString"), Some(i.to_string().as_str()));
            assert_eq!(element.attribute("Type"), Some("System.Int32"));
            assert_eq!(
                element.attribute("ArrayRank"),
                Some("{Exception: Value is not an array}")
            );
        }
    }

    #[test]
    fn test_struct_type_attributes() {
        let process = point_process();
        let frame = process.selected_stack_frame().unwrap();
        let point = frame.local_variable_value("point").unwrap();
        let node = ObjectDumper::default().dump_type(point.debug_type());

        assert_eq!(node.attribute("FullName"), Some("Points.Point"));
        assert_eq!(node.attribute("IsValueType"), Some("True"));
        assert_eq!(node.attribute("IsClass"), Some("False"));
        assert_eq!(node.attribute("Module"), Some("Points.exe"));

        let value = ObjectDumper::default().dump_value(&point);
        assert_eq!(value.attribute("AsString"), Some("{Points.Point}"));
        assert_eq!(
            value.attribute("ArrayRank"),
            Some("{Exception: Value is not an array}")
        );
    }

    #[test]
    fn test_type_base_chain() {
        let registry = TypeRegistry::new().unwrap();
        let resolver = TypeResolver::new(&registry);
        let array = resolver.resolve_name("int[]").unwrap();
        let node = ObjectDumper::default().dump_type(&array);

        assert_eq!(node.attribute("IsArray"), Some("True"));
        assert_eq!(node.attribute("IsClass"), Some("False"));
        assert_eq!(
            node.attribute("Module"),
            Some("{Exception: The type is not a class or value type.}")
        );

        let mut chain = Vec::new();
        let mut current = &node;
        while let Some(base) = current.child("BaseType") {
            match base.child("DebugType") {
                Some(ty) => {
                    chain.push(ty.attribute("FullName").unwrap().to_string());
                    current = ty;
                }
                None => {
                    assert_eq!(base.text_content(), Some("null"));
                    break;
                }
            }
        }
        assert_eq!(chain, vec!["System.Array", "System.Object"]);
    }

    #[test]
    fn test_list_styles_and_expansion() {
        let registry = TypeRegistry::new().unwrap();
        let resolver = TypeResolver::new(&registry);
        let array = resolver.resolve_name("System.Array").unwrap();

        let legacy = ObjectDumper::new(DumpConfig::legacy()).dump_type(&array);
        assert_eq!(legacy.attribute("Interfaces"), Some(ListStyle::CLR_LIST_NAME));

        let verbose = ObjectDumper::new(DumpConfig::verbose()).dump_type(&array);
        assert_eq!(
            verbose.attribute("Interfaces"),
            Some("[System.ICloneable, System.Collections.IList, System.Collections.ICollection, System.Collections.IEnumerable]")
        );
        assert_eq!(verbose.attribute("GenericArguments"), Some("[]"));
        assert_eq!(verbose.child("Interfaces").unwrap().children().len(), 4);
        assert_eq!(verbose.child("ElementType").unwrap().text_content(), Some("null"));
        assert!(verbose.child("GenericArguments").unwrap().children().is_empty());
    }

    #[test]
    fn test_dump_is_deterministic() {
        let process = point_process();
        let frame = process.selected_stack_frame().unwrap();
        let dumper = ObjectDumper::new(DumpConfig::verbose());
        let points = frame.local_variable_value("points").unwrap();

        let first = to_xml(&dumper.dump_value(&points)).unwrap();
        let second = to_xml(&dumper.dump_value(&points)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_depth_limit() {
        let registry = TypeRegistry::new().unwrap();
        let resolver = TypeResolver::new(&registry);
        let config = DumpConfig {
            max_depth: 1,
            ..DumpConfig::default()
        };
        let array = resolver.resolve_name("int[]").unwrap();
        let node = ObjectDumper::new(config).dump_type(&array);

        let base = node.child("BaseType").unwrap().child("DebugType").unwrap();
        let limit = base.child("BaseType").unwrap().child("Item").unwrap();
        assert_eq!(
            limit.text_content(),
            Some("{Exception: Reach the maximum recursion level allowed - 1}")
        );
    }
}
