//! Object dumps: structured snapshots of values and type descriptors.
//!
//! A dump is built in two steps. [`ObjectDumper`] reads a [`crate::value::Value`] or
//! [`crate::metadata::typesystem::DebugType`] into a [`DumpNode`] tree, and
//! [`XmlDumpWriter`] renders the tree as XML. Both are shaped by a [`DumpConfig`].
//!
//! # Examples
//!
//! ```rust
//! use debugdump::dump::{to_xml, DumpConfig, ObjectDumper};
//! use debugdump::metadata::typesystem::{PrimitiveData, TypeRegistry, TypeResolver};
//! use debugdump::value::Value;
//!
//! let registry = TypeRegistry::new()?;
//! let resolver = TypeResolver::new(&registry);
//! let flag = Value::new(resolver.resolve_name("bool")?, "flag", PrimitiveData::Boolean(true).into())?;
//!
//! let node = ObjectDumper::new(DumpConfig::default()).dump_value(&flag);
//! assert_eq!(node.attribute("PrimitiveValue"), Some("True"));
//! assert!(to_xml(&node)?.starts_with("<Value\n  ArrayDimensions="));
//! # Ok::<(), debugdump::Error>(())
//! ```

mod config;
mod node;
mod serializer;
mod writer;

pub use config::{DumpConfig, ExpandedProperties, ListStyle};
pub use node::{tag_name, DumpNode, NodeContent};
pub use serializer::{format_bool, format_exception, ObjectDumper, TypeAttribute, ValueAttribute};
pub use writer::{to_xml, XmlDumpWriter};
