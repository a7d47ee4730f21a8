//! Dump configuration
//!
//! This module provides the options that shape a dump: which descriptor properties are
//! expanded into child elements, whether arrays list their elements, how labels become tag
//! names and how collection-valued attributes are rendered.

use bitflags::bitflags;

bitflags! {
    /// Descriptor properties that are expanded into child elements
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ExpandedProperties: u8 {
        /// `DebugType.BaseType`, recursing once per ancestor
        const BASE_TYPE = 0x01;
        /// `DebugType.ElementType`
        const ELEMENT_TYPE = 0x02;
        /// `DebugType.Interfaces`, one `<Item>` per interface
        const INTERFACES = 0x04;
        /// `DebugType.GenericArguments`, one `<Item>` per argument
        const GENERIC_ARGUMENTS = 0x08;
    }
}

impl ExpandedProperties {
    /// Look a property up by its qualified name, e.g. `DebugType.BaseType`
    #[must_use]
    pub fn from_property_name(name: &str) -> Option<Self> {
        match name {
            "DebugType.BaseType" => Some(ExpandedProperties::BASE_TYPE),
            "DebugType.ElementType" => Some(ExpandedProperties::ELEMENT_TYPE),
            "DebugType.Interfaces" => Some(ExpandedProperties::INTERFACES),
            "DebugType.GenericArguments" => Some(ExpandedProperties::GENERIC_ARGUMENTS),
            _ => None,
        }
    }
}

/// How the `Interfaces` and `GenericArguments` attributes are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListStyle {
    /// The CLR type name of the collection, as older dumps show it
    ClrTypeName,
    /// The full names of the members, e.g. `[System.ICloneable, System.Collections.IList]`
    FullNames,
}

impl ListStyle {
    /// The attribute text of a list in `ClrTypeName` style
    pub const CLR_LIST_NAME: &'static str =
        "System.Collections.Generic.List`1[Debugger.MetaData.DebugType]";
}

/// Configuration for the object dump serializer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpConfig {
    /// Descriptor properties rendered as child elements
    pub expanded_properties: ExpandedProperties,

    /// Array values get one `<Item>` child per element
    pub expand_array_elements: bool,

    /// Labels keep their dots when turned into tag names (spaces are always replaced)
    pub keep_dots_in_tags: bool,

    /// Rendering of collection-valued attributes
    pub list_style: ListStyle,

    /// Maximum nesting of expanded values and descriptors (default: 32)
    pub max_depth: usize,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            expanded_properties: ExpandedProperties::BASE_TYPE,
            expand_array_elements: true,
            keep_dots_in_tags: false,
            list_style: ListStyle::ClrTypeName,
            max_depth: 32,
        }
    }
}

impl DumpConfig {
    /// Creates the configuration older golden files were written with
    ///
    /// Labels keep their dots and array values are dumped without their elements.
    #[must_use]
    pub fn legacy() -> Self {
        Self {
            expanded_properties: ExpandedProperties::BASE_TYPE,
            expand_array_elements: false,
            keep_dots_in_tags: true,
            list_style: ListStyle::ClrTypeName,
            max_depth: 32,
        }
    }

    /// Creates a configuration that expands everything it can
    #[must_use]
    pub fn verbose() -> Self {
        Self {
            expanded_properties: ExpandedProperties::all(),
            list_style: ListStyle::FullNames,
            ..Self::default()
        }
    }

    /// Creates a configuration that renders attributes only
    #[must_use]
    pub fn flat() -> Self {
        Self {
            expanded_properties: ExpandedProperties::empty(),
            expand_array_elements: false,
            ..Self::default()
        }
    }
}
