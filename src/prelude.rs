//! # debugdump Prelude
//!
//! This module provides a convenient prelude for the most commonly used types from the
//! debugdump library. Import this module to get quick access to the essential types for
//! inspecting and dumping debuggee values.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all debugdump operations
pub use crate::Error;

/// The category of an error
pub use crate::ErrorCategory;

/// The result type used throughout debugdump
pub use crate::Result;

// ================================================================================================
// Type System
// ================================================================================================

/// Token identifying a type in the registry
pub use crate::metadata::token::Token;

/// Core type system components
pub use crate::metadata::typesystem::{
    CoreType, DebugType, PrimitiveData, PrimitiveKind, TypeBuilder, TypeFlavor, TypeRegistry,
    TypeResolver,
};

// ================================================================================================
// Values and Sessions
// ================================================================================================

/// The value model
pub use crate::value::{ArrayData, ArrayDimensions, ObjectData, Value, ValueData};

/// Process snapshots
pub use crate::session::{PausedReason, Process, StackFrame};

// ================================================================================================
// Dumps
// ================================================================================================

/// Dump configuration, serializer and rendering
pub use crate::dump::{to_xml, DumpConfig, DumpNode, ObjectDumper};

/// Golden-output documents
pub use crate::harness::{DebuggerTests, TestCase};
