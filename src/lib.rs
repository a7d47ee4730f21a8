// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # debugdump
//!
//! Structured inspection of managed debuggee values and types, serialized into a stable XML
//! vocabulary that doubles as a golden-output test oracle.
//!
//! Given a paused debuggee snapshot, `debugdump` reads values (scalars, arrays and objects)
//! and their type descriptors through total accessors, and dumps them as deterministic
//! `<Value>` and `<DebugType>` elements: attributes sorted alphabetically, booleans as
//! `True`/`False`, accessor failures as `{Exception: <message>}` and the BaseType chain of a
//! type expanded down to the literal `null`.
//!
//! ## Features
//!
//! - **Type registry** - Token-indexed arena of type descriptors, seeded with the core library
//! - **Total value accessors** - Wrong-kind access yields a typed, renderable error
//! - **Expression evaluation** - `array[1]`, `grid[0, 2]`, `point.x` against a stack frame
//! - **Deterministic dumps** - Byte-identical XML for identical snapshots
//! - **Golden documents** - `<DebuggerTests>` documents combining events and dumps
//!
//! ## Quick Start
//!
//! ```rust
//! use debugdump::prelude::*;
//!
//! let mut process = Process::start()?;
//! process.load_module("ArrayValue.exe", true)?;
//! let int_array = process.resolve_type("int[]")?.token();
//! let elements = (0..5).map(|i| PrimitiveData::I4(i).into()).collect();
//! process.add_local("array", int_array, ValueData::array(elements))?;
//! process.pause(PausedReason::Break)?;
//!
//! let mut tests = DebuggerTests::new(DumpConfig::legacy());
//! tests.expand_properties(&["DebugType.BaseType"])?;
//! let mut test = tests.start_test("ArrayValue.cs");
//! test.record_events(&mut process);
//!
//! let frame = process.selected_stack_frame()?;
//! let array = frame.local_variable_value("array")?;
//! test.object_dump_value("array", &array);
//! test.object_dump_values("array elements", &array.array_elements()?);
//! test.object_dump_type("type", array.debug_type());
//! test.object_dump_value("array.Length", &array.get_member_value("Length")?);
//! drop(array);
//!
//! process.exit();
//! test.record_events(&mut process);
//! tests.push(test);
//!
//! let xml = tests.to_xml()?;
//! assert!(xml.contains("ArrayLenght=\"5\""));
//! # Ok::<(), debugdump::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`metadata`] - Tokens and the type system (registry, builder, resolver, descriptors)
//! - [`value`] - The debuggee value model
//! - [`dump`] - Dump trees, the object dump serializer and the XML writer
//! - [`session`] - Paused process snapshots, stack frames and expressions
//! - [`harness`] - `<DebuggerTests>` golden documents
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result). Most errors are conditions of the
//! inspected debuggee rather than failures; see [`Error::category`].
#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types.
///
/// # Example
///
/// ```rust
/// use debugdump::prelude::*;
///
/// let registry = TypeRegistry::new()?;
/// let int = TypeResolver::new(&registry).resolve_name("int")?;
/// assert_eq!(int.full_name(), "System.Int32");
/// # Ok::<(), debugdump::Error>(())
/// ```
pub mod prelude;

/// Tokens and the debuggee type system
pub mod metadata;

/// The debuggee value model
pub mod value;

/// Object dumps and their XML rendering
pub mod dump;

/// Paused debuggee snapshots
pub mod session;

/// Golden-output test documents
pub mod harness;

/// `debugdump` Result type.
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `debugdump` Error type.
///
/// See [`ErrorCategory`] for how errors are told apart when rendering dumps.
pub use error::{Error, ErrorCategory};
