//! Type metadata of the inspected debuggee.
//!
//! # Key Components
//!
//! - [`token`] - Stable identities of types in the registry arena
//! - [`typesystem`] - Type descriptors, the registry that owns them, and the builder and
//!   resolver that create and look them up
//!
//! # Examples
//!
//! ```rust
//! use debugdump::metadata::token::TokenSpace;
//! use debugdump::metadata::typesystem::{CoreType, TypeRegistry};
//!
//! let registry = TypeRegistry::new()?;
//! let object = registry.describe(CoreType::Object.token())?;
//! assert_eq!(object.token().space(), TokenSpace::CoreLibrary);
//! assert!(object.base_type().is_none());
//! # Ok::<(), debugdump::Error>(())
//! ```

/// Stable identities of registered types
pub mod token;

/// The debuggee type system
pub mod typesystem;
