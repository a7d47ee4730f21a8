use thiserror::Error;

use crate::metadata::token::Token;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Most variants are not failures of the library itself but *conditions* of the inspected
/// debuggee: asking a scalar for its array rank, reading a member that does not exist, or
/// resolving a type whose module was never loaded. Those are returned from the total accessors
/// of [`crate::value::Value`] and [`crate::metadata::typesystem::DebugType`] and rendered into
/// dumps as `{Exception: <message>}`. Use [`Error::category`] to tell them apart from the fatal
/// session errors that abort a dump.
///
/// # Error Categories
///
/// ## Kind mismatch
/// - [`Error::NotAnArray`] - Array accessor used on a non-array value
/// - [`Error::NotPrimitive`] - Primitive accessor used on a composite value
/// - [`Error::NotClassOrValueType`] - Module requested for an array, pointer or interface type
/// - [`Error::NullReference`] - Member or element access through a null reference
/// - [`Error::ValueInvalid`] - Access to a value that is no longer valid
/// - [`Error::ArrayRankMismatch`] / [`Error::IndexOutOfRange`] - Bad array indices
///
/// ## Member not found
/// - [`Error::MemberNotFound`] - No field or property of that name on the type chain
/// - [`Error::LocalVariableNotFound`] - No local of that name in the stack frame
///
/// ## Resolution failure
/// - [`Error::TypeNotFound`] / [`Error::TypeNameNotFound`] - Unknown type
/// - [`Error::ModuleNotLoaded`] - The type's binary is not loaded
/// - [`Error::TypeError`] - Invalid type construction
/// - [`Error::RecursionLimit`] - Type chain deeper than allowed
/// - [`Error::Expression`] - Malformed expression text
/// - [`Error::Malformed`] - Value data that does not fit its type
///
/// ## Fatal
/// - [`Error::NotPaused`] / [`Error::ProcessExited`] - No consistent snapshot to inspect
/// - [`Error::Xml`] - Output failure
///
/// # Examples
///
/// ```rust
/// use debugdump::{Error, ErrorCategory};
///
/// let err = Error::NotAnArray;
/// assert_eq!(err.to_string(), "Value is not an array");
/// assert_eq!(err.category(), ErrorCategory::KindMismatch);
/// assert!(!err.is_fatal());
/// ```
#[derive(Error, Debug)]
pub enum Error {
    // Kind mismatch
    /// An array-only accessor was used on a value whose type is not an array.
    #[error("Value is not an array")]
    NotAnArray,

    /// A primitive-only accessor was used on a value whose type is not primitive.
    #[error("Value is not a primitive type")]
    NotPrimitive,

    /// The module of a type was requested, but only classes and value types belong to one.
    #[error("The type is not a class or value type.")]
    NotClassOrValueType,

    /// Member or element access through a null reference.
    #[error("Value is null")]
    NullReference,

    /// The value handle no longer refers to live debuggee data.
    #[error("Value is no longer valid")]
    ValueInvalid,

    /// An array element was requested with the wrong number of indices.
    #[error("Array has rank {rank}, but {given} indices were given")]
    ArrayRankMismatch {
        /// The rank of the array
        rank: usize,
        /// The number of indices supplied
        given: usize,
    },

    /// An array element was requested outside of the array bounds.
    #[error("Index {index} is out of range for dimensions {dimensions}")]
    IndexOutOfRange {
        /// The requested indices, formatted as `[i, j]`
        index: String,
        /// The array dimensions, formatted as `[n, m]`
        dimensions: String,
    },

    // Member not found
    /// No field or property with this name exists on the type or any of its ancestors.
    #[error("Member {member} not found in type {type_name}")]
    MemberNotFound {
        /// Full name of the type that was searched
        type_name: String,
        /// The member name that was requested
        member: String,
    },

    /// The selected stack frame has no local variable with this name.
    #[error("Local variable {0} not found")]
    LocalVariableNotFound(String),

    // Resolution failure
    /// Failed to find type in the registry.
    ///
    /// The associated [`Token`] identifies which type was not found.
    #[error("Failed to find type in TypeRegistry - {0}")]
    TypeNotFound(Token),

    /// No type with this full name is known to the registry.
    #[error("Type {0} could not be resolved")]
    TypeNameNotFound(String),

    /// The binary that owns the type is not loaded into the debuggee.
    #[error("Module {0} is not loaded")]
    ModuleNotLoaded(String),

    /// General error during `TypeRegistry` usage.
    ///
    /// Covers type construction that cannot succeed, such as a duplicate full name or a base
    /// type that is not a class.
    #[error("{0}")]
    TypeError(String),

    /// Recursion limit reached.
    ///
    /// Walking a type chain or resolving a nested type name exceeded the maximum depth.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// The expression text could not be parsed.
    #[error("Invalid expression '{expression}': {message}")]
    Expression {
        /// The expression text
        expression: String,
        /// What went wrong while parsing it
        message: String,
    },

    /// Value data does not fit the type it is attached to.
    ///
    /// The error includes the source location where the mismatch was detected.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    // Fatal
    /// The debuggee is running, so there is no consistent snapshot to inspect.
    #[error("Process is not paused")]
    NotPaused,

    /// The debuggee has exited.
    #[error("Process has exited")]
    ProcessExited,

    /// Writing the XML document failed.
    #[error("Failed to write XML - {0}")]
    Xml(String),
}

/// The error taxonomy used to decide whether a condition is rendered or surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum ErrorCategory {
    /// An accessor was used against a value or type of an incompatible kind
    KindMismatch,
    /// A named member or local does not exist
    MemberNotFound,
    /// A type, module or expression could not be resolved
    ResolutionFailure,
    /// The debuggee session cannot be inspected; aborts the dump
    Fatal,
}

impl Error {
    /// Returns the category of this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::NotAnArray
            | Error::NotPrimitive
            | Error::NotClassOrValueType
            | Error::NullReference
            | Error::ValueInvalid
            | Error::ArrayRankMismatch { .. }
            | Error::IndexOutOfRange { .. } => ErrorCategory::KindMismatch,
            Error::MemberNotFound { .. } | Error::LocalVariableNotFound(_) => {
                ErrorCategory::MemberNotFound
            }
            Error::TypeNotFound(_)
            | Error::TypeNameNotFound(_)
            | Error::ModuleNotLoaded(_)
            | Error::TypeError(_)
            | Error::RecursionLimit(_)
            | Error::Expression { .. }
            | Error::Malformed { .. } => ErrorCategory::ResolutionFailure,
            Error::NotPaused | Error::ProcessExited | Error::Xml(_) => ErrorCategory::Fatal,
        }
    }

    /// Returns true if this error must abort a dump instead of being rendered as data.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.category() == ErrorCategory::Fatal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mismatch_messages() {
        assert_eq!(Error::NotAnArray.to_string(), "Value is not an array");
        assert_eq!(Error::NotPrimitive.to_string(), "Value is not a primitive type");
        assert_eq!(
            Error::NotClassOrValueType.to_string(),
            "The type is not a class or value type."
        );
    }

    #[test]
    fn test_categories() {
        assert_eq!(Error::NullReference.category(), ErrorCategory::KindMismatch);
        assert_eq!(
            Error::MemberNotFound {
                type_name: "System.Int32[]".to_string(),
                member: "Count".to_string(),
            }
            .category(),
            ErrorCategory::MemberNotFound
        );
        assert_eq!(
            Error::ModuleNotLoaded("App.exe".to_string()).category(),
            ErrorCategory::ResolutionFailure
        );
        assert_eq!(
            malformed_error!("bad {}", 1).category(),
            ErrorCategory::ResolutionFailure
        );
        assert!(Error::NotPaused.is_fatal());
        assert!(Error::Xml("invalid utf-8".to_string()).is_fatal());
        assert!(!Error::TypeNameNotFound("Foo".to_string()).is_fatal());
    }
}
