use crate::{
    metadata::{
        token::Token,
        typesystem::{CoreType, DebugType, PrimitiveKind, TypeRegistry},
    },
    Error::{RecursionLimit, TypeNameNotFound},
    Result,
};

/// Maximum recursion depth for name resolution, module checks and base chain walks
pub const MAX_RECURSION_DEPTH: usize = 100;

/// Resolves tokens and type names to descriptors in the registry
pub struct TypeResolver<'r> {
    /// Reference to the type registry
    registry: &'r TypeRegistry,
}

impl<'r> TypeResolver<'r> {
    /// Create a new resolver with the given registry
    ///
    /// ## Arguments
    /// * 'registry' - The type registry to use
    #[must_use]
    pub fn new(registry: &'r TypeRegistry) -> Self {
        TypeResolver { registry }
    }

    /// Resolve a token to its descriptor
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeNotFound`] if the token is unknown.
    pub fn resolve(&self, token: Token) -> Result<DebugType<'r>> {
        self.registry.describe(token)
    }

    /// Resolve a type name to its descriptor, constructing composite types on demand.
    ///
    /// Accepts full names (`System.Int32`), C# keywords (`int`, `string`), and any nesting of
    /// pointer (`*`), array (`[]`, `[,]`) and generic argument (`[A,B]`) suffixes.
    ///
    /// ## Arguments
    /// * 'name' - The name to resolve
    ///
    /// # Errors
    /// Returns an error if:
    /// - A referenced name is not registered
    /// - The nesting exceeds [`MAX_RECURSION_DEPTH`]
    /// - A composite type can not be constructed
    pub fn resolve_name(&self, name: &str) -> Result<DebugType<'r>> {
        let token = self.resolve_name_with_depth(name.trim(), 0)?;
        self.resolve(token)
    }

    /// Internal recursive resolver with depth tracking
    ///
    /// ## Arguments
    /// * 'name'  - The (trimmed) name to resolve
    /// * 'depth' - Indicator of recursion level
    fn resolve_name_with_depth(&self, name: &str, depth: usize) -> Result<Token> {
        if depth >= MAX_RECURSION_DEPTH {
            return Err(RecursionLimit(MAX_RECURSION_DEPTH));
        }

        if let Some(element) = name.strip_suffix('*') {
            let element = self.resolve_name_with_depth(element.trim_end(), depth + 1)?;
            return Ok(self.registry.get_or_create_pointer(element)?.token);
        }

        if let Some((prefix, inner)) = split_trailing_brackets(name) {
            let prefix = prefix.trim_end();
            if prefix.is_empty() {
                return Err(TypeNameNotFound(name.to_string()));
            }

            let outer = self.resolve_name_with_depth(prefix, depth + 1)?;
            if inner.chars().all(|c| c == ',' || c.is_whitespace()) {
                let rank = u32::try_from(inner.matches(',').count() + 1)
                    .map_err(|_| malformed_error!("Array rank of {} is too large", name))?;
                return Ok(self.registry.get_or_create_array(outer, rank)?.token);
            }

            let arguments = split_top_level(inner)
                .into_iter()
                .map(|argument| {
                    let argument = argument.trim();
                    let argument = argument
                        .strip_prefix('[')
                        .and_then(|a| a.strip_suffix(']'))
                        .unwrap_or(argument);
                    self.resolve_name_with_depth(argument.trim(), depth + 1)
                })
                .collect::<Result<Vec<_>>>()?;
            return Ok(self
                .registry
                .get_or_create_generic_instance(outer, &arguments)?
                .token);
        }

        if let Some(kind) = PrimitiveKind::from_keyword(name) {
            return Ok(kind.token());
        }

        let core = match name {
            "object" => Some(CoreType::Object),
            "string" => Some(CoreType::String),
            "void" => Some(CoreType::Void),
            _ => None,
        };
        if let Some(core) = core {
            return Ok(core.token());
        }

        self.registry
            .get_by_fullname(name)
            .map(|found| found.token)
            .ok_or_else(|| TypeNameNotFound(name.to_string()))
    }
}

/// Splits `Name[inner]` into `("Name", "inner")` using the last top-level bracket pair
fn split_trailing_brackets(name: &str) -> Option<(&str, &str)> {
    let body = name.strip_suffix(']')?;

    let mut depth = 0usize;
    for (index, c) in body.char_indices().rev() {
        match c {
            ']' => depth += 1,
            '[' if depth == 0 => return Some((&body[..index], &body[index + 1..])),
            '[' => depth -= 1,
            _ => {}
        }
    }

    None
}

/// Splits on commas that are not nested inside brackets
fn split_top_level(inner: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (index, c) in inner.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&inner[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }

    parts.push(&inner[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{metadata::typesystem::TypeBuilder, Error};

    #[test]
    fn test_resolve_names() {
        let registry = TypeRegistry::new().unwrap();
        let resolver = TypeResolver::new(&registry);

        let int = resolver.resolve_name("System.Int32").unwrap();
        assert_eq!(int.token(), PrimitiveKind::I4.token());
        assert_eq!(resolver.resolve_name("int").unwrap(), int);
        assert_eq!(
            resolver.resolve_name("string").unwrap().full_name(),
            "System.String"
        );

        let array = resolver.resolve_name("int[]").unwrap();
        assert_eq!(array.full_name(), "System.Int32[]");
        assert_eq!(resolver.resolve_name("System.Int32[]").unwrap(), array);

        let matrix = resolver.resolve_name("System.Double[,]").unwrap();
        assert_eq!(matrix.array_rank(), Some(2));

        let nested = resolver.resolve_name("System.Byte*[][,]").unwrap();
        assert_eq!(nested.full_name(), "System.Byte*[][,]");
        assert!(nested
            .element_type()
            .unwrap()
            .element_type()
            .unwrap()
            .is_pointer());
    }

    #[test]
    fn test_resolve_generic_names() {
        let registry = TypeRegistry::new().unwrap();
        TypeBuilder::new(&registry)
            .class("System.Collections.Generic", "Dictionary`2")
            .module("mscorlib.dll")
            .unwrap()
            .build()
            .unwrap();
        let resolver = TypeResolver::new(&registry);

        let dictionary = resolver
            .resolve_name("System.Collections.Generic.Dictionary`2[System.String,System.Int32[]]")
            .unwrap();
        let arguments: Vec<String> = dictionary
            .generic_arguments()
            .iter()
            .map(DebugType::full_name)
            .collect();
        assert_eq!(arguments, vec!["System.String", "System.Int32[]"]);
        assert!(dictionary.is_class());
    }

    #[test]
    fn test_resolve_errors() {
        let registry = TypeRegistry::new().unwrap();
        let resolver = TypeResolver::new(&registry);

        assert!(matches!(
            resolver.resolve_name("App.Missing"),
            Err(Error::TypeNameNotFound(_))
        ));
        assert!(matches!(
            resolver.resolve_name("[]"),
            Err(Error::TypeNameNotFound(_))
        ));
        assert!(matches!(
            resolver.resolve(Token::new(0x0200_0999)),
            Err(Error::TypeNotFound(_))
        ));

        let deep = format!("System.Int32{}", "[]".repeat(MAX_RECURSION_DEPTH + 1));
        assert!(matches!(
            resolver.resolve_name(&deep),
            Err(Error::RecursionLimit(MAX_RECURSION_DEPTH))
        ));
    }
}
