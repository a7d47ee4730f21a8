use std::fmt;
use std::hash::{Hash, Hasher};

/// The stable identity of a type inside the [`crate::metadata::typesystem::TypeRegistry`] arena.
///
/// Tokens are 32-bit values where:
/// - The high byte (bits 24-31) tells where the type came from (see [`TokenSpace`])
/// - The low 24 bits (bits 0-23) are the sequence number within that space
///
/// A token never changes once assigned, so descriptors refer to their base, element,
/// interface and generic argument types by token rather than by pointer.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Token(pub u32);

/// The origin of a type, encoded in the high byte of its [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
pub enum TokenSpace {
    /// Defined by a debuggee module through the type builder
    Defined,
    /// Constructed from other types (arrays, pointers, generic instances)
    Constructed,
    /// Seeded core library types (`System.Object`, primitives, ...)
    CoreLibrary,
    /// Anything else
    Unknown,
}

impl Token {
    /// High byte of user-defined types
    pub const DEFINED: u8 = 0x02;
    /// High byte of constructed types
    pub const CONSTRUCTED: u8 = 0x1B;
    /// High byte of the seeded core library types
    pub const CORE_LIBRARY: u8 = 0xF0;

    /// Creates a new token from a raw 32-bit value
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Creates a token from a space byte and a sequence number
    #[must_use]
    pub fn from_parts(space: u8, row: u32) -> Self {
        Token((u32::from(space) << 24) | (row & 0x00FF_FFFF))
    }

    /// Returns the raw token value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Extracts the space byte from the token (high byte)
    #[must_use]
    pub fn space_byte(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Classifies the token by its space byte
    #[must_use]
    pub fn space(&self) -> TokenSpace {
        match self.space_byte() {
            Self::DEFINED => TokenSpace::Defined,
            Self::CONSTRUCTED => TokenSpace::Constructed,
            Self::CORE_LIBRARY => TokenSpace::CoreLibrary,
            _ => TokenSpace::Unknown,
        }
    }

    /// Extracts the sequence number from the token (low 24 bits)
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Returns true if this is a null token (value 0)
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, space: {}, row: {})",
            self.0,
            self.space(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_token_parts() {
        let token = Token::from_parts(Token::CORE_LIBRARY, 8);
        assert_eq!(token.value(), 0xF000_0008);
        assert_eq!(token.space_byte(), 0xF0);
        assert_eq!(token.space(), TokenSpace::CoreLibrary);
        assert_eq!(token.row(), 8);

        let token = Token::from_parts(Token::CONSTRUCTED, 0x0100_0001);
        assert_eq!(token.row(), 1);
        assert_eq!(token.space(), TokenSpace::Constructed);
    }

    #[test]
    fn test_token_is_null() {
        assert!(Token(0).is_null());
        assert!(!Token::from_parts(Token::DEFINED, 1).is_null());
        assert_eq!(Token(0).space(), TokenSpace::Unknown);
    }

    #[test]
    fn test_token_display_and_debug() {
        let token = Token(0x0200_0001);
        assert_eq!(format!("{}", token), "0x02000001");

        let debug_str = format!("{:?}", token);
        assert!(debug_str.contains("Token(0x02000001"));
        assert!(debug_str.contains("space: Defined"));
        assert!(debug_str.contains("row: 1"));
    }

    #[test]
    fn test_token_ordering_and_hash() {
        let token1 = Token(0x0200_0001);
        let token2 = Token(0x0200_0002);
        let token3 = Token(0xF000_0001);
        assert!(token1 < token2);
        assert!(token2 < token3);

        let mut map = HashMap::new();
        map.insert(token1, "first");
        map.insert(token2, "second");
        assert_eq!(map.get(&Token(0x0200_0001)), Some(&"first"));

        let raw: u32 = token3.into();
        assert_eq!(Token::from(raw), token3);
    }
}
