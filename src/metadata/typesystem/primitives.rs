use std::fmt;

use strum::{EnumIter, IntoEnumIterator};

use crate::metadata::token::Token;

/// Scalar data of a primitive (or string) debuggee value
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveData {
    /// Boolean value
    Boolean(bool),
    /// Character value
    Char(char),
    /// 8-bit signed integer
    I1(i8),
    /// 8-bit unsigned integer
    U1(u8),
    /// 16-bit signed integer
    I2(i16),
    /// 16-bit unsigned integer
    U2(u16),
    /// 32-bit signed integer
    I4(i32),
    /// 32-bit unsigned integer
    U4(u32),
    /// 64-bit signed integer
    I8(i64),
    /// 64-bit unsigned integer
    U8(u64),
    /// native signed integer, widened
    I(i64),
    /// native unsigned integer, widened
    U(u64),
    /// 32-bit floating point
    R4(f32),
    /// 64-bit floating point
    R8(f64),
    /// String value
    String(String),
}

impl PrimitiveData {
    /// The primitive kind of this data, `None` for strings
    #[must_use]
    pub fn kind(&self) -> Option<PrimitiveKind> {
        Some(match self {
            PrimitiveData::Boolean(_) => PrimitiveKind::Boolean,
            PrimitiveData::Char(_) => PrimitiveKind::Char,
            PrimitiveData::I1(_) => PrimitiveKind::I1,
            PrimitiveData::U1(_) => PrimitiveKind::U1,
            PrimitiveData::I2(_) => PrimitiveKind::I2,
            PrimitiveData::U2(_) => PrimitiveKind::U2,
            PrimitiveData::I4(_) => PrimitiveKind::I4,
            PrimitiveData::U4(_) => PrimitiveKind::U4,
            PrimitiveData::I8(_) => PrimitiveKind::I8,
            PrimitiveData::U8(_) => PrimitiveKind::U8,
            PrimitiveData::I(_) => PrimitiveKind::I,
            PrimitiveData::U(_) => PrimitiveKind::U,
            PrimitiveData::R4(_) => PrimitiveKind::R4,
            PrimitiveData::R8(_) => PrimitiveKind::R8,
            PrimitiveData::String(_) => return None,
        })
    }

    /// Try to convert to a boolean value
    #[must_use]
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            PrimitiveData::Boolean(value) => Some(*value),
            _ => self.as_i64().map(|value| value != 0),
        }
    }

    /// Try to convert to a 64-bit integer value
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PrimitiveData::I1(value) => Some(i64::from(*value)),
            PrimitiveData::U1(value) => Some(i64::from(*value)),
            PrimitiveData::I2(value) => Some(i64::from(*value)),
            PrimitiveData::U2(value) => Some(i64::from(*value)),
            PrimitiveData::I4(value) => Some(i64::from(*value)),
            PrimitiveData::U4(value) => Some(i64::from(*value)),
            PrimitiveData::I8(value) | PrimitiveData::I(value) => Some(*value),
            PrimitiveData::U8(value) | PrimitiveData::U(value) => i64::try_from(*value).ok(),
            PrimitiveData::Char(value) => Some(i64::from(u32::from(*value))),
            _ => None,
        }
    }

    /// Try to convert to a 64-bit floating point value
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PrimitiveData::R4(value) => Some(f64::from(*value)),
            PrimitiveData::R8(value) => Some(*value),
            _ => self.as_i64().map(|value| value as f64),
        }
    }

    /// Try to borrow the string value
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PrimitiveData::String(value) => Some(value),
            _ => None,
        }
    }
}

/// Floats are rendered the way the runtime's `ToString()` does: shortest round-trip digits,
/// `NaN`, `Infinity` and `-Infinity`. Decimal exponents of at least `precision` (15 for
/// doubles, 7 for singles) or at most -5 switch to `d.dddE+XX` notation.
fn write_float<T>(f: &mut fmt::Formatter<'_>, value: T, precision: i32) -> fmt::Result
where
    T: Copy + Into<f64> + fmt::Display + fmt::LowerExp,
{
    let wide: f64 = value.into();
    if wide.is_nan() {
        return f.write_str("NaN");
    }
    if wide.is_infinite() {
        return f.write_str(if wide > 0.0 { "Infinity" } else { "-Infinity" });
    }

    let scientific = format!("{value:e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return write!(f, "{value}");
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return write!(f, "{value}");
    };

    if wide == 0.0 || (exponent < precision && exponent > -5) {
        write!(f, "{value}")
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        write!(f, "{mantissa}E{sign}{:02}", exponent.unsigned_abs())
    }
}

impl fmt::Display for PrimitiveData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveData::Boolean(value) => f.write_str(if *value { "True" } else { "False" }),
            PrimitiveData::Char(value) => write!(f, "{value}"),
            PrimitiveData::I1(value) => write!(f, "{value}"),
            PrimitiveData::U1(value) => write!(f, "{value}"),
            PrimitiveData::I2(value) => write!(f, "{value}"),
            PrimitiveData::U2(value) => write!(f, "{value}"),
            PrimitiveData::I4(value) => write!(f, "{value}"),
            PrimitiveData::U4(value) => write!(f, "{value}"),
            PrimitiveData::I8(value) | PrimitiveData::I(value) => write!(f, "{value}"),
            PrimitiveData::U8(value) | PrimitiveData::U(value) => write!(f, "{value}"),
            PrimitiveData::R4(value) => write_float(f, *value, 7),
            PrimitiveData::R8(value) => write_float(f, *value, 15),
            PrimitiveData::String(value) => f.write_str(value),
        }
    }
}

impl From<bool> for PrimitiveData {
    fn from(value: bool) -> Self {
        PrimitiveData::Boolean(value)
    }
}

impl From<char> for PrimitiveData {
    fn from(value: char) -> Self {
        PrimitiveData::Char(value)
    }
}

impl From<i32> for PrimitiveData {
    fn from(value: i32) -> Self {
        PrimitiveData::I4(value)
    }
}

impl From<i64> for PrimitiveData {
    fn from(value: i64) -> Self {
        PrimitiveData::I8(value)
    }
}

impl From<f64> for PrimitiveData {
    fn from(value: f64) -> Self {
        PrimitiveData::R8(value)
    }
}

impl From<&str> for PrimitiveData {
    fn from(value: &str) -> Self {
        PrimitiveData::String(value.to_string())
    }
}

impl From<String> for PrimitiveData {
    fn from(value: String) -> Self {
        PrimitiveData::String(value)
    }
}

/// The runtime's primitive types (without data)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum PrimitiveKind {
    /// System.Boolean - true/false value
    Boolean,
    /// System.Char - Unicode 16-bit character
    Char,
    /// System.SByte - signed 8-bit integer
    I1,
    /// System.Byte - unsigned 8-bit integer
    U1,
    /// System.Int16 - signed 16-bit integer
    I2,
    /// System.UInt16 - unsigned 16-bit integer
    U2,
    /// System.Int32 - signed 32-bit integer
    I4,
    /// System.UInt32 - unsigned 32-bit integer
    U4,
    /// System.Int64 - signed 64-bit integer
    I8,
    /// System.UInt64 - unsigned 64-bit integer
    U8,
    /// System.Single - 32-bit floating point
    R4,
    /// System.Double - 64-bit floating point
    R8,
    /// System.IntPtr - native sized signed integer
    I,
    /// System.UIntPtr - native sized unsigned integer
    U,
}

impl PrimitiveKind {
    /// Get the registry token for this type
    #[must_use]
    pub fn token(&self) -> Token {
        Token::from_parts(
            Token::CORE_LIBRARY,
            match self {
                PrimitiveKind::Boolean => 0x02,
                PrimitiveKind::Char => 0x03,
                PrimitiveKind::I1 => 0x04,
                PrimitiveKind::U1 => 0x05,
                PrimitiveKind::I2 => 0x06,
                PrimitiveKind::U2 => 0x07,
                PrimitiveKind::I4 => 0x08,
                PrimitiveKind::U4 => 0x09,
                PrimitiveKind::I8 => 0x0A,
                PrimitiveKind::U8 => 0x0B,
                PrimitiveKind::R4 => 0x0C,
                PrimitiveKind::R8 => 0x0D,
                PrimitiveKind::I => 0x0E,
                PrimitiveKind::U => 0x0F,
            },
        )
    }

    /// The type name without namespace, e.g. `Int32`
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "Boolean",
            PrimitiveKind::Char => "Char",
            PrimitiveKind::I1 => "SByte",
            PrimitiveKind::U1 => "Byte",
            PrimitiveKind::I2 => "Int16",
            PrimitiveKind::U2 => "UInt16",
            PrimitiveKind::I4 => "Int32",
            PrimitiveKind::U4 => "UInt32",
            PrimitiveKind::I8 => "Int64",
            PrimitiveKind::U8 => "UInt64",
            PrimitiveKind::R4 => "Single",
            PrimitiveKind::R8 => "Double",
            PrimitiveKind::I => "IntPtr",
            PrimitiveKind::U => "UIntPtr",
        }
    }

    /// The namespace of every primitive
    #[must_use]
    pub fn namespace(&self) -> &'static str {
        "System"
    }

    /// The C# keyword for this type, if there is one
    #[must_use]
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            PrimitiveKind::Boolean => Some("bool"),
            PrimitiveKind::Char => Some("char"),
            PrimitiveKind::I1 => Some("sbyte"),
            PrimitiveKind::U1 => Some("byte"),
            PrimitiveKind::I2 => Some("short"),
            PrimitiveKind::U2 => Some("ushort"),
            PrimitiveKind::I4 => Some("int"),
            PrimitiveKind::U4 => Some("uint"),
            PrimitiveKind::I8 => Some("long"),
            PrimitiveKind::U8 => Some("ulong"),
            PrimitiveKind::R4 => Some("float"),
            PrimitiveKind::R8 => Some("double"),
            PrimitiveKind::I | PrimitiveKind::U => None,
        }
    }

    /// Integer kinds are the signed and unsigned 8 to 64 bit types
    #[must_use]
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            PrimitiveKind::I1
                | PrimitiveKind::U1
                | PrimitiveKind::I2
                | PrimitiveKind::U2
                | PrimitiveKind::I4
                | PrimitiveKind::U4
                | PrimitiveKind::I8
                | PrimitiveKind::U8
        )
    }

    /// The zero value of this kind
    #[must_use]
    pub fn default_data(&self) -> PrimitiveData {
        match self {
            PrimitiveKind::Boolean => PrimitiveData::Boolean(false),
            PrimitiveKind::Char => PrimitiveData::Char('\0'),
            PrimitiveKind::I1 => PrimitiveData::I1(0),
            PrimitiveKind::U1 => PrimitiveData::U1(0),
            PrimitiveKind::I2 => PrimitiveData::I2(0),
            PrimitiveKind::U2 => PrimitiveData::U2(0),
            PrimitiveKind::I4 => PrimitiveData::I4(0),
            PrimitiveKind::U4 => PrimitiveData::U4(0),
            PrimitiveKind::I8 => PrimitiveData::I8(0),
            PrimitiveKind::U8 => PrimitiveData::U8(0),
            PrimitiveKind::R4 => PrimitiveData::R4(0.0),
            PrimitiveKind::R8 => PrimitiveData::R8(0.0),
            PrimitiveKind::I => PrimitiveData::I(0),
            PrimitiveKind::U => PrimitiveData::U(0),
        }
    }

    /// Look a kind up by its C# keyword
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        PrimitiveKind::iter().find(|kind| kind.keyword() == Some(keyword))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_display() {
        assert_eq!(PrimitiveData::I4(5).to_string(), "5");
        assert_eq!(PrimitiveData::I4(-12).to_string(), "-12");
        assert_eq!(PrimitiveData::Boolean(true).to_string(), "True");
        assert_eq!(PrimitiveData::Boolean(false).to_string(), "False");
        assert_eq!(PrimitiveData::Char('x').to_string(), "x");
        assert_eq!(PrimitiveData::R8(1.5).to_string(), "1.5");
        assert_eq!(PrimitiveData::R8(2.0).to_string(), "2");
        assert_eq!(PrimitiveData::R4(0.1).to_string(), "0.1");
        assert_eq!(PrimitiveData::R8(f64::NAN).to_string(), "NaN");
        assert_eq!(PrimitiveData::R4(f32::INFINITY).to_string(), "Infinity");
        assert_eq!(PrimitiveData::R8(f64::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(PrimitiveData::from("hello").to_string(), "hello");
    }

    #[test]
    fn test_float_exponent_notation() {
        assert_eq!(PrimitiveData::R8(1e20).to_string(), "1E+20");
        assert_eq!(PrimitiveData::R8(1e-7).to_string(), "1E-07");
        assert_eq!(PrimitiveData::R8(-1.5e300).to_string(), "-1.5E+300");
        assert_eq!(PrimitiveData::R8(1e15).to_string(), "1E+15");
        assert_eq!(PrimitiveData::R8(123_456_789_012_345.0).to_string(), "123456789012345");
        assert_eq!(PrimitiveData::R8(0.0001).to_string(), "0.0001");
        assert_eq!(PrimitiveData::R8(0.00001).to_string(), "1E-05");
        assert_eq!(PrimitiveData::R8(0.0).to_string(), "0");
        assert_eq!(PrimitiveData::R4(1e20).to_string(), "1E+20");
        assert_eq!(PrimitiveData::R4(1_234_567.0).to_string(), "1234567");
        assert_eq!(PrimitiveData::R4(12_345_678.0).to_string(), "1.2345678E+07");
        assert_eq!(PrimitiveData::R4(f32::NAN).to_string(), "NaN");
    }

    #[test]
    fn test_primitive_kind_of_data() {
        assert_eq!(PrimitiveData::I4(1).kind(), Some(PrimitiveKind::I4));
        assert_eq!(PrimitiveData::U(1).kind(), Some(PrimitiveKind::U));
        assert_eq!(PrimitiveData::from("s").kind(), None);
        for kind in PrimitiveKind::iter() {
            assert_eq!(kind.default_data().kind(), Some(kind));
        }
    }

    #[test]
    fn test_conversions() {
        assert_eq!(PrimitiveData::U8(u64::MAX).as_i64(), None);
        assert_eq!(PrimitiveData::I2(-3).as_i64(), Some(-3));
        assert_eq!(PrimitiveData::I4(2).as_boolean(), Some(true));
        assert_eq!(PrimitiveData::R4(0.5).as_f64(), Some(0.5));
        assert_eq!(PrimitiveData::from("abc").as_str(), Some("abc"));
        assert_eq!(PrimitiveData::from("abc").as_i64(), None);
    }

    #[test]
    fn test_kind_names_and_tokens() {
        assert_eq!(PrimitiveKind::I4.name(), "Int32");
        assert_eq!(PrimitiveKind::U1.name(), "Byte");
        assert_eq!(PrimitiveKind::I4.token(), Token::new(0xF000_0008));
        assert_eq!(PrimitiveKind::from_keyword("int"), Some(PrimitiveKind::I4));
        assert_eq!(PrimitiveKind::from_keyword("nint"), None);
        assert!(PrimitiveKind::U8.is_integer());
        assert!(!PrimitiveKind::Char.is_integer());
        assert!(!PrimitiveKind::I.is_integer());
        assert!(!PrimitiveKind::R8.is_integer());

        let mut tokens: Vec<_> = PrimitiveKind::iter().map(|k| k.token()).collect();
        tokens.sort();
        tokens.dedup();
        assert_eq!(tokens.len(), PrimitiveKind::iter().count());
    }
}
