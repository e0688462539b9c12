//! # Leaf Values
//!
//! The value space of YANG built-in types. A `Value` is what a leaf,
//! leaf-list entry, or list key holds; the schema decides which variants a
//! given leaf accepts.
//!
//! `Display` renders the canonical lexical form (RFC 7950 §9): decimal64
//! without trailing zeros, bits space-separated in order, binary as base64.

use std::collections::BTreeSet;
use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::qname::QName;

/// A typed leaf value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum Value {
    /// `boolean`.
    Boolean(bool),
    /// Signed integers (`int8` .. `int64`).
    Int(i64),
    /// Unsigned integers (`uint8` .. `uint64`).
    Uint(u64),
    /// `decimal64`, stored as a scaled integer: `value / 10^fraction_digits`.
    Decimal64 {
        /// Scaled integer value.
        value: i64,
        /// Number of fraction digits (1..=18).
        fraction_digits: u8,
    },
    /// `string`, `enumeration`, `instance-identifier`, and leafref targets of those.
    String(String),
    /// `empty`.
    Empty,
    /// `bits`: the set of bit names that are set.
    Bits(BTreeSet<String>),
    /// `binary`.
    Binary(Vec<u8>),
    /// `identityref`.
    Identityref(QName),
}

impl Value {
    /// Short name of the variant, used in validation messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Int(_) => "signed integer",
            Self::Uint(_) => "unsigned integer",
            Self::Decimal64 { .. } => "decimal64",
            Self::String(_) => "string",
            Self::Empty => "empty",
            Self::Bits(_) => "bits",
            Self::Binary(_) => "binary",
            Self::Identityref(_) => "identityref",
        }
    }

    /// The string payload, if this is a `String` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The value as a signed 128-bit integer, for range checks across
    /// the signed and unsigned variants.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::Int(i) => Some(i128::from(*i)),
            Self::Uint(u) => Some(i128::from(*u)),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Uint(u) => write!(f, "{u}"),
            Self::Decimal64 {
                value,
                fraction_digits,
            } => f.write_str(&format_decimal64(*value, *fraction_digits)),
            Self::String(s) => f.write_str(s),
            Self::Empty => Ok(()),
            Self::Bits(bits) => {
                for (i, bit) in bits.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    f.write_str(bit)?;
                }
                Ok(())
            }
            Self::Binary(bytes) => f.write_str(&STANDARD.encode(bytes)),
            Self::Identityref(q) => f.write_str(q.local_name()),
        }
    }
}

/// Canonical decimal64 text: at least one fraction digit, no trailing zeros.
///
/// Works on the digit string, so any `fraction_digits` renders.
fn format_decimal64(value: i64, fraction_digits: u8) -> String {
    let width = usize::from(fraction_digits);
    let mut digits = value.unsigned_abs().to_string();
    if digits.len() <= width {
        digits = format!("{}{digits}", "0".repeat(width + 1 - digits.len()));
    }
    let (int_part, frac) = digits.split_at(digits.len() - width);
    let frac = match frac.trim_end_matches('0') {
        "" => "0",
        trimmed => trimmed,
    };
    let sign = if value < 0 { "-" } else { "" };
    format!("{sign}{int_part}.{frac}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal64_canonical_form() {
        let v = Value::Decimal64 {
            value: 150,
            fraction_digits: 2,
        };
        assert_eq!(v.to_string(), "1.5");
        let v = Value::Decimal64 {
            value: -5,
            fraction_digits: 3,
        };
        assert_eq!(v.to_string(), "-0.005");
        let v = Value::Decimal64 {
            value: 1000,
            fraction_digits: 1,
        };
        assert_eq!(v.to_string(), "100.0");
        let v = Value::Decimal64 {
            value: i64::MIN,
            fraction_digits: 18,
        };
        assert_eq!(v.to_string(), "-9.223372036854775808");
    }

    #[test]
    fn test_decimal64_out_of_range_digits_still_render() {
        let v = Value::Decimal64 {
            value: 1,
            fraction_digits: 20,
        };
        assert_eq!(v.to_string(), "0.00000000000000000001");
        let v = Value::Decimal64 {
            value: 7,
            fraction_digits: 0,
        };
        assert_eq!(v.to_string(), "7.0");
    }

    #[test]
    fn test_bits_render_in_order() {
        let bits: BTreeSet<String> = ["b", "a"].iter().map(|s| s.to_string()).collect();
        assert_eq!(Value::Bits(bits).to_string(), "a b");
    }

    #[test]
    fn test_binary_renders_base64() {
        assert_eq!(Value::Binary(b"yang".to_vec()).to_string(), "eWFuZw==");
    }

    #[test]
    fn test_integer_widening() {
        assert_eq!(Value::Int(-3).as_i128(), Some(-3));
        assert_eq!(Value::Uint(u64::MAX).as_i128(), Some(i128::from(u64::MAX)));
        assert_eq!(Value::from("x").as_i128(), None);
    }

    #[test]
    fn test_string_conversion() {
        let v: Value = "sample name".into();
        assert_eq!(v.as_str(), Some("sample name"));
        assert_eq!(v.kind_name(), "string");
    }
}
