//! # Resolved Types
//!
//! A `YangType` is the fully resolved type of a leaf or leaf-list: the
//! built-in base type with every restriction inherited through the typedef
//! chain merged in. Typedef resolution happens in the parser; this module
//! owns the restriction semantics and the value codec.
//!
//! ## Restriction Merging
//!
//! - `range` and `length`: the most derived statement replaces the
//!   inherited one (it must be a subset; the parser checks bounds).
//! - `pattern`: patterns accumulate. A value must satisfy every pattern
//!   along the chain (RFC 7950 §9.4.5).
//!
//! ## Value Codec
//!
//! - [`YangType::parse_lexical`] converts a lexical string into a typed
//!   [`Value`], checking every restriction.
//! - [`YangType::check_value`] checks an already-typed value.
//!
//! Patterns use XML Schema regular expression syntax, which is implicitly
//! anchored. [`PatternConstraint::new`] translates them into anchored
//! `regex` expressions.

use std::collections::BTreeSet;
use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use regex::Regex;
use thiserror::Error;

use yangkit_core::{QName, QNameModule, Value};

// ─── Identity Resolution Seam ───────────────────────────────────────

/// Identity lookups needed to parse and check `identityref` values.
///
/// Implemented by [`SchemaContext`](crate::SchemaContext) and by the
/// parser's in-progress build state (which must check default values before
/// a context exists).
pub trait IdentityResolver {
    /// Resolve `name` or `module-name:name` to an identity QName.
    /// Unprefixed names resolve in `default_module`.
    fn resolve_identity(&self, text: &str, default_module: &QNameModule) -> Option<QName>;

    /// Whether `identity` is derived (directly or transitively) from `base`.
    /// An identity is not derived from itself.
    fn is_derived_from(&self, identity: &QName, base: &QName) -> bool;
}

// ─── Errors ──────────────────────────────────────────────────────────

/// A value does not belong to a type's value space.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// The lexical form cannot be parsed as the base type.
    #[error("{input:?} is not a valid {type_name} value")]
    Lexical {
        /// The rejected text.
        input: String,
        /// Base type name.
        type_name: &'static str,
    },

    /// The value variant does not match the base type.
    #[error("expected {expected} value, found {actual}")]
    WrongKind {
        /// Base type name.
        expected: &'static str,
        /// Variant found.
        actual: &'static str,
    },

    /// Numeric value outside the type's range.
    #[error("value {value} is outside range {range}")]
    OutOfRange {
        /// Rendered value.
        value: String,
        /// Rendered range restriction.
        range: String,
    },

    /// String or binary length outside the type's length restriction.
    #[error("length {length} is outside allowed length {allowed}")]
    BadLength {
        /// Actual length.
        length: u64,
        /// Rendered length restriction.
        allowed: String,
    },

    /// String does not satisfy a pattern.
    #[error("{value:?} does not match pattern {pattern:?}")]
    PatternMismatch {
        /// The rejected string.
        value: String,
        /// Pattern source text.
        pattern: String,
    },

    /// Enumeration name not declared.
    #[error("{value:?} is not a member of the enumeration")]
    UnknownEnum {
        /// The rejected name.
        value: String,
    },

    /// Bit name not declared.
    #[error("bit {bit:?} is not declared")]
    UnknownBit {
        /// The rejected bit name.
        bit: String,
    },

    /// Identity unknown or not derived from the required base.
    #[error("identity {identity} is not derived from {base}")]
    NotDerived {
        /// The rejected identity.
        identity: String,
        /// The required base.
        base: String,
    },

    /// A decimal64 value is scaled differently from its type.
    #[error("decimal64 value has {actual} fraction digits, expected {expected}")]
    FractionDigits {
        /// Fraction digits the value carries.
        actual: u8,
        /// Fraction digits the type declares, or the legal range.
        expected: String,
    },

    /// No member type of a union accepts the value.
    #[error("{value:?} matches no member type of the union")]
    NoUnionMember {
        /// Rendered value.
        value: String,
    },
}

// ─── Integer Kinds ───────────────────────────────────────────────────

/// The eight built-in integer types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntKind {
    /// `int8`
    Int8,
    /// `int16`
    Int16,
    /// `int32`
    Int32,
    /// `int64`
    Int64,
    /// `uint8`
    Uint8,
    /// `uint16`
    Uint16,
    /// `uint32`
    Uint32,
    /// `uint64`
    Uint64,
}

impl IntKind {
    /// Look up an integer kind by built-in type name.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "int8" => Self::Int8,
            "int16" => Self::Int16,
            "int32" => Self::Int32,
            "int64" => Self::Int64,
            "uint8" => Self::Uint8,
            "uint16" => Self::Uint16,
            "uint32" => Self::Uint32,
            "uint64" => Self::Uint64,
            _ => return None,
        })
    }

    /// Built-in type name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
        }
    }

    /// Whether values are signed.
    pub fn is_signed(&self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }

    /// Smallest representable value.
    pub fn min(&self) -> i128 {
        match self {
            Self::Int8 => i128::from(i8::MIN),
            Self::Int16 => i128::from(i16::MIN),
            Self::Int32 => i128::from(i32::MIN),
            Self::Int64 => i128::from(i64::MIN),
            _ => 0,
        }
    }

    /// Largest representable value.
    pub fn max(&self) -> i128 {
        match self {
            Self::Int8 => i128::from(i8::MAX),
            Self::Int16 => i128::from(i16::MAX),
            Self::Int32 => i128::from(i32::MAX),
            Self::Int64 => i128::from(i64::MAX),
            Self::Uint8 => i128::from(u8::MAX),
            Self::Uint16 => i128::from(u16::MAX),
            Self::Uint32 => i128::from(u32::MAX),
            Self::Uint64 => i128::from(u64::MAX),
        }
    }
}

// ─── Restrictions ────────────────────────────────────────────────────

/// A `range` restriction: a list of disjoint, ascending, inclusive
/// intervals. For `decimal64` the bounds are scaled by the type's
/// fraction digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeConstraint {
    /// Inclusive intervals.
    pub intervals: Vec<(i128, i128)>,
    /// Original statement argument, for messages.
    pub text: String,
}

impl RangeConstraint {
    /// Parse a range argument such as `"0..255"` or `"min..-1 | 1..max"`.
    ///
    /// `min`/`max` keywords resolve to `lo`/`hi`. With `fraction_digits`,
    /// bounds are decimal and are scaled.
    pub fn parse(text: &str, lo: i128, hi: i128, fraction_digits: Option<u8>) -> Result<Self, String> {
        let parse_bound = |s: &str| -> Result<i128, String> {
            match s {
                "min" => Ok(lo),
                "max" => Ok(hi),
                _ => match fraction_digits {
                    Some(fd) => parse_scaled_decimal(s, fd)
                        .ok_or_else(|| format!("invalid decimal bound {s:?}")),
                    None => s
                        .parse::<i128>()
                        .map_err(|_| format!("invalid integer bound {s:?}")),
                },
            }
        };
        let intervals = parse_intervals(text, parse_bound)?;
        check_intervals(&intervals, lo, hi, text)?;
        Ok(Self {
            intervals,
            text: text.to_string(),
        })
    }

    /// Whether `v` falls in one of the intervals.
    pub fn contains(&self, v: i128) -> bool {
        self.intervals.iter().any(|(a, b)| *a <= v && v <= *b)
    }
}

/// A `length` restriction on strings (characters) or binary (octets).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthConstraint {
    /// Inclusive intervals.
    pub intervals: Vec<(u64, u64)>,
    /// Original statement argument.
    pub text: String,
}

impl LengthConstraint {
    /// Parse a length argument such as `"1..253"`.
    pub fn parse(text: &str) -> Result<Self, String> {
        let parse_bound = |s: &str| -> Result<i128, String> {
            match s {
                "min" => Ok(0),
                "max" => Ok(i128::from(u64::MAX)),
                _ => s
                    .parse::<u64>()
                    .map(i128::from)
                    .map_err(|_| format!("invalid length bound {s:?}")),
            }
        };
        let wide = parse_intervals(text, parse_bound)?;
        check_intervals(&wide, 0, i128::from(u64::MAX), text)?;
        let intervals = wide
            .into_iter()
            .map(|(a, b)| (a as u64, b as u64))
            .collect();
        Ok(Self {
            intervals,
            text: text.to_string(),
        })
    }

    /// Whether `len` falls in one of the intervals.
    pub fn contains(&self, len: u64) -> bool {
        self.intervals.iter().any(|(a, b)| *a <= len && len <= *b)
    }
}

fn parse_intervals(
    text: &str,
    parse_bound: impl Fn(&str) -> Result<i128, String>,
) -> Result<Vec<(i128, i128)>, String> {
    let mut intervals = Vec::new();
    for part in text.split('|') {
        let part = part.trim();
        if part.is_empty() {
            return Err(format!("empty interval in {text:?}"));
        }
        let (a, b) = match part.split_once("..") {
            Some((a, b)) => (parse_bound(a.trim())?, parse_bound(b.trim())?),
            None => {
                let v = parse_bound(part)?;
                (v, v)
            }
        };
        intervals.push((a, b));
    }
    Ok(intervals)
}

fn check_intervals(intervals: &[(i128, i128)], lo: i128, hi: i128, text: &str) -> Result<(), String> {
    let mut prev: Option<i128> = None;
    for (a, b) in intervals {
        if a > b {
            return Err(format!("interval {a}..{b} is inverted in {text:?}"));
        }
        if *a < lo || *b > hi {
            return Err(format!("interval {a}..{b} exceeds base bounds in {text:?}"));
        }
        if let Some(p) = prev {
            if *a <= p {
                return Err(format!("intervals must be ascending and disjoint in {text:?}"));
            }
        }
        prev = Some(*b);
    }
    Ok(())
}

/// Parse a decimal literal into an integer scaled by `10^fraction_digits`.
///
/// Rejects literals with more fraction digits than allowed.
pub fn parse_scaled_decimal(s: &str, fraction_digits: u8) -> Option<i128> {
    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (int_part, frac_part) = match body.split_once('.') {
        Some((i, f)) => (i, f),
        None => (body, ""),
    };
    if int_part.is_empty() || !int_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !frac_part.bytes().all(|b| b.is_ascii_digit()) || frac_part.len() > usize::from(fraction_digits) {
        return None;
    }
    if body.contains('.') && frac_part.is_empty() {
        return None;
    }
    let scale = 10i128.checked_pow(u32::from(fraction_digits))?;
    let int_val: i128 = int_part.parse().ok()?;
    let mut frac_val: i128 = if frac_part.is_empty() { 0 } else { frac_part.parse().ok()? };
    for _ in frac_part.len()..usize::from(fraction_digits) {
        frac_val *= 10;
    }
    let magnitude = int_val.checked_mul(scale)?.checked_add(frac_val)?;
    Some(if negative { -magnitude } else { magnitude })
}

/// A `pattern` restriction.
#[derive(Debug, Clone)]
pub struct PatternConstraint {
    /// Pattern text as written in the schema (XSD syntax).
    pub source: String,
    /// `modifier invert-match`.
    pub invert_match: bool,
    regex: Regex,
}

impl PatternConstraint {
    /// Compile an XSD pattern.
    pub fn new(source: &str, invert_match: bool) -> Result<Self, String> {
        let translated = xsd_to_regex(source);
        let regex = Regex::new(&translated).map_err(|e| format!("invalid pattern {source:?}: {e}"))?;
        Ok(Self {
            source: source.to_string(),
            invert_match,
            regex,
        })
    }

    /// Whether `s` satisfies this restriction.
    pub fn accepts(&self, s: &str) -> bool {
        self.regex.is_match(s) != self.invert_match
    }
}

impl PartialEq for PatternConstraint {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.invert_match == other.invert_match
    }
}

impl Eq for PatternConstraint {}

/// Translate XSD regex syntax into an anchored `regex` expression.
///
/// XSD has no anchors, so `^` and `$` are literals there; the multi-char
/// escapes `\i` and `\c` have no `regex` equivalent and are expanded.
fn xsd_to_regex(src: &str) -> String {
    let mut out = String::with_capacity(src.len() + 8);
    let mut in_class = false;
    let mut class_start = false;
    let mut chars = src.chars();
    while let Some(c) = chars.next() {
        let was_class_start = class_start;
        class_start = false;
        match c {
            '\\' => match chars.next() {
                Some('i') if in_class => out.push_str("A-Za-z_:"),
                Some('i') => out.push_str("[A-Za-z_:]"),
                Some('I') => out.push_str("[^A-Za-z_:]"),
                Some('c') if in_class => out.push_str("A-Za-z0-9._:\\-"),
                Some('c') => out.push_str("[A-Za-z0-9._:\\-]"),
                Some('C') => out.push_str("[^A-Za-z0-9._:\\-]"),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push_str("\\\\"),
            },
            '[' if !in_class => {
                in_class = true;
                class_start = true;
                out.push('[');
            }
            ']' if in_class => {
                in_class = false;
                out.push(']');
            }
            '^' if !(in_class && was_class_start) => out.push_str("\\^"),
            '$' => out.push_str("\\$"),
            _ => out.push(c),
        }
    }
    format!("^(?:{out})$")
}

// ─── Enumerations, Bits, Leafref Paths ──────────────────────────────

/// One `enum` of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumMember {
    /// Enum name.
    pub name: String,
    /// Assigned or explicit value.
    pub value: i32,
    /// Description, if any.
    pub description: Option<String>,
}

/// One `bit` of a bits type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMember {
    /// Bit name.
    pub name: String,
    /// Assigned or explicit position.
    pub position: u32,
    /// Description, if any.
    pub description: Option<String>,
}

/// One step of a leafref path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeafRefStep {
    /// `..`
    Parent,
    /// A named child; predicates are recorded but not evaluated.
    Child {
        /// Resolved child name.
        name: QName,
        /// Whether the step carried a `[...]` predicate.
        has_predicate: bool,
    },
}

/// A parsed leafref `path` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafRefPath {
    /// The path text as written.
    pub text: String,
    /// Whether the path starts at the data tree root.
    pub absolute: bool,
    /// Steps in order.
    pub steps: Vec<LeafRefStep>,
}

impl LeafRefPath {
    /// Parse a leafref path. `resolve` maps an optional prefix and a local
    /// name to a QName in the scope where the path was written.
    pub fn parse(
        text: &str,
        resolve: impl Fn(Option<&str>, &str) -> Result<QName, String>,
    ) -> Result<Self, String> {
        let trimmed = text.trim();
        let absolute = trimmed.starts_with('/');
        let mut steps = Vec::new();
        for raw in split_path_steps(trimmed)? {
            let (name_part, has_predicate) = match raw.find('[') {
                Some(i) => (raw[..i].trim(), true),
                None => (raw.trim(), false),
            };
            if name_part == ".." {
                if has_predicate {
                    return Err(format!("predicate on '..' in leafref path {text:?}"));
                }
                if absolute {
                    return Err(format!("'..' in absolute leafref path {text:?}"));
                }
                steps.push(LeafRefStep::Parent);
                continue;
            }
            let (prefix, local) = match name_part.split_once(':') {
                Some((p, l)) => (Some(p), l),
                None => (None, name_part),
            };
            let name = resolve(prefix, local)?;
            steps.push(LeafRefStep::Child {
                name,
                has_predicate,
            });
        }
        if steps.is_empty() || !matches!(steps.last(), Some(LeafRefStep::Child { .. })) {
            return Err(format!("leafref path {text:?} must end in a node name"));
        }
        Ok(Self {
            text: text.to_string(),
            absolute,
            steps,
        })
    }
}

/// Split a path on `/`, ignoring slashes inside predicates.
fn split_path_steps(path: &str) -> Result<Vec<&str>, String> {
    let body = path.strip_prefix('/').unwrap_or(path);
    let mut steps = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, c) in body.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| format!("unbalanced ']' in path {path:?}"))?;
            }
            '/' if depth == 0 => {
                steps.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(format!("unbalanced '[' in path {path:?}"));
    }
    steps.push(&body[start..]);
    if steps.iter().any(|s| s.trim().is_empty()) {
        return Err(format!("empty step in path {path:?}"));
    }
    Ok(steps)
}

// ─── The Resolved Type ──────────────────────────────────────────────

/// Built-in base type with merged restrictions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseType {
    /// `int8` .. `uint64`
    Integer {
        /// Integer kind.
        kind: IntKind,
        /// Effective range restriction.
        range: Option<RangeConstraint>,
    },
    /// `decimal64`
    Decimal64 {
        /// Fraction digits (1..=18).
        fraction_digits: u8,
        /// Effective range restriction, scaled.
        range: Option<RangeConstraint>,
    },
    /// `string`
    String {
        /// Effective length restriction.
        length: Option<LengthConstraint>,
        /// All patterns along the typedef chain.
        patterns: Vec<PatternConstraint>,
    },
    /// `binary`
    Binary {
        /// Effective length restriction (octets).
        length: Option<LengthConstraint>,
    },
    /// `boolean`
    Boolean,
    /// `empty`
    Empty,
    /// `enumeration`
    Enumeration {
        /// Declared members.
        enums: Vec<EnumMember>,
    },
    /// `bits`
    Bits {
        /// Declared bits.
        bits: Vec<BitMember>,
    },
    /// `identityref`
    IdentityRef {
        /// Required base identities.
        bases: Vec<QName>,
    },
    /// `instance-identifier`
    InstanceIdentifier {
        /// Whether the referenced instance must exist.
        require_instance: bool,
    },
    /// `leafref`
    LeafRef {
        /// Target path.
        path: LeafRefPath,
        /// Whether the referenced instance must exist.
        require_instance: bool,
    },
    /// `union`
    Union {
        /// Member types, in declaration order.
        members: Vec<YangType>,
    },
}

impl BaseType {
    /// Built-in type name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Integer { kind, .. } => kind.name(),
            Self::Decimal64 { .. } => "decimal64",
            Self::String { .. } => "string",
            Self::Binary { .. } => "binary",
            Self::Boolean => "boolean",
            Self::Empty => "empty",
            Self::Enumeration { .. } => "enumeration",
            Self::Bits { .. } => "bits",
            Self::IdentityRef { .. } => "identityref",
            Self::InstanceIdentifier { .. } => "instance-identifier",
            Self::LeafRef { .. } => "leafref",
            Self::Union { .. } => "union",
        }
    }
}

/// A fully resolved leaf type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YangType {
    /// Name of the nearest typedef, or `None` for a direct built-in type.
    pub typedef: Option<QName>,
    /// Base type and restrictions.
    pub base: BaseType,
}

impl YangType {
    /// A direct built-in type with no typedef name.
    pub fn builtin(base: BaseType) -> Self {
        Self {
            typedef: None,
            base,
        }
    }

    /// Unrestricted `string`.
    pub fn string() -> Self {
        Self::builtin(BaseType::String {
            length: None,
            patterns: Vec::new(),
        })
    }

    /// Display name: the typedef's local name or the built-in name.
    pub fn display_name(&self) -> &str {
        match &self.typedef {
            Some(q) => q.local_name(),
            None => self.base.name(),
        }
    }

    /// Whether this type or any union member is an `identityref`.
    pub fn involves_identityref(&self) -> bool {
        match &self.base {
            BaseType::IdentityRef { .. } => true,
            BaseType::Union { members } => members.iter().any(Self::involves_identityref),
            _ => false,
        }
    }

    /// Parse a lexical value and check it against every restriction.
    pub fn parse_lexical(&self, text: &str, identities: &dyn IdentityResolver) -> Result<Value, ValueError> {
        let lexical = |type_name: &'static str| ValueError::Lexical {
            input: text.to_string(),
            type_name,
        };
        let value = match &self.base {
            BaseType::Integer { kind, .. } => {
                let body = text.strip_prefix('+').unwrap_or(text);
                let n: i128 = body.parse().map_err(|_| lexical(kind.name()))?;
                integer_value(n, *kind).ok_or_else(|| ValueError::OutOfRange {
                    value: text.to_string(),
                    range: format!("{}..{}", kind.min(), kind.max()),
                })?
            }
            BaseType::Decimal64 {
                fraction_digits, ..
            } => {
                let scaled = parse_scaled_decimal(text, *fraction_digits).ok_or_else(|| lexical("decimal64"))?;
                let value = i64::try_from(scaled).map_err(|_| lexical("decimal64"))?;
                Value::Decimal64 {
                    value,
                    fraction_digits: *fraction_digits,
                }
            }
            BaseType::String { .. }
            | BaseType::Enumeration { .. }
            | BaseType::InstanceIdentifier { .. }
            | BaseType::LeafRef { .. } => Value::String(text.to_string()),
            BaseType::Binary { .. } => Value::Binary(STANDARD.decode(text.trim()).map_err(|_| lexical("binary"))?),
            BaseType::Boolean => match text {
                "true" => Value::Boolean(true),
                "false" => Value::Boolean(false),
                _ => return Err(lexical("boolean")),
            },
            BaseType::Empty => {
                if !text.is_empty() {
                    return Err(lexical("empty"));
                }
                Value::Empty
            }
            BaseType::Bits { .. } => Value::Bits(text.split_whitespace().map(str::to_string).collect::<BTreeSet<_>>()),
            BaseType::IdentityRef { bases } => {
                let default_module = bases
                    .first()
                    .map(|b| b.module().clone())
                    .ok_or_else(|| lexical("identityref"))?;
                let identity = identities
                    .resolve_identity(text.trim(), &default_module)
                    .ok_or_else(|| lexical("identityref"))?;
                Value::Identityref(identity)
            }
            BaseType::Union { members } => {
                return members
                    .iter()
                    .find_map(|m| m.parse_lexical(text, identities).ok())
                    .ok_or_else(|| ValueError::NoUnionMember {
                        value: text.to_string(),
                    });
            }
        };
        self.check_value(&value, identities)?;
        Ok(value)
    }

    /// Check a typed value against this type.
    ///
    /// `leafref` values are accepted here; their target type is checked by
    /// the data tree, which knows where the leaf sits.
    pub fn check_value(&self, value: &Value, identities: &dyn IdentityResolver) -> Result<(), ValueError> {
        let wrong_kind = || ValueError::WrongKind {
            expected: self.base.name(),
            actual: value.kind_name(),
        };
        if let Value::Decimal64 { fraction_digits, .. } = value {
            if !(1..=18).contains(fraction_digits) {
                return Err(ValueError::FractionDigits {
                    actual: *fraction_digits,
                    expected: "1..18".to_string(),
                });
            }
        }
        match &self.base {
            BaseType::Integer { kind, range } => {
                let n = match (value, kind.is_signed()) {
                    (Value::Int(i), true) => i128::from(*i),
                    (Value::Uint(u), false) => i128::from(*u),
                    _ => return Err(wrong_kind()),
                };
                if n < kind.min() || n > kind.max() {
                    return Err(ValueError::OutOfRange {
                        value: n.to_string(),
                        range: format!("{}..{}", kind.min(), kind.max()),
                    });
                }
                check_range(range.as_ref(), n, value)
            }
            BaseType::Decimal64 {
                fraction_digits,
                range,
            } => {
                let Value::Decimal64 {
                    value: v,
                    fraction_digits: fd,
                } = value
                else {
                    return Err(wrong_kind());
                };
                // One scale per type keeps equal numbers equal as values.
                if fd != fraction_digits {
                    return Err(ValueError::FractionDigits {
                        actual: *fd,
                        expected: fraction_digits.to_string(),
                    });
                }
                check_range(range.as_ref(), i128::from(*v), value)
            }
            BaseType::String { length, patterns } => {
                let Value::String(s) = value else {
                    return Err(wrong_kind());
                };
                check_length(length.as_ref(), s.chars().count() as u64)?;
                match patterns.iter().find(|p| !p.accepts(s)) {
                    Some(p) => Err(ValueError::PatternMismatch {
                        value: s.clone(),
                        pattern: p.source.clone(),
                    }),
                    None => Ok(()),
                }
            }
            BaseType::Binary { length } => {
                let Value::Binary(bytes) = value else {
                    return Err(wrong_kind());
                };
                check_length(length.as_ref(), bytes.len() as u64)
            }
            BaseType::Boolean => match value {
                Value::Boolean(_) => Ok(()),
                _ => Err(wrong_kind()),
            },
            BaseType::Empty => match value {
                Value::Empty => Ok(()),
                _ => Err(wrong_kind()),
            },
            BaseType::Enumeration { enums } => {
                let Value::String(s) = value else {
                    return Err(wrong_kind());
                };
                if enums.iter().any(|e| &e.name == s) {
                    Ok(())
                } else {
                    Err(ValueError::UnknownEnum { value: s.clone() })
                }
            }
            BaseType::Bits { bits } => {
                let Value::Bits(set) = value else {
                    return Err(wrong_kind());
                };
                match set.iter().find(|b| !bits.iter().any(|d| &d.name == *b)) {
                    Some(b) => Err(ValueError::UnknownBit { bit: b.clone() }),
                    None => Ok(()),
                }
            }
            BaseType::IdentityRef { bases } => {
                let Value::Identityref(id) = value else {
                    return Err(wrong_kind());
                };
                match bases.iter().find(|b| !identities.is_derived_from(id, b)) {
                    Some(b) => Err(ValueError::NotDerived {
                        identity: id.to_string(),
                        base: b.to_string(),
                    }),
                    None => Ok(()),
                }
            }
            BaseType::InstanceIdentifier { .. } => match value {
                Value::String(s) if s.starts_with('/') => Ok(()),
                Value::String(s) => Err(ValueError::Lexical {
                    input: s.clone(),
                    type_name: "instance-identifier",
                }),
                _ => Err(wrong_kind()),
            },
            BaseType::LeafRef { .. } => Ok(()),
            BaseType::Union { members } => {
                if members.iter().any(|m| m.check_value(value, identities).is_ok()) {
                    Ok(())
                } else {
                    Err(ValueError::NoUnionMember {
                        value: value.to_string(),
                    })
                }
            }
        }
    }
}

impl fmt::Display for YangType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

fn integer_value(n: i128, kind: IntKind) -> Option<Value> {
    if kind.is_signed() {
        i64::try_from(n).ok().map(Value::Int)
    } else {
        u64::try_from(n).ok().map(Value::Uint)
    }
}

fn check_range(range: Option<&RangeConstraint>, n: i128, value: &Value) -> Result<(), ValueError> {
    match range {
        Some(r) if !r.contains(n) => Err(ValueError::OutOfRange {
            value: value.to_string(),
            range: r.text.clone(),
        }),
        _ => Ok(()),
    }
}

fn check_length(length: Option<&LengthConstraint>, len: u64) -> Result<(), ValueError> {
    match length {
        Some(l) if !l.contains(len) => Err(ValueError::BadLength {
            length: len,
            allowed: l.text.clone(),
        }),
        _ => Ok(()),
    }
}

/// An identity resolver that knows no identities.
///
/// Useful for checking values of types that do not involve `identityref`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIdentities;

impl IdentityResolver for NoIdentities {
    fn resolve_identity(&self, _text: &str, _default_module: &QNameModule) -> Option<QName> {
        None
    }

    fn is_derived_from(&self, _identity: &QName, _base: &QName) -> bool {
        false
    }
}

/// A `typedef` statement, as listed on its module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinitionNode {
    /// Typedef name.
    pub qname: QName,
    /// Resolved type (its `typedef` field names this typedef).
    pub type_: YangType,
    /// `units`, if any.
    pub units: Option<String>,
    /// `default`, if any.
    pub default: Option<String>,
    /// Description, if any.
    pub description: Option<String>,
}
