//! Type resolution: built-in types, typedef chains, and restriction
//! merging (RFC 7950 §7.3, §9).
//!
//! A derived type may only narrow its base: a `range` or `length` must lie
//! inside the inherited intervals, `pattern`s accumulate, and restricted
//! `enum`/`bit` sets must be subsets that keep their values.

use tracing::debug;
use yangkit_core::{QName, QNameModule};
use yangkit_model::{
    BaseType, BitMember, EnumMember, IntKind, LeafRefPath, LengthConstraint, NoIdentities, PatternConstraint,
    RangeConstraint, YangType,
};

use super::{split_prefix, Linker, Origin, Scope};
use crate::error::ParserResult;
use crate::statement::Statement;

const MAX_TYPEDEF_DEPTH: usize = 32;

const BUILTIN_TYPES: &[&str] = &[
    "binary",
    "bits",
    "boolean",
    "decimal64",
    "empty",
    "enumeration",
    "identityref",
    "instance-identifier",
    "int8",
    "int16",
    "int32",
    "int64",
    "leafref",
    "string",
    "uint8",
    "uint16",
    "uint32",
    "uint64",
    "union",
];

/// A type together with what the typedef chain contributes.
pub(super) struct ResolvedType {
    pub type_: YangType,
    pub default: Option<String>,
    pub units: Option<String>,
}

impl<'a> Linker<'a> {
    /// Resolve a `type` statement. `ns` is the namespace unprefixed leafref
    /// path steps belong to.
    pub(super) fn resolve_type(
        &self,
        stmt: &'a Statement,
        scope: &Scope<'a, '_>,
        ns: &QNameModule,
        depth: usize,
    ) -> ParserResult<ResolvedType> {
        let file = scope.file;
        let text = stmt.arg();
        let (prefix, name) = split_prefix(text);
        if prefix.is_none() && BUILTIN_TYPES.contains(&name) {
            let base = self.builtin_base(name, stmt, scope, ns, depth)?;
            let type_ = self.restrict(YangType::builtin(base), stmt, file, false)?;
            return Ok(ResolvedType {
                type_,
                default: None,
                units: None,
            });
        }
        if depth >= MAX_TYPEDEF_DEPTH {
            return Err(self.semantic(
                file,
                stmt.line,
                format!("typedef chain through '{text}' is too deep; it is probably circular"),
            ));
        }
        let (typedef, origin) = self
            .lookup_typedef(scope, text, stmt.line)?
            .ok_or_else(|| self.unresolved(file, stmt.line, "type", text))?;
        let root;
        let def_scope: &Scope<'a, '_> = match origin {
            Origin::Lexical(s) => s,
            Origin::Root(def_file) => {
                root = Scope::root(def_file);
                &root
            }
        };
        let resolved = self.resolve_typedef(typedef, def_scope, depth + 1)?;
        let type_ = self.restrict(resolved.type_, stmt, file, true)?;
        Ok(ResolvedType { type_, ..resolved })
    }

    /// Resolve a `typedef` declared in `scope`.
    pub(super) fn resolve_typedef(
        &self,
        typedef: &'a Statement,
        scope: &Scope<'a, '_>,
        depth: usize,
    ) -> ParserResult<ResolvedType> {
        let file = scope.file;
        let ns = self.ns(self.files[file].module).clone();
        let type_stmt = typedef
            .child("type")
            .ok_or_else(|| self.semantic(file, typedef.line, format!("typedef '{}' has no type", typedef.arg())))?;
        let inner = self.resolve_type(type_stmt, scope, &ns, depth)?;
        let mut type_ = inner.type_;
        type_.typedef = Some(self.qname(&ns, typedef.arg(), file, typedef.line)?);
        let default = match typedef.child("default") {
            Some(d) => {
                self.check_default(&type_, d.arg(), file, d.line, typedef.arg())?;
                Some(d.arg().to_string())
            }
            None => inner.default,
        };
        let units = typedef.child_arg("units").map(str::to_string).or(inner.units);
        Ok(ResolvedType { type_, default, units })
    }

    /// Check a default value against its type.
    ///
    /// Identity references in defaults are written with prefixes that only
    /// make sense in the defining module, so they are not checked here.
    pub(super) fn check_default(
        &self,
        type_: &YangType,
        value: &str,
        file: usize,
        line: usize,
        what: &str,
    ) -> ParserResult<()> {
        if type_.involves_identityref() {
            debug!(node = what, value, "identityref default not checked at link time");
            return Ok(());
        }
        type_
            .parse_lexical(value, &NoIdentities)
            .map(|_| ())
            .map_err(|e| self.semantic(file, line, format!("invalid default {value:?} for '{what}': {e}")))
    }

    fn builtin_base(
        &self,
        name: &str,
        stmt: &'a Statement,
        scope: &Scope<'a, '_>,
        ns: &QNameModule,
        depth: usize,
    ) -> ParserResult<BaseType> {
        let file = scope.file;
        if let Some(kind) = IntKind::from_name(name) {
            return Ok(BaseType::Integer { kind, range: None });
        }
        let base = match name {
            "decimal64" => {
                let fd = stmt
                    .child("fraction-digits")
                    .ok_or_else(|| self.semantic(file, stmt.line, "decimal64 requires fraction-digits"))?;
                let fraction_digits = fd
                    .arg()
                    .parse::<u8>()
                    .ok()
                    .filter(|d| (1..=18).contains(d))
                    .ok_or_else(|| self.semantic(file, fd.line, "fraction-digits must be between 1 and 18"))?;
                BaseType::Decimal64 {
                    fraction_digits,
                    range: None,
                }
            }
            "string" => BaseType::String {
                length: None,
                patterns: Vec::new(),
            },
            "binary" => BaseType::Binary { length: None },
            "boolean" => BaseType::Boolean,
            "empty" => BaseType::Empty,
            "enumeration" => BaseType::Enumeration {
                enums: self.enum_members(stmt, file)?,
            },
            "bits" => BaseType::Bits {
                bits: self.bit_members(stmt, file)?,
            },
            "identityref" => {
                let bases = stmt
                    .children("base")
                    .map(|b| self.resolve_identity(b.arg(), file, b.line))
                    .collect::<ParserResult<Vec<_>>>()?;
                if bases.is_empty() {
                    return Err(self.semantic(file, stmt.line, "identityref requires at least one base"));
                }
                BaseType::IdentityRef { bases }
            }
            "instance-identifier" => BaseType::InstanceIdentifier { require_instance: true },
            "leafref" => {
                let path_stmt = stmt
                    .child("path")
                    .ok_or_else(|| self.semantic(file, stmt.line, "leafref requires a path"))?;
                let path = LeafRefPath::parse(path_stmt.arg(), |prefix, local| {
                    let target_ns = match prefix {
                        None => ns.clone(),
                        Some(p) => match self.files[file].prefixes.get(p) {
                            Some(module) => self.ns(*module).clone(),
                            None => return Err(format!("unknown prefix '{p}'")),
                        },
                    };
                    QName::create(&target_ns, local).map_err(|e| e.to_string())
                })
                .map_err(|m| self.semantic(file, path_stmt.line, m))?;
                BaseType::LeafRef {
                    path,
                    require_instance: true,
                }
            }
            "union" => {
                let members = stmt
                    .children("type")
                    .map(|t| self.resolve_type(t, scope, ns, depth).map(|r| r.type_))
                    .collect::<ParserResult<Vec<_>>>()?;
                if members.is_empty() {
                    return Err(self.semantic(file, stmt.line, "union requires at least one member type"));
                }
                BaseType::Union { members }
            }
            other => return Err(self.unresolved(file, stmt.line, "type", other)),
        };
        Ok(base)
    }

    /// Apply the restriction substatements of `stmt` to `type_`.
    fn restrict(&self, mut type_: YangType, stmt: &'a Statement, file: usize, derived: bool) -> ParserResult<YangType> {
        let invalid = |what: &str, message: String| {
            self.semantic(
                file,
                stmt.line,
                format!("invalid {what} restriction on type '{}': {message}", stmt.arg()),
            )
        };
        let range = stmt.child("range");
        let length = stmt.child("length");
        let patterns: Vec<&Statement> = stmt.children("pattern").collect();

        match &mut type_.base {
            BaseType::Integer { kind, range: current } => {
                if let Some(r) = range {
                    let narrowed = narrow_range(current.as_ref(), r.arg(), kind.min(), kind.max(), None)
                        .map_err(|m| invalid("range", m))?;
                    *current = Some(narrowed);
                }
            }
            BaseType::Decimal64 {
                fraction_digits,
                range: current,
            } => {
                if let Some(r) = range {
                    let narrowed = narrow_range(
                        current.as_ref(),
                        r.arg(),
                        i128::from(i64::MIN),
                        i128::from(i64::MAX),
                        Some(*fraction_digits),
                    )
                    .map_err(|m| invalid("range", m))?;
                    *current = Some(narrowed);
                }
            }
            BaseType::String {
                length: current,
                patterns: current_patterns,
            } => {
                if let Some(l) = length {
                    *current = Some(narrow_length(current.as_ref(), l.arg()).map_err(|m| invalid("length", m))?);
                }
                for p in &patterns {
                    let invert = p.child_arg("modifier") == Some("invert-match");
                    let pattern = PatternConstraint::new(p.arg(), invert).map_err(|m| invalid("pattern", m))?;
                    current_patterns.push(pattern);
                }
            }
            BaseType::Binary { length: current } => {
                if let Some(l) = length {
                    *current = Some(narrow_length(current.as_ref(), l.arg()).map_err(|m| invalid("length", m))?);
                }
            }
            BaseType::Enumeration { enums } if derived && stmt.child("enum").is_some() => {
                let restricted = self.restrict_enums(enums, stmt, file)?;
                *enums = restricted;
            }
            BaseType::Bits { bits } if derived && stmt.child("bit").is_some() => {
                let restricted = self.restrict_bits(bits, stmt, file)?;
                *bits = restricted;
            }
            BaseType::InstanceIdentifier { require_instance } | BaseType::LeafRef { require_instance, .. } => {
                if let Some(r) = stmt.child("require-instance") {
                    *require_instance = self.parse_bool(r, file)?;
                }
            }
            _ => {}
        }

        let base = &type_.base;
        if range.is_some() && !matches!(base, BaseType::Integer { .. } | BaseType::Decimal64 { .. }) {
            return Err(invalid("range", format!("not applicable to {}", base.name())));
        }
        if length.is_some() && !matches!(base, BaseType::String { .. } | BaseType::Binary { .. }) {
            return Err(invalid("length", format!("not applicable to {}", base.name())));
        }
        if !patterns.is_empty() && !matches!(base, BaseType::String { .. }) {
            return Err(invalid("pattern", format!("not applicable to {}", base.name())));
        }
        if derived && (stmt.child("path").is_some() || stmt.child("base").is_some()) {
            return Err(invalid("type", "path and base may only be given on the built-in type".to_string()));
        }
        Ok(type_)
    }

    fn enum_members(&self, stmt: &'a Statement, file: usize) -> ParserResult<Vec<EnumMember>> {
        let mut members: Vec<EnumMember> = Vec::new();
        let mut next: i64 = 0;
        for e in stmt.children("enum") {
            if !self.if_features_satisfied(e, file)? {
                continue;
            }
            let name = e.arg();
            if name.is_empty() || name.trim() != name {
                return Err(self.semantic(file, e.line, format!("invalid enum name {name:?}")));
            }
            if members.iter().any(|m| m.name == name) {
                return Err(self.semantic(file, e.line, format!("enum '{name}' is declared twice")));
            }
            let value = match e.child("value") {
                Some(v) => v
                    .arg()
                    .parse::<i32>()
                    .map_err(|_| self.semantic(file, v.line, format!("invalid enum value '{}'", v.arg())))?,
                None => i32::try_from(next)
                    .map_err(|_| self.semantic(file, e.line, format!("enum '{name}' needs an explicit value")))?,
            };
            if members.iter().any(|m| m.value == value) {
                return Err(self.semantic(file, e.line, format!("enum value {value} is used twice")));
            }
            next = next.max(i64::from(value) + 1);
            members.push(EnumMember {
                name: name.to_string(),
                value,
                description: e.child_arg("description").map(str::to_string),
            });
        }
        if members.is_empty() {
            return Err(self.semantic(file, stmt.line, "enumeration requires at least one enum"));
        }
        Ok(members)
    }

    fn bit_members(&self, stmt: &'a Statement, file: usize) -> ParserResult<Vec<BitMember>> {
        let mut members: Vec<BitMember> = Vec::new();
        let mut next: u64 = 0;
        for b in stmt.children("bit") {
            if !self.if_features_satisfied(b, file)? {
                continue;
            }
            let name = b.arg();
            if members.iter().any(|m| m.name == name) {
                return Err(self.semantic(file, b.line, format!("bit '{name}' is declared twice")));
            }
            let position = match b.child("position") {
                Some(p) => p
                    .arg()
                    .parse::<u32>()
                    .map_err(|_| self.semantic(file, p.line, format!("invalid bit position '{}'", p.arg())))?,
                None => u32::try_from(next)
                    .map_err(|_| self.semantic(file, b.line, format!("bit '{name}' needs an explicit position")))?,
            };
            if members.iter().any(|m| m.position == position) {
                return Err(self.semantic(file, b.line, format!("bit position {position} is used twice")));
            }
            next = next.max(u64::from(position) + 1);
            members.push(BitMember {
                name: name.to_string(),
                position,
                description: b.child_arg("description").map(str::to_string),
            });
        }
        if members.is_empty() {
            return Err(self.semantic(file, stmt.line, "bits requires at least one bit"));
        }
        Ok(members)
    }

    fn restrict_enums(&self, base: &[EnumMember], stmt: &Statement, file: usize) -> ParserResult<Vec<EnumMember>> {
        let mut out = Vec::new();
        for e in stmt.children("enum") {
            let member = base
                .iter()
                .find(|m| m.name == e.arg())
                .ok_or_else(|| self.semantic(file, e.line, format!("enum '{}' is not in the base type", e.arg())))?;
            if let Some(v) = e.child("value") {
                if v.arg().parse::<i32>().ok() != Some(member.value) {
                    return Err(self.semantic(file, v.line, format!("enum '{}' cannot change its value", e.arg())));
                }
            }
            out.push(member.clone());
        }
        Ok(out)
    }

    fn restrict_bits(&self, base: &[BitMember], stmt: &Statement, file: usize) -> ParserResult<Vec<BitMember>> {
        let mut out = Vec::new();
        for b in stmt.children("bit") {
            let member = base
                .iter()
                .find(|m| m.name == b.arg())
                .ok_or_else(|| self.semantic(file, b.line, format!("bit '{}' is not in the base type", b.arg())))?;
            if let Some(p) = b.child("position") {
                if p.arg().parse::<u32>().ok() != Some(member.position) {
                    return Err(self.semantic(file, p.line, format!("bit '{}' cannot change its position", b.arg())));
                }
            }
            out.push(member.clone());
        }
        Ok(out)
    }
}

/// Parse `text` as a range inside `current` (or the type's own bounds).
fn narrow_range(
    current: Option<&RangeConstraint>,
    text: &str,
    type_lo: i128,
    type_hi: i128,
    fraction_digits: Option<u8>,
) -> Result<RangeConstraint, String> {
    let (lo, hi) = match current {
        Some(c) => (
            c.intervals.first().map_or(type_lo, |i| i.0),
            c.intervals.last().map_or(type_hi, |i| i.1),
        ),
        None => (type_lo, type_hi),
    };
    let narrowed = RangeConstraint::parse(text, lo, hi, fraction_digits)?;
    if let Some(c) = current {
        for (a, b) in &narrowed.intervals {
            if !c.intervals.iter().any(|(x, y)| x <= a && b <= y) {
                return Err(format!("{a}..{b} is outside the base range \"{}\"", c.text));
            }
        }
    }
    Ok(narrowed)
}

fn narrow_length(current: Option<&LengthConstraint>, text: &str) -> Result<LengthConstraint, String> {
    let Some(c) = current else {
        return LengthConstraint::parse(text);
    };
    // `min`/`max` refer to the base restriction, not the octet range.
    let lo = c.intervals.first().map_or(0, |i| i.0).to_string();
    let hi = c.intervals.last().map_or(u64::MAX, |i| i.1).to_string();
    let substituted = text
        .split('|')
        .map(|part| {
            part.split("..")
                .map(|bound| match bound.trim() {
                    "min" => lo.as_str(),
                    "max" => hi.as_str(),
                    other => other,
                })
                .collect::<Vec<_>>()
                .join("..")
        })
        .collect::<Vec<_>>()
        .join("|");
    let narrowed = LengthConstraint::parse(&substituted)?;
    for (a, b) in &narrowed.intervals {
        if !c.intervals.iter().any(|(x, y)| x <= a && b <= y) {
            return Err(format!("{a}..{b} is outside the base length \"{}\"", c.text));
        }
    }
    Ok(LengthConstraint {
        intervals: narrowed.intervals,
        text: text.to_string(),
    })
}
