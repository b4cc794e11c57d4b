//! Required-field contracts and type coercion
//!
//! Each entity type declares the fields it requires, the aliases upstream
//! feeds use for them (`npi`, `ndc`, `id`), and the kind of value expected.
//! The coercion helpers turn raw JSON-like values into domain types.

use super::violation::Violation;
use crate::domain::{EntityType, RawRecord};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// Kind of value a field must coerce to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Identifier,
    Text,
    Quantity,
    Price,
    Timestamp,
}

impl FieldKind {
    /// Human-readable description used in type-mismatch violations
    pub fn expected(&self) -> &'static str {
        match self {
            FieldKind::Identifier => "identifier",
            FieldKind::Text => "text",
            FieldKind::Quantity => "non-negative integer",
            FieldKind::Price => "non-negative decimal",
            FieldKind::Timestamp => "datetime",
        }
    }
}

/// A required field of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Canonical field name
    pub name: &'static str,
    /// Alternative names accepted from source files
    pub aliases: &'static [&'static str],
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn new(name: &'static str, aliases: &'static [&'static str], kind: FieldKind) -> Self {
        Self {
            name,
            aliases,
            kind,
        }
    }

    /// Look the field up by canonical name, then by alias
    ///
    /// Returns the first candidate holding a present value.
    pub fn lookup<'a>(&self, raw: &'a RawRecord) -> Option<&'a Value> {
        std::iter::once(self.name)
            .chain(self.aliases.iter().copied())
            .filter_map(|name| raw.get(name))
            .find(|value| is_present(value))
    }

    fn mismatch(&self) -> Violation {
        Violation::TypeMismatch {
            field: self.name,
            expected: self.kind.expected(),
        }
    }
}

pub const PHARMACY_ID: FieldSpec = FieldSpec::new("pharmacy_id", &["npi"], FieldKind::Identifier);
pub const CHAIN: FieldSpec = FieldSpec::new("chain", &[], FieldKind::Text);

pub const CLAIM_ID: FieldSpec = FieldSpec::new("claim_id", &["id"], FieldKind::Identifier);
pub const CLAIM_PHARMACY_ID: FieldSpec = PHARMACY_ID;
pub const DRUG_PRODUCT_ID: FieldSpec =
    FieldSpec::new("drug_product_id", &["ndc"], FieldKind::Identifier);
pub const QUANTITY: FieldSpec = FieldSpec::new("quantity", &[], FieldKind::Quantity);
pub const PRICE: FieldSpec = FieldSpec::new("price", &[], FieldKind::Price);
pub const TIMESTAMP: FieldSpec = FieldSpec::new("timestamp", &[], FieldKind::Timestamp);

pub const REVERT_ID: FieldSpec = FieldSpec::new("revert_id", &["id"], FieldKind::Identifier);
pub const REVERT_CLAIM_ID: FieldSpec = FieldSpec::new("claim_id", &[], FieldKind::Identifier);

const PHARMACY_FIELDS: [FieldSpec; 2] = [PHARMACY_ID, CHAIN];
const CLAIM_FIELDS: [FieldSpec; 6] = [
    CLAIM_ID,
    CLAIM_PHARMACY_ID,
    DRUG_PRODUCT_ID,
    QUANTITY,
    PRICE,
    TIMESTAMP,
];
const REVERT_FIELDS: [FieldSpec; 3] = [REVERT_ID, REVERT_CLAIM_ID, TIMESTAMP];

/// Required fields of `entity_type`, in reporting order
pub fn required_fields(entity_type: EntityType) -> &'static [FieldSpec] {
    match entity_type {
        EntityType::Pharmacy => &PHARMACY_FIELDS,
        EntityType::Claim => &CLAIM_FIELDS,
        EntityType::Revert => &REVERT_FIELDS,
    }
}

/// Null and blank strings count as absent
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

/// Rule 1: every required field is present
pub fn check_presence(raw: &RawRecord, entity_type: EntityType) -> Result<(), Vec<Violation>> {
    let missing: Vec<Violation> = required_fields(entity_type)
        .iter()
        .filter(|spec| spec.lookup(raw).is_none())
        .map(|spec| Violation::MissingField(spec.name))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(missing)
    }
}

fn present<'a>(raw: &'a RawRecord, spec: &FieldSpec) -> Result<&'a Value, Violation> {
    spec.lookup(raw).ok_or(Violation::MissingField(spec.name))
}

/// Coerce an identifier: trimmed string, or an integral number rendered in decimal
pub fn identifier<T: FromStr>(raw: &RawRecord, spec: &FieldSpec) -> Result<T, Violation> {
    let value = present(raw, spec)?;
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => number_text(n).ok_or_else(|| spec.mismatch())?,
        _ => return Err(spec.mismatch()),
    };
    T::from_str(&text).map_err(|_| spec.mismatch())
}

/// Coerce free text (strings, or numbers rendered as text)
pub fn text(raw: &RawRecord, spec: &FieldSpec) -> Result<String, Violation> {
    match present(raw, spec)? {
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(spec.mismatch()),
    }
}

/// Coerce a non-negative integer quantity
///
/// Integral floats (`30.0`) are accepted since upstream exports write
/// quantities that way.
pub fn quantity(raw: &RawRecord, spec: &FieldSpec) -> Result<u64, Violation> {
    let parsed = match present(raw, spec)? {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(integral_u64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral_u64))
        }
        _ => None,
    };
    parsed.ok_or_else(|| spec.mismatch())
}

/// Coerce a non-negative exact decimal price
pub fn price(raw: &RawRecord, spec: &FieldSpec) -> Result<Decimal, Violation> {
    let parsed = match present(raw, spec)? {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s.trim()),
        _ => None,
    };
    match parsed {
        Some(d) if !d.is_sign_negative() || d.is_zero() => Ok(d.normalize()),
        _ => Err(spec.mismatch()),
    }
}

/// Coerce a timestamp; naive values are taken as UTC
pub fn timestamp(raw: &RawRecord, spec: &FieldSpec) -> Result<DateTime<Utc>, Violation> {
    match present(raw, spec)? {
        Value::String(s) => parse_timestamp(s.trim()).ok_or_else(|| spec.mismatch()),
        _ => Err(spec.mismatch()),
    }
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse RFC 3339, common naive datetime layouts, or a bare date
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

fn integral_u64(f: f64) -> Option<u64> {
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 {
        Some(f as u64)
    } else {
        None
    }
}

fn number_text(n: &serde_json::Number) -> Option<String> {
    if let Some(u) = n.as_u64() {
        return Some(u.to_string());
    }
    if let Some(i) = n.as_i64() {
        return Some(i.to_string());
    }
    n.as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| format!("{f:.0}"))
}
