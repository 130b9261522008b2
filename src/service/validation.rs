//! Request schema and validation for resource bodies and ids.

use crate::config::{ResourceDef, ValueKind};
use crate::error::AppError;
use crate::store::FieldValue;
use serde::Deserialize;
use serde_json::Value;

/// A scalar body field. Clients may send numbers as JSON numbers or as strings.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl Scalar {
    /// Empty string, zero and false count as not supplied.
    fn is_blank(&self) -> bool {
        match self {
            Scalar::Bool(b) => !b,
            Scalar::Number(n) => n.as_f64() == Some(0.0),
            Scalar::Text(s) => s.is_empty(),
        }
    }

    /// Numeric reading of the field, with JavaScript `Number()` coercion: whitespace-only text reads
    /// as zero, booleans as 0/1, and text may be a decimal, `Infinity`, or a `0x`/`0o`/`0b` literal.
    fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Scalar::Number(n) => n.as_f64(),
            Scalar::Text(s) => parse_js_number(s.trim()),
        }
    }

    fn as_integer(&self) -> Option<i64> {
        match self {
            Scalar::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
            Scalar::Text(s) => s.trim().parse::<i64>().ok().or_else(|| self.as_number().and_then(integral)),
            Scalar::Bool(_) => self.as_number().and_then(integral),
        }
    }
}

fn parse_js_number(t: &str) -> Option<f64> {
    if t.is_empty() {
        return Some(0.0);
    }
    match t {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    let radix = match t.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &t[2..];
        if !digits.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return None;
        }
        return u64::from_str_radix(digits, radix).ok().map(|n| n as f64);
    }
    if !t.bytes().all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'-' | b'+' | b'e' | b'E')) {
        return None;
    }
    t.parse::<f64>().ok()
}

fn integral(n: f64) -> Option<i64> {
    (n.fract() == 0.0 && n.abs() < i64::MAX as f64).then_some(n as i64)
}

/// Body of POST and PUT: `name` plus the resource's value field (`taxId` or `price`). Null counts as absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResourceInput {
    pub name: Option<Scalar>,
    pub value: Option<Scalar>,
}

impl ResourceInput {
    pub fn from_json(def: &ResourceDef, body: Value) -> Result<Self, AppError> {
        let Value::Object(mut map) = body else {
            return Err(AppError::BadRequest("body must be a JSON object".into()));
        };
        Ok(ResourceInput {
            name: take_scalar(&mut map, "name")?,
            value: take_scalar(&mut map, def.value_field)?,
        })
    }
}

fn take_scalar(map: &mut serde_json::Map<String, Value>, field: &str) -> Result<Option<Scalar>, AppError> {
    match map.remove(field) {
        None => Ok(None),
        Some(v) => serde_json::from_value::<Option<Scalar>>(v)
            .map_err(|_| AppError::BadRequest(format!("{} must be a string or a number", field))),
    }
}

/// Fields that passed validation. On create both are set.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidFields {
    pub name: Option<String>,
    pub value: Option<FieldValue>,
}

/// All fields required: name non-empty and not numeric, value non-empty and numeric.
pub fn validate_create(def: &ResourceDef, input: &ResourceInput) -> Result<(String, FieldValue), AppError> {
    let name = input
        .name
        .as_ref()
        .filter(|n| !n.is_blank())
        .ok_or_else(|| AppError::BadRequest("name is required".into()))?;
    let value = input
        .value
        .as_ref()
        .filter(|v| !v.is_blank())
        .ok_or_else(|| AppError::BadRequest(format!("{} is required", def.value_field)))?;
    Ok((check_name(name)?, check_value(def, value)?))
}

/// Only supplied fields are checked, but at least one must be supplied.
pub fn validate_update(def: &ResourceDef, input: &ResourceInput) -> Result<ValidFields, AppError> {
    if input.name.is_none() && input.value.is_none() {
        return Err(AppError::BadRequest(format!(
            "provide name and/or {} to update",
            def.value_field
        )));
    }
    let name = match &input.name {
        Some(n) if n.is_blank() => return Err(AppError::BadRequest("name must not be empty".into())),
        Some(n) => Some(check_name(n)?),
        None => None,
    };
    let value = match &input.value {
        Some(v) if v.is_blank() => {
            return Err(AppError::BadRequest(format!("{} must not be empty", def.value_field)))
        }
        Some(v) => Some(check_value(def, v)?),
        None => None,
    };
    Ok(ValidFields { name, value })
}

fn check_name(name: &Scalar) -> Result<String, AppError> {
    match name {
        Scalar::Text(s) if name.as_number().is_none() => Ok(s.clone()),
        _ => Err(AppError::BadRequest("name must not be numeric".into())),
    }
}

fn check_value(def: &ResourceDef, value: &Scalar) -> Result<FieldValue, AppError> {
    let n = value
        .as_number()
        .ok_or_else(|| AppError::BadRequest(format!("{} must be numeric", def.value_field)))?;
    match def.value_kind {
        ValueKind::Decimal if n.is_finite() => Ok(FieldValue::Decimal(n)),
        ValueKind::Decimal => Err(AppError::BadRequest(format!("{} must be a finite number", def.value_field))),
        ValueKind::Integer => value
            .as_integer()
            .map(FieldValue::Integer)
            .ok_or_else(|| AppError::BadRequest(format!("{} must be an integer", def.value_field))),
    }
}

/// Parse a path id: any non-zero integer. Ids that cannot exist still reach the not-found path.
pub fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|n| *n != 0)
        .ok_or_else(|| AppError::BadRequest("provide a valid identifier".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CUSTOMERS, PRODUCTS};
    use serde_json::json;

    fn input(def: &ResourceDef, body: Value) -> ResourceInput {
        ResourceInput::from_json(def, body).unwrap()
    }

    fn is_bad_request<T>(r: Result<T, AppError>) -> bool {
        matches!(r, Err(AppError::BadRequest(_)))
    }

    #[test]
    fn create_accepts_numbers_and_numeric_strings() {
        let (name, value) = validate_create(&PRODUCTS, &input(&PRODUCTS, json!({"name": "Keyboard", "price": 126.25}))).unwrap();
        assert_eq!(name, "Keyboard");
        assert_eq!(value, FieldValue::Decimal(126.25));

        let (_, value) = validate_create(&CUSTOMERS, &input(&CUSTOMERS, json!({"name": "Ana", "taxId": "12345678901"}))).unwrap();
        assert_eq!(value, FieldValue::Integer(12345678901));
    }

    #[test]
    fn create_rejects_missing_or_empty_fields() {
        assert!(is_bad_request(validate_create(&PRODUCTS, &input(&PRODUCTS, json!({"price": 1})))));
        assert!(is_bad_request(validate_create(&PRODUCTS, &input(&PRODUCTS, json!({"name": "", "price": 1})))));
        assert!(is_bad_request(validate_create(&PRODUCTS, &input(&PRODUCTS, json!({"name": "Mouse"})))));
        assert!(is_bad_request(validate_create(&PRODUCTS, &input(&PRODUCTS, json!({"name": "Mouse", "price": null})))));
        assert!(is_bad_request(validate_create(&PRODUCTS, &input(&PRODUCTS, json!({"name": "Mouse", "price": 0})))));
    }

    #[test]
    fn create_rejects_numeric_names_and_non_numeric_values() {
        assert!(is_bad_request(validate_create(&PRODUCTS, &input(&PRODUCTS, json!({"name": "123", "price": 5})))));
        assert!(is_bad_request(validate_create(&PRODUCTS, &input(&PRODUCTS, json!({"name": 42, "price": 5})))));
        assert!(is_bad_request(validate_create(&PRODUCTS, &input(&PRODUCTS, json!({"name": "Mouse", "price": "cheap"})))));
        assert!(is_bad_request(validate_create(&CUSTOMERS, &input(&CUSTOMERS, json!({"name": "Ana", "taxId": "12.5"})))));
    }

    #[test]
    fn numeric_literals_follow_number_coercion() {
        for name in ["Infinity", "0x1F", "0b1", "-Infinity"] {
            let body = input(&PRODUCTS, json!({"name": name, "price": 5}));
            assert!(is_bad_request(validate_create(&PRODUCTS, &body)), "name {}", name);
        }
        let (_, value) = validate_create(&CUSTOMERS, &input(&CUSTOMERS, json!({"name": "Ana", "taxId": "0x1F"}))).unwrap();
        assert_eq!(value, FieldValue::Integer(31));
        let (_, value) = validate_create(&PRODUCTS, &input(&PRODUCTS, json!({"name": "Cable", "price": "0b101"}))).unwrap();
        assert_eq!(value, FieldValue::Decimal(5.0));
    }

    #[test]
    fn infinite_prices_are_rejected() {
        let body = input(&PRODUCTS, json!({"name": "Cable", "price": "Infinity"}));
        assert!(is_bad_request(validate_create(&PRODUCTS, &body)));
    }

    #[test]
    fn whitespace_name_reads_as_numeric() {
        assert!(is_bad_request(validate_create(&PRODUCTS, &input(&PRODUCTS, json!({"name": "   ", "price": 5})))));
    }

    #[test]
    fn non_scalar_fields_are_bad_requests() {
        assert!(is_bad_request(ResourceInput::from_json(&PRODUCTS, json!({"name": ["a"], "price": 1}))));
        assert!(is_bad_request(ResourceInput::from_json(&PRODUCTS, json!([1, 2]))));
    }

    #[test]
    fn update_checks_only_supplied_fields() {
        let fields = validate_update(&PRODUCTS, &input(&PRODUCTS, json!({"price": 99.90}))).unwrap();
        assert_eq!(fields, ValidFields { name: None, value: Some(FieldValue::Decimal(99.90)) });

        let fields = validate_update(&CUSTOMERS, &input(&CUSTOMERS, json!({"name": "Bia"}))).unwrap();
        assert_eq!(fields.name.as_deref(), Some("Bia"));
        assert!(fields.value.is_none());
    }

    #[test]
    fn update_requires_at_least_one_valid_field() {
        assert!(is_bad_request(validate_update(&PRODUCTS, &input(&PRODUCTS, json!({})))));
        assert!(is_bad_request(validate_update(&PRODUCTS, &input(&PRODUCTS, json!({"other": 1})))));
        assert!(is_bad_request(validate_update(&PRODUCTS, &input(&PRODUCTS, json!({"name": ""})))));
        assert!(is_bad_request(validate_update(&PRODUCTS, &input(&PRODUCTS, json!({"name": "7"})))));
        assert!(is_bad_request(validate_update(&PRODUCTS, &input(&PRODUCTS, json!({"price": "abc"})))));
    }

    #[test]
    fn ids_must_be_non_zero_integers() {
        assert_eq!(parse_id("7").unwrap(), 7);
        assert_eq!(parse_id(" 12 ").unwrap(), 12);
        assert_eq!(parse_id("-3").unwrap(), -3);
        assert!(is_bad_request(parse_id("0")));
        assert!(is_bad_request(parse_id("1.5")));
        assert!(is_bad_request(parse_id("abc")));
    }
}
