//! The integrity checker: walks a parsed [`Database`] and emits diagnostics
//! for every descriptor directive violation.

use std::collections::{HashMap, HashSet};

use rec_core::{Database, Diagnostic, Record};
use rec_parser::{eval_bool, EvalContext};

use crate::schema::{FieldType, Schema};

/// Checks every non-anonymous record set of `database` against its
/// descriptor, returning the accumulated diagnostics. The check succeeds iff
/// none of the returned diagnostics has [`rec_core::Severity::Error`].
pub fn check(database: &Database) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for record_set in &database.record_sets {
        let Some(descriptor) = &record_set.descriptor else {
            continue;
        };
        let (schema, schema_diags) = Schema::compile(descriptor);
        diagnostics.extend(schema_diags);
        check_record_set(&schema, &record_set.records, &mut diagnostics);
    }
    diagnostics
}

fn check_record_set(schema: &Schema, records: &[Record], diagnostics: &mut Vec<Diagnostic>) {
    let rec_type = schema.rec_type.clone();
    let tag = |mut d: Diagnostic| {
        if let Some(t) = &rec_type {
            d = d.with_record_type(t.clone());
        }
        d
    };

    for (index, record) in records.iter().enumerate() {
        for field in &schema.mandatory {
            if !record.has_field(field) {
                diagnostics.push(
                    tag(Diagnostic::error(format!("record is missing mandatory field {}", field)))
                        .with_record_index(index)
                        .with_field_name(field.clone()),
                );
            }
        }

        for field in &schema.prohibit {
            if record.has_field(field) {
                diagnostics.push(
                    tag(Diagnostic::error(format!("field {} is prohibited", field)))
                        .with_record_index(index)
                        .with_field_name(field.clone()),
                );
            }
        }

        if schema.has_allowed {
            let allowed_set: HashSet<&str> = schema.allowed_set().into_iter().collect();
            for name in record.field_names() {
                if !allowed_set.contains(name) {
                    diagnostics.push(
                        tag(Diagnostic::error(format!("field {} is not in allowed list", name)))
                            .with_record_index(index)
                            .with_field_name(name.to_string()),
                    );
                }
            }
        }

        for field in &schema.unique {
            if record.get_field_count(field) > 1 {
                diagnostics.push(
                    tag(Diagnostic::error(format!("field {} must be unique within record", field)))
                        .with_record_index(index)
                        .with_field_name(field.clone()),
                );
            }
        }

        for constraint in &schema.constraints {
            let ctx = EvalContext::new(record);
            if !eval_bool(constraint, &ctx) {
                diagnostics.push(
                    tag(Diagnostic::error("constraint violated")).with_record_index(index),
                );
            }
        }

        for (field_name, field_type) in &schema.types {
            for value in record.get_fields(field_name) {
                if let Some(message) = validate_type(value, field_type) {
                    diagnostics.push(
                        tag(Diagnostic::error(message))
                            .with_record_index(index)
                            .with_field_name(field_name.clone()),
                    );
                }
            }
        }

        if let Some(key) = &schema.key {
            match record.get_field(key) {
                None | Some("") => diagnostics.push(
                    tag(Diagnostic::error(format!("record is missing key field {}", key)))
                        .with_record_index(index)
                        .with_field_name(key.clone()),
                ),
                Some(_) => {}
            }
        }
    }

    if let Some(key) = &schema.key {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (index, record) in records.iter().enumerate() {
            if let Some(value) = record.get_field(key) {
                if value.is_empty() {
                    continue;
                }
                if seen.contains_key(value) {
                    diagnostics.push(
                        tag(Diagnostic::error("duplicate key"))
                            .with_record_index(index)
                            .with_field_name(key.clone()),
                    );
                } else {
                    seen.insert(value, index);
                }
            }
        }
    }

    for field in &schema.singular {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (index, record) in records.iter().enumerate() {
            if let Some(value) = record.get_field(field) {
                if seen.contains_key(value) {
                    diagnostics.push(
                        tag(Diagnostic::error("singular constraint violated"))
                            .with_record_index(index)
                            .with_field_name(field.clone()),
                    );
                } else {
                    seen.insert(value, index);
                }
            }
        }
    }

    if let Some(size) = &schema.size {
        if !size.is_satisfied_by(records.len()) {
            diagnostics.push(tag(Diagnostic::error(format!(
                "record set size {} violates %size constraint (expected {:?} {})",
                records.len(),
                size.op,
                size.n
            ))));
        }
    }

    for field in &schema.confidential {
        for (index, record) in records.iter().enumerate() {
            if let Some(value) = record.get_field(field) {
                if !value.starts_with("encrypted-") {
                    diagnostics.push(
                        tag(Diagnostic::error(format!("confidential field {} is not encrypted", field)))
                            .with_record_index(index)
                            .with_field_name(field.clone()),
                    );
                }
            }
        }
    }
}

fn validate_type(value: &str, ty: &FieldType) -> Option<String> {
    match ty {
        FieldType::Int => (!is_integer(value)).then(|| "expected integer".to_string()),
        FieldType::Real => (!is_real(value)).then(|| "expected real number".to_string()),
        FieldType::Range { low, high } => match value.parse::<i64>() {
            Err(_) => Some("expected integer".to_string()),
            Ok(n) => {
                let in_range = match high {
                    Some(high) => n >= *low && n <= *high,
                    None => n >= 0 && n <= *low,
                };
                (!in_range).then(|| "value out of range".to_string())
            }
        },
        FieldType::Line => value.contains('\n').then(|| "value must be a single line".to_string()),
        FieldType::Bool => {
            let valid = matches!(value, "yes" | "no" | "true" | "false" | "0" | "1");
            (!valid).then(|| "expected boolean value (yes/no/true/false/0/1)".to_string())
        }
        FieldType::Enum(values) => (!values.iter().any(|v| v == value))
            .then(|| format!("value {} not in enum {}", value, values.join(" "))),
        FieldType::Email => (!is_email(value)).then(|| "invalid email address".to_string()),
        FieldType::Uuid => (!is_uuid(value)).then(|| "invalid uuid".to_string()),
        FieldType::Date => (!is_date(value)).then(|| "invalid date".to_string()),
        FieldType::Regexp(pattern) => match regex::Regex::new(pattern) {
            Ok(re) => (!re.is_match(value)).then(|| "value does not match pattern".to_string()),
            Err(_) => Some("invalid %type regexp pattern".to_string()),
        },
        FieldType::Size(n) => (value.chars().count() as i64 != *n).then(|| "value length out of range".to_string()),
        FieldType::Field => None,
    }
}

fn is_integer(value: &str) -> bool {
    let value = value.strip_prefix('-').unwrap_or(value);
    if let Some(hex) = value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        return !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit());
    }
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

fn is_real(value: &str) -> bool {
    is_integer(value) || value.parse::<f64>().is_ok()
}

fn is_email(value: &str) -> bool {
    regex::Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
        .map(|re| re.is_match(value))
        .unwrap_or(false)
}

fn is_uuid(value: &str) -> bool {
    regex::Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .map(|re| re.is_match(value))
        .unwrap_or(false)
}

fn is_date(value: &str) -> bool {
    crate::transform::try_parse_date(value).is_some()
}
