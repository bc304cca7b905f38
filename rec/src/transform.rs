//! The derived-transform engine: sort, auto-field generation, and
//! confidential-field encryption/decryption.

use chrono::NaiveDateTime;
use rand::RngCore;
use rec_core::{Database, Diagnostic, Field, Record, RecordSet};
use uuid::Uuid;

use crate::schema::{FieldType, Schema};

/// Applies `%sort` (or an explicit field list) to every descriptored record
/// set of `database`, returning a new database. Record sets with no
/// applicable sort fields are left untouched.
pub fn sort_database(database: Database) -> Database {
    let record_sets = database
        .record_sets
        .into_iter()
        .map(|rs| match &rs.descriptor {
            Some(descriptor) => {
                let (schema, _) = Schema::compile(descriptor);
                sort_record_set(rs, &schema.sort, &schema)
            }
            None => rs,
        })
        .collect();
    Database::from_record_sets(record_sets)
}

/// Sorts `rs.records` by `sort_fields`, stably, falling back to a no-op when
/// `sort_fields` is empty.
pub fn sort_record_set(mut rs: RecordSet, sort_fields: &[String], schema: &Schema) -> RecordSet {
    if sort_fields.is_empty() {
        return rs;
    }
    rs.records.sort_by(|a, b| {
        for field in sort_fields {
            let va = a.get_field(field).unwrap_or("");
            let vb = b.get_field(field).unwrap_or("");
            let ordering = match schema.types.get(field) {
                Some(FieldType::Int) | Some(FieldType::Real) | Some(FieldType::Range { .. }) => {
                    match (va.parse::<f64>(), vb.parse::<f64>()) {
                        (Ok(na), Ok(nb)) => na.partial_cmp(&nb).unwrap_or(std::cmp::Ordering::Equal),
                        _ => va.cmp(vb),
                    }
                }
                _ => va.cmp(vb),
            };
            if ordering != std::cmp::Ordering::Equal {
                return ordering;
            }
        }
        std::cmp::Ordering::Equal
    });
    rs
}

/// Fills in `%auto` fields for every descriptored record set, using `rng` for
/// UUID generation.
pub fn auto_database(database: Database, rng: &mut impl RngCore) -> Database {
    let record_sets = database
        .record_sets
        .into_iter()
        .map(|rs| match &rs.descriptor {
            Some(descriptor) => {
                let (schema, _) = Schema::compile(descriptor);
                auto_record_set(rs, &schema, rng)
            }
            None => rs,
        })
        .collect();
    Database::from_record_sets(record_sets)
}

fn auto_record_set(mut rs: RecordSet, schema: &Schema, rng: &mut impl RngCore) -> RecordSet {
    for field_name in &schema.auto {
        let is_counter = matches!(
            schema.types.get(field_name),
            None | Some(FieldType::Int) | Some(FieldType::Range { .. })
        );
        if is_counter {
            let mut counter = rs
                .records
                .iter()
                .filter_map(|r| r.get_field(field_name))
                .filter_map(|v| v.parse::<i64>().ok())
                .max()
                .unwrap_or(-1);
            for record in &mut rs.records {
                if !record.has_field(field_name) {
                    counter += 1;
                    record.push(Field::new(field_name.clone(), counter.to_string()));
                }
            }
        } else if matches!(schema.types.get(field_name), Some(FieldType::Uuid)) {
            for record in &mut rs.records {
                if !record.has_field(field_name) {
                    let bytes = random_bytes(rng);
                    let uuid = uuid::Builder::from_random_bytes(bytes).into_uuid();
                    record.push(Field::new(field_name.clone(), uuid.to_string()));
                }
            }
        } else if matches!(schema.types.get(field_name), Some(FieldType::Date)) {
            let now = chrono::Utc::now().naive_utc().format("%Y-%m-%dT%H:%M:%S").to_string();
            for record in &mut rs.records {
                if !record.has_field(field_name) {
                    record.push(Field::new(field_name.clone(), now.clone()));
                }
            }
        }
    }
    rs
}

fn random_bytes(rng: &mut impl RngCore) -> [u8; 16] {
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    bytes
}

/// Encrypts every `%confidential` field of every descriptored record set not
/// already starting with `encrypted-` (re-encrypting those only if `force`),
/// reporting a diagnostic for missing passwords or already-encrypted values.
pub fn encrypt_database(database: Database, password: Option<&str>, force: bool) -> (Database, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let record_sets = database
        .record_sets
        .into_iter()
        .map(|rs| match &rs.descriptor {
            Some(descriptor) => {
                let (schema, _) = Schema::compile(descriptor);
                encrypt_record_set(rs, &schema, password, force, &mut diagnostics)
            }
            None => rs,
        })
        .collect();
    (Database::from_record_sets(record_sets), diagnostics)
}

fn encrypt_record_set(
    mut rs: RecordSet,
    schema: &Schema,
    password: Option<&str>,
    force: bool,
    diagnostics: &mut Vec<Diagnostic>,
) -> RecordSet {
    for field_name in &schema.confidential {
        let Some(password) = password else {
            diagnostics.push(Diagnostic::error("password required"));
            continue;
        };
        for record in &mut rs.records {
            for field in &mut record.fields {
                if field.name != *field_name {
                    continue;
                }
                if field.value.starts_with("encrypted-") {
                    if force {
                        let plain = decrypt_value(&field.value["encrypted-".len()..], password)
                            .unwrap_or_else(|| field.value.clone());
                        field.value = format!("encrypted-{}", encrypt_value(&plain, password));
                    } else {
                        diagnostics.push(Diagnostic::error("already encrypted").with_field_name(field_name.clone()));
                    }
                } else {
                    field.value = format!("encrypted-{}", encrypt_value(&field.value, password));
                }
            }
        }
    }
    rs
}

/// Decrypts every `%confidential` field's `encrypted-`-prefixed value.
pub fn decrypt_database(database: Database, password: Option<&str>) -> (Database, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let record_sets = database
        .record_sets
        .into_iter()
        .map(|rs| match &rs.descriptor {
            Some(descriptor) => {
                let (schema, _) = Schema::compile(descriptor);
                decrypt_record_set(rs, &schema, password, &mut diagnostics)
            }
            None => rs,
        })
        .collect();
    (Database::from_record_sets(record_sets), diagnostics)
}

fn decrypt_record_set(
    mut rs: RecordSet,
    schema: &Schema,
    password: Option<&str>,
    diagnostics: &mut Vec<Diagnostic>,
) -> RecordSet {
    for field_name in &schema.confidential {
        let Some(password) = password else {
            diagnostics.push(Diagnostic::error("password required"));
            continue;
        };
        for record in &mut rs.records {
            for field in &mut record.fields {
                if field.name == *field_name {
                    if let Some(rest) = field.value.strip_prefix("encrypted-") {
                        if let Some(plain) = decrypt_value(rest, password) {
                            field.value = plain;
                        }
                    }
                }
            }
        }
    }
    rs
}

/// A deterministic, reversible (not cryptographically secure) transform used
/// for `%confidential` fields: XOR with the password's bytes, hex-encoded.
fn encrypt_value(value: &str, password: &str) -> String {
    xor_with_password(value.as_bytes(), password)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn decrypt_value(hex: &str, password: &str) -> Option<String> {
    if hex.len() % 2 != 0 {
        return None;
    }
    let bytes: Option<Vec<u8>> = (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect();
    let bytes = bytes?;
    String::from_utf8(xor_with_password(&bytes, password)).ok()
}

fn xor_with_password(data: &[u8], password: &str) -> Vec<u8> {
    let key = password.as_bytes();
    if key.is_empty() {
        return data.to_vec();
    }
    data.iter()
        .enumerate()
        .map(|(i, b)| b ^ key[i % key.len()])
        .collect()
}

pub(crate) fn try_parse_date(value: &str) -> Option<NaiveDateTime> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d",
        "%Y/%m/%d",
    ];
    let trimmed = value.trim();
    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
        if let Ok(date) = chrono::NaiveDate::parse_from_str(trimmed, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}
