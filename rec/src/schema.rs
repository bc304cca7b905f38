//! Compiled per-record-set schema: parses a [`RecordDescriptor`]'s directives
//! once, rather than re-parsing `%type`/`%constraint` text per record.

use std::collections::HashMap;

use rec_ast::Expr;
use rec_core::{Diagnostic, RecordDescriptor};

/// A field type recognised by `%type`/`%typedef`.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldType {
    /// Signed integer, decimal/hex/octal.
    Int,
    /// Integer or decimal real.
    Real,
    /// Integer within `[low, high]` (or `[0, low]` when `high` is absent).
    Range { low: i64, high: Option<i64> },
    /// A value containing no embedded newline.
    Line,
    /// One of `yes no true false 0 1`.
    Bool,
    /// One of a fixed set of values.
    Enum(Vec<String>),
    /// A permissive email-address shape.
    Email,
    /// Canonical `8-4-4-4-12` hex UUID.
    Uuid,
    /// An ISO-like date-time.
    Date,
    /// A value matching a regular expression.
    Regexp(String),
    /// A value whose length equals `N`.
    Size(i64),
    /// An unconstrained field reference; always valid.
    Field,
}

/// The comparison operator of a `%size` directive.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SizeOp {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl SizeOp {
    fn evaluate(self, count: i64, n: i64) -> bool {
        match self {
            SizeOp::Eq => count == n,
            SizeOp::Ne => count != n,
            SizeOp::Lt => count < n,
            SizeOp::Le => count <= n,
            SizeOp::Gt => count > n,
            SizeOp::Ge => count >= n,
        }
    }
}

/// A compiled `%size` directive.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SizeConstraint {
    /// The comparison operator; `=` if none was given.
    pub op: SizeOp,
    /// The operand.
    pub n: i64,
}

impl SizeConstraint {
    /// True iff `count` satisfies this constraint.
    pub fn is_satisfied_by(&self, count: usize) -> bool {
        self.op.evaluate(count as i64, self.n)
    }
}

/// A compiled descriptor: directive lists and parsed ASTs/types, built once
/// per record set rather than re-derived per record.
#[derive(Clone, Debug, Default)]
pub struct Schema {
    /// The record type, if declared.
    pub rec_type: Option<String>,
    /// `%mandatory` field names.
    pub mandatory: Vec<String>,
    /// `%allowed` field names.
    pub allowed: Vec<String>,
    /// Whether `%allowed` was declared at all.
    pub has_allowed: bool,
    /// `%prohibit` field names.
    pub prohibit: Vec<String>,
    /// `%unique` field names.
    pub unique: Vec<String>,
    /// The `%key` field name, if any.
    pub key: Option<String>,
    /// `%singular` field names.
    pub singular: Vec<String>,
    /// The `%size` constraint, if declared (only the first is honored).
    pub size: Option<SizeConstraint>,
    /// Successfully-parsed `%constraint` expressions.
    pub constraints: Vec<Expr>,
    /// `F -> FieldType`, resolved through `%typedef` aliases.
    pub types: HashMap<String, FieldType>,
    /// `%confidential` field names.
    pub confidential: Vec<String>,
    /// `%auto` field names.
    pub auto: Vec<String>,
    /// `%sort` field names.
    pub sort: Vec<String>,
}

impl Schema {
    /// Compiles `descriptor` into a [`Schema`], returning any diagnostics
    /// produced while parsing `%size`, `%constraint` or `%type` text.
    pub fn compile(descriptor: &RecordDescriptor) -> (Schema, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let rec_type = descriptor.rec_type().map(str::to_string);

        let typedefs = compile_typedefs(descriptor);

        let mut types = HashMap::new();
        for raw in descriptor.types() {
            let tokens: Vec<&str> = raw.split_whitespace().collect();
            if tokens.len() < 2 {
                diagnostics.push(Diagnostic::error(format!("malformed %type directive '{}'", raw)));
                continue;
            }
            let field_name = tokens[0];
            match resolve_field_type(&tokens[1..], &typedefs) {
                Some(ty) => {
                    types.insert(field_name.to_string(), ty);
                }
                None => diagnostics.push(
                    Diagnostic::error(format!("unknown type in %type directive '{}'", raw))
                        .with_field_name(field_name),
                ),
            }
        }

        let size = descriptor.size_directives().first().and_then(|raw| {
            let parsed = parse_size(raw);
            if parsed.is_none() {
                diagnostics.push(Diagnostic::error(format!("malformed %size directive '{}'", raw)));
            }
            parsed
        });

        let mut constraints = Vec::new();
        for raw in descriptor.constraints() {
            match rec_parser::parse(raw) {
                Ok(expr) => constraints.push(expr),
                Err(err) => diagnostics.push(Diagnostic::error(format!(
                    "invalid %constraint expression '{}': {}",
                    raw, err
                ))),
            }
        }

        let schema = Schema {
            rec_type,
            mandatory: descriptor.mandatory(),
            allowed: descriptor.allowed(),
            has_allowed: descriptor.has_allowed(),
            prohibit: descriptor.prohibit(),
            unique: descriptor.unique(),
            key: descriptor.key(),
            singular: descriptor.singular(),
            size,
            constraints,
            types,
            confidential: descriptor.confidential(),
            auto: descriptor.auto(),
            sort: descriptor.sort(),
        };
        (schema, diagnostics)
    }

    /// The set of field names allowed to appear in a record:
    /// `mandatory ∪ allowed ∪ {key}`.
    pub fn allowed_set(&self) -> Vec<&str> {
        let mut set: Vec<&str> = self.mandatory.iter().map(String::as_str).collect();
        set.extend(self.allowed.iter().map(String::as_str));
        if let Some(key) = &self.key {
            set.push(key.as_str());
        }
        set
    }
}

fn compile_typedefs(descriptor: &RecordDescriptor) -> HashMap<String, FieldType> {
    let mut typedefs = HashMap::new();
    for raw in descriptor.typedefs() {
        let tokens: Vec<&str> = raw.split_whitespace().collect();
        if tokens.len() < 2 {
            continue;
        }
        let name = tokens[0];
        if let Some(ty) = resolve_field_type(&tokens[1..], &typedefs) {
            typedefs.insert(name.to_string(), ty);
        }
    }
    typedefs
}

fn resolve_field_type(tokens: &[&str], typedefs: &HashMap<String, FieldType>) -> Option<FieldType> {
    if tokens.is_empty() {
        return None;
    }
    if let Some(ty) = typedefs.get(tokens[0]) {
        return Some(ty.clone());
    }
    match tokens[0] {
        "int" => Some(FieldType::Int),
        "real" => Some(FieldType::Real),
        "line" => Some(FieldType::Line),
        "bool" => Some(FieldType::Bool),
        "email" => Some(FieldType::Email),
        "uuid" => Some(FieldType::Uuid),
        "date" => Some(FieldType::Date),
        "field" => Some(FieldType::Field),
        "enum" => Some(FieldType::Enum(tokens[1..].iter().map(|s| s.to_string()).collect())),
        "range" => {
            let low = tokens.get(1)?.parse::<i64>().ok()?;
            match tokens.get(2) {
                Some(high) => Some(FieldType::Range {
                    low,
                    high: high.parse::<i64>().ok(),
                }),
                None => Some(FieldType::Range { low: 0, high: Some(low) }),
            }
        }
        "size" => tokens.get(1)?.parse::<i64>().ok().map(FieldType::Size),
        "regexp" => {
            let pattern = tokens.get(1)?;
            let trimmed = pattern.strip_prefix('/').and_then(|p| p.strip_suffix('/')).unwrap_or(pattern);
            Some(FieldType::Regexp(trimmed.to_string()))
        }
        _ => None,
    }
}

fn parse_size(raw: &str) -> Option<SizeConstraint> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    match tokens.as_slice() {
        [n] => n.parse::<i64>().ok().map(|n| SizeConstraint { op: SizeOp::Eq, n }),
        [op, n] => {
            let op = match *op {
                "=" => SizeOp::Eq,
                "!=" => SizeOp::Ne,
                "<" => SizeOp::Lt,
                "<=" => SizeOp::Le,
                ">" => SizeOp::Gt,
                ">=" => SizeOp::Ge,
                _ => return None,
            };
            n.parse::<i64>().ok().map(|n| SizeConstraint { op, n })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rec_core::Field;

    fn descriptor(fields: &[(&str, &str)]) -> RecordDescriptor {
        RecordDescriptor::from_fields(fields.iter().map(|(n, v)| Field::new(*n, *v)).collect())
    }

    #[test]
    fn compiles_mandatory_and_allowed() {
        let d = descriptor(&[
            ("%rec", "Contact"),
            ("%mandatory", "Name"),
            ("%allowed", "Phone"),
        ]);
        let (schema, diags) = Schema::compile(&d);
        assert!(diags.is_empty());
        assert_eq!(schema.rec_type.as_deref(), Some("Contact"));
        assert_eq!(schema.mandatory, vec!["Name"]);
        assert!(schema.has_allowed);
        assert_eq!(schema.allowed_set(), vec!["Name", "Phone"]);
    }

    #[test]
    fn resolves_typedef_alias() {
        let d = descriptor(&[
            ("%rec", "Item"),
            ("%typedef", "Id_t int"),
            ("%type", "Id Id_t"),
        ]);
        let (schema, diags) = Schema::compile(&d);
        assert!(diags.is_empty());
        assert_eq!(schema.types.get("Id"), Some(&FieldType::Int));
    }

    #[test]
    fn parses_size_with_operator() {
        let d = descriptor(&[("%rec", "Contact"), ("%size", "< 3")]);
        let (schema, _) = Schema::compile(&d);
        let size = schema.size.unwrap();
        assert!(size.is_satisfied_by(2));
        assert!(!size.is_satisfied_by(3));
    }

    #[test]
    fn invalid_constraint_is_a_diagnostic() {
        let d = descriptor(&[("%rec", "Contact"), ("%constraint", "Age >")]);
        let (schema, diags) = Schema::compile(&d);
        assert!(schema.constraints.is_empty());
        assert_eq!(diags.len(), 1);
    }
}
