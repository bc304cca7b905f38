#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Returns true iff `name` matches the field-name grammar `[A-Za-z%][A-Za-z0-9_]*`.
///
/// The leading `%` is reserved for descriptor fields (`%rec`, `%mandatory`, ...).
pub fn is_valid_field_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '%' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A single `NAME: VALUE` pair.
///
/// Field names are case-sensitive. A record may hold several fields with
/// the same name; their relative order is preserved and is significant (it
/// defines subscript semantics in the selection-expression language).
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Field {
    /// The field name, including any leading `%` for descriptor fields.
    pub name: String,
    /// The field value. May contain embedded newlines (multi-line values).
    pub value: String,
}

impl Field {
    /// Creates a new field.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// True iff the field name begins with `%` (a descriptor directive).
    pub fn is_directive(&self) -> bool {
        self.name.starts_with('%')
    }
}

/// An ordered sequence of fields.
///
/// Records are built once and not mutated in place; transforms construct new
/// records rather than editing existing ones.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Record {
    pub fields: Vec<Field>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a record from a list of fields.
    pub fn from_fields(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Appends a field to the record.
    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Returns the value of the first field named `name`, if any.
    pub fn get_field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    /// Returns every occurrence of `name`, in their original order.
    pub fn get_fields(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.name == name)
            .map(|f| f.value.as_str())
            .collect()
    }

    /// Returns the occurrence of `name` at position `index` (0-based), if present.
    pub fn get_field_at(&self, name: &str, index: usize) -> Option<&str> {
        self.fields
            .iter()
            .filter(|f| f.name == name)
            .nth(index)
            .map(|f| f.value.as_str())
    }

    /// Returns how many times `name` occurs in the record.
    pub fn get_field_count(&self, name: &str) -> usize {
        self.fields.iter().filter(|f| f.name == name).count()
    }

    /// True iff `name` occurs at least once.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    /// Iterates over the distinct, non-`%`-prefixed field names in the record,
    /// in first-seen order.
    pub fn field_names(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for field in &self.fields {
            if !field.name.starts_with('%') && !seen.contains(&field.name.as_str()) {
                seen.push(field.name.as_str());
            }
        }
        seen
    }
}

/// A descriptor record: a record whose fields all begin with `%`.
///
/// A descriptor applies to every record from its position until the next
/// descriptor or end of input; directives accumulate across repeated
/// occurrences (e.g. two `%mandatory:` lines add up rather than the second
/// overriding the first).
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RecordDescriptor {
    pub fields: Vec<Field>,
}

impl RecordDescriptor {
    /// Creates a descriptor from a list of `%`-prefixed fields.
    pub fn from_fields(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// The declared record type (the value of the first `%rec` field), trimmed.
    pub fn rec_type(&self) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == "%rec")
            .map(|f| f.value.trim())
    }

    /// Every raw value of the named directive, in source order (one entry per occurrence).
    pub fn directive_values(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.name == name)
            .map(|f| f.value.as_str())
            .collect()
    }

    /// The named directive's values, each split on whitespace and flattened,
    /// across every occurrence of the directive (accumulation semantics).
    pub fn directive_list(&self, name: &str) -> Vec<String> {
        self.directive_values(name)
            .into_iter()
            .flat_map(|v| v.split_whitespace().map(str::to_string))
            .collect()
    }

    /// `%mandatory` field names.
    pub fn mandatory(&self) -> Vec<String> {
        self.directive_list("%mandatory")
    }

    /// `%allowed` field names.
    pub fn allowed(&self) -> Vec<String> {
        self.directive_list("%allowed")
    }

    /// True iff at least one `%allowed` directive was declared.
    pub fn has_allowed(&self) -> bool {
        self.fields.iter().any(|f| f.name == "%allowed")
    }

    /// `%prohibit` field names.
    pub fn prohibit(&self) -> Vec<String> {
        self.directive_list("%prohibit")
    }

    /// `%unique` field names.
    pub fn unique(&self) -> Vec<String> {
        self.directive_list("%unique")
    }

    /// The `%key` field name, if declared. At most one is meaningful; if
    /// several are declared the first wins.
    pub fn key(&self) -> Option<String> {
        self.fields
            .iter()
            .find(|f| f.name == "%key")
            .map(|f| f.value.trim().to_string())
    }

    /// `%singular` field names.
    pub fn singular(&self) -> Vec<String> {
        self.directive_list("%singular")
    }

    /// Raw `%size` directive values, e.g. `"= 3"` or `"10"`.
    pub fn size_directives(&self) -> Vec<&str> {
        self.directive_values("%size")
    }

    /// Raw `%constraint` selection-expression texts.
    pub fn constraints(&self) -> Vec<&str> {
        self.directive_values("%constraint")
    }

    /// Raw `%type: F T ARGS...` directive texts.
    pub fn types(&self) -> Vec<&str> {
        self.directive_values("%type")
    }

    /// Raw `%typedef: N T ARGS...` directive texts.
    pub fn typedefs(&self) -> Vec<&str> {
        self.directive_values("%typedef")
    }

    /// `%confidential` field names.
    pub fn confidential(&self) -> Vec<String> {
        self.directive_list("%confidential")
    }

    /// `%auto` field names.
    pub fn auto(&self) -> Vec<String> {
        self.directive_list("%auto")
    }

    /// `%sort` field names, accumulated across every `%sort` occurrence.
    pub fn sort(&self) -> Vec<String> {
        self.directive_list("%sort")
    }

    /// Free-text `%doc` values, one per occurrence.
    pub fn doc(&self) -> Vec<&str> {
        self.directive_values("%doc")
    }
}

/// A pair of an optional descriptor and the records it governs.
///
/// The descriptor is absent only for the anonymous record set: records that
/// precede any `%rec` directive in the source.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RecordSet {
    pub descriptor: Option<RecordDescriptor>,
    pub records: Vec<Record>,
}

impl RecordSet {
    /// Creates a new record set.
    pub fn new(descriptor: Option<RecordDescriptor>, records: Vec<Record>) -> Self {
        Self {
            descriptor,
            records,
        }
    }

    /// The record type this set's descriptor declares, if any.
    pub fn record_type(&self) -> Option<&str> {
        self.descriptor.as_ref().and_then(|d| d.rec_type())
    }

    /// True iff this is the anonymous record set (no descriptor).
    pub fn is_anonymous(&self) -> bool {
        self.descriptor.is_none()
    }
}

/// An ordered list of record sets, reflecting source order.
///
/// The anonymous record set, if present, is always first.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Database {
    pub record_sets: Vec<RecordSet>,
}

impl Database {
    /// Creates a new, empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a database from a list of record sets.
    pub fn from_record_sets(record_sets: Vec<RecordSet>) -> Self {
        Self { record_sets }
    }

    /// The anonymous record set, if one exists (and is non-empty).
    pub fn anonymous(&self) -> Option<&RecordSet> {
        self.record_sets.first().filter(|rs| rs.is_anonymous())
    }

    /// The record set whose descriptor declares record type `rec_type`.
    pub fn by_type(&self, rec_type: &str) -> Option<&RecordSet> {
        self.record_sets
            .iter()
            .find(|rs| rs.record_type() == Some(rec_type))
    }
}
