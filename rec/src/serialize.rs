//! The canonical text serializer: renders a [`Database`] back to the rec
//! format.

use rec_core::{Database, Field, Record, RecordDescriptor};

/// Renders `database` back to its canonical rec-format text.
///
/// Every field is its own `NAME: VALUE` line (or a `NAME: VALUE` line
/// followed by `+ `-continuation lines for embedded newlines). Records are
/// separated by one blank line; a record set's descriptor is separated from
/// its records, and from the record set before it, the same way. The output
/// ends with exactly one trailing newline.
pub fn to_string(database: &Database) -> String {
    let mut paragraphs = Vec::new();
    for record_set in &database.record_sets {
        if let Some(descriptor) = &record_set.descriptor {
            paragraphs.push(render_descriptor(descriptor));
        }
        for record in &record_set.records {
            paragraphs.push(render_record(record));
        }
    }
    if paragraphs.is_empty() {
        return String::new();
    }
    let mut out = paragraphs.join("\n\n");
    out.push('\n');
    out
}

fn render_descriptor(descriptor: &RecordDescriptor) -> String {
    descriptor
        .fields
        .iter()
        .map(render_field)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_record(record: &Record) -> String {
    record
        .fields
        .iter()
        .map(render_field)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Renders one field, turning embedded newlines into `+ `-continuation
/// lines: the first physical line carries the text up to (not including)
/// the first `\n`, and every subsequent line is prefixed with `+ `.
fn render_field(field: &Field) -> String {
    let mut lines = field.value.split('\n');
    let first = lines.next().unwrap_or("");
    let mut out = format!("{}: {}", field.name, first);
    for line in lines {
        out.push('\n');
        out.push_str("+ ");
        out.push_str(line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format;

    #[test]
    fn renders_simple_field() {
        let (db, _) = format::parse("Name: Ada Lovelace");
        assert_eq!(to_string(&db), "Name: Ada Lovelace\n");
    }

    #[test]
    fn renders_multiline_value_as_continuation() {
        let (db, _) = format::parse("Address: 123 Main St\n+ Apt 4B\n+ New York, NY");
        assert_eq!(
            to_string(&db),
            "Address: 123 Main St\n+ Apt 4B\n+ New York, NY\n"
        );
    }

    #[test]
    fn records_separated_by_blank_line() {
        let (db, _) = format::parse("Name: A\n\nName: B");
        assert_eq!(to_string(&db), "Name: A\n\nName: B\n");
    }

    #[test]
    fn descriptor_then_blank_then_records() {
        let (db, _) = format::parse("%rec: Contact\n%mandatory: Name\n\nName: John\n\nName: Jane");
        assert_eq!(
            to_string(&db),
            "%rec: Contact\n%mandatory: Name\n\nName: John\n\nName: Jane\n"
        );
    }

    #[test]
    fn round_trip_is_structurally_equal() {
        let original = "%rec: Contact\n%mandatory: Name\n\nName: John\nEmail: john@example.com\n\nName: Jane\n\n%rec: Item\n\nTitle: Widget";
        let (db, _) = format::parse(original);
        let rendered = to_string(&db);
        let (reparsed, diags) = format::parse(&rendered);
        assert!(diags.is_empty());
        assert_eq!(db, reparsed);
    }

    #[test]
    fn empty_database_serializes_to_empty_string() {
        let (db, _) = format::parse("");
        assert_eq!(to_string(&db), "");
    }
}
