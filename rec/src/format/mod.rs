//! The rec-format text parser: turns a buffer into a [`Database`].

use rec_core::{is_valid_field_name, Database, Diagnostic, Field, Record, RecordDescriptor, RecordSet};

/// Parses `input` into a [`Database`] plus any diagnostics encountered.
///
/// Malformed lines never abort the parse: the parser reports a diagnostic and
/// resynchronises at the next blank line, per the format's failure model.
pub fn parse(input: &str) -> (Database, Vec<Diagnostic>) {
    let logical_lines = join_backslash_continuations(input);
    let fields = lines_to_fields(&logical_lines);
    assemble(fields)
}

/// Resolves backslash line continuations, turning physical lines into logical ones.
///
/// A line (field or `+` continuation) ending in an unescaped `\` is joined
/// with the next physical line, with no intervening newline.
fn join_backslash_continuations(input: &str) -> Vec<String> {
    let normalized = input.replace("\r\n", "\n");
    let mut logical = Vec::new();
    let mut pending = String::new();
    let mut in_continuation = false;

    for raw_line in normalized.split('\n') {
        let is_comment = raw_line.trim_start().starts_with('#');
        if is_comment && in_continuation {
            // A comment terminates any continuation in progress.
            logical.push(std::mem::take(&mut pending));
            in_continuation = false;
        }
        if in_continuation {
            pending.push_str(raw_line);
        } else {
            pending = raw_line.to_string();
        }

        if let Some(stripped) = pending.strip_suffix('\\') {
            pending = stripped.to_string();
            in_continuation = true;
        } else {
            logical.push(std::mem::take(&mut pending));
            in_continuation = false;
        }
    }
    if in_continuation {
        logical.push(pending);
    }
    logical
}

enum ParsedLine {
    Blank,
    Comment,
    Field { name: String, value: String },
    Continuation { value: String },
    Invalid(String),
}

fn classify(line: &str) -> ParsedLine {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ParsedLine::Blank;
    }
    if trimmed.starts_with('#') {
        return ParsedLine::Comment;
    }
    if let Some(rest) = line.strip_prefix('+') {
        let value = rest.strip_prefix(' ').unwrap_or(rest);
        return ParsedLine::Continuation {
            value: value.to_string(),
        };
    }
    match line.find(':') {
        Some(colon) => {
            let name = &line[..colon];
            if !is_valid_field_name(name) {
                return ParsedLine::Invalid(format!("invalid field name '{}'", name));
            }
            let rest = &line[colon + 1..];
            let value = rest.strip_prefix(' ').unwrap_or(rest);
            ParsedLine::Field {
                name: name.to_string(),
                value: value.to_string(),
            }
        }
        None => ParsedLine::Invalid(format!("expected 'NAME: VALUE', found '{}'", line)),
    }
}

/// Turns the logical line stream into a flat field list per record, applying
/// `+`-continuations, with diagnostics for malformed lines folded in as
/// synthetic fields is avoided — instead we thread diagnostics alongside.
fn lines_to_fields(lines: &[String]) -> Vec<LineEvent> {
    let mut events = Vec::with_capacity(lines.len());
    for line in lines {
        match classify(line) {
            ParsedLine::Blank => events.push(LineEvent::Blank),
            ParsedLine::Comment => {}
            ParsedLine::Field { name, value } => events.push(LineEvent::Field(Field::new(name, value))),
            ParsedLine::Continuation { value } => events.push(LineEvent::Continuation(value)),
            ParsedLine::Invalid(message) => events.push(LineEvent::Invalid(message)),
        }
    }
    events
}

enum LineEvent {
    Blank,
    Field(Field),
    Continuation(String),
    Invalid(String),
}

fn assemble(events: Vec<LineEvent>) -> (Database, Vec<Diagnostic>) {
    let mut diagnostics = Vec::new();
    let mut record_sets: Vec<RecordSet> = Vec::new();

    let mut current_descriptor_fields: Vec<Field> = Vec::new();
    let mut in_descriptor = false;
    let mut current_record_fields: Vec<Field> = Vec::new();
    let mut current_records: Vec<Record> = Vec::new();
    let mut current_is_anonymous = true;

    let flush_record = |fields: &mut Vec<Field>, records: &mut Vec<Record>| {
        if !fields.is_empty() {
            records.push(Record::from_fields(std::mem::take(fields)));
        }
    };

    let flush_record_set =
        |descriptor_fields: &mut Vec<Field>, records: &mut Vec<Record>, anonymous: bool, sets: &mut Vec<RecordSet>| {
            if descriptor_fields.is_empty() && records.is_empty() {
                return;
            }
            let descriptor = if anonymous {
                None
            } else {
                Some(RecordDescriptor::from_fields(std::mem::take(descriptor_fields)))
            };
            sets.push(RecordSet::new(descriptor, std::mem::take(records)));
        };

    let mut resyncing = false;
    for event in events {
        match event {
            LineEvent::Blank => {
                flush_record(&mut current_record_fields, &mut current_records);
                in_descriptor = false;
                resyncing = false;
            }
            LineEvent::Continuation(value) => {
                if resyncing {
                    continue;
                }
                if let Some(last) = current_record_fields.last_mut() {
                    last.value.push('\n');
                    last.value.push_str(&value);
                } else if let Some(last) = current_descriptor_fields.last_mut() {
                    last.value.push('\n');
                    last.value.push_str(&value);
                } else {
                    diagnostics.push(Diagnostic::error("continuation line with no preceding field"));
                }
            }
            LineEvent::Invalid(message) => {
                diagnostics.push(Diagnostic::error(message));
                // Resynchronise at the next blank line: drop the malformed record.
                current_record_fields.clear();
                resyncing = true;
            }
            LineEvent::Field(field) => {
                if resyncing {
                    continue;
                }
                if field.name == "%rec" {
                    if in_descriptor {
                        // A second `%rec` field on the same descriptor (no
                        // blank line intervened yet): it joins the current
                        // descriptor instead of starting a new record set,
                        // so the descriptor keeps accumulating and the
                        // duplicate is reported below (first value wins).
                        current_descriptor_fields.push(field);
                    } else {
                        // Starting a new record set: flush whatever preceded it.
                        flush_record(&mut current_record_fields, &mut current_records);
                        flush_record_set(
                            &mut current_descriptor_fields,
                            &mut current_records,
                            current_is_anonymous,
                            &mut record_sets,
                        );
                        current_is_anonymous = false;
                        in_descriptor = true;
                        current_descriptor_fields.push(field);
                    }
                } else if field.is_directive() {
                    if in_descriptor {
                        current_descriptor_fields.push(field);
                    } else {
                        diagnostics.push(
                            Diagnostic::error(format!(
                                "directive field '{}' outside of a descriptor",
                                field.name
                            )),
                        );
                    }
                } else {
                    in_descriptor = false;
                    current_record_fields.push(field);
                }
            }
        }
    }
    flush_record(&mut current_record_fields, &mut current_records);
    flush_record_set(
        &mut current_descriptor_fields,
        &mut current_records,
        current_is_anonymous,
        &mut record_sets,
    );

    for rs in &record_sets {
        if let Some(descriptor) = &rs.descriptor {
            let rec_count = descriptor.directive_values("%rec").len();
            if rec_count > 1 {
                diagnostics.push(Diagnostic::warning("duplicate %rec directive"));
            }
        }
    }

    (Database::from_record_sets(record_sets), diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_field() {
        let (db, diags) = parse("Name: Ada Lovelace");
        assert!(diags.is_empty());
        let rs = &db.record_sets[0];
        assert_eq!(rs.records[0].get_field("Name"), Some("Ada Lovelace"));
    }

    #[test]
    fn colon_in_value_is_literal() {
        let (db, _) = parse("Time: 12:30:00");
        assert_eq!(db.record_sets[0].records[0].get_field("Time"), Some("12:30:00"));
    }

    #[test]
    fn plus_continuation_joins_with_newline() {
        let (db, _) = parse("Address: 123 Main St\n+ Apt 4B\n+ New York, NY");
        assert_eq!(
            db.record_sets[0].records[0].get_field("Address"),
            Some("123 Main St\nApt 4B\nNew York, NY")
        );
    }

    #[test]
    fn backslash_continuation_joins_without_newline() {
        let (db, _) = parse("LongLine: a \\\nb \\\nc.");
        assert_eq!(db.record_sets[0].records[0].get_field("LongLine"), Some("a b c."));
    }

    #[test]
    fn blank_lines_collapse() {
        let (db, _) = parse("Name: A\n\n\n\nName: B");
        assert_eq!(db.record_sets[0].records.len(), 2);
    }

    #[test]
    fn commented_out_record_is_dropped() {
        let data = "Name: Ada\nAge: 36\n\nName: Peter\nAge: 53\n\n# Name: Matusalem\n# Age: 969\n\nName: Bart\nAge: 10";
        let (db, _) = parse(data);
        let names: Vec<_> = db.record_sets[0]
            .records
            .iter()
            .map(|r| r.get_field("Name").unwrap())
            .collect();
        assert_eq!(names, vec!["Ada", "Peter", "Bart"]);
    }

    #[test]
    fn rec_directive_starts_new_record_set() {
        let data = "%rec: Contact\n%mandatory: Name\n\nName: John";
        let (db, diags) = parse(data);
        assert!(diags.is_empty());
        assert_eq!(db.record_sets.len(), 1);
        assert_eq!(db.record_sets[0].record_type(), Some("Contact"));
        assert_eq!(db.record_sets[0].records[0].get_field("Name"), Some("John"));
    }

    #[test]
    fn repeated_rec_on_one_descriptor_accumulates_with_a_diagnostic() {
        let data = "%rec: Contact\n%rec: Other\n%mandatory: Name\n\nName: John";
        let (db, diags) = parse(data);
        assert_eq!(db.record_sets.len(), 1);
        assert_eq!(db.record_sets[0].record_type(), Some("Contact"));
        assert_eq!(
            db.record_sets[0].descriptor.as_ref().unwrap().directive_values("%rec"),
            vec!["Contact", "Other"]
        );
        assert!(diags.iter().any(|d| d.message.contains("duplicate %rec directive")));
    }

    #[test]
    fn anonymous_records_precede_first_rec_directive() {
        let data = "Name: Loose\n\n%rec: Contact\n\nName: John";
        let (db, _) = parse(data);
        assert_eq!(db.record_sets.len(), 2);
        assert!(db.record_sets[0].is_anonymous());
        assert_eq!(db.record_sets[1].record_type(), Some("Contact"));
    }

    #[test]
    fn malformed_line_is_a_diagnostic_and_parsing_continues() {
        let data = "Name John\n\nName: Jane";
        let (db, diags) = parse(data);
        assert!(!diags.is_empty());
        assert_eq!(db.record_sets[0].records.len(), 1);
        assert_eq!(db.record_sets[0].records[0].get_field("Name"), Some("Jane"));
    }
}
