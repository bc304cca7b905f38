//! The selector pipeline (`recsel`): composes type selection, filtering,
//! sampling, sorting, grouping, uniquing, projection and counting into one
//! deterministic sequence of stages.

use std::collections::{HashMap, HashSet};

use rand::{seq::index::sample, RngCore};
use rec_core::{Database, Field, Record, RecordDescriptor, RecordSet};
use rec_parser::{eval_bool, EvalContext};

use crate::{error::RecError, schema::Schema, transform::sort_record_set};

/// The options accepted by the selector pipeline, mirroring `recsel`'s
/// abstract CLI surface.
#[derive(Clone, Debug, Default)]
pub struct SelectorOptions {
    /// `-t`/`--type`: the record type to select from.
    pub record_type: Option<String>,
    /// `-e`/`--expression`: a selection expression filter.
    pub expression: Option<String>,
    /// `-q`/`--quick`: a substring quick-search query.
    pub quick: Option<String>,
    /// `-n`/`--number`: a comma-separated index/range list, e.g. `"0,2-4"`.
    pub indexes: Option<String>,
    /// `-m`/`--random`: sample this many records without replacement; `Some(0)` means all.
    pub random_count: Option<u64>,
    /// `-S`/`--sort`: an explicit sort field list, overriding the descriptor's `%sort`.
    pub sort: Option<Vec<String>>,
    /// `-G`/`--group-by`: group-by field list.
    pub group_by: Option<Vec<String>>,
    /// `-U`/`--uniq`: collapse consecutive duplicate field values within each record.
    pub uniq: bool,
    /// `-c`/`--count`: return the post-filter record count instead of records.
    pub count: bool,
    /// `-p`/`--print`: project to only these fields (all occurrences kept).
    pub print_fields: Option<Vec<String>>,
    /// `-P`/`--print-values`: render only these fields' values, newline-separated.
    pub print_values: Option<Vec<String>>,
    /// `-R`/`--print-row`: render one space-separated row per record.
    pub print_row: Option<Vec<String>>,
    /// `-d`/`--include-descriptor`: include the chosen record set's descriptor in the result.
    pub include_descriptors: bool,
    /// `-i`/`--case-insensitive`: case-insensitive quick search and `~` matches.
    pub case_insensitive: bool,
}

/// The record-returning form of a selection: an optional descriptor plus
/// the selected/projected records.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SelectionResult {
    /// The chosen record set's descriptor, present only when
    /// [`SelectorOptions::include_descriptors`] was set.
    pub descriptor: Option<RecordDescriptor>,
    /// The resulting records, after every pipeline stage has run.
    pub records: Vec<Record>,
}

/// The result of running the selector pipeline: which shape depends on
/// which of `count`/`print_values`/`print_row`/neither was requested.
#[derive(Clone, Debug, PartialEq)]
pub enum SelectionOutcome {
    /// The default shape: a (possibly projected) list of records.
    Records(SelectionResult),
    /// `--count`: the number of records surviving through the uniq stage.
    Count(usize),
    /// `--print-values`: every requested field's values, newline-separated.
    Values(String),
    /// `--print-row`: one space-separated row per record.
    Rows(Vec<String>),
}

/// Runs the selector pipeline over `database` with `options`, drawing any
/// random sample from `rng`.
///
/// Stages run in a fixed order: choose record set, `-e`
/// filter, `-q` quick search, `-n` index filter, `-m` random sample, sort,
/// group-by, uniq, projection, count. Each stage operates on the previous
/// stage's output.
pub fn select(
    database: &Database,
    options: &SelectorOptions,
    rng: &mut impl RngCore,
) -> Result<SelectionOutcome, RecError> {
    let record_set = choose_record_set(database, options)?;
    let schema = record_set.descriptor.as_ref().map(|d| Schema::compile(d).0);

    let mut records = record_set.records.clone();

    if let Some(source) = &options.expression {
        let expr = rec_parser::parse(source).map_err(|e| RecError::InvalidExpression(e.to_string()))?;
        records.retain(|record| {
            let ctx = EvalContext::new(record).with_case_insensitive(options.case_insensitive);
            eval_bool(&expr, &ctx)
        });
    }

    if let Some(query) = &options.quick {
        records.retain(|record| quick_matches(record, query, options.case_insensitive));
    }

    if let Some(spec) = &options.indexes {
        let wanted = parse_index_list(spec).map_err(RecError::InvalidIndexList)?;
        records = records
            .into_iter()
            .enumerate()
            .filter(|(index, _)| wanted.contains(index))
            .map(|(_, record)| record)
            .collect();
    }

    if let Some(n) = options.random_count {
        if n > 0 {
            records = random_sample(records, n as usize, rng);
        }
    }

    let sort_fields = options
        .sort
        .clone()
        .unwrap_or_else(|| schema.as_ref().map(|s| s.sort.clone()).unwrap_or_default());
    if !sort_fields.is_empty() {
        let default_schema = Schema::default();
        let schema_for_sort = schema.as_ref().unwrap_or(&default_schema);
        records = sort_record_set(RecordSet::new(None, records), &sort_fields, schema_for_sort).records;
    }

    if let Some(group_fields) = &options.group_by {
        records = group_by(records, group_fields);
    }

    if options.uniq {
        records = records.into_iter().map(uniq_record).collect();
    }

    if options.count {
        return Ok(SelectionOutcome::Count(records.len()));
    }

    if let Some(fields) = &options.print_values {
        return Ok(SelectionOutcome::Values(print_values(&records, fields)));
    }
    if let Some(fields) = &options.print_row {
        return Ok(SelectionOutcome::Rows(print_row(&records, fields)));
    }
    if let Some(fields) = &options.print_fields {
        records = project_fields(records, fields);
    }

    let descriptor = if options.include_descriptors {
        record_set.descriptor.clone()
    } else {
        None
    };
    Ok(SelectionOutcome::Records(SelectionResult { descriptor, records }))
}

/// Stage 1: picks the record set an otherwise record-type-agnostic query
/// operates over.
///
/// An explicit `record_type` that names no record set yields an empty
/// (anonymous, record-less) record set rather than an error — matching the
/// reference implementation's `recsel --type NonExistent` behavior of
/// returning zero records instead of failing. Only the *absence* of a type
/// with more than one candidate record set is an error.
fn choose_record_set(database: &Database, options: &SelectorOptions) -> Result<RecordSet, RecError> {
    if let Some(record_type) = &options.record_type {
        return Ok(database.by_type(record_type).cloned().unwrap_or_default());
    }
    match database.record_sets.len() {
        0 => Ok(RecordSet::default()),
        1 => Ok(database.record_sets[0].clone()),
        _ => Err(RecError::SeveralRecordTypes),
    }
}

fn quick_matches(record: &Record, query: &str, case_insensitive: bool) -> bool {
    record.fields.iter().any(|field| {
        if case_insensitive {
            field.value.to_lowercase().contains(&query.to_lowercase())
        } else {
            field.value.contains(query)
        }
    })
}

/// Parses a comma-separated index/range list like `"0,2-4"` into the set of
/// indexes it names. Ranges may be given high-to-low; both ends are inclusive.
fn parse_index_list(spec: &str) -> Result<HashSet<usize>, String> {
    let mut indexes = HashSet::new();
    for part in spec.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match part.split_once('-') {
            Some((low, high)) => {
                let low: usize = low.trim().parse().map_err(|_| spec.to_string())?;
                let high: usize = high.trim().parse().map_err(|_| spec.to_string())?;
                let (low, high) = if low <= high { (low, high) } else { (high, low) };
                indexes.extend(low..=high);
            }
            None => {
                let index: usize = part.parse().map_err(|_| spec.to_string())?;
                indexes.insert(index);
            }
        }
    }
    Ok(indexes)
}

/// Samples `n` records without replacement, preserving their relative
/// source order (GNU `recsel -m` does not reshuffle the result).
fn random_sample(records: Vec<Record>, n: usize, rng: &mut impl RngCore) -> Vec<Record> {
    let len = records.len();
    let k = n.min(len);
    if k == len {
        return records;
    }
    let mut chosen: Vec<usize> = sample(rng, len, k).into_vec();
    chosen.sort_unstable();
    chosen.into_iter().map(|index| records[index].clone()).collect()
}

/// Partitions `records` by the tuple of `fields`' values, producing one
/// synthetic record per group whose fields are the union of its members'
/// fields, preserving per-name order and multiplicity.
fn group_by(records: Vec<Record>, fields: &[String]) -> Vec<Record> {
    let mut order = Vec::new();
    let mut groups: HashMap<Vec<String>, Vec<Field>> = HashMap::new();
    for record in records {
        let key: Vec<String> = fields.iter().map(|f| record.get_field(f).unwrap_or("").to_string()).collect();
        groups.entry(key.clone()).or_insert_with(|| {
            order.push(key.clone());
            Vec::new()
        });
        groups.get_mut(&key).unwrap().extend(record.fields);
    }
    order
        .into_iter()
        .map(|key| Record::from_fields(groups.remove(&key).unwrap_or_default()))
        .collect()
}

/// Collapses consecutive duplicate `(name, value)` field occurrences within
/// one record to a single occurrence.
fn uniq_record(record: Record) -> Record {
    let mut out: Vec<Field> = Vec::with_capacity(record.fields.len());
    for field in record.fields {
        let is_dup = match out.last() {
            Some(last) => last.name == field.name && last.value == field.value,
            None => false,
        };
        if !is_dup {
            out.push(field);
        }
    }
    Record::from_fields(out)
}

fn project_fields(records: Vec<Record>, fields: &[String]) -> Vec<Record> {
    records
        .into_iter()
        .map(|record| {
            let kept = record.fields.into_iter().filter(|f| fields.iter().any(|name| name == &f.name)).collect();
            Record::from_fields(kept)
        })
        .collect()
}

fn print_values(records: &[Record], fields: &[String]) -> String {
    let mut values = Vec::new();
    for record in records {
        for field in fields {
            values.extend(record.get_fields(field).into_iter().map(str::to_string));
        }
    }
    values.join("\n")
}

fn print_row(records: &[Record], fields: &[String]) -> Vec<String> {
    records
        .iter()
        .map(|record| {
            fields
                .iter()
                .map(|field| record.get_field(field).unwrap_or(""))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format;
    use rand::{rngs::StdRng, SeedableRng};

    const ACQUAINTANCES: &str = "Name: Ada Lovelace\nAge: 36\n\nName: Peter the Great\nAge: 53\n\nName: Bart Simpson\nAge: 10\n\nName: Adrian Mole\nAge: 13";

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn names(result: &SelectionResult) -> Vec<&str> {
        result.records.iter().map(|r| r.get_field("Name").unwrap()).collect()
    }

    #[test]
    fn age_filter_preserves_input_order() {
        let (db, _) = format::parse(ACQUAINTANCES);
        let options = SelectorOptions {
            expression: Some("Age < 18".to_string()),
            ..Default::default()
        };
        let SelectionOutcome::Records(result) = select(&db, &options, &mut rng()).unwrap() else {
            panic!("expected Records outcome");
        };
        assert_eq!(names(&result), vec!["Bart Simpson", "Adrian Mole"]);
    }

    #[test]
    fn several_record_types_without_a_type_is_an_error() {
        let (db, _) = format::parse("%rec: Maintainer\n\nName: Jose\n\n%rec: Package\n\nName: recutils");
        let err = select(&db, &SelectorOptions::default(), &mut rng()).unwrap_err();
        assert_eq!(err, RecError::SeveralRecordTypes);
    }

    #[test]
    fn unknown_record_type_returns_empty_not_an_error() {
        let (db, _) = format::parse("%rec: Maintainer\n\nName: Jose");
        let options = SelectorOptions {
            record_type: Some("NoSuchType".to_string()),
            ..Default::default()
        };
        let SelectionOutcome::Records(result) = select(&db, &options, &mut rng()).unwrap() else {
            panic!("expected Records outcome");
        };
        assert!(result.records.is_empty());
    }

    #[test]
    fn include_descriptors_only_when_requested() {
        let (db, _) = format::parse("%rec: Maintainer\n\nName: Jose\n\n%rec: Package\n\nName: recutils");
        let options = SelectorOptions {
            record_type: Some("Maintainer".to_string()),
            include_descriptors: true,
            ..Default::default()
        };
        let SelectionOutcome::Records(result) = select(&db, &options, &mut rng()).unwrap() else {
            panic!("expected Records outcome");
        };
        assert_eq!(result.descriptor.unwrap().rec_type(), Some("Maintainer"));
    }

    #[test]
    fn index_list_selects_in_original_order_regardless_of_list_order() {
        let data = "Name: Granny\n\nName: Doctor\n\nName: Dad";
        let (db, _) = format::parse(data);
        let forward = SelectorOptions { indexes: Some("0,1".to_string()), ..Default::default() };
        let backward = SelectorOptions { indexes: Some("1,0".to_string()), ..Default::default() };
        let SelectionOutcome::Records(a) = select(&db, &forward, &mut rng()).unwrap() else { panic!() };
        let SelectionOutcome::Records(b) = select(&db, &backward, &mut rng()).unwrap() else { panic!() };
        assert_eq!(names(&a), names(&b));
        assert_eq!(names(&a), vec!["Granny", "Doctor"]);
    }

    #[test]
    fn index_range_is_inclusive() {
        let data = "Name: Granny\n\nName: Doctor\n\nName: Dad";
        let (db, _) = format::parse(data);
        let options = SelectorOptions { indexes: Some("0-2".to_string()), ..Default::default() };
        let SelectionOutcome::Records(result) = select(&db, &options, &mut rng()).unwrap() else { panic!() };
        assert_eq!(result.records.len(), 3);
    }

    #[test]
    fn random_selection_samples_without_replacement() {
        let data = "Name: Granny\n\nName: Doctor\n\nName: Dad";
        let (db, _) = format::parse(data);
        let options = SelectorOptions { random_count: Some(2), ..Default::default() };
        let SelectionOutcome::Records(result) = select(&db, &options, &mut rng()).unwrap() else { panic!() };
        assert_eq!(result.records.len(), 2);
        let unique: HashSet<_> = names(&result).into_iter().collect();
        assert_eq!(unique.len(), 2);
    }

    #[test]
    fn random_count_zero_selects_all() {
        let data = "Name: Granny\n\nName: Doctor\n\nName: Dad";
        let (db, _) = format::parse(data);
        let options = SelectorOptions { random_count: Some(0), ..Default::default() };
        let SelectionOutcome::Records(result) = select(&db, &options, &mut rng()).unwrap() else { panic!() };
        assert_eq!(result.records.len(), 3);
    }

    #[test]
    fn group_by_category_unions_fields_in_order() {
        let data = "%rec: Item\n\nType: EC Car\nCategory: Toy\n\nType: Terria\nCategory: Food\n\nType: Typex\nCategory: Office\n\nType: Notebook\nCategory: Office\n\nType: Sexy Puzzle\nCategory: Toy";
        let (db, _) = format::parse(data);
        let options = SelectorOptions { group_by: Some(vec!["Category".to_string()]), ..Default::default() };
        let SelectionOutcome::Records(result) = select(&db, &options, &mut rng()).unwrap() else { panic!() };
        assert_eq!(result.records.len(), 3);
        let office = result.records.iter().find(|r| r.get_field("Category") == Some("Office")).unwrap();
        assert_eq!(office.get_fields("Type"), vec!["Typex", "Notebook"]);
    }

    #[test]
    fn uniq_collapses_consecutive_duplicates_only() {
        let (db, _) = format::parse("Name: John\nTag: test\nTag: test\nTag: other");
        let options = SelectorOptions { uniq: true, ..Default::default() };
        let SelectionOutcome::Records(result) = select(&db, &options, &mut rng()).unwrap() else { panic!() };
        assert_eq!(result.records[0].get_fields("Tag"), vec!["test", "other"]);
    }

    #[test]
    fn count_ignores_projection() {
        let (db, _) = format::parse(ACQUAINTANCES);
        let options = SelectorOptions {
            expression: Some("Age < 18".to_string()),
            count: true,
            print_fields: Some(vec!["Name".to_string()]),
            ..Default::default()
        };
        assert_eq!(select(&db, &options, &mut rng()).unwrap(), SelectionOutcome::Count(2));
    }

    #[test]
    fn print_values_joins_with_newlines() {
        let (db, _) = format::parse("Name: Granny\nPhone: 1\n\nName: Doctor\nPhone: 2");
        let options = SelectorOptions { print_values: Some(vec!["Name".to_string()]), ..Default::default() };
        let SelectionOutcome::Values(values) = select(&db, &options, &mut rng()).unwrap() else { panic!() };
        assert_eq!(values, "Granny\nDoctor");
    }

    #[test]
    fn print_row_is_space_separated_per_record() {
        let (db, _) = format::parse("Name: Granny\nPhone: +12 23456677");
        let options = SelectorOptions {
            print_row: Some(vec!["Name".to_string(), "Phone".to_string()]),
            ..Default::default()
        };
        let SelectionOutcome::Rows(rows) = select(&db, &options, &mut rng()).unwrap() else { panic!() };
        assert_eq!(rows, vec!["Granny +12 23456677".to_string()]);
    }

    #[test]
    fn print_fields_keeps_only_listed_fields() {
        let (db, _) = format::parse("Name: Granny\nPhone: 123");
        let options = SelectorOptions { print_fields: Some(vec!["Name".to_string()]), ..Default::default() };
        let SelectionOutcome::Records(result) = select(&db, &options, &mut rng()).unwrap() else { panic!() };
        assert!(result.records[0].has_field("Name"));
        assert!(!result.records[0].has_field("Phone"));
    }

    #[test]
    fn sort_override_beats_descriptor_sort() {
        let data = "%rec: Item\n%sort: Title\n\nType: EC Car\nCategory: Toy\n\nType: Terria\nCategory: Food\n\nType: Typex\nCategory: Office";
        let (db, _) = format::parse(data);
        let options = SelectorOptions { sort: Some(vec!["Category".to_string()]), ..Default::default() };
        let SelectionOutcome::Records(result) = select(&db, &options, &mut rng()).unwrap() else { panic!() };
        let categories: Vec<_> = result.records.iter().map(|r| r.get_field("Category").unwrap()).collect();
        let mut expected = categories.clone();
        expected.sort_unstable();
        assert_eq!(categories, expected);
    }
}
