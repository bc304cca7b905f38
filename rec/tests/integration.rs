//! Black-box tests exercising the public `rec` API end to end: a rec-format
//! buffer in, select/check/fix/serialize across the whole pipeline.

use rand::{rngs::StdRng, SeedableRng};

const BOOKS: &str = "\
%rec: Book
%mandatory: Title
%type: Location enum loaned home unknown

Title: GNU Emacs Manual
Author: Richard M. Stallman
Publisher: FSF
Location: home

Title: The Colour of Magic
Author: Terry Pratchett
Location: loaned

Title: Mio Cid
Author: Anonymous
Location: home

Title: chapters.gnu.org administration guide
Author: Nacho Gonzalez
Author: Jose E. Marchesi
Location: unknown

Title: Yeelong User Manual
Location: home";

#[test]
fn select_loaned_books_and_project_title() {
    let (db, diags) = rec::parse(BOOKS);
    assert!(diags.is_empty());

    let options = rec::SelectorOptions {
        record_type: Some("Book".to_string()),
        expression: Some("Location = 'loaned'".to_string()),
        print_values: Some(vec!["Title".to_string()]),
        ..Default::default()
    };
    let rec::SelectionOutcome::Values(values) = rec::select(&db, &options, &mut StdRng::seed_from_u64(1)).unwrap()
    else {
        panic!("expected Values outcome");
    };
    assert_eq!(values, "The Colour of Magic");
}

#[test]
fn checking_books_reports_no_errors() {
    let (db, _) = rec::parse(BOOKS);
    let diagnostics = rec::check(&db);
    assert!(rec::all_ok(&diagnostics), "{:?}", diagnostics);
}

#[test]
fn author_multiplicity_survives_select_and_serialize() {
    let (db, _) = rec::parse(BOOKS);
    let options = rec::SelectorOptions {
        record_type: Some("Book".to_string()),
        expression: Some("Title ~ 'chapters'".to_string()),
        ..Default::default()
    };
    let rec::SelectionOutcome::Records(result) = rec::select(&db, &options, &mut StdRng::seed_from_u64(1)).unwrap()
    else {
        panic!("expected Records outcome");
    };
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].get_fields("Author"), vec!["Nacho Gonzalez", "Jose E. Marchesi"]);

    let serialized = rec::serialize(&db);
    let (reparsed, diags) = rec::parse(&serialized);
    assert!(diags.is_empty());
    assert_eq!(db, reparsed, "round trip must be structurally equal");
}

#[test]
fn fix_encrypts_confidential_fields_and_blocks_on_unforced_errors() {
    let data = "%rec: Contact\n%mandatory: Name\n%confidential: Password\n\nId: 1\nPassword: hunter2";
    let (db, _) = rec::parse(data);

    let options = rec::FixOptions {
        check: true,
        encrypt: true,
        password: Some("k".to_string()),
        ..Default::default()
    };
    let result = rec::fix(db, &options, &mut StdRng::seed_from_u64(2));
    assert!(!result.success, "missing mandatory Name should fail the check");
    // Password field is untouched because the check failed and force was false.
    assert_eq!(result.database.record_sets[0].records[0].get_field("Password"), Some("hunter2"));
}

#[test]
fn group_by_scenario_from_spec() {
    let data = "\
%rec: Item

Type: EC Car
Category: Toy

Type: Terria
Category: Food

Type: Typex
Category: Office

Type: Notebook
Category: Office

Type: Sexy Puzzle
Category: Toy";
    let (db, _) = rec::parse(data);
    let options = rec::SelectorOptions {
        record_type: Some("Item".to_string()),
        group_by: Some(vec!["Category".to_string()]),
        ..Default::default()
    };
    let rec::SelectionOutcome::Records(result) = rec::select(&db, &options, &mut StdRng::seed_from_u64(3)).unwrap()
    else {
        panic!("expected Records outcome");
    };
    assert_eq!(result.records.len(), 3);
    let office = result.records.iter().find(|r| r.get_field("Category") == Some("Office")).unwrap();
    assert_eq!(office.get_fields("Type"), vec!["Typex", "Notebook"]);
}

#[test]
fn key_duplicate_scenario_from_spec() {
    let data = "%rec: C\n%key: Id\n\nId: 1\n\nId: 1";
    let (db, _) = rec::parse(data);
    let diagnostics = rec::check(&db);
    let duplicate = diagnostics
        .iter()
        .find(|d| d.field_name.as_deref() == Some("Id") && d.message.contains("duplicate key"))
        .expect("expected a duplicate-key diagnostic");
    assert_eq!(duplicate.severity, rec::Severity::Error);
}

#[test]
fn idempotent_check_does_not_mutate_the_database() {
    let (db, _) = rec::parse(BOOKS);
    let first = rec::check(&db);
    let second = rec::check(&db);
    assert_eq!(first, second);
}
