//! The `recfix`-equivalent entry point: runs the integrity checker and,
//! optionally, the sort/auto/encrypt/decrypt transforms in one call, gating
//! the transforms on the check's outcome.

use rand::RngCore;
use rec_core::{all_ok, Database, Diagnostic};

use crate::{check::check, transform};

/// Options accepted by [`run`], mirroring `recfix`'s abstract CLI surface.
#[derive(Clone, Debug, Default)]
pub struct FixOptions {
    /// Run the integrity checker first (default `true` in the CLI; callers
    /// of this library function choose explicitly).
    pub check: bool,
    /// Apply `%sort` (or record sets' own ordering if absent) after checking.
    pub sort: bool,
    /// Fill in `%auto` fields after checking (and after sorting, if both are set).
    pub auto: bool,
    /// Encrypt `%confidential` fields.
    pub encrypt: bool,
    /// Decrypt `%confidential` fields.
    pub decrypt: bool,
    /// The password used by `encrypt`/`decrypt`.
    pub password: Option<String>,
    /// Apply the requested transforms even when `check` reported errors.
    pub force: bool,
}

/// The outcome of [`run`]: whether the database is sound, the diagnostics
/// that led to that verdict, and the (possibly transformed) database.
#[derive(Clone, Debug, Default)]
pub struct FixResult {
    /// True iff no diagnostic in `diagnostics` has [`rec_core::Severity::Error`].
    pub success: bool,
    /// Diagnostics accumulated from the integrity check and any transforms
    /// that reported problems (e.g. `password required`, `already encrypted`).
    pub diagnostics: Vec<Diagnostic>,
    /// The database, transformed according to `options` unless the
    /// transforms were skipped because `check` failed and `force` was false.
    pub database: Database,
}

/// Runs `options.check` (if set) and then any of `sort`/`auto`/`encrypt`/
/// `decrypt` requested, in that order.
///
/// When `check=true` and the check reports any `error`-severity diagnostic,
/// the transforms are skipped unless `force=true`.
pub fn run(database: Database, options: &FixOptions, rng: &mut impl RngCore) -> FixResult {
    let mut diagnostics = if options.check { check(&database) } else { Vec::new() };
    let success = all_ok(&diagnostics);

    if !success && !options.force {
        return FixResult {
            success,
            diagnostics,
            database,
        };
    }

    let mut database = database;
    if options.sort {
        database = transform::sort_database(database);
    }
    if options.auto {
        database = transform::auto_database(database, rng);
    }
    if options.encrypt {
        let (next, encrypt_diags) = transform::encrypt_database(database, options.password.as_deref(), options.force);
        database = next;
        diagnostics.extend(encrypt_diags);
    }
    if options.decrypt {
        let (next, decrypt_diags) = transform::decrypt_database(database, options.password.as_deref());
        database = next;
        diagnostics.extend(decrypt_diags);
    }

    let success = success && all_ok(&diagnostics);
    FixResult {
        success,
        diagnostics,
        database,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format;
    use rand::{rngs::StdRng, SeedableRng};

    fn rng() -> StdRng {
        StdRng::seed_from_u64(3)
    }

    #[test]
    fn valid_database_succeeds_with_no_errors() {
        let (db, _) = format::parse("%rec: Contact\n%mandatory: Name\n\nName: John\nPhone: 123");
        let result = run(db, &FixOptions { check: true, ..Default::default() }, &mut rng());
        assert!(result.success);
        assert!(result.diagnostics.is_empty());
    }

    #[test]
    fn missing_mandatory_field_fails_the_check() {
        let (db, _) = format::parse("%rec: Contact\n%mandatory: Name Email\n\nName: John\nEmail: j@example.com\n\nName: Jane");
        let result = run(db, &FixOptions { check: true, ..Default::default() }, &mut rng());
        assert!(!result.success);
        assert!(result.diagnostics.iter().any(|d| d.field_name.as_deref() == Some("Email")));
    }

    #[test]
    fn check_blocks_destructive_ops_on_error() {
        let (db, _) = format::parse("%rec: Item\n%mandatory: Name\n%sort: Id\n\nId: 2\n\nId: 1");
        let options = FixOptions {
            check: true,
            sort: true,
            ..Default::default()
        };
        let result = run(db, &options, &mut rng());
        assert!(!result.success);
        let ids: Vec<_> = result.database.record_sets[0].records.iter().map(|r| r.get_field("Id").unwrap()).collect();
        assert_eq!(ids, vec!["2", "1"], "sort must not run when check failed without force");
    }

    #[test]
    fn force_allows_destructive_ops_despite_errors() {
        let (db, _) = format::parse("%rec: Item\n%mandatory: Name\n%sort: Id\n\nId: 2\n\nId: 1");
        let options = FixOptions {
            check: true,
            sort: true,
            force: true,
            ..Default::default()
        };
        let result = run(db, &options, &mut rng());
        let ids: Vec<_> = result.database.record_sets[0].records.iter().map(|r| r.get_field("Id").unwrap()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn combined_sort_and_auto() {
        let (db, _) = format::parse(
            "%rec: Item\n%type: Id int\n%auto: Id\n%sort: Name\n\nName: Charlie\n\nName: Alice\n\nName: Bob",
        );
        let options = FixOptions {
            check: false,
            sort: true,
            auto: true,
            ..Default::default()
        };
        let result = run(db, &options, &mut rng());
        let names: Vec<_> = result.database.record_sets[0].records.iter().map(|r| r.get_field("Name").unwrap()).collect();
        assert_eq!(names, vec!["Alice", "Bob", "Charlie"]);
        assert!(result.database.record_sets[0].records.iter().all(|r| r.has_field("Id")));
    }

    #[test]
    fn encrypt_then_decrypt_round_trips_through_fix() {
        let (db, _) = format::parse("%rec: Contact\n%confidential: Password\n\nName: John\nPassword: secret123");
        let encrypt_options = FixOptions {
            check: false,
            encrypt: true,
            password: Some("mykey".to_string()),
            ..Default::default()
        };
        let encrypted = run(db, &encrypt_options, &mut rng());
        assert!(encrypted.success);

        let decrypt_options = FixOptions {
            check: false,
            decrypt: true,
            password: Some("mykey".to_string()),
            ..Default::default()
        };
        let decrypted = run(encrypted.database, &decrypt_options, &mut rng());
        assert_eq!(
            decrypted.database.record_sets[0].records[0].get_field("Password"),
            Some("secret123")
        );
    }
}
