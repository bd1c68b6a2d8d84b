//! LMDB database integrity checks.
//!
//! Run on startup to detect corruption early, before the bot starts
//! accepting verification requests.

use std::path::Path;
use std::sync::Arc;

use heed::Env;

use crate::environment::{IDENTITIES_DB, LOGINS_DB};
use crate::LmdbError;

/// Summary of an integrity check run.
#[derive(Debug, Default)]
pub struct IntegrityReport {
    pub databases_checked: u32,
    pub identities: u64,
    pub indexed_logins: u64,
    pub errors: Vec<String>,
}

impl IntegrityReport {
    /// Returns `true` if no errors were detected.
    pub fn is_healthy(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Check LMDB database integrity on startup.
///
/// Counts both tables and flags a size mismatch between the identity table
/// and its login index. Read failures are recorded in the report rather
/// than causing a hard error.
pub fn check_integrity(env: &Arc<Env>) -> Result<IntegrityReport, LmdbError> {
    let mut report = IntegrityReport::default();
    let rtxn = env.read_txn()?;

    for db_name in [IDENTITIES_DB, LOGINS_DB] {
        match env.open_database::<heed::types::Bytes, heed::types::Bytes>(&rtxn, Some(db_name)) {
            Ok(Some(db)) => {
                report.databases_checked += 1;
                match db.len(&rtxn) {
                    Ok(count) if db_name == IDENTITIES_DB => report.identities = count,
                    Ok(count) => report.indexed_logins = count,
                    Err(e) => report
                        .errors
                        .push(format!("failed to read database '{db_name}': {e}")),
                }
            }
            Ok(None) => report
                .errors
                .push(format!("database '{db_name}' is missing")),
            Err(e) => report
                .errors
                .push(format!("failed to open database '{db_name}': {e}")),
        }
    }

    if report.errors.is_empty() && report.identities != report.indexed_logins {
        report.errors.push(format!(
            "login index has {} entries but {} identities are stored",
            report.indexed_logins, report.identities
        ));
    }

    Ok(report)
}

/// Check if the LMDB data directory looks valid before opening.
///
/// Returns `Ok(())` for a fresh (nonexistent or empty) directory. Returns an
/// error if the directory has other files but `data.mdb` is missing, which
/// suggests corruption or misconfiguration.
pub fn check_data_dir(path: &Path) -> Result<(), String> {
    if !path.exists() {
        return Ok(());
    }
    let is_empty = path
        .read_dir()
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false);
    if is_empty {
        return Ok(());
    }
    let data_file = path.join("data.mdb");
    if !data_file.exists() {
        return Err(format!(
            "LMDB directory exists but data.mdb is missing at {}",
            path.display()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LmdbEnvironment;
    use peerlink_store::IdentityStore;
    use peerlink_types::{ExternalLogin, PlatformUserId};

    #[test]
    fn check_data_dir_fresh_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_data_dir(&dir.path().join("not-created")).is_ok());
    }

    #[test]
    fn check_data_dir_without_data_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_data_dir(dir.path()).is_ok());
        std::fs::write(dir.path().join("lock.mdb"), b"").unwrap();
        assert!(check_data_dir(dir.path()).is_err());
    }

    #[test]
    fn populated_environment_is_healthy() {
        let dir = tempfile::tempdir().unwrap();
        let env = LmdbEnvironment::open(dir.path(), 10 * 1024 * 1024).unwrap();
        let store = env.identity_store();
        for (id, login) in [(1, "alpha"), (2, "beta")] {
            store
                .upsert(PlatformUserId::new(id), &ExternalLogin::parse(login).unwrap(), None)
                .unwrap();
        }

        let report = check_integrity(env.env()).unwrap();
        assert!(report.is_healthy(), "{:?}", report.errors);
        assert_eq!(report.databases_checked, 2);
        assert_eq!(report.identities, 2);
        assert_eq!(report.indexed_logins, 2);
    }
}
