//! Process-wide severity table.
//!
//! The table is populated once at startup and read-only afterwards.
//! Registration is guarded by a mutex so concurrent initialization
//! cannot race into a double registration.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, OnceLock};

use crate::error::{AuditError, AuditResult, RegistryErrorKind};

/// Numeric level for the AUDIT severity, between INFO (20) and WARNING (30).
pub const AUDIT_LEVEL: u8 = 21;

/// Numeric level for the API severity, between INFO (20) and WARNING (30).
pub const API_LEVEL: u8 = 22;

/// Numeric level for the LOGIN severity, between INFO (20) and WARNING (30).
pub const LOGIN_LEVEL: u8 = 23;

/// Domain-specific severities for audit records.
///
/// These sit between the standard INFO and WARNING levels so that audit
/// traffic can be routed and filtered independently of ordinary
/// diagnostic logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Model mutation events (CRUD), level 21.
    Audit,
    /// Request and external call events, level 22.
    Api,
    /// Login/logout usage events, level 23.
    Login,
}

impl Severity {
    /// Numeric level of this severity.
    pub fn value(self) -> u8 {
        match self {
            Severity::Audit => AUDIT_LEVEL,
            Severity::Api => API_LEVEL,
            Severity::Login => LOGIN_LEVEL,
        }
    }

    /// Upper-case severity name as it appears in emitted records.
    pub fn name(self) -> &'static str {
        match self {
            Severity::Audit => "AUDIT",
            Severity::Api => "API",
            Severity::Login => "LOGIN",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn table() -> &'static Mutex<HashMap<String, u8>> {
    static TABLE: OnceLock<Mutex<HashMap<String, u8>>> = OnceLock::new();
    TABLE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Register a severity name at a numeric level.
///
/// Re-registering an identical (name, level) pair is a no-op. Registering
/// a different level under an existing name is a configuration error and
/// leaves the table unchanged.
pub fn register(name: &str, level: u8) -> AuditResult<()> {
    let mut table = table().lock().map_err(|_| AuditError::Registry {
        kind: RegistryErrorKind::LockPoisoned,
    })?;

    match table.get(name) {
        Some(&existing) if existing == level => Ok(()),
        Some(&existing) => Err(AuditError::Registry {
            kind: RegistryErrorKind::Conflict {
                name: name.to_string(),
                existing,
                requested: level,
            },
        }),
        None => {
            table.insert(name.to_string(), level);
            Ok(())
        }
    }
}

/// Register the built-in AUDIT, API, and LOGIN severities.
///
/// Safe to call more than once; meant to run exactly once at process
/// start before any channel emits.
pub fn init() -> AuditResult<()> {
    register(Severity::Audit.name(), AUDIT_LEVEL)?;
    register(Severity::Api.name(), API_LEVEL)?;
    register(Severity::Login.name(), LOGIN_LEVEL)?;
    Ok(())
}

/// Look up the numeric level registered under a severity name.
pub fn level_of(name: &str) -> Option<u8> {
    table().lock().ok()?.get(name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_values() {
        assert_eq!(Severity::Audit.value(), 21);
        assert_eq!(Severity::Api.value(), 22);
        assert_eq!(Severity::Login.value(), 23);
        assert_eq!(Severity::Audit.name(), "AUDIT");
        assert_eq!(Severity::Api.name(), "API");
        assert_eq!(Severity::Login.name(), "LOGIN");
    }

    #[test]
    fn test_init_is_idempotent() {
        init().unwrap();
        init().unwrap();
        assert_eq!(level_of("AUDIT"), Some(21));
        assert_eq!(level_of("API"), Some(22));
        assert_eq!(level_of("LOGIN"), Some(23));
    }

    #[test]
    fn test_reregistering_same_pair_is_noop() {
        register("TEST_SAME", 25).unwrap();
        register("TEST_SAME", 25).unwrap();
        assert_eq!(level_of("TEST_SAME"), Some(25));
    }

    #[test]
    fn test_conflicting_level_is_error() {
        register("TEST_CONFLICT", 25).unwrap();
        let err = register("TEST_CONFLICT", 26).unwrap_err();
        assert!(matches!(
            err,
            AuditError::Registry {
                kind: RegistryErrorKind::Conflict { .. }
            }
        ));
        // Table keeps the original level.
        assert_eq!(level_of("TEST_CONFLICT"), Some(25));
    }

    #[test]
    fn test_builtin_name_rejects_other_level() {
        init().unwrap();
        assert!(register("AUDIT", 22).is_err());
        assert_eq!(level_of("AUDIT"), Some(21));
    }

    #[test]
    fn test_unknown_name_is_none() {
        assert_eq!(level_of("NO_SUCH_SEVERITY"), None);
    }

    #[test]
    fn test_concurrent_registration_single_winner() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| register("TEST_RACE", 27)))
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }
        assert_eq!(level_of("TEST_RACE"), Some(27));
    }
}
