//! Principal capability trait and user context extraction.

use serde::{Deserialize, Serialize};

/// The authenticated (or anonymous) actor behind a request or mutation.
///
/// Every accessor defaults to `None`; adapters implement only what their
/// principal type actually carries. The extractor never fails on a
/// missing attribute.
pub trait Principal: Send + Sync {
    /// Stable identifier of the principal, in string form.
    fn id(&self) -> Option<String>;

    fn title(&self) -> Option<String> {
        None
    }

    fn email(&self) -> Option<String> {
        None
    }

    fn first_name(&self) -> Option<String> {
        None
    }

    fn middle_name(&self) -> Option<String> {
        None
    }

    fn last_name(&self) -> Option<String> {
        None
    }

    fn sex(&self) -> Option<String> {
        None
    }

    fn date_of_birth(&self) -> Option<String> {
        None
    }
}

/// Fixed-shape identity block attached to every audit record.
///
/// Every key is always present; unknown values are empty strings. Only
/// these seven declared fields are ever copied off a principal, so
/// credential-like attributes can never leak into the output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserContext {
    pub title: String,
    pub email: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub sex: String,
    pub date_of_birth: String,
}

/// Extract the acting principal's id and demographic context.
///
/// An absent or anonymous principal yields `(None, UserContext::default())`.
pub fn extract(principal: Option<&dyn Principal>) -> (Option<String>, UserContext) {
    let Some(principal) = principal else {
        return (None, UserContext::default());
    };

    let info = UserContext {
        title: principal.title().unwrap_or_default(),
        email: principal.email().unwrap_or_default(),
        first_name: principal.first_name().unwrap_or_default(),
        middle_name: principal.middle_name().unwrap_or_default(),
        last_name: principal.last_name().unwrap_or_default(),
        sex: principal.sex().unwrap_or_default(),
        date_of_birth: principal.date_of_birth().unwrap_or_default(),
    };

    (principal.id(), info)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FullPrincipal;

    impl Principal for FullPrincipal {
        fn id(&self) -> Option<String> {
            Some("14ab".to_string())
        }
        fn title(&self) -> Option<String> {
            Some("Dr".to_string())
        }
        fn email(&self) -> Option<String> {
            Some("test@example.com".to_string())
        }
        fn first_name(&self) -> Option<String> {
            Some("Test".to_string())
        }
        fn last_name(&self) -> Option<String> {
            Some("User".to_string())
        }
    }

    struct BarePrincipal;

    impl Principal for BarePrincipal {
        fn id(&self) -> Option<String> {
            Some("77".to_string())
        }
    }

    #[test]
    fn test_anonymous_yields_empty_context() {
        let (user_id, info) = extract(None);
        assert_eq!(user_id, None);
        assert_eq!(info, UserContext::default());
    }

    #[test]
    fn test_present_attributes_are_copied() {
        let (user_id, info) = extract(Some(&FullPrincipal));
        assert_eq!(user_id.as_deref(), Some("14ab"));
        assert_eq!(info.title, "Dr");
        assert_eq!(info.email, "test@example.com");
        assert_eq!(info.first_name, "Test");
        assert_eq!(info.last_name, "User");
        // Unimplemented accessors fall back to empty strings.
        assert_eq!(info.middle_name, "");
        assert_eq!(info.sex, "");
        assert_eq!(info.date_of_birth, "");
    }

    #[test]
    fn test_missing_attributes_never_fail() {
        let (user_id, info) = extract(Some(&BarePrincipal));
        assert_eq!(user_id.as_deref(), Some("77"));
        assert_eq!(info, UserContext::default());
    }

    #[test]
    fn test_context_serializes_all_seven_keys() {
        let value = serde_json::to_value(UserContext::default()).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(
            keys,
            [
                "title",
                "email",
                "first_name",
                "middle_name",
                "last_name",
                "sex",
                "date_of_birth"
            ]
        );
    }
}
