//! Path-based audit filtering.

/// Decides which request paths are audited.
///
/// Exclusions win: a path matching an exclude prefix is never audited.
/// When the include list is non-empty, only paths matching an include
/// prefix are audited; an empty include list audits everything else.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    exclude: Vec<String>,
    include: Vec<String>,
}

impl PathFilter {
    pub fn new<I, S>(exclude: I, include: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            exclude: exclude.into_iter().map(Into::into).collect(),
            include: include.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether a request to `path` should be audited.
    pub fn should_audit(&self, path: &str) -> bool {
        if self.exclude.iter().any(|prefix| path.starts_with(prefix)) {
            return false;
        }

        if !self.include.is_empty() {
            return self.include.iter().any(|prefix| path.starts_with(prefix));
        }

        true
    }
}
