use std::collections::HashSet;

/// The single source of truth for admin-ness. Built once from the
/// configured comma-separated allow-list; every check site asks this
/// service instead of re-parsing the config string.
pub struct AdminDirectory {
    emails: HashSet<String>,
}

impl AdminDirectory {
    pub fn from_allow_list(raw: &str) -> Self {
        let emails = raw
            .split(',')
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self { emails }
    }

    pub fn is_admin(&self, email: &str) -> bool {
        self.emails.contains(&email.trim().to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_case_insensitively() {
        let directory = AdminDirectory::from_allow_list("Admin@Example.com, ops@example.com");
        assert!(directory.is_admin("admin@example.com"));
        assert!(directory.is_admin("ADMIN@EXAMPLE.COM"));
        assert!(directory.is_admin(" ops@example.com "));
        assert!(!directory.is_admin("user@example.com"));
    }

    #[test]
    fn empty_list_grants_nobody() {
        let directory = AdminDirectory::from_allow_list("");
        assert!(directory.is_empty());
        assert!(!directory.is_admin("admin@example.com"));
    }

    #[test]
    fn ignores_stray_commas() {
        let directory = AdminDirectory::from_allow_list(",a@b.com,,c@d.com,");
        assert!(directory.is_admin("a@b.com"));
        assert!(directory.is_admin("c@d.com"));
        assert!(!directory.is_admin(""));
    }
}
