//! Storage key constants.

/// Storage keys used by the storefront tools.
pub struct StorageKeys;

impl StorageKeys {
    /// Prefix of the platform client's own entries.
    pub const PLATFORM_PREFIX: &'static str = "sb-";

    /// Legacy prefix written by older platform clients.
    pub const LEGACY_PLATFORM_PREFIX: &'static str = "supabase.";

    /// Key holding the persisted auth session (JSON) for a project.
    pub fn auth_token(project_ref: &str) -> String {
        format!("{}{}-auth-token", Self::PLATFORM_PREFIX, project_ref)
    }

    /// True for any key that belongs to authentication state.
    pub fn is_auth_key(key: &str) -> bool {
        key.starts_with(Self::LEGACY_PLATFORM_PREFIX) || key.contains("auth")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_token_key_format() {
        assert_eq!(StorageKeys::auth_token("abcd"), "sb-abcd-auth-token");
    }

    #[test]
    fn auth_key_detection() {
        assert!(StorageKeys::is_auth_key("sb-abcd-auth-token"));
        assert!(StorageKeys::is_auth_key("supabase.auth.token"));
        assert!(StorageKeys::is_auth_key("supabase.session"));
        assert!(!StorageKeys::is_auth_key("theme"));
    }
}
