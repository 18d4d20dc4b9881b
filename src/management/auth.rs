use chrono::{DateTime, Utc};

use crate::types::AccessToken;

/// Holds the one access token the widget currently considers valid.
///
/// The token lives in memory only. A successful refresh always replaces it,
/// a rejected token is kept until a replacement arrives. A token close to
/// its stated expiry is no longer handed out.
#[derive(Debug, Default)]
pub struct TokenManager {
    token: Option<AccessToken>,
}

impl TokenManager {
    pub fn new(token: Option<AccessToken>) -> Self {
        TokenManager { token }
    }

    /// Seeds the manager with a pre-obtained token from configuration.
    pub fn from_configured(access_token: Option<&str>) -> Self {
        Self::new(
            access_token
                .filter(|t| !t.is_empty())
                .map(AccessToken::preconfigured),
        )
    }

    pub fn current_token(&self) -> Option<&AccessToken> {
        self.token.as_ref()
    }

    pub fn bearer(&self) -> Option<String> {
        self.bearer_at(Utc::now())
    }

    /// Bearer string if the token is still usable at `now`.
    pub fn bearer_at(&self, now: DateTime<Utc>) -> Option<String> {
        self.token
            .as_ref()
            .filter(|t| !t.is_expired(now))
            .map(|t| t.access_token.clone())
    }

    /// Supersedes the current token.
    pub fn replace(&mut self, token: AccessToken) -> &AccessToken {
        self.token.insert(token)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn test_empty_configured_token_is_absent() {
        assert!(TokenManager::from_configured(Some("")).current_token().is_none());
        assert!(TokenManager::from_configured(None).current_token().is_none());
    }

    #[test]
    fn test_replace_supersedes_token() {
        let mut manager = TokenManager::from_configured(Some("old"));
        assert_eq!(manager.bearer().as_deref(), Some("old"));

        manager.replace(AccessToken::preconfigured("new"));
        assert_eq!(manager.bearer().as_deref(), Some("new"));
    }

    #[test]
    fn test_token_near_expiry_is_not_handed_out() {
        let obtained_at = Utc::now();
        let manager = TokenManager::new(Some(AccessToken {
            access_token: "minted".to_string(),
            expires_in: 3600,
            obtained_at,
        }));

        let early = obtained_at + Duration::seconds(3000);
        let inside_margin = obtained_at + Duration::seconds(3550);
        assert_eq!(manager.bearer_at(early).as_deref(), Some("minted"));
        assert_eq!(manager.bearer_at(inside_margin), None);
        assert!(manager.current_token().is_some());
    }

    #[test]
    fn test_configured_token_never_expires() {
        let manager = TokenManager::from_configured(Some("static"));
        let much_later = Utc::now() + Duration::days(30);
        assert_eq!(manager.bearer_at(much_later).as_deref(), Some("static"));
    }
}
