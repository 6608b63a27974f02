//! API key authentication against the configured key set.
//!
//! Keys are declared in configuration (`[[api.keys]]`); there is no
//! issuance or rotation surface. Token comparison is constant-time.

use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::domain::scopes::ApiScope;

#[derive(Debug, Error)]
pub enum ApiAuthError {
    #[error("missing api key")]
    Missing,
    #[error("invalid api key")]
    Invalid,
    #[error("api key lacks scope `{0}`")]
    Forbidden(ApiScope),
}

/// An authenticated caller and the scopes its key grants.
#[derive(Debug, Clone)]
pub struct ApiPrincipal {
    pub name: String,
    pub scopes: Vec<ApiScope>,
}

impl ApiPrincipal {
    pub fn requires(&self, needed: ApiScope) -> Result<(), ApiAuthError> {
        if self.has(needed) {
            Ok(())
        } else {
            Err(ApiAuthError::Forbidden(needed))
        }
    }

    pub fn has(&self, scope: ApiScope) -> bool {
        self.scopes.contains(&scope)
    }
}

#[derive(Debug, Clone)]
pub struct ConfiguredKey {
    pub name: String,
    pub token: String,
    pub scopes: Vec<ApiScope>,
}

#[derive(Clone)]
pub struct ApiKeyService {
    keys: Vec<ConfiguredKey>,
}

impl ApiKeyService {
    pub fn new(keys: Vec<ConfiguredKey>) -> Self {
        Self { keys }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Resolve a presented token to a principal. Every configured key is
    /// compared so timing does not reveal which prefix matched.
    pub fn authenticate(&self, token: &str) -> Result<ApiPrincipal, ApiAuthError> {
        let mut matched: Option<&ConfiguredKey> = None;
        for key in &self.keys {
            if key.token.as_bytes().ct_eq(token.as_bytes()).unwrap_u8() == 1 {
                matched = Some(key);
            }
        }
        matched
            .map(|key| ApiPrincipal {
                name: key.name.clone(),
                scopes: key.scopes.clone(),
            })
            .ok_or(ApiAuthError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> ApiKeyService {
        ApiKeyService::new(vec![
            ConfiguredKey {
                name: "reader".into(),
                token: "reader-token".into(),
                scopes: vec![ApiScope::AuthorRead, ApiScope::BookRead],
            },
            ConfiguredKey {
                name: "editor".into(),
                token: "editor-token".into(),
                scopes: ApiScope::all().to_vec(),
            },
        ])
    }

    #[test]
    fn resolves_token_to_named_principal() {
        let principal = service().authenticate("editor-token").expect("valid key");
        assert_eq!(principal.name, "editor");
        assert!(principal.requires(ApiScope::BookWrite).is_ok());
    }

    #[test]
    fn rejects_unknown_token() {
        assert!(matches!(
            service().authenticate("nope"),
            Err(ApiAuthError::Invalid)
        ));
    }

    #[test]
    fn scope_check_reports_missing_scope() {
        let principal = service().authenticate("reader-token").expect("valid key");
        match principal.requires(ApiScope::AuthorWrite) {
            Err(ApiAuthError::Forbidden(scope)) => assert_eq!(scope, ApiScope::AuthorWrite),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
