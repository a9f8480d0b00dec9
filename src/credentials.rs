//! API credential resolution
//!
//! The credential is looked up by name in a [`SecretStore`]. Production uses
//! the process environment backed by the configuration file; tests use a
//! fixed map.

use std::collections::HashMap;
use std::env::{self, VarError};
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::config::GenerationConfig;
use crate::error::ConfigError;

/// API key for the generative-language service.
///
/// No `Display` or `Serialize`; `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Raw secret, for the transport only
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Source of named secrets supplied by the hosting environment
pub trait SecretStore: Send + Sync {
    /// `Ok(None)` when the secret is simply absent
    fn lookup(&self, name: &str) -> Result<Option<String>, String>;
}

/// Secrets read from process environment variables
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecrets;

impl SecretStore for EnvSecrets {
    fn lookup(&self, name: &str) -> Result<Option<String>, String> {
        match env::var(name) {
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => Err(format!("{name} is not valid unicode")),
        }
    }
}

/// Fixed set of secrets
#[derive(Default, Clone)]
pub struct StaticSecrets(HashMap<String, String>);

impl StaticSecrets {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }
}

impl SecretStore for StaticSecrets {
    fn lookup(&self, name: &str) -> Result<Option<String>, String> {
        Ok(self.0.get(name).cloned())
    }
}

/// Queries stores in order; the first non-blank value wins
#[derive(Default, Clone)]
pub struct ChainedSecrets(Vec<Arc<dyn SecretStore>>);

impl ChainedSecrets {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn then(mut self, store: impl SecretStore + 'static) -> Self {
        self.0.push(Arc::new(store));
        self
    }
}

impl SecretStore for ChainedSecrets {
    fn lookup(&self, name: &str) -> Result<Option<String>, String> {
        for store in &self.0 {
            if let Some(value) = store.lookup(name)? {
                if !value.trim().is_empty() {
                    return Ok(Some(value));
                }
            }
        }
        Ok(None)
    }
}

/// Look up the credential `name` in `store`
pub fn resolve_credential(store: &dyn SecretStore, name: &str) -> Result<Credential, ConfigError> {
    match store.lookup(name) {
        Ok(Some(value)) if !value.trim().is_empty() => {
            debug!(secret = name, "Credential resolved");
            Ok(Credential::new(value.trim()))
        }
        Ok(_) => Err(ConfigError::Missing {
            name: name.to_string(),
        }),
        Err(message) => Err(ConfigError::Other(message)),
    }
}

/// Resolves the API key from a configured store
#[derive(Clone)]
pub struct CredentialResolver {
    store: Arc<dyn SecretStore>,
    name: String,
}

impl CredentialResolver {
    pub fn new(store: impl SecretStore + 'static, name: impl Into<String>) -> Self {
        Self {
            store: Arc::new(store),
            name: name.into(),
        }
    }

    /// Environment first, then the key from the configuration file if any
    pub fn from_config(config: &GenerationConfig) -> Self {
        let mut store = ChainedSecrets::new().then(EnvSecrets);
        if let Some(key) = &config.api_key {
            store = store.then(StaticSecrets::new().with(config.api_key_name.clone(), key.clone()));
        }
        Self::new(store, config.api_key_name.clone())
    }

    /// Name of the secret this resolver looks for
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resolve(&self) -> Result<Credential, ConfigError> {
        resolve_credential(self.store.as_ref(), &self.name)
    }
}

impl fmt::Debug for CredentialResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialResolver")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
