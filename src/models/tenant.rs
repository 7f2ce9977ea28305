use garde::Validate;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Connection settings for a tenant's Source-of-Truth provider, stored as a
/// JSON document on the tenant row and resolved once per job.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq, Hash)]
pub struct ProviderConfig {
    #[garde(length(min = 1, max = 64))]
    pub provider_name: String,

    #[garde(length(min = 1, max = 512))]
    pub api_base_url: String,

    #[garde(length(min = 1, max = 128))]
    pub client_id: String,

    /// AES key for result artifacts, raw UTF-8 bytes (16 or 32 of them).
    #[garde(custom(key_length))]
    pub result_key: String,

    /// CBC initialization vector, raw UTF-8 bytes (exactly 16).
    #[garde(custom(iv_length))]
    pub result_iv: String,
}

fn key_length(value: &str, _ctx: &()) -> garde::Result {
    match value.len() {
        16 | 32 => Ok(()),
        n => Err(garde::Error::new(format!(
            "result key must be 16 or 32 bytes, got {n}"
        ))),
    }
}

fn iv_length(value: &str, _ctx: &()) -> garde::Result {
    if value.len() == 16 {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "result IV must be 16 bytes, got {}",
            value.len()
        )))
    }
}

impl ProviderConfig {
    /// Stable hash used to cache one HTTP client per distinct configuration.
    pub fn cache_key(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}
