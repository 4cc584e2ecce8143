//! Public types for the diagnostics API
use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Whether the provider credential is configured. Never includes the key.
#[derive(Serialize, Debug)]
pub struct CredentialStatus {
    pub api_key_exists: bool,
    pub api_key_length: usize,
}

#[derive(Serialize, Debug)]
pub struct EchoResponse {
    pub success: bool,
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub body: Value,
    pub env_vars: CredentialStatus,
}
