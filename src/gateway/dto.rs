//! Wire shapes exchanged with the vendor API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub(crate) const DEFAULT_EXPIRES_IN_SECONDS: i64 = 3600;

/// A whole collection gathered from every page of a listing endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VendorCollection {
    /// Raw vendor records, in page order
    pub values: Vec<Value>,
}

/// One page of a listing endpoint
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageDto {
    #[serde(default)]
    pub values: Vec<Value>,
    /// Total number of items the server claims to have
    #[serde(default)]
    pub total: Option<usize>,
}

/// Body of a client-credentials token response
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponseDto {
    pub access_token: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
}

const fn default_expires_in() -> i64 {
    DEFAULT_EXPIRES_IN_SECONDS
}
