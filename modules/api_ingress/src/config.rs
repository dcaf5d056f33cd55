use serde::{Deserialize, Serialize};

/// 16 MiB
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 16 * 1024 * 1024;

/// API ingress configuration (`modules.api_ingress`).
///
/// The listen address and request timeout come from the global `server`
/// section; this section only shapes the HTTP surface.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ApiIngressConfig {
    /// Serve `/openapi.json` and `/docs`.
    pub enable_docs: bool,
    pub cors_enabled: bool,
    /// Maximum accepted request body size.
    pub body_limit_bytes: usize,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            enable_docs: true,
            cors_enabled: false,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}
