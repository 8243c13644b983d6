pub mod connector;
pub mod converters;
pub mod rest;
pub mod session;
pub mod types;

use crate::core::config::PanelConfig;
use crate::core::errors::PanelError;
use crate::core::kernel::{ReqwestRest, RestClientBuilder, RestClientConfig};
use std::sync::Arc;

// Re-export main types for easier importing
pub use connector::ThreeXUiConnector;
pub use session::ThreeXUiSessionProvider;
pub use types::{XuiClient, XuiClientStat, XuiEnvelope, XuiInbound};

/// Per-request timeout observed by the original dashboard for 3x-ui.
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Create a 3x-ui connector for one panel.
pub fn build_connector(config: PanelConfig) -> Result<ThreeXUiConnector<ReqwestRest>, PanelError> {
    let rest_config = RestClientConfig::new(config.base_url.clone(), "threexui".to_string())
        .with_timeout(REQUEST_TIMEOUT_SECS);

    let rest = Arc::new(RestClientBuilder::new(rest_config).build()?);

    Ok(ThreeXUiConnector::new(rest, config))
}
