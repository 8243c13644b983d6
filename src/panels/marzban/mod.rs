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
pub use connector::MarzbanConnector;
pub use session::MarzbanSessionProvider;
pub use types::{MarzbanAdmin, MarzbanNode, MarzbanSystemInfo, MarzbanToken, MarzbanUser};

/// Per-request timeout observed by the original dashboard for Marzban.
pub const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Create a Marzban connector for one panel.
pub fn build_connector(config: PanelConfig) -> Result<MarzbanConnector<ReqwestRest>, PanelError> {
    let rest_config = RestClientConfig::new(config.base_url.clone(), "marzban".to_string())
        .with_timeout(REQUEST_TIMEOUT_SECS);

    let rest = Arc::new(RestClientBuilder::new(rest_config).build()?);

    Ok(MarzbanConnector::new(rest, config))
}
