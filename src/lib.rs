pub mod core;
pub mod gateway;
pub mod panels;

pub use crate::core::{errors::PanelError, traits::PanelConnector, types::*};
pub use gateway::{Operation, OperationOutput, PanelGateway, PanelStore};
pub use panels::marzban::MarzbanConnector;
pub use panels::threexui::ThreeXUiConnector;
