pub mod marzban;
pub mod threexui;
