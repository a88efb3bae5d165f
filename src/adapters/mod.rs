// Adapters layer: concrete implementations for external systems (http, file export).

pub mod export;
pub mod http;
