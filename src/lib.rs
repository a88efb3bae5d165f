pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::export::ExportFormat;
pub use adapters::http::HttpTransport;
pub use config::ClientConfig;
pub use core::cache::{MemoryCache, NoopCache};
pub use core::catalog::HtmlCatalogParser;
pub use core::client::{Endpoints, SocProofClient};
pub use domain::model::{AccountBalance, Catalog, CatalogEntry, Language, OrderQuery, OrderStatus, Service};
pub use domain::ports::{CacheStore, CatalogParser, Transport};
pub use utils::error::{Result, SocProofError};
