pub mod cache;
pub mod catalog;
pub mod client;
pub mod records;

pub use crate::domain::model::{AccountBalance, Catalog, CatalogEntry, Language, OrderQuery, OrderStatus, Service};
pub use crate::domain::ports::{CacheStore, CatalogParser, Transport};
pub use crate::utils::error::Result;
