use crate::domain::model::Catalog;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Network primitives shared by every client operation.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Form-encoded POST whose response body is JSON.
    async fn post_form(&self, url: &str, form: &[(&str, String)]) -> Result<Value>;

    /// Plain GET returning the body as text.
    async fn get_text(&self, url: &str) -> Result<String>;
}

/// Key-value store with optional per-entry time-to-live.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value, ttl: Option<Duration>);
    fn clear(&self);

    fn get_or(&self, key: &str, default: Value) -> Value {
        self.get(key).unwrap_or(default)
    }
}

/// Turns a catalog page into entries keyed by service identifier.
pub trait CatalogParser: Send + Sync {
    fn parse(&self, html: &str) -> Result<Catalog>;
}
