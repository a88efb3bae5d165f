use crate::adapters::http::HttpTransport;
use crate::config::toml_config::ClientConfig;
use crate::core::cache::{MemoryCache, NoopCache};
use crate::core::catalog::HtmlCatalogParser;
use crate::core::records;
use crate::domain::model::{AccountBalance, Catalog, CatalogEntry, Language, OrderQuery, OrderStatus, Service};
use crate::domain::ports::{CacheStore, CatalogParser, Transport};
use crate::utils::error::{Result, SocProofError};
use crate::utils::validation::{validate_non_empty_string, validate_positive_number};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://soc-proof.su/api/v2";
pub const DEFAULT_RU_CATALOG_URL: &str = "https://soc-proof.su/services";
pub const DEFAULT_EN_CATALOG_URL: &str = "https://soc-proof.su/en/services";
pub const DESCRIPTIONS_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const SERVICES_TTL: Duration = Duration::from_secs(5 * 60);

/// URLs the client talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub api: String,
    pub catalog_ru: String,
    pub catalog_en: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api: DEFAULT_API_URL.to_string(),
            catalog_ru: DEFAULT_RU_CATALOG_URL.to_string(),
            catalog_en: DEFAULT_EN_CATALOG_URL.to_string(),
        }
    }
}

impl Endpoints {
    pub fn catalog(&self, language: Language) -> &str {
        match language {
            Language::Ru => &self.catalog_ru,
            Language::En => &self.catalog_en,
        }
    }
}

/// Async client for the soc-proof API.
///
/// Catalog pages and service lists are cached per language in the injected
/// [`CacheStore`]; orders, statuses and balances always hit the network.
pub struct SocProofClient {
    token: String,
    endpoints: Endpoints,
    transport: Arc<dyn Transport>,
    cache: Arc<dyn CacheStore>,
    parser: Arc<dyn CatalogParser>,
    descriptions_ttl: Duration,
    services_ttl: Duration,
}

impl SocProofClient {
    /// Client with default endpoints, an in-memory cache and a plain reqwest transport.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            endpoints: Endpoints::default(),
            transport: Arc::new(HttpTransport::new()),
            cache: Arc::new(MemoryCache::new()),
            parser: Arc::new(HtmlCatalogParser::new()),
            descriptions_ttl: DESCRIPTIONS_TTL,
            services_ttl: SERVICES_TTL,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let cache: Arc<dyn CacheStore> = if config.cache.enabled {
            Arc::new(MemoryCache::new())
        } else {
            Arc::new(NoopCache)
        };

        Ok(Self {
            token: config.api.token.clone(),
            endpoints: Endpoints {
                api: config.api.url.clone(),
                catalog_ru: config.catalog.ru_url.clone(),
                catalog_en: config.catalog.en_url.clone(),
            },
            transport: Arc::new(HttpTransport::from_config(&config.http)?),
            cache,
            parser: Arc::new(HtmlCatalogParser::new()),
            descriptions_ttl: Duration::from_secs(config.cache.descriptions_ttl_seconds),
            services_ttl: Duration::from_secs(config.cache.services_ttl_seconds),
        })
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn CacheStore>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_parser(mut self, parser: Arc<dyn CatalogParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_ttls(mut self, descriptions: Duration, services: Duration) -> Self {
        self.descriptions_ttl = descriptions;
        self.services_ttl = services;
        self
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Catalog entries for `language`, from cache unless `force_reload`.
    pub async fn load_descriptions(&self, language: Language, force_reload: bool) -> Result<Catalog> {
        let cache_key = format!("descriptions_{}", language);
        if !force_reload {
            if let Some(cached) = self.cached::<Catalog>(&cache_key) {
                return Ok(cached);
            }
        }

        let url = self.endpoints.catalog(language);
        tracing::debug!(%language, url, "fetching catalog page");
        let html = self.transport.get_text(url).await?;
        let catalog = self.parser.parse(&html)?;
        tracing::info!(%language, entries = catalog.len(), "loaded service descriptions");

        self.store(&cache_key, &catalog, self.descriptions_ttl);
        Ok(catalog)
    }

    /// Service list with catalog text in `language`, from cache unless `force_reload`.
    pub async fn load_services(&self, language: Language, force_reload: bool) -> Result<Vec<Service>> {
        let cache_key = format!("services_{}", language);
        if !force_reload {
            if let Some(cached) = self.cached::<Vec<Service>>(&cache_key) {
                return Ok(cached);
            }
        }

        let descriptions = self.load_descriptions(language, force_reload).await?;
        let response = self.post("services", Vec::new()).await?;
        let Value::Array(raw_services) = response else {
            return Err(SocProofError::InvalidResponse(
                "Expected a list of services from API".to_string(),
            ));
        };

        let services = raw_services
            .iter()
            .map(|raw| {
                let id = records::service_id(raw)?;
                records::merge_service(raw, descriptions.get(&id))
            })
            .collect::<Result<Vec<_>>>()?;
        let unmatched = services
            .iter()
            .filter(|s| !descriptions.contains_key(&s.service))
            .count();
        tracing::info!(%language, services = services.len(), unmatched, "loaded services");

        self.store(&cache_key, &services, self.services_ttl);
        Ok(services)
    }

    pub async fn get_service(&self, service_id: u32, language: Language) -> Result<Service> {
        self.load_services(language, false)
            .await?
            .into_iter()
            .find(|s| s.service == service_id)
            .ok_or(SocProofError::ServiceNotFound(service_id))
    }

    /// Catalog entry for one service.
    pub async fn get_description(&self, service_id: u32, language: Language) -> Result<CatalogEntry> {
        self.load_descriptions(language, false)
            .await?
            .remove(&service_id)
            .ok_or(SocProofError::DescriptionNotFound(service_id))
    }

    /// Places an order and returns its identifier.
    pub async fn add_order(&self, service: u32, link: &str, quantity: u64) -> Result<String> {
        validate_non_empty_string("link", link)?;
        validate_positive_number("quantity", quantity, 1)?;

        let response = self
            .post(
                "add",
                vec![
                    ("service", service.to_string()),
                    ("link", link.to_string()),
                    ("quantity", quantity.to_string()),
                ],
            )
            .await?;

        let order_id = records::order_id(&response).ok_or(SocProofError::OrderNotFound { service })?;
        tracing::info!(service, quantity, order_id = %order_id, "order created");
        Ok(order_id)
    }

    /// Status of one or more orders, in the order the API returns them.
    pub async fn get_status(&self, orders: impl Into<OrderQuery>) -> Result<Vec<OrderStatus>> {
        let orders = orders.into();
        if orders.is_empty() {
            return Err(SocProofError::invalid_argument(
                "orders",
                orders.to_wire(),
                "At least one order ID is required",
            ));
        }

        let response = self.post("status", vec![("orders", orders.to_wire())]).await?;
        let Value::Object(entries) = response else {
            return Err(SocProofError::InvalidResponse(
                "Expected an object keyed by order ID".to_string(),
            ));
        };

        entries
            .iter()
            .map(|(order_id, data)| records::order_status(order_id, data))
            .collect()
    }

    pub async fn get_balance(&self) -> Result<AccountBalance> {
        let response = self.post("balance", Vec::new()).await?;
        records::account_balance(&response)
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    async fn post(&self, action: &str, params: Vec<(&str, String)>) -> Result<Value> {
        let mut form = Vec::with_capacity(params.len() + 2);
        form.push(("key", self.token.clone()));
        form.push(("action", action.to_string()));
        form.extend(params);

        tracing::debug!(action, "calling API");
        let response = self.transport.post_form(&self.endpoints.api, &form).await?;

        if let Some(message) = response.get("error").and_then(Value::as_str) {
            tracing::warn!(action, error = message, "API returned an error");
            return Err(SocProofError::Api(message.to_string()));
        }
        Ok(response)
    }

    fn cached<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.cache.get(key)?;
        match serde_json::from_value(value) {
            Ok(hit) => {
                tracing::debug!(key, "cache hit");
                Some(hit)
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding unreadable cache entry");
                None
            }
        }
    }

    fn store<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        match serde_json::to_value(value) {
            Ok(json) => self.cache.set(key, json, Some(ttl)),
            Err(e) => tracing::warn!(key, error = %e, "value not cached"),
        }
    }
}
