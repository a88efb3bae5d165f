//! Typed records from raw API JSON.
//!
//! The API is loose about types: numbers arrive as JSON numbers or as numeric
//! strings, flags as booleans, `0`/`1` or strings. Each accessor accepts those
//! spellings and reports the offending field otherwise.

use crate::domain::model::{AccountBalance, CatalogEntry, OrderStatus, Service};
use crate::utils::error::{Result, SocProofError};
use serde_json::{Map, Number, Value};

pub(crate) const STATUS_FIELDS: [&str; 3] = ["charge", "status", "remains"];

/// Merges one raw `services` record with its catalog entry.
///
/// Name, description and time always come from the catalog; when the service
/// has no catalog entry they are empty. Category comes from the API record and
/// falls back to the catalog category.
pub fn merge_service(raw: &Value, entry: Option<&CatalogEntry>) -> Result<Service> {
    let obj = as_object(raw, "service record")?;
    let fallback = CatalogEntry::default();
    let entry = entry.unwrap_or(&fallback);

    let category = optional_string(obj, "category")
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| entry.category.trim().to_string());

    Ok(Service {
        service: service_id(raw)?,
        name: entry.name.trim().to_string(),
        service_type: required_string(obj, "type")?,
        rate: required_f64(obj, "rate")?,
        min: required_u64(obj, "min")?,
        max: required_u64(obj, "max")?,
        refill: optional_bool(obj, "refill"),
        cancel: optional_bool(obj, "cancel"),
        category,
        description: entry.description.trim().to_string(),
        time: entry.time.trim().to_string(),
    })
}

/// Identifier of a raw `services` record.
pub fn service_id(raw: &Value) -> Result<u32> {
    let obj = as_object(raw, "service record")?;
    let id = required_u64(obj, "service")?;
    u32::try_from(id).map_err(|_| SocProofError::parse("service", format!("{} is out of range", id)))
}

/// Fields from [`STATUS_FIELDS`] absent in one status entry.
pub fn missing_status_fields(data: &Value) -> Vec<String> {
    STATUS_FIELDS
        .iter()
        .filter(|field| data.get(**field).is_none())
        .map(|field| field.to_string())
        .collect()
}

pub fn order_status(order_id: &str, data: &Value) -> Result<OrderStatus> {
    let missing = missing_status_fields(data);
    if !missing.is_empty() {
        return Err(SocProofError::OrderStatus {
            order_id: order_id.to_string(),
            missing_fields: missing,
        });
    }
    let obj = as_object(data, "order status")?;

    Ok(OrderStatus {
        order_id: order_id.to_string(),
        charge: required_f64(obj, "charge")?,
        status: required_string(obj, "status")?,
        remains: required_i64(obj, "remains")?,
    })
}

pub fn account_balance(raw: &Value) -> Result<AccountBalance> {
    let obj = as_object(raw, "balance response")?;
    Ok(AccountBalance {
        balance: required_f64(obj, "balance")?,
        currency: optional_string(obj, "currency").unwrap_or_default(),
    })
}

/// Order identifier from an `add` response. `None` for absent, null, zero or
/// empty values.
pub fn order_id(raw: &Value) -> Option<String> {
    match raw.get("order")? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

fn as_object<'a>(value: &'a Value, what: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| SocProofError::InvalidResponse(format!("Expected {} to be a JSON object", what)))
}

fn required<'a>(obj: &'a Map<String, Value>, field: &str) -> Result<&'a Value> {
    obj.get(field)
        .filter(|v| !v.is_null())
        .ok_or_else(|| SocProofError::parse(field, "missing"))
}

fn required_string(obj: &Map<String, Value>, field: &str) -> Result<String> {
    match required(obj, field)? {
        Value::String(s) => Ok(s.trim().to_string()),
        other @ (Value::Number(_) | Value::Bool(_)) => Ok(other.to_string()),
        other => Err(SocProofError::parse(field, format!("expected a string, got {}", other))),
    }
}

fn optional_string(obj: &Map<String, Value>, field: &str) -> Option<String> {
    match obj.get(field)? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn required_f64(obj: &Map<String, Value>, field: &str) -> Result<f64> {
    let value = required(obj, field)?;
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| SocProofError::parse(field, format!("{} is not a number", value)))
}

fn required_i64(obj: &Map<String, Value>, field: &str) -> Result<i64> {
    let value = required(obj, field)?;
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            whole_number(n)
                .filter(|f| *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| SocProofError::parse(field, format!("{} is not an integer", value)))
}

fn required_u64(obj: &Map<String, Value>, field: &str) -> Result<u64> {
    let value = required(obj, field)?;
    let parsed = match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            whole_number(n)
                .filter(|f| *f >= 0.0 && *f < u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        SocProofError::parse(field, format!("{} is not a non-negative integer", value))
    })
}

/// A float such as `10.0` that carries an integer value.
fn whole_number(n: &Number) -> Option<f64> {
    n.as_f64().filter(|f| f.is_finite() && f.fract() == 0.0)
}

fn optional_bool(obj: &Map<String, Value>, field: &str) -> bool {
    match obj.get(field) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64() == Some(1.0),
        Some(Value::String(s)) => {
            matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry() -> CatalogEntry {
        CatalogEntry {
            id: 1,
            name: "Подписчики".to_string(),
            description: "Живые аккаунты".to_string(),
            time: "1 час".to_string(),
            category: "Instagram".to_string(),
        }
    }

    #[test]
    fn test_merge_prefers_catalog_text() {
        let raw = json!({
            "service": 1, "name": "Followers", "type": "Default", "rate": "0.90",
            "min": "10", "max": 5000, "refill": true, "cancel": "0",
            "category": "Instagram Followers", "description": "api text", "time": "api time"
        });

        let service = merge_service(&raw, Some(&entry())).unwrap();

        assert_eq!(service.service, 1);
        assert_eq!(service.name, "Подписчики");
        assert_eq!(service.description, "Живые аккаунты");
        assert_eq!(service.time, "1 час");
        assert_eq!(service.category, "Instagram Followers");
        assert_eq!(service.service_type, "Default");
        assert!((service.rate - 0.9).abs() < f64::EPSILON);
        assert_eq!((service.min, service.max), (10, 5000));
        assert!(service.refill);
        assert!(!service.cancel);
    }

    #[test]
    fn test_merge_without_catalog_entry_blanks_text() {
        let raw = json!({"service": 2, "name": "Likes", "type": "Default", "rate": 1.5, "min": 1, "max": 10});

        let service = merge_service(&raw, None).unwrap();

        assert_eq!(service.name, "");
        assert_eq!(service.description, "");
        assert_eq!(service.time, "");
        assert_eq!(service.category, "");
        assert!(!service.refill);
    }

    #[test]
    fn test_merge_category_falls_back_to_catalog() {
        let raw = json!({"service": 1, "type": "Default", "rate": 1, "min": 1, "max": 2});

        let service = merge_service(&raw, Some(&entry())).unwrap();

        assert_eq!(service.category, "Instagram");
    }

    #[test]
    fn test_merge_reports_malformed_numbers() {
        let raw = json!({"service": 3, "type": "Default", "rate": "cheap", "min": 1, "max": 2});

        let err = merge_service(&raw, None).unwrap_err();

        assert!(matches!(err, SocProofError::Parse { ref field, .. } if field == "rate"));
    }

    #[test]
    fn test_merge_reports_missing_required_field() {
        let raw = json!({"service": 3, "type": "Default", "rate": 1, "min": 1});

        let err = merge_service(&raw, None).unwrap_err();

        assert!(matches!(err, SocProofError::Parse { ref field, .. } if field == "max"));
    }

    #[test]
    fn test_integer_fields_accept_whole_floats() {
        let raw = json!({"service": 4.0, "type": "Default", "rate": 1, "min": 10.0, "max": 500.0});

        let service = merge_service(&raw, None).unwrap();

        assert_eq!(service.service, 4);
        assert_eq!((service.min, service.max), (10, 500));

        let status = order_status("1", &json!({"charge": 1, "status": "Partial", "remains": 157.0})).unwrap();
        assert_eq!(status.remains, 157);
    }

    #[test]
    fn test_integer_fields_reject_fractions() {
        let raw = json!({"service": 4, "type": "Default", "rate": 1, "min": 10.5, "max": 500});

        let err = merge_service(&raw, None).unwrap_err();

        assert!(matches!(err, SocProofError::Parse { ref field, .. } if field == "min"));
    }

    #[test]
    fn test_flag_spellings() {
        let obj = json!({"a": "Yes", "b": 1, "c": "false", "d": null});
        let obj = obj.as_object().unwrap();
        assert!(optional_bool(obj, "a"));
        assert!(optional_bool(obj, "b"));
        assert!(!optional_bool(obj, "c"));
        assert!(!optional_bool(obj, "d"));
        assert!(!optional_bool(obj, "missing"));
    }

    #[test]
    fn test_order_status_names_exactly_missing_field() {
        let data = json!({"charge": "0.27", "status": "Partial"});

        let err = order_status("23501", &data).unwrap_err();

        match err {
            SocProofError::OrderStatus { order_id, missing_fields } => {
                assert_eq!(order_id, "23501");
                assert_eq!(missing_fields, vec!["remains".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_order_status_from_string_numbers() {
        let data = json!({"charge": "0.27819", "status": "In progress", "remains": "157", "currency": "RUB"});

        let status = order_status("1", &data).unwrap();

        assert_eq!(status.order_id, "1");
        assert!((status.charge - 0.27819).abs() < 1e-9);
        assert_eq!(status.status, "In progress");
        assert_eq!(status.remains, 157);
    }

    #[test]
    fn test_order_status_non_object_reports_all_fields() {
        let err = order_status("9", &json!("Incorrect order ID")).unwrap_err();
        assert!(matches!(err, SocProofError::OrderStatus { ref missing_fields, .. } if missing_fields.len() == 3));
    }

    #[test]
    fn test_account_balance_defaults_currency() {
        let balance = account_balance(&json!({"balance": "100.84292"})).unwrap();
        assert!((balance.balance - 100.84292).abs() < 1e-9);
        assert_eq!(balance.currency, "");

        let balance = account_balance(&json!({"balance": 5, "currency": "USD"})).unwrap();
        assert_eq!(balance.currency, "USD");
    }

    #[test]
    fn test_order_id_variants() {
        assert_eq!(order_id(&json!({"order": 555})), Some("555".to_string()));
        assert_eq!(order_id(&json!({"order": "777"})), Some("777".to_string()));
        assert_eq!(order_id(&json!({"order": 0})), None);
        assert_eq!(order_id(&json!({"order": null})), None);
        assert_eq!(order_id(&json!({"error": "Not enough funds"})), None);
    }
}
