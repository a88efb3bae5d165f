//! Catalog page parser.
//!
//! The catalog is a server-rendered `<table id="service-table">` with one
//! `<tr data-filter-table-category-id=...>` per service and seven cells:
//! id/category, name, type, rate, min, time, description. Only the id, name,
//! time and description cells plus the category attribute are read.
//!
//! Matching works on the raw markup with case-insensitive patterns, so it
//! tolerates attribute order and quoting but not structural changes.

use crate::domain::model::{Catalog, CatalogEntry};
use crate::domain::ports::CatalogParser;
use crate::utils::error::{Result, SocProofError};
use regex::Regex;
use std::sync::LazyLock;

pub const SERVICE_TABLE_ID: &str = "service-table";
const ROW_MARKER_ATTR: &str = "data-filter-table-category-id";
const CATEGORY_ATTR: &str = "data-category-name";
const CELLS_PER_ROW: usize = 7;

static TABLE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<table\b([^>]*)>").expect("table pattern"));
static TABLE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</table\s*>").expect("table close pattern"));
static TBODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<tbody\b[^>]*>(.*?)(?:</tbody\s*>|$)").expect("tbody pattern"));
static ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<tr\b([^>]*)>(.*?)</tr\s*>").expect("row pattern"));
static CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<td\b([^>]*)>(.*?)</td\s*>").expect("cell pattern"));
static ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)([a-z_:][-a-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("attribute pattern")
});
static IGNORED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<!--.*?-->|<script\b[^>]*>.*?</script\s*>").expect("ignored markup pattern")
});
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern"));

/// Parser for the soc-proof catalog markup.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlCatalogParser;

impl HtmlCatalogParser {
    pub fn new() -> Self {
        Self
    }
}

impl CatalogParser for HtmlCatalogParser {
    fn parse(&self, html: &str) -> Result<Catalog> {
        // Comments and scripts are not rendered, so rows inside them do not count.
        let html = IGNORED.replace_all(html, "");
        let table = service_table(&html).ok_or_else(|| SocProofError::CatalogTableNotFound {
            table: SERVICE_TABLE_ID.to_string(),
        })?;
        let body = TBODY
            .captures(table)
            .and_then(|caps| caps.get(1))
            .map_or(table, |m| m.as_str());

        let mut catalog = Catalog::new();
        let mut skipped = 0usize;

        for row in ROW.captures_iter(body) {
            let row_attrs = row.get(1).map_or("", |m| m.as_str());
            let has_marker = attribute(row_attrs, ROW_MARKER_ATTR).is_some_and(|v| !v.is_empty());
            if !has_marker {
                skipped += 1;
                continue;
            }

            let row_body = row.get(2).map_or("", |m| m.as_str());
            let cells: Vec<(&str, String)> = CELL
                .captures_iter(row_body)
                .map(|cell| {
                    let attrs = cell.get(1).map_or("", |m| m.as_str());
                    let inner = cell.get(2).map_or("", |m| m.as_str());
                    (attrs, cell_text(inner))
                })
                .collect();
            if cells.len() != CELLS_PER_ROW {
                skipped += 1;
                continue;
            }

            let id_text = &cells[0].1;
            let id: u32 = id_text.parse().map_err(|e| {
                SocProofError::parse("service id", format!("'{}' is not an integer: {}", id_text, e))
            })?;
            let category = attribute(cells[0].0, CATEGORY_ATTR)
                .map(|v| decode_entities(&v).trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| id_text.clone());

            catalog.insert(
                id,
                CatalogEntry {
                    id,
                    name: cells[1].1.clone(),
                    description: cells[6].1.clone(),
                    time: cells[5].1.clone(),
                    category,
                },
            );
        }

        tracing::debug!(entries = catalog.len(), skipped, "parsed catalog table");
        Ok(catalog)
    }
}

/// Inner markup of the service table, between its opening and closing tags.
fn service_table(html: &str) -> Option<&str> {
    let open = TABLE_OPEN
        .captures_iter(html)
        .find(|caps| attribute(&caps[1], "id").as_deref() == Some(SERVICE_TABLE_ID))?;
    let rest = &html[open.get(0)?.end()..];
    let close = TABLE_CLOSE.find(rest).map_or(rest.len(), |m| m.start());
    Some(&rest[..close])
}

/// Value of `name` in an attribute list, quoted or bare.
fn attribute(attrs: &str, name: &str) -> Option<String> {
    ATTR.captures_iter(attrs)
        .find(|caps| caps[1].eq_ignore_ascii_case(name))
        .map(|caps| {
            caps.get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map_or_else(String::new, |m| m.as_str().to_string())
        })
}

/// Visible text of a cell: tags removed, entities decoded, outer whitespace trimmed.
fn cell_text(inner: &str) -> String {
    let stripped = TAG.replace_all(inner, "");
    decode_entities(&stripped).trim().to_string()
}

fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|&end| end <= 10)
            .and_then(|end| decode_entity(&tail[1..end]).map(|c| (c, end + 1)));
        match decoded {
            Some((c, len)) => {
                out.push(c);
                rest = &tail[len..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}
