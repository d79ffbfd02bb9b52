// src/domain/normalize.rs

use crate::domain::sale::SaleRecord;
use crate::scraper::RawSale;
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

const DATE_FORMATS: &[&str] = &[
    "%d %b %Y",
    "%d %B %Y",
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

/// Types a locality's raw sales. Blank sales are dropped; every kept record
/// gets the same `collected_at`.
pub fn normalize_batch(raw: Vec<RawSale>, collected_at: NaiveDateTime) -> Vec<SaleRecord> {
    let before = raw.len();

    let records: Vec<SaleRecord> = raw
        .into_iter()
        .filter(|sale| !sale.is_blank())
        .map(|sale| normalize_sale(sale, collected_at))
        .collect();

    if records.len() < before {
        debug!("Dropped {} blank records", before - records.len());
    }
    records
}

pub fn normalize_sale(sale: RawSale, collected_at: NaiveDateTime) -> SaleRecord {
    SaleRecord {
        price: field(&sale.price).and_then(parse_price),
        sold_date: field(&sale.sold_date).and_then(parse_sold_date),
        property_type: field(&sale.property_type).map(str::to_string),
        bedrooms: field(&sale.bedrooms).and_then(parse_count),
        bathrooms: field(&sale.bathrooms).and_then(parse_count),
        parking: field(&sale.parking).and_then(parse_count),
        land_size: field(&sale.land_size).and_then(parse_decimal),
        locality: sale.locality,
        address: sale.address.trim().to_string(),
        collected_at,
    }
}

fn field(value: &Option<String>) -> Option<&str> {
    value.as_deref().and_then(available)
}

/// `None` for the placeholders listings use when a value isn't published.
fn available(value: &str) -> Option<&str> {
    let value = value.trim();
    match value.to_ascii_uppercase().as_str() {
        "" | "N/A" | "NA" | "-" => None,
        _ => Some(value),
    }
}

/// "$1,250,000" -> 1250000.0. Anything else ("Contact agent") is absent.
pub fn parse_price(raw: &str) -> Option<f64> {
    let digits = raw.trim().trim_start_matches('$').replace(',', "");
    parse_decimal(&digits)
}

pub fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Whole counts only; "2.0" is accepted, "2.5" is not.
pub fn parse_count(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }
    parse_decimal(raw)
        .filter(|v| v.fract() == 0.0 && v.abs() < i64::MAX as f64)
        .map(|v| v as i64)
}

pub fn parse_sold_date(raw: &str) -> Option<NaiveDate> {
    static ORDINAL: OnceLock<Regex> = OnceLock::new();
    let ordinal = ORDINAL.get_or_init(|| Regex::new(r"(\d+)(?:st|nd|rd|th)\b").unwrap());

    let cleaned = ordinal.replace_all(raw.trim(), "$1");
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&cleaned, fmt).ok())
}
