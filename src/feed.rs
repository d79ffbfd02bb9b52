use crate::errors::AppError;
use std::path::Path;
use tracing::warn;

/// One suburb to scrape. Fixed for the whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalityTask {
    pub region: String,
    pub postcode: String,
    pub locality: String,
    pub year_min: i32,
    pub year_max: i32,
}

#[derive(Debug, Clone, Copy)]
pub struct FeedDefaults<'a> {
    pub region: &'a str,
    pub year_min: i32,
    pub year_max: i32,
}

pub fn read_feed(path: &Path, defaults: FeedDefaults<'_>) -> Result<Vec<LocalityTask>, AppError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| AppError::Feed(format!("cannot read {}: {e}", path.display())))?;
    parse_feed(&text, defaults)
}

/// Parses a `suburb,postcode[,state]` CSV with a header row, in any column order.
pub fn parse_feed(text: &str, defaults: FeedDefaults<'_>) -> Result<Vec<LocalityTask>, AppError> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    let header: Vec<String> = lines
        .next()
        .ok_or_else(|| AppError::Feed("feed is empty".into()))?
        .split(',')
        .map(|h| unquote(h).to_ascii_lowercase())
        .collect();

    let column = |name: &str| header.iter().position(|h| h == name);
    let suburb_col =
        column("suburb").ok_or_else(|| AppError::Feed("missing `suburb` column".into()))?;
    let postcode_col =
        column("postcode").ok_or_else(|| AppError::Feed("missing `postcode` column".into()))?;
    let state_col = column("state");

    let mut tasks = Vec::new();
    for (idx, line) in lines.enumerate() {
        let fields: Vec<&str> = line.split(',').map(unquote).collect();
        let field = |col: usize| fields.get(col).copied().filter(|f| !f.is_empty());

        let (Some(locality), Some(postcode)) = (field(suburb_col), field(postcode_col)) else {
            warn!("Skipping feed row {}: missing suburb or postcode", idx + 2);
            continue;
        };
        let region = state_col.and_then(field).unwrap_or(defaults.region);

        tasks.push(LocalityTask {
            region: region.to_string(),
            postcode: postcode.to_string(),
            locality: locality.to_string(),
            year_min: defaults.year_min,
            year_max: defaults.year_max,
        });
    }

    Ok(tasks)
}

fn unquote(field: &str) -> &str {
    let field = field.trim();
    field
        .strip_prefix('"')
        .and_then(|f| f.strip_suffix('"'))
        .unwrap_or(field)
        .trim()
}
