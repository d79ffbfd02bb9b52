use crate::scraper::models::RawSale;
use crate::scraper::ScraperError;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::warn;

/// Markup conventions the site has used for a listing panel, oldest first.
/// New layouts get appended here; old ones stay so archived pages still parse.
pub const PANEL_MARKERS: &[&str] = &[
    "div.panel-primary",
    "div.property-panel",
    r#"div[data-type="property"]"#,
    "div.property-listing",
];

const LAND_SIZE_LABEL: &str = "Land Size:";

pub(crate) fn sel(css: &str) -> Result<Selector, ScraperError> {
    Selector::parse(css).map_err(|e| ScraperError::Selector {
        css: css.to_string(),
        reason: e.to_string(),
    })
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Every listing panel on the page, matched by any marker, each panel once
/// and in document order.
pub fn find_panels(document: &Html) -> Result<Vec<ElementRef<'_>>, ScraperError> {
    let mut matched = HashSet::new();
    for css in PANEL_MARKERS {
        let selector = sel(css)?;
        matched.extend(document.select(&selector).map(|panel| panel.id()));
    }

    if matched.is_empty() {
        return Ok(Vec::new());
    }

    Ok(document
        .root_element()
        .descendants()
        .filter(|node| matched.contains(&node.id()))
        .filter_map(ElementRef::wrap)
        .collect())
}

/// Extract one sale from a listing panel.
///
/// `None` means the panel is not a listing (no house image, no address link)
/// or could not be read; the latter is logged.
pub fn extract_sale(panel: ElementRef<'_>, locality: &str) -> Option<RawSale> {
    match try_extract_sale(panel, locality) {
        Ok(sale) => sale,
        Err(e) => {
            warn!("Error extracting property details: {e}");
            None
        }
    }
}

fn try_extract_sale(panel: ElementRef<'_>, locality: &str) -> Result<Option<RawSale>, ScraperError> {
    if panel.select(&sel("div.house-image")?).next().is_none() {
        return Ok(None);
    }

    let address = match panel.select(&sel("h4.panel-title a")?).next() {
        Some(link) => text_of(link),
        None => return Ok(None),
    };
    if address.is_empty() {
        return Ok(None);
    }

    let mut sale = RawSale {
        locality: locality.to_string(),
        address,
        ..RawSale::default()
    };

    // ----- Price and sold date -----
    if let Some(body) = panel.select(&sel("div.panel-body")?).next() {
        sale.price = body.select(&sel("code")?).next().map(text_of).and_then(non_empty);

        if let Some(p) = body.select(&sel("p")?).next() {
            let text = text_of(p);
            if text.contains("Sold") {
                sale.sold_date = text
                    .rsplit(" on ")
                    .next()
                    .map(|s| s.trim().to_string())
                    .and_then(non_empty);
            }
        }
    }

    // ----- Type, beds, baths, cars -----
    if let Some(features) = panel.select(&sel("p.features")?).next() {
        sale.property_type = features
            .select(&sel("span.label-info")?)
            .next()
            .map(text_of)
            .and_then(non_empty);

        let beds = sel("i.bedrooms")?;
        let baths = sel("i.bathrooms")?;
        let cars = sel("i.car_spaces")?;

        for span in features.select(&sel("span")?) {
            let slot = if span.select(&beds).next().is_some() {
                &mut sale.bedrooms
            } else if span.select(&baths).next().is_some() {
                &mut sale.bathrooms
            } else if span.select(&cars).next().is_some() {
                &mut sale.parking
            } else {
                continue;
            };
            *slot = non_empty(text_of(span));
        }
    }

    // ----- Land size -----
    if let Some(desc) = panel.select(&sel("div.house-desc")?).next() {
        for line in desc.select(&sel("div")?) {
            let text = line.text().collect::<String>();
            let text = text.trim_start();
            if let Some(rest) = text.strip_prefix(LAND_SIZE_LABEL) {
                sale.land_size = clean_land_size(rest);
            }
        }
    }

    Ok(Some(sale))
}

/// First decimal number in a land-size string: " 650.5 m²" -> "650.5".
/// Thousands separators are dropped first so "1,012 m²" reads as 1012.
pub fn clean_land_size(raw: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

    let without_commas = raw.replace(',', "");
    re.find(&without_commas).map(|m| m.as_str().to_string())
}

/// Total result count from the "Displaying 1 - 12 of 57" breadcrumb.
pub fn total_results(document: &Html) -> Option<u32> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"of (\d+)").unwrap());

    let selector = match sel("li.active") {
        Ok(s) => s,
        Err(e) => {
            warn!("Error getting total results: {e}");
            return None;
        }
    };

    let crumb = document.select(&selector).next()?;
    let text = crumb.text().collect::<String>();
    if !text.contains("Displaying") {
        return None;
    }

    re.captures(&text)?.get(1)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel_html(inner: &str) -> String {
        format!(r#"<html><body><div class="panel panel-primary">{inner}</div></body></html>"#)
    }

    fn first_panel(doc: &Html) -> ElementRef<'_> {
        find_panels(doc).unwrap().into_iter().next().unwrap()
    }

    const FULL_PANEL: &str = r#"
        <div class="house-image"><img src="x.jpg"></div>
        <h4 class="panel-title"><a href="/p/1"> 12 Smith Street, Bondi Junction </a></h4>
        <div class="panel-body">
            <code>$1,250,000</code>
            <p>Sold by private treaty on 12 Mar 2024</p>
        </div>
        <p class="features">
            <span class="label label-info">House</span>
            <span><i class="bedrooms"></i> 3</span>
            <span><i class="bathrooms"></i> 2</span>
            <span><i class="car_spaces"></i> 1</span>
        </p>
        <div class="house-desc">
            <div>Agent: Someone</div>
            <div>Land Size: 650.5 m²</div>
        </div>
    "#;

    #[test]
    fn extracts_a_complete_panel() {
        let doc = Html::parse_document(&panel_html(FULL_PANEL));
        let sale = extract_sale(first_panel(&doc), "BONDI JUNCTION").unwrap();

        assert_eq!(sale.locality, "BONDI JUNCTION");
        assert_eq!(sale.address, "12 Smith Street, Bondi Junction");
        assert_eq!(sale.price.as_deref(), Some("$1,250,000"));
        assert_eq!(sale.sold_date.as_deref(), Some("12 Mar 2024"));
        assert_eq!(sale.property_type.as_deref(), Some("House"));
        assert_eq!(sale.bedrooms.as_deref(), Some("3"));
        assert_eq!(sale.bathrooms.as_deref(), Some("2"));
        assert_eq!(sale.parking.as_deref(), Some("1"));
        assert_eq!(sale.land_size.as_deref(), Some("650.5"));
    }

    #[test]
    fn panel_without_house_image_is_noise() {
        let doc = Html::parse_document(&panel_html(
            r#"<h4 class="panel-title"><a href="/p/1">1 A St</a></h4>"#,
        ));
        assert!(extract_sale(first_panel(&doc), "X").is_none());
    }

    #[test]
    fn panel_without_address_is_never_partial() {
        for inner in [
            r#"<div class="house-image"></div><div class="panel-body"><code>$1</code></div>"#,
            r#"<div class="house-image"></div><h4 class="panel-title">No link</h4>"#,
            r#"<div class="house-image"></div><h4 class="panel-title"><a href="/p/1">   </a></h4>"#,
        ] {
            let doc = Html::parse_document(&panel_html(inner));
            assert!(extract_sale(first_panel(&doc), "X").is_none(), "{inner}");
        }
    }

    #[test]
    fn missing_blocks_leave_fields_absent() {
        let doc = Html::parse_document(&panel_html(
            r#"<div class="house-image"></div>
               <h4 class="panel-title"><a href="/p/2">7 Lone Rd</a></h4>
               <div class="panel-body"><p>Price withheld</p></div>
               <p class="features"><span><i class="bathrooms"></i> 1</span></p>"#,
        ));
        let sale = extract_sale(first_panel(&doc), "X").unwrap();

        assert_eq!(sale.address, "7 Lone Rd");
        assert_eq!(sale.price, None);
        assert_eq!(sale.sold_date, None);
        assert_eq!(sale.property_type, None);
        assert_eq!(sale.bedrooms, None);
        assert_eq!(sale.bathrooms.as_deref(), Some("1"));
        assert_eq!(sale.parking, None);
        assert_eq!(sale.land_size, None);
    }

    #[test]
    fn land_size_keeps_first_number() {
        assert_eq!(clean_land_size("Land Size: 650.5 m²").as_deref(), Some("650.5"));
        assert_eq!(clean_land_size(" 1,012 m²").as_deref(), Some("1012"));
        assert_eq!(clean_land_size("approx 400sqm (2 lots)").as_deref(), Some("400"));
        assert_eq!(clean_land_size("unknown"), None);
        assert_eq!(clean_land_size(""), None);
    }

    #[test]
    fn unions_markers_without_duplicates() {
        let doc = Html::parse_document(
            r#"<html><body>
                <div class="panel-primary property-panel" id="a"></div>
                <div data-type="property" id="b"></div>
                <div class="property-listing" id="c"></div>
                <div class="unrelated"></div>
            </body></html>"#,
        );
        let ids: Vec<_> = find_panels(&doc)
            .unwrap()
            .iter()
            .map(|p| p.value().attr("id").unwrap_or(""))
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn reads_total_results_hint() {
        let doc = Html::parse_document(
            r#"<ol class="breadcrumb"><li><a href="/">Home</a></li><li class="active">Displaying 1 - 12 of 25</li></ol>"#,
        );
        assert_eq!(total_results(&doc), Some(25));

        let doc = Html::parse_document(r#"<ol><li class="active">Bondi Junction</li></ol>"#);
        assert_eq!(total_results(&doc), None);

        let doc = Html::parse_document("<p>nothing here</p>");
        assert_eq!(total_results(&doc), None);
    }
}
