// fetcher.rs
use crate::scraper::extract::{extract_sale, find_panels, sel};
use crate::scraper::models::RawSale;
use crate::scraper::pacing::Pacing;
use crate::scraper::ScraperError;
use reqwest::blocking::Client;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION, REFERER, UPGRADE_INSECURE_REQUESTS,
    USER_AGENT,
};
use scraper::Html;
use std::time::Duration;
use tracing::{debug, info, warn};

const BROWSER_UA: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";
const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8";
const PREVIEW_CHARS: usize = 1000;

/// Anything that can turn a URL into page markup.
pub trait PageSource {
    fn fetch_html(&self, url: &str) -> Result<String, ScraperError>;
}

/// Live source. Every call builds its own client, so no connection or cookie
/// state carries from one page to the next.
pub struct HttpPageSource {
    referer: String,
    timeout: Duration,
}

impl HttpPageSource {
    pub fn new(site_root: &str) -> Self {
        let root = site_root.trim_end_matches('/');
        Self {
            referer: format!("{root}/"),
            timeout: Duration::from_secs(60),
        }
    }

    fn headers(&self) -> Result<HeaderMap, ScraperError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_UA));
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(
            REFERER,
            HeaderValue::from_str(&self.referer)
                .map_err(|e| ScraperError::Network(format!("bad referer: {e}")))?,
        );
        headers.insert(
            "sec-ch-ua",
            HeaderValue::from_static(r#""Not A(Brand";v="99", "Google Chrome";v="121", "Chromium";v="121""#),
        );
        headers.insert("sec-ch-ua-mobile", HeaderValue::from_static("?0"));
        headers.insert("sec-ch-ua-platform", HeaderValue::from_static(r#""Windows""#));
        headers.insert("sec-fetch-dest", HeaderValue::from_static("document"));
        headers.insert("sec-fetch-mode", HeaderValue::from_static("navigate"));
        headers.insert("sec-fetch-site", HeaderValue::from_static("same-origin"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
        Ok(headers)
    }
}

impl PageSource for HttpPageSource {
    fn fetch_html(&self, url: &str) -> Result<String, ScraperError> {
        let client = Client::builder()
            .timeout(self.timeout)
            .default_headers(self.headers()?)
            .build()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        let resp = client
            .get(url)
            .send()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScraperError::HttpStatus {
                status,
                url: url.to_string(),
            });
        }

        // Decode as UTF-8 no matter what charset the server claims.
        let bytes = resp
            .bytes()
            .map_err(|e| ScraperError::Network(e.to_string()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// One fetched results page.
pub struct FetchedPage {
    pub document: Html,
    pub sales: Vec<RawSale>,
}

/// Fetches and parses one results page for `locality`, after a pacing delay.
pub struct PageFetcher<S: PageSource> {
    source: S,
    pacing: Pacing,
}

impl<S: PageSource> PageFetcher<S> {
    pub fn new(source: S, pacing: Pacing) -> Self {
        Self { source, pacing }
    }

    pub fn pacing(&self) -> Pacing {
        self.pacing
    }

    #[cfg(test)]
    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn fetch_page(&self, url: &str, locality: &str) -> Result<FetchedPage, ScraperError> {
        info!("Fetching URL: {url}");
        self.pacing.pause();

        let html = self.source.fetch_html(url)?;
        debug!("Response preview: {}", preview(&html));

        let document = parse_page(&html, url)?;
        let sales = extract_page(&document, locality)?;

        Ok(FetchedPage { document, sales })
    }
}

fn preview(html: &str) -> &str {
    match html.char_indices().nth(PREVIEW_CHARS) {
        Some((idx, _)) => &html[..idx],
        None => html,
    }
}

fn parse_page(html: &str, url: &str) -> Result<Html, ScraperError> {
    if html.trim().is_empty() {
        return Err(ScraperError::EmptyBody(url.to_string()));
    }

    let document = Html::parse_document(html);

    let title = document
        .select(&sel("title")?)
        .next()
        .map(|t| t.text().collect::<String>())
        .unwrap_or_else(|| "No title found".to_string());
    debug!("Page title: {}", title.trim());

    Ok(document)
}

/// Runs every listing panel on the page through the extractor.
pub fn extract_page(document: &Html, locality: &str) -> Result<Vec<RawSale>, ScraperError> {
    let panels = find_panels(document)?;
    info!("Found {} property panels on this page", panels.len());

    if panels.is_empty() {
        log_page_shape(document)?;
    }

    let mut sales = Vec::with_capacity(panels.len());
    for panel in panels {
        if let Some(sale) = extract_sale(panel, locality) {
            debug!("Successfully extracted property: {}", sale.address);
            sales.push(sale);
        }
    }

    Ok(sales)
}

fn log_page_shape(document: &Html) -> Result<(), ScraperError> {
    let divs: Vec<_> = document.select(&sel("div")?).collect();
    let classes: Vec<_> = divs
        .iter()
        .take(5)
        .map(|d| d.value().attr("class").unwrap_or("no-class"))
        .collect();
    warn!(
        "No listing panels matched; page has {} divs, first classes: {:?}",
        divs.len(),
        classes
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::fixtures::{http_response, serve_once};
    use reqwest::StatusCode;
    use std::cell::RefCell;

    struct CannedSource {
        body: Result<String, ()>,
        calls: RefCell<Vec<String>>,
    }

    impl PageSource for CannedSource {
        fn fetch_html(&self, url: &str) -> Result<String, ScraperError> {
            self.calls.borrow_mut().push(url.to_string());
            self.body
                .clone()
                .map_err(|_| ScraperError::Network("connection reset".into()))
        }
    }

    fn fetcher(body: Result<String, ()>) -> PageFetcher<CannedSource> {
        PageFetcher::new(
            CannedSource {
                body,
                calls: RefCell::new(Vec::new()),
            },
            Pacing::none(),
        )
    }

    #[test]
    fn extracts_from_every_marker_and_skips_noise() {
        let html = r#"<html><head><title>Sold</title></head><body>
            <div class="panel-primary">
                <div class="house-image"></div>
                <h4 class="panel-title"><a href="/1">1 First St</a></h4>
            </div>
            <div class="property-listing">
                <div class="house-image"></div>
                <h4 class="panel-title"><a href="/2">2 Second St</a></h4>
            </div>
            <div class="panel-primary"><h4 class="panel-title">Filter your search</h4></div>
        </body></html>"#;

        let page = fetcher(Ok(html.to_string()))
            .fetch_page("https://x.test/p1", "Bondi")
            .unwrap();

        let addresses: Vec<_> = page.sales.iter().map(|s| s.address.as_str()).collect();
        assert_eq!(addresses, vec!["1 First St", "2 Second St"]);
    }

    #[test]
    fn transport_failure_is_a_fetch_error() {
        let f = fetcher(Err(()));
        assert!(matches!(
            f.fetch_page("https://x.test/p1", "Bondi"),
            Err(ScraperError::Network(_))
        ));
        assert_eq!(f.source.calls.borrow().as_slice(), ["https://x.test/p1"]);
    }

    #[test]
    fn blank_body_is_a_parse_failure() {
        assert!(matches!(
            fetcher(Ok("   \n".into())).fetch_page("https://x.test/p1", "Bondi"),
            Err(ScraperError::EmptyBody(_))
        ));
    }

    #[test]
    fn page_without_panels_yields_no_sales() {
        let page = fetcher(Ok("<html><body><div class=\"x\"></div></body></html>".into()))
            .fetch_page("https://x.test/p9", "Bondi")
            .unwrap();
        assert!(page.sales.is_empty());
    }

    #[test]
    fn live_source_sends_browser_headers_and_decodes_utf8() {
        let body = "<html><body><div>Land Size: 650 m²</div></body></html>";
        let (base, server) = serve_once(http_response(
            "200 OK",
            "text/html; charset=iso-8859-1",
            body.as_bytes(),
        ));

        let html = HttpPageSource::new(&base)
            .fetch_html(&format!("{base}/sold/list/p/2/"))
            .unwrap();
        let seen = server.join().unwrap();

        assert_eq!(html, body);
        assert_eq!(seen.request_line, "GET /sold/list/p/2/ HTTP/1.1");
        assert!(seen.header("user-agent").is_some_and(|ua| ua.starts_with("Mozilla/5.0")));
        assert_eq!(seen.header("accept"), Some(ACCEPT_HTML));
        assert_eq!(seen.header("accept-language"), Some("en-US,en;q=0.9"));
        assert_eq!(seen.header("connection"), Some("keep-alive"));
        assert_eq!(seen.header("referer"), Some(format!("{base}/").as_str()));
    }

    #[test]
    fn live_source_reports_non_success_status() {
        let (base, server) = serve_once(http_response(
            "503 Service Unavailable",
            "text/html",
            b"<html><body>busy</body></html>",
        ));
        let url = format!("{base}/sold/list/");

        let result = HttpPageSource::new(&base).fetch_html(&url);
        server.join().unwrap();

        match result {
            Err(ScraperError::HttpStatus { status, url: failed }) => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(failed, url);
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let long = "é".repeat(PREVIEW_CHARS + 10);
        assert_eq!(preview(&long).chars().count(), PREVIEW_CHARS);
        assert_eq!(preview("short"), "short");
    }
}
