//! Content extraction: fetch, parse, clean, aggregate.
//!
//! Every requested URL is fetched concurrently and independently resolves to
//! an [`ExtractedDocument`]; one URL's failure never cancels or corrupts the
//! others. HTTP and transport outcomes are classified into distinct
//! human-readable error strings on the failed records.

pub mod clean;
pub mod html;

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::fetch::{HttpFetcher, PageFetcher};
use crate::types::{ExtractedDocument, ExtractionReport};

/// Minimum cleaned content length for a successful extraction.
const MIN_CONTENT_CHARS: usize = 50;

/// Below this cleaned length, fall back to capped raw text if the raw
/// extraction had substance.
const MIN_CLEANED_CHARS: usize = 20;

/// Cap for the raw-text fallback slice.
const RAW_FALLBACK_CHARS: usize = 1000;

/// Extracts article text from a set of URLs.
pub struct PageExtractor {
    fetcher: Arc<dyn PageFetcher>,
}

impl Default for PageExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PageExtractor {
    /// Create an extractor backed by the real HTTP fetcher.
    pub fn new() -> Self {
        Self {
            fetcher: Arc::new(HttpFetcher::new()),
        }
    }

    /// Create an extractor with a custom fetcher (used by tests).
    pub fn with_fetcher(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// Extract all URLs concurrently and aggregate the results.
    ///
    /// The aggregate succeeds when at least one URL produced content and the
    /// total word count is positive. Failed URLs are reported beside any
    /// partial successes.
    pub async fn extract(&self, urls: &[String]) -> ExtractionReport {
        info!(url_count = urls.len(), "starting extraction");

        let documents = join_all(urls.iter().map(|url| self.extract_single(url))).await;

        let total_word_count: usize = documents
            .iter()
            .filter(|d| d.success)
            .map(|d| d.word_count)
            .sum();
        let failed_urls: Vec<String> = documents
            .iter()
            .filter(|d| !d.success)
            .map(|d| d.url.clone())
            .collect();
        let success = documents.iter().any(|d| d.success) && total_word_count > 0;

        info!(
            success = success,
            total_word_count = total_word_count,
            failed = failed_urls.len(),
            "extraction finished"
        );

        ExtractionReport {
            success,
            documents,
            total_word_count,
            failed_urls,
            session_id: None,
        }
    }

    /// Extract one URL into a result record; never returns an error.
    async fn extract_single(&self, url: &str) -> ExtractedDocument {
        let page = match self.fetcher.fetch(url).await {
            Ok(page) => page,
            Err(e) => {
                warn!(url = %url, error = %e, "fetch failed");
                return ExtractedDocument::failed(url, "", fetch_error_message(&e));
            }
        };

        match page.status {
            200 => {}
            404 => return ExtractedDocument::failed(url, "", "Page not found (HTTP 404)"),
            403 => return ExtractedDocument::failed(url, "", "Access forbidden (HTTP 403)"),
            status => {
                return ExtractedDocument::failed(url, "", format!("HTTP {status}"));
            }
        }

        let parsed = html::extract_content(&page.body);
        let cleaned = clean::clean_text(&parsed.text);

        // Cleanup can destroy sparse but real content; prefer capped raw text
        // over a failure record in that case.
        let content = if cleaned.len() < MIN_CLEANED_CHARS
            && parsed.text.trim().len() >= MIN_CONTENT_CHARS
        {
            debug!(url = %url, "cleanup removed too much; using capped raw text");
            clean::capped_raw(&parsed.text, RAW_FALLBACK_CHARS)
        } else {
            cleaned
        };

        if content.len() < MIN_CONTENT_CHARS {
            return ExtractedDocument::failed(url, parsed.title, "Insufficient content extracted");
        }

        let doc = ExtractedDocument::ok(url, parsed.title, content);
        debug!(url = %url, words = doc.word_count, title = %doc.title, "page extracted");
        doc
    }
}

fn fetch_error_message(error: &FetchError) -> String {
    match error {
        FetchError::Timeout => "Request timed out after 30 seconds".to_string(),
        FetchError::Connection(_) => "Could not connect to server".to_string(),
        FetchError::InvalidUrl(url) => format!("Invalid URL: {url}"),
        FetchError::Other(reason) => format!("Request failed: {reason}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFetcher;

    fn article(body: &str) -> String {
        format!("<html><head><title>Test Page</title></head><body><article><p>{body}</p></article></body></html>")
    }

    const LONG_PARA: &str = "The observatory sits on a remote ridge far from city lights. \
        Astronomers travel there every winter to study distant galaxies through the clear air.";

    #[tokio::test]
    async fn test_successful_extraction() {
        let fetcher = MockFetcher::new().with_page("https://a.com", 200, article(LONG_PARA));
        let extractor = PageExtractor::with_fetcher(Arc::new(fetcher));

        let report = extractor.extract(&["https://a.com".to_string()]).await;

        assert!(report.success);
        assert!(report.total_word_count > 0);
        assert!(report.failed_urls.is_empty());
        assert_eq!(report.documents[0].title, "Test Page");
        assert!(report.documents[0].content.contains("remote ridge"));
    }

    #[tokio::test]
    async fn test_status_codes_produce_distinct_errors() {
        let fetcher = MockFetcher::new()
            .with_page("https://missing.com", 404, String::new())
            .with_page("https://locked.com", 403, String::new())
            .with_page("https://broken.com", 500, String::new());
        let extractor = PageExtractor::with_fetcher(Arc::new(fetcher));

        let report = extractor
            .extract(&[
                "https://missing.com".to_string(),
                "https://locked.com".to_string(),
                "https://broken.com".to_string(),
            ])
            .await;

        assert!(!report.success);
        let errors: Vec<&str> = report
            .documents
            .iter()
            .map(|d| d.error.as_deref().unwrap())
            .collect();
        assert_eq!(errors[0], "Page not found (HTTP 404)");
        assert_eq!(errors[1], "Access forbidden (HTTP 403)");
        assert_eq!(errors[2], "HTTP 500");
    }

    #[tokio::test]
    async fn test_timeout_and_connection_errors_distinct() {
        let fetcher = MockFetcher::new()
            .with_timeout("https://slow.com")
            .with_connection_error("https://down.com");
        let extractor = PageExtractor::with_fetcher(Arc::new(fetcher));

        let report = extractor
            .extract(&["https://slow.com".to_string(), "https://down.com".to_string()])
            .await;

        let errors: Vec<&str> = report
            .documents
            .iter()
            .map(|d| d.error.as_deref().unwrap())
            .collect();
        assert_eq!(errors[0], "Request timed out after 30 seconds");
        assert_eq!(errors[1], "Could not connect to server");
        assert_ne!(errors[0], errors[1]);
    }

    #[tokio::test]
    async fn test_partial_success_is_success() {
        let fetcher = MockFetcher::new()
            .with_page("https://good.com", 200, article(LONG_PARA))
            .with_page("https://missing.com", 404, String::new());
        let extractor = PageExtractor::with_fetcher(Arc::new(fetcher));

        let report = extractor
            .extract(&[
                "https://good.com".to_string(),
                "https://missing.com".to_string(),
            ])
            .await;

        assert!(report.success);
        assert_eq!(report.failed_urls, vec!["https://missing.com"]);
        assert_eq!(report.documents.len(), 2);
    }

    #[tokio::test]
    async fn test_insufficient_content_fails() {
        let fetcher = MockFetcher::new().with_page("https://thin.com", 200, article("Too short"));
        let extractor = PageExtractor::with_fetcher(Arc::new(fetcher));

        let report = extractor.extract(&["https://thin.com".to_string()]).await;

        assert!(!report.success);
        assert_eq!(
            report.documents[0].error.as_deref(),
            Some("Insufficient content extracted")
        );
    }

    #[tokio::test]
    async fn test_all_urls_get_a_record() {
        let fetcher = MockFetcher::new()
            .with_page("https://a.com", 200, article(LONG_PARA))
            .with_timeout("https://b.com")
            .with_page("https://c.com", 404, String::new());
        let extractor = PageExtractor::with_fetcher(Arc::new(fetcher));

        let urls = vec![
            "https://a.com".to_string(),
            "https://b.com".to_string(),
            "https://c.com".to_string(),
        ];
        let report = extractor.extract(&urls).await;

        assert_eq!(report.documents.len(), 3);
        for (doc, url) in report.documents.iter().zip(&urls) {
            assert_eq!(&doc.url, url);
        }
    }
}
