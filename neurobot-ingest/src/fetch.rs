//! URL content fetching for the training pipeline.
//!
//! Pages are fetched through the configured content-fetch proxy (the same
//! endpoint the widget-embedding flow uses), then reduced to readable text:
//! script/style/chrome elements are stripped and whitespace collapsed.

use std::time::Duration;

use neurobot_core::config::ProxyConfig;
use neurobot_core::NeurobotError;
use scraper::{Html, Node};

#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: reqwest::Client,
    proxy_url: String,
}

impl PageFetcher {
    pub fn new(config: &ProxyConfig) -> Result<Self, NeurobotError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| NeurobotError::Fetch(e.to_string()))?;
        Ok(Self {
            client,
            proxy_url: config.fetch_proxy_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch a page and return its readable text.
    ///
    /// Fails with `Fetch` when the proxy call does not succeed or the page
    /// reduces to nothing.
    pub async fn fetch_page_text(&self, url: &str) -> Result<String, NeurobotError> {
        let target = if self.proxy_url.is_empty() {
            url.to_string()
        } else {
            format!("{}/proxy?url={}", self.proxy_url, urlencoding::encode(url))
        };

        let response = self
            .client
            .get(&target)
            .send()
            .await
            .map_err(|e| NeurobotError::Fetch(format!("{}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NeurobotError::Fetch(format!(
                "{}: proxy returned HTTP {}",
                url, status
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| NeurobotError::Fetch(format!("{}: {}", url, e)))?;

        let text = page_text(&html);
        if text.is_empty() {
            return Err(NeurobotError::Fetch(format!("{}: page has no content", url)));
        }

        tracing::debug!(url = %url, chars = text.len(), "fetched page content");
        Ok(text)
    }
}

/// Elements whose text is page chrome, not content.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "header", "footer", "nav", "noscript", "head"];

/// Reduce an HTML document to its readable text: drop chrome elements,
/// collapse all whitespace runs to single spaces.
pub fn page_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut out = String::new();
    for node in document.tree.root().descendants() {
        if let Node::Text(text) = node.value() {
            let in_skipped = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .map(|el| SKIPPED_ELEMENTS.contains(&el.name()))
                    .unwrap_or(false)
            });
            if !in_skipped {
                out.push_str(text);
                out.push(' ');
            }
        }
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SAMPLE_PAGE: &str = r#"
        <html>
          <head><title>Help Center</title><style>body { color: red; }</style></head>
          <body>
            <header>Site header</header>
            <nav>Home | Products</nav>
            <main>
              <h1>Delivery</h1>
              <p>Orders   ship within
              5 business days.</p>
              <script>console.log("tracking");</script>
            </main>
            <footer>Copyright 2026</footer>
          </body>
        </html>
    "#;

    #[test]
    fn test_page_text_strips_chrome_and_collapses_whitespace() {
        let text = page_text(SAMPLE_PAGE);
        assert_eq!(text, "Delivery Orders ship within 5 business days.");
    }

    #[test]
    fn test_page_text_empty_document() {
        assert_eq!(page_text("<html><head></head><body></body></html>"), "");
        assert_eq!(page_text("<html><body><script>x()</script></body></html>"), "");
    }

    #[tokio::test]
    async fn test_fetch_through_proxy_endpoint() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/proxy"))
            .and(query_param("url", "https://site.com/help"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_PAGE))
            .mount(&mock_server)
            .await;

        let fetcher = PageFetcher::new(&ProxyConfig {
            fetch_proxy_url: mock_server.uri(),
            user_agent: "Mozilla/5.0".to_string(),
        })
        .expect("fetcher");

        let text = fetcher
            .fetch_page_text("https://site.com/help")
            .await
            .expect("fetch");
        assert!(text.contains("5 business days"));
        assert!(!text.contains("Site header"));
    }

    #[tokio::test]
    async fn test_proxy_target_with_reserved_characters_survives_encoding() {
        let mock_server = MockServer::start().await;
        // Unescaped `&` or `=` in the target would split the url parameter
        // and this matcher would miss.
        Mock::given(method("GET"))
            .and(path("/proxy"))
            .and(query_param("url", "https://site.com/help?lang=pt&topic=returns"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SAMPLE_PAGE))
            .mount(&mock_server)
            .await;

        let fetcher = PageFetcher::new(&ProxyConfig {
            fetch_proxy_url: mock_server.uri(),
            user_agent: "Mozilla/5.0".to_string(),
        })
        .expect("fetcher");

        let text = fetcher
            .fetch_page_text("https://site.com/help?lang=pt&topic=returns")
            .await
            .expect("fetch");
        assert!(text.contains("5 business days"));
    }

    #[tokio::test]
    async fn test_fetch_proxy_error_is_fetch_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream failed"))
            .mount(&mock_server)
            .await;

        let fetcher = PageFetcher::new(&ProxyConfig {
            fetch_proxy_url: mock_server.uri(),
            user_agent: "Mozilla/5.0".to_string(),
        })
        .expect("fetcher");

        let err = fetcher
            .fetch_page_text("https://site.com/help")
            .await
            .expect_err("must fail");
        assert!(matches!(err, NeurobotError::Fetch(_)));
    }

    #[tokio::test]
    async fn test_fetch_empty_body_is_fetch_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(""))
            .mount(&mock_server)
            .await;

        let fetcher = PageFetcher::new(&ProxyConfig {
            fetch_proxy_url: mock_server.uri(),
            user_agent: "Mozilla/5.0".to_string(),
        })
        .expect("fetcher");

        let err = fetcher
            .fetch_page_text("https://site.com/blank")
            .await
            .expect_err("must fail");
        assert!(matches!(err, NeurobotError::Fetch(_)));
    }
}
