use serde::Deserialize;

use crate::config::GitHubConfig;
use crate::source::FileSource;

const MAX_LISTING_BYTES: usize = 8 * 1024 * 1024;
const MAX_FILE_BYTES: usize = 1024 * 1024;

/// GitHub-backed source: git trees API for listing, raw host for content.
#[derive(Debug, Clone)]
pub struct GitHubSource {
    http_client: reqwest::Client,
    api_base: String,
    raw_base: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

impl GitHubSource {
    /// Build a source from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &GitHubConfig) -> reqwest::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(format!("repolens/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http_client,
            api_base: config.api_base.trim_end_matches('/').to_owned(),
            raw_base: config.raw_base.trim_end_matches('/').to_owned(),
            token: config.token.clone(),
        })
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let builder = self.http_client.get(url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// GET `url` and return the body if it succeeded and fits in `limit` bytes.
    async fn get_bounded(&self, url: &str, accept: &str, limit: usize) -> Option<Vec<u8>> {
        let resp = match self.request(url).header("Accept", accept).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(url, "request failed: {e}");
                return None;
            }
        };

        if !resp.status().is_success() {
            tracing::warn!(url, "HTTP {}", resp.status());
            return None;
        }

        match read_bounded(resp, limit).await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::warn!(url, "skipping response: {e}");
                None
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum BodyError {
    #[error("declared length {0} exceeds the limit")]
    Declared(u64),
    #[error("body exceeds {0} bytes")]
    Exceeded(usize),
    #[error("failed to read response body: {0}")]
    Read(#[from] reqwest::Error),
}

/// Read `resp` chunk by chunk, giving up as soon as it is known to exceed
/// `limit`. A declared `Content-Length` over the limit is rejected before any
/// of the body is read.
async fn read_bounded(mut resp: reqwest::Response, limit: usize) -> Result<Vec<u8>, BodyError> {
    if let Some(declared) = resp.content_length()
        && !usize::try_from(declared).is_ok_and(|n| n <= limit)
    {
        return Err(BodyError::Declared(declared));
    }

    let mut body = Vec::new();
    while let Some(chunk) = resp.chunk().await? {
        if body.len() + chunk.len() > limit {
            return Err(BodyError::Exceeded(limit));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// `https://github.com/owner/repo(.git)(/)` -> `(owner, repo)`.
#[must_use]
pub fn parse_repo_url(url: &str) -> Option<(String, String)> {
    let trimmed = url.trim().trim_end_matches('/');
    let rest = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let rest = rest.strip_prefix("www.").unwrap_or(rest);
    let rest = rest.strip_prefix("github.com/")?;

    let mut parts = rest.split('/');
    let owner = parts.next().filter(|s| !s.is_empty())?;
    let repo = parts.next().filter(|s| !s.is_empty())?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    Some((owner.to_owned(), repo.to_owned()))
}

impl FileSource for GitHubSource {
    async fn list(&self, repo_url: &str) -> Vec<String> {
        let Some((owner, repo)) = parse_repo_url(repo_url) else {
            tracing::warn!(repo_url, "not a GitHub repository URL");
            return Vec::new();
        };
        let url = format!(
            "{}/repos/{owner}/{repo}/git/trees/HEAD?recursive=1",
            self.api_base
        );

        let Some(bytes) = self
            .get_bounded(&url, "application/vnd.github+json", MAX_LISTING_BYTES)
            .await
        else {
            return Vec::new();
        };
        let listing: TreeResponse = match serde_json::from_slice(&bytes) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("tree listing parse failed: {e}");
                return Vec::new();
            }
        };
        if listing.truncated {
            tracing::warn!(repo_url, "tree listing truncated by GitHub");
        }

        let paths: Vec<String> = listing
            .tree
            .into_iter()
            .filter(|e| e.kind == "blob")
            .map(|e| e.path)
            .collect();
        tracing::debug!(repo_url, files = paths.len(), "repository listed");
        paths
    }

    async fn fetch(&self, repo_url: &str, path: &str) -> Option<String> {
        let (owner, repo) = parse_repo_url(repo_url)?;
        let url = format!("{}/{owner}/{repo}/HEAD/{path}", self.raw_base);
        let bytes = self.get_bounded(&url, "text/plain", MAX_FILE_BYTES).await?;
        match String::from_utf8(bytes) {
            Ok(text) => Some(text),
            Err(_) => {
                tracing::warn!(path, "file is not valid UTF-8, skipping");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn make_source(server_url: &str, token: Option<&str>) -> GitHubSource {
        GitHubSource::new(&GitHubConfig {
            api_base: server_url.to_owned(),
            raw_base: format!("{server_url}/raw"),
            token: token.map(str::to_owned),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn parse_repo_url_variants() {
        let expected = Some(("acme".to_owned(), "tool".to_owned()));
        assert_eq!(parse_repo_url("https://github.com/acme/tool"), expected);
        assert_eq!(parse_repo_url("https://github.com/acme/tool/"), expected);
        assert_eq!(parse_repo_url("https://github.com/acme/tool.git"), expected);
        assert_eq!(parse_repo_url("github.com/acme/tool"), expected);
        assert_eq!(
            parse_repo_url("https://github.com/acme/tool/tree/main/src"),
            expected
        );
    }

    #[test]
    fn parse_repo_url_rejects_other_hosts() {
        assert!(parse_repo_url("https://gitlab.com/acme/tool").is_none());
        assert!(parse_repo_url("https://github.com/acme").is_none());
    }

    #[tokio::test]
    async fn list_returns_blobs_only() {
        let server = MockServer::start().await;
        let body = serde_json::json!({
            "tree": [
                {"path": "src", "type": "tree"},
                {"path": "src/main.py", "type": "blob"},
                {"path": "README.md", "type": "blob"}
            ],
            "truncated": false
        });
        Mock::given(method("GET"))
            .and(path("/repos/acme/tool/git/trees/HEAD"))
            .and(query_param("recursive", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let source = make_source(&server.uri(), None);
        let paths = source.list("https://github.com/acme/tool").await;
        assert_eq!(paths, vec!["src/main.py", "README.md"]);
    }

    #[tokio::test]
    async fn list_sends_token_when_configured() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/tool/git/trees/HEAD"))
            .and(header("Authorization", "Bearer ghp_test"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"tree": [{"path": "a.py", "type": "blob"}]})),
            )
            .mount(&server)
            .await;

        let source = make_source(&server.uri(), Some("ghp_test"));
        assert_eq!(source.list("https://github.com/acme/tool").await, vec!["a.py"]);
    }

    #[tokio::test]
    async fn list_http_error_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let source = make_source(&server.uri(), None);
        assert!(source.list("https://github.com/acme/tool").await.is_empty());
    }

    #[tokio::test]
    async fn list_malformed_json_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let source = make_source(&server.uri(), None);
        assert!(source.list("https://github.com/acme/tool").await.is_empty());
    }

    #[tokio::test]
    async fn fetch_reads_raw_content() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/raw/acme/tool/HEAD/src/main.py"))
            .respond_with(ResponseTemplate::new(200).set_body_string("print('hi')\n"))
            .mount(&server)
            .await;

        let source = make_source(&server.uri(), None);
        let text = source
            .fetch("https://github.com/acme/tool", "src/main.py")
            .await;
        assert_eq!(text.as_deref(), Some("print('hi')\n"));
    }

    #[tokio::test]
    async fn fetch_oversized_body_is_skipped() {
        let server = MockServer::start().await;
        let big = "x".repeat(MAX_FILE_BYTES + 1);
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(big))
            .mount(&server)
            .await;

        let source = make_source(&server.uri(), None);
        assert!(
            source
                .fetch("https://github.com/acme/tool", "huge.txt")
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn declared_length_over_limit_is_rejected_before_reading() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(64)))
            .mount(&server)
            .await;

        let resp = reqwest::get(server.uri()).await.unwrap();
        let err = read_bounded(resp, 16).await.unwrap_err();
        assert!(matches!(err, BodyError::Declared(64)));
    }

    #[tokio::test]
    async fn body_within_limit_is_read_whole() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(16)))
            .mount(&server)
            .await;

        let resp = reqwest::get(server.uri()).await.unwrap();
        assert_eq!(read_bounded(resp, 16).await.unwrap().len(), 16);
    }

    #[tokio::test]
    async fn fetch_non_utf8_is_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xff, 0xfe, 0x00]))
            .mount(&server)
            .await;

        let source = make_source(&server.uri(), None);
        assert!(
            source
                .fetch("https://github.com/acme/tool", "logo.png")
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn unreachable_server_is_empty() {
        let source = make_source("http://127.0.0.1:1", None);
        assert!(source.list("https://github.com/acme/tool").await.is_empty());
        assert!(source.fetch("https://github.com/acme/tool", "a.py").await.is_none());
    }
}
