//! HTTP content source backed by a Prismic-style REST API

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::OnceCell;

use super::{ContentSource, Query, RawPage};
use crate::config::SiteConfig;
use crate::error::{BlogError, Result};

/// API root response, only the refs are needed
#[derive(Debug, Deserialize)]
struct ApiRoot {
    #[serde(default)]
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(rename = "isMasterRef", default)]
    is_master_ref: bool,
}

/// Content source that queries the CMS over HTTP
pub struct HttpSource {
    client: reqwest::Client,
    endpoint: Url,
    access_token: Option<String>,
    master_ref: OnceCell<String>,
}

impl HttpSource {
    /// Create a client for the API at `endpoint` (e.g. `https://repo.cdn.prismic.io/api/v2`)
    pub fn new(endpoint: &str, access_token: Option<String>, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint.trim_end_matches('/'))
            .map_err(|e| BlogError::FetchFailed(format!("Invalid API endpoint {}: {}", endpoint, e)))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("headless-blog/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            access_token: access_token.filter(|t| !t.is_empty()),
            master_ref: OnceCell::new(),
        })
    }

    /// Create a client from site configuration
    pub fn from_config(config: &SiteConfig) -> Result<Self> {
        Self::new(
            &config.api_endpoint,
            config.access_token.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Build the search URL for `query` at content version `version_ref`
    pub fn search_url(&self, query: &Query, version_ref: &str) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("documents").push("search");
        }
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("ref", version_ref);
            for (key, value) in query.params() {
                pairs.append_pair(key, &value);
            }
            if let Some(token) = &self.access_token {
                pairs.append_pair("access_token", token);
            }
        }
        url
    }

    /// Ensure a cursor points back at the configured API
    fn check_cursor(&self, cursor: &str) -> Result<Url> {
        let url = Url::parse(cursor).map_err(|_| BlogError::ForeignCursor(cursor.to_string()))?;
        if url.origin() != self.endpoint.origin() {
            return Err(BlogError::ForeignCursor(cursor.to_string()));
        }
        Ok(url)
    }

    /// Resolve the master ref once per client
    async fn master_ref(&self) -> Result<String> {
        let reference = self
            .master_ref
            .get_or_try_init(|| async {
                let mut url = self.endpoint.clone();
                if let Some(token) = &self.access_token {
                    url.query_pairs_mut().append_pair("access_token", token);
                }
                tracing::debug!("Resolving master ref from {}", self.endpoint);
                let root: ApiRoot = self
                    .client
                    .get(url)
                    .send()
                    .await?
                    .error_for_status()?
                    .json()
                    .await?;
                root.refs
                    .into_iter()
                    .find(|r| r.is_master_ref)
                    .map(|r| r.reference)
                    .ok_or_else(|| BlogError::FetchFailed("API root has no master ref".to_string()))
            })
            .await?;
        Ok(reference.clone())
    }

    async fn get_page(&self, url: Url) -> Result<RawPage> {
        tracing::debug!("GET {}", url);
        let page = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<RawPage>()
            .await?;
        Ok(page)
    }
}

#[async_trait]
impl ContentSource for HttpSource {
    fn name(&self) -> &str {
        self.endpoint.as_str()
    }

    async fn query(&self, query: &Query) -> Result<RawPage> {
        let version_ref = match &query.version_ref {
            Some(r) => r.clone(),
            None => self.master_ref().await?,
        };
        self.get_page(self.search_url(query, &version_ref)).await
    }

    async fn fetch_page(&self, cursor: &str) -> Result<RawPage> {
        let url = self.check_cursor(cursor)?;
        self.get_page(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cms::{Predicate, SortDirection, DOCUMENT_TYPE, FIRST_PUBLICATION_DATE};
    use axum::extract::{Query as Params, State};
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Minimal stand-in for the CMS API, recording what it was asked
    struct FakeCms {
        base: String,
        fail_search: bool,
        root_hits: AtomicUsize,
        search_refs: Mutex<Vec<String>>,
    }

    async fn api_root(State(cms): State<Arc<FakeCms>>) -> Json<serde_json::Value> {
        cms.root_hits.fetch_add(1, Ordering::SeqCst);
        Json(json!({
            "refs": [
                {"id": "release", "ref": "release-ref", "isMasterRef": false},
                {"id": "master", "ref": "master-ref-1", "isMasterRef": true}
            ]
        }))
    }

    async fn search(
        State(cms): State<Arc<FakeCms>>,
        Params(params): Params<HashMap<String, String>>,
    ) -> Response {
        let version_ref = params.get("ref").cloned().unwrap_or_default();
        cms.search_refs.lock().unwrap().push(version_ref.clone());
        if cms.fail_search {
            return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
        }

        let page: usize = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
        let next_page = (page == 1)
            .then(|| format!("{}/documents/search?ref={}&page=2", cms.base, version_ref));
        Json(json!({
            "page": page,
            "total_pages": 2,
            "next_page": next_page,
            "results": [{
                "id": format!("ID{}", page),
                "uid": format!("post-{}", page),
                "type": "post",
                "first_publication_date": "2021-03-25T19:25:28+0000",
                "data": {"title": "T", "author": "A"}
            }]
        }))
        .into_response()
    }

    async fn spawn_cms(fail_search: bool) -> Arc<FakeCms> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let cms = Arc::new(FakeCms {
            base: format!("http://{}/api/v2", listener.local_addr().unwrap()),
            fail_search,
            root_hits: AtomicUsize::new(0),
            search_refs: Mutex::new(Vec::new()),
        });
        let app = Router::new()
            .route("/api/v2", get(api_root))
            .route("/api/v2/documents/search", get(search))
            .with_state(cms.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        cms
    }

    fn local_source(cms: &FakeCms) -> HttpSource {
        HttpSource {
            client: reqwest::Client::builder().no_proxy().build().unwrap(),
            endpoint: Url::parse(&cms.base).unwrap(),
            access_token: None,
            master_ref: OnceCell::new(),
        }
    }

    fn posts() -> Query {
        Query::new(vec![Predicate::at(DOCUMENT_TYPE, "post")]).page_size(1)
    }

    fn source() -> HttpSource {
        HttpSource::new(
            "https://blog.cdn.prismic.io/api/v2/",
            Some("secret".to_string()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_search_url() {
        let query = Query::new(vec![Predicate::at(DOCUMENT_TYPE, "post")])
            .page_size(2)
            .order_by(FIRST_PUBLICATION_DATE, SortDirection::Desc);
        let url = source().search_url(&query, "master-ref");

        assert_eq!(url.path(), "/api/v2/documents/search");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("ref".to_string(), "master-ref".to_string())));
        assert!(pairs.contains(&("q".to_string(), "[[at(document.type,\"post\")]]".to_string())));
        assert!(pairs.contains(&(
            "orderings".to_string(),
            "[document.first_publication_date desc]".to_string()
        )));
        assert!(pairs.contains(&("pageSize".to_string(), "2".to_string())));
        assert!(pairs.contains(&("access_token".to_string(), "secret".to_string())));
    }

    #[tokio::test]
    async fn test_foreign_cursor_rejected() {
        let source = source();
        let err = source
            .fetch_page("https://evil.example.com/api/v2/documents/search?page=2")
            .await
            .unwrap_err();
        assert!(matches!(err, BlogError::ForeignCursor(_)));

        let err = source.fetch_page("not a url").await.unwrap_err();
        assert!(matches!(err, BlogError::ForeignCursor(_)));
    }

    #[test]
    fn test_own_cursor_accepted() {
        let url = source()
            .check_cursor("https://blog.cdn.prismic.io/api/v2/documents/search?page=2")
            .unwrap();
        assert_eq!(url.query(), Some("page=2"));
    }

    #[test]
    fn test_invalid_endpoint() {
        let result = HttpSource::new("::nope::", None, Duration::from_secs(1));
        assert!(matches!(result, Err(BlogError::FetchFailed(_))));
    }

    #[tokio::test]
    async fn test_master_ref_resolved_once() {
        let cms = spawn_cms(false).await;
        let source = local_source(&cms);

        source.query(&posts()).await.unwrap();
        source.query(&posts()).await.unwrap();

        assert_eq!(cms.root_hits.load(Ordering::SeqCst), 1);
        assert_eq!(
            *cms.search_refs.lock().unwrap(),
            vec!["master-ref-1".to_string(), "master-ref-1".to_string()]
        );
    }

    #[tokio::test]
    async fn test_explicit_ref_skips_root_lookup() {
        let cms = spawn_cms(false).await;
        let source = local_source(&cms);

        let query = posts().with_ref(Some("preview-ref".to_string()));
        source.query(&query).await.unwrap();

        assert_eq!(cms.root_hits.load(Ordering::SeqCst), 0);
        assert_eq!(*cms.search_refs.lock().unwrap(), vec!["preview-ref".to_string()]);
    }

    #[tokio::test]
    async fn test_server_error_is_fetch_failed() {
        let cms = spawn_cms(true).await;
        let source = local_source(&cms);

        let err = source.query(&posts()).await.unwrap_err();
        match err {
            BlogError::FetchFailed(message) => assert!(message.contains("500")),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_follows_next_page() {
        let cms = spawn_cms(false).await;
        let source = local_source(&cms);

        let first = source.query(&posts()).await.unwrap();
        assert_eq!(first.results[0].uid.as_deref(), Some("post-1"));
        let cursor = first.next_page.unwrap();
        assert!(cursor.starts_with(&cms.base));

        let second = source.fetch_page(&cursor).await.unwrap();
        assert_eq!(second.page, 2);
        assert_eq!(second.results[0].uid.as_deref(), Some("post-2"));
        assert_eq!(second.next_page, None);
        assert_eq!(cms.search_refs.lock().unwrap().len(), 2);
    }
}
