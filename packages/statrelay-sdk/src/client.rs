use crate::error::{SdkError, SdkResult};
use reqwest::Client;
use serde::de::DeserializeOwned;
use statrelay_core::{Envelope, ParamValue, Params, RelationStat, UpStat, encode};
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.bilibili.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const RELATION_STAT_PATH: &str = "x/relation/stat";
const UP_STAT_PATH: &str = "x/space/upstat";

/// 客户端构建参数；TLS 策略随实例走，不修改任何全局状态
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub accept_invalid_certs: bool,
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            accept_invalid_certs: false,
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }
}

#[derive(Clone)]
pub struct StatsClient {
    client: Client,
    pub base_url: String,
    pub timeout: Option<Duration>,
    pub accept_invalid_certs: bool,
}

impl StatsClient {
    pub fn new(base_url: &str) -> SdkResult<Self> {
        Self::from_config(&ClientConfig {
            base_url: base_url.to_string(),
            ..ClientConfig::default()
        })
    }

    pub fn from_config(config: &ClientConfig) -> SdkResult<Self> {
        let mut builder =
            Client::builder().danger_accept_invalid_certs(config.accept_invalid_certs);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout,
            accept_invalid_certs: config.accept_invalid_certs,
        })
    }

    /// 拼接完整地址，参数非空时追加到已有 query 之后
    pub fn endpoint(&self, path: &str, params: &Params) -> SdkResult<Url> {
        let mut url = Url::parse(&format!(
            "{}/{}",
            self.base_url,
            path.trim_start_matches('/')
        ))?;
        if !params.is_empty() {
            let query = encode(params);
            let joined = match url.query() {
                Some(existing) if !existing.is_empty() => format!("{existing}&{query}"),
                _ => query,
            };
            url.set_query(Some(&joined));
        }
        Ok(url)
    }

    /// GET 并返回原始响应体，不检查 HTTP 状态码
    pub async fn get_raw(&self, path: &str, params: &Params) -> SdkResult<Vec<u8>> {
        let url = self.endpoint(path, params)?;
        let response = self.client.get(url).send().await?;
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> SdkResult<Vec<u8>> {
        let url = self.endpoint(path, &Params::new())?;
        let response = self.client.post(url).json(body).send().await?;
        Ok(response.bytes().await?.to_vec())
    }

    async fn fetch<T>(&self, path: &str, params: &Params) -> SdkResult<T>
    where
        T: DeserializeOwned + Default,
    {
        let body = self.get_raw(path, params).await?;
        let envelope: Envelope<T> = serde_json::from_slice(&body)?;
        validate_envelope(envelope)
    }

    /// 粉丝/关注数
    pub async fn relation_stat(&self, mid: &str) -> SdkResult<RelationStat> {
        self.fetch(RELATION_STAT_PATH, &lookup_params("vmid", mid)).await
    }

    /// 稿件/专栏播放数
    pub async fn up_stat(&self, mid: &str) -> SdkResult<UpStat> {
        self.fetch(UP_STAT_PATH, &lookup_params("mid", mid)).await
    }
}

fn lookup_params(id_key: &str, mid: &str) -> Params {
    Params::from([
        (id_key.to_string(), ParamValue::from(mid)),
        ("jsonp".to_string(), ParamValue::from("jsonp")),
    ])
}

/// `code == 0` 时取出数据（缺失按零值处理），否则返回上游的 message
pub fn validate_envelope<T: Default>(envelope: Envelope<T>) -> SdkResult<T> {
    if !envelope.is_success() {
        return Err(SdkError::Upstream {
            code: envelope.code,
            message: envelope.message,
        });
    }
    Ok(envelope.data.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use std::collections::HashMap;

    async fn spawn_upstream(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn upstream_router() -> Router {
        Router::new()
            .route(
                "/x/relation/stat",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    if q.get("jsonp").map(String::as_str) != Some("jsonp") {
                        return Json(serde_json::json!({
                            "code": -400, "message": "missing jsonp"
                        }));
                    }
                    match q.get("vmid").map(String::as_str) {
                        Some("404") => Json(serde_json::json!({
                            "code": -404, "message": "啥都木有", "ttl": 1, "data": null
                        })),
                        Some(vmid) => Json(serde_json::json!({
                            "code": 0, "message": "0", "ttl": 1,
                            "data": { "mid": vmid.parse::<i64>().unwrap_or(0), "following": 5,
                                      "whisper": 0, "black": 0, "follower": 1234 }
                        })),
                        None => Json(serde_json::json!({
                            "code": -400, "message": "missing vmid"
                        })),
                    }
                }),
            )
            .route(
                "/x/space/upstat",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    let view = match q.get("mid").map(String::as_str) {
                        Some("42") => 98765,
                        _ => 0,
                    };
                    Json(serde_json::json!({
                        "code": 0, "message": "0", "ttl": 1,
                        "data": { "archive": { "view": view }, "article": { "view": 7 } }
                    }))
                }),
            )
            .route("/garbage", get(|| async { "<html>oops</html>" }))
            .route(
                "/echo",
                post(|Json(body): Json<serde_json::Value>| async move { Json(body) }),
            )
    }

    #[test]
    fn test_client_url_trimming() {
        let client = StatsClient::new("http://localhost:3000//").unwrap();
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_default_config_verifies_certificates() {
        let client = StatsClient::from_config(&ClientConfig::default()).unwrap();
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
        assert!(!client.accept_invalid_certs);
        assert_eq!(client.timeout, Some(DEFAULT_TIMEOUT));
    }

    #[test]
    fn test_endpoint_appends_encoded_params() {
        let client = StatsClient::new("https://api.example.com").unwrap();
        let url = client
            .endpoint("/x/relation/stat", &lookup_params("vmid", "1 2"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/x/relation/stat?jsonp=jsonp&vmid=1+2"
        );
    }

    #[test]
    fn test_endpoint_joins_existing_query_with_ampersand() {
        let client = StatsClient::new("https://api.example.com").unwrap();
        let params = Params::from([("a".to_string(), ParamValue::from(vec![1, 2]))]);
        let url = client.endpoint("search?q=x", &params).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/search?q=x&a%5B0%5D=1&a%5B1%5D=2"
        );
    }

    #[test]
    fn test_endpoint_without_params_keeps_url() {
        let client = StatsClient::new("https://api.example.com").unwrap();
        let url = client.endpoint("x/space/upstat", &Params::new()).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/x/space/upstat");
    }

    #[test]
    fn test_validate_envelope() {
        let ok: Envelope<RelationStat> = Envelope {
            code: 0,
            message: "0".to_string(),
            ttl: 1,
            data: None,
        };
        assert_eq!(validate_envelope(ok).unwrap(), RelationStat::default());

        let rejected: Envelope<RelationStat> = Envelope {
            code: -352,
            message: "风控校验失败".to_string(),
            ttl: 1,
            data: None,
        };
        match validate_envelope(rejected) {
            Err(SdkError::Upstream { code, message }) => {
                assert_eq!(code, -352);
                assert_eq!(message, "风控校验失败");
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_relation_stat_success() {
        let base = spawn_upstream(upstream_router()).await;
        let client = StatsClient::new(&base).unwrap();
        let stat = client.relation_stat("42").await.unwrap();
        assert_eq!(stat.mid, 42);
        assert_eq!(stat.follower, 1234);
        assert_eq!(stat.following, 5);
    }

    #[tokio::test]
    async fn test_relation_stat_upstream_error_surfaces_message() {
        let base = spawn_upstream(upstream_router()).await;
        let client = StatsClient::new(&base).unwrap();
        let err = client.relation_stat("404").await.unwrap_err();
        assert!(matches!(err, SdkError::Upstream { code: -404, .. }));
        assert_eq!(err.to_string(), "啥都木有");
    }

    #[tokio::test]
    async fn test_up_stat_success() {
        let base = spawn_upstream(upstream_router()).await;
        let client = StatsClient::new(&base).unwrap();
        let stat = client.up_stat("42").await.unwrap();
        assert_eq!(stat.archive.view, 98765);
        assert_eq!(stat.article.view, 7);
    }

    #[tokio::test]
    async fn test_decode_failure_is_json_error() {
        let base = spawn_upstream(upstream_router()).await;
        let client = StatsClient::new(&base).unwrap();
        let err = client
            .fetch::<RelationStat>("garbage", &Params::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::JsonError(_)));
    }

    #[tokio::test]
    async fn test_transport_failure_is_http_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = StatsClient::new(&format!("http://{addr}")).unwrap();
        let err = client.relation_stat("42").await.unwrap_err();
        assert!(matches!(err, SdkError::HttpError(_)));
    }

    #[tokio::test]
    async fn test_post_json_sends_body() {
        let base = spawn_upstream(upstream_router()).await;
        let client = StatsClient::new(&base).unwrap();
        let body = serde_json::json!({ "mid": 42, "tags": ["a", "b"] });
        let raw = client.post_json("/echo", &body).await.unwrap();
        let echoed: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(echoed, body);
    }
}
