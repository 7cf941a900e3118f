use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// 上游返回非零 code，Display 即上游的 message
    #[error("{message}")]
    Upstream { code: i64, message: String },
}

pub type SdkResult<T> = Result<T, SdkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_error_display_is_envelope_message() {
        let error = SdkError::Upstream {
            code: -400,
            message: "请求错误".to_string(),
        };
        assert_eq!(error.to_string(), "请求错误");
    }

    #[test]
    fn test_invalid_url_display() {
        let error = SdkError::from(url::Url::parse("not a url").unwrap_err());
        assert!(error.to_string().starts_with("Invalid URL: "));
    }
}
