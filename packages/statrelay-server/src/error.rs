use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use statrelay_core::ErrorResponse;
use statrelay_sdk::SdkError;
use std::fmt;
use tracing::error;

pub(crate) const MID_EMPTY: &str = "mid empty";

#[derive(Debug)]
pub(crate) enum AppError {
    MidEmpty,
    Upstream(SdkError),
}

impl From<SdkError> for AppError {
    fn from(err: SdkError) -> Self {
        Self::Upstream(err)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::MidEmpty => f.write_str(MID_EMPTY),
            AppError::Upstream(err) => write!(f, "{err}"),
        }
    }
}

// 传输层始终 200，失败只体现在 err_code
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        match &self {
            AppError::MidEmpty => error!("mid empty"),
            AppError::Upstream(SdkError::Upstream { code, message }) => {
                error!(code, message = %message, "upstream rejected request");
            }
            AppError::Upstream(err) => error!(error = ?err, "upstream request failed"),
        }
        (StatusCode::OK, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
