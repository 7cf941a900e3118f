pub mod query;

use serde::{Deserialize, Serialize};

pub use query::{ParamValue, Params, Scalar, encode, flatten};

/// 显示帧，硬件挂件每帧显示一段文本和一个图标
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayFrame {
    pub text: String,
    pub icon: String,
}

impl DisplayFrame {
    pub fn new(text: impl Into<String>, icon: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            icon: icon.into(),
        }
    }
}

/// 成功响应 `{"frames": [...]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FramesResponse {
    pub frames: Vec<DisplayFrame>,
}

/// 错误响应 `{"err_code": -1, "err_msg": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub err_code: i32,
    pub err_msg: String,
}

impl ErrorResponse {
    pub const GENERIC_CODE: i32 = -1;

    pub fn new(err_msg: impl Into<String>) -> Self {
        Self {
            err_code: Self::GENERIC_CODE,
            err_msg: err_msg.into(),
        }
    }
}

/// 上游 API 响应外壳，`code == 0` 表示成功
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub ttl: i64,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }
}

/// `/x/relation/stat` 的数据部分
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationStat {
    pub mid: i64,
    pub following: i64,
    pub whisper: i64,
    pub black: i64,
    pub follower: i64,
}

/// `/x/space/upstat` 的数据部分
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpStat {
    pub archive: ViewCount,
    pub article: ViewCount,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewCount {
    pub view: i64,
}
