use crate::error::AppError;
use crate::state::AppState;
use axum::Json;
use axum::extract::{RawQuery, State};
use statrelay_core::{DisplayFrame, FramesResponse, RelationStat, UpStat};
use std::sync::Arc;
use tracing::info;
use url::form_urlencoded;

const FOLLOWER_ICON: &str = "a61";
const ARCHIVE_VIEW_ICON: &str = "a2361";
// 固定占位帧，不参与计算
const PLACEHOLDER_TEXT: &str = "3000";
const PLACEHOLDER_ICON: &str = "i15732";

/// `GET /?mid=<id>`：依次拉取粉丝数和播放数，转换为三帧显示数据
pub(crate) async fn handler(
    State(state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Result<Json<FramesResponse>, AppError> {
    let mid = query.as_deref().and_then(first_mid).unwrap_or_default();
    let mid = mid.trim();
    if mid.is_empty() {
        return Err(AppError::MidEmpty);
    }

    let relation = state.client.relation_stat(mid).await?;
    let up = state.client.up_stat(mid).await?;
    info!(
        mid,
        follower = relation.follower,
        archive_view = up.archive.view,
        article_view = up.article.view,
        "stats relayed"
    );

    Ok(Json(build_frames(&relation, &up)))
}

fn first_mid(query: &str) -> Option<String> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "mid")
        .map(|(_, value)| value.into_owned())
}

pub(crate) fn build_frames(relation: &RelationStat, up: &UpStat) -> FramesResponse {
    FramesResponse {
        frames: vec![
            DisplayFrame::new(relation.follower.to_string(), FOLLOWER_ICON),
            DisplayFrame::new(up.archive.view.to_string(), ARCHIVE_VIEW_ICON),
            DisplayFrame::new(PLACEHOLDER_TEXT, PLACEHOLDER_ICON),
        ],
    }
}
