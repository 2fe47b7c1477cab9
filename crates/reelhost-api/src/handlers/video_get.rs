use crate::auth::AuthUser;
use crate::error::HttpAppError;
use crate::services::upload::authorize_owner;
use crate::state::AppState;
use crate::utils::upload::parse_video_id;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use reelhost_core::VideoResponse;
use std::sync::Arc;

#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id, operation = "get_video"))]
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(video_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;
    let video = authorize_owner(state.videos.as_ref(), video_id, user.user_id).await?;

    Ok(Json(VideoResponse::from(video)))
}
