use crate::auth::AuthUser;
use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::parse_video_id;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    response::IntoResponse,
    Json,
};
use reelhost_core::VideoResponse;
use std::sync::Arc;

/// `POST /api/video_upload/{video_id}` with a multipart `video` field.
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(video_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;
    let multipart = multipart?;

    tracing::info!(video_id = %video_id, user_id = %user.user_id, "Uploading video");

    let video = state
        .uploads
        .video
        .upload(user.user_id, video_id, multipart)
        .await?;

    Ok(Json(VideoResponse::from(video)))
}
