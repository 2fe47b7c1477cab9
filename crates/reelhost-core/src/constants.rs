//! Upload contract constants shared by the HTTP layer and the pipelines.

/// Multipart field carrying the video file.
pub const VIDEO_FIELD_NAME: &str = "video";

/// Multipart field carrying the thumbnail image.
pub const THUMBNAIL_FIELD_NAME: &str = "thumbnail";

/// The only media type accepted by the video endpoint.
pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// Media types accepted by the thumbnail endpoint.
pub const THUMBNAIL_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// Path under which the local asset directory is served.
pub const ASSETS_ROUTE: &str = "/assets";

/// Issuer embedded in and required of access tokens.
pub const TOKEN_ISSUER: &str = "reelhost-access";
