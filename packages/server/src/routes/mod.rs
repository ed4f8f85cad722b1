use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn api_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let transfers = OpenApiRouter::new()
        .routes(routes!(handlers::video::upload_video))
        .routes(routes!(handlers::video::update_video))
        .layer(handlers::video::upload_body_limit(
            config.storage.max_upload_size,
        ));

    OpenApiRouter::new()
        .routes(routes!(handlers::video::list_videos))
        .routes(routes!(handlers::video::stream_video))
        .routes(routes!(
            handlers::video::stream_video_by_id,
            handlers::video::delete_video
        ))
        .routes(routes!(handlers::health::health))
        .merge(transfers)
}
