mod readiness;
mod videos;
