use crate::common::{TestApp, payload, routes};

#[tokio::test]
async fn requests_fail_fast_until_store_is_ready() {
    let app = TestApp::spawn_unready().await;

    let health = app.get(routes::HEALTH).await;
    assert_eq!(health.status, 503);
    assert_eq!(health.body["code"], "STORAGE_UNAVAILABLE");

    assert_eq!(app.get(routes::VIDEOS).await.status, 503);
    assert_eq!(app.get(&routes::video("clip.mp4")).await.status, 503);
    let upload = app.upload("clip.mp4", "video/mp4", payload(10)).await;
    assert_eq!(upload.status, 503);
    assert_eq!(app.rows().await, (0, 0));

    app.make_ready();

    let health = app.get(routes::HEALTH).await;
    assert_eq!(health.status, 200);
    assert_eq!(health.body["status"], "ok");
    assert_eq!(
        app.upload("clip.mp4", "video/mp4", payload(10)).await.status,
        200
    );
}

#[tokio::test]
async fn openapi_document_lists_video_routes() {
    let app = TestApp::spawn().await;

    let res = app.get("/api-docs/openapi.json").await;
    assert_eq!(res.status, 200);
    let paths = &res.body["paths"];
    for path in [
        "/upload",
        "/videos",
        "/videos/{filename}",
        "/videos/by-id/{id}",
        "/update/{id}",
        "/health",
    ] {
        assert!(paths.get(path).is_some(), "missing {path}");
    }
}
