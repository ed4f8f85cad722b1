use std::sync::Arc;

use crate::common::{FailingWrites, TestApp, payload, routes, small_chunks};

mod upload {
    use super::*;

    #[tokio::test]
    async fn five_mib_clip_round_trips() {
        let app = TestApp::spawn().await;
        let data = payload(5 * 1024 * 1024);

        let res = app.upload("clip.mp4", "video/mp4", data.clone()).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["message"], "Video uploaded successfully");
        assert_eq!(res.body["file"].as_str(), Some("clip.mp4"));
        assert_eq!(res.body["video"]["filename"], "clip.mp4");
        assert_eq!(res.body["video"]["length"], 5_242_880);

        let list = app.get(routes::VIDEOS).await;
        assert_eq!(list.status, 200);
        let videos = list.body.as_array().unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0]["filename"], "clip.mp4");
        assert_eq!(videos[0]["length"], 5_242_880);
        assert_eq!(videos[0]["contentType"], "video/mp4");
        assert_eq!(videos[0]["chunkSize"], 255 * 1024);
        assert!(videos[0]["uploadDate"].is_string());

        let download = app.download(&routes::video("clip.mp4"), &[]).await;
        assert_eq!(download.status(), 200);
        assert_eq!(download.headers()["content-type"], "video/mp4");
        assert_eq!(download.headers()["content-length"], "5242880");
        let body = download.bytes().await.unwrap();
        assert_eq!(body.len(), 5_242_880);
        assert!(body.as_ref() == data.as_slice());
    }

    #[tokio::test]
    async fn round_trips_around_chunk_boundaries() {
        let app = TestApp::spawn_with(small_chunks(16, 1024)).await;

        for len in [1usize, 15, 16, 17, 48, 100] {
            let name = format!("clip-{len}.mp4");
            let data = payload(len);
            let res = app.upload(&name, "video/mp4", data.clone()).await;
            assert_eq!(res.status, 200, "{}", res.text);

            let body = app
                .download(&routes::video(&name), &[])
                .await
                .bytes()
                .await
                .unwrap();
            assert_eq!(body.as_ref(), data.as_slice(), "len {len}");
        }
    }

    #[tokio::test]
    async fn empty_file_is_stored_without_chunks() {
        let app = TestApp::spawn().await;

        let res = app.upload("empty.mp4", "video/mp4", Vec::new()).await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["file"].as_str(), Some("empty.mp4"));
        assert_eq!(res.body["video"]["length"], 0);
        assert_eq!(app.rows().await, (1, 0));

        let download = app.download(&routes::video("empty.mp4"), &[]).await;
        assert_eq!(download.status(), 200);
        assert_eq!(download.headers()["content-length"], "0");
        assert!(download.bytes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_video_field_is_rejected() {
        let app = TestApp::spawn().await;
        let form = reqwest::multipart::Form::new().text("title", "no file here");

        let res = app
            .client
            .post(app.url(routes::UPLOAD))
            .multipart(form)
            .send()
            .await
            .unwrap();

        assert_eq!(res.status(), 400);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["code"], "NO_FILE");
        assert_eq!(app.rows().await, (0, 0));
    }

    #[tokio::test]
    async fn oversized_upload_leaves_no_rows() {
        let app = TestApp::spawn_with(small_chunks(16, 100)).await;

        let res = app.upload("big.mp4", "video/mp4", payload(1000)).await;
        assert_eq!(res.status, 413, "{}", res.text);
        assert_eq!(res.body["code"], "PAYLOAD_TOO_LARGE");
        assert_eq!(app.rows().await, (0, 0));
        assert_eq!(app.get(routes::VIDEOS).await.body, serde_json::json!([]));
    }

    #[tokio::test]
    async fn failed_chunk_write_is_cleaned_up() {
        let app = TestApp::spawn_wrapped(small_chunks(16, 1024), |store| {
            Arc::new(FailingWrites {
                inner: store,
                fail_from: 2,
            })
        })
        .await;

        let res = app.upload("broken.mp4", "video/mp4", payload(100)).await;
        assert_eq!(res.status, 500, "{}", res.text);
        assert_eq!(app.rows().await, (0, 0));
        assert_eq!(app.get(&routes::video("broken.mp4")).await.status, 404);
    }

    #[tokio::test]
    async fn content_type_is_guessed_when_part_has_none() {
        let app = TestApp::spawn().await;
        let part = reqwest::multipart::Part::bytes(payload(10)).file_name("movie.webm");
        let form = reqwest::multipart::Form::new().part("video", part);

        let res = app
            .client
            .post(app.url(routes::UPLOAD))
            .multipart(form)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200);

        let download = app.download(&routes::video("movie.webm"), &[]).await;
        assert_eq!(download.headers()["content-type"], "video/webm");
    }
}

mod download {
    use super::*;

    #[tokio::test]
    async fn unknown_filename_is_not_found() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::video("nope.mp4")).await;
        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn malformed_id_is_bad_request() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::video_by_id("not-a-uuid")).await;
        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn concurrent_same_name_uploads_are_distinct() {
        let app = TestApp::spawn_with(small_chunks(16, 1024)).await;
        let first = payload(40);
        let second: Vec<u8> = payload(70).into_iter().rev().collect();

        let (a, b) = tokio::join!(
            app.upload("same.mp4", "video/mp4", first.clone()),
            app.upload("same.mp4", "video/mp4", second.clone()),
        );
        assert_eq!(a.status, 200);
        assert_eq!(b.status, 200);
        assert_ne!(a.file_id(), b.file_id());

        let list = app.get(routes::VIDEOS).await;
        assert_eq!(list.body.as_array().unwrap().len(), 2);

        for (res, data) in [(&a, &first), (&b, &second)] {
            let body = app
                .download(&routes::video_by_id(&res.file_id()), &[])
                .await
                .bytes()
                .await
                .unwrap();
            assert_eq!(body.as_ref(), data.as_slice());
        }

        let by_name = app
            .download(&routes::video("same.mp4"), &[])
            .await
            .bytes()
            .await
            .unwrap();
        assert!(by_name.as_ref() == first.as_slice() || by_name.as_ref() == second.as_slice());
    }

    #[tokio::test]
    async fn range_request_spans_chunks() {
        let app = TestApp::spawn_with(small_chunks(16, 1024)).await;
        let data = payload(100);
        app.upload("clip.mp4", "video/mp4", data.clone()).await;

        let res = app
            .download(&routes::video("clip.mp4"), &[("Range", "bytes=10-40")])
            .await;
        assert_eq!(res.status(), 206);
        assert_eq!(res.headers()["content-range"], "bytes 10-40/100");
        assert_eq!(res.headers()["content-length"], "31");
        assert_eq!(res.bytes().await.unwrap().as_ref(), &data[10..41]);

        let res = app
            .download(&routes::video("clip.mp4"), &[("Range", "bytes=-5")])
            .await;
        assert_eq!(res.status(), 206);
        assert_eq!(res.bytes().await.unwrap().as_ref(), &data[95..]);
    }

    #[tokio::test]
    async fn unsatisfiable_range_is_416() {
        let app = TestApp::spawn_with(small_chunks(16, 1024)).await;
        app.upload("clip.mp4", "video/mp4", payload(100)).await;

        let res = app
            .download(&routes::video("clip.mp4"), &[("Range", "bytes=500-")])
            .await;
        assert_eq!(res.status(), 416);
        assert_eq!(res.headers()["content-range"], "bytes */100");
    }

    #[tokio::test]
    async fn etag_revalidation_is_not_modified() {
        let app = TestApp::spawn().await;
        app.upload("clip.mp4", "video/mp4", payload(64)).await;

        let first = app.download(&routes::video("clip.mp4"), &[]).await;
        let etag = first.headers()["etag"].to_str().unwrap().to_string();

        let again = app
            .download(&routes::video("clip.mp4"), &[("If-None-Match", &etag)])
            .await;
        assert_eq!(again.status(), 304);
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn delete_removes_file_and_chunks() {
        let app = TestApp::spawn_with(small_chunks(16, 1024)).await;
        let id = app.upload("gone.mp4", "video/mp4", payload(50)).await.file_id();

        let res = app.delete(&routes::video_by_id(&id)).await;
        assert_eq!(res.status, 204);
        assert_eq!(app.rows().await, (0, 0));
        assert_eq!(app.get(&routes::video("gone.mp4")).await.status, 404);

        let again = app.delete(&routes::video_by_id(&id)).await;
        assert_eq!(again.status, 404);
    }
}
