mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::*;
use ophir_core::error::AppError;
use ophir_core::traits::MockMediaStore;

const BOUNDARY: &str = "ophir-boundary";

struct Part<'a> {
    name: &'a str,
    filename: &'a str,
    content_type: Option<&'a str>,
    bytes: &'a [u8],
}

fn multipart(parts: &[Part<'_>], cookie: Option<&str>) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                part.name, part.filename
            )
            .as_bytes(),
        );
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

#[tokio::test]
async fn images_are_renamed_and_stored_in_order() {
    let app = TestApp::new();
    let cookie = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let reply = app
        .send(multipart(
            &[
                Part { name: "images", filename: "my photo (1).png", content_type: Some("image/png"), bytes: b"png" },
                Part { name: "images", filename: "plan.jpg", content_type: None, bytes: b"jpg" },
            ],
            Some(&cookie),
        ))
        .await;

    assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
    assert_eq!(reply.body["success"], true);
    let expected = [
        format!("{START_MILLIS}-my_photo__1_.png"),
        format!("{START_MILLIS}-plan.jpg"),
    ];
    assert_eq!(reply.body["filenames"], serde_json::json!(expected));
    assert_eq!(
        reply.body["urls"],
        serde_json::json!([format!("/media/{}", expected[0]), format!("/media/{}", expected[1])])
    );

    let png = app.media.get(&expected[0]).unwrap();
    assert_eq!(png.content_type, "image/png");
    assert_eq!(&png.bytes[..], b"png");
    assert_eq!(app.media.get(&expected[1]).unwrap().content_type, "image/jpeg");
}

#[tokio::test]
async fn upload_needs_a_session_and_at_least_one_image() {
    let app = TestApp::new();
    let part = Part { name: "images", filename: "a.png", content_type: None, bytes: b"x" };

    let reply = app.send(multipart(&[part], None)).await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

    let cookie = app.login(DEV_EMAIL, DEV_PASSWORD).await;
    let other = Part { name: "attachment", filename: "a.png", content_type: None, bytes: b"x" };
    let reply = app.send(multipart(&[other], Some(&cookie))).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(app.media.is_empty());
}

#[tokio::test]
async fn first_store_failure_aborts_with_500() {
    let mut media = MockMediaStore::new();
    let mut calls = 0;
    media.expect_save_upload().times(2).returning(move |_| {
        calls += 1;
        if calls == 1 {
            Ok(())
        } else {
            Err(AppError::Upstream("bucket is full".into()))
        }
    });
    let (router, _clock) = TestApp::with_media_store(Arc::new(media));

    let login = send(
        &router,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            &format!(r#"{{"email":"{DEV_EMAIL}","password":"{DEV_PASSWORD}"}}"#),
        ),
    )
    .await;
    let cookie = cookie_from(&login.headers);

    let parts = [
        Part { name: "images", filename: "a.png", content_type: None, bytes: b"a" },
        Part { name: "images", filename: "b.png", content_type: None, bytes: b"b" },
        Part { name: "images", filename: "c.png", content_type: None, bytes: b"c" },
    ];
    let reply = send(&router, multipart(&parts, Some(&cookie))).await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!reply.body["error"].as_str().unwrap().contains("bucket"));
}
