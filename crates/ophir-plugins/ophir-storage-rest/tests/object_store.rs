use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::Router;
use ophir_core::error::AppError;
use ophir_core::models::UploadedImage;
use ophir_core::traits::MediaStore;
use ophir_storage_rest::RestMediaStore;
use tokio::net::TcpListener;

type Received = Arc<Mutex<Vec<(String, HeaderMap, Bytes)>>>;

async fn spawn(status: StatusCode) -> (String, Received) {
    let received: Received = Arc::default();
    let app = Router::new()
        .fallback(
            move |State(received): State<Received>, uri: Uri, headers: HeaderMap, body: Bytes| async move {
                received.lock().unwrap().push((uri.path().to_string(), headers, body));
                status
            },
        )
        .with_state(received.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), received)
}

fn image(name: &str) -> UploadedImage {
    UploadedImage {
        filename: name.to_string(),
        content_type: "image/png".to_string(),
        bytes: bytes::Bytes::from_static(b"\x89PNG"),
    }
}

#[tokio::test]
async fn uploads_bytes_with_service_key_and_content_type() {
    let (base, received) = spawn(StatusCode::OK).await;
    let store = RestMediaStore::new(base, "key".to_string().into(), "property-images");

    store.save_upload(image("1700-villa.png")).await.unwrap();

    let received = received.lock().unwrap();
    let (path, headers, body) = &received[0];
    assert_eq!(path, "/storage/v1/object/property-images/1700-villa.png");
    assert_eq!(headers["apikey"], "key");
    assert_eq!(headers["authorization"], "Bearer key");
    assert_eq!(headers["content-type"], "image/png");
    assert_eq!(body.as_ref(), b"\x89PNG");
}

#[tokio::test]
async fn rejected_upload_is_an_upstream_error() {
    let (base, _) = spawn(StatusCode::BAD_REQUEST).await;
    let store = RestMediaStore::new(base, "key".to_string().into(), "property-images");

    assert!(matches!(
        store.save_upload(image("x.png")).await,
        Err(AppError::Upstream(_))
    ));
}
