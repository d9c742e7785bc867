use std::collections::BTreeMap;
use std::time::Duration;

use doccreft_engine::{
    ClientSettings, CompressOutput, DocApi, FailureKind, PdfOutput, ReqwestDocApi, UploadedFile,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> ReqwestDocApi {
    api_with(server, ClientSettings::default())
}

fn api_with(server: &MockServer, settings: ClientSettings) -> ReqwestDocApi {
    ReqwestDocApi::new(ClientSettings {
        api_base: format!("{}/api", server.uri()),
        ..settings
    })
    .expect("client")
}

#[tokio::test]
async fn counter_reads_count_and_defaults_to_zero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/counter"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 17 })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/counter"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let api = api_for(&server);
    assert_eq!(api.usage_count().await.unwrap(), 17);
    assert_eq!(api.usage_count().await.unwrap(), 0);
}

#[tokio::test]
async fn upload_sends_multipart_files_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .and(body_string_contains("name=\"files\"; filename=\"scan.png\""))
        .and(body_string_contains("name=\"files\"; filename=\"notes.pdf\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [
                { "original_name": "scan.png", "server_name": "u1_scan.png", "path": "/srv/u1_scan.png" },
                { "original_name": "notes.pdf", "server_name": "u2_notes.pdf", "path": "/srv/u2_notes.pdf" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let png = dir.path().join("scan.png");
    let pdf = dir.path().join("notes.pdf");
    tokio::fs::write(&png, b"PNG-DATA").await.unwrap();
    tokio::fs::write(&pdf, b"%PDF-1.7").await.unwrap();

    let files = api_for(&server).upload(&[png, pdf]).await.unwrap();
    assert_eq!(
        files,
        vec![
            UploadedFile {
                original_name: "scan.png".to_string(),
                server_name: "u1_scan.png".to_string(),
            },
            UploadedFile {
                original_name: "notes.pdf".to_string(),
                server_name: "u2_notes.pdf".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn upload_of_missing_local_file_is_io_error() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let err = api_for(&server)
        .upload(&[dir.path().join("gone.png")])
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Io);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn convert_posts_names_and_output_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/convert"))
        .and(body_json(json!({
            "files": ["a_1.png", "b_2.png"],
            "output_name": "holiday"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pdf_url": "/api/download/out_9.pdf",
            "filename": "out_9.pdf"
        })))
        .mount(&server)
        .await;

    let output = api_for(&server)
        .convert(&["a_1.png".to_string(), "b_2.png".to_string()], "holiday")
        .await
        .unwrap();
    assert_eq!(
        output,
        PdfOutput {
            pdf_url: "/api/download/out_9.pdf".to_string(),
            filename: "out_9.pdf".to_string(),
        }
    );
}

#[tokio::test]
async fn server_error_text_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/merge"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "At least 2 files required for merging"
        })))
        .mount(&server)
        .await;

    let err = api_for(&server)
        .merge(&["only.pdf".to_string()])
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(400));
    assert_eq!(err.message, "At least 2 files required for merging");
    assert!(err.is_rejection());
}

#[tokio::test]
async fn compress_sends_quality_and_requires_url() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/compress"))
        .and(body_json(json!({ "file": "ok.png", "quality": 40 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": "/api/download/compressed_1.jpg",
            "filename": "compressed_1.jpg"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/compress"))
        .and(body_json(json!({ "file": "odd.png", "quality": 40 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "filename": "x.jpg" })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    assert_eq!(
        api.compress("ok.png", 40).await.unwrap(),
        CompressOutput {
            url: "/api/download/compressed_1.jpg".to_string(),
            filename: "compressed_1.jpg".to_string(),
        }
    );

    let err = api.compress("odd.png", 40).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::MissingField("url"));
    assert!(err.is_rejection());
}

#[tokio::test]
async fn rotate_and_delete_pages_use_their_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/rotate"))
        .and(body_json(json!({ "file": "doc.pdf", "rotations": { "0": 90, "3": -90 } })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pdf_url": "/api/download/rotated_1.pdf",
            "filename": "rotated_1.pdf"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/delete-pages"))
        .and(body_json(json!({ "file": "doc.pdf", "pages": [1, 3] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pdf_url": "/api/download/edited_1.pdf",
            "filename": "edited_1.pdf"
        })))
        .mount(&server)
        .await;

    let api = api_for(&server);
    let rotations = BTreeMap::from([(0, 90), (3, -90)]);
    assert_eq!(
        api.rotate("doc.pdf", &rotations).await.unwrap().filename,
        "rotated_1.pdf"
    );
    assert_eq!(
        api.delete_pages("doc.pdf", &[1, 3]).await.unwrap().filename,
        "edited_1.pdf"
    );
}

#[tokio::test]
async fn non_json_success_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/counter"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&server)
        .await;

    let err = api_for(&server).usage_count().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Decode);
    assert!(!err.is_rejection());
}

#[tokio::test]
async fn download_returns_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/download/out_9.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4 body".to_vec()))
        .mount(&server)
        .await;

    let bytes = api_for(&server).download("out_9.pdf").await.unwrap();
    assert_eq!(&bytes[..], b"%PDF-1.4 body");
}

#[tokio::test]
async fn download_rejects_oversized_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/download/big.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 11]))
        .mount(&server)
        .await;

    let settings = ClientSettings {
        max_download_bytes: 10,
        ..ClientSettings::default()
    };
    let err = api_with(&server, settings)
        .download("big.jpg")
        .await
        .unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(11)
        }
    );
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/counter"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({ "count": 1 })),
        )
        .mount(&server)
        .await;

    let settings = ClientSettings {
        request_timeout: Duration::from_millis(50),
        ..ClientSettings::default()
    };
    let err = api_with(&server, settings).usage_count().await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn unreachable_backend_is_network_error() {
    let server = MockServer::start().await;
    let base = format!("{}/api", server.uri());
    drop(server);

    let api = ReqwestDocApi::new(ClientSettings {
        api_base: base,
        connect_timeout: Duration::from_millis(200),
        ..ClientSettings::default()
    })
    .unwrap();
    let err = api.usage_count().await.unwrap_err();
    assert!(matches!(err.kind, FailureKind::Network | FailureKind::Timeout));
    assert!(!err.is_rejection());
}
