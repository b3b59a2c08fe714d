//! HTTP tests for the upload, list, metadata and download endpoints.

use axum::http::StatusCode;
use axum_test::TestServer;
use filevault::storage::{ContentRepresentation, MemoryFileStore};
use filevault::{AppState, create_router};
use serde_json::{Value, json};

const XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const HELLO_SHA256: &str = "185f8db32271fe25f561a6fc938b2e264306ec304eda518007d1764826381969";

fn create_test_server(store: MemoryFileStore) -> TestServer {
    TestServer::new(create_router(AppState::in_memory(store))).expect("Failed to create test server")
}

fn example_upload() -> Value {
    json!({
        "fileName": "a.xlsx",
        "mimeType": XLSX,
        "contentBase64": "SGVsbG8=",
        "note": "test"
    })
}

async fn upload(server: &TestServer, body: &Value) -> Value {
    let response = server.post("/upload").json(body).await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

#[tokio::test]
async fn health_check_responds_ok() {
    let server = create_test_server(MemoryFileStore::new("anonymous"));
    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_text("OK");
}

#[tokio::test]
async fn example_upload_then_download() {
    let server = create_test_server(MemoryFileStore::new("anonymous"));

    let created = upload(&server, &example_upload()).await;
    assert_eq!(created["fileName"], "a.xlsx");
    assert_eq!(created["mimeType"], XLSX);
    assert_eq!(created["fileSize"], 5);
    assert_eq!(created["checksum"], HELLO_SHA256);
    assert_eq!(created["note"], "test");
    assert_eq!(created["createdBy"], "anonymous");
    assert!(created["createdAt"].is_string());
    assert!(created["modifiedAt"].is_string());
    assert!(created.get("content").is_none());
    assert!(created.get("contentBase64").is_none());

    let id = created["id"].as_str().unwrap();
    let response = server.get(&format!("/files/{}/download", id)).await;

    response.assert_status_ok();
    assert_eq!(&response.as_bytes()[..], b"Hello");
    assert_eq!(response.header("content-type"), XLSX);
    assert_eq!(response.header("content-disposition"), "attachment; filename=\"a.xlsx\"");
    assert_eq!(response.header("content-length"), "5");
}

#[tokio::test]
async fn missing_fields_are_bad_requests_naming_the_field() {
    let server = create_test_server(MemoryFileStore::new("anonymous"));

    for (field, body) in [
        ("fileName", json!({"mimeType": XLSX, "contentBase64": "SGVsbG8="})),
        ("mimeType", json!({"fileName": "a.xlsx", "contentBase64": "SGVsbG8="})),
        ("contentBase64", json!({"fileName": "a.xlsx", "mimeType": XLSX})),
        ("contentBase64", json!({"fileName": "a.xlsx", "mimeType": XLSX, "contentBase64": ""})),
    ] {
        let response = server.post("/upload").json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let error = response.json::<Value>();
        assert_eq!(error["field"], field);
        assert_eq!(error["error"], format!("{} is required", field));
    }

    let list = server.get("/files").await.json::<Vec<Value>>();
    assert!(list.is_empty());
}

#[tokio::test]
async fn invalid_base64_creates_no_record() {
    let server = create_test_server(MemoryFileStore::new("anonymous"));

    let response = server
        .post("/upload")
        .json(&json!({"fileName": "a.xlsx", "mimeType": XLSX, "contentBase64": "***"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "contentBase64 is not valid base64");
    assert!(server.get("/files").await.json::<Vec<Value>>().is_empty());
}

#[tokio::test]
async fn malformed_json_body_is_a_bad_request() {
    let server = create_test_server(MemoryFileStore::new("anonymous"));

    for body in ["{not json", "[1,2]"] {
        let response = server
            .post("/upload")
            .bytes(body.as_bytes().to_vec().into())
            .content_type("application/json")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let error = response.json::<Value>()["error"].as_str().unwrap().to_string();
        assert!(error.starts_with("Invalid upload body"), "{}: {}", body, error);
        assert!(!error.contains("Content-Type"), "{}: {}", body, error);
    }

    assert!(server.get("/files").await.json::<Vec<Value>>().is_empty());
}

#[tokio::test]
async fn non_json_content_type_is_a_bad_request() {
    let server = create_test_server(MemoryFileStore::new("anonymous"));

    let response = server.post("/upload").text("fileName=a.xlsx").await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let error = response.json::<Value>()["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("Invalid upload body"), "{}", error);
}

#[tokio::test]
async fn list_is_newest_first_without_content() {
    let server = create_test_server(MemoryFileStore::new("anonymous"));

    let first = upload(&server, &example_upload()).await;
    let second = upload(
        &server,
        &json!({"fileName": "b.xlsx", "mimeType": XLSX, "contentBase64": "V29ybGQ="}),
    )
    .await;

    let list = server.get("/files").await.json::<Vec<Value>>();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["id"], second["id"]);
    assert_eq!(list[1]["id"], first["id"]);
    assert!(list.iter().all(|file| file.get("content").is_none()));
}

#[tokio::test]
async fn metadata_by_id() {
    let server = create_test_server(MemoryFileStore::new("anonymous"));
    let created = upload(&server, &example_upload()).await;

    let response = server.get(&format!("/files/{}", created["id"].as_str().unwrap())).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), created);

    let missing = server.get(&format!("/files/{}", uuid::Uuid::new_v4())).await;
    missing.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn download_of_unknown_id_is_not_found() {
    let server = create_test_server(MemoryFileStore::new("anonymous"));

    let response = server.get(&format!("/files/{}/download", uuid::Uuid::new_v4())).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn download_with_malformed_id_is_a_bad_request() {
    let server = create_test_server(MemoryFileStore::new("anonymous"));

    let response = server.get("/files/not-a-uuid/download").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn download_without_content_is_not_found() {
    let server = create_test_server(
        MemoryFileStore::new("anonymous").with_representation(ContentRepresentation::Missing),
    );
    let created = upload(&server, &example_upload()).await;

    let response = server
        .get(&format!("/files/{}/download", created["id"].as_str().unwrap()))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn hex_and_wrapped_content_download_identically() {
    for representation in [ContentRepresentation::Hex, ContentRepresentation::Wrapped] {
        let server = create_test_server(MemoryFileStore::new("anonymous").with_representation(representation));
        let created = upload(&server, &example_upload()).await;

        let response = server
            .get(&format!("/files/{}/download", created["id"].as_str().unwrap()))
            .await;
        response.assert_status_ok();
        assert_eq!(&response.as_bytes()[..], b"Hello");
    }
}

#[tokio::test]
async fn unrecognized_content_is_a_server_error() {
    let server = create_test_server(
        MemoryFileStore::new("anonymous").with_representation(ContentRepresentation::Unrecognized),
    );
    let created = upload(&server, &example_upload()).await;

    let response = server
        .get(&format!("/files/{}/download", created["id"].as_str().unwrap()))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let error = response.json::<Value>()["error"].as_str().unwrap().to_string();
    assert!(error.starts_with("Unexpected content format"), "{}", error);
}

#[tokio::test]
async fn empty_mime_type_downloads_as_octet_stream() {
    let store = MemoryFileStore::new("anonymous");
    let record = {
        use filevault::storage::FileStore;
        store
            .insert_one(filevault::models::NewFile {
                id: uuid::Uuid::new_v4(),
                file_name: "raw".into(),
                mime_type: String::new(),
                file_size: 5,
                content: bytes::Bytes::from_static(b"Hello"),
                checksum: HELLO_SHA256.into(),
                note: None,
            })
            .await
            .unwrap()
    };
    let server = create_test_server(store);

    let response = server.get(&format!("/files/{}/download", record.id)).await;
    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "application/octet-stream");
}
