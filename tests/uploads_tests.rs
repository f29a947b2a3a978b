//! Upload operation tests against a mocked service

use std::sync::{Arc, Mutex};

use packlist_client::config::ClientOptions;
use packlist_client::error::Error;
use packlist_client::fetch::ProgressFn;
use packlist_client::file::{FileError, SelectedFile};
use packlist_client::session::User;
use packlist_client::uploads::{Item, UploadStatus};
use packlist_client::PackListClient;
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> PackListClient {
    PackListClient::new_with_options(
        &server.uri(),
        ClientOptions::default().with_persist_session(false),
    )
}

fn signed_in_client(server: &MockServer, token: &str, is_admin: bool) -> PackListClient {
    let client = client_for(server);
    let user = User {
        id: 7,
        username: "clerk".to_string(),
        is_admin,
        created_at: "2024-03-01T09:30:00".to_string(),
    };
    client.session().set_session(token, user).unwrap();
    client
}

fn progress_sink() -> (ProgressFn, Arc<Mutex<Vec<u8>>>) {
    let seen: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = {
        let seen = Arc::clone(&seen);
        Arc::new(move |pct| seen.lock().unwrap().push(pct)) as ProgressFn
    };
    (sink, seen)
}

fn record_json(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "user_id": 7,
        "filename": "shipment.xlsx",
        "has_original_file": true,
        "upload_time": "2024-03-02T08:15:00",
        "status": status,
        "review_comment": null,
        "reviewed_by": null,
        "reviewed_at": null
    })
}

fn pagination_json(page: u32, pages: u32, total: u64) -> Value {
    json!({
        "page": page,
        "pages": pages,
        "per_page": 10,
        "total": total,
        "has_next": page < pages,
        "has_prev": page > 1
    })
}

#[tokio::test]
async fn upload_reports_progress_and_the_validation_summary() {
    let server = MockServer::start().await;
    let client = signed_in_client(&server, "tok-upload", false);

    Mock::given(method("POST"))
        .and(path("/api/user/upload/packing-list"))
        .and(header("Authorization", "Bearer tok-upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Upload processed",
            "upload_id": 41,
            "status": "pending",
            "summary": {
                "total_items": 12,
                "matched_items": 9,
                "unmatched_items": 3
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    // large enough for several chunks
    let file = SelectedFile::from_bytes("shipment.xlsx", vec![0u8; 200_000]);
    let (sink, seen) = progress_sink();

    let response = client
        .uploads()
        .upload_packing_list(&file, Some(sink))
        .await
        .unwrap();

    assert_eq!(response.upload_id, 41);
    assert_eq!(response.status, UploadStatus::Pending);
    assert_eq!(response.summary.total_items, 12);
    assert_eq!(response.summary.unmatched_items, 3);

    let seen = seen.lock().unwrap();
    assert!(!seen.is_empty());
    assert!(seen.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(seen.last().copied(), Some(100));
}

#[tokio::test]
async fn rejected_extension_never_reaches_the_network() {
    let server = MockServer::start().await;
    let client = signed_in_client(&server, "tok-upload", false);

    Mock::given(method("POST"))
        .and(path("/api/user/upload/packing-list"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let file = SelectedFile::from_bytes("notes.csv", b"a,b,c".to_vec());
    let err = client
        .uploads()
        .upload_packing_list(&file, None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::File(FileError::InvalidType { .. })
    ));
}

#[tokio::test]
async fn oversized_file_never_reaches_the_network() {
    let server = MockServer::start().await;
    let client = signed_in_client(&server, "tok-upload", false);

    Mock::given(method("POST"))
        .and(path("/api/user/upload/packing-list"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    // one byte over 16MB
    let file = SelectedFile::from_bytes("huge.xlsx", vec![0u8; 16 * 1024 * 1024 + 1]);
    let err = client
        .uploads()
        .upload_packing_list(&file, None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::File(FileError::TooLarge { .. })));
    assert_eq!(err.to_string(), "File too large. Maximum size: 16MB");
}

#[tokio::test]
async fn upload_failure_surfaces_the_service_message() {
    let server = MockServer::start().await;
    let client = signed_in_client(&server, "tok-upload", false);

    Mock::given(method("POST"))
        .and(path("/api/user/upload/packing-list"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "File could not be parsed"})),
        )
        .mount(&server)
        .await;

    let file = SelectedFile::from_bytes("shipment.xlsx", vec![0u8; 64]);
    let err = client
        .uploads()
        .upload_packing_list(&file, None)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "File could not be parsed");
    assert_eq!(err.status().map(|s| s.as_u16()), Some(400));
}

#[tokio::test]
async fn list_forwards_page_and_status_filter() {
    let server = MockServer::start().await;
    let client = signed_in_client(&server, "tok-list", false);

    Mock::given(method("GET"))
        .and(path("/api/user/uploads"))
        .and(query_param("page", "2"))
        .and(query_param("status", "pending"))
        .and(header("Authorization", "Bearer tok-list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "uploads": [record_json(41, "pending"), record_json(39, "pending")],
            "pagination": pagination_json(2, 3, 24)
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client
        .uploads()
        .list(2, Some(UploadStatus::Pending))
        .await
        .unwrap();

    assert_eq!(page.uploads.len(), 2);
    assert_eq!(page.uploads[0].id, 41);
    assert_eq!(page.pagination.page, 2);
    assert!(page.pagination.has_next);
    assert!(page.pagination.has_prev);
}

#[tokio::test]
async fn details_include_items_and_the_validation_summary() {
    let server = MockServer::start().await;
    let client = signed_in_client(&server, "tok-details", false);

    let mut record = record_json(41, "pending");
    record["items"] = json!([
        {"item_code": "A-100", "quantity": 4, "price": 12.5},
        {"item_code": "B-200", "quantity": 1, "price": 3.0}
    ]);
    record["validation_summary"] = json!({
        "total_items": 2,
        "matched_items": 1,
        "unmatched_items": 1,
        "error": null
    });

    Mock::given(method("GET"))
        .and(path("/api/user/upload/41"))
        .respond_with(ResponseTemplate::new(200).set_body_json(record))
        .mount(&server)
        .await;

    let details = client.uploads().details(41).await.unwrap();

    assert_eq!(details.item_count(), 2);
    assert_eq!(
        details.schema().columns(),
        ["item_code", "quantity", "price"]
    );
    let summary = details.validation_summary.unwrap();
    assert_eq!(summary.matched_items, 1);
    assert_eq!(summary.error, None);
}

#[tokio::test]
async fn missing_upload_surfaces_not_found() {
    let server = MockServer::start().await;
    let client = signed_in_client(&server, "tok-details", false);

    Mock::given(method("GET"))
        .and(path("/api/user/upload/999"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Upload not found"})))
        .mount(&server)
        .await;

    let err = client.uploads().details(999).await.unwrap_err();

    assert_eq!(err.to_string(), "Upload not found");
    assert_eq!(err.status().map(|s| s.as_u16()), Some(404));
}

#[tokio::test]
async fn download_uses_the_user_path_for_regular_sessions() {
    let server = MockServer::start().await;
    let client = signed_in_client(&server, "tok-dl", false);

    Mock::given(method("GET"))
        .and(path("/api/user/upload/41/file"))
        .and(header("Authorization", "Bearer tok-dl"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK\x03\x04fake".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let bytes = client.uploads().download_original(41).await.unwrap();

    assert_eq!(bytes.as_ref(), b"PK\x03\x04fake");
}

#[tokio::test]
async fn download_uses_the_admin_path_for_admin_sessions() {
    let server = MockServer::start().await;
    let client = signed_in_client(&server, "tok-dl-admin", true);

    Mock::given(method("GET"))
        .and(path("/api/admin/upload/41/file"))
        .and(header("Authorization", "Bearer tok-dl-admin"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK\x03\x04fake".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let bytes = client.uploads().download_original(41).await.unwrap();

    assert_eq!(bytes.len(), 8);
}

#[tokio::test]
async fn delete_confirms_without_a_payload() {
    let server = MockServer::start().await;
    let client = signed_in_client(&server, "tok-del", false);

    Mock::given(method("DELETE"))
        .and(path("/api/user/upload/41"))
        .and(header("Authorization", "Bearer tok-del"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Upload deleted"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    client.uploads().delete(41).await.unwrap();
}

#[tokio::test]
async fn edit_item_puts_the_full_replacement() {
    let server = MockServer::start().await;
    let client = signed_in_client(&server, "tok-edit", false);

    Mock::given(method("PUT"))
        .and(path("/api/user/upload/41/items/1"))
        .and(body_json(json!({
            "item_code": "B-200",
            "quantity": 9,
            "price": 3.0
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Item updated"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut item = Item::new();
    item.insert("item_code".to_string(), json!("B-200"));
    item.insert("quantity".to_string(), json!(9));
    item.insert("price".to_string(), json!(3.0));

    client.uploads().edit_item(41, 1, &item).await.unwrap();
}

#[tokio::test]
async fn editing_out_of_range_surfaces_the_service_error() {
    let server = MockServer::start().await;
    let client = signed_in_client(&server, "tok-edit", false);

    Mock::given(method("PUT"))
        .and(path("/api/user/upload/41/items/99"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "Invalid item index"})),
        )
        .mount(&server)
        .await;

    let item = Item::new();
    let err = client.uploads().edit_item(41, 99, &item).await.unwrap_err();

    assert_eq!(err.to_string(), "Invalid item index");
}
