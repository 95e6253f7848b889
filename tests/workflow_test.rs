use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use coverlens::config::Config;
use coverlens::db;
use coverlens::domain::DomainError;
use coverlens::infrastructure::AppState;
use coverlens::models::{book_information, genre_prediction};
use coverlens::modules::inference::{CoverReader, CoverText, GenreClassifier, GenreGuess};
use coverlens::modules::integrations::GoogleBooksClient;
use coverlens::server;
use sea_orm::EntityTrait;
use std::path::Path;
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot`
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 13];

struct FixedGenre;

#[async_trait]
impl GenreClassifier for FixedGenre {
    async fn predict_genre(&self, _image_path: &Path) -> Result<GenreGuess, DomainError> {
        Ok(GenreGuess {
            genre: "Business & Money".to_string(),
            confidence: 0.6679179,
        })
    }
}

struct FixedReader;

#[async_trait]
impl CoverReader for FixedReader {
    async fn read_cover(&self, image_path: &Path) -> Result<CoverText, DomainError> {
        // The cover must already be on disk when the models run
        assert!(image_path.exists(), "cover not stored before OCR");
        Ok(CoverText {
            pred_title: "WHY NATIONS FAIL".to_string(),
            pred_author: "Daron Acemoglu".to_string(),
        })
    }
}

struct BrokenReader;

#[async_trait]
impl CoverReader for BrokenReader {
    async fn read_cover(&self, _image_path: &Path) -> Result<CoverText, DomainError> {
        Err(DomainError::External("OCR model returned status: 503".to_string()))
    }
}

struct TestApp {
    app: Router,
    state: AppState,
    upload_dir: tempfile::TempDir,
    _books: MockServer,
}

async fn mount_volumes(books: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/volumes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(books)
        .await;
}

fn why_nations_fail() -> serde_json::Value {
    serde_json::json!({
        "totalItems": 2,
        "items": [
            {
                "volumeInfo": {
                    "title": "Summary of Why Nations Fail",
                    "authors": ["Quick Reads"]
                }
            },
            {
                "volumeInfo": {
                    "title": "Why Nations Fail",
                    "authors": ["Daron Acemoglu", "James A. Robinson"],
                    "categories": ["Business & Economics"],
                    "publisher": "Crown Business",
                    "infoLink": "http://books.google.com/books?id=PLlOCUIAh88C"
                }
            }
        ]
    })
}

async fn setup(reader: Arc<dyn CoverReader>, volumes: serde_json::Value) -> TestApp {
    setup_with(reader, volumes, &[]).await
}

async fn setup_with(
    reader: Arc<dyn CoverReader>,
    volumes: serde_json::Value,
    overrides: &[(&str, &str)],
) -> TestApp {
    let books = MockServer::start().await;
    mount_volumes(&books, volumes).await;

    let upload_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let dir = upload_dir.path().to_string_lossy().to_string();
    let config = Config::from_lookup(|key| match key {
        "UPLOAD_DIR" => Some(dir.clone()),
        _ => overrides
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string()),
    });

    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    let metadata = Arc::new(GoogleBooksClient::new(books.uri(), None).unwrap());
    let state = AppState::new(db, config, Arc::new(FixedGenre), reader, metadata);

    TestApp {
        app: server::build_router(state.clone()),
        state,
        upload_dir,
        _books: books,
    }
}

struct Reply {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl Reply {
    fn location(&self) -> &str {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }
}

async fn send(app: &Router, req: Request<Body>) -> Reply {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    Reply {
        status,
        headers,
        body: String::from_utf8_lossy(&body).to_string(),
    }
}

/// Open a session and return its cookie
async fn start_session(app: &Router) -> String {
    let reply = send(
        app,
        Request::builder()
            .uri("/uploadImage")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);

    let set_cookie = reply
        .headers
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .expect("session cookie not set");
    set_cookie.split(';').next().unwrap().to_string()
}

fn get(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

fn post_form(uri: &str, cookie: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_upload(cookie: &str, field: &str, filename: &str, data: &[u8]) -> Request<Body> {
    let boundary = "coverlens-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/uploadImage")
        .header(header::COOKIE, cookie)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn upload_flash(t: &TestApp, cookie: &str) -> String {
    let page = send(&t.app, get("/uploadImage", cookie)).await;
    assert_eq!(page.status, StatusCode::OK);
    page.body
}

#[tokio::test]
async fn test_confirmed_upload_persists_both_records() {
    let t = setup(Arc::new(FixedReader), why_nations_fail()).await;
    let cookie = start_session(&t.app).await;

    let reply = send(&t.app, post_upload(&cookie, "file", "why nations fail.png", PNG_BYTES)).await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location(), "/checkbookDetails");
    assert!(t.upload_dir.path().join("why_nations_fail.png").exists());

    let page = send(&t.app, get("/checkbookDetails", &cookie)).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Business &amp; Money"));
    assert!(page.body.contains("0.6679179"));
    assert!(page.body.contains("Crown Business"));
    assert!(page.body.contains("/static/why_nations_fail.png"));

    let reply = send(
        &t.app,
        post_form("/checkbookDetails", &cookie, "confirm_details_button=Yes"),
    )
    .await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location(), "/uploadImage");

    let genres = genre_prediction::Entity::find()
        .all(t.state.db())
        .await
        .unwrap();
    assert_eq!(genres.len(), 1);
    assert_eq!(genres[0].genre, "Business & Money");
    assert_eq!(genres[0].confidence, "0.6679179");
    assert_eq!(genres[0].file_name, "why_nations_fail.png");

    let infos = book_information::Entity::find()
        .all(t.state.db())
        .await
        .unwrap();
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].title, "Why Nations Fail");
    assert_eq!(infos[0].authors, "Daron Acemoglu, James A. Robinson");
    assert_eq!(infos[0].categories, "Business & Economics");
    assert_eq!(infos[0].publisher, "Crown Business");
    assert_eq!(
        infos[0].info_link,
        "https://books.google.com/books?id=PLlOCUIAh88C"
    );
    assert_eq!(infos[0].file_name, "why_nations_fail.png");

    let body = upload_flash(&t, &cookie).await;
    assert!(body.contains(r#"class="flash success""#));

    // The staged upload is consumed by the confirmation
    let reply = send(&t.app, get("/checkbookDetails", &cookie)).await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location(), "/uploadImage");
}

#[tokio::test]
async fn test_rejecting_details_leads_to_correction() {
    let t = setup(Arc::new(FixedReader), why_nations_fail()).await;
    let cookie = start_session(&t.app).await;

    send(&t.app, post_upload(&cookie, "file", "cover.JPG", &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0])).await;

    let reply = send(
        &t.app,
        post_form("/checkbookDetails", &cookie, "confirm_details_button=No"),
    )
    .await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location(), "/editbookDetails");

    let page = send(&t.app, get("/editbookDetails", &cookie)).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains(r#"value="WHY NATIONS FAIL""#));
    assert!(page.body.contains(r#"value="Daron Acemoglu""#));

    let reply = send(
        &t.app,
        post_form(
            "/editbookDetails",
            &cookie,
            "updatedbooktitle=Why+Nations+Fail&updatedbookauthor=James+Robinson",
        ),
    )
    .await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location(), "/uploadImage");

    let infos = book_information::Entity::find()
        .all(t.state.db())
        .await
        .unwrap();
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].title, "Why Nations Fail");
    assert_eq!(infos[0].file_name, "cover.JPG");

    let genres = genre_prediction::Entity::find()
        .all(t.state.db())
        .await
        .unwrap();
    assert_eq!(genres.len(), 1);
}

#[tokio::test]
async fn test_blank_correction_is_rejected() {
    let t = setup(Arc::new(FixedReader), why_nations_fail()).await;
    let cookie = start_session(&t.app).await;
    send(&t.app, post_upload(&cookie, "file", "cover.png", PNG_BYTES)).await;

    let page = send(
        &t.app,
        post_form(
            "/editbookDetails",
            &cookie,
            "updatedbooktitle=+&updatedbookauthor=",
        ),
    )
    .await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Enter a title or an author"));

    let infos = book_information::Entity::find()
        .all(t.state.db())
        .await
        .unwrap();
    assert!(infos.is_empty());
}

#[tokio::test]
async fn test_upload_validation_messages() {
    let t = setup(Arc::new(FixedReader), why_nations_fail()).await;
    let cookie = start_session(&t.app).await;

    let cases: [(&str, &str, &[u8], &str); 4] = [
        ("photo", "cover.png", PNG_BYTES, "No file part"),
        ("file", "", PNG_BYTES, "No selected file"),
        ("file", "cover.gif", b"GIF89a.....", "Not a Valid File, must be a png, jpg or jpeg"),
        ("file", "notes.png", b"not really an image", "Not a Valid File, must be a png, jpg or jpeg"),
    ];

    for (field, filename, data, message) in cases {
        let reply = send(&t.app, post_upload(&cookie, field, filename, data)).await;
        assert_eq!(reply.status, StatusCode::SEE_OTHER, "{}", filename);
        assert_eq!(reply.location(), "/uploadImage");

        let body = upload_flash(&t, &cookie).await;
        assert!(body.contains(message), "missing '{}' for {}", message, filename);
    }

    // Not multipart at all
    let reply = send(&t.app, post_form("/uploadImage", &cookie, "file=cover.png")).await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert!(upload_flash(&t, &cookie).await.contains("No file part"));
}

#[tokio::test]
async fn test_review_pages_require_an_upload() {
    let t = setup(Arc::new(FixedReader), why_nations_fail()).await;
    let cookie = start_session(&t.app).await;

    for uri in ["/checkbookDetails", "/editbookDetails"] {
        let reply = send(&t.app, get(uri, &cookie)).await;
        assert_eq!(reply.status, StatusCode::SEE_OTHER);
        assert_eq!(reply.location(), "/uploadImage");
        assert!(upload_flash(&t, &cookie).await.contains("Upload a book cover first"));
    }

    let reply = send(
        &t.app,
        post_form("/checkbookDetails", &cookie, "confirm_details_button=Yes"),
    )
    .await;
    assert_eq!(reply.location(), "/uploadImage");
    let genres = genre_prediction::Entity::find()
        .all(t.state.db())
        .await
        .unwrap();
    assert!(genres.is_empty());
}

#[tokio::test]
async fn test_inference_failure_is_flashed() {
    let t = setup(Arc::new(BrokenReader), why_nations_fail()).await;
    let cookie = start_session(&t.app).await;

    let reply = send(&t.app, post_upload(&cookie, "file", "cover.png", PNG_BYTES)).await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location(), "/uploadImage");

    let body = upload_flash(&t, &cookie).await;
    assert!(body.contains("Could not analyse the cover"));
    assert!(!t.upload_dir.path().join("cover.png").exists());

    let reply = send(&t.app, get("/checkbookDetails", &cookie)).await;
    assert_eq!(reply.location(), "/uploadImage");
}

#[tokio::test]
async fn test_unmatched_lookup_falls_back_to_ocr_text() {
    let t = setup(Arc::new(FixedReader), serde_json::json!({ "totalItems": 0 })).await;
    let cookie = start_session(&t.app).await;
    send(&t.app, post_upload(&cookie, "file", "cover.png", PNG_BYTES)).await;

    let page = send(&t.app, get("/checkbookDetails", &cookie)).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("No match found on Google Books"));
    assert!(page.body.contains("WHY NATIONS FAIL"));

    send(
        &t.app,
        post_form("/checkbookDetails", &cookie, "confirm_details_button=Yes"),
    )
    .await;

    let infos = book_information::Entity::find()
        .all(t.state.db())
        .await
        .unwrap();
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].title, "WHY NATIONS FAIL");
    assert_eq!(infos[0].publisher, "Unknown");
}

#[tokio::test]
async fn test_sessions_do_not_share_uploads() {
    let t = setup(Arc::new(FixedReader), why_nations_fail()).await;
    let alice = start_session(&t.app).await;
    let bob = start_session(&t.app).await;
    assert_ne!(alice, bob);

    send(&t.app, post_upload(&alice, "file", "cover.png", PNG_BYTES)).await;

    let reply = send(&t.app, get("/checkbookDetails", &bob)).await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    let reply = send(&t.app, get("/checkbookDetails", &alice)).await;
    assert_eq!(reply.status, StatusCode::OK);
}

fn stored_files(t: &TestApp) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(t.upload_dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_unknown_confirmation_value_rerenders_page() {
    let t = setup(Arc::new(FixedReader), why_nations_fail()).await;
    let cookie = start_session(&t.app).await;
    send(&t.app, post_upload(&cookie, "file", "cover.png", PNG_BYTES)).await;

    let page = send(
        &t.app,
        post_form("/checkbookDetails", &cookie, "confirm_details_button=Maybe"),
    )
    .await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Crown Business"));

    let genres = genre_prediction::Entity::find()
        .all(t.state.db())
        .await
        .unwrap();
    assert!(genres.is_empty());
    let infos = book_information::Entity::find()
        .all(t.state.db())
        .await
        .unwrap();
    assert!(infos.is_empty());

    // Still staged
    let page = send(&t.app, get("/checkbookDetails", &cookie)).await;
    assert_eq!(page.status, StatusCode::OK);
}

#[tokio::test]
async fn test_non_latin_filename_is_renamed() {
    let t = setup(Arc::new(FixedReader), why_nations_fail()).await;
    let cookie = start_session(&t.app).await;

    let reply = send(&t.app, post_upload(&cookie, "file", "日本.png", PNG_BYTES)).await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location(), "/checkbookDetails");

    let files = stored_files(&t);
    assert_eq!(files.len(), 1);
    assert!(files[0].starts_with("cover-"), "{}", files[0]);
    assert!(files[0].ends_with(".png"), "{}", files[0]);

    send(
        &t.app,
        post_form("/checkbookDetails", &cookie, "confirm_details_button=Yes"),
    )
    .await;
    let infos = book_information::Entity::find()
        .all(t.state.db())
        .await
        .unwrap();
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].file_name, files[0]);
}

#[tokio::test]
async fn test_oversized_upload_reports_the_limit() {
    let t = setup_with(
        Arc::new(FixedReader),
        why_nations_fail(),
        &[("MAX_UPLOAD_BYTES", "256")],
    )
    .await;
    let cookie = start_session(&t.app).await;

    let mut data = PNG_BYTES.to_vec();
    data.resize(4096, 0);
    let reply = send(&t.app, post_upload(&cookie, "file", "cover.png", &data)).await;
    assert_eq!(reply.status, StatusCode::SEE_OTHER);
    assert_eq!(reply.location(), "/uploadImage");

    let body = upload_flash(&t, &cookie).await;
    assert!(body.contains("File is too large"));
    assert!(!body.contains("No file part"));
    assert!(stored_files(&t).is_empty());
}

#[tokio::test]
async fn test_same_name_does_not_replace_a_pending_cover() {
    let t = setup(Arc::new(FixedReader), why_nations_fail()).await;
    let alice = start_session(&t.app).await;
    let bob = start_session(&t.app).await;

    send(&t.app, post_upload(&alice, "file", "cover.png", PNG_BYTES)).await;
    let original = std::fs::read(t.upload_dir.path().join("cover.png")).unwrap();

    let mut other = PNG_BYTES.to_vec();
    other.extend_from_slice(b"bob");
    let reply = send(&t.app, post_upload(&bob, "file", "cover.png", &other)).await;
    assert_eq!(reply.location(), "/checkbookDetails");

    assert_eq!(
        std::fs::read(t.upload_dir.path().join("cover.png")).unwrap(),
        original
    );
    let files = stored_files(&t);
    assert_eq!(files.len(), 2);
    assert!(files.iter().any(|f| f.starts_with("cover-")));
}
