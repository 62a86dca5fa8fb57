use api_tester::catalog::Catalog;
use api_tester::form::{TesterForm, LOADING_TEXT, RESPONSE_PLACEHOLDER};
use api_tester::request::ApiClient;
use api_tester::settings::{
    FileSettingsStore, MemorySettingsStore, SettingsStore, PLATFORM_KEY, TOKEN_KEY,
};
use api_tester::types::Platform;
use api_tester::ApiError;

fn tmp_dir(prefix: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("{}-{}", prefix, uuid::Uuid::new_v4()))
}

fn endpoint(id: &str) -> api_tester::types::EndpointDescriptor {
    Catalog::builtin()
        .expect("builtin catalog")
        .find(id)
        .expect("known endpoint")
        .clone()
}

#[tokio::test]
async fn execute_sends_stripped_token_and_inferred_country() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/incidents")
        .match_query(mockito::Matcher::UrlEncoded("country".into(), "Rwanda".into()))
        .match_header("authorization", "Bearer secret")
        .with_status(200)
        .with_body(r#"{"data":[]}"#)
        .expect(1)
        .create_async()
        .await;

    let mut form = TesterForm::open(endpoint("get-incidents"), server.url(), MemorySettingsStore::new());
    form.set_token("secret.wr");

    let result = form
        .execute(&ApiClient::new())
        .await
        .expect("validation passes");

    mock.assert_async().await;
    assert_eq!(result.render(), "Status: 200 OK\n\n{\n  \"data\": []\n}");
    assert!(!form.is_loading());
    assert_eq!(form.response_text(), result.render());
    assert_eq!(form.setting(TOKEN_KEY).as_deref(), Some("secret.wr"));
}

#[tokio::test]
async fn transport_failure_is_shown_and_loading_cleared() {
    let mut form = TesterForm::open(
        endpoint("get-mines"),
        "http://127.0.0.1:1",
        MemorySettingsStore::new(),
    );
    form.set_token("abc");

    let result = form.execute(&ApiClient::new()).await.expect("validation passes");
    assert!(result.is_failed());
    assert!(!form.is_loading());
    assert!(form.response_text().starts_with("Error: "));
}

#[tokio::test]
async fn response_area_shows_loading_while_request_is_in_flight() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/mines")
        .with_status(200)
        .with_body("[]")
        .expect(1)
        .create_async()
        .await;

    let mut form = TesterForm::open(endpoint("get-mines"), server.url(), MemorySettingsStore::new());
    form.set_token("abc");
    assert_eq!(form.response_text(), RESPONSE_PLACEHOLDER);

    let observe = async {
        for _ in 0..1000 {
            if form.is_loading() {
                return Some(form.response_text());
            }
            tokio::task::yield_now().await;
        }
        None
    };
    let client = ApiClient::new();
    let (result, seen) = tokio::join!(form.execute(&client), observe);

    mock.assert_async().await;
    assert_eq!(seen.as_deref(), Some(LOADING_TEXT));
    assert!(!form.is_loading());
    let result = result.expect("validation passes");
    assert_eq!(form.response_text(), result.render());
    assert_eq!(form.output(), Some(result));
}

#[tokio::test]
async fn missing_placeholder_makes_no_call() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", mockito::Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let form = TesterForm::open(endpoint("get-report-sales"), server.url(), MemorySettingsStore::new());
    let err = form.execute(&ApiClient::new()).await.unwrap_err();

    mock.assert_async().await;
    assert!(matches!(err, ApiError::MissingParameters(ref m) if m == &["mineral".to_string()]));
    assert_eq!(err.to_string(), "Missing required URL parameters: mineral");
    assert_eq!(form.response_text(), RESPONSE_PLACEHOLDER);
    assert!(form.setting(TOKEN_KEY).is_none());
}

#[tokio::test]
async fn post_sends_seeded_body_after_edit() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/forgot")
        .match_header("content-type", "application/json")
        .match_body(mockito::Matcher::Json(serde_json::json!({"email": "a@b.c"})))
        .with_status(201)
        .with_body("queued")
        .expect(1)
        .create_async()
        .await;

    let mut form = TesterForm::open(endpoint("post-forgot"), server.url(), MemorySettingsStore::new());
    form.edit_body(r#"{"email": "a@b.c"}"#).expect("valid json");
    assert!(form.edit_body("{broken").is_err());

    let result = form.execute(&ApiClient::new()).await.expect("validation passes");
    mock.assert_async().await;
    assert_eq!(result.render(), "Status: 201 Created\n\nqueued");
}

#[test]
fn credentials_persist_across_forms_through_file_store() {
    let path = tmp_dir("api-tester-form").join("settings.json");

    let mut form = TesterForm::open(endpoint("get-mine"), "https://api.example.com", FileSettingsStore::open(&path));
    form.set_token("abc");
    form.set_platform(Platform::Gold);
    form.set_url_param("id", "42");
    form.generate_curl().expect("curl");

    let reopened = TesterForm::open(endpoint("get-mines"), "https://api.example.com", FileSettingsStore::open(&path));
    assert_eq!(reopened.config().token, "abc");
    assert_eq!(reopened.config().platform, Platform::Gold);
    assert_eq!(reopened.setting(PLATFORM_KEY).as_deref(), Some("gold"));

    let _ = std::fs::remove_dir_all(path.parent().expect("parent dir"));
}

#[test]
fn curl_for_put_matches_documented_format() {
    let mut form = TesterForm::open(endpoint("update-user"), "https://api.example.com", MemorySettingsStore::new());
    form.set_token("tok");
    form.set_url_param("uid", "u1");
    form.edit_body(r#"{"name":"x"}"#).expect("valid json");

    assert_eq!(
        form.generate_curl().expect("curl"),
        "curl -X PUT \"https://api.example.com/users/u1\" \\\n  \
         -H \"Authorization: Bearer tok\" \\\n  \
         -H \"x-refresh: your_refresh_token_here\" \\\n  \
         -H \"x-platform: 3ts\" \\\n  \
         -H \"Content-Type: application/json\" \\\n  \
         -d '{\"name\":\"x\"}'"
    );
}
