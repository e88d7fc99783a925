use super::*;

fn test_client(base_url: &str) -> DealsClient {
    DealsClient::with_base_url(30, base_url).expect("client construction should not fail")
}

#[test]
fn deals_url_appends_segment_and_query() {
    let client = test_client("https://sixsevendeals.com/api/v1");
    let url = client.deals_url(2, 50, None).unwrap();
    assert_eq!(
        url.as_str(),
        "https://sixsevendeals.com/api/v1/deals?page=2&limit=50"
    );
}

#[test]
fn deals_url_strips_trailing_slash() {
    let client = test_client("https://sixsevendeals.com/api/v1/");
    let url = client.deals_url(1, 10, Some("Audio")).unwrap();
    assert_eq!(
        url.as_str(),
        "https://sixsevendeals.com/api/v1/deals?page=1&limit=10&category=Audio"
    );
}

#[test]
fn deals_url_encodes_category() {
    let client = test_client("https://sixsevendeals.com/api/v1");
    let url = client.deals_url(1, 10, Some("Home & Kitchen")).unwrap();
    assert!(
        url.as_str().contains("category=Home+%26+Kitchen"),
        "category should be percent-encoded: {url}"
    );
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = DealsClient::with_base_url(30, "not a url").unwrap_err();
    assert!(matches!(err, DealsError::ApiError(_)));
}

#[test]
fn check_api_error_reads_error_field() {
    let body = serde_json::json!({"success": false, "error": "Invalid API key"});
    let err = DealsClient::check_api_error(&body).unwrap_err();
    assert!(matches!(err, DealsError::ApiError(ref m) if m == "Invalid API key"));
    assert!(DealsClient::check_api_error(&serde_json::json!({"success": true})).is_ok());
}
