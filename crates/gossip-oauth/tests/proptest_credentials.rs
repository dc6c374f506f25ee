//! Property-based tests for header parsing, URL building and token generation.

use proptest::prelude::*;

use gossip_oauth::credentials::BasicCredentials;
use gossip_oauth::token::{ACCESS_TOKEN_BYTES, random_token};
use gossip_oauth::urls::{CallbackUrl, client_callback, code_redirect};

proptest! {
    #[test]
    fn basic_parse_never_panics(value in ".*") {
        let _ = BasicCredentials::parse(&value);
    }

    #[test]
    fn basic_header_parses_back(
        client_id in "[A-Za-z0-9_-]{1,32}",
        client_secret in "[ -~]{1,64}",
    ) {
        let creds = BasicCredentials::new(&client_id, &client_secret);
        let parsed = BasicCredentials::parse(&creds.to_header_value()).unwrap();
        prop_assert_eq!(parsed.client_id, client_id);
        prop_assert_eq!(parsed.client_secret, client_secret);
    }

    #[test]
    fn callback_parse_never_panics(raw in ".*") {
        let _ = CallbackUrl::parse(&raw);
    }

    #[test]
    fn code_redirect_preserves_state(
        scope in "[a-z]{1,12}",
        state in "[A-Za-z0-9_-]{1,43}",
        code in "[A-Za-z0-9_-]{22}",
        port in 1u16..,
    ) {
        let callback = client_callback("localhost", "1234", &scope, &state).unwrap();
        let url = code_redirect(&callback, "localhost", port, &code);
        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();

        prop_assert_eq!(url.path(), format!("/callback/{scope}"));
        prop_assert_eq!(&pairs["state"], &state);
        prop_assert_eq!(&pairs["auth_code"], &code);
        prop_assert_eq!(&pairs["auth_port"], &port.to_string());
    }
}

#[test]
fn random_tokens_are_url_safe_and_distinct() {
    let tokens: std::collections::HashSet<String> =
        (0..256).map(|_| random_token(ACCESS_TOKEN_BYTES)).collect();

    assert_eq!(tokens.len(), 256);
    for token in &tokens {
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
