use super::*;
use crate::store::ProfileStore;

fn token_store() -> (Arc<ProfileStore>, CookieTokenStore) {
    let cookies = Arc::new(ProfileStore::in_memory());
    (cookies.clone(), CookieTokenStore::new(cookies))
}

#[test]
fn tokens_are_stored_under_their_cookie_names() {
    let (cookies, tokens) = token_store();
    tokens.set_token(TokenKind::Access, "T1");
    tokens.set_token(TokenKind::Refresh, "R1");

    assert_eq!(cookies.get("accessToken").as_deref(), Some("T1"));
    assert_eq!(cookies.get("refreshToken").as_deref(), Some("R1"));
    assert_eq!(tokens.get_token(TokenKind::Access).as_deref(), Some("T1"));
}

#[test]
fn empty_cookie_reads_as_absent() {
    let (cookies, tokens) = token_store();
    cookies.set("accessToken", "");
    assert_eq!(tokens.get_token(TokenKind::Access), None);
}

#[test]
fn setting_overwrites_previous_token() {
    let (_, tokens) = token_store();
    tokens.set_token(TokenKind::Access, "T1");
    tokens.set_token(TokenKind::Access, "T2");
    assert_eq!(tokens.get_token(TokenKind::Access).as_deref(), Some("T2"));
}

#[test]
fn clear_all_removes_both_tokens_only() {
    let (cookies, tokens) = token_store();
    tokens.set_token(TokenKind::Access, "T1");
    tokens.set_token(TokenKind::Refresh, "R1");
    cookies.set("XSRF-TOKEN", "x");

    tokens.clear_all();

    assert_eq!(tokens.get_token(TokenKind::Access), None);
    assert_eq!(tokens.get_token(TokenKind::Refresh), None);
    assert!(cookies.contains("XSRF-TOKEN"));
}
