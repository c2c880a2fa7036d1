use super::*;
use crate::store::{CookieTokenStore, ProfileStore};
use reqwest::header::AUTHORIZATION;

fn interceptor_with(access: Option<&str>) -> BearerInterceptor {
    let tokens = CookieTokenStore::new(Arc::new(ProfileStore::in_memory()));
    if let Some(token) = access {
        tokens.set_token(TokenKind::Access, token);
    }
    BearerInterceptor::new(Arc::new(tokens))
}

#[test]
fn attaches_bearer_when_token_present() {
    let request = interceptor_with(Some("T1")).on_request(ApiRequest::get("/members/info"));
    assert_eq!(request.headers.get(AUTHORIZATION).unwrap(), "Bearer T1");
}

#[test]
fn leaves_request_unauthenticated_without_token() {
    let request = interceptor_with(None).on_request(ApiRequest::get("/boards"));
    assert!(request.headers.get(AUTHORIZATION).is_none());
}

#[test]
fn ignores_refresh_token() {
    let tokens = CookieTokenStore::new(Arc::new(ProfileStore::in_memory()));
    tokens.set_token(TokenKind::Refresh, "R1");
    let request = BearerInterceptor::new(Arc::new(tokens)).on_request(ApiRequest::get("/boards"));
    assert!(request.bearer().is_none());
}

#[test]
fn invalid_token_is_skipped_without_panicking() {
    let request = interceptor_with(Some("line\nbreak")).on_request(ApiRequest::get("/boards"));
    assert!(request.headers.get(AUTHORIZATION).is_none());
}

#[test]
fn overwrites_stale_bearer_with_stored_token() {
    let mut stale = ApiRequest::get("/boards");
    stale.set_bearer("OLD");
    let request = interceptor_with(Some("NEW")).on_request(stale);
    assert_eq!(request.bearer(), Some("NEW"));
}
