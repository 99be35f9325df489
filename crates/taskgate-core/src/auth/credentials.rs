use std::sync::Arc;

use reqwest::cookie::CookieStore;
use reqwest::Url;

use super::CookieJar;

/// Name of the cookie carrying the bearer credential
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Literal prefix the backend stores in front of the token
const BEARER_PREFIX: &str = "Bearer ";

/// Read-only view of the bearer credential held in the cookie store.
///
/// The jar is owned by the transport; this type never writes or deletes cookies.
#[derive(Clone)]
pub struct CredentialStore {
    jar: Arc<CookieJar>,
    url: Url,
}

impl CredentialStore {
    /// `url` is the address whose cookies are inspected (the API base).
    pub fn new(jar: Arc<CookieJar>, url: Url) -> Self {
        Self { jar, url }
    }

    /// Current credential, or `None` if no usable `access_token` cookie exists
    pub fn read_credential(&self) -> Option<String> {
        let header = self.jar.cookies(&self.url)?;
        let header = header.to_str().ok()?;
        parse_credential(header)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Extract the credential from a `Cookie` header style string (`a=1; b=2`).
pub fn parse_credential(cookie_header: &str) -> Option<String> {
    cookie_header
        .split(';')
        .find_map(|cookie| {
            let (name, value) = cookie.trim().split_once('=')?;
            (name == ACCESS_TOKEN_COOKIE).then(|| normalize(value))
        })
        .filter(|token| !token.is_empty())
}

/// Strip quote characters and the `Bearer ` prefix
fn normalize(value: &str) -> String {
    let unquoted = value.replace('"', "");
    match unquoted.strip_prefix(BEARER_PREFIX) {
        Some(token) => token.to_string(),
        None => unquoted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::store_cookie;

    #[test]
    fn test_parse_credential_forms() {
        assert_eq!(parse_credential(r#"access_token="Bearer abc123""#).as_deref(), Some("abc123"));
        assert_eq!(parse_credential("access_token=Bearer abc123").as_deref(), Some("abc123"));
        assert_eq!(parse_credential("access_token=abc123").as_deref(), Some("abc123"));
        assert_eq!(parse_credential(r#"access_token="abc123""#).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_parse_credential_among_other_cookies() {
        let header = r#"theme=dark; access_token="Bearer abc123"; lang=ru"#;
        assert_eq!(parse_credential(header).as_deref(), Some("abc123"));

        // Only an exact name match counts
        assert_eq!(parse_credential("my_access_token=zzz; access_token_old=yyy"), None);
    }

    #[test]
    fn test_parse_credential_absent() {
        assert_eq!(parse_credential(""), None);
        assert_eq!(parse_credential("theme=dark"), None);
        assert_eq!(parse_credential("access_token"), None);
        assert_eq!(parse_credential(r#"access_token="""#), None);
    }

    #[test]
    fn test_parse_credential_keeps_padding() {
        assert_eq!(parse_credential("access_token=abc==").as_deref(), Some("abc=="));
    }

    #[test]
    fn test_read_credential_from_jar() {
        let url = Url::parse("http://localhost:8000/api/").expect("valid url");
        let jar = Arc::new(CookieJar::default());
        let store = CredentialStore::new(Arc::clone(&jar), url.clone());
        assert_eq!(store.read_credential(), None);

        store_cookie(&jar, &url, "access_token=plain-token; Path=/");
        assert_eq!(store.read_credential().as_deref(), Some("plain-token"));
    }
}
