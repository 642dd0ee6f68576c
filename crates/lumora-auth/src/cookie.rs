//! Token cookie directives

use chrono::Duration;

/// Default name of the cookie carrying the access token
pub const DEFAULT_COOKIE_NAME: &str = "token";

/// Attributes of the HTTP-only cookie that carries the access token
#[derive(Debug, Clone)]
pub struct CookieSettings {
    pub name: String,
    /// Emit the `Secure` attribute; should be on whenever served over TLS
    pub secure: bool,
    pub max_age: Duration,
}

impl CookieSettings {
    /// `Set-Cookie` value that stores `token` in the browser
    pub fn session_cookie(&self, token: &str) -> String {
        self.render(token, self.max_age.num_seconds().max(0), None)
    }

    /// `Set-Cookie` value that removes the token cookie
    pub fn clear_cookie(&self) -> String {
        self.render("", 0, Some("Thu, 01 Jan 1970 00:00:00 GMT"))
    }

    /// Value of the token cookie in a `Cookie` request header, if present
    pub fn find_in<'a>(&self, cookie_header: &'a str) -> Option<&'a str> {
        cookie_header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.name)
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
    }

    fn render(&self, value: &str, max_age: i64, expires: Option<&str>) -> String {
        let mut cookie = format!("{}={}; Path=/; Max-Age={}", self.name, value, max_age);
        if let Some(expires) = expires {
            cookie.push_str("; Expires=");
            cookie.push_str(expires);
        }
        cookie.push_str("; HttpOnly; SameSite=Lax");
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_COOKIE_NAME.to_string(),
            secure: true,
            max_age: Duration::minutes(30),
        }
    }
}
