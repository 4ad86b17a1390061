use std::collections::HashMap;

use cookie::Cookie;
use hyper::{
    body,
    client::connect::Connect,
    header, Body, Client, Method, Request, Response, StatusCode, Uri,
};
use thiserror::Error;
use tl::ParserOptions;

use crate::{
    ids::Term,
    model::{RawClassEntry, ScheduleResponse},
};

const USER_AGENT: &str = "bics";

const SSO_LOGIN_URL: &str = "https://sso.buaa.edu.cn/login?service=";
const PORTAL_URL: &str = "https://byxt.buaa.edu.cn";
const PORTAL_HOME_URL: &str = "https://byxt.buaa.edu.cn/jwapp/sys/homeapp/index.do";
const SCHEDULE_API_URL: &str =
    "https://byxt.buaa.edu.cn/jwapp/sys/homeapp/api/home/student/getMyScheduleDetail.do";

const EXECUTION_INPUT_NAME: &str = "execution";
const MAX_REDIRECTS: usize = 10;

/// An authenticated exchange with the campus portal.
///
/// `hyper` follows no redirects on its own, and the SSO handshake is
/// nothing but redirects, so the session drives them by hand and keeps
/// every `Set-Cookie` it sees in a jar.
pub struct Session<T> {
    client: Client<T, Body>,
    cookies: HashMap<String, String>,
}

impl<T> Session<T> {
    pub fn new(client: Client<T, Body>) -> Self {
        Self {
            client,
            cookies: HashMap::new(),
        }
    }

    fn store_cookies(&mut self, response: &Response<Body>) {
        for value in response.headers().get_all(header::SET_COOKIE) {
            // Unparsable cookie values are skipped rather than failing the
            // whole exchange.
            if let Some(cookie) = value
                .to_str()
                .ok()
                .and_then(|raw| Cookie::parse(raw.to_owned()).ok())
            {
                self.cookies
                    .insert(cookie.name().to_owned(), cookie.value().to_owned());
            }
        }
    }

    fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl<T> Session<T>
where
    T: Connect + Clone + Send + Sync + 'static,
{
    /// Run the SSO login flow, leaving the portal session cookies in the
    /// jar: fetch the login form, post the credentials with its one-shot
    /// `execution` token, then follow the landing page's script redirect
    /// into the portal.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), SessionError> {
        let target = format!("{SSO_LOGIN_URL}{}", urlencoding::encode(PORTAL_HOME_URL));
        let login_page = self.request(&target, None).await?;
        let execution = execution_token(&login_page)?;

        let form = [
            ("username", username),
            ("password", password),
            (EXECUTION_INPUT_NAME, execution.as_str()),
            ("_eventId", "submit"),
            ("type", "username_password"),
            ("submit", "LOGIN"),
        ]
        .iter()
        .map(|(name, value)| format!("{name}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

        let landing = self.request(&target, Some(form)).await?;
        // On success the landing page is a stub whose script redirects into
        // the portal; on bad credentials the SSO form is served again and
        // carries no such script.
        let path = redirect_script_path(&landing).ok_or(SessionError::LoginRejected)?;
        self.request(&format!("{PORTAL_URL}{path}"), None).await?;
        Ok(())
    }

    /// Fetch the arranged-class list for one term.
    pub async fn schedule(&mut self, term: &Term) -> Result<Vec<RawClassEntry>, SessionError> {
        let url = format!("{SCHEDULE_API_URL}?termCode={}&type=term", term.code());
        let response: ScheduleResponse = serde_json::from_str(&self.request(&url, None).await?)?;
        Ok(response
            .datas
            .map(|datas| datas.arranged_list)
            .unwrap_or_default())
    }

    // One logical exchange: send the request (POST when a form body is
    // given), chase redirects with GET while collecting cookies, and return
    // the final body as text.
    async fn request(&mut self, url: &str, form: Option<String>) -> Result<String, SessionError> {
        let mut url = url.to_owned();
        let mut form = form;
        for _ in 0..MAX_REDIRECTS {
            let mut builder = Request::builder()
                .method(if form.is_some() {
                    Method::POST
                } else {
                    Method::GET
                })
                .uri(&url)
                .header(header::USER_AGENT, USER_AGENT);
            if !self.cookies.is_empty() {
                builder = builder.header(header::COOKIE, self.cookie_header());
            }
            let request = match form.take() {
                Some(body) => builder
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from(body))?,
                None => builder.body(Body::empty())?,
            };

            let response = self.client.request(request).await?;
            self.store_cookies(&response);

            if response.status().is_redirection() {
                let location = response
                    .headers()
                    .get(header::LOCATION)
                    .and_then(|value| value.to_str().ok())
                    .ok_or(SessionError::RedirectWithoutLocation)?;
                url = absolute_url(&url, location)?;
                continue;
            }
            if !response.status().is_success() {
                return Err(SessionError::BadStatus(response.status()));
            }
            let bytes = body::to_bytes(response.into_body()).await?;
            return Ok(String::from_utf8(bytes.to_vec())?);
        }
        Err(SessionError::TooManyRedirects)
    }
}

// Resolve a `Location` header against the URL that produced it.
fn absolute_url(base: &str, location: &str) -> Result<String, SessionError> {
    if location.starts_with("http://") || location.starts_with("https://") {
        return Ok(location.to_owned());
    }
    let base: Uri = base.parse().map_err(hyper::http::Error::from)?;
    let authority = base
        .authority()
        .ok_or_else(|| SessionError::MalformedRedirect(location.to_owned()))?;
    let scheme = base.scheme_str().unwrap_or("https");
    let separator = if location.starts_with('/') { "" } else { "/" };
    Ok(format!("{scheme}://{authority}{separator}{location}"))
}

// The SSO login form carries a one-shot token in
// `<input name="execution" value="...">`.
fn execution_token(html: &str) -> Result<String, SessionError> {
    let dom = tl::parse(html, ParserOptions::default())?;
    let parser = dom.parser();
    dom.query_selector("input")
        .and_then(|mut inputs| {
            inputs.find_map(|handle| {
                let tag = handle.get(parser)?.as_tag()?;
                let name = tag.attributes().get("name")??;
                if name.as_utf8_str() != EXECUTION_INPUT_NAME {
                    return None;
                }
                Some(tag.attributes().get("value")??.as_utf8_str().into_owned())
            })
        })
        .ok_or(SessionError::ExecutionTokenNotFound)
}

// The post-login landing page is a stub along the lines of
// `<script>window.location.href='/jwapp/...';</script>`; the quoted path is
// where the portal session gets established.
fn redirect_script_path(html: &str) -> Option<String> {
    let dom = tl::parse(html, ParserOptions::default()).ok()?;
    let parser = dom.parser();
    dom.query_selector("script")?.find_map(|handle| {
        let text = handle.get(parser)?.inner_text(parser);
        let (_, rest) = text.split_once('\'')?;
        let (path, _) = rest.split_once('\'')?;
        (!path.is_empty()).then(|| path.to_owned())
    })
}

/// Represents errors that can occur driving the portal session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// An argument to build the HTTP request was invalid.
    /// See more [here](https://docs.rs/http/0.2.8/http/request/struct.Builder.html#errors)
    #[error("an argument while building an HTTP request was invalid")]
    MalformedHttpArgs(#[from] hyper::http::Error),
    /// Failed to send HTTP request.
    #[error("failed to send HTTP request")]
    HttpRequestFailed(#[from] hyper::Error),
    /// A response body was not valid UTF-8.
    #[error("response body is not valid UTF-8")]
    BodyInvalidUtf8(#[from] std::string::FromUtf8Error),
    /// A page needed by the login flow was not parsable as HTML.
    #[error("could not parse login page HTML")]
    InvalidHtmlFormat(#[from] tl::errors::ParseError),
    /// The login form did not carry an `execution` token. The most likely
    /// cause is the SSO frontend being updated.
    #[error("could not find the `{EXECUTION_INPUT_NAME}` token on the login page")]
    ExecutionTokenNotFound,
    /// The SSO server did not accept the credentials.
    #[error("login was rejected, check the username and password")]
    LoginRejected,
    /// A non-redirect, non-success status from either the SSO or the portal.
    #[error("server answered with status {0}")]
    BadStatus(StatusCode),
    /// A redirect response carried no `Location` header.
    #[error("redirect response carried no `Location` header")]
    RedirectWithoutLocation,
    /// A relative `Location` could not be resolved against its base URL.
    #[error("could not resolve redirect target `{0}`")]
    MalformedRedirect(String),
    /// The login flow bounced between more pages than it ever legitimately
    /// does.
    #[error("login flow exceeded {MAX_REDIRECTS} redirects")]
    TooManyRedirects,
    /// The schedule endpoint answered with something other than the
    /// expected JSON envelope.
    #[error("schedule payload is not valid JSON")]
    MalformedSchedulePayload(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_execution_token() {
        let html = r#"<html><body><form>
            <input type="hidden" name="lt" value="LT-1" />
            <input type="hidden" name="execution" value="e1s1" />
        </form></body></html>"#;
        assert_eq!(execution_token(html).unwrap(), "e1s1");
    }

    #[test]
    fn missing_execution_token_is_an_error() {
        assert!(matches!(
            execution_token("<html><body>Service unavailable</body></html>"),
            Err(SessionError::ExecutionTokenNotFound)
        ));
    }

    #[test]
    fn extracts_script_redirect_path() {
        let html =
            "<html><script>window.location.href='/jwapp/sys/homeapp/index.do';</script></html>";
        assert_eq!(
            redirect_script_path(html).unwrap(),
            "/jwapp/sys/homeapp/index.do"
        );
    }

    #[test]
    fn login_form_without_redirect_yields_none() {
        let html = r#"<html><body><form>
            <input name="execution" value="e1s2" />
            <span>用户名或密码错误</span>
        </form></body></html>"#;
        assert_eq!(redirect_script_path(html), None);
    }

    #[test]
    fn resolves_relative_redirects() {
        assert_eq!(
            absolute_url("https://sso.buaa.edu.cn/login", "/login?error=1").unwrap(),
            "https://sso.buaa.edu.cn/login?error=1"
        );
        assert_eq!(
            absolute_url("https://sso.buaa.edu.cn/login", "https://byxt.buaa.edu.cn/").unwrap(),
            "https://byxt.buaa.edu.cn/"
        );
    }
}
