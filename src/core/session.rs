// src/core/session.rs

use std::fs;
use std::path::Path;

use log::{debug, info, warn};
use reqwest::blocking::{Client, multipart};
use scraper::Html;

use crate::config::consts::{
    CAS_LOGIN_OK, CAS_LOGIN_URL, CAS_LOGOUT_OK, CAS_LOGOUT_URL, ROOT_URL, USER_AGENT,
};
use crate::core::error::{DidelError, Result};
use crate::core::html::first;

/// Resolve a root-relative portal path against `root`. Absolute
/// locations pass through unchanged.
pub fn resolve_with(root: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return s!(path);
    }
    if path.starts_with('/') {
        join!(root, path)
    } else {
        join!(root, "/", path)
    }
}

/// Same, against the fixed portal root.
pub fn resolve_url(path: &str) -> String {
    resolve_with(ROOT_URL, path)
}

/// Value of `name` in a raw URL's query string, if present.
pub fn query_param(url: &str, name: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == name).then(|| s!(v))
    })
}

/// One browsing session against the portal: cookie jar, fixed user
/// agent, CAS authentication state.
///
/// Cloning is cheap and clones share the cookie jar, so an entity graph
/// can keep the session that populated it.
#[derive(Clone)]
pub struct Session {
    client: Client,
    root: String,
    cas_login: String,
    cas_logout: String,
    logged_in: bool,
}

/// What the rest of the crate sees of an HTTP exchange.
pub struct Response {
    pub status: u16,
    pub reason: String,
    pub url: String,
    pub text: String,
}

impl Response {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Promote this response to the hard failure signal.
    pub fn error(&self) -> DidelError {
        DidelError::Server {
            status: self.status,
            reason: self.reason.clone(),
            url: self.url.clone(),
        }
    }
}

impl Session {
    pub fn new() -> Result<Self> {
        Self::with_portal(ROOT_URL, CAS_LOGIN_URL, CAS_LOGOUT_URL)
    }

    /// Point the session at a different portal root and CAS front end.
    pub fn with_portal(root: &str, cas_login: &str, cas_logout: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .build()?;
        Ok(Self {
            client,
            root: s!(root),
            cas_login: s!(cas_login),
            cas_logout: s!(cas_logout),
            logged_in: false,
        })
    }

    fn resolve(&self, path: &str) -> String {
        resolve_with(&self.root, path)
    }

    /// Authenticate against the CAS endpoint.
    ///
    /// Ok(false) when the login form has no form key or the success
    /// phrase is missing from the reply; Ok(true) once the session is
    /// good.
    pub fn login(&mut self, username: &str, password: &str) -> Result<bool> {
        let login_url = self.cas_login.clone();
        let page = self.get(&login_url)?;
        if !page.ok() {
            return Ok(false);
        }
        let form_key = {
            let doc = Html::parse_document(&page.text);
            first(doc.root_element(), "input[name=lt]")
                .and_then(|el| el.value().attr("value"))
                .map(String::from)
        };
        let Some(form_key) = form_key else {
            warn!("CAS login page has no form key");
            return Ok(false);
        };
        let resp = self.post(
            &login_url,
            &[],
            &[
                ("username", username),
                ("password", password),
                ("lt", &form_key),
                ("_eventId", "submit"),
            ],
        )?;
        self.logged_in = resp.ok() && resp.text.contains(CAS_LOGIN_OK);
        if self.logged_in {
            info!("logged in as {username}");
        }
        Ok(self.logged_in)
    }

    pub fn logout(&mut self) -> bool {
        let logout_url = self.cas_logout.clone();
        let out = self.get_ensure_text(&logout_url, CAS_LOGOUT_OK);
        if out {
            self.logged_in = false;
        }
        out
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    pub fn get(&self, url: &str) -> Result<Response> {
        let url = self.resolve(url);
        debug!("GET {url}");
        read(self.client.get(&url).send()?)
    }

    pub fn get_with(&self, url: &str, params: &[(&str, &str)]) -> Result<Response> {
        let url = self.resolve(url);
        debug!("GET {url} {params:?}");
        read(self.client.get(&url).query(params).send()?)
    }

    pub fn post(
        &self,
        url: &str,
        params: &[(&str, &str)],
        data: &[(&str, &str)],
    ) -> Result<Response> {
        let url = self.resolve(url);
        debug!("POST {url}");
        read(self.client.post(&url).query(params).form(data).send()?)
    }

    pub fn post_multipart(
        &self,
        url: &str,
        params: &[(&str, &str)],
        form: multipart::Form,
    ) -> Result<Response> {
        let url = self.resolve(url);
        debug!("POST multipart {url}");
        read(self.client.post(&url).query(params).multipart(form).send()?)
    }

    /// get + ok + case-sensitive substring check. Soft by design; flows
    /// that want a hard ServerError issue their own request instead.
    pub fn get_ensure_text(&self, url: &str, needle: &str) -> bool {
        match self.get(url) {
            Ok(resp) => resp.ok() && resp.text.contains(needle),
            Err(e) => {
                warn!("request failed: {e}");
                false
            }
        }
    }

    /// Fetch `url` and write the raw body bytes to `dest`.
    pub fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let url = self.resolve(url);
        let resp = self.client.get(&url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DidelError::Server {
                status: status.as_u16(),
                reason: s!(status.canonical_reason().unwrap_or("")),
                url,
            });
        }
        let bytes = resp.bytes()?;
        fs::write(dest, &bytes)?;
        info!("downloaded {} ({} bytes)", dest.display(), bytes.len());
        Ok(())
    }
}

fn read(resp: reqwest::blocking::Response) -> Result<Response> {
    let status = resp.status();
    let url = s!(resp.url().as_str());
    let text = resp.text()?;
    Ok(Response {
        status: status.as_u16(),
        reason: s!(status.canonical_reason().unwrap_or("")),
        url,
        text,
    })
}
