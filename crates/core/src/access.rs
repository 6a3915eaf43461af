//! Redirect policy applied whenever the observed session changes.
//!
//! The policy is pure: it only looks at whether a user is present and at the
//! page being shown, and answers whether rendering may proceed or where to go.

use url::form_urlencoded;

pub const LANDING_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";
pub const QUIZ_PATH_PREFIX: &str = "/quiz/";
/// Query parameter carrying the page to return to after signing in.
pub const REDIRECT_PARAM: &str = "redirect";

/// How a page is treated by the gatekeeper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Login,
    /// Quiz pages require a session.
    Quiz,
    Public,
}

/// Path plus optional query of the page currently shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    path: String,
    query: Option<String>,
}

impl PageLocation {
    /// Split `path?query`. A fragment, if any, is dropped.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let raw = raw.split('#').next().unwrap_or_default();
        let (path, query) = match raw.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (raw, None),
        };
        let path = if path.is_empty() { LANDING_PATH } else { path };
        Self {
            path: path.to_owned(),
            query: query.filter(|q| !q.is_empty()).map(str::to_owned),
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    #[must_use]
    pub fn path_and_query(&self) -> String {
        match &self.query {
            Some(query) => format!("{}?{query}", self.path),
            None => self.path.clone(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> PageKind {
        let path = self.path.trim_end_matches('/');
        if path == LOGIN_PATH || path.ends_with("/login.html") {
            PageKind::Login
        } else if self.path.starts_with(QUIZ_PATH_PREFIX) || path.ends_with("-quiz.html") {
            PageKind::Quiz
        } else {
            PageKind::Public
        }
    }

    /// Decoded value of the `redirect` query parameter, if present.
    #[must_use]
    pub fn redirect_param(&self) -> Option<String> {
        let query = self.query.as_deref()?;
        form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == REDIRECT_PARAM)
            .map(|(_, value)| value.into_owned())
    }
}

/// Outcome of evaluating the policy for one session change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Rendering may continue.
    Proceed,
    /// Send the user to the login page, remembering where they were.
    RedirectToLogin { return_to: String },
    /// Send a signed-in user away from the login page.
    RedirectTo { path: String },
}

impl GateDecision {
    /// URL to navigate to, if any.
    #[must_use]
    pub fn target(&self) -> Option<String> {
        match self {
            GateDecision::Proceed => None,
            GateDecision::RedirectToLogin { return_to } => Some(login_url(return_to)),
            GateDecision::RedirectTo { path } => Some(path.clone()),
        }
    }
}

/// `/login?redirect=<return_to, URL-encoded>`.
#[must_use]
pub fn login_url(return_to: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(return_to.as_bytes()).collect();
    format!("{LOGIN_PATH}?{REDIRECT_PARAM}={encoded}")
}

/// Accept only same-site absolute paths as post-login targets.
#[must_use]
pub fn safe_return_path(candidate: &str) -> Option<&str> {
    let candidate = candidate.trim();
    let is_local = candidate.starts_with('/')
        && !candidate.starts_with("//")
        && !candidate.contains('\\')
        && !candidate.contains("://");
    is_local.then_some(candidate)
}

/// Apply the redirect policy.
#[must_use]
pub fn decide(signed_in: bool, page: &PageLocation) -> GateDecision {
    match (signed_in, page.kind()) {
        (true, PageKind::Login) => {
            let path = page
                .redirect_param()
                .as_deref()
                .and_then(safe_return_path)
                .filter(|target| PageLocation::parse(target).kind() != PageKind::Login)
                .unwrap_or(LANDING_PATH)
                .to_owned();
            GateDecision::RedirectTo { path }
        }
        (false, PageKind::Quiz) => GateDecision::RedirectToLogin {
            return_to: page.path_and_query(),
        },
        (true, PageKind::Quiz) | (_, PageKind::Public) | (false, PageKind::Login) => {
            GateDecision::Proceed
        }
    }
}
