//! Route entitlement decisions for the page-serving surface.
//!
//! [`decide`] is a pure function over the session claims and the request
//! path. It performs no I/O and never panics; anything it cannot positively
//! entitle is redirected. Callers resolve the session first and must map any
//! resolution failure to `None` before asking for a decision, so a broken
//! session store degrades to the signed-out flow rather than an open door.

use crate::domain::auth::{Role, SessionClaims};

/// Sign-in surfaces reachable without a session.
pub const SIGN_IN_PATHS: [&str; 2] = ["/signin/user", "/signin/admin"];

/// Sign-in page anonymous visitors are sent to.
pub const ANONYMOUS_REDIRECT: &str = "/signin/user";

/// Pages a sales session may visit, matched exactly or by sub-path.
pub const SALES_ALLOWED_PATHS: [&str; 2] = ["/sales/overview", "/sales/leads"];

/// Path prefixes the gate never inspects.
///
/// The API and health surfaces carry their own session checks, and the
/// OpenAPI explorer and favicon are not pages.
pub const GATE_EXEMPT_PREFIXES: [&str; 4] = ["/api", "/health", "/docs", "/favicon.ico"];

/// Outcome of a gate decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// The request may continue to the requested page.
    Proceed,
    /// The request must be redirected to the contained path.
    Redirect(&'static str),
}

impl RouteDecision {
    /// The redirect target, if the decision is a redirect.
    #[must_use]
    pub const fn redirect_target(self) -> Option<&'static str> {
        match self {
            Self::Proceed => None,
            Self::Redirect(target) => Some(target),
        }
    }
}

/// Decide whether a page request passes or where it is redirected.
///
/// Rules, in order:
///
/// 1. No claims: only the sign-in pages pass; everything else goes to
///    [`ANONYMOUS_REDIRECT`].
/// 2. Claims on a sign-in page: redirect to the role's home path.
/// 3. Admin claims: any path beginning with `/admin` passes; everything
///    else goes to `/admin`.
/// 4. Sales claims: the allow-list and its sub-paths pass; everything else
///    goes to `/sales/overview`.
///
/// # Examples
/// ```
/// use crm_backend::domain::access::{RouteDecision, decide};
///
/// assert_eq!(
///     decide(None, "/sales/overview"),
///     RouteDecision::Redirect("/signin/user"),
/// );
/// ```
#[must_use]
pub fn decide(claims: Option<&SessionClaims>, path: &str) -> RouteDecision {
    let Some(claims) = claims else {
        if is_sign_in_path(path) {
            return RouteDecision::Proceed;
        }
        return RouteDecision::Redirect(ANONYMOUS_REDIRECT);
    };

    if is_sign_in_path(path) {
        return RouteDecision::Redirect(claims.role.home_path());
    }

    match claims.role {
        Role::Admin => {
            if path.starts_with("/admin") {
                RouteDecision::Proceed
            } else {
                RouteDecision::Redirect(Role::Admin.home_path())
            }
        }
        Role::Sales => {
            if SALES_ALLOWED_PATHS
                .iter()
                .any(|allowed| matches_or_descends(path, allowed))
            {
                RouteDecision::Proceed
            } else {
                RouteDecision::Redirect(Role::Sales.home_path())
            }
        }
    }
}

/// True when the path is one of the sign-in pages.
#[must_use]
pub fn is_sign_in_path(path: &str) -> bool {
    SIGN_IN_PATHS.contains(&path)
}

/// True when the path belongs to a surface the gate never inspects.
#[must_use]
pub fn is_gate_exempt(path: &str) -> bool {
    GATE_EXEMPT_PREFIXES
        .iter()
        .any(|prefix| matches_or_descends(path, prefix))
}

/// Exact match or a `/`-delimited descendant of `base`.
///
/// `/sales/leads/7` descends from `/sales/leads`; `/sales/leadsx` does not.
fn matches_or_descends(path: &str, base: &str) -> bool {
    path == base
        || path
            .strip_prefix(base)
            .is_some_and(|rest| rest.starts_with('/'))
}

#[cfg(test)]
#[path = "access_tests.rs"]
mod tests;
