//! Route guard
//!
//! Decides whether a screen may be shown for the current session. Denial is a
//! navigation decision, never an error.

use crate::models::SessionRecord;
use crate::services::session::{is_authorized, SessionManager};

/// Where a signed-out visitor is sent
pub const LOGIN_ROUTE: &str = "/login";
/// Where a signed-in user lacking the role is sent
pub const HOME_ROUTE: &str = "/";
/// Landing screen for administrators after login
pub const ADMIN_LANDING_ROUTE: &str = "/admin/dashboard";
/// Landing screen for everyone else after login
pub const USER_LANDING_ROUTE: &str = "/profile";

/// Outcome of a guard check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(String),
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow)
    }
}

/// Guard for screens that require a role
pub struct RouteGuard<'a> {
    sessions: &'a SessionManager,
}

impl<'a> RouteGuard<'a> {
    pub fn new(sessions: &'a SessionManager) -> Self {
        Self { sessions }
    }

    /// Check the current session against `required_role`
    pub fn check(&self, required_role: &str) -> GuardDecision {
        decide(self.sessions.current_session().as_ref(), required_role)
    }
}

/// Guard decision for an explicit session
pub fn decide(session: Option<&SessionRecord>, required_role: &str) -> GuardDecision {
    match session {
        None => GuardDecision::Redirect(LOGIN_ROUTE.to_string()),
        Some(_) if is_authorized(session, required_role) => GuardDecision::Allow,
        Some(_) => GuardDecision::Redirect(HOME_ROUTE.to_string()),
    }
}

/// Screen to show right after a successful login
pub fn landing_route(session: &SessionRecord) -> &'static str {
    if session.is_admin() {
        ADMIN_LANDING_ROUTE
    } else {
        USER_LANDING_ROUTE
    }
}
