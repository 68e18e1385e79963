use crate::models::AdminSession;

use super::state::SessionState;

pub const LOGIN_PATH: &str = "/admin/login";
pub const DASHBOARD_PATH: &str = "/admin/dashboard";

/// What a protected view should do for a given session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision<'a> {
    Render(&'a AdminSession),
    /// A login or logout is in flight; show a loading indicator.
    Loading,
    Redirect(&'static str),
}

/// Outcome of [`RouteGuard::render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guarded<T> {
    Rendered(T),
    Loading,
    Redirect(&'static str),
}

impl<T> Guarded<T> {
    pub fn rendered(self) -> Option<T> {
        match self {
            Self::Rendered(value) => Some(value),
            _ => None,
        }
    }
}

/// Client-side gate in front of admin views.
///
/// Advisory only: the backend still authorises every privileged request.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteGuard;

impl RouteGuard {
    pub fn decide(state: &SessionState) -> GuardDecision<'_> {
        match state {
            SessionState::Authenticated { session, .. } => GuardDecision::Render(session),
            SessionState::Authenticating => GuardDecision::Loading,
            SessionState::Unauthenticated => GuardDecision::Redirect(LOGIN_PATH),
        }
    }

    /// Builds the protected view with `view` only when `state` is
    /// authenticated. `view` is not called otherwise.
    pub fn render<T>(state: &SessionState, view: impl FnOnce(&AdminSession) -> T) -> Guarded<T> {
        match Self::decide(state) {
            GuardDecision::Render(session) => Guarded::Rendered(view(session)),
            GuardDecision::Loading => Guarded::Loading,
            GuardDecision::Redirect(path) => Guarded::Redirect(path),
        }
    }

    /// Where the login page sends an already signed-in admin, if anywhere.
    pub fn login_entry(state: &SessionState) -> Option<&'static str> {
        state.is_authenticated().then_some(DASHBOARD_PATH)
    }
}
