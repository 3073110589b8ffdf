//! Navigation guard.
//!
//! Called by the routing layer before it renders a view.

use crate::constants::{HOME_PATH, LOGIN_PATH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Render the requested view.
    Proceed,
    /// Navigate to this path instead.
    Redirect(&'static str),
}

/// Decides whether navigation to `target` may proceed.
///
/// Unauthenticated users are sent to the login view from everywhere except the login view
/// itself. Authenticated users are sent home from the login view.
pub fn guard(is_authenticated: bool, target: &str) -> GuardDecision {
    let to_login = target == LOGIN_PATH;
    match (is_authenticated, to_login) {
        (false, false) => GuardDecision::Redirect(LOGIN_PATH),
        (true, true) => GuardDecision::Redirect(HOME_PATH),
        _ => GuardDecision::Proceed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthenticated() {
        assert_eq!(guard(false, "/"), GuardDecision::Redirect("/login"));
        assert_eq!(guard(false, "/notes/42"), GuardDecision::Redirect("/login"));
        assert_eq!(guard(false, "/login"), GuardDecision::Proceed);
    }

    #[test]
    fn test_authenticated() {
        assert_eq!(guard(true, "/"), GuardDecision::Proceed);
        assert_eq!(guard(true, "/notes/42"), GuardDecision::Proceed);
        assert_eq!(guard(true, "/login"), GuardDecision::Redirect("/"));
    }

    #[test]
    fn test_path_match_is_exact() {
        assert_eq!(guard(false, "/login/"), GuardDecision::Redirect("/login"));
        assert_eq!(guard(true, "/login?next=/"), GuardDecision::Proceed);
    }
}
