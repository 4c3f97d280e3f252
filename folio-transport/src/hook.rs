//! Access-denied hook supplied by the embedding application.
//!
//! When the server answers 401 the transport clears the stored token and
//! hands the application origin to this hook before failing the call. What
//! happens next (redirect to a login form, a prompt, nothing) is up to the
//! application.

use tracing::debug;
use url::Url;

/// Callback invoked on a 401 response.
pub trait AccessDeniedHook: Send + Sync {
    /// Called with the application origin (path stripped).
    fn on_access_denied(&self, origin: &Url);
}

impl<F> AccessDeniedHook for F
where
    F: Fn(&Url) + Send + Sync,
{
    fn on_access_denied(&self, origin: &Url) {
        self(origin);
    }
}

/// Hook that does nothing besides a debug log.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreAccessDenied;

impl AccessDeniedHook for IgnoreAccessDenied {
    fn on_access_denied(&self, origin: &Url) {
        debug!(origin = %origin, "Access denied, no hook installed");
    }
}
