mod expiry;
mod impls;

pub use expiry::is_expiry_body;

use crate::request_context::RequestDispatchContext;

/// HTTP client for the storefront API that recovers from expired sessions with a single
/// coordinated refresh.
///
/// Clones share credentials and refresh state. Separately constructed clients do not.
#[derive(Clone)]
pub struct AuthenticatedClient {
    context: RequestDispatchContext,
}
