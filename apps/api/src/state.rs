use std::sync::Arc;

use crate::auth::session::SessionManager;
use crate::config::Config;
use crate::feedback::generate::FeedbackGenerator;
use crate::identity::IdentityProvider;
use crate::store::DocumentStore;

/// Shared application state injected into all route handlers via Axum
/// extractors. External collaborators are explicit constructor-injected
/// handles; nothing is a process-global.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub identity: Arc<dyn IdentityProvider>,
    /// Pluggable feedback scorer. Production: `LlmFeedbackGenerator`.
    pub generator: Arc<dyn FeedbackGenerator>,
    pub sessions: SessionManager,
    pub config: Config,
}
