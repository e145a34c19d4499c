// Application state for HTTP handlers
use crate::application::history_session::SessionRegistry;

pub struct AppState {
    pub sessions: SessionRegistry,
}
