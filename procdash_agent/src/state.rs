//! Shared agent state: snapshot provider and observer registry.

use std::sync::Arc;

use crate::provider::Snapshots;
use crate::registry::ConnectionRegistry;

#[derive(Clone)]
pub struct AppState {
    pub snapshots: Snapshots,
    pub registry: Arc<ConnectionRegistry>,
}
