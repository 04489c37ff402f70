//! HTTP API
//!
//! Upload and download endpoints for the conversion and lens flows, plus the
//! bearer-protected tool endpoint used by the chat host.

mod handlers;
mod mcp;
mod types;

pub use handlers::create_router;
#[allow(unused_imports)] // Public API re-exports
pub use types::*;

use crate::lens::LensService;
use crate::links::LinkBuilder;
use crate::runtime::ConversationRuntime;
use crate::tools::{ToolContext, ToolRegistry};
use crate::uploads::{FileStore, UploadTickets};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<ConversationRuntime>,
    pub tickets: Arc<UploadTickets>,
    pub files: FileStore,
    pub lens: Arc<LensService>,
    pub tools: Arc<ToolRegistry>,
    pub links: LinkBuilder,
    pub auth_token: Arc<str>,
    pub phone_number: Arc<str>,
}

impl AppState {
    pub fn tool_context(&self) -> ToolContext {
        ToolContext::new(self.runtime.clone(), self.phone_number.clone())
    }
}

#[cfg(test)]
pub mod testing {
    use super::AppState;
    use crate::lens::testing::{visual_match, CannedSearch, StaticHost};
    use crate::lens::{LensService, VisualSearch};
    use crate::links::LinkBuilder;
    use crate::runtime::{ConversationRuntime, MemoryStateStore, MemoryTokenStore};
    use crate::tools::ToolRegistry;
    use crate::uploads::{FileStore, UploadTickets};
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    pub const TEST_TOKEN: &str = "test-auth-token";
    pub const BASE_URL: &str = "http://localhost:8086";

    /// State over in-memory stores, a file store at `dir` and canned lens results
    pub fn test_state(dir: &Path) -> AppState {
        test_state_with_search(
            dir,
            Arc::new(CannedSearch::matches(vec![visual_match("teapot")])),
        )
    }

    pub fn test_state_with_search(dir: &Path, search: Arc<dyn VisualSearch>) -> AppState {
        let links = LinkBuilder::new(BASE_URL);
        let tickets = Arc::new(UploadTickets::new(
            Arc::new(MemoryTokenStore::default()),
            links.clone(),
            Duration::from_secs(3600),
        ));
        let runtime = Arc::new(ConversationRuntime::new(
            Arc::new(MemoryStateStore::default()),
            tickets.clone(),
        ));
        let lens = Arc::new(LensService::new(
            Arc::new(StaticHost::new("https://i.ibb.co/teapot.png")),
            search,
            Duration::from_secs(5),
        ));

        AppState {
            runtime,
            tickets,
            files: FileStore::new(dir),
            lens,
            tools: Arc::new(ToolRegistry::standard()),
            links,
            auth_token: Arc::from(TEST_TOKEN),
            phone_number: Arc::from("919876543210"),
        }
    }
}
