//! Runtime for driving user dialogs
//!
//! Loads a user's stage, runs the pure transition, executes its effects and
//! stores the result. Messages for the same user are handled one at a time.

mod memory;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use memory::{MemoryStateStore, MemoryTokenStore};
pub use traits::*;

use crate::state_machine::{transition, Effect, Event, Reply, Stage, Transition};
use crate::uploads::{UploadFlow, UploadTickets};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Owns every user's dialog
pub struct ConversationRuntime {
    states: Arc<dyn StateStore>,
    uploads: Arc<UploadTickets>,
    user_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ConversationRuntime {
    pub fn new(states: Arc<dyn StateStore>, uploads: Arc<UploadTickets>) -> Self {
        Self {
            states,
            uploads,
            user_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Feed a free-text message into the user's dialog and return the reply
    pub async fn handle_message(&self, user_id: &str, text: &str) -> String {
        self.dispatch(user_id, Event::user_message(text)).await
    }

    /// Return the user to the main menu and return the menu text
    pub async fn reset(&self, user_id: &str) -> String {
        self.dispatch(user_id, Event::Reset).await
    }

    async fn dispatch(&self, user_id: &str, event: Event) -> String {
        let lock = self.user_lock(user_id);
        let reply = {
            let _guard = lock.lock().await;
            self.process(user_id, event).await
        };
        drop(lock);
        self.release_user_lock(user_id);
        reply
    }

    async fn process(&self, user_id: &str, event: Event) -> String {
        if matches!(event, Event::Reset) {
            tracing::debug!(user_id, "Reset to menu");
            self.store(user_id, Stage::Menu).await;
            return Reply::Menu.render(None);
        }

        let stage = match self.states.get(user_id).await {
            Ok(Some(stage)) => stage,
            Ok(None) => {
                tracing::info!(user_id, "New user, starting at menu");
                Stage::Menu
            }
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Unreadable dialog state, resetting to menu");
                self.store(user_id, Stage::Menu).await;
                return Reply::Recovered.render(None);
            }
        };

        let from = stage.name();
        let Transition {
            new_stage,
            reply,
            effects,
        } = transition(&stage, event);

        let mut upload_link = None;
        for effect in effects {
            match self.execute_effect(user_id, effect).await {
                Ok(link) => upload_link = Some(link),
                Err(e) => {
                    tracing::error!(user_id, ?effect, error = %e, "Effect failed");
                    return Reply::LinkUnavailable.render(None);
                }
            }
        }

        tracing::debug!(user_id, from, to = new_stage.name(), "Stage transition");
        self.store(user_id, new_stage).await;
        reply.render(upload_link.as_deref())
    }

    async fn execute_effect(&self, user_id: &str, effect: Effect) -> Result<String, StoreError> {
        let flow = match effect {
            Effect::IssueUploadLink { direction } => UploadFlow::Convert { direction },
            Effect::IssueLensUploadLink => UploadFlow::Lens,
        };
        self.uploads.issue(user_id, flow).await
    }

    async fn store(&self, user_id: &str, stage: Stage) {
        if let Err(e) = self.states.set(user_id, stage).await {
            tracing::error!(user_id, error = %e, "Failed to store dialog state");
        }
    }

    fn user_lock(&self, user_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .user_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks.entry(user_id.to_string()).or_default().clone()
    }

    /// Drop the user's lock entry once no other message holds or awaits it
    fn release_user_lock(&self, user_id: &str) {
        let mut locks = self
            .user_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if locks
            .get(user_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(user_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{runtime_with, FailingStateStore, UnavailableTokenStore};
    use super::*;
    use crate::state_machine::{Direction, MAIN_MENU};

    #[tokio::test]
    async fn test_first_contact_starts_at_menu() {
        let (runtime, states, _) = runtime_with(Arc::new(MemoryStateStore::default()));
        let reply = runtime.handle_message("u1", "hello").await;
        assert_eq!(reply, "Invalid input. Please select either 1, 2 or 3.");
        assert_eq!(states.get("u1").await.unwrap(), Some(Stage::Menu));
    }

    #[tokio::test]
    async fn test_upi_dialog_end_to_end() {
        let (runtime, states, _) = runtime_with(Arc::new(MemoryStateStore::default()));

        let reply = runtime.handle_message("u1", "1").await;
        assert!(reply.contains("1. GooglePay"));

        let reply = runtime.handle_message("u1", "3").await;
        assert!(reply.starts_with("You selected Paytm."));

        let reply = runtime.handle_message("u1", "shop@upi;250;Rent").await;
        assert!(reply.contains("upi://pay?pa=shop@upi&am=250.00&cu=INR&tn=Rent"));
        assert!(reply.ends_with(MAIN_MENU));
        assert_eq!(states.get("u1").await.unwrap(), Some(Stage::Menu));
    }

    #[tokio::test]
    async fn test_file_conversion_issues_token() {
        let (runtime, states, tokens) = runtime_with(Arc::new(MemoryStateStore::default()));

        runtime.handle_message("u1", "2").await;
        let reply = runtime.handle_message("u1", "1").await;
        assert!(reply.contains("http://localhost:8086/upload?token="));
        assert_eq!(
            states.get("u1").await.unwrap(),
            Some(Stage::FileConvProvideLink {
                direction: Direction::ToPdf
            })
        );

        let token = reply
            .split("token=")
            .nth(1)
            .and_then(|rest| rest.lines().next())
            .unwrap();
        let ticket = tokens.get(token).await.unwrap().unwrap();
        assert_eq!(ticket.user_id, "u1");

        let reply = runtime.handle_message("u1", "done?").await;
        assert!(reply.starts_with("Processing your file."));
    }

    #[tokio::test]
    async fn test_lens_dialog_issues_lens_link() {
        let (runtime, _, _) = runtime_with(Arc::new(MemoryStateStore::default()));
        runtime.handle_message("u1", "3").await;
        let reply = runtime.handle_message("u1", "1").await;
        assert!(reply.contains("http://localhost:8086/lens_upload?token="));
        let reply = runtime.handle_message("u1", "any news").await;
        assert!(reply.starts_with("Waiting for your photo upload"));
    }

    #[tokio::test]
    async fn test_users_are_independent() {
        let (runtime, states, _) = runtime_with(Arc::new(MemoryStateStore::default()));
        runtime.handle_message("a", "2").await;
        runtime.handle_message("b", "3").await;
        assert_eq!(
            states.get("a").await.unwrap(),
            Some(Stage::FileConvAskDirection)
        );
        assert_eq!(
            states.get("b").await.unwrap(),
            Some(Stage::LensAskGenerateLink)
        );
    }

    #[tokio::test]
    async fn test_reset_returns_menu() {
        let (runtime, states, _) = runtime_with(Arc::new(MemoryStateStore::default()));
        runtime.handle_message("u1", "2").await;
        assert_eq!(runtime.reset("u1").await, MAIN_MENU);
        assert_eq!(states.get("u1").await.unwrap(), Some(Stage::Menu));
    }

    #[tokio::test]
    async fn test_unreadable_state_recovers_to_menu() {
        let failing = Arc::new(FailingStateStore::default());
        let (runtime, _, _) = runtime_with(failing.clone());
        let reply = runtime.handle_message("u1", "1").await;
        assert!(reply.starts_with("Something went wrong. Returning to main menu."));
        assert_eq!(failing.last_set("u1"), Some(Stage::Menu));
    }

    #[tokio::test]
    async fn test_reset_with_unreadable_state_returns_menu() {
        let failing = Arc::new(FailingStateStore::default());
        let (runtime, _, _) = runtime_with(failing.clone());
        assert_eq!(runtime.reset("u1").await, MAIN_MENU);
        assert_eq!(failing.last_set("u1"), Some(Stage::Menu));
    }

    #[tokio::test]
    async fn test_failed_token_issue_keeps_stage() {
        let states = Arc::new(MemoryStateStore::default());
        let uploads = Arc::new(UploadTickets::new(
            Arc::new(UnavailableTokenStore),
            crate::links::LinkBuilder::new("http://localhost:8086"),
            std::time::Duration::from_secs(60),
        ));
        let runtime = ConversationRuntime::new(states.clone(), uploads);

        runtime.handle_message("u1", "3").await;
        let reply = runtime.handle_message("u1", "1").await;
        assert!(reply.starts_with("Sorry, an upload link could not be created"));
        assert_eq!(
            states.get("u1").await.unwrap(),
            Some(Stage::LensAskGenerateLink)
        );
    }

    #[tokio::test]
    async fn test_concurrent_messages_for_one_user_are_serialized() {
        let (runtime, states, _) = runtime_with(Arc::new(MemoryStateStore::default()));
        let runtime = Arc::new(runtime);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let runtime = runtime.clone();
                tokio::spawn(async move { runtime.handle_message("u1", "2").await })
            })
            .collect();
        let mut prompts = 0;
        for handle in handles {
            if handle.await.unwrap().starts_with("You chose Text/Doc") {
                prompts += 1;
            }
        }

        // Only the first message sees the menu; the rest hit the direction stage
        assert_eq!(prompts, 1);
        assert_eq!(states.get("u1").await.unwrap(), Some(Stage::FileConvProvideLink {
            direction: Direction::ToText
        }));
        assert!(runtime.user_locks.lock().unwrap().is_empty());
    }
}
