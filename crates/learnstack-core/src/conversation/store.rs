use tokio::sync::watch;

use super::state::{ConversationState, StateTransition};

/// Observable holder of the [`ConversationState`].
///
/// The conversation controller is the only writer; everything else reads a
/// snapshot or subscribes to changes. Each applied transition wakes the
/// subscribers once.
pub struct ConversationStore {
    state: watch::Sender<ConversationState>,
}

impl ConversationStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ConversationState::default());
        Self { state }
    }

    pub fn snapshot(&self) -> ConversationState {
        self.state.borrow().clone()
    }

    /// Reads the state in place without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&ConversationState) -> R) -> R {
        f(&self.state.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<ConversationState> {
        self.state.subscribe()
    }

    pub fn apply(&self, transition: StateTransition) {
        self.state.send_modify(|state| state.apply(transition));
    }

    /// Applies `transition` only if `guard` accepts the current state.
    ///
    /// Guard and transition run under the same lock, so no other transition
    /// can slip in between the check and the update.
    pub fn apply_if(
        &self,
        guard: impl FnOnce(&ConversationState) -> bool,
        transition: StateTransition,
    ) -> bool {
        self.state.send_if_modified(|state| {
            if guard(state) {
                state.apply(transition);
                true
            } else {
                false
            }
        })
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Message;

    #[test]
    fn test_apply_updates_snapshot() {
        let store = ConversationStore::new();
        store.apply(StateTransition::ChatOpened {
            chat_id: "c1".to_string(),
            messages: vec![Message::user("hi")],
        });

        let snapshot = store.snapshot();
        assert_eq!(snapshot.current_chat_id.as_deref(), Some("c1"));
        assert_eq!(store.read(|state| state.messages.len()), 1);
    }

    #[test]
    fn test_apply_if_respects_guard() {
        let store = ConversationStore::new();
        let start = || StateTransition::TurnStarted {
            user: Message::user("hi"),
            placeholder: Message::assistant_placeholder(),
        };

        assert!(store.apply_if(|state| !state.is_loading, start()));
        assert!(!store.apply_if(|state| !state.is_loading, start()));
        assert_eq!(store.read(|state| state.messages.len()), 2);
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let store = ConversationStore::new();
        let mut rx = store.subscribe();

        store.apply(StateTransition::ChatOpened {
            chat_id: "c1".to_string(),
            messages: Vec::new(),
        });

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().current_chat_id.as_deref(), Some("c1"));
    }
}
