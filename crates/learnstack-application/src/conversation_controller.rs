//! Conversation use cases.
//!
//! `ConversationController` is the only writer of the conversation store. It
//! turns user actions into backend calls and the resulting
//! [`StateTransition`]s:
//!
//! - new chat / select chat: plain transitions
//! - delete chat(s): applied optimistically, backend call in the background,
//!   failures only logged
//! - send message: optimistic turn (`TurnStarted`), settled by
//!   `TurnCompleted` or undone by `TurnRolledBack`

use learnstack_core::chat::BackendClient;
use learnstack_core::conversation::{
    ConversationState, ConversationStore, Message, StateTransition, display_text, flatten_history,
    messages_from_history,
};
use learnstack_core::error::{LearnstackError, Result};
use learnstack_core::user::UserSession;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Drives the chat view for one logged-in session.
pub struct ConversationController {
    client: Arc<dyn BackendClient>,
    session: UserSession,
    store: Arc<ConversationStore>,
}

impl ConversationController {
    /// Creates a controller with an empty conversation for `session`.
    pub fn new(client: Arc<dyn BackendClient>, session: UserSession) -> Self {
        Self {
            client,
            session,
            store: Arc::new(ConversationStore::new()),
        }
    }

    pub fn session(&self) -> &UserSession {
        &self.session
    }

    pub fn snapshot(&self) -> ConversationState {
        self.store.snapshot()
    }

    /// Subscribes to every state change, e.g. to re-render a view.
    pub fn subscribe(&self) -> watch::Receiver<ConversationState> {
        self.store.subscribe()
    }

    /// Refreshes the chat list.
    ///
    /// On failure the previous list is kept and the error is returned.
    pub async fn load_chats(&self) -> Result<()> {
        match self.client.list_chats(self.session.token()).await {
            Ok(chats) => {
                tracing::debug!("[ConversationController] Loaded {} chats", chats.len());
                self.store.apply(StateTransition::ChatsLoaded(chats));
                Ok(())
            }
            Err(e) => {
                tracing::error!("[ConversationController] Failed to load chats: {}", e);
                Err(e)
            }
        }
    }

    /// Leaves the current chat for an empty one.
    pub fn new_chat(&self) {
        self.store.apply(StateTransition::NewChat);
    }

    /// Opens `chat_id`, replacing the shown messages with its history.
    ///
    /// On failure the current view is left untouched.
    pub async fn select_chat(&self, chat_id: &str) -> Result<()> {
        let chat = self
            .client
            .get_chat(chat_id, self.session.token())
            .await
            .map_err(|e| {
                tracing::error!("[ConversationController] Failed to load chat {}: {}", chat_id, e);
                e
            })?;

        let messages = messages_from_history(&chat.id, &chat.history);
        self.store.apply(StateTransition::ChatOpened {
            chat_id: chat.id,
            messages,
        });
        Ok(())
    }

    /// Removes `chat_id` from the view at once and deletes it in the background.
    ///
    /// If it was the open chat, the view switches to a new chat. A failed
    /// backend delete is logged and not rolled back.
    ///
    /// # Returns
    ///
    /// The handle of the background delete; dropping it does not cancel it.
    pub fn delete_chat(&self, chat_id: &str) -> JoinHandle<()> {
        self.store.apply(StateTransition::ChatRemoved {
            chat_id: chat_id.to_string(),
        });

        let client = Arc::clone(&self.client);
        let token = self.session.token().clone();
        let chat_id = chat_id.to_string();
        tokio::spawn(async move {
            if let Err(e) = client.delete_chat(&chat_id, &token).await {
                tracing::error!("[ConversationController] Failed to delete chat {}: {}", chat_id, e);
            }
        })
    }

    /// Empties the chat list at once and deletes every chat in the background.
    pub fn delete_all_chats(&self) -> JoinHandle<()> {
        self.store.apply(StateTransition::AllChatsRemoved);

        let client = Arc::clone(&self.client);
        let token = self.session.token().clone();
        tokio::spawn(async move {
            if let Err(e) = client.delete_all_chats(&token).await {
                tracing::error!("[ConversationController] Failed to delete all chats: {}", e);
            }
        })
    }

    /// Sends `text` and streams the reply into a placeholder message.
    ///
    /// Blank input is ignored. While the reply streams the placeholder shows
    /// the accumulated text, unwrapped from a `{"reply": ...}` envelope when
    /// the text forms one. On success the chat list is refreshed.
    ///
    /// # Errors
    ///
    /// - `LearnstackError::Busy` if another send is still in flight
    /// - the backend's `Send` error; both messages of the turn are removed
    pub async fn send_message(&self, text: &str) -> Result<()> {
        let text = text.trim();
        if text.is_empty() {
            tracing::debug!("[ConversationController] Ignoring blank message");
            return Ok(());
        }

        let user = Message::user(text);
        let placeholder = Message::assistant_placeholder();
        let user_id = user.id.clone();
        let placeholder_id = placeholder.id.clone();

        let mut history = Vec::new();
        let started = self.store.apply_if(
            |state| {
                history = flatten_history(&state.messages);
                !state.is_loading
            },
            StateTransition::TurnStarted { user, placeholder },
        );
        if !started {
            return Err(LearnstackError::Busy);
        }

        let store = &self.store;
        let mut accumulated = String::new();
        let mut on_chunk = |ch: char| {
            accumulated.push(ch);
            store.apply(StateTransition::ReplyUpdated {
                message_id: placeholder_id.clone(),
                text: display_text(&accumulated),
            });
        };

        let result = self
            .client
            .send_message_stream(text, &history, self.session.token(), &mut on_chunk)
            .await;

        match result {
            Ok(()) => {
                self.store.apply(StateTransition::TurnCompleted);
                // Already logged; the reply itself arrived.
                let _ = self.load_chats().await;
                Ok(())
            }
            Err(e) => {
                tracing::error!("[ConversationController] Failed to send message: {}", e);
                self.store.apply(StateTransition::TurnRolledBack {
                    user_id,
                    placeholder_id: placeholder_id.clone(),
                });
                Err(e)
            }
        }
    }

    /// Ends the session: clears the conversation and hands the session back
    /// for logout.
    pub fn close(self) -> UserSession {
        self.store.apply(StateTransition::Reset);
        self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use learnstack_core::chat::{AuthResponse, Chat, ChatResponse};
    use learnstack_core::user::{BearerToken, User};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    /// What the mock stream does when asked to send.
    enum StreamScript {
        Reply(&'static str),
        FailAfter(&'static str),
        WaitThenReply(Arc<Notify>, &'static str),
    }

    // Mock BackendClient for testing
    struct MockBackend {
        chats: Mutex<HashMap<String, Chat>>,
        list_calls: Mutex<usize>,
        sent_histories: Mutex<Vec<Vec<String>>>,
        script: Mutex<Option<StreamScript>>,
        delete_gate: Option<Arc<Notify>>,
        fail_deletes: bool,
        deleted: Mutex<Vec<String>>,
    }

    impl MockBackend {
        fn new() -> Self {
            Self {
                chats: Mutex::new(HashMap::new()),
                list_calls: Mutex::new(0),
                sent_histories: Mutex::new(Vec::new()),
                script: Mutex::new(None),
                delete_gate: None,
                fail_deletes: false,
                deleted: Mutex::new(Vec::new()),
            }
        }

        fn with_chat(self, id: &str, history: &[&str]) -> Self {
            self.chats.lock().unwrap().insert(
                id.to_string(),
                Chat {
                    id: id.to_string(),
                    history: history.iter().map(|s| s.to_string()).collect(),
                    last_message: history.first().map(|s| s.to_string()).unwrap_or_default(),
                    reply: String::new(),
                },
            );
            self
        }

        fn scripted(self, script: StreamScript) -> Self {
            *self.script.lock().unwrap() = Some(script);
            self
        }
    }

    #[async_trait]
    impl BackendClient for MockBackend {
        async fn authenticate(&self, _username: &str) -> Result<AuthResponse> {
            Ok(AuthResponse {
                access_token: "tok".to_string(),
            })
        }

        async fn list_chats(&self, _token: &BearerToken) -> Result<Vec<Chat>> {
            *self.list_calls.lock().unwrap() += 1;
            let mut chats: Vec<Chat> = self.chats.lock().unwrap().values().cloned().collect();
            chats.sort_by(|a, b| a.id.cmp(&b.id));
            Ok(chats)
        }

        async fn get_chat(&self, chat_id: &str, _token: &BearerToken) -> Result<Chat> {
            self.chats
                .lock()
                .unwrap()
                .get(chat_id)
                .cloned()
                .ok_or_else(|| LearnstackError::fetch(Some(404), "Failed to fetch chat"))
        }

        async fn delete_chat(&self, chat_id: &str, _token: &BearerToken) -> Result<()> {
            if let Some(gate) = &self.delete_gate {
                gate.notified().await;
            }
            self.deleted.lock().unwrap().push(chat_id.to_string());
            if self.fail_deletes {
                return Err(LearnstackError::fetch(Some(500), "Failed to delete chat"));
            }
            self.chats.lock().unwrap().remove(chat_id);
            Ok(())
        }

        async fn delete_all_chats(&self, _token: &BearerToken) -> Result<()> {
            self.deleted.lock().unwrap().push("*".to_string());
            self.chats.lock().unwrap().clear();
            Ok(())
        }

        async fn send_message(
            &self,
            _message: &str,
            _history: &[String],
            _token: &BearerToken,
        ) -> Result<ChatResponse> {
            unreachable!("the controller always streams")
        }

        async fn send_message_stream(
            &self,
            _message: &str,
            history: &[String],
            _token: &BearerToken,
            on_chunk: &mut (dyn FnMut(char) + Send),
        ) -> Result<()> {
            self.sent_histories.lock().unwrap().push(history.to_vec());
            let script = self.script.lock().unwrap().take();

            match script {
                Some(StreamScript::Reply(reply)) => {
                    reply.chars().for_each(|ch| on_chunk(ch));
                    Ok(())
                }
                Some(StreamScript::FailAfter(partial)) => {
                    partial.chars().for_each(|ch| on_chunk(ch));
                    Err(LearnstackError::send("Reply stream failed: connection reset"))
                }
                Some(StreamScript::WaitThenReply(gate, reply)) => {
                    gate.notified().await;
                    reply.chars().for_each(|ch| on_chunk(ch));
                    Ok(())
                }
                None => Err(LearnstackError::send("Failed to send message: HTTP 500")),
            }
        }
    }

    fn controller(backend: MockBackend) -> (ConversationController, Arc<MockBackend>) {
        let backend = Arc::new(backend);
        let session = UserSession::new(User::new("ada", BearerToken::new("tok")));
        let client: Arc<dyn BackendClient> = backend.clone();
        (ConversationController::new(client, session), backend)
    }

    fn texts(state: &ConversationState) -> Vec<(String, bool)> {
        state
            .messages
            .iter()
            .map(|m| (m.text.clone(), m.is_user))
            .collect()
    }

    #[tokio::test]
    async fn test_select_chat_projects_history() {
        let (controller, _) =
            controller(MockBackend::new().with_chat("c1", &["u1", "a1", "u2"]));

        controller.select_chat("c1").await.unwrap();

        let state = controller.snapshot();
        assert_eq!(state.current_chat_id.as_deref(), Some("c1"));
        assert_eq!(
            texts(&state),
            vec![
                ("u1".to_string(), true),
                ("a1".to_string(), false),
                ("u2".to_string(), true),
            ]
        );
    }

    #[tokio::test]
    async fn test_select_missing_chat_keeps_view() {
        let (controller, _) = controller(MockBackend::new().with_chat("c1", &["u1", "a1"]));
        controller.select_chat("c1").await.unwrap();

        let err = controller.select_chat("gone").await.unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(controller.snapshot().current_chat_id.as_deref(), Some("c1"));
        assert_eq!(controller.snapshot().messages.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_open_chat_is_immediate() {
        let gate = Arc::new(Notify::new());
        let mut backend = MockBackend::new()
            .with_chat("x", &["u1", "a1"])
            .with_chat("y", &["u2"]);
        backend.delete_gate = Some(gate.clone());
        let (controller, backend) = controller(backend);
        controller.load_chats().await.unwrap();
        controller.select_chat("x").await.unwrap();

        let handle = controller.delete_chat("x");

        // The backend call is still parked on the gate.
        let state = controller.snapshot();
        let ids: Vec<&str> = state.chats.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["y"]);
        assert!(state.current_chat_id.is_none());
        assert!(state.messages.is_empty());
        assert!(backend.deleted.lock().unwrap().is_empty());

        gate.notify_one();
        handle.await.unwrap();
        assert_eq!(*backend.deleted.lock().unwrap(), vec!["x"]);
    }

    #[tokio::test]
    async fn test_failed_delete_is_not_rolled_back() {
        let mut backend = MockBackend::new().with_chat("x", &["u1"]);
        backend.fail_deletes = true;
        let (controller, _) = controller(backend);
        controller.load_chats().await.unwrap();

        controller.delete_chat("x").await.unwrap();

        assert!(controller.snapshot().chats.is_empty());
    }

    #[tokio::test]
    async fn test_delete_all_chats() {
        let (controller, backend) = controller(
            MockBackend::new()
                .with_chat("x", &["u1"])
                .with_chat("y", &["u2"]),
        );
        controller.load_chats().await.unwrap();
        controller.select_chat("y").await.unwrap();

        controller.delete_all_chats().await.unwrap();

        let state = controller.snapshot();
        assert!(state.chats.is_empty());
        assert!(state.current_chat_id.is_none());
        assert_eq!(*backend.deleted.lock().unwrap(), vec!["*"]);
    }

    #[tokio::test]
    async fn test_send_streams_into_placeholder_and_refreshes() {
        let (controller, backend) = controller(
            MockBackend::new()
                .with_chat("c1", &["u1", "a1"])
                .scripted(StreamScript::Reply("Hi there")),
        );
        controller.select_chat("c1").await.unwrap();

        controller.send_message("  hello  ").await.unwrap();

        let state = controller.snapshot();
        assert!(!state.is_loading);
        assert_eq!(
            texts(&state),
            vec![
                ("u1".to_string(), true),
                ("a1".to_string(), false),
                ("hello".to_string(), true),
                ("Hi there".to_string(), false),
            ]
        );
        assert_eq!(
            *backend.sent_histories.lock().unwrap(),
            vec![vec!["u1".to_string(), "a1".to_string()]]
        );
        assert_eq!(*backend.list_calls.lock().unwrap(), 1);
        assert_eq!(state.chats.len(), 1);
    }

    #[tokio::test]
    async fn test_reply_envelope_is_unwrapped() {
        let (controller, _) = controller(
            MockBackend::new().scripted(StreamScript::Reply(r#"{"reply":"Hi","history":[]}"#)),
        );

        controller.send_message("hello").await.unwrap();

        let state = controller.snapshot();
        assert_eq!(state.messages.last().unwrap().text, "Hi");
    }

    #[tokio::test]
    async fn test_failed_send_rolls_back_turn() {
        let (controller, backend) = controller(
            MockBackend::new()
                .with_chat("c1", &["u1", "a1"])
                .scripted(StreamScript::FailAfter("Hel")),
        );
        controller.select_chat("c1").await.unwrap();
        let before = controller.snapshot();

        let err = controller.send_message("hello").await.unwrap_err();

        assert!(err.is_send());
        let after = controller.snapshot();
        assert_eq!(after.messages, before.messages);
        assert!(!after.is_loading);
        assert_eq!(*backend.list_calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_blank_message_is_not_sent() {
        let (controller, backend) = controller(MockBackend::new());

        controller.send_message("   ").await.unwrap();

        assert!(controller.snapshot().messages.is_empty());
        assert!(backend.sent_histories.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_send_while_sending_is_busy() {
        let gate = Arc::new(Notify::new());
        let (controller, _) = controller(
            MockBackend::new().scripted(StreamScript::WaitThenReply(gate.clone(), "done")),
        );
        let controller = Arc::new(controller);
        let mut updates = controller.subscribe();

        let first = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.send_message("first").await })
        };
        updates
            .wait_for(|state| state.is_loading)
            .await
            .unwrap();

        let err = controller.send_message("second").await.unwrap_err();
        assert!(err.is_busy());

        gate.notify_one();
        first.await.unwrap().unwrap();

        let state = controller.snapshot();
        assert_eq!(
            texts(&state),
            vec![("first".to_string(), true), ("done".to_string(), false)]
        );
    }

    #[tokio::test]
    async fn test_new_chat_and_close() {
        let (controller, _) = controller(MockBackend::new().with_chat("c1", &["u1", "a1"]));
        controller.select_chat("c1").await.unwrap();

        controller.new_chat();
        assert!(controller.snapshot().current_chat_id.is_none());
        assert!(controller.snapshot().messages.is_empty());

        controller.load_chats().await.unwrap();
        let mut updates = controller.subscribe();
        let session = controller.close();

        assert_eq!(session.username(), "ada");
        assert_eq!(*updates.borrow_and_update(), ConversationState::default());
    }
}
