//! Session controller: conversation lifecycle, query exchange, input latch.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;

use crate::client::{Backend, ClientError};
use crate::messages::{Citation, CourseStats, QueryRequest, QueryResponse};
use crate::modal::CitationModal;
use crate::render::{MessageRenderer, Placeholder};
use crate::sources::{SourceLookupError, SourceRegistry};
use crate::stats;
use crate::transcript::{Message, MessageId, MessageKind, Role};
use crate::view::{Focus, View};

/// Owns the server-issued session id, the message list, the Source Registry
/// and the source modal, and drives a [`View`] against a [`Backend`].
pub struct SessionController<B, V> {
    backend: Arc<B>,
    view: V,
    session_id: Option<String>,
    welcome_message: String,
    renderer: MessageRenderer,
    messages: Vec<Message>,
    sources: SourceRegistry,
    modal: CitationModal,
    input_locked: bool,
    conversation: u64,
}

/// A query whose user message and placeholder are on screen and whose reply
/// has not been applied yet. Holding one means the input latch is taken.
#[derive(Debug)]
pub struct PendingQuery {
    request: QueryRequest,
    placeholder: Placeholder,
    conversation: u64,
}

impl PendingQuery {
    pub fn request(&self) -> &QueryRequest {
        &self.request
    }
}

impl<B: Backend, V: View> SessionController<B, V> {
    /// A controller with no conversation yet; call
    /// [`start_new_session`](Self::start_new_session) before use.
    pub fn new(backend: B, view: V, welcome_message: impl Into<String>) -> Self {
        Self {
            backend: Arc::new(backend),
            view,
            session_id: None,
            welcome_message: welcome_message.into(),
            renderer: MessageRenderer::new(),
            messages: Vec::new(),
            sources: SourceRegistry::new(),
            modal: CitationModal::new(),
            input_locked: false,
            conversation: 0,
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn sources(&self) -> &SourceRegistry {
        &self.sources
    }

    pub fn modal(&self) -> &CitationModal {
        &self.modal
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// A handle on the backend that outlives a borrow of the controller, for
    /// awaiting a [`PendingQuery`] while other events are dispatched.
    pub fn shared_backend(&self) -> Arc<B> {
        Arc::clone(&self.backend)
    }

    /// True while a query is in flight.
    pub fn is_input_locked(&self) -> bool {
        self.input_locked
    }

    /// Forget the session id, wipe the transcript and registry, and greet.
    pub fn start_new_session(&mut self) {
        tracing::debug!(previous = ?self.session_id, "starting new session");
        self.session_id = None;
        self.conversation += 1;
        self.messages.clear();
        self.sources.clear();
        self.modal.reset(&mut self.view);
        self.view.clear_transcript();
        let welcome = self.welcome_message.clone();
        self.add_message(&welcome, Role::Assistant, MessageKind::Welcome, None);
    }

    /// Render a message, register its citations and append it to the transcript.
    pub fn add_message(
        &mut self,
        content: &str,
        role: Role,
        kind: MessageKind,
        citations: Option<Vec<Citation>>,
    ) -> MessageId {
        let rendered = self.renderer.render(content, role, kind, citations);
        let id = rendered.message.id;
        if let Some(citations) = &rendered.message.citations {
            self.sources.insert(id, citations.clone());
        }
        self.view.append_message(&rendered);
        self.view.scroll_to_latest();
        self.messages.push(rendered.message);
        id
    }

    /// Send `text` as a query and wait for the exchange to settle.
    ///
    /// Blank text, or a call while another query is in flight, does nothing.
    /// Otherwise exactly one user message and then exactly one assistant
    /// message (answer or error) are appended, and the input controls are
    /// released afterwards no matter how the exchange ended.
    pub async fn send_query(&mut self, text: &str) {
        if let Some(pending) = self.begin_query(text) {
            self.run_query(pending).await;
        }
    }

    /// First half of a send: take the input latch, echo the user message and
    /// show the loading placeholder. `None` when `text` is blank or a query is
    /// already in flight.
    ///
    /// The request is not issued here. Await it against
    /// [`shared_backend`](Self::shared_backend) and hand the result to
    /// [`complete_query`](Self::complete_query), or call
    /// [`run_query`](Self::run_query) to do both.
    pub fn begin_query(&mut self, text: &str) -> Option<PendingQuery> {
        if self.input_locked {
            tracing::debug!("query ignored, another one is in flight");
            return None;
        }
        let query = text.trim();
        if query.is_empty() {
            return None;
        }
        let query = query.to_string();

        self.lock_input();
        self.add_message(&query, Role::User, MessageKind::Normal, None);
        let placeholder = self.renderer.loading_placeholder();
        self.view.append_placeholder(&placeholder);
        self.view.scroll_to_latest();

        Some(PendingQuery {
            request: QueryRequest::new(query, self.session_id.clone()),
            placeholder,
            conversation: self.conversation,
        })
    }

    /// Issue the request for `pending` and settle it. A panic in the backend
    /// still removes the placeholder and releases the input before it resumes.
    pub async fn run_query(&mut self, pending: PendingQuery) {
        let backend = Arc::clone(&self.backend);
        let settled = AssertUnwindSafe(backend.query(&pending.request))
            .catch_unwind()
            .await;
        match settled {
            Ok(result) => self.complete_query(pending, result),
            Err(panic) => {
                self.view.remove_placeholder(&pending.placeholder);
                self.release_input();
                std::panic::resume_unwind(panic);
            }
        }
    }

    /// Second half of a send: replace the placeholder with the answer or an
    /// error message, then release the input.
    ///
    /// A reply to a conversation that has since been reset is dropped.
    pub fn complete_query(
        &mut self,
        pending: PendingQuery,
        result: Result<QueryResponse, ClientError>,
    ) {
        self.view.remove_placeholder(&pending.placeholder);

        if pending.conversation != self.conversation {
            tracing::debug!("reply for a previous conversation dropped");
        } else {
            match result {
                Ok(response) => {
                    if self.session_id.is_none() && !response.session_id.is_empty() {
                        tracing::info!(session_id = %response.session_id, "session established");
                        self.session_id = Some(response.session_id);
                    }
                    self.add_message(
                        &response.answer,
                        Role::Assistant,
                        MessageKind::Normal,
                        Some(response.sources),
                    );
                }
                Err(e) => {
                    tracing::warn!("query failed: {e}");
                    self.add_message(
                        &format!("Error: {e}"),
                        Role::Assistant,
                        MessageKind::Error,
                        None,
                    );
                }
            }
        }
        self.release_input();
    }

    fn lock_input(&mut self) {
        self.input_locked = true;
        self.view.set_input_value("");
        self.view.set_input_enabled(false);
    }

    fn release_input(&mut self) {
        self.input_locked = false;
        self.view.set_input_enabled(true);
        self.view.focus(Focus::Input);
    }

    /// Open the source modal on citation `index` of `message_id`.
    pub fn on_chip_activated(
        &mut self,
        message_id: MessageId,
        index: usize,
    ) -> Result<(), SourceLookupError> {
        let citation = self.sources.get(message_id, index)?.clone();
        self.modal.open(citation, &mut self.view);
        Ok(())
    }

    /// Close the source modal; `false` if it was not open.
    pub fn close_modal(&mut self) -> bool {
        self.modal.close(&mut self.view)
    }

    pub async fn load_course_stats(&mut self) -> Option<CourseStats> {
        stats::load_course_stats(&*self.backend, &mut self.view).await
    }
}
