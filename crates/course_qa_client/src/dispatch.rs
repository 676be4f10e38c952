//! UI events and the single table routing them to the session controller.

use crate::client::{Backend, ClientError};
use crate::config::Config;
use crate::messages::{CourseStats, QueryResponse};
use crate::session::{PendingQuery, SessionController};
use crate::sources::SourceLookupError;
use crate::transcript::MessageId;
use crate::view::View;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    Other(String),
}

/// Where a click on the modal overlay landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalClickTarget {
    /// The dimmed area around the content panel.
    Backdrop,
    Panel,
}

/// One user interaction, identified by its source element and kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    SendClicked,
    InputKeyPress(Key),
    /// A suggested-question shortcut carrying its question text.
    SuggestedQuestionClicked(String),
    NewChatClicked,
    SourceChipClicked { message_id: MessageId, index: usize },
    ModalCloseClicked,
    ModalCancelClicked,
    ModalClicked(ModalClickTarget),
    DocumentKeyDown(Key),
}

/// The page controller: a [`SessionController`] plus the suggested question
/// shortcuts, constructed once at startup.
pub struct App<B, V> {
    controller: SessionController<B, V>,
    suggested_questions: Vec<String>,
}

impl<B: Backend, V: View> App<B, V> {
    pub fn new(controller: SessionController<B, V>, suggested_questions: Vec<String>) -> Self {
        Self {
            controller,
            suggested_questions,
        }
    }

    pub fn from_config(backend: B, view: V, config: &Config) -> Self {
        let controller = SessionController::new(backend, view, config.welcome_message());
        Self::new(controller, config.suggested_questions())
    }

    pub fn controller(&self) -> &SessionController<B, V> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut SessionController<B, V> {
        &mut self.controller
    }

    pub fn suggested_questions(&self) -> &[String] {
        &self.suggested_questions
    }

    /// Page load: fresh conversation, then the one-shot stats fetch.
    pub async fn startup(&mut self) -> Option<CourseStats> {
        self.controller.start_new_session();
        self.controller.load_course_stats().await
    }

    /// Route `event` to its controller method and wait for any query it
    /// starts to settle.
    ///
    /// The only error is a source chip that does not resolve in the Source
    /// Registry, which means a chip was rendered without its entry.
    pub async fn dispatch(&mut self, event: UiEvent) -> Result<(), SourceLookupError> {
        if let Some(pending) = self.handle(event)? {
            self.controller.run_query(pending).await;
        }
        Ok(())
    }

    /// Route `event` without waiting on the network.
    ///
    /// A send event that starts a query returns its [`PendingQuery`]; the
    /// caller awaits the request and passes the reply to
    /// [`complete`](Self::complete). Events keep flowing in the meantime, and
    /// sends among them are dropped by the input latch.
    pub fn handle(&mut self, event: UiEvent) -> Result<Option<PendingQuery>, SourceLookupError> {
        tracing::trace!(?event, "dispatch");
        let pending = match event {
            UiEvent::SendClicked | UiEvent::InputKeyPress(Key::Enter) => self.submit_input(),
            UiEvent::SuggestedQuestionClicked(question) => {
                if self.controller.is_input_locked() {
                    tracing::debug!("suggested question ignored, a query is in flight");
                    return Ok(None);
                }
                self.controller.view_mut().set_input_value(&question);
                self.submit_input()
            }
            UiEvent::NewChatClicked => {
                self.controller.start_new_session();
                None
            }
            UiEvent::SourceChipClicked { message_id, index } => {
                if let Err(e) = self.controller.on_chip_activated(message_id, index) {
                    tracing::error!("source chip without registry entry: {e}");
                    return Err(e);
                }
                None
            }
            UiEvent::ModalCloseClicked
            | UiEvent::ModalCancelClicked
            | UiEvent::ModalClicked(ModalClickTarget::Backdrop)
            | UiEvent::DocumentKeyDown(Key::Escape) => {
                self.controller.close_modal();
                None
            }
            UiEvent::ModalClicked(ModalClickTarget::Panel)
            | UiEvent::InputKeyPress(_)
            | UiEvent::DocumentKeyDown(_) => None,
        };
        Ok(pending)
    }

    /// Apply the reply to a query started by [`handle`](Self::handle).
    pub fn complete(&mut self, pending: PendingQuery, result: Result<QueryResponse, ClientError>) {
        self.controller.complete_query(pending, result);
    }

    fn submit_input(&mut self) -> Option<PendingQuery> {
        let text = self.controller.view().input_value();
        self.controller.begin_query(&text)
    }
}
