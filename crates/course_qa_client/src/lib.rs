//! Course materials Q&A chat client.
//!
//! The session controller, message renderer, Source Registry and source modal
//! run against a [`View`] (the page's element bindings) and a [`Backend`] (the
//! HTTP API). [`Page`] is the in-memory view used by the `course-qa` terminal
//! front end and by the tests.

pub mod client;
pub mod config;
pub mod dispatch;
pub mod logging;
pub mod markdown;
pub mod messages;
pub mod modal;
pub mod render;
pub mod sanitize;
pub mod session;
pub mod sources;
pub mod stats;
pub mod transcript;
pub mod view;

pub use client::{Backend, ClientError, HttpClient, DEFAULT_API_URL};
pub use config::{default_config_path, ApiSection, ChatSection, Config, ConfigError};
pub use dispatch::{App, Key, ModalClickTarget, UiEvent};
pub use messages::{Citation, CourseStats, QueryRequest, QueryResponse};
pub use modal::{CitationModal, ModalState};
pub use session::{PendingQuery, SessionController};
pub use sources::{SourceLookupError, SourceRegistry};
pub use transcript::{Message, MessageId, MessageKind, Role};
pub use view::{Entry, Focus, ModalContent, Page, View};
