//! Message markup: body, collapsible "Sources" section, loading placeholder.

use std::fmt::Write as _;

use crate::markdown::render_markdown;
use crate::messages::Citation;
use crate::sanitize::escape_html;
use crate::transcript::{Message, MessageId, MessageIdGenerator, MessageKind, Role};

/// A message together with the markup that displays it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub message: Message,
    /// `message-<id>`
    pub element_id: String,
    /// CSS classes of the message container.
    pub class: String,
    /// Inner markup of the message container.
    pub html: String,
}

/// Transient "typing" indicator shown while a query is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub element_id: String,
    pub html: String,
}

const LOADING_HTML: &str = concat!(
    "<div class=\"message-content\">",
    "<div class=\"loading\"><span></span><span></span><span></span></div>",
    "</div>"
);

#[derive(Debug, Default)]
pub struct MessageRenderer {
    ids: MessageIdGenerator,
    placeholders: u64,
}

impl MessageRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign an id to a new message and build its markup.
    pub fn render(
        &mut self,
        content: &str,
        role: Role,
        kind: MessageKind,
        citations: Option<Vec<Citation>>,
    ) -> RenderedMessage {
        let id = self.ids.next_id();
        let message = Message {
            id,
            role,
            kind,
            content: content.to_string(),
            citations,
        };

        let body = match (role, kind) {
            (_, MessageKind::Error) | (Role::User, _) => escape_html(content),
            (Role::Assistant, _) => render_markdown(content),
        };
        let mut html = format!("<div class=\"message-content\">{body}</div>");
        if !message.citations().is_empty() {
            html.push_str(&sources_section(id, message.citations()));
        }

        let mut class = format!("message {}", role.as_str());
        match kind {
            MessageKind::Welcome => class.push_str(" welcome-message"),
            MessageKind::Error => class.push_str(" error"),
            MessageKind::Normal => {}
        }

        RenderedMessage {
            element_id: format!("message-{id}"),
            message,
            class,
            html,
        }
    }

    /// Build a fresh loading placeholder. It has no message id and is never
    /// registered anywhere; the caller removes it once the request settles.
    pub fn loading_placeholder(&mut self) -> Placeholder {
        self.placeholders += 1;
        Placeholder {
            element_id: format!("loading-{}", self.placeholders),
            html: LOADING_HTML.to_string(),
        }
    }
}

fn sources_section(id: MessageId, citations: &[Citation]) -> String {
    let mut chips = String::new();
    for (index, citation) in citations.iter().enumerate() {
        let _ = write!(
            chips,
            "<span class=\"source-link\" data-source-index=\"{index}\" data-message-id=\"{id}\">{}</span>",
            escape_html(&citation.display_text)
        );
    }
    format!(
        "<details class=\"sources-collapsible\"><summary class=\"sources-header\">Sources</summary><div class=\"sources-content\">{chips}</div></details>"
    )
}
