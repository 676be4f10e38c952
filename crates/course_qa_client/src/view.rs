//! Display surface the controller drives, and a headless implementation of it.
//!
//! [`View`] is the set of element bindings the controller needs: transcript,
//! entry field + send trigger, source modal, stats regions. [`Page`] keeps all
//! of that in memory; the terminal front end and the tests both use it.

use crate::render::{Placeholder, RenderedMessage};

/// Element that holds keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Focus {
    Input,
    ModalClose,
}

/// Field values of the source modal for one citation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalContent {
    pub title: String,
    pub course: String,
    /// `None` hides the lesson field.
    pub lesson: Option<String>,
    /// Literal text, not markdown.
    pub preview: String,
    /// `None` hides the "view original" link.
    pub link: Option<String>,
}

pub trait View {
    fn clear_transcript(&mut self);
    fn append_message(&mut self, message: &RenderedMessage);
    fn append_placeholder(&mut self, placeholder: &Placeholder);
    fn remove_placeholder(&mut self, placeholder: &Placeholder);
    fn scroll_to_latest(&mut self);

    /// Enables or disables both the entry field and the send trigger.
    fn set_input_enabled(&mut self, enabled: bool);
    fn input_value(&self) -> String;
    fn set_input_value(&mut self, value: &str);
    fn focus(&mut self, target: Focus);

    fn show_modal(&mut self, content: &ModalContent);
    fn hide_modal(&mut self);

    fn set_course_count(&mut self, text: &str);
    fn set_course_titles(&mut self, html: &str);
}

/// One element in the transcript region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Message(RenderedMessage),
    Loading(Placeholder),
}

impl Entry {
    pub fn element_id(&self) -> &str {
        match self {
            Entry::Message(m) => &m.element_id,
            Entry::Loading(p) => &p.element_id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalView {
    pub visible: bool,
    pub title: String,
    pub course: String,
    pub lesson_visible: bool,
    pub lesson: String,
    pub preview: String,
    pub link_visible: bool,
    pub link_href: String,
}

/// In-memory page state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub transcript: Vec<Entry>,
    /// Element id the transcript is scrolled to.
    pub scrolled_to: Option<String>,
    pub input_value: String,
    pub input_enabled: bool,
    pub send_enabled: bool,
    pub focus: Option<Focus>,
    pub modal: ModalView,
    pub course_count: String,
    pub course_titles: String,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            transcript: Vec::new(),
            scrolled_to: None,
            input_value: String::new(),
            input_enabled: true,
            send_enabled: true,
            focus: None,
            modal: ModalView::default(),
            course_count: String::new(),
            course_titles: String::new(),
        }
    }
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> impl Iterator<Item = &RenderedMessage> {
        self.transcript.iter().filter_map(|e| match e {
            Entry::Message(m) => Some(m),
            Entry::Loading(_) => None,
        })
    }

    pub fn last_message(&self) -> Option<&RenderedMessage> {
        self.messages().last()
    }

    pub fn loading_count(&self) -> usize {
        self.transcript
            .iter()
            .filter(|e| matches!(e, Entry::Loading(_)))
            .count()
    }
}

impl View for Page {
    fn clear_transcript(&mut self) {
        self.transcript.clear();
        self.scrolled_to = None;
    }

    fn append_message(&mut self, message: &RenderedMessage) {
        self.transcript.push(Entry::Message(message.clone()));
    }

    fn append_placeholder(&mut self, placeholder: &Placeholder) {
        self.transcript.push(Entry::Loading(placeholder.clone()));
    }

    fn remove_placeholder(&mut self, placeholder: &Placeholder) {
        self.transcript
            .retain(|e| e.element_id() != placeholder.element_id);
    }

    fn scroll_to_latest(&mut self) {
        self.scrolled_to = self.transcript.last().map(|e| e.element_id().to_string());
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
        self.send_enabled = enabled;
    }

    fn input_value(&self) -> String {
        self.input_value.clone()
    }

    fn set_input_value(&mut self, value: &str) {
        self.input_value = value.to_string();
    }

    fn focus(&mut self, target: Focus) {
        self.focus = Some(target);
    }

    fn show_modal(&mut self, content: &ModalContent) {
        self.modal = ModalView {
            visible: true,
            title: content.title.clone(),
            course: content.course.clone(),
            lesson_visible: content.lesson.is_some(),
            lesson: content.lesson.clone().unwrap_or_default(),
            preview: content.preview.clone(),
            link_visible: content.link.is_some(),
            link_href: content.link.clone().unwrap_or_default(),
        };
    }

    fn hide_modal(&mut self) {
        self.modal.visible = false;
    }

    fn set_course_count(&mut self, text: &str) {
        self.course_count = text.to_string();
    }

    fn set_course_titles(&mut self, html: &str) {
        self.course_titles = html.to_string();
    }
}
