//! Source modal: Closed → Open → Closed, holding at most one citation.

use crate::messages::Citation;
use crate::view::{Focus, ModalContent, View};

pub const MODAL_TITLE: &str = "Source Details";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ModalState {
    #[default]
    Closed,
    Open(Citation),
}

#[derive(Debug, Default)]
pub struct CitationModal {
    state: ModalState,
}

impl CitationModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ModalState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, ModalState::Open(_))
    }

    pub fn selection(&self) -> Option<&Citation> {
        match &self.state {
            ModalState::Open(c) => Some(c),
            ModalState::Closed => None,
        }
    }

    /// Show `citation`, replacing whatever was selected before, and move
    /// focus to the close control.
    pub fn open<V: View + ?Sized>(&mut self, citation: Citation, view: &mut V) {
        view.show_modal(&modal_content(&citation));
        view.focus(Focus::ModalClose);
        self.state = ModalState::Open(citation);
    }

    /// Hide the modal and drop the selection. Returns `false` and leaves the
    /// view untouched when already closed.
    pub fn close<V: View + ?Sized>(&mut self, view: &mut V) -> bool {
        if !self.is_open() {
            return false;
        }
        self.state = ModalState::Closed;
        view.hide_modal();
        view.focus(Focus::Input);
        true
    }

    /// Drop the selection without touching focus; used on conversation reset.
    pub(crate) fn reset<V: View + ?Sized>(&mut self, view: &mut V) {
        if self.is_open() {
            self.state = ModalState::Closed;
            view.hide_modal();
        }
    }
}

/// Field values for `citation`. A missing lesson number or an empty/missing
/// link hides the corresponding field.
pub fn modal_content(citation: &Citation) -> ModalContent {
    ModalContent {
        title: MODAL_TITLE.to_string(),
        course: citation.course_title.clone(),
        lesson: citation.lesson_number.map(|n| format!("Lesson {n}")),
        preview: citation.content_preview.clone(),
        link: citation.link().map(str::to_string),
    }
}
