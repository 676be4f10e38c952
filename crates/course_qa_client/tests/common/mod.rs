//! Shared test helpers: an in-process HTTP API, a scripted backend and a
//! view that records lock/unlock order.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use axum::Router;
use course_qa_client::render::{Placeholder, RenderedMessage};
use course_qa_client::{
    Backend, Citation, ClientError, CourseStats, Focus, ModalContent, Page, QueryRequest,
    QueryResponse, View,
};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;

/// Serve `router` on a free local port; returns the API base URL.
pub async fn spawn_api(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://127.0.0.1:{}/api", port)
}

/// A base URL nobody listens on.
pub fn dead_api() -> String {
    let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = l.local_addr().unwrap().port();
    drop(l);
    format!("http://127.0.0.1:{}/api", port)
}

pub fn citation(display: &str, course: &str, lesson: Option<i64>, link: Option<&str>) -> Citation {
    Citation {
        display_text: display.into(),
        course_title: course.into(),
        lesson_number: lesson,
        content_preview: format!("preview of {display}"),
        lesson_link: link.map(str::to_string),
    }
}

pub fn answer(session_id: &str, text: &str, sources: Vec<Citation>) -> QueryResponse {
    QueryResponse {
        session_id: session_id.into(),
        answer: text.into(),
        sources,
    }
}

pub type Log = Arc<Mutex<Vec<String>>>;

pub fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

/// Backend answering from a queue of canned replies. Every request is logged
/// as `request:<session id or null>:<query>`.
pub struct ScriptedBackend {
    pub log: Log,
    pub replies: Mutex<VecDeque<Result<QueryResponse, ClientError>>>,
    pub stats: Mutex<Option<Result<CourseStats, ClientError>>>,
    pub requests: Mutex<Vec<QueryRequest>>,
}

impl ScriptedBackend {
    pub fn new(log: Log) -> Self {
        Self {
            log,
            replies: Mutex::new(VecDeque::new()),
            stats: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn reply(self, reply: Result<QueryResponse, ClientError>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn requests(&self) -> Vec<QueryRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Backend for ScriptedBackend {
    fn query<'a>(
        &'a self,
        request: &'a QueryRequest,
    ) -> BoxFuture<'a, Result<QueryResponse, ClientError>> {
        async move {
            self.log.lock().unwrap().push(format!(
                "request:{}:{}",
                request.session_id.as_deref().unwrap_or("null"),
                request.query
            ));
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted reply left")
        }
        .boxed()
    }

    fn course_stats(&self) -> BoxFuture<'_, Result<CourseStats, ClientError>> {
        async move {
            self.stats
                .lock()
                .unwrap()
                .take()
                .expect("no scripted stats")
        }
        .boxed()
    }
}

/// Backend whose query panics mid-flight.
pub struct PanickingBackend;

async fn explode<T: Send>() -> Result<T, ClientError> {
    panic!("backend exploded")
}

impl Backend for PanickingBackend {
    fn query<'a>(
        &'a self,
        _request: &'a QueryRequest,
    ) -> BoxFuture<'a, Result<QueryResponse, ClientError>> {
        explode().boxed()
    }

    fn course_stats(&self) -> BoxFuture<'_, Result<CourseStats, ClientError>> {
        explode().boxed()
    }
}

/// [`Page`] that also logs input enable/disable and placeholder changes.
pub struct RecordingView {
    pub page: Page,
    pub log: Log,
}

impl RecordingView {
    pub fn new(log: Log) -> Self {
        Self {
            page: Page::new(),
            log,
        }
    }

    fn record(&self, entry: impl Into<String>) {
        self.log.lock().unwrap().push(entry.into());
    }
}

impl View for RecordingView {
    fn clear_transcript(&mut self) {
        self.page.clear_transcript();
    }

    fn append_message(&mut self, message: &RenderedMessage) {
        self.record(format!("message:{}", message.message.role.as_str()));
        self.page.append_message(message);
    }

    fn append_placeholder(&mut self, placeholder: &Placeholder) {
        self.record("loading:add");
        self.page.append_placeholder(placeholder);
    }

    fn remove_placeholder(&mut self, placeholder: &Placeholder) {
        self.record("loading:remove");
        self.page.remove_placeholder(placeholder);
    }

    fn scroll_to_latest(&mut self) {
        self.page.scroll_to_latest();
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.record(if enabled { "input:enable" } else { "input:disable" });
        self.page.set_input_enabled(enabled);
    }

    fn input_value(&self) -> String {
        self.page.input_value()
    }

    fn set_input_value(&mut self, value: &str) {
        self.page.set_input_value(value);
    }

    fn focus(&mut self, target: Focus) {
        self.record(format!("focus:{:?}", target));
        self.page.focus(target);
    }

    fn show_modal(&mut self, content: &ModalContent) {
        self.record("modal:show");
        self.page.show_modal(content);
    }

    fn hide_modal(&mut self) {
        self.record("modal:hide");
        self.page.hide_modal();
    }

    fn set_course_count(&mut self, text: &str) {
        self.page.set_course_count(text);
    }

    fn set_course_titles(&mut self, html: &str) {
        self.page.set_course_titles(html);
    }
}
