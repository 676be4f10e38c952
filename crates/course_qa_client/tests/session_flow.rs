//! Session controller: send protocol, input latch, session id adoption,
//! conversation reset. Uses a scripted backend and a recording view.

mod common;

use std::panic::AssertUnwindSafe;

use common::{
    answer, citation, new_log, PanickingBackend, RecordingView, ScriptedBackend,
};
use course_qa_client::view::Entry;
use course_qa_client::{
    Backend, ClientError, Focus, MessageKind, Page, Role, SessionController, View,
};
use futures_util::FutureExt;

const WELCOME: &str = "Welcome!";

fn status_error() -> ClientError {
    ClientError::Status {
        endpoint: "query",
        status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[tokio::test]
async fn new_session_leaves_only_the_welcome_message() {
    let log = new_log();
    let backend = ScriptedBackend::new(log.clone()).reply(Ok(answer("s1", "hi", vec![])));
    let mut c = SessionController::new(backend, Page::new(), WELCOME);
    c.start_new_session();
    c.send_query("hello").await;
    assert_eq!(c.session_id(), Some("s1"));
    assert_eq!(c.messages().len(), 3);

    c.start_new_session();

    assert_eq!(c.session_id(), None);
    assert_eq!(c.messages().len(), 1);
    assert_eq!(c.view().transcript.len(), 1);
    let welcome = c.view().last_message().unwrap();
    assert_eq!(welcome.message.content, WELCOME);
    assert_eq!(welcome.message.role, Role::Assistant);
    assert_eq!(welcome.message.kind, MessageKind::Welcome);
    assert!(welcome.class.contains("welcome-message"));
    assert!(welcome.message.citations.is_none());
    // No network call for a reset.
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn blank_query_is_ignored() {
    let log = new_log();
    let backend = ScriptedBackend::new(log.clone());
    let mut c = SessionController::new(backend, RecordingView::new(log.clone()), WELCOME);
    c.start_new_session();
    log.lock().unwrap().clear();

    c.send_query("").await;
    c.send_query("   \n\t").await;

    assert!(log.lock().unwrap().is_empty());
    assert_eq!(c.messages().len(), 1);
    assert!(c.view().page.input_enabled);
}

#[tokio::test]
async fn input_is_locked_for_the_whole_exchange() {
    let log = new_log();
    let backend = ScriptedBackend::new(log.clone()).reply(Ok(answer("s1", "answer", vec![])));
    let mut c = SessionController::new(backend, RecordingView::new(log.clone()), WELCOME);
    c.start_new_session();
    log.lock().unwrap().clear();

    c.send_query("  question  ").await;

    let log = log.lock().unwrap().clone();
    assert_eq!(
        log,
        vec![
            "input:disable",
            "message:user",
            "loading:add",
            "request:null:question",
            "loading:remove",
            "message:assistant",
            "input:enable",
            "focus:Input",
        ]
    );
    assert!(!c.is_input_locked());
    assert_eq!(c.view().page.focus, Some(Focus::Input));
}

#[tokio::test]
async fn failure_appends_one_error_message_and_unlocks() {
    let log = new_log();
    let backend = ScriptedBackend::new(log.clone()).reply(Err(status_error()));
    let mut c = SessionController::new(backend, RecordingView::new(log.clone()), WELCOME);
    c.start_new_session();
    log.lock().unwrap().clear();

    c.send_query("question").await;

    let entries = log.lock().unwrap().clone();
    assert_eq!(entries.iter().filter(|e| *e == "input:enable").count(), 1);
    assert_eq!(entries.last().map(String::as_str), Some("focus:Input"));

    let page = &c.view().page;
    assert_eq!(page.loading_count(), 0);
    assert!(page.input_enabled && page.send_enabled);
    let roles: Vec<_> = page.messages().map(|m| m.message.role).collect();
    assert_eq!(roles, vec![Role::Assistant, Role::User, Role::Assistant]);

    let error = page.last_message().unwrap();
    assert_eq!(error.message.kind, MessageKind::Error);
    assert!(error.message.content.starts_with("Error: "));
    assert!(error.message.content.contains("500"));
    assert!(error.class.contains("error"));
    // A failed exchange does not establish a session.
    assert_eq!(c.session_id(), None);
}

#[test]
fn error_text_is_not_rendered_as_markdown() {
    let backend = ScriptedBackend::new(new_log());
    let mut c = SessionController::new(backend, Page::new(), WELCOME);

    c.add_message(
        "Error: **bold** <b>x</b>",
        Role::Assistant,
        MessageKind::Error,
        None,
    );

    let html = &c.view().last_message().unwrap().html;
    assert!(!html.contains("<strong>"));
    assert!(!html.contains("<b>"));
    assert!(html.contains("**bold** &lt;b&gt;x&lt;/b&gt;"));
}

#[tokio::test]
async fn session_id_is_adopted_once_and_reused() {
    let log = new_log();
    let backend = ScriptedBackend::new(log.clone())
        .reply(Ok(answer("abc", "Lesson 2 covers...", vec![citation(
            "Course X - Lesson 2",
            "Course X",
            Some(2),
            Some("https://example.com/x/2"),
        )])))
        .reply(Ok(answer("other", "second", vec![])));
    let mut c = SessionController::new(backend, Page::new(), WELCOME);
    c.start_new_session();

    c.send_query("What is lesson 2 about?").await;
    assert_eq!(c.session_id(), Some("abc"));

    let page = c.view();
    let messages: Vec<_> = page.messages().collect();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].message.role, Role::User);
    assert_eq!(messages[1].message.content, "What is lesson 2 about?");
    assert_eq!(messages[2].message.role, Role::Assistant);
    assert_eq!(messages[2].message.citations().len(), 1);
    assert_eq!(messages[2].html.matches("class=\"source-link\"").count(), 1);

    c.send_query("And lesson 3?").await;
    assert_eq!(c.session_id(), Some("abc"));

    let requests = c.backend().requests();
    assert_eq!(requests[0].session_id, None);
    assert_eq!(requests[1].session_id.as_deref(), Some("abc"));
}

#[tokio::test]
async fn placeholder_is_transient_and_never_registered() {
    let log = new_log();
    let backend = ScriptedBackend::new(log.clone()).reply(Ok(answer(
        "s",
        "a",
        vec![citation("c", "Course", None, None)],
    )));
    let mut c = SessionController::new(backend, Page::new(), WELCOME);
    c.start_new_session();

    c.send_query("q").await;

    assert_eq!(c.view().loading_count(), 0);
    assert!(c
        .view()
        .transcript
        .iter()
        .all(|e| matches!(e, Entry::Message(_))));
    assert_eq!(c.sources().len(), 1);
    assert_eq!(c.messages().len(), c.view().transcript.len());
}

#[tokio::test]
async fn transcript_scrolls_to_newest_message() {
    let log = new_log();
    let backend = ScriptedBackend::new(log.clone()).reply(Ok(answer("s", "a", vec![])));
    let mut c = SessionController::new(backend, Page::new(), WELCOME);
    c.start_new_session();

    c.send_query("q").await;

    let last = c.view().transcript.last().unwrap().element_id().to_string();
    assert_eq!(c.view().scrolled_to.as_deref(), Some(last.as_str()));
}

#[tokio::test]
async fn message_ids_strictly_increase() {
    let log = new_log();
    let backend = ScriptedBackend::new(log.clone())
        .reply(Ok(answer("s", "a", vec![])))
        .reply(Ok(answer("s", "b", vec![])));
    let mut c = SessionController::new(backend, Page::new(), WELCOME);
    c.start_new_session();
    c.send_query("one").await;
    c.send_query("two").await;

    let ids: Vec<_> = c.messages().iter().map(|m| m.id).collect();
    assert_eq!(ids.len(), 5);
    assert!(ids.windows(2).all(|w| w[0] < w[1]), "ids: {:?}", ids);
    for m in c.view().messages() {
        assert_eq!(m.element_id, format!("message-{}", m.message.id));
    }
}

#[tokio::test]
async fn user_text_is_escaped_and_answers_are_markdown() {
    let log = new_log();
    let backend = ScriptedBackend::new(log.clone()).reply(Ok(answer("s", "**bold**", vec![])));
    let mut c = SessionController::new(backend, Page::new(), WELCOME);
    c.start_new_session();

    c.send_query("<script>alert(1)</script>").await;

    let messages: Vec<_> = c.view().messages().collect();
    assert!(messages[1].html.contains("&lt;script&gt;"));
    assert!(!messages[1].html.contains("<script>"));
    assert!(messages[2].html.contains("<strong>bold</strong>"));
}

#[tokio::test]
async fn input_is_released_when_the_exchange_panics() {
    let mut c = SessionController::new(PanickingBackend, Page::new(), WELCOME);
    c.start_new_session();
    c.view_mut().set_input_value("boom");

    let result = AssertUnwindSafe(c.send_query("boom")).catch_unwind().await;

    assert!(result.is_err());
    assert!(!c.is_input_locked());
    assert!(c.view().input_enabled);
    assert!(c.view().send_enabled);
    assert_eq!(c.view().focus, Some(Focus::Input));
    assert_eq!(c.view().loading_count(), 0);
}

#[tokio::test]
async fn second_query_while_one_is_pending_is_not_queued() {
    let log = new_log();
    let backend = ScriptedBackend::new(log.clone()).reply(Ok(answer("abc", "one", vec![])));
    let mut c = SessionController::new(backend, RecordingView::new(log.clone()), WELCOME);
    c.start_new_session();
    log.lock().unwrap().clear();

    let pending = c.begin_query("first").expect("query started");
    assert_eq!(pending.request().query, "first");
    assert_eq!(pending.request().session_id, None);
    assert!(c.begin_query("second").is_none());
    c.send_query("third").await;

    let reply = c.backend().query(pending.request()).await;
    c.complete_query(pending, reply);

    let entries = log.lock().unwrap().clone();
    assert_eq!(
        entries,
        vec![
            "input:disable",
            "message:user",
            "loading:add",
            "request:null:first",
            "loading:remove",
            "message:assistant",
            "input:enable",
            "focus:Input",
        ]
    );
    assert_eq!(c.session_id(), Some("abc"));
    assert_eq!(c.messages().len(), 3);
    assert!(!c.is_input_locked());
}
