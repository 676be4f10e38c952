//! course-qa: terminal front end for the course materials assistant.
//!
//! With a QUESTION argument it asks once, prints the answer and its sources,
//! and exits. Otherwise it reads lines from stdin: plain lines are sent as
//! queries, `/help` lists the commands. Commands keep working while an
//! answer is pending; questions typed meanwhile are dropped.

use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;
use course_qa_client::config::{self, Config};
use course_qa_client::render::{Placeholder, RenderedMessage};
use course_qa_client::{
    logging, App, Backend, ClientError, Focus, HttpClient, Key, MessageKind, ModalContent, Page,
    PendingQuery, QueryResponse, Role, UiEvent, View,
};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Parser)]
#[command(name = "course-qa")]
#[command(about = "Ask questions about course materials", long_about = None)]
struct Cli {
    /// Config file (default: $COURSE_QA_CONFIG, then ~/.course-qa/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,
    /// API base URL, overrides `api.base_url` from the config
    #[arg(long)]
    api_url: Option<String>,
    /// Ask this question once and exit
    question: Option<String>,
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    // 1. --config <path> flag
    if let Some(path) = &cli.config {
        return config::load(path).with_context(|| format!("loading {}", path.display()));
    }
    // 2. COURSE_QA_CONFIG env var
    if let Ok(val) = std::env::var("COURSE_QA_CONFIG") {
        let path = PathBuf::from(val);
        return config::load(&path).with_context(|| format!("loading {}", path.display()));
    }
    // 3. Default path, optional
    match config::default_config_path() {
        Some(path) if path.exists() => {
            config::load(&path).with_context(|| format!("loading {}", path.display()))
        }
        _ => Ok(Config::default()),
    }
}

/// [`Page`] that also prints transcript and modal changes to stdout.
struct Terminal {
    page: Page,
    echo: bool,
}

impl Terminal {
    fn print_message(message: &RenderedMessage) {
        let m = &message.message;
        let prefix = match (m.role, m.kind) {
            (Role::User, _) => "you",
            (Role::Assistant, MessageKind::Error) => "error",
            (Role::Assistant, _) => "assistant",
        };
        println!("{}> {}", prefix, m.content);
        print_sources(m.citations().iter().map(|c| c.display_text.as_str()));
    }
}

fn print_sources<'a>(sources: impl Iterator<Item = &'a str>) {
    let mut sources = sources.peekable();
    if sources.peek().is_none() {
        return;
    }
    println!("\nSources:");
    for (i, text) in sources.enumerate() {
        println!("  [{}] {}", i + 1, text);
    }
}

impl View for Terminal {
    fn clear_transcript(&mut self) {
        self.page.clear_transcript();
    }

    fn append_message(&mut self, message: &RenderedMessage) {
        if self.echo {
            Self::print_message(message);
        }
        self.page.append_message(message);
    }

    fn append_placeholder(&mut self, placeholder: &Placeholder) {
        if self.echo {
            eprintln!("...");
        }
        self.page.append_placeholder(placeholder);
    }

    fn remove_placeholder(&mut self, placeholder: &Placeholder) {
        self.page.remove_placeholder(placeholder);
    }

    fn scroll_to_latest(&mut self) {
        self.page.scroll_to_latest();
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.page.set_input_enabled(enabled);
    }

    fn input_value(&self) -> String {
        self.page.input_value()
    }

    fn set_input_value(&mut self, value: &str) {
        self.page.set_input_value(value);
    }

    fn focus(&mut self, target: Focus) {
        self.page.focus(target);
    }

    fn show_modal(&mut self, content: &ModalContent) {
        if self.echo {
            println!("== {} ==", content.title);
            println!("Course: {}", content.course);
            if let Some(lesson) = &content.lesson {
                println!("{}", lesson);
            }
            println!("\n{}\n", content.preview);
            if let Some(link) = &content.link {
                println!("Original: {}", link);
            }
            println!("(/close to dismiss)");
        }
        self.page.show_modal(content);
    }

    fn hide_modal(&mut self) {
        self.page.hide_modal();
    }

    fn set_course_count(&mut self, text: &str) {
        self.page.set_course_count(text);
    }

    fn set_course_titles(&mut self, html: &str) {
        self.page.set_course_titles(html);
    }
}

const HELP: &str = "\
commands:
  <text>        ask a question
  /new          start a new conversation
  /suggest      list suggested questions
  /suggest N    ask suggested question N
  /source N     show source N of the latest answer
  /close        close the source view
  /stats        show course statistics
  /quit         exit";

fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();
    let cfg = load_config(&cli)?;
    let api_url = cli.api_url.clone().unwrap_or_else(|| cfg.api_url().to_string());

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("creating runtime")?;

    let question = cli.question;
    rt.block_on(async move {
        let terminal = Terminal {
            page: Page::new(),
            echo: question.is_none(),
        };
        let mut app = App::from_config(HttpClient::new(&api_url), terminal, &cfg);

        match question {
            Some(question) => ask_once(&mut app, &question).await,
            None => interactive(&mut app).await,
        }
    })
}

async fn ask_once(app: &mut App<HttpClient, Terminal>, question: &str) -> anyhow::Result<()> {
    app.controller_mut().start_new_session();
    app.controller_mut().send_query(question).await;

    let Some(reply) = app.controller().view().page.last_message() else {
        return Ok(());
    };
    let m = &reply.message;
    if m.role != Role::Assistant || m.kind == MessageKind::Welcome {
        anyhow::bail!("no question provided");
    }
    if m.kind == MessageKind::Error {
        eprintln!("{}", m.content);
        process::exit(1);
    }
    println!("{}", m.content);
    print_sources(m.citations().iter().map(|c| c.display_text.as_str()));
    Ok(())
}

/// The reply to the query currently on screen.
struct InFlight {
    pending: PendingQuery,
    reply: BoxFuture<'static, Result<QueryResponse, ClientError>>,
}

async fn interactive(app: &mut App<HttpClient, Terminal>) -> anyhow::Result<()> {
    if let Some(stats) = app.startup().await {
        println!("{} course(s) available", stats.total_courses);
    }
    println!("type /help for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight: Option<InFlight> = None;
    loop {
        tokio::select! {
            biased;
            result = async {
                match in_flight.as_mut() {
                    Some(f) => f.reply.as_mut().await,
                    None => std::future::pending().await,
                }
            } => {
                if let Some(f) = in_flight.take() {
                    app.complete(f.pending, result);
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !run_line(app, line.trim(), &mut in_flight).await? {
                    break;
                }
            }
        }
    }

    // Let the last answer land before exiting.
    if let Some(f) = in_flight.take() {
        let result = f.reply.await;
        app.complete(f.pending, result);
    }
    Ok(())
}

/// Handle one stdin line; `false` once the user quits.
async fn run_line(
    app: &mut App<HttpClient, Terminal>,
    line: &str,
    in_flight: &mut Option<InFlight>,
) -> anyhow::Result<bool> {
    let (command, arg) = match line.split_once(' ') {
        Some((c, a)) => (c, a.trim()),
        None => (line, ""),
    };
    match command {
        "/quit" | "/exit" => return Ok(false),
        "/help" => println!("{HELP}"),
        "/new" => app.dispatch(UiEvent::NewChatClicked).await?,
        "/close" => app.dispatch(UiEvent::ModalCloseClicked).await?,
        "/stats" => {
            if app.controller_mut().load_course_stats().await.is_none() {
                eprintln!("failed to load courses");
            } else {
                let page = &app.controller().view().page;
                println!("{} course(s)", page.course_count);
            }
        }
        "/suggest" if arg.is_empty() => {
            for (i, q) in app.suggested_questions().iter().enumerate() {
                println!("  [{}] {}", i + 1, q);
            }
        }
        "/suggest" => {
            let question = arg
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| app.suggested_questions().get(i).cloned());
            match question {
                Some(q) => send(app, UiEvent::SuggestedQuestionClicked(q), in_flight)?,
                None => eprintln!("no suggested question {arg}"),
            }
        }
        "/source" => {
            let chip = app
                .controller()
                .messages()
                .iter()
                .rev()
                .find(|m| !m.citations().is_empty())
                .and_then(|m| {
                    let index = arg.parse::<usize>().ok()?.checked_sub(1)?;
                    (index < m.citations().len()).then_some((m.id, index))
                });
            match chip {
                Some((message_id, index)) => {
                    app.dispatch(UiEvent::SourceChipClicked { message_id, index })
                        .await?
                }
                None => eprintln!("no source {arg}"),
            }
        }
        c if c.starts_with('/') => eprintln!("unknown command {c}, try /help"),
        _ => {
            // Typing into a disabled entry field does nothing.
            let page = &mut app.controller_mut().view_mut().page;
            if page.input_enabled {
                page.set_input_value(line);
            }
            send(app, UiEvent::InputKeyPress(Key::Enter), in_flight)?;
        }
    }
    Ok(true)
}

/// Dispatch a send event and, if it starts a query, put its request in flight.
fn send(
    app: &mut App<HttpClient, Terminal>,
    event: UiEvent,
    in_flight: &mut Option<InFlight>,
) -> anyhow::Result<()> {
    let busy = app.controller().is_input_locked();
    match app.handle(event)? {
        Some(pending) => {
            let backend = app.controller().shared_backend();
            let request = pending.request().clone();
            let reply = async move { backend.query(&request).await }.boxed();
            *in_flight = Some(InFlight { pending, reply });
        }
        None if busy => eprintln!("busy, ignored: still waiting for the previous answer"),
        None => {}
    }
    Ok(())
}
