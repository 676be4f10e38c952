//! Markdown to HTML for assistant replies.

use pulldown_cmark::{html, Options, Parser};

/// Render assistant markdown into an HTML fragment.
///
/// Raw HTML embedded in the markdown is passed through as-is; assistant
/// content is treated as trusted.
pub fn render_markdown(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(text, options);
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
