//! Demo REPL: wires every waterline host seam (autocomplete, syntax colour,
//! multi-line continuation, history cap, grapheme overrides) and echoes each
//! committed line back through the syntax colourer.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use waterline::{Editor, HistoryLimit, SyntaxSpan};

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "wl", version, about = "waterline demo REPL")]
struct Args {
    /// Prompt text.
    #[arg(long, default_value = "wl> ")]
    prompt: String,
    /// Keep reading while parentheses are unbalanced.
    #[arg(long)]
    multiline: bool,
    /// Cap history at N entries (0 disables history).
    #[arg(long)]
    history: Option<usize>,
    /// Use the UAX #29 conformant splitter instead of the built-in heuristic.
    #[arg(long)]
    unicode_segmentation: bool,
}

const KEYWORDS: [&str; 8] = [
    "else", "false", "fn", "if", "let", "return", "true", "while",
];

/// Word being typed at the end of the buffer.
fn current_word(text: &str) -> &str {
    let start = text
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_alphanumeric() || *c == '_')
        .last()
        .map_or(text.len(), |(i, _)| i);
    &text[start..]
}

fn complete(text: &str, index: &mut usize) -> Option<String> {
    let word = current_word(text);
    if word.is_empty() {
        return None;
    }
    while *index < KEYWORDS.len() {
        let kw = KEYWORDS[*index];
        *index += 1;
        if let Some(suffix) = kw.strip_prefix(word) {
            if !suffix.is_empty() {
                return Some(suffix.to_string());
            }
        }
    }
    None
}

/// Toy colourer: keywords, numbers, double-quoted strings.
fn highlight(text: &str, start: usize) -> Option<SyntaxSpan> {
    let rest = &text[start..];
    let c = rest.chars().next()?;
    let (len, color_index) = if c.is_ascii_digit() {
        let end = rest
            .find(|ch: char| !ch.is_ascii_digit())
            .unwrap_or(rest.len());
        (end, 2)
    } else if c.is_ascii_alphabetic() || c == '_' {
        let end = rest
            .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_'))
            .unwrap_or(rest.len());
        let color = if KEYWORDS.contains(&&rest[..end]) { 1 } else { 0 };
        (end, color)
    } else if c == '"' {
        let end = rest[1..].find('"').map_or(rest.len(), |i| i + 2);
        (end, 3)
    } else {
        (c.len_utf8(), 0)
    };
    Some(SyntaxSpan {
        byte_end: start + len,
        color_index,
    })
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut ed = Editor::new(args.prompt.clone());
    // default / keyword yellow / number bright cyan / string green
    ed.set_palette(&[-1, 3, 14, 2]);
    ed.set_syntax_color(highlight);
    ed.set_autocomplete(complete);
    if args.multiline {
        ed.set_multiline(
            |text| text.matches('(').count() > text.matches(')').count(),
            Some("..> "),
        );
    }
    match args.history {
        Some(0) => ed.set_history_limit(HistoryLimit::Disabled),
        Some(n) => ed.set_history_limit(HistoryLimit::Max(n)),
        None => {}
    }
    if args.unicode_segmentation {
        ed.set_grapheme_splitter(waterline::unicode::split);
        ed.set_grapheme_width(waterline::unicode::width);
    }

    tracing::info!(multiline = args.multiline, "demo repl starting");
    while let Some(line) = ed.read_line()? {
        if line == "exit" {
            break;
        }
        print!("-> ");
        ed.display_with_syntax(&line)?;
        println!();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completes_current_word_only() {
        let mut index = 0;
        assert_eq!(complete("let x = ret", &mut index), Some("urn".to_string()));
        let mut index = 0;
        assert_eq!(complete("let x = ", &mut index), None);
    }

    #[test]
    fn highlight_classifies_tokens() {
        let span = highlight("let x", 0).expect("span");
        assert_eq!(span.byte_end, 3);
        assert_eq!(span.color_index, 1);
        let span = highlight("42 ", 0).expect("span");
        assert_eq!(span.byte_end, 2);
        assert_eq!(span.color_index, 2);
        let span = highlight("\"hi\" rest", 0).expect("span");
        assert_eq!(span.byte_end, 4);
        assert_eq!(span.color_index, 3);
    }
}
