//! A small POSIX-flavored backtracking regex engine: tokenizer, a labeled
//! directed graph model, a frame-stack parser, two graph optimization
//! passes, and a depth-first backtracking interpreter with leftmost-longest
//! best-match selection.
//!
//! Grounded on `dennisss-dacha/pkg/automata/src/regexp/instance.rs`'s
//! construct-then-query shape (`RegExp::new` / `test` / `exec`), adapted to
//! this crate's own pipeline.

pub mod charset;
pub mod debug;
mod error;
mod graph;
mod interpreter;
mod optimize;
mod parser;
pub mod repeat;
mod token;

pub use debug::DebugFlags;
pub use error::{LexError, ParseError};

/// A compiled pattern, ready to be matched against input repeatedly.
#[derive(Debug, Clone)]
pub struct Regex {
    graph: graph::Graph,
}

/// A single match: the byte span it covers within the searched input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    input: &'a str,
    pub start: usize,
    pub end: usize,
}

impl<'a> Match<'a> {
    pub fn as_str(&self) -> &'a str {
        &self.input[self.start..self.end]
    }
}

/// Compiles `pattern`, with debug tracing controlled by the three
/// `REGEX*_DEBUG` environment variables (spec.md §6).
pub fn compile(pattern: &str) -> Result<Regex, String> {
    compile_with(pattern, DebugFlags::from_env())
}

/// Compiles `pattern` with explicit debug flags rather than reading them
/// from the environment.
pub fn compile_with(pattern: &str, debug: DebugFlags) -> Result<Regex, String> {
    let graph = parser::parse_with(pattern, debug).map_err(|e| e.to_string())?;
    let graph = optimize::optimize(graph);
    Ok(Regex { graph })
}

impl Regex {
    /// Searches `input` for the best match (leftmost, then longest),
    /// returning `None` if no substring of `input` matches.
    pub fn find<'a>(&self, input: &'a str) -> Option<Match<'a>> {
        self.find_with_debug(input, DebugFlags::none())
    }

    /// Same as [`Regex::find`], but with explicit debug tracing.
    pub fn find_with_debug<'a>(&self, input: &'a str, debug: DebugFlags) -> Option<Match<'a>> {
        let (start, end) = interpreter::run(&self.graph, input.as_bytes(), debug)?;
        Some(Match { input, start, end })
    }

    /// Same as [`Regex::find`], returning the raw `(start, end)` byte
    /// offsets instead of a [`Match`].
    pub fn find_indices(&self, input: &str) -> Option<(usize, usize)> {
        interpreter::run(&self.graph, input.as_bytes(), DebugFlags::none())
    }
}
