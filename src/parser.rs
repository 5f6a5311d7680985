//! Assembles a token stream into a [`Graph`]: spec.md §4.3, grounded on
//! `original_source/src/parser.cpp`'s `Parser::build_graph`.
//!
//! The original special-cases the top level: when the stack empties out
//! during a final reduction it just takes whatever's left rather than
//! popping a synthetic frame. Here a synthetic outer `(` frame is pushed
//! before the first token, so end-of-stream reduction is the same code path
//! as a real `)` — one fewer special case, same result.

use crate::charset::CharSet;
use crate::debug::DebugFlags;
use crate::error::{ParseError, ParseResult};
use crate::graph::{EdgeKind, Graph};
use crate::repeat::RepeatRange;
use crate::token::{Token, Tokenizer};

/// What opened a frame on the parser's stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Opener {
    /// A real `(`, or the synthetic frame standing in for the whole pattern.
    Paren,
    Bracket { negate: bool },
    /// Pushed by a `|`: one alternation layer.
    Alt,
}

struct Frame {
    opener: Opener,
    subgraphs: Vec<Graph>,
}

/// Parses `pattern` into an unoptimized [`Graph`] with `head`/`tail` markers
/// set and begin/end anchors wrapped where the pattern didn't supply its own.
pub fn parse(pattern: &str) -> ParseResult<Graph> {
    parse_with(pattern, DebugFlags::none())
}

/// Same as [`parse`], tracing each token and stack reduction to stderr when
/// `debug.parser` is set (spec.md §6's `REGEX_PARSER_DEBUG` hook).
pub fn parse_with(pattern: &str, debug: DebugFlags) -> ParseResult<Graph> {
    let mut tokenizer = Tokenizer::new(pattern);
    let mut stack: Vec<Frame> = vec![Frame {
        opener: Opener::Paren,
        subgraphs: Vec::new(),
    }];
    let mut match_begin = false;
    let mut match_end = false;

    if debug.parser {
        eprintln!("---------- [ PARSER ] ----------");
    }

    while let Some(token) = tokenizer.next_token()? {
        if debug.parser {
            eprintln!("token={token:?} stack_depth={}", stack.len());
        }
        match token {
            Token::Atom(bytes) => {
                let in_bracket = matches!(top(&stack)?.opener, Opener::Bracket { .. });
                let kind = if in_bracket {
                    EdgeKind::CharacterSet(charset_of_atom(&bytes))
                } else {
                    EdgeKind::Concatenation(bytes)
                };
                top_mut(&mut stack)?.subgraphs.push(Graph::single_edge(kind));
            }
            Token::CharRange(lo, hi) => {
                top_mut(&mut stack)?
                    .subgraphs
                    .push(Graph::single_edge(EdgeKind::CharacterSet(CharSet::range(lo, hi))));
            }
            Token::CharClass(set) => {
                top_mut(&mut stack)?
                    .subgraphs
                    .push(Graph::single_edge(EdgeKind::CharacterSet(set)));
            }
            Token::Period => {
                top_mut(&mut stack)?
                    .subgraphs
                    .push(Graph::single_edge(EdgeKind::CharacterSet(CharSet::ALL)));
            }
            Token::LeftParen => stack.push(Frame {
                opener: Opener::Paren,
                subgraphs: Vec::new(),
            }),
            Token::LeftBracket => stack.push(Frame {
                opener: Opener::Bracket { negate: false },
                subgraphs: Vec::new(),
            }),
            Token::LeftBracketNot => stack.push(Frame {
                opener: Opener::Bracket { negate: true },
                subgraphs: Vec::new(),
            }),
            Token::Pipe => stack.push(Frame {
                opener: Opener::Alt,
                subgraphs: Vec::new(),
            }),
            Token::RightParen => {
                let graph = reduce_to_paren(&mut stack)?;
                if debug.parser {
                    eprintln!("reduce ) -> graph nodes={}", graph.node_count());
                }
                top_mut(&mut stack)?.subgraphs.push(graph);
            }
            Token::RightBracket => {
                let frame = stack.pop().ok_or(ParseError::UnexpectedToken)?;
                let negate = match frame.opener {
                    Opener::Bracket { negate } => negate,
                    _ => return Err(ParseError::UnexpectedToken),
                };
                let mut folded = Graph::single_edge(EdgeKind::CharacterSet(CharSet::EMPTY));
                for g in frame.subgraphs {
                    folded = folded.join_character_set(g);
                }
                if negate {
                    folded = folded.character_set_complement();
                }
                if debug.parser {
                    eprintln!("reduce ] -> charset negate={negate}");
                }
                top_mut(&mut stack)?.subgraphs.push(folded);
            }
            Token::LeftBrace => {
                let range = parse_braces(&mut tokenizer)?;
                apply_repeat(&mut stack, range)?;
            }
            Token::RightBrace | Token::Comma | Token::Numeric(_) => {
                // Only reachable if braces are parsed outside of `parse_braces`,
                // which never happens.
                return Err(ParseError::UnexpectedToken);
            }
            Token::Asterisk => apply_repeat(&mut stack, RepeatRange::star())?,
            Token::Plus => apply_repeat(&mut stack, RepeatRange::plus())?,
            Token::Question => apply_repeat(&mut stack, RepeatRange::question())?,
            Token::MatchBegin => match_begin = true,
            Token::MatchEnd => match_end = true,
        }
    }

    let mut graph = reduce_to_paren(&mut stack)?;
    if !stack.is_empty() {
        return Err(ParseError::UnexpectedToken);
    }
    if debug.parser {
        eprintln!(
            "end-of-stream reduce -> graph nodes={} match_begin={match_begin} match_end={match_end}",
            graph.node_count()
        );
    }

    graph.set_markers();
    if !match_begin {
        graph = graph.match_begin_unknown();
    }
    if !match_end {
        graph = graph.match_tail_unknown();
    }

    Ok(graph)
}

fn top(stack: &[Frame]) -> ParseResult<&Frame> {
    stack.last().ok_or(ParseError::UnexpectedToken)
}

fn top_mut(stack: &mut [Frame]) -> ParseResult<&mut Frame> {
    stack.last_mut().ok_or(ParseError::UnexpectedToken)
}

fn charset_of_atom(bytes: &[u8]) -> CharSet {
    let mut set = CharSet::EMPTY;
    for &b in bytes {
        set.insert(b);
    }
    set
}

/// Applies a repeat range to the last sub-graph pushed onto the current
/// frame. An empty frame (nothing yet to repeat) is "invalid suffix
/// operator", same as the original's bare `graph_stack.empty()` check.
fn apply_repeat(stack: &mut [Frame], range: RepeatRange) -> ParseResult<()> {
    let frame = top_mut(stack)?;
    let graph = frame.subgraphs.pop().ok_or(ParseError::InvalidSuffixOperator)?;
    frame.subgraphs.push(graph.repeat(range));
    Ok(())
}

/// Pops frames down to (and including) the nearest `Paren` opener, folding
/// each frame's sub-graphs by concatenation and alternating the resulting
/// layers back together in source order.
fn reduce_to_paren(stack: &mut Vec<Frame>) -> ParseResult<Graph> {
    let mut layers: Vec<Graph> = Vec::new();
    loop {
        let frame = stack.pop().ok_or(ParseError::UnexpectedToken)?;
        let is_paren = matches!(frame.opener, Opener::Paren);
        layers.push(concatenate_all(frame.subgraphs));
        if is_paren {
            break;
        }
    }
    layers.reverse();
    let mut layers = layers.into_iter();
    let mut result = layers.next().expect("at least one layer popped");
    for layer in layers {
        result = result.alternate(layer);
    }
    Ok(result)
}

fn concatenate_all(subgraphs: Vec<Graph>) -> Graph {
    let mut result = Graph::single_edge(EdgeKind::Empty);
    for g in subgraphs {
        result = result.concatenate(g);
    }
    result
}

/// Consumes the token stream after a `{` directly, since `{m,n}` is parsed
/// greedily here rather than dispatched through the main loop (mirrors the
/// original's inner `while token->type != RIGHT_BRACES` loop).
fn parse_braces(tokenizer: &mut Tokenizer) -> ParseResult<RepeatRange> {
    let first = tokenizer
        .next_token()?
        .ok_or(ParseError::InvalidBracesFormat)?;
    match first {
        Token::Numeric(m) => match next_token(tokenizer)? {
            Token::RightBrace => Ok(RepeatRange::exact(m)),
            Token::Comma => match next_token(tokenizer)? {
                Token::RightBrace => Ok(RepeatRange::at_least(m)),
                Token::Numeric(n) => match next_token(tokenizer)? {
                    Token::RightBrace => {
                        if n < m {
                            Err(ParseError::InvalidBracesFormat)
                        } else {
                            Ok(RepeatRange::between(m, n))
                        }
                    }
                    _ => Err(ParseError::InvalidBracesFormat),
                },
                _ => Err(ParseError::InvalidBracesFormat),
            },
            _ => Err(ParseError::InvalidBracesFormat),
        },
        Token::Comma => match next_token(tokenizer)? {
            Token::Numeric(n) => match next_token(tokenizer)? {
                Token::RightBrace => Ok(RepeatRange::at_most(n)),
                _ => Err(ParseError::InvalidBracesFormat),
            },
            _ => Err(ParseError::InvalidBracesFormat),
        },
        _ => Err(ParseError::InvalidBracesFormat),
    }
}

fn next_token(tokenizer: &mut Tokenizer) -> ParseResult<Token> {
    tokenizer.next_token()?.ok_or(ParseError::InvalidBracesFormat)
}
