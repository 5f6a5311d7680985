//! The backtracking matcher: spec.md §4.5, translated line-for-line from
//! `original_source/include/automata.hpp` + `src/automata.cpp`'s
//! `Automata::run`. An explicit frame stack stands in for the call stack a
//! plain recursive descent would use, so a pathological pattern can't blow
//! it.

use crate::debug::DebugFlags;
use crate::graph::{EdgeKind, Graph, NodeId, NodeMarker};

/// One stack frame: the node currently being visited, which of its edges
/// has been tried so far, and the loop-repetition counters in scope.
struct Frame {
    offset: usize,
    node: NodeId,
    edge_index: usize,
    loop_counters: Vec<usize>,
    match_start: usize,
    finish: bool,
}

impl Frame {
    fn child(offset: usize, node: NodeId, loop_counters: Vec<usize>, match_start: usize) -> Frame {
        Frame {
            offset,
            node,
            edge_index: 0,
            loop_counters,
            match_start,
            finish: false,
        }
    }
}

/// Replaces `best` with `(begin, end)` if the new span is longer, or equal
/// length and starts earlier (spec.md §4.5's leftmost-longest rule).
fn record_best(best: &mut Option<(usize, usize)>, begin: usize, end: usize) {
    match best {
        None => *best = Some((begin, end)),
        Some((best_begin, best_end)) => {
            let better = end - begin > *best_end - *best_begin
                || (end - begin == *best_end - *best_begin && begin < *best_begin);
            if better {
                *best = Some((begin, end));
            }
        }
    }
}

/// Explores every path through `graph` against `input`, depth-first, and
/// returns the best-match span by byte offset, or `None` if no path ever
/// reaches a `MatchEnd` node with `finish` set.
pub fn run(graph: &Graph, input: &[u8], debug: DebugFlags) -> Option<(usize, usize)> {
    let mut stack = vec![Frame::child(0, graph.head, Vec::new(), input.len())];
    let mut best: Option<(usize, usize)> = None;

    if debug.automata {
        eprintln!("---------- [ AUTOMATA ] ----------");
    }

    while let Some(top) = stack.last_mut() {
        if top.edge_index == 0 {
            let marker = graph.node(top.node).marker;
            if marker == NodeMarker::MatchBegin && top.offset < top.match_start {
                top.match_start = top.offset;
            }
        }

        let node = graph.node(top.node);
        if top.edge_index < node.edges.len() {
            let edge = node.edges[top.edge_index].clone();
            top.edge_index += 1;
            let offset = top.offset;
            let match_start = top.match_start;
            let loop_counters = top.loop_counters.clone();

            if debug.automata {
                eprintln!("offset={offset} match_start={match_start} edge={edge:?}");
            }

            match &edge.kind {
                EdgeKind::Empty => {
                    stack.push(Frame::child(offset, edge.dest, loop_counters, match_start));
                }
                EdgeKind::EnterLoop => {
                    let mut counters = loop_counters;
                    counters.push(1);
                    stack.push(Frame::child(offset, edge.dest, counters, match_start));
                }
                EdgeKind::ExitLoop(range) => {
                    let mut counters = loop_counters;
                    if let Some(&count) = counters.last() {
                        if range.in_range(count) {
                            counters.pop();
                            stack.push(Frame::child(offset, edge.dest, counters, match_start));
                        }
                    }
                }
                EdgeKind::Repeat(range) => {
                    let mut counters = loop_counters;
                    if let Some(count) = counters.last_mut() {
                        *count += 1;
                        if range.in_upper_range(*count) {
                            stack.push(Frame::child(offset, edge.dest, counters, match_start));
                        }
                    }
                }
                EdgeKind::Concatenation(s) => {
                    if input[offset..].starts_with(s.as_slice()) {
                        stack.push(Frame::child(offset + s.len(), edge.dest, loop_counters, match_start));
                    }
                }
                EdgeKind::CharacterSet(set) => {
                    if offset < input.len() && set.has(input[offset]) {
                        stack.push(Frame::child(offset + 1, edge.dest, loop_counters, match_start));
                    }
                }
            }
        } else {
            let offset = top.offset;
            let match_start = top.match_start;
            let marker = graph.node(top.node).marker;
            let finish = top.finish || offset >= input.len();

            if debug.automata {
                eprintln!("leaving node at offset {offset}, finish={finish}");
            }

            if marker == NodeMarker::MatchEnd && finish {
                record_best(&mut best, match_start, offset);
            }

            stack.pop();
            if let Some(parent) = stack.last_mut() {
                parent.finish |= finish;
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimize::optimize;
    use crate::parser::parse;

    fn compiled(pattern: &str) -> Graph {
        optimize(parse(pattern).unwrap())
    }

    #[test]
    fn literal_match_in_middle() {
        let g = compiled("b");
        assert_eq!(run(&g, b"abc", DebugFlags::none()), Some((1, 2)));
    }

    #[test]
    fn alternation_prefers_leftmost_earliest() {
        let g = compiled("a|b");
        assert_eq!(run(&g, b"ba", DebugFlags::none()), Some((0, 1)));
    }

    #[test]
    fn star_prefers_longest_match() {
        let g = compiled("a*");
        assert_eq!(run(&g, b"aaab", DebugFlags::none()), Some((0, 3)));
    }

    #[test]
    fn bracket_plus_finds_longest_run() {
        let g = compiled("[abc]+");
        assert_eq!(run(&g, b"xbca!", DebugFlags::none()), Some((1, 4)));
    }

    #[test]
    fn brace_range_caps_at_upper_bound() {
        let g = compiled("a{2,3}");
        assert_eq!(run(&g, b"aaaaa", DebugFlags::none()), Some((0, 3)));
    }

    #[test]
    fn anchored_pattern_requires_start() {
        let g = compiled("^abc");
        assert_eq!(run(&g, b"xabc", DebugFlags::none()), None);
        assert_eq!(run(&g, b"abcxyz", DebugFlags::none()), Some((0, 3)));
    }

    #[test]
    fn anchored_both_ends_requires_whole_input() {
        let g = compiled("^abc$");
        assert_eq!(run(&g, b"abc", DebugFlags::none()), Some((0, 3)));
        assert_eq!(run(&g, b"abcd", DebugFlags::none()), None);
    }

    #[test]
    fn no_match_returns_none() {
        let g = compiled("xyz");
        assert_eq!(run(&g, b"abc", DebugFlags::none()), None);
    }

    #[test]
    fn empty_pattern_matches_empty_span_at_start() {
        let g = compiled("");
        assert_eq!(run(&g, b"abc", DebugFlags::none()), Some((0, 0)));
    }
}
