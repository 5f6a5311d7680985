//! Graph-algebra constructors: spec.md §4.2, grounded on
//! `original_source/src/reg_graph.cpp`.

use crate::charset::CharSet;
use crate::repeat::RepeatRange;

use super::{EdgeKind, Graph, NodeId, NodeMarker};

impl Graph {
    /// A fresh two-node graph `head --edge--> tail`.
    pub fn single_edge(kind: EdgeKind) -> Graph {
        let mut graph = Graph::empty_shell();
        let head = graph.head;
        let tail = graph.tail;
        graph.node_mut(head).add_edge(kind, tail);
        graph
    }

    /// Concatenates `self` then `other`, consuming both.
    pub fn concatenate(mut self, other: Graph) -> Graph {
        if other.is_simple_empty_graph() {
            return self;
        }
        if self.is_simple_empty_graph() {
            return other;
        }
        if self.is_simple_concatenation_graph() && other.is_simple_concatenation_graph() {
            let addition = match &other.first_edge().kind {
                EdgeKind::Concatenation(s) => s.clone(),
                _ => unreachable!(),
            };
            if let EdgeKind::Concatenation(s) = &mut self.first_edge_mut().kind {
                s.extend_from_slice(&addition);
            }
            return self;
        }

        let other_head = other.head;
        let other_tail = other.tail;
        let offset = self.adopt(other);
        let moved_head = NodeId(other_head.0 + offset);
        let moved_tail = NodeId(other_tail.0 + offset);

        let head_edges = std::mem::take(&mut self.node_mut(moved_head).edges);
        self.node_mut(self.tail).edges.extend(head_edges);
        self.tail = moved_tail;
        self
    }

    /// Alternates `self` and `other` (the `|` operator), consuming both.
    pub fn alternate(mut self, other: Graph) -> Graph {
        let other_head = other.head;
        let other_tail = other.tail;
        let offset = self.adopt(other);
        let moved_head = NodeId(other_head.0 + offset);
        let moved_tail = NodeId(other_tail.0 + offset);

        let head_edges = std::mem::take(&mut self.node_mut(moved_head).edges);
        self.node_mut(self.head).edges.extend(head_edges);
        let self_tail = self.tail;
        self.node_mut(moved_tail).add_empty_edge(self_tail);
        self
    }

    /// Unions two simple character-set graphs in place.
    pub fn join_character_set(mut self, other: Graph) -> Graph {
        debug_assert!(other.is_simple_character_set_graph());
        let other_set = match &other.first_edge().kind {
            EdgeKind::CharacterSet(s) => *s,
            _ => unreachable!(),
        };
        match &mut self.first_edge_mut().kind {
            EdgeKind::CharacterSet(s) => s.union(&other_set),
            _ => unreachable!("join_character_set on non-character-set graph"),
        }
        self
    }

    pub fn character_set_complement(mut self) -> Graph {
        debug_assert!(self.is_simple_character_set_graph());
        match &mut self.first_edge_mut().kind {
            EdgeKind::CharacterSet(s) => s.complement(),
            _ => unreachable!("complement on non-character-set graph"),
        }
        self
    }

    /// Applies a repeat range to the whole of `self`, per the ordered
    /// rewrite rules of spec.md §4.2.
    pub fn repeat(mut self, range: RepeatRange) -> Graph {
        if self.is_simple_empty_graph() {
            return self;
        }
        if range.lower == 1 && range.upper == 2 {
            // {1,1}: no-op.
            return self;
        }
        if range.lower == 0 && range.upper == 1 {
            // {0,0}: clears the graph.
            return Graph::single_edge(EdgeKind::Empty);
        }
        if range.lower == 0 && range.upper == 2 {
            // {0,1} / `?`: skip without a loop.
            let head = self.head;
            let tail = self.tail;
            self.node_mut(head).add_empty_edge(tail);
            return self;
        }

        let new_head = self.create_node();
        let new_tail = self.create_node();
        let (old_head, old_tail) = (self.head, self.tail);

        if range.lower < 2 && range.is_unbounded() {
            self.node_mut(old_tail).add_empty_edge(old_head);
            self.node_mut(new_head).add_empty_edge(old_head);
            self.node_mut(old_tail).add_empty_edge(new_tail);
        } else {
            self.node_mut(old_tail).add_edge(EdgeKind::Repeat(range), old_head);
            self.node_mut(new_head).add_edge(EdgeKind::EnterLoop, old_head);
            self.node_mut(old_tail).add_edge(EdgeKind::ExitLoop(range), new_tail);
        }

        self.head = new_head;
        self.tail = new_tail;
        if range.lower == 0 {
            self.node_mut(new_head).add_empty_edge(new_tail);
        }
        self
    }

    /// Wraps the graph with a self-looping "consume any ASCII byte" node so
    /// an unanchored pattern may start matching at any offset.
    pub fn match_begin_unknown(mut self) -> Graph {
        let node = self.create_node();
        self.node_mut(node).add_edge(EdgeKind::CharacterSet(CharSet::ALL), node);
        let head = self.head;
        self.node_mut(node).add_empty_edge(head);
        self.head = node;
        self
    }

    /// Same, at the tail end, so matching may end at any offset.
    pub fn match_tail_unknown(mut self) -> Graph {
        let node = self.create_node();
        let tail = self.tail;
        self.node_mut(tail).add_empty_edge(node);
        self.node_mut(node).add_edge(EdgeKind::CharacterSet(CharSet::ALL), node);
        self.tail = node;
        self
    }

    pub fn set_markers(&mut self) {
        self.node_mut_marker(self.head, NodeMarker::MatchBegin);
        self.node_mut_marker(self.tail, NodeMarker::MatchEnd);
    }

    fn node_mut_marker(&mut self, id: NodeId, marker: NodeMarker) {
        self.node_mut(id).marker = marker;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset;

    /// Brute-force backtracking acceptor used only by this module's own unit
    /// tests (the real matcher, with best-match selection, lives in
    /// `interpreter.rs`). `seen` guards against pure epsilon cycles.
    fn consumes(g: &Graph, input: &[u8]) -> bool {
        fn walk(g: &Graph, node: NodeId, i: usize, input: &[u8], seen: &mut Vec<(NodeId, usize)>) -> bool {
            if node == g.tail && i == input.len() {
                return true;
            }
            let key = (node, i);
            if seen.contains(&key) {
                return false;
            }
            seen.push(key);
            for edge in &g.node(node).edges {
                let ok = match &edge.kind {
                    EdgeKind::Empty | EdgeKind::EnterLoop => walk(g, edge.dest, i, input, seen),
                    EdgeKind::CharacterSet(cs) if i < input.len() && cs.has(input[i]) => {
                        walk(g, edge.dest, i + 1, input, seen)
                    }
                    EdgeKind::Concatenation(s) if input[i..].starts_with(s.as_slice()) => {
                        walk(g, edge.dest, i + s.len(), input, seen)
                    }
                    _ => false,
                };
                if ok {
                    return true;
                }
            }
            seen.pop();
            false
        }
        walk(g, g.head, 0, input, &mut Vec::new())
    }

    #[test]
    fn concatenate_fuses_simple_strings() {
        let a = Graph::single_edge(EdgeKind::Concatenation(b"ab".to_vec()));
        let b = Graph::single_edge(EdgeKind::Concatenation(b"cd".to_vec()));
        let g = a.concatenate(b);
        assert!(g.is_simple_concatenation_graph());
        assert!(consumes(&g, b"abcd"));
    }

    #[test]
    fn concatenate_with_branching_graph() {
        let a = Graph::single_edge(EdgeKind::CharacterSet(charset::DIGIT))
            .repeat(RepeatRange::star());
        let b = Graph::single_edge(EdgeKind::Concatenation(b"x".to_vec()));
        let g = a.concatenate(b);
        assert!(consumes(&g, b"123x"));
        assert!(consumes(&g, b"x"));
    }

    #[test]
    fn alternate_accepts_either_side() {
        let a = Graph::single_edge(EdgeKind::Concatenation(b"a".to_vec()));
        let b = Graph::single_edge(EdgeKind::Concatenation(b"b".to_vec()));
        let g = a.alternate(b);
        assert!(consumes(&g, b"a"));
        assert!(consumes(&g, b"b"));
        assert!(!consumes(&g, b"c"));
    }

    #[test]
    fn character_set_complement_flips_membership() {
        let g = Graph::single_edge(EdgeKind::CharacterSet(charset::DIGIT)).character_set_complement();
        assert!(!consumes(&g, b"5"));
        assert!(consumes(&g, b"x"));
    }

    #[test]
    fn repeat_star_accepts_zero_or_more() {
        let g = Graph::single_edge(EdgeKind::Concatenation(b"a".to_vec())).repeat(RepeatRange::star());
        assert!(consumes(&g, b""));
        assert!(consumes(&g, b"aaa"));
    }

    #[test]
    fn repeat_exact_zero_clears_graph() {
        let g = Graph::single_edge(EdgeKind::Concatenation(b"a".to_vec())).repeat(RepeatRange::exact(0));
        assert!(consumes(&g, b""));
        assert!(!consumes(&g, b"a"));
    }
}
