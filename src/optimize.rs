//! The two optimization passes run between parsing and matching: spec.md
//! §4.4, grounded on `original_source/src/reg_graph.cpp`'s
//! `replace_empty_transition` and `fold_empty_edge`. Both are expressed here
//! as plain recursive/stack-based graph traversals rather than the
//! original's trick of sharing one explicit stack between an outer and an
//! inner DFS — same behavior, more ordinary control flow.

use std::collections::{HashMap, HashSet};

use crate::graph::{Edge, EdgeKind, Graph, Node, NodeId, NodeMarker};

pub fn optimize(mut graph: Graph) -> Graph {
    graph.for_each_node_mut(Node::unique_edges);
    graph = eliminate_empty_transitions(graph);
    graph.for_each_node_mut(Node::unique_edges);
    graph = fold_empty_edges(graph);
    graph
}

/// For every anonymous node with exactly one outgoing ε-edge, redirects
/// incoming edges to skip it (a single hop, not a transitive closure —
/// chains of two or more such relays are only ever collapsed by one link
/// per call, matching the original).
fn eliminate_empty_transitions(mut graph: Graph) -> Graph {
    let relay = find_empty_relays(&graph);
    if relay.is_empty() {
        return graph;
    }

    if let Some(&redirected) = relay.get(&graph.head) {
        graph.head = redirected;
    }

    let tail = graph.tail;
    let mut seen: HashSet<NodeId> = HashSet::new();
    seen.insert(graph.head);
    let mut stack = vec![graph.head];

    while let Some(node) = stack.pop() {
        if node == tail {
            continue;
        }
        for edge in &mut graph.node_mut(node).edges {
            if let Some(&redirected) = relay.get(&edge.dest) {
                edge.dest = redirected;
            }
        }
        let dests: Vec<NodeId> = graph.node(node).edges.iter().map(|e| e.dest).collect();
        for dest in dests {
            if seen.insert(dest) {
                stack.push(dest);
            }
        }
    }
    seen.insert(tail);

    compact(graph, &seen)
}

fn find_empty_relays(graph: &Graph) -> HashMap<NodeId, NodeId> {
    let mut relay = HashMap::new();
    for i in 0..graph.node_count() {
        let id = NodeId(i as u32);
        let node = graph.node(id);
        if node.marker == NodeMarker::Anonymous && node.edges.len() == 1 && node.edges[0].kind.is_empty() {
            relay.insert(id, node.edges[0].dest);
        }
    }
    relay
}

/// For each node, folds its ε-edges into direct copies of whatever its
/// anonymous ε-chains ultimately reach, then dedupes the resulting edge set.
fn fold_empty_edges(mut graph: Graph) -> Graph {
    let tail = graph.tail;
    let mut processed: HashSet<NodeId> = HashSet::new();
    let mut seen: HashSet<NodeId> = HashSet::new();
    seen.insert(graph.head);
    let mut stack = vec![graph.head];

    while let Some(node) = stack.pop() {
        if processed.insert(node) {
            fold_one_node(&mut graph, node, tail);
        }
        if node == tail {
            continue;
        }
        let dests: Vec<NodeId> = graph.node(node).edges.iter().map(|e| e.dest).collect();
        for dest in dests {
            if seen.insert(dest) {
                stack.push(dest);
            }
        }
    }
    seen.insert(tail);

    compact(graph, &seen)
}

fn fold_one_node(graph: &mut Graph, fold_id: NodeId, tail: NodeId) {
    let mut reachable: Vec<NodeId> = Vec::new();
    let mut reachable_set: HashSet<NodeId> = HashSet::new();
    let mut stack = vec![fold_id];

    while let Some(curr) = stack.pop() {
        if curr == tail {
            continue;
        }
        for edge in &graph.node(curr).edges {
            if edge.kind.is_empty() && reachable_set.insert(edge.dest) {
                reachable.push(edge.dest);
                if graph.node(edge.dest).marker == NodeMarker::Anonymous {
                    stack.push(edge.dest);
                }
            }
        }
    }

    let mut new_edges: Vec<Edge> = graph
        .node(fold_id)
        .edges
        .iter()
        .filter(|e| !e.kind.is_empty())
        .cloned()
        .collect();

    for &curr in &reachable {
        if curr == fold_id {
            continue;
        }
        if curr == tail || graph.node(curr).marker != NodeMarker::Anonymous {
            new_edges.push(Edge {
                kind: EdgeKind::Empty,
                dest: curr,
            });
        } else {
            for edge in &graph.node(curr).edges {
                if !edge.kind.is_empty() {
                    new_edges.push(edge.clone());
                }
            }
        }
    }

    let node = graph.node_mut(fold_id);
    node.edges = new_edges;
    node.unique_edges();
}

/// Rebuilds the graph keeping only the nodes in `keep`, renumbering ids in
/// ascending order of their old id.
fn compact(graph: Graph, keep: &HashSet<NodeId>) -> Graph {
    let mut ids: Vec<NodeId> = keep.iter().copied().collect();
    ids.sort();

    let remap: HashMap<NodeId, NodeId> = ids
        .iter()
        .enumerate()
        .map(|(new_idx, &old_id)| (old_id, NodeId(new_idx as u32)))
        .collect();

    let nodes = ids
        .iter()
        .map(|&old_id| {
            let old_node = graph.node(old_id);
            let edges = old_node
                .edges
                .iter()
                .map(|e| Edge {
                    kind: e.kind.clone(),
                    dest: remap[&e.dest],
                })
                .collect();
            Node {
                marker: old_node.marker,
                edges,
            }
        })
        .collect();

    Graph {
        nodes,
        head: remap[&graph.head],
        tail: remap[&graph.tail],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset;
    use crate::repeat::RepeatRange;

    fn node_count(g: &Graph) -> usize {
        g.node_count()
    }

    #[test]
    fn optimize_drops_unreachable_nodes() {
        let g = Graph::single_edge(EdgeKind::Concatenation(b"a".to_vec()))
            .concatenate(Graph::single_edge(EdgeKind::Concatenation(b"b".to_vec())));
        let before = node_count(&g);
        let g2 = optimize(g);
        assert!(node_count(&g2) <= before);
    }

    #[test]
    fn optimize_preserves_match_for_star() {
        let g = Graph::single_edge(EdgeKind::CharacterSet(charset::ALPHA)).repeat(RepeatRange::star());
        let g2 = optimize(g);
        assert_eq!(g2.node(g2.head).marker, NodeMarker::Anonymous);
    }

    /// spec.md §8: "optimization preserves the match relation". Compiles a
    /// handful of patterns through the parser only, matching once against
    /// the raw parse tree and once against the optimized graph, and asserts
    /// identical results across a table of inputs for each.
    #[test]
    fn optimization_preserves_match_relation() {
        use crate::debug::DebugFlags;
        use crate::interpreter;
        use crate::parser::parse;

        let cases: &[(&str, &[&str])] = &[
            ("a*", &["", "a", "aaa", "b"]),
            ("a|b", &["ba", "ab", "c"]),
            ("[abc]+", &["xbca!", "", "ddd"]),
            ("a{2,3}", &["a", "aa", "aaaaa"]),
            ("^([[:digit:]]+)-([[:alpha:]]+)$", &["42-foo", "x42-foo", "1-a"]),
            ("(a|b)+c", &["abababc", "c", "aaax"]),
        ];

        for (pattern, inputs) in cases {
            let raw = parse(pattern).unwrap();
            let optimized = optimize(parse(pattern).unwrap());
            for input in *inputs {
                let before = interpreter::run(&raw, input.as_bytes(), DebugFlags::none());
                let after = interpreter::run(&optimized, input.as_bytes(), DebugFlags::none());
                assert_eq!(
                    before, after,
                    "pattern {pattern:?} input {input:?}: optimization changed the match"
                );
            }
        }
    }
}
