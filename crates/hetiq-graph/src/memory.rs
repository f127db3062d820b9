//! In-memory graph that answers pattern queries without a server.
//!
//! Converts a TSV snapshot into an adjacency list (outgoing and incoming)
//! and evaluates [`PatternQuery`] with the same optional-match and
//! aggregation semantics the Cypher rendering has.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use async_trait::async_trait;
use hetiq_core::{Edge, GraphSnapshot, Metaedge, Node, NodeKind};

use crate::client::GraphError;
use crate::pattern::{
    ColumnValue, Direction, Exclusion, NodePattern, PatternExecutor, PatternQuery, PatternRow,
    Projection,
};

/// Compact edge entry: metaedge plus the node index at the other end.
#[derive(Debug, Clone)]
struct GraphEdge {
    metaedge: Metaedge,
    other: usize,
}

/// Variable bindings of one partial match, one slot per variable.
type Binding = Vec<Option<usize>>;

/// The in-memory graph.
pub struct InMemoryGraph {
    nodes: Vec<Node>,
    /// `outgoing[i]` = edges whose source is node `i`.
    outgoing: Vec<Vec<GraphEdge>>,
    /// `incoming[i]` = edges whose target is node `i`.
    incoming: Vec<Vec<GraphEdge>>,
    node_index: HashMap<String, usize>,
    dangling_edges: usize,
}

impl InMemoryGraph {
    /// Build from node and edge lists. Edges with an endpoint that is not a
    /// known node id are dropped; the first node wins on duplicate ids.
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let mut node_index = HashMap::with_capacity(nodes.len());
        let mut kept = Vec::with_capacity(nodes.len());
        for node in nodes {
            if node_index.contains_key(&node.id) {
                tracing::debug!(id = %node.id, "Duplicate node id ignored");
                continue;
            }
            node_index.insert(node.id.clone(), kept.len());
            kept.push(node);
        }

        let mut outgoing = vec![Vec::new(); kept.len()];
        let mut incoming = vec![Vec::new(); kept.len()];
        let mut dangling_edges = 0;

        for edge in edges {
            match (node_index.get(&edge.source), node_index.get(&edge.target)) {
                (Some(&src), Some(&tgt)) => {
                    outgoing[src].push(GraphEdge {
                        metaedge: edge.metaedge.clone(),
                        other: tgt,
                    });
                    incoming[tgt].push(GraphEdge {
                        metaedge: edge.metaedge,
                        other: src,
                    });
                }
                _ => {
                    tracing::debug!(
                        source = %edge.source,
                        target = %edge.target,
                        metaedge = %edge.metaedge,
                        "Dangling edge dropped"
                    );
                    dangling_edges += 1;
                }
            }
        }

        Self {
            nodes: kept,
            outgoing,
            incoming,
            node_index,
            dangling_edges,
        }
    }

    /// Number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.outgoing.iter().map(|edges| edges.len()).sum()
    }

    /// Number of edges dropped for referencing unknown node ids.
    pub fn dangling_edge_count(&self) -> usize {
        self.dangling_edges
    }

    fn kind_matches(&self, index: usize, kind: &Option<NodeKind>) -> bool {
        kind.as_ref().map_or(true, |k| &self.nodes[index].kind == k)
    }

    /// Node indices reachable from `from` over `metaedge` in `direction`.
    fn neighbors(&self, from: usize, direction: Direction, metaedge: &Metaedge) -> Vec<usize> {
        let out = self.outgoing[from].iter();
        let inc = self.incoming[from].iter();
        let edges: Box<dyn Iterator<Item = &GraphEdge>> = match direction {
            Direction::Outgoing => Box::new(out),
            Direction::Incoming => Box::new(inc),
            Direction::Either => Box::new(out.chain(inc)),
        };
        edges
            .filter(|e| &e.metaedge == metaedge)
            .map(|e| e.other)
            .collect()
    }

    fn edge_exists(&self, from: usize, direction: Direction, metaedge: &Metaedge, to: usize) -> bool {
        self.neighbors(from, direction, metaedge).contains(&to)
    }

    fn excluded(&self, exclusions: &[Exclusion], slots: &HashMap<&str, usize>, binding: &Binding) -> bool {
        exclusions.iter().any(|exclusion| {
            let from = slots.get(exclusion.from.as_str()).and_then(|&s| binding[s]);
            let to = slots.get(exclusion.to.as_str()).and_then(|&s| binding[s]);
            match (from, to) {
                (Some(f), Some(t)) => self.edge_exists(f, exclusion.direction, &exclusion.metaedge, t),
                _ => false,
            }
        })
    }

    fn anchor_matches(&self, anchor: &NodePattern, id: &str) -> Option<usize> {
        self.node_index
            .get(id)
            .copied()
            .filter(|&index| self.kind_matches(index, &anchor.kind))
    }

    /// Evaluate a validated pattern.
    fn evaluate(&self, pattern: &PatternQuery) -> Vec<PatternRow> {
        let mut slots: HashMap<&str, usize> = HashMap::new();
        slots.insert(pattern.anchor.var.as_str(), 0);
        for hop in &pattern.hops {
            let next = slots.len();
            slots.insert(hop.to.var.as_str(), next);
        }
        let width = slots.len();

        let mut bindings: Vec<Binding> = match self.anchor_matches(&pattern.anchor, &pattern.anchor_id) {
            Some(index) => {
                let mut binding = vec![None; width];
                binding[0] = Some(index);
                vec![binding]
            }
            None => Vec::new(),
        };

        for hop in &pattern.hops {
            let from_slot = slots[hop.from.as_str()];
            let to_slot = slots[hop.to.var.as_str()];
            let mut extended = Vec::new();
            let mut seen: HashSet<Binding> = HashSet::new();

            for binding in &bindings {
                let mut matched = false;
                if let Some(from) = binding[from_slot] {
                    for candidate in self.neighbors(from, hop.direction, &hop.metaedge) {
                        if !self.kind_matches(candidate, &hop.to.kind) {
                            continue;
                        }
                        let mut next = binding.clone();
                        next[to_slot] = Some(candidate);
                        if self.excluded(&hop.exclusions, &slots, &next) {
                            continue;
                        }
                        matched = true;
                        if seen.insert(next.clone()) {
                            extended.push(next);
                        }
                    }
                }
                if !matched && seen.insert(binding.clone()) {
                    extended.push(binding.clone());
                }
            }
            bindings = extended;
        }

        self.aggregate(&pattern.returns, &slots, &bindings)
    }

    fn name_at(&self, binding: &Binding, slot: usize) -> Option<String> {
        binding[slot].map(|index| self.nodes[index].name.clone())
    }

    fn aggregate(
        &self,
        projections: &[Projection],
        slots: &HashMap<&str, usize>,
        bindings: &[Binding],
    ) -> Vec<PatternRow> {
        let has_keys = projections
            .iter()
            .any(|p| matches!(p, Projection::Name { .. }));
        if bindings.is_empty() && has_keys {
            return Vec::new();
        }

        // Group key: the values of the `Name` projections, in order.
        let mut groups: BTreeMap<Vec<Option<String>>, Vec<BTreeSet<String>>> = BTreeMap::new();
        let collect_count = projections.len();
        if bindings.is_empty() {
            groups.insert(Vec::new(), vec![BTreeSet::new(); collect_count]);
        }

        for binding in bindings {
            let key: Vec<Option<String>> = projections
                .iter()
                .filter_map(|p| match p {
                    Projection::Name { var, .. } => Some(self.name_at(binding, slots[var.as_str()])),
                    Projection::DistinctNames { .. } => None,
                })
                .collect();
            let sets = groups
                .entry(key)
                .or_insert_with(|| vec![BTreeSet::new(); collect_count]);
            for (i, projection) in projections.iter().enumerate() {
                if let Projection::DistinctNames { var, .. } = projection {
                    if let Some(name) = self.name_at(binding, slots[var.as_str()]) {
                        sets[i].insert(name);
                    }
                }
            }
        }

        groups
            .into_iter()
            .map(|(key, mut sets)| {
                let mut row = PatternRow::default();
                let mut key_values = key.into_iter();
                for (i, projection) in projections.iter().enumerate() {
                    let value = match projection {
                        Projection::Name { .. } => ColumnValue::Text(key_values.next().flatten()),
                        Projection::DistinctNames { .. } => {
                            ColumnValue::Names(std::mem::take(&mut sets[i]))
                        }
                    };
                    row.insert(projection.alias(), value);
                }
                row
            })
            .collect()
    }
}

impl From<GraphSnapshot> for InMemoryGraph {
    fn from(snapshot: GraphSnapshot) -> Self {
        Self::from_parts(snapshot.nodes, snapshot.edges)
    }
}

#[async_trait]
impl PatternExecutor for InMemoryGraph {
    async fn execute(&self, pattern: &PatternQuery) -> Result<Vec<PatternRow>, GraphError> {
        pattern.validate()?;
        Ok(self.evaluate(pattern))
    }
}
