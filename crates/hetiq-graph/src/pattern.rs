//! Typed multi-hop pattern queries.
//!
//! A pattern starts from one anchor node looked up by id, then walks a
//! sequence of optional hops. Each hop binds a new variable to the nodes
//! reachable over one metaedge, and may carry exclusions: a candidate is
//! dropped when the excluded edge exists between two bound variables.
//! A hop with no surviving candidate binds its variable to nothing and
//! later hops from it bind nothing too; no hop ever removes the anchor.
//!
//! Results are aggregated the way Cypher aggregates: `Name` projections are
//! grouping keys and `DistinctNames` projections collect the set of names
//! bound to a variable across all matches in the group.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use async_trait::async_trait;
use hetiq_core::{Metaedge, NodeKind};

use crate::client::GraphError;

/// Label carried by every node in the graph store.
pub const NODE_LABEL: &str = "Node";
/// Relationship type carried by every edge; the metaedge is a property.
pub const RELATION_TYPE: &str = "RELATES";

/// Orientation of a hop relative to the node it starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outgoing,
    Incoming,
    Either,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePattern {
    pub var: String,
    pub kind: Option<NodeKind>,
}

/// "No edge with this metaedge exists between `from` and `to`."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclusion {
    pub from: String,
    pub direction: Direction,
    pub metaedge: Metaedge,
    pub to: String,
}

impl Exclusion {
    pub fn new(from: &str, direction: Direction, metaedge: Metaedge, to: &str) -> Self {
        Self {
            from: from.to_string(),
            direction,
            metaedge,
            to: to.to_string(),
        }
    }
}

/// One optional traversal step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hop {
    pub from: String,
    pub direction: Direction,
    pub metaedge: Metaedge,
    pub to: NodePattern,
    pub exclusions: Vec<Exclusion>,
}

impl Hop {
    pub fn new(
        from: &str,
        direction: Direction,
        metaedge: Metaedge,
        to_var: &str,
        to_kind: Option<NodeKind>,
    ) -> Self {
        Self {
            from: from.to_string(),
            direction,
            metaedge,
            to: NodePattern {
                var: to_var.to_string(),
                kind: to_kind,
            },
            exclusions: Vec::new(),
        }
    }

    pub fn outgoing(from: &str, metaedge: Metaedge, to_var: &str, to_kind: NodeKind) -> Self {
        Self::new(from, Direction::Outgoing, metaedge, to_var, Some(to_kind))
    }

    pub fn incoming(from: &str, metaedge: Metaedge, to_var: &str, to_kind: NodeKind) -> Self {
        Self::new(from, Direction::Incoming, metaedge, to_var, Some(to_kind))
    }

    pub fn either(from: &str, metaedge: Metaedge, to_var: &str, to_kind: NodeKind) -> Self {
        Self::new(from, Direction::Either, metaedge, to_var, Some(to_kind))
    }

    /// Drop candidates for which `exclusion` finds an edge.
    pub fn unless(mut self, exclusion: Exclusion) -> Self {
        self.exclusions.push(exclusion);
        self
    }
}

/// A named output column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// The `name` of a node variable; acts as a grouping key.
    Name { var: String, alias: String },
    /// The distinct `name`s bound to a variable, unbound matches ignored.
    DistinctNames { var: String, alias: String },
}

impl Projection {
    pub fn var(&self) -> &str {
        match self {
            Self::Name { var, .. } | Self::DistinctNames { var, .. } => var,
        }
    }

    pub fn alias(&self) -> &str {
        match self {
            Self::Name { alias, .. } | Self::DistinctNames { alias, .. } => alias,
        }
    }
}

/// An anchored multi-hop pattern with projections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternQuery {
    pub anchor: NodePattern,
    pub anchor_id: String,
    pub hops: Vec<Hop>,
    pub returns: Vec<Projection>,
}

/// Cypher text plus its string parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CypherQuery {
    pub text: String,
    pub params: Vec<(String, String)>,
}

impl PatternQuery {
    /// Start a pattern at the node with `id`, required to be of `kind`.
    pub fn anchored(var: &str, kind: NodeKind, id: &str) -> Self {
        Self {
            anchor: NodePattern {
                var: var.to_string(),
                kind: Some(kind),
            },
            anchor_id: id.to_string(),
            hops: Vec::new(),
            returns: Vec::new(),
        }
    }

    pub fn optional(mut self, hop: Hop) -> Self {
        self.hops.push(hop);
        self
    }

    pub fn return_name(mut self, var: &str, alias: &str) -> Self {
        self.returns.push(Projection::Name {
            var: var.to_string(),
            alias: alias.to_string(),
        });
        self
    }

    pub fn collect_names(mut self, var: &str, alias: &str) -> Self {
        self.returns.push(Projection::DistinctNames {
            var: var.to_string(),
            alias: alias.to_string(),
        });
        self
    }

    /// Check that every variable is a plain identifier, bound before use,
    /// and bound only once; aliases must be unique.
    pub fn validate(&self) -> Result<(), GraphError> {
        let mut bound: HashSet<&str> = HashSet::new();
        check_identifier(&self.anchor.var)?;
        bound.insert(self.anchor.var.as_str());

        for hop in &self.hops {
            require_bound(&bound, &hop.from)?;
            check_identifier(&hop.to.var)?;
            if !bound.insert(hop.to.var.as_str()) {
                return Err(GraphError::InvalidPattern(format!(
                    "variable `{}` is bound twice",
                    hop.to.var
                )));
            }
            for exclusion in &hop.exclusions {
                require_bound(&bound, &exclusion.from)?;
                require_bound(&bound, &exclusion.to)?;
            }
        }

        if self.returns.is_empty() {
            return Err(GraphError::InvalidPattern(
                "pattern returns no columns".to_string(),
            ));
        }

        let mut aliases = HashSet::new();
        for projection in &self.returns {
            require_bound(&bound, projection.var())?;
            check_identifier(projection.alias())?;
            if !aliases.insert(projection.alias()) {
                return Err(GraphError::InvalidPattern(format!(
                    "column `{}` is returned twice",
                    projection.alias()
                )));
            }
        }

        Ok(())
    }

    /// Render as Cypher. Kinds, metaedges, and the anchor id travel as
    /// parameters; only validated identifiers are spliced into the text.
    pub fn to_cypher(&self) -> Result<CypherQuery, GraphError> {
        self.validate()?;

        let mut params = vec![("anchor_id".to_string(), self.anchor_id.clone())];
        let mut lines = vec![format!(
            "MATCH {}",
            node_clause(&self.anchor, "id: $anchor_id", &mut params)
        )];

        for (i, hop) in self.hops.iter().enumerate() {
            let rel_param = format!("hop{i}_metaedge");
            params.push((rel_param.clone(), hop.metaedge.code().to_string()));
            lines.push(format!(
                "OPTIONAL MATCH ({}){}{}",
                hop.from,
                rel_clause(hop.direction, &rel_param),
                node_clause(&hop.to, "", &mut params)
            ));

            let conditions: Vec<String> = hop
                .exclusions
                .iter()
                .enumerate()
                .map(|(j, exclusion)| {
                    let param = format!("hop{i}_excl{j}_metaedge");
                    params.push((param.clone(), exclusion.metaedge.code().to_string()));
                    format!(
                        "NOT EXISTS {{ ({}){}({}) }}",
                        exclusion.from,
                        rel_clause(exclusion.direction, &param),
                        exclusion.to
                    )
                })
                .collect();
            if !conditions.is_empty() {
                lines.push(format!("WHERE {}", conditions.join(" AND ")));
            }
        }

        let columns: Vec<String> = self
            .returns
            .iter()
            .map(|projection| match projection {
                Projection::Name { var, alias } => format!("{var}.name AS {alias}"),
                Projection::DistinctNames { var, alias } => {
                    format!("collect(DISTINCT {var}.name) AS {alias}")
                }
            })
            .collect();
        lines.push(format!("RETURN {}", columns.join(", ")));

        Ok(CypherQuery {
            text: lines.join("\n"),
            params,
        })
    }
}

fn node_clause(node: &NodePattern, extra: &str, params: &mut Vec<(String, String)>) -> String {
    let mut props = Vec::new();
    if let Some(kind) = &node.kind {
        let param = format!("{}_kind", node.var);
        props.push(format!("kind: ${param}"));
        params.push((param, kind.as_str().to_string()));
    }
    if !extra.is_empty() {
        props.push(extra.to_string());
    }

    if props.is_empty() {
        format!("({}:{NODE_LABEL})", node.var)
    } else {
        format!("({}:{NODE_LABEL} {{{}}})", node.var, props.join(", "))
    }
}

fn rel_clause(direction: Direction, param: &str) -> String {
    let rel = format!("[:{RELATION_TYPE} {{metaedge: ${param}}}]");
    match direction {
        Direction::Outgoing => format!("-{rel}->"),
        Direction::Incoming => format!("<-{rel}-"),
        Direction::Either => format!("-{rel}-"),
    }
}

fn check_identifier(name: &str) -> Result<(), GraphError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(GraphError::InvalidPattern(format!(
            "`{name}` is not a valid identifier"
        )))
    }
}

fn require_bound(bound: &HashSet<&str>, var: &str) -> Result<(), GraphError> {
    if bound.contains(var) {
        Ok(())
    } else {
        Err(GraphError::InvalidPattern(format!(
            "variable `{var}` is used before it is bound"
        )))
    }
}

// ── Result Rows ──────────────────────────────────────────────────

/// One output value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnValue {
    Text(Option<String>),
    Names(BTreeSet<String>),
}

/// A result row keyed by column alias.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternRow {
    columns: BTreeMap<String, ColumnValue>,
}

impl PatternRow {
    pub fn insert(&mut self, alias: &str, value: ColumnValue) {
        self.columns.insert(alias.to_string(), value);
    }

    /// A `Name` column; `None` when absent or null.
    pub fn text(&self, alias: &str) -> Option<&str> {
        match self.columns.get(alias) {
            Some(ColumnValue::Text(Some(s))) => Some(s),
            _ => None,
        }
    }

    /// Move a `DistinctNames` column out of the row; empty when absent.
    pub fn take_names(&mut self, alias: &str) -> BTreeSet<String> {
        match self.columns.remove(alias) {
            Some(ColumnValue::Names(names)) => names,
            _ => BTreeSet::new(),
        }
    }
}

/// Anything that can answer a [`PatternQuery`] with rows of named columns.
#[async_trait]
pub trait PatternExecutor: Send + Sync {
    async fn execute(&self, pattern: &PatternQuery) -> Result<Vec<PatternRow>, GraphError>;
}
