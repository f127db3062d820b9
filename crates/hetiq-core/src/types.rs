//! Core domain types for the hetiq knowledge graph.
//!
//! These types mirror the stored schema in both backends: nodes carry
//! `{id, name, kind}` and edges carry `{source, metaedge, target}`.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

// ── Node Kinds ────────────────────────────────────────────────────

/// The kind of a knowledge-graph node.
///
/// Only the kinds the query engines filter on get their own variant;
/// everything else in the source data survives as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    Disease,
    Compound,
    Gene,
    Anatomy,
    Other(String),
}

impl NodeKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Disease => "Disease",
            Self::Compound => "Compound",
            Self::Gene => "Gene",
            Self::Anatomy => "Anatomy",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for NodeKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Disease" => Self::Disease,
            "Compound" => Self::Compound,
            "Gene" => Self::Gene,
            "Anatomy" => Self::Anatomy,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for NodeKind {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Metaedges ─────────────────────────────────────────────────────

/// Direction in which a source node regulates a gene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Regulation {
    Up,
    Down,
}

impl Regulation {
    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }
}

/// Relation code of an edge. The code encodes source kind, relation,
/// and target kind, e.g. `CtD` is Compound-treats-Disease.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Metaedge {
    /// `CtD`
    CompoundTreatsDisease,
    /// `DdG`, the causative relation reported as "genes".
    DiseaseDownregulatesGene,
    /// `DuG`
    DiseaseUpregulatesGene,
    /// `CuG`
    CompoundUpregulatesGene,
    /// `CdG`
    CompoundDownregulatesGene,
    /// `DlA`
    DiseaseLocalizesAnatomy,
    /// `AdG`
    AnatomyDownregulatesGene,
    /// `AuG`
    AnatomyUpregulatesGene,
    Other(String),
}

impl Metaedge {
    pub fn code(&self) -> &str {
        match self {
            Self::CompoundTreatsDisease => "CtD",
            Self::DiseaseDownregulatesGene => "DdG",
            Self::DiseaseUpregulatesGene => "DuG",
            Self::CompoundUpregulatesGene => "CuG",
            Self::CompoundDownregulatesGene => "CdG",
            Self::DiseaseLocalizesAnatomy => "DlA",
            Self::AnatomyDownregulatesGene => "AdG",
            Self::AnatomyUpregulatesGene => "AuG",
            Self::Other(code) => code,
        }
    }

    /// Regulation direction of a compound-to-gene edge.
    pub fn compound_regulation(&self) -> Option<Regulation> {
        match self {
            Self::CompoundUpregulatesGene => Some(Regulation::Up),
            Self::CompoundDownregulatesGene => Some(Regulation::Down),
            _ => None,
        }
    }

    /// The anatomy-to-gene metaedge for a regulation direction.
    pub fn anatomy_regulates(direction: Regulation) -> Self {
        match direction {
            Regulation::Up => Self::AnatomyUpregulatesGene,
            Regulation::Down => Self::AnatomyDownregulatesGene,
        }
    }
}

impl From<String> for Metaedge {
    fn from(code: String) -> Self {
        match code.as_str() {
            "CtD" => Self::CompoundTreatsDisease,
            "DdG" => Self::DiseaseDownregulatesGene,
            "DuG" => Self::DiseaseUpregulatesGene,
            "CuG" => Self::CompoundUpregulatesGene,
            "CdG" => Self::CompoundDownregulatesGene,
            "DlA" => Self::DiseaseLocalizesAnatomy,
            "AdG" => Self::AnatomyDownregulatesGene,
            "AuG" => Self::AnatomyUpregulatesGene,
            _ => Self::Other(code),
        }
    }
}

impl From<&str> for Metaedge {
    fn from(code: &str) -> Self {
        Self::from(code.to_string())
    }
}

impl From<Metaedge> for String {
    fn from(metaedge: Metaedge) -> Self {
        metaedge.code().to_string()
    }
}

impl fmt::Display for Metaedge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ── Nodes & Edges ─────────────────────────────────────────────────

/// A knowledge-graph node. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(id: &str, name: &str, kind: NodeKind) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind,
        }
    }
}

/// A directed, typed relation between two node ids.
///
/// Duplicate triples are allowed; endpoints are not validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub metaedge: Metaedge,
    pub target: String,
}

impl Edge {
    pub fn new(source: &str, metaedge: Metaedge, target: &str) -> Self {
        Self {
            source: source.to_string(),
            metaedge,
            target: target.to_string(),
        }
    }
}

/// The complete node and edge lists of a graph, as read from TSV files.
#[derive(Debug, Clone, Default)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

// ── Query Results ─────────────────────────────────────────────────

/// Everything known about a disease: its treating compounds, causative
/// genes, and the anatomy it localizes to. Collections hold distinct names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseInfo {
    pub disease_id: String,
    pub disease_name: String,
    pub drugs: BTreeSet<String>,
    pub genes: BTreeSet<String>,
    pub anatomy: BTreeSet<String>,
}
