//! Tab-separated node and edge files.
//!
//! Nodes: header `id  name  kind`. Edges: header `source  metaedge  target`.
//! Columns are matched by header name, so column order does not matter and
//! extra columns are ignored. Header names are trimmed; field values are
//! kept verbatim.

use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use serde::de::DeserializeOwned;

use crate::error::CoreError;
use crate::types::{Edge, GraphSnapshot, Node};

/// Read every node row from a TSV source.
pub fn read_nodes<R: Read>(reader: R) -> Result<Vec<Node>, csv::Error> {
    read_rows(reader)
}

/// Read every edge row from a TSV source.
pub fn read_edges<R: Read>(reader: R) -> Result<Vec<Edge>, csv::Error> {
    read_rows(reader)
}

/// Read a node file and an edge file into a snapshot.
pub fn read_snapshot(nodes_path: &Path, edges_path: &Path) -> Result<GraphSnapshot, CoreError> {
    let nodes = read_file(nodes_path, read_nodes)?;
    let edges = read_file(edges_path, read_edges)?;

    tracing::info!(
        nodes = nodes.len(),
        edges = edges.len(),
        nodes_path = %nodes_path.display(),
        edges_path = %edges_path.display(),
        "Snapshot read"
    );

    Ok(GraphSnapshot { nodes, edges })
}

fn read_file<T>(
    path: &Path,
    parse: impl FnOnce(std::fs::File) -> Result<Vec<T>, csv::Error>,
) -> Result<Vec<T>, CoreError> {
    let file = std::fs::File::open(path)?;
    parse(file).map_err(|source| CoreError::Tsv {
        path: path.display().to_string(),
        source,
    })
}

fn read_rows<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    rdr.deserialize::<T>().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Metaedge, NodeKind};

    const NODES: &str = "id\tname\tkind
Disease::DOID:0050742\tnicotine dependence\tDisease
Compound::DB00184\tNicotine\tCompound
Gene::1136\tCHRNA3\tGene
Anatomy::UBERON:0000955\tbrain\tAnatomy
Side Effect::C0000737\tAbdominal pain\tSide Effect
";

    const EDGES: &str = "source\tmetaedge\ttarget
Compound::DB00184\tCtD\tDisease::DOID:0050742
Disease::DOID:0050742\tDlA\tAnatomy::UBERON:0000955
Anatomy::UBERON:0000955\tAdG\tGene::1136
";

    #[test]
    fn test_read_nodes() {
        let nodes = read_nodes(NODES.as_bytes()).unwrap();
        assert_eq!(nodes.len(), 5);
        assert_eq!(nodes[0].id, "Disease::DOID:0050742");
        assert_eq!(nodes[0].name, "nicotine dependence");
        assert_eq!(nodes[0].kind, NodeKind::Disease);
        assert_eq!(nodes[4].kind, NodeKind::Other("Side Effect".to_string()));
    }

    #[test]
    fn test_read_edges() {
        let edges = read_edges(EDGES.as_bytes()).unwrap();
        assert_eq!(edges.len(), 3);
        assert_eq!(edges[0].metaedge, Metaedge::CompoundTreatsDisease);
        assert_eq!(edges[2].source, "Anatomy::UBERON:0000955");
        assert_eq!(edges[2].target, "Gene::1136");
    }

    #[test]
    fn test_names_with_quotes_are_kept_verbatim() {
        let input = "id\tname\tkind\nCompound::X\t\"quoted\" name\tCompound\n";
        let nodes = read_nodes(input.as_bytes()).unwrap();
        assert_eq!(nodes[0].name, "\"quoted\" name");
    }

    #[test]
    fn test_field_whitespace_is_kept_headers_trimmed() {
        let input = "id \t name\tkind\nGene::7\t  IL6 \tGene\n";
        let nodes = read_nodes(input.as_bytes()).unwrap();
        assert_eq!(nodes[0].id, "Gene::7");
        assert_eq!(nodes[0].name, "  IL6 ");
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let input = "id\tname\nDisease::1\tflu\n";
        assert!(read_nodes(input.as_bytes()).is_err());
    }

    #[test]
    fn test_read_snapshot_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let nodes_path = dir.path().join("nodes.tsv");
        let edges_path = dir.path().join("edges.tsv");
        std::fs::write(&nodes_path, NODES).unwrap();
        std::fs::write(&edges_path, EDGES).unwrap();

        let snapshot = read_snapshot(&nodes_path, &edges_path).unwrap();
        assert_eq!(snapshot.nodes.len(), 5);
        assert_eq!(snapshot.edges.len(), 3);
    }

    #[test]
    fn test_read_snapshot_reports_path_on_bad_rows() {
        let dir = tempfile::tempdir().unwrap();
        let nodes_path = dir.path().join("nodes.tsv");
        let edges_path = dir.path().join("edges.tsv");
        std::fs::write(&nodes_path, NODES).unwrap();
        std::fs::write(&edges_path, "source\ttarget\nA\tB\n").unwrap();

        let err = read_snapshot(&nodes_path, &edges_path).unwrap_err();
        match err {
            CoreError::Tsv { path, .. } => assert!(path.ends_with("edges.tsv")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
