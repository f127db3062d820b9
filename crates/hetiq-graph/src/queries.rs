//! Read operations: pattern execution against Neo4j.

use async_trait::async_trait;
use neo4rs::query;

use crate::client::{GraphClient, GraphError};
use crate::pattern::{ColumnValue, PatternExecutor, PatternQuery, PatternRow, Projection};

#[async_trait]
impl PatternExecutor for GraphClient {
    async fn execute(&self, pattern: &PatternQuery) -> Result<Vec<PatternRow>, GraphError> {
        let cypher = pattern.to_cypher()?;
        tracing::trace!(cypher = %cypher.text, "Executing pattern");

        let mut q = query(&cypher.text);
        for (name, value) in cypher.params {
            q = q.param(&name, value);
        }

        let rows = self.query_rows(q).await?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            results.push(neo4j_row_to_pattern_row(&row, &pattern.returns)?);
        }
        Ok(results)
    }
}

/// Convert a neo4rs::Row into a PatternRow according to the projections.
fn neo4j_row_to_pattern_row(
    row: &neo4rs::Row,
    projections: &[Projection],
) -> Result<PatternRow, GraphError> {
    let mut out = PatternRow::default();
    for projection in projections {
        match projection {
            // A null name (unbound variable) fails to decode as String.
            Projection::Name { alias, .. } => {
                out.insert(alias, ColumnValue::Text(row.get::<String>(alias).ok()));
            }
            Projection::DistinctNames { alias, .. } => {
                let names: Vec<String> = row.get(alias).map_err(|e| {
                    GraphError::Serialization(format!("Failed to read column {alias}: {e}"))
                })?;
                out.insert(alias, ColumnValue::Names(names.into_iter().collect()));
            }
        }
    }
    Ok(out)
}
