//! Detection Report
//!
//! Bundles one detection run with what the canvas needs to style and look up
//! edges: a timestamp, counts per connection type, and per-table lookups.

use crate::catalog::TableNode;
use crate::connection_detector::{Connection, ConnectionDetector, ConnectionType};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSummary {
    pub primary_foreign: usize,
    pub foreign_foreign: usize,
    pub inferred: usize,
}

impl ConnectionSummary {
    pub fn from_connections(connections: &[Connection]) -> Self {
        let mut summary = Self::default();
        for connection in connections {
            match connection.connection_type {
                ConnectionType::PrimaryForeign => summary.primary_foreign += 1,
                ConnectionType::ForeignForeign => summary.foreign_foreign += 1,
                ConnectionType::Inferred => summary.inferred += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.primary_foreign + self.foreign_foreign + self.inferred
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    pub generated_at: DateTime<Utc>,
    pub table_count: usize,
    pub connections: Vec<Connection>,
    pub summary: ConnectionSummary,
}

impl DetectionReport {
    /// Run the detector over `tables` and wrap the result
    pub fn build(detector: &ConnectionDetector, tables: &[TableNode]) -> Self {
        let connections = detector.detect_connections(tables);
        let summary = ConnectionSummary::from_connections(&connections);
        Self {
            generated_at: Utc::now(),
            table_count: tables.len(),
            connections,
            summary,
        }
    }

    /// Connections with `table_id` on either end, in detection order
    pub fn connections_for_table<'a>(
        &'a self,
        table_id: &'a str,
    ) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.iter().filter(move |c| c.involves(table_id))
    }

    /// Connections linking `a` and `b`, whichever of them came first
    pub fn connections_between<'a>(
        &'a self,
        a: &'a str,
        b: &'a str,
    ) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.iter().filter(move |c| {
            (c.source_table == a && c.target_table == b)
                || (c.source_table == b && c.target_table == a)
        })
    }
}
