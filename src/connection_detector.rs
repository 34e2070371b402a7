//! Connection Detector
//!
//! Infers likely join relationships between canvas tables from column names
//! alone. No catalog or live database is consulted; the result is a heuristic
//! guess that the canvas draws as edges.
//!
//! Every unordered pair of tables is compared column by column:
//! 1. Exact (case-insensitive) name match - confidence 1.0, typed by the classifier
//! 2. ID-field match (`customer_id` ~ `id_customer`, `id` ~ `customer_id`) - 0.95, primary-foreign
//! 3. Fuzzy match on normalized Levenshtein similarity - similarity * 0.9, inferred
//!
//! Only matches strictly above the minimum confidence (0.7) become connections.
//! Detection is stateless: callers rerun it whenever the node set changes.

use crate::catalog::TableNode;
use crate::config::DetectorConfig;
use itertools::{iproduct, Itertools};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strsim::levenshtein;
use tracing::debug;
use uuid::Uuid;

lazy_static! {
    static ref ID_SUFFIX: Regex = Regex::new(r"_?id$").unwrap();
    static ref ID_PREFIX: Regex = Regex::new(r"^id_?").unwrap();
}

/// Kind of relationship a connection represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionType {
    /// Primary key on one side, foreign key on the other
    PrimaryForeign,
    /// Both sides look like foreign keys
    ForeignForeign,
    /// Name similarity only
    Inferred,
}

/// An inferred relationship between two tables.
///
/// `source_table` is always the table that came first in the detector input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// Unique within one detection run only
    pub id: String,
    pub source_table: String,
    pub target_table: String,
    pub source_field: String,
    pub target_field: String,
    #[serde(rename = "type")]
    pub connection_type: ConnectionType,
    pub confidence: f64,
}

impl Connection {
    /// True when the connection touches the given table on either end
    pub fn involves(&self, table_id: &str) -> bool {
        self.source_table == table_id || self.target_table == table_id
    }

    /// Same connection ignoring the run-specific id
    pub fn same_link(&self, other: &Connection) -> bool {
        self.source_table == other.source_table
            && self.target_table == other.target_table
            && self.source_field == other.source_field
            && self.target_field == other.target_field
            && self.connection_type == other.connection_type
            && self.confidence == other.confidence
    }
}

/// Scorer output for one pair of field names
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldMatch {
    pub confidence: f64,
    #[serde(rename = "type")]
    pub connection_type: ConnectionType,
}

impl FieldMatch {
    fn none() -> Self {
        Self {
            confidence: 0.0,
            connection_type: ConnectionType::Inferred,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConnectionDetector {
    config: DetectorConfig,
}

impl ConnectionDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Detect connections across all pairs of distinct tables.
    ///
    /// Output order follows discovery: table `i`, then table `j > i`, then
    /// the columns of `i` crossed with the columns of `j`, all in input order.
    /// Fewer than two tables yields an empty list.
    pub fn detect_connections(&self, tables: &[TableNode]) -> Vec<Connection> {
        let mut connections = Vec::new();

        for (table1, table2) in tables.iter().tuple_combinations() {
            let before = connections.len();

            for (col1, col2) in iproduct!(table1.columns.iter(), table2.columns.iter()) {
                let field_match = self.match_fields(col1, col2);
                if field_match.confidence > self.config.min_confidence {
                    connections.push(Connection {
                        id: Uuid::new_v4().to_string(),
                        source_table: table1.id.clone(),
                        target_table: table2.id.clone(),
                        source_field: col1.clone(),
                        target_field: col2.clone(),
                        connection_type: field_match.connection_type,
                        confidence: field_match.confidence,
                    });
                }
            }

            let found = connections.len() - before;
            if found > 0 {
                debug!(
                    "{} connection(s) between '{}' and '{}'",
                    found, table1.id, table2.id
                );
            }
        }

        connections
    }

    /// Score how likely two fields refer to the same key. Case-insensitive.
    ///
    /// The minimum-confidence cut is not applied here; callers decide.
    pub fn match_fields(&self, field1: &str, field2: &str) -> FieldMatch {
        let f1 = field1.to_lowercase();
        let f2 = field2.to_lowercase();

        if f1 == f2 {
            return FieldMatch {
                confidence: 1.0,
                connection_type: determine_connection_type(&f1, &f2),
            };
        }

        if is_id_field(&f1) && is_id_field(&f2) {
            // A bare `id` never shares a base with `customer_id`, so the
            // classifier's primary-foreign shape counts as a match too
            if id_base(&f1) == id_base(&f2)
                || determine_connection_type(&f1, &f2) == ConnectionType::PrimaryForeign
            {
                return FieldMatch {
                    confidence: self.config.id_match_confidence,
                    connection_type: ConnectionType::PrimaryForeign,
                };
            }
        }

        let similarity = string_similarity(&f1, &f2);
        if similarity > self.config.fuzzy_threshold {
            return FieldMatch {
                confidence: similarity * self.config.fuzzy_weight,
                connection_type: ConnectionType::Inferred,
            };
        }

        FieldMatch::none()
    }
}

/// Detect connections with the default scoring constants
pub fn detect_connections(tables: &[TableNode]) -> Vec<Connection> {
    ConnectionDetector::new().detect_connections(tables)
}

/// Score two field names with the default scoring constants
pub fn match_fields(field1: &str, field2: &str) -> FieldMatch {
    ConnectionDetector::new().match_fields(field1, field2)
}

/// A field whose lowercased name contains "id"
pub fn is_id_field(field: &str) -> bool {
    field.to_lowercase().contains("id")
}

/// Strip a trailing `_id`/`id` and then a leading `id_`/`id`
///
/// `customer_id` -> `customer`, `id_customer` -> `customer`, `id` -> ``
pub fn id_base(field: &str) -> String {
    let f = field.to_lowercase();
    let without_suffix = ID_SUFFIX.replace(&f, "");
    ID_PREFIX.replace(&without_suffix, "").into_owned()
}

/// Classify a pair of lowercased field names by key shape.
///
/// The primary-foreign branch needs one side to be exactly `id`, so it never
/// fires for two equal names; the ID-field path relies on it instead.
pub fn determine_connection_type(f1: &str, f2: &str) -> ConnectionType {
    if (f1.ends_with("_id") && f2 == "id") || (f2.ends_with("_id") && f1 == "id") {
        return ConnectionType::PrimaryForeign;
    }

    if f1.ends_with("_id") && f2.ends_with("_id") {
        return ConnectionType::ForeignForeign;
    }

    ConnectionType::Inferred
}

/// `(max_len - levenshtein) / max_len`, 1.0 when both strings are empty
pub fn string_similarity(s1: &str, s2: &str) -> f64 {
    let max_len = s1.chars().count().max(s2.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    (max_len - levenshtein(s1, s2)) as f64 / max_len as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(id: &str, columns: &[&str]) -> TableNode {
        TableNode::new(id, id, columns.iter().map(|c| c.to_string()).collect())
    }

    #[test]
    fn test_exact_match_is_case_insensitive() {
        let m = match_fields("Email", "EMAIL");
        assert_eq!(m.confidence, 1.0);
        assert_eq!(m.connection_type, ConnectionType::Inferred);
    }

    #[test]
    fn test_exact_match_on_foreign_keys() {
        let m = match_fields("customer_id", "Customer_ID");
        assert_eq!(m.confidence, 1.0);
        assert_eq!(m.connection_type, ConnectionType::ForeignForeign);
    }

    #[test]
    fn test_id_base_matches() {
        let m = match_fields("customer_id", "id_customer");
        assert_eq!(m.confidence, 0.95);
        assert_eq!(m.connection_type, ConnectionType::PrimaryForeign);

        let m = match_fields("userid", "user_id");
        assert_eq!(m.confidence, 0.95);
        assert_eq!(m.connection_type, ConnectionType::PrimaryForeign);
    }

    #[test]
    fn test_bare_id_matches_foreign_key() {
        for (a, b) in [("id", "customer_id"), ("customer_id", "id"), ("ID", "a_id")] {
            let m = match_fields(a, b);
            assert_eq!(m.confidence, 0.95, "{} vs {}", a, b);
            assert_eq!(m.connection_type, ConnectionType::PrimaryForeign);
        }
    }

    #[test]
    fn test_different_foreign_keys_fall_through_to_fuzzy() {
        let similarity = string_similarity("customer_id", "product_id");
        assert!(similarity <= 0.8);
        let m = match_fields("customer_id", "product_id");
        assert_eq!(m.confidence, 0.0);
        assert_eq!(m.connection_type, ConnectionType::Inferred);

        let similarity = string_similarity("order_id", "orders_id");
        assert!(similarity > 0.8);
        let m = match_fields("order_id", "orders_id");
        assert_eq!(m.confidence, similarity * 0.9);
        assert_eq!(m.connection_type, ConnectionType::Inferred);
    }

    #[test]
    fn test_fuzzy_confidence_uses_exact_ratio() {
        assert_eq!(string_similarity("account", "acount"), 6.0 / 7.0);
        assert_eq!(match_fields("account", "acount").confidence, 6.0 / 7.0 * 0.9);
        assert_eq!(string_similarity("shipping_address", "shiping_adress"), 14.0 / 16.0);
    }

    #[test]
    fn test_similarity_edges() {
        assert_eq!(string_similarity("", ""), 1.0);
        assert_eq!(string_similarity("name", "nme"), 0.75);
        assert_eq!(string_similarity("abc", ""), 0.0);
        assert_eq!(match_fields("name", "nme").confidence, 0.0);
    }

    #[test]
    fn test_id_base_and_id_field() {
        assert_eq!(id_base("customer_id"), "customer");
        assert_eq!(id_base("id_customer"), "customer");
        assert_eq!(id_base("CustomerID"), "customer");
        assert_eq!(id_base("id"), "");
        assert!(is_id_field("Valid"));
        assert!(!is_id_field("name"));
    }

    #[test]
    fn test_classifier_branches() {
        assert_eq!(determine_connection_type("order_id", "id"), ConnectionType::PrimaryForeign);
        assert_eq!(determine_connection_type("id", "order_id"), ConnectionType::PrimaryForeign);
        assert_eq!(determine_connection_type("id", "id"), ConnectionType::Inferred);
        assert_eq!(
            determine_connection_type("order_id", "order_id"),
            ConnectionType::ForeignForeign
        );
        assert_eq!(determine_connection_type("name", "name"), ConnectionType::Inferred);
    }

    #[test]
    fn test_detect_orders_by_discovery() {
        let tables = vec![
            table("a", &["id", "email"]),
            table("b", &["a_id", "email"]),
            table("c", &["email"]),
        ];
        let connections = detect_connections(&tables);
        let links: Vec<(&str, &str, &str, &str)> = connections
            .iter()
            .map(|c| {
                (
                    c.source_table.as_str(),
                    c.target_table.as_str(),
                    c.source_field.as_str(),
                    c.target_field.as_str(),
                )
            })
            .collect();
        assert_eq!(
            links,
            vec![
                ("a", "b", "id", "a_id"),
                ("a", "b", "email", "email"),
                ("a", "c", "email", "email"),
                ("b", "c", "email", "email"),
            ]
        );
    }

    #[test]
    fn test_custom_min_confidence() {
        let config = DetectorConfig::default().with_min_confidence(0.96).unwrap();
        let detector = ConnectionDetector::with_config(config);
        let tables = vec![table("a", &["id", "email"]), table("b", &["a_id", "email"])];
        let connections = detector.detect_connections(&tables);
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].source_field, "email");
    }

    #[test]
    fn test_connection_json_shape() {
        let tables = vec![table("a", &["customer_id"]), table("b", &["customer_id"])];
        let connection = &detect_connections(&tables)[0];
        let json = serde_json::to_value(connection).unwrap();
        assert_eq!(json["sourceTable"], "a");
        assert_eq!(json["targetField"], "customer_id");
        assert_eq!(json["type"], "foreign-foreign");
        assert_eq!(json["confidence"], 1.0);
    }
}
