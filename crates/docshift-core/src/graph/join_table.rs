//! Many-to-many join table heuristic.

use super::RelationshipGraph;
use crate::schema::Table;
use serde::{Deserialize, Serialize};

/// Maximum number of payload columns (not part of either foreign key) a
/// join table may carry, e.g. a `created_at` and a `role`.
const MAX_PAYLOAD_COLUMNS: usize = 2;

/// One side of a many-to-many association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinSide {
    /// Referenced table.
    pub table: String,
    /// Join table columns referencing it.
    pub columns: Vec<String>,
}

/// A table recognized as a many-to-many association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinTable {
    /// The association table itself.
    pub table: String,
    /// First referenced table, in foreign-key order.
    pub left: JoinSide,
    /// Second referenced table.
    pub right: JoinSide,
}

/// Decide whether `table` is a many-to-many join table.
///
/// This is a heuristic, not a guarantee. A table qualifies when:
/// - it owns exactly two foreign keys inside the graph,
/// - no other table references it,
/// - at most two of its columns belong to neither foreign key.
///
/// Join tables that carry richer payloads are missed, and nothing else
/// guards against false positives.
pub fn detect_join_table(table: &Table, graph: &RelationshipGraph) -> Option<JoinTable> {
    let outgoing: Vec<_> = graph.outgoing(&table.name).collect();
    if outgoing.len() != 2 {
        return None;
    }

    if graph.incoming(&table.name).next().is_some() {
        return None;
    }

    let keys: Vec<_> = table
        .foreign_keys
        .iter()
        .filter(|fk| outgoing.iter().any(|e| e.constraint == fk.name))
        .collect();
    let payload = table
        .columns
        .iter()
        .filter(|c| !keys.iter().any(|fk| fk.contains_column(&c.name)))
        .count();
    if payload > MAX_PAYLOAD_COLUMNS {
        return None;
    }

    let side = |i: usize| JoinSide {
        table: outgoing[i].parent_table.clone(),
        columns: outgoing[i].child_columns.clone(),
    };

    Some(JoinTable {
        table: table.name.clone(),
        left: side(0),
        right: side(1),
    })
}

impl RelationshipGraph {
    /// Identify many-to-many join tables among `tables`.
    ///
    /// `tables` should be the set the graph was built from.
    pub fn join_tables(&self, tables: &[Table]) -> Vec<JoinTable> {
        tables
            .iter()
            .filter_map(|t| detect_join_table(t, self))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, ForeignKey};

    fn school() -> Vec<Table> {
        vec![
            Table::new("students").with_column(Column::new("id", "int")),
            Table::new("courses").with_column(Column::new("id", "int")),
            Table::new("enrollments")
                .with_column(Column::new("student_id", "int"))
                .with_column(Column::new("course_id", "int"))
                .with_column(Column::new("enrolled_at", "timestamp"))
                .with_foreign_key(ForeignKey::new("enr_student", "student_id", "students", "id"))
                .with_foreign_key(ForeignKey::new("enr_course", "course_id", "courses", "id")),
        ]
    }

    #[test]
    fn test_detect_join_table() {
        let tables = school();
        let graph = RelationshipGraph::new(&tables);

        let joins = graph.join_tables(&tables);
        assert_eq!(joins.len(), 1);
        assert_eq!(joins[0].table, "enrollments");
        assert_eq!(joins[0].left.table, "students");
        assert_eq!(joins[0].left.columns, vec!["student_id"]);
        assert_eq!(joins[0].right.table, "courses");
    }

    #[test]
    fn test_too_many_payload_columns() {
        let mut tables = school();
        tables[2] = tables[2]
            .clone()
            .with_column(Column::new("grade", "varchar(2)"))
            .with_column(Column::new("notes", "text"));
        let graph = RelationshipGraph::new(&tables);

        assert!(graph.join_tables(&tables).is_empty());
    }

    #[test]
    fn test_referenced_table_is_not_join_table() {
        let mut tables = school();
        tables.push(
            Table::new("attendance")
                .with_column(Column::new("enrollment_id", "int"))
                .with_foreign_key(ForeignKey::new(
                    "att_enrollment",
                    "enrollment_id",
                    "enrollments",
                    "id",
                )),
        );
        let graph = RelationshipGraph::new(&tables);

        assert!(graph.join_tables(&tables).is_empty());
    }

    #[test]
    fn test_composite_key_columns_are_not_payload() {
        let tables = vec![
            Table::new("students"),
            Table::new("sections"),
            Table::new("seats")
                .with_column(Column::new("student_id", "int"))
                .with_column(Column::new("course_id", "int"))
                .with_column(Column::new("term", "varchar(8)"))
                .with_column(Column::new("row", "int"))
                .with_column(Column::new("number", "int"))
                .with_foreign_key(ForeignKey::new("seat_student", "student_id", "students", "id"))
                .with_foreign_key(ForeignKey::composite(
                    "seat_section",
                    ["course_id", "term"],
                    "sections",
                    ["course_id", "term"],
                )),
        ];
        let graph = RelationshipGraph::new(&tables);

        let joins = graph.join_tables(&tables);
        assert_eq!(joins.len(), 1);
        assert_eq!(joins[0].right.columns, vec!["course_id", "term"]);
    }

    #[test]
    fn test_single_foreign_key_is_not_join_table() {
        let tables = vec![
            Table::new("users"),
            Table::new("sessions")
                .with_foreign_key(ForeignKey::new("sess_user", "user_id", "users", "id")),
        ];
        let graph = RelationshipGraph::new(&tables);
        assert!(graph.join_tables(&tables).is_empty());
    }
}
