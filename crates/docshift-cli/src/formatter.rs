//! Output formatters for analysis reports and plans.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use docshift_core::{Embedded, GraphAnalysis, MigrationPlan, RelationshipKind};

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Trait for formatting output.
pub trait Formatter {
    /// Format a relationship analysis.
    fn format_analysis(&self, analysis: &GraphAnalysis) -> String;

    /// Format a migration plan.
    fn format_plan(&self, plan: &MigrationPlan) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_analysis(&self, analysis: &GraphAnalysis) -> String {
        let mut sections = Vec::new();

        let mut table = Table::new();
        table.set_header(vec!["Self-reference", "Constraint"]);
        for key in &analysis.self_references {
            table.add_row(vec![&key.child, &key.constraint]);
        }
        sections.push(section("Self-references", analysis.self_references.is_empty(), table));

        let mut table = Table::new();
        table.set_header(vec!["#", "Cycle"]);
        for (i, cycle) in analysis.cycles.iter().enumerate() {
            table.add_row(vec![Cell::new(i + 1), Cell::new(cycle.join(" -> "))]);
        }
        sections.push(section("Foreign-key cycles", analysis.cycles.is_empty(), table));

        let mut table = Table::new();
        table.set_header(vec!["Join table", "Left", "Right"]);
        for join in &analysis.join_tables {
            table.add_row(vec![
                join.table.clone(),
                format!("{} ({})", join.left.table, join.left.columns.join(", ")),
                format!("{} ({})", join.right.table, join.right.columns.join(", ")),
            ]);
        }
        sections.push(section("Join tables", analysis.join_tables.is_empty(), table));

        let mut table = Table::new();
        table.set_header(vec!["Table", "Constraint", "Missing table"]);
        for orphan in &analysis.orphaned_references {
            table.add_row(vec![&orphan.table, &orphan.constraint, &orphan.referenced_table]);
        }
        sections.push(section(
            "Orphaned references",
            analysis.orphaned_references.is_empty(),
            table,
        ));

        sections.join("\n\n")
    }

    fn format_plan(&self, plan: &MigrationPlan) -> String {
        let mut sections = Vec::new();

        let mut table = Table::new();
        table.set_header(vec![
            "Collection",
            "Embedded",
            "References",
            "Avg size",
            "Max size",
            "Over limit",
        ]);
        for collection in &plan.mapping.collections {
            let estimate = plan
                .size_estimates
                .iter()
                .find(|e| e.collection == collection.name);
            let mut embedded = Vec::new();
            describe_embedded(&collection.embedded, "", &mut embedded);
            let references: Vec<&str> = collection
                .references
                .iter()
                .map(|r| r.source_table.as_str())
                .collect();

            table.add_row(vec![
                Cell::new(&collection.name),
                Cell::new(embedded.join("\n")),
                Cell::new(references.join(", ")),
                Cell::new(estimate.map(|e| format_bytes(e.avg_document_bytes)).unwrap_or_default()),
                Cell::new(estimate.map(|e| format_bytes(e.max_document_bytes)).unwrap_or_default()),
                Cell::new(if estimate.is_some_and(|e| e.exceeds_limit) { "yes" } else { "no" }),
            ]);
        }
        sections.push(section("Collections", plan.mapping.collections.is_empty(), table));

        let mut table = Table::new();
        table.set_header(vec!["Collection", "Keys", "Unique", "Reason"]);
        for (ci, reason) in plan
            .index_plan
            .indexes
            .iter()
            .zip(&plan.index_plan.explanations)
        {
            let keys: Vec<String> = ci
                .index
                .keys
                .iter()
                .map(|k| format!("{}: {}", k.field, k.order))
                .collect();
            table.add_row(vec![
                Cell::new(&ci.collection),
                Cell::new(keys.join(", ")),
                Cell::new(if ci.index.unique { "yes" } else { "no" }),
                Cell::new(reason),
            ]);
        }
        sections.push(section("Indexes", plan.index_plan.is_empty(), table));

        let mut summary = format!("Maximum nesting depth: {}", plan.nesting_depth);
        if !plan.warnings.is_empty() {
            summary.push_str("\n\nWarnings:");
            for warning in &plan.warnings {
                summary.push_str(&format!("\n  - {}", warning));
            }
        }
        sections.push(summary);

        sections.join("\n\n")
    }
}

fn section(title: &str, empty: bool, table: Table) -> String {
    if empty {
        format!("{}: none", title)
    } else {
        format!("{}\n{}", title, table)
    }
}

fn describe_embedded(entries: &[Embedded], prefix: &str, out: &mut Vec<String>) {
    for entry in entries {
        let path = if prefix.is_empty() {
            entry.field_name.clone()
        } else {
            format!("{}.{}", prefix, entry.field_name)
        };
        let marker = match entry.kind {
            RelationshipKind::Array => "[]",
            RelationshipKind::Single => "",
        };
        out.push(format!("{}{} ({})", path, marker, entry.source_table));
        describe_embedded(&entry.embedded, &path, out);
    }
}

fn format_bytes(bytes: f64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut value = bytes;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{:.0} {}", value, UNITS[unit])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_analysis(&self, analysis: &GraphAnalysis) -> String {
        serde_json::to_string_pretty(analysis).unwrap_or_else(|_| "{}".to_string())
    }

    fn format_plan(&self, plan: &MigrationPlan) -> String {
        serde_json::to_string_pretty(plan).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docshift_core::schema::ForeignKey;
    use docshift_core::{ChoiceSet, MigrationPlanner, PlannerConfig};

    fn planner() -> MigrationPlanner {
        let tables = vec![
            docshift_core::Table::new("customers").with_stats(10, 1_000),
            docshift_core::Table::new("orders")
                .with_stats(100, 5_000)
                .with_foreign_key(ForeignKey::new("fk_customer", "customer_id", "customers", "id")),
            docshift_core::Table::new("employees")
                .with_foreign_key(ForeignKey::new("fk_manager", "manager_id", "employees", "id")),
        ];
        MigrationPlanner::new(tables, PlannerConfig::default().with_auto_suggest())
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512.0), "512 B");
        assert_eq!(format_bytes(2048.0), "2.0 KiB");
        assert_eq!(format_bytes(16.0 * 1024.0 * 1024.0), "16.0 MiB");
    }

    #[test]
    fn test_table_analysis() {
        let output = TableFormatter.format_analysis(&planner().analyze());

        assert!(output.contains("Self-references"));
        assert!(output.contains("fk_manager"));
        assert!(output.contains("Foreign-key cycles: none"));
        assert!(output.contains("Join tables: none"));
    }

    #[test]
    fn test_table_plan() {
        let plan = planner().plan(&ChoiceSet::new()).unwrap();
        let output = TableFormatter.format_plan(&plan);

        assert!(output.contains("orders[] (orders)"));
        assert!(output.contains("orders.customer_id"));
        assert!(output.contains("Maximum nesting depth: 1"));
    }

    #[test]
    fn test_json_plan() {
        let plan = planner().plan(&ChoiceSet::new()).unwrap();
        let output = JsonFormatter.format_plan(&plan);

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["nesting_depth"], 1);
        assert_eq!(value["mapping"]["collections"][0]["name"], "customers");
    }
}
