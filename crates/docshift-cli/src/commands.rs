//! Subcommand execution.

use crate::config::{Args, Command, PlanArgs};
use crate::error::CliError;
use crate::formatter::{create_formatter, Formatter};
use crate::loader::{load_choices, load_tables};
use docshift_core::{ChoiceSet, MigrationPlanner, PlannerConfig};
use std::path::Path;

/// Run the parsed command and return the text to print.
pub fn run(args: Args) -> Result<String, CliError> {
    let formatter = create_formatter(args.format);

    match &args.command {
        Command::Analyze { schema } => analyze(schema, &*formatter),
        Command::Plan(plan_args) => plan(plan_args, &*formatter),
    }
}

fn analyze(schema: &Path, formatter: &dyn Formatter) -> Result<String, CliError> {
    let tables = load_tables(schema)?;
    let planner = MigrationPlanner::new(tables, PlannerConfig::default());
    Ok(formatter.format_analysis(&planner.analyze()))
}

fn plan(args: &PlanArgs, formatter: &dyn Formatter) -> Result<String, CliError> {
    let tables = load_tables(&args.schema)?;
    let choices = match &args.choices {
        Some(path) => load_choices(path)?,
        None => ChoiceSet::new(),
    };

    let planner = MigrationPlanner::new(tables, args.to_config());
    let plan = planner.plan(&choices)?;
    Ok(formatter.format_plan(&plan))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::OutputFormat;
    use clap::Parser;
    use std::io::Write;

    const SCHEMA: &str = r#"[
        {"name": "a", "foreign_keys": [{"name": "a_b", "columns": ["b_id"],
                                        "referenced_table": "b", "referenced_columns": ["id"]}]},
        {"name": "b", "foreign_keys": [{"name": "b_a", "columns": ["a_id"],
                                        "referenced_table": "a", "referenced_columns": ["id"]}]},
        {"name": "c", "foreign_keys": [{"name": "c_a", "columns": ["a_id"],
                                        "referenced_table": "a", "referenced_columns": ["id"]}]}
    ]"#;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn run_with(argv: &[&str]) -> Result<String, CliError> {
        run(Args::try_parse_from(argv).unwrap())
    }

    #[test]
    fn test_analyze_reports_cycle() {
        let schema = write_temp(SCHEMA);
        let path = schema.path().to_str().unwrap();

        let output = run_with(&["docshift", "analyze", "--schema", path, "--format", "json"]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["cycles"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_plan_with_choices_breaks_cycle() {
        let schema = write_temp(SCHEMA);
        let choices = write_temp(
            r#"[{"child": "a", "parent": "b", "constraint": "a_b", "choice": "embed_array"},
                {"child": "b", "parent": "a", "constraint": "b_a", "choice": "embed_array"}]"#,
        );

        let output = run_with(&[
            "docshift",
            "plan",
            "--schema",
            schema.path().to_str().unwrap(),
            "--choices",
            choices.path().to_str().unwrap(),
            "--format",
            "json",
        ])
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert!(!value["warnings"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_unknown_root_is_an_error() {
        let schema = write_temp(SCHEMA);
        let err = run_with(&[
            "docshift",
            "plan",
            "--schema",
            schema.path().to_str().unwrap(),
            "--root",
            "missing",
        ])
        .unwrap_err();

        assert!(matches!(err, CliError::Core(_)));
    }

    #[test]
    fn test_table_output_is_default() {
        let args = Args::try_parse_from(["docshift", "analyze", "--schema", "x.json"]).unwrap();
        assert_eq!(args.format, OutputFormat::Table);
    }
}
