//! Command-line arguments and their mapping to planner configuration.

use crate::formatter::OutputFormat;
use clap::{Parser, Subcommand};
use docshift_core::sizing::DEFAULT_MAX_DOCUMENT_BYTES;
use docshift_core::{PlannerConfig, SizeEstimatorConfig};
use std::path::PathBuf;

/// Default document size limit in megabytes.
pub const DEFAULT_MAX_DOCUMENT_MB: u64 = DEFAULT_MAX_DOCUMENT_BYTES / (1024 * 1024);

/// docshift - plan relational to document migrations
#[derive(Parser, Debug)]
#[command(name = "docshift")]
#[command(version, about = "Plan relational to document migrations", long_about = None)]
pub struct Args {
    /// What to do.
    #[command(subcommand)]
    pub command: Command,

    /// Output format
    #[arg(long, default_value = "table", value_enum, global = true)]
    pub format: OutputFormat,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report self-references, cycles, join tables and orphaned references.
    Analyze {
        /// Schema file (JSON array of tables).
        #[arg(short, long)]
        schema: PathBuf,
    },

    /// Build a mapping, size estimates and index plan.
    Plan(PlanArgs),
}

/// Arguments of the `plan` subcommand.
#[derive(clap::Args, Debug)]
pub struct PlanArgs {
    /// Schema file (JSON array of tables).
    #[arg(short, long)]
    pub schema: PathBuf,

    /// Relationship choices file (JSON array of {child, parent, constraint, choice}).
    #[arg(short, long)]
    pub choices: Option<PathBuf>,

    /// Root table; repeat to supply several. Disables root detection.
    #[arg(long = "root")]
    pub roots: Vec<String>,

    /// Suggest embeddings from row counts for relationships without a choice.
    #[arg(long)]
    pub auto: bool,

    /// Maximum document size in megabytes.
    #[arg(long, default_value_t = DEFAULT_MAX_DOCUMENT_MB)]
    pub max_document_mb: u64,
}

impl PlanArgs {
    /// Convert command-line arguments to planner configuration.
    pub fn to_config(&self) -> PlannerConfig {
        let size = SizeEstimatorConfig::default()
            .with_max_document_bytes(self.max_document_mb.saturating_mul(1024 * 1024));

        let mut config = PlannerConfig::default().with_size_config(size);
        if !self.roots.is_empty() {
            config = config.with_roots(self.roots.iter().cloned());
        }
        if self.auto {
            config = config.with_auto_suggest();
        }
        config
    }
}
