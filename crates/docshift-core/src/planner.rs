//! Migration planner: graph analysis, denormalization, sizing and indexing
//! in one pass over a table set.

use crate::error::Error;
use crate::graph::{nesting_depth, EdgeKey, JoinTable, RelationshipGraph};
use crate::index::{IndexInference, IndexPlan};
use crate::mapping::{suggest_choices, ChoiceSet, DenormalizationEngine, Mapping};
use crate::schema::{orphaned_references, OrphanedReference, Table};
use crate::sizing::{CollectionSizeEstimate, DocumentSizeEstimator, SizeEstimatorConfig};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Planner configuration.
#[derive(Debug, Clone, Default)]
pub struct PlannerConfig {
    /// Size estimation settings.
    pub size: SizeEstimatorConfig,

    /// Explicit root tables. None means roots are detected automatically.
    pub roots: Option<Vec<String>>,

    /// Fill edges the caller left undecided with the 1:1 / 1:N suggestion
    /// instead of treating them as references.
    pub auto_suggest: bool,
}

impl PlannerConfig {
    /// Set the size estimation settings.
    pub fn with_size_config(mut self, size: SizeEstimatorConfig) -> Self {
        self.size = size;
        self
    }

    /// Use only these tables as collection roots.
    pub fn with_roots(mut self, roots: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.roots = Some(roots.into_iter().map(Into::into).collect());
        self
    }

    /// Suggest choices for undecided edges.
    pub fn with_auto_suggest(mut self) -> Self {
        self.auto_suggest = true;
        self
    }
}

/// Structural findings about the foreign-key graph.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GraphAnalysis {
    /// Self-referencing foreign keys.
    pub self_references: Vec<EdgeKey>,
    /// Foreign-key cycles, as ordered table names.
    pub cycles: Vec<Vec<String>>,
    /// Probable many-to-many join tables.
    pub join_tables: Vec<JoinTable>,
    /// Foreign keys pointing outside the table set.
    pub orphaned_references: Vec<OrphanedReference>,
}

/// A complete migration plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationPlan {
    /// Target document model.
    pub mapping: Mapping,
    /// Choices applied, after cycle enforcement.
    pub choices: ChoiceSet,
    /// Adjustments and size warnings for the operator.
    pub warnings: Vec<String>,
    /// Per-collection document size estimates.
    pub size_estimates: Vec<CollectionSizeEstimate>,
    /// Target indexes.
    pub index_plan: IndexPlan,
    /// Deepest embedding chain in the mapping.
    pub nesting_depth: usize,
}

impl MigrationPlan {
    /// Collections whose worst-case document exceeds the size limit.
    pub fn oversized(&self) -> impl Iterator<Item = &CollectionSizeEstimate> {
        self.size_estimates.iter().filter(|e| e.exceeds_limit)
    }
}

/// Plans a relational-to-document migration for a fixed table set.
pub struct MigrationPlanner {
    tables: Vec<Table>,
    graph: RelationshipGraph,
    config: PlannerConfig,
}

impl MigrationPlanner {
    /// Create a planner; builds the relationship graph once.
    pub fn new(tables: Vec<Table>, config: PlannerConfig) -> Self {
        let graph = RelationshipGraph::new(&tables);
        Self {
            tables,
            graph,
            config,
        }
    }

    /// Source tables.
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Relationship graph over the source tables.
    pub fn graph(&self) -> &RelationshipGraph {
        &self.graph
    }

    /// Planner configuration.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Analyze the foreign-key graph.
    #[instrument(skip(self), fields(tables = self.tables.len()))]
    pub fn analyze(&self) -> GraphAnalysis {
        let analysis = GraphAnalysis {
            self_references: self.graph.self_references().iter().map(|e| e.key()).collect(),
            cycles: self.graph.detect_cycles(),
            join_tables: self.graph.join_tables(&self.tables),
            orphaned_references: orphaned_references(&self.tables),
        };

        info!(
            edges = self.graph.edges().len(),
            self_references = analysis.self_references.len(),
            cycles = analysis.cycles.len(),
            join_tables = analysis.join_tables.len(),
            orphaned_references = analysis.orphaned_references.len(),
            "relationship analysis complete"
        );
        analysis
    }

    /// Suggested embedding for every edge, from row-count ratios.
    pub fn suggest_choices(&self) -> ChoiceSet {
        suggest_choices(&self.graph, &self.tables)
    }

    /// Build the full plan from the caller's choices.
    ///
    /// Fails only when an explicit root names a table outside the schema.
    #[instrument(skip_all, fields(tables = self.tables.len(), choices = choices.len()))]
    pub fn plan(&self, choices: &ChoiceSet) -> Result<MigrationPlan, Error> {
        let mut engine = DenormalizationEngine::new(&self.graph);
        if let Some(roots) = &self.config.roots {
            if let Some(unknown) = roots.iter().find(|r| !self.graph.contains_table(r)) {
                return Err(Error::UnknownTable(unknown.clone()));
            }
            engine = engine.with_roots(roots.iter().cloned());
        }

        let effective = if self.config.auto_suggest {
            let mut merged = self.suggest_choices();
            for (key, choice) in choices.iter() {
                merged.set(key.clone(), choice);
            }
            merged
        } else {
            choices.clone()
        };

        let denormalized = engine.denormalize(&effective);
        debug_assert!(denormalized.mapping.verify().is_ok());

        let size_estimates =
            DocumentSizeEstimator::new(&self.tables, self.config.size.clone()).estimate(&denormalized.mapping);
        let index_plan = IndexInference::new(&self.tables).infer(&denormalized.mapping);
        let depth = nesting_depth(&denormalized.mapping.embed_parents());

        let mut warnings = denormalized.warnings;
        warnings.extend(size_estimates.iter().filter_map(|e| e.warning.clone()));

        info!(
            collections = denormalized.mapping.collections.len(),
            indexes = index_plan.len(),
            nesting_depth = depth,
            warnings = warnings.len(),
            "migration plan ready"
        );

        Ok(MigrationPlan {
            mapping: denormalized.mapping,
            choices: denormalized.choices,
            warnings,
            size_estimates,
            index_plan,
            nesting_depth: depth,
        })
    }
}
