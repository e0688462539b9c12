//! # Validation Procedure
//!
//! The fixed end-to-end check the `run` subcommand performs:
//!
//! 1. obtain a parser from the supplied factory;
//! 2. add the main and library schema sources;
//! 3. build the schema context;
//! 4. look up the target module and data-tree node;
//! 5. build the sample document `cont/cont2/list1[name='sample name']`;
//! 6. write it into a fresh data tree, then validate, prepare, and commit;
//! 7. snapshot the result.
//!
//! The parser factory is a parameter, so tests and embedders choose the
//! implementation.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;
use yangkit_core::{PathArgument, QName, Revision, YangInstanceIdentifier};
use yangkit_data::{
    ContainerNodeBuilder, DataTreeConfiguration, DataTreeSnapshot, InMemoryDataTree, MapEntryNodeBuilder,
    MapNodeBuilder, NormalizedNode,
};
use yangkit_model::{Module, SchemaContext};
use yangkit_parser::{DefaultYangParserFactory, YangParser, YangParserFactory, YangTextSchemaSource};

use crate::config::ValidatorConfig;

/// Key value of the sample list entry.
pub const SAMPLE_ENTRY_NAME: &str = "sample name";

/// Arguments for `yangkit run`.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Print the committed data tree as JSON.
    #[arg(long)]
    pub dump: bool,
}

/// What the procedure found and produced.
#[derive(Debug)]
pub struct ProcedureReport {
    /// The linked schema.
    pub schema: Arc<SchemaContext>,
    /// Name of the target module.
    pub module_name: String,
    /// Revision of the target module.
    pub module_revision: Option<Revision>,
    /// Keyword and name of the looked-up node, e.g. `leaf foo`.
    pub target_node: String,
    /// Augmentations the target module declares.
    pub augmentations: usize,
    /// Groupings the target module declares.
    pub groupings: usize,
    /// RPCs the target module declares.
    pub rpcs: usize,
    /// The tree before the commit.
    pub before: DataTreeSnapshot,
    /// The tree after the commit.
    pub after: DataTreeSnapshot,
}

/// Build the sample document: `cont` holding `cont2` holding list
/// `list1` with one entry keyed by `name`.
pub fn sample_document(module: &Module) -> Result<NormalizedNode> {
    let q = |name: &str| module.qname(name).with_context(|| format!("invalid node name '{name}'"));
    let entry = MapEntryNodeBuilder::new()
        .with_node_identifier(PathArgument::with_predicate(q("list1")?, q("name")?, SAMPLE_ENTRY_NAME))
        .with_child(NormalizedNode::leaf(q("name")?, SAMPLE_ENTRY_NAME))
        .build()?;
    let list = MapNodeBuilder::new()
        .with_node_identifier(q("list1")?)
        .with_child(entry)
        .build()?;
    let cont2 = ContainerNodeBuilder::new()
        .with_node_identifier(q("cont2")?)
        .with_child(list)
        .build()?;
    let cont = ContainerNodeBuilder::new()
        .with_node_identifier(q("cont")?)
        .with_child(cont2)
        .build()?;
    Ok(cont)
}

/// Path of the sample entry's key leaf.
pub fn sample_leaf_path(module: &Module) -> Result<YangInstanceIdentifier> {
    let q = |name: &str| module.qname(name).with_context(|| format!("invalid node name '{name}'"));
    Ok(YangInstanceIdentifier::of(q("cont")?)
        .node(q("cont2")?)
        .node(q("list1")?)
        .node(PathArgument::with_predicate(q("list1")?, q("name")?, SAMPLE_ENTRY_NAME))
        .node(q("name")?))
}

fn build_context<F: YangParserFactory>(
    factory: &F,
    config: &ValidatorConfig,
    resource_root: &Path,
) -> Result<SchemaContext> {
    let mut parser = factory.create_parser();
    for path in &config.main_sources {
        let source = YangTextSchemaSource::for_resource(resource_root, path)
            .with_context(|| format!("loading main source {path}"))?;
        parser.add_source(&source)?;
    }
    for path in &config.lib_sources {
        let source = YangTextSchemaSource::for_resource(resource_root, path)
            .with_context(|| format!("loading library source {path}"))?;
        parser.add_lib_source(&source)?;
    }
    if let Some(features) = &config.supported_features {
        parser.set_supported_features(features.clone());
    }
    parser.build_schema_context().context("building schema context")
}

/// Run the procedure with `factory`, reading sources below `resource_root`.
pub fn run_procedure<F: YangParserFactory>(
    factory: &F,
    config: &ValidatorConfig,
    resource_root: &Path,
) -> Result<ProcedureReport> {
    let schema = Arc::new(build_context(factory, config, resource_root)?);
    info!(modules = schema.modules().len(), "schema context built");

    let module = schema
        .find_module(&config.target_module, config.revision()?)
        .with_context(|| {
            format!(
                "module {}@{} not found in schema context",
                config.target_module,
                config.target_revision.as_deref().unwrap_or("latest")
            )
        })?;
    let node_path: Vec<QName> = config
        .target_segments()
        .into_iter()
        .map(|s| module.qname(s).with_context(|| format!("invalid node name '{s}'")))
        .collect::<Result<_>>()?;
    let node = schema
        .find_data_tree_child(&node_path)
        .with_context(|| format!("node {} not found in {}", config.target_node, module.name()))?;
    let target_node = format!("{} {}", node.kind(), node.qname().local_name());
    info!(
        module = module.name(),
        revision = ?module.revision().map(|r| r.to_string()),
        node = %target_node,
        augmentations = module.augmentations().len(),
        groupings = module.groupings().len(),
        rpcs = module.rpcs().len(),
        "target module inspected"
    );

    let document = sample_document(module)?;
    let cont_path = YangInstanceIdentifier::of(document.node_type().clone());

    let tree = InMemoryDataTree::new(DataTreeConfiguration::default().with_tree_type(config.tree_type));
    tree.set_schema_context(Arc::clone(&schema));
    let before = tree.take_snapshot();

    let mut modification = tree.take_snapshot().new_modification();
    modification.write(&cont_path, document)?;
    let modification = modification.ready();
    tree.validate(&modification).context("validating sample document")?;
    let candidate = tree.prepare(modification).context("preparing candidate")?;
    tree.commit(candidate).context("committing candidate")?;
    let after = tree.take_snapshot();
    info!(version = after.version(), "sample document committed");

    Ok(ProcedureReport {
        module_name: module.name().to_string(),
        module_revision: module.revision(),
        target_node,
        augmentations: module.augmentations().len(),
        groupings: module.groupings().len(),
        rpcs: module.rpcs().len(),
        before,
        after,
        schema: Arc::clone(&schema),
    })
}

/// Execute `yangkit run`.
pub fn run_run(args: &RunArgs, config: &ValidatorConfig, resource_root: &Path) -> Result<u8> {
    let report = run_procedure(&DefaultYangParserFactory, config, resource_root)?;
    println!(
        "{}@{}: {}, {} augmentations, {} groupings, {} rpcs; committed at version {}",
        report.module_name,
        report
            .module_revision
            .map_or_else(|| "-".to_string(), |r| r.to_string()),
        report.target_node,
        report.augmentations,
        report.groupings,
        report.rpcs,
        report.after.version()
    );
    if args.dump {
        let json = serde_json::to_string_pretty(&report.after.to_json()).context("rendering snapshot")?;
        println!("{json}");
    }
    Ok(0)
}
