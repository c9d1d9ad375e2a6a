//! CLI subcommands — init, validate, graph, export.

use crate::core::{builder, parser};
use crate::core::graph::ResourceGraph;
use crate::core::resolver::{CachedResolver, EnvResolver, IdentityResolver};
use crate::core::types::{DeployerIdentity, StackConfig};
use crate::resources::artifact;
use clap::Subcommand;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new trazar project
    Init {
        /// Directory to initialize (default: current)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Validate trazar.yaml without building the graph
    Validate {
        /// Path to trazar.yaml
        #[arg(short, long, default_value = "trazar.yaml")]
        file: PathBuf,
    },

    /// Build the graph and print nodes in execution order
    Graph {
        /// Path to trazar.yaml
        #[arg(short, long, default_value = "trazar.yaml")]
        file: PathBuf,

        /// Root that archive paths resolve against (default: parent of cwd)
        #[arg(long)]
        build_root: Option<PathBuf>,
    },

    /// Build, resolve identity, and emit the desired-state document
    Export {
        /// Path to trazar.yaml
        #[arg(short, long, default_value = "trazar.yaml")]
        file: PathBuf,

        /// Write the document here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Skip identity resolution and keep account placeholders
        #[arg(long)]
        unresolved: bool,

        /// Root that archive paths resolve against (default: parent of cwd)
        #[arg(long)]
        build_root: Option<PathBuf>,
    },
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<(), String> {
    match cmd {
        Commands::Init { path } => cmd_init(&path),
        Commands::Validate { file } => cmd_validate(&file),
        Commands::Graph { file, build_root } => cmd_graph(&file, build_root.as_deref()),
        Commands::Export {
            file,
            out,
            unresolved,
            build_root,
        } => cmd_export(&file, out.as_deref(), unresolved, build_root.as_deref()),
    }
}

fn cmd_init(path: &Path) -> Result<(), String> {
    let config_path = path.join("trazar.yaml");
    if config_path.exists() {
        return Err(format!("{} already exists", config_path.display()));
    }

    let template = r#"version: "1.0"
stack: dev
project: todos

table:
  hash_key: id
  read_capacity: 1
  write_capacity: 1

function:
  handler: functions/create.create
  runtime: nodejs12.x
  memory_size: 128
  code: build/archive.zip
  layer: layers/archive.zip

api:
  path_part: "{new}"
"#;
    std::fs::write(&config_path, template)
        .map_err(|e| format!("cannot write {}: {}", config_path.display(), e))?;

    println!("Initialized trazar project at {}", path.display());
    println!("  Created: {}", config_path.display());
    Ok(())
}

fn cmd_validate(file: &Path) -> Result<(), String> {
    let config = parser::parse_config_file(file)?;
    let errors = parser::validate_config(&config);

    if errors.is_empty() {
        println!("OK: {}-{} (stack {})", config.stack, config.project, config.stack);
        Ok(())
    } else {
        for e in &errors {
            eprintln!("  ERROR: {}", e);
        }
        Err(format!("{} validation error(s)", errors.len()))
    }
}

fn resolve_build_root(override_root: Option<&Path>) -> Result<PathBuf, String> {
    match override_root {
        Some(root) => Ok(root.to_path_buf()),
        None => artifact::build_root(),
    }
}

fn load_and_build(file: &Path, build_root: Option<&Path>) -> Result<(StackConfig, ResourceGraph), String> {
    let config = parser::load_config(file)?;
    let root = resolve_build_root(build_root)?;
    let graph = builder::build_graph(&config, &root)?;
    Ok((config, graph))
}

fn cmd_graph(file: &Path, build_root: Option<&Path>) -> Result<(), String> {
    let (config, graph) = load_and_build(file, build_root)?;

    println!(
        "Graph: {}-{} ({} nodes)",
        config.stack,
        config.project,
        graph.len()
    );
    println!();

    for id in graph.execution_order()? {
        let node = graph
            .get(&id)
            .ok_or_else(|| format!("node '{}' missing after ordering", id))?;
        let deps = graph.dependencies_of(node)?;
        if deps.is_empty() {
            println!("  {} [{}] {}", id, node.kind(), node.name);
        } else {
            println!("  {} [{}] {} <- {}", id, node.kind(), node.name, deps.join(", "));
        }
    }

    println!();
    for (name, value) in graph.outputs() {
        println!("Output {}: {}", name, value);
    }
    println!("Fingerprint: {}", graph.fingerprint()?);
    Ok(())
}

#[derive(Serialize)]
struct ExportDocument<'a> {
    schema: &'a str,
    stack: &'a str,
    project: &'a str,
    fingerprint: String,
    #[serde(flatten)]
    graph: &'a ResourceGraph,
}

/// Render the export document, finalizing against an identity when given.
fn render_export(
    config: &StackConfig,
    graph: &ResourceGraph,
    identity: Option<&DeployerIdentity>,
) -> Result<String, String> {
    let finalized;
    let graph = match identity {
        Some(identity) => {
            finalized = graph.finalize(identity)?;
            &finalized
        }
        None => graph,
    };
    let document = ExportDocument {
        schema: "trazar/1",
        stack: &config.stack,
        project: &config.project,
        fingerprint: graph.fingerprint()?,
        graph,
    };
    serde_yaml_ng::to_string(&document).map_err(|e| format!("failed to serialize export: {}", e))
}

fn cmd_export(
    file: &Path,
    out: Option<&Path>,
    unresolved: bool,
    build_root: Option<&Path>,
) -> Result<(), String> {
    let (config, graph) = load_and_build(file, build_root)?;

    let identity = if unresolved {
        None
    } else {
        let runtime = tokio::runtime::Runtime::new()
            .map_err(|e| format!("cannot start async runtime: {}", e))?;
        let resolver = CachedResolver::new(EnvResolver);
        Some(runtime.block_on(resolver.resolve())?)
    };

    let rendered = render_export(&config, &graph, identity.as_ref())?;
    match out {
        Some(path) => {
            std::fs::write(path, &rendered)
                .map_err(|e| format!("cannot write {}: {}", path.display(), e))?;
            println!("Exported {} nodes to {}", graph.len(), path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}
