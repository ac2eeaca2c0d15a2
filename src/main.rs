use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use kubequill::config::Config;
use kubequill::document::cursor::Cursor;
use kubequill::document::node::{Block, NodeRef};
use kubequill::document::tree::YamlTree;
use kubequill::document::visitor::for_each_position;
use kubequill::file::loader::{load_manifest_file, load_manifest_from_stdin};
use kubequill::image::ImageName;
use kubequill::kubernetes::{project_tree, sections, ResourceModel};
use kubequill::yamlpath::Matcher;

/// KubeQuill - structural queries over Kubernetes manifests
#[derive(Parser)]
#[command(name = "kubequill")]
#[command(version)]
#[command(about = "Structural queries over Kubernetes manifests", long_about = None)]
struct Cli {
    /// Config file (default: ~/.config/kubequill/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the resource model of every manifest document
    Model {
        /// Output format, "yaml" or "json" (default: from config)
        #[arg(short, long)]
        format: Option<String>,

        /// Manifest files (omit to read stdin)
        files: Vec<PathBuf>,
    },
    /// Print every position matching a path expression
    Query {
        /// JSONPath (`$.spec.containers[*].image`) or slash path (`//image`)
        expression: String,

        files: Vec<PathBuf>,
    },
    /// List container images
    Images {
        /// Only list images matching this glob reference, e.g. `gcr.io/*/*:*`
        #[arg(short, long)]
        pattern: Option<String>,

        files: Vec<PathBuf>,
    },
    /// Report containers whose limits exceed their requests by more than a ratio
    Limits {
        /// Maximum limits/requests ratio (default: from config)
        #[arg(short, long)]
        ratio: Option<i32>,

        /// Resource type to compare
        #[arg(long, default_value = "memory")]
        resource: String,

        files: Vec<PathBuf>,
    },
}

/// A parsed manifest source and the name it is reported under.
struct Source {
    name: String,
    tree: YamlTree,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_sources(files: &[PathBuf]) -> Result<Vec<Source>> {
    if files.is_empty() {
        return Ok(vec![Source {
            name: "-".to_string(),
            tree: load_manifest_from_stdin()?,
        }]);
    }

    files
        .iter()
        .map(|path| {
            Ok(Source {
                name: path.display().to_string(),
                tree: load_manifest_file(path)?,
            })
        })
        .collect()
}

/// Renders the position of a cursor as a JSONPath.
fn render_path(cursor: &Cursor<'_>) -> String {
    let mut path = String::from("$");
    for node in cursor.path() {
        match node {
            NodeRef::MappingEntry(e) => {
                let key = e.key().value();
                if !key.is_empty()
                    && key
                        .chars()
                        .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
                {
                    path.push('.');
                    path.push_str(key);
                } else {
                    path.push_str(&format!("['{}']", key));
                }
            }
            NodeRef::SequenceEntry(index, _) => path.push_str(&format!("[{}]", index)),
            _ => {}
        }
    }
    path
}

fn render_value(node: NodeRef<'_>) -> String {
    let node = node.value_block().map(Block::as_node_ref).unwrap_or(node);
    match node {
        NodeRef::Scalar(s) => s.value().to_string(),
        NodeRef::Mapping(m) => format!("<mapping of {}>", m.entries().len()),
        NodeRef::Sequence(s) => format!("<sequence of {}>", s.len()),
        _ => String::new(),
    }
}

fn run_model(sources: &[Source], format: &str, out: &mut impl Write) -> Result<()> {
    let mut models: Vec<ResourceModel> = Vec::new();
    for source in sources {
        let projected = project_tree(&source.tree);
        models.extend(projected.documents().filter_map(|d| d.model().cloned()));
    }

    match format {
        "json" => {
            serde_json::to_writer_pretty(&mut *out, &models)?;
            writeln!(out)?;
        }
        "yaml" => {
            for model in &models {
                writeln!(out, "---")?;
                write!(out, "{}", serde_yaml::to_string(model)?)?;
            }
        }
        other => anyhow::bail!("Unknown output format '{}': expected yaml or json", other),
    }
    Ok(())
}

fn run_query(sources: &[Source], expression: &str, out: &mut impl Write) -> Result<()> {
    let matcher = Matcher::compile(expression)
        .with_context(|| format!("Invalid path expression '{}'", expression))?;

    for source in sources {
        for (index, document) in source.tree.documents().enumerate() {
            let mut hits = Vec::new();
            for_each_position(document, |cursor| {
                let is_position = match cursor.value() {
                    NodeRef::MappingEntry(_) | NodeRef::SequenceEntry(..) => true,
                    _ => cursor.depth() == 1,
                };
                if is_position && matcher.matches(cursor) {
                    hits.push((render_path(cursor), render_value(cursor.value())));
                }
            });
            for (path, value) in hits {
                writeln!(out, "{}#{} {} = {}", source.name, index, path, value)?;
            }
        }
    }
    Ok(())
}

fn run_images(
    sources: &[Source],
    pattern: Option<&str>,
    config: &Config,
    out: &mut impl Write,
) -> Result<()> {
    let pattern = pattern.map(ImageName::parse);

    for source in sources {
        for (index, document) in source.tree.documents().enumerate() {
            let mut images = Vec::new();
            for_each_position(document, |cursor| {
                let NodeRef::MappingEntry(entry) = cursor.value() else {
                    return;
                };
                let in_containers =
                    sections::in_container_spec(cursor) || sections::in_init_container_spec(cursor);
                if in_containers && entry.key().value() == "image" {
                    if let Some(value) = entry.value().as_scalar() {
                        images.push((render_path(cursor), ImageName::parse(value.value())));
                    }
                }
            });

            for (path, image) in images {
                if let Some(pattern) = &pattern {
                    if !image.matches(pattern)? {
                        continue;
                    }
                }
                let flag = match image.tag() {
                    Some(tag) if config.is_disallowed_tag(tag) => " (disallowed tag)",
                    _ => "",
                };
                writeln!(out, "{}#{} {} = {}{}", source.name, index, path, image, flag)?;
            }
        }
    }
    Ok(())
}

fn run_limits(
    sources: &[Source],
    ratio: i32,
    resource: &str,
    config: &Config,
    out: &mut impl Write,
) -> Result<()> {
    let requests = sections::resource_value_matcher("requests", resource);
    let limits = sections::resource_value_matcher("limits", resource);

    for source in sources {
        for (index, document) in source.tree.documents().enumerate() {
            let mut pairs = Vec::new();
            for_each_position(document, |cursor| {
                let is_resources = matches!(
                    cursor.value(),
                    NodeRef::MappingEntry(e) if e.key().value() == "resources"
                );
                if !is_resources || !sections::in_resources(cursor) {
                    return;
                }
                let request = requests.find_first(cursor).and_then(|n| n.scalar_value());
                let limit = limits.find_first(cursor).and_then(|n| n.scalar_value());
                if let (Some(request), Some(limit)) = (request, limit) {
                    pairs.push((render_path(cursor), request, limit));
                }
            });

            for (path, request, limit) in pairs {
                let request = config
                    .parse_quantity(request)
                    .with_context(|| format!("{} at {}", source.name, path))?;
                let limit = config
                    .parse_quantity(limit)
                    .with_context(|| format!("{} at {}", source.name, path))?;
                if request.exceeds_ratio(ratio, &limit) {
                    writeln!(
                        out,
                        "{}#{} {}: {} limit {} exceeds {}x request {}",
                        source.name, index, path, resource, limit, ratio, request
                    )?;
                }
            }
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Command::Model { format, files } => {
            let format = format.as_deref().unwrap_or(&config.output_format);
            run_model(&load_sources(files)?, format, &mut out)
        }
        Command::Query { expression, files } => {
            run_query(&load_sources(files)?, expression, &mut out)
        }
        Command::Images { pattern, files } => {
            run_images(&load_sources(files)?, pattern.as_deref(), &config, &mut out)
        }
        Command::Limits {
            ratio,
            resource,
            files,
        } => {
            let ratio = ratio.unwrap_or(config.default_ratio_limit);
            run_limits(&load_sources(files)?, ratio, resource, &config, &mut out)
        }
    }
}
