//! Example: composing names, resolving stage policy and auditing tag
//! compliance of a construct tree with keystone.
//!
//! The construct tree is read from a JSON file, the same shape the
//! provisioning engine is handed. Run with `RUST_LOG=debug` to see what
//! keystone does under the hood.
//!
//! ```sh
//! cargo run -p keystone-example -- name --stage prod --service orders --resource table
//! cargo run -p keystone-example -- bucket-name --stage prod --service assets
//! cargo run -p keystone-example -- policy PR-123
//! cargo run -p keystone-example -- check app.json --config keystone.toml --stage prod
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use keystone::{
    BucketNameParts, Construct, Diagnostics, Layer, RequiredTags, ResourceNameParts, Severity,
    Stage, Tags,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "keystone", about = "Naming and tag compliance for constructs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compose a general resource name.
    Name {
        #[arg(long)]
        stage: String,
        #[arg(long)]
        service: String,
        #[arg(long)]
        resource: String,
        #[arg(long)]
        suffix: Option<String>,
        #[arg(long)]
        region: Option<String>,
    },
    /// Compose a bucket name.
    BucketName {
        #[arg(long)]
        stage: String,
        #[arg(long)]
        service: String,
        #[arg(long)]
        suffix: Option<String>,
        #[arg(long)]
        region: Option<String>,
    },
    /// Classify a stage and show its removal policy.
    Policy { stage: String },
    /// Audit the required tags of every stack in a construct tree.
    Check {
        /// JSON file holding the construct tree.
        tree: PathBuf,

        /// TOML file with `stage`, `required_tags` and `tags`.
        #[arg(long, env = "KEYSTONE_CONFIG")]
        config: Option<PathBuf>,

        /// Stage to tag every stack with, as `Environment`.
        #[arg(long)]
        stage: Option<String>,

        /// Additional required tag key, may be repeated.
        #[arg(long = "require")]
        required: Vec<String>,

        /// Tag applied to every stack as `KEY=VALUE`, may be repeated.
        #[arg(long = "tag", value_parser = parse_tag)]
        tags: Vec<(String, String)>,

        /// Print diagnostics as JSON.
        #[arg(long, default_value = "false")]
        json: bool,
    },
}

fn parse_tag(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("invalid tag '{raw}', expected KEY=VALUE"))?;
    Ok((key.to_owned(), value.to_owned()))
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Audit settings, layered `defaults < config file < command line`.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, keystone::Layer)]
#[serde(default)]
struct AuditConfig {
    stage: Option<String>,
    required_tags: RequiredTags,
    tags: Tags,
}

impl AuditConfig {
    fn defaults() -> Self {
        AuditConfig {
            stage: None,
            required_tags: RequiredTags::new(["Environment"]),
            tags: Tags::default(),
        }
    }

    fn read(path: &std::path::Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("could not read config file {path:?}"))?;
        toml::from_str(&contents).with_context(|| format!("could not parse config file {path:?}"))
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn check(
    tree: PathBuf,
    config: Option<PathBuf>,
    command_line: AuditConfig,
    json: bool,
) -> anyhow::Result<Diagnostics> {
    let file_config = match config {
        Some(path) => AuditConfig::read(&path)?,
        None => AuditConfig::default(),
    };
    let config = keystone::merge_config(AuditConfig::defaults(), file_config, command_line);
    log::info!("auditing {tree:?} with {config:?}");

    let contents =
        std::fs::read_to_string(&tree).with_context(|| format!("could not read {tree:?}"))?;
    let mut root: Construct =
        serde_json::from_str(&contents).with_context(|| format!("could not parse {tree:?}"))?;

    let mut tags = config.tags.clone();
    if let Some(stage) = config.stage.as_deref() {
        tags = tags.layer(Tags::from_iter([("Environment", keystone::classify_stage(stage))]));
    }
    root.for_each_stack_mut(&mut |stack| keystone::apply_tags(stack, &tags));

    let diagnostics = keystone::check_required_tags(&root, config.required_tags.keys());
    if json {
        println!("{}", serde_json::to_string_pretty(&diagnostics)?);
    } else if diagnostics.is_empty() {
        println!("{} every stack carries its required tags", "ok:".green().bold());
    } else {
        for diagnostic in diagnostics.iter() {
            let severity = match diagnostic.severity {
                Severity::Error => diagnostic.severity.to_string().red().bold(),
                Severity::Warning => diagnostic.severity.to_string().yellow().bold(),
                Severity::Info => diagnostic.severity.to_string().normal(),
            };
            println!("{severity}: {}", diagnostic.message());
        }
    }
    Ok(diagnostics)
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Name {
            stage,
            service,
            resource,
            suffix,
            region,
        } => {
            let parts = ResourceNameParts {
                stage,
                service,
                resource,
                suffix,
                region,
            };
            println!("{}", parts.compose()?);
        }
        Command::BucketName {
            stage,
            service,
            suffix,
            region,
        } => {
            let parts = BucketNameParts {
                stage,
                service,
                suffix,
                region,
            };
            println!("{}", parts.compose()?);
        }
        Command::Policy { stage } => {
            let stage = Stage::parse(&stage);
            let kind = if stage.is_ephemeral() {
                "ephemeral"
            } else {
                "known"
            };
            println!("stage: {stage} ({kind})");
            println!("removal policy: {}", stage.removal_policy());
        }
        Command::Check {
            tree,
            config,
            stage,
            required,
            tags,
            json,
        } => {
            let command_line = AuditConfig {
                stage,
                required_tags: RequiredTags::new(required),
                tags: tags.into_iter().collect(),
            };
            let diagnostics = check(tree, config, command_line, json)?;
            if diagnostics.has_errors() {
                std::process::exit(1);
            }
        }
    }
    Ok(())
}
