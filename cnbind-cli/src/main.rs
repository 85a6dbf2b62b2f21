mod config;

use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use cnbind_api::{ApiVersion, CommandShape, LayerShape, LayoutSource, check_compatibility};
use cnbind_layers::{Layers, RESERVED_TOML};
use cnbind_platform::{PlatformView, binding_root};
use cnbind_types::descriptor::{BuildpackDescriptor, DescriptorInfo, ExtensionDescriptor};
use cnbind_types::files;
use config::ConfigMerger;
use fs_err as fs;
use serde::Serialize;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "cnbind",
    version,
    about = "Inspect buildpack descriptors, layer directories and platform directories."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check a descriptor's API version against the supported range.
    Check(CheckArgs),
    /// List layer metadata in a layers directory.
    Layers(LayersArgs),
    /// Show the env and bindings a platform directory projects.
    Platform(PlatformArgs),
}

#[derive(Debug, Parser)]
struct RangeArgs {
    /// Lowest supported API version (overrides cnbind.toml).
    #[arg(long)]
    min: Option<ApiVersion>,

    /// Highest supported API version (overrides cnbind.toml).
    #[arg(long)]
    max: Option<ApiVersion>,
}

#[derive(Debug, Parser)]
struct CheckArgs {
    /// Buildpack or extension directory (default: current directory).
    #[arg(default_value = ".")]
    dir: Utf8PathBuf,

    #[command(flatten)]
    range: RangeArgs,

    /// Print JSON instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Debug, Parser)]
struct LayersArgs {
    /// Layers directory.
    dir: Utf8PathBuf,

    /// API version used to pick the metadata shape (default: highest supported).
    #[arg(long)]
    api: Option<ApiVersion>,

    #[command(flatten)]
    range: RangeArgs,

    /// Print JSON instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Debug, Parser)]
struct PlatformArgs {
    /// Platform directory.
    dir: Utf8PathBuf,

    /// Fold `metadata/` and `secret/` subdirectories into bindings.
    #[arg(long, default_value_t = false)]
    legacy_subdirs: bool,

    /// Print JSON instead of text.
    #[arg(long, default_value_t = false)]
    json: bool,
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        error!("{:#}", e);
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cwd = Utf8PathBuf::from(".");
    let file_config = config::load_or_default(&cwd).context("load cnbind.toml config")?;
    let merger = ConfigMerger::new(file_config);
    match cli.cmd {
        Command::Check(args) => cmd_check(args, merger),
        Command::Layers(args) => cmd_layers(args, merger),
        Command::Platform(args) => cmd_platform(args, merger),
    }
}

#[derive(Debug, Serialize)]
struct CheckReport {
    descriptor: Utf8PathBuf,
    kind: &'static str,
    id: String,
    version: String,
    api: String,
    supported: String,
    contract: String,
    layer_metadata: &'static str,
    process_command: &'static str,
    paths_from: &'static str,
    sbom_files: bool,
    profile_d: bool,
    generate: bool,
}

/// Read whichever descriptor `dir` holds. `buildpack.toml` wins.
fn read_descriptor(
    dir: &Utf8Path,
) -> anyhow::Result<(Utf8PathBuf, &'static str, DescriptorInfo, Option<String>)> {
    let bp_path = dir.join(files::BUILDPACK_TOML);
    if bp_path.is_file() {
        let raw = fs::read_to_string(&bp_path)?;
        let d: BuildpackDescriptor =
            toml::from_str(&raw).with_context(|| format!("decode {}", bp_path))?;
        return Ok((bp_path, "buildpack", d.buildpack, d.api));
    }
    let ext_path = dir.join(files::EXTENSION_TOML);
    if ext_path.is_file() {
        let raw = fs::read_to_string(&ext_path)?;
        let d: ExtensionDescriptor =
            toml::from_str(&raw).with_context(|| format!("decode {}", ext_path))?;
        return Ok((ext_path, "extension", d.extension, d.api));
    }
    anyhow::bail!(
        "no {} or {} in {}",
        files::BUILDPACK_TOML,
        files::EXTENSION_TOML,
        dir
    )
}

fn cmd_check(args: CheckArgs, merger: ConfigMerger) -> anyhow::Result<()> {
    let merged = merger.merge(args.range.min, args.range.max, false)?;
    let (path, kind, info, api) = read_descriptor(&args.dir)?;
    let api = api.with_context(|| format!("{} does not declare an api", path))?;
    let negotiated = check_compatibility(&api, &merged.range)?;
    let contract = negotiated.contract;
    debug!(?contract, "descriptor accepted");

    let report = CheckReport {
        descriptor: path,
        kind,
        id: info.id,
        version: info.version,
        api: negotiated.version.to_string(),
        supported: merged.range.to_string(),
        contract: format!("{:?}", contract),
        layer_metadata: match contract.layer_shape() {
            LayerShape::Flat => "flat",
            LayerShape::Typed => "typed",
        },
        process_command: match contract.command_shape() {
            CommandShape::String => "string",
            CommandShape::Array => "array",
        },
        paths_from: match contract.layout_source() {
            LayoutSource::Arguments => "arguments",
            LayoutSource::Environment => "environment",
        },
        sbom_files: contract.supports_sbom(),
        profile_d: contract.supports_profile_d(),
        generate: contract.supports_generate(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    println!("{} {} {} ({})", report.kind, report.id, report.version, report.descriptor);
    println!("api:             {} (supported: {})", report.api, report.supported);
    println!("contract:        {}", report.contract);
    println!("layer metadata:  {}", report.layer_metadata);
    println!("process command: {}", report.process_command);
    println!("paths from:      {}", report.paths_from);
    println!("sbom files:      {}", yes_no(report.sbom_files));
    println!("profile.d:       {}", yes_no(report.profile_d));
    println!("generate:        {}", yes_no(report.generate));
    Ok(())
}

fn yes_no(b: bool) -> &'static str {
    if b { "yes" } else { "no" }
}

#[derive(Debug, Serialize)]
struct LayerRow {
    name: String,
    build: bool,
    cache: bool,
    launch: bool,
    metadata_keys: Vec<String>,
}

fn cmd_layers(args: LayersArgs, merger: ConfigMerger) -> anyhow::Result<()> {
    let merged = merger.merge(args.range.min, args.range.max, false)?;
    let api = args.api.unwrap_or_else(|| merged.range.max().clone());
    let negotiated = check_compatibility(&api.to_string(), &merged.range)?;
    let layers = Layers::new(args.dir.clone(), negotiated.contract);

    let mut rows = Vec::new();
    for name in layers.existing()? {
        let Some(content) = layers.read_metadata(&name)? else {
            continue;
        };
        rows.push(LayerRow {
            name,
            build: content.types.build,
            cache: content.types.cache,
            launch: content.types.launch,
            metadata_keys: content.metadata.keys().cloned().collect(),
        });
    }
    let reserved: Vec<&str> = RESERVED_TOML
        .iter()
        .copied()
        .filter(|f| args.dir.join(f).is_file())
        .collect();

    if args.json {
        let out = serde_json::json!({ "layers": rows, "reserved": reserved });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    if rows.is_empty() {
        println!("no layers in {}", args.dir);
    }
    for row in &rows {
        let flags: Vec<&str> = [("build", row.build), ("cache", row.cache), ("launch", row.launch)]
            .into_iter()
            .filter(|(_, on)| *on)
            .map(|(name, _)| name)
            .collect();
        println!(
            "{:<24} [{}] metadata: {}",
            row.name,
            flags.join(","),
            row.metadata_keys.join(", ")
        );
    }
    for file in reserved {
        println!("{:<24} (reserved)", file);
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct BindingRow {
    name: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    provider: Option<String>,
    keys: Vec<String>,
}

fn cmd_platform(args: PlatformArgs, merger: ConfigMerger) -> anyhow::Result<()> {
    let merged = merger.merge(None, None, args.legacy_subdirs)?;
    let root = binding_root(&args.dir, |k| std::env::var(k).ok());
    let view = PlatformView::load(&args.dir, &root, merged.binding_layout)?;

    let bindings: Vec<BindingRow> = view
        .bindings()
        .iter()
        .map(|b| BindingRow {
            name: b.name.clone(),
            kind: b.binding_type().map(str::to_string),
            provider: b.provider().map(str::to_string),
            keys: b.secret.keys().cloned().collect(),
        })
        .collect();

    if args.json {
        let out = serde_json::json!({ "env": view.env(), "bindings": bindings });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    println!("env ({}):", view.env().len());
    for (k, v) in view.env() {
        println!("  {}={}", k, v);
    }
    println!("bindings ({}) from {}:", bindings.len(), root);
    for b in &bindings {
        println!(
            "  {} type={} provider={} keys={}",
            b.name,
            b.kind.as_deref().unwrap_or("-"),
            b.provider.as_deref().unwrap_or("-"),
            b.keys.join(",")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_check_with_range() {
        let cli = Cli::try_parse_from(["cnbind", "check", "bp", "--min", "0.8", "--max", "0.10"])
            .unwrap();
        match cli.cmd {
            Command::Check(args) => {
                assert_eq!(args.dir, Utf8PathBuf::from("bp"));
                assert_eq!(args.range.min, Some(ApiVersion::new(0, 8)));
                assert_eq!(args.range.max, Some(ApiVersion::new(0, 10)));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn cli_rejects_bad_version() {
        assert!(Cli::try_parse_from(["cnbind", "layers", "dir", "--api", "x.y"]).is_err());
    }
}
