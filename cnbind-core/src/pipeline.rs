//! Detect, build and generate runners.
//!
//! Each runner walks one invocation through [`crate::state`]: read the
//! descriptor, gate its API, resolve paths (argv or env depending on the
//! contract), build the context, call user code, then write results. Every
//! error is fatal at first occurrence. All process and file I/O that a test
//! would want to fake goes through [`Ports`].

use camino::{Utf8Path, Utf8PathBuf};
use cnbind_api::{CommandShape, Contract, LayoutSource, Negotiated, check_compatibility};
use cnbind_layers::Layers;
use cnbind_platform::{PlatformView, TargetInfo, binding_root, vars};
use cnbind_types::build_plan::BuildPlan;
use cnbind_types::descriptor::{BuildpackDescriptor, ExtensionDescriptor};
use cnbind_types::files;
use cnbind_types::launch::Launch;
use cnbind_types::plan::BuildpackPlan;
use cnbind_types::store::Store;
use cnbind_types::wire::{ArrayCommandProcess, LaunchToml, StringCommandProcess};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::context::{BuildContext, DetectContext, GenerateContext};
use crate::descriptor::{Descriptor, ModuleDir, load_descriptor, resolve_module_dir};
use crate::ports::{EnvPort, Ports};
use crate::result::{BuildResult, DetectResult, GenerateResult};
use crate::settings::RunnerSettings;
use crate::state::{Machine, Phase, State, Terminal};
use crate::{PhaseError, exit};

/// Non-error ending of a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseOutcome {
    Pass,
    /// Detect declined.
    Fail,
}

impl PhaseOutcome {
    pub fn exit_code(self) -> i32 {
        match self {
            PhaseOutcome::Pass => exit::PASS,
            PhaseOutcome::Fail => exit::DETECT_FAIL,
        }
    }
}

/// One finished invocation: the result and every state it went through.
#[derive(Debug)]
pub struct PhaseRun {
    pub phase: Phase,
    pub states: Vec<State>,
    pub result: Result<PhaseOutcome, PhaseError>,
}

impl PhaseRun {
    fn finish(phase: Phase, mut machine: Machine, result: Result<PhaseOutcome, PhaseError>) -> Self {
        let terminal = match &result {
            Ok(PhaseOutcome::Pass) => Terminal::Pass,
            Ok(PhaseOutcome::Fail) => Terminal::Fail,
            Err(_) => Terminal::Error,
        };
        machine.advance(State::Terminal(terminal));
        Self {
            phase,
            states: machine.history().to_vec(),
            result,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match &self.result {
            Ok(outcome) => outcome.exit_code(),
            Err(e) => e.exit_code(),
        }
    }

    /// Whether the user callback was invoked.
    pub fn callback_ran(&self) -> bool {
        self.states.contains(&State::CallbackExecuted)
    }
}

/// Hand the run's status to the exit port. Errors are written to stderr
/// once; pass and fail are silent.
///
/// Returns the status for ports whose `exit` returns.
pub fn finish(run: PhaseRun, ports: &Ports<'_>) -> i32 {
    let code = run.exit_code();
    match &run.result {
        Ok(outcome) => debug!(phase = run.phase.name(), ?outcome, "phase finished"),
        Err(e) => eprintln!("{}", e),
    }
    ports.exit.exit(code);
    code
}

fn require_var(env: &dyn EnvPort, var: &str) -> Result<String, PhaseError> {
    env.var(var)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| PhaseError::missing_var(var))
}

fn require(env: &dyn EnvPort, var: &str) -> Result<Utf8PathBuf, PhaseError> {
    require_var(env, var).map(Utf8PathBuf::from)
}

fn optional(env: &dyn EnvPort, var: &str) -> Option<String> {
    env.var(var).filter(|v| !v.is_empty())
}

fn expect_args(phase: Phase, args: &[String], expected: usize) -> Result<(), PhaseError> {
    if args.len() != expected {
        return Err(PhaseError::Usage(format!(
            "{} expects {} arguments (including the command), got {}",
            phase.name(),
            expected,
            args.len()
        )));
    }
    Ok(())
}

fn gate(api: Option<&str>, settings: &RunnerSettings) -> Result<Negotiated, PhaseError> {
    let negotiated = match api {
        Some(raw) => check_compatibility(raw, &settings.range)?,
        None => {
            debug!(default = %settings.default_api, "descriptor declares no api");
            check_compatibility(&settings.default_api.to_string(), &settings.range)?
        }
    };
    Ok(negotiated)
}

/// Under the env layout the module directory must come from its variable.
fn require_env_module_dir<D: Descriptor>(
    contract: Contract,
    dir: &ModuleDir,
) -> Result<(), PhaseError> {
    if contract.layout_source() == LayoutSource::Environment && !dir.from_env {
        return Err(PhaseError::missing_var(D::DIR_VAR));
    }
    Ok(())
}

fn require_extension_contract<D: Descriptor>(negotiated: &Negotiated) -> Result<(), PhaseError> {
    if D::REQUIRES_ENV_LAYOUT && !negotiated.contract.supports_generate() {
        return Err(PhaseError::Configuration(format!(
            "image extensions require buildpack API 0.8 or later, descriptor declares {}",
            negotiated.version
        )));
    }
    Ok(())
}

fn app_dir(env: &dyn EnvPort) -> Result<Utf8PathBuf, PhaseError> {
    env.current_dir().map_err(|e| PhaseError::Environment {
        var: "working directory".to_string(),
        reason: format!("{:#}", e),
    })
}

fn load_platform(
    env: &dyn EnvPort,
    platform_dir: &Utf8Path,
    settings: &RunnerSettings,
) -> Result<PlatformView, PhaseError> {
    let root = binding_root(platform_dir, |k| env.var(k));
    Ok(PlatformView::load(platform_dir, &root, settings.binding_layout)?)
}

fn read_toml<T: DeserializeOwned>(path: &Utf8Path) -> Result<T, PhaseError> {
    let raw = fs_err::read_to_string(path).map_err(|e| PhaseError::Io {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    toml::from_str(&raw).map_err(|source| PhaseError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

fn to_table<T: Serialize>(value: &T, path: &Utf8Path) -> Result<toml::Table, PhaseError> {
    match toml::Value::try_from(value) {
        Ok(toml::Value::Table(table)) => Ok(table),
        Ok(_) => Err(PhaseError::Configuration(format!(
            "{}: document does not serialize to a TOML table",
            path
        ))),
        Err(e) => Err(PhaseError::Io {
            path: path.to_path_buf(),
            source: e.into(),
        }),
    }
}

fn write_toml(ports: &Ports<'_>, path: &Utf8Path, doc: &toml::Table) -> Result<(), PhaseError> {
    ports
        .toml
        .write_toml(path, doc)
        .map_err(|source| PhaseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(path = %path, "wrote toml");
    Ok(())
}

fn write_text(path: &Utf8Path, contents: &str) -> Result<(), PhaseError> {
    let io = |e: std::io::Error| PhaseError::Io {
        path: path.to_path_buf(),
        source: e.into(),
    };
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent).map_err(io)?;
    }
    fs_err::write(path, contents).map_err(io)?;
    debug!(path = %path, "wrote file");
    Ok(())
}

/// Encode `launch.toml` with the process shape the contract expects.
pub fn encode_launch(contract: Contract, launch: &Launch) -> Result<toml::Table, PhaseError> {
    let path = Utf8Path::new(files::LAUNCH_TOML);
    match contract.command_shape() {
        CommandShape::String => {
            to_table(&LaunchToml::<StringCommandProcess>::try_from_launch(launch)?, path)
        }
        CommandShape::Array => {
            to_table(&LaunchToml::<ArrayCommandProcess>::try_from_launch(launch)?, path)
        }
    }
}

struct DetectPaths {
    platform: Utf8PathBuf,
    plan_out: Utf8PathBuf,
}

/// Run detect for a buildpack (`D = BuildpackDescriptor`) or an extension.
pub fn run_detect<D, F>(settings: &RunnerSettings, ports: &Ports<'_>, callback: F) -> PhaseRun
where
    D: Descriptor,
    F: FnOnce(DetectContext<D>) -> anyhow::Result<DetectResult>,
{
    let mut machine = Machine::new(Phase::Detect);
    let result = detect_steps(&mut machine, settings, ports, callback);
    PhaseRun::finish(Phase::Detect, machine, result)
}

fn detect_steps<D, F>(
    machine: &mut Machine,
    settings: &RunnerSettings,
    ports: &Ports<'_>,
    callback: F,
) -> Result<PhaseOutcome, PhaseError>
where
    D: Descriptor,
    F: FnOnce(DetectContext<D>) -> anyhow::Result<DetectResult>,
{
    let env = ports.env;
    let args = env.args();

    let module_dir = resolve_module_dir::<D>(env, &args)?;
    let descriptor: D = load_descriptor(&module_dir.path)?;
    let api = gate(descriptor.api(), settings)?;
    require_extension_contract::<D>(&api)?;
    let paths = match api.contract.layout_source() {
        LayoutSource::Arguments => {
            expect_args(Phase::Detect, &args, 3)?;
            DetectPaths {
                platform: Utf8PathBuf::from(&args[1]),
                plan_out: Utf8PathBuf::from(&args[2]),
            }
        }
        LayoutSource::Environment => DetectPaths {
            platform: require(env, vars::PLATFORM_DIR)?,
            plan_out: require(env, vars::BUILD_PLAN_PATH)?,
        },
    };
    machine.advance(State::GateChecked);

    require_env_module_dir::<D>(api.contract, &module_dir)?;
    let ctx = DetectContext {
        app_dir: app_dir(env)?,
        module_dir: module_dir.path,
        descriptor,
        platform: load_platform(env, &paths.platform, settings)?,
        api,
        stack_id: optional(env, vars::STACK_ID),
        target: TargetInfo::from_lookup(|k| env.var(k)),
    };
    machine.advance(State::ContextBuilt);

    let result = callback(ctx).map_err(PhaseError::Callback)?;
    machine.advance(State::CallbackExecuted);

    if !result.passed() {
        debug!("detect declined");
        return Ok(PhaseOutcome::Fail);
    }
    if let Some(plan) = BuildPlan::from_alternatives(result.into_alternatives()) {
        let doc = to_table(&plan, &paths.plan_out)?;
        write_toml(ports, &paths.plan_out, &doc)?;
    }
    Ok(PhaseOutcome::Pass)
}

struct BuildPaths {
    layers: Utf8PathBuf,
    platform: Utf8PathBuf,
    plan: Utf8PathBuf,
}

pub fn run_build<F>(settings: &RunnerSettings, ports: &Ports<'_>, callback: F) -> PhaseRun
where
    F: FnOnce(BuildContext) -> anyhow::Result<BuildResult>,
{
    let mut machine = Machine::new(Phase::Build);
    let result = build_steps(&mut machine, settings, ports, callback);
    PhaseRun::finish(Phase::Build, machine, result)
}

fn build_steps<F>(
    machine: &mut Machine,
    settings: &RunnerSettings,
    ports: &Ports<'_>,
    callback: F,
) -> Result<PhaseOutcome, PhaseError>
where
    F: FnOnce(BuildContext) -> anyhow::Result<BuildResult>,
{
    let env = ports.env;
    let args = env.args();

    let module_dir = resolve_module_dir::<BuildpackDescriptor>(env, &args)?;
    let descriptor: BuildpackDescriptor = load_descriptor(&module_dir.path)?;
    let api = gate(descriptor.api.as_deref(), settings)?;
    let paths = match api.contract.layout_source() {
        LayoutSource::Arguments => {
            expect_args(Phase::Build, &args, 4)?;
            BuildPaths {
                layers: Utf8PathBuf::from(&args[1]),
                platform: Utf8PathBuf::from(&args[2]),
                plan: Utf8PathBuf::from(&args[3]),
            }
        }
        LayoutSource::Environment => BuildPaths {
            layers: require(env, vars::LAYERS_DIR)?,
            platform: require(env, vars::PLATFORM_DIR)?,
            plan: require(env, vars::BP_PLAN_PATH)?,
        },
    };
    machine.advance(State::GateChecked);

    require_env_module_dir::<BuildpackDescriptor>(api.contract, &module_dir)?;
    let stack_id = match api.contract.layout_source() {
        LayoutSource::Environment => Some(require_var(env, vars::STACK_ID)?),
        LayoutSource::Arguments => optional(env, vars::STACK_ID),
    };
    let plan: BuildpackPlan = read_toml(&paths.plan)?;
    let store_path = paths.layers.join(files::STORE_TOML);
    let store: Store = if store_path.is_file() {
        read_toml(&store_path)?
    } else {
        Store::default()
    };
    let layers = Layers::new(paths.layers.clone(), api.contract);

    let ctx = BuildContext {
        app_dir: app_dir(env)?,
        buildpack_dir: module_dir.path,
        descriptor,
        platform: load_platform(env, &paths.platform, settings)?,
        plan,
        store,
        api,
        stack_id,
        target: TargetInfo::from_lookup(|k| env.var(k)),
        layers: layers.clone(),
    };
    machine.advance(State::ContextBuilt);

    let result = callback(ctx).map_err(PhaseError::Callback)?;
    machine.advance(State::CallbackExecuted);

    reconcile_build(&layers, result, ports)?;
    machine.advance(State::ResultReconciled);
    Ok(PhaseOutcome::Pass)
}

/// Validate and encode everything first, reconcile layers, then write the
/// top-level documents.
fn reconcile_build(layers: &Layers, result: BuildResult, ports: &Ports<'_>) -> Result<(), PhaseError> {
    let contract = layers.contract();
    let dir = layers.dir();

    let has_bom = !result.launch.bom.is_empty() || !result.build.bom.is_empty();
    if has_bom && !contract.supports_sbom() {
        return Err(PhaseError::Configuration(
            "bill-of-materials entries require buildpack API 0.7 or later".to_string(),
        ));
    }
    let has_sboms = !result.launch_sboms.is_empty() || !result.build_sboms.is_empty();
    if has_sboms && !contract.supports_sbom() {
        return Err(PhaseError::Configuration(
            "SBOM files require buildpack API 0.7 or later".to_string(),
        ));
    }

    let launch_path = dir.join(files::LAUNCH_TOML);
    let launch_doc = if result.launch.is_empty() {
        None
    } else {
        Some(encode_launch(contract, &result.launch)?)
    };
    let build_path = dir.join(files::BUILD_TOML);
    let build_doc = if result.build.is_empty() {
        None
    } else {
        Some(to_table(&result.build, &build_path)?)
    };
    let store_path = dir.join(files::STORE_TOML);
    let store_doc = if result.store.is_empty() {
        None
    } else {
        Some(to_table(&result.store, &store_path)?)
    };

    let report = layers.reconcile(&result.layers, ports.toml, ports.env_writer)?;
    debug!(
        written = report.written.len(),
        removed = report.removed.len(),
        "reconciled layers"
    );

    if let Some(doc) = launch_doc {
        write_toml(ports, &launch_path, &doc)?;
    }
    if let Some(doc) = build_doc {
        write_toml(ports, &build_path, &doc)?;
    }
    if let Some(doc) = store_doc {
        write_toml(ports, &store_path, &doc)?;
    }
    layers.write_sboms("launch", &result.launch_sboms)?;
    layers.write_sboms("build", &result.build_sboms)?;
    Ok(())
}

pub fn run_generate<F>(settings: &RunnerSettings, ports: &Ports<'_>, callback: F) -> PhaseRun
where
    F: FnOnce(GenerateContext) -> anyhow::Result<GenerateResult>,
{
    let mut machine = Machine::new(Phase::Generate);
    let result = generate_steps(&mut machine, settings, ports, callback);
    PhaseRun::finish(Phase::Generate, machine, result)
}

fn generate_steps<F>(
    machine: &mut Machine,
    settings: &RunnerSettings,
    ports: &Ports<'_>,
    callback: F,
) -> Result<PhaseOutcome, PhaseError>
where
    F: FnOnce(GenerateContext) -> anyhow::Result<GenerateResult>,
{
    let env = ports.env;
    let args = env.args();

    let module_dir = resolve_module_dir::<ExtensionDescriptor>(env, &args)?;
    let descriptor: ExtensionDescriptor = load_descriptor(&module_dir.path)?;
    let api = gate(descriptor.api.as_deref(), settings)?;
    if !api.contract.supports_generate() {
        return Err(PhaseError::Configuration(format!(
            "generate requires buildpack API 0.8 or later, descriptor declares {}",
            api.version
        )));
    }
    let output_dir = require(env, vars::OUTPUT_DIR)?;
    let platform_dir = require(env, vars::PLATFORM_DIR)?;
    let plan_path = require(env, vars::BP_PLAN_PATH)?;
    machine.advance(State::GateChecked);

    require_env_module_dir::<ExtensionDescriptor>(api.contract, &module_dir)?;
    let ctx = GenerateContext {
        app_dir: app_dir(env)?,
        extension_dir: module_dir.path,
        output_dir: output_dir.clone(),
        descriptor,
        platform: load_platform(env, &platform_dir, settings)?,
        plan: read_toml(&plan_path)?,
        api,
        stack_id: optional(env, vars::STACK_ID),
        target: TargetInfo::from_lookup(|k| env.var(k)),
    };
    machine.advance(State::ContextBuilt);

    let result = callback(ctx).map_err(PhaseError::Callback)?;
    machine.advance(State::CallbackExecuted);

    let extend_path = output_dir.join(files::EXTEND_CONFIG_TOML);
    let extend_doc = if result.extend_config.is_empty() {
        None
    } else {
        Some(to_table(&result.extend_config, &extend_path)?)
    };
    if let Some(dockerfile) = &result.build_dockerfile {
        write_text(&output_dir.join(files::BUILD_DOCKERFILE), dockerfile)?;
    }
    if let Some(dockerfile) = &result.run_dockerfile {
        write_text(&output_dir.join(files::RUN_DOCKERFILE), dockerfile)?;
    }
    if let Some(doc) = extend_doc {
        write_toml(ports, &extend_path, &doc)?;
    }
    machine.advance(State::ResultReconciled);
    Ok(PhaseOutcome::Pass)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cnbind_types::launch::Process;
    use pretty_assertions::assert_eq;

    #[test]
    fn launch_command_shape_follows_contract() {
        let launch = Launch::new().process(
            Process::new("web", "node").args(["server.js"]).default(true),
        );

        let string_doc = encode_launch(Contract::EnvLayout, &launch).unwrap();
        let array_doc = encode_launch(Contract::ExecArray, &launch).unwrap();

        let string_proc = &string_doc["processes"].as_array().unwrap()[0];
        let array_proc = &array_doc["processes"].as_array().unwrap()[0];
        assert_eq!(string_proc["command"].as_str(), Some("node"));
        assert_eq!(
            array_proc["command"].as_array().unwrap()[0].as_str(),
            Some("node")
        );
    }

    #[test]
    fn direct_is_rejected_for_array_commands() {
        let launch = Launch::new().process(Process::new("web", "node").direct(true));
        let err = encode_launch(Contract::ExecArray, &launch).unwrap_err();
        assert!(matches!(err, PhaseError::Configuration(_)));
    }

    #[test]
    fn working_dir_is_rejected_for_string_commands() {
        let launch =
            Launch::new().process(Process::new("web", "node").working_directory("/workspace"));
        let err = encode_launch(Contract::Sbom, &launch).unwrap_err();
        assert!(matches!(err, PhaseError::Configuration(_)));
    }

    #[test]
    fn arg_count_message_names_expected_and_actual() {
        let err = expect_args(Phase::Build, &["build".to_string()], 4).unwrap_err();
        assert_eq!(
            err.to_string(),
            "usage: build expects 4 arguments (including the command), got 1"
        );
    }

    #[test]
    fn outcome_exit_codes_are_disjoint() {
        let pass = PhaseOutcome::Pass.exit_code();
        let fail = PhaseOutcome::Fail.exit_code();
        assert_ne!(pass, fail);
        assert_ne!(pass, exit::ERROR);
        assert_ne!(fail, exit::ERROR);
    }
}
