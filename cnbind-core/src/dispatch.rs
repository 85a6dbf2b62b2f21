//! Single-binary entry points.
//!
//! A buildpack ships one executable linked as `bin/detect` and `bin/build`
//! (an extension: `bin/detect` and `bin/generate`); the phase is picked from
//! the basename of argv[0].

use camino::Utf8Path;
use cnbind_types::descriptor::{BuildpackDescriptor, ExtensionDescriptor};

use crate::context::{BuildContext, DetectContext, GenerateContext};
use crate::pipeline::{PhaseRun, finish, run_build, run_detect, run_generate};
use crate::ports::Ports;
use crate::result::{BuildResult, DetectResult, GenerateResult};
use crate::settings::RunnerSettings;
use crate::state::Phase;
use crate::{PhaseError, logging};

pub trait Buildpack {
    fn detect(&self, ctx: DetectContext) -> anyhow::Result<DetectResult>;
    fn build(&self, ctx: BuildContext) -> anyhow::Result<BuildResult>;
}

pub trait Extension {
    fn detect(&self, ctx: DetectContext<ExtensionDescriptor>) -> anyhow::Result<DetectResult>;
    fn generate(&self, ctx: GenerateContext) -> anyhow::Result<GenerateResult>;
}

fn entry_point(ports: &Ports<'_>) -> Option<String> {
    ports
        .env
        .args()
        .first()
        .and_then(|argv0| Utf8Path::new(argv0).file_name().map(str::to_string))
}

fn unknown_entry_point(phase: Phase, name: Option<String>, expected: &str) -> PhaseRun {
    PhaseRun {
        phase,
        states: Vec::new(),
        result: Err(PhaseError::Usage(format!(
            "unknown entry point '{}': expected {}",
            name.unwrap_or_default(),
            expected
        ))),
    }
}

/// Run the phase argv[0] names and pass its status to the exit port.
pub fn run_buildpack_with<B: Buildpack>(
    buildpack: &B,
    settings: &RunnerSettings,
    ports: &Ports<'_>,
) -> i32 {
    let name = entry_point(ports);
    let run = match name.as_deref() {
        Some("detect") => {
            run_detect::<BuildpackDescriptor, _>(settings, ports, |ctx| buildpack.detect(ctx))
        }
        Some("build") => run_build(settings, ports, |ctx| buildpack.build(ctx)),
        _ => unknown_entry_point(Phase::Detect, name, "detect or build"),
    };
    finish(run, ports)
}

pub fn run_extension_with<E: Extension>(
    extension: &E,
    settings: &RunnerSettings,
    ports: &Ports<'_>,
) -> i32 {
    let name = entry_point(ports);
    let run = match name.as_deref() {
        Some("detect") => {
            run_detect::<ExtensionDescriptor, _>(settings, ports, |ctx| extension.detect(ctx))
        }
        Some("generate") => run_generate(settings, ports, |ctx| extension.generate(ctx)),
        _ => unknown_entry_point(Phase::Generate, name, "detect or generate"),
    };
    finish(run, ports)
}

/// `main` for a buildpack binary: default settings, real process.
pub fn run_buildpack<B: Buildpack>(buildpack: &B) -> i32 {
    logging::init();
    run_buildpack_with(buildpack, &RunnerSettings::default(), &Ports::process())
}

/// `main` for an image extension binary.
pub fn run_extension<E: Extension>(extension: &E) -> i32 {
    logging::init();
    run_extension_with(extension, &RunnerSettings::default(), &Ports::process())
}
