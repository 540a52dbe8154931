use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::consts::*;
use crate::executor::job::EngineCommand;
use crate::executor::runner::{self, RunOutcome, Runner};

pub mod provision;
pub mod report;
pub mod samplesheet;
pub mod stage;

/// Run the pipeline from provisioning through reporting.
///
/// The phases are strictly sequential: provision shared storage, mirror
/// the task image into the working directory, write the samplesheet,
/// build the command vector, execute the engine, then report. Errors
/// before the engine starts propagate immediately; once the engine has
/// run, reporting always happens and the captured outcome decides the
/// process exit code in `main`.
///
/// # Example
///
/// ``` rust, no_run
/// use bacass_launch::config::Config;
/// use bacass_launch::core::run;
///
/// let config = Config::read("launch.toml".into()).unwrap();
/// let outcome = run(config).unwrap();
///
/// assert!(outcome.success);
/// ```
pub fn run(config: Config) -> Result<RunOutcome, Box<dyn std::error::Error>> {
    log::info!(
        "INFO: Starting run {} of {}",
        config.metadata.run_name,
        config.metadata.pipeline
    );

    let volume = provision::provision(&config.storage)?;

    let source = PathBuf::from(&config.engine.source_root);
    let workdir = PathBuf::from(&config.engine.work_root);
    stage::mirror(&source, &workdir, STAGE_IGNORE)?;

    let sheet = samplesheet::write(&config.samples, config.samplesheet.layout, &workdir)?;
    let cmd = engine_command(&config, &sheet, &workdir);

    let mut engine = Runner::new();
    let state = engine.execute(&cmd, &runner::overlay(&volume), &workdir);

    Ok(report::finalize(&config, &workdir, state))
}

/// Stage the samplesheet and write the launch command without running.
///
/// # Arguments
///
/// * `config` - The launch configuration.
/// * `out` - Directory receiving the samplesheet and the launch script.
///
/// # Example
///
/// ``` rust, no_run
/// use bacass_launch::config::Config;
/// use bacass_launch::core::write;
/// use std::path::PathBuf;
///
/// let config = Config::read("launch.toml".into()).unwrap();
/// write(config, PathBuf::from("staging")).unwrap();
/// ```
pub fn write(config: Config, out: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&out)?;

    let sheet = samplesheet::write(&config.samples, config.samplesheet.layout, &out)?;
    let workdir = PathBuf::from(&config.engine.work_root);
    let cmd = engine_command(&config, &sheet, &workdir);

    let script = out.join(LAUNCH_SCRIPT);
    std::fs::write(&script, format!("#!/usr/bin/env bash\n\n{}\n", cmd.line()))?;

    log::info!("INFO: Wrote launch command to {}", script.display());

    Ok(())
}

/// Build the engine invocation for one run.
///
/// The fixed prefix (`run`, definition, working directory, profile,
/// engine config, optional resume) comes first, followed by the pipeline
/// flags in their declaration order.
pub fn engine_command(config: &Config, samplesheet: &Path, workdir: &Path) -> EngineCommand {
    EngineCommand::new(&config.engine.binary)
        .arg("run")
        .arg(workdir.join(&config.engine.definition).display())
        .arg("-work-dir")
        .arg(workdir.display())
        .arg("-profile")
        .arg(&config.engine.profile)
        .arg("-c")
        .arg(&config.engine.nf_config)
        .arg_if(config.engine.resume, "-resume")
        .flags(config.params.flags(samplesheet))
}
