use std::path::Path;
use std::process::Command;

use crate::consts::*;
use crate::executor::job::EngineCommand;

/// States the engine invocation moves through.
///
/// `NotStarted → Running → {Succeeded, Failed}`. Both terminal states
/// hand control to the reporting phase before the run surfaces its final
/// status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running,
    Succeeded,
    Failed,
}

/// Outcome of one run: the success flag set by the engine's exit status
/// and the working-directory size measured afterwards, when measurement
/// succeeded within its budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub success: bool,
    pub used_bytes: Option<u64>,
}

/// Struct owning one engine invocation.
///
/// # Example
///
/// ``` rust, no_run
/// use bacass_launch::executor::job::EngineCommand;
/// use bacass_launch::executor::runner::{overlay, RunState, Runner};
/// use std::path::Path;
///
/// let cmd = EngineCommand::new("/root/nextflow").arg("run");
/// let mut runner = Runner::new();
/// let state = runner.execute(&cmd, &overlay("volume-1"), Path::new("/nf-workdir"));
///
/// assert_ne!(state, RunState::Running);
/// ```
#[derive(Debug)]
pub struct Runner {
    state: RunState,
}

impl Runner {
    pub fn new() -> Self {
        Self {
            state: RunState::NotStarted,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run the engine synchronously to completion.
    ///
    /// The engine owns the working directory for the duration of the
    /// call; there is no timeout on the invocation itself. A non-zero
    /// exit code or a spawn failure is captured as `Failed` rather than
    /// raised, so log collection and storage accounting still happen for
    /// failed pipelines.
    ///
    /// # Arguments
    ///
    /// * `cmd` - The engine command vector.
    /// * `env` - Environment overlay applied on top of the inherited
    ///   environment.
    /// * `cwd` - The staged working directory.
    pub fn execute(
        &mut self,
        cmd: &EngineCommand,
        env: &[(String, String)],
        cwd: &Path,
    ) -> RunState {
        log::info!("INFO: Launching Nextflow runtime");
        log::info!("{}", cmd.line());

        self.state = RunState::Running;

        let status = Command::new(cmd.program())
            .args(cmd.args())
            .envs(env.iter().map(|(key, value)| (key.as_str(), value.as_str())))
            .current_dir(cwd)
            .status();

        self.state = match status {
            Ok(status) if status.success() => RunState::Succeeded,
            Ok(status) => {
                log::error!("ERROR: Engine exited with {}", status);
                RunState::Failed
            }
            Err(err) => {
                log::error!("ERROR: Failed to launch engine: {}", err);
                RunState::Failed
            }
        };

        self.state
    }
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the environment overlay for the engine process.
///
/// Pins the engine home, JVM heap and processor tuning, the provisioned
/// volume claim, and switches off the update check and virtual threads.
pub fn overlay(volume: &str) -> Vec<(String, String)> {
    [
        (NXF_HOME_ENV, NXF_HOME),
        (NXF_OPTS_ENV, NXF_OPTS),
        (CLAIM_NAME_ENV, volume),
        (DISABLE_CHECK_LATEST_ENV, "true"),
        (VIRTUAL_THREADS_ENV, "false"),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value.to_string()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::job::EngineCommand;
    use tempfile::tempdir;

    #[test]
    fn runner_starts_idle() {
        assert_eq!(Runner::new().state(), RunState::NotStarted);
    }

    #[test]
    fn zero_exit_is_captured_as_success() {
        let dir = tempdir().unwrap();
        let mut runner = Runner::new();

        let state = runner.execute(&EngineCommand::new("true"), &[], dir.path());

        assert_eq!(state, RunState::Succeeded);
        assert_eq!(runner.state(), RunState::Succeeded);
    }

    #[test]
    fn nonzero_exit_is_captured_without_raising() {
        let dir = tempdir().unwrap();
        let mut runner = Runner::new();

        let state = runner.execute(&EngineCommand::new("false"), &[], dir.path());

        assert_eq!(state, RunState::Failed);
    }

    #[test]
    fn missing_binary_is_captured_without_raising() {
        let dir = tempdir().unwrap();
        let mut runner = Runner::new();

        let state = runner.execute(
            &EngineCommand::new("definitely-not-a-real-engine"),
            &[],
            dir.path(),
        );

        assert_eq!(state, RunState::Failed);
    }

    #[test]
    fn overlay_carries_the_volume_claim() {
        let env = overlay("expanded-storage-abc123");

        assert!(env.contains(&(
            CLAIM_NAME_ENV.to_string(),
            "expanded-storage-abc123".to_string()
        )));
        assert!(env.contains(&(DISABLE_CHECK_LATEST_ENV.to_string(), "true".to_string())));
        assert!(env.contains(&(VIRTUAL_THREADS_ENV.to_string(), "false".to_string())));
    }
}
