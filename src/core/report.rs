use std::path::Path;
use std::process::{Child, Command, Output, Stdio};
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::consts::*;
use crate::core::provision;
use crate::executor::runner::{RunOutcome, RunState};

/// Run the post-run reporting phase.
///
/// Always executes, for failed pipelines as much as successful ones. The
/// two steps are independent and best-effort: a failure in either is
/// logged and never escalates, and neither can overwrite the success flag
/// captured from the engine's exit status.
pub fn finalize(config: &Config, workdir: &Path, state: RunState) -> RunOutcome {
    let mut outcome = RunOutcome {
        success: state == RunState::Succeeded,
        used_bytes: None,
    };

    if let Err(err) = upload_log(config, workdir) {
        log::warn!("WARN: log upload failed: {}", err);
    }

    match measure(workdir) {
        Ok(bytes) => {
            outcome.used_bytes = Some(bytes);
            if let Err(err) = report_usage(config, bytes) {
                log::warn!("WARN: storage usage report failed: {}", err);
            }
        }
        Err(err) => log::warn!("WARN: storage measurement failed: {}", err),
    }

    outcome
}

/// Upload the engine log to durable storage, keyed by execution name.
///
/// Missing log file and unresolvable execution name are both skips, not
/// failures; the run already has a status and the log is a convenience.
fn upload_log(config: &Config, workdir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let log_file = workdir.join(ENGINE_LOG);
    if !log_file.exists() {
        return Ok(());
    }

    let name = match provision::execution_name() {
        Some(name) => name,
        None => {
            log::info!("INFO: Skipping logs upload, failed to get execution name");
            return Ok(());
        }
    };

    let remote = format!(
        "{}/{}/{}/{}",
        LOG_REMOTE_ROOT, config.metadata.pipeline, name, LOG_REMOTE_NAME
    );
    log::info!("INFO: Uploading {} to {}", ENGINE_LOG, remote);

    let token = provision::execution_token()?;
    let client = reqwest::blocking::Client::new();
    client
        .put(format!("{}{}", config.storage.endpoint, UPLOAD_ROUTE))
        .header("Authorization", format!("{} {}", TOKEN_SCHEME, token))
        .query(&[("path", remote.as_str())])
        .body(std::fs::read(&log_file)?)
        .send()?
        .error_for_status()?;

    Ok(())
}

/// Measure the working directory size, bounded by the measurement budget.
fn measure(workdir: &Path) -> Result<u64, Box<dyn std::error::Error>> {
    let child = Command::new("du")
        .arg("-sb")
        .arg(workdir)
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()?;

    let output = bounded_wait(child, Duration::from_secs(USAGE_TIMEOUT_SECS))?;
    if !output.status.success() {
        return Err(format!("ERROR: du exited with {}", output.status).into());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let bytes = stdout
        .split_whitespace()
        .next()
        .ok_or("ERROR: empty du output")?
        .parse::<u64>()?;

    Ok(bytes)
}

/// Report the measured working-directory size to the platform.
fn report_usage(config: &Config, bytes: u64) -> Result<(), Box<dyn std::error::Error>> {
    let token = provision::execution_token()?;

    let client = reqwest::blocking::Client::new();
    client
        .post(format!("{}{}", config.storage.endpoint, USAGE_ROUTE))
        .header("Authorization", format!("{} {}", TOKEN_SCHEME, token))
        .json(&serde_json::json!({
            "used_bytes": bytes,
            "measured_at": chrono::Utc::now().to_rfc3339(),
        }))
        .send()?
        .error_for_status()?;

    log::info!("INFO: Reported {} bytes of working directory usage", bytes);

    Ok(())
}

/// Wait for a child process, killing it once the deadline passes.
pub(crate) fn bounded_wait(
    mut child: Child,
    timeout: Duration,
) -> Result<Output, Box<dyn std::error::Error>> {
    let deadline = Instant::now() + timeout;

    loop {
        if child.try_wait()?.is_some() {
            return Ok(child.wait_with_output()?);
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(format!("child did not exit within {:?}", timeout).into());
        }
        std::thread::sleep(Duration::from_millis(250));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn bounded_wait_returns_output_for_quick_children() {
        let child = Command::new("echo")
            .arg("4096\t/nf-workdir")
            .stdout(Stdio::piped())
            .spawn()
            .unwrap();

        let output = bounded_wait(child, Duration::from_secs(5)).unwrap();

        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).starts_with("4096"));
    }

    #[test]
    fn bounded_wait_kills_children_past_the_deadline() {
        let child = Command::new("sleep").arg("60").spawn().unwrap();
        let start = Instant::now();

        let result = bounded_wait(child, Duration::from_millis(300));

        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("did not exit"));
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn measure_reports_a_nonzero_size() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("main.nf"), b"workflow {}").unwrap();

        let bytes = measure(dir.path()).unwrap();

        assert!(bytes > 0);
    }

    #[test]
    fn finalize_preserves_failure_when_reporting_degrades() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(ENGINE_LOG), b"engine log").unwrap();

        // unreachable dispatcher: both reporting steps degrade to warnings
        let config: Config = toml::from_str(
            r#"
            [metadata]
            run_name = "test_run"

            [storage]
            endpoint = "http://127.0.0.1:9"

            [params]
            outdir = "latch:///Bacass"
        "#,
        )
        .unwrap();

        let outcome = finalize(&config, dir.path(), RunState::Failed);

        assert!(!outcome.success);
        assert!(outcome.used_bytes.is_some());
    }
}
