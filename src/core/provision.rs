use serde::Deserialize;

use crate::config::Storage;
use crate::consts::*;

#[derive(Deserialize, Debug)]
struct ProvisionResponse {
    name: String,
}

/// Read the execution token from the task environment.
///
/// The token authenticates every dispatcher call; a missing token is
/// unrecoverable for the run.
pub fn execution_token() -> Result<String, Box<dyn std::error::Error>> {
    Ok(std::env::var(EXECUTION_ID_ENV).map_err(|_| "ERROR: failed to get execution token")?)
}

/// Resolve the unique execution name, if the platform exposed one.
pub fn execution_name() -> Option<String> {
    std::env::var(EXECUTION_ID_ENV).ok()
}

/// Provision the shared storage volume for this run.
///
/// Issues one authenticated request to the dispatcher service and returns
/// the volume identifier consumed by the engine's environment overlay.
/// Any non-success response aborts the run before file I/O begins.
///
/// # Example
///
/// ``` rust, no_run
/// use bacass_launch::config::Storage;
/// use bacass_launch::core::provision::provision;
///
/// let volume = provision(&Storage::default()).unwrap();
/// ```
pub fn provision(storage: &Storage) -> Result<String, Box<dyn std::error::Error>> {
    let token = execution_token()?;

    log::info!("INFO: Provisioning shared storage volume...");

    let client = reqwest::blocking::Client::new();
    let response = client
        .post(format!("{}{}", storage.endpoint, PROVISION_ROUTE))
        .header("Authorization", format!("{} {}", TOKEN_SCHEME, token))
        .json(&serde_json::json!({ "storage_gib": storage.size_gib }))
        .send()?
        .error_for_status()?;

    let body: ProvisionResponse = response.json()?;

    log::info!("INFO: Provisioned volume {}", body.name);

    Ok(body.name)
}
