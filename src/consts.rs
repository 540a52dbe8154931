// dispatcher service
pub const DISPATCHER_ENDPOINT: &str = "http://nf-dispatcher-service.flyte.svc.cluster.local";
pub const PROVISION_ROUTE: &str = "/provision-storage";
pub const UPLOAD_ROUTE: &str = "/upload-artifact";
pub const USAGE_ROUTE: &str = "/storage-usage";
pub const TOKEN_SCHEME: &str = "Latch-Execution-Token";
pub const EXECUTION_ID_ENV: &str = "FLYTE_INTERNAL_EXECUTION_ID";

// engine invocation defaults
pub const ENGINE_BINARY: &str = "/root/nextflow";
pub const ENGINE_DEFINITION: &str = "main.nf";
pub const ENGINE_CONFIG: &str = "latch.config";
pub const ENGINE_PROFILE: &str = "docker";
pub const SOURCE_ROOT: &str = "/root";
pub const WORK_ROOT: &str = "/nf-workdir";

// engine environment overlay
pub const NXF_HOME_ENV: &str = "NXF_HOME";
pub const NXF_HOME: &str = "/root/.nextflow";
pub const NXF_OPTS_ENV: &str = "NXF_OPTS";
pub const NXF_OPTS: &str = "-Xms2048M -Xmx8G -XX:ActiveProcessorCount=4";
pub const CLAIM_NAME_ENV: &str = "K8S_STORAGE_CLAIM_NAME";
pub const DISABLE_CHECK_LATEST_ENV: &str = "NXF_DISABLE_CHECK_LATEST";
pub const VIRTUAL_THREADS_ENV: &str = "NXF_ENABLE_VIRTUAL_THREADS";

// staging | names never mirrored into the working directory
pub const STAGE_IGNORE: &[&str] = &[
    "latch",
    ".latch",
    "nextflow",
    ".nextflow",
    "work",
    "results",
    "miniconda",
    "anaconda3",
    "mambaforge",
];

// samplesheet
pub const SHORT_HEADER: &[&str] = &["ID", "R1", "R2", "Run"];
pub const HYBRID_HEADER: &[&str] = &["ID", "R1", "R2", "LongFastQ", "Fast5", "GenomeSize"];
pub const NA: &str = "NA";

// reporting
pub const ENGINE_LOG: &str = ".nextflow.log";
pub const LOG_REMOTE_ROOT: &str = "latch:///nextflow-logs";
pub const LOG_REMOTE_NAME: &str = "nextflow.log";
pub const USAGE_TIMEOUT_SECS: u64 = 300;

// defaults
pub const DEFAULT_PIPELINE: &str = "nf_nf_core_bacass";
pub const DEFAULT_STORAGE_GIB: u64 = 100;
pub const LAUNCH_SCRIPT: &str = "launch.sh";
