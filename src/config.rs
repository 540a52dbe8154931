use serde::Deserialize;

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::consts::*;
use crate::core::samplesheet::{Layout, Sample};
use crate::executor::job::FlagValue;

/// A struct representing a launch configuration file.
///
/// # Fields
///
/// * `metadata` - Run identity (run name, pipeline name).
/// * `storage` - Shared storage provisioning settings.
/// * `engine` - Workflow engine invocation settings.
/// * `samplesheet` - Samplesheet layout selection.
/// * `params` - The pipeline parameter set.
/// * `samples` - Ordered sample records for this run.
///
/// # Example
///
/// ``` toml
/// [metadata]
/// run_name = "assembly_batch_3"
///
/// [samplesheet]
/// layout = "hybrid"
///
/// [params]
/// outdir = "latch:///Bacass"
/// assembler = "unicycler"
///
/// [[samples]]
/// id = "ERR044595"
/// r1 = "s3://bucket/ERR044595_1.fastq.gz"
/// r2 = "s3://bucket/ERR044595_2.fastq.gz"
/// ```
#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub metadata: Metadata,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub engine: Engine,
    #[serde(default)]
    pub samplesheet: Samplesheet,
    pub params: Params,
    #[serde(default)]
    pub samples: Vec<Sample>,
}

impl Config {
    /// Read a launch configuration file and return a Config struct.
    ///
    /// # Arguments
    ///
    /// * `config` - A PathBuf containing the path to the configuration file.
    ///
    /// # Returns
    ///
    /// A Result containing a Config struct or an error.
    ///
    /// # Example
    ///
    /// ``` rust, no_run
    /// use bacass_launch::config::Config;
    /// use std::path::PathBuf;
    ///
    /// let config = Config::read(PathBuf::from("launch.toml")).unwrap();
    /// ```
    pub fn read(config: PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let mut file = File::open(config)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: Config = toml::from_str(&contents)?;

        Ok(config)
    }
}

/// Run identity metadata.
///
/// # Example
///
/// ``` toml
/// [metadata]
/// run_name = "assembly_batch_3"
/// pipeline = "nf_nf_core_bacass"
/// ```
#[derive(Deserialize, Debug, Clone)]
pub struct Metadata {
    pub run_name: String,
    #[serde(default = "default_pipeline")]
    pub pipeline: String,
}

/// Shared storage provisioning settings.
#[derive(Deserialize, Debug, Clone)]
pub struct Storage {
    #[serde(default = "default_storage_gib")]
    pub size_gib: u64,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl Default for Storage {
    fn default() -> Self {
        Self {
            size_gib: DEFAULT_STORAGE_GIB,
            endpoint: DISPATCHER_ENDPOINT.into(),
        }
    }
}

/// Workflow engine invocation settings.
///
/// All fields default to the values baked into the task image, so a
/// configuration file only needs this section to point the launcher at a
/// non-standard engine build or to enable `-resume`.
///
/// # Example
///
/// ``` toml
/// [engine]
/// binary = "/root/nextflow"
/// resume = true
/// ```
#[derive(Deserialize, Debug, Clone)]
pub struct Engine {
    #[serde(default = "default_binary")]
    pub binary: String,
    #[serde(default = "default_definition")]
    pub definition: String,
    #[serde(default = "default_nf_config")]
    pub nf_config: String,
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default)]
    pub resume: bool,
    #[serde(default = "default_source_root")]
    pub source_root: String,
    #[serde(default = "default_work_root")]
    pub work_root: String,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            binary: ENGINE_BINARY.into(),
            definition: ENGINE_DEFINITION.into(),
            nf_config: ENGINE_CONFIG.into(),
            profile: ENGINE_PROFILE.into(),
            resume: false,
            source_root: SOURCE_ROOT.into(),
            work_root: WORK_ROOT.into(),
        }
    }
}

/// Samplesheet layout selection.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct Samplesheet {
    #[serde(default)]
    pub layout: Layout,
}

/// The pipeline parameter set.
///
/// Every field maps to one `--flag` of the external pipeline. Optional
/// fields that are not set in the configuration file emit nothing. The
/// enumerated choices (assembler, assembly type, polish method, annotation
/// tool) are closed sets whose only consumer is string rendering into the
/// command vector.
///
/// # Example
///
/// ``` toml
/// [params]
/// outdir = "latch:///Bacass"
/// assembly_type = "short"
/// skip_kraken2 = true
/// unicycler_args = "--no_correct --no_pilon"
/// ```
#[derive(Deserialize, Debug, Clone)]
pub struct Params {
    pub outdir: String,
    pub email: Option<String>,
    pub fastp_args: Option<String>,
    pub save_trimmed: Option<bool>,
    pub save_trimmed_fail: Option<bool>,
    pub save_merged: Option<bool>,
    pub skip_fastqc: Option<bool>,
    pub skip_fastp: Option<bool>,
    pub kraken2db: Option<String>,
    pub kmerfinderdb: Option<String>,
    pub reference_fasta: Option<String>,
    pub reference_gff: Option<String>,
    pub ncbi_assembly_metadata: Option<String>,
    pub assembler: Option<Assembler>,
    pub assembly_type: Option<AssemblyType>,
    pub unicycler_args: Option<String>,
    pub canu_mode: Option<CanuMode>,
    pub canu_args: Option<String>,
    pub dragonflye_args: Option<String>,
    pub polish_method: Option<PolishMethod>,
    pub annotation_tool: Option<AnnotationTool>,
    pub prokka_args: Option<String>,
    pub baktadb: Option<String>,
    pub baktadb_download: Option<bool>,
    pub baktadb_download_args: Option<BaktaDbType>,
    pub dfast_config: Option<String>,
    pub skip_kraken2: Option<bool>,
    pub skip_kmerfinder: Option<bool>,
    pub skip_annotation: Option<bool>,
    pub skip_pycoqc: Option<bool>,
    pub skip_polish: Option<bool>,
    pub skip_multiqc: Option<bool>,
    pub multiqc_title: Option<String>,
    pub multiqc_methods_description: Option<String>,
}

impl Params {
    /// Project the parameter set onto the fixed flag declaration order.
    ///
    /// # Arguments
    ///
    /// * `input` - Path of the staged samplesheet, emitted as `--input`.
    ///
    /// # Returns
    ///
    /// An ordered list of (flag name, optional value) pairs. The order is
    /// stable across invocations so that identical parameter sets produce
    /// identical command vectors; the engine's own resume cache keys on
    /// the rendered command line.
    ///
    /// # Example
    ///
    /// ``` rust, no_run
    /// use bacass_launch::config::Config;
    /// use std::path::Path;
    ///
    /// let config = Config::read("launch.toml".into()).unwrap();
    /// let pairs = config.params.flags(Path::new("/nf-workdir/samplesheet.tsv"));
    ///
    /// assert_eq!(pairs[0].0, "input");
    /// ```
    pub fn flags(&self, input: &Path) -> Vec<(&'static str, Option<FlagValue>)> {
        vec![
            ("input", Some(FlagValue::text(input.display()))),
            ("outdir", Some(FlagValue::text(&self.outdir))),
            ("email", self.email.as_ref().map(FlagValue::text)),
            ("fastp_args", self.fastp_args.as_ref().map(FlagValue::text)),
            ("save_trimmed", self.save_trimmed.map(FlagValue::Switch)),
            (
                "save_trimmed_fail",
                self.save_trimmed_fail.map(FlagValue::Switch),
            ),
            ("save_merged", self.save_merged.map(FlagValue::Switch)),
            ("skip_fastqc", self.skip_fastqc.map(FlagValue::Switch)),
            ("skip_fastp", self.skip_fastp.map(FlagValue::Switch)),
            ("kraken2db", self.kraken2db.as_ref().map(FlagValue::text)),
            (
                "kmerfinderdb",
                self.kmerfinderdb.as_ref().map(FlagValue::text),
            ),
            (
                "reference_fasta",
                self.reference_fasta.as_ref().map(FlagValue::text),
            ),
            (
                "reference_gff",
                self.reference_gff.as_ref().map(FlagValue::text),
            ),
            (
                "ncbi_assembly_metadata",
                self.ncbi_assembly_metadata.as_ref().map(FlagValue::text),
            ),
            ("assembler", self.assembler.as_ref().map(FlagValue::text)),
            (
                "assembly_type",
                self.assembly_type.as_ref().map(FlagValue::text),
            ),
            (
                "unicycler_args",
                self.unicycler_args.as_ref().map(FlagValue::text),
            ),
            ("canu_mode", self.canu_mode.as_ref().map(FlagValue::text)),
            ("canu_args", self.canu_args.as_ref().map(FlagValue::text)),
            (
                "dragonflye_args",
                self.dragonflye_args.as_ref().map(FlagValue::text),
            ),
            (
                "polish_method",
                self.polish_method.as_ref().map(FlagValue::text),
            ),
            (
                "annotation_tool",
                self.annotation_tool.as_ref().map(FlagValue::text),
            ),
            ("prokka_args", self.prokka_args.as_ref().map(FlagValue::text)),
            ("baktadb", self.baktadb.as_ref().map(FlagValue::text)),
            (
                "baktadb_download",
                self.baktadb_download.map(FlagValue::Switch),
            ),
            (
                "baktadb_download_args",
                self.baktadb_download_args.as_ref().map(FlagValue::text),
            ),
            (
                "dfast_config",
                self.dfast_config.as_ref().map(FlagValue::text),
            ),
            ("skip_kraken2", self.skip_kraken2.map(FlagValue::Switch)),
            (
                "skip_kmerfinder",
                self.skip_kmerfinder.map(FlagValue::Switch),
            ),
            (
                "skip_annotation",
                self.skip_annotation.map(FlagValue::Switch),
            ),
            ("skip_pycoqc", self.skip_pycoqc.map(FlagValue::Switch)),
            ("skip_polish", self.skip_polish.map(FlagValue::Switch)),
            ("skip_multiqc", self.skip_multiqc.map(FlagValue::Switch)),
            (
                "multiqc_title",
                self.multiqc_title.as_ref().map(FlagValue::text),
            ),
            (
                "multiqc_methods_description",
                self.multiqc_methods_description
                    .as_ref()
                    .map(FlagValue::text),
            ),
        ]
    }
}

/// An enum representing the supported assemblers.
///
/// # Example
///
/// ``` rust, no_run
/// use bacass_launch::config::Assembler;
///
/// let assembler = Assembler::Unicycler;
///
/// assert_eq!(assembler.to_string(), "unicycler");
/// ```
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Assembler {
    Unicycler,
    Canu,
    Miniasm,
    Dragonflye,
}

impl std::fmt::Display for Assembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unicycler => write!(f, "unicycler"),
            Self::Canu => write!(f, "canu"),
            Self::Miniasm => write!(f, "miniasm"),
            Self::Dragonflye => write!(f, "dragonflye"),
        }
    }
}

/// An enum representing the assembly strategy.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AssemblyType {
    Short,
    Long,
    Hybrid,
}

impl std::fmt::Display for AssemblyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Short => write!(f, "short"),
            Self::Long => write!(f, "long"),
            Self::Hybrid => write!(f, "hybrid"),
        }
    }
}

/// An enum representing the technologies Canu accepts for long reads.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CanuMode {
    Pacbio,
    Nanopore,
    PacbioHifi,
}

impl std::fmt::Display for CanuMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pacbio => write!(f, "pacbio"),
            Self::Nanopore => write!(f, "nanopore"),
            Self::PacbioHifi => write!(f, "pacbio-hifi"),
        }
    }
}

/// An enum representing the long-read polishing method.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PolishMethod {
    Medaka,
    Nanopolish,
}

impl std::fmt::Display for PolishMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Medaka => write!(f, "medaka"),
            Self::Nanopolish => write!(f, "nanopolish"),
        }
    }
}

/// An enum representing the annotation tool.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationTool {
    Prokka,
    Bakta,
    Dfast,
}

impl std::fmt::Display for AnnotationTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Prokka => write!(f, "prokka"),
            Self::Bakta => write!(f, "bakta"),
            Self::Dfast => write!(f, "dfast"),
        }
    }
}

/// An enum representing the Bakta database flavor to download.
///
/// Renders as the literal argument string the download module expects.
///
/// # Example
///
/// ``` rust, no_run
/// use bacass_launch::config::BaktaDbType;
///
/// let db = BaktaDbType::Light;
///
/// assert_eq!(db.to_string(), "--type light");
/// ```
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BaktaDbType {
    Light,
    Full,
}

impl std::fmt::Display for BaktaDbType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Light => write!(f, "--type light"),
            Self::Full => write!(f, "--type full"),
        }
    }
}

fn default_pipeline() -> String {
    DEFAULT_PIPELINE.into()
}

fn default_storage_gib() -> u64 {
    DEFAULT_STORAGE_GIB
}

fn default_endpoint() -> String {
    DISPATCHER_ENDPOINT.into()
}

fn default_binary() -> String {
    ENGINE_BINARY.into()
}

fn default_definition() -> String {
    ENGINE_DEFINITION.into()
}

fn default_nf_config() -> String {
    ENGINE_CONFIG.into()
}

fn default_profile() -> String {
    ENGINE_PROFILE.into()
}

fn default_source_root() -> String {
    SOURCE_ROOT.into()
}

fn default_work_root() -> String {
    WORK_ROOT.into()
}
