use serde::Deserialize;

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::consts::*;
use crate::core::stage;

/// A struct representing one sequencing sample.
///
/// File-like fields hold opaque references: remote URIs pass through to
/// the samplesheet untouched, while paths that resolve on the local
/// filesystem are relocated into the working directory before their row
/// is written. The short layout consumes `id`, `r1`, `r2` and
/// `run_label`; the hybrid layout consumes `id`, `r1`, `r2`,
/// `long_fastq`, `fast5` and `genome_size`.
///
/// # Example
///
/// ``` toml
/// [[samples]]
/// id = "ERR044595"
/// r1 = "s3://bucket/ERR044595_1.fastq.gz"
/// r2 = "s3://bucket/ERR044595_2.fastq.gz"
/// genome_size = "2.8m"
/// ```
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Sample {
    pub id: String,
    pub r1: String,
    pub r2: Option<String>,
    pub run_label: Option<String>,
    pub long_fastq: Option<String>,
    pub fast5: Option<String>,
    pub genome_size: Option<String>,
}

/// An enum representing the samplesheet layout expected by the pipeline.
///
/// The two deployments of the pipeline disagree on delimiter, column set
/// and null sentinel, so the layout is a per-deployment configuration
/// choice rather than a property of the samples.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Short,
    #[default]
    Hybrid,
}

impl Layout {
    pub fn delimiter(&self) -> char {
        match self {
            Self::Short => ',',
            Self::Hybrid => '\t',
        }
    }

    /// The token written for a logically absent optional field.
    pub fn sentinel(&self) -> &'static str {
        match self {
            Self::Short => "",
            Self::Hybrid => NA,
        }
    }

    pub fn header(&self) -> &'static [&'static str] {
        match self {
            Self::Short => SHORT_HEADER,
            Self::Hybrid => HYBRID_HEADER,
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Short => "samplesheet.csv",
            Self::Hybrid => "samplesheet.tsv",
        }
    }

    /// Project a sample onto this layout's column order.
    fn row(&self, sample: &Sample) -> Vec<String> {
        let cell = |field: &Option<String>| {
            field.clone().unwrap_or_else(|| self.sentinel().to_string())
        };

        match self {
            Self::Short => vec![
                sample.id.clone(),
                sample.r1.clone(),
                cell(&sample.r2),
                cell(&sample.run_label),
            ],
            Self::Hybrid => vec![
                sample.id.clone(),
                sample.r1.clone(),
                cell(&sample.r2),
                cell(&sample.long_fastq),
                cell(&sample.fast5),
                cell(&sample.genome_size),
            ],
        }
    }
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Short => write!(f, "short"),
            Self::Hybrid => write!(f, "hybrid"),
        }
    }
}

/// Write the samplesheet for a run.
///
/// Relocates any locally held input files into `dir` first, so every row
/// already points at its final location when it is written; the sheet is
/// complete on disk before the engine can observe it. Re-invocation with
/// the same inputs overwrites the previous sheet rather than appending.
///
/// # Arguments
///
/// * `samples` - Ordered sample records; rows are written in this order.
/// * `layout` - The samplesheet layout to render.
/// * `dir` - The working directory receiving the sheet and staged files.
///
/// # Returns
///
/// The path of the written samplesheet.
///
/// # Example
///
/// ``` rust, no_run
/// use bacass_launch::core::samplesheet::{write, Layout, Sample};
/// use std::path::Path;
///
/// let samples = vec![Sample {
///     id: "ERR044595".into(),
///     r1: "s3://bucket/ERR044595_1.fastq.gz".into(),
///     r2: Some("s3://bucket/ERR044595_2.fastq.gz".into()),
///     run_label: None,
///     long_fastq: None,
///     fast5: None,
///     genome_size: Some("2.8m".into()),
/// }];
///
/// let sheet = write(&samples, Layout::Hybrid, Path::new("/nf-workdir")).unwrap();
///
/// assert!(sheet.ends_with("samplesheet.tsv"));
/// ```
pub fn write(
    samples: &[Sample],
    layout: Layout,
    dir: &Path,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let staged = samples
        .iter()
        .map(|sample| relocate(sample, dir))
        .collect::<Result<Vec<_>, _>>()?;

    let path = dir.join(layout.file_name());
    let delimiter = layout.delimiter().to_string();
    let mut file = File::create(&path)?;

    writeln!(file, "{}", layout.header().join(&delimiter))?;
    for sample in &staged {
        writeln!(file, "{}", layout.row(sample).join(&delimiter))?;
    }

    log::info!(
        "INFO: Wrote {} samplesheet with {} sample/s to {}",
        layout,
        staged.len(),
        path.display()
    );

    Ok(path)
}

/// Move a sample's locally held files into the working directory and
/// rewrite the affected references.
fn relocate(sample: &Sample, dir: &Path) -> Result<Sample, Box<dyn std::error::Error>> {
    let stage = |reference: &String| stage_reference(reference, dir);

    Ok(Sample {
        id: sample.id.clone(),
        r1: stage(&sample.r1)?,
        r2: sample.r2.as_ref().map(stage).transpose()?,
        run_label: sample.run_label.clone(),
        long_fastq: sample.long_fastq.as_ref().map(stage).transpose()?,
        fast5: sample.fast5.as_ref().map(stage).transpose()?,
        genome_size: sample.genome_size.clone(),
    })
}

/// Stage one file reference.
///
/// References that do not resolve on the local filesystem (remote URIs,
/// paths only valid inside the engine's containers) pass through
/// untouched. Local files and directories are moved into `dir` and the
/// returned reference points at the new location. The move is complete
/// before the caller writes the row that mentions it.
fn stage_reference(reference: &str, dir: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let source = Path::new(reference);

    if !source.exists() {
        return Ok(reference.to_string());
    }
    if source.parent() == Some(dir) {
        return Ok(reference.to_string());
    }

    let name = source
        .file_name()
        .ok_or_else(|| format!("ERROR: input path has no file name: {}", reference))?;
    let dest = dir.join(name);

    if std::fs::rename(source, &dest).is_err() {
        // rename fails across filesystems; fall back to copy + remove
        if source.is_dir() {
            stage::mirror(source, &dest, &[])?;
            std::fs::remove_dir_all(source)?;
        } else {
            std::fs::copy(source, &dest)?;
            std::fs::remove_file(source)?;
        }
    }

    Ok(dest.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample(id: &str, r1: &str, r2: Option<&str>) -> Sample {
        Sample {
            id: id.into(),
            r1: r1.into(),
            r2: r2.map(|s| s.into()),
            run_label: None,
            long_fastq: None,
            fast5: None,
            genome_size: None,
        }
    }

    #[test]
    fn short_layout_renders_empty_sentinels_in_order() {
        let dir = tempdir().unwrap();
        let samples = vec![
            sample("ERR044595", "s3://bucket/a_1.fastq.gz", None),
            sample("ERR064912", "s3://bucket/b_1.fastq.gz", None),
        ];

        let path = write(&samples, Layout::Short, dir.path()).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "ID,R1,R2,Run");
        assert_eq!(lines[1], "ERR044595,s3://bucket/a_1.fastq.gz,,");
        assert_eq!(lines[2], "ERR064912,s3://bucket/b_1.fastq.gz,,");
    }

    #[test]
    fn hybrid_layout_renders_na_sentinels() {
        let dir = tempdir().unwrap();
        let mut record = sample("shortreads", "s3://bucket/S1_R1.fastq.gz", Some("s3://bucket/S1_R2.fastq.gz"));
        record.genome_size = Some("2.8m".into());

        let path = write(&[record], Layout::Hybrid, dir.path()).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "ID\tR1\tR2\tLongFastQ\tFast5\tGenomeSize");
        assert_eq!(
            lines[1],
            "shortreads\ts3://bucket/S1_R1.fastq.gz\ts3://bucket/S1_R2.fastq.gz\tNA\tNA\t2.8m"
        );
    }

    #[test]
    fn absent_fields_never_render_as_none() {
        let dir = tempdir().unwrap();
        let samples = vec![sample("x", "s3://bucket/x.fastq.gz", None)];

        for layout in [Layout::Short, Layout::Hybrid] {
            let path = write(&samples, layout, dir.path()).unwrap();
            let contents = std::fs::read_to_string(&path).unwrap();

            assert!(!contents.contains("None"));
            assert!(!contents.contains("null"));
        }
    }

    #[test]
    fn rewriting_the_same_sheet_is_byte_identical() {
        let dir = tempdir().unwrap();
        let samples = vec![
            sample("a", "s3://bucket/a.fastq.gz", Some("s3://bucket/a2.fastq.gz")),
            sample("b", "s3://bucket/b.fastq.gz", None),
        ];

        let first = write(&samples, Layout::Hybrid, dir.path()).unwrap();
        let once = std::fs::read(&first).unwrap();
        let second = write(&samples, Layout::Hybrid, dir.path()).unwrap();
        let twice = std::fs::read(&second).unwrap();

        assert_eq!(first, second);
        assert_eq!(once, twice);
    }

    #[test]
    fn local_inputs_move_into_the_working_directory() {
        let inputs = tempdir().unwrap();
        let workdir = tempdir().unwrap();
        let local = inputs.path().join("reads_1.fastq.gz");
        std::fs::write(&local, b"@read\nACGT\n+\nIIII\n").unwrap();

        let samples = vec![sample("s1", local.to_str().unwrap(), None)];
        let path = write(&samples, Layout::Short, workdir.path()).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();

        let staged = workdir.path().join("reads_1.fastq.gz");
        assert!(staged.exists());
        assert!(!local.exists());
        assert!(contents.contains(staged.to_str().unwrap()));
    }

    #[test]
    fn remote_references_pass_through_untouched() {
        let dir = tempdir().unwrap();
        let samples = vec![sample("s1", "latch:///inputs/reads_1.fastq.gz", None)];

        let path = write(&samples, Layout::Short, dir.path()).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();

        assert!(contents.contains("latch:///inputs/reads_1.fastq.gz"));
    }
}
