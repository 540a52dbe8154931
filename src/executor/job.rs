/// A value attached to one pipeline flag.
///
/// Two shapes exist: free-text values that render as `--flag value`, and
/// switches that render as a bare `--flag` when true and as nothing when
/// false. Absent parameters never reach this type; they are `None` in the
/// (flag, value) pairs and emit zero tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum FlagValue {
    Text(String),
    Switch(bool),
}

impl FlagValue {
    /// Build a text value from anything that renders to a string.
    ///
    /// # Example
    ///
    /// ``` rust, no_run
    /// use bacass_launch::executor::job::FlagValue;
    ///
    /// let value = FlagValue::text("medaka");
    ///
    /// assert_eq!(value, FlagValue::Text("medaka".into()));
    /// ```
    pub fn text<T: ToString>(value: T) -> Self {
        Self::Text(value.to_string())
    }
}

/// Struct to represent the engine invocation built for one run.
///
/// Tokens accumulate in call order and are handed to the process runner
/// as-is, so two invocations built from the same configuration are
/// identical token for token.
///
/// # Example
///
/// ``` rust, no_run
/// use bacass_launch::executor::job::{EngineCommand, FlagValue};
///
/// let cmd = EngineCommand::new("/root/nextflow")
///     .arg("run")
///     .arg("main.nf")
///     .flag("outdir", Some(FlagValue::text("latch:///Bacass")));
///
/// assert_eq!(cmd.line(), "/root/nextflow run main.nf --outdir latch:///Bacass");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EngineCommand {
    tokens: Vec<String>,
}

impl EngineCommand {
    /// Create a new command rooted at the engine binary.
    ///
    /// # Example
    ///
    /// ``` rust, no_run
    /// use bacass_launch::executor::job::EngineCommand;
    ///
    /// let cmd = EngineCommand::new("/root/nextflow");
    ///
    /// assert_eq!(cmd.line(), "/root/nextflow");
    /// ```
    pub fn new<T: ToString>(binary: T) -> Self {
        Self {
            tokens: vec![binary.to_string()],
        }
    }

    /// Add a positional token to the command.
    pub fn arg<T: ToString>(mut self, arg: T) -> Self {
        self.tokens.push(arg.to_string());
        self
    }

    /// Add a positional token only when `cond` holds.
    ///
    /// # Example
    ///
    /// ``` rust, no_run
    /// use bacass_launch::executor::job::EngineCommand;
    ///
    /// let cmd = EngineCommand::new("/root/nextflow").arg_if(true, "-resume");
    ///
    /// assert_eq!(cmd.line(), "/root/nextflow -resume");
    /// ```
    pub fn arg_if<T: ToString>(self, cond: bool, arg: T) -> Self {
        if cond {
            self.arg(arg)
        } else {
            self
        }
    }

    /// Add one pipeline flag.
    ///
    /// The projection is uniform for every parameter: `None` emits
    /// nothing, a false switch emits nothing, a true switch emits the
    /// flag token alone, and a text value emits the flag token followed
    /// by one value token.
    pub fn flag(mut self, name: &str, value: Option<FlagValue>) -> Self {
        match value {
            None | Some(FlagValue::Switch(false)) => {}
            Some(FlagValue::Switch(true)) => {
                self.tokens.push(format!("--{}", name));
            }
            Some(FlagValue::Text(text)) => {
                self.tokens.push(format!("--{}", name));
                self.tokens.push(text);
            }
        }
        self
    }

    /// Add an ordered list of pipeline flags.
    ///
    /// # Example
    ///
    /// ``` rust, no_run
    /// use bacass_launch::executor::job::{EngineCommand, FlagValue};
    ///
    /// let cmd = EngineCommand::new("/root/nextflow")
    ///     .flags(vec![("skip_fastp", Some(FlagValue::Switch(true)))]);
    ///
    /// assert_eq!(cmd.line(), "/root/nextflow --skip_fastp");
    /// ```
    pub fn flags(mut self, pairs: Vec<(&str, Option<FlagValue>)>) -> Self {
        for (name, value) in pairs {
            self = self.flag(name, value);
        }
        self
    }

    /// The engine binary token.
    pub fn program(&self) -> &str {
        &self.tokens[0]
    }

    /// Every token after the binary, in emission order.
    pub fn args(&self) -> &[String] {
        &self.tokens[1..]
    }

    /// All tokens, binary included.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Render the command as one line for logging and script output.
    pub fn line(&self) -> String {
        self.tokens.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_values_emit_nothing() {
        let cmd = EngineCommand::new("nextflow")
            .flag("email", None)
            .flag("skip_fastp", None);

        assert_eq!(cmd.line(), "nextflow");
    }

    #[test]
    fn switches_render_as_bare_flags() {
        let cmd = EngineCommand::new("nextflow")
            .flag("skip_kraken2", Some(FlagValue::Switch(true)))
            .flag("skip_kmerfinder", Some(FlagValue::Switch(false)));

        assert_eq!(cmd.tokens(), ["nextflow", "--skip_kraken2"]);
    }

    #[test]
    fn text_values_render_as_flag_and_value() {
        let cmd = EngineCommand::new("nextflow")
            .flag("assembler", Some(FlagValue::text("canu")))
            .flag("canu_mode", Some(FlagValue::text("pacbio-hifi")));

        assert_eq!(
            cmd.tokens(),
            ["nextflow", "--assembler", "canu", "--canu_mode", "pacbio-hifi"]
        );
    }

    #[test]
    fn identical_inputs_build_identical_vectors() {
        let build = || {
            EngineCommand::new("nextflow")
                .arg("run")
                .arg("main.nf")
                .arg_if(false, "-resume")
                .flags(vec![
                    ("outdir", Some(FlagValue::text("latch:///Bacass"))),
                    ("email", None),
                    ("skip_multiqc", Some(FlagValue::Switch(true))),
                ])
        };

        assert_eq!(build(), build());
        assert_eq!(
            build().line(),
            "nextflow run main.nf --outdir latch:///Bacass --skip_multiqc"
        );
    }

    #[test]
    fn emitted_flags_match_present_parameters_only() {
        let pairs: Vec<(&str, Option<FlagValue>)> = vec![
            ("outdir", Some(FlagValue::text("out"))),
            ("email", None),
            ("save_trimmed", Some(FlagValue::Switch(true))),
            ("skip_fastqc", Some(FlagValue::Switch(false))),
            ("multiqc_title", Some(FlagValue::text("Batch 3"))),
        ];
        let present: Vec<&str> = pairs
            .iter()
            .filter(|(_, v)| {
                !matches!(v, None | Some(FlagValue::Switch(false)))
            })
            .map(|(name, _)| *name)
            .collect();

        let cmd = EngineCommand::new("nextflow").flags(pairs);
        let emitted: Vec<String> = cmd
            .args()
            .iter()
            .filter(|t| t.starts_with("--"))
            .map(|t| t.trim_start_matches("--").to_string())
            .collect();

        assert_eq!(emitted, present);
    }
}
