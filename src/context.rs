use std::path::PathBuf;

/// Run configuration, built once from the command line and handed to the
/// assembler.
#[derive(Debug, Clone)]
pub struct Context {
    /// Enable verbose output (show command execution details)
    pub verbose: bool,

    /// Resolve artifacts only; do not stage or pack anything
    pub dry_run: bool,

    /// Keep the staging tree after the run
    pub retain_staging: bool,

    /// Directory in which staging trees are created
    pub work_dir: PathBuf,

    /// Directory receiving the produced package
    pub output_dir: PathBuf,
}

impl Context {
    pub fn new(work_dir: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            verbose: false,
            dry_run: false,
            retain_staging: false,
            work_dir,
            output_dir,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_retain_staging(mut self, retain: bool) -> Self {
        self.retain_staging = retain;
        self
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new(PathBuf::from("."), PathBuf::from("."))
    }
}
