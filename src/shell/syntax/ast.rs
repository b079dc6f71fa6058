use std::path::PathBuf;

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct OutputSink {
    pub path: PathBuf,
    pub append: bool,
}

/// One program invocation inside a pipeline.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct Stage {
    /// Program name followed by its arguments. Empty only for a stage
    /// produced by a stray `|`.
    pub argv: Vec<String>,
    pub stdin: Option<PathBuf>,
    pub stdout: Option<OutputSink>,
    /// Whether stdout feeds the next stage. False for the last stage.
    pub pipes_forward: bool,
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Pipeline {
    pub stages: Vec<Stage>,
}
