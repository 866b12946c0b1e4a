use crate::deprojection::Deprojection;
use crate::detection::SurfaceDetection;

/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug)]
pub enum PipelineStage {
    Reading,
    Detecting,
    Writing,
    Deprojecting,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reading => write!(f, "Reading cube"),
            Self::Detecting => write!(f, "Detecting surface"),
            Self::Writing => write!(f, "Writing rotated cube"),
            Self::Deprojecting => write!(f, "Deprojecting"),
        }
    }
}

/// Result of a full pipeline run.
#[derive(Clone, Debug)]
pub struct PipelineOutput {
    pub detection: SurfaceDetection,
    pub deprojection: Deprojection,
}

/// Thread-safe progress reporting for the pipeline.
///
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new pipeline stage has started. `total_items` is the number of
    /// work items in this stage (e.g., channel count), if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// One work item within the current stage has completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// No-op progress reporter, used when `run_pipeline` delegates.
pub(super) struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}
