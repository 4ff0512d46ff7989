pub mod error;
pub mod history;
pub mod orchestrator;
pub mod pipeline;
pub mod substitute;

pub use error::{HistoryError, ReplayError, SubstitutionError};
pub use history::{parse_history, HistoryStack, PipelineStep};
pub use orchestrator::{
    replay, replay_file, replay_history, ReplayOptions, ReplayReport, StepDisposition,
    StepReport,
};
pub use pipeline::{render_command, run_pipeline};
pub use substitute::{resolve, resolve_all, SubstitutionMap};
