pub mod fs_atomic;
pub mod ids;
pub mod logging;
pub mod timestamps;

pub use fs_atomic::{atomic_write_file, backup_by_rename};
pub use ids::VariableName;
pub use logging::{append_replay_log, ReplayLog, DEFAULT_VERBOSITY};
pub use timestamps::{earliest_timestamp, latest_timestamp, render_timestamp, Staleness};
