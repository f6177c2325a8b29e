mod error;
mod execution_batch;
mod frame_bucket;
mod frame_synchronizer;
mod sync_config;

pub use error::SyncError;
pub use execution_batch::ExecutionBatch;
pub use frame_bucket::FrameBucket;
pub use frame_synchronizer::{FrameSynchronizer, SyncState};
pub use sync_config::SyncConfig;
