pub mod dispatcher;
pub mod error;
pub mod id;
pub mod metrics;
pub mod types;

pub use dispatcher::{DEFAULT_CAPACITY, DispatcherOptions, IngestionDispatcher};
pub use error::{IngestorError, Result};
pub use id::{IdGenerationError, RecordIdGenerator, UlidRecordIdGenerator};
pub use types::RawRecord;
