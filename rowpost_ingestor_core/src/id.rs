use snafu::Snafu;

/// Error returned when a record identifier cannot be generated.
#[derive(Debug, Snafu)]
#[snafu(display("{message}"))]
pub struct IdGenerationError {
    message: String,
}

/// Trait for generating unique IDs for records.
pub trait RecordIdGenerator: Send + Sync + 'static {
    fn generate_id(&self) -> Result<String, IdGenerationError>;
}

/// Generates unique IDs using the ULID algorithm.
#[derive(Debug, Clone, Default)]
pub struct UlidRecordIdGenerator;

impl IdGenerationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl RecordIdGenerator for UlidRecordIdGenerator {
    fn generate_id(&self) -> Result<String, IdGenerationError> {
        Ok(ulid::Ulid::new().to_string())
    }
}
