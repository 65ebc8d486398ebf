use snafu::Snafu;

/// Store error types.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum StoreError {
    #[snafu(display("Invalid table name {name:?}: {message}"))]
    InvalidTableName { name: String, message: &'static str },
    #[snafu(display("Failed to serialize record {id}"))]
    Serialize {
        id: String,
        source: serde_json::Error,
    },
    #[snafu(display("Failed to put record {id}"))]
    Put {
        id: String,
        source: object_store::Error,
    },
    #[snafu(display("Failed to create {store_type} object store"))]
    Creation {
        store_type: &'static str,
        source: object_store::Error,
    },
    #[snafu(display("Failed to prepare {store_type} root directory"))]
    RootDirectory {
        store_type: &'static str,
        source: std::io::Error,
    },
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
