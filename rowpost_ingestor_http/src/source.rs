//! Turns an uploaded `multipart/form-data` body into records.
//!
//! Every part named `file` is parsed as CSV. Other parts are ignored. The whole
//! body is decoded before any record is handed to the dispatcher, so a malformed
//! file rejects the upload as a whole.

use bytes::Bytes;
use csv_async::{AsyncReaderBuilder, StringRecord};
use futures::stream;
use rowpost_ingestor_core::RawRecord;
use snafu::{ResultExt, Snafu};
use tracing::debug;

/// Form field name of the parts that carry CSV data.
pub const FILE_FIELD_NAME: &str = "file";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RecordSourceError {
    #[snafu(display("missing multipart boundary"))]
    MissingBoundary { source: multer::Error },
    #[snafu(display("failed to read multipart body"))]
    Multipart { source: multer::Error },
    #[snafu(display("{source}"))]
    Csv { source: csv_async::Error },
}

/// Records parsed from one `file` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub records: Vec<RawRecord>,
}

/// Decode a multipart body and parse every `file` part.
pub async fn parse_multipart(
    body: Bytes,
    content_type: &str,
) -> Result<Vec<UploadedFile>, RecordSourceError> {
    let boundary = multer::parse_boundary(content_type).context(MissingBoundarySnafu {})?;

    let body = stream::once(async move { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(body, boundary);

    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await.context(MultipartSnafu {})? {
        if field.name() != Some(FILE_FIELD_NAME) {
            debug!(name = ?field.name(), "Skipping multipart field");
            continue;
        }

        let file_name = field.file_name().map(ToString::to_string);
        let data = field.bytes().await.context(MultipartSnafu {})?;
        let records = parse_csv(&data).await?;

        debug!(file_name = ?file_name, records = records.len(), "Parsed uploaded file");

        files.push(UploadedFile { file_name, records });
    }

    Ok(files)
}

/// Parse CSV data into records.
///
/// There is no header row: the first line is a record like any other. Every
/// record must have as many fields as the first one.
///
/// A quote inside an unquoted field is kept as-is. A stray quote inside a quoted
/// field ends the quoted section and the rest is appended, so `"abc"def"` reads as
/// `abcdef"`. Fields only reach the logs, so no attempt is made to recover the
/// text between the quotes.
pub async fn parse_csv(data: &[u8]) -> Result<Vec<RawRecord>, RecordSourceError> {
    let mut reader = AsyncReaderBuilder::new()
        .has_headers(false)
        .flexible(false)
        .create_reader(data);

    let mut records = Vec::new();
    let mut record = StringRecord::new();
    while reader.read_record(&mut record).await.context(CsvSnafu {})? {
        records.push(record.iter().collect::<RawRecord>());
    }

    Ok(records)
}

impl RecordSourceError {
    /// Returns true if the error comes from the CSV payload rather than the
    /// multipart envelope.
    pub fn is_csv(&self) -> bool {
        matches!(self, RecordSourceError::Csv { .. })
    }
}
