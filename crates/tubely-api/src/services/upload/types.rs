use std::fmt::{Display, Formatter, Result as FmtResult};

use uuid::Uuid;

/// Pipeline progress. Each variant names the last stage that completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStage {
    Received,
    Authorized,
    Staged,
    Inspected,
    Remuxed,
    KeyDerived,
    Uploaded,
    Persisted,
    Done,
}

impl Display for UploadStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            UploadStage::Received => "received",
            UploadStage::Authorized => "authorized",
            UploadStage::Staged => "staged",
            UploadStage::Inspected => "inspected",
            UploadStage::Remuxed => "remuxed",
            UploadStage::KeyDerived => "key_derived",
            UploadStage::Uploaded => "uploaded",
            UploadStage::Persisted => "persisted",
            UploadStage::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// One upload as handed over by the HTTP layer.
///
/// `body` is the raw file part, still unread; nothing is buffered before the
/// pipeline decides to stage it.
pub struct UploadRequest<S> {
    pub video_id: Uuid,
    pub user_id: Uuid,
    /// Declared media type of the file part, parameters included.
    pub content_type: Option<String>,
    pub body: S,
}
