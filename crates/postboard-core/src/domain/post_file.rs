use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Largest attachment accepted, in bytes.
pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

/// File attached to a post, including its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFile {
    pub id: i32,
    pub post_id: i32,
    pub file_name: String,
    pub file_type: String,
    pub file_content: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

impl PostFile {
    pub fn new(post_id: i32, file: NewPostFile) -> Self {
        Self {
            id: 0,
            post_id,
            file_name: file.file_name,
            file_type: file.file_type,
            file_content: file.file_content,
            created_at: Utc::now(),
        }
    }

    pub fn info(&self) -> PostFileInfo {
        PostFileInfo {
            id: self.id,
            post_id: self.post_id,
            file_name: self.file_name.clone(),
            file_type: self.file_type.clone(),
            size: self.file_content.len() as u64,
        }
    }
}

/// Attachment metadata, as shown in post listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostFileInfo {
    pub id: i32,
    pub post_id: i32,
    pub file_name: String,
    pub file_type: String,
    pub size: u64,
}

impl PostFileInfo {
    /// `wanted` is expected lowercase.
    pub(crate) fn has_type(&self, wanted: &str) -> bool {
        let content_type = self.file_type.to_lowercase();
        if content_type == wanted || content_type.rsplit('/').next() == Some(wanted) {
            return true;
        }

        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.eq_ignore_ascii_case(wanted))
            .unwrap_or(false)
    }
}

/// Input for attaching a file to a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPostFile {
    pub file_name: String,
    pub file_type: String,
    pub file_content: Vec<u8>,
}
