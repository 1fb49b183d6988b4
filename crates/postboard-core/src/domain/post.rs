use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::post_file::PostFileInfo;

/// Post entity - a user's post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new, not yet persisted post. The store assigns the id.
    pub fn new(user_id: i32, title: String, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            user_id,
            title,
            content,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: i32) -> bool {
        self.user_id == user_id
    }

    /// Apply a partial update, bumping `updated_at`.
    pub fn apply(&mut self, changes: PostChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(content) = changes.content {
            self.content = content;
        }
        self.updated_at = Utc::now();
    }
}

/// Input for creating a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub content: String,
}

/// Partial update of a post. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Criteria for the filtered post listing. Blank values do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub file_type: Option<String>,
    pub search_term: Option<String>,
}

impl PostFilter {
    fn active(value: &Option<String>) -> Option<String> {
        value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_lowercase)
    }

    /// Whether the post text matches the search term.
    pub fn matches_text(&self, post: &Post) -> bool {
        match Self::active(&self.search_term) {
            Some(term) => {
                post.title.to_lowercase().contains(&term)
                    || post.content.to_lowercase().contains(&term)
            }
            None => true,
        }
    }

    /// Whether any of the files matches the requested file type.
    ///
    /// `pdf` matches both a `application/pdf` content type and a
    /// `report.PDF` file name.
    pub fn matches_files(&self, files: &[PostFileInfo]) -> bool {
        match Self::active(&self.file_type) {
            Some(wanted) => files.iter().any(|f| f.has_type(&wanted)),
            None => true,
        }
    }
}

/// Public author information attached to a post listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: i32,
    pub username: String,
}

/// Read view of a post with its author, attachments and reaction counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostDetails {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: Option<AuthorSummary>,
    pub files: Vec<PostFileInfo>,
    pub likes: u64,
    pub dislikes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(title: &str, content: &str) -> Post {
        Post::new(1, title.to_string(), content.to_string())
    }

    fn file(name: &str, file_type: &str) -> PostFileInfo {
        PostFileInfo {
            id: 1,
            post_id: 1,
            file_name: name.to_string(),
            file_type: file_type.to_string(),
            size: 3,
        }
    }

    #[test]
    fn test_search_term_is_case_insensitive() {
        let filter = PostFilter {
            file_type: None,
            search_term: Some("REPORT".to_string()),
        };

        assert!(filter.matches_text(&post("Quarterly report", "")));
        assert!(filter.matches_text(&post("Q3", "see the report")));
        assert!(!filter.matches_text(&post("Q3", "numbers")));
    }

    #[test]
    fn test_blank_filter_matches_everything() {
        let filter = PostFilter {
            file_type: Some("  ".to_string()),
            search_term: Some(String::new()),
        };

        assert!(filter.matches_text(&post("anything", "at all")));
        assert!(filter.matches_files(&[]));
    }

    #[test]
    fn test_file_type_matches_mime_or_extension() {
        let filter = PostFilter {
            file_type: Some("pdf".to_string()),
            search_term: None,
        };

        assert!(filter.matches_files(&[file("a.bin", "application/pdf")]));
        assert!(filter.matches_files(&[file("report.PDF", "application/octet-stream")]));
        assert!(!filter.matches_files(&[file("photo.png", "image/png")]));
        assert!(!filter.matches_files(&[]));
    }

    #[test]
    fn test_apply_changes_keeps_missing_fields() {
        let mut p = post("title", "content");
        p.apply(PostChanges {
            title: None,
            content: Some("new content".to_string()),
        });

        assert_eq!(p.title, "title");
        assert_eq!(p.content, "new content");
    }
}
