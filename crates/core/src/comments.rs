//! File-backed review comments.
//!
//! Comments live in one JSON file under the data directory. The store keeps
//! an in-memory copy guarded by a mutex and rewrites the whole file on every
//! mutation; the volume is reviewer-scale, so simplicity wins over a real
//! database. Failed writes roll the in-memory copy back so memory and disk
//! never drift.

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use wtr_types::NonEmptyText;

use crate::config::CoreConfig;
use crate::constants::ANONYMOUS_AUTHOR;
use crate::error::{ReviewError, ReviewResult};

/// One reviewer comment, attached to a question path.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub path: String,
    pub author_name: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct CommentStore {
    file: PathBuf,
    inner: Arc<Mutex<Vec<Comment>>>,
}

impl CommentStore {
    /// Open the store, creating the data directory and loading any existing
    /// comments file.
    pub fn open(config: &CoreConfig) -> ReviewResult<Self> {
        fs::create_dir_all(config.data_dir()).map_err(ReviewError::DataDirCreation)?;
        let file = config.comments_file();
        let comments = if file.exists() {
            let raw = fs::read_to_string(&file).map_err(ReviewError::CommentRead)?;
            serde_json::from_str(&raw).map_err(ReviewError::Deserialization)?
        } else {
            Vec::new()
        };
        Ok(Self {
            file,
            inner: Arc::new(Mutex::new(comments)),
        })
    }

    /// Comments for one question path, oldest first.
    pub fn for_path(&self, path: &str) -> Vec<Comment> {
        let comments = self.lock();
        let mut matching: Vec<Comment> = comments
            .iter()
            .filter(|comment| comment.path == path)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        matching
    }

    /// All comments, ordered by path then age.
    pub fn all(&self) -> Vec<Comment> {
        let comments = self.lock();
        let mut all: Vec<Comment> = comments.clone();
        all.sort_by(|a, b| {
            a.path
                .cmp(&b.path)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        all
    }

    /// Add a comment. A blank author is recorded as anonymous; blank text
    /// and blank paths are rejected.
    pub fn add(
        &self,
        path: &str,
        author_name: &str,
        text: &str,
        parent_id: Option<Uuid>,
    ) -> ReviewResult<Comment> {
        let text = NonEmptyText::new(text).map_err(|_| ReviewError::EmptyCommentText)?;
        if path.trim().is_empty() {
            return Err(ReviewError::InvalidInput(
                "comment path cannot be empty".into(),
            ));
        }
        let author = if author_name.trim().is_empty() {
            ANONYMOUS_AUTHOR.to_string()
        } else {
            author_name.trim().to_string()
        };
        let comment = Comment {
            id: Uuid::new_v4(),
            path: path.to_string(),
            author_name: author,
            text: text.into_inner(),
            created_at: Utc::now(),
            parent_id,
        };

        let mut comments = self.lock();
        comments.push(comment.clone());
        if let Err(err) = self.persist(&comments) {
            comments.pop();
            return Err(err);
        }
        Ok(comment)
    }

    /// Replace the text of an existing comment.
    pub fn update(&self, id: Uuid, text: &str) -> ReviewResult<Comment> {
        let text = NonEmptyText::new(text).map_err(|_| ReviewError::EmptyCommentText)?;
        let mut comments = self.lock();
        let position = comments
            .iter()
            .position(|comment| comment.id == id)
            .ok_or(ReviewError::UnknownComment(id))?;
        let previous = comments[position].text.clone();
        comments[position].text = text.into_inner();
        if let Err(err) = self.persist(&comments) {
            comments[position].text = previous;
            return Err(err);
        }
        Ok(comments[position].clone())
    }

    fn persist(&self, comments: &[Comment]) -> ReviewResult<()> {
        let json = serde_json::to_string_pretty(comments).map_err(ReviewError::Serialization)?;
        fs::write(&self.file, json).map_err(ReviewError::CommentWrite)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Comment>> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
