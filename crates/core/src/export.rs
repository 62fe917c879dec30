//! CSV export of the flat question index with collected comments.

use crate::comments::CommentStore;
use crate::constants::EXPORT_COMMENT_SEPARATOR;
use crate::error::{ReviewError, ReviewResult};
use crate::index::FlatQuestion;

/// One row of the comments export: every question appears, commented or not.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportRow {
    pub display_name: String,
    pub archetype_node_id: String,
    pub comments: String,
}

/// Build export rows, joining each question's comments into one cell.
pub fn export_rows(questions: &[FlatQuestion], store: &CommentStore) -> Vec<ExportRow> {
    questions
        .iter()
        .map(|question| {
            let comments = store
                .for_path(&question.comment_path)
                .iter()
                .map(|comment| single_line(&comment.text))
                .collect::<Vec<_>>()
                .join(EXPORT_COMMENT_SEPARATOR);
            ExportRow {
                display_name: question.display_name.clone(),
                archetype_node_id: question.archetype_node_id.clone().unwrap_or_default(),
                comments,
            }
        })
        .collect()
}

/// Render the rows as a CSV document with a header line.
pub fn write_csv(rows: &[ExportRow]) -> ReviewResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["Question", "Node ID", "Comments"])?;
    for row in rows {
        writer.write_record([
            row.display_name.as_str(),
            row.archetype_node_id.as_str(),
            row.comments.as_str(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| ReviewError::CsvFlush(err.into_error()))?;
    String::from_utf8(bytes).map_err(ReviewError::CsvUtf8)
}

/// Comment text is free-form; line breaks are collapsed so each comment sits
/// on one line of its cell.
fn single_line(text: &str) -> String {
    text.replace('\r', "").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoreConfig;

    fn question(path: &str, name: &str, node_id: Option<&str>) -> FlatQuestion {
        FlatQuestion {
            path: path.to_string(),
            display_name: name.to_string(),
            archetype_node_id: node_id.map(str::to_string),
            comment_path: path.to_string(),
        }
    }

    fn store() -> (tempfile::TempDir, CommentStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = CoreConfig::new(dir.path().join("template.json"), dir.path().join("data"))
            .expect("config");
        let store = CommentStore::open(&config).expect("open store");
        (dir, store)
    }

    #[test]
    fn joins_comments_and_keeps_uncommented_questions() {
        let (_dir, store) = store();
        store.add("/a", "r", "looks fine", None).expect("add");
        store.add("/a", "r", "second pass\nstill fine", None).expect("add");

        let questions = [
            question("/a", "Pulse", Some("at0004")),
            question("/b", "Notes", None),
        ];
        let rows = export_rows(&questions, &store);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].comments, "looks fine; second pass still fine");
        assert_eq!(rows[1].comments, "");
        assert_eq!(rows[1].archetype_node_id, "");
    }

    #[test]
    fn writes_a_header_and_quotes_awkward_cells() {
        let rows = vec![ExportRow {
            display_name: "Result, overall".to_string(),
            archetype_node_id: "at0001".to_string(),
            comments: "he said \"fine\"".to_string(),
        }];
        let csv = write_csv(&rows).expect("csv");
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("Question,Node ID,Comments"));
        let data = lines.next().expect("data row");
        assert!(data.contains("\"Result, overall\""));
        assert!(data.contains("\"he said \"\"fine\"\"\""));
    }
}
