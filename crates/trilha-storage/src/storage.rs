use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use serde::Serialize;
use thiserror::Error;
use trilha_model::Question;
use uuid::Uuid;

use crate::schema;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("template not found: {0}")]
    TemplateNotFound(Uuid),
    #[error("question not found: template {template_id}, field {field_id}")]
    QuestionNotFound { template_id: Uuid, field_id: String },
    /// A user tried to answer a question before its predecessors.
    /// Recoverable: the submission is rejected, nothing is persisted.
    #[error(
        "field {field_id} cannot be answered yet: field {blocking_field_id} \
         (order {blocking_order_index}) is still unanswered"
    )]
    SequenceViolation {
        field_id: String,
        blocking_field_id: String,
        blocking_order_index: usize,
    },
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Metadata of a persisted trail template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateMeta {
    pub id: Uuid,
    pub name: String,
    pub metadata: Option<serde_json::Value>,
}

/// Handle to the trail database.
///
/// All access goes through one connection behind a mutex; writes are
/// additionally wrapped in transactions, so check-then-act sequences (the
/// sequencing authority's predecessor check plus upsert) are atomic.
#[derive(Debug, Clone)]
pub struct Storage {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl Storage {
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        schema::init(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.busy_timeout(Duration::from_secs(5))?;
        schema::init(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_uri(uri: &str) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI;
        let conn = Connection::open_with_flags(uri, flags)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        schema::init(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn create_template(
        &self,
        name: &str,
        metadata: Option<serde_json::Value>,
    ) -> Result<TemplateMeta> {
        let template = TemplateMeta {
            id: Uuid::new_v4(),
            name: name.to_string(),
            metadata,
        };

        let conn = self.conn.lock().expect("storage mutex poisoned");
        conn.execute(
            "INSERT INTO templates (id, name, metadata) VALUES (?1, ?2, ?3)",
            params![
                template.id.to_string(),
                &template.name,
                template.metadata.clone()
            ],
        )?;

        Ok(template)
    }

    pub fn get_template(&self, id: Uuid) -> Result<TemplateMeta> {
        let conn = self.conn.lock().expect("storage mutex poisoned");
        let row = conn
            .query_row(
                "SELECT id, name, metadata FROM templates WHERE id = ?1",
                params![id.to_string()],
                |r| {
                    let id: String = r.get(0)?;
                    Ok(TemplateMeta {
                        id: Uuid::parse_str(&id).map_err(|_| rusqlite::Error::InvalidQuery)?,
                        name: r.get(1)?,
                        metadata: r.get(2)?,
                    })
                },
            )
            .optional()?;

        row.ok_or(StorageError::TemplateNotFound(id))
    }

    /// Persist the questions of one ingestion run.
    ///
    /// Replaces any previously stored questions of the template: a
    /// re-ingestion either reproduces the same field ids (unchanged
    /// template) or swaps in the new set wholesale.
    pub fn store_questions(&self, template_id: Uuid, questions: &[Question]) -> Result<()> {
        self.get_template(template_id)?;

        let mut conn = self.conn.lock().expect("storage mutex poisoned");
        let tx = conn.transaction()?;

        tx.execute(
            "DELETE FROM questions WHERE template_id = ?1",
            params![template_id.to_string()],
        )?;

        for question in questions {
            let payload = serde_json::to_value(question)?;
            tx.execute(
                r#"
                INSERT INTO questions (template_id, field_id, order_index, payload)
                VALUES (?1, ?2, ?3, ?4)
                "#,
                params![
                    template_id.to_string(),
                    &question.field_id,
                    question.order_index_global as i64,
                    payload
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Load a template's questions ordered by their global order index.
    pub fn load_questions(&self, template_id: Uuid) -> Result<Vec<Question>> {
        let conn = self.conn.lock().expect("storage mutex poisoned");
        load_questions_conn(&conn, template_id)
    }
}

pub(crate) fn load_questions_conn(conn: &Connection, template_id: Uuid) -> Result<Vec<Question>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT payload
        FROM questions
        WHERE template_id = ?1
        ORDER BY order_index
        "#,
    )?;

    let rows = stmt.query_map(params![template_id.to_string()], |r| {
        r.get::<_, serde_json::Value>(0)
    })?;

    let mut questions = Vec::new();
    for payload in rows {
        questions.push(serde_json::from_value(payload?)?);
    }
    Ok(questions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(field_id: &str, global: usize) -> Question {
        Question {
            field_id: field_id.to_string(),
            sheet_index: 0,
            sheet_name: "Plano".into(),
            row: global as u32,
            column: 0,
            cell_range: "A1".into(),
            section_name: None,
            section_index: -1,
            question_text: "Qual é a pergunta?".into(),
            inferred_type: Default::default(),
            order_index_sheet: global,
            order_index_global: global,
            answer_cell_range: None,
            answer_row_start: None,
            answer_row_end: None,
            required: true,
            example_value: None,
            validation_type: None,
            source_metadata: Default::default(),
        }
    }

    #[test]
    fn template_round_trip() {
        let storage = Storage::open_in_memory().expect("open storage");
        let template = storage
            .create_template("Trilha PME", Some(serde_json::json!({"locale": "pt-BR"})))
            .expect("create template");

        let loaded = storage.get_template(template.id).expect("get template");
        assert_eq!(loaded, template);
    }

    #[test]
    fn missing_template_is_an_error() {
        let storage = Storage::open_in_memory().expect("open storage");
        let id = Uuid::new_v4();
        match storage.get_template(id) {
            Err(StorageError::TemplateNotFound(missing)) => assert_eq!(missing, id),
            other => panic!("expected TemplateNotFound, got {other:?}"),
        }
    }

    #[test]
    fn questions_load_in_order_index_order() {
        let storage = Storage::open_in_memory().expect("open storage");
        let template = storage.create_template("T", None).expect("create");

        // Insert out of order; loading must sort by order_index.
        let questions = vec![question("cc", 2), question("aa", 0), question("bb", 1)];
        storage
            .store_questions(template.id, &questions)
            .expect("store");

        let loaded = storage.load_questions(template.id).expect("load");
        let ids: Vec<&str> = loaded.iter().map(|q| q.field_id.as_str()).collect();
        assert_eq!(ids, vec!["aa", "bb", "cc"]);
    }

    #[test]
    fn store_questions_requires_existing_template() {
        let storage = Storage::open_in_memory().expect("open storage");
        let missing = Uuid::new_v4();
        assert!(matches!(
            storage.store_questions(missing, &[question("aa", 0)]),
            Err(StorageError::TemplateNotFound(_))
        ));
    }
}
