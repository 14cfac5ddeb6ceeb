//! The Trail Sequencing Authority.
//!
//! Stateless computations over the persisted, ordered question list and a
//! user's answer set. Answering is only permitted once every predecessor
//! (by global order index) is answered; this is re-verified on every
//! submission, inside one transaction, so two concurrent submissions can
//! never both observe "all predecessors answered".

use std::collections::HashSet;

use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use trilha_model::{Question, TrailProgress};
use uuid::Uuid;

use crate::storage::{load_questions_conn, Result, Storage, StorageError};

/// One persisted answer of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerRecord {
    pub field_id: String,
    pub value: Option<String>,
    pub answered_at: String,
}

/// Outcome of an answering-order check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequenceCheck {
    /// The field may be answered now.
    Ok,
    /// An earlier question is still unanswered.
    Blocked {
        blocking_field_id: String,
        blocking_order_index: usize,
    },
}

impl SequenceCheck {
    pub fn is_ok(&self) -> bool {
        matches!(self, SequenceCheck::Ok)
    }

    /// Human-readable rejection message, `None` when the check passed.
    pub fn error_message(&self) -> Option<String> {
        match self {
            SequenceCheck::Ok => None,
            SequenceCheck::Blocked {
                blocking_field_id,
                blocking_order_index,
            } => Some(format!(
                "question {blocking_field_id} (order {blocking_order_index}) must be answered first"
            )),
        }
    }
}

impl Storage {
    /// The first question, in global order, the user has not answered yet.
    /// `None` once the trail is complete.
    pub fn next_unanswered(&self, template_id: Uuid, user_id: &str) -> Result<Option<Question>> {
        let conn = self.conn.lock().expect("storage mutex poisoned");
        let questions = load_questions_conn(&conn, template_id)?;
        let answered = answered_fields(&conn, template_id, user_id)?;
        Ok(first_unanswered(&questions, &answered))
    }

    /// Check whether `field_id` may be answered now by `user_id`.
    ///
    /// Fails with [`StorageError::QuestionNotFound`] for an unknown field.
    /// A blocked result is not an error here; [`Storage::submit_answer`] is
    /// where a violation rejects the request.
    pub fn validate_sequence(
        &self,
        template_id: Uuid,
        field_id: &str,
        user_id: &str,
    ) -> Result<SequenceCheck> {
        let conn = self.conn.lock().expect("storage mutex poisoned");
        let questions = load_questions_conn(&conn, template_id)?;
        let answered = answered_fields(&conn, template_id, user_id)?;
        check_sequence(&questions, &answered, template_id, field_id)
    }

    /// Persist an answer after re-verifying the answering order.
    ///
    /// The order check and the upsert run in one transaction while the
    /// connection mutex is held, so per-(user, template) submissions are
    /// fully serialized. Returns the updated next unanswered question so
    /// the caller re-synchronizes from the authority.
    pub fn submit_answer(
        &self,
        template_id: Uuid,
        user_id: &str,
        field_id: &str,
        value: &str,
    ) -> Result<Option<Question>> {
        let mut conn = self.conn.lock().expect("storage mutex poisoned");
        let tx = conn.transaction()?;

        let questions = load_questions_conn(&tx, template_id)?;
        let mut answered = answered_fields(&tx, template_id, user_id)?;

        match check_sequence(&questions, &answered, template_id, field_id)? {
            SequenceCheck::Ok => {}
            SequenceCheck::Blocked {
                blocking_field_id,
                blocking_order_index,
            } => {
                // Possible bypass attempt: the client skipped the
                // server-provided order.
                log::warn!(
                    "out-of-order submission: user {user_id:?} tried field {field_id} \
                     of template {template_id} before field {blocking_field_id}"
                );
                return Err(StorageError::SequenceViolation {
                    field_id: field_id.to_string(),
                    blocking_field_id,
                    blocking_order_index,
                });
            }
        }

        let old_value: Option<String> = tx
            .query_row(
                r#"
                SELECT value FROM answers
                WHERE template_id = ?1 AND user_id = ?2 AND field_id = ?3
                "#,
                params![template_id.to_string(), user_id, field_id],
                |r| r.get(0),
            )
            .optional()?;

        tx.execute(
            r#"
            INSERT INTO answers (template_id, user_id, field_id, value)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(template_id, user_id, field_id) DO UPDATE SET
              value = excluded.value,
              answered_at = CURRENT_TIMESTAMP
            "#,
            params![template_id.to_string(), user_id, field_id, value],
        )?;

        tx.execute(
            r#"
            INSERT INTO answer_log (template_id, user_id, field_id, operation, old_value, new_value)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                template_id.to_string(),
                user_id,
                field_id,
                if old_value.is_some() {
                    "update_answer"
                } else {
                    "submit_answer"
                },
                old_value,
                value
            ],
        )?;

        tx.commit()?;

        answered.insert(field_id.to_string());
        Ok(first_unanswered(&questions, &answered))
    }

    /// Per-user progress through the trail.
    pub fn progress(&self, template_id: Uuid, user_id: &str) -> Result<TrailProgress> {
        let conn = self.conn.lock().expect("storage mutex poisoned");
        let questions = load_questions_conn(&conn, template_id)?;
        let answered = answered_fields(&conn, template_id, user_id)?;

        // Only answers matching a current question count; stale answers from
        // a replaced question set are ignored.
        let answered_count = questions
            .iter()
            .filter(|q| answered.contains(&q.field_id))
            .count();
        let next = first_unanswered(&questions, &answered);
        Ok(TrailProgress::new(answered_count, questions.len(), next))
    }

    /// All persisted answers of a user for a template, in answer order.
    pub fn get_answers(&self, template_id: Uuid, user_id: &str) -> Result<Vec<AnswerRecord>> {
        let conn = self.conn.lock().expect("storage mutex poisoned");
        let mut stmt = conn.prepare(
            r#"
            SELECT field_id, value, answered_at
            FROM answers
            WHERE template_id = ?1 AND user_id = ?2
            ORDER BY answered_at, field_id
            "#,
        )?;

        let rows = stmt.query_map(params![template_id.to_string(), user_id], |r| {
            Ok(AnswerRecord {
                field_id: r.get(0)?,
                value: r.get(1)?,
                answered_at: r.get(2)?,
            })
        })?;

        let mut answers = Vec::new();
        for answer in rows {
            answers.push(answer?);
        }
        Ok(answers)
    }
}

fn answered_fields(
    conn: &Connection,
    template_id: Uuid,
    user_id: &str,
) -> Result<HashSet<String>> {
    let mut stmt = conn.prepare(
        "SELECT field_id FROM answers WHERE template_id = ?1 AND user_id = ?2",
    )?;
    let rows = stmt.query_map(params![template_id.to_string(), user_id], |r| {
        r.get::<_, String>(0)
    })?;

    let mut fields = HashSet::new();
    for field in rows {
        fields.insert(field?);
    }
    Ok(fields)
}

fn first_unanswered(questions: &[Question], answered: &HashSet<String>) -> Option<Question> {
    questions
        .iter()
        .find(|q| !answered.contains(&q.field_id))
        .cloned()
}

fn check_sequence(
    questions: &[Question],
    answered: &HashSet<String>,
    template_id: Uuid,
    field_id: &str,
) -> Result<SequenceCheck> {
    let target = questions
        .iter()
        .find(|q| q.field_id == field_id)
        .ok_or_else(|| StorageError::QuestionNotFound {
            template_id,
            field_id: field_id.to_string(),
        })?;

    let blocking = questions.iter().find(|q| {
        q.order_index_global < target.order_index_global && !answered.contains(&q.field_id)
    });

    Ok(match blocking {
        Some(block) => SequenceCheck::Blocked {
            blocking_field_id: block.field_id.clone(),
            blocking_order_index: block.order_index_global,
        },
        None => SequenceCheck::Ok,
    })
}
