use rusqlite::Connection;

pub(crate) fn init(conn: &Connection) -> rusqlite::Result<()> {
    // Ensure foreign keys are enforced (disabled by default in SQLite).
    conn.pragma_update(None, "foreign_keys", "ON")?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS templates (
          id TEXT PRIMARY KEY,
          name TEXT NOT NULL,
          created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
          metadata JSON
        );

        -- Question records of one ingestion run. Uniqueness is scoped to
        -- (template_id, field_id): identical field derivations across
        -- different templates are explicitly permitted.
        CREATE TABLE IF NOT EXISTS questions (
          template_id TEXT NOT NULL REFERENCES templates(id),
          field_id TEXT NOT NULL,
          order_index INTEGER NOT NULL,
          payload JSON NOT NULL,
          PRIMARY KEY (template_id, field_id)
        );

        CREATE INDEX IF NOT EXISTS idx_questions_order
          ON questions(template_id, order_index);

        CREATE TABLE IF NOT EXISTS answers (
          template_id TEXT NOT NULL REFERENCES templates(id),
          user_id TEXT NOT NULL,
          field_id TEXT NOT NULL,
          value TEXT,
          answered_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
          PRIMARY KEY (template_id, user_id, field_id)
        );

        CREATE INDEX IF NOT EXISTS idx_answers_user
          ON answers(template_id, user_id);

        CREATE TABLE IF NOT EXISTS answer_log (
          id INTEGER PRIMARY KEY AUTOINCREMENT,
          template_id TEXT,
          user_id TEXT,
          field_id TEXT,
          timestamp TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
          operation TEXT,
          old_value TEXT,
          new_value TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_answer_log_user
          ON answer_log(template_id, user_id);
        "#,
    )?;

    // Best-effort migration for databases created before template metadata
    // existed. SQLite only supports ADD COLUMN migrations, so missing
    // columns are added opportunistically when opening an existing database.
    ensure_template_columns(conn)?;

    Ok(())
}

fn ensure_template_columns(conn: &Connection) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare("PRAGMA table_info(templates)")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;
    let mut existing = std::collections::HashSet::new();
    for name in rows {
        existing.insert(name?);
    }

    if !existing.contains("metadata") {
        conn.execute("ALTER TABLE templates ADD COLUMN metadata JSON", [])?;
    }

    Ok(())
}
