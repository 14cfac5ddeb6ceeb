use trilha_extract::ingest;
use trilha_model::{SheetSnapshot, SnapshotCell, TrailSnapshot};
use trilha_storage::Storage;

fn snapshot() -> TrailSnapshot {
    let mut sheet = SheetSnapshot::new(0, "Plano");
    sheet.cells.push(SnapshotCell::text(0, 0, "Qual é a missão?"));
    sheet.cells.push(SnapshotCell::empty(1, 0));
    TrailSnapshot::new(vec![sheet])
}

// Uniqueness of question records is scoped to (template_id, field_id):
// two templates with identical derivation inputs produce the same field id
// and both records are accepted.
#[test]
fn identical_field_ids_coexist_across_templates() {
    let questions_a = ingest(&snapshot()).expect("ingest a").questions;
    let questions_b = ingest(&snapshot()).expect("ingest b").questions;
    assert_eq!(questions_a[0].field_id, questions_b[0].field_id);

    let storage = Storage::open_in_memory().expect("open storage");
    let template_a = storage.create_template("Trilha A", None).expect("create a");
    let template_b = storage.create_template("Trilha B", None).expect("create b");

    storage
        .store_questions(template_a.id, &questions_a)
        .expect("store a");
    storage
        .store_questions(template_b.id, &questions_b)
        .expect("store b");

    let loaded_a = storage.load_questions(template_a.id).expect("load a");
    let loaded_b = storage.load_questions(template_b.id).expect("load b");
    assert_eq!(loaded_a[0].field_id, loaded_b[0].field_id);

    // Answering one template never touches the other.
    storage
        .submit_answer(template_a.id, "user-1", &loaded_a[0].field_id, "r")
        .expect("submit");
    let progress_b = storage.progress(template_b.id, "user-1").expect("progress");
    assert_eq!(progress_b.answered, 0);
}
