use fjma_core::db::open_db_in_memory;
use fjma_core::{
    DeleteOutcome, Officer, OfficerRepository, OfficerService, RepoError, SqliteOfficerRepository,
    ValidationError,
};
use rusqlite::Connection;

fn ana() -> Officer {
    Officer {
        school_id: "S100".to_string(),
        first_name: "Ana".to_string(),
        middle_name: Some(String::new()),
        last_name: "Cruz".to_string(),
        position: "President".to_string(),
        date_appointed: "2024-06-01".to_string(),
        date_joined: "2024-06-01".to_string(),
        email_address: "ana@x.edu".to_string(),
        phone_number: "09171234567".to_string(),
    }
}

fn archive_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM officers_archive;", [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn add_list_delete_moves_officer_into_archive() {
    let conn = open_db_in_memory().unwrap();
    let service = OfficerService::new(SqliteOfficerRepository::try_new(&conn).unwrap());

    service.add_officer(&ana()).unwrap();
    assert_eq!(service.list_officers().unwrap(), vec![ana()]);

    let outcome = service.delete_officer("S100").unwrap();
    let DeleteOutcome::Archived { deleted_at } = outcome else {
        panic!("expected archived outcome");
    };
    assert!(!deleted_at.is_empty());
    assert!(service.list_officers().unwrap().is_empty());

    let archived = service.list_archived_officers().unwrap();
    assert_eq!(archived.len(), 1);
    assert_eq!(archived[0].officer, ana());
    assert_eq!(archived[0].deleted_at, deleted_at);
}

#[test]
fn duplicate_school_id_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteOfficerRepository::try_new(&conn).unwrap();
    repo.add_officer(&ana()).unwrap();

    let err = repo.add_officer(&ana()).unwrap_err();
    assert!(matches!(
        err,
        RepoError::DuplicateKey { table: "officers", ref key } if key == "S100"
    ));
}

#[test]
fn update_overwrites_all_fields_but_school_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteOfficerRepository::try_new(&conn).unwrap();
    repo.add_officer(&ana()).unwrap();

    let mut promoted = ana();
    promoted.middle_name = None;
    promoted.position = "Adviser".to_string();
    promoted.phone_number = "09990000000".to_string();
    repo.update_officer(&promoted).unwrap();

    assert_eq!(repo.get_officer("S100").unwrap(), Some(promoted));
}

#[test]
fn update_missing_officer_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteOfficerRepository::try_new(&conn).unwrap();

    let err = repo.update_officer(&ana()).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { table: "officers", .. }));
}

#[test]
fn delete_missing_officer_changes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteOfficerRepository::try_new(&conn).unwrap();
    repo.add_officer(&ana()).unwrap();
    repo.delete_officer("S100").unwrap();
    let before = repo.list_archived_officers().unwrap();

    assert_eq!(repo.delete_officer("S100").unwrap(), DeleteOutcome::Absent);
    assert_eq!(repo.delete_officer("nobody").unwrap(), DeleteOutcome::Absent);

    assert_eq!(repo.list_archived_officers().unwrap(), before);
    assert_eq!(archive_count(&conn), 1);
}

#[test]
fn recreated_officer_can_be_archived_again() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteOfficerRepository::try_new(&conn).unwrap();

    repo.add_officer(&ana()).unwrap();
    repo.delete_officer("S100").unwrap();
    repo.add_officer(&ana()).unwrap();
    repo.delete_officer("S100").unwrap();

    let archived = repo.list_archived_officers().unwrap();
    assert_eq!(archived.len(), 2);
    assert!(archived[0].archive_id < archived[1].archive_id);
    assert!(archived.iter().all(|entry| entry.officer == ana()));
}

#[test]
fn blank_required_field_is_rejected_before_write() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteOfficerRepository::try_new(&conn).unwrap();

    let mut nameless = ana();
    nameless.first_name = "  ".to_string();
    let err = repo.add_officer(&nameless).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::EmptyField("first_name"))
    ));
    assert!(repo.list_officers().unwrap().is_empty());
}
