use fjma_core::db::open_db_in_memory;
use fjma_core::{
    CredentialService, HashConfig, RepoError, ServiceError, SqliteCredentialRepository,
};
use rusqlite::Connection;

const FAST_HASH: HashConfig = HashConfig {
    memory_kib: 8,
    iterations: 1,
    parallelism: 1,
};

fn service(conn: &Connection) -> CredentialService<SqliteCredentialRepository<'_>> {
    let repo = SqliteCredentialRepository::try_new(conn).unwrap();
    CredentialService::new(repo, &FAST_HASH).unwrap()
}

#[test]
fn verify_accepts_only_the_stored_password() {
    let conn = open_db_in_memory().unwrap();
    let admins = service(&conn);

    admins.add_admin("admin", "admin123", "admin123@gmail.com").unwrap();

    assert!(admins.verify("admin", "admin123").unwrap());
    assert!(!admins.verify("admin", "admin124").unwrap());
    assert!(!admins.verify("admin", "").unwrap());
}

#[test]
fn verify_unknown_username_is_false() {
    let conn = open_db_in_memory().unwrap();
    let admins = service(&conn);

    assert!(!admins.verify("ghost", "anything").unwrap());
}

#[test]
fn verify_against_bcrypt_digest_is_false_not_error() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO login_credentials (username, password, email) VALUES (?1, ?2, ?3);",
        rusqlite::params![
            "admin",
            b"$2b$12$KIXQJYg0zQ6bX8n0e7f0UuQ6Yy6zZ1m9u1QjFjv0d4n1o3c5o7yWe".to_vec(),
            "admin123@gmail.com"
        ],
    )
    .unwrap();
    let admins = service(&conn);

    assert!(!admins.verify("admin", "admin123").unwrap());
    admins.update_admin("admin", Some("admin123"), None).unwrap();
    assert!(admins.verify("admin", "admin123").unwrap());
}

#[test]
fn password_is_stored_as_digest() {
    let conn = open_db_in_memory().unwrap();
    let admins = service(&conn);
    admins.add_admin("admin", "admin123", "a@x.edu").unwrap();

    let stored: Vec<u8> = conn
        .query_row(
            "SELECT password FROM login_credentials WHERE username = 'admin';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    let text = String::from_utf8(stored).unwrap();
    assert!(text.starts_with("$argon2id$"));
    assert!(!text.contains("admin123"));
}

#[test]
fn duplicate_username_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let admins = service(&conn);
    admins.add_admin("admin", "one", "one@x.edu").unwrap();

    let err = admins.add_admin("admin", "two", "two@x.edu").unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Repo(RepoError::DuplicateKey {
            table: "login_credentials",
            ..
        })
    ));
    assert!(admins.verify("admin", "one").unwrap());
}

#[test]
fn update_changes_only_supplied_fields() {
    let conn = open_db_in_memory().unwrap();
    let admins = service(&conn);
    admins.add_admin("admin", "old", "old@x.edu").unwrap();

    admins.update_admin("admin", None, Some("new@x.edu")).unwrap();
    assert!(admins.verify("admin", "old").unwrap());
    assert_eq!(admins.list_admins().unwrap()[0].email, "new@x.edu");

    admins.update_admin("admin", Some("fresh"), None).unwrap();
    assert!(admins.verify("admin", "fresh").unwrap());
    assert!(!admins.verify("admin", "old").unwrap());
    assert_eq!(admins.list_admins().unwrap()[0].email, "new@x.edu");

    admins.update_admin("admin", Some(""), Some("")).unwrap();
    assert!(admins.verify("admin", "fresh").unwrap());
    assert_eq!(admins.list_admins().unwrap()[0].email, "new@x.edu");
}

#[test]
fn update_unknown_username_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let admins = service(&conn);

    let err = admins
        .update_admin("ghost", Some("pw"), Some("g@x.edu"))
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Repo(RepoError::NotFound { ref key, .. }) if key == "ghost"
    ));
}

#[test]
fn delete_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let admins = service(&conn);
    admins.add_admin("admin", "pw", "a@x.edu").unwrap();

    assert!(admins.delete_admin("admin").unwrap());
    assert!(!admins.delete_admin("admin").unwrap());
    assert!(!admins.verify("admin", "pw").unwrap());
    assert!(admins.list_admins().unwrap().is_empty());
}

#[test]
fn list_exposes_username_and_email_only() {
    let conn = open_db_in_memory().unwrap();
    let admins = service(&conn);
    admins.add_admin("bravo", "pw", "b@x.edu").unwrap();
    admins.add_admin("alpha", "pw", "a@x.edu").unwrap();

    let accounts = admins.list_admins().unwrap();
    let pairs: Vec<_> = accounts
        .iter()
        .map(|account| (account.username.as_str(), account.email.as_str()))
        .collect();
    assert_eq!(pairs, vec![("alpha", "a@x.edu"), ("bravo", "b@x.edu")]);

    let json = serde_json::to_value(&accounts[0]).unwrap();
    assert_eq!(json.as_object().unwrap().len(), 2);
}
