use rusqlite::Connection;
use std::collections::HashSet;
use veille_core::db::open_db_in_memory;
use veille_core::{
    FactDraft, FactListQuery, FactRepository, FactSearchQuery, RepoError, SqliteFactRepository,
    TechnoCount,
};

fn seed(repo: &SqliteFactRepository<'_>, rows: &[(&str, &str)]) {
    for (fact, techno) in rows {
        repo.insert_fact(&FactDraft::new(*fact, *techno)).unwrap();
    }
}

#[test]
fn insert_assigns_increasing_ids_and_roundtrips() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteFactRepository::try_new(&conn).unwrap();

    let first = repo
        .insert_fact(&FactDraft::new("Cargo resolves features.", "Rust"))
        .unwrap();
    let second = repo
        .insert_fact(&FactDraft::new("Tokio is an async runtime.", "Rust"))
        .unwrap();
    assert!(second.id > first.id);

    let loaded = repo.get_fact(first.id).unwrap().unwrap();
    assert_eq!(loaded, first);
}

#[test]
fn insert_rejects_invalid_draft_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteFactRepository::try_new(&conn).unwrap();

    let err = repo.insert_fact(&FactDraft::new("", "Rust")).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(repo.count_facts().unwrap(), 0);
}

#[test]
fn ids_are_not_reused_after_delete() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteFactRepository::try_new(&conn).unwrap();

    let first = repo.insert_fact(&FactDraft::new("a", "A")).unwrap();
    assert!(repo.delete_fact(first.id).unwrap());
    let second = repo.insert_fact(&FactDraft::new("b", "B")).unwrap();
    assert!(second.id > first.id);
}

#[test]
fn update_keeps_creation_timestamp() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteFactRepository::try_new(&conn).unwrap();

    let created = repo.insert_fact(&FactDraft::new("draft", "PHP")).unwrap();
    let updated = repo
        .update_fact(created.id, &FactDraft::new("final", "Symfony"))
        .unwrap();

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.fact, "final");
    assert_eq!(updated.techno, "Symfony");
    assert_eq!(updated.date_enregistrement, created.date_enregistrement);
}

#[test]
fn update_unknown_id_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteFactRepository::try_new(&conn).unwrap();

    let err = repo
        .update_fact(404, &FactDraft::new("x", "y"))
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(404)));
}

#[test]
fn delete_reports_whether_a_row_was_removed() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteFactRepository::try_new(&conn).unwrap();

    let fact = repo.insert_fact(&FactDraft::new("gone", "Git")).unwrap();
    assert!(repo.delete_fact(fact.id).unwrap());
    assert!(!repo.delete_fact(fact.id).unwrap());
    assert!(repo.get_fact(fact.id).unwrap().is_none());
}

#[test]
fn list_orders_newest_first_and_counts_whole_filter() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteFactRepository::try_new(&conn).unwrap();
    seed(
        &repo,
        &[("one", "Rust"), ("two", "PHP"), ("three", "Rust"), ("four", "Rust")],
    );

    let slice = repo
        .list_facts(&FactListQuery {
            techno: Some("Rust".to_string()),
            offset: 1,
            limit: 1,
        })
        .unwrap();
    assert_eq!(slice.total, 3);
    assert_eq!(slice.items.len(), 1);
    assert_eq!(slice.items[0].fact, "three");

    let all = repo
        .list_facts(&FactListQuery {
            techno: None,
            offset: 0,
            limit: 10,
        })
        .unwrap();
    let texts: Vec<_> = all.items.iter().map(|fact| fact.fact.as_str()).collect();
    assert_eq!(texts, vec!["four", "three", "two", "one"]);
}

#[test]
fn list_techno_filter_is_exact_match() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteFactRepository::try_new(&conn).unwrap();
    seed(&repo, &[("a", "Rust"), ("b", "rust"), ("c", "Rustacean")]);

    let slice = repo
        .list_facts(&FactListQuery {
            techno: Some("Rust".to_string()),
            offset: 0,
            limit: 10,
        })
        .unwrap();
    assert_eq!(slice.total, 1);
    assert_eq!(slice.items[0].fact, "a");
}

#[test]
fn count_by_techno_sorts_by_count_then_name() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteFactRepository::try_new(&conn).unwrap();
    seed(
        &repo,
        &[("1", "PHP"), ("2", "Go"), ("3", "PHP"), ("4", "Docker"), ("5", "Go")],
    );

    let counts = repo.count_by_techno().unwrap();
    assert_eq!(
        counts,
        vec![
            TechnoCount {
                techno: "Go".to_string(),
                count: 2
            },
            TechnoCount {
                techno: "PHP".to_string(),
                count: 2
            },
            TechnoCount {
                techno: "Docker".to_string(),
                count: 1
            },
        ]
    );
}

#[test]
fn search_matches_substring_and_escapes_wildcards() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteFactRepository::try_new(&conn).unwrap();
    seed(
        &repo,
        &[
            ("JavaScript was written in 10 days.", "JavaScript"),
            ("TypeScript adds types to javascript.", "TypeScript"),
            ("Coverage reached 100% today.", "Testing"),
            ("Coverage reached 1000 lines.", "Testing"),
        ],
    );

    let hits = repo
        .search_facts(&FactSearchQuery {
            text: Some("javascript".to_string()),
            techno: None,
            limit: 10,
        })
        .unwrap();
    assert_eq!(hits.len(), 2);

    let combined = repo
        .search_facts(&FactSearchQuery {
            text: Some("javascript".to_string()),
            techno: Some("TypeScript".to_string()),
            limit: 10,
        })
        .unwrap();
    assert_eq!(combined.len(), 1);
    assert_eq!(combined[0].techno, "TypeScript");

    let percent = repo
        .search_facts(&FactSearchQuery {
            text: Some("100%".to_string()),
            techno: None,
            limit: 10,
        })
        .unwrap();
    assert_eq!(percent.len(), 1);
    assert!(percent[0].fact.contains("100%"));
}

#[test]
fn random_fact_respects_filter_and_empty_store() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteFactRepository::try_new(&conn).unwrap();
    assert!(repo.random_fact(None).unwrap().is_none());

    seed(&repo, &[("a", "Rust"), ("b", "PHP"), ("c", "Rust")]);

    let mut seen = HashSet::new();
    for _ in 0..64 {
        let fact = repo.random_fact(Some("Rust")).unwrap().unwrap();
        assert_eq!(fact.techno, "Rust");
        seen.insert(fact.fact);
    }
    assert!(seen.len() <= 2);
    assert!(repo.random_fact(Some("Cobol")).unwrap().is_none());
}

#[test]
fn recent_and_clear_and_ping() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteFactRepository::try_new(&conn).unwrap();
    seed(&repo, &[("1", "A"), ("2", "A"), ("3", "A")]);

    let recent = repo.recent_facts(2).unwrap();
    let texts: Vec<_> = recent.iter().map(|fact| fact.fact.as_str()).collect();
    assert_eq!(texts, vec!["3", "2"]);

    repo.ping().unwrap();
    assert_eq!(repo.clear_facts().unwrap(), 3);
    assert_eq!(repo.count_facts().unwrap(), 0);
}

#[test]
fn read_rejects_corrupted_timestamp() {
    let conn = open_db_in_memory().unwrap();
    insert_raw(&conn, "bad", "Rust", i64::MAX);
    let repo = SqliteFactRepository::try_new(&conn).unwrap();

    let id = conn.last_insert_rowid();
    let err = repo.get_fact(id).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

fn insert_raw(conn: &Connection, fact: &str, techno: &str, millis: i64) {
    conn.execute(
        "INSERT INTO fact (fact, techno, date_enregistrement) VALUES (?1, ?2, ?3);",
        rusqlite::params![fact, techno, millis],
    )
    .unwrap();
}
