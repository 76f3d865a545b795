mod common;

use common::{insert_task, onboarded_user, Offline, Repeating, Scripted};
use rand::rngs::StdRng;
use rand::SeedableRng;
use soulmirror_core::config::TaskPolicy;
use soulmirror_core::db::open_db_in_memory;
use soulmirror_core::model::sign::ZodiacSign;
use soulmirror_core::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use soulmirror_core::service::task_service::TaskService;
use soulmirror_core::{generate_unique_task, AiAgent};

#[test]
fn repeated_duplicates_are_accepted_after_last_attempt() {
    let agent = AiAgent::new(Repeating::new("Название: Дюна\nАвтор: Фрэнк Герберт"));
    let existing = vec!["  Дюна ".to_string()];
    let mut rng = StdRng::seed_from_u64(2);

    let outcome = generate_unique_task(&agent, &mut rng, ZodiacSign::Aquarius, &existing, 5);
    assert_eq!(outcome.draft.title, "Дюна");
    assert_eq!(outcome.attempts, 5);
    assert!(outcome.degraded);
    assert_eq!(agent.generator().calls(), 5);
}

#[test]
fn fresh_title_stops_retrying_immediately() {
    let agent = AiAgent::new(Scripted::new([
        "Название: Дюна",
        "Название: Дюна",
        "Название: Солярис",
        "Название: Пикник на обочине",
    ]));
    let existing = vec!["Дюна".to_string()];
    let mut rng = StdRng::seed_from_u64(4);

    let outcome = generate_unique_task(&agent, &mut rng, ZodiacSign::Pisces, &existing, 5);
    assert_eq!(outcome.draft.title, "Солярис");
    assert_eq!(outcome.attempts, 3);
    assert!(!outcome.degraded);
    assert_eq!(agent.generator().calls(), 3);
}

#[test]
fn offline_generator_still_yields_a_draft() {
    let agent = AiAgent::new(Offline);
    let mut rng = StdRng::seed_from_u64(9);

    let outcome = generate_unique_task(&agent, &mut rng, ZodiacSign::Taurus, &[], 5);
    assert_eq!(outcome.attempts, 1);
    assert!(!outcome.degraded);
    assert!(!outcome.draft.title.trim().is_empty());
    assert!(outcome.draft.description.contains("Телец"));
}

#[test]
fn backlog_counts_degraded_duplicates() {
    let conn = open_db_in_memory().unwrap();
    let agent = AiAgent::new(Repeating::new("Название: Дюна"));
    let service = TaskService::new(&conn, &agent, TaskPolicy::default());
    let user_id = onboarded_user(&conn, "repeat", ZodiacSign::Leo);

    let report = service
        .ensure_task_backlog(user_id, &mut StdRng::seed_from_u64(5))
        .unwrap();
    assert_eq!(report.created, 3);
    assert_eq!(report.degraded, 2);
    assert_eq!(agent.generator().calls(), 1 + 5 + 5);

    let titles = SqliteTaskRepository::new(&conn).list_titles(user_id).unwrap();
    assert_eq!(titles, vec!["Дюна", "Дюна", "Дюна"]);
}

#[test]
fn backlog_respects_attempt_policy() {
    let conn = open_db_in_memory().unwrap();
    let agent = AiAgent::new(Repeating::new("Название: Дюна"));
    let policy = TaskPolicy {
        min_active: 2,
        max_attempts: 2,
        backlog_retry_budget: 6,
    };
    let service = TaskService::new(&conn, &agent, policy);
    let user_id = onboarded_user(&conn, "policy", ZodiacSign::Leo);
    insert_task(&conn, user_id, "Дюна", Some(ZodiacSign::Aries), 100, 1);

    let report = service
        .ensure_task_backlog(user_id, &mut StdRng::seed_from_u64(6))
        .unwrap();
    assert_eq!(report.created, 2);
    assert_eq!(report.degraded, 2);
    assert_eq!(agent.generator().calls(), 4);
}
