mod common;

use chrono::NaiveDate;
use common::{insert_task, onboarded_user, Offline, Repeating};
use rand::rngs::StdRng;
use rand::SeedableRng;
use soulmirror_core::ai::fallback::FallbackKind;
use soulmirror_core::config::TaskPolicy;
use soulmirror_core::db::open_db_in_memory;
use soulmirror_core::model::sign::ZodiacSign;
use soulmirror_core::model::task::TaskStatus;
use soulmirror_core::repo::profile_repo::{ProfileRepository, SqliteProfileRepository};
use soulmirror_core::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use soulmirror_core::repo::user_repo::{SqliteUserRepository, UserRepository};
use soulmirror_core::service::advice_service::AdviceService;
use soulmirror_core::service::entry_service::{EntryService, EntryServiceError};
use soulmirror_core::service::profile_service::ProfileService;
use soulmirror_core::service::task_service::TaskService;
use soulmirror_core::service::ServiceError;
use soulmirror_core::AiAgent;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
}

#[test]
fn entry_is_validated_before_anything_is_stored() {
    let conn = open_db_in_memory().unwrap();
    let agent = AiAgent::new(Repeating::new("совет"));
    let service = EntryService::new(&conn, &agent);
    let user_id = onboarded_user(&conn, "checks", ZodiacSign::Leo);

    let err = service.submit_entry(user_id, "что-то", 0).unwrap_err();
    assert!(matches!(err, EntryServiceError::InvalidEmotion(0)));
    let err = service.submit_entry(user_id, "что-то", 11).unwrap_err();
    assert!(matches!(err, EntryServiceError::InvalidEmotion(11)));
    let err = service.submit_entry(user_id, " \n ", 5).unwrap_err();
    assert!(matches!(err, EntryServiceError::BlankEvent));

    let newcomer = ProfileService::new(&conn).register_user("newcomer").unwrap();
    let err = service.submit_entry(newcomer.id, "что-то", 5).unwrap_err();
    assert!(matches!(err, EntryServiceError::ProfileMissing(id) if id == newcomer.id));

    assert!(service.list_entries(user_id, None).unwrap().is_empty());
    assert_eq!(agent.generator().calls(), 0);
}

#[test]
fn entry_grants_experience_and_sign_influence() {
    let conn = open_db_in_memory().unwrap();
    let agent = AiAgent::new(Offline);
    let service = EntryService::new(&conn, &agent);
    let user_id = onboarded_user(&conn, "writer", ZodiacSign::Leo);

    let report = service
        .submit_entry_on(user_id, day(2), "  Тихий вечер с книгой  ", 8)
        .unwrap();

    let entry = &report.entry;
    assert_eq!(entry.date, day(2));
    assert_eq!(entry.event_description, "Тихий вечер с книгой");
    assert_eq!(entry.emotion_level, 8);
    assert_eq!(entry.experience_gained, 40);
    assert_eq!(entry.advice, FallbackKind::Event.text());
    assert_eq!(entry.sign_influences.len(), 3);
    assert!(!report.user_leveled_up);
    assert_eq!(report.new_user_level, 1);
    assert!(report.sign_level_ups.is_empty());
    assert!(!report.sign_changed);

    let user = SqliteUserRepository::new(&conn).get_user(user_id).unwrap().unwrap();
    assert_eq!(user.total_experience(), 40);

    let profile = SqliteProfileRepository::new(&conn)
        .get_profile(user_id)
        .unwrap()
        .unwrap();
    assert_eq!(profile.sign_experience(ZodiacSign::Leo), 48);
    assert_eq!(profile.sign_experience(ZodiacSign::Sagittarius), 44);
    assert_eq!(profile.sign_experience(ZodiacSign::Aries), 40);
    assert_eq!(profile.sign_experience(ZodiacSign::Libra), 0);
    assert!((profile.sign_progress(ZodiacSign::Leo) - 58.0).abs() < 1e-9);

    let history = service.list_entries(user_id, None).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0], report.entry);
}

#[test]
fn keyword_bonus_rounds_into_sign_experience() {
    let conn = open_db_in_memory().unwrap();
    let agent = AiAgent::new(Repeating::new("Всё получится."));
    let service = EntryService::new(&conn, &agent);
    let user_id = onboarded_user(&conn, "family", ZodiacSign::Cancer);

    // Neutral band, base 25; one Cancer keyword adds 7.5.
    let report = service
        .submit_entry_on(user_id, day(3), "Ужин всей семьёй дома", 5)
        .unwrap();
    assert_eq!(report.entry.advice, "Всё получится.");

    let profile = SqliteProfileRepository::new(&conn)
        .get_profile(user_id)
        .unwrap()
        .unwrap();
    assert_eq!(profile.sign_experience(ZodiacSign::Cancer), 8);
    assert_eq!(profile.sign_experience(ZodiacSign::Libra), 28);
    assert_eq!(profile.sign_experience(ZodiacSign::Virgo), 25);
}

#[test]
fn entry_that_moves_inner_sign_removes_stale_tasks() {
    let conn = open_db_in_memory().unwrap();
    let agent = AiAgent::new(Repeating::new("Дыши глубже."));
    let offline = AiAgent::new(Offline);
    let user_id = onboarded_user(&conn, "deep", ZodiacSign::Leo);

    let done = insert_task(&conn, user_id, "Сцена", Some(ZodiacSign::Leo), 10, 1);
    TaskService::new(&conn, &offline, TaskPolicy::default())
        .complete_task(user_id, done.id)
        .unwrap();
    let leo = insert_task(&conn, user_id, "Ещё сцена", Some(ZodiacSign::Leo), 100, 2);
    let untargeted = insert_task(&conn, user_id, "Просто книга", None, 100, 3);
    let scorpio = insert_task(&conn, user_id, "Глубина", Some(ZodiacSign::Scorpio), 100, 4);

    let profiles = SqliteProfileRepository::new(&conn);
    let mut profile = profiles.get_profile(user_id).unwrap().unwrap();
    profile.sign_levels.insert(ZodiacSign::Scorpio, 3);
    profile.sign_experience.insert(ZodiacSign::Scorpio, 490);
    profiles.update_profile(&profile).unwrap();

    let report = EntryService::new(&conn, &agent)
        .submit_entry_on(user_id, day(9), "Тихий вечер", 2)
        .unwrap();
    assert!(report.sign_changed);
    assert_eq!(report.new_sign, Some(ZodiacSign::Scorpio));
    assert_eq!(report.old_tasks_removed, 2);
    let scorpio_up = report
        .sign_level_ups
        .iter()
        .find(|result| result.sign == ZodiacSign::Scorpio)
        .unwrap();
    assert_eq!(scorpio_up.new_level, 4);
    assert_eq!(scorpio_up.current_experience, 2);

    let tasks = SqliteTaskRepository::new(&conn);
    assert!(tasks.get_task(leo.id).unwrap().is_none());
    assert!(tasks.get_task(untargeted.id).unwrap().is_none());
    assert!(tasks.get_task(scorpio.id).unwrap().is_some());
    assert_eq!(tasks.get_task(done.id).unwrap().unwrap().status, TaskStatus::Completed);

    let profile = profiles.get_profile(user_id).unwrap().unwrap();
    assert_eq!(profile.inner_sign, ZodiacSign::Scorpio);
}

#[test]
fn history_is_limited() {
    let conn = open_db_in_memory().unwrap();
    let agent = AiAgent::new(Offline);
    let service = EntryService::new(&conn, &agent);
    let user_id = onboarded_user(&conn, "diary", ZodiacSign::Aries);

    for d in 1..=4 {
        service
            .submit_entry_on(user_id, day(d), "Обычный день", 6)
            .unwrap();
    }
    assert_eq!(service.list_entries(user_id, Some(2)).unwrap().len(), 2);
    assert_eq!(service.list_entries(user_id, None).unwrap().len(), 4);
}

#[test]
fn advice_is_generated_once_per_day() {
    let conn = open_db_in_memory().unwrap();
    let agent = AiAgent::new(Repeating::new("Слушай себя."));
    let service = AdviceService::new(&conn, &agent);
    let user_id = onboarded_user(&conn, "advice", ZodiacSign::Pisces);
    let mut rng = StdRng::seed_from_u64(21);

    let first = service.advice_for(user_id, day(5), &mut rng).unwrap();
    assert_eq!(first.advice, "Слушай себя.");
    assert!(!first.is_revealed);

    let again = service.advice_for(user_id, day(5), &mut rng).unwrap();
    assert_eq!(again.id, first.id);
    assert_eq!(agent.generator().calls(), 1);

    let next_day = service.advice_for(user_id, day(6), &mut rng).unwrap();
    assert_ne!(next_day.id, first.id);
    assert_eq!(agent.generator().calls(), 2);
}

#[test]
fn reveal_marks_advice_and_returns_text() {
    let conn = open_db_in_memory().unwrap();
    let agent = AiAgent::new(Offline);
    let service = AdviceService::new(&conn, &agent);
    let user_id = onboarded_user(&conn, "reveal", ZodiacSign::Libra);
    let mut rng = StdRng::seed_from_u64(22);

    let err = service.reveal_advice(user_id, day(7)).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let advice = service.advice_for(user_id, day(7), &mut rng).unwrap();
    assert_eq!(advice.advice, FallbackKind::Advice.text());

    let text = service.reveal_advice(user_id, day(7)).unwrap();
    assert_eq!(text, advice.advice);
    assert!(service.advice_for(user_id, day(7), &mut rng).unwrap().is_revealed);
    assert_eq!(service.reveal_advice(user_id, day(7)).unwrap(), text);
}

#[test]
fn advice_needs_a_profile() {
    let conn = open_db_in_memory().unwrap();
    let agent = AiAgent::new(Offline);
    let service = AdviceService::new(&conn, &agent);
    let user = ProfileService::new(&conn).register_user("early").unwrap();

    let err = service
        .advice_for(user.id, day(8), &mut StdRng::seed_from_u64(1))
        .unwrap_err();
    assert!(matches!(err, ServiceError::ProfileMissing(id) if id == user.id));
}
