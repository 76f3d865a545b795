mod common;

use chrono::{NaiveDate, NaiveTime};
use common::{insert_task, onboarded_user, Offline, Repeating};
use rand::rngs::StdRng;
use rand::SeedableRng;
use soulmirror_core::ai::fallback::FallbackKind;
use soulmirror_core::config::TaskPolicy;
use soulmirror_core::db::open_db_in_memory;
use soulmirror_core::model::sign::ZodiacSign;
use soulmirror_core::repo::task_repo::{SqliteTaskRepository, TaskListQuery, TaskRepository};
use soulmirror_core::service::advice_service::AdviceService;
use soulmirror_core::service::cache_service::{clear_ai_cache, CacheSelection, ClearedCounts};
use soulmirror_core::service::entry_service::EntryService;
use soulmirror_core::service::natal_service::{BirthData, NatalService};
use soulmirror_core::service::profile_service::ProfileService;
use soulmirror_core::service::stats_service::{StatsService, DEFAULT_AVERAGE_EMOTION};
use soulmirror_core::service::tarot_service::{TarotService, HISTORY_LIMIT};
use soulmirror_core::service::task_service::TaskService;
use soulmirror_core::service::ServiceError;
use soulmirror_core::AiAgent;
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

fn birth() -> BirthData {
    BirthData {
        birth_date: NaiveDate::from_ymd_opt(1994, 7, 28).unwrap(),
        birth_time: NaiveTime::from_hms_opt(6, 45, 0),
        birth_place: " Казань ".to_string(),
    }
}

#[test]
fn tarot_reading_draws_three_distinct_cards() {
    let conn = open_db_in_memory().unwrap();
    let agent = AiAgent::new(Repeating::new("Карты говорят о переменах."));
    let service = TarotService::new(&conn, &agent);
    let user_id = onboarded_user(&conn, "tarot", ZodiacSign::Scorpio);

    let reading = service
        .draw_reading(user_id, "  Что ждёт меня в работе?  ", &mut StdRng::seed_from_u64(13))
        .unwrap();
    assert_eq!(reading.question, "Что ждёт меня в работе?");
    assert_eq!(reading.interpretation, "Карты говорят о переменах.");
    assert_eq!(reading.cards.len(), 3);
    let names: HashSet<&str> = reading.cards.iter().map(|card| card.card.as_str()).collect();
    assert_eq!(names.len(), 3);

    let history = service.history(user_id).unwrap();
    assert_eq!(history, vec![reading]);
}

#[test]
fn tarot_rejects_blank_questions_and_unknown_users() {
    let conn = open_db_in_memory().unwrap();
    let agent = AiAgent::new(Repeating::new("ответ"));
    let service = TarotService::new(&conn, &agent);
    let user_id = onboarded_user(&conn, "asker", ZodiacSign::Leo);
    let mut rng = StdRng::seed_from_u64(14);

    let err = service.draw_reading(user_id, "   ", &mut rng).unwrap_err();
    assert!(matches!(err, ServiceError::InvalidInput(_)));

    let stranger = Uuid::new_v4();
    let err = service.draw_reading(stranger, "Вопрос?", &mut rng).unwrap_err();
    assert!(matches!(err, ServiceError::UserNotFound(id) if id == stranger));
    assert_eq!(agent.generator().calls(), 0);
}

#[test]
fn tarot_history_is_capped() {
    let conn = open_db_in_memory().unwrap();
    let agent = AiAgent::new(Offline);
    let service = TarotService::new(&conn, &agent);
    let user_id = onboarded_user(&conn, "regular", ZodiacSign::Gemini);
    let mut rng = StdRng::seed_from_u64(15);

    for n in 0..12 {
        let reading = service
            .draw_reading(user_id, &format!("Вопрос {n}"), &mut rng)
            .unwrap();
        assert_eq!(reading.interpretation, FallbackKind::Tarot.text());
    }
    assert_eq!(service.history(user_id).unwrap().len(), HISTORY_LIMIT as usize);
}

#[test]
fn natal_chart_is_deterministic_and_replaced_in_place() {
    let conn = open_db_in_memory().unwrap();
    let agent = AiAgent::new(Repeating::new("Сильная воля."));
    let service = NatalService::new(&conn, &agent);
    let profiles = ProfileService::new(&conn);
    let user = profiles.register_user("natal").unwrap();
    let weights = BTreeMap::from([(ZodiacSign::Virgo, 2.0)]);
    profiles
        .complete_quiz(user.id, &weights, Some(ZodiacSign::Leo))
        .unwrap();
    assert!(service.get_chart(user.id).unwrap().is_none());

    let first = service.build_chart(user.id, birth()).unwrap();
    assert_eq!(first.birth_place, "Казань");
    assert_eq!(first.summary, "Натальная карта для Лев");
    assert_eq!(first.readings.personality, "Сильная воля.");
    assert_eq!(first.layout.houses.len(), 12);
    assert_eq!(first.layout.planets.len(), 7);
    assert_eq!(agent.generator().calls(), 4);

    let second = service.build_chart(user.id, birth()).unwrap();
    assert_eq!(second.id, first.id);
    assert_eq!(second.created_at, first.created_at);
    assert_eq!(second.layout, first.layout);

    let stored = service.get_chart(user.id).unwrap().unwrap();
    assert_eq!(stored, second);
}

#[test]
fn natal_chart_without_birth_sign_uses_default() {
    let conn = open_db_in_memory().unwrap();
    let agent = AiAgent::new(Offline);
    let service = NatalService::new(&conn, &agent);
    let user_id = onboarded_user(&conn, "unknown-birth", ZodiacSign::Aquarius);

    let chart = service.build_chart(user_id, birth()).unwrap();
    assert_eq!(chart.summary, "Натальная карта для человека");
    assert_eq!(chart.readings.career, FallbackKind::General.text());

    let newcomer = ProfileService::new(&conn).register_user("no-profile").unwrap();
    let err = service.build_chart(newcomer.id, birth()).unwrap_err();
    assert!(matches!(err, ServiceError::ProfileMissing(_)));
}

#[test]
fn clearing_cache_keeps_tasks_and_entries() {
    let conn = open_db_in_memory().unwrap();
    let agent = AiAgent::new(Offline);
    let user_id = onboarded_user(&conn, "cache", ZodiacSign::Capricorn);
    let mut rng = StdRng::seed_from_u64(16);

    let date = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
    AdviceService::new(&conn, &agent)
        .advice_for(user_id, date, &mut rng)
        .unwrap();
    let tarot = TarotService::new(&conn, &agent);
    tarot.draw_reading(user_id, "Первый", &mut rng).unwrap();
    tarot.draw_reading(user_id, "Второй", &mut rng).unwrap();
    NatalService::new(&conn, &agent)
        .build_chart(user_id, birth())
        .unwrap();
    EntryService::new(&conn, &agent)
        .submit_entry_on(user_id, date, "Рабочий день", 4)
        .unwrap();
    insert_task(&conn, user_id, "Книга", Some(ZodiacSign::Capricorn), 100, 1);

    let tarot_only = clear_ai_cache(
        &conn,
        CacheSelection {
            tarot: true,
            ..CacheSelection::default()
        },
    )
    .unwrap();
    assert_eq!(
        tarot_only,
        ClearedCounts {
            advice: 0,
            tarot: 2,
            natal: 0
        }
    );

    let rest = clear_ai_cache(&conn, CacheSelection::all()).unwrap();
    assert_eq!(rest.advice, 1);
    assert_eq!(rest.tarot, 0);
    assert_eq!(rest.natal, 1);
    assert_eq!(rest.total(), 2);

    let tasks = SqliteTaskRepository::new(&conn)
        .list_tasks(&TaskListQuery::for_user(user_id))
        .unwrap();
    assert_eq!(tasks.len(), 1);
    let entries = EntryService::new(&conn, &agent).list_entries(user_id, None).unwrap();
    assert_eq!(entries.len(), 1);
}

#[test]
fn stats_before_any_activity() {
    let conn = open_db_in_memory().unwrap();
    let user = ProfileService::new(&conn).register_user("idle").unwrap();

    let stats = StatsService::new(&conn).user_stats(user.id).unwrap();
    assert_eq!(stats.username, "idle");
    assert_eq!(stats.level, 1);
    assert_eq!(stats.total_experience, 0);
    assert_eq!(stats.tasks.total, 0);
    assert_eq!(stats.entries, 0);
    assert_eq!(stats.average_emotion, DEFAULT_AVERAGE_EMOTION);
    assert_eq!(stats.tarot_readings, 0);
    assert!(stats.current_sign.is_none());
    assert!(stats.top_signs.is_empty());

    let err = StatsService::new(&conn).user_stats(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, ServiceError::UserNotFound(_)));
}

#[test]
fn stats_summarize_activity() {
    let conn = open_db_in_memory().unwrap();
    let agent = AiAgent::new(Offline);
    let user_id = onboarded_user(&conn, "busy", ZodiacSign::Leo);
    let mut rng = StdRng::seed_from_u64(17);

    let entries = EntryService::new(&conn, &agent);
    let date = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
    entries.submit_entry_on(user_id, date, "Прогулка", 6).unwrap();
    entries.submit_entry_on(user_id, date, "Поездка", 7).unwrap();
    entries.submit_entry_on(user_id, date, "Встреча", 7).unwrap();

    let tasks = TaskService::new(&conn, &agent, TaskPolicy::default());
    let done = insert_task(&conn, user_id, "Прочитать", Some(ZodiacSign::Leo), 250, 1);
    tasks.complete_task(user_id, done.id).unwrap();
    let started = insert_task(&conn, user_id, "Начать", Some(ZodiacSign::Leo), 100, 2);
    tasks.start_task(user_id, started.id).unwrap();
    insert_task(&conn, user_id, "Позже", Some(ZodiacSign::Leo), 100, 3);

    TarotService::new(&conn, &agent)
        .draw_reading(user_id, "Вопрос", &mut rng)
        .unwrap();

    let stats = StatsService::new(&conn).user_stats(user_id).unwrap();
    // 30 + 35 + 35 from entries, 250 from the task.
    assert_eq!(stats.total_experience, 350);
    assert_eq!(stats.level, 4);
    assert_eq!(stats.tasks.total, 3);
    assert_eq!(stats.tasks.completed, 1);
    assert_eq!(stats.tasks.in_progress, 1);
    assert_eq!(stats.tasks.completed_books, 1);
    assert_eq!(stats.tasks.completed_movies, 0);
    assert_eq!(stats.entries, 3);
    assert_eq!(stats.average_emotion, 6.7);
    assert_eq!(stats.tarot_readings, 1);

    let current = stats.current_sign.unwrap();
    assert_eq!(current.sign, ZodiacSign::Leo);
    assert_eq!(stats.top_signs.len(), 3);
    assert_eq!(stats.top_signs[0].sign, ZodiacSign::Leo);
    assert_eq!(current.level, stats.top_signs[0].level);
}
