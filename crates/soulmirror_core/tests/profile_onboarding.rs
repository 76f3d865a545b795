use soulmirror_core::db::open_db_in_memory;
use soulmirror_core::model::sign::ZodiacSign;
use soulmirror_core::repo::user_repo::{SqliteUserRepository, UserRepository};
use soulmirror_core::service::profile_service::{ProfileService, ProfileServiceError};
use std::collections::BTreeMap;
use uuid::Uuid;

#[test]
fn registration_trims_and_rejects_duplicates() {
    let conn = open_db_in_memory().unwrap();
    let service = ProfileService::new(&conn);

    let user = service.register_user("  luna ").unwrap();
    assert_eq!(user.username, "luna");
    assert_eq!(user.level(), 1);
    assert!(!user.completed_initial_quiz);

    let err = service.register_user("luna").unwrap_err();
    assert!(matches!(err, ProfileServiceError::UsernameTaken(name) if name == "luna"));

    let err = service.register_user("   ").unwrap_err();
    assert!(matches!(err, ProfileServiceError::BlankUsername));

    let found = service.find_user(" luna").unwrap().unwrap();
    assert_eq!(found.id, user.id);
    assert!(service.find_user("sol").unwrap().is_none());
}

#[test]
fn quiz_creates_profile_once() {
    let conn = open_db_in_memory().unwrap();
    let service = ProfileService::new(&conn);
    let user = service.register_user("quiz").unwrap();
    assert!(service.get_profile(user.id).unwrap().is_none());

    let weights = BTreeMap::from([
        (ZodiacSign::Gemini, 3.0),
        (ZodiacSign::Scorpio, 7.5),
        (ZodiacSign::Pisces, 7.5),
    ]);
    let profile = service
        .complete_quiz(user.id, &weights, Some(ZodiacSign::Cancer))
        .unwrap();
    assert_eq!(profile.inner_sign, ZodiacSign::Scorpio);
    assert_eq!(profile.birth_sign, Some(ZodiacSign::Cancer));
    assert_eq!(profile.sign_progress.len(), 12);
    assert_eq!(profile.sign_progress(ZodiacSign::Aries), 0.0);
    assert_eq!(profile.sign_progress(ZodiacSign::Pisces), 7.5);

    let stored = service.get_profile(user.id).unwrap().unwrap();
    assert_eq!(stored, profile);
    let user = SqliteUserRepository::new(&conn).get_user(user.id).unwrap().unwrap();
    assert!(user.completed_initial_quiz);

    let err = service
        .complete_quiz(user.id, &weights, None)
        .unwrap_err();
    assert!(matches!(err, ProfileServiceError::ProfileAlreadyExists(id) if id == user.id));
}

#[test]
fn quiz_rejects_unknown_users_and_bad_weights() {
    let conn = open_db_in_memory().unwrap();
    let service = ProfileService::new(&conn);

    let missing = Uuid::new_v4();
    let err = service
        .complete_quiz(missing, &BTreeMap::new(), None)
        .unwrap_err();
    assert!(matches!(err, ProfileServiceError::UserNotFound(id) if id == missing));

    let user = service.register_user("nan").unwrap();
    let weights = BTreeMap::from([(ZodiacSign::Leo, f64::NAN)]);
    let err = service.complete_quiz(user.id, &weights, None).unwrap_err();
    assert!(matches!(err, ProfileServiceError::InvalidWeights));
    assert!(service.get_profile(user.id).unwrap().is_none());
}

#[test]
fn sign_stats_put_all_signs_at_level_one_after_onboarding() {
    let conn = open_db_in_memory().unwrap();
    let service = ProfileService::new(&conn);
    let user = service.register_user("stats").unwrap();

    let err = service.sign_stats(user.id).unwrap_err();
    assert!(matches!(err, ProfileServiceError::ProfileMissing(_)));

    let weights = BTreeMap::from([(ZodiacSign::Virgo, 1.0)]);
    service.complete_quiz(user.id, &weights, None).unwrap();

    let stats = service.sign_stats(user.id).unwrap();
    assert_eq!(stats.len(), 12);
    assert!(stats.iter().all(|stat| stat.level == 1 && stat.experience == 0));
    assert_eq!(stats.iter().filter(|stat| stat.is_current).count(), 1);
    let current = stats.iter().find(|stat| stat.is_current).unwrap();
    assert_eq!(current.sign, ZodiacSign::Virgo);
}
