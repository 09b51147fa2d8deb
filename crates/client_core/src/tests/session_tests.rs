use super::*;
use std::time::{SystemTime, UNIX_EPOCH};

use shared::domain::UserId;

fn user(token: &str) -> User {
    User {
        id: UserId("u-1".into()),
        full_name: "Ana Anic".into(),
        email: "ana@example.com".into(),
        token: token.into(),
        birth_year: None,
        avatar: None,
        profile_pictures: None,
        birth_date: None,
    }
}

fn temp_session_path(label: &str) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    std::env::temp_dir()
        .join(format!("profile_gallery_session_{label}_{unique}"))
        .join("nested")
        .join(format!("{SESSION_KEY}.json"))
}

#[tokio::test]
async fn signed_out_session_has_no_bearer_token() {
    let session = SessionContext::load(MemorySessionStore::default()).await;
    assert!(!session.is_authenticated().await);
    assert!(matches!(
        session.bearer_token().await,
        Err(ClientError::NotAuthenticated)
    ));
}

#[tokio::test]
async fn restores_user_saved_by_previous_launch() {
    let path = temp_session_path("restore");

    let first = SessionContext::load(FileSessionStore::new(&path)).await;
    first.set_user(user("token-1")).await.expect("save user");
    drop(first);

    let second = SessionContext::load(FileSessionStore::new(&path)).await;
    assert_eq!(second.bearer_token().await.expect("token"), "token-1");
    assert_eq!(
        second.current_user().await.map(|u| u.email),
        Some("ana@example.com".to_string())
    );

    let _ = std::fs::remove_dir_all(path.parent().and_then(Path::parent).expect("root"));
}

#[tokio::test]
async fn logout_forgets_user_on_disk() {
    let path = temp_session_path("logout");

    let session = SessionContext::load(FileSessionStore::new(&path)).await;
    session.set_user(user("token-2")).await.expect("save user");
    session.logout().await.expect("logout");
    assert!(!session.is_authenticated().await);
    assert!(!path.exists());

    // Clearing twice is fine.
    session.logout().await.expect("second logout");

    let _ = std::fs::remove_dir_all(path.parent().and_then(Path::parent).expect("root"));
}

#[tokio::test]
async fn corrupt_record_starts_signed_out() {
    let path = temp_session_path("corrupt");
    std::fs::create_dir_all(path.parent().expect("parent")).expect("dirs");
    std::fs::write(&path, "{not json").expect("write");

    let session = SessionContext::load(FileSessionStore::new(&path)).await;
    assert!(!session.is_authenticated().await);

    let _ = std::fs::remove_dir_all(path.parent().and_then(Path::parent).expect("root"));
}
