//! Navigation, authentication and tracking lifecycle over in-memory services

mod common;

use app_core::auth::{AuthForm, AuthOutcome};
use app_core::tracker::PermissionStatus;
use app_state::notice::Notice;
use app_state::session::Session;
use app_ui::navigation::{Screen, StartAction};
use common::{berlin, munich, test_app, StraightRouter};
use nav_client::types::Identity;

fn granted() -> common::TestApp {
    test_app(PermissionStatus::Granted, StraightRouter::default())
}

#[tokio::test]
async fn test_navigator_hidden_during_restore() {
    let mut t = granted();
    t.app.begin_restore();
    assert_eq!(t.app.navigator().visible(), None);

    t.app.finish_restore(None);
    assert_eq!(t.app.navigator().visible(), Some(Screen::Start));
    assert!(!t.app.session().is_signed_in());
}

#[tokio::test]
async fn test_restored_session_is_used_for_uploads() {
    let mut t = granted();
    t.app.begin_restore();
    t.app.finish_restore(Some(Session {
        user_id: "user-9".to_string(),
        email: None,
        access_token: "restored".to_string(),
        refresh_token: None,
    }));

    t.app.press_start(StartAction::ExploreMap).await;
    t.gps.fix(berlin()).await;

    assert_eq!(t.uploads.recv().await.unwrap(), berlin());
    assert_eq!(
        t.log.entries.lock().unwrap()[0].0,
        Identity::new("user-9", "restored")
    );
}

#[tokio::test]
async fn test_get_started_then_sign_in_opens_map() {
    let mut t = granted();

    t.app.press_start(StartAction::GetStarted).await;
    assert_eq!(t.app.navigator().current(), Screen::Auth);
    assert!(!t.app.is_tracking());

    let outcome = t
        .app
        .submit_auth(&AuthForm::sign_in("driver@example.com", "secret"))
        .await
        .unwrap();

    assert!(matches!(outcome, AuthOutcome::SignedIn(_)));
    assert_eq!(t.app.navigator().current(), Screen::Map);
    assert!(t.app.is_tracking());

    t.gps.fix(munich()).await;
    assert_eq!(t.uploads.recv().await.unwrap(), munich());
    assert_eq!(
        t.log.entries.lock().unwrap()[0].0,
        Identity::new("user-1", "jwt")
    );
}

#[tokio::test]
async fn test_wrong_password_stays_on_auth() {
    let mut t = granted();
    let mut notices = t.app.notices().subscribe();
    t.app.press_start(StartAction::GetStarted).await;

    let result = t
        .app
        .submit_auth(&AuthForm::sign_in("driver@example.com", "nope"))
        .await;

    assert!(result.is_err());
    assert_eq!(
        notices.recv().await.unwrap(),
        Notice::error("Invalid login credentials")
    );
    assert_eq!(t.app.navigator().current(), Screen::Auth);
    assert!(!t.app.is_tracking());
}

#[tokio::test]
async fn test_sign_up_asks_for_confirmation() {
    let mut t = granted();
    let mut notices = t.app.notices().subscribe();
    t.app.press_start(StartAction::GetStarted).await;

    let outcome = t
        .app
        .submit_auth(&AuthForm::sign_up("new@example.com", "secret"))
        .await
        .unwrap();

    assert_eq!(outcome, AuthOutcome::ConfirmationSent);
    assert_eq!(notices.recv().await.unwrap(), Notice::confirm_email());
    assert_eq!(t.app.navigator().current(), Screen::Auth);
}

#[tokio::test]
async fn test_guest_fixes_are_not_uploaded() {
    let mut t = granted();
    let mut state = t.app.map_store().subscribe();
    t.app.press_start(StartAction::ExploreMap).await;

    t.gps.fix(munich()).await;
    state
        .wait_for(|s| s.user_position() == Some(munich()))
        .await
        .unwrap();

    t.app.shutdown().await;
    assert!(t.uploads.try_recv().is_err());
}

#[tokio::test]
async fn test_settings_keeps_tracking_and_leaving_map_stops_it() {
    let mut t = granted();
    t.app.press_start(StartAction::ExploreMap).await;
    assert!(t.app.is_tracking());

    t.app.navigate(Screen::Settings).await;
    assert_eq!(Screen::Settings.options().title, Some("Settings"));
    assert!(t.app.is_tracking());
    assert!(!t.app.settings().toggle_dark());

    assert!(t.app.go_back().await);
    assert_eq!(t.app.navigator().current(), Screen::Map);
    assert!(t.app.is_tracking());

    assert!(t.app.go_back().await);
    assert_eq!(t.app.navigator().current(), Screen::Start);
    assert!(!t.app.is_tracking());
    assert!(t.gps.is_closed());
}

#[tokio::test]
async fn test_sign_out_stops_uploads() {
    let mut t = granted();
    t.app.press_start(StartAction::GetStarted).await;
    t.app
        .submit_auth(&AuthForm::sign_in("driver@example.com", "secret"))
        .await
        .unwrap();

    t.gps.fix(munich()).await;
    t.uploads.recv().await.unwrap();

    t.app.sign_out().await.unwrap();
    let mut state = t.app.map_store().subscribe();
    t.gps.fix(berlin()).await;
    state
        .wait_for(|s| s.user_position() == Some(berlin()))
        .await
        .unwrap();

    t.app.shutdown().await;
    assert!(t.uploads.try_recv().is_err());
    assert_eq!(t.log.entries.lock().unwrap().len(), 1);
}
