//! Registration, verification, sign-in and profile flows over the in-memory
//! backends.

use std::sync::Arc;

use chrono::NaiveDate;
use idozer::domain::ports::UserRepository;
use idozer::domain::{
    AuthFailureKind, Email, ErrorCode, Gender, ProfileUpdate, StrengthLevel, Username,
};
use idozer::test_support::MutableClock;
use idozer::{App, InMemoryBackends};
use rstest::{fixture, rstest};

const EMAIL: &str = "a@b.com";
const PASSWORD: &str = "Aa1!aaaa";

struct Harness {
    app: App,
    backends: InMemoryBackends,
}

#[fixture]
fn harness() -> Harness {
    let backends = InMemoryBackends::default();
    let app = App::over_memory(&backends, MutableClock::shared("2024-03-04 09:00"));
    Harness { app, backends }
}

fn email() -> Email {
    Email::new(EMAIL).expect("email")
}

async fn verified_session(harness: &Harness) {
    harness
        .app
        .register("Ana", EMAIL, PASSWORD, PASSWORD)
        .await
        .expect("registered");
    assert!(harness.backends.identity.verify_email(&email()));
    harness.app.login(EMAIL, PASSWORD).await.expect("signed in");
}

#[rstest]
#[tokio::test]
async fn registration_then_unverified_login_is_blocked(harness: Harness) {
    let Harness { app, backends } = harness;

    let outcome = app
        .register("Ana", EMAIL, PASSWORD, PASSWORD)
        .await
        .expect("registered");

    assert!(outcome.is_verification_pending());
    assert!(outcome.verification_email_sent);
    assert_eq!(backends.identity.verification_requests(), vec![email()]);
    let record = backends
        .users
        .find_by_id(&outcome.user.id)
        .await
        .expect("lookup")
        .expect("user record written");
    assert_eq!(record.username.as_ref(), "Ana");

    let error = app.login(EMAIL, PASSWORD).await.expect_err("unverified");
    assert_eq!(
        AuthFailureKind::from_error(&error),
        Some(AuthFailureKind::EmailNotVerified)
    );
    assert!(app.current_session().await.is_none());
}

#[rstest]
#[tokio::test]
async fn verified_accounts_sign_in_and_out(harness: Harness) {
    verified_session(&harness).await;
    let session = harness.app.current_session().await.expect("session");
    assert_eq!(session.email, email());
    assert!(session.email_verified);

    assert_eq!(
        harness.backends.sessions.current(),
        Some(session.id_token.clone())
    );
    harness.app.sign_out().await;
    assert!(harness.app.current_session().await.is_none());
    assert!(harness.backends.sessions.current().is_none());
}

#[rstest]
#[tokio::test]
async fn mistyped_password_ends_the_previous_session(harness: Harness) {
    verified_session(&harness).await;

    let error = harness
        .app
        .login(EMAIL, "Aa1!wrong")
        .await
        .expect_err("wrong password");

    assert_eq!(
        AuthFailureKind::from_error(&error),
        Some(AuthFailureKind::WrongPassword)
    );
    assert!(harness.app.current_session().await.is_none());
    assert!(harness.backends.sessions.current().is_none());
}

#[rstest]
#[tokio::test]
async fn registration_leaves_no_backend_token_behind(harness: Harness) {
    harness
        .app
        .register("Ana", EMAIL, PASSWORD, PASSWORD)
        .await
        .expect("registered");

    assert!(harness.backends.sessions.current().is_none());
}

#[rstest]
#[case("", EMAIL, PASSWORD, PASSWORD)]
#[case("Ana", "not-an-email", PASSWORD, PASSWORD)]
#[case("Ana", EMAIL, PASSWORD, "Aa1!aaab")]
#[case("Ana", EMAIL, "abc", "abc")]
#[tokio::test]
async fn invalid_registration_forms_are_rejected_locally(
    harness: Harness,
    #[case] username: &str,
    #[case] email: &str,
    #[case] password: &str,
    #[case] confirmation: &str,
) {
    let error = harness
        .app
        .register(username, email, password, confirmation)
        .await
        .expect_err("invalid form");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert!(harness.backends.identity.verification_requests().is_empty());
}

#[rstest]
#[tokio::test]
async fn duplicate_registration_reports_email_in_use(harness: Harness) {
    let app = harness.app;
    app.register("Ana", EMAIL, PASSWORD, PASSWORD)
        .await
        .expect("first");

    let error = app
        .register("Ana Bis", EMAIL, PASSWORD, PASSWORD)
        .await
        .expect_err("duplicate");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(
        error.message(),
        AuthFailureKind::EmailAlreadyInUse.user_message()
    );
}

#[rstest]
#[tokio::test]
async fn password_reset_flow(harness: Harness) {
    let Harness { app, backends } = harness;

    let blank = app.reset_password("  ").await.expect_err("blank");
    assert_eq!(blank.code(), ErrorCode::InvalidRequest);

    let unknown = app.reset_password(EMAIL).await.expect_err("unknown");
    assert_eq!(
        AuthFailureKind::from_error(&unknown),
        Some(AuthFailureKind::UserNotFound)
    );

    app.register("Ana", EMAIL, PASSWORD, PASSWORD)
        .await
        .expect("registered");
    app.reset_password(EMAIL).await.expect("reset sent");
    assert_eq!(backends.identity.password_resets(), vec![email()]);
}

#[rstest]
#[case("abc", StrengthLevel::Weak)]
#[case("abcdefgh1", StrengthLevel::Medium)]
#[case(PASSWORD, StrengthLevel::Strong)]
fn password_strength_meter(#[case] password: &str, #[case] level: StrengthLevel) {
    assert_eq!(App::password_strength(password).level(), level);
}

#[rstest]
#[tokio::test]
async fn profile_is_created_then_updated(harness: Harness) {
    verified_session(&harness).await;
    let app = &harness.app;

    let missing = app.profile().await.expect_err("no profile yet");
    assert_eq!(missing.code(), ErrorCode::NotFound);

    let created = app
        .save_profile(ProfileUpdate {
            gender: Some(Some(Gender::Female)),
            date_of_birth: Some(NaiveDate::from_ymd_opt(1990, 5, 17)),
            ..ProfileUpdate::default()
        })
        .await
        .expect("created");
    assert!(created.created);
    assert_eq!(
        created.profile.date_of_birth_label().as_deref(),
        Some("17/05/1990")
    );

    let renamed = app
        .save_profile(ProfileUpdate {
            username: Some(Username::new("Ana María").expect("username")),
            ..ProfileUpdate::default()
        })
        .await
        .expect("renamed");
    assert!(!renamed.created);
    assert_eq!(renamed.profile.gender, Some(Gender::Female));

    let owner = harness
        .app
        .current_session()
        .await
        .expect("session")
        .user_id;
    let record = harness
        .backends
        .users
        .find_by_id(&owner)
        .await
        .expect("lookup")
        .expect("record");
    assert_eq!(record.username.as_ref(), "Ana María");

    let error = app
        .save_profile(ProfileUpdate {
            email: Some(Email::new("new@b.com").expect("email")),
            ..ProfileUpdate::default()
        })
        .await
        .expect_err("email is immutable");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(app.profile().await.expect("stored"), renamed.profile);
}

#[test]
fn in_memory_app_accepts_any_clock() {
    let clock = Arc::new(MutableClock::at("2024-12-31 23:59"));
    let app = App::in_memory(clock);
    assert_eq!(app.day_picker().month_label(), "December 2024");
}
