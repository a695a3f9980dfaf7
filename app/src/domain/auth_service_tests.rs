//! Tests for the account service.

use std::sync::Arc;

use mockable::DefaultClock;
use mockall::Sequence;
use rstest::rstest;

use super::*;
use crate::domain::ports::{
    FixtureSessionTokenStore, FixtureUserRepository, MockIdentityProvider, MockSessionTokenStore,
    MockUserRepository, ProviderAccount,
};
use crate::domain::{ErrorCode, IdToken, UserId};

type Service<U, T> = AuthService<MockIdentityProvider, U, T>;

fn make_service<U: UserRepository>(
    provider: MockIdentityProvider,
    users: U,
) -> Service<U, FixtureSessionTokenStore> {
    with_tokens(provider, users, FixtureSessionTokenStore)
}

fn with_tokens<U: UserRepository, T: SessionTokenStore>(
    provider: MockIdentityProvider,
    users: U,
    tokens: T,
) -> Service<U, T> {
    AuthService::new(
        Arc::new(provider),
        Arc::new(users),
        Arc::new(tokens),
        Arc::new(DefaultClock),
    )
}

fn account(email_verified: bool) -> ProviderAccount {
    ProviderAccount {
        user_id: UserId::new("uid123").expect("user id"),
        email: Email::new("a@b.com").expect("email"),
        email_verified,
        id_token: IdToken::new("token"),
    }
}

fn registration() -> RegistrationRequest {
    RegistrationRequest::try_from_parts("Ana", "a@b.com", "Aa1!aaaa", "Aa1!aaaa")
        .expect("valid registration")
}

fn credentials() -> LoginCredentials {
    LoginCredentials::try_from_parts("a@b.com", "Aa1!aaaa").expect("valid credentials")
}

#[tokio::test]
async fn register_creates_account_record_and_requests_verification() {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_sign_up()
        .times(1)
        .return_once(|_| Ok(account(false)));
    provider
        .expect_send_verification_email()
        .withf(|token| token.expose() == "token")
        .times(1)
        .return_once(|_| Ok(()));
    let mut users = MockUserRepository::new();
    users
        .expect_upsert()
        .withf(|user| user.id.as_ref() == "uid123" && user.username.as_ref() == "Ana")
        .times(1)
        .return_once(|_| Ok(()));

    let service = make_service(provider, users);
    let outcome = service.register(&registration()).await.expect("registered");

    assert!(outcome.is_verification_pending());
    assert!(outcome.verification_email_sent);
    assert_eq!(outcome.user.email.as_ref(), "a@b.com");
    assert!(service.current_session().await.is_none());
}

#[tokio::test]
async fn register_survives_verification_email_failure() {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_sign_up()
        .return_once(|_| Ok(account(false)));
    provider
        .expect_send_verification_email()
        .return_once(|_| Err(IdentityProviderError::transport("timeout")));

    let service = make_service(provider, FixtureUserRepository);
    let outcome = service.register(&registration()).await.expect("registered");

    assert!(!outcome.verification_email_sent);
}

#[rstest]
#[case("EMAIL_EXISTS", AuthFailureKind::EmailAlreadyInUse, ErrorCode::Conflict)]
#[case("INVALID_EMAIL", AuthFailureKind::InvalidEmail, ErrorCode::InvalidRequest)]
#[case(
    "WEAK_PASSWORD : Password should be at least 6 characters",
    AuthFailureKind::WeakPassword,
    ErrorCode::InvalidRequest
)]
#[tokio::test]
async fn register_classifies_provider_rejections(
    #[case] code: &'static str,
    #[case] kind: AuthFailureKind,
    #[case] error_code: ErrorCode,
) {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_sign_up()
        .return_once(move |_| Err(IdentityProviderError::rejected(code)));
    let mut users = MockUserRepository::new();
    users.expect_upsert().never();

    let service = make_service(provider, users);
    let error = service.register(&registration()).await.expect_err("rejected");

    assert_eq!(error.code(), error_code);
    assert_eq!(AuthFailureKind::from_error(&error), Some(kind));
    assert_eq!(error.message(), kind.user_message());
}

#[tokio::test]
async fn register_reports_unavailable_user_store() {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_sign_up()
        .return_once(|_| Ok(account(false)));
    provider.expect_send_verification_email().never();
    let mut users = MockUserRepository::new();
    users
        .expect_upsert()
        .return_once(|_| Err(UserPersistenceError::connection("offline")));

    let service = make_service(provider, users);
    let error = service.register(&registration()).await.expect_err("store down");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[tokio::test]
async fn login_with_verified_email_opens_session() {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_sign_in()
        .withf(|creds| creds.email().as_ref() == "a@b.com")
        .return_once(|_| Ok(account(true)));

    let service = make_service(provider, FixtureUserRepository);
    let session = service.login(&credentials()).await.expect("signed in");

    assert_eq!(session.user_id.as_ref(), "uid123");
    assert_eq!(service.current_session().await, Some(session));
}

#[tokio::test]
async fn login_before_verification_is_blocked_and_signed_out() {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_sign_in()
        .times(2)
        .returning(|creds| {
            Ok(ProviderAccount {
                email_verified: creds.password() == "verified",
                ..account(true)
            })
        });

    let service = make_service(provider, FixtureUserRepository);
    let verified = LoginCredentials::try_from_parts("a@b.com", "verified").expect("creds");
    service.login(&verified).await.expect("first sign in");

    let error = service.login(&credentials()).await.expect_err("unverified");

    assert_eq!(
        AuthFailureKind::from_error(&error),
        Some(AuthFailureKind::EmailNotVerified)
    );
    assert_eq!(
        error.message(),
        "Debe verificar su correo electrónico antes de iniciar sesión."
    );
    assert!(service.current_session().await.is_none());
}

#[rstest]
#[case(IdentityProviderError::rejected("INVALID_PASSWORD"), AuthFailureKind::WrongPassword)]
#[case(IdentityProviderError::rejected("EMAIL_NOT_FOUND"), AuthFailureKind::UserNotFound)]
#[case(
    IdentityProviderError::rejected("INVALID_LOGIN_CREDENTIALS"),
    AuthFailureKind::InvalidCredentials
)]
#[case(IdentityProviderError::rejected("USER_DISABLED"), AuthFailureKind::UserDisabled)]
#[case(
    IdentityProviderError::rejected("TOO_MANY_ATTEMPTS_TRY_LATER"),
    AuthFailureKind::TooManyRequests
)]
#[case(IdentityProviderError::transport("dns"), AuthFailureKind::NetworkFailure)]
#[case(IdentityProviderError::decode("bad json"), AuthFailureKind::Unknown)]
#[tokio::test]
async fn login_classifies_provider_failures(
    #[case] failure: IdentityProviderError,
    #[case] kind: AuthFailureKind,
) {
    let mut provider = MockIdentityProvider::new();
    provider.expect_sign_in().return_once(move |_| Err(failure));

    let service = make_service(provider, FixtureUserRepository);
    let error = service.login(&credentials()).await.expect_err("failure");

    assert_eq!(AuthFailureKind::from_error(&error), Some(kind));
}

#[rstest]
#[case("")]
#[case("   ")]
#[tokio::test]
async fn reset_password_requires_an_email(#[case] email: &str) {
    let mut provider = MockIdentityProvider::new();
    provider.expect_send_password_reset().never();

    let service = make_service(provider, FixtureUserRepository);
    let error = service.reset_password(email).await.expect_err("missing email");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn reset_password_maps_unknown_accounts() {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_send_password_reset()
        .withf(|email| email.as_ref() == "ghost@b.com")
        .return_once(|_| Err(IdentityProviderError::rejected("EMAIL_NOT_FOUND")));

    let service = make_service(provider, FixtureUserRepository);
    let error = service
        .reset_password("ghost@b.com")
        .await
        .expect_err("unknown account");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(
        AuthFailureKind::from_error(&error),
        Some(AuthFailureKind::UserNotFound)
    );
}

#[tokio::test]
async fn sign_out_clears_session() {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_sign_in()
        .return_once(|_| Ok(account(true)));

    let service = make_service(provider, FixtureUserRepository);
    service.login(&credentials()).await.expect("signed in");
    service.sign_out().await;

    assert!(service.current_session().await.is_none());
}

#[tokio::test]
async fn register_writes_the_user_record_with_the_sign_up_token() {
    let mut seq = Sequence::new();
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_sign_up()
        .return_once(|_| Ok(account(false)));
    provider
        .expect_send_verification_email()
        .return_once(|_| Ok(()));
    let mut tokens = MockSessionTokenStore::new();
    let mut users = MockUserRepository::new();
    tokens
        .expect_bind()
        .withf(|token| token.expose() == "token")
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());
    users
        .expect_upsert()
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Ok(()));
    tokens
        .expect_clear()
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());

    let service = with_tokens(provider, users, tokens);
    service.register(&registration()).await.expect("registered");

    assert!(service.current_session().await.is_none());
}

#[tokio::test]
async fn register_releases_the_sign_up_token_when_the_write_fails() {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_sign_up()
        .return_once(|_| Ok(account(false)));
    provider.expect_send_verification_email().never();
    let mut users = MockUserRepository::new();
    users
        .expect_upsert()
        .return_once(|_| Err(UserPersistenceError::unauthorized("status 401")));
    let mut tokens = MockSessionTokenStore::new();
    tokens.expect_bind().times(1).return_const(());
    tokens.expect_clear().times(1).return_const(());

    let service = with_tokens(provider, users, tokens);
    let error = service.register(&registration()).await.expect_err("denied");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn failed_login_ends_the_previous_session() {
    let mut provider = MockIdentityProvider::new();
    provider.expect_sign_in().times(2).returning(|creds| {
        if creds.password() == "Aa1!aaaa" {
            Ok(account(true))
        } else {
            Err(IdentityProviderError::rejected("INVALID_PASSWORD"))
        }
    });
    let mut seq = Sequence::new();
    let mut tokens = MockSessionTokenStore::new();
    tokens
        .expect_bind()
        .withf(|token| token.expose() == "token")
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());
    tokens
        .expect_clear()
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());

    let service = with_tokens(provider, FixtureUserRepository, tokens);
    service.login(&credentials()).await.expect("signed in");
    let mistyped = LoginCredentials::try_from_parts("a@b.com", "Aa1!wrong").expect("creds");
    let error = service.login(&mistyped).await.expect_err("wrong password");

    assert_eq!(
        AuthFailureKind::from_error(&error),
        Some(AuthFailureKind::WrongPassword)
    );
    assert!(service.current_session().await.is_none());
}

#[tokio::test]
async fn sign_out_releases_the_backend_token() {
    let mut provider = MockIdentityProvider::new();
    provider
        .expect_sign_in()
        .return_once(|_| Ok(account(true)));
    let mut tokens = MockSessionTokenStore::new();
    tokens.expect_bind().times(1).return_const(());
    tokens.expect_clear().times(1).return_const(());

    let service = with_tokens(provider, FixtureUserRepository, tokens);
    service.login(&credentials()).await.expect("signed in");
    service.sign_out().await;

    assert!(service.current_session().await.is_none());
}
