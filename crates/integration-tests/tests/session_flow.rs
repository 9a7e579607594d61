//! Integration tests for the sign-in state machine.
//!
//! Each test drives `SessionStore` through `AppState`, the same way the CLI
//! does, and checks what a later store built over the same ports sees.

#![allow(clippy::unwrap_used)]

use bazaar_integration_tests::{file_state, memory_state, temp_state_path};
use bazaar_store::models::{AddressInput, ProfileUpdate, SessionPhase};
use bazaar_store::services::auth::AuthError;

#[tokio::test]
async fn test_register_verify_then_login_again() {
    let state = memory_state();
    let mut session = state.session_store().unwrap();

    let challenge = session
        .register("asha@example.com", "secret1", "Asha", "9876500001")
        .await
        .unwrap();
    assert_eq!(challenge.masked_phone, "******0001");
    assert_eq!(session.phase(), SessionPhase::PendingVerification);
    assert!(state.directory().list().unwrap().is_empty());

    let account = session.verify_otp("424242").await.unwrap();
    assert!(account.is_verified);
    assert!(!account.is_admin);
    assert_eq!(session.phase(), SessionPhase::Authenticated);
    assert_eq!(state.directory().list().unwrap().len(), 1);

    session.logout();
    assert_eq!(session.phase(), SessionPhase::Anonymous);

    let again = session.login("ASHA@example.com", "secret1").await.unwrap();
    assert_eq!(again.id, account.id);
}

#[tokio::test]
async fn test_wrong_password_leaves_session_anonymous() {
    let state = memory_state();
    let mut session = state.session_store().unwrap();
    session
        .register("ravi@example.com", "secret1", "Ravi", "9876500002")
        .await
        .unwrap();
    session.verify_otp("111111").await.unwrap();
    session.logout();

    let result = session.login("ravi@example.com", "wrong-password").await;
    assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    assert_eq!(session.phase(), SessionPhase::Anonymous);
}

#[tokio::test]
async fn test_malformed_otp_keeps_registration_pending() {
    let state = memory_state();
    let mut session = state.session_store().unwrap();
    session
        .register("meera@example.com", "secret1", "Meera", "9876500003")
        .await
        .unwrap();

    for code in ["", "12345", "abcdef", "1234567"] {
        assert!(matches!(
            session.verify_otp(code).await,
            Err(AuthError::InvalidOtp)
        ));
    }
    assert_eq!(session.phase(), SessionPhase::PendingVerification);

    session.resend_otp().await;
    assert_eq!(session.phase(), SessionPhase::PendingVerification);
    session.verify_otp("000000").await.unwrap();
}

#[tokio::test]
async fn test_duplicate_email_and_phone_rejected() {
    let state = memory_state();
    let mut session = state.session_store().unwrap();
    session
        .register("kiran@example.com", "secret1", "Kiran", "9876500004")
        .await
        .unwrap();
    session.verify_otp("123456").await.unwrap();
    session.logout();

    let same_email = session
        .register("Kiran@Example.com", "secret2", "Other", "9876500005")
        .await;
    assert!(matches!(same_email, Err(AuthError::AccountAlreadyExists)));

    let same_phone = session
        .register("other@example.com", "secret2", "Other", "9876500004")
        .await;
    assert!(matches!(same_phone, Err(AuthError::AccountAlreadyExists)));

    let operator = session
        .register("admin@ecommerce.com", "secret2", "Imposter", "9876500006")
        .await;
    assert!(matches!(operator, Err(AuthError::AccountAlreadyExists)));
    assert_eq!(session.phase(), SessionPhase::Anonymous);
}

#[tokio::test]
async fn test_registration_validation_reports_every_field() {
    let state = memory_state();
    let mut session = state.session_store().unwrap();

    let Err(AuthError::Validation(errors)) =
        session.register("not-an-email", "123", "", "12345").await
    else {
        panic!("expected validation errors");
    };
    for field in ["email", "password", "name", "phone"] {
        assert!(errors.get(field).is_some(), "missing error for {field}");
    }
    assert_eq!(session.phase(), SessionPhase::Anonymous);
}

#[tokio::test]
async fn test_operator_login_is_admin_and_demo_is_not() {
    let state = memory_state();
    let mut session = state.session_store().unwrap();

    let admin = session
        .login("admin@ecommerce.com", "password123")
        .await
        .unwrap();
    assert!(admin.is_admin);
    session.logout();

    let demo = session.login("user@demo.com", "password123").await.unwrap();
    assert!(!demo.is_admin);
}

#[tokio::test]
async fn test_profile_update_persists_to_directory() {
    let state = memory_state();
    let mut session = state.session_store().unwrap();
    session
        .register("nisha@example.com", "secret1", "Nisha", "9876500007")
        .await
        .unwrap();
    session.verify_otp("222222").await.unwrap();

    let updated = session
        .update_profile(ProfileUpdate {
            name: Some("Nisha R".to_owned()),
            address: Some(AddressInput {
                street: "12 MG Road".to_owned(),
                city: "Bengaluru".to_owned(),
                state: "Karnataka".to_owned(),
                pincode: "560001".to_owned(),
            }),
            ..ProfileUpdate::default()
        })
        .await
        .unwrap();
    assert_eq!(updated.name, "Nisha R");
    assert!(updated.is_verified);

    let stored = state.directory().list().unwrap();
    let stored = stored.iter().find(|u| u.id == updated.id).unwrap();
    assert_eq!(stored.name, "Nisha R");
    assert_eq!(stored.address, updated.address);
}

#[tokio::test]
async fn test_profile_update_cannot_take_another_email() {
    let state = memory_state();
    let mut session = state.session_store().unwrap();
    for (email, phone) in [
        ("first@example.com", "9876500008"),
        ("second@example.com", "9876500009"),
    ] {
        session.register(email, "secret1", "User", phone).await.unwrap();
        session.verify_otp("333333").await.unwrap();
        session.logout();
    }
    session.login("second@example.com", "secret1").await.unwrap();

    let result = session
        .update_profile(ProfileUpdate {
            email: Some("first@example.com".to_owned()),
            ..ProfileUpdate::default()
        })
        .await;
    assert!(matches!(result, Err(AuthError::AccountAlreadyExists)));
    assert_eq!(
        session.current_user().unwrap().email.as_str(),
        "second@example.com"
    );
}

#[tokio::test]
async fn test_profile_update_requires_sign_in() {
    let state = memory_state();
    let mut session = state.session_store().unwrap();
    let result = session
        .update_profile(ProfileUpdate {
            name: Some("Nobody".to_owned()),
            ..ProfileUpdate::default()
        })
        .await;
    assert!(matches!(result, Err(AuthError::NotAuthenticated)));
}

#[tokio::test]
async fn test_session_survives_restart_on_same_file() {
    let path = temp_state_path();

    {
        let state = file_state(path.clone());
        let mut session = state.session_store().unwrap();
        session
            .register("dev@example.com", "secret1", "Dev", "9876500010")
            .await
            .unwrap();
    }

    // A later process picks up the pending sign-up.
    {
        let state = file_state(path.clone());
        let mut session = state.session_store().unwrap();
        assert_eq!(session.phase(), SessionPhase::PendingVerification);
        session.verify_otp("654321").await.unwrap();
    }

    let state = file_state(path.clone());
    let session = state.session_store().unwrap();
    assert_eq!(session.phase(), SessionPhase::Authenticated);
    assert_eq!(
        session.current_user().unwrap().email.as_str(),
        "dev@example.com"
    );

    let _ = std::fs::remove_file(&path);
}

#[tokio::test]
async fn test_corrupt_session_value_is_dropped() {
    let state = memory_state();
    state.kv().set("current_user", "{not json".to_owned()).unwrap();

    let session = state.session_store().unwrap();
    assert_eq!(session.phase(), SessionPhase::Anonymous);
    assert!(state.kv().get("current_user").unwrap().is_none());
}
