use chrono::Duration;

use cheatplace_domain::verification::{CodePurpose, is_well_formed_code};
use cheatplace_verification::domain::repository::Clock;
use cheatplace_verification::error::VerificationServiceError;
use cheatplace_verification::usecase::issue::{IssueCodeInput, IssueCodeUseCase};
use cheatplace_verification::usecase::verify::{VerifyCodeInput, VerifyCodeUseCase};

use crate::helpers::{FixedClock, MockBanRepo, MockCodeRepo, MockMailer};

fn input(email: &str, purpose: &str) -> IssueCodeInput {
    IssueCodeInput {
        email: email.to_owned(),
        purpose: purpose.to_owned(),
        user_id: None,
        client_ip: None,
    }
}

fn usecase(
    codes: &MockCodeRepo,
    mailer: &MockMailer,
    clock: &FixedClock,
) -> IssueCodeUseCase<MockCodeRepo, MockBanRepo, MockMailer, FixedClock> {
    IssueCodeUseCase {
        codes: codes.clone(),
        bans: MockBanRepo::new(),
        mailer: mailer.clone(),
        clock: clock.clone(),
    }
}

#[tokio::test]
async fn should_store_one_pending_code_and_email_it() {
    let codes = MockCodeRepo::new();
    let mailer = MockMailer::new();
    let clock = FixedClock::new();

    usecase(&codes, &mailer, &clock)
        .execute(input("alice@example.com", "signup"))
        .await
        .unwrap();

    let stored = codes.codes_handle();
    let stored = stored.lock().unwrap();
    assert_eq!(stored.len(), 1, "expected exactly one code row");
    let row = &stored[0];
    assert_eq!(row.email, "alice@example.com");
    assert_eq!(row.purpose, CodePurpose::Signup);
    assert!(is_well_formed_code(&row.code));
    assert!(!row.verified);
    assert_eq!(row.expires_at - row.created_at, Duration::minutes(10));

    let sent = mailer.sent_handle();
    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "alice@example.com");
    assert!(sent[0].html.contains(&row.code), "email must carry the code");
    assert!(sent[0].html.contains("finaliser votre inscription"));
}

#[tokio::test]
async fn should_trim_email_and_keep_optional_user_id() {
    let codes = MockCodeRepo::new();
    let mailer = MockMailer::new();
    let clock = FixedClock::new();
    let user_id = uuid::Uuid::new_v4();

    usecase(&codes, &mailer, &clock)
        .execute(IssueCodeInput {
            email: "  Bob@Example.com ".to_owned(),
            purpose: "login".to_owned(),
            user_id: Some(user_id.to_string()),
            client_ip: None,
        })
        .await
        .unwrap();

    let stored = codes.codes_handle();
    let stored = stored.lock().unwrap();
    assert_eq!(stored[0].email, "Bob@Example.com", "case is preserved");
    assert_eq!(stored[0].user_id, Some(user_id));
}

#[tokio::test]
async fn should_reject_invalid_email_type_and_user_id() {
    let codes = MockCodeRepo::new();
    let mailer = MockMailer::new();
    let clock = FixedClock::new();
    let uc = usecase(&codes, &mailer, &clock);

    let bad_email = uc.execute(input("not-an-email", "login")).await;
    assert!(
        matches!(bad_email, Err(VerificationServiceError::InvalidRequest(_))),
        "expected InvalidRequest, got {bad_email:?}"
    );

    let bad_type = uc.execute(input("alice@example.com", "reset")).await;
    assert!(matches!(
        bad_type,
        Err(VerificationServiceError::InvalidRequest(_))
    ));

    let bad_user = uc
        .execute(IssueCodeInput {
            user_id: Some("42".to_owned()),
            ..input("alice@example.com", "login")
        })
        .await;
    assert!(matches!(
        bad_user,
        Err(VerificationServiceError::InvalidRequest(_))
    ));

    assert!(codes.codes_handle().lock().unwrap().is_empty());
    assert!(mailer.sent_handle().lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_rate_limit_sixth_issuance_in_window() {
    let codes = MockCodeRepo::new();
    let mailer = MockMailer::new();
    let clock = FixedClock::new();
    let uc = usecase(&codes, &mailer, &clock);

    for _ in 0..5 {
        uc.execute(input("carol@example.com", "login")).await.unwrap();
        clock.advance(Duration::seconds(10));
    }
    let sixth = uc.execute(input("carol@example.com", "login")).await;
    assert!(
        matches!(sixth, Err(VerificationServiceError::TooManyAttempts)),
        "expected TooManyAttempts, got {sixth:?}"
    );
    assert_eq!(codes.codes_handle().lock().unwrap().len(), 5, "no code created");
    assert_eq!(mailer.sent_handle().lock().unwrap().len(), 5);

    // Other addresses are unaffected.
    uc.execute(input("dave@example.com", "login")).await.unwrap();
}

#[tokio::test]
async fn should_keep_counting_issuances_after_successful_verifications() {
    let codes = MockCodeRepo::new();
    let mailer = MockMailer::new();
    let clock = FixedClock::new();
    let uc = usecase(&codes, &mailer, &clock);
    let verify = VerifyCodeUseCase {
        codes: codes.clone(),
        clock: clock.clone(),
    };

    // Resend then verify: superseded rows must keep counting.
    for _ in 0..2 {
        for _ in 0..2 {
            uc.execute(input("paul@example.com", "login")).await.unwrap();
            clock.advance(Duration::seconds(1));
        }
        verify
            .execute(VerifyCodeInput {
                email: "paul@example.com".to_owned(),
                code: codes.latest_code("paul@example.com"),
                purpose: "login".to_owned(),
            })
            .await
            .unwrap();
    }
    uc.execute(input("paul@example.com", "login")).await.unwrap();

    let sixth = uc.execute(input("paul@example.com", "login")).await;
    assert!(
        matches!(sixth, Err(VerificationServiceError::TooManyAttempts)),
        "expected TooManyAttempts, got {sixth:?}"
    );
    assert_eq!(mailer.sent_handle().lock().unwrap().len(), 5);
}

#[tokio::test]
async fn should_allow_issuance_again_once_window_slides() {
    let codes = MockCodeRepo::new();
    let mailer = MockMailer::new();
    let clock = FixedClock::new();
    let uc = usecase(&codes, &mailer, &clock);

    for _ in 0..5 {
        uc.execute(input("carol@example.com", "login")).await.unwrap();
    }
    clock.advance(Duration::minutes(15) + Duration::seconds(1));
    uc.execute(input("carol@example.com", "login")).await.unwrap();
}

#[tokio::test]
async fn should_fail_open_when_rate_lookup_fails() {
    let codes = MockCodeRepo {
        fail_lookups: true,
        ..MockCodeRepo::new()
    };
    let mailer = MockMailer::new();
    let clock = FixedClock::new();
    let uc = usecase(&codes, &mailer, &clock);

    for _ in 0..7 {
        uc.execute(input("erin@example.com", "login")).await.unwrap();
    }
    assert_eq!(mailer.sent_handle().lock().unwrap().len(), 7);
}

#[tokio::test]
async fn should_remove_code_when_delivery_fails() {
    let codes = MockCodeRepo::new();
    let mailer = MockMailer::failing();
    let clock = FixedClock::new();

    let result = usecase(&codes, &mailer, &clock)
        .execute(input("frank@example.com", "signup"))
        .await;

    assert!(
        matches!(result, Err(VerificationServiceError::Delivery(_))),
        "expected Delivery, got {result:?}"
    );
    assert!(
        codes.codes_handle().lock().unwrap().is_empty(),
        "undelivered code must not survive"
    );
}

#[tokio::test]
async fn should_not_send_when_store_write_fails() {
    let codes = MockCodeRepo {
        fail_writes: true,
        ..MockCodeRepo::new()
    };
    let mailer = MockMailer::new();
    let clock = FixedClock::new();

    let result = usecase(&codes, &mailer, &clock)
        .execute(input("gina@example.com", "login"))
        .await;

    assert!(matches!(result, Err(VerificationServiceError::Internal(_))));
    assert!(mailer.sent_handle().lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_expire_previous_code_for_same_purpose_only() {
    let codes = MockCodeRepo::new();
    let mailer = MockMailer::new();
    let clock = FixedClock::new();
    let uc = usecase(&codes, &mailer, &clock);

    uc.execute(input("hank@example.com", "signup")).await.unwrap();
    uc.execute(input("hank@example.com", "login")).await.unwrap();
    clock.advance(Duration::seconds(30));
    uc.execute(input("hank@example.com", "signup")).await.unwrap();

    let now = clock.now();
    let stored = codes.codes_handle();
    let stored = stored.lock().unwrap();
    let live: Vec<_> = stored.iter().filter(|c| c.is_live(now)).collect();
    assert_eq!(live.len(), 2, "one live code per purpose");
    assert!(live.iter().any(|c| c.purpose == CodePurpose::Login));
    assert_eq!(stored.len(), 3, "superseded rows still count toward the window");
}

#[tokio::test]
async fn should_refuse_banned_email_or_ip_before_rate_limit() {
    let codes = MockCodeRepo::new();
    let mailer = MockMailer::new();
    let clock = FixedClock::new();

    let by_email = IssueCodeUseCase {
        codes: codes.clone(),
        bans: MockBanRepo::new().with_email("ivan@example.com"),
        mailer: mailer.clone(),
        clock: clock.clone(),
    };
    let result = by_email.execute(input("ivan@example.com", "login")).await;
    assert!(matches!(result, Err(VerificationServiceError::Banned)));

    let by_ip = IssueCodeUseCase {
        codes: codes.clone(),
        bans: MockBanRepo::new().with_ip("203.0.113.9"),
        mailer: mailer.clone(),
        clock: clock.clone(),
    };
    let result = by_ip
        .execute(IssueCodeInput {
            client_ip: Some("203.0.113.9".to_owned()),
            ..input("judy@example.com", "login")
        })
        .await;
    assert!(matches!(result, Err(VerificationServiceError::Banned)));

    assert!(codes.codes_handle().lock().unwrap().is_empty());
    assert!(mailer.sent_handle().lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_fail_closed_when_ban_lookup_fails() {
    let uc = IssueCodeUseCase {
        codes: MockCodeRepo::new(),
        bans: MockBanRepo {
            fail: true,
            ..MockBanRepo::new()
        },
        mailer: MockMailer::new(),
        clock: FixedClock::new(),
    };
    let result = uc.execute(input("kim@example.com", "login")).await;
    assert!(matches!(result, Err(VerificationServiceError::Internal(_))));
}
