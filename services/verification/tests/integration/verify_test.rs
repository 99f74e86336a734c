use chrono::Duration;

use cheatplace_verification::error::VerificationServiceError;
use cheatplace_verification::usecase::issue::{IssueCodeInput, IssueCodeUseCase};
use cheatplace_verification::usecase::verify::{VerifyCodeInput, VerifyCodeUseCase};

use crate::helpers::{FixedClock, MockBanRepo, MockCodeRepo, MockMailer};

struct Harness {
    codes: MockCodeRepo,
    clock: FixedClock,
}

impl Harness {
    fn new() -> Self {
        Self {
            codes: MockCodeRepo::new(),
            clock: FixedClock::new(),
        }
    }

    async fn issue(&self, email: &str, purpose: &str) -> String {
        IssueCodeUseCase {
            codes: self.codes.clone(),
            bans: MockBanRepo::new(),
            mailer: MockMailer::new(),
            clock: self.clock.clone(),
        }
        .execute(IssueCodeInput {
            email: email.to_owned(),
            purpose: purpose.to_owned(),
            user_id: None,
            client_ip: None,
        })
        .await
        .unwrap();
        self.codes.latest_code(email)
    }

    async fn verify(
        &self,
        email: &str,
        code: &str,
        purpose: &str,
    ) -> Result<(), VerificationServiceError> {
        VerifyCodeUseCase {
            codes: self.codes.clone(),
            clock: self.clock.clone(),
        }
        .execute(VerifyCodeInput {
            email: email.to_owned(),
            code: code.to_owned(),
            purpose: purpose.to_owned(),
        })
        .await
    }
}

/// A well-formed code guaranteed to differ from `code`.
fn wrong(code: &str) -> String {
    if code == "111111" {
        "222222".to_owned()
    } else {
        "111111".to_owned()
    }
}

#[tokio::test]
async fn should_accept_code_once() {
    let h = Harness::new();
    let code = h.issue("alice@example.com", "signup").await;

    {
        let stored = h.codes.codes_handle();
        let stored = stored.lock().unwrap();
        assert_eq!(stored.iter().filter(|c| !c.verified).count(), 1);
    }

    h.verify("alice@example.com", &code, "signup").await.unwrap();
    assert!(h.codes.codes_handle().lock().unwrap()[0].verified);

    let again = h.verify("alice@example.com", &code, "signup").await;
    assert!(
        matches!(again, Err(VerificationServiceError::InvalidOrExpiredCode { .. })),
        "expected InvalidOrExpiredCode, got {again:?}"
    );
}

#[tokio::test]
async fn should_reject_code_after_expiry() {
    let h = Harness::new();
    let code = h.issue("bob@example.com", "login").await;

    h.clock.advance(Duration::minutes(10));

    let result = h.verify("bob@example.com", &code, "login").await;
    assert!(matches!(
        result,
        Err(VerificationServiceError::InvalidOrExpiredCode { .. })
    ));
    assert!(!h.codes.codes_handle().lock().unwrap()[0].verified);
}

#[tokio::test]
async fn should_accept_code_just_before_expiry() {
    let h = Harness::new();
    let code = h.issue("bob@example.com", "login").await;

    h.clock.advance(Duration::minutes(10) - Duration::seconds(1));

    h.verify("bob@example.com", &code, "login").await.unwrap();
}

#[tokio::test]
async fn should_reject_never_issued_code_generically() {
    let h = Harness::new();

    let err = h
        .verify("nobody@example.com", "123456", "login")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "invalid or expired code");
    assert!(
        matches!(
            err,
            VerificationServiceError::InvalidOrExpiredCode { attempts_left: 5 }
        ),
        "expected InvalidOrExpiredCode, got {err:?}"
    );
}

#[tokio::test]
async fn should_reject_code_for_other_purpose() {
    let h = Harness::new();
    let code = h.issue("carol@example.com", "login").await;

    let result = h.verify("carol@example.com", &code, "signup").await;
    assert!(matches!(
        result,
        Err(VerificationServiceError::InvalidOrExpiredCode { .. })
    ));

    h.verify("carol@example.com", &code, "login").await.unwrap();
}

#[tokio::test]
async fn should_reject_malformed_codes_without_spending_budget() {
    let h = Harness::new();
    let code = h.issue("dave@example.com", "login").await;

    for bad in ["12345", "1234567", "12a456", "", " 123456", "１２３４５６"] {
        let result = h.verify("dave@example.com", bad, "login").await;
        assert!(
            matches!(result, Err(VerificationServiceError::MalformedCode)),
            "{bad:?} should be malformed, got {result:?}"
        );
    }
    assert_eq!(h.codes.codes_handle().lock().unwrap()[0].failed_attempts, 0);

    h.verify("dave@example.com", &code, "login").await.unwrap();
}

#[tokio::test]
async fn should_count_down_and_lock_after_five_wrong_guesses() {
    let h = Harness::new();
    let code = h.issue("erin@example.com", "login").await;
    let guess = wrong(&code);

    for expected_left in (0..5).rev() {
        match h.verify("erin@example.com", &guess, "login").await {
            Err(VerificationServiceError::InvalidOrExpiredCode { attempts_left }) => {
                assert_eq!(attempts_left, expected_left)
            }
            other => panic!("expected InvalidOrExpiredCode, got {other:?}"),
        }
    }

    let locked = h.verify("erin@example.com", &code, "login").await;
    assert!(
        matches!(locked, Err(VerificationServiceError::TooManyAttempts)),
        "correct code must be refused once locked, got {locked:?}"
    );

    // The lock lifts when the failures leave the window.
    h.clock.advance(Duration::minutes(15) + Duration::seconds(1));
    let fresh = h.issue("erin@example.com", "login").await;
    h.verify("erin@example.com", &fresh, "login").await.unwrap();
}

#[tokio::test]
async fn should_not_spend_verify_budget_on_resends() {
    let h = Harness::new();
    for _ in 0..5 {
        h.issue("frank@example.com", "signup").await;
    }
    let code = h.codes.latest_code("frank@example.com");
    h.verify("frank@example.com", &code, "signup").await.unwrap();
}

#[tokio::test]
async fn should_reject_superseded_code() {
    let h = Harness::new();
    let first = h.issue("gina@example.com", "login").await;
    h.clock.advance(Duration::seconds(20));
    let second = h.issue("gina@example.com", "login").await;

    if first != second {
        let result = h.verify("gina@example.com", &first, "login").await;
        assert!(matches!(
            result,
            Err(VerificationServiceError::InvalidOrExpiredCode { .. })
        ));
    }
    h.verify("gina@example.com", &second, "login").await.unwrap();
}

#[tokio::test]
async fn should_clean_up_only_rows_outside_the_window_after_success() {
    let h = Harness::new();
    h.issue("hank@example.com", "login").await;
    h.clock.advance(Duration::minutes(16));
    h.issue("hank@example.com", "login").await;
    h.clock.advance(Duration::seconds(5));
    let code = h.issue("hank@example.com", "login").await;

    h.verify("hank@example.com", &code, "login").await.unwrap();

    let stored = h.codes.codes_handle();
    let stored = stored.lock().unwrap();
    assert_eq!(stored.len(), 2, "only the row older than the window is removed");
    assert_eq!(stored.iter().filter(|c| c.verified).count(), 1);
    assert_eq!(stored.iter().filter(|c| !c.verified).count(), 1);
}

#[tokio::test]
async fn should_refund_the_charged_guess_on_success() {
    let h = Harness::new();
    let code = h.issue("iris@example.com", "signup").await;

    let miss = h.verify("iris@example.com", &wrong(&code), "signup").await;
    assert!(matches!(
        miss,
        Err(VerificationServiceError::InvalidOrExpiredCode { attempts_left: 4 })
    ));
    h.verify("iris@example.com", &code, "signup").await.unwrap();

    assert_eq!(h.codes.codes_handle().lock().unwrap()[0].failed_attempts, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn should_cap_parallel_wrong_guesses_at_the_budget() {
    let h = Harness::new();
    let code = h.issue("jane@example.com", "login").await;
    let guess = wrong(&code);

    let mut tasks = tokio::task::JoinSet::new();
    for _ in 0..20 {
        let usecase = VerifyCodeUseCase {
            codes: h.codes.clone(),
            clock: h.clock.clone(),
        };
        let guess = guess.clone();
        tasks.spawn(async move {
            usecase
                .execute(VerifyCodeInput {
                    email: "jane@example.com".to_owned(),
                    code: guess,
                    purpose: "login".to_owned(),
                })
                .await
        });
    }

    let (mut wrong_guesses, mut locked) = (0, 0);
    while let Some(result) = tasks.join_next().await {
        match result.unwrap() {
            Err(VerificationServiceError::InvalidOrExpiredCode { .. }) => wrong_guesses += 1,
            Err(VerificationServiceError::TooManyAttempts) => locked += 1,
            other => panic!("unexpected outcome {other:?}"),
        }
    }
    assert_eq!(wrong_guesses, 5);
    assert_eq!(locked, 15);

    let correct = h.verify("jane@example.com", &code, "login").await;
    assert!(matches!(correct, Err(VerificationServiceError::TooManyAttempts)));
}

#[tokio::test]
async fn should_fail_open_when_guess_charge_fails() {
    let h = Harness::new();
    let code = h.issue("kim@example.com", "login").await;

    let usecase = VerifyCodeUseCase {
        codes: MockCodeRepo {
            fail_lookups: true,
            ..h.codes.clone()
        },
        clock: h.clock.clone(),
    };
    usecase
        .execute(VerifyCodeInput {
            email: "kim@example.com".to_owned(),
            code,
            purpose: "login".to_owned(),
        })
        .await
        .unwrap();
    assert!(h.codes.codes_handle().lock().unwrap()[0].verified);
}
