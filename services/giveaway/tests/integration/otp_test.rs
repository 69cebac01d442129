use chrono::{Duration, Utc};
use uuid::Uuid;

use giveaway_api::domain::types::{OTP_MAX_ATTEMPTS, OtpRequest};
use giveaway_api::error::ApiError;
use giveaway_api::usecase::otp::{
    RequestOtpInput, RequestOtpUseCase, VerifyOtpInput, VerifyOtpUseCase,
};
use giveaway_auth_types::role::AdminRole;
use giveaway_domain::hash::hash;

use crate::helpers::{
    MockAdminRepo, MockMailer, MockOtpRepo, MockSessionRepo, test_admin, token_after,
};

fn otp_for(email: &str, code: &str) -> OtpRequest {
    let now = Utc::now();
    OtpRequest {
        id: Uuid::new_v4(),
        email: email.to_owned(),
        otp_hash: hash(code),
        ip_hash: None,
        attempts: 0,
        max_attempts: OTP_MAX_ATTEMPTS,
        expires_at: now + Duration::minutes(10),
        used_at: None,
        created_at: now,
    }
}

fn verify_input(email: &str, otp: &str) -> VerifyOtpInput {
    VerifyOtpInput {
        email: email.to_owned(),
        otp: otp.to_owned(),
        ip_hash: Some(hash("203.0.113.9")),
        user_agent: Some("test-agent".to_owned()),
    }
}

// ── Request ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_store_hashed_code_and_mail_it() {
    let admin = test_admin(AdminRole::Admin);
    let otps = MockOtpRepo::default();
    let mailer = MockMailer::default();

    let uc = RequestOtpUseCase {
        admins: MockAdminRepo::new(vec![admin.clone()]),
        otps: otps.clone(),
        mailer: mailer.clone(),
    };
    uc.execute(RequestOtpInput {
        email: format!("  {}  ", admin.email.to_uppercase()),
        ip_hash: Some(hash("198.51.100.1")),
    })
    .await
    .unwrap();

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, admin.email);
    assert_eq!(sent[0].subject, "Your sign-in code");
    let code = token_after(&sent[0].text, "code is ");
    assert_eq!(code.len(), 6);

    let stored = otps.otps.lock().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].email, admin.email);
    assert_eq!(stored[0].otp_hash, hash(&code), "only the hash is persisted");
    assert!(stored[0].expires_at > Utc::now());
}

#[tokio::test]
async fn should_succeed_silently_for_unknown_email() {
    let otps = MockOtpRepo::default();
    let mailer = MockMailer::default();
    let uc = RequestOtpUseCase {
        admins: MockAdminRepo::default(),
        otps: otps.clone(),
        mailer: mailer.clone(),
    };

    uc.execute(RequestOtpInput {
        email: "nobody@example.com".to_owned(),
        ip_hash: None,
    })
    .await
    .unwrap();

    assert!(otps.otps.lock().unwrap().is_empty());
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn should_succeed_silently_for_inactive_admin() {
    let mut admin = test_admin(AdminRole::Viewer);
    admin.is_active = false;
    let mailer = MockMailer::default();
    let uc = RequestOtpUseCase {
        admins: MockAdminRepo::new(vec![admin.clone()]),
        otps: MockOtpRepo::default(),
        mailer: mailer.clone(),
    };

    uc.execute(RequestOtpInput {
        email: admin.email,
        ip_hash: None,
    })
    .await
    .unwrap();
    assert!(mailer.sent().is_empty());
}

#[tokio::test]
async fn should_reject_malformed_email() {
    let uc = RequestOtpUseCase {
        admins: MockAdminRepo::default(),
        otps: MockOtpRepo::default(),
        mailer: MockMailer::default(),
    };
    let result = uc
        .execute(RequestOtpInput {
            email: "not-an-email".to_owned(),
            ip_hash: None,
        })
        .await;
    assert!(
        matches!(result, Err(ApiError::InvalidEmail)),
        "expected InvalidEmail, got {result:?}"
    );
}

#[tokio::test]
async fn should_rate_limit_fourth_request_within_window() {
    let admin = test_admin(AdminRole::Admin);
    let existing = (0..3).map(|_| otp_for(&admin.email, "111111")).collect();
    let uc = RequestOtpUseCase {
        admins: MockAdminRepo::new(vec![admin.clone()]),
        otps: MockOtpRepo::new(existing),
        mailer: MockMailer::default(),
    };

    let result = uc
        .execute(RequestOtpInput {
            email: admin.email,
            ip_hash: None,
        })
        .await;
    assert!(
        matches!(result, Err(ApiError::RateLimited)),
        "expected RateLimited, got {result:?}"
    );
}

#[tokio::test]
async fn should_rate_limit_by_ip_across_emails() {
    let admin = test_admin(AdminRole::Admin);
    let ip = hash("192.0.2.44");
    let existing = (0..10)
        .map(|i| {
            let mut otp = otp_for(&format!("other{i}@example.com"), "222222");
            otp.ip_hash = Some(ip.clone());
            otp
        })
        .collect();
    let uc = RequestOtpUseCase {
        admins: MockAdminRepo::new(vec![admin.clone()]),
        otps: MockOtpRepo::new(existing),
        mailer: MockMailer::default(),
    };

    let result = uc
        .execute(RequestOtpInput {
            email: admin.email,
            ip_hash: Some(ip),
        })
        .await;
    assert!(matches!(result, Err(ApiError::RateLimited)));
}

#[tokio::test]
async fn should_surface_mail_failure_on_request() {
    let admin = test_admin(AdminRole::Admin);
    let uc = RequestOtpUseCase {
        admins: MockAdminRepo::new(vec![admin.clone()]),
        otps: MockOtpRepo::default(),
        mailer: MockMailer::failing(),
    };
    let result = uc
        .execute(RequestOtpInput {
            email: admin.email,
            ip_hash: None,
        })
        .await;
    assert!(matches!(result, Err(ApiError::Internal(_))));
}

// ── Verify ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_open_session_for_correct_code() {
    let admin = test_admin(AdminRole::Admin);
    let otps = MockOtpRepo::new(vec![otp_for(&admin.email, "123456")]);
    let sessions = MockSessionRepo::default();

    let uc = VerifyOtpUseCase {
        admins: MockAdminRepo::new(vec![admin.clone()]),
        otps: otps.clone(),
        sessions: sessions.manager(),
    };
    let output = uc.execute(verify_input(&admin.email, "123456")).await.unwrap();

    assert_eq!(output.admin.id, admin.id);
    assert!(!output.token.is_empty());
    assert!(!format!("{output:?}").contains(&output.token));
    assert!(otps.otps.lock().unwrap()[0].used_at.is_some());

    let stored = sessions.sessions.lock().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].admin_id, admin.id);
    assert_eq!(stored[0].token_hash, hash(&output.token));
    assert_eq!(stored[0].user_agent_hash, Some(hash("test-agent")));
}

#[tokio::test]
async fn should_burn_attempt_on_wrong_code() {
    let admin = test_admin(AdminRole::Admin);
    let otps = MockOtpRepo::new(vec![otp_for(&admin.email, "123456")]);
    let uc = VerifyOtpUseCase {
        admins: MockAdminRepo::new(vec![admin.clone()]),
        otps: otps.clone(),
        sessions: MockSessionRepo::default().manager(),
    };

    let result = uc.execute(verify_input(&admin.email, "654321")).await;
    assert!(
        matches!(result, Err(ApiError::Unauthorized)),
        "expected Unauthorized, got {result:?}"
    );
    assert_eq!(otps.otps.lock().unwrap()[0].attempts, 1);
}

#[tokio::test]
async fn should_cap_attempts_under_concurrent_guesses() {
    let admin = test_admin(AdminRole::Admin);
    let otps = MockOtpRepo::new(vec![otp_for(&admin.email, "123456")]);
    let sessions = MockSessionRepo::default();
    let uc = VerifyOtpUseCase {
        admins: MockAdminRepo::new(vec![admin.clone()]),
        otps: otps.clone(),
        sessions: sessions.manager(),
    };

    // Nineteen wrong guesses race ahead of the right one.
    let guesses: Vec<String> = (0..19)
        .map(|n| format!("{:06}", 900_000 + n))
        .chain(std::iter::once("123456".to_owned()))
        .collect();
    let results = futures::future::join_all(
        guesses
            .iter()
            .map(|code| uc.execute(verify_input(&admin.email, code))),
    )
    .await;

    assert!(
        results.iter().all(|r| matches!(r, Err(ApiError::Unauthorized))),
        "no guess past the budget may be scored"
    );
    assert_eq!(otps.otps.lock().unwrap()[0].attempts, OTP_MAX_ATTEMPTS);
    assert!(sessions.sessions.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_correct_code_after_attempts_exhausted() {
    let admin = test_admin(AdminRole::Admin);
    let mut otp = otp_for(&admin.email, "123456");
    otp.attempts = OTP_MAX_ATTEMPTS;
    let uc = VerifyOtpUseCase {
        admins: MockAdminRepo::new(vec![admin.clone()]),
        otps: MockOtpRepo::new(vec![otp]),
        sessions: MockSessionRepo::default().manager(),
    };

    let result = uc.execute(verify_input(&admin.email, "123456")).await;
    assert!(matches!(result, Err(ApiError::Unauthorized)));
}

#[tokio::test]
async fn should_reject_expired_code() {
    let admin = test_admin(AdminRole::Admin);
    let mut otp = otp_for(&admin.email, "123456");
    otp.expires_at = Utc::now() - Duration::seconds(1);
    let uc = VerifyOtpUseCase {
        admins: MockAdminRepo::new(vec![admin.clone()]),
        otps: MockOtpRepo::new(vec![otp]),
        sessions: MockSessionRepo::default().manager(),
    };

    let result = uc.execute(verify_input(&admin.email, "123456")).await;
    assert!(matches!(result, Err(ApiError::Unauthorized)));
}

#[tokio::test]
async fn should_reject_code_reuse() {
    let admin = test_admin(AdminRole::Admin);
    let uc = VerifyOtpUseCase {
        admins: MockAdminRepo::new(vec![admin.clone()]),
        otps: MockOtpRepo::new(vec![otp_for(&admin.email, "123456")]),
        sessions: MockSessionRepo::default().manager(),
    };

    uc.execute(verify_input(&admin.email, "123456")).await.unwrap();
    let second = uc.execute(verify_input(&admin.email, "123456")).await;
    assert!(matches!(second, Err(ApiError::Unauthorized)));
}

#[tokio::test]
async fn should_refuse_session_for_deactivated_admin() {
    let mut admin = test_admin(AdminRole::Admin);
    admin.is_active = false;
    let sessions = MockSessionRepo::default();
    let uc = VerifyOtpUseCase {
        admins: MockAdminRepo::new(vec![admin.clone()]),
        otps: MockOtpRepo::new(vec![otp_for(&admin.email, "123456")]),
        sessions: sessions.manager(),
    };

    let result = uc.execute(verify_input(&admin.email, "123456")).await;
    assert!(matches!(result, Err(ApiError::Unauthorized)));
    assert!(sessions.sessions.lock().unwrap().is_empty());
}
