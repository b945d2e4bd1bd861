
use coinvest_api::types::*;
use coinvest_client::client::CoinvestClient;
use reqwest::StatusCode;
use runner::*;

#[tokio::test]
async fn test_simple() {
    run_test(|env| async move {
        env.client.ping().await.expect("Ping finished");
    })
    .await;
}

#[tokio::test]
async fn test_auth_email() {
    run_test(|env| async move {
        let res = env
            .client
            .signin_email(SigninEmail {
                user: TEST_USER.to_owned(),
                password: TEST_PASSWORD.to_owned(),
            })
            .await;
        assert!(!res.is_ok());

        env.client
            .signup_email(SignupEmail {
                user: TEST_USER.to_owned(),
                password: TEST_PASSWORD.to_owned(),
            })
            .await
            .expect("Signup");

        let res = env.client.logout().await;
        assert!(!res.is_ok(), "Logout before signing");

        let res = env
            .client
            .signin_email(SigninEmail {
                user: TEST_USER.to_owned(),
                password: "wrong".to_owned(),
            })
            .await;
        assert!(!res.is_ok(), "Wrong password passes");

        env.client
            .signin_email(SigninEmail {
                user: TEST_USER.to_owned(),
                password: TEST_PASSWORD.to_owned(),
            })
            .await
            .expect("Signin");

        env.client.logout().await.expect("Logout");

        let res = env.client.logout().await;
        assert!(!res.is_ok(), "Double logout");
    })
    .await;
}

#[tokio::test]
async fn test_withdrawal_flow() {
    run_with_user(|env| async move {
        let resp = env
            .client
            .request_withdrawal_otp()
            .await
            .expect("OTP issued");
        assert!(resp.success);
        assert_eq!(resp.message, "OTP sent to your email");

        let resp = env
            .client
            .submit_withdrawal(WithdrawalSubmission {
                amount: Some(100.0),
                wallet_address: Some("0xabc".to_owned()),
            })
            .await
            .expect("Withdrawal accepted");
        assert!(resp.success);
        let id = resp.id.expect("Request id");

        let history = env.client.withdrawal_history().await.expect("History");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, id);
        assert_eq!(history[0].wallet_address, "0xabc");
    })
    .await;
}

#[tokio::test]
async fn test_withdrawal_missing_address() {
    run_with_user(|env| async move {
        let err = env
            .client
            .submit_withdrawal(WithdrawalSubmission {
                amount: Some(100.0),
                wallet_address: None,
            })
            .await
            .expect_err("Accepted without address");
        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));

        let history = env.client.withdrawal_history().await.expect("History");
        assert!(history.is_empty());
    })
    .await;
}

#[tokio::test]
async fn test_otp_unreachable_mailer() {
    run_with_user_and(
        |args| args.mailer_url = Some("http://127.0.0.1:1".to_owned()),
        |env| async move {
            let err = env
                .client
                .request_withdrawal_otp()
                .await
                .expect_err("Mail delivered to nowhere");
            assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
            assert!(err.to_string().contains("Failed to send OTP"));
        },
    )
    .await;
}

#[tokio::test]
async fn test_session_not_shared() {
    run_with_user(|env| async move {
        let stranger =
            CoinvestClient::new(&format!("http://127.0.0.1:{}", env.port)).expect("client");
        let err = stranger
            .request_withdrawal_otp()
            .await
            .expect_err("OTP without session");
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    })
    .await;
}
