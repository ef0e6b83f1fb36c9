//! Account repository integration tests
//!
//! Email uniqueness plus the secrets policy: ordinary reads never return
//! the password hash or the mail app password.

mod common;

use common::TestEnv;
use souk_server::db::models::AccountUpdate;
use souk_server::db::repository::RepoError;

#[tokio::test]
async fn duplicate_email_is_rejected_case_insensitively() {
    let env = TestEnv::new().await;
    env.seed_buyer("same@test.com", "Cairo").await;

    let dup = env
        .accounts
        .create(souk_server::db::models::AccountCreate {
            name: "Someone Else".to_string(),
            email: "SAME@test.com".to_string(),
            password: "Secret123".to_string(),
            role: souk_server::db::models::Role::Seller,
            address: "1 Somewhere Long Enough".to_string(),
            phone: "01001234567".to_string(),
            governate: None,
            store_name: None,
            service_area: None,
        })
        .await;
    assert!(matches!(dup, Err(RepoError::Duplicate(_))));
}

#[tokio::test]
async fn ordinary_reads_omit_secrets() {
    let env = TestEnv::new().await;
    let seller = env.seed_seller("seller@test.com", Some("Cairo")).await;

    env.accounts
        .set_mail_credentials(&seller, Some("app-password".to_string()))
        .await
        .expect("store credentials");

    let account = env
        .accounts
        .find_by_id(&seller)
        .await
        .expect("lookup")
        .expect("exists");
    assert!(account.password.is_none());
    assert!(account.smtp_app_password.is_none());

    let sellers = env.accounts.find_sellers().await.expect("directory");
    assert_eq!(sellers.len(), 1);
    assert!(sellers[0].password.is_none());
    assert!(sellers[0].smtp_app_password.is_none());
}

#[tokio::test]
async fn mail_credentials_path_returns_the_secret() {
    let env = TestEnv::new().await;
    let seller = env.seed_seller("seller@test.com", None).await;

    env.accounts
        .set_mail_credentials(&seller, Some("app-password".to_string()))
        .await
        .expect("store credentials");

    let creds = env
        .accounts
        .find_mail_credentials(&seller)
        .await
        .expect("lookup")
        .expect("exists");
    assert_eq!(creds.email, "seller@test.com");
    assert_eq!(creds.smtp_app_password.as_deref(), Some("app-password"));

    // Clearing works too
    env.accounts
        .set_mail_credentials(&seller, None)
        .await
        .expect("clear credentials");
    let creds = env
        .accounts
        .find_mail_credentials(&seller)
        .await
        .expect("lookup")
        .expect("exists");
    assert!(creds.smtp_app_password.is_none());
}

#[tokio::test]
async fn login_lookup_verifies_the_stored_hash() {
    let env = TestEnv::new().await;
    env.seed_buyer("buyer@test.com", "Cairo").await;

    let account = env
        .accounts
        .find_auth_by_email("Buyer@Test.Com")
        .await
        .expect("lookup")
        .expect("exists");
    assert!(account.verify_password("Secret123").expect("verify"));
    assert!(!account.verify_password("Wrong456").expect("verify"));
}

#[tokio::test]
async fn profile_update_changes_only_what_was_sent() {
    let env = TestEnv::new().await;
    let buyer = env.seed_buyer("buyer@test.com", "Cairo").await;

    let updated = env
        .accounts
        .update(
            &buyer,
            AccountUpdate {
                governate: Some("Giza".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("update");

    assert_eq!(updated.governate.as_deref(), Some("Giza"));
    assert_eq!(updated.name, "Test Buyer");
    assert_eq!(updated.email, "buyer@test.com");
}

#[tokio::test]
async fn notifications_are_scoped_to_their_account() {
    let env = TestEnv::new().await;
    let buyer = env.seed_buyer("buyer@test.com", "Cairo").await;
    let other = env.seed_buyer("other@test.com", "Giza").await;
    let seller = env.seed_seller("seller@test.com", None).await;
    let product = env.seed_product(&seller, 10.0, 5).await;

    let order = env
        .orders
        .create_pending(
            buyer.clone(),
            seller,
            vec![souk_server::db::models::OrderLine {
                product,
                quantity: 1,
                unit_price: 10.0,
            }],
            String::new(),
        )
        .await
        .expect("order creation");
    let order_id = order.id.expect("order id");

    let notification = env
        .notifications
        .create(buyer.clone(), order_id, "Your order is now shipping".to_string())
        .await
        .expect("notification");
    let notification_id = notification.id.expect("notification id");

    assert_eq!(
        env.notifications
            .find_for_account(&buyer)
            .await
            .expect("list")
            .len(),
        1
    );
    assert!(
        env.notifications
            .find_for_account(&other)
            .await
            .expect("list")
            .is_empty()
    );

    // Another account cannot mark it read
    let denied = env
        .notifications
        .mark_read(&notification_id.to_string(), &other)
        .await;
    assert!(denied.is_err());

    let marked = env
        .notifications
        .mark_read(&notification_id.to_string(), &buyer)
        .await
        .expect("mark read");
    assert!(marked.is_read);
}
