//! Unit tests for the payment lifecycle, delivery engine, sweeper, and
//! ingestion services.

use std::time::Duration;

use chrono::Utc;

use crate::domain::payments::PaymentStatus;
use crate::domain::webhooks::{DeliveryOutcome, WebhookPayload};
use crate::shared::crypto;
use crate::shared::error::AppError;
use crate::tests::common::fixtures;
use crate::tests::common::{MockOutcome, MockSender};
use crate::tests::utils::wait_for;

const HOOK_URL: &str = "https://merchant.example/hooks/payment";

/// Payment lifecycle tests
pub mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn test_create_payment_invariants() {
        let sender = MockSender::respond_with(200);
        let context = fixtures::test_context(sender.clone());
        let (merchant_id, _) = fixtures::seed_merchant(&context, Some(HOOK_URL)).await;

        let payment = context
            .payments_service
            .create_payment(&merchant_id, fixtures::create_payment_request())
            .await
            .unwrap();

        assert_eq!(payment.status, PaymentStatus::Pending);
        assert_eq!(payment.merchant_id, merchant_id);
        assert_eq!(
            payment.expires_at,
            payment.created_at + chrono::Duration::minutes(30)
        );
        assert!(payment.payment_address.starts_with('T'));
        assert!(payment.payment_link.ends_with(&payment.id));
        assert!(payment.tx_hash.is_none());
        assert!(payment.confirmed_at.is_none());

        // Creation never notifies
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(sender.call_count(), 0);
        assert!(context
            .payments_store
            .list_webhook_logs_by_payment(&payment.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_create_payment_rejects_invalid_input() {
        let context = fixtures::test_context(MockSender::respond_with(200));
        let (merchant_id, _) = fixtures::seed_merchant(&context, None).await;

        let mut bad_amount = fixtures::create_payment_request();
        bad_amount.amount = 0.0;
        assert!(matches!(
            context
                .payments_service
                .create_payment(&merchant_id, bad_amount)
                .await,
            Err(AppError::Validation(_))
        ));

        let mut bad_currency = fixtures::create_payment_request();
        bad_currency.currency = "DOGE".to_string();
        assert!(matches!(
            context
                .payments_service
                .create_payment(&merchant_id, bad_currency)
                .await,
            Err(AppError::Validation(_))
        ));

        let mut bad_network = fixtures::create_payment_request();
        bad_network.network = "LIGHTNING".to_string();
        assert!(context
            .payments_service
            .create_payment(&merchant_id, bad_network)
            .await
            .is_err());

        let mut bad_method = fixtures::create_payment_request();
        bad_method.payment_method = "paypal".to_string();
        assert!(context
            .payments_service
            .create_payment(&merchant_id, bad_method)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_confirm_payment_sets_terminal_fields() {
        let sender = MockSender::respond_with(200);
        let context = fixtures::test_context(sender.clone());
        let (merchant_id, _) = fixtures::seed_merchant(&context, Some(HOOK_URL)).await;

        let payment = context
            .payments_service
            .create_payment(&merchant_id, fixtures::create_payment_request())
            .await
            .unwrap();

        let confirmed = context
            .payments_service
            .confirm_payment(&payment.id, "0xabc123", None)
            .await
            .unwrap();

        assert_eq!(confirmed.status, PaymentStatus::Confirmed);
        assert_eq!(confirmed.tx_hash.as_deref(), Some("0xabc123"));
        // Defaults to the requested amount when the processor reports none
        assert_eq!(confirmed.amount_received, Some(100.0));
        assert!(confirmed.confirmed_at.is_some());
        assert!(confirmed.updated_at >= payment.updated_at);
    }

    #[tokio::test]
    async fn test_confirm_fires_signed_webhook() {
        let sender = MockSender::respond_with(200);
        let context = fixtures::test_context(sender.clone());
        let (merchant_id, _) = fixtures::seed_merchant(&context, Some(HOOK_URL)).await;

        let payment = context
            .payments_service
            .create_payment(&merchant_id, fixtures::create_payment_request())
            .await
            .unwrap();
        context
            .payments_service
            .confirm_payment(&payment.id, "0xabc123", Some(100.0))
            .await
            .unwrap();

        let sender_for_wait = sender.clone();
        assert!(
            wait_for(
                move || {
                    let s = sender_for_wait.clone();
                    async move { s.call_count() == 1 }
                },
                Duration::from_secs(2)
            )
            .await
        );

        let call = &sender.calls()[0];
        assert_eq!(call.url, HOOK_URL);

        // The transported body verifies against the process secret
        let mut delivered: WebhookPayload = serde_json::from_str(&call.body).unwrap();
        let signature = delivered.signature.take().expect("payload is signed");
        let unsigned = serde_json::to_string(&delivered).unwrap();
        assert!(crypto::verify_payload(
            &unsigned,
            &signature,
            &context.config.webhook.secret
        ));
        assert_eq!(delivered.payment_id, payment.id);
        assert_eq!(delivered.status, PaymentStatus::Confirmed);
        assert_eq!(delivered.customer_reference, "order_1");
    }

    #[tokio::test]
    async fn test_confirm_twice_conflicts_and_preserves_record() {
        let sender = MockSender::respond_with(200);
        let context = fixtures::test_context(sender.clone());
        let (merchant_id, _) = fixtures::seed_merchant(&context, Some(HOOK_URL)).await;

        let payment = context
            .payments_service
            .create_payment(&merchant_id, fixtures::create_payment_request())
            .await
            .unwrap();
        let first = context
            .payments_service
            .confirm_payment(&payment.id, "0xfirst", Some(90.0))
            .await
            .unwrap();

        let second = context
            .payments_service
            .confirm_payment(&payment.id, "0xsecond", Some(50.0))
            .await;
        assert!(matches!(second, Err(AppError::StateConflict(_))));

        // First confirmation's fields never change
        let stored = context
            .payments_service
            .get_payment(&payment.id)
            .await
            .unwrap();
        assert_eq!(stored.tx_hash.as_deref(), Some("0xfirst"));
        assert_eq!(stored.amount_received, Some(90.0));
        assert_eq!(stored.confirmed_at, first.confirmed_at);
        assert_eq!(stored.updated_at, first.updated_at);
    }

    #[tokio::test]
    async fn test_fail_after_confirm_conflicts() {
        let context = fixtures::test_context(MockSender::respond_with(200));
        let (merchant_id, _) = fixtures::seed_merchant(&context, None).await;

        let payment = context
            .payments_service
            .create_payment(&merchant_id, fixtures::create_payment_request())
            .await
            .unwrap();
        context
            .payments_service
            .confirm_payment(&payment.id, "0xabc", None)
            .await
            .unwrap();

        assert!(matches!(
            context
                .payments_service
                .fail_payment(&payment.id, Some("chain reorg"))
                .await,
            Err(AppError::StateConflict(_))
        ));
    }

    #[tokio::test]
    async fn test_confirm_unknown_payment() {
        let context = fixtures::test_context(MockSender::respond_with(200));
        assert!(matches!(
            context
                .payments_service
                .confirm_payment("pay_000000000000000000000000", "0xabc", None)
                .await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delivery_skipped_without_callback_url() {
        let sender = MockSender::respond_with(200);
        let context = fixtures::test_context(sender.clone());
        let (merchant_id, _) = fixtures::seed_merchant(&context, None).await;

        let payment = context
            .payments_service
            .create_payment(&merchant_id, fixtures::create_payment_request())
            .await
            .unwrap();
        context
            .payments_service
            .confirm_payment(&payment.id, "0xabc", None)
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(sender.call_count(), 0);
        assert!(context
            .payments_store
            .list_webhook_logs_by_payment(&payment.id)
            .await
            .unwrap()
            .is_empty());
    }
}

/// Webhook delivery engine tests
pub mod delivery {
    use super::*;

    async fn confirmed_payment(
        context: &crate::infrastructure::http::server::AppContext,
        merchant_id: &str,
    ) -> crate::domain::payments::Payment {
        let payment = context
            .payments_service
            .create_payment(merchant_id, fixtures::create_payment_request())
            .await
            .unwrap();
        // Transition without triggering the async notifier so the tests can
        // drive delivery deterministically.
        context
            .payments_service
            .transition_from_pending(
                &payment.id,
                crate::domain::payments::StatusPatch {
                    status: PaymentStatus::Confirmed,
                    tx_hash: Some("0xabc".to_string()),
                    amount_received: Some(100.0),
                    confirmed_at: Some(Utc::now()),
                },
                false,
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_transport_failure_exhausts_retries() {
        let sender = MockSender::always_failing();
        let context = fixtures::test_context(sender.clone());
        let (merchant_id, _) = fixtures::seed_merchant(&context, Some(HOOK_URL)).await;
        let payment = confirmed_payment(&context, &merchant_id).await;

        let outcome = context
            .webhook_service
            .deliver(&payment)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome, DeliveryOutcome::TransportFailure);

        // Original attempt plus three retries, spaced out in time
        assert_eq!(sender.call_count(), 4);
        let attempt_times: Vec<_> = sender.calls().iter().map(|c| c.at).collect();
        assert!(attempt_times.windows(2).all(|w| w[0] < w[1]));

        let logs = context
            .payments_store
            .list_webhook_logs_by_payment(&payment.id)
            .await
            .unwrap();
        assert_eq!(logs.len(), 5);

        let mut by_retries = logs.clone();
        by_retries.sort_by_key(|l| l.retries);
        let retries: Vec<u32> = by_retries.iter().map(|l| l.retries).collect();
        assert_eq!(retries, vec![0, 1, 2, 3, 4]);
        assert!(by_retries.iter().all(|l| l.status == 0));

        // Retried attempts carry strictly increasing schedules; the last
        // attempt and the exhausted marker carry none.
        let schedules: Vec<_> = by_retries[..3]
            .iter()
            .map(|l| l.next_retry_at.expect("retry scheduled"))
            .collect();
        assert!(schedules.windows(2).all(|w| w[0] < w[1]));
        assert!(by_retries[3].next_retry_at.is_none());
        assert!(by_retries[4].next_retry_at.is_none());

        assert_eq!(context.monitoring.snapshot().webhook_exhausted, 1);
    }

    #[tokio::test]
    async fn test_application_rejection_is_terminal() {
        let sender = MockSender::respond_with(500);
        let context = fixtures::test_context(sender.clone());
        let (merchant_id, _) = fixtures::seed_merchant(&context, Some(HOOK_URL)).await;
        let payment = confirmed_payment(&context, &merchant_id).await;

        let outcome = context
            .webhook_service
            .deliver(&payment)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome, DeliveryOutcome::ApplicationRejected(500));

        // No retry on an HTTP-level rejection
        assert_eq!(sender.call_count(), 1);

        let logs = context
            .payments_store
            .list_webhook_logs_by_payment(&payment.id)
            .await
            .unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, 500);
        assert!(logs[0].response.is_some());
        assert!(logs[0].next_retry_at.is_none());
        assert_eq!(context.monitoring.snapshot().webhook_rejected, 1);
    }

    #[tokio::test]
    async fn test_successful_delivery_records_response() {
        let sender = MockSender::respond_with(200);
        let context = fixtures::test_context(sender.clone());
        let (merchant_id, _) = fixtures::seed_merchant(&context, Some(HOOK_URL)).await;
        let payment = confirmed_payment(&context, &merchant_id).await;

        let outcome = context
            .webhook_service
            .deliver(&payment)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome, DeliveryOutcome::Delivered(200));

        let logs = context
            .payments_store
            .list_webhook_logs_by_payment(&payment.id)
            .await
            .unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].status, 200);
        assert_eq!(logs[0].retries, 0);
        assert_eq!(logs[0].url, HOOK_URL);
        assert_eq!(
            logs[0].response,
            Some(serde_json::json!({"received": true}))
        );
    }

    #[tokio::test]
    async fn test_recovery_after_transport_failure() {
        let sender = MockSender::scripted(
            vec![MockOutcome::Fail],
            MockOutcome::Respond(200, serde_json::json!({"received": true})),
        );
        let context = fixtures::test_context(sender.clone());
        let (merchant_id, _) = fixtures::seed_merchant(&context, Some(HOOK_URL)).await;
        let payment = confirmed_payment(&context, &merchant_id).await;

        let outcome = context
            .webhook_service
            .deliver(&payment)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome, DeliveryOutcome::Delivered(200));
        assert_eq!(sender.call_count(), 2);

        let logs = context
            .payments_store
            .list_webhook_logs_by_payment(&payment.id)
            .await
            .unwrap();
        assert_eq!(logs.len(), 2);
        let mut by_retries = logs;
        by_retries.sort_by_key(|l| l.retries);
        assert_eq!(by_retries[0].status, 0);
        assert!(by_retries[0].next_retry_at.is_some());
        assert_eq!(by_retries[1].status, 200);
    }

    #[tokio::test]
    async fn test_delivery_skipped_for_unknown_merchant() {
        let sender = MockSender::respond_with(200);
        let context = fixtures::test_context(sender.clone());
        let (merchant_id, _) = fixtures::seed_merchant(&context, Some(HOOK_URL)).await;
        let mut payment = confirmed_payment(&context, &merchant_id).await;
        payment.merchant_id = "mer_000000000000000000000000".to_string();

        let outcome = context.webhook_service.deliver(&payment).await.unwrap();
        assert!(outcome.is_none());
        assert_eq!(sender.call_count(), 0);
    }
}

/// Expiry sweeper tests
pub mod sweeper {
    use super::*;

    #[tokio::test]
    async fn test_sweep_expires_exactly_the_overdue_set() {
        let context = fixtures::test_context(MockSender::respond_with(200));
        let (merchant_id, _) = fixtures::seed_merchant(&context, None).await;
        let now = Utc::now();

        let mut overdue = context
            .payments_service
            .create_payment(&merchant_id, fixtures::create_payment_request())
            .await
            .unwrap();
        overdue.expires_at = now - chrono::Duration::minutes(1);
        context.payments_store.create_payment(&overdue).await.unwrap();

        let fresh = context
            .payments_service
            .create_payment(&merchant_id, fixtures::create_payment_request())
            .await
            .unwrap();

        let swept = context.sweeper_service.sweep(now).await.unwrap();
        assert_eq!(swept, 1);

        assert_eq!(
            context
                .payments_service
                .get_payment(&overdue.id)
                .await
                .unwrap()
                .status,
            PaymentStatus::Expired
        );
        assert_eq!(
            context
                .payments_service
                .get_payment(&fresh.id)
                .await
                .unwrap()
                .status,
            PaymentStatus::Pending
        );

        // Idempotent: nothing left to sweep
        assert_eq!(context.sweeper_service.sweep(now).await.unwrap(), 0);
        assert_eq!(context.monitoring.snapshot().payments_expired, 1);
    }

    #[tokio::test]
    async fn test_expiry_is_silent() {
        let sender = MockSender::respond_with(200);
        let context = fixtures::test_context(sender.clone());
        let (merchant_id, _) = fixtures::seed_merchant(&context, Some(HOOK_URL)).await;
        let now = Utc::now();

        let mut overdue = context
            .payments_service
            .create_payment(&merchant_id, fixtures::create_payment_request())
            .await
            .unwrap();
        overdue.expires_at = now - chrono::Duration::minutes(1);
        context.payments_store.create_payment(&overdue).await.unwrap();

        assert_eq!(context.sweeper_service.sweep(now).await.unwrap(), 1);

        // No webhook fires on expiry, by design
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(sender.call_count(), 0);
        assert!(context
            .payments_store
            .list_webhook_logs_by_payment(&overdue.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_sweep_skips_concurrently_confirmed_payment() {
        let context = fixtures::test_context(MockSender::respond_with(200));
        let (merchant_id, _) = fixtures::seed_merchant(&context, None).await;
        let now = Utc::now();

        let mut overdue = context
            .payments_service
            .create_payment(&merchant_id, fixtures::create_payment_request())
            .await
            .unwrap();
        overdue.expires_at = now - chrono::Duration::minutes(1);
        context.payments_store.create_payment(&overdue).await.unwrap();

        // Confirmed after the deadline but before the sweep runs; the
        // conditional update makes the sweep a no-op for it.
        context
            .payments_service
            .confirm_payment(&overdue.id, "0xabc", None)
            .await
            .unwrap();

        assert_eq!(context.sweeper_service.sweep(now).await.unwrap(), 0);
        assert_eq!(
            context
                .payments_service
                .get_payment(&overdue.id)
                .await
                .unwrap()
                .status,
            PaymentStatus::Confirmed
        );
    }
}

/// Inbound ingestion tests
pub mod ingestion {
    use super::*;

    fn update_body(payment_id: &str, status: &str) -> serde_json::Value {
        serde_json::json!({
            "paymentId": payment_id,
            "status": status,
            "txHash": "0xfeed",
            "amountReceived": 99.5,
            "timestamp": Utc::now().to_rfc3339(),
        })
    }

    #[tokio::test]
    async fn test_ingest_confirms_pending_payment() {
        let sender = MockSender::respond_with(200);
        let context = fixtures::test_context(sender.clone());
        let (merchant_id, _) = fixtures::seed_merchant(&context, Some(HOOK_URL)).await;

        let payment = context
            .payments_service
            .create_payment(&merchant_id, fixtures::create_payment_request())
            .await
            .unwrap();

        let body = update_body(&payment.id, "confirmed");
        let updated = context.ingestion_service.ingest(&body).await.unwrap();

        assert_eq!(updated.status, PaymentStatus::Confirmed);
        assert_eq!(updated.tx_hash.as_deref(), Some("0xfeed"));
        assert_eq!(updated.amount_received, Some(99.5));
        assert!(updated.confirmed_at.is_some());

        // A terminal entry through ingestion notifies the merchant too
        let sender_for_wait = sender.clone();
        assert!(
            wait_for(
                move || {
                    let s = sender_for_wait.clone();
                    async move { s.call_count() == 1 }
                },
                Duration::from_secs(2)
            )
            .await
        );

        // The ingestion audit row is independent of the delivery trail
        let logs = context
            .payments_store
            .list_webhook_logs_by_payment(&payment.id)
            .await
            .unwrap();
        assert_eq!(logs.len(), 2);
        let audit = logs.iter().find(|l| l.url.is_empty()).unwrap();
        assert_eq!(audit.status, 200);
        assert_eq!(audit.payload, body);
        assert!(logs.iter().any(|l| l.url == HOOK_URL));
    }

    #[tokio::test]
    async fn test_ingest_rejects_terminal_record() {
        let context = fixtures::test_context(MockSender::respond_with(200));
        let (merchant_id, _) = fixtures::seed_merchant(&context, None).await;

        let payment = context
            .payments_service
            .create_payment(&merchant_id, fixtures::create_payment_request())
            .await
            .unwrap();
        context
            .ingestion_service
            .ingest(&update_body(&payment.id, "confirmed"))
            .await
            .unwrap();

        // A second update cannot rewrite the terminal record
        assert!(matches!(
            context
                .ingestion_service
                .ingest(&update_body(&payment.id, "failed"))
                .await,
            Err(AppError::StateConflict(_))
        ));
    }

    #[tokio::test]
    async fn test_ingest_unknown_payment_creates_nothing() {
        let context = fixtures::test_context(MockSender::respond_with(200));

        let result = context
            .ingestion_service
            .ingest(&update_body("pay_000000000000000000000000", "confirmed"))
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        assert!(context
            .payments_store
            .list_webhook_logs_by_payment("pay_000000000000000000000000")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_ingest_rejects_pending_target() {
        let context = fixtures::test_context(MockSender::respond_with(200));
        let (merchant_id, _) = fixtures::seed_merchant(&context, None).await;

        let payment = context
            .payments_service
            .create_payment(&merchant_id, fixtures::create_payment_request())
            .await
            .unwrap();

        assert!(matches!(
            context
                .ingestion_service
                .ingest(&update_body(&payment.id, "pending"))
                .await,
            Err(AppError::Validation(_))
        ));
    }
}

/// Concurrency tests
pub mod concurrency {
    use super::*;

    #[tokio::test]
    async fn test_racing_confirms_have_one_winner_and_one_delivery() {
        let sender = MockSender::respond_with(200);
        let context = fixtures::test_context(sender.clone());
        let (merchant_id, _) = fixtures::seed_merchant(&context, Some(HOOK_URL)).await;

        let payment = context
            .payments_service
            .create_payment(&merchant_id, fixtures::create_payment_request())
            .await
            .unwrap();

        let service_a = context.payments_service.clone();
        let service_b = context.payments_service.clone();
        let id_a = payment.id.clone();
        let id_b = payment.id.clone();

        let (first, second) = tokio::join!(
            tokio::spawn(async move { service_a.confirm_payment(&id_a, "0xaaa", None).await }),
            tokio::spawn(async move { service_b.confirm_payment(&id_b, "0xbbb", None).await }),
        );
        let results = [first.unwrap(), second.unwrap()];

        let winners = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(AppError::StateConflict(_))))
            .count();
        assert_eq!(winners, 1);
        assert_eq!(conflicts, 1);

        // Exactly one delivery sequence is initiated
        let sender_for_wait = sender.clone();
        assert!(
            wait_for(
                move || {
                    let s = sender_for_wait.clone();
                    async move { s.call_count() >= 1 }
                },
                Duration::from_secs(2)
            )
            .await
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(sender.call_count(), 1);

        let logs = context
            .payments_store
            .list_webhook_logs_by_payment(&payment.id)
            .await
            .unwrap();
        assert_eq!(logs.len(), 1);
    }
}
