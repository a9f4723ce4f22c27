use alloy::network::TransactionBuilder;
use alloy::primitives::{TxKind, U256};
use alloy::sol_types::SolCall;
use common::GenericERC20::transferCall;
use namesend_models::{FailureKind, TransferFailure, TransferForm, TransferState};
use std::time::Duration;

use crate::utils::{
    request, states, Event, HarnessBuilder, Lookup, Receipt, Signer, OWNER, SENDER, TX_HASH, USDC,
};

#[tokio::test]
async fn test_native_transfer_skips_simulation() {
    let harness = HarnessBuilder::default().build();
    let mut updates = harness.orchestrator.subscribe();

    let result = harness
        .orchestrator
        .orchestrate(request("alice.eth", "ETH", "1.5", "2"))
        .await
        .unwrap();

    assert!(result.is_success(), "{}", result.message);
    assert_eq!(result.tx_hash, Some(TX_HASH));
    assert_eq!(result.recipient, Some(OWNER));
    assert!(result.message.contains("https://etherscan.io/tx/"));
    assert_eq!(
        states(&mut updates),
        vec![
            TransferState::Validating,
            TransferState::Resolving,
            TransferState::Submitting,
            TransferState::Confirming,
            TransferState::Succeeded,
        ]
    );

    let events = harness.events();
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::Simulate(_) | Event::Decimals(_))));

    let submitted = harness.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].to, Some(TxKind::Call(OWNER)));
    assert_eq!(submitted[0].from, Some(SENDER));
    assert_eq!(
        submitted[0].value,
        Some(U256::from(1_500_000_000_000_000_000u128))
    );
}

#[tokio::test]
async fn test_token_transfer_simulates_scaled_amount_before_submit() {
    let harness = HarnessBuilder {
        decimals: 6,
        ..Default::default()
    }
    .build();
    let mut updates = harness.orchestrator.subscribe();

    let result = harness
        .orchestrator
        .orchestrate(request("alice.eth", "USDC", "1.5", "10"))
        .await
        .unwrap();
    assert!(result.is_success(), "{}", result.message);
    assert!(states(&mut updates).contains(&TransferState::Simulating));

    let events = harness.events();
    let simulate_at = events
        .iter()
        .position(|event| matches!(event, Event::Simulate(_)))
        .unwrap();
    let submit_at = events
        .iter()
        .position(|event| matches!(event, Event::Submit(_)))
        .unwrap();
    assert!(simulate_at < submit_at);
    assert_eq!(events[0], Event::Decimals(USDC));

    for event in &events {
        if let Event::Simulate(tx) | Event::Submit(tx) = event {
            assert_eq!(tx.to, Some(TxKind::Call(USDC)));
            assert_eq!(tx.from, Some(SENDER));
            let call = transferCall::abi_decode(tx.input().unwrap()).unwrap();
            assert_eq!(call.to, OWNER);
            assert_eq!(call.amount, U256::from(1_500_000u64));
        }
    }
}

#[tokio::test]
async fn test_zero_amount_never_leaves_validation() {
    let harness = HarnessBuilder::default().build();
    let mut updates = harness.orchestrator.subscribe();

    let result = harness
        .orchestrator
        .orchestrate(request("alice.eth", "ETH", "0", "5"))
        .await
        .unwrap();

    assert_eq!(result.failure().unwrap().kind(), FailureKind::Validation);
    assert_eq!(
        states(&mut updates),
        vec![TransferState::Validating, TransferState::Failed]
    );
    assert_eq!(harness.name_service.calls(), 0);
    assert!(harness.events().is_empty());
}

#[tokio::test]
async fn test_amount_above_balance_is_rejected() {
    let harness = HarnessBuilder::default().build();

    let result = harness
        .orchestrator
        .orchestrate(request("alice.eth", "ETH", "10", "5"))
        .await
        .unwrap();

    assert_eq!(result.failure().unwrap().kind(), FailureKind::Validation);
    assert!(result.message.contains("exceeds available balance"));
    assert_eq!(harness.name_service.calls(), 0);
}

#[tokio::test]
async fn test_malformed_receiver_and_unknown_token_are_validation_failures() {
    let harness = HarnessBuilder::default().build();

    for (receiver, ticker) in [("alice", "ETH"), ("al ice.eth", "ETH"), ("alice.eth", "DAI")] {
        let result = harness
            .orchestrator
            .orchestrate(request(receiver, ticker, "1", "5"))
            .await
            .unwrap();
        assert_eq!(
            result.failure().unwrap().kind(),
            FailureKind::Validation,
            "{receiver} {ticker}"
        );
    }
    assert_eq!(harness.name_service.calls(), 0);
}

#[tokio::test]
async fn test_token_amount_below_precision_stops_before_simulation() {
    let harness = HarnessBuilder {
        decimals: 2,
        ..Default::default()
    }
    .build();

    let result = harness
        .orchestrator
        .orchestrate(request("alice.eth", "USDC", "0.001", "5"))
        .await
        .unwrap();

    assert!(matches!(
        result.failure(),
        Some(TransferFailure::BelowTokenPrecision { decimals: 2, .. })
    ));
    assert_eq!(result.failure().unwrap().kind(), FailureKind::Contract);
    assert_eq!(harness.events(), vec![Event::Decimals(USDC)]);
}

#[tokio::test]
async fn test_missing_owner_aborts() {
    for lookup in [Lookup::Empty, Lookup::Fail, Lookup::Owner(alloy::primitives::Address::ZERO)] {
        let harness = HarnessBuilder {
            lookup,
            ..Default::default()
        }
        .build();

        let result = harness
            .orchestrator
            .orchestrate(request("ghost.eth", "ETH", "1", "5"))
            .await
            .unwrap();

        assert!(matches!(
            result.failure(),
            Some(TransferFailure::NoOwner { .. })
        ));
        assert_eq!(result.message, "This name has no owner. Sending aborted.");
        assert!(harness.events().is_empty());
    }
}

#[tokio::test]
async fn test_self_send_never_reaches_the_wallet() {
    for ticker in ["ETH", "USDC"] {
        let harness = HarnessBuilder {
            lookup: Lookup::Owner(SENDER),
            ..Default::default()
        }
        .build();

        let result = harness
            .orchestrator
            .orchestrate(request("me.eth", ticker, "1", "5"))
            .await
            .unwrap();

        let failure = result.failure().unwrap();
        assert!(matches!(failure, TransferFailure::SelfSend { .. }));
        assert_eq!(failure.kind(), FailureKind::Resolution);
        assert!(result.message.contains("cannot send to self"));
        assert!(harness.events().is_empty(), "{ticker}");
    }
}

#[tokio::test]
async fn test_simulation_revert_aborts_before_submit() {
    let harness = HarnessBuilder {
        revert: Some("ERC20: transfer amount exceeds balance"),
        ..Default::default()
    }
    .build();

    let result = harness
        .orchestrator
        .orchestrate(request("alice.eth", "USDC", "1", "5"))
        .await
        .unwrap();

    let failure = result.failure().unwrap();
    assert_eq!(failure.kind(), FailureKind::Contract);
    assert!(result.message.contains("transfer amount exceeds balance"));
    assert!(harness.submitted().is_empty());
    assert_eq!(result.tx_hash, None);
}

#[tokio::test]
async fn test_wallet_rejection_is_reworded_and_frees_session() {
    let harness = HarnessBuilder {
        signer: Signer::Reject,
        ..Default::default()
    }
    .build();

    let result = harness
        .orchestrator
        .orchestrate(request("alice.eth", "ETH", "1", "5"))
        .await
        .unwrap();

    assert_eq!(result.failure().unwrap().kind(), FailureKind::UserRejection);
    assert_eq!(result.message, "The request was rejected, try again.");
    assert_eq!(result.tx_hash, None);
    assert!(!harness.orchestrator.is_busy());
    assert_eq!(harness.orchestrator.state(), TransferState::Failed);
}

#[tokio::test]
async fn test_reverted_receipt_differs_from_broadcast_failure() {
    let reverted = HarnessBuilder {
        receipt: Receipt::Reverted,
        ..Default::default()
    }
    .build();
    let result = reverted
        .orchestrator
        .orchestrate(request("alice.eth", "ETH", "1", "5"))
        .await
        .unwrap();
    assert!(matches!(
        result.failure(),
        Some(TransferFailure::ConfirmationFailed { tx_hash }) if *tx_hash == TX_HASH
    ));
    assert_eq!(result.message, "Transaction failed.");
    assert_eq!(result.tx_hash, Some(TX_HASH));

    let unsent = HarnessBuilder {
        signer: Signer::BroadcastFails,
        ..Default::default()
    }
    .build();
    let broadcast = unsent
        .orchestrator
        .orchestrate(request("alice.eth", "ETH", "1", "5"))
        .await
        .unwrap();
    assert_eq!(broadcast.failure().unwrap().kind(), FailureKind::Network);
    assert_ne!(broadcast.message, result.message);
    assert!(!unsent
        .events()
        .iter()
        .any(|event| matches!(event, Event::WaitForReceipt(..))));
}

#[tokio::test]
async fn test_receipt_timeout_is_passed_through() {
    let timeout = Some(Duration::from_secs(30));
    let harness = HarnessBuilder {
        receipt: Receipt::Timeout,
        receipt_timeout: timeout,
        ..Default::default()
    }
    .build();

    let result = harness
        .orchestrator
        .orchestrate(request("alice.eth", "ETH", "1", "5"))
        .await
        .unwrap();

    assert!(matches!(
        result.failure(),
        Some(TransferFailure::ConfirmationTimeout { .. })
    ));
    assert!(harness
        .events()
        .contains(&Event::WaitForReceipt(TX_HASH, timeout)));
}

#[tokio::test]
async fn test_form_keeps_input_until_success() {
    let harness = HarnessBuilder {
        signer: Signer::Reject,
        ..Default::default()
    }
    .build();
    let mut form = TransferForm {
        receiver: "alice.eth".to_string(),
        token_ticker: "ETH".to_string(),
        amount: "1".to_string(),
    };

    let result = harness
        .orchestrator
        .orchestrate(form.to_request(1, SENDER, "5"))
        .await
        .unwrap();
    form.apply(&result);
    assert_eq!(form.amount, "1");

    let harness = HarnessBuilder::default().build();
    let result = harness
        .orchestrator
        .orchestrate(form.to_request(1, SENDER, "5"))
        .await
        .unwrap();
    form.apply(&result);
    assert!(form.amount.is_empty());
    assert_eq!(form.receiver, "alice.eth");
}
