//! Tests for outbound settlement events and the ack/reject callbacks.

#![cfg(test)]

use soroban_sdk::testutils::Address as _;
use soroban_sdk::{Address, BytesN, Env, String, Vec};

use rental_lib::{InterledgerStatus, MarketError};

use crate::test_common::*;

fn enc_key(env: &Env) -> BytesN<32> {
    BytesN::from_array(env, &[21u8; 32])
}

fn auth_key(env: &Env) -> BytesN<32> {
    BytesN::from_array(env, &[33u8; 32])
}

fn finalized_offer(
    env: &Env,
    client: &crate::MarketplaceClient,
    request_id: u64,
    bidder: &Address,
    auth: Option<BytesN<32>>,
) -> u64 {
    let offer_id = client.submit_offer(&request_id, bidder);
    client.submit_offer_extra(
        &offer_id,
        &REQ_START,
        &REQ_DURATION,
        &0,
        &200,
        &enc_key(env),
        &auth,
        bidder,
    );
    offer_id
}

/// Decide a fresh request with the given offers as winners, in order.
fn decide(
    env: &Env,
    client: &crate::MarketplaceClient,
    creator: &Address,
    request_id: u64,
    winners: &[u64],
) {
    let mut ids = Vec::new(env);
    for id in winners {
        ids.push_back(*id);
    }
    client.decide_request(&request_id, &ids, creator);
}

#[test]
fn test_one_event_per_winner_in_order() {
    let env = Env::default();
    let (client, _, signing_key) = setup(&env);
    let creator = Address::generate(&env);
    let bidder_a = Address::generate(&env);
    let bidder_b = Address::generate(&env);

    let request_id = open_request(&env, &client, &signing_key, &creator, 1);
    let offer_a = finalized_offer(&env, &client, request_id, &bidder_a, None);
    let offer_b = finalized_offer(&env, &client, request_id, &bidder_b, None);

    decide(&env, &client, &creator, request_id, &[offer_b, offer_a]);

    // Nonces are assigned in listing order, strictly increasing.
    let first = client.get_interledger_event(&1);
    let second = client.get_interledger_event(&2);
    assert_eq!(first.offer_id, offer_b);
    assert_eq!(second.offer_id, offer_a);
    assert_eq!(first.status, InterledgerStatus::Sending);
    assert_eq!(second.status, InterledgerStatus::Sending);

    assert_eq!(
        client.try_get_interledger_event(&3),
        Err(Ok(MarketError::UndefinedId))
    );
}

#[test]
fn test_nonces_continue_across_decisions() {
    let env = Env::default();
    let (client, _, signing_key) = setup(&env);
    let creator = Address::generate(&env);
    let bidder = Address::generate(&env);

    let first_request = open_request(&env, &client, &signing_key, &creator, 1);
    let first_offer = finalized_offer(&env, &client, first_request, &bidder, None);
    decide(&env, &client, &creator, first_request, &[first_offer]);

    let second_request = open_request(&env, &client, &signing_key, &creator, 2);
    let second_offer = finalized_offer(&env, &client, second_request, &bidder, None);
    decide(&env, &client, &creator, second_request, &[second_offer]);

    assert_eq!(client.get_interledger_event(&1).offer_id, first_offer);
    assert_eq!(client.get_interledger_event(&2).offer_id, second_offer);
}

#[test]
fn test_payload_layout_single_key() {
    let env = Env::default();
    let (client, _, signing_key) = setup(&env);
    let creator = Address::generate(&env);
    let bidder = Address::generate(&env);

    let request_id = open_request(&env, &client, &signing_key, &creator, 1);
    let offer_id = finalized_offer(&env, &client, request_id, &bidder, None);
    decide(&env, &client, &creator, request_id, &[offer_id]);

    let event = client.get_interledger_event(&1);
    assert_eq!(event.payload.len(), 64);

    let mut buf = [0u8; 64];
    event.payload.copy_into_slice(&mut buf);

    let mut id_field = [0u8; 32];
    id_field[24..].copy_from_slice(&offer_id.to_be_bytes());
    assert_eq!(buf[..32], id_field);
    assert_eq!(buf[32..], enc_key(&env).to_array());
}

#[test]
fn test_payload_layout_two_keys() {
    let env = Env::default();
    let (client, _, signing_key) = setup(&env);
    let creator = Address::generate(&env);
    let bidder = Address::generate(&env);

    let request_id = open_request(&env, &client, &signing_key, &creator, 1);
    let offer_id = finalized_offer(&env, &client, request_id, &bidder, Some(auth_key(&env)));
    decide(&env, &client, &creator, request_id, &[offer_id]);

    let event = client.get_interledger_event(&1);
    assert_eq!(event.payload.len(), 96);

    let mut buf = [0u8; 96];
    event.payload.copy_into_slice(&mut buf);
    assert_eq!(buf[32..64], enc_key(&env).to_array());
    assert_eq!(buf[64..], auth_key(&env).to_array());
}

#[test]
fn test_ack_records_settlement() {
    let env = Env::default();
    let (client, admin, signing_key) = setup(&env);
    let creator = Address::generate(&env);
    let bidder = Address::generate(&env);

    let request_id = open_request(&env, &client, &signing_key, &creator, 1);
    let offer_id = finalized_offer(&env, &client, request_id, &bidder, None);
    decide(&env, &client, &creator, request_id, &[offer_id]);

    client.interledger_ack(&1, &admin);
    let event = client.get_interledger_event(&1);
    assert_eq!(event.status, InterledgerStatus::Accepted);
    assert_eq!(event.reject_reason, None);
}

#[test]
fn test_reject_records_reason() {
    let env = Env::default();
    let (client, admin, signing_key) = setup(&env);
    let creator = Address::generate(&env);
    let bidder = Address::generate(&env);

    let request_id = open_request(&env, &client, &signing_key, &creator, 1);
    let offer_id = finalized_offer(&env, &client, request_id, &bidder, None);
    decide(&env, &client, &creator, request_id, &[offer_id]);

    let reason = String::from_str(&env, "payment stream closed");
    client.interledger_reject(&1, &reason, &admin);

    let event = client.get_interledger_event(&1);
    assert_eq!(event.status, InterledgerStatus::Rejected);
    assert_eq!(event.reject_reason, Some(reason));
}

#[test]
fn test_callbacks_are_idempotent() {
    let env = Env::default();
    let (client, admin, signing_key) = setup(&env);
    let creator = Address::generate(&env);
    let bidder = Address::generate(&env);

    let request_id = open_request(&env, &client, &signing_key, &creator, 1);
    let offer_id = finalized_offer(&env, &client, request_id, &bidder, None);
    decide(&env, &client, &creator, request_id, &[offer_id]);

    client.interledger_ack(&1, &admin);

    // Repeats are accepted but change nothing, including a late reject.
    client.interledger_ack(&1, &admin);
    client.interledger_reject(&1, &String::from_str(&env, "too late"), &admin);

    let event = client.get_interledger_event(&1);
    assert_eq!(event.status, InterledgerStatus::Accepted);
    assert_eq!(event.reject_reason, None);
}

#[test]
fn test_callbacks_are_admin_only() {
    let env = Env::default();
    let (client, _, signing_key) = setup(&env);
    let creator = Address::generate(&env);
    let bidder = Address::generate(&env);
    let outsider = Address::generate(&env);

    let request_id = open_request(&env, &client, &signing_key, &creator, 1);
    let offer_id = finalized_offer(&env, &client, request_id, &bidder, None);
    decide(&env, &client, &creator, request_id, &[offer_id]);

    assert_eq!(
        client.try_interledger_ack(&1, &outsider),
        Err(Ok(MarketError::AccessDenied))
    );
    assert_eq!(
        client.try_interledger_reject(&1, &String::from_str(&env, "no"), &outsider),
        Err(Ok(MarketError::AccessDenied))
    );

    assert_eq!(
        client.try_interledger_ack(&77, &outsider),
        Err(Ok(MarketError::AccessDenied))
    );
}

#[test]
fn test_unknown_nonce_rejected() {
    let env = Env::default();
    let (client, admin, _) = setup(&env);

    assert_eq!(
        client.try_interledger_ack(&77, &admin),
        Err(Ok(MarketError::UndefinedId))
    );
    assert_eq!(
        client.try_interledger_reject(&77, &String::from_str(&env, "no"), &admin),
        Err(Ok(MarketError::UndefinedId))
    );
}
