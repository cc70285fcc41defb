//! Outbound settlement notifications and their inbound ack/reject path.
//!
//! `send` hands each event to the external interledger transport via a
//! contract event and never blocks or retries; delivery assurance is the
//! transport's problem. The stored record tracks what the external
//! system reported back.

use soroban_sdk::{Bytes, Env, String, Symbol};

use rental_lib::{
    InterledgerEvent, InterledgerStatus, MarketError, OfferExtra, PAYLOAD_FIELD_LEN,
};

use crate::storage::{get_il_event, next_event_nonce, set_il_event};

/// Binary payload for a winning offer: 32-byte big-endian offer id,
/// 32-byte encryption key, optional 32-byte authentication key. The
/// total length (64 or 96) tells the consumer how many keys follow.
pub fn offer_payload(env: &Env, offer_id: u64, extra: &OfferExtra) -> Bytes {
    let mut id_field = [0u8; PAYLOAD_FIELD_LEN as usize];
    id_field[24..].copy_from_slice(&offer_id.to_be_bytes());

    let mut payload = Bytes::new(env);
    payload.extend_from_array(&id_field);
    payload.extend_from_array(&extra.encryption_key.to_array());
    if let Some(auth_key) = &extra.auth_key {
        payload.extend_from_array(&auth_key.to_array());
    }
    payload
}

/// Queue one outbound event and return its nonce (strictly increasing
/// across the contract lifetime).
pub fn send(env: &Env, offer_id: u64, payload: Bytes) -> u64 {
    let nonce = next_event_nonce(env);
    let event = InterledgerEvent {
        nonce,
        offer_id,
        payload: payload.clone(),
        status: InterledgerStatus::Sending,
        reject_reason: None,
    };
    set_il_event(env, &event);

    env.events().publish(
        (Symbol::new(env, "il_sending"),),
        (nonce, offer_id, payload),
    );
    nonce
}

/// Record a settlement acknowledgment. A second call for the same nonce
/// is reported but leaves the record untouched.
pub fn receive_ack(env: &Env, nonce: u64) -> Result<(), MarketError> {
    let mut event = get_il_event(env, nonce).ok_or(MarketError::UndefinedId)?;

    if event.status != InterledgerStatus::Sending {
        env.events()
            .publish((Symbol::new(env, "il_duplicate"),), (nonce,));
        return Ok(());
    }

    event.status = InterledgerStatus::Accepted;
    set_il_event(env, &event);

    env.events().publish(
        (Symbol::new(env, "il_accepted"),),
        (nonce, event.offer_id),
    );
    Ok(())
}

/// Record a settlement rejection, keeping the reported reason.
pub fn receive_reject(env: &Env, nonce: u64, reason: String) -> Result<(), MarketError> {
    let mut event = get_il_event(env, nonce).ok_or(MarketError::UndefinedId)?;

    if event.status != InterledgerStatus::Sending {
        env.events()
            .publish((Symbol::new(env, "il_duplicate"),), (nonce,));
        return Ok(());
    }

    event.status = InterledgerStatus::Rejected;
    event.reject_reason = Some(reason.clone());
    set_il_event(env, &event);

    env.events().publish(
        (Symbol::new(env, "il_rejected"),),
        (nonce, event.offer_id, reason),
    );
    Ok(())
}
