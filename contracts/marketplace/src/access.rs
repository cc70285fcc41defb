//! Anti-replay capability-token registry gating request creation.
//!
//! A token is minted off-chain by an authorized signer: it binds a random
//! nonce to one function, one actor and one target contract, and may
//! authorize at most one state-changing call until the registry is reset.

use soroban_sdk::{contracttype, xdr::ToXdr, Address, Bytes, BytesN, Env, Symbol};

use rental_lib::MarketError;

use crate::storage::{is_nonce_spent, is_token_signer, spend_nonce};

/// Preimage of a token digest. The issuance service serializes and
/// hashes the same structure, so both sides agree on the binding.
#[derive(Clone)]
#[contracttype]
pub struct TokenPayload {
    pub nonce: BytesN<32>,
    pub function: Symbol,
    pub actor: Address,
    pub target: Address,
}

pub fn token_digest(
    env: &Env,
    nonce: &BytesN<32>,
    function: &Symbol,
    actor: &Address,
    target: &Address,
) -> BytesN<32> {
    let payload = TokenPayload {
        nonce: nonce.clone(),
        function: function.clone(),
        actor: actor.clone(),
        target: target.clone(),
    };
    let serialized = payload.to_xdr(env);
    let hash = env.crypto().sha256(&serialized);
    BytesN::from_array(env, &hash.to_array())
}

/// Validate a capability token and spend its nonce.
///
/// The digest must match the expected binding for `(nonce, function,
/// actor, current contract)`, the signer key must be registered, and the
/// nonce must be fresh. Nothing is spent on failure. Signature
/// verification runs last and traps at the host level on forgery, which
/// also leaves the nonce unspent.
pub fn admit(
    env: &Env,
    digest: &BytesN<32>,
    signature: &BytesN<64>,
    signer: &BytesN<32>,
    nonce: &BytesN<32>,
    function: &Symbol,
    actor: &Address,
) -> Result<(), MarketError> {
    let expected = token_digest(env, nonce, function, actor, &env.current_contract_address());
    if digest != &expected {
        return Err(MarketError::AccessDenied);
    }
    if !is_token_signer(env, signer) {
        return Err(MarketError::AccessDenied);
    }
    if is_nonce_spent(env, nonce) {
        return Err(MarketError::TokenAlreadyUsed);
    }

    let message = Bytes::from_array(env, &digest.to_array());
    env.crypto().ed25519_verify(signer, &message, signature);

    spend_nonce(env, nonce);
    Ok(())
}
