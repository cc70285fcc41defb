//! Shared fixtures: contract setup and off-chain token minting.

#![cfg(test)]

use ed25519_dalek::{Signer, SigningKey};
use soroban_sdk::testutils::Address as _;
use soroban_sdk::{Address, BytesN, Env, Symbol, Vec};

use crate::{Marketplace, MarketplaceClient};

pub const SIGNER_SEED: [u8; 32] = [7u8; 32];

pub const REQ_DEADLINE: u64 = 1_000;
pub const REQ_START: u64 = 5_000;
pub const REQ_DURATION: u64 = 100;
pub const MIN_AUCTION_PRICE: i128 = 2;

/// Register the contract, initialize it with a fresh admin and register
/// one token signer backed by a deterministic ed25519 key.
pub fn setup<'a>(env: &'a Env) -> (MarketplaceClient<'a>, Address, SigningKey) {
    env.mock_all_auths();
    let contract_id = env.register_contract(None, Marketplace);
    let client = MarketplaceClient::new(env, &contract_id);
    let admin = Address::generate(env);
    client.init_contract(&admin);

    let signing_key = SigningKey::from_bytes(&SIGNER_SEED);
    let public = BytesN::from_array(env, &signing_key.verifying_key().to_bytes());
    client.register_token_signer(&admin, &public);

    (client, admin, signing_key)
}

/// Mint a capability token for `actor` to call `submit_request`, exactly
/// as the off-chain issuance service would: ask the contract for the
/// digest, then sign it. Returns (digest, signature, signer, nonce).
pub fn mint_token(
    env: &Env,
    client: &MarketplaceClient,
    signing_key: &SigningKey,
    actor: &Address,
    nonce_seed: u8,
) -> (BytesN<32>, BytesN<64>, BytesN<32>, BytesN<32>) {
    let nonce = BytesN::from_array(env, &[nonce_seed; 32]);
    let function = Symbol::new(env, "submit_request");
    let digest = client.compute_token_digest(&nonce, &function, actor);
    let signature = signing_key.sign(&digest.to_array());
    (
        digest,
        BytesN::from_array(env, &signature.to_bytes()),
        BytesN::from_array(env, &signing_key.verifying_key().to_bytes()),
        nonce,
    )
}

pub fn create_request(
    env: &Env,
    client: &MarketplaceClient,
    signing_key: &SigningKey,
    creator: &Address,
    nonce_seed: u8,
) -> u64 {
    let (digest, signature, signer, nonce) =
        mint_token(env, client, signing_key, creator, nonce_seed);
    client.submit_request(&digest, &signature, &signer, &nonce, &REQ_DEADLINE, creator)
}

pub fn flat_rules(env: &Env, values: &[i128]) -> Vec<i128> {
    let mut rules = Vec::new(env);
    for value in values {
        rules.push_back(*value);
    }
    rules
}

/// Tiered pricing used by most offer tests: at least 1 unit costs 10 per
/// unit, at least 10 cost 8, at least 50 cost 5.
pub fn default_rules(env: &Env) -> Vec<i128> {
    flat_rules(env, &[1, 10, 10, 8, 50, 5])
}

pub fn locker_id(env: &Env) -> BytesN<32> {
    BytesN::from_array(env, &[9u8; 32])
}

/// Create a request and open it with the default schedule and rules.
pub fn open_request(
    env: &Env,
    client: &MarketplaceClient,
    signing_key: &SigningKey,
    creator: &Address,
    nonce_seed: u8,
) -> u64 {
    let request_id = create_request(env, client, signing_key, creator, nonce_seed);
    client.submit_request_extra(
        &request_id,
        &REQ_START,
        &REQ_DURATION,
        &MIN_AUCTION_PRICE,
        &default_rules(env),
        &locker_id(env),
        creator,
    );
    request_id
}
