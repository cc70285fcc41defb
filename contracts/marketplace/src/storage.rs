use soroban_sdk::{contracttype, Address, BytesN, Env, Vec};

use rental_lib::{InterledgerEvent, Offer, OfferExtra, Request, RequestExtra};

#[derive(Clone)]
#[contracttype]
pub enum DataKey {
    /// Admin address
    Admin,
    /// Request counter
    RequestCounter,
    /// Offer counter
    OfferCounter,
    /// Next outbound interledger nonce
    EventNonceCounter,
    /// Registered token-signer keys (ed25519)
    TokenSigners,
    /// Spent access-token nonce marker
    SpentNonce(BytesN<32>),
    /// Index of spent nonces, so a reset can clear them all
    SpentNonceIndex,
    /// Request by ID
    Request(u64),
    /// Request extra data by request ID
    RequestExtra(u64),
    /// Offer IDs submitted against a request
    RequestOffers(u64),
    /// Accepted offer IDs of a decided request
    Decision(u64),
    /// IDs of requests currently in the Open stage
    OpenRequests,
    /// IDs of requests currently in the Closed stage
    ClosedRequests,
    /// Offer by ID
    Offer(u64),
    /// Offer extra data by offer ID
    OfferExtra(u64),
    /// Interledger event by nonce
    IlEvent(u64),
}

/* ---------------- ADMIN ---------------- */

pub fn set_admin(env: &Env, admin: &Address) {
    env.storage().instance().set(&DataKey::Admin, admin);
}

pub fn get_admin(env: &Env) -> Address {
    env.storage()
        .instance()
        .get(&DataKey::Admin)
        .expect("Contract not initialized")
}

/* ---------------- COUNTERS ---------------- */

pub fn increment_request_counter(env: &Env) -> u64 {
    let counter: u64 = env
        .storage()
        .instance()
        .get(&DataKey::RequestCounter)
        .unwrap_or(0);
    let next = counter + 1;
    env.storage().instance().set(&DataKey::RequestCounter, &next);
    next
}

pub fn increment_offer_counter(env: &Env) -> u64 {
    let counter: u64 = env
        .storage()
        .instance()
        .get(&DataKey::OfferCounter)
        .unwrap_or(0);
    let next = counter + 1;
    env.storage().instance().set(&DataKey::OfferCounter, &next);
    next
}

pub fn next_event_nonce(env: &Env) -> u64 {
    let counter: u64 = env
        .storage()
        .instance()
        .get(&DataKey::EventNonceCounter)
        .unwrap_or(0);
    let next = counter + 1;
    env.storage()
        .instance()
        .set(&DataKey::EventNonceCounter, &next);
    next
}

/* ---------------- TOKEN SIGNERS ---------------- */

pub fn get_token_signers(env: &Env) -> Vec<BytesN<32>> {
    env.storage()
        .instance()
        .get(&DataKey::TokenSigners)
        .unwrap_or_else(|| Vec::new(env))
}

pub fn is_token_signer(env: &Env, key: &BytesN<32>) -> bool {
    get_token_signers(env).contains(key)
}

pub fn add_token_signer(env: &Env, key: &BytesN<32>) {
    let mut signers = get_token_signers(env);
    signers.push_back(key.clone());
    env.storage().instance().set(&DataKey::TokenSigners, &signers);
}

pub fn remove_token_signer(env: &Env, key: &BytesN<32>) -> bool {
    let signers = get_token_signers(env);
    let mut remaining = Vec::new(env);
    let mut found = false;
    for signer in signers.iter() {
        if &signer != key {
            remaining.push_back(signer);
        } else {
            found = true;
        }
    }
    if found {
        env.storage()
            .instance()
            .set(&DataKey::TokenSigners, &remaining);
    }
    found
}

/* ---------------- SPENT NONCES ---------------- */

pub fn is_nonce_spent(env: &Env, nonce: &BytesN<32>) -> bool {
    env.storage()
        .instance()
        .get::<_, bool>(&DataKey::SpentNonce(nonce.clone()))
        .unwrap_or(false)
}

pub fn spend_nonce(env: &Env, nonce: &BytesN<32>) {
    env.storage()
        .instance()
        .set(&DataKey::SpentNonce(nonce.clone()), &true);

    let mut index: Vec<BytesN<32>> = env
        .storage()
        .instance()
        .get(&DataKey::SpentNonceIndex)
        .unwrap_or_else(|| Vec::new(env));
    index.push_back(nonce.clone());
    env.storage()
        .instance()
        .set(&DataKey::SpentNonceIndex, &index);
}

/// Forget every spent nonce. Returns how many were cleared.
pub fn clear_spent_nonces(env: &Env) -> u32 {
    let index: Vec<BytesN<32>> = env
        .storage()
        .instance()
        .get(&DataKey::SpentNonceIndex)
        .unwrap_or_else(|| Vec::new(env));
    for nonce in index.iter() {
        env.storage().instance().remove(&DataKey::SpentNonce(nonce));
    }
    let cleared = index.len();
    env.storage().instance().remove(&DataKey::SpentNonceIndex);
    cleared
}

/* ---------------- REQUESTS ---------------- */

pub fn set_request(env: &Env, request: &Request) {
    env.storage()
        .instance()
        .set(&DataKey::Request(request.id), request);
}

pub fn get_request(env: &Env, request_id: u64) -> Option<Request> {
    env.storage().instance().get(&DataKey::Request(request_id))
}

pub fn set_request_extra(env: &Env, request_id: u64, extra: &RequestExtra) {
    env.storage()
        .instance()
        .set(&DataKey::RequestExtra(request_id), extra);
}

pub fn get_request_extra(env: &Env, request_id: u64) -> Option<RequestExtra> {
    env.storage()
        .instance()
        .get(&DataKey::RequestExtra(request_id))
}

pub fn get_request_offers(env: &Env, request_id: u64) -> Vec<u64> {
    env.storage()
        .instance()
        .get(&DataKey::RequestOffers(request_id))
        .unwrap_or_else(|| Vec::new(env))
}

pub fn append_request_offer(env: &Env, request_id: u64, offer_id: u64) {
    let mut offers = get_request_offers(env, request_id);
    offers.push_back(offer_id);
    env.storage()
        .instance()
        .set(&DataKey::RequestOffers(request_id), &offers);
}

pub fn set_decision(env: &Env, request_id: u64, winning_offer_ids: &Vec<u64>) {
    env.storage()
        .instance()
        .set(&DataKey::Decision(request_id), winning_offer_ids);
}

pub fn get_decision(env: &Env, request_id: u64) -> Option<Vec<u64>> {
    env.storage().instance().get(&DataKey::Decision(request_id))
}

/* ---------------- STAGE INDEXES ---------------- */

pub fn get_open_requests(env: &Env) -> Vec<u64> {
    env.storage()
        .instance()
        .get(&DataKey::OpenRequests)
        .unwrap_or_else(|| Vec::new(env))
}

pub fn add_open_request(env: &Env, request_id: u64) {
    let mut open = get_open_requests(env);
    open.push_back(request_id);
    env.storage().instance().set(&DataKey::OpenRequests, &open);
}

pub fn remove_open_request(env: &Env, request_id: u64) {
    let open = get_open_requests(env);
    let remaining = remove_id(env, &open, request_id);
    env.storage()
        .instance()
        .set(&DataKey::OpenRequests, &remaining);
}

pub fn get_closed_requests(env: &Env) -> Vec<u64> {
    env.storage()
        .instance()
        .get(&DataKey::ClosedRequests)
        .unwrap_or_else(|| Vec::new(env))
}

pub fn add_closed_request(env: &Env, request_id: u64) {
    let mut closed = get_closed_requests(env);
    closed.push_back(request_id);
    env.storage()
        .instance()
        .set(&DataKey::ClosedRequests, &closed);
}

pub fn remove_closed_request(env: &Env, request_id: u64) {
    let closed = get_closed_requests(env);
    let remaining = remove_id(env, &closed, request_id);
    env.storage()
        .instance()
        .set(&DataKey::ClosedRequests, &remaining);
}

fn remove_id(env: &Env, ids: &Vec<u64>, id: u64) -> Vec<u64> {
    let mut remaining = Vec::new(env);
    for candidate in ids.iter() {
        if candidate != id {
            remaining.push_back(candidate);
        }
    }
    remaining
}

/* ---------------- OFFERS ---------------- */

pub fn set_offer(env: &Env, offer: &Offer) {
    env.storage().instance().set(&DataKey::Offer(offer.id), offer);
}

pub fn get_offer(env: &Env, offer_id: u64) -> Option<Offer> {
    env.storage().instance().get(&DataKey::Offer(offer_id))
}

pub fn set_offer_extra(env: &Env, offer_id: u64, extra: &OfferExtra) {
    env.storage()
        .instance()
        .set(&DataKey::OfferExtra(offer_id), extra);
}

pub fn get_offer_extra(env: &Env, offer_id: u64) -> Option<OfferExtra> {
    env.storage().instance().get(&DataKey::OfferExtra(offer_id))
}

/* ---------------- INTERLEDGER EVENTS ---------------- */

pub fn set_il_event(env: &Env, event: &InterledgerEvent) {
    env.storage()
        .instance()
        .set(&DataKey::IlEvent(event.nonce), event);
}

pub fn get_il_event(env: &Env, nonce: u64) -> Option<InterledgerEvent> {
    env.storage().instance().get(&DataKey::IlEvent(nonce))
}
