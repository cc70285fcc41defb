#![no_std]

use soroban_sdk::{
    contract, contractimpl, Address, BytesN, Env, String, Symbol, Vec,
};

use rental_lib::{
    validation, InterledgerEvent, MarketError, Offer, OfferExtra, OfferKind, OfferStage,
    Request, RequestExtra, RequestStage, SUBMIT_REQUEST_FN,
};

mod access;
mod interledger;
mod storage;

use storage::*;

#[cfg(test)]
mod test_common;

#[cfg(test)]
mod test_interledger;

#[contract]
pub struct Marketplace;

#[contractimpl]
impl Marketplace {
    /// Initialize contract with admin
    pub fn init_contract(env: Env, admin: Address) {
        if env.storage().instance().has(&DataKey::Admin) {
            panic!("Contract already initialized");
        }

        admin.require_auth();
        set_admin(&env, &admin);

        env.storage().instance().set(&DataKey::RequestCounter, &0u64);
        env.storage().instance().set(&DataKey::OfferCounter, &0u64);
        env.storage()
            .instance()
            .set(&DataKey::EventNonceCounter, &0u64);
    }

    // ---------------- ACCESS TOKEN REGISTRY ----------------

    /// Register an ed25519 key allowed to issue capability tokens.
    pub fn register_token_signer(
        env: Env,
        admin: Address,
        key: BytesN<32>,
    ) -> Result<(), MarketError> {
        admin.require_auth();
        if admin != get_admin(&env) {
            return Err(MarketError::AccessDenied);
        }
        if is_token_signer(&env, &key) {
            return Err(MarketError::InvalidInput);
        }

        add_token_signer(&env, &key);
        env.events()
            .publish((Symbol::new(&env, "signer_registered"),), (key,));
        Ok(())
    }

    pub fn deregister_token_signer(
        env: Env,
        admin: Address,
        key: BytesN<32>,
    ) -> Result<(), MarketError> {
        admin.require_auth();
        if admin != get_admin(&env) {
            return Err(MarketError::AccessDenied);
        }
        if !remove_token_signer(&env, &key) {
            return Err(MarketError::UndefinedId);
        }

        env.events()
            .publish((Symbol::new(&env, "signer_removed"),), (key,));
        Ok(())
    }

    pub fn get_token_signers(env: Env) -> Vec<BytesN<32>> {
        get_token_signers(&env)
    }

    /// Forget every spent token nonce. Recovery/testing path, never part
    /// of the normal request flow.
    pub fn reset_access_tokens(env: Env, caller: Address) -> Result<u32, MarketError> {
        caller.require_auth();
        if caller != get_admin(&env) {
            return Err(MarketError::AccessDenied);
        }

        let cleared = clear_spent_nonces(&env);
        env.events()
            .publish((Symbol::new(&env, "tokens_reset"),), (cleared,));
        Ok(cleared)
    }

    /// Digest an issuance service must sign for `actor` to call
    /// `function` on this contract with the given nonce.
    pub fn compute_token_digest(
        env: Env,
        nonce: BytesN<32>,
        function: Symbol,
        actor: Address,
    ) -> BytesN<32> {
        let target = env.current_contract_address();
        access::token_digest(&env, &nonce, &function, &actor, &target)
    }

    // ---------------- REQUEST LIFECYCLE ----------------

    /// Create a new rental request. Requires a one-time capability token
    /// bound to this function, the creator and this contract.
    pub fn submit_request(
        env: Env,
        digest: BytesN<32>,
        signature: BytesN<64>,
        signer: BytesN<32>,
        nonce: BytesN<32>,
        deadline: u64,
        creator: Address,
    ) -> Result<u64, MarketError> {
        creator.require_auth();

        let function = Symbol::new(&env, SUBMIT_REQUEST_FN);
        access::admit(&env, &digest, &signature, &signer, &nonce, &function, &creator)?;

        let request_id = increment_request_counter(&env);
        let request = Request {
            id: request_id,
            creator: creator.clone(),
            deadline,
            stage: RequestStage::Pending,
            created_at: env.ledger().timestamp(),
        };
        set_request(&env, &request);

        env.events().publish(
            (Symbol::new(&env, "request_added"),),
            (request_id, creator, deadline),
        );
        Ok(request_id)
    }

    /// Attach schedule and pricing rules to a pending request, opening it
    /// for offers. Allowed exactly once, only by the creator.
    pub fn submit_request_extra(
        env: Env,
        request_id: u64,
        start_time: u64,
        duration: u64,
        min_auction_price: i128,
        pricing_rules: Vec<i128>,
        locker_id: BytesN<32>,
        caller: Address,
    ) -> Result<(), MarketError> {
        caller.require_auth();

        let mut request = get_request(&env, request_id).ok_or(MarketError::UndefinedId)?;
        if request.creator != caller {
            return Err(MarketError::AccessDenied);
        }
        if request.stage != RequestStage::Pending {
            return Err(MarketError::NotPending);
        }
        if min_auction_price < 0 {
            return Err(MarketError::InvalidInput);
        }

        let rules = validation::parse_pricing_rules(&env, &pricing_rules, duration)?;
        let extra = RequestExtra {
            start_time,
            duration,
            min_auction_price,
            pricing_rules: rules,
            locker_id,
        };
        set_request_extra(&env, request_id, &extra);

        request.stage = RequestStage::Open;
        set_request(&env, &request);
        add_open_request(&env, request_id);

        env.events()
            .publish((Symbol::new(&env, "request_extra_added"),), (request_id,));
        Ok(())
    }

    /// Close an open request without deciding it.
    pub fn close_request(env: Env, request_id: u64, caller: Address) -> Result<(), MarketError> {
        caller.require_auth();

        let mut request = get_request(&env, request_id).ok_or(MarketError::UndefinedId)?;
        if request.creator != caller {
            return Err(MarketError::AccessDenied);
        }
        if request.stage != RequestStage::Open {
            return Err(MarketError::RequestNotOpen);
        }

        request.stage = RequestStage::Closed;
        set_request(&env, &request);
        remove_open_request(&env, request_id);
        add_closed_request(&env, request_id);

        env.events()
            .publish((Symbol::new(&env, "request_closed"),), (request_id,));
        Ok(())
    }

    /// Retire a closed request. The record stays in storage so `get_request`
    /// keeps reporting the Deleted stage instead of "not found".
    pub fn delete_request(env: Env, request_id: u64, caller: Address) -> Result<(), MarketError> {
        caller.require_auth();

        let mut request = get_request(&env, request_id).ok_or(MarketError::UndefinedId)?;
        if request.creator != caller {
            return Err(MarketError::AccessDenied);
        }
        if request.stage != RequestStage::Closed {
            return Err(MarketError::RequestNotClosed);
        }

        request.stage = RequestStage::Deleted;
        set_request(&env, &request);
        remove_closed_request(&env, request_id);

        env.events()
            .publish((Symbol::new(&env, "request_deleted"),), (request_id,));
        Ok(())
    }

    // ---------------- OFFER LIFECYCLE ----------------

    /// Open a new pending offer against an open request.
    pub fn submit_offer(env: Env, request_id: u64, creator: Address) -> Result<u64, MarketError> {
        creator.require_auth();

        let request = get_request(&env, request_id).ok_or(MarketError::UndefinedId)?;
        if env.ledger().timestamp() > request.deadline {
            return Err(MarketError::DeadlinePassed);
        }
        if request.stage != RequestStage::Open {
            return Err(MarketError::RequestNotOpen);
        }

        let offer_id = increment_offer_counter(&env);
        let offer = Offer {
            id: offer_id,
            request_id,
            creator: creator.clone(),
            stage: OfferStage::Pending,
            created_at: env.ledger().timestamp(),
        };
        set_offer(&env, &offer);
        append_request_offer(&env, request_id, offer_id);

        env.events().publish(
            (Symbol::new(&env, "offer_added"),),
            (offer_id, request_id, creator),
        );
        Ok(offer_id)
    }

    /// Attach schedule, kind, price and key material to a pending offer,
    /// finalizing it. A qualifying instant-rent offer then auto-decides
    /// the owning request with this offer as sole winner.
    pub fn submit_offer_extra(
        env: Env,
        offer_id: u64,
        start_time: u64,
        duration: u64,
        kind: u32,
        price: i128,
        encryption_key: BytesN<32>,
        auth_key: Option<BytesN<32>>,
        caller: Address,
    ) -> Result<(), MarketError> {
        caller.require_auth();

        let mut offer = get_offer(&env, offer_id).ok_or(MarketError::UndefinedId)?;
        if offer.creator != caller {
            return Err(MarketError::AccessDenied);
        }
        if offer.stage != OfferStage::Pending {
            return Err(MarketError::NotPending);
        }

        let request = get_request(&env, offer.request_id).ok_or(MarketError::UndefinedId)?;
        if request.stage != RequestStage::Open {
            return Err(MarketError::RequestNotOpen);
        }
        if env.ledger().timestamp() > request.deadline {
            return Err(MarketError::DeadlinePassed);
        }
        let request_extra =
            get_request_extra(&env, offer.request_id).ok_or(MarketError::RequestNotOpen)?;

        let kind = match kind {
            0 => OfferKind::Auction,
            1 => OfferKind::InstantRent,
            _ => return Err(MarketError::InvalidInput),
        };
        if price < 0 {
            return Err(MarketError::InvalidInput);
        }
        if !validation::schedule_in_window(
            request_extra.start_time,
            request_extra.duration,
            start_time,
            duration,
        ) {
            return Err(MarketError::OfferConditionsNotMet);
        }

        match kind {
            OfferKind::Auction => {
                let floor =
                    validation::per_unit_total(request_extra.min_auction_price, duration)
                        .ok_or(MarketError::OfferConditionsNotMet)?;
                if price < floor {
                    return Err(MarketError::OfferConditionsNotMet);
                }
            }
            OfferKind::InstantRent => {
                if request_extra.pricing_rules.is_empty() {
                    return Err(MarketError::InstantRentNotSupported);
                }
                let tier = validation::matching_tier(&request_extra.pricing_rules, duration)
                    .ok_or(MarketError::OfferConditionsNotMet)?;
                let floor = validation::per_unit_total(tier.price_per_unit, duration)
                    .ok_or(MarketError::OfferConditionsNotMet)?;
                if price < floor {
                    return Err(MarketError::OfferConditionsNotMet);
                }
            }
        }

        let extra = OfferExtra {
            start_time,
            duration,
            kind,
            price,
            encryption_key,
            auth_key,
        };
        set_offer_extra(&env, offer_id, &extra);

        offer.stage = OfferStage::Finalized;
        set_offer(&env, &offer);

        env.events()
            .publish((Symbol::new(&env, "offer_extra_added"),), (offer_id,));

        // Decision dispatch happens after the offer mutation has committed,
        // so decision state is only ever mutated in one place.
        if kind == OfferKind::InstantRent {
            let mut winners = Vec::new(&env);
            winners.push_back(offer_id);
            Self::apply_decision(&env, offer.request_id, &winners)?;
        }

        Ok(())
    }

    // ---------------- DECISION ENGINE ----------------

    /// Accept a chosen subset of finalized offers, closing the auction.
    /// One interledger event is emitted per winning offer, in list order.
    pub fn decide_request(
        env: Env,
        request_id: u64,
        winning_offer_ids: Vec<u64>,
        caller: Address,
    ) -> Result<(), MarketError> {
        caller.require_auth();

        let request = get_request(&env, request_id).ok_or(MarketError::UndefinedId)?;
        if request.creator != caller {
            return Err(MarketError::AccessDenied);
        }
        if request.stage != RequestStage::Open {
            return Err(MarketError::RequestNotOpen);
        }

        Self::apply_decision(&env, request_id, &winning_offer_ids)
    }

    /// Shared by the explicit decision above and the instant-rent path,
    /// which bypasses the caller check (the engine is the caller of record).
    fn apply_decision(
        env: &Env,
        request_id: u64,
        winning_offer_ids: &Vec<u64>,
    ) -> Result<(), MarketError> {
        for winner_id in winning_offer_ids.iter() {
            let winner = get_offer(env, winner_id).ok_or(MarketError::UndefinedId)?;
            if winner.request_id != request_id || winner.stage != OfferStage::Finalized {
                return Err(MarketError::InvalidInput);
            }
        }

        let mut request = get_request(env, request_id).ok_or(MarketError::UndefinedId)?;
        request.stage = RequestStage::Decided;
        set_request(env, &request);
        set_decision(env, request_id, winning_offer_ids);
        remove_open_request(env, request_id);

        env.events().publish(
            (Symbol::new(env, "request_decided"),),
            (request_id, winning_offer_ids.clone()),
        );

        // Event order is the contract consumers correlate on.
        for winner_id in winning_offer_ids.iter() {
            let extra = get_offer_extra(env, winner_id).ok_or(MarketError::UndefinedId)?;
            let payload = interledger::offer_payload(env, winner_id, &extra);
            interledger::send(env, winner_id, payload);
        }

        Ok(())
    }

    // ---------------- INTERLEDGER CALLBACKS ----------------

    /// Acknowledge settlement of the offer tied to `nonce`. Idempotent:
    /// repeats are reported but change nothing.
    pub fn interledger_ack(env: Env, nonce: u64, caller: Address) -> Result<(), MarketError> {
        caller.require_auth();
        if caller != get_admin(&env) {
            return Err(MarketError::AccessDenied);
        }

        interledger::receive_ack(&env, nonce)
    }

    /// Report a failed settlement for the offer tied to `nonce`.
    pub fn interledger_reject(
        env: Env,
        nonce: u64,
        reason: String,
        caller: Address,
    ) -> Result<(), MarketError> {
        caller.require_auth();
        if caller != get_admin(&env) {
            return Err(MarketError::AccessDenied);
        }

        interledger::receive_reject(&env, nonce, reason)
    }

    // ---------------- READ SURFACE ----------------

    pub fn get_request(env: Env, request_id: u64) -> Result<Request, MarketError> {
        get_request(&env, request_id).ok_or(MarketError::UndefinedId)
    }

    pub fn get_request_extra(env: Env, request_id: u64) -> Result<RequestExtra, MarketError> {
        get_request_extra(&env, request_id).ok_or(MarketError::UndefinedId)
    }

    pub fn is_request_defined(env: Env, request_id: u64) -> bool {
        get_request(&env, request_id).is_some()
    }

    pub fn is_request_decided(env: Env, request_id: u64) -> Result<bool, MarketError> {
        let request = get_request(&env, request_id).ok_or(MarketError::UndefinedId)?;
        Ok(request.stage == RequestStage::Decided)
    }

    pub fn get_request_decision(env: Env, request_id: u64) -> Result<Vec<u64>, MarketError> {
        let request = get_request(&env, request_id).ok_or(MarketError::UndefinedId)?;
        if request.stage != RequestStage::Decided {
            return Err(MarketError::RequestNotDecided);
        }
        get_decision(&env, request_id).ok_or(MarketError::RequestNotDecided)
    }

    pub fn get_open_request_ids(env: Env) -> Vec<u64> {
        get_open_requests(&env)
    }

    pub fn get_closed_request_ids(env: Env) -> Vec<u64> {
        get_closed_requests(&env)
    }

    pub fn get_request_offer_ids(env: Env, request_id: u64) -> Result<Vec<u64>, MarketError> {
        get_request(&env, request_id).ok_or(MarketError::UndefinedId)?;
        Ok(get_request_offers(&env, request_id))
    }

    pub fn get_offer(env: Env, offer_id: u64) -> Result<Offer, MarketError> {
        get_offer(&env, offer_id).ok_or(MarketError::UndefinedId)
    }

    pub fn get_offer_extra(env: Env, offer_id: u64) -> Result<OfferExtra, MarketError> {
        get_offer_extra(&env, offer_id).ok_or(MarketError::UndefinedId)
    }

    pub fn is_offer_defined(env: Env, offer_id: u64) -> bool {
        get_offer(&env, offer_id).is_some()
    }

    pub fn get_interledger_event(
        env: Env,
        nonce: u64,
    ) -> Result<InterledgerEvent, MarketError> {
        get_il_event(&env, nonce).ok_or(MarketError::UndefinedId)
    }
}
