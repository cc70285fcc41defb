use soroban_sdk::contracterror;

/// Status codes shared by every mutating marketplace operation.
///
/// The numeric values are a stable wire contract: external systems
/// pattern-match on them, so new kinds are appended and existing ones
/// are never renumbered. `Ok` plays the role of status code 0.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum MarketError {
    /// Caller lacks authority: wrong signer, wrong creator, or a token
    /// bound to a different function/actor/contract.
    AccessDenied = 1,
    /// Request or offer id is unknown.
    UndefinedId = 2,
    /// The request deadline has passed.
    DeadlinePassed = 3,
    /// Operation requires the request to be in the Open stage.
    RequestNotOpen = 4,
    /// Operation requires a Pending request or offer.
    NotPending = 5,
    /// Operation requires the request to be decided.
    RequestNotDecided = 6,
    /// Deletion attempted before the request was closed.
    RequestNotClosed = 7,
    /// Malformed extra data: odd-length tier array, non-increasing
    /// thresholds, a threshold beyond the request duration, or a
    /// winning-offer list that does not belong to the request.
    InvalidInput = 12,
    /// The access token nonce has already been spent.
    TokenAlreadyUsed = 101,
    /// Offer schedule outside the request window, or offered price
    /// below the auction or instant-rent floor.
    OfferConditionsNotMet = 102,
    /// Instant-rent offer against an auction-only request.
    InstantRentNotSupported = 103,
}
