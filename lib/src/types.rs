use soroban_sdk::{contracttype, Address, Bytes, BytesN, String, Vec};

/// Lifecycle stage of a request.
///
/// Pending -> Open -> Closed | Decided -> Deleted. Deleted records stay
/// in storage so `get_request` keeps reporting the stage instead of
/// "not found".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[contracttype]
#[repr(u32)]
pub enum RequestStage {
    Pending = 0,
    Open = 1,
    Closed = 2,
    Decided = 3,
    Deleted = 4,
}

/// Lifecycle stage of an offer. Finalized offers are immutable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[contracttype]
#[repr(u32)]
pub enum OfferStage {
    Pending = 0,
    Finalized = 1,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[contracttype]
#[repr(u32)]
pub enum OfferKind {
    Auction = 0,
    InstantRent = 1,
}

/// A rental request as created by `submit_request`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[contracttype]
pub struct Request {
    pub id: u64,
    pub creator: Address,
    /// Timestamp after which no new offers are accepted.
    pub deadline: u64,
    pub stage: RequestStage,
    pub created_at: u64,
}

/// One instant-rent pricing rule: offers renting for at least
/// `min_duration` units pay `price_per_unit` per unit, up to the next
/// rule's threshold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[contracttype]
pub struct PriceTier {
    pub min_duration: u64,
    pub price_per_unit: i128,
}

/// Schedule and pricing rules, submitted exactly once while Pending.
#[derive(Clone, Debug, PartialEq, Eq)]
#[contracttype]
pub struct RequestExtra {
    pub start_time: u64,
    pub duration: u64,
    pub min_auction_price: i128,
    /// Empty means auction-only: instant-rent offers are rejected.
    pub pricing_rules: Vec<PriceTier>,
    /// Opaque resource handle, forwarded to settlement consumers.
    pub locker_id: BytesN<32>,
}

/// A bid against an open request.
#[derive(Clone, Debug, PartialEq, Eq)]
#[contracttype]
pub struct Offer {
    pub id: u64,
    pub request_id: u64,
    pub creator: Address,
    pub stage: OfferStage,
    pub created_at: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[contracttype]
pub struct OfferExtra {
    pub start_time: u64,
    pub duration: u64,
    pub kind: OfferKind,
    /// Total committed price for the whole offered duration.
    pub price: i128,
    pub encryption_key: BytesN<32>,
    pub auth_key: Option<BytesN<32>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[contracttype]
#[repr(u32)]
pub enum InterledgerStatus {
    Sending = 0,
    Accepted = 1,
    Rejected = 2,
}

/// Outbound settlement notification, correlated by nonce.
///
/// The payload is the wire contract consumed by the interledger
/// transport: a 32-byte big-endian offer id, the 32-byte encryption
/// key, and optionally a 32-byte authentication key. Consumers branch
/// on the total length (64 or 96) to learn how many keys are present.
#[derive(Clone, Debug, PartialEq, Eq)]
#[contracttype]
pub struct InterledgerEvent {
    pub nonce: u64,
    pub offer_id: u64,
    pub payload: Bytes,
    pub status: InterledgerStatus,
    pub reject_reason: Option<String>,
}
