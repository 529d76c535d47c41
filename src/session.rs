//! Session identity resolution.
//!
//! Clients carry an opaque session token; a client arriving without one
//! gets a freshly minted identity on its first write. Minting is pure:
//! the caller learns whether the identity is new and decides how to
//! persist it (typically a long-lived cookie).

use uuid::Uuid;

/// Validity window the transport layer should give a newly minted
/// session credential, in days.
pub const SESSION_TTL_DAYS: u32 = 365;

/// Reuse the presented identity, or mint a random one when it is absent
/// or empty. Returns the resolved identity and whether it was minted.
pub fn resolve(existing: Option<&str>) -> (String, bool) {
    match existing {
        Some(id) if !id.is_empty() => (id.to_string(), false),
        _ => (Uuid::new_v4().to_string(), true),
    }
}
