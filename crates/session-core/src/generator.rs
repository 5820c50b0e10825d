//! Client session identifier generation.
//!
//! RTSP session tokens only need to be opaque strings, but stock servers tend
//! to guess-resist them by drawing from a large random space. We draw a full
//! unsigned 64-bit value per candidate and render it in decimal, giving up to
//! twenty digits with no leading zeros.
//!
//! Generation alone does not guarantee uniqueness. Callers must reserve the
//! candidate in a [`SessionRegistry`](crate::registry::SessionRegistry) and
//! redraw on collision; [`ProxySession::create`](crate::session::ProxySession::create)
//! does exactly that.

use crate::types::ClientSessionId;
use rand::Rng;

/// Draws one random candidate client session identifier.
///
/// Uniformly random over the full `u64` range, rendered in decimal.
pub fn random_client_session_id() -> ClientSessionId {
    let mut rng = rand::thread_rng();
    ClientSessionId(rng.gen::<u64>().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_is_decimal_u64() {
        for _ in 0..100 {
            let id = random_client_session_id();
            assert!(!id.0.is_empty());
            assert!(id.0.len() <= 20);
            assert!(id.0.chars().all(|c| c.is_ascii_digit()));
            // Round-trips through u64, so it is in range and has no leading
            // zeros (other than the literal value 0).
            let value: u64 = id.0.parse().unwrap();
            assert_eq!(value.to_string(), id.0);
        }
    }

    #[test]
    fn test_candidates_are_spread_out() {
        // 1000 draws from a 64-bit space; any repeat means the generator is
        // broken, not unlucky.
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(random_client_session_id().0));
        }
    }
}
