//! Note constructors and claim links.
//!
//! Pure functions over the note data model:
//!
//! ```text
//! commitment     = hash2(stealth_pub_x, amount)
//! nullifier      = hash2(stealth_priv, leaf_index)
//! nullifier_hash = hash1(nullifier)
//! ```
//!
//! The double-Poseidon nullifier hash is the only accepted form; hashing
//! `(nullifier, leaf_index)` again is forbidden.
//!
//! A claim link is a bearer secret: whoever holds it can spend the note.
//! The encoding is URL-safe base64 over
//! `version(1) || stealth_priv(32) || amount(8 LE) || leaf_index(8 LE)`,
//! and decode paths zeroize their scratch buffers.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use zeroize::{Zeroize, ZeroizeOnDrop};

use shroud_crypto::fields::{
    fq_from_be_bytes, fq_scalar_into_fr, fq_to_be_bytes, fr_from_u64, fr_to_be_bytes, Fq, Fr,
};
use shroud_crypto::poseidon::{hash1, hash2};

use crate::error::PoolError;

/// Current claim-link version byte.
pub const CLAIM_LINK_VERSION: u8 = 0x01;

const CLAIM_LINK_RAW_LEN: usize = 1 + 32 + 8 + 8;

/// `commitment = hash2(stealth_pub_x, amount)`.
pub fn commitment(stealth_pub_x: &Fr, amount_sats: u64) -> Result<Fr, PoolError> {
    hash2(stealth_pub_x, &fr_from_u64(amount_sats)).map_err(|_| PoolError::BadEncoding)
}

/// `nullifier = hash2(stealth_priv, leaf_index)`. The Grumpkin scalar is
/// reduced into the hash field first, as the circuit does.
pub fn nullifier(stealth_priv: &Fq, leaf_index: u64) -> Result<Fr, PoolError> {
    hash2(&fq_scalar_into_fr(stealth_priv), &fr_from_u64(leaf_index))
        .map_err(|_| PoolError::BadEncoding)
}

/// `nullifier_hash = hash1(nullifier)`.
pub fn nullifier_hash(nullifier: &Fr) -> Result<Fr, PoolError> {
    hash1(nullifier).map_err(|_| PoolError::BadEncoding)
}

/// Convenience: the revealed hash straight from the spending material.
pub fn nullifier_hash_for(stealth_priv: &Fq, leaf_index: u64) -> Result<[u8; 32], PoolError> {
    let n = nullifier(stealth_priv, leaf_index)?;
    Ok(fr_to_be_bytes(&nullifier_hash(&n)?))
}

/// A decoded claim link. Holds the stealth private key; zeroized on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct ClaimLink {
    stealth_priv_bytes: [u8; 32],
    #[zeroize(skip)]
    pub amount_sats: u64,
    #[zeroize(skip)]
    pub leaf_index: u64,
}

impl ClaimLink {
    pub fn new(stealth_priv: &Fq, amount_sats: u64, leaf_index: u64) -> Self {
        Self {
            stealth_priv_bytes: fq_to_be_bytes(stealth_priv),
            amount_sats,
            leaf_index,
        }
    }

    pub fn stealth_priv(&self) -> Fq {
        fq_from_be_bytes(&self.stealth_priv_bytes).expect("validated at construction")
    }

    /// Serialize to the URL-safe bearer string.
    pub fn encode(&self) -> String {
        let mut raw = [0u8; CLAIM_LINK_RAW_LEN];
        raw[0] = CLAIM_LINK_VERSION;
        raw[1..33].copy_from_slice(&self.stealth_priv_bytes);
        raw[33..41].copy_from_slice(&self.amount_sats.to_le_bytes());
        raw[41..49].copy_from_slice(&self.leaf_index.to_le_bytes());
        let text = URL_SAFE_NO_PAD.encode(raw);
        raw.zeroize();
        text
    }

    /// Parse and validate a bearer string: version byte, exact length, and
    /// the private scalar must be canonical for the Grumpkin scalar field.
    pub fn decode(text: &str) -> Result<Self, PoolError> {
        let mut raw = URL_SAFE_NO_PAD
            .decode(text)
            .map_err(|_| PoolError::DecodeError)?;
        if raw.len() != CLAIM_LINK_RAW_LEN {
            raw.zeroize();
            return Err(PoolError::DecodeError);
        }
        if raw[0] != CLAIM_LINK_VERSION {
            raw.zeroize();
            return Err(PoolError::DecodeError);
        }

        let mut stealth_priv_bytes = [0u8; 32];
        stealth_priv_bytes.copy_from_slice(&raw[1..33]);
        if fq_from_be_bytes(&stealth_priv_bytes).is_err() {
            stealth_priv_bytes.zeroize();
            raw.zeroize();
            return Err(PoolError::DecodeError);
        }
        let amount_sats = u64::from_le_bytes(raw[33..41].try_into().expect("fixed width"));
        let leaf_index = u64::from_le_bytes(raw[41..49].try_into().expect("fixed width"));
        raw.zeroize();

        Ok(Self {
            stealth_priv_bytes,
            amount_sats,
            leaf_index,
        })
    }
}

impl core::fmt::Debug for ClaimLink {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // Never print the key material.
        f.debug_struct("ClaimLink")
            .field("amount_sats", &self.amount_sats)
            .field("leaf_index", &self.leaf_index)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shroud_crypto::fields::fq_reduce_be_bytes;

    fn priv_key(n: u64) -> Fq {
        let mut bytes = [0u8; 32];
        bytes[0] = 0x11;
        bytes[24..].copy_from_slice(&n.to_be_bytes());
        fq_reduce_be_bytes(&bytes)
    }

    #[test]
    fn nullifier_hash_is_the_double_poseidon_form() {
        let key = priv_key(1);
        let n = nullifier(&key, 5).unwrap();
        let nh = nullifier_hash(&n).unwrap();
        assert_eq!(
            nullifier_hash_for(&key, 5).unwrap(),
            fr_to_be_bytes(&nh)
        );
        // Different leaf index, different nullifier.
        assert_ne!(
            nullifier_hash_for(&key, 5).unwrap(),
            nullifier_hash_for(&key, 6).unwrap()
        );
    }

    #[test]
    fn claim_link_roundtrip() {
        let link = ClaimLink::new(&priv_key(7), 123_456, 42);
        let text = link.encode();
        let back = ClaimLink::decode(&text).unwrap();
        assert_eq!(back, link);
        assert_eq!(back.stealth_priv(), priv_key(7));
        assert_eq!(back.amount_sats, 123_456);
        assert_eq!(back.leaf_index, 42);
    }

    #[test]
    fn claim_link_is_url_safe() {
        let link = ClaimLink::new(&priv_key(99), u64::MAX, u64::MAX);
        let text = link.encode();
        assert!(text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn claim_link_rejects_wrong_version() {
        let link = ClaimLink::new(&priv_key(3), 10, 0);
        let mut raw = URL_SAFE_NO_PAD.decode(link.encode()).unwrap();
        raw[0] = 0x02;
        let forged = URL_SAFE_NO_PAD.encode(&raw);
        assert_eq!(ClaimLink::decode(&forged), Err(PoolError::DecodeError));
    }

    #[test]
    fn claim_link_rejects_bad_length_and_garbage() {
        assert_eq!(ClaimLink::decode("not base64 !!"), Err(PoolError::DecodeError));
        let short = URL_SAFE_NO_PAD.encode([1u8; 10]);
        assert_eq!(ClaimLink::decode(&short), Err(PoolError::DecodeError));
    }

    #[test]
    fn claim_link_rejects_out_of_field_scalar() {
        let mut raw = [0u8; CLAIM_LINK_RAW_LEN];
        raw[0] = CLAIM_LINK_VERSION;
        raw[1..33].copy_from_slice(&[0xff; 32]);
        let text = URL_SAFE_NO_PAD.encode(raw);
        assert_eq!(ClaimLink::decode(&text), Err(PoolError::DecodeError));
    }
}
