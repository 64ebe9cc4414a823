//! Stealth address cryptosystem (EIP-5564 / DKSAP pattern over Grumpkin).
//!
//! A recipient publishes a meta-address: compressed spending and viewing
//! public keys. For every deposit the sender draws a fresh ephemeral key,
//! runs ECDH against the viewing key, and derives a one-time stealth public
//! key the recipient alone can spend to:
//!
//! ```text
//! shared.x     = (ephemeral_priv * viewing_pub).x
//! tweak        = H(shared.x || TAG) mod q
//! stealth_pub  = spending_pub + tweak * G        (sender side)
//! stealth_priv = spending_priv + tweak mod q     (recipient side)
//! ```
//!
//! The amount is XOR-encrypted under a keystream derived from the same
//! shared secret, and the announcement is confirmed during scanning by
//! recomputing the note commitment. Scanning never errors per-announcement:
//! an entry that fails to decode, fails to decrypt, or decrypts but does
//! not match its commitment is skipped the same way, so the scan gives no
//! oracle about the viewing key.

use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;
use sha2::{Digest, Sha256};

use shroud_crypto::fields::{fq_reduce_be_bytes, fr_to_be_bytes, Fq};
use shroud_crypto::grumpkin::GrumpkinPoint;

use crate::error::PoolError;
use crate::note;
use crate::state::tree::TREE_DEPTH;
use crate::state::StealthAnnouncement;

/// Hex length of a wire meta-address: two compressed points.
pub const META_ADDRESS_HEX_LEN: usize = 132;

/// Raw byte length of a meta-address.
pub const META_ADDRESS_BYTES: usize = 66;

const SPENDING_KEY_DOMAIN: &[u8] = b"shroud/spending-key/v1";
const VIEWING_KEY_DOMAIN: &[u8] = b"shroud/viewing-key/v1";

/// One-byte domain tag appended to the shared-secret x-coordinate for the
/// stealth-key tweak, separating it from the amount keystream.
const STEALTH_TWEAK_TAG: u8 = 0x01;

/// A recipient's full key material.
#[derive(Clone)]
pub struct StealthKeys {
    pub spending_priv: Fq,
    pub viewing_priv: Fq,
    pub spending_pub: GrumpkinPoint,
    pub viewing_pub: GrumpkinPoint,
}

/// The public half of a stealth identity.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MetaAddress {
    pub spending_pub: GrumpkinPoint,
    pub viewing_pub: GrumpkinPoint,
}

/// Everything a sender produces for one stealth deposit.
#[derive(Clone, Debug)]
pub struct StealthDeposit {
    pub ephemeral_pub: [u8; 33],
    pub encrypted_amount: [u8; 8],
    pub commitment: [u8; 32],
    pub stealth_pub_x: [u8; 32],
}

/// A note recovered by scanning, spendable by the owner of the matching
/// spending key. `shared_secret_x` stays wallet-local: it is the input to
/// the stealth-key tweak at claim time.
#[derive(Clone, Debug, Serialize)]
pub struct ScannedNote {
    pub stealth_pub_x: [u8; 32],
    pub amount_sats: u64,
    pub leaf_index: u64,
    #[serde(serialize_with = "serialize_compressed_point")]
    pub ephemeral_pub: [u8; 33],
    pub commitment: [u8; 32],
    #[serde(skip)]
    pub shared_secret_x: [u8; 32],
}

fn serialize_compressed_point<S: serde::Serializer>(
    point: &[u8; 33],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(point))
}

/// An inclusion path as served by the indexer.
#[derive(Clone, Debug)]
pub struct MerklePath {
    pub siblings: [[u8; 32]; TREE_DEPTH],
    pub leaf_index: u64,
    pub root: [u8; 32],
}

/// The private inputs a claim proof is built from.
pub struct ClaimWitness {
    pub stealth_priv: Fq,
    pub nullifier: [u8; 32],
    pub nullifier_hash: [u8; 32],
    pub amount_sats: u64,
    pub path: MerklePath,
}

/// Why one announcement did not yield a note. Scanning collapses both
/// cases into a silent skip.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NoteMatchError {
    /// The announcement bytes do not decode to a curve point.
    Decode,
    /// Decodes, but the commitment check fails: not ours (or corrupted,
    /// which must be indistinguishable from not ours).
    NotMine,
}

/// Derive a key triple from a 32-byte master seed: two independent
/// domain-separated hashes, each reduced into the Grumpkin scalar field.
pub fn derive_keys(master_seed: &[u8; 32]) -> StealthKeys {
    let spending_priv = derive_scalar(SPENDING_KEY_DOMAIN, master_seed);
    let viewing_priv = derive_scalar(VIEWING_KEY_DOMAIN, master_seed);
    StealthKeys {
        spending_pub: GrumpkinPoint::mul_generator(&spending_priv),
        viewing_pub: GrumpkinPoint::mul_generator(&viewing_priv),
        spending_priv,
        viewing_priv,
    }
}

fn derive_scalar(domain: &[u8], seed: &[u8; 32]) -> Fq {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update(seed);
    let digest: [u8; 32] = hasher.finalize().into();
    fq_reduce_be_bytes(&digest)
}

impl StealthKeys {
    pub fn meta_address(&self) -> MetaAddress {
        MetaAddress {
            spending_pub: self.spending_pub,
            viewing_pub: self.viewing_pub,
        }
    }
}

impl MetaAddress {
    /// 132 lowercase hex characters: spending key then viewing key.
    pub fn encode(&self) -> String {
        hex::encode(self.to_bytes())
    }

    pub fn decode(text: &str) -> Result<Self, PoolError> {
        if text.len() != META_ADDRESS_HEX_LEN {
            return Err(PoolError::DecodeError);
        }
        let raw = hex::decode(text).map_err(|_| PoolError::DecodeError)?;
        let mut bytes = [0u8; META_ADDRESS_BYTES];
        bytes.copy_from_slice(&raw);
        Self::from_bytes(&bytes)
    }

    pub fn to_bytes(&self) -> [u8; META_ADDRESS_BYTES] {
        let mut out = [0u8; META_ADDRESS_BYTES];
        // Encoded points are never the identity, checked at construction.
        out[..33].copy_from_slice(&self.spending_pub.to_compressed().expect("non-identity"));
        out[33..].copy_from_slice(&self.viewing_pub.to_compressed().expect("non-identity"));
        out
    }

    pub fn from_bytes(bytes: &[u8; META_ADDRESS_BYTES]) -> Result<Self, PoolError> {
        let spending: [u8; 33] = bytes[..33].try_into().expect("fixed split");
        let viewing: [u8; 33] = bytes[33..].try_into().expect("fixed split");
        Ok(Self {
            spending_pub: GrumpkinPoint::from_compressed(&spending)?,
            viewing_pub: GrumpkinPoint::from_compressed(&viewing)?,
        })
    }
}

/// Keystream for amount obfuscation: the first 8 bytes of
/// `SHA-256(shared.x)`.
fn amount_keystream(shared_x: &[u8; 32]) -> [u8; 8] {
    let digest: [u8; 32] = Sha256::digest(shared_x).into();
    digest[..8].try_into().expect("digest is 32 bytes")
}

/// XOR the little-endian amount with the keystream. Encryption and
/// decryption are the same operation.
pub fn encrypt_amount(amount_sats: u64, shared_x: &[u8; 32]) -> [u8; 8] {
    let key = amount_keystream(shared_x);
    let mut out = amount_sats.to_le_bytes();
    for (byte, k) in out.iter_mut().zip(key.iter()) {
        *byte ^= k;
    }
    out
}

pub fn decrypt_amount(encrypted: &[u8; 8], shared_x: &[u8; 32]) -> u64 {
    let key = amount_keystream(shared_x);
    let mut out = *encrypted;
    for (byte, k) in out.iter_mut().zip(key.iter()) {
        *byte ^= k;
    }
    u64::from_le_bytes(out)
}

/// Stealth-key tweak: hash of the shared-secret x-coordinate under its own
/// domain tag, reduced into the Grumpkin scalar field.
pub fn stealth_tweak(shared_x: &[u8; 32]) -> Fq {
    let mut hasher = Sha256::new();
    hasher.update(shared_x);
    hasher.update([STEALTH_TWEAK_TAG]);
    let digest: [u8; 32] = hasher.finalize().into();
    fq_reduce_be_bytes(&digest)
}

/// Build a stealth deposit with a fresh random ephemeral key.
pub fn create_stealth_deposit(
    meta: &MetaAddress,
    amount_sats: u64,
) -> Result<StealthDeposit, PoolError> {
    let mut seed = [0u8; 32];
    OsRng.fill_bytes(&mut seed);
    let ephemeral_priv = fq_reduce_be_bytes(&seed);
    create_stealth_deposit_with_ephemeral(meta, amount_sats, &ephemeral_priv)
}

/// Deterministic variant; the caller provides the ephemeral key.
pub fn create_stealth_deposit_with_ephemeral(
    meta: &MetaAddress,
    amount_sats: u64,
    ephemeral_priv: &Fq,
) -> Result<StealthDeposit, PoolError> {
    let ephemeral_pub_point = GrumpkinPoint::mul_generator(ephemeral_priv);
    let ephemeral_pub = ephemeral_pub_point.to_compressed()?;

    let shared = meta.viewing_pub.mul(ephemeral_priv);
    if shared.is_identity() {
        return Err(PoolError::PointNotOnCurve);
    }
    let shared_x = fr_to_be_bytes(&shared.x);

    let tweak = stealth_tweak(&shared_x);
    let stealth_pub = meta.spending_pub.add(&GrumpkinPoint::mul_generator(&tweak));
    let stealth_pub_x = fr_to_be_bytes(&stealth_pub.x);

    let commitment = fr_to_be_bytes(&note::commitment(&stealth_pub.x, amount_sats)?);

    Ok(StealthDeposit {
        ephemeral_pub,
        encrypted_amount: encrypt_amount(amount_sats, &shared_x),
        commitment,
        stealth_pub_x,
    })
}

/// Try to claim one announcement for this viewing/spending key pair.
pub fn try_match_announcement(
    viewing_priv: &Fq,
    spending_pub: &GrumpkinPoint,
    announcement: &StealthAnnouncement,
) -> Result<ScannedNote, NoteMatchError> {
    let ephemeral = GrumpkinPoint::from_compressed(&announcement.ephemeral_pub)
        .map_err(|_| NoteMatchError::Decode)?;

    let shared = ephemeral.mul(viewing_priv);
    if shared.is_identity() {
        return Err(NoteMatchError::Decode);
    }
    let shared_x = fr_to_be_bytes(&shared.x);

    let tweak = stealth_tweak(&shared_x);
    let candidate = spending_pub.add(&GrumpkinPoint::mul_generator(&tweak));

    let amount_sats = decrypt_amount(&announcement.encrypted_amount, &shared_x);
    let expected = note::commitment(&candidate.x, amount_sats)
        .map(|c| fr_to_be_bytes(&c))
        .map_err(|_| NoteMatchError::NotMine)?;
    // A wrong commitment is indistinguishable from "not addressed to us".
    if expected != announcement.commitment {
        return Err(NoteMatchError::NotMine);
    }

    Ok(ScannedNote {
        stealth_pub_x: fr_to_be_bytes(&candidate.x),
        amount_sats,
        leaf_index: announcement.leaf_index,
        ephemeral_pub: announcement.ephemeral_pub,
        commitment: announcement.commitment,
        shared_secret_x: shared_x,
    })
}

/// Scan announcements, yielding only confirmed notes. Idempotent: the same
/// inputs always produce the same set. Malformed or foreign entries are
/// skipped without error.
pub fn scan<'a>(
    viewing_priv: &Fq,
    spending_pub: &GrumpkinPoint,
    announcements: impl IntoIterator<Item = &'a StealthAnnouncement>,
) -> Vec<ScannedNote> {
    announcements
        .into_iter()
        .filter_map(|ann| try_match_announcement(viewing_priv, spending_pub, ann).ok())
        .collect()
}

/// Reconstruct the claim witness for a scanned note.
///
/// Recomputes the stealth private key from the spending key and the note's
/// shared secret, cross-checks it against the note's public key, and packs
/// the nullifier pair with the Merkle path.
pub fn reconstruct_claim_inputs(
    spending_priv: &Fq,
    note: &ScannedNote,
    path: MerklePath,
) -> Result<ClaimWitness, PoolError> {
    let tweak = stealth_tweak(&note.shared_secret_x);
    let stealth_priv = *spending_priv + tweak;

    let stealth_pub = GrumpkinPoint::mul_generator(&stealth_priv);
    if fr_to_be_bytes(&stealth_pub.x) != note.stealth_pub_x {
        return Err(PoolError::DecodeError);
    }
    if path.leaf_index != note.leaf_index {
        return Err(PoolError::DecodeError);
    }

    let nullifier = crate::note::nullifier(&stealth_priv, note.leaf_index)?;
    let nullifier_hash = crate::note::nullifier_hash(&nullifier)?;

    Ok(ClaimWitness {
        stealth_priv,
        nullifier: fr_to_be_bytes(&nullifier),
        nullifier_hash: fr_to_be_bytes(&nullifier_hash),
        amount_sats: note.amount_sats,
        path,
    })
}
