//! Byte-tagged instruction codec.
//!
//! Every request starts with a one-byte discriminator, followed by the
//! operation's fixed-width fields in public-input order, followed by the
//! proof: either inline (`0x00 || len_le_u32 || bytes`) or a 32-byte handle
//! into the external upload buffer (`0x01 || handle`).
//!
//! Trailing bytes are rejected; an instruction parses to exactly one
//! operation or fails with `BadEncoding`.

use crate::engine::{AnnouncementData, Effects, Engine, Operation};
use crate::error::PoolError;
use crate::stealth::META_ADDRESS_BYTES;
use crate::verify::{CircuitKind, Clock, ProofBuffers, ProofVerifier, TokenVault};

/// Instruction discriminators. The gaps belong to operations handled by
/// external collaborators (SPV deposit verification, name registry).
pub mod opcode {
    pub const INITIALIZE: u8 = 0;
    pub const SPLIT: u8 = 4;
    pub const REQUEST_REDEMPTION: u8 = 5;
    pub const SET_PAUSED: u8 = 7;
    pub const CLAIM: u8 = 9;
    pub const SPEND_PARTIAL_PUBLIC: u8 = 10;
    pub const ADD_DEMO_NOTE: u8 = 21;
    pub const ADD_DEMO_STEALTH: u8 = 22;
    pub const POOL_DEPOSIT: u8 = 31;
    pub const POOL_WITHDRAW: u8 = 32;
    pub const POOL_CLAIM_YIELD: u8 = 33;
}

const PROOF_INLINE: u8 = 0;
const PROOF_HANDLE: u8 = 1;

/// Largest accepted inline proof. Generous versus the real layout bound.
const MAX_PROOF_LEN: usize = 64 * 1024;

struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], PoolError> {
        let end = self.offset.checked_add(len).ok_or(PoolError::BadEncoding)?;
        if end > self.data.len() {
            return Err(PoolError::BadEncoding);
        }
        let slice = &self.data[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, PoolError> {
        Ok(self.take(1)?[0])
    }

    fn read_u64_le(&mut self) -> Result<u64, PoolError> {
        Ok(u64::from_le_bytes(self.take(8)?.try_into().expect("fixed width")))
    }

    fn read_u32_le(&mut self) -> Result<u32, PoolError> {
        Ok(u32::from_le_bytes(self.take(4)?.try_into().expect("fixed width")))
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], PoolError> {
        Ok(self.take(N)?.try_into().expect("fixed width"))
    }

    fn read_announcement(&mut self) -> Result<AnnouncementData, PoolError> {
        Ok(AnnouncementData {
            ephemeral_pub: self.read_array::<33>()?,
            encrypted_amount: self.read_array::<8>()?,
        })
    }

    /// Inline bytes or a resolved handle.
    fn read_proof(&mut self, buffers: &dyn ProofBuffers) -> Result<Vec<u8>, PoolError> {
        match self.read_u8()? {
            PROOF_INLINE => {
                let len = self.read_u32_le()? as usize;
                if len > MAX_PROOF_LEN {
                    return Err(PoolError::BadEncoding);
                }
                Ok(self.take(len)?.to_vec())
            }
            PROOF_HANDLE => {
                let handle = self.read_array::<32>()?;
                buffers
                    .resolve(&handle)
                    .map(|bytes| bytes.to_vec())
                    .ok_or(PoolError::BadEncoding)
            }
            _ => Err(PoolError::BadEncoding),
        }
    }

    fn finish(self) -> Result<(), PoolError> {
        if self.offset != self.data.len() {
            return Err(PoolError::BadEncoding);
        }
        Ok(())
    }
}

/// Decode a request buffer into an operation.
pub fn decode_instruction(
    data: &[u8],
    buffers: &dyn ProofBuffers,
) -> Result<Operation, PoolError> {
    let (&tag, rest) = data.split_first().ok_or(PoolError::BadEncoding)?;
    let mut r = Reader::new(rest);

    let operation = match tag {
        opcode::INITIALIZE => {
            let authority = r.read_array::<32>()?;
            let token_mint = r.read_array::<32>()?;
            let vault = r.read_array::<32>()?;
            let min_deposit = r.read_u64_le()?;
            let max_deposit = r.read_u64_le()?;
            let count = r.read_u8()? as usize;
            let mut vk_fingerprints = Vec::with_capacity(count);
            for _ in 0..count {
                let circuit =
                    CircuitKind::from_u8(r.read_u8()?).ok_or(PoolError::BadEncoding)?;
                vk_fingerprints.push((circuit, r.read_array::<32>()?));
            }
            Operation::Initialize {
                authority,
                token_mint,
                vault,
                min_deposit,
                max_deposit,
                vk_fingerprints,
            }
        }
        opcode::SET_PAUSED => Operation::SetPaused {
            authority: r.read_array::<32>()?,
            paused: r.read_u8()? != 0,
        },
        opcode::ADD_DEMO_NOTE => Operation::AddDemoNote {
            authority: r.read_array::<32>()?,
            secret_seed: r.read_array::<32>()?,
        },
        opcode::ADD_DEMO_STEALTH => Operation::AddDemoStealth {
            authority: r.read_array::<32>()?,
            meta_address: r.read_array::<META_ADDRESS_BYTES>()?,
            amount_sats: r.read_u64_le()?,
        },
        opcode::CLAIM => {
            let root = r.read_array::<32>()?;
            let nullifier_hash = r.read_array::<32>()?;
            let amount_sats = r.read_u64_le()?;
            let recipient = r.read_array::<32>()?;
            let proof = r.read_proof(buffers)?;
            Operation::Claim {
                proof,
                root,
                nullifier_hash,
                amount_sats,
                recipient,
            }
        }
        opcode::SPLIT => {
            let root = r.read_array::<32>()?;
            let nullifier_hash = r.read_array::<32>()?;
            let output_commitment_1 = r.read_array::<32>()?;
            let output_commitment_2 = r.read_array::<32>()?;
            let announcement_1 = r.read_announcement()?;
            let announcement_2 = r.read_announcement()?;
            let proof = r.read_proof(buffers)?;
            Operation::Split {
                proof,
                root,
                nullifier_hash,
                output_commitment_1,
                output_commitment_2,
                announcement_1,
                announcement_2,
            }
        }
        opcode::SPEND_PARTIAL_PUBLIC => {
            let root = r.read_array::<32>()?;
            let nullifier_hash = r.read_array::<32>()?;
            let public_amount = r.read_u64_le()?;
            let change_commitment = r.read_array::<32>()?;
            let recipient = r.read_array::<32>()?;
            let change_announcement = r.read_announcement()?;
            let proof = r.read_proof(buffers)?;
            Operation::SpendPartialPublic {
                proof,
                root,
                nullifier_hash,
                public_amount,
                change_commitment,
                recipient,
                change_announcement,
            }
        }
        opcode::REQUEST_REDEMPTION => {
            let root = r.read_array::<32>()?;
            let nullifier_hash = r.read_array::<32>()?;
            let amount_sats = r.read_u64_le()?;
            let addr_len = r.read_u8()? as usize;
            let addr_bytes = r.take(addr_len)?;
            let btc_address =
                String::from_utf8(addr_bytes.to_vec()).map_err(|_| PoolError::BadEncoding)?;
            let proof = r.read_proof(buffers)?;
            Operation::RequestRedemption {
                proof,
                root,
                nullifier_hash,
                amount_sats,
                btc_address,
            }
        }
        opcode::POOL_DEPOSIT => {
            let root = r.read_array::<32>()?;
            let nullifier_hash = r.read_array::<32>()?;
            let pool_commitment = r.read_array::<32>()?;
            let amount_sats = r.read_u64_le()?;
            let proof = r.read_proof(buffers)?;
            Operation::PoolDeposit {
                proof,
                root,
                nullifier_hash,
                pool_commitment,
                amount_sats,
            }
        }
        opcode::POOL_WITHDRAW => {
            let pool_root = r.read_array::<32>()?;
            let pool_nullifier_hash = r.read_array::<32>()?;
            let amount_sats = r.read_u64_le()?;
            let output_commitment = r.read_array::<32>()?;
            let output_announcement = r.read_announcement()?;
            let proof = r.read_proof(buffers)?;
            Operation::PoolWithdraw {
                proof,
                pool_root,
                pool_nullifier_hash,
                amount_sats,
                output_commitment,
                output_announcement,
            }
        }
        opcode::POOL_CLAIM_YIELD => {
            let pool_root = r.read_array::<32>()?;
            let pool_nullifier_hash = r.read_array::<32>()?;
            let new_pool_commitment = r.read_array::<32>()?;
            let yield_amount = r.read_u64_le()?;
            let recipient = r.read_array::<32>()?;
            let proof = r.read_proof(buffers)?;
            Operation::PoolClaimYield {
                proof,
                pool_root,
                pool_nullifier_hash,
                new_pool_commitment,
                yield_amount,
                recipient,
            }
        }
        _ => return Err(PoolError::BadEncoding),
    };

    r.finish()?;
    Ok(operation)
}

/// Encode an operation back into request bytes (inline proof form).
/// Wallet-side helper; `decode_instruction(encode_instruction(op))` is the
/// identity on the operation.
pub fn encode_instruction(operation: &Operation) -> Vec<u8> {
    let mut out = Vec::with_capacity(256);

    fn push_proof(out: &mut Vec<u8>, proof: &[u8]) {
        out.push(PROOF_INLINE);
        out.extend_from_slice(&(proof.len() as u32).to_le_bytes());
        out.extend_from_slice(proof);
    }

    fn push_announcement(out: &mut Vec<u8>, ann: &AnnouncementData) {
        out.extend_from_slice(&ann.ephemeral_pub);
        out.extend_from_slice(&ann.encrypted_amount);
    }

    match operation {
        Operation::Initialize {
            authority,
            token_mint,
            vault,
            min_deposit,
            max_deposit,
            vk_fingerprints,
        } => {
            out.push(opcode::INITIALIZE);
            out.extend_from_slice(authority);
            out.extend_from_slice(token_mint);
            out.extend_from_slice(vault);
            out.extend_from_slice(&min_deposit.to_le_bytes());
            out.extend_from_slice(&max_deposit.to_le_bytes());
            out.push(vk_fingerprints.len() as u8);
            for (circuit, fingerprint) in vk_fingerprints {
                out.push(circuit.as_u8());
                out.extend_from_slice(fingerprint);
            }
        }
        Operation::SetPaused { authority, paused } => {
            out.push(opcode::SET_PAUSED);
            out.extend_from_slice(authority);
            out.push(u8::from(*paused));
        }
        Operation::AddDemoNote {
            authority,
            secret_seed,
        } => {
            out.push(opcode::ADD_DEMO_NOTE);
            out.extend_from_slice(authority);
            out.extend_from_slice(secret_seed);
        }
        Operation::AddDemoStealth {
            authority,
            meta_address,
            amount_sats,
        } => {
            out.push(opcode::ADD_DEMO_STEALTH);
            out.extend_from_slice(authority);
            out.extend_from_slice(meta_address);
            out.extend_from_slice(&amount_sats.to_le_bytes());
        }
        Operation::Claim {
            proof,
            root,
            nullifier_hash,
            amount_sats,
            recipient,
        } => {
            out.push(opcode::CLAIM);
            out.extend_from_slice(root);
            out.extend_from_slice(nullifier_hash);
            out.extend_from_slice(&amount_sats.to_le_bytes());
            out.extend_from_slice(recipient);
            push_proof(&mut out, proof);
        }
        Operation::Split {
            proof,
            root,
            nullifier_hash,
            output_commitment_1,
            output_commitment_2,
            announcement_1,
            announcement_2,
        } => {
            out.push(opcode::SPLIT);
            out.extend_from_slice(root);
            out.extend_from_slice(nullifier_hash);
            out.extend_from_slice(output_commitment_1);
            out.extend_from_slice(output_commitment_2);
            push_announcement(&mut out, announcement_1);
            push_announcement(&mut out, announcement_2);
            push_proof(&mut out, proof);
        }
        Operation::SpendPartialPublic {
            proof,
            root,
            nullifier_hash,
            public_amount,
            change_commitment,
            recipient,
            change_announcement,
        } => {
            out.push(opcode::SPEND_PARTIAL_PUBLIC);
            out.extend_from_slice(root);
            out.extend_from_slice(nullifier_hash);
            out.extend_from_slice(&public_amount.to_le_bytes());
            out.extend_from_slice(change_commitment);
            out.extend_from_slice(recipient);
            push_announcement(&mut out, change_announcement);
            push_proof(&mut out, proof);
        }
        Operation::RequestRedemption {
            proof,
            root,
            nullifier_hash,
            amount_sats,
            btc_address,
        } => {
            out.push(opcode::REQUEST_REDEMPTION);
            out.extend_from_slice(root);
            out.extend_from_slice(nullifier_hash);
            out.extend_from_slice(&amount_sats.to_le_bytes());
            out.push(btc_address.len() as u8);
            out.extend_from_slice(btc_address.as_bytes());
            push_proof(&mut out, proof);
        }
        Operation::PoolDeposit {
            proof,
            root,
            nullifier_hash,
            pool_commitment,
            amount_sats,
        } => {
            out.push(opcode::POOL_DEPOSIT);
            out.extend_from_slice(root);
            out.extend_from_slice(nullifier_hash);
            out.extend_from_slice(pool_commitment);
            out.extend_from_slice(&amount_sats.to_le_bytes());
            push_proof(&mut out, proof);
        }
        Operation::PoolWithdraw {
            proof,
            pool_root,
            pool_nullifier_hash,
            amount_sats,
            output_commitment,
            output_announcement,
        } => {
            out.push(opcode::POOL_WITHDRAW);
            out.extend_from_slice(pool_root);
            out.extend_from_slice(pool_nullifier_hash);
            out.extend_from_slice(&amount_sats.to_le_bytes());
            out.extend_from_slice(output_commitment);
            push_announcement(&mut out, output_announcement);
            push_proof(&mut out, proof);
        }
        Operation::PoolClaimYield {
            proof,
            pool_root,
            pool_nullifier_hash,
            new_pool_commitment,
            yield_amount,
            recipient,
        } => {
            out.push(opcode::POOL_CLAIM_YIELD);
            out.extend_from_slice(pool_root);
            out.extend_from_slice(pool_nullifier_hash);
            out.extend_from_slice(new_pool_commitment);
            out.extend_from_slice(&yield_amount.to_le_bytes());
            out.extend_from_slice(recipient);
            push_proof(&mut out, proof);
        }
    }
    out
}

impl<V: ProofVerifier, T: TokenVault, C: Clock> Engine<V, T, C> {
    /// Decode a request buffer and apply it in one step.
    pub fn handle_instruction(
        &mut self,
        data: &[u8],
        buffers: &dyn ProofBuffers,
    ) -> Result<Effects, PoolError> {
        let operation = decode_instruction(data, buffers)?;
        self.apply(operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::{MemoryBuffers, NoBuffers};

    fn claim_op() -> Operation {
        Operation::Claim {
            proof: vec![0xaa; 64],
            root: [1u8; 32],
            nullifier_hash: [2u8; 32],
            amount_sats: 10_000,
            recipient: [3u8; 32],
        }
    }

    #[test]
    fn claim_roundtrip() {
        let bytes = encode_instruction(&claim_op());
        assert_eq!(bytes[0], opcode::CLAIM);
        let decoded = decode_instruction(&bytes, &NoBuffers).unwrap();
        match decoded {
            Operation::Claim {
                proof,
                root,
                nullifier_hash,
                amount_sats,
                recipient,
            } => {
                assert_eq!(proof, vec![0xaa; 64]);
                assert_eq!(root, [1u8; 32]);
                assert_eq!(nullifier_hash, [2u8; 32]);
                assert_eq!(amount_sats, 10_000);
                assert_eq!(recipient, [3u8; 32]);
            }
            other => panic!("wrong operation: {other:?}"),
        }
    }

    #[test]
    fn split_roundtrip() {
        let op = Operation::Split {
            proof: vec![0xbb; 32],
            root: [1u8; 32],
            nullifier_hash: [2u8; 32],
            output_commitment_1: [3u8; 32],
            output_commitment_2: [4u8; 32],
            announcement_1: AnnouncementData {
                ephemeral_pub: [5u8; 33],
                encrypted_amount: [6u8; 8],
            },
            announcement_2: AnnouncementData {
                ephemeral_pub: [7u8; 33],
                encrypted_amount: [8u8; 8],
            },
        };
        let bytes = encode_instruction(&op);
        let decoded = decode_instruction(&bytes, &NoBuffers).unwrap();
        match decoded {
            Operation::Split {
                announcement_1,
                announcement_2,
                ..
            } => {
                assert_eq!(announcement_1.ephemeral_pub, [5u8; 33]);
                assert_eq!(announcement_2.encrypted_amount, [8u8; 8]);
            }
            other => panic!("wrong operation: {other:?}"),
        }
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut bytes = encode_instruction(&claim_op());
        bytes.push(0);
        assert_eq!(
            decode_instruction(&bytes, &NoBuffers),
            Err(PoolError::BadEncoding)
        );
    }

    #[test]
    fn truncated_instruction_is_rejected() {
        let bytes = encode_instruction(&claim_op());
        assert_eq!(
            decode_instruction(&bytes[..bytes.len() - 3], &NoBuffers),
            Err(PoolError::BadEncoding)
        );
    }

    #[test]
    fn unknown_discriminator_is_rejected() {
        assert_eq!(
            decode_instruction(&[99u8, 0, 0], &NoBuffers),
            Err(PoolError::BadEncoding)
        );
        assert_eq!(decode_instruction(&[], &NoBuffers), Err(PoolError::BadEncoding));
    }

    #[test]
    fn proof_by_handle_resolves_through_buffers() {
        let mut bytes = vec![opcode::CLAIM];
        bytes.extend_from_slice(&[1u8; 32]);
        bytes.extend_from_slice(&[2u8; 32]);
        bytes.extend_from_slice(&10_000u64.to_le_bytes());
        bytes.extend_from_slice(&[3u8; 32]);
        bytes.push(1); // handle form
        bytes.extend_from_slice(&[9u8; 32]);

        let mut buffers = MemoryBuffers::new();
        buffers.upload([9u8; 32], vec![0xcc; 16]);
        match decode_instruction(&bytes, &buffers).unwrap() {
            Operation::Claim { proof, .. } => assert_eq!(proof, vec![0xcc; 16]),
            other => panic!("wrong operation: {other:?}"),
        }

        // Unknown handle fails.
        assert_eq!(
            decode_instruction(&bytes, &NoBuffers),
            Err(PoolError::BadEncoding)
        );
    }

    #[test]
    fn initialize_roundtrip_with_fingerprints() {
        let op = Operation::Initialize {
            authority: [1u8; 32],
            token_mint: [2u8; 32],
            vault: [3u8; 32],
            min_deposit: 1_000,
            max_deposit: 1_000_000,
            vk_fingerprints: vec![
                (CircuitKind::Claim, [4u8; 32]),
                (CircuitKind::Split, [5u8; 32]),
            ],
        };
        let bytes = encode_instruction(&op);
        match decode_instruction(&bytes, &NoBuffers).unwrap() {
            Operation::Initialize {
                vk_fingerprints, ..
            } => {
                assert_eq!(vk_fingerprints.len(), 2);
                assert_eq!(vk_fingerprints[0], (CircuitKind::Claim, [4u8; 32]));
            }
            other => panic!("wrong operation: {other:?}"),
        }
    }
}
