//! Challenge schedule and verification pipeline.
//!
//! The schedule reproduces the prover's transcript bit-exactly:
//!
//! 1. eta round: absorb `vk_hash || user public inputs || 16-limb preamble
//!    || w1 || w2 || w3`, squeeze once; eta is the 127-bit low half,
//!    eta_two/eta_three its square and cube.
//! 2. beta/gamma round: absorb `lrc || lrt || w4`, squeeze once, split.
//! 3. alpha round: absorb `li || zperm`, squeeze once; alphas are the power
//!    chain `alpha^1 .. alpha^27`.
//! 4. Gate challenges: one squeeze per challenge with nothing absorbed,
//!    keeping only the 127-bit low half of each.
//! 5. Sumcheck: per round absorb the 8 univariate evaluations, squeeze u_i.
//! 6. rho round: absorb the 41 entity evaluations, squeeze.
//! 7. Gemini r: absorb the `log_n - 1` fold commitments, squeeze.
//! 8. Shplonk nu: absorb the `log_n` Gemini evaluations, squeeze.
//! 9. Shplonk z: absorb the Shplonk Q commitment, squeeze.
//!
//! Verification then checks sumcheck round consistency and collapses the
//! batched opening claim into two pairing operands.

use ark_ff::{Field, One, Zero};

use shroud_crypto::fields::{fr_from_be_bytes, Fr};

use crate::bn254::{msm, pairing_check, G1Point, G2Point};
use crate::constants::{
    BARYCENTRIC_DENOMINATORS, BATCHED_RELATION_PARTIAL_LENGTH, NUMBER_OF_ALPHAS,
    NUMBER_OF_ENTITIES, NUM_WITNESS_COMMITMENTS, PAIRING_POINTS_SIZE, VK_NUM_COMMITMENTS,
};
use crate::error::VerifierError;
use crate::proof::ProofSlice;
use crate::transcript::{split_challenge, Transcript};
use crate::vk::VerificationKey;

/// Witness commitment index (transcript order) -> WIRE entity index.
const PROOF_G1_TO_ENTITY: [usize; NUM_WITNESS_COMMITMENTS] = [
    28, // w1   -> W_L
    29, // w2   -> W_R
    30, // w3   -> W_O
    34, // lrc  -> LOOKUP_READ_COUNTS
    35, // lrt  -> LOOKUP_READ_TAGS
    31, // w4   -> W_4
    33, // li   -> LOOKUP_INVERSES
    32, // zperm -> Z_PERM
];

/// Shifted entity -> index of its commitment in the MSM array
/// (`[vk 0..27, witness 0..7, folds..]`).
const SHIFTED_ENTITY_COMMITMENT: [(usize, usize); 5] = [
    (36, VK_NUM_COMMITMENTS),     // W_L_SHIFT   -> w1
    (37, VK_NUM_COMMITMENTS + 1), // W_R_SHIFT   -> w2
    (38, VK_NUM_COMMITMENTS + 2), // W_O_SHIFT   -> w3
    (39, VK_NUM_COMMITMENTS + 5), // W_4_SHIFT   -> w4
    (40, VK_NUM_COMMITMENTS + 7), // Z_PERM_SHIFT -> zperm
];

/// The complete Fiat-Shamir challenge set for one proof.
#[derive(Debug)]
pub struct Challenges {
    pub eta: Fr,
    pub eta_two: Fr,
    pub eta_three: Fr,
    pub beta: Fr,
    pub gamma: Fr,
    pub alphas: Vec<Fr>,
    pub gate_challenges: Vec<Fr>,
    pub sumcheck_u: Vec<Fr>,
    pub rho: Fr,
    pub gemini_r: Fr,
    pub shplonk_nu: Fr,
    pub shplonk_z: Fr,
}

/// The two pairing operands the proof collapses to. The pairing itself is
/// `e(lhs.0, lhs.1) * e(rhs.0, rhs.1) == 1`.
#[derive(Debug)]
pub struct PairingOperands {
    pub lhs: (G1Point, G2Point),
    pub rhs: (G1Point, G2Point),
}

/// Re-derive every challenge from the proof and public inputs.
pub fn derive_challenges(
    vk_hash: &[u8; 32],
    public_inputs: &[[u8; 32]],
    proof: &ProofSlice,
) -> Result<Challenges, VerifierError> {
    let log_n = proof.log_n;
    let mut t = Transcript::new();

    // Round 0: eta
    t.absorb_bytes(vk_hash);
    for pi in public_inputs {
        t.absorb_bytes(pi);
    }
    for i in 0..PAIRING_POINTS_SIZE {
        t.absorb_bytes(proof.preamble_fr(i));
    }
    t.absorb_g1(proof.witness_g1(0));
    t.absorb_g1(proof.witness_g1(1));
    t.absorb_g1(proof.witness_g1(2));
    let (eta, _) = split_challenge(&t.squeeze()?);
    let eta_two = eta * eta;
    let eta_three = eta_two * eta;

    // Round 1: beta and gamma from one squeeze
    t.absorb_g1(proof.witness_g1(3));
    t.absorb_g1(proof.witness_g1(4));
    t.absorb_g1(proof.witness_g1(5));
    let (beta, gamma) = split_challenge(&t.squeeze()?);

    // Round 2: alpha power chain
    t.absorb_g1(proof.witness_g1(6));
    t.absorb_g1(proof.witness_g1(7));
    let (alpha, _) = split_challenge(&t.squeeze()?);
    let mut alphas = Vec::with_capacity(NUMBER_OF_ALPHAS);
    alphas.push(alpha);
    for i in 1..NUMBER_OF_ALPHAS {
        alphas.push(alphas[i - 1] * alpha);
    }

    // Gate challenges: repeat-squeeze, nothing absorbed
    let mut gate_challenges = Vec::with_capacity(log_n);
    for _ in 0..log_n {
        let (gc, _) = split_challenge(&t.squeeze()?);
        gate_challenges.push(gc);
    }

    // Sumcheck rounds
    let mut sumcheck_u = Vec::with_capacity(log_n);
    for round in 0..log_n {
        for i in 0..BATCHED_RELATION_PARTIAL_LENGTH {
            t.absorb_bytes(proof.sumcheck_univariate(round, i));
        }
        let (u, _) = split_challenge(&t.squeeze()?);
        sumcheck_u.push(u);
    }

    // rho
    for i in 0..NUMBER_OF_ENTITIES {
        t.absorb_bytes(proof.sumcheck_evaluation(i));
    }
    let (rho, _) = split_challenge(&t.squeeze()?);

    // Gemini r
    for i in 0..(log_n - 1) {
        t.absorb_g1(proof.gemini_fold_comm(i));
    }
    let (gemini_r, _) = split_challenge(&t.squeeze()?);

    // Shplonk nu
    for i in 0..log_n {
        t.absorb_bytes(proof.gemini_a_evaluation(i));
    }
    let (shplonk_nu, _) = split_challenge(&t.squeeze()?);

    // Shplonk z
    t.absorb_g1(proof.shplonk_q());
    let (shplonk_z, _) = split_challenge(&t.squeeze()?);

    Ok(Challenges {
        eta,
        eta_two,
        eta_three,
        beta,
        gamma,
        alphas,
        gate_challenges,
        sumcheck_u,
        rho,
        gemini_r,
        shplonk_nu,
        shplonk_z,
    })
}

fn parse_fr(bytes: &[u8]) -> Result<Fr, VerifierError> {
    fr_from_be_bytes(bytes.try_into().map_err(|_| VerifierError::InvalidFieldElement)?)
        .map_err(|_| VerifierError::InvalidFieldElement)
}

/// Evaluate a degree-7 univariate (given by its evaluations on {0..7}) at
/// the challenge point, via the barycentric form with prefix/suffix
/// products so no per-point inversion is needed.
fn evaluate_univariate(
    evaluations: &[Fr; BATCHED_RELATION_PARTIAL_LENGTH],
    challenge: &Fr,
) -> Fr {
    let n = BATCHED_RELATION_PARTIAL_LENGTH;

    let mut x_minus_i = [Fr::zero(); BATCHED_RELATION_PARTIAL_LENGTH];
    for (i, slot) in x_minus_i.iter_mut().enumerate() {
        *slot = *challenge - Fr::from(i as u64);
    }
    // At a domain point the polynomial value is the tabulated one.
    for i in 0..n {
        if x_minus_i[i].is_zero() {
            return evaluations[i];
        }
    }

    let mut prefix = [Fr::one(); BATCHED_RELATION_PARTIAL_LENGTH + 1];
    for i in 0..n {
        prefix[i + 1] = prefix[i] * x_minus_i[i];
    }
    let mut suffix = [Fr::one(); BATCHED_RELATION_PARTIAL_LENGTH + 1];
    for i in (0..n).rev() {
        suffix[i] = suffix[i + 1] * x_minus_i[i];
    }

    let mut sum = Fr::zero();
    for i in 0..n {
        let d = BARYCENTRIC_DENOMINATORS[i];
        let denom = if d < 0 {
            -Fr::from((-d) as u64)
        } else {
            Fr::from(d as u64)
        };
        let inv = denom.inverse().expect("denominator is a small nonzero constant");
        sum += evaluations[i] * inv * prefix[i] * suffix[i + 1];
    }
    sum
}

/// Check every sumcheck round: `p(0) + p(1)` must equal the running target,
/// which starts at zero and folds through the barycentric evaluation at the
/// round challenge.
pub fn verify_sumcheck(proof: &ProofSlice, challenges: &Challenges) -> Result<(), VerifierError> {
    let mut target = Fr::zero();
    for round in 0..proof.log_n {
        let mut univariate = [Fr::zero(); BATCHED_RELATION_PARTIAL_LENGTH];
        for (i, slot) in univariate.iter_mut().enumerate() {
            *slot = parse_fr(proof.sumcheck_univariate(round, i))?;
        }
        if univariate[0] + univariate[1] != target {
            return Err(VerifierError::SumcheckRejected);
        }
        target = evaluate_univariate(&univariate, &challenges.sumcheck_u[round]);
    }
    Ok(())
}

/// `r^(2^l)` for `l = 0 .. n-1`.
fn gemini_r_squares(r: &Fr, n: usize) -> Vec<Fr> {
    let mut out = Vec::with_capacity(n);
    out.push(*r);
    for l in 1..n {
        let prev = out[l - 1];
        out.push(prev * prev);
    }
    out
}

fn invert(x: Fr) -> Result<Fr, VerifierError> {
    x.inverse().ok_or(VerifierError::ChallengeZero)
}

/// Montgomery batch inversion: one field inversion for the whole slice.
///
/// A zero anywhere in the input aborts; every denominator in the Shplemini
/// computation is challenge-derived, so a zero means a degenerate
/// challenge, not a valid proof.
fn batch_invert(values: &[Fr]) -> Result<Vec<Fr>, VerifierError> {
    let mut prefix_products = Vec::with_capacity(values.len());
    let mut running = Fr::one();
    for value in values {
        if value.is_zero() {
            return Err(VerifierError::ChallengeZero);
        }
        running *= value;
        prefix_products.push(running);
    }

    let mut inv_running = invert(running)?;
    let mut out = vec![Fr::zero(); values.len()];
    for i in (0..values.len()).rev() {
        out[i] = if i == 0 {
            inv_running
        } else {
            inv_running * prefix_products[i - 1]
        };
        inv_running *= values[i];
    }
    Ok(out)
}

/// Reconstruct the positive fold evaluations `A_l(r^(2^l))` from the
/// negative evaluations carried by the proof, walking levels top-down.
fn fold_pos_evaluations(
    batched_eval: &Fr,
    gemini_evals: &[Fr],
    r_squares: &[Fr],
    u_challenges: &[Fr],
    fold_recon_inv: &[Fr],
) -> Vec<Fr> {
    let log_n = r_squares.len();
    let two = Fr::from(2u64);
    let mut out = vec![Fr::zero(); log_n];
    let mut accumulator = *batched_eval;

    for l in (0..log_n).rev() {
        let cp = r_squares[l];
        let u = u_challenges[l];
        let eval_neg = gemini_evals[l];
        // numerator = cp * acc * 2 - evalNeg * (cp * (1 - u) - u)
        let bracket = cp * (Fr::one() - u) - u;
        let numerator = cp * accumulator * two - eval_neg * bracket;
        let value = numerator * fold_recon_inv[l];
        accumulator = value;
        out[l] = value;
    }
    out
}

/// Collapse the batched opening claim into the two pairing operands.
pub fn compute_pairing_operands(
    vk: &VerificationKey,
    proof: &ProofSlice,
    challenges: &Challenges,
) -> Result<PairingOperands, VerifierError> {
    let log_n = proof.log_n;
    let r = challenges.gemini_r;
    let nu = challenges.shplonk_nu;
    let z = challenges.shplonk_z;

    let r_squares = gemini_r_squares(&r, log_n);

    // Vanishing and fold-reconstruction denominators, inverted in one
    // batch: (z - r^2^l), (z + r^2^l), (r^2^l (1-u_l) + u_l), then r.
    let mut denominators = Vec::with_capacity(3 * log_n + 1);
    for l in 0..log_n {
        denominators.push(z - r_squares[l]);
    }
    for l in 0..log_n {
        denominators.push(z + r_squares[l]);
    }
    for l in 0..log_n {
        let u = challenges.sumcheck_u[l];
        denominators.push(r_squares[l] * (Fr::one() - u) + u);
    }
    denominators.push(r);

    let inverted = batch_invert(&denominators)?;
    let pos_inv = &inverted[0..log_n];
    let neg_inv = &inverted[log_n..2 * log_n];
    let fold_recon_inv = &inverted[2 * log_n..3 * log_n];
    let inv_r = inverted[3 * log_n];

    let unshifted_scalar = pos_inv[0] + nu * neg_inv[0];
    let shifted_scalar = inv_r * (pos_inv[0] - nu * neg_inv[0]);

    // batchedEval = sum(rho^i * eval_i)
    let mut batched_eval = Fr::zero();
    let mut rho_pow_running = Fr::one();
    for i in 0..NUMBER_OF_ENTITIES {
        let eval = parse_fr(proof.sumcheck_evaluation(i))?;
        batched_eval += rho_pow_running * eval;
        rho_pow_running *= challenges.rho;
    }

    let mut gemini_evals = Vec::with_capacity(log_n);
    for i in 0..log_n {
        gemini_evals.push(parse_fr(proof.gemini_a_evaluation(i))?);
    }

    let fold_pos = fold_pos_evaluations(
        &batched_eval,
        &gemini_evals,
        &r_squares,
        &challenges.sumcheck_u,
        &fold_recon_inv,
    );

    // Level 0 seeds the constant term; levels 1.. contribute a fold scalar
    // each, with the batching challenge advancing by nu^2 per level.
    let mut constant_term =
        fold_pos[0] * pos_inv[0] + gemini_evals[0] * nu * neg_inv[0];
    let nu_sq = nu * nu;
    let mut batching = nu_sq;
    let mut fold_scalars = Vec::with_capacity(log_n - 1);
    for l in 0..(log_n - 1) {
        let level = l + 1;
        let scale_pos = batching * pos_inv[level];
        let scale_neg = batching * nu * neg_inv[level];
        fold_scalars.push(-(scale_pos + scale_neg));
        constant_term += scale_pos * fold_pos[level] + scale_neg * gemini_evals[level];
        batching *= nu_sq;
    }

    // rho powers over all 41 entities
    let mut rho_pow = Vec::with_capacity(NUMBER_OF_ENTITIES);
    rho_pow.push(Fr::one());
    for k in 1..NUMBER_OF_ENTITIES {
        rho_pow.push(rho_pow[k - 1] * challenges.rho);
    }

    // Entity scalars, negated to move the claim to the other pairing side.
    let mut scalars = Vec::with_capacity(VK_NUM_COMMITMENTS + NUM_WITNESS_COMMITMENTS + log_n);
    for i in 0..VK_NUM_COMMITMENTS {
        scalars.push(-(rho_pow[i] * unshifted_scalar));
    }
    for entity in PROOF_G1_TO_ENTITY {
        scalars.push(-(rho_pow[entity] * unshifted_scalar));
    }
    scalars.extend_from_slice(&fold_scalars);
    for (entity, commitment_idx) in SHIFTED_ENTITY_COMMITMENT {
        scalars[commitment_idx] += -(rho_pow[entity] * shifted_scalar);
    }
    scalars.push(constant_term);

    // Matching commitment array: VK, witnesses, folds, generator.
    let mut commitments = Vec::with_capacity(scalars.len());
    commitments.extend_from_slice(&vk.commitments);
    for i in 0..NUM_WITNESS_COMMITMENTS {
        commitments.push(G1Point::from_affine_bytes(proof.witness_g1(i))?);
    }
    for i in 0..(log_n - 1) {
        commitments.push(G1Point::from_affine_bytes(proof.gemini_fold_comm(i))?);
    }
    commitments.push(G1Point::generator());

    let kzg_quotient = G1Point::from_affine_bytes(proof.kzg_quotient())?;
    if kzg_quotient.is_identity() {
        return Err(VerifierError::PointNotOnCurve);
    }
    let shplonk_q = G1Point::from_affine_bytes(proof.shplonk_q())?;

    let msm_result = msm(&commitments, &scalars)?;

    // P = shplonk_q + msm + z * kzg_quotient
    let p = shplonk_q
        .add(&msm_result)?
        .add(&kzg_quotient.mul(&z)?)?;

    Ok(PairingOperands {
        lhs: (p, G2Point::srs_generator()),
        rhs: (kzg_quotient.negate(), G2Point::srs_x()),
    })
}

/// Full verification: fingerprint gate, layout parse, challenge schedule,
/// sumcheck, pairing collapse, pairing check.
pub fn verify(
    vk: &VerificationKey,
    proof_bytes: &[u8],
    public_inputs: &[[u8; 32]],
    expected_fingerprint: &[u8; 32],
) -> Result<(), VerifierError> {
    let fingerprint = vk.fingerprint();
    if &fingerprint != expected_fingerprint {
        return Err(VerifierError::VkMismatch);
    }

    let proof = ProofSlice::new(proof_bytes, vk.log_n as usize)?;
    let challenges = derive_challenges(&fingerprint, public_inputs, &proof)?;
    verify_sumcheck(&proof, &challenges)?;

    let operands = compute_pairing_operands(vk, &proof, &challenges)?;
    if !pairing_check(&[operands.lhs, operands.rhs])? {
        return Err(VerifierError::PairingRejected);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proof::expected_len;

    const LOG_N: usize = 4;

    fn zero_proof() -> Vec<u8> {
        vec![0u8; expected_len(LOG_N)]
    }

    fn challenges_for(bytes: &[u8]) -> Challenges {
        let proof = ProofSlice::new(bytes, LOG_N).unwrap();
        derive_challenges(&[0x11; 32], &[[0x22; 32]], &proof).unwrap()
    }

    #[test]
    fn schedule_is_deterministic() {
        let bytes = zero_proof();
        let a = challenges_for(&bytes);
        let b = challenges_for(&bytes);
        assert_eq!(a.eta, b.eta);
        assert_eq!(a.beta, b.beta);
        assert_eq!(a.gamma, b.gamma);
        assert_eq!(a.sumcheck_u, b.sumcheck_u);
        assert_eq!(a.shplonk_z, b.shplonk_z);
    }

    #[test]
    fn schedule_has_expected_counts() {
        let bytes = zero_proof();
        let c = challenges_for(&bytes);
        assert_eq!(c.alphas.len(), NUMBER_OF_ALPHAS);
        assert_eq!(c.gate_challenges.len(), LOG_N);
        assert_eq!(c.sumcheck_u.len(), LOG_N);
    }

    #[test]
    fn public_inputs_move_every_challenge() {
        let bytes = zero_proof();
        let proof = ProofSlice::new(&bytes, LOG_N).unwrap();
        let a = derive_challenges(&[0x11; 32], &[[0x22; 32]], &proof).unwrap();
        let b = derive_challenges(&[0x11; 32], &[[0x23; 32]], &proof).unwrap();
        assert_ne!(a.eta, b.eta);
        assert_ne!(a.shplonk_z, b.shplonk_z);
    }

    #[test]
    fn vk_hash_moves_the_schedule() {
        let bytes = zero_proof();
        let proof = ProofSlice::new(&bytes, LOG_N).unwrap();
        let a = derive_challenges(&[0x11; 32], &[], &proof).unwrap();
        let b = derive_challenges(&[0x12; 32], &[], &proof).unwrap();
        assert_ne!(a.eta, b.eta);
    }

    #[test]
    fn eta_powers_chain() {
        let bytes = zero_proof();
        let c = challenges_for(&bytes);
        assert_eq!(c.eta_two, c.eta * c.eta);
        assert_eq!(c.eta_three, c.eta * c.eta * c.eta);
        assert_eq!(c.alphas[1], c.alphas[0] * c.alphas[0]);
    }

    #[test]
    fn sumcheck_accepts_consistent_rounds() {
        // All-zero univariates satisfy p(0) + p(1) == 0 in every round.
        let bytes = zero_proof();
        let proof = ProofSlice::new(&bytes, LOG_N).unwrap();
        let c = challenges_for(&bytes);
        verify_sumcheck(&proof, &c).unwrap();
    }

    #[test]
    fn sumcheck_rejects_inconsistent_round() {
        let mut bytes = zero_proof();
        let c = challenges_for(&bytes);
        // Poke the first univariate scalar of round 0: p(0) + p(1) != 0.
        let univ_start = 512 + 512;
        bytes[univ_start + 31] = 1;
        let proof = ProofSlice::new(&bytes, LOG_N).unwrap();
        assert_eq!(
            verify_sumcheck(&proof, &c),
            Err(VerifierError::SumcheckRejected)
        );
    }

    #[test]
    fn barycentric_hits_domain_points() {
        let mut evals = [Fr::zero(); BATCHED_RELATION_PARTIAL_LENGTH];
        for (i, e) in evals.iter_mut().enumerate() {
            *e = Fr::from((i * 10 + 7) as u64);
        }
        for i in 0..BATCHED_RELATION_PARTIAL_LENGTH {
            assert_eq!(evaluate_univariate(&evals, &Fr::from(i as u64)), evals[i]);
        }
    }

    #[test]
    fn barycentric_matches_lagrange_reference() {
        let mut evals = [Fr::zero(); BATCHED_RELATION_PARTIAL_LENGTH];
        for (i, e) in evals.iter_mut().enumerate() {
            *e = Fr::from((i * 7 + 3) as u64);
        }
        let x = Fr::from(42u64);
        let fast = evaluate_univariate(&evals, &x);

        let mut reference = Fr::zero();
        for i in 0..BATCHED_RELATION_PARTIAL_LENGTH {
            let mut numerator = Fr::one();
            let mut denominator = Fr::one();
            for j in 0..BATCHED_RELATION_PARTIAL_LENGTH {
                if j != i {
                    numerator *= x - Fr::from(j as u64);
                    denominator *= Fr::from(i as u64) - Fr::from(j as u64);
                }
            }
            reference += evals[i] * numerator * denominator.inverse().unwrap();
        }
        assert_eq!(fast, reference);
    }

    #[test]
    fn batch_invert_matches_individual_inverses() {
        let values: Vec<Fr> = (1..=9u64).map(Fr::from).collect();
        let inverted = batch_invert(&values).unwrap();
        for (value, inverse) in values.iter().zip(&inverted) {
            assert_eq!(*value * inverse, Fr::one());
        }
    }

    #[test]
    fn batch_invert_aborts_on_zero() {
        let values = [Fr::from(3u64), Fr::zero(), Fr::from(5u64)];
        assert_eq!(
            batch_invert(&values).unwrap_err(),
            VerifierError::ChallengeZero
        );
    }

    #[test]
    fn gemini_r_squares_chain() {
        let r = Fr::from(5u64);
        let squares = gemini_r_squares(&r, 4);
        assert_eq!(squares[0], Fr::from(5u64));
        assert_eq!(squares[1], Fr::from(25u64));
        assert_eq!(squares[2], Fr::from(625u64));
        assert_eq!(squares[3], Fr::from(390_625u64));
    }

    #[test]
    fn identity_kzg_quotient_is_rejected() {
        // A zero proof parses but carries identity commitments; the operand
        // computation must refuse the identity KZG quotient.
        let bytes = zero_proof();
        let proof = ProofSlice::new(&bytes, LOG_N).unwrap();
        let c = challenges_for(&bytes);

        let mut vk_bytes = vec![0u8; crate::constants::VK_AFFINE_SIZE];
        vk_bytes[31] = LOG_N as u8;
        let vk = VerificationKey::from_bytes(&vk_bytes).unwrap();

        assert_eq!(
            compute_pairing_operands(&vk, &proof, &c).unwrap_err(),
            VerifierError::PointNotOnCurve
        );
    }

    #[test]
    fn verify_rejects_wrong_fingerprint() {
        let mut vk_bytes = vec![0u8; crate::constants::VK_AFFINE_SIZE];
        vk_bytes[31] = LOG_N as u8;
        let vk = VerificationKey::from_bytes(&vk_bytes).unwrap();
        let bytes = zero_proof();
        assert_eq!(
            verify(&vk, &bytes, &[], &[0xab; 32]),
            Err(VerifierError::VkMismatch)
        );
    }

    #[test]
    fn verify_rejects_truncated_proof_before_transcript_work() {
        let mut vk_bytes = vec![0u8; crate::constants::VK_AFFINE_SIZE];
        vk_bytes[31] = LOG_N as u8;
        let vk = VerificationKey::from_bytes(&vk_bytes).unwrap();
        let fingerprint = vk.fingerprint();

        let bytes = zero_proof();
        let truncated = &bytes[..bytes.len() - 1];
        assert_eq!(
            verify(&vk, truncated, &[], &fingerprint),
            Err(VerifierError::ProofTooShort)
        );
    }
}
