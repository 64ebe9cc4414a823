//! Protocol constants for keccak non-ZK UltraHonk proofs.
//!
//! These match the barretenberg Solidity verifier (`bb.js { keccak: true }`
//! output). Changing any of them changes the proof layout and the challenge
//! schedule, so they are part of the wire contract.

/// Largest supported `log2(circuit_size)`. The deployed circuits sit well
/// below the barretenberg maximum of 28.
pub const MAX_LOG_CIRCUIT_SIZE: usize = 16;

/// Per-round sumcheck univariate length for non-ZK proofs.
pub const BATCHED_RELATION_PARTIAL_LENGTH: usize = 8;

/// Number of polynomial entities evaluated at the sumcheck point.
///
/// WIRE enum order (0-40):
///   0-13  selectors (q_m, q_c, q_l, q_r, q_o, q_4, q_lookup, q_arith,
///         q_range, q_elliptic, q_memory, q_nnf, q_pos2_ext, q_pos2_int)
///   14-17 sigma_1..4
///   18-21 id_1..4
///   22-25 table_1..4
///   26-27 lagrange_first, lagrange_last
///   28-35 w_l, w_r, w_o, w_4, z_perm, lookup_inverses,
///         lookup_read_counts, lookup_read_tags
///   36-40 shifted copies of w_l, w_r, w_o, w_4, z_perm
pub const NUMBER_OF_ENTITIES: usize = 41;

/// Relation separators derived from the alpha challenge.
pub const NUMBER_OF_ALPHAS: usize = 27;

/// G1 commitments carried by the verification key (WIRE entities 0-27).
pub const VK_NUM_COMMITMENTS: usize = 28;

/// Witness G1 commitments carried by the proof, in transcript order:
/// w1, w2, w3, lookup_read_counts, lookup_read_tags, w4,
/// lookup_inverses, z_perm.
pub const NUM_WITNESS_COMMITMENTS: usize = 8;

/// Pairing-accumulator preamble length in field elements. Zero in the
/// non-recursive case but always present and always absorbed verbatim.
pub const PAIRING_POINTS_SIZE: usize = 16;

/// Field element width on the wire.
pub const SCALAR_SIZE: usize = 32;

/// Affine G1 width on the wire (`x_be || y_be`).
pub const G1_AFFINE_SIZE: usize = 64;

/// Split-coordinate G1 width used by the bb.js VK export
/// (each coordinate as a 136-bit low limb and a high limb).
pub const G1_SPLIT_SIZE: usize = 128;

/// VK metadata: circuit size, public-input count, public-input offset,
/// each as a right-aligned 32-byte big-endian word.
pub const VK_METADATA_SIZE: usize = 3 * SCALAR_SIZE;

/// Canonical affine VK length: 96-byte metadata + 28 affine points.
pub const VK_AFFINE_SIZE: usize = VK_METADATA_SIZE + VK_NUM_COMMITMENTS * G1_AFFINE_SIZE;

/// Split-format VK length exported by bb.js.
pub const VK_SPLIT_SIZE: usize = VK_METADATA_SIZE + VK_NUM_COMMITMENTS * G1_SPLIT_SIZE;

/// Barycentric denominators for the sumcheck evaluation domain {0..7}:
/// `d_i = prod_{j != i}(i - j) = (-1)^(7-i) * i! * (7-i)!`.
/// Stored as signed integers; the verifier lifts them into the field.
pub const BARYCENTRIC_DENOMINATORS: [i64; BATCHED_RELATION_PARTIAL_LENGTH] =
    [-5040, 720, -240, 144, -144, 240, -720, 5040];

/// SRS G2 generator `[1]_2` (EIP-197 layout: x.c1, x.c0, y.c1, y.c0).
pub const SRS_G2_GENERATOR: [u8; 128] = [
    // x.c1
    0x19, 0x8e, 0x93, 0x93, 0x92, 0x0d, 0x48, 0x3a, 0x72, 0x60, 0xbf, 0xb7, 0x31, 0xfb, 0x5d,
    0x25, 0xf1, 0xaa, 0x49, 0x33, 0x35, 0xa9, 0xe7, 0x12, 0x97, 0xe4, 0x85, 0xb7, 0xae, 0xf3,
    0x12, 0xc2,
    // x.c0
    0x18, 0x00, 0xde, 0xef, 0x12, 0x1f, 0x1e, 0x76, 0x42, 0x6a, 0x00, 0x66, 0x5e, 0x5c, 0x44,
    0x79, 0x67, 0x43, 0x22, 0xd4, 0xf7, 0x5e, 0xda, 0xdd, 0x46, 0xde, 0xbd, 0x5c, 0xd9, 0x92,
    0xf6, 0xed,
    // y.c1
    0x09, 0x06, 0x89, 0xd0, 0x58, 0x5f, 0xf0, 0x75, 0xec, 0x9e, 0x99, 0xad, 0x69, 0x0c, 0x33,
    0x95, 0xbc, 0x4b, 0x31, 0x33, 0x70, 0xb3, 0x8e, 0xf3, 0x55, 0xac, 0xda, 0xdc, 0xd1, 0x22,
    0x97, 0x5b,
    // y.c0
    0x12, 0xc8, 0x5e, 0xa5, 0xdb, 0x8c, 0x6d, 0xeb, 0x4a, 0xab, 0x71, 0x80, 0x8d, 0xcb, 0x40,
    0x8f, 0xe3, 0xd1, 0xe7, 0x69, 0x0c, 0x43, 0xd3, 0x7b, 0x4c, 0xe6, 0xcc, 0x01, 0x66, 0xfa,
    0x7d, 0xaa,
];

/// SRS `[x]_2` from the Aztec Ignition ceremony (EIP-197 layout).
pub const SRS_G2_X: [u8; 128] = [
    // x.c1
    0x26, 0x0e, 0x01, 0xb2, 0x51, 0xf6, 0xf1, 0xc7, 0xe7, 0xff, 0x4e, 0x58, 0x07, 0x91, 0xde,
    0xe8, 0xea, 0x51, 0xd8, 0x7a, 0x35, 0x8e, 0x03, 0x8b, 0x4e, 0xfe, 0x30, 0xfa, 0xc0, 0x93,
    0x83, 0xc1,
    // x.c0
    0x01, 0x18, 0xc4, 0xd5, 0xb8, 0x37, 0xbc, 0xc2, 0xbc, 0x89, 0xb5, 0xb3, 0x98, 0xb5, 0x97,
    0x4e, 0x9f, 0x59, 0x44, 0x07, 0x3b, 0x32, 0x07, 0x8b, 0x7e, 0x23, 0x1f, 0xec, 0x93, 0x88,
    0x83, 0xb0,
    // y.c1
    0x04, 0xfc, 0x63, 0x69, 0xf7, 0x11, 0x0f, 0xe3, 0xd2, 0x51, 0x56, 0xc1, 0xbb, 0x9a, 0x72,
    0x85, 0x9c, 0xf2, 0xa0, 0x46, 0x41, 0xf9, 0x9b, 0xa4, 0xee, 0x41, 0x3c, 0x80, 0xda, 0x6a,
    0x5f, 0xe4,
    // y.c0
    0x22, 0xfe, 0xbd, 0xa3, 0xc0, 0xc0, 0x63, 0x2a, 0x56, 0x47, 0x5b, 0x42, 0x14, 0xe5, 0x61,
    0x5e, 0x11, 0xe6, 0xdd, 0x3f, 0x96, 0xe6, 0xce, 0xa2, 0x85, 0x4a, 0x87, 0xd4, 0xda, 0xcc,
    0x5e, 0x55,
];
