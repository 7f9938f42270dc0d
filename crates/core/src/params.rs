//! Engine-wide constants
//!
//! Header layout, digest widths and the Lyra2 sponge geometry shared by the
//! scalar and lane-parallel paths.

/// Serialized block header size in bytes
pub const HEADER_SIZE: usize = 80;

/// Header size in 32-bit words
pub const HEADER_WORDS: usize = HEADER_SIZE / 4;

/// Index of the nonce word inside the header
pub const NONCE_WORD: usize = 19;

/// Byte offset of the nonce inside the serialized header
pub const NONCE_OFFSET: usize = NONCE_WORD * 4;

/// Intermediate digest width carried between chain stages
pub const WIDE_DIGEST: usize = 64;

/// Final digest width handed to the target comparison
pub const FINAL_DIGEST: usize = 32;

/// Target size in 32-bit words
pub const TARGET_WORDS: usize = 8;

/// Widest lane count any tier uses
pub const MAX_LANES: usize = 8;

/// Lyra2 sponge block (bitrate) in 64-bit words
pub const LYRA2_BLOCK_WORDS: usize = 12;

/// Lyra2 absorb block used for the password/salt/basil input, in words
pub const LYRA2_SAFE_WORDS: usize = 8;

/// Lyra2 absorb block in bytes
pub const LYRA2_SAFE_BYTES: usize = LYRA2_SAFE_WORDS * 8;

/// BLAKE2b rounds of the full sponge permutation
pub const LYRA2_FULL_ROUNDS: usize = 12;

/// BLAKE2b rounds of the reduced permutation used while filling rows
pub const LYRA2_REDUCED_ROUNDS: usize = 1;

/// Bytes of the widened digest fed to Lyra2 as password and as salt
pub const LYRA2_INPUT_LEN: usize = 80;
