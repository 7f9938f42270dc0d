//! Lyra2 memory-hard key derivation (v2 duplex construction)
//!
//! A BLAKE2b-round sponge fills an `n_rows × n_cols` matrix of 12-word
//! blocks, then wanders through it along a data-dependent path. The scratch
//! matrix belongs to the caller's worker context and is fully rewritten on
//! every call, so its previous contents never leak into a result.
//!
//! Row arithmetic is the generic (non power-of-two) form of the reference
//! LYRA2: `rowa = state[0] mod n_rows`, and the wandering row advances as
//! `(row + step) mod n_rows` on unsigned 64-bit values. For a power-of-two
//! row count this equals the masked form used by fixed 8×8 variants.
//!
//! Every row index except the wandering phase's `rowa` is the same for all
//! lanes. `rowa` comes from the sponge state, so in the lane-parallel form it
//! differs per lane: those blocks are gathered lane by lane and written back
//! lane by lane, in the same order the scalar path touches memory.

use crate::lanes::Lanes64;
use crate::params::{
    LYRA2_BLOCK_WORDS, LYRA2_FULL_ROUNDS, LYRA2_REDUCED_ROUNDS, LYRA2_SAFE_WORDS, MAX_LANES,
};

const BLOCK: usize = LYRA2_BLOCK_WORDS;

const BLAKE2B_IV: [u64; 8] = [
    0x6a09_e667_f3bc_c908,
    0xbb67_ae85_84ca_a73b,
    0x3c6e_f372_fe94_f82b,
    0xa54f_f53a_5f1d_36f1,
    0x510e_527f_ade6_82d1,
    0x9b05_688c_2b3e_6c1f,
    0x1f83_d9ab_fb41_bd6b,
    0x5be0_cd19_137e_2179,
];

/// Cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lyra2Params {
    /// Number of wandering passes
    pub t_cost: u64,
    pub n_rows: usize,
    pub n_cols: usize,
}

impl Lyra2Params {
    pub const fn new(t_cost: u64, n_rows: usize, n_cols: usize) -> Self {
        Self {
            t_cost,
            n_rows,
            n_cols,
        }
    }

    /// Words in one matrix row
    pub const fn row_words(&self) -> usize {
        self.n_cols * BLOCK
    }

    /// Lane words of scratch one call needs
    pub const fn scratch_words(&self) -> usize {
        self.n_rows * self.row_words()
    }
}

#[inline(always)]
fn g<L: Lanes64>(v: &mut [L; 16], a: usize, b: usize, c: usize, d: usize) {
    v[a] = v[a].add(v[b]);
    v[d] = v[d].xor(v[a]).rotr(32);
    v[c] = v[c].add(v[d]);
    v[b] = v[b].xor(v[c]).rotr(24);
    v[a] = v[a].add(v[b]);
    v[d] = v[d].xor(v[a]).rotr(16);
    v[c] = v[c].add(v[d]);
    v[b] = v[b].xor(v[c]).rotr(63);
}

/// BLAKE2b round function without message words
#[inline(always)]
fn permute<L: Lanes64>(v: &mut [L; 16], rounds: usize) {
    for _ in 0..rounds {
        g(v, 0, 4, 8, 12);
        g(v, 1, 5, 9, 13);
        g(v, 2, 6, 10, 14);
        g(v, 3, 7, 11, 15);
        g(v, 0, 5, 10, 15);
        g(v, 1, 6, 11, 12);
        g(v, 2, 7, 8, 13);
        g(v, 3, 4, 9, 14);
    }
}

struct Sponge<L> {
    state: [L; 16],
}

impl<L: Lanes64> Sponge<L> {
    fn new() -> Self {
        let mut state = [L::splat(0); 16];
        for (s, iv) in state[8..].iter_mut().zip(BLAKE2B_IV) {
            *s = L::splat(iv);
        }
        Self { state }
    }

    #[inline(always)]
    fn full(&mut self) {
        permute(&mut self.state, LYRA2_FULL_ROUNDS);
    }

    #[inline(always)]
    fn reduced(&mut self) {
        permute(&mut self.state, LYRA2_REDUCED_ROUNDS);
    }

    /// Row 0, written from the last column backwards
    fn squeeze_row0(&mut self, m: &mut [L], p: &Lyra2Params) {
        for col in (0..p.n_cols).rev() {
            m[col * BLOCK..][..BLOCK].copy_from_slice(&self.state[..BLOCK]);
            self.reduced();
        }
    }

    /// Row 1 from row 0, written backwards
    fn duplex_row1(&mut self, m: &mut [L], p: &Lyra2Params) {
        let row_len = p.row_words();
        for col in 0..p.n_cols {
            let input = col * BLOCK;
            for j in 0..BLOCK {
                self.state[j] = self.state[j].xor(m[input + j]);
            }
            self.reduced();
            let out = row_len + (p.n_cols - 1 - col) * BLOCK;
            for j in 0..BLOCK {
                m[out + j] = m[input + j].xor(self.state[j]);
            }
        }
    }

    /// Fill `row` from `prev` and `rowa`, feeding back into `rowa`
    fn duplex_row_setup(
        &mut self,
        m: &mut [L],
        p: &Lyra2Params,
        prev: usize,
        rowa: usize,
        row: usize,
    ) {
        let row_len = p.row_words();
        for col in 0..p.n_cols {
            let input = prev * row_len + col * BLOCK;
            let inout = rowa * row_len + col * BLOCK;
            let out = row * row_len + (p.n_cols - 1 - col) * BLOCK;

            let mut in_blk = [L::splat(0); BLOCK];
            in_blk.copy_from_slice(&m[input..input + BLOCK]);
            for j in 0..BLOCK {
                self.state[j] = self.state[j].xor(in_blk[j].add(m[inout + j]));
            }
            self.reduced();
            for j in 0..BLOCK {
                m[out + j] = in_blk[j].xor(self.state[j]);
            }
            for j in 0..BLOCK {
                m[inout + j] = m[inout + j].xor(self.state[(j + BLOCK - 1) % BLOCK]);
            }
        }
    }

    /// Pseudo-random row of every lane
    #[inline(always)]
    fn select_rows(&self, n_rows: usize) -> [usize; MAX_LANES] {
        let mut rows = [0usize; MAX_LANES];
        for (l, r) in rows.iter_mut().enumerate().take(L::LANES) {
            *r = (self.state[0].lane(l) % n_rows as u64) as usize;
        }
        rows
    }

    /// Wandering duplex: `out ^= state`, then `rowa ^= rot(state)`
    ///
    /// `rowa` holds one row per lane.
    fn duplex_row(
        &mut self,
        m: &mut [L],
        p: &Lyra2Params,
        prev: usize,
        rowa: &[usize; MAX_LANES],
        row: usize,
    ) {
        let row_len = p.row_words();
        let uniform = rowa[..L::LANES].iter().all(|&r| r == rowa[0]);

        for col in 0..p.n_cols {
            let input = prev * row_len + col * BLOCK;
            let out = row * row_len + col * BLOCK;

            let mut inout_blk = [L::splat(0); BLOCK];
            if uniform {
                let inout = rowa[0] * row_len + col * BLOCK;
                inout_blk.copy_from_slice(&m[inout..inout + BLOCK]);
            } else {
                for l in 0..L::LANES {
                    let inout = rowa[l] * row_len + col * BLOCK;
                    for j in 0..BLOCK {
                        inout_blk[j].set_lane(l, m[inout + j].lane(l));
                    }
                }
            }

            for j in 0..BLOCK {
                self.state[j] = self.state[j].xor(m[input + j].add(inout_blk[j]));
            }
            self.reduced();

            for j in 0..BLOCK {
                m[out + j] = m[out + j].xor(self.state[j]);
            }

            // Re-read after the output write: rowa may be row
            if uniform {
                let inout = rowa[0] * row_len + col * BLOCK;
                for j in 0..BLOCK {
                    m[inout + j] = m[inout + j].xor(self.state[(j + BLOCK - 1) % BLOCK]);
                }
            } else {
                for l in 0..L::LANES {
                    let inout = rowa[l] * row_len + col * BLOCK;
                    for j in 0..BLOCK {
                        let s = self.state[(j + BLOCK - 1) % BLOCK].lane(l);
                        let v = m[inout + j].lane(l) ^ s;
                        m[inout + j].set_lane(l, v);
                    }
                }
            }
        }
    }

    /// Absorb column 0 of each lane's row with the full permutation
    fn absorb_row(&mut self, m: &[L], p: &Lyra2Params, rowa: &[usize; MAX_LANES]) {
        let row_len = p.row_words();
        for l in 0..L::LANES {
            let base = rowa[l] * row_len;
            for j in 0..BLOCK {
                let v = self.state[j].lane(l) ^ m[base + j].lane(l);
                self.state[j].set_lane(l, v);
            }
        }
        self.full();
    }

    fn squeeze(&mut self, out: &mut [L]) {
        let mut chunks = out.chunks_mut(BLOCK).peekable();
        while let Some(chunk) = chunks.next() {
            chunk.copy_from_slice(&self.state[..chunk.len()]);
            if chunks.peek().is_some() {
                self.full();
            }
        }
    }
}

/// Derive `key.len()` words from `pwd` and `salt`
///
/// All buffers are word-interleaved lanes (`L = u64` for a single lane).
/// `scratch` must hold at least [`Lyra2Params::scratch_words`] words; its
/// contents on entry are irrelevant.
#[inline(always)]
pub fn lyra2<L: Lanes64>(
    key: &mut [L],
    pwd: &[L],
    salt: &[L],
    p: &Lyra2Params,
    scratch: &mut [L],
) {
    debug_assert!(p.n_rows >= 2 && p.n_cols >= 1);
    debug_assert!(scratch.len() >= p.scratch_words());
    let m = &mut scratch[..p.scratch_words()];
    let mut sponge = Sponge::<L>::new();

    // pwd || salt || basil || 0x80 .. 0x01, absorbed in 8-word blocks
    let basil = [
        (key.len() * 8) as u64,
        (pwd.len() * 8) as u64,
        (salt.len() * 8) as u64,
        p.t_cost,
        p.n_rows as u64,
        p.n_cols as u64,
    ];
    let tail_start = pwd.len() + salt.len() + basil.len();
    let n_blocks = tail_start / LYRA2_SAFE_WORDS + 1;
    let last = n_blocks * LYRA2_SAFE_WORDS - 1;
    let word = |i: usize| -> L {
        let mut w = if i < pwd.len() {
            pwd[i]
        } else if i < pwd.len() + salt.len() {
            salt[i - pwd.len()]
        } else if i < tail_start {
            L::splat(basil[i - pwd.len() - salt.len()])
        } else if i == tail_start {
            L::splat(0x80)
        } else {
            L::splat(0)
        };
        if i == last {
            w = w.xor(L::splat(0x01 << 56));
        }
        w
    };
    for b in 0..n_blocks {
        for j in 0..LYRA2_SAFE_WORDS {
            sponge.state[j] = sponge.state[j].xor(word(b * LYRA2_SAFE_WORDS + j));
        }
        sponge.full();
    }

    // Setup
    sponge.squeeze_row0(m, p);
    sponge.duplex_row1(m, p);

    let mut prev = 1usize;
    let mut rowa = 0usize;
    let mut step = 1usize;
    let mut window = 2usize;
    let mut gap: isize = 1;
    for row in 2..p.n_rows {
        sponge.duplex_row_setup(m, p, prev, rowa, row);
        rowa = (rowa + step) & (window - 1);
        prev = row;
        if rowa == 0 {
            step = window.wrapping_add_signed(gap);
            window *= 2;
            gap = -gap;
        }
    }

    // Wandering: `row + step` wraps in 64 bits before the modulo, so a step
    // of -1 from row 0 lands on (2^64 - 1) mod n_rows
    let n = p.n_rows as u64;
    let mut row = 0u64;
    let mut rowa = [rowa; MAX_LANES];
    for tau in 1..=p.t_cost {
        let step = if tau % 2 == 0 { u64::MAX } else { n / 2 - 1 };
        loop {
            rowa = sponge.select_rows(p.n_rows);
            sponge.duplex_row(m, p, prev, &rowa, row as usize);
            prev = row as usize;
            row = row.wrapping_add(step) % n;
            if row == 0 {
                break;
            }
        }
    }

    // Wrap-up
    sponge.absorb_row(m, p, &rowa);
    sponge.squeeze(key);
}
