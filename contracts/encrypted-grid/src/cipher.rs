//! Homomorphic building blocks for the move protocol.
//!
//! Every conditional over secret data is expressed as
//! `select(cond, if_true, if_false)`; control flow never branches on an
//! encrypted value. These helpers are pure compositions of the algebra
//! provider's primitives and hold no state of their own.

use soroban_sdk::BytesN;

use crate::CipherAlgebraClient;

/// Direction wire codes carried inside the encrypted direction input.
pub const DIR_UP: u32 = 0;
pub const DIR_DOWN: u32 = 1;
pub const DIR_LEFT: u32 = 2;
pub const DIR_RIGHT: u32 = 3;

// Additive complement of 1 mod 2^32; adding it realizes an encrypted
// decrement without a signed ciphertext type.
const MINUS_ONE: u32 = u32::MAX;

/// Grid bounds lifted into ciphertext space for one move computation.
pub struct GridBounds {
    pub min: BytesN<32>,
    pub max: BytesN<32>,
}

impl GridBounds {
    pub fn trivial(algebra: &CipherAlgebraClient, min: u32, max: u32) -> Self {
        GridBounds {
            min: algebra.trivial_encrypt(&min),
            max: algebra.trivial_encrypt(&max),
        }
    }
}

/// Decomposes an encrypted direction code into encrypted unit deltas
/// `(dx, dy)`.
///
/// Exactly one delta is nonzero for the four known codes. Any other code
/// yields `(0, 0)`, turning the move into a stationary step.
pub fn direction_deltas(
    algebra: &CipherAlgebraClient,
    enc_dir: &BytesN<32>,
) -> (BytesN<32>, BytesN<32>) {
    let zero = algebra.trivial_encrypt(&0);
    let plus_one = algebra.trivial_encrypt(&1);
    let minus_one = algebra.trivial_encrypt(&MINUS_ONE);

    let is_up = algebra.eq(enc_dir, &algebra.trivial_encrypt(&DIR_UP));
    let is_down = algebra.eq(enc_dir, &algebra.trivial_encrypt(&DIR_DOWN));
    let is_left = algebra.eq(enc_dir, &algebra.trivial_encrypt(&DIR_LEFT));
    let is_right = algebra.eq(enc_dir, &algebra.trivial_encrypt(&DIR_RIGHT));

    let dx = algebra.select(
        &is_left,
        &minus_one,
        &algebra.select(&is_right, &plus_one, &zero),
    );
    let dy = algebra.select(
        &is_up,
        &plus_one,
        &algebra.select(&is_down, &minus_one, &zero),
    );
    (dx, dy)
}

/// Applies one encrypted delta to one axis and clamps the result back onto
/// the grid.
pub fn step_axis(
    algebra: &CipherAlgebraClient,
    coord: &BytesN<32>,
    delta: &BytesN<32>,
    bounds: &GridBounds,
) -> BytesN<32> {
    let moved = algebra.add(coord, delta);
    clamp(algebra, &moved, bounds)
}

/// Saturating clamp into `[bounds.min, bounds.max]`.
///
/// Walking past a boundary pins the coordinate there; stepping further in
/// the same direction leaves the axis unchanged.
pub fn clamp(algebra: &CipherAlgebraClient, value: &BytesN<32>, bounds: &GridBounds) -> BytesN<32> {
    let below = algebra.lt(value, &bounds.min);
    let above = algebra.gt(value, &bounds.max);
    let capped = algebra.select(&above, &bounds.max, value);
    algebra.select(&below, &bounds.min, &capped)
}
