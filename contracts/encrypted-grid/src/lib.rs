#![no_std]

//! Encrypted grid game: confidential position state machine.
//!
//! Players occupy cells on a fixed square grid, but their coordinates are
//! stored only as opaque ciphertext handles. Every position update is
//! computed homomorphically by an external ciphertext algebra contract, so no
//! plaintext coordinate ever passes through this contract. Decryption rights
//! are granted per handle through an access-control registry; only the owning
//! player (and this contract, for follow-up arithmetic) can read a position
//! back.
//!
//! Superseded handles are abandoned, never revoked: whoever could decrypt an
//! old position can keep decrypting it. Callers relying on forward secrecy of
//! past positions must account for that.

use soroban_sdk::{
    contract, contractclient, contracterror, contractimpl, contracttype, symbol_short, vec,
    Address, Bytes, BytesN, Env, Vec,
};


mod cipher;

// ============================================================================
// Capability Interfaces
// ============================================================================

/// Homomorphic integer algebra over opaque 32-byte ciphertext handles.
///
/// Arithmetic wraps mod 2^32; comparisons yield encrypted booleans; `select`
/// is the only conditional construct available over secret data. Every
/// operation returns a fresh handle and never exposes plaintext.
#[contractclient(name = "CipherAlgebraClient")]
pub trait CipherAlgebra {
    /// Attests that `handles` were honestly encrypted for this
    /// `sender`/`target` pair. A `false` answer must abort the enclosing
    /// operation.
    fn verify_input(
        env: Env,
        handles: Vec<BytesN<32>>,
        proof: Bytes,
        sender: Address,
        target: Address,
    ) -> bool;

    /// Lifts a public constant into ciphertext space.
    fn trivial_encrypt(env: Env, value: u32) -> BytesN<32>;

    fn add(env: Env, a: BytesN<32>, b: BytesN<32>) -> BytesN<32>;
    fn sub(env: Env, a: BytesN<32>, b: BytesN<32>) -> BytesN<32>;

    fn eq(env: Env, a: BytesN<32>, b: BytesN<32>) -> BytesN<32>;
    fn lt(env: Env, a: BytesN<32>, b: BytesN<32>) -> BytesN<32>;
    fn gt(env: Env, a: BytesN<32>, b: BytesN<32>) -> BytesN<32>;

    fn select(env: Env, cond: BytesN<32>, if_true: BytesN<32>, if_false: BytesN<32>) -> BytesN<32>;
}

/// Decrypt-permission registry. Grants are append-only from this contract's
/// perspective; `allow` is idempotent.
#[contractclient(name = "AccessControlClient")]
pub trait AccessControl {
    fn allow(env: Env, handle: BytesN<32>, addr: Address);
}

// ============================================================================
// Errors
// ============================================================================

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    InvalidGridSize = 1,
    ProofInvalid = 2,
    AlreadyJoined = 3,
    NotJoined = 4,
    NotAdmin = 5,
}

// ============================================================================
// Data Types
// ============================================================================

/// Per-player state. `x`/`y` are live ciphertext handles, overwritten in
/// place on every successful move; this contract is their only writer.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PlayerRecord {
    pub has_joined: bool,
    pub x: BytesN<32>,
    pub y: BytesN<32>,
}

#[contracttype]
pub enum DataKey {
    Admin,
    Algebra,
    Acl,
    MaxCoord,
    Player(Address),
}

// ============================================================================
// Contract
// ============================================================================

/// Lowest valid coordinate on either axis.
pub const MIN_COORD: u32 = 1;

const PLAYER_TTL_LEDGERS: u32 = 518_400; // ~30 days

#[contract]
pub struct EncryptedGrid;

#[contractimpl]
impl EncryptedGrid {
    /// Deploy with an admin, the two provider addresses, and the grid bound.
    /// The grid spans `[MIN_COORD, max_coord]` on both axes.
    pub fn __constructor(
        env: Env,
        admin: Address,
        algebra: Address,
        acl: Address,
        max_coord: u32,
    ) -> Result<(), Error> {
        if max_coord < MIN_COORD {
            return Err(Error::InvalidGridSize);
        }
        env.storage().instance().set(&DataKey::Admin, &admin);
        env.storage().instance().set(&DataKey::Algebra, &algebra);
        env.storage().instance().set(&DataKey::Acl, &acl);
        env.storage().instance().set(&DataKey::MaxCoord, &max_coord);
        Ok(())
    }

    /// Enters the game at the encrypted spawn position.
    ///
    /// The spawn pair is taken as-is: only `move_player` clamps, so callers
    /// are trusted to submit in-range coordinates. Joining is once per
    /// address, permanently.
    pub fn join_game(
        env: Env,
        player: Address,
        enc_x: BytesN<32>,
        enc_y: BytesN<32>,
        proof: Bytes,
    ) -> Result<(), Error> {
        player.require_auth();

        if Self::load_player(&env, &player).map_or(false, |p| p.has_joined) {
            return Err(Error::AlreadyJoined);
        }

        let algebra_addr: Address = env.storage().instance().get(&DataKey::Algebra).unwrap();
        let algebra = CipherAlgebraClient::new(&env, &algebra_addr);
        let inputs = vec![&env, enc_x.clone(), enc_y.clone()];
        if !algebra.verify_input(&inputs, &proof, &player, &env.current_contract_address()) {
            return Err(Error::ProofInvalid);
        }

        let record = PlayerRecord {
            has_joined: true,
            x: enc_x.clone(),
            y: enc_y.clone(),
        };
        Self::store_player(&env, &player, &record);
        Self::grant_pair(&env, &enc_x, &enc_y, &player);

        env.events()
            .publish((symbol_short!("joined"), player), (enc_x, enc_y));
        Ok(())
    }

    /// Applies one encrypted direction step to the caller's position.
    ///
    /// The direction stays secret end to end: it is decomposed into encrypted
    /// unit deltas, added to the stored pair, and each axis is independently
    /// clamped to the grid, all through the algebra provider, never in
    /// plaintext. A direction code outside the four known ones decomposes to
    /// a zero delta and the move lands as a stationary step; a ciphertext
    /// cannot drive a rejection.
    pub fn move_player(
        env: Env,
        player: Address,
        enc_dir: BytesN<32>,
        proof: Bytes,
    ) -> Result<(), Error> {
        player.require_auth();

        let record = Self::load_player(&env, &player)
            .filter(|p| p.has_joined)
            .ok_or(Error::NotJoined)?;

        let algebra_addr: Address = env.storage().instance().get(&DataKey::Algebra).unwrap();
        let algebra = CipherAlgebraClient::new(&env, &algebra_addr);
        let inputs = vec![&env, enc_dir.clone()];
        if !algebra.verify_input(&inputs, &proof, &player, &env.current_contract_address()) {
            return Err(Error::ProofInvalid);
        }

        let max_coord: u32 = env.storage().instance().get(&DataKey::MaxCoord).unwrap();
        let bounds = cipher::GridBounds::trivial(&algebra, MIN_COORD, max_coord);
        let (dx, dy) = cipher::direction_deltas(&algebra, &enc_dir);
        let new_x = cipher::step_axis(&algebra, &record.x, &dx, &bounds);
        let new_y = cipher::step_axis(&algebra, &record.y, &dy, &bounds);

        let updated = PlayerRecord {
            has_joined: true,
            x: new_x.clone(),
            y: new_y.clone(),
        };
        Self::store_player(&env, &player, &updated);
        Self::grant_pair(&env, &new_x, &new_y, &player);

        env.events()
            .publish((symbol_short!("moved"), player), (new_x, new_y));
        Ok(())
    }

    // ----- Read-only queries ------------------------------------------------

    pub fn has_joined(env: Env, player: Address) -> bool {
        Self::load_player(&env, &player).map_or(false, |p| p.has_joined)
    }

    /// Returns the live ciphertext handles for `player`, or the all-zero
    /// sentinel pair for an address that never joined (providers never mint
    /// the zero handle; `has_joined` disambiguates). No permission check:
    /// the registry enforces permission at decrypt time, not at read-handle
    /// time.
    pub fn get_player_position(env: Env, player: Address) -> (BytesN<32>, BytesN<32>) {
        match Self::load_player(&env, &player) {
            Some(p) => (p.x, p.y),
            None => (
                BytesN::from_array(&env, &[0u8; 32]),
                BytesN::from_array(&env, &[0u8; 32]),
            ),
        }
    }

    pub fn grid_size(env: Env) -> (u32, u32) {
        let max_coord: u32 = env.storage().instance().get(&DataKey::MaxCoord).unwrap();
        (max_coord, max_coord)
    }

    // ----- Admin ------------------------------------------------------------

    /// Repoints the algebra and registry providers. Existing handles stay
    /// with the old provider; this is for pre-launch wiring, not live
    /// migration.
    pub fn set_providers(env: Env, admin: Address, algebra: Address, acl: Address) -> Result<(), Error> {
        admin.require_auth();
        let stored: Address = env.storage().instance().get(&DataKey::Admin).unwrap();
        if admin != stored {
            return Err(Error::NotAdmin);
        }
        env.storage().instance().set(&DataKey::Algebra, &algebra);
        env.storage().instance().set(&DataKey::Acl, &acl);
        Ok(())
    }

    pub fn get_providers(env: Env) -> (Address, Address) {
        let algebra: Address = env.storage().instance().get(&DataKey::Algebra).unwrap();
        let acl: Address = env.storage().instance().get(&DataKey::Acl).unwrap();
        (algebra, acl)
    }

    pub fn get_admin(env: Env) -> Address {
        env.storage().instance().get(&DataKey::Admin).unwrap()
    }

    // ----- Internals --------------------------------------------------------

    fn load_player(env: &Env, player: &Address) -> Option<PlayerRecord> {
        env.storage().persistent().get(&DataKey::Player(player.clone()))
    }

    fn store_player(env: &Env, player: &Address, record: &PlayerRecord) {
        let key = DataKey::Player(player.clone());
        env.storage().persistent().set(&key, record);
        env.storage()
            .persistent()
            .extend_ttl(&key, PLAYER_TTL_LEDGERS, PLAYER_TTL_LEDGERS);
    }

    /// Grants decrypt permission on a fresh position pair: to this contract
    /// first (it keeps computing on the pair), then to the owner.
    fn grant_pair(env: &Env, x: &BytesN<32>, y: &BytesN<32>, player: &Address) {
        let acl_addr: Address = env.storage().instance().get(&DataKey::Acl).unwrap();
        let acl = AccessControlClient::new(env, &acl_addr);
        let this = env.current_contract_address();
        acl.allow(x, &this);
        acl.allow(y, &this);
        acl.allow(x, player);
        acl.allow(y, player);
    }
}
