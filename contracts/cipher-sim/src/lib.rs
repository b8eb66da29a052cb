#![no_std]

//! Deterministic ciphertext algebra simulator.
//!
//! Implements the two capabilities the encrypted-grid engine consumes (a
//! homomorphic integer algebra and a decrypt-permission registry) over
//! plaintext `u32` values hidden behind opaque 32-byte handles. Handles are
//! minted from a monotone counter, every operation returns a fresh handle,
//! and decryption is gated on recorded grants, so engine tests can drive the
//! full protocol and read positions back through `decrypt` exactly as a
//! wallet would against the production provider.
//!
//! Nothing here is cryptographic: an input proof is a bookkeeping token bound
//! to `(handles, sender, target)` at mint time, not a zero-knowledge object.

use soroban_sdk::{contract, contracterror, contractimpl, contracttype, Address, Bytes, BytesN, Env, Vec};


// ============================================================================
// Errors
// ============================================================================

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    UnknownHandle = 1,
    NotPermitted = 2,
}

// ============================================================================
// Data Types
// ============================================================================

/// Handles plus the proof token that binds them to a sender/target pair.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EncryptedInput {
    pub handles: Vec<BytesN<32>>,
    pub proof: Bytes,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InputBinding {
    pub handles: Vec<BytesN<32>>,
    pub sender: Address,
    pub target: Address,
}

// ============================================================================
// Storage
// ============================================================================

#[contracttype]
pub enum DataKey {
    HandleSeq,
    InputSeq,
    Value(BytesN<32>),
    Input(Bytes),
    Grant(BytesN<32>, Address),
    GrantLog,
}

// ============================================================================
// Contract
// ============================================================================

#[contract]
pub struct CipherSim;

#[contractimpl]
impl CipherSim {
    // ----- Input minting and verification -----------------------------------

    /// Encrypts `values` for a `sender`/`target` pair, returning the handles
    /// plus the proof token `verify_input` will accept for exactly this
    /// combination.
    pub fn create_input(
        env: Env,
        sender: Address,
        target: Address,
        values: Vec<u32>,
    ) -> EncryptedInput {
        let mut handles = Vec::new(&env);
        for value in values.iter() {
            handles.push_back(Self::mint(&env, value));
        }

        let seq: u64 = env
            .storage()
            .instance()
            .get(&DataKey::InputSeq)
            .unwrap_or(0u64)
            + 1;
        env.storage().instance().set(&DataKey::InputSeq, &seq);
        let proof = Bytes::from_array(&env, &seq.to_be_bytes());

        let binding = InputBinding {
            handles: handles.clone(),
            sender,
            target,
        };
        env.storage()
            .persistent()
            .set(&DataKey::Input(proof.clone()), &binding);

        EncryptedInput { handles, proof }
    }

    /// True iff `proof` was minted for exactly these handles, this sender and
    /// this target contract. Any substitution fails.
    pub fn verify_input(
        env: Env,
        handles: Vec<BytesN<32>>,
        proof: Bytes,
        sender: Address,
        target: Address,
    ) -> bool {
        match env
            .storage()
            .persistent()
            .get::<_, InputBinding>(&DataKey::Input(proof))
        {
            Some(binding) => {
                binding.handles == handles && binding.sender == sender && binding.target == target
            }
            None => false,
        }
    }

    // ----- Homomorphic algebra ----------------------------------------------
    //
    // Arithmetic wraps mod 2^32, the semantics of a fixed-width encrypted
    // integer. Results are always fresh handles; inputs are untouched.

    pub fn trivial_encrypt(env: Env, value: u32) -> BytesN<32> {
        Self::mint(&env, value)
    }

    pub fn add(env: Env, a: BytesN<32>, b: BytesN<32>) -> BytesN<32> {
        let sum = Self::value_of(&env, &a).wrapping_add(Self::value_of(&env, &b));
        Self::mint(&env, sum)
    }

    pub fn sub(env: Env, a: BytesN<32>, b: BytesN<32>) -> BytesN<32> {
        let diff = Self::value_of(&env, &a).wrapping_sub(Self::value_of(&env, &b));
        Self::mint(&env, diff)
    }

    pub fn eq(env: Env, a: BytesN<32>, b: BytesN<32>) -> BytesN<32> {
        Self::mint_bool(&env, Self::value_of(&env, &a) == Self::value_of(&env, &b))
    }

    pub fn lt(env: Env, a: BytesN<32>, b: BytesN<32>) -> BytesN<32> {
        Self::mint_bool(&env, Self::value_of(&env, &a) < Self::value_of(&env, &b))
    }

    pub fn gt(env: Env, a: BytesN<32>, b: BytesN<32>) -> BytesN<32> {
        Self::mint_bool(&env, Self::value_of(&env, &a) > Self::value_of(&env, &b))
    }

    /// Encrypted branch: returns a fresh handle carrying `if_true`'s value
    /// when `cond` is nonzero, `if_false`'s otherwise.
    pub fn select(env: Env, cond: BytesN<32>, if_true: BytesN<32>, if_false: BytesN<32>) -> BytesN<32> {
        let picked = if Self::value_of(&env, &cond) != 0 {
            Self::value_of(&env, &if_true)
        } else {
            Self::value_of(&env, &if_false)
        };
        Self::mint(&env, picked)
    }

    // ----- Permission registry ----------------------------------------------

    /// Grants `addr` the right to decrypt `handle`. Granting twice is a no-op.
    pub fn allow(env: Env, handle: BytesN<32>, addr: Address) {
        let key = DataKey::Grant(handle.clone(), addr.clone());
        if env.storage().persistent().has(&key) {
            return;
        }
        env.storage().persistent().set(&key, &true);

        let mut log = Self::grant_log(env.clone());
        log.push_back((handle, addr));
        env.storage().instance().set(&DataKey::GrantLog, &log);
    }

    pub fn is_allowed(env: Env, handle: BytesN<32>, addr: Address) -> bool {
        env.storage()
            .persistent()
            .has(&DataKey::Grant(handle, addr))
    }

    /// Append-only record of every grant issued, in order.
    pub fn grant_log(env: Env) -> Vec<(BytesN<32>, Address)> {
        env.storage()
            .instance()
            .get(&DataKey::GrantLog)
            .unwrap_or_else(|| Vec::new(&env))
    }

    // ----- Decryption oracle ------------------------------------------------

    /// Reads a handle's plaintext on behalf of `viewer`. Permission is
    /// enforced here, at decrypt time, never when handles are merely passed
    /// around.
    pub fn decrypt(env: Env, handle: BytesN<32>, viewer: Address) -> Result<u32, Error> {
        let value: u32 = env
            .storage()
            .persistent()
            .get(&DataKey::Value(handle.clone()))
            .ok_or(Error::UnknownHandle)?;
        if !env
            .storage()
            .persistent()
            .has(&DataKey::Grant(handle, viewer))
        {
            return Err(Error::NotPermitted);
        }
        Ok(value)
    }

    // ----- Internals --------------------------------------------------------

    fn mint(env: &Env, value: u32) -> BytesN<32> {
        let seq: u64 = env
            .storage()
            .instance()
            .get(&DataKey::HandleSeq)
            .unwrap_or(0u64)
            + 1;
        env.storage().instance().set(&DataKey::HandleSeq, &seq);

        // The counter starts at 1, so the all-zero handle is never minted and
        // stays free as a sentinel for callers.
        let mut raw = [0u8; 32];
        raw[24..].copy_from_slice(&seq.to_be_bytes());
        let handle = BytesN::from_array(env, &raw);
        env.storage()
            .persistent()
            .set(&DataKey::Value(handle.clone()), &value);
        handle
    }

    fn mint_bool(env: &Env, cond: bool) -> BytesN<32> {
        Self::mint(env, if cond { 1 } else { 0 })
    }

    fn value_of(env: &Env, handle: &BytesN<32>) -> u32 {
        env.storage()
            .persistent()
            .get(&DataKey::Value(handle.clone()))
            .expect("unknown ciphertext handle")
    }
}
