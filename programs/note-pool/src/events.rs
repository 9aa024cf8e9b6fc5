//! Events for the note pool
//!
//! Withdrawal events carry the nullifier hash and recipient only; nothing
//! links them to a deposit or leaf index.

use anchor_lang::prelude::*;

#[event]
pub struct PoolInitialized {
    pub pool: Pubkey,
    pub authority: Pubkey,
    pub token_mint: Pubkey,
    pub denomination: u64,
    pub tree_depth: u8,
    /// 0 = unbounded
    pub root_history_size: u16,
    pub timestamp: i64,
}

#[event]
pub struct VerificationKeySet {
    pub pool: Pubkey,
    pub authority: Pubkey,
    pub ic_length: u8,
    pub timestamp: i64,
}

#[event]
pub struct DepositEvent {
    pub pool: Pubkey,
    pub commitment: [u8; 32],
    pub leaf_index: u32,
    pub merkle_root: [u8; 32],
    pub amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct WithdrawEvent {
    pub pool: Pubkey,
    pub nullifier_hash: [u8; 32],
    pub recipient: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct BatchWithdrawEvent {
    pub pool: Pubkey,
    /// Per-request outcome, in submission order
    pub results: Vec<bool>,
    pub succeeded: u8,
    pub timestamp: i64,
}

#[event]
pub struct PoolPaused {
    pub pool: Pubkey,
    pub authority: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct PoolUnpaused {
    pub pool: Pubkey,
    pub authority: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct EmergencyDrained {
    pub pool: Pubkey,
    pub authority: Pubkey,
    pub destination: Pubkey,
    pub amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct AuthorityTransferred {
    pub pool: Pubkey,
    pub old_authority: Pubkey,
    pub new_authority: Pubkey,
    pub timestamp: i64,
}
