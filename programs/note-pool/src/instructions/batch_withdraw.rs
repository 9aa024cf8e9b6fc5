//! Batch Withdraw Instruction
//!
//! Up to `MAX_BATCH_WITHDRAWALS` independent withdrawals in one
//! transaction. Each request succeeds or fails on its own; the outcome of
//! every request is reported in `BatchWithdrawEvent`.
//!
//! Remaining accounts, in any order: one writable recipient token account
//! per distinct recipient and one writable `SpentNullifier` PDA per
//! request. A request whose accounts are missing or unusable (frozen
//! destination, wrong mint) fails alone, before its nullifier is spent.

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::crypto::Groth16Verifier;
use crate::error::PoolError;
use crate::events::BatchWithdrawEvent;
use crate::instructions::records::RecordAccounts;
use crate::instructions::vault::VaultTransfer;
use crate::pool::WithdrawalRequest;
use crate::state::{PoolConfig, PoolState, VerificationKey, VerificationKeyAccount};

/// Requests per batch. Each request carries a 256-byte proof and needs two
/// account keys, so two is what fits a 1232-byte legacy transaction.
pub const MAX_BATCH_WITHDRAWALS: usize = 2;

#[derive(Accounts)]
pub struct BatchWithdraw<'info> {
    #[account(
        seeds = [b"pool", pool_config.token_mint.as_ref()],
        bump = pool_config.bump,
    )]
    pub pool_config: Account<'info, PoolConfig>,

    #[account(
        mut,
        seeds = [b"pool_state", pool_config.key().as_ref()],
        bump,
        constraint = pool_state.pool_config == pool_config.key() @ PoolError::Unauthorized,
    )]
    pub pool_state: Account<'info, PoolState>,

    #[account(
        seeds = [b"verification_key", pool_config.key().as_ref()],
        bump = verification_key.bump,
        constraint = verification_key.pool == pool_config.key() @ PoolError::Unauthorized,
        constraint = verification_key.is_initialized @ PoolError::VerificationKeyNotSet,
    )]
    pub verification_key: Account<'info, VerificationKeyAccount>,

    #[account(
        mut,
        seeds = [b"vault", pool_config.key().as_ref()],
        bump,
        constraint = vault.mint == pool_config.token_mint @ PoolError::InvalidMint,
        constraint = vault.owner == pool_config.key() @ PoolError::Unauthorized,
    )]
    pub vault: Account<'info, TokenAccount>,

    /// Pays rent for the nullifier records.
    #[account(mut)]
    pub withdrawer: Signer<'info>,

    pub token_program: Program<'info, Token>,
    pub system_program: Program<'info, System>,
}

pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, BatchWithdraw<'info>>,
    requests: Vec<WithdrawalRequest>,
) -> Result<()> {
    require!(
        !requests.is_empty() && requests.len() <= MAX_BATCH_WITHDRAWALS,
        PoolError::BatchTooLarge
    );
    ctx.accounts.pool_config.require_vk_configured()?;

    let vk_account: &VerificationKeyAccount = &ctx.accounts.verification_key;
    let verifier = Groth16Verifier::new(VerificationKey::from(vk_account))?;

    let pool_config = &ctx.accounts.pool_config;
    let mint = pool_config.token_mint;
    let bump = [pool_config.bump];
    let pool_seeds: &[&[u8]] = &[b"pool".as_ref(), mint.as_ref(), &bump];
    let signer_seeds = &[pool_seeds];

    let mut transfer = VaultTransfer {
        token_program: ctx.accounts.token_program.to_account_info(),
        vault: ctx.accounts.vault.to_account_info(),
        authority: pool_config.to_account_info(),
        mint,
        destinations: ctx.remaining_accounts,
        signer_seeds,
    };

    let records = RecordAccounts {
        program_id: ctx.program_id,
        pool: pool_config.key(),
        candidates: ctx.remaining_accounts,
        payer: ctx.accounts.withdrawer.to_account_info(),
        system_program: ctx.accounts.system_program.to_account_info(),
    };

    let pool = pool_config.key();
    let (ledger, mut storage) = ctx.accounts.pool_state.split(records);
    let results = ledger.batch_withdraw(&mut storage, &requests, &verifier, &mut transfer);

    let succeeded = results.iter().filter(|ok| **ok).count() as u8;

    emit!(BatchWithdrawEvent {
        pool,
        results,
        succeeded,
        timestamp: Clock::get()?.unix_timestamp,
    });

    msg!("Batch processed: {}/{} succeeded", succeeded, requests.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
    use anchor_lang::solana_program::message::Message;
    use anchor_lang::{InstructionData, ToAccountMetas};

    use crate::crypto::PROOF_DATA_LEN;
    use crate::state::SpentNullifier;

    /// Largest serialized transaction the cluster accepts
    const PACKET_DATA_SIZE: usize = 1232;

    fn request(seed: u8) -> WithdrawalRequest {
        WithdrawalRequest::new(
            vec![seed; PROOF_DATA_LEN],
            [seed; 32],
            [seed.wrapping_add(1); 32],
            Pubkey::new_unique(),
        )
    }

    fn transaction_size(count: usize) -> usize {
        let pool_config = Pubkey::new_unique();
        let withdrawer = Pubkey::new_unique();
        let requests: Vec<WithdrawalRequest> = (0..count as u8).map(request).collect();

        let mut accounts = crate::accounts::BatchWithdraw {
            pool_config,
            pool_state: Pubkey::new_unique(),
            verification_key: Pubkey::new_unique(),
            vault: Pubkey::new_unique(),
            withdrawer,
            token_program: anchor_spl::token::ID,
            system_program: anchor_lang::system_program::ID,
        }
        .to_account_metas(None);
        for request in &requests {
            let (record, _) = SpentNullifier::find_pda(&crate::ID, &pool_config, &request.nullifier_hash);
            accounts.push(AccountMeta::new(Pubkey::new_unique(), false));
            accounts.push(AccountMeta::new(record, false));
        }

        let instruction = Instruction {
            program_id: crate::ID,
            accounts,
            data: crate::instruction::BatchWithdraw { requests }.data(),
        };
        let message = Message::new(&[instruction], Some(&withdrawer));

        // signature count + signatures + message
        1 + 64 * message.header.num_required_signatures as usize + message.serialize().len()
    }

    #[test]
    fn test_full_batch_fits_one_transaction() {
        assert!(transaction_size(MAX_BATCH_WITHDRAWALS) <= PACKET_DATA_SIZE);
        assert!(transaction_size(MAX_BATCH_WITHDRAWALS + 1) > PACKET_DATA_SIZE);
    }
}
