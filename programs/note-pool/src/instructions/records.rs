//! Record accounts as a `RecordIndex`
//!
//! Looks up commitment and nullifier PDAs among the accounts passed to the
//! instruction and creates them on insertion, paid for by the submitter.
//! A record PDA that was pre-funded by someone else is still created: the
//! account is topped up, allocated and assigned instead of created.

use anchor_lang::prelude::*;
use anchor_lang::system_program::{self, Allocate, Assign, CreateAccount, Transfer};

use crate::crypto::poseidon::FieldBytes;
use crate::error::PoolError;
use crate::pool::RecordIndex;
use crate::state::{CommitmentRecord, SpentNullifier};

pub struct RecordAccounts<'a, 'info> {
    pub program_id: &'a Pubkey,
    /// Pool config key, part of every record seed
    pub pool: Pubkey,
    /// Accounts searched for record PDAs
    pub candidates: &'a [AccountInfo<'info>],
    pub payer: AccountInfo<'info>,
    pub system_program: AccountInfo<'info>,
}

impl<'a, 'info> RecordAccounts<'a, 'info> {
    fn find(&self, address: &Pubkey) -> Result<&'a AccountInfo<'info>> {
        self.candidates
            .iter()
            .find(|info| info.key == address && info.is_writable)
            .ok_or(error!(PoolError::RecordAccountMissing))
    }

    fn exists(&self, info: &AccountInfo<'info>) -> bool {
        info.owner == self.program_id && !info.data_is_empty()
    }

    fn create<T: AccountSerialize>(
        &self,
        info: &AccountInfo<'info>,
        seeds: &[&[u8]],
        space: usize,
        record: &T,
    ) -> Result<()> {
        let signer_seeds = &[seeds];
        let required = Rent::get()?.minimum_balance(space);
        let current = info.lamports();

        if current == 0 {
            system_program::create_account(
                CpiContext::new_with_signer(
                    self.system_program.clone(),
                    CreateAccount {
                        from: self.payer.clone(),
                        to: info.clone(),
                    },
                    signer_seeds,
                ),
                required,
                space as u64,
                self.program_id,
            )?;
        } else {
            let top_up = required.saturating_sub(current);
            if top_up > 0 {
                system_program::transfer(
                    CpiContext::new(
                        self.system_program.clone(),
                        Transfer {
                            from: self.payer.clone(),
                            to: info.clone(),
                        },
                    ),
                    top_up,
                )?;
            }
            system_program::allocate(
                CpiContext::new_with_signer(
                    self.system_program.clone(),
                    Allocate {
                        account_to_allocate: info.clone(),
                    },
                    signer_seeds,
                ),
                space as u64,
            )?;
            system_program::assign(
                CpiContext::new_with_signer(
                    self.system_program.clone(),
                    Assign {
                        account_to_assign: info.clone(),
                    },
                    signer_seeds,
                ),
                self.program_id,
            )?;
        }

        let mut data = info.try_borrow_mut_data()?;
        let mut writer: &mut [u8] = &mut data[..];
        record.try_serialize(&mut writer)
    }
}

impl RecordIndex for RecordAccounts<'_, '_> {
    fn has_commitment(&self, commitment: &FieldBytes) -> Result<bool> {
        let (address, _) = CommitmentRecord::find_pda(self.program_id, &self.pool, commitment);
        Ok(self.exists(self.find(&address)?))
    }

    fn add_commitment(&mut self, commitment: FieldBytes, leaf_index: u32) -> Result<()> {
        let (address, bump) = CommitmentRecord::find_pda(self.program_id, &self.pool, &commitment);
        let info = self.find(&address)?;
        require!(!self.exists(info), PoolError::DuplicateCommitment);

        let record = CommitmentRecord {
            pool: self.pool,
            commitment,
            leaf_index,
            bump,
        };
        let bump = [bump];
        let seeds: &[&[u8]] = &[
            CommitmentRecord::SEED_PREFIX,
            self.pool.as_ref(),
            commitment.as_ref(),
            &bump,
        ];
        self.create(info, seeds, CommitmentRecord::LEN, &record)
    }

    fn has_nullifier(&self, nullifier_hash: &FieldBytes) -> Result<bool> {
        let (address, _) = SpentNullifier::find_pda(self.program_id, &self.pool, nullifier_hash);
        Ok(self.exists(self.find(&address)?))
    }

    fn add_nullifier(&mut self, nullifier_hash: FieldBytes) -> Result<()> {
        let (address, bump) = SpentNullifier::find_pda(self.program_id, &self.pool, &nullifier_hash);
        let info = self.find(&address)?;
        require!(!self.exists(info), PoolError::NullifierAlreadySpent);

        let record = SpentNullifier {
            pool: self.pool,
            nullifier_hash,
            spent_slot: Clock::get()?.slot,
            bump,
        };
        let bump = [bump];
        let seeds: &[&[u8]] = &[
            SpentNullifier::SEED_PREFIX,
            self.pool.as_ref(),
            nullifier_hash.as_ref(),
            &bump,
        ];
        self.create(info, seeds, SpentNullifier::LEN, &record)
    }
}
