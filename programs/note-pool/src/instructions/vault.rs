//! SPL token payout out of the pool vault
//!
//! Implements `AssetTransfer` for on-chain withdrawals and drains. The pool
//! config PDA signs for the vault; recipients are resolved to one of the
//! token accounts the caller passed in.
//!
//! A failed token CPI aborts the whole transaction, so destinations are
//! vetted in `check_recipient` before anything is spent: a frozen or
//! missing destination then fails only its own withdrawal.

use anchor_lang::prelude::*;
use anchor_spl::token::{self, TokenAccount, Transfer};

use crate::error::PoolError;
use crate::pool::AssetTransfer;

pub struct VaultTransfer<'a, 'info> {
    pub token_program: AccountInfo<'info>,
    pub vault: AccountInfo<'info>,
    /// Pool config PDA, owner of the vault
    pub authority: AccountInfo<'info>,
    pub mint: Pubkey,
    /// Candidate destination token accounts
    pub destinations: &'a [AccountInfo<'info>],
    pub signer_seeds: &'a [&'a [&'a [u8]]],
}

impl<'a, 'info> VaultTransfer<'a, 'info> {
    /// Writable, unfrozen token account of `mint` owned by `owner`, if one
    /// was passed.
    pub fn find_destination(&self, owner: &Pubkey) -> Option<&'a AccountInfo<'info>> {
        self.destinations.iter().find(|info| {
            if !info.is_writable || info.owner != &token::ID {
                return false;
            }
            let Ok(data) = info.try_borrow_data() else {
                return false;
            };
            match TokenAccount::try_deserialize(&mut &data[..]) {
                Ok(account) => {
                    account.owner == *owner && account.mint == self.mint && !account.is_frozen()
                }
                Err(_) => false,
            }
        })
    }
}

impl AssetTransfer for VaultTransfer<'_, '_> {
    fn transfer(&mut self, recipient: &Pubkey, amount: u64) -> Result<()> {
        let destination = self
            .find_destination(recipient)
            .ok_or(error!(PoolError::InvalidRecipient))?;

        let cpi_accounts = Transfer {
            from: self.vault.clone(),
            to: destination.clone(),
            authority: self.authority.clone(),
        };
        let cpi_ctx = CpiContext::new_with_signer(
            self.token_program.clone(),
            cpi_accounts,
            self.signer_seeds,
        );
        token::transfer(cpi_ctx, amount)
    }

    fn check_recipient(&self, recipient: &Pubkey) -> Result<()> {
        self.find_destination(recipient)
            .map(|_| ())
            .ok_or(error!(PoolError::InvalidRecipient))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::solana_program::program_pack::Pack;
    use anchor_spl::token::spl_token::state::{Account as SplAccount, AccountState};

    fn token_account_data(mint: Pubkey, owner: Pubkey, state: AccountState) -> Vec<u8> {
        let mut data = vec![0u8; SplAccount::LEN];
        SplAccount {
            mint,
            owner,
            amount: 0,
            state,
            ..SplAccount::default()
        }
        .pack_into_slice(&mut data);
        data
    }

    #[test]
    fn test_frozen_destination_rejected() {
        let mint = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let frozen_owner = Pubkey::new_unique();
        let token_program_id = token::ID;

        let key = Pubkey::new_unique();
        let mut lamports = 1u64;
        let mut data = token_account_data(mint, owner, AccountState::Initialized);
        let open = AccountInfo::new(&key, false, true, &mut lamports, &mut data, &token_program_id, false, 0);

        let frozen_key = Pubkey::new_unique();
        let mut frozen_lamports = 1u64;
        let mut frozen_data = token_account_data(mint, frozen_owner, AccountState::Frozen);
        let frozen = AccountInfo::new(
            &frozen_key,
            false,
            true,
            &mut frozen_lamports,
            &mut frozen_data,
            &token_program_id,
            false,
            0,
        );

        let destinations = [open.clone(), frozen];
        let transfer = VaultTransfer {
            token_program: open.clone(),
            vault: open.clone(),
            authority: open,
            mint,
            destinations: &destinations,
            signer_seeds: &[],
        };

        assert!(transfer.check_recipient(&owner).is_ok());
        assert_eq!(
            transfer.check_recipient(&frozen_owner).unwrap_err(),
            PoolError::InvalidRecipient.into()
        );
        assert_eq!(
            transfer.check_recipient(&Pubkey::new_unique()).unwrap_err(),
            PoolError::InvalidRecipient.into()
        );
    }

    #[test]
    fn test_wrong_mint_rejected() {
        let mint = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let token_program_id = token::ID;

        let key = Pubkey::new_unique();
        let mut lamports = 1u64;
        let mut data = token_account_data(Pubkey::new_unique(), owner, AccountState::Initialized);
        let other_mint = AccountInfo::new(&key, false, true, &mut lamports, &mut data, &token_program_id, false, 0);

        let destinations = [other_mint.clone()];
        let transfer = VaultTransfer {
            token_program: other_mint.clone(),
            vault: other_mint.clone(),
            authority: other_mint,
            mint,
            destinations: &destinations,
            signer_seeds: &[],
        };
        assert!(transfer.find_destination(&owner).is_none());
    }
}
