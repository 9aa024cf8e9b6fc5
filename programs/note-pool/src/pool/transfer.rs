//! Outbound asset movement
//!
//! The pool decides *whether* value leaves custody; an `AssetTransfer`
//! performs the move. On chain this is an SPL token transfer out of the
//! vault, see `instructions::vault`.

use anchor_lang::prelude::*;

pub trait AssetTransfer {
    /// Move `amount` units out of custody to `recipient`.
    fn transfer(&mut self, recipient: &Pubkey, amount: u64) -> Result<()>;

    /// Fail if `recipient` cannot be paid right now. Runs before the
    /// nullifier is spent.
    fn check_recipient(&self, _recipient: &Pubkey) -> Result<()> {
        Ok(())
    }
}

impl<T: AssetTransfer + ?Sized> AssetTransfer for &mut T {
    fn transfer(&mut self, recipient: &Pubkey, amount: u64) -> Result<()> {
        (**self).transfer(recipient, amount)
    }

    fn check_recipient(&self, recipient: &Pubkey) -> Result<()> {
        (**self).check_recipient(recipient)
    }
}

impl<T: AssetTransfer + ?Sized> AssetTransfer for Box<T> {
    fn transfer(&mut self, recipient: &Pubkey, amount: u64) -> Result<()> {
        (**self).transfer(recipient, amount)
    }

    fn check_recipient(&self, recipient: &Pubkey) -> Result<()> {
        (**self).check_recipient(recipient)
    }
}
