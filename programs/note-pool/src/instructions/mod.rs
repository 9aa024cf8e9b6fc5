//! Instruction handlers for the note pool

pub mod admin;
pub mod batch_withdraw;
pub mod deposit;
pub mod initialize_pool;
pub mod records;
pub mod set_verification_key;
pub mod vault;
pub mod withdraw;

pub use admin::*;
pub use batch_withdraw::*;
pub use deposit::*;
pub use initialize_pool::*;
pub use set_verification_key::*;
pub use withdraw::*;
