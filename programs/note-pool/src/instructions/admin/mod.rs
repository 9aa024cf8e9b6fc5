//! Admin instructions for the note pool

pub mod emergency_drain;
pub mod pause;
pub mod unpause;
pub mod update_authority;

pub use emergency_drain::*;
pub use pause::*;
pub use unpause::*;
pub use update_authority::*;
