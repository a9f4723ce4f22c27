pub mod chain;
pub mod defaults;
pub mod domain;
pub mod failure;
pub mod form;
pub mod token;
pub mod transfer;
pub mod transfer_transitions;
pub mod units;
pub mod validation;

pub use chain::*;
pub use defaults::*;
pub use domain::*;
pub use failure::*;
pub use form::*;
pub use token::*;
pub use transfer::*;
pub use transfer_transitions::*;
pub use units::*;
pub use validation::*;
