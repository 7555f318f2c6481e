mod account;
mod balance;
mod bank_transfer;
mod entry;
mod transfer;

pub use account::*;
pub use balance::*;
pub use bank_transfer::*;
pub use entry::*;
pub use transfer::*;
