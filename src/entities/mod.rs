// Entity Models
//
// An account has:
// - Stable identity (UUID) that NEVER changes
// - A fixed name and a balance that moves only through validated operations
// - A registry for name lookups and operations across accounts

pub mod account;

pub use account::{Account, AccountRegistry};
