//! Post-association fix-ups.
//!
//! Denormalized fields (a line's displayed number, an extension's
//! destination, a user's caller id) are recomputed from the current
//! association graph after every association or dissociation. Each fixer
//! reads fresh state, overwrites the derived fields, and is idempotent; a
//! missing association falls back to a defined default instead of failing.
//! Fixers run on any `ConnectionTrait`, so association repositories invoke
//! them inside the mutation's transaction.

mod extension_fixer;
mod line_fixer;
mod user_fixer;

pub use extension_fixer::ExtensionFixer;
pub use line_fixer::LineFixer;
pub use user_fixer::UserFixer;
