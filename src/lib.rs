#![cfg_attr(not(test), no_std)]
#![cfg_attr(not(test), no_main)]
extern crate alloc;

// Shared types
pub mod errors;
pub mod events;
pub mod math;

// Tokens
pub mod token;
pub mod share;

// Pricing and external positions
pub mod oracle;
pub mod positions;

// Vault engine
pub mod tokenizer;
