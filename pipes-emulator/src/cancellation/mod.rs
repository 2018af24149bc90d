//! Cooperative cancellation for worker poll loops.

mod token;

pub use token::CancellationToken;
