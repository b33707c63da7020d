//! Stripe layout and parity arithmetic for the striped drive.

pub mod parity;
pub mod stripe;
