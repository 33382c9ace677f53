//! NeuroBot HTTP server — bot bookkeeping, training and chat over REST.

pub mod http;
pub mod subsystems;
