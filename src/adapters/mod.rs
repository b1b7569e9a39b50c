//! Adapters layer: Concrete implementations of ports.
//!
//! - `forest`: random-forest classifier and standard scaler loaded from JSON
//!   exports, with manifest/signature verification

pub mod forest;
