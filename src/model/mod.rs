//! Encode/decode model: message-passing encoder over graph connectivity
//! and a parameter-free dot-product decoder.

pub mod decoder;
pub mod encoder;

pub use decoder::{decode, sigmoid};
pub use encoder::{propagation_matrix, Encoder, EncoderConfig};
