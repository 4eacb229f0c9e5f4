//! # Codecs
//!
//! Pure conversions between SDK output, contract wire values and the numeric
//! domain of the encrypted channel:
//!
//! - `handle` - ciphertext handles and proofs to `bytes32` / hex wire form
//! - `symbol` - ticker symbols to and from 32-bit codes

pub mod handle;
pub mod symbol;

pub use handle::*;
pub use symbol::*;
