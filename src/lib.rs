//! Huffman codes built from weighted symbols.
//!
//! ```
//! use huffcode::Codec;
//!
//! let codec = Codec::new(vec![('a', 5), ('b', 9), ('c', 12), ('d', 13), ('e', 16), ('f', 45)])?;
//! let bits = codec.encode_text("abcdef")?;
//! assert_eq!(codec.decode_text(&bits)?, "abcdef");
//! # Ok::<(), huffcode::Error>(())
//! ```

pub mod bits;
pub mod codec;
pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod node;
pub mod stats;

pub use codec::Codec;
pub use config::Config;
pub use decoder::{Decoder, SerializableDecoder};
pub use encoder::{Encoder, SerializableEncoder};
pub use error::{Error, Result};
pub use node::{Edge, Node, NodeKind, Strategy, Traverse, Visit};
pub use stats::CodeStats;
