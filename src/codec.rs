use bitvec::prelude::*;
use std::borrow::Borrow;
use std::fmt::Debug;
use std::hash::Hash;

use crate::bits;
use crate::config::Config;
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::Result;
use crate::node::Node;
use crate::stats::CodeStats;

/// A tree together with the encode and decode tables derived from it.
///
/// Nothing changes after construction, so a `Codec` can be shared by
/// reference (or behind an `Arc`) across threads without locking.
#[derive(Debug, Clone)]
pub struct Codec<Symbol> {
    tree: Node<Symbol>,
    encoder: Encoder<Symbol>,
    decoder: Decoder<Symbol>,
}

impl<Symbol> Codec<Symbol>
where
    Symbol: Eq + Hash + Clone + Debug,
{
    pub fn new(weights: impl IntoIterator<Item = (Symbol, u64)>) -> Result<Self> {
        Self::with_config(weights, &Config::default())
    }

    pub fn with_config(
        weights: impl IntoIterator<Item = (Symbol, u64)>,
        config: &Config,
    ) -> Result<Self> {
        Self::from_tree(Node::build(weights, config.strategy)?)
    }

    /// Weights each symbol by how often it occurs in `samples`.
    pub fn from_samples(samples: impl IntoIterator<Item = Symbol>) -> Result<Self> {
        Self::from_tree(Node::from_samples(samples)?)
    }

    pub fn from_tree(tree: Node<Symbol>) -> Result<Self> {
        let encoder = Encoder::from_tree(&tree);
        let decoder = encoder.invert()?;

        Ok(Self {
            tree,
            encoder,
            decoder,
        })
    }

    pub fn tree(&self) -> &Node<Symbol> {
        &self.tree
    }

    pub fn encoder(&self) -> &Encoder<Symbol> {
        &self.encoder
    }

    pub fn decoder(&self) -> &Decoder<Symbol> {
        &self.decoder
    }

    pub fn encode<I>(&self, stream: I) -> Result<BitVec>
    where
        I: IntoIterator,
        I::Item: Borrow<Symbol>,
    {
        self.encoder.encode(stream)
    }

    pub fn decode(&self, input: &BitSlice) -> Result<Vec<Symbol>> {
        self.decoder.decode(input)
    }

    pub fn stats(&self) -> CodeStats {
        CodeStats::new(&self.tree, &self.encoder)
    }
}

impl Codec<char> {
    /// Encodes text character by character into a string of binary digits.
    pub fn encode_text(&self, text: &str) -> Result<String> {
        let out = self.encode(text.chars())?;
        Ok(bits::to_digits(&out))
    }

    /// Decodes a string of binary digits back into text.
    pub fn decode_text(&self, digits: &str) -> Result<String> {
        let input = bits::from_digits(digits)?;
        Ok(self.decode(&input)?.into_iter().collect())
    }
}
