use bitvec::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use tracing::debug;

use crate::bits;
use crate::encoder::check_prefix_free;
use crate::error::{Error, Result};

/// The decode table, code to symbol.
#[derive(Debug, Clone)]
pub struct Decoder<Symbol> {
    decode_table: HashMap<BitVec, Symbol>,
    shortest: usize,
    longest: usize,
}

impl<Symbol> Decoder<Symbol>
where
    Symbol: Clone + Debug,
{
    /// Builds a decoder from `(code, symbol)` pairs. Codes must be unique
    /// and non-empty.
    pub(crate) fn from_codes(codes: impl Iterator<Item = (BitVec, Symbol)>) -> Result<Self> {
        let mut decode_table = HashMap::new();
        for (code, s) in codes {
            if code.is_empty() {
                return Err(Error::EmptyCode {
                    symbol: format!("{:?}", s),
                });
            }
            let digits = bits::to_digits(&code);
            if decode_table.insert(code, s).is_some() {
                return Err(Error::DuplicateCode { code: digits });
            }
        }

        let shortest = decode_table.keys().map(|c| c.len()).min();
        let longest = decode_table.keys().map(|c| c.len()).max();
        match (shortest, longest) {
            (Some(shortest), Some(longest)) => Ok(Self {
                decode_table,
                shortest,
                longest,
            }),
            _ => Err(Error::EmptyInput),
        }
    }

    /// Decodes a bit sequence back into symbols.
    ///
    /// At each position the longest code that prefixes the remaining input
    /// is consumed. Fails without partial output as soon as no code
    /// matches, including a trailing fragment shorter than any code.
    pub fn decode(&self, input: &BitSlice) -> Result<Vec<Symbol>> {
        let mut out = Vec::new();

        let mut cursor = 0;
        while cursor < input.len() {
            let remaining = input.len() - cursor;
            let longest = self.longest.min(remaining);
            let matched = (self.shortest..=longest).rev().find_map(|len| {
                let key = input[cursor..cursor + len].to_bitvec();
                self.decode_table.get(&key).map(|sym| (len, sym))
            });

            match matched {
                Some((len, sym)) => {
                    out.push(sym.clone());
                    cursor += len;
                }
                None => {
                    debug!(position = cursor, "no code matches");
                    return Err(Error::NoMatchingCode { position: cursor });
                }
            }
        }

        Ok(out)
    }

    /// The symbol whose code is exactly `code`.
    pub fn symbol(&self, code: &BitSlice) -> Option<&Symbol> {
        self.decode_table.get(&code.to_bitvec())
    }

    pub fn len(&self) -> usize {
        self.decode_table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decode_table.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BitSlice, &Symbol)> {
        self.decode_table
            .iter()
            .map(|(code, s)| (code.as_bitslice(), s))
    }
}

impl<Symbol> PartialEq for Decoder<Symbol>
where
    Symbol: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.decode_table == other.decode_table
    }
}

impl<Symbol> Eq for Decoder<Symbol> where Symbol: Eq {}

/// Persistable form of a [`Decoder`], codes written as `'0'`/`'1'`
/// strings and ordered by code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableDecoder<Symbol> {
    decode_table: Vec<(String, Symbol)>,
}

impl<'a, Symbol> From<&'a Decoder<Symbol>> for SerializableDecoder<Symbol>
where
    Symbol: Clone,
{
    fn from(other: &'a Decoder<Symbol>) -> Self {
        let mut decode_table: Vec<_> = other
            .decode_table
            .iter()
            .map(|(code, s)| (bits::to_digits(code), s.clone()))
            .collect();
        decode_table.sort_by(|a, b| a.0.cmp(&b.0));

        Self { decode_table }
    }
}

impl<Symbol> TryFrom<SerializableDecoder<Symbol>> for Decoder<Symbol>
where
    Symbol: Eq + Hash + Clone + Debug,
{
    type Error = Error;

    fn try_from(other: SerializableDecoder<Symbol>) -> Result<Self> {
        let codes = other
            .decode_table
            .into_iter()
            .map(|(digits, s)| Ok((bits::from_digits(&digits)?, s)))
            .collect::<Result<Vec<_>>>()?;

        let decoder = Self::from_codes(codes.into_iter())?;
        check_prefix_free(decoder.decode_table.keys().map(|c| c.as_bitslice()))?;

        let mut seen = HashSet::new();
        for s in decoder.decode_table.values() {
            if !seen.insert(s) {
                return Err(Error::DuplicateSymbol {
                    symbol: format!("{:?}", s),
                });
            }
        }

        Ok(decoder)
    }
}
