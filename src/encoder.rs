use bitvec::prelude::*;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use tracing::debug;

use crate::bits;
use crate::decoder::Decoder;
use crate::error::{Error, Result};
use crate::node::{Node, NodeKind};

/// The code table: every symbol mapped to the path from the root to its
/// leaf, `0` for left and `1` for right.
#[derive(Debug, Clone)]
pub struct Encoder<Symbol> {
    encode_table: HashMap<Symbol, BitBox>,
}

impl<Symbol> Encoder<Symbol>
where
    Symbol: Eq + Hash + Clone + Debug,
{
    /// Derives the code table from a tree.
    ///
    /// A tree that is a single leaf gets the one-digit code `0`, so every
    /// code is non-empty.
    pub fn from_tree(root: &Node<Symbol>) -> Self {
        let mut encode_table = HashMap::new();

        if let Some(sym) = root.symbol() {
            encode_table.insert(sym.clone(), bitvec![0].into_boxed_bitslice());
        } else {
            let mut stack = vec![(root, BitVec::new())];
            while let Some((node, mut code)) = stack.pop() {
                match node.kind() {
                    NodeKind::Leaf(sym) => {
                        encode_table.insert(sym.clone(), code.into_boxed_bitslice());
                    }
                    NodeKind::Internal { left, right } => {
                        let mut right_code = code.clone();
                        right_code.push(true);
                        stack.push((right.as_ref(), right_code));

                        code.push(false);
                        stack.push((left.as_ref(), code));
                    }
                }
            }
        }

        let encoder = Self { encode_table };
        debug!(
            num_codes = encoder.len(),
            longest = encoder.longest(),
            "derived code table"
        );
        encoder
    }

    /// Concatenates the code of every symbol in `stream`.
    ///
    /// All or nothing: the first symbol without a code aborts the whole
    /// encode.
    pub fn encode<I>(&self, stream: I) -> Result<BitVec>
    where
        I: IntoIterator,
        I::Item: Borrow<Symbol>,
    {
        let mut out = BitVec::new();
        for (position, s) in stream.into_iter().enumerate() {
            let s = s.borrow();
            match self.encode_table.get(s) {
                Some(code) => out.extend_from_bitslice(code),
                None => {
                    debug!(position, symbol = ?s, "symbol has no code");
                    return Err(Error::UnknownSymbol {
                        symbol: format!("{:?}", s),
                        position,
                    });
                }
            }
        }

        Ok(out)
    }

    pub fn code(&self, s: &Symbol) -> Option<&BitSlice> {
        self.encode_table.get(s).map(|code| code.as_bitslice())
    }

    pub fn len(&self) -> usize {
        self.encode_table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encode_table.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &BitSlice)> {
        self.encode_table
            .iter()
            .map(|(s, code)| (s, code.as_bitslice()))
    }

    /// Length of the longest code, 0 for an empty table.
    pub fn longest(&self) -> usize {
        self.encode_table.values().map(|c| c.len()).max().unwrap_or(0)
    }

    pub fn code_lengths(&self) -> HashMap<Symbol, usize> {
        self.encode_table
            .iter()
            .map(|(s, code)| (s.clone(), code.len()))
            .collect()
    }

    /// Whether no code is a prefix of (or equal to) another.
    pub fn is_prefix_free(&self) -> bool {
        check_prefix_free(self.encode_table.values().map(|c| c.as_bitslice())).is_ok()
    }

    /// Builds the inverse table. Fails if two symbols share a code.
    pub fn invert(&self) -> Result<Decoder<Symbol>> {
        Decoder::from_codes(
            self.encode_table
                .iter()
                .map(|(s, code)| (code.to_bitvec(), s.clone())),
        )
    }
}

impl<Symbol> PartialEq for Encoder<Symbol>
where
    Symbol: Eq + Hash,
{
    fn eq(&self, other: &Self) -> bool {
        self.encode_table == other.encode_table
    }
}

impl<Symbol> Eq for Encoder<Symbol> where Symbol: Eq + Hash {}

/// Checks that no code is a prefix of another. Sorted by digits, a code
/// that prefixes any other also prefixes its immediate successor, so only
/// neighbours need comparing.
pub(crate) fn check_prefix_free<'a>(codes: impl Iterator<Item = &'a BitSlice>) -> Result<()> {
    let mut digits: Vec<String> = codes.map(bits::to_digits).collect();
    digits.sort();

    for pair in digits.windows(2) {
        if pair[0] == pair[1] {
            return Err(Error::DuplicateCode {
                code: pair[0].clone(),
            });
        }
        if pair[1].starts_with(&pair[0]) {
            return Err(Error::NotPrefixFree {
                code: pair[0].clone(),
            });
        }
    }

    Ok(())
}

/// Persistable form of an [`Encoder`], codes written as `'0'`/`'1'`
/// strings and ordered by code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableEncoder<Symbol> {
    encode_table: Vec<(Symbol, String)>,
}

impl<'a, Symbol> From<&'a Encoder<Symbol>> for SerializableEncoder<Symbol>
where
    Symbol: Clone,
{
    fn from(other: &'a Encoder<Symbol>) -> Self {
        let mut encode_table: Vec<_> = other
            .encode_table
            .iter()
            .map(|(s, code)| (s.clone(), bits::to_digits(code)))
            .collect();
        encode_table.sort_by(|a, b| a.1.cmp(&b.1));

        Self { encode_table }
    }
}

impl<Symbol> TryFrom<SerializableEncoder<Symbol>> for Encoder<Symbol>
where
    Symbol: Eq + Hash + Clone + Debug,
{
    type Error = Error;

    fn try_from(other: SerializableEncoder<Symbol>) -> Result<Self> {
        if other.encode_table.is_empty() {
            return Err(Error::EmptyInput);
        }

        let mut seen = HashSet::new();
        let mut encode_table = HashMap::with_capacity(other.encode_table.len());
        for (s, digits) in other.encode_table {
            let code = bits::from_digits(&digits)?;
            if code.is_empty() {
                return Err(Error::EmptyCode {
                    symbol: format!("{:?}", s),
                });
            }
            if !seen.insert(s.clone()) {
                return Err(Error::DuplicateSymbol {
                    symbol: format!("{:?}", s),
                });
            }
            encode_table.insert(s, code.into_boxed_bitslice());
        }

        check_prefix_free(encode_table.values().map(|c| c.as_bitslice()))?;
        Ok(Self { encode_table })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classic() -> Encoder<char> {
        let tree = Node::from_weights(vec![
            ('a', 5),
            ('b', 9),
            ('c', 12),
            ('d', 13),
            ('e', 16),
            ('f', 45),
        ])
        .unwrap();
        Encoder::from_tree(&tree)
    }

    fn digits(e: &Encoder<char>, s: char) -> String {
        bits::to_digits(e.code(&s).unwrap())
    }

    #[test]
    fn classic_codes() {
        let e = classic();

        assert_eq!(digits(&e, 'f'), "0");
        assert_eq!(digits(&e, 'c'), "100");
        assert_eq!(digits(&e, 'd'), "101");
        assert_eq!(digits(&e, 'a'), "1100");
        assert_eq!(digits(&e, 'b'), "1101");
        assert_eq!(digits(&e, 'e'), "111");
        assert_eq!(e.len(), 6);
        assert_eq!(e.longest(), 4);
    }

    #[test]
    fn heaviest_symbol_gets_shortest_code() {
        let lengths = classic().code_lengths();
        let shortest = lengths.values().min().unwrap();
        let longest = lengths.values().max().unwrap();

        assert_eq!(lengths[&'f'], *shortest);
        assert_eq!(lengths[&'a'], *longest);
        assert_eq!(lengths[&'b'], *longest);
    }

    #[test]
    fn codes_are_prefix_free() {
        let e = classic();
        assert!(e.is_prefix_free());

        for (a, code_a) in e.iter() {
            for (b, code_b) in e.iter() {
                if a != b {
                    assert!(!code_b.starts_with(code_a), "{a} prefixes {b}");
                }
            }
        }
    }

    #[test]
    fn single_symbol_gets_one_digit() {
        let tree = Node::from_weights(vec![("x".to_string(), 5)]).unwrap();
        let e = Encoder::from_tree(&tree);

        assert_eq!(e.len(), 1);
        let code = e.code(&"x".to_string()).unwrap();
        assert_eq!(bits::to_digits(code), "0");
    }

    #[test]
    fn encode_concatenates_codes() {
        let e = classic();
        let out = e.encode("abcdef".chars()).unwrap();
        assert_eq!(bits::to_digits(&out), "110011011001011110");

        let f = e.encode(['f']).unwrap();
        assert_eq!(f.as_bitslice(), e.code(&'f').unwrap());
    }

    #[test]
    fn encode_accepts_borrowed_symbols() {
        let e = classic();
        let text = vec!['f', 'a'];
        assert_eq!(bits::to_digits(&e.encode(&text).unwrap()), "01100");
    }

    #[test]
    fn encode_unknown_symbol_fails() {
        let err = classic().encode("fadz".chars()).unwrap_err();
        assert_eq!(
            err,
            Error::UnknownSymbol {
                symbol: "'z'".to_string(),
                position: 3
            }
        );
    }

    #[test]
    fn encode_nothing_is_empty() {
        assert!(classic().encode("".chars()).unwrap().is_empty());
    }

    #[test]
    fn invert_round_trips_table() {
        let e = classic();
        let d = e.invert().unwrap();
        for (s, code) in e.iter() {
            assert_eq!(d.symbol(code), Some(s));
        }
    }

    #[test]
    fn same_input_same_table() {
        assert_eq!(classic(), classic());
    }

    #[test]
    fn prefix_check_catches_violations() {
        let a = bitvec![0, 1];
        let b = bitvec![0, 1, 1];
        let c = bitvec![1];
        assert_eq!(
            check_prefix_free([a.as_bitslice(), b.as_bitslice(), c.as_bitslice()].into_iter()),
            Err(Error::NotPrefixFree {
                code: "01".to_string()
            })
        );
        assert_eq!(
            check_prefix_free([c.as_bitslice(), c.as_bitslice()].into_iter()),
            Err(Error::DuplicateCode {
                code: "1".to_string()
            })
        );
    }

    #[test]
    fn serialized_form_is_sorted_digits() {
        let ser = SerializableEncoder::from(&classic());
        assert_eq!(
            ser.encode_table,
            vec![
                ('f', "0".to_string()),
                ('c', "100".to_string()),
                ('d', "101".to_string()),
                ('a', "1100".to_string()),
                ('b', "1101".to_string()),
                ('e', "111".to_string()),
            ]
        );
    }

    #[test]
    fn msgpack_reload() {
        let e = classic();
        let data = rmp_serde::to_vec(&SerializableEncoder::from(&e)).unwrap();
        let ser: SerializableEncoder<char> = rmp_serde::from_slice(&data).unwrap();

        assert_eq!(Encoder::try_from(ser).unwrap(), e);
    }

    #[test]
    fn reload_validates() {
        let table = |entries: &[(char, &str)]| SerializableEncoder {
            encode_table: entries
                .iter()
                .map(|(s, d)| (*s, d.to_string()))
                .collect(),
        };

        assert_eq!(
            Encoder::try_from(table(&[('a', "0"), ('b', "01")])),
            Err(Error::NotPrefixFree {
                code: "0".to_string()
            })
        );
        assert_eq!(
            Encoder::try_from(table(&[('a', "0"), ('b', "")])),
            Err(Error::EmptyCode {
                symbol: "'b'".to_string()
            })
        );
        assert_eq!(
            Encoder::try_from(table(&[('a', "0"), ('a', "1")])),
            Err(Error::DuplicateSymbol {
                symbol: "'a'".to_string()
            })
        );
        assert_eq!(
            Encoder::try_from(table(&[('a', "02")])),
            Err(Error::InvalidDigit {
                found: '2',
                position: 1
            })
        );
        assert_eq!(Encoder::try_from(table(&[])), Err(Error::EmptyInput));
    }
}
