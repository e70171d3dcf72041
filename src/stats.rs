use std::fmt::Debug;
use std::hash::Hash;
use total_float_wrap::TotalF64;

use crate::encoder::Encoder;
use crate::node::Node;

/// How close a code comes to the entropy of its weight distribution.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CodeStats {
    pub total_weight: u64,
    /// Code length averaged over symbols, weighted by symbol weight.
    pub mean_length: TotalF64,
    /// Shannon entropy of the weights, in bits per symbol.
    pub entropy: TotalF64,
    /// `entropy / mean_length`; 1.0 means the code is optimal.
    pub efficiency: TotalF64,
}

impl CodeStats {
    /// All fields are zero when every weight is zero.
    pub fn new<Symbol>(tree: &Node<Symbol>, encoder: &Encoder<Symbol>) -> Self
    where
        Symbol: Eq + Hash + Clone + Debug,
    {
        let total_weight = tree.weight();
        if total_weight == 0 {
            return Self {
                total_weight,
                mean_length: TotalF64(0.0),
                entropy: TotalF64(0.0),
                efficiency: TotalF64(0.0),
            };
        }

        let total = total_weight as f64;
        let mut weighted_bits = 0u128;
        let mut entropy = 0.0;
        for visit in tree.traverse() {
            let Some(sym) = visit.node.symbol() else {
                continue;
            };
            let weight = visit.node.weight();
            let len = encoder.code(sym).map_or(0, |c| c.len());
            weighted_bits += weight as u128 * len as u128;

            if weight > 0 {
                let p = weight as f64 / total;
                entropy -= p * p.log2();
            }
        }

        let mean_length = weighted_bits as f64 / total;
        Self {
            total_weight,
            mean_length: TotalF64(mean_length),
            entropy: TotalF64(entropy),
            efficiency: TotalF64(entropy / mean_length),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(weights: Vec<(char, u64)>) -> CodeStats {
        let tree = Node::from_weights(weights).unwrap();
        let encoder = Encoder::from_tree(&tree);
        CodeStats::new(&tree, &encoder)
    }

    #[test]
    fn classic_stats() {
        let s = stats(vec![
            ('a', 5),
            ('b', 9),
            ('c', 12),
            ('d', 13),
            ('e', 16),
            ('f', 45),
        ]);

        assert_eq!(s.total_weight, 100);
        assert_eq!(s.mean_length, TotalF64(2.24));
        assert!((s.entropy.0 - 2.2199).abs() < 1e-3, "{:?}", s.entropy);
        assert!(s.efficiency.0 > 0.98 && s.efficiency.0 <= 1.0);
    }

    #[test]
    fn powers_of_two_are_optimal() {
        let s = stats(vec![('a', 1), ('b', 1), ('c', 2), ('d', 4)]);

        assert_eq!(s.mean_length, TotalF64(1.75));
        assert_eq!(s.entropy, TotalF64(1.75));
        assert_eq!(s.efficiency, TotalF64(1.0));
    }

    #[test]
    fn single_symbol_costs_one_bit() {
        let s = stats(vec![('x', 5)]);

        assert_eq!(s.mean_length, TotalF64(1.0));
        assert_eq!(s.entropy, TotalF64(0.0));
    }

    #[test]
    fn zero_weights_give_zero_stats() {
        let s = stats(vec![('a', 0), ('b', 0)]);
        assert_eq!(s.total_weight, 0);
        assert_eq!(s.mean_length, TotalF64(0.0));
        assert_eq!(s.efficiency, TotalF64(0.0));
    }
}
