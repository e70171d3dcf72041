use derivative::Derivative;
use serde::Deserialize;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use tracing::{debug, trace};

use crate::error::{Error, Result};

/// How the two lightest nodes are found on each merge round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Full scan of the working list per round, O(n²).
    #[default]
    LinearScan,
    /// Binary heap keyed by weight and rank, O(n log n).
    PriorityQueue,
}

/// Which child of its parent a node is. Left edges read as `0`, right
/// edges as `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Left,
    Right,
}

impl Edge {
    pub fn bit(self) -> bool {
        matches!(self, Edge::Right)
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind<Symbol> {
    Leaf(Symbol),
    Internal {
        left: Box<Node<Symbol>>,
        right: Box<Node<Symbol>>,
    },
}

/// A node of a Huffman tree.
///
/// Nodes compare by `(weight, rank)` only. The rank is the input position
/// for leaves and continues counting in creation order for internal
/// nodes, so no two nodes of one tree compare equal and every tie on
/// weight is settled by age.
#[derive(Debug, Clone, Derivative)]
#[derivative(
    PartialEq(bound = ""),
    Eq(bound = ""),
    PartialOrd(bound = ""),
    Ord(bound = "")
)]
pub struct Node<Symbol> {
    weight: u64,
    rank: usize,

    #[derivative(PartialEq = "ignore")]
    #[derivative(PartialOrd = "ignore")]
    #[derivative(Ord = "ignore")]
    kind: NodeKind<Symbol>,
}

impl<Symbol> Node<Symbol>
where
    Symbol: Hash + Eq + Clone + Debug,
{
    fn leaf(s: Symbol, weight: u64, rank: usize) -> Self {
        Self {
            weight,
            rank,
            kind: NodeKind::Leaf(s),
        }
    }

    fn from_children(left: Node<Symbol>, right: Node<Symbol>, rank: usize) -> Result<Self> {
        trace!(
            left_weight = left.weight,
            left_rank = left.rank,
            right_weight = right.weight,
            right_rank = right.rank,
            rank,
            "merging nodes"
        );
        let weight = left
            .weight
            .checked_add(right.weight)
            .ok_or(Error::WeightOverflow)?;

        Ok(Self {
            weight,
            rank,
            kind: NodeKind::Internal {
                left: Box::new(left),
                right: Box::new(right),
            },
        })
    }

    /// Builds a tree from `(symbol, weight)` pairs using the default
    /// strategy.
    pub fn from_weights(weights: impl IntoIterator<Item = (Symbol, u64)>) -> Result<Self> {
        Self::build(weights, Strategy::default())
    }

    /// Builds a tree from `(symbol, weight)` pairs.
    ///
    /// On each round the two smallest nodes are merged, the smaller
    /// becoming the left child. Input order decides between equal weights:
    /// earlier entries, then older internal nodes, are taken first.
    pub fn build(
        weights: impl IntoIterator<Item = (Symbol, u64)>,
        strategy: Strategy,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut leaves = Vec::new();
        for (rank, (s, weight)) in weights.into_iter().enumerate() {
            if !seen.insert(s.clone()) {
                return Err(Error::DuplicateSymbol {
                    symbol: format!("{:?}", s),
                });
            }
            leaves.push(Node::leaf(s, weight, rank));
        }

        if leaves.is_empty() {
            return Err(Error::EmptyInput);
        }

        let num_symbols = leaves.len();
        let root = match strategy {
            Strategy::LinearScan => merge_by_scan(leaves)?,
            Strategy::PriorityQueue => merge_by_heap(leaves)?,
        };

        debug!(num_symbols, ?strategy, root_weight = root.weight, "built huffman tree");
        Ok(root)
    }

    /// Builds a tree whose weights are the occurrence counts of each
    /// symbol in `samples`. Symbols are ranked by first appearance.
    pub fn from_samples(samples: impl IntoIterator<Item = Symbol>) -> Result<Self> {
        let mut index: HashMap<Symbol, usize> = HashMap::new();
        let mut counts: Vec<(Symbol, u64)> = Vec::new();
        for s in samples {
            match index.get(&s) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    index.insert(s.clone(), counts.len());
                    counts.push((s, 1));
                }
            }
        }

        Self::from_weights(counts)
    }
}

impl<Symbol> Node<Symbol> {
    pub fn weight(&self) -> u64 {
        self.weight
    }

    pub fn kind(&self) -> &NodeKind<Symbol> {
        &self.kind
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    /// The symbol, for leaves.
    pub fn symbol(&self) -> Option<&Symbol> {
        match &self.kind {
            NodeKind::Leaf(s) => Some(s),
            NodeKind::Internal { .. } => None,
        }
    }

    pub fn left(&self) -> Option<&Node<Symbol>> {
        match &self.kind {
            NodeKind::Internal { left, .. } => Some(left),
            NodeKind::Leaf(_) => None,
        }
    }

    pub fn right(&self) -> Option<&Node<Symbol>> {
        match &self.kind {
            NodeKind::Internal { right, .. } => Some(right),
            NodeKind::Leaf(_) => None,
        }
    }

    /// Pre-order walk of the tree, left subtree before right.
    pub fn traverse(&self) -> Traverse<'_, Symbol> {
        Traverse {
            stack: vec![Visit {
                node: self,
                edge: None,
                depth: 0,
            }],
        }
    }
}

/// One step of a [`Traverse`].
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a, Symbol> {
    pub node: &'a Node<Symbol>,
    /// The edge from the parent, `None` at the root.
    pub edge: Option<Edge>,
    pub depth: usize,
}

/// Read-only pre-order iterator over a tree. Uses an explicit stack, so
/// deep trees do not grow the call stack.
#[derive(Debug, Clone)]
pub struct Traverse<'a, Symbol> {
    stack: Vec<Visit<'a, Symbol>>,
}

impl<'a, Symbol> Iterator for Traverse<'a, Symbol> {
    type Item = Visit<'a, Symbol>;

    fn next(&mut self) -> Option<Self::Item> {
        let visit = self.stack.pop()?;
        if let NodeKind::Internal { left, right } = &visit.node.kind {
            let depth = visit.depth + 1;
            self.stack.push(Visit {
                node: right,
                edge: Some(Edge::Right),
                depth,
            });
            self.stack.push(Visit {
                node: left,
                edge: Some(Edge::Left),
                depth,
            });
        }

        Some(visit)
    }
}

/// Positions of the smallest and second smallest nodes. Needs at least two
/// nodes.
fn two_smallest<Symbol>(nodes: &[Node<Symbol>]) -> (usize, usize) {
    let (mut first, mut second) = if nodes[1] < nodes[0] { (1, 0) } else { (0, 1) };
    for (i, n) in nodes.iter().enumerate().skip(2) {
        if *n < nodes[first] {
            second = first;
            first = i;
        } else if *n < nodes[second] {
            second = i;
        }
    }

    (first, second)
}

fn merge_by_scan<Symbol>(mut nodes: Vec<Node<Symbol>>) -> Result<Node<Symbol>>
where
    Symbol: Hash + Eq + Clone + Debug,
{
    let mut next_rank = nodes.len();
    while nodes.len() > 1 {
        let (first, second) = two_smallest(&nodes);

        // remove the higher index first so the lower one stays valid
        let (left, right) = if first > second {
            let left = nodes.swap_remove(first);
            (left, nodes.swap_remove(second))
        } else {
            let right = nodes.swap_remove(second);
            (nodes.swap_remove(first), right)
        };

        nodes.push(Node::from_children(left, right, next_rank)?);
        next_rank += 1;
    }

    nodes.pop().ok_or(Error::EmptyInput)
}

fn merge_by_heap<Symbol>(nodes: Vec<Node<Symbol>>) -> Result<Node<Symbol>>
where
    Symbol: Hash + Eq + Clone + Debug,
{
    let mut next_rank = nodes.len();
    let mut pq: BinaryHeap<_> = nodes.into_iter().map(Reverse).collect();

    while pq.len() > 1 {
        let (Some(Reverse(left)), Some(Reverse(right))) = (pq.pop(), pq.pop()) else {
            break;
        };
        pq.push(Reverse(Node::from_children(left, right, next_rank)?));
        next_rank += 1;
    }

    pq.pop().map(|r| r.0).ok_or(Error::EmptyInput)
}
