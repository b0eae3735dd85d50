//! Gain-node registry shared by the backend implementations.

use std::collections::HashMap;

use super::NodeId;

/// Walk limit when resolving a node's path to the output.
const MAX_CHAIN_HOPS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Output,
    Node(NodeId),
}

#[derive(Debug, Clone, Copy)]
struct Node {
    gain: f32,
    target: Option<Target>,
}

/// Routing table of gain nodes.
///
/// Each node scales its input by `gain` and feeds either the output, another
/// node, or nothing at all. A node without a path to the output contributes
/// silence, so `effective_gain` resolves to `0.0` for it.
#[derive(Debug)]
pub(crate) struct NodeGraph {
    nodes: HashMap<NodeId, Node>,
    next_id: u64,
}

impl NodeGraph {
    pub(crate) fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            next_id: 0,
        }
    }

    pub(crate) fn create(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                gain: 1.0,
                target: None,
            },
        );
        id
    }

    pub(crate) fn connect_to_output(&mut self, node: NodeId) {
        if let Some(entry) = self.nodes.get_mut(&node) {
            entry.target = Some(Target::Output);
        }
    }

    pub(crate) fn connect(&mut self, node: NodeId, target: NodeId) {
        if let Some(entry) = self.nodes.get_mut(&node) {
            entry.target = Some(Target::Node(target));
        }
    }

    pub(crate) fn disconnect(&mut self, node: NodeId) {
        if let Some(entry) = self.nodes.get_mut(&node) {
            entry.target = None;
        }
    }

    pub(crate) fn set_gain(&mut self, node: NodeId, gain: f32) {
        if let Some(entry) = self.nodes.get_mut(&node) {
            entry.gain = gain;
        }
    }

    pub(crate) fn gain(&self, node: NodeId) -> f32 {
        self.nodes.get(&node).map(|entry| entry.gain).unwrap_or(1.0)
    }

    /// Product of gains along the chain from `node` to the output, or `0.0`
    /// when the chain never reaches it.
    pub(crate) fn effective_gain(&self, node: NodeId) -> f32 {
        let mut product = 1.0;
        let mut current = node;
        for _ in 0..MAX_CHAIN_HOPS {
            let entry = match self.nodes.get(&current) {
                Some(entry) => entry,
                None => return 0.0,
            };
            product *= entry.gain;
            match entry.target {
                Some(Target::Output) => return product,
                Some(Target::Node(next)) => current = next,
                None => return 0.0,
            }
        }
        0.0
    }

    pub(crate) fn reaches_output(&self, node: NodeId) -> bool {
        let mut current = node;
        for _ in 0..MAX_CHAIN_HOPS {
            match self.nodes.get(&current).and_then(|entry| entry.target) {
                Some(Target::Output) => return true,
                Some(Target::Node(next)) => current = next,
                None => return false,
            }
        }
        false
    }
}
