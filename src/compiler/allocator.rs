use crate::graph::{GraphSnapshot, Node, NodeBody, VariableSlot};
use ahash::{AHashMap, AHashSet};
use tracing::debug;

/// Hands out `VALUE_n` slots for one compile pass and remembers which node owns which.
#[derive(Debug, Clone, Default)]
pub struct VariableAllocator {
    taken: AHashSet<VariableSlot>,
    bindings: AHashMap<String, VariableSlot>,
    order: Vec<String>,
}

impl VariableAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// An allocator with every slot an Assignment in `snapshot` asks for already reserved,
    /// so automatic numbering never collides with a user's choice.
    pub fn for_snapshot(snapshot: &GraphSnapshot) -> Self {
        let mut allocator = Self::new();
        for node in &snapshot.nodes {
            if let NodeBody::Assignment(assignment) = &node.body {
                if let Some(slot) = assignment.bound_variable {
                    allocator.reserve(slot);
                }
            }
        }
        allocator
    }

    pub fn reserve(&mut self, slot: VariableSlot) {
        self.taken.insert(slot);
    }

    /// Binds `node` to a slot: an Assignment's chosen variable, otherwise the lowest free slot.
    ///
    /// Binding the same node twice returns the first slot. `None` means every slot is taken.
    pub fn bind(&mut self, node: &Node) -> Option<VariableSlot> {
        if let Some(slot) = self.bindings.get(&node.id) {
            return Some(*slot);
        }
        let chosen = match &node.body {
            NodeBody::Assignment(assignment) => assignment.bound_variable,
            _ => None,
        };
        let slot = match chosen {
            Some(slot) => slot,
            None => VariableSlot::all().find(|slot| !self.taken.contains(slot))?,
        };
        self.taken.insert(slot);
        self.bindings.insert(node.id.clone(), slot);
        self.order.push(node.id.clone());
        debug!(node_id = %node.id, %slot, "bound variable");
        Some(slot)
    }

    pub fn slot_of(&self, node_id: &str) -> Option<VariableSlot> {
        self.bindings.get(node_id).copied()
    }

    /// `(node id, slot)` pairs in the order they were bound.
    pub fn bindings(&self) -> Vec<(String, VariableSlot)> {
        self.order
            .iter()
            .filter_map(|id| self.bindings.get(id).map(|slot| (id.clone(), *slot)))
            .collect()
    }
}
