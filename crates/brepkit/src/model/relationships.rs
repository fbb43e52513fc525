use petgraph::Direction;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::component::ComponentId;

/// Nature of a directed relation edge.
///
/// A `Boundary` edge goes from the boundary component to the one it bounds;
/// an `Internal` edge from the embedded component to its embedder; an `Item`
/// edge from the item to its collection. The opposite readings (incidence,
/// embedding, collection) are the same edges walked backwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    Boundary,
    Internal,
    Item,
}

/// Directed labelled graph over the components of one model.
///
/// Both sides of every relation are registered atomically; removing a
/// component removes all its edges. Neighbour enumerations follow edge
/// insertion order.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Relationships {
    graph: StableDiGraph<ComponentId, RelationKind>,
    nodes: FxHashMap<Uuid, NodeIndex>,
}

impl Relationships {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nb_components(&self) -> usize {
        self.nodes.len()
    }

    pub fn nb_relations(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn has_component(&self, id: Uuid) -> bool {
        self.nodes.contains_key(&id)
    }

    pub(crate) fn register_component(&mut self, component: ComponentId) {
        if self.nodes.contains_key(&component.id()) {
            return;
        }
        let node = self.graph.add_node(component);
        self.nodes.insert(component.id(), node);
    }

    /// Removes the component and every relation it takes part in.
    pub(crate) fn unregister_component(&mut self, id: Uuid) {
        if let Some(node) = self.nodes.remove(&id) {
            self.graph.remove_node(node);
        }
    }

    fn node(&self, id: Uuid) -> Option<NodeIndex> {
        self.nodes.get(&id).copied()
    }

    fn add_relation(&mut self, from: ComponentId, to: ComponentId, kind: RelationKind) {
        self.register_component(from);
        self.register_component(to);
        let from = self.nodes[&from.id()];
        let to = self.nodes[&to.id()];
        let already = self
            .graph
            .edges_connecting(from, to)
            .any(|edge| *edge.weight() == kind);
        if !already {
            self.graph.add_edge(from, to, kind);
        }
    }

    /// Declares `boundary` on the boundary of `incidence`.
    pub(crate) fn add_boundary_relation(&mut self, boundary: ComponentId, incidence: ComponentId) {
        self.add_relation(boundary, incidence, RelationKind::Boundary);
    }

    /// Declares `internal` strictly inside `embedding`.
    pub(crate) fn add_internal_relation(&mut self, internal: ComponentId, embedding: ComponentId) {
        self.add_relation(internal, embedding, RelationKind::Internal);
    }

    /// Declares `item` part of `collection`.
    pub(crate) fn add_item_relation(&mut self, item: ComponentId, collection: ComponentId) {
        self.add_relation(item, collection, RelationKind::Item);
    }

    pub(crate) fn remove_relation(&mut self, first: Uuid, second: Uuid) {
        let (Some(first), Some(second)) = (self.node(first), self.node(second)) else {
            return;
        };
        while let Some(edge) = self
            .graph
            .edges_connecting(first, second)
            .chain(self.graph.edges_connecting(second, first))
            .next()
            .map(|edge| edge.id())
        {
            self.graph.remove_edge(edge);
        }
    }

    fn neighbors(
        &self,
        id: Uuid,
        kind: RelationKind,
        direction: Direction,
    ) -> Vec<ComponentId> {
        let Some(node) = self.node(id) else {
            return Vec::new();
        };
        let mut neighbors: Vec<ComponentId> = self
            .graph
            .edges_directed(node, direction)
            .filter(|edge| *edge.weight() == kind)
            .map(|edge| {
                let other = if direction == Direction::Incoming {
                    edge.source()
                } else {
                    edge.target()
                };
                self.graph[other]
            })
            .collect();
        // StableGraph walks adjacency lists most-recent first.
        neighbors.reverse();
        neighbors
    }

    /// Components on the boundary of `id`.
    pub fn boundaries(&self, id: Uuid) -> Vec<ComponentId> {
        self.neighbors(id, RelationKind::Boundary, Direction::Incoming)
    }

    /// Components `id` is a boundary of.
    pub fn incidences(&self, id: Uuid) -> Vec<ComponentId> {
        self.neighbors(id, RelationKind::Boundary, Direction::Outgoing)
    }

    /// Components lying strictly inside `id`.
    pub fn internals(&self, id: Uuid) -> Vec<ComponentId> {
        self.neighbors(id, RelationKind::Internal, Direction::Incoming)
    }

    /// Components `id` lies strictly inside of.
    pub fn embeddings(&self, id: Uuid) -> Vec<ComponentId> {
        self.neighbors(id, RelationKind::Internal, Direction::Outgoing)
    }

    /// Items grouped by the collection `id`.
    pub fn items(&self, id: Uuid) -> Vec<ComponentId> {
        self.neighbors(id, RelationKind::Item, Direction::Incoming)
    }

    /// Collections containing `id`.
    pub fn collections(&self, id: Uuid) -> Vec<ComponentId> {
        self.neighbors(id, RelationKind::Item, Direction::Outgoing)
    }

    pub fn is_boundary(&self, boundary: Uuid, incidence: Uuid) -> bool {
        self.incidences(boundary)
            .iter()
            .any(|component| component.id() == incidence)
    }

    pub fn is_internal(&self, internal: Uuid, embedding: Uuid) -> bool {
        self.embeddings(internal)
            .iter()
            .any(|component| component.id() == embedding)
    }

    pub fn is_item(&self, item: Uuid, collection: Uuid) -> bool {
        self.collections(item)
            .iter()
            .any(|component| component.id() == collection)
    }

    /// Every relation, as (from, to, kind), in insertion order.
    pub fn relations(&self) -> Vec<(ComponentId, ComponentId, RelationKind)> {
        self.graph
            .edge_indices()
            .map(|edge| {
                let (from, to) = self.graph.edge_endpoints(edge).expect("live edge");
                (self.graph[from], self.graph[to], self.graph[edge])
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::component::ComponentType;

    fn component(component_type: ComponentType) -> ComponentId {
        ComponentId::new(component_type, Uuid::new_v4())
    }

    #[test]
    fn boundary_relations_are_symmetric() {
        let mut relationships = Relationships::new();
        let corner = component(ComponentType::Corner);
        let line = component(ComponentType::Line);
        relationships.add_boundary_relation(corner, line);
        assert_eq!(relationships.boundaries(line.id()), vec![corner]);
        assert_eq!(relationships.incidences(corner.id()), vec![line]);
        assert!(relationships.is_boundary(corner.id(), line.id()));
        assert!(!relationships.is_boundary(line.id(), corner.id()));
    }

    #[test]
    fn duplicate_relations_collapse() {
        let mut relationships = Relationships::new();
        let line = component(ComponentType::Line);
        let surface = component(ComponentType::Surface);
        relationships.add_boundary_relation(line, surface);
        relationships.add_boundary_relation(line, surface);
        assert_eq!(relationships.nb_relations(), 1);
        relationships.add_internal_relation(line, surface);
        assert_eq!(relationships.nb_relations(), 2);
    }

    #[test]
    fn removing_a_component_removes_its_relations() {
        let mut relationships = Relationships::new();
        let corner = component(ComponentType::Corner);
        let line0 = component(ComponentType::Line);
        let line1 = component(ComponentType::Line);
        relationships.add_boundary_relation(corner, line0);
        relationships.add_boundary_relation(corner, line1);
        assert_eq!(relationships.incidences(corner.id()).len(), 2);
        relationships.unregister_component(line0.id());
        assert_eq!(relationships.incidences(corner.id()), vec![line1]);
        assert_eq!(relationships.nb_relations(), 1);
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut relationships = Relationships::new();
        let surface = component(ComponentType::Surface);
        let lines: Vec<ComponentId> =
            (0..4).map(|_| component(ComponentType::Line)).collect();
        for &line in &lines {
            relationships.add_boundary_relation(line, surface);
        }
        assert_eq!(relationships.boundaries(surface.id()), lines);
    }
}
