//! The in-memory factor catalog.
//!
//! Factors and composites are nodes in a single graph; each composite holds a
//! weighted edge to every factor it references. Reverse lookups ("which
//! composites use factor N") are edge walks, and nodes are never deleted so
//! indices stay stable: superseded factors remain as history and removed
//! composites are only flagged.

use emfactor_core::composite::{
    aggregate, validate, ComponentInput, ComponentSpec, CompositeComponent, CompositeFactor,
    FormulaType,
};
use emfactor_core::errors::{FactorError, FactorResult};
use emfactor_core::factor::{EmissionFactor, FactorId};
use is_close::is_close;
use log::{debug, warn};
use petgraph::graph::{Graph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
enum CatalogNode {
    Factor(EmissionFactor),
    Composite {
        composite: CompositeFactor,
        removed: bool,
    },
}

/// A catalog of emission factors and the composites built from them.
///
/// Single-writer, in-memory; the surrounding session owns all mutation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactorCatalog {
    graph: Graph<CatalogNode, f64>,
    index: HashMap<FactorId, NodeIndex>,
    next_id: u64,
}

impl FactorCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out the next unused id.
    pub fn allocate_id(&mut self) -> FactorId {
        while self.index.contains_key(&FactorId(self.next_id)) {
            self.next_id += 1;
        }
        let id = FactorId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Adds a factor under its own id.
    ///
    /// Factors are immutable once added; corrections go through
    /// [`supersede_factor`](Self::supersede_factor).
    pub fn add_factor(&mut self, factor: EmissionFactor) -> FactorResult<FactorId> {
        let id = factor.id;
        if self.index.contains_key(&id) {
            return Err(FactorError::DuplicateFactor(id));
        }
        let node = self.graph.add_node(CatalogNode::Factor(factor));
        self.index.insert(id, node);
        self.next_id = self.next_id.max(id.0 + 1);
        debug!("added factor {id}");
        Ok(id)
    }

    pub fn get_factor(&self, id: FactorId) -> Option<&EmissionFactor> {
        match self.index.get(&id).and_then(|n| self.graph.node_weight(*n)) {
            Some(CatalogNode::Factor(factor)) => Some(factor),
            _ => None,
        }
    }

    /// All factors, in insertion order.
    pub fn factors(&self) -> impl Iterator<Item = &EmissionFactor> {
        self.graph.node_weights().filter_map(|node| match node {
            CatalogNode::Factor(factor) => Some(factor),
            _ => None,
        })
    }

    /// Returns a live composite; removed composites are not found.
    pub fn get_composite(&self, id: FactorId) -> Option<&CompositeFactor> {
        match self.index.get(&id).and_then(|n| self.graph.node_weight(*n)) {
            Some(CatalogNode::Composite {
                composite,
                removed: false,
            }) => Some(composite),
            _ => None,
        }
    }

    /// All live composites, in insertion order.
    pub fn composites(&self) -> impl Iterator<Item = &CompositeFactor> {
        self.graph.node_weights().filter_map(|node| match node {
            CatalogNode::Composite {
                composite,
                removed: false,
            } => Some(composite),
            _ => None,
        })
    }

    /// Number of factors plus live composites.
    pub fn len(&self) -> usize {
        self.factors().count() + self.composites().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validates, aggregates, and stores a new composite.
    ///
    /// Nothing is persisted when a component id cannot be resolved or the
    /// definition fails validation; the validation error strings come back
    /// verbatim inside [`FactorError::InvalidComposite`].
    pub fn create_composite(
        &mut self,
        name: impl Into<String>,
        formula: FormulaType,
        unit: impl Into<String>,
        components: Vec<CompositeComponent>,
    ) -> FactorResult<FactorId> {
        let name = name.into();
        let unit = unit.into();
        let (specs, inputs) = self.resolve_components(&components)?;
        let validation = validate(&specs, &unit);
        if !validation.valid {
            return Err(FactorError::InvalidComposite {
                name,
                reasons: validation.errors,
            });
        }
        let value = aggregate(&inputs, formula);

        let id = self.allocate_id();
        let node = self.graph.add_node(CatalogNode::Composite {
            composite: CompositeFactor {
                id,
                name,
                formula,
                unit,
                components: components.clone(),
                value,
            },
            removed: false,
        });
        self.index.insert(id, node);
        self.connect_components(node, &components);
        debug!("created composite {id} from {} components", components.len());
        Ok(id)
    }

    /// Appends a component and recomputes the cached value.
    pub fn add_component(
        &mut self,
        id: FactorId,
        component: CompositeComponent,
    ) -> FactorResult<()> {
        let node = self.live_composite_node(id)?;
        let mut components = self.composite_at(node).components.clone();
        components.push(component);
        self.commit_components(node, components)
    }

    /// Drops every component referencing `factor` and recomputes.
    ///
    /// Removing the last component is rejected, since an empty composite
    /// fails validation.
    pub fn remove_component(&mut self, id: FactorId, factor: FactorId) -> FactorResult<()> {
        let node = self.live_composite_node(id)?;
        let mut components = self.composite_at(node).components.clone();
        let before = components.len();
        components.retain(|c| c.factor != factor);
        if components.len() == before {
            return Err(FactorError::UnknownFactor(factor));
        }
        self.commit_components(node, components)
    }

    /// Changes the weight of the component referencing `factor` and
    /// recomputes.
    pub fn set_component_weight(
        &mut self,
        id: FactorId,
        factor: FactorId,
        weight: f64,
    ) -> FactorResult<()> {
        let node = self.live_composite_node(id)?;
        let mut components = self.composite_at(node).components.clone();
        let mut found = false;
        for component in &mut components {
            if component.factor == factor {
                component.weight = weight;
                found = true;
            }
        }
        if !found {
            return Err(FactorError::UnknownFactor(factor));
        }
        self.commit_components(node, components)
    }

    /// Soft-removes a composite: the record stays for history but no lookup,
    /// recompute, or mutation will touch it again.
    pub fn remove_composite(&mut self, id: FactorId) -> FactorResult<()> {
        let node = self.live_composite_node(id)?;
        self.disconnect_components(node);
        if let Some(CatalogNode::Composite { removed, .. }) = self.graph.node_weight_mut(node) {
            *removed = true;
        }
        debug!("removed composite {id}");
        Ok(())
    }

    /// Ids of live composites that reference the given factor, ascending.
    pub fn composites_using(&self, factor: FactorId) -> Vec<FactorId> {
        let Some(&node) = self.index.get(&factor) else {
            return Vec::new();
        };
        let mut ids: Vec<FactorId> = self
            .graph
            .edges_directed(node, Direction::Incoming)
            .filter_map(|edge| match self.graph.node_weight(edge.source()) {
                Some(CatalogNode::Composite {
                    composite,
                    removed: false,
                }) => Some(composite.id),
                _ => None,
            })
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Publishes a replacement for an existing factor.
    ///
    /// The replacement gets a fresh id and `version = old version + 1`; the
    /// old record is kept. Live composites referencing the old factor are
    /// re-pointed at the replacement and recomputed, except where the
    /// replacement would no longer validate (e.g. its unit changed) — those
    /// stay on the old record and a warning is logged.
    pub fn supersede_factor(
        &mut self,
        old: FactorId,
        replacement: EmissionFactor,
    ) -> FactorResult<FactorId> {
        let old_version = self
            .get_factor(old)
            .ok_or(FactorError::UnknownFactor(old))?
            .provenance
            .version;
        let dependents = self.composites_using(old);

        let id = self.allocate_id();
        let mut factor = replacement;
        factor.id = id;
        factor.provenance.version = old_version + 1;
        let node = self.graph.add_node(CatalogNode::Factor(factor));
        self.index.insert(id, node);

        for composite_id in dependents {
            let Ok(composite_node) = self.live_composite_node(composite_id) else {
                continue;
            };
            let mut components = self.composite_at(composite_node).components.clone();
            for component in &mut components {
                if component.factor == old {
                    component.factor = id;
                }
            }
            if let Err(err) = self.commit_components(composite_node, components) {
                warn!("composite {composite_id} left on factor {old}: {err}");
            }
        }

        debug!("factor {old} superseded by {id}");
        Ok(id)
    }

    /// Checks that every live composite's cached value still equals the
    /// aggregation of its resolved components.
    pub fn verify_cached_values(&self) -> bool {
        self.composites().all(|composite| {
            match self.resolve_components(&composite.components) {
                Ok((_, inputs)) => {
                    is_close!(composite.value, aggregate(&inputs, composite.formula))
                }
                Err(_) => false,
            }
        })
    }

    fn resolve_components(
        &self,
        components: &[CompositeComponent],
    ) -> FactorResult<(Vec<ComponentSpec>, Vec<ComponentInput>)> {
        let mut specs = Vec::with_capacity(components.len());
        let mut inputs = Vec::with_capacity(components.len());
        for component in components {
            let factor = self
                .get_factor(component.factor)
                .ok_or(FactorError::UnknownFactor(component.factor))?;
            specs.push(ComponentSpec::new(factor.unit.clone(), component.weight));
            inputs.push(ComponentInput::new(factor.value, component.weight));
        }
        Ok((specs, inputs))
    }

    fn live_composite_node(&self, id: FactorId) -> FactorResult<NodeIndex> {
        let node = *self
            .index
            .get(&id)
            .ok_or(FactorError::UnknownComposite(id))?;
        match self.graph.node_weight(node) {
            Some(CatalogNode::Composite { removed: false, .. }) => Ok(node),
            Some(CatalogNode::Composite { removed: true, .. }) => {
                Err(FactorError::RemovedComposite(id))
            }
            _ => Err(FactorError::UnknownComposite(id)),
        }
    }

    /// Only call with a node known to hold a composite.
    fn composite_at(&self, node: NodeIndex) -> &CompositeFactor {
        match &self.graph[node] {
            CatalogNode::Composite { composite, .. } => composite,
            CatalogNode::Factor(factor) => {
                unreachable!("node {node:?} holds factor {}", factor.id)
            }
        }
    }

    /// Re-validates, recomputes, and stores a new component list for the
    /// composite at `node`. On error the composite is left untouched.
    fn commit_components(
        &mut self,
        node: NodeIndex,
        components: Vec<CompositeComponent>,
    ) -> FactorResult<()> {
        let (name, unit, formula) = {
            let composite = self.composite_at(node);
            (
                composite.name.clone(),
                composite.unit.clone(),
                composite.formula,
            )
        };
        let (specs, inputs) = self.resolve_components(&components)?;
        let validation = validate(&specs, &unit);
        if !validation.valid {
            return Err(FactorError::InvalidComposite {
                name,
                reasons: validation.errors,
            });
        }
        let value = aggregate(&inputs, formula);

        self.disconnect_components(node);
        self.connect_components(node, &components);
        if let Some(CatalogNode::Composite { composite, .. }) = self.graph.node_weight_mut(node) {
            composite.components = components;
            composite.value = value;
            debug!("recomputed composite {}: {}", composite.id, composite.value);
        }
        Ok(())
    }

    fn connect_components(&mut self, node: NodeIndex, components: &[CompositeComponent]) {
        for component in components {
            if let Some(&target) = self.index.get(&component.factor) {
                self.graph.add_edge(node, target, component.weight);
            }
        }
    }

    fn disconnect_components(&mut self, node: NodeIndex) {
        while let Some(edge) = self.graph.first_edge(node, Direction::Outgoing) {
            self.graph.remove_edge(edge);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emfactor_core::factor::SourceKind;

    fn factor(id: u64, value: f64, unit: &str) -> EmissionFactor {
        EmissionFactor::new(
            FactorId(id),
            format!("factor {id}"),
            value,
            unit,
            SourceKind::Standard,
        )
    }

    fn seeded() -> FactorCatalog {
        let mut catalog = FactorCatalog::new();
        catalog.add_factor(factor(1, 10.0, "kg CO2e")).unwrap();
        catalog.add_factor(factor(2, 20.0, "kg CO2e")).unwrap();
        catalog.add_factor(factor(3, 5.0, "kg CO2e/kg")).unwrap();
        catalog
    }

    #[test]
    fn add_and_lookup() {
        let catalog = seeded();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get_factor(FactorId(2)).unwrap().value, 20.0);
        assert!(catalog.get_factor(FactorId(99)).is_none());
    }

    #[test]
    fn duplicate_factor_rejected() {
        let mut catalog = seeded();
        let err = catalog.add_factor(factor(1, 1.0, "kg CO2e")).unwrap_err();
        assert_eq!(err, FactorError::DuplicateFactor(FactorId(1)));
    }

    #[test]
    fn create_weighted_composite() {
        let mut catalog = seeded();
        let id = catalog
            .create_composite(
                "blend",
                FormulaType::Weighted,
                "kg CO2e",
                vec![
                    CompositeComponent::new(FactorId(1), 2.0),
                    CompositeComponent::new(FactorId(2), 3.0),
                ],
            )
            .unwrap();
        let composite = catalog.get_composite(id).unwrap();
        assert_eq!(composite.value, 16.0);
        assert!(catalog.verify_cached_values());
    }

    #[test]
    fn invalid_composite_not_persisted() {
        let mut catalog = seeded();
        let before = catalog.len();
        let err = catalog
            .create_composite(
                "bad",
                FormulaType::Sum,
                "kg CO2e",
                vec![CompositeComponent::new(FactorId(3), 1.0)],
            )
            .unwrap_err();
        match err {
            FactorError::InvalidComposite { name, reasons } => {
                assert_eq!(name, "bad");
                assert!(reasons[0].contains("kg CO2e/kg"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(catalog.len(), before);
    }

    #[test]
    fn unknown_component_reference() {
        let mut catalog = seeded();
        let err = catalog
            .create_composite(
                "dangling",
                FormulaType::Sum,
                "kg CO2e",
                vec![CompositeComponent::new(FactorId(42), 1.0)],
            )
            .unwrap_err();
        assert_eq!(err, FactorError::UnknownFactor(FactorId(42)));
    }

    #[test]
    fn component_mutations_recompute() {
        let mut catalog = seeded();
        let id = catalog
            .create_composite(
                "sum",
                FormulaType::Sum,
                "kg CO2e",
                vec![CompositeComponent::new(FactorId(1), 1.0)],
            )
            .unwrap();
        assert_eq!(catalog.get_composite(id).unwrap().value, 10.0);

        catalog
            .add_component(id, CompositeComponent::new(FactorId(2), 2.0))
            .unwrap();
        assert_eq!(catalog.get_composite(id).unwrap().value, 50.0);

        catalog
            .set_component_weight(id, FactorId(2), 0.5)
            .unwrap();
        assert_eq!(catalog.get_composite(id).unwrap().value, 20.0);

        catalog.remove_component(id, FactorId(1)).unwrap();
        assert_eq!(catalog.get_composite(id).unwrap().value, 10.0);
        assert!(catalog.verify_cached_values());
    }

    #[test]
    fn rejected_mutation_leaves_composite_untouched() {
        let mut catalog = seeded();
        let id = catalog
            .create_composite(
                "sum",
                FormulaType::Sum,
                "kg CO2e",
                vec![CompositeComponent::new(FactorId(1), 1.0)],
            )
            .unwrap();

        // Incompatible unit
        let err = catalog
            .add_component(id, CompositeComponent::new(FactorId(3), 1.0))
            .unwrap_err();
        assert!(matches!(err, FactorError::InvalidComposite { .. }));

        // Non-positive weight
        let err = catalog
            .set_component_weight(id, FactorId(1), 0.0)
            .unwrap_err();
        assert!(matches!(err, FactorError::InvalidComposite { .. }));

        // Emptying the component list
        let err = catalog.remove_component(id, FactorId(1)).unwrap_err();
        assert!(matches!(err, FactorError::InvalidComposite { .. }));

        let composite = catalog.get_composite(id).unwrap();
        assert_eq!(composite.components.len(), 1);
        assert_eq!(composite.value, 10.0);
    }

    #[test]
    fn soft_removal() {
        let mut catalog = seeded();
        let id = catalog
            .create_composite(
                "gone",
                FormulaType::Sum,
                "kg CO2e",
                vec![CompositeComponent::new(FactorId(1), 1.0)],
            )
            .unwrap();
        catalog.remove_composite(id).unwrap();

        assert!(catalog.get_composite(id).is_none());
        assert!(catalog.composites_using(FactorId(1)).is_empty());
        assert_eq!(
            catalog.remove_composite(id).unwrap_err(),
            FactorError::RemovedComposite(id)
        );
        assert_eq!(
            catalog
                .add_component(id, CompositeComponent::new(FactorId(2), 1.0))
                .unwrap_err(),
            FactorError::RemovedComposite(id)
        );
    }

    #[test]
    fn reverse_lookup() {
        let mut catalog = seeded();
        let a = catalog
            .create_composite(
                "a",
                FormulaType::Sum,
                "kg CO2e",
                vec![CompositeComponent::new(FactorId(1), 1.0)],
            )
            .unwrap();
        let b = catalog
            .create_composite(
                "b",
                FormulaType::Weighted,
                "kg CO2e",
                vec![
                    CompositeComponent::new(FactorId(1), 1.0),
                    CompositeComponent::new(FactorId(2), 1.0),
                ],
            )
            .unwrap();

        assert_eq!(catalog.composites_using(FactorId(1)), vec![a, b]);
        assert_eq!(catalog.composites_using(FactorId(2)), vec![b]);
        assert!(catalog.composites_using(FactorId(3)).is_empty());
    }

    #[test]
    fn supersede_repoints_and_recomputes() {
        let mut catalog = seeded();
        let id = catalog
            .create_composite(
                "sum",
                FormulaType::Sum,
                "kg CO2e",
                vec![CompositeComponent::new(FactorId(1), 2.0)],
            )
            .unwrap();
        assert_eq!(catalog.get_composite(id).unwrap().value, 20.0);

        let new_id = catalog
            .supersede_factor(FactorId(1), factor(0, 12.0, "kg CO2e"))
            .unwrap();

        let replacement = catalog.get_factor(new_id).unwrap();
        assert_eq!(replacement.provenance.version, 2);
        // Old record kept
        assert_eq!(catalog.get_factor(FactorId(1)).unwrap().value, 10.0);

        let composite = catalog.get_composite(id).unwrap();
        assert_eq!(composite.components[0].factor, new_id);
        assert_eq!(composite.value, 24.0);
        assert!(catalog.verify_cached_values());
    }

    #[test]
    fn supersede_with_incompatible_unit_leaves_composite() {
        let mut catalog = seeded();
        let id = catalog
            .create_composite(
                "sum",
                FormulaType::Sum,
                "kg CO2e",
                vec![CompositeComponent::new(FactorId(1), 2.0)],
            )
            .unwrap();

        let new_id = catalog
            .supersede_factor(FactorId(1), factor(0, 12.0, "kg CO2e/kg"))
            .unwrap();

        // Composite stays on the old, still-resolvable record.
        let composite = catalog.get_composite(id).unwrap();
        assert_eq!(composite.components[0].factor, FactorId(1));
        assert_eq!(composite.value, 20.0);
        assert!(catalog.get_factor(new_id).is_some());
        assert!(catalog.verify_cached_values());
    }

    #[test]
    fn serde_round_trip() {
        let mut catalog = seeded();
        let id = catalog
            .create_composite(
                "blend",
                FormulaType::Weighted,
                "kg CO2e",
                vec![
                    CompositeComponent::new(FactorId(1), 2.0),
                    CompositeComponent::new(FactorId(2), 3.0),
                ],
            )
            .unwrap();

        let json = serde_json::to_string(&catalog).unwrap();
        let back: FactorCatalog = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), catalog.len());
        assert_eq!(back.get_composite(id).unwrap().value, 16.0);
        assert_eq!(back.composites_using(FactorId(1)), vec![id]);
        assert!(back.verify_cached_values());
    }

    #[test]
    fn allocated_ids_never_collide() {
        let mut catalog = FactorCatalog::new();
        catalog.add_factor(factor(0, 1.0, "kg CO2e")).unwrap();
        catalog.add_factor(factor(5, 1.0, "kg CO2e")).unwrap();
        let id = catalog.allocate_id();
        assert!(id.0 > 5);
        assert!(catalog.get_factor(id).is_none());
    }
}
