use crate::core::{Detector, DetectorId};
use crate::source::{
    AccessControlDetector, OverflowUnderflowDetector, ReentrancyDetector, UncheckedCallDetector,
};
use std::sync::Arc;

/// Detectors in execution order.
pub struct DetectorRegistry {
    detectors: Vec<Arc<dyn Detector>>,
}

impl DetectorRegistry {
    pub fn new() -> Self {
        Self {
            detectors: Vec::new(),
        }
    }

    /// reentrancy, overflow-underflow, unchecked-call, access-control.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(ReentrancyDetector::new());
        registry.register(OverflowUnderflowDetector::new());
        registry.register(UncheckedCallDetector::new());
        registry.register(AccessControlDetector::new());
        registry
    }

    /// Re-registering an id replaces the detector in place, keeping its slot.
    pub fn register<D: Detector + 'static>(&mut self, detector: D) {
        self.register_shared(Arc::new(detector));
    }

    pub fn register_shared(&mut self, detector: Arc<dyn Detector>) {
        match self.detectors.iter().position(|d| d.id() == detector.id()) {
            Some(slot) => self.detectors[slot] = detector,
            None => self.detectors.push(detector),
        }
    }

    pub fn all(&self) -> &[Arc<dyn Detector>] {
        &self.detectors
    }

    /// Registered detectors whose id is in `ids`, still in registration order.
    pub fn selected(&self, ids: &[DetectorId]) -> Vec<Arc<dyn Detector>> {
        self.detectors
            .iter()
            .filter(|d| ids.contains(&d.id()))
            .cloned()
            .collect()
    }

    pub fn list_ids(&self) -> Vec<DetectorId> {
        self.detectors.iter().map(|d| d.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.detectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detectors.is_empty()
    }
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

pub struct DetectorRegistryBuilder {
    registry: DetectorRegistry,
}

impl DetectorRegistryBuilder {
    pub fn new() -> Self {
        Self {
            registry: DetectorRegistry::new(),
        }
    }

    pub fn with_detector<D: Detector + 'static>(mut self, detector: D) -> Self {
        self.registry.register(detector);
        self
    }

    pub fn with_defaults(mut self) -> Self {
        for detector in DetectorRegistry::builtin().detectors {
            self.registry.register_shared(detector);
        }
        self
    }

    pub fn build(self) -> DetectorRegistry {
        self.registry
    }
}

impl Default for DetectorRegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_is_empty() {
        assert!(DetectorRegistry::default().is_empty());
    }

    #[test]
    fn test_builtin_order() {
        assert_eq!(
            DetectorRegistry::builtin().list_ids(),
            DetectorId::BUILTIN.to_vec()
        );
    }

    #[test]
    fn test_selected_keeps_registration_order() {
        let registry = DetectorRegistry::builtin();
        let ids: Vec<DetectorId> = registry
            .selected(&[DetectorId::AccessControl, DetectorId::Reentrancy])
            .iter()
            .map(|d| d.id())
            .collect();
        assert_eq!(ids, vec![DetectorId::Reentrancy, DetectorId::AccessControl]);
    }

    #[test]
    fn test_reregistration_keeps_slot() {
        let registry = DetectorRegistryBuilder::new()
            .with_defaults()
            .with_detector(ReentrancyDetector::new())
            .build();
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.list_ids()[0], DetectorId::Reentrancy);
    }
}
