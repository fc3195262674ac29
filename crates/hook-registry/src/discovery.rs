//! Hook discovery: from link-time declarations to a validated catalog.

use tracing::{debug, info, warn};

use crate::descriptor::{DescriptorError, HookDeclaration, HookDescriptor};

/// A declaration that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    /// `type#member` of the offending declaration.
    pub label: String,
    pub error: DescriptorError,
}

/// Ordered table of validated hook descriptors.
///
/// Descriptors are kept sorted by hook id, so the order does not depend on
/// link order. Rejected declarations are kept alongside for reporting.
#[derive(Debug, Clone, Default)]
pub struct HookCatalog {
    descriptors: Vec<HookDescriptor>,
    rejected: Vec<Rejection>,
}

impl HookCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`HookCatalog::add`].
    pub fn with(mut self, descriptor: HookDescriptor) -> Self {
        self.add(descriptor);
        self
    }

    pub fn add(&mut self, descriptor: HookDescriptor) {
        let id = descriptor.id();
        let at = self
            .descriptors
            .partition_point(|existing| existing.id() <= id);
        self.descriptors.insert(at, descriptor);
    }

    /// Validate a declaration and add it. A rejected declaration is logged
    /// and recorded; it never affects the other entries.
    pub fn add_declaration(&mut self, declaration: &HookDeclaration) -> Result<(), DescriptorError> {
        match declaration.to_descriptor() {
            Ok(descriptor) => {
                debug!(hook = %descriptor.id(), "hook declaration accepted");
                self.add(descriptor);
                Ok(())
            }
            Err(error) => {
                warn!(
                    declaration = %declaration.label(),
                    %error,
                    "rejected invalid hook declaration"
                );
                self.rejected.push(Rejection {
                    label: declaration.label(),
                    error: error.clone(),
                });
                Err(error)
            }
        }
    }

    pub fn descriptors(&self) -> &[HookDescriptor] {
        &self.descriptors
    }

    pub fn rejected(&self) -> &[Rejection] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Enumerates the [`HookDeclaration`]s submitted under one extension
/// namespace.
#[derive(Debug, Clone)]
pub struct HookDiscovery {
    namespace: String,
}

impl HookDiscovery {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Declarations in this namespace, in link order.
    pub fn declarations(&self) -> Vec<&'static HookDeclaration> {
        inventory::iter::<HookDeclaration>
            .into_iter()
            .filter(|d| d.namespace == self.namespace)
            .collect()
    }

    /// Validate every declaration in the namespace into a catalog.
    pub fn discover(&self) -> HookCatalog {
        let mut catalog = HookCatalog::new();
        for declaration in self.declarations() {
            // Rejections are recorded in the catalog.
            let _ = catalog.add_declaration(declaration);
        }
        info!(
            namespace = %self.namespace,
            accepted = catalog.len(),
            rejected = catalog.rejected().len(),
            "hook discovery complete"
        );
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::{Advice, Invocation, SecurityViolation};
    use std::sync::Arc;

    const NS: &str = "hook-registry-discovery-test";

    struct Allow;

    impl Advice for Allow {
        fn name(&self) -> &str {
            "Allow"
        }
        fn on_enter(&self, _call: &Invocation<'_>) -> Result<(), SecurityViolation> {
            Ok(())
        }
    }

    fn allow() -> Arc<dyn Advice> {
        Arc::new(Allow)
    }

    inventory::submit! {
        HookDeclaration::method(NS, "z.Last", "run", allow)
    }

    inventory::submit! {
        HookDeclaration::method(NS, "a.First", "run", allow).parameters(&["int"])
    }

    inventory::submit! {
        HookDeclaration::method(NS, "", "run", allow)
    }

    inventory::submit! {
        HookDeclaration::method(NS, "m.Mixed", "run", allow).parameters(&["*", "int"])
    }

    inventory::submit! {
        HookDeclaration::method("some-other-namespace", "o.Other", "run", allow)
    }

    #[test]
    fn discovery_filters_by_namespace() {
        let discovery = HookDiscovery::new(NS);
        assert_eq!(discovery.declarations().len(), 4);
        assert!(discovery
            .declarations()
            .iter()
            .all(|d| d.namespace == NS));
    }

    #[test]
    fn invalid_declarations_do_not_stop_the_batch() {
        let catalog = HookDiscovery::new(NS).discover();
        let ids: Vec<String> = catalog.descriptors().iter().map(|d| d.id()).collect();
        assert_eq!(ids, vec!["a.First#run(int)", "z.Last#run(*)"]);

        let mut errors: Vec<&DescriptorError> = catalog.rejected().iter().map(|r| &r.error).collect();
        errors.sort_by_key(|e| e.to_string());
        assert_eq!(errors.len(), 2);
        assert!(errors.contains(&&DescriptorError::EmptyTargetType));
        assert!(errors
            .iter()
            .any(|e| matches!(e, DescriptorError::MixedWildcard { .. })));
    }

    #[test]
    fn unknown_namespace_is_empty() {
        let catalog = HookDiscovery::new("nothing-here").discover();
        assert!(catalog.is_empty());
        assert!(catalog.rejected().is_empty());
    }

    #[test]
    fn manual_catalog_is_sorted_by_id() {
        let catalog = HookCatalog::new()
            .with(HookDescriptor::builder("b.B", allow()).method("m").build().unwrap())
            .with(HookDescriptor::builder("a.A", allow()).method("m").build().unwrap())
            .with(HookDescriptor::builder("a.A", allow()).constructor().build().unwrap());
        let ids: Vec<String> = catalog.descriptors().iter().map(|d| d.id()).collect();
        assert_eq!(ids, vec!["a.A#<init>(*)", "a.A#m(*)", "b.B#m(*)"]);
    }
}
