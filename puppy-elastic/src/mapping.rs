//! Entity mapping resolution
//!
//! Maps an application type to the index and document type used to address
//! it. Resolutions are cached per type for the life of the resolver; the
//! process-wide resolver lives as long as the process.

use crate::error::{ElasticError, Result};
use parking_lot::RwLock;
use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// Index name and document type for one entity type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityMapping {
    index: String,
    doc_type: String,
}

impl EntityMapping {
    pub fn new(index: impl Into<String>, doc_type: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            doc_type: doc_type.into(),
        }
    }

    /// Conventional mapping derived from the type name: `Product` maps to
    /// index `products` and document type `product`.
    pub fn from_type_name<T: ?Sized>() -> Self {
        let name = short_type_name::<T>().to_lowercase();
        Self {
            index: format!("{}s", name),
            doc_type: name,
        }
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    pub fn doc_type(&self) -> &str {
        &self.doc_type
    }
}

/// Mapping metadata declared by a type.
///
/// The default declares nothing; such types must be registered on the
/// resolver before use.
pub trait ElasticMapped: 'static {
    fn entity_mapping() -> Option<EntityMapping> {
        None
    }
}

impl ElasticMapped for serde_json::Value {}

/// Thread-safe, caching type → mapping resolver
#[derive(Debug, Default)]
pub struct MappingResolver {
    cache: RwLock<HashMap<TypeId, Arc<EntityMapping>>>,
}

static GLOBAL: OnceLock<Arc<MappingResolver>> = OnceLock::new();

impl MappingResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide resolver, created on first use
    pub fn global() -> Arc<MappingResolver> {
        GLOBAL.get_or_init(|| Arc::new(MappingResolver::new())).clone()
    }

    /// Register an explicit mapping for `T`.
    ///
    /// A mapping that was already resolved for `T` is never replaced; the
    /// mapping in effect is returned.
    pub fn register<T: 'static>(&self, mapping: EntityMapping) -> Arc<EntityMapping> {
        let mut cache = self.cache.write();
        cache
            .entry(TypeId::of::<T>())
            .or_insert_with(|| {
                debug!(
                    "Registered mapping {} -> {}/{}",
                    type_name::<T>(),
                    mapping.index,
                    mapping.doc_type
                );
                Arc::new(mapping)
            })
            .clone()
    }

    /// Resolve the mapping for `T`, caching the result.
    pub fn resolve<T: ElasticMapped>(&self) -> Result<Arc<EntityMapping>> {
        if let Some(mapping) = self.cache.read().get(&TypeId::of::<T>()) {
            return Ok(mapping.clone());
        }

        let mapping = T::entity_mapping()
            .ok_or_else(|| ElasticError::MappingNotFound(type_name::<T>().to_string()))?;

        // A registration that raced this resolution stays in effect.
        let mapping = self
            .cache
            .write()
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Arc::new(mapping))
            .clone();
        debug!(
            "Resolved mapping {} -> {}/{}",
            type_name::<T>(),
            mapping.index,
            mapping.doc_type
        );
        Ok(mapping)
    }

    pub fn is_resolved<T: 'static>(&self) -> bool {
        self.cache.read().contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Product;

    impl ElasticMapped for Product {
        fn entity_mapping() -> Option<EntityMapping> {
            Some(EntityMapping::new("products", "product"))
        }
    }

    struct Unmapped;
    impl ElasticMapped for Unmapped {}

    struct Conventional;
    impl ElasticMapped for Conventional {
        fn entity_mapping() -> Option<EntityMapping> {
            Some(EntityMapping::from_type_name::<Self>())
        }
    }

    static DECLARATIONS: AtomicUsize = AtomicUsize::new(0);

    struct Counted;
    impl ElasticMapped for Counted {
        fn entity_mapping() -> Option<EntityMapping> {
            DECLARATIONS.fetch_add(1, Ordering::SeqCst);
            Some(EntityMapping::new("counted", "counted"))
        }
    }

    #[test]
    fn test_resolve_declared_mapping() {
        let resolver = MappingResolver::new();
        let mapping = resolver.resolve::<Product>().unwrap();
        assert_eq!(mapping.index(), "products");
        assert_eq!(mapping.doc_type(), "product");
        assert!(resolver.is_resolved::<Product>());
    }

    #[test]
    fn test_missing_mapping_fails() {
        let resolver = MappingResolver::new();
        let err = resolver.resolve::<Unmapped>().unwrap_err();
        assert!(matches!(err, ElasticError::MappingNotFound(ref name) if name.ends_with("Unmapped")));
        assert!(resolver.is_empty());
    }

    #[test]
    fn test_registration_wins_over_missing_declaration() {
        let resolver = MappingResolver::new();
        resolver.register::<Unmapped>(EntityMapping::new("things", "thing"));
        let mapping = resolver.resolve::<Unmapped>().unwrap();
        assert_eq!(mapping.index(), "things");
    }

    #[test]
    fn test_resolved_mapping_is_not_replaced() {
        let resolver = MappingResolver::new();
        resolver.resolve::<Product>().unwrap();
        let in_effect = resolver.register::<Product>(EntityMapping::new("other", "other"));
        assert_eq!(in_effect.index(), "products");
        assert_eq!(resolver.resolve::<Product>().unwrap().index(), "products");
    }

    #[test]
    fn test_conventional_mapping_from_type_name() {
        let mapping = EntityMapping::from_type_name::<Conventional>();
        assert_eq!(mapping.index(), "conventionals");
        assert_eq!(mapping.doc_type(), "conventional");

        let generic = EntityMapping::from_type_name::<Vec<u8>>();
        assert_eq!(generic.doc_type(), "vec");
    }

    #[test]
    fn test_resolution_is_cached() {
        let resolver = MappingResolver::new();
        let first = resolver.resolve::<Counted>().unwrap();
        let second = resolver.resolve::<Counted>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(DECLARATIONS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_resolution() {
        let resolver = Arc::new(MappingResolver::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let resolver = resolver.clone();
                std::thread::spawn(move || resolver.resolve::<Product>().unwrap())
            })
            .collect();

        for handle in handles {
            let mapping = handle.join().unwrap();
            assert_eq!(*mapping, EntityMapping::new("products", "product"));
        }
        assert_eq!(resolver.len(), 1);
    }
}
