//! Module: aggregate::registry
//! Responsibility: resolve configured aggregate kind names to reducer instances.
//! Does not own: reducer semantics.
//! Boundary: consulted once per executor construction, never during execution.

use crate::{
    aggregate::{
        AggregatorBox, AverageAggregator, BitAggregator, BitOp, CountDistinctAggregator,
        ExtremaAggregator, LengthAggregator, SortedUniqueAggregator, SumAggregator,
        UniqueAggregator,
    },
    config::{ConfigError, SortedCollectConfig},
    context::ExecutionContext,
};
use std::collections::BTreeMap;

///
/// AggregatorFactory
///

pub type AggregatorFactory = fn(&ExecutionContext) -> AggregatorBox;

///
/// AggregatorRegistry
///
/// Case-insensitive name to factory mapping.
/// Names are stored upper-cased.
///

#[derive(Clone, Debug, Default)]
pub struct AggregatorRegistry {
    factories: BTreeMap<String, AggregatorFactory>,
}

impl AggregatorRegistry {
    /// Build an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Build a registry holding every built-in aggregate kind and alias.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        registry.register("LENGTH", |_| Box::new(LengthAggregator::default()));
        registry.register("COUNT", |_| Box::new(LengthAggregator::default()));
        registry.register("SUM", |_| Box::new(SumAggregator::default()));
        registry.register("MIN", |context| Box::new(ExtremaAggregator::min(*context)));
        registry.register("MAX", |context| Box::new(ExtremaAggregator::max(*context)));
        registry.register("AVERAGE", |_| Box::new(AverageAggregator::default()));
        registry.register("AVG", |_| Box::new(AverageAggregator::default()));
        registry.register("UNIQUE", |context| Box::new(UniqueAggregator::new(*context)));
        registry.register("SORTED_UNIQUE", |context| {
            Box::new(SortedUniqueAggregator::new(*context))
        });
        registry.register("COUNT_DISTINCT", |context| {
            Box::new(CountDistinctAggregator::new(*context))
        });
        registry.register("COUNT_UNIQUE", |context| {
            Box::new(CountDistinctAggregator::new(*context))
        });
        registry.register("BIT_AND", |_| Box::new(BitAggregator::new(BitOp::And)));
        registry.register("BIT_OR", |_| Box::new(BitAggregator::new(BitOp::Or)));
        registry.register("BIT_XOR", |_| Box::new(BitAggregator::new(BitOp::Xor)));

        registry
    }

    /// Register (or replace) one factory under a case-insensitive name.
    pub fn register(&mut self, name: &str, factory: AggregatorFactory) {
        self.factories.insert(normalize(name), factory);
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&normalize(name))
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Build one reducer by name.
    #[must_use]
    pub fn create(&self, name: &str, context: &ExecutionContext) -> Option<AggregatorBox> {
        self.factories
            .get(&normalize(name))
            .map(|factory| factory(context))
    }

    /// Build one reducer per configured aggregate, in configured order.
    pub fn create_all(
        &self,
        config: &SortedCollectConfig,
    ) -> Result<Vec<AggregatorBox>, ConfigError> {
        let context = config.context();

        config
            .aggregate_types()
            .enumerate()
            .map(|(index, kind)| {
                self.create(kind, &context)
                    .ok_or_else(|| ConfigError::UnknownAggregate {
                        index,
                        kind: kind.to_string(),
                    })
            })
            .collect()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_ascii_uppercase()
}
