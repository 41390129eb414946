pub mod average_linkage;
pub mod batch_resolver;
pub mod centroid_consolidation;
pub mod incremental_resolver;
pub mod resolver_factory;
pub mod union_find;
