// src/services/query/mod.rs
//
// Remote query layer: cache + retry policy

pub mod query_cache;
pub mod retry_policy;

pub use query_cache::{
    QueryCache, QueryError, QueryKey, QueryObserver, QueryOptions, QueryState, QueryStatus,
};
pub use retry_policy::{
    ErrorClassifier, ErrorKind, MessagePatternClassifier, RetryPolicy, VariantClassifier,
    NETWORK_FAILURE_PATTERN,
};
