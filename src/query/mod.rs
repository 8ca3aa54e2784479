//! # Query Translation
//!
//! Turns an untrusted query-string mapping into a structured, bounded query:
//! filter conditions, sort order, field projection and a page window.
//!
//! Nothing here performs I/O. Applying the result is the job of
//! [`crate::executor::QueryExecutor`].

mod errors;
mod features;
mod filter;
mod page;
mod projection;
mod raw;
mod sort;

pub use errors::{QueryError, QueryResult};
pub use features::{FeatureOptions, OperatorPolicy, QueryDescriptor, QueryFeatures};
pub use filter::{coerce_value, CmpOp, FilterCondition};
pub use page::{PageWindow, DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use projection::{Projection, ID_FIELD, INTERNAL_FIELDS, VERSION_FIELD};
pub use raw::{RawQuery, RawValue, RESERVED_KEYS};
pub use sort::{default_sort, parse_sort, SortDirection, SortKey, SortSpec, CREATED_AT_FIELD};
