//! Registry engine
//!
//! - [`view_model`]: join catalog definitions with installation records
//! - [`field`]: dot-path field resolution shared by filters and sorts
//! - [`filter`]: search, filter, sort and pagination
//! - [`store`]: per-space registry page state

pub mod field;
pub mod filter;
pub mod store;
pub mod view_model;

pub use field::{resolve, FieldAccessor};
pub use filter::{
    apply_filters_and_sort, compare_by_rules, matches_filter, matches_search, page_count,
    paginate, search, ActiveFilters, ALL_OPTION,
};
pub use store::{RegistryState, RegistryStore};
pub use view_model::{apply_runtime_statuses, merge, ServerViewModel, DEFINITION_NOT_CACHED};
