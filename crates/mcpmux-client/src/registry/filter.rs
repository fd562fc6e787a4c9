//! Search, filter and sort over registry view models
//!
//! Everything here is pure: the display list is recomputed from the full
//! merged set on every call, and identical inputs always yield identical
//! ordering.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use mcpmux_core::{FilterMatch, FilterOperator, NullsPlacement, SortDirection, SortRule, UiConfig};
use serde_json::Value;
use tracing::debug;

use super::field::FieldAccessor;
use super::view_model::ServerViewModel;

/// Option id that disables a filter
pub const ALL_OPTION: &str = "all";

/// Selected option per filter id
pub type ActiveFilters = BTreeMap<String, String>;

/// Case-insensitive substring match on name, description, id, alias and
/// categories. An empty query matches everything.
pub fn matches_search(vm: &ServerViewModel, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    let hit = |text: &str| text.to_lowercase().contains(&needle);
    let def = &vm.definition;

    hit(&def.name)
        || def.description.as_deref().is_some_and(hit)
        || hit(&def.id)
        || def.alias.as_deref().is_some_and(hit)
        || def.categories.iter().any(|c| hit(c))
}

/// View models matching `query`, in input order
pub fn search<'a>(view_models: &'a [ServerViewModel], query: &str) -> Vec<&'a ServerViewModel> {
    view_models
        .iter()
        .filter(|vm| matches_search(vm, query))
        .collect()
}

/// Whether an entity passes one active `(filter_id, option_id)` selection.
///
/// `all`, an unknown filter or option, and an option without a match rule
/// all pass.
pub fn matches_filter(
    entity: &FieldAccessor,
    ui_config: &UiConfig,
    filter_id: &str,
    option_id: &str,
) -> bool {
    if option_id == ALL_OPTION {
        return true;
    }
    let Some(rule) = ui_config
        .filter(filter_id)
        .and_then(|f| f.option(option_id))
        .and_then(|o| o.match_rule.as_ref())
    else {
        debug!(filter_id, option_id, "[Registry] Unresolved filter selection passes");
        return true;
    };
    matches_rule(entity, rule)
}

fn matches_rule(entity: &FieldAccessor, rule: &FilterMatch) -> bool {
    let field = entity.get(&rule.field);
    match &rule.operator {
        FilterOperator::Eq => field == Some(&rule.value),
        FilterOperator::In => match (field, rule.value.as_array()) {
            (Some(value), Some(candidates)) => candidates.contains(value),
            _ => false,
        },
        FilterOperator::Contains => field
            .and_then(Value::as_array)
            .is_some_and(|items| items.contains(&rule.value)),
        FilterOperator::Unknown(op) => {
            debug!(operator = %op, field = %rule.field, "[Registry] Unknown filter operator matches");
            true
        }
    }
}

/// Order two entities by a list of tie-break rules; the first rule that
/// distinguishes them decides.
pub fn compare_by_rules(a: &FieldAccessor, b: &FieldAccessor, rules: &[SortRule]) -> Ordering {
    rules
        .iter()
        .map(|rule| compare_rule(a.get(&rule.field), b.get(&rule.field), rule))
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn compare_rule(a: Option<&Value>, b: Option<&Value>, rule: &SortRule) -> Ordering {
    let absent_first = matches!(rule.nulls, Some(NullsPlacement::First));
    match (a, b) {
        (None, None) => Ordering::Equal,
        // Placement applies as declared regardless of direction
        (None, Some(_)) if absent_first => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) if absent_first => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => {
            let ord = compare_values(x, y);
            match rule.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        }
    }
}

/// Ascending comparison of two present values. Values of different kinds
/// compare equal so the next rule decides.
fn compare_values(x: &Value, y: &Value) -> Ordering {
    match (x, y) {
        // true sorts before false
        (Value::Bool(x), Value::Bool(y)) => y.cmp(x),
        (Value::String(x), Value::String(y)) => x
            .to_lowercase()
            .cmp(&y.to_lowercase())
            .then_with(|| x.cmp(y)),
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
        _ => Ordering::Equal,
    }
}

/// Search, then filter, then sort.
///
/// An unknown `active_sort` leaves the filtered list in input order.
pub fn apply_filters_and_sort(
    view_models: &[ServerViewModel],
    ui_config: &UiConfig,
    active_filters: &ActiveFilters,
    active_sort: &str,
    query: &str,
) -> Vec<ServerViewModel> {
    let mut candidates: Vec<(FieldAccessor, &ServerViewModel)> = search(view_models, query)
        .into_iter()
        .map(|vm| (FieldAccessor::new(vm), vm))
        .filter(|(entity, _)| {
            active_filters
                .iter()
                .all(|(filter_id, option_id)| matches_filter(entity, ui_config, filter_id, option_id))
        })
        .collect();

    if let Some(sort) = ui_config.sort_option(active_sort) {
        // stable: entities equal on every rule keep their input order
        candidates.sort_by(|(a, _), (b, _)| compare_by_rules(a, b, &sort.rules));
    }

    candidates.into_iter().map(|(_, vm)| vm.clone()).collect()
}

/// One 1-based page of `items`. `items_per_page == 0` disables paging;
/// page 0 is treated as page 1 and pages past the end are empty.
pub fn paginate<T>(items: &[T], page: u32, items_per_page: u32) -> &[T] {
    if items_per_page == 0 {
        return items;
    }
    let per_page = items_per_page as usize;
    let start = (page.max(1) as usize - 1).saturating_mul(per_page);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(per_page).min(items.len());
    &items[start..end]
}

/// Number of pages needed for `total` items (at least 1)
pub fn page_count(total: usize, items_per_page: u32) -> u32 {
    if items_per_page == 0 || total == 0 {
        return 1;
    }
    let pages = total.div_ceil(items_per_page as usize);
    u32::try_from(pages).unwrap_or(u32::MAX)
}
