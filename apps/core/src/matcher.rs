use crate::contract::MatchRequest;
use crate::model::{normalize_for_match, Tab};

/// Resolves a request against one snapshot of the window's tabs.
pub fn resolve<'a>(request: &MatchRequest, tabs: &'a [Tab]) -> Option<&'a Tab> {
    match request {
        MatchRequest::ByIndex { index } => tab_at_position(tabs, *index),
        MatchRequest::ByTitle { query } => best_title_match(tabs, query),
    }
}

pub fn tab_at_position(tabs: &[Tab], index: i64) -> Option<&Tab> {
    let ordered = in_window_order(tabs);
    if ordered.is_empty() || index < 0 {
        return None;
    }

    let last = ordered.len() - 1;
    let target = usize::try_from(index).map_or(last, |index| index.min(last));
    ordered.get(target).copied()
}

/// Picks the tab whose title contains `query` earliest, leftmost tab on ties.
pub fn best_title_match<'a>(tabs: &'a [Tab], query: &str) -> Option<&'a Tab> {
    let normalized_query = normalize_for_match(query);

    tabs.iter()
        .filter_map(|tab| {
            match_offset(&tab.title, &normalized_query).map(|pos| (pos, tab.position_index, tab))
        })
        .min_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
        .map(|(_, _, tab)| tab)
}

/// Character offset of the first occurrence of an already-lowercased query
/// within the lowercased title.
fn match_offset(title: &str, normalized_query: &str) -> Option<usize> {
    let normalized_title = normalize_for_match(title);
    let byte_offset = normalized_title.find(normalized_query)?;
    Some(normalized_title[..byte_offset].chars().count())
}

fn in_window_order(tabs: &[Tab]) -> Vec<&Tab> {
    let mut ordered: Vec<&Tab> = tabs.iter().collect();
    ordered.sort_by_key(|tab| tab.position_index);
    ordered
}
