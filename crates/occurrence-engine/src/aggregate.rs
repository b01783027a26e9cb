//! Multi-event expansion.

use crate::expander::{expand_with, ExpansionOptions, Occurrence, SourceEvent};
use crate::window::QueryWindow;

/// Expand every event into one list ordered by start time.
pub fn expand_all<P: Clone>(events: &[SourceEvent<P>], window: &QueryWindow) -> Vec<Occurrence<P>> {
    expand_all_with(events, window, &ExpansionOptions::default())
}

/// Like [`expand_all`], with explicit limits.
///
/// The sort is stable: occurrences with equal starts keep input order.
pub fn expand_all_with<P: Clone>(
    events: &[SourceEvent<P>],
    window: &QueryWindow,
    options: &ExpansionOptions,
) -> Vec<Occurrence<P>> {
    expand_matching(events, window, options, |_| true)
}

/// Expand only the events accepted by `keep`, e.g. one family member's.
pub fn expand_matching<P, F>(
    events: &[SourceEvent<P>],
    window: &QueryWindow,
    options: &ExpansionOptions,
    mut keep: F,
) -> Vec<Occurrence<P>>
where
    P: Clone,
    F: FnMut(&SourceEvent<P>) -> bool,
{
    let mut occurrences: Vec<Occurrence<P>> = events
        .iter()
        .filter(|&event| keep(event))
        .flat_map(|event| expand_with(event, window, options))
        .collect();
    occurrences.sort_by_key(|occurrence| occurrence.start);
    tracing::debug!(
        events = events.len(),
        occurrences = occurrences.len(),
        "expanded events"
    );
    occurrences
}
