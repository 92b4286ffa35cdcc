use std::cmp::Reverse;

use super::domain::Observation;
use super::evaluation::{
    display_location, observation_weight, FindingSource, OutcomeResult,
    DEFAULT_EXPLANATION_MAX_CHARS,
};

pub const NO_OUTSTANDING_ISSUES: &str = "No outstanding issues.";

/// Prose explanation of a verdict using the default display length.
pub fn explain_outcome(result: &OutcomeResult, observations: &[Observation]) -> String {
    explain_outcome_within(result, observations, DEFAULT_EXPLANATION_MAX_CHARS)
}

/// Prose explanation of a verdict, cut on whole entries to `max_chars`.
///
/// Entries are ordered by the weight of the finding behind them, so the finding that
/// decided the verdict is cited first; equal weights keep observations ahead of other
/// findings. The first entry is always cited, clipped if it alone overflows, and the
/// whole text never exceeds `max_chars`.
pub fn explain_outcome_within(
    result: &OutcomeResult,
    observations: &[Observation],
    max_chars: usize,
) -> String {
    let cited = observations
        .iter()
        .filter(|observation| !observation.is_resolved())
        .filter_map(|observation| {
            observation_weight(observation.code)
                .map(|weight| (weight, cite_observation(observation)))
        });

    let other = result
        .details
        .findings
        .iter()
        .filter(|finding| !matches!(finding.source, FindingSource::Observation { .. }))
        .map(|finding| ((finding.effect, finding.reason), finding.notes.clone()));

    let mut weighted: Vec<_> = cited.chain(other).collect();
    if weighted.is_empty() {
        return NO_OUTSTANDING_ISSUES.to_string();
    }
    weighted.sort_by_key(|(weight, _)| Reverse(*weight));

    let entries: Vec<String> = weighted.into_iter().map(|(_, entry)| entry).collect();
    assemble(format!("{}.", result.headline()), &entries, max_chars)
}

fn cite_observation(observation: &Observation) -> String {
    let location = display_location(&observation.location);
    let description = observation.description.trim();
    if description.is_empty() {
        format!("{} at {}", observation.code.label(), location)
    } else {
        format!(
            "{} at {}: {}",
            observation.code.label(),
            location,
            description
        )
    }
}

fn assemble(headline: String, entries: &[String], max_chars: usize) -> String {
    let mut text = headline;
    let mut included = 0;

    for (index, entry) in entries.iter().enumerate() {
        let separator = if index == 0 { " " } else { "; " };
        let reserve = more_suffix_len(entries.len() - index - 1);
        let needed =
            text.chars().count() + separator.len() + entry.chars().count() + reserve;

        if needed <= max_chars {
            text.push_str(separator);
            text.push_str(entry);
            included += 1;
            continue;
        }

        if index == 0 {
            let budget =
                max_chars.saturating_sub(text.chars().count() + separator.len() + reserve + 1);
            text.push_str(separator);
            text.extend(entry.chars().take(budget));
            text.push('…');
            included = 1;
        }
        break;
    }

    let omitted = entries.len() - included;
    if omitted > 0 {
        text.push_str(&more_suffix(omitted));
    }
    clip(text, max_chars)
}

/// Cuts text that still overflows, which happens once the headline alone fills the budget.
fn clip(text: String, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text;
    }
    let mut clipped: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    clipped.push('…');
    clipped
}

fn more_suffix(count: usize) -> String {
    format!(" (+{count} more)")
}

fn more_suffix_len(count: usize) -> usize {
    if count == 0 {
        0
    } else {
        more_suffix(count).chars().count()
    }
}
