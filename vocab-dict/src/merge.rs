//! Example sentence merging
//!
//! Folds the `example` text of several records into one block of
//! deduplicated bilingual groups. The pairing is greedy and order dependent:
//! a line starting with an ASCII character opens a group, the next
//! non-ASCII line closes it as its translation. Feed records in a fixed
//! priority order to get the same output regardless of fetch timing.

use std::collections::{BTreeMap, HashSet};

use crate::models::{CanonicalRecord, SourceId};

/// Bullet placed before the original-language line of a group
const BULLET: &str = "• ";

/// Indent placed before the translation line of a group
const TRANSLATION_INDENT: &str = "  ";

/// Lines shorter than this (in characters) are noise
const MIN_LINE_CHARS: usize = 3;

/// One rendered example: original line, translation, or both
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleGroup {
    pub original: Option<String>,
    pub translation: Option<String>,
}

impl ExampleGroup {
    fn unpaired_original(line: String) -> Self {
        Self {
            original: Some(line),
            translation: None,
        }
    }

    fn render(&self) -> String {
        let mut lines = Vec::with_capacity(2);
        if let Some(original) = &self.original {
            lines.push(format!("{BULLET}{original}"));
        }
        if let Some(translation) = &self.translation {
            lines.push(format!("{TRANSLATION_INDENT}{translation}"));
        }
        lines.join("\n")
    }
}

/// Source tag lines such as `【Cambridge】`
fn is_source_marker(line: &str) -> bool {
    line.starts_with('【') && line.ends_with('】')
}

fn is_original_language(line: &str) -> bool {
    line.chars().next().is_some_and(|c| c.is_ascii())
}

/// Pair example lines from `records`, in the order given
pub fn collect_groups<'a, I>(records: I) -> Vec<ExampleGroup>
where
    I: IntoIterator<Item = &'a CanonicalRecord>,
{
    let mut groups = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for record in records {
        let mut pending: Option<String> = None;

        for raw in record.example.lines() {
            let line = raw.trim();
            if line.is_empty()
                || is_source_marker(line)
                || line.chars().count() < MIN_LINE_CHARS
                || seen.contains(line)
            {
                continue;
            }
            seen.insert(line.to_string());

            if is_original_language(line) {
                if let Some(previous) = pending.replace(line.to_string()) {
                    groups.push(ExampleGroup::unpaired_original(previous));
                }
            } else {
                groups.push(ExampleGroup {
                    original: pending.take(),
                    translation: Some(line.to_string()),
                });
            }
        }

        // Pending lines never pair across sources
        if let Some(previous) = pending {
            groups.push(ExampleGroup::unpaired_original(previous));
        }
    }

    groups
}

/// Render groups separated by one blank line
pub fn render_groups(groups: &[ExampleGroup]) -> String {
    groups
        .iter()
        .map(ExampleGroup::render)
        .filter(|g| !g.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Merge the examples of `records`, in the order given
pub fn merge_examples<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a CanonicalRecord>,
{
    render_groups(&collect_groups(records))
}

/// Merge the examples of every present source in [`SourceId::MERGE_ORDER`]
pub fn merge_in_priority_order(sources: &BTreeMap<SourceId, CanonicalRecord>) -> String {
    merge_examples(SourceId::MERGE_ORDER.iter().filter_map(|id| sources.get(id)))
}
