use crate::tree::{ContentTree, parse_path};
use chrono::NaiveDate;

/// Used when a selection is empty.
const FALLBACK_TITLE: &str = "לימוד";

/// Calendar entry name for a selection: "סדר לימוד: <first>", plus "ועוד"
/// when more than one path is selected.
pub fn plan_title<S: AsRef<str>>(selection: &[S]) -> String {
    let first = selection
        .first()
        .and_then(|path| parse_path(path.as_ref()).pop())
        .unwrap_or_else(|| FALLBACK_TITLE.to_string());
    if selection.len() > 1 {
        format!("סדר לימוד: {first} ועוד")
    } else {
        format!("סדר לימוד: {first}")
    }
}

/// The common branch of the selection, if the selection covers that branch
/// exactly (the branch itself, or every non-chapter child of it).
pub fn find_exact_whole_branch<S: AsRef<str>>(
    selection: &[S],
    tree: &ContentTree,
) -> Option<Vec<String>> {
    let paths: Vec<Vec<String>> = selection.iter().map(|p| parse_path(p.as_ref())).collect();
    let first = paths.first()?;

    let mut common: Vec<String> = Vec::new();
    for (depth, part) in first.iter().enumerate() {
        if paths.iter().all(|p| p.get(depth) == Some(part)) {
            common.push(part.clone());
        } else {
            break;
        }
    }
    if common.is_empty() {
        return None;
    }

    let node = tree.node_at(&common)?;
    let mut selected: Vec<&str> = paths
        .iter()
        .filter_map(|p| p.get(common.len()).map(String::as_str))
        .collect();
    if selected.is_empty() {
        return Some(common);
    }
    selected.sort_unstable();
    selected.dedup();

    let mut children: Vec<&str> = node.sections().map(|c| c.name()).collect();
    children.sort_unstable();
    (selected == children).then_some(common)
}

/// Human title of the selection, without the time span.
pub fn selection_title<S: AsRef<str>>(selection: &[S], tree: &ContentTree) -> String {
    if let Some(branch) = find_exact_whole_branch(selection, tree) {
        if let Some(name) = branch.last() {
            return name.clone();
        }
    }

    let mut names: Vec<String> = Vec::new();
    for path in selection {
        if let Some(name) = parse_path(path.as_ref()).pop() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    match names.as_slice() {
        [] => FALLBACK_TITLE.to_string(),
        [only] => format!("{only} (חלקים)"),
        [a, b] => format!("{a} ו{b}"),
        [a, b, ..] => format!("{a}, {b} ועוד"),
    }
}

/// Phrase for an inclusive date span, e.g. "בחודש" or "ב-3-שבועות".
pub fn duration_phrase(start: NaiveDate, end: NaiveDate) -> String {
    let days = (end - start).num_days() + 1;
    if days > 360 {
        let years = (days as f64 / 365.0).round() as i64;
        if years <= 1 {
            "בשנה".to_string()
        } else {
            format!("ב-{years}-שנים")
        }
    } else if (29..=32).contains(&days) {
        "בחודש".to_string()
    } else if (59..=62).contains(&days) {
        "בחודשיים".to_string()
    } else if days > 0 && days % 7 == 0 {
        let weeks = days / 7;
        if weeks == 1 {
            "בשבוע".to_string()
        } else {
            format!("ב-{weeks}-שבועות")
        }
    } else {
        format!("ב-{days}-ימים")
    }
}

/// Deterministic label for a selection over a date span, e.g. "ברכות בחודש".
pub fn summary_label<S: AsRef<str>>(
    selection: &[S],
    tree: &ContentTree,
    start: NaiveDate,
    end: NaiveDate,
) -> String {
    format!(
        "{} {}",
        selection_title(selection, tree),
        duration_phrase(start, end)
    )
}

/// File name for a label, with characters unsafe in file names replaced.
pub fn file_name(label: &str, extension: &str) -> String {
    let stem: String = label
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect();
    format!("{}.{}", stem.trim(), extension.trim_start_matches('.'))
}
