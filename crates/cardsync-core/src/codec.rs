use crate::task::TaskRecord;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Grammar
// ---------------------------------------------------------------------------
//
//   /* [RED] <[FINAL] >trello task <title>, checklist items
//   1.<item>
//   2.<item>
//   */
//
// Title runs to the first comma. Items are numbered lines; the numeric prefix
// is stripped. A [FINAL]-tagged block is parsed but never becomes an active
// task.

static BLOCK_RE: OnceLock<Regex> = OnceLock::new();
static ITEM_PREFIX_RE: OnceLock<Regex> = OnceLock::new();
static ITEM_SPLIT_RE: OnceLock<Regex> = OnceLock::new();

fn block_re() -> &'static Regex {
    BLOCK_RE.get_or_init(|| {
        Regex::new(r"/\*\s*\[RED\]\s*(\[FINAL\]\s*)?trello task ([^,]+),\s*checklist items\s*([\s\S]*?)\s*\*/")
            .unwrap()
    })
}

fn item_prefix_re() -> &'static Regex {
    ITEM_PREFIX_RE.get_or_init(|| Regex::new(r"^\d+\.").unwrap())
}

fn item_split_re() -> &'static Regex {
    ITEM_SPLIT_RE.get_or_init(|| Regex::new(r"\d+\.").unwrap())
}

// ---------------------------------------------------------------------------
// ChecklistPolicy
// ---------------------------------------------------------------------------

/// How checklist items are extracted from a block body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistPolicy {
    /// Each line must start with `N.`; malformed lines are silently dropped.
    #[default]
    Strict,
    /// Split on every `N.` delimiter with no per-line validation.
    Loose,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// One recognized comment block, with its exact byte span in the document so
/// rewrites are offset-based rather than substring-search-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBlock {
    pub title: String,
    pub checklist: Vec<String>,
    /// Full matched text, verbatim.
    pub comment: String,
    pub span: Range<usize>,
    /// `[FINAL]`-tagged: excluded from active tasks.
    pub finalized: bool,
}

/// Extract every comment block in document order.
pub fn parse_blocks(text: &str, policy: ChecklistPolicy) -> Vec<ParsedBlock> {
    block_re()
        .captures_iter(text)
        .map(|caps| {
            let whole = caps.get(0).unwrap();
            let title = caps[2].trim().to_string();
            let body = caps[3].trim();
            ParsedBlock {
                title,
                checklist: split_items(body, policy),
                comment: whole.as_str().to_string(),
                span: whole.range(),
                finalized: caps.get(1).is_some(),
            }
        })
        .collect()
}

/// The reconciler's input: every non-`[FINAL]` block as a fresh task record.
pub fn active_tasks(text: &str, policy: ChecklistPolicy) -> Vec<TaskRecord> {
    parse_blocks(text, policy)
        .into_iter()
        .filter(|b| !b.finalized)
        .map(|b| TaskRecord::new(b.title, b.checklist, b.comment))
        .collect()
}

fn split_items(body: &str, policy: ChecklistPolicy) -> Vec<String> {
    match policy {
        ChecklistPolicy::Strict => body
            .lines()
            .map(str::trim)
            .filter(|line| item_prefix_re().is_match(line))
            .map(|line| item_prefix_re().replace(line, "").trim().to_string())
            .collect(),
        ChecklistPolicy::Loose => item_split_re()
            .split(body)
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .map(str::to_string)
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

/// Exact inverse of parsing: `parse(serialize(title, items))` yields back
/// `{title, items}` for any comma-free title and non-empty item list.
pub fn serialize(title: &str, items: &[String]) -> String {
    frame("", title, items)
}

/// The `[FINAL]`-tagged form: well-formed, but never creates a remote task.
pub fn serialize_final(title: &str, items: &[String]) -> String {
    frame("[FINAL] ", title, items)
}

fn frame(tag: &str, title: &str, items: &[String]) -> String {
    let lines: Vec<String> = items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}.{}", i + 1, item))
        .collect();
    format!(
        "/* [RED] {tag}trello task {title}, checklist items\n{}\n*/",
        lines.join("\n")
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn items(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn round_trip() {
        let xs = items(&["Check A", "Check B"]);
        let text = serialize("Validate order total", &xs);
        let blocks = parse_blocks(&text, ChecklistPolicy::Strict);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].title, "Validate order total");
        assert_eq!(blocks[0].checklist, xs);
        assert_eq!(blocks[0].comment, text);
        assert!(!blocks[0].finalized);
    }

    #[test]
    fn round_trip_single_item() {
        let xs = items(&["only"]);
        let text = serialize("T", &xs);
        let blocks = parse_blocks(&text, ChecklistPolicy::Strict);
        assert_eq!(blocks[0].checklist, xs);
    }

    #[test]
    fn reserialization_is_stable() {
        use crate::fingerprint::fingerprint;
        let xs = items(&["Check A", "Check B"]);
        let a = serialize("Validate order total", &xs);
        let b = serialize("Validate order total", &xs);
        assert_eq!(a, b);
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn final_tag_parsed_but_excluded_from_active() {
        let text = serialize_final("Done thing", &items(&["a"]));
        let blocks = parse_blocks(&text, ChecklistPolicy::Strict);
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].finalized);
        assert_eq!(blocks[0].title, "Done thing");
        assert!(active_tasks(&text, ChecklistPolicy::Strict).is_empty());
    }

    #[test]
    fn multiple_blocks_in_document_order_with_spans() {
        let a = serialize("First", &items(&["x"]));
        let b = serialize("Second", &items(&["y"]));
        let text = format!("fn f() {{}}\n{a}\nfn g() {{}}\n{b}\n");
        let blocks = parse_blocks(&text, ChecklistPolicy::Strict);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].title, "First");
        assert_eq!(blocks[1].title, "Second");
        assert!(blocks[0].span.end <= blocks[1].span.start);
        assert_eq!(&text[blocks[0].span.clone()], blocks[0].comment);
        assert_eq!(&text[blocks[1].span.clone()], blocks[1].comment);
    }

    #[test]
    fn strict_drops_malformed_lines() {
        let text = "/* [RED] trello task T, checklist items\n1.good\nnot numbered\n2.also good\n*/";
        let blocks = parse_blocks(text, ChecklistPolicy::Strict);
        assert_eq!(blocks[0].checklist, items(&["good", "also good"]));
    }

    #[test]
    fn loose_splits_on_delimiter_only() {
        let text = "/* [RED] trello task T, checklist items\n1.good\nnot numbered\n2.also good\n*/";
        let blocks = parse_blocks(text, ChecklistPolicy::Loose);
        // The unnumbered line stays attached to the item before it.
        assert_eq!(blocks[0].checklist, items(&["good\nnot numbered", "also good"]));
    }

    #[test]
    fn title_and_items_trimmed() {
        let text = "/* [RED] trello task   Spaced out  , checklist items\n  1.  padded item  \n*/";
        let blocks = parse_blocks(text, ChecklistPolicy::Strict);
        assert_eq!(blocks[0].title, "Spaced out");
        assert_eq!(blocks[0].checklist, items(&["padded item"]));
    }

    #[test]
    fn no_blocks_in_plain_source() {
        let text = "fn main() { /* ordinary comment */ }";
        assert!(parse_blocks(text, ChecklistPolicy::Strict).is_empty());
    }

    #[test]
    fn serialized_final_round_trips_as_final() {
        let text = serialize_final("T", &items(&["a", "b"]));
        let blocks = parse_blocks(&text, ChecklistPolicy::Strict);
        assert!(blocks[0].finalized);
        assert_eq!(blocks[0].checklist, items(&["a", "b"]));
    }

    #[test]
    fn active_tasks_carry_verbatim_comment() {
        let text = format!("prefix\n{}\nsuffix", serialize("T", &items(&["a"])));
        let tasks = active_tasks(&text, ChecklistPolicy::Strict);
        assert_eq!(tasks.len(), 1);
        assert!(text.contains(&tasks[0].comment));
        assert!(tasks[0].comment.starts_with("/*"));
        assert!(tasks[0].comment.ends_with("*/"));
    }
}
