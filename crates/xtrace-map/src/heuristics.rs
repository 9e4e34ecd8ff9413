//! Element-name extraction from validator messages.
//!
//! Each heuristic looks at a message (and its rule id) and proposes element
//! local names, most specific first. [`HEURISTICS`] is tried in order and
//! the first heuristic left with a name after root elements are filtered
//! out wins; later heuristics are not consulted.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use xtrace_model::local_name;

use crate::options::MapperOptions;

/// What a heuristic gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct MessageContext<'a> {
    pub message: &'a str,
    pub rule_id: Option<&'a str>,
    pub options: &'a MapperOptions,
}

pub type Heuristic = fn(&MessageContext<'_>) -> Vec<String>;

/// Heuristics in priority order, with names for logging.
pub const HEURISTICS: [(&str, Heuristic); 6] = [
    ("rule-table", rule_table_names),
    ("structural", structural_names),
    ("prefixed", prefixed_names),
    ("expected", expected_names),
    ("path", path_names),
    ("compound-word", compound_word_names),
];

const NAME: &str = r"[A-Za-z_][\w.\-]*";

static BRACKETED_RULE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\[([A-Za-z0-9][\w.\-]*)\]").expect("Invalid rule id regex"));

static QUOTED_ELEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\belement\s+'([^']+)'").expect("Invalid element regex"));

static PREFIXED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[a-z][a-z0-9]*:([A-Z][\w.\-]*)").expect("Invalid prefixed name regex")
});

static EXPECTED_LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)expected is (?:one of )?\(\s*([^)]*)\)").expect("Invalid expected regex")
});

static EXPECTED_BRACED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"'\{([^']*)\}' is expected").expect("Invalid expected regex")
});

static PATH_CHAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"/?(?:{NAME}:)?{NAME}(?:\s*[/>]\s*(?:{NAME}:)?{NAME})+"
    ))
    .expect("Invalid path regex")
});

static COMPOUND_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z][a-z0-9]+(?:[A-Z][a-z0-9]*)+\b").expect("Invalid compound word regex")
});

/// Element names for a message, from the first heuristic that yields any
/// non-root name. Empty when none does.
pub fn extract_element_names(ctx: &MessageContext<'_>) -> Vec<String> {
    for (label, heuristic) in HEURISTICS {
        let names = keep_candidates(heuristic(ctx), ctx.options);
        if !names.is_empty() {
            debug!(heuristic = label, names = ?names, "extracted element names");
            return names;
        }
    }
    debug!(message = ctx.message, "no element name in message");
    Vec::new()
}

/// Drop roots, non-names and duplicates, keeping order. Sentence
/// punctuation picked up at the end of a name is trimmed first.
fn keep_candidates(names: Vec<String>, options: &MapperOptions) -> Vec<String> {
    let mut kept: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.trim_end_matches(['.', '-']);
        if is_element_name(name) && !options.is_root(name) && !kept.iter().any(|k| k == name) {
            kept.push(name.to_string());
        }
    }
    kept
}

fn is_element_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

/// Local name of an element token as validators print it: `cbc:Name`,
/// `{urn:x}Name` or `{"urn:x":Name}`.
fn element_token(raw: &str) -> String {
    let token = raw.trim().trim_matches(|c| c == '(' || c == ')').trim();
    let token = match token.strip_prefix('{') {
        Some(rest) => match rest.split_once('}') {
            Some((_, after)) if !after.is_empty() => after,
            _ => rest.trim_end_matches('}'),
        },
        None => token,
    };
    local_name(token.trim_matches('"')).trim().to_string()
}

fn rule_table_names(ctx: &MessageContext<'_>) -> Vec<String> {
    let id = ctx
        .rule_id
        .map(str::to_string)
        .or_else(|| bracketed_rule_id(ctx.message));
    id.and_then(|id| ctx.options.targets_for(&id).map(<[String]>::to_vec))
        .unwrap_or_default()
}

/// `[BR-06]-The Seller name ...` -> `BR-06`.
pub fn bracketed_rule_id(message: &str) -> Option<String> {
    BRACKETED_RULE_ID
        .captures(message)
        .map(|caps| caps[1].to_string())
}

fn structural_names(ctx: &MessageContext<'_>) -> Vec<String> {
    QUOTED_ELEMENT
        .captures_iter(ctx.message)
        .map(|caps| element_token(&caps[1]))
        .collect()
}

/// Prefixed mentions in message order, except that a `/`-joined chain is
/// read right to left.
fn prefixed_names(ctx: &MessageContext<'_>) -> Vec<String> {
    let mut groups: Vec<Vec<String>> = Vec::new();
    let mut last_end: Option<usize> = None;
    for caps in PREFIXED_NAME.captures_iter(ctx.message) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let chained = last_end.is_some_and(|end| ctx.message[end..whole.start()].trim() == "/");
        match groups.last_mut() {
            Some(group) if chained => group.push(name.as_str().to_string()),
            _ => groups.push(vec![name.as_str().to_string()]),
        }
        last_end = Some(whole.end());
    }
    groups
        .into_iter()
        .flat_map(|group| group.into_iter().rev())
        .collect()
}

fn expected_names(ctx: &MessageContext<'_>) -> Vec<String> {
    let listed = EXPECTED_LIST
        .captures_iter(ctx.message)
        .chain(EXPECTED_BRACED.captures_iter(ctx.message))
        .flat_map(|caps| {
            split_expected(&caps[1])
                .into_iter()
                .map(|token| element_token(&token))
                .collect::<Vec<_>>()
        });
    listed.collect()
}

/// Split a list of expected elements on commas outside `{...}`.
fn split_expected(list: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for ch in list.chars() {
        match ch {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                items.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    items.push(current);
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Chains such as `AccountingSupplierParty/Party/PartyName` or
/// `Party > PostalAddress`, deepest element first.
fn path_names(ctx: &MessageContext<'_>) -> Vec<String> {
    let mut names = Vec::new();
    for chain in PATH_CHAIN.find_iter(ctx.message) {
        let steps: Vec<&str> = chain
            .as_str()
            .split(['/', '>'])
            .map(str::trim)
            .filter(|step| !step.is_empty())
            .collect();
        names.extend(
            steps
                .into_iter()
                .rev()
                .map(local_name)
                .filter(|name| name.starts_with(|c: char| c.is_ascii_uppercase()))
                .map(str::to_string),
        );
    }
    names
}

fn compound_word_names(ctx: &MessageContext<'_>) -> Vec<String> {
    COMPOUND_WORD
        .find_iter(ctx.message)
        .map(|m| m.as_str().to_string())
        .collect()
}
