use std::sync::LazyLock;

use regex::Regex;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_.\-]*)\s*\}\}").expect("valid")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    /// Placeholder name plus the exact source text, so it can be emitted back unchanged.
    Placeholder { name: String, raw: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub segments: Vec<Segment>,
}

/// Splits `input` into literals and `{{name}}` placeholders.
///
/// Anything that does not look like a placeholder (`{{ }}`, `{{1x}}`, a lone `{`) stays literal.
pub fn parse_template(input: &str) -> Template {
    let mut segments = Vec::new();
    let mut last = 0;
    for caps in PLACEHOLDER_RE.captures_iter(input) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            segments.push(Segment::Literal(input[last..whole.start()].to_string()));
        }
        segments.push(Segment::Placeholder {
            name: name.as_str().to_string(),
            raw: whole.as_str().to_string(),
        });
        last = whole.end();
    }
    if last < input.len() {
        segments.push(Segment::Literal(input[last..].to_string()));
    }
    Template { segments }
}

/// Placeholder names referenced by `input`, in order of appearance.
pub fn placeholders(input: &str) -> Vec<String> {
    PLACEHOLDER_RE
        .captures_iter(input)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

impl Template {
    pub fn has_placeholders(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Placeholder { .. }))
    }

    /// Renders the template; placeholders `lookup` cannot resolve are kept verbatim and returned.
    pub fn render(&self, lookup: impl Fn(&str) -> Option<String>) -> (String, Vec<String>) {
        let mut out = String::new();
        let mut unresolved = Vec::new();
        for seg in &self.segments {
            match seg {
                Segment::Literal(l) => out.push_str(l),
                Segment::Placeholder { name, raw } => match lookup(name) {
                    Some(v) => out.push_str(&v),
                    None => {
                        out.push_str(raw);
                        unresolved.push(name.clone());
                    }
                },
            }
        }
        (out, unresolved)
    }
}
