use crate::contract::MatchRequest;

const QUOTE_CHARS: [char; 3] = ['"', '\'', '`'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// 0-based tab position. Negative only when the user typed `0`.
    Index(i64),
    LiteralText,
    FuzzyText,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub text: String,
    pub kind: QueryKind,
}

impl Query {
    /// Classifies one submitted line. Returns `None` for blank input, in which
    /// case nothing is sent.
    pub fn classify(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        if let Some(inner) = strip_quote_pair(trimmed) {
            return Some(Self {
                text: inner.trim().to_string(),
                kind: QueryKind::LiteralText,
            });
        }

        if trimmed.chars().all(|ch| ch.is_ascii_digit()) {
            let position = trimmed.parse::<i64>().unwrap_or(i64::MAX);
            return Some(Self {
                text: trimmed.to_string(),
                kind: QueryKind::Index(position - 1),
            });
        }

        Some(Self {
            text: trimmed.to_string(),
            kind: QueryKind::FuzzyText,
        })
    }

    pub fn to_request(&self) -> MatchRequest {
        match self.kind {
            QueryKind::Index(index) => MatchRequest::ByIndex { index },
            QueryKind::LiteralText | QueryKind::FuzzyText => MatchRequest::ByTitle {
                query: self.text.clone(),
            },
        }
    }
}

pub fn classify(raw: &str) -> Option<Query> {
    Query::classify(raw)
}

/// Interior of a matching quote pair. Needs two characters, so a lone `"` is
/// left as fuzzy text rather than read as an empty literal.
fn strip_quote_pair(input: &str) -> Option<&str> {
    let mut chars = input.chars();
    let first = chars.next()?;
    let last = chars.next_back()?;
    if first != last || !QUOTE_CHARS.contains(&first) {
        return None;
    }
    Some(&input[first.len_utf8()..input.len() - last.len_utf8()])
}
