use thiserror::Error;

/// A range expression that could not be turned into page groups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvalidRangeError(pub String);

impl InvalidRangeError {
    fn new(reason: impl Into<String>) -> Self {
        InvalidRangeError(reason.into())
    }
}

/// Ordered 0-based page indices destined for one output document.
pub type PageGroup = Vec<usize>;

/// One comma-separated unit of a range expression, 1-based as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeToken {
    Single(usize),
    Closed { start: usize, end: usize },
    Open { start: usize },
}

impl RangeToken {
    /// Parse a token like "5", "1-3" or "7-" and check it against the page count.
    ///
    /// Bounds are checked as each number is read, so "9-x" on a 5 page
    /// document reports the out-of-range start rather than the bad end.
    pub fn parse(token: &str, total_pages: usize) -> Result<Self, InvalidRangeError> {
        let parts: Vec<&str> = token.split('-').collect();

        match parts.as_slice() {
            [single] => {
                let page = parse_page_number(single)?;
                check_bounds(page, total_pages)?;
                Ok(RangeToken::Single(page))
            }
            [start, end] => {
                let (start, end) = (start.trim(), end.trim());
                if start.is_empty() {
                    return Err(InvalidRangeError::new(format!(
                        "start page required: '{}'",
                        token
                    )));
                }

                let start = parse_page_number(start)?;
                check_bounds(start, total_pages)?;

                if end.is_empty() {
                    return Ok(RangeToken::Open { start });
                }

                let end = parse_page_number(end)?;
                check_bounds(end, total_pages)?;

                if end < start {
                    return Err(InvalidRangeError::new(format!(
                        "end before start: '{}'",
                        token
                    )));
                }

                Ok(RangeToken::Closed { start, end })
            }
            _ => Err(InvalidRangeError::new(format!(
                "malformed token: {}",
                token
            ))),
        }
    }

    /// Expand into ascending 0-based indices. Page 0 is treated as page 1,
    /// though `parse` never produces it.
    fn expand(&self, total_pages: usize) -> PageGroup {
        match *self {
            RangeToken::Single(page) => vec![page.saturating_sub(1)],
            RangeToken::Closed { start, end } => (start.saturating_sub(1)..end).collect(),
            RangeToken::Open { start } => (start.saturating_sub(1)..total_pages).collect(),
        }
    }
}

/// Page groups in the order their tokens appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRanges {
    groups: Vec<PageGroup>,
}

impl ParsedRanges {
    pub fn into_groups(self) -> Vec<PageGroup> {
        self.groups
    }
}

/// Parse a comma-separated range expression like "1-3,5,7-" into page groups.
///
/// Input pages are 1-based and inclusive; output indices are 0-based. Every
/// non-empty token becomes its own group, so overlapping tokens produce
/// overlapping groups.
pub fn parse(ranges_text: &str, total_pages: usize) -> Result<ParsedRanges, InvalidRangeError> {
    if ranges_text.trim().is_empty() {
        return Err(InvalidRangeError::new("empty range string"));
    }

    let tokens: Vec<&str> = ranges_text
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect();

    if tokens.is_empty() {
        return Err(InvalidRangeError::new("empty range string"));
    }

    let groups = tokens
        .into_iter()
        .map(|token| RangeToken::parse(token, total_pages).map(|t| t.expand(total_pages)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ParsedRanges { groups })
}

fn parse_page_number(s: &str) -> Result<usize, InvalidRangeError> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InvalidRangeError::new(format!(
            "invalid page number: '{}'",
            s
        )));
    }

    let value: usize = s
        .parse()
        .map_err(|_| InvalidRangeError::new(format!("invalid page number: '{}'", s)))?;

    if value == 0 {
        return Err(InvalidRangeError::new(format!(
            "page numbers must be positive: '{}'",
            s
        )));
    }

    Ok(value)
}

fn check_bounds(page: usize, total_pages: usize) -> Result<(), InvalidRangeError> {
    if page > total_pages {
        return Err(InvalidRangeError::new(format!(
            "page {} is out of range (1-{})",
            page, total_pages
        )));
    }
    Ok(())
}
