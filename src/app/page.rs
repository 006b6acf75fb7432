use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

/// Pages that exist inside the simulator and never need a network check
pub const KNOWN_PAGES: [&str; 6] = ["Home", "About", "Products", "Contact", "Settings", "Help"];

pub const HOME_PAGE: &str = "Home";

const DEFAULT_SCHEME: &str = "https://";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    #[error("navigation target is empty")]
    EmptyInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Internal,
    External,
}

/// A navigation target. Equality and hashing only look at the canonical form,
/// so `about` and `About` are the same page.
#[derive(Debug, Clone)]
pub struct PageRef {
    raw: String,
    canonical: String,
    kind: PageKind,
}

impl PageRef {
    pub fn home() -> Self {
        Self {
            raw: HOME_PAGE.to_string(),
            canonical: HOME_PAGE.to_string(),
            kind: PageKind::Internal,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn kind(&self) -> PageKind {
        self.kind
    }

    pub fn is_internal(&self) -> bool {
        self.kind == PageKind::Internal
    }
}

/// Normalize user input into a [`PageRef`].
///
/// Known page names are matched after capitalizing the first letter. Anything
/// else is treated as a URL: `https://` is added when no http(s) scheme is
/// present and trailing slashes are dropped.
pub fn canonicalize(raw: &str) -> Result<PageRef, PageError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PageError::EmptyInput);
    }

    let capitalized = capitalize_first(trimmed);
    if let Some(known) = KNOWN_PAGES.iter().find(|&&page| page == capitalized) {
        return Ok(PageRef {
            raw: raw.to_string(),
            canonical: (*known).to_string(),
            kind: PageKind::Internal,
        });
    }

    let (scheme, rest) = split_scheme(trimmed);
    let rest = rest.trim_end_matches(|c: char| c == '/' || c.is_whitespace());
    let canonical = format!("{}{}", scheme, rest);

    Ok(PageRef {
        raw: raw.to_string(),
        canonical,
        kind: PageKind::External,
    })
}

fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Split off an http(s) scheme, matched case-insensitively. Returns the
/// lower-case scheme prefix, or the default one when none was typed.
fn split_scheme(s: &str) -> (&'static str, &str) {
    for scheme in ["https://", "http://"] {
        if let Some(prefix) = s.get(..scheme.len()) {
            if prefix.eq_ignore_ascii_case(scheme) {
                return (scheme, &s[scheme.len()..]);
            }
        }
    }
    (DEFAULT_SCHEME, s)
}

impl PartialEq for PageRef {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for PageRef {}

impl Hash for PageRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl FromStr for PageRef {
    type Err = PageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        canonicalize(s)
    }
}
