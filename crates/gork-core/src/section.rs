use crate::tags::ParamLocation;
use serde::Serialize;
use std::fmt;

/// A named part of a request, bound and validated independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Section {
    Path,
    Query,
    Headers,
    Cookies,
    Body,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Path,
        Section::Query,
        Section::Headers,
        Section::Cookies,
        Section::Body,
    ];

    /// Recognize a top-level request field name, ignoring case
    pub fn from_field_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|section| section.name().eq_ignore_ascii_case(name))
    }

    /// Canonical field name (`Query`)
    pub fn name(&self) -> &'static str {
        match self {
            Section::Path => "Path",
            Section::Query => "Query",
            Section::Headers => "Headers",
            Section::Cookies => "Cookies",
            Section::Body => "Body",
        }
    }

    /// Key used in collected error maps (`query`)
    pub fn key(&self) -> &'static str {
        match self {
            Section::Path => "path",
            Section::Query => "query",
            Section::Headers => "headers",
            Section::Cookies => "cookies",
            Section::Body => "body",
        }
    }

    /// Parameter location of the section's fields; `None` for the body
    pub fn location(&self) -> Option<ParamLocation> {
        match self {
            Section::Path => Some(ParamLocation::Path),
            Section::Query => Some(ParamLocation::Query),
            Section::Headers => Some(ParamLocation::Header),
            Section::Cookies => Some(ParamLocation::Cookie),
            Section::Body => None,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
