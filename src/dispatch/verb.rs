//! HTTP verbs known to the dispatcher.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl Verb {
    pub const ALL: [Verb; 7] = [
        Verb::Get,
        Verb::Post,
        Verb::Put,
        Verb::Patch,
        Verb::Delete,
        Verb::Head,
        Verb::Options,
    ];

    /// Name of the client handler serving this verb.
    pub fn handler_name(&self) -> &'static str {
        match self {
            Verb::Get => "processGet",
            Verb::Post => "processPost",
            Verb::Put => "processPut",
            Verb::Patch => "processPatch",
            Verb::Delete => "processDelete",
            Verb::Head => "head",
            Verb::Options => "processOptions",
        }
    }

    pub fn as_method(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
            Verb::Head => "HEAD",
            Verb::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_method())
    }
}
