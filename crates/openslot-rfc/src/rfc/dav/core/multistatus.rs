//! Parsed multistatus responses.
//!
//! Properties are keyed by local name only. The handful of properties a
//! client reads do not collide across the DAV, `CalDAV` and Apple namespaces.

/// A `DAV:multistatus` response body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Multistatus {
    pub responses: Vec<DavResponse>,
}

/// One `DAV:response` element.
///
/// Only properties from propstats with a 2xx status (or no status at all)
/// are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DavResponse {
    pub href: String,
    /// Response-level status, if the server sent one instead of propstats.
    pub status: Option<u16>,
    pub properties: Vec<DavProperty>,
}

/// A single property inside `DAV:prop`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DavProperty {
    /// Local name, e.g. `displayname`.
    pub name: String,
    /// Text content, untrimmed.
    pub text: String,
    /// `DAV:href` values nested in the property.
    pub hrefs: Vec<String>,
    /// Local names of other direct child elements (e.g. resourcetype values).
    pub children: Vec<String>,
}

impl DavProperty {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl DavResponse {
    /// Returns the property with the given local name.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&DavProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Returns the trimmed text of a property, if non-empty.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.property(name)
            .map(|p| p.text.trim())
            .filter(|t| !t.is_empty())
    }

    /// Returns the first href nested in a property.
    #[must_use]
    pub fn href_of(&self, name: &str) -> Option<&str> {
        self.property(name)
            .and_then(|p| p.hrefs.first())
            .map(String::as_str)
    }

    /// Whether `DAV:resourcetype` contains the given element.
    #[must_use]
    pub fn has_resource_type(&self, kind: &str) -> bool {
        self.property("resourcetype")
            .is_some_and(|p| p.children.iter().any(|c| c == kind))
    }
}
