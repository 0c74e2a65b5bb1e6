use bitflags::bitflags;
use url::Url;

bitflags! {
    /// Caller-facing options for a single navigation request.
    pub struct NavigationFlags: u32 {
        /// Record the navigation in the session history.
        const HISTORY = 0b0000_0001;
        /// Suppress the departing-page history touch-up that normally runs
        /// before leaving the current page.
        const NO_TERMINAL_HISTORY_UPDATE = 0b0000_0010;
        /// The navigation targets an internal prompt page rather than a page
        /// the user asked to visit.
        const INTERNAL = 0b0000_0100;
        /// The fetch is not a verifiable top-level navigation (object and
        /// iframe loads).
        const UNVERIFIABLE = 0b0000_1000;
        /// Force save-to-disk instead of display.
        const DOWNLOAD = 0b0001_0000;
    }
}

bitflags! {
    /// Options handed to the fetch provider.
    pub struct FetchFlags: u32 {
        const VERIFIABLE   = 0b0000_0001;
        const SNIFF_TYPE   = 0b0000_0010;
        const MAY_DOWNLOAD = 0b0000_0100;
        const FORCE_FETCH  = 0b0000_1000;
        const STREAM       = 0b0001_0000;
        const SNOOP        = 0b0010_0000;
    }
}

/// One field of a multipart form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: String,
}

impl FormField {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Body of a POST request. A navigation carries at most one of these shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostBody {
    UrlEncoded(String),
    Multipart(Vec<FormField>),
}

impl PostBody {
    pub fn multipart_fields(&self) -> Option<&[FormField]> {
        match self {
            PostBody::Multipart(fields) => Some(fields),
            PostBody::UrlEncoded(_) => None,
        }
    }
}

/// Everything describing one navigation attempt.
///
/// A value is built completely before it is stored into a window's parameter
/// slot; slots are replaced wholesale and never hold a partially filled
/// value. Cloning is used when an attempt has to be resurrected later (retry,
/// reload of the last committed page).
#[derive(Debug, Clone, PartialEq)]
pub struct FetchParams {
    pub url: Url,
    pub referrer: Option<Url>,
    pub post: Option<PostBody>,
    pub flags: NavigationFlags,
    pub parent_charset: Option<String>,
    pub parent_quirks: bool,
}

impl FetchParams {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            referrer: None,
            post: None,
            flags: NavigationFlags::empty(),
            parent_charset: None,
            parent_quirks: false,
        }
    }

    /// Parameters for an internal prompt navigation. These always carry a
    /// multipart body with the machine-readable prompt context.
    pub(crate) fn internal(url: Url, fields: Vec<FormField>) -> Self {
        Self {
            url,
            referrer: None,
            post: Some(PostBody::Multipart(fields)),
            flags: NavigationFlags::INTERNAL
                | NavigationFlags::HISTORY
                | NavigationFlags::NO_TERMINAL_HISTORY_UPDATE,
            parent_charset: None,
            parent_quirks: false,
        }
    }

    /// Value of a named multipart field, if this attempt posted one.
    pub(crate) fn field(&self, name: &str) -> Option<&str> {
        self.post
            .as_ref()
            .and_then(PostBody::multipart_fields)
            .and_then(|fields| fields.iter().find(|f| f.name == name))
            .map(|f| f.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn navigation_flags_are_distinct() {
        let all = NavigationFlags::HISTORY
            | NavigationFlags::NO_TERMINAL_HISTORY_UPDATE
            | NavigationFlags::INTERNAL
            | NavigationFlags::UNVERIFIABLE
            | NavigationFlags::DOWNLOAD;
        assert_eq!(all.bits().count_ones(), 5);
    }

    #[test]
    fn internal_params_carry_prompt_flags() {
        let p = FetchParams::internal(
            url("about:query_auth"),
            vec![FormField::new("siteurl", "https://example.com/")],
        );
        assert!(p.flags.contains(NavigationFlags::INTERNAL));
        assert!(p.flags.contains(NavigationFlags::HISTORY));
        assert!(p.flags.contains(NavigationFlags::NO_TERMINAL_HISTORY_UPDATE));
        assert_eq!(p.field("siteurl"), Some("https://example.com/"));
        assert_eq!(p.field("missing"), None);
    }

    #[test]
    fn urlencoded_body_has_no_fields() {
        let mut p = FetchParams::new(url("https://example.com/"));
        p.post = Some(PostBody::UrlEncoded("a=1&b=2".to_string()));
        assert_eq!(p.field("a"), None);
        assert!(p.post.as_ref().unwrap().multipart_fields().is_none());
    }
}
