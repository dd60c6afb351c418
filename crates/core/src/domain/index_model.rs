/// Configured search index: a display title plus the credential string the
/// engine connects with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexModel {
    pub title: String,
    pub credentials: String,
}

impl IndexModel {
    pub fn new(title: impl Into<String>, credentials: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            credentials: credentials.into(),
        }
    }
}
