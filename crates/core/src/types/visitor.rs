use std::collections::BTreeSet;

/// Group ids that are accepted for every visitor: `0` is public content,
/// `-2` is content shown to any logged-in user.
pub const ALWAYS_VISIBLE_GROUPS: [i64; 2] = [0, -2];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitorContext {
    pub group_ids: BTreeSet<i64>,
}

impl VisitorContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_groups<I>(groups: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        Self {
            group_ids: groups.into_iter().collect(),
        }
    }

    /// Parses a comma separated group list, ignoring entries that are not integers.
    pub fn from_group_list(input: &str) -> Self {
        Self::with_groups(
            input
                .split(',')
                .filter_map(|item| item.trim().parse::<i64>().ok()),
        )
    }

    /// Accepted group markers in match-query form: the visitor's own groups
    /// followed by the always visible sentinels.
    pub fn access_terms(&self) -> String {
        self.group_ids
            .iter()
            .copied()
            .filter(|group| !ALWAYS_VISIBLE_GROUPS.contains(group))
            .chain(ALWAYS_VISIBLE_GROUPS)
            .map(|group| group.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
