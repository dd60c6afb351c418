use serde::Serialize;

/// Page browser state derived from the total hit count of a first search
/// pass and the requested page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageState {
    pub pointer: u64,
    pub offset: u64,
    pub limit: u64,
    pub out_of_range: bool,
}

impl PageState {
    /// `pointer` is the zero-based page requested by the visitor. Pointers past
    /// the last page are moved onto the last page and flagged.
    pub fn compute(pointer: u64, total: u64, limit: u64) -> Self {
        let limit = limit.max(1);
        let last_page = Self::page_count(total, limit).saturating_sub(1);
        let out_of_range = pointer > last_page;
        let pointer = pointer.min(last_page);
        Self {
            pointer,
            offset: pointer.saturating_mul(limit),
            limit,
            out_of_range,
        }
    }

    pub fn page_count(total: u64, limit: u64) -> u64 {
        total.div_ceil(limit.max(1))
    }
}
