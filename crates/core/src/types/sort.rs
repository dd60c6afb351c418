use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Single sort criterion parsed from `"field order"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub field: String,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn parse(input: &str) -> Option<Self> {
        let mut parts = input.split_whitespace();
        let field = parts.next()?;
        let order = match parts.next() {
            Some(order) if order.eq_ignore_ascii_case("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        };
        Some(Self {
            field: field.to_string(),
            order,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_field_and_order() {
        let sort = SortSpec::parse("  tstamp   DESC ").unwrap();
        assert_eq!(sort.field, "tstamp");
        assert_eq!(sort.order, SortOrder::Desc);
    }

    #[test]
    fn parse_defaults_to_ascending() {
        assert_eq!(SortSpec::parse("title").unwrap().order, SortOrder::Asc);
        assert_eq!(SortSpec::parse("title sideways").unwrap().order, SortOrder::Asc);
    }

    #[test]
    fn parse_blank_is_none() {
        assert!(SortSpec::parse("   ").is_none());
    }
}
