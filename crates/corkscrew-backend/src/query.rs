use std::fmt;

/// Record collections owned by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Profiles,
    Jobs,
    JobApplications,
    Messages,
    Reviews,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Profiles => "profiles",
            Table::Jobs => "jobs",
            Table::JobApplications => "job_applications",
            Table::Messages => "messages",
            Table::Reviews => "reviews",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Row predicate. Values are compared as text, or numerically when the column
/// holds a number.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, String),
    /// Case-insensitive LIKE; `%` matches any run of characters
    ILike(String, String),
    Gte(String, String),
    In(String, Vec<String>),
    Or(Vec<Filter>),
}

const RESERVED: &[char] = &[',', '(', ')', '.', ':', '"', ' '];

fn quote(value: &str) -> String {
    if value.contains(RESERVED) {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

impl Filter {
    /// `op.value` part of a PostgREST filter, e.g. `ilike.*austin*`
    fn operand(&self) -> String {
        match self {
            Filter::Eq(_, v) => format!("eq.{}", v),
            Filter::ILike(_, p) => format!("ilike.{}", p.replace('%', "*")),
            Filter::Gte(_, v) => format!("gte.{}", v),
            Filter::In(_, values) => {
                let items: Vec<String> = values.iter().map(|v| quote(v)).collect();
                format!("in.({})", items.join(","))
            }
            Filter::Or(_) => String::new(),
        }
    }

    /// Form used inside logical groups: `col.op.value` or `or(...)`
    fn inline(&self) -> String {
        match self {
            Filter::Eq(c, v) | Filter::Gte(c, v) => {
                let op = if matches!(self, Filter::Eq(..)) { "eq" } else { "gte" };
                format!("{}.{}.{}", c, op, quote(v))
            }
            Filter::ILike(c, _) | Filter::In(c, _) => format!("{}.{}", c, self.operand()),
            Filter::Or(filters) => format!("or({})", Self::join(filters)),
        }
    }

    fn join(filters: &[Filter]) -> String {
        filters
            .iter()
            .map(Filter::inline)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Top-level query string pair
    pub fn to_query_pair(&self) -> (String, String) {
        match self {
            Filter::Eq(c, _) | Filter::ILike(c, _) | Filter::Gte(c, _) | Filter::In(c, _) => {
                (c.clone(), self.operand())
            }
            Filter::Or(filters) => ("or".to_string(), format!("({})", Self::join(filters))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// A read against one collection: filters (AND-ed), ordering, optional limit
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: Table,
    pub columns: Option<String>,
    pub filters: Vec<Filter>,
    pub order: Vec<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn from(table: Table) -> Self {
        Self {
            table,
            columns: None,
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    /// Restrict returned columns, e.g. `"id, title"`
    pub fn select(mut self, columns: &str) -> Self {
        self.columns = Some(columns.to_string());
        self
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters
            .push(Filter::Eq(column.to_string(), value.to_string()));
        self
    }

    /// Case-insensitive substring match
    pub fn ilike_contains(mut self, column: &str, needle: &str) -> Self {
        self.filters
            .push(Filter::ILike(column.to_string(), format!("%{}%", needle)));
        self
    }

    pub fn gte(mut self, column: &str, value: impl ToString) -> Self {
        self.filters
            .push(Filter::Gte(column.to_string(), value.to_string()));
        self
    }

    pub fn in_list<T: ToString>(mut self, column: &str, values: &[T]) -> Self {
        self.filters.push(Filter::In(
            column.to_string(),
            values.iter().map(ToString::to_string).collect(),
        ));
        self
    }

    pub fn or(mut self, filters: Vec<Filter>) -> Self {
        self.filters.push(Filter::Or(filters));
        self
    }

    pub fn order_asc(mut self, column: &str) -> Self {
        self.order.push(Order {
            column: column.to_string(),
            ascending: true,
        });
        self
    }

    pub fn order_desc(mut self, column: &str) -> Self {
        self.order.push(Order {
            column: column.to_string(),
            ascending: false,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// PostgREST query string pairs for this read
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![(
            "select".to_string(),
            self.columns
                .as_deref()
                .map(|c| c.replace(' ', ""))
                .unwrap_or_else(|| "*".to_string()),
        )];
        pairs.extend(self.filters.iter().map(Filter::to_query_pair));
        if !self.order.is_empty() {
            let order: Vec<String> = self
                .order
                .iter()
                .map(|o| {
                    format!(
                        "{}.{}",
                        o.column,
                        if o.ascending { "asc" } else { "desc" }
                    )
                })
                .collect();
            pairs.push(("order".to_string(), order.join(",")));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_job_search_encoding() {
        let q = Query::from(Table::Jobs)
            .eq("status", "open")
            .ilike_contains("location", "Austin")
            .gte("event_date", "2025-06-01")
            .order_asc("event_date");
        let pairs = q.to_query_pairs();
        assert_eq!(pair(&pairs, "select"), Some("*"));
        assert_eq!(pair(&pairs, "status"), Some("eq.open"));
        assert_eq!(pair(&pairs, "location"), Some("ilike.*Austin*"));
        assert_eq!(pair(&pairs, "event_date"), Some("gte.2025-06-01"));
        assert_eq!(pair(&pairs, "order"), Some("event_date.asc"));
        assert_eq!(pair(&pairs, "limit"), None);
    }

    #[test]
    fn test_or_and_in_encoding() {
        let q = Query::from(Table::Messages)
            .or(vec![
                Filter::Eq("sender_id".into(), "u1".into()),
                Filter::Eq("recipient_id".into(), "u1".into()),
            ])
            .in_list("job_id", &["a", "b,c"])
            .order_desc("created_at")
            .limit(10);
        let pairs = q.to_query_pairs();
        assert_eq!(pair(&pairs, "or"), Some("(sender_id.eq.u1,recipient_id.eq.u1)"));
        assert_eq!(pair(&pairs, "job_id"), Some("in.(a,\"b,c\")"));
        assert_eq!(pair(&pairs, "order"), Some("created_at.desc"));
        assert_eq!(pair(&pairs, "limit"), Some("10"));
    }

    #[test]
    fn test_select_columns_strip_spaces() {
        let q = Query::from(Table::Jobs).select("id, title, client_id");
        assert_eq!(
            pair(&q.to_query_pairs(), "select"),
            Some("id,title,client_id")
        );
    }
}
