//! Listing options parsed from a query string.
//!
//! These are the inputs a storage-side pagination builder consumes; building
//! the actual query is left to that collaborator.
//!
//! | Key | Meaning |
//! |---|---|
//! | `page`, `limit` | positive integers, default `1` and `10` |
//! | `sort` | `name,-created_at` (leading `-` sorts descending) |
//! | `search` | `field,keyword` |
//! | `select` | `id,name` |
//! | `key[]` given twice | inclusive range on `key` |
//! | any other key | equality filter on its first value |

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

const DEFAULT_PAGE: u64 = 1;
const DEFAULT_LIMIT: u64 = 10;

const RESERVED: [&str; 5] = ["page", "limit", "sort", "search", "select"];

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SortField {
    pub field: String,
    pub desc: bool,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SearchQuery {
    pub field: String,
    pub keyword: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueryOptions {
    pub page: u64,
    pub limit: u64,
    pub offset: u64,
    pub sort: Vec<SortField>,
    pub search: Option<SearchQuery>,
    pub filters: BTreeMap<String, String>,
    pub select: Vec<String>,
    pub between: BTreeMap<String, (String, String)>,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            offset: 0,
            sort: Vec::new(),
            search: None,
            filters: BTreeMap::new(),
            select: Vec::new(),
            between: BTreeMap::new(),
        }
    }
}

impl QueryOptions {
    /// Parses a raw query string (without the leading `?`). Malformed input
    /// yields the defaults.
    pub fn parse(query: &str) -> Self {
        let pairs: Vec<(String, String)> = match serde_urlencoded::from_str(query) {
            Ok(pairs) => pairs,
            Err(e) => {
                debug!(error = %e, "unparsable query string, using default listing options");
                Vec::new()
            }
        };
        Self::from_pairs(&pairs)
    }

    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let first = |key: &str| {
            pairs.iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
                .filter(|v| !v.is_empty())
        };
        let positive = |key: &str| first(key).and_then(|v| v.parse::<u64>().ok()).filter(|n| *n > 0);

        let mut opts = Self::default();
        opts.page = positive("page").unwrap_or(DEFAULT_PAGE);
        opts.limit = positive("limit").unwrap_or(DEFAULT_LIMIT);
        opts.offset = (opts.page - 1).saturating_mul(opts.limit);

        if let Some(sort) = first("sort") {
            opts.sort = sort.split(',')
                .map(|f| match f.strip_prefix('-') {
                    Some(field) => SortField { field: field.to_owned(), desc: true },
                    None => SortField { field: f.to_owned(), desc: false },
                })
                .collect();
        }

        if let Some((field, keyword)) = first("search").and_then(|s| s.split_once(',')) {
            opts.search = Some(SearchQuery { field: field.to_owned(), keyword: keyword.to_owned() });
        }

        if let Some(select) = first("select") {
            opts.select = select.split(',').map(str::to_owned).collect();
        }

        let mut grouped: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (key, value) in pairs {
            if !RESERVED.contains(&key.as_str()) {
                grouped.entry(key.as_str()).or_default().push(value.as_str());
            }
        }
        for (key, values) in grouped {
            match (key.strip_suffix("[]"), values.as_slice()) {
                (Some(field), [low, high]) => {
                    opts.between.insert(field.to_owned(), ((*low).to_owned(), (*high).to_owned()));
                }
                _ => {
                    opts.filters.insert(key.to_owned(), values[0].to_owned());
                }
            }
        }

        opts
    }
}

/// One page of a listing, as returned to clients.
#[derive(Clone, Debug, Serialize)]
pub struct Pagination<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

impl<T> Pagination<T> {
    pub fn new(items: Vec<T>, total: u64, opts: &QueryOptions) -> Self {
        Self { items, total, page: opts.page, limit: opts.limit }
    }
}
