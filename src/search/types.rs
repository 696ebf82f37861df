use serde::Serialize;

/// Page size used when a request does not name one
pub const DEFAULT_LIMIT: usize = 20;

/// A ranked keyword query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    /// Free text; reduced to lemmas before lookup
    pub query: String,
    /// Base URL of a configured site to restrict the search to
    pub site: Option<String>,
    /// Number of ranked results to skip
    pub offset: usize,
    /// Maximum number of results returned
    pub limit: usize,
}

impl SearchRequest {
    /// Creates a request over all sites for the first page of results
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            site: None,
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }

    /// Restricts the request to one site
    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    /// Sets the result window
    pub fn with_page(mut self, offset: usize, limit: usize) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }
}

/// One ranked page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    /// Base URL of the owning site
    pub site: String,
    pub site_name: String,
    /// Path relative to the site base
    pub path: String,
    pub title: String,
    /// Context around the first match, with the match wrapped in `<b>`
    pub snippet: String,
    /// Sum of the weights of all index entries of the page
    pub relevance: f64,
}

/// Result of a search
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// The query was empty after trimming
    EmptyQuery,

    /// No page qualified
    NoMatches,

    /// At least one page qualified
    Found {
        /// Number of qualifying pages before pagination
        count: usize,
        /// The requested window of ranked pages
        results: Vec<SearchHit>,
    },
}

impl SearchOutcome {
    /// Total number of qualifying pages
    pub fn count(&self) -> usize {
        match self {
            Self::Found { count, .. } => *count,
            _ => 0,
        }
    }

    /// The returned window of results (empty unless `Found`)
    pub fn results(&self) -> &[SearchHit] {
        match self {
            Self::Found { results, .. } => results,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let request = SearchRequest::new("crawler")
            .with_site("https://example.com")
            .with_page(20, 10);

        assert_eq!(request.site.as_deref(), Some("https://example.com"));
        assert_eq!(request.offset, 20);
        assert_eq!(request.limit, 10);
    }

    #[test]
    fn test_outcome_accessors() {
        assert_eq!(SearchOutcome::EmptyQuery.count(), 0);
        assert!(SearchOutcome::NoMatches.results().is_empty());

        let found = SearchOutcome::Found {
            count: 5,
            results: Vec::new(),
        };
        assert_eq!(found.count(), 5);
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_string(&SearchOutcome::EmptyQuery).unwrap();
        assert_eq!(json, r#"{"outcome":"empty_query"}"#);
    }
}
