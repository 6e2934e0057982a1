use cardscan_net::Url;
use derive_more::Display;

const CARDS_ENDPOINT: &str = "cards";

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// `name:"term"`
    #[display("exact")]
    Exact,
    /// `name:term*`
    #[display("wildcard")]
    Wildcard,
}
impl QueryMode {
    /// Tiers in the order they're attempted.
    pub const TIERS: [QueryMode; 2] = [Self::Exact, Self::Wildcard];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogQuery {
    pub term: String,
    pub mode: QueryMode,
    pub page_size: u32,
}
impl CatalogQuery {
    pub fn new(term: impl Into<String>, mode: QueryMode, page_size: u32) -> Self {
        Self { term: term.into(), mode, page_size }
    }

    /// Value of the `q` parameter.
    pub fn expression(&self) -> String {
        match self.mode {
            QueryMode::Exact => format!("name:\"{}\"", self.term),
            QueryMode::Wildcard => format!("name:{}*", self.term),
        }
    }

    /// Full request URL under `base`; a trailing slash on `base` is optional.
    pub fn url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(CARDS_ENDPOINT);
        }
        url.query_pairs_mut()
            .clear()
            .append_pair("q", &self.expression())
            .append_pair("pageSize", &self.page_size.to_string());
        url
    }
}
