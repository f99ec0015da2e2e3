//! Bio-index API client
//!
//! Queries return pages of JSON rows. A page carries a `continuation` token
//! while more rows remain; the client follows it until the listing ends.
//! Any non-success status aborts the whole query.

mod records;

pub use records::{FactorRecord, GenePhenotypeRecord, GeneSetPhenotypeRecord, PhenotypeRecord};

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Default API host
pub const DEFAULT_BASE_URL: &str = "https://bioindex-dev.hugeamp.org";

pub const PHENOTYPES_INDEX: &str = "pigean-phenotypes";
pub const GENE_PHENOTYPE_INDEX: &str = "pigean-gene-phenotype";
pub const GENE_SET_PHENOTYPE_INDEX: &str = "pigean-gene-set-phenotype";
pub const FACTOR_INDEX: &str = "pigean-factor";

/// Errors raised while talking to the bio-index
#[derive(Debug, Error)]
pub enum BioIndexError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("bio-index returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to decode bio-index response: {0}")]
    Decode(String),
}

/// Source of bio-index rows.
///
/// `query` returns every row of the listing, across all pages.
pub trait BioIndexClient: Send + Sync {
    fn query(&self, index: &str, q: &str) -> Result<Vec<Value>, BioIndexError>;
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    data: Vec<Value>,
    #[serde(default)]
    continuation: Option<String>,
}

/// Blocking HTTP client for the bio-index REST API
#[derive(Clone)]
pub struct BioIndexHttpClient {
    client: Client,
    base_url: String,
}

impl BioIndexHttpClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BioIndexError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&format!("portal-graph/{}", env!("CARGO_PKG_VERSION")))
                .map_err(|err| BioIndexError::Http(err.to_string()))?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| BioIndexError::Http(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn fetch_page(&self, request: reqwest::blocking::RequestBuilder) -> Result<Page, BioIndexError> {
        let response = request
            .send()
            .map_err(|err| BioIndexError::Http(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(BioIndexError::Status {
                status: status.as_u16(),
                message,
            });
        }
        response
            .json::<Page>()
            .map_err(|err| BioIndexError::Decode(err.to_string()))
    }
}

impl BioIndexClient for BioIndexHttpClient {
    fn query(&self, index: &str, q: &str) -> Result<Vec<Value>, BioIndexError> {
        let url = format!("{}/api/bio/query/{}", self.base_url, index);
        let first = self.fetch_page(self.client.get(&url).query(&[("q", q)]))?;
        let cont_url = format!("{}/api/bio/cont", self.base_url);
        let (rows, pages) = collect_pages(first, |token| {
            self.fetch_page(self.client.get(&cont_url).query(&[("token", token)]))
        })?;

        debug!(index, q, pages, rows = rows.len(), "bio-index query complete");
        Ok(rows)
    }
}

/// Drain a paginated listing, following continuation tokens until a page
/// arrives without one. Returns the rows and the number of pages read.
fn collect_pages<F>(mut page: Page, mut next: F) -> Result<(Vec<Value>, usize), BioIndexError>
where
    F: FnMut(&str) -> Result<Page, BioIndexError>,
{
    let mut rows = std::mem::take(&mut page.data);
    let mut pages = 1usize;
    while let Some(token) = page.continuation.take() {
        page = next(&token)?;
        rows.append(&mut page.data);
        pages += 1;
    }
    Ok((rows, pages))
}

/// Query string for per-phenotype indexes: `<phenotype>,<sigma>,<size>`
pub fn phenotype_query(phenotype: &str, sigma: u32, geneset_size: &str) -> String {
    format!("{},{},{}", phenotype, sigma, geneset_size)
}

fn decode_rows<T: DeserializeOwned>(index: &str, rows: Vec<Value>) -> Vec<T> {
    let total = rows.len();
    let decoded: Vec<T> = rows
        .into_iter()
        .filter_map(|row| serde_json::from_value(row).ok())
        .collect();
    let dropped = total - decoded.len();
    if dropped > 0 {
        warn!(index, dropped, "dropped malformed bio-index rows");
    }
    decoded
}

/// Every phenotype known to the bio-index
pub fn fetch_phenotypes(client: &dyn BioIndexClient) -> Result<Vec<PhenotypeRecord>, BioIndexError> {
    let rows = client.query(PHENOTYPES_INDEX, "1")?;
    Ok(decode_rows(PHENOTYPES_INDEX, rows))
}

/// Gene scores for one phenotype
pub fn fetch_gene_phenotypes(
    client: &dyn BioIndexClient,
    phenotype: &str,
    sigma: u32,
    geneset_size: &str,
) -> Result<Vec<GenePhenotypeRecord>, BioIndexError> {
    let rows = client.query(GENE_PHENOTYPE_INDEX, &phenotype_query(phenotype, sigma, geneset_size))?;
    Ok(decode_rows(GENE_PHENOTYPE_INDEX, rows))
}

/// Gene-set scores for one phenotype
pub fn fetch_gene_set_phenotypes(
    client: &dyn BioIndexClient,
    phenotype: &str,
    sigma: u32,
    geneset_size: &str,
) -> Result<Vec<GeneSetPhenotypeRecord>, BioIndexError> {
    let rows = client.query(
        GENE_SET_PHENOTYPE_INDEX,
        &phenotype_query(phenotype, sigma, geneset_size),
    )?;
    Ok(decode_rows(GENE_SET_PHENOTYPE_INDEX, rows))
}

/// Factors for one phenotype
pub fn fetch_factors(
    client: &dyn BioIndexClient,
    phenotype: &str,
    sigma: u32,
    geneset_size: &str,
) -> Result<Vec<FactorRecord>, BioIndexError> {
    let rows = client.query(FACTOR_INDEX, &phenotype_query(phenotype, sigma, geneset_size))?;
    Ok(decode_rows(FACTOR_INDEX, rows))
}
