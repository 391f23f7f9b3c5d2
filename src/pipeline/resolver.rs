//! Citation resolution: DOI lookup first, file name heuristic second.

use std::sync::Arc;

use crate::models::ReferenceData;
use crate::sources::MetadataSource;
use crate::utils::{
    citation_from_filename, find_doi, format_bibliography, format_doi_bibliography,
    format_in_text, CitationStyle, ErrorLog,
};

/// DOI detection plus a single metadata lookup
#[derive(Debug, Clone)]
pub struct DoiResolver {
    source: Arc<dyn MetadataSource>,
}

impl DoiResolver {
    pub fn new(source: Arc<dyn MetadataSource>) -> Self {
        Self { source }
    }

    /// Look up `doi` once; any failure is logged and yields `None`
    pub async fn resolve(&self, doi: &str, log: &ErrorLog) -> Option<ReferenceData> {
        match self.source.lookup_doi(doi).await {
            Ok(reference) => Some(reference),
            Err(e) => {
                log.log(format!(
                    "Error fetching metadata for DOI {} from {}: {}",
                    doi,
                    self.source.id(),
                    e
                ));
                None
            }
        }
    }

    /// Find the first DOI in `text` and resolve it
    pub async fn resolve_text(&self, text: &str, log: &ErrorLog) -> Option<ReferenceData> {
        let doi = find_doi(text)?;
        tracing::debug!("Found DOI {}", doi);
        self.resolve(doi, log).await
    }
}

/// Which strategy produced a citation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CitationSource {
    Doi,
    Filename,
}

/// A formatted in-text citation and bibliography line for one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    pub in_text: String,
    pub bibliography: String,
    pub source: CitationSource,
}

/// Format a citation from resolved metadata
///
/// The bibliography line uses the canonical DOI layout for every style.
pub fn cite_reference(reference: &ReferenceData, style: CitationStyle, ordinal: usize) -> Citation {
    Citation {
        in_text: format_in_text(&reference.first_author(), reference.year, style, ordinal),
        bibliography: format_doi_bibliography(reference, ordinal),
        source: CitationSource::Doi,
    }
}

/// Format a citation from the document's file name
pub fn cite_filename(file_name: &str, style: CitationStyle, ordinal: usize) -> Citation {
    let parts = citation_from_filename(file_name);
    Citation {
        in_text: format_in_text(&parts.author, &parts.year, style, ordinal),
        bibliography: format_bibliography(&parts.author, &parts.year, &parts.title, style, ordinal),
        source: CitationSource::Filename,
    }
}

/// The fallback chain used for each document
#[derive(Debug, Clone)]
pub struct CitationResolver {
    doi: DoiResolver,
    style: CitationStyle,
}

impl CitationResolver {
    pub fn new(doi: DoiResolver, style: CitationStyle) -> Self {
        Self { doi, style }
    }

    /// Resolve a citation for a document's text and file name
    pub async fn resolve(
        &self,
        text: &str,
        file_name: &str,
        ordinal: usize,
        log: &ErrorLog,
    ) -> Citation {
        match self.doi.resolve_text(text, log).await {
            Some(reference) => cite_reference(&reference, self.style, ordinal),
            None => cite_filename(file_name, self.style, ordinal),
        }
    }
}
