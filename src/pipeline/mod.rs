//! The literature review pipeline.
//!
//! A [`BatchCoordinator`] discovers documents and runs one
//! [`DocumentProcessor`] task per document. Each task extracts text,
//! summarizes it through a [`Summarizer`], and resolves a citation through the
//! [`CitationResolver`] fallback chain (DOI lookup, then the file name).
//! Once every task has finished the coordinator writes the bibliography and
//! hands the summary file to the [`ReviewGenerator`].

mod coordinator;
mod processor;
mod resolver;
mod summarizer;

pub use coordinator::{discover_documents, BatchCoordinator, RunError, RunOptions, RunReport};
pub use processor::{DocumentProcessor, ExtractionLimits};
pub use resolver::{
    cite_filename, cite_reference, Citation, CitationResolver, CitationSource, DoiResolver,
};
pub use summarizer::{
    vary_opener, FixedPhrase, PhraseChooser, RandomPhrase, ReviewGenerator, Summarizer,
    CANONICAL_OPENER, INTRO_VARIATIONS,
};
