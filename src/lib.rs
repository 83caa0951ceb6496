//! Executive identity resolution: discover leadership pages for a company,
//! extract name/title candidates from them and from trusted documents, and
//! merge everything into ranked, de-duplicated executive profiles.

pub mod collab;
pub mod discovery;
pub mod error;
pub mod events;
pub mod extract;
pub mod merge;
pub mod model;
pub mod names;
pub mod pipeline;
pub mod relevance;
pub mod roles;
pub mod scope;
pub mod settings;
pub mod sitemap;
pub mod text;

pub use merge::{format_for_output, merge, merge_with, MergeOptions};
pub use model::{CandidateRecord, Confidence, ExecutiveProfile, SourceKind};
pub use pipeline::{ExtractionRoute, ResolutionReport, ResolveRequest, Resolver};
pub use settings::Settings;
