//! nameforge-gen library interface
//!
//! Band-name and song-title generation pipeline:
//!
//! ```text
//! request → FallbackManager (providers → normalizer → fusion)
//!         → WordPools + theme → PatternSelector → WordFilter
//!         → PhoneticAnalyzer → VarietyOptimizer → response
//! ```
//!
//! Construct an `Orchestrator` explicitly and call `shutdown` when done; there
//! are no global singletons.

pub mod cache;
pub mod config;
pub mod error;
pub mod fallback;
pub mod filter;
pub mod genre_matrix;
pub mod genres;
pub mod normalizer;
pub mod orchestrator;
pub mod params;
pub mod patterns;
pub mod phonetic;
pub mod providers;
pub mod random;
pub mod types;
pub mod variety;
pub mod words;

pub use crate::error::{GenerationError, PatternError};
pub use crate::fallback::{FallbackManager, ResolveError, ResolveOptions};
pub use crate::filter::WordFilter;
pub use crate::orchestrator::{Orchestrator, PipelineSnapshot, SetList};
pub use crate::params::PipelineParams;
pub use crate::random::{RandomSource, SeededRandom};
pub use crate::types::{
    CandidateSource, ContentType, Domain, GenerationRequest, GenerationResponse, GenerationResult,
    WordCount,
};
