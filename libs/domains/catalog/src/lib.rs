//! Catalog Domain
//!
//! People and movies mirrored from SWAPI into MongoDB, plus the warmup that
//! fills empty collections at startup.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐            ┌─────────────┐
//! │  Handlers   │            │   Warmup    │ ← SourceApi (SWAPI)
//! └──────┬──────┘            └──────┬──────┘
//!        │                          │
//! ┌──────▼──────┐                   │
//! │  Services   │                   │
//! └──────┬──────┘                   │
//!        │                          │
//! ┌──────▼──────────────────────────▼──┐
//! │ PeopleRepository / MovieRepository │ ← MongoDB, $lookup joins
//! └────────────────────────────────────┘
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;
pub mod swapi;
pub mod warmup;

pub use error::{CatalogError, CatalogResult};
pub use handlers::{MoviesApiDoc, PeopleApiDoc, movies_router, people_router};
pub use models::*;
pub use mongodb::{MongoMovieRepository, MongoPeopleRepository};
pub use repository::{MovieRepository, PeopleRepository};
pub use service::{MovieService, PeopleService};
pub use swapi::{SourceApi, SwapiClient, SwapiConfig};
pub use warmup::{WarmupReport, WarmupService};
