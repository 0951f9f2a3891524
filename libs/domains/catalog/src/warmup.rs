//! Warmup - one-time mirroring of upstream people and films
//!
//! Each collection is synced only when it is empty. Pages are walked in
//! order and records are written one by one; the first error aborts that
//! collection's sync.

use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::error::{CatalogError, CatalogResult};
use crate::models::{CreateMovie, CreatePerson};
use crate::repository::{MovieRepository, PeopleRepository};
use crate::swapi::{FilmRecord, PersonRecord, SourceApi};

/// Outcome per collection: `None` when it already had data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarmupReport {
    pub people: Option<usize>,
    pub movies: Option<usize>,
}

/// Numeric id at the end of a resource URL (`.../people/13` → 13).
pub fn uid_from_url(url: &str) -> Option<i32> {
    url.trim_end_matches('/').rsplit('/').next()?.parse().ok()
}

fn parse_uid(raw: &str) -> Option<i32> {
    raw.trim().parse().ok()
}

/// Upstream person → local record. `None` when the uid is not numeric.
pub fn person_from_record(record: PersonRecord) -> Option<CreatePerson> {
    let uid = parse_uid(&record.uid)?;
    let p = record.properties;

    Some(CreatePerson {
        uid,
        name: p.name,
        height: p.height,
        mass: p.mass,
        hair_color: p.hair_color,
        skin_color: p.skin_color,
        eye_color: p.eye_color,
        birth_year: p.birth_year,
        gender: p.gender,
        homeworld: p.homeworld,
        films: p.films,
        url: p.url,
    })
}

/// Upstream film → local record. Character URLs become person uids;
/// references that do not end in a number are dropped.
pub fn movie_from_record(record: FilmRecord) -> Option<CreateMovie> {
    let uid = parse_uid(&record.uid)?;
    let p = record.properties;

    let characters = p
        .characters
        .iter()
        .filter_map(|url| {
            let character = uid_from_url(url);
            if character.is_none() {
                warn!(movie_uid = uid, reference = %url, "Skipping unparsable character reference");
            }
            character
        })
        .collect();

    Some(CreateMovie {
        uid,
        title: p.title,
        opening_crawl: p.opening_crawl,
        characters,
    })
}

pub struct WarmupService<S, P, M>
where
    S: SourceApi,
    P: PeopleRepository,
    M: MovieRepository,
{
    source: Arc<S>,
    people: Arc<P>,
    movies: Arc<M>,
}

impl<S, P, M> WarmupService<S, P, M>
where
    S: SourceApi,
    P: PeopleRepository,
    M: MovieRepository,
{
    pub fn new(source: S, people: P, movies: M) -> Self {
        Self {
            source: Arc::new(source),
            people: Arc::new(people),
            movies: Arc::new(movies),
        }
    }

    /// Syncs every empty collection. People and movies run side by side;
    /// a failure in one does not stop the other.
    #[instrument(skip(self))]
    pub async fn run(&self) -> CatalogResult<WarmupReport> {
        let (people, movies) = tokio::join!(self.warm_people(), self.warm_movies());

        let report = WarmupReport {
            people: people?,
            movies: movies?,
        };
        info!(?report, "Warmup finished");
        Ok(report)
    }

    async fn warm_people(&self) -> CatalogResult<Option<usize>> {
        let has_data = self.people.has_any().await.unwrap_or_else(|e| {
            warn!(error = %e, "People existence check failed, treating as empty");
            false
        });
        if has_data {
            info!("People already mirrored, skipping sync");
            return Ok(None);
        }
        self.sync_people().await.map(Some)
    }

    async fn warm_movies(&self) -> CatalogResult<Option<usize>> {
        let has_data = self.movies.has_any().await.unwrap_or_else(|e| {
            warn!(error = %e, "Movies existence check failed, treating as empty");
            false
        });
        if has_data {
            info!("Movies already mirrored, skipping sync");
            return Ok(None);
        }
        self.sync_movies().await.map(Some)
    }

    /// Mirrors every upstream person. Returns how many were stored.
    #[instrument(skip(self))]
    pub async fn sync_people(&self) -> CatalogResult<usize> {
        let mut stored = 0;
        let mut page = 1;

        loop {
            info!(page, "Fetching people page");
            let listing = self
                .source
                .fetch_people_page(page)
                .await
                .inspect_err(|e| log_failure("people", page, e))?;
            let is_last = listing.is_last(page);

            for record in listing.results {
                let uid = record.uid.clone();
                let Some(input) = person_from_record(record) else {
                    warn!(uid = %uid, "Skipping person with non-numeric uid");
                    continue;
                };
                self.people
                    .create(input)
                    .await
                    .inspect_err(|e| log_failure("people", page, e))?;
                stored += 1;
            }

            if is_last {
                break;
            }
            page += 1;
        }

        info!(stored, "People sync complete");
        Ok(stored)
    }

    /// Mirrors every upstream film. Returns how many were stored.
    #[instrument(skip(self))]
    pub async fn sync_movies(&self) -> CatalogResult<usize> {
        let mut stored = 0;
        let mut page = 1;

        loop {
            info!(page, "Fetching films page");
            let listing = self
                .source
                .fetch_films_page(page)
                .await
                .inspect_err(|e| log_failure("movies", page, e))?;
            let is_last = listing.is_last(page);

            for record in listing.results {
                let uid = record.uid.clone();
                let Some(input) = movie_from_record(record) else {
                    warn!(uid = %uid, "Skipping film with non-numeric uid");
                    continue;
                };
                self.movies
                    .create(input)
                    .await
                    .inspect_err(|e| log_failure("movies", page, e))?;
                stored += 1;
            }

            if is_last {
                break;
            }
            page += 1;
        }

        info!(stored, "Movies sync complete");
        Ok(stored)
    }
}

fn log_failure(collection: &str, page: u32, err: &CatalogError) {
    match err {
        CatalogError::Upstream(_) => {
            error!(collection, page, error = %err, "HTTP error while fetching upstream page")
        }
        CatalogError::MalformedResponse(_) => {
            error!(collection, page, error = %err, "Could not parse upstream page")
        }
        _ => error!(collection, page, error = %err, "Unexpected error during sync"),
    }
}
