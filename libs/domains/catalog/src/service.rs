//! People and movie services over the mirrored catalog

use std::sync::Arc;
use tracing::{info, instrument};

use crate::error::{CatalogError, CatalogResult};
use crate::models::{MovieWithCharacters, PersonWithMovies, SearchResult};
use crate::repository::{MovieRepository, PeopleRepository};

pub const MIN_SEARCH_CHARS: usize = 2;

/// Trimmed search term, or a validation error when blank or too short.
pub fn validate_search_term(term: Option<&str>) -> CatalogResult<&str> {
    let term = term.map(str::trim).unwrap_or_default();
    if term.is_empty() {
        return Err(CatalogError::Validation(
            "The 'query' parameter is mandatory and cannot be empty".to_string(),
        ));
    }
    if term.chars().count() < MIN_SEARCH_CHARS {
        return Err(CatalogError::Validation(format!(
            "Enter at least {MIN_SEARCH_CHARS} characters to search"
        )));
    }
    Ok(term)
}

pub struct PeopleService<R: PeopleRepository> {
    repository: Arc<R>,
}

impl<R: PeopleRepository> PeopleService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// People whose name contains `query`. No match is a `NoResults` error.
    #[instrument(skip(self))]
    pub async fn search(&self, query: Option<&str>) -> CatalogResult<Vec<SearchResult>> {
        let term = validate_search_term(query)?;

        let people = self.repository.search_by_name(term).await?;
        if people.is_empty() {
            return Err(CatalogError::NoResults(format!(
                "No person found with the name '{}'",
                term
            )));
        }

        info!(count = people.len(), "People search matched");
        Ok(people)
    }

    #[instrument(skip(self))]
    pub async fn get_person(&self, uid: i32) -> CatalogResult<PersonWithMovies> {
        self.repository
            .get_with_movies(uid)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("Character with uid {}", uid)))
    }
}

pub struct MovieService<R: MovieRepository> {
    repository: Arc<R>,
}

impl<R: MovieRepository> MovieService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Movies whose title matches `query`. No match is a `NoResults` error.
    #[instrument(skip(self))]
    pub async fn search(&self, query: Option<&str>) -> CatalogResult<Vec<SearchResult>> {
        let term = validate_search_term(query)?;

        let movies = self.repository.search_by_title(term).await?;
        if movies.is_empty() {
            return Err(CatalogError::NoResults(format!(
                "No movie found with the title '{}'",
                term
            )));
        }

        info!(count = movies.len(), "Movie search matched");
        Ok(movies)
    }

    #[instrument(skip(self))]
    pub async fn get_movie(&self, uid: i32) -> CatalogResult<MovieWithCharacters> {
        self.repository
            .get_with_characters(uid)
            .await?
            .ok_or_else(|| CatalogError::NotFound(format!("Movie with uid {}", uid)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SearchKind;
    use crate::repository::{MockMovieRepository, MockPeopleRepository};
    use chrono::Utc;
    use mockall::predicate::eq;
    use uuid::Uuid;

    fn hit(uid: i32, name: &str, kind: SearchKind) -> SearchResult {
        SearchResult {
            uid,
            name: name.to_string(),
            kind,
        }
    }

    #[test]
    fn test_validate_search_term() {
        assert!(matches!(
            validate_search_term(None),
            Err(CatalogError::Validation(_))
        ));
        assert!(matches!(
            validate_search_term(Some("   ")),
            Err(CatalogError::Validation(_))
        ));
        assert!(matches!(
            validate_search_term(Some(" a ")),
            Err(CatalogError::Validation(_))
        ));
        assert_eq!(validate_search_term(Some("  r2 ")).unwrap(), "r2");
    }

    #[tokio::test]
    async fn test_people_search_trims_term() {
        let mut repo = MockPeopleRepository::new();
        repo.expect_search_by_name()
            .with(eq("luke"))
            .times(1)
            .returning(|_| Ok(vec![hit(1, "Luke Skywalker", SearchKind::People)]));

        let results = PeopleService::new(repo).search(Some(" luke ")).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].kind, SearchKind::People);
    }

    #[tokio::test]
    async fn test_people_search_short_term_skips_repository() {
        let mut repo = MockPeopleRepository::new();
        repo.expect_search_by_name().never();

        let result = PeopleService::new(repo).search(Some("l")).await;

        assert!(matches!(result, Err(CatalogError::Validation(_))));
    }

    #[tokio::test]
    async fn test_movie_search_without_matches() {
        let mut repo = MockMovieRepository::new();
        repo.expect_search_by_title().returning(|_| Ok(vec![]));

        let result = MovieService::new(repo).search(Some("clones")).await;

        assert!(matches!(result, Err(CatalogError::NoResults(_))));
    }

    #[tokio::test]
    async fn test_get_movie_not_found() {
        let mut repo = MockMovieRepository::new();
        repo.expect_get_with_characters()
            .with(eq(99))
            .returning(|_| Ok(None));

        let result = MovieService::new(repo).get_movie(99).await;

        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_movie_with_dangling_characters() {
        let mut repo = MockMovieRepository::new();
        repo.expect_get_with_characters().returning(|uid| {
            Ok(Some(MovieWithCharacters {
                id: Uuid::new_v4(),
                uid,
                title: "The Phantom Menace".to_string(),
                opening_crawl: String::new(),
                characters: vec![],
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }))
        });

        let movie = MovieService::new(repo).get_movie(4).await.unwrap();

        assert_eq!(movie.uid, 4);
        assert!(movie.characters.is_empty());
    }

    #[tokio::test]
    async fn test_repository_error_propagates() {
        let mut repo = MockPeopleRepository::new();
        repo.expect_get_with_movies()
            .returning(|_| Err(CatalogError::Database("connection reset".to_string())));

        let result = PeopleService::new(repo).get_person(1).await;

        assert!(matches!(result, Err(CatalogError::Database(_))));
    }
}
