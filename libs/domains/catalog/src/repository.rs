use async_trait::async_trait;

use crate::error::CatalogResult;
use crate::models::{
    CreateMovie, CreatePerson, Movie, MovieWithCharacters, Person, PersonWithMovies, SearchResult,
};

/// Persistence for mirrored people
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PeopleRepository: Send + Sync {
    /// Case-insensitive substring match on name
    async fn search_by_name(&self, name: &str) -> CatalogResult<Vec<SearchResult>>;

    /// Person by uid with the movies they appear in
    async fn get_with_movies(&self, uid: i32) -> CatalogResult<Option<PersonWithMovies>>;

    async fn create(&self, input: CreatePerson) -> CatalogResult<Person>;

    /// Whether the collection holds at least one document
    async fn has_any(&self) -> CatalogResult<bool>;
}

/// Persistence for mirrored movies
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MovieRepository: Send + Sync {
    /// Full-text match on title
    async fn search_by_title(&self, title: &str) -> CatalogResult<Vec<SearchResult>>;

    /// Movie by uid with its characters' names
    async fn get_with_characters(&self, uid: i32) -> CatalogResult<Option<MovieWithCharacters>>;

    async fn create(&self, input: CreateMovie) -> CatalogResult<Movie>;

    async fn has_any(&self) -> CatalogResult<bool>;
}
