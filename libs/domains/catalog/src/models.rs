use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// A mirrored character, keyed by upstream `uid`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Person {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub uid: i32,
    pub name: String,
    pub height: String,
    pub mass: String,
    pub hair_color: String,
    pub skin_color: String,
    pub eye_color: String,
    pub birth_year: String,
    pub gender: String,
    pub homeworld: String,
    /// Film URLs as given upstream
    #[serde(default)]
    pub films: Vec<String>,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
pub struct CreatePerson {
    pub uid: i32,
    pub name: String,
    #[serde(default)]
    pub height: String,
    #[serde(default)]
    pub mass: String,
    #[serde(default)]
    pub hair_color: String,
    #[serde(default)]
    pub skin_color: String,
    #[serde(default)]
    pub eye_color: String,
    #[serde(default)]
    pub birth_year: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub homeworld: String,
    #[serde(default)]
    pub films: Vec<String>,
    #[serde(default)]
    pub url: String,
}

impl Person {
    pub fn new(input: CreatePerson) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            uid: input.uid,
            name: input.name,
            height: input.height,
            mass: input.mass,
            hair_color: input.hair_color,
            skin_color: input.skin_color,
            eye_color: input.eye_color,
            birth_year: input.birth_year,
            gender: input.gender,
            homeworld: input.homeworld,
            films: input.films,
            url: input.url,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A mirrored film
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Movie {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub uid: i32,
    pub title: String,
    pub opening_crawl: String,
    /// Person uids; may reference people that are not mirrored
    #[serde(default)]
    pub characters: Vec<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema)]
pub struct CreateMovie {
    pub uid: i32,
    pub title: String,
    #[serde(default)]
    pub opening_crawl: String,
    #[serde(default)]
    pub characters: Vec<i32>,
}

impl Movie {
    pub fn new(input: CreateMovie) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            uid: input.uid,
            title: input.title,
            opening_crawl: input.opening_crawl,
            characters: input.characters,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum SearchKind {
    People,
    Movie,
}

/// One search hit: a person's name or a movie's title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SearchResult {
    pub uid: i32,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SearchKind,
}

impl From<&Person> for SearchResult {
    fn from(person: &Person) -> Self {
        Self {
            uid: person.uid,
            name: person.name.clone(),
            kind: SearchKind::People,
        }
    }
}

impl From<&Movie> for SearchResult {
    fn from(movie: &Movie) -> Self {
        Self {
            uid: movie.uid,
            name: movie.title.clone(),
            kind: SearchKind::Movie,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CharacterSummary {
    pub uid: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MovieSummary {
    pub uid: i32,
    pub title: String,
}

/// Movie detail with its characters' names joined in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MovieWithCharacters {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub uid: i32,
    pub title: String,
    pub opening_crawl: String,
    #[serde(default)]
    pub characters: Vec<CharacterSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Person detail with the titles of the movies they appear in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PersonWithMovies {
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    pub uid: i32,
    pub name: String,
    pub height: String,
    pub mass: String,
    pub hair_color: String,
    pub skin_color: String,
    pub eye_color: String,
    pub birth_year: String,
    pub gender: String,
    pub homeworld: String,
    pub url: String,
    #[serde(default)]
    pub movies: Vec<MovieSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Search term, at least 2 characters
    pub query: Option<String>,
}
