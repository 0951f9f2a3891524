//! MongoDB implementations of the catalog repositories

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc, from_document},
    options::IndexOptions,
};
use tracing::{info, instrument};

use crate::error::CatalogResult;
use crate::models::{
    CreateMovie, CreatePerson, Movie, MovieWithCharacters, Person, PersonWithMovies, SearchResult,
};
use crate::repository::{MovieRepository, PeopleRepository};

pub const PEOPLE_COLLECTION: &str = "people";
pub const MOVIES_COLLECTION: &str = "movies";

/// Unique `uid` index plus a text index on `text_field`.
fn catalog_indexes(text_field: &str) -> Vec<IndexModel> {
    vec![
        IndexModel::builder()
            .keys(doc! { "uid": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build(),
        IndexModel::builder()
            .keys(doc! { text_field: "text" })
            .build(),
    ]
}

/// `$regex` filter matching `term` literally, ignoring case.
pub fn name_filter(term: &str) -> Document {
    doc! { "name": { "$regex": regex::escape(term), "$options": "i" } }
}

pub fn person_detail_pipeline(uid: i32) -> Vec<Document> {
    vec![
        doc! { "$match": { "uid": uid } },
        doc! { "$lookup": {
            "from": MOVIES_COLLECTION,
            "localField": "uid",
            "foreignField": "characters",
            "as": "movie_details",
        }},
        doc! { "$project": {
            "_id": 1,
            "uid": 1,
            "name": 1,
            "height": 1,
            "mass": 1,
            "hair_color": 1,
            "skin_color": 1,
            "eye_color": 1,
            "birth_year": 1,
            "gender": 1,
            "homeworld": 1,
            "url": 1,
            "created_at": 1,
            "updated_at": 1,
            "movies": { "$map": {
                "input": "$movie_details",
                "as": "movie",
                "in": { "uid": "$$movie.uid", "title": "$$movie.title" },
            }},
        }},
    ]
}

pub fn movie_detail_pipeline(uid: i32) -> Vec<Document> {
    vec![
        doc! { "$match": { "uid": uid } },
        doc! { "$lookup": {
            "from": PEOPLE_COLLECTION,
            "localField": "characters",
            "foreignField": "uid",
            "as": "character_details",
        }},
        doc! { "$project": {
            "_id": 1,
            "uid": 1,
            "title": 1,
            "opening_crawl": 1,
            "created_at": 1,
            "updated_at": 1,
            "characters": { "$map": {
                "input": "$character_details",
                "as": "character",
                "in": { "uid": "$$character.uid", "name": "$$character.name" },
            }},
        }},
    ]
}

#[derive(Clone)]
pub struct MongoPeopleRepository {
    collection: Collection<Person>,
}

impl MongoPeopleRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Person>(PEOPLE_COLLECTION),
        }
    }

    pub async fn init_indexes(&self) -> CatalogResult<()> {
        self.collection.create_indexes(catalog_indexes("name")).await?;
        info!(collection = PEOPLE_COLLECTION, "Indexes ensured");
        Ok(())
    }
}

#[async_trait]
impl PeopleRepository for MongoPeopleRepository {
    #[instrument(skip(self))]
    async fn search_by_name(&self, name: &str) -> CatalogResult<Vec<SearchResult>> {
        let people: Vec<Person> = self
            .collection
            .find(name_filter(name))
            .await?
            .try_collect()
            .await?;

        Ok(people.iter().map(SearchResult::from).collect())
    }

    #[instrument(skip(self))]
    async fn get_with_movies(&self, uid: i32) -> CatalogResult<Option<PersonWithMovies>> {
        let mut cursor = self
            .collection
            .aggregate(person_detail_pipeline(uid))
            .await?;

        match cursor.try_next().await? {
            Some(document) => Ok(Some(from_document(document)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, input), fields(uid = input.uid))]
    async fn create(&self, input: CreatePerson) -> CatalogResult<Person> {
        let person = Person::new(input);
        self.collection.insert_one(&person).await?;
        Ok(person)
    }

    #[instrument(skip(self))]
    async fn has_any(&self) -> CatalogResult<bool> {
        let count = self.collection.count_documents(doc! {}).limit(1).await?;
        Ok(count > 0)
    }
}

#[derive(Clone)]
pub struct MongoMovieRepository {
    collection: Collection<Movie>,
}

impl MongoMovieRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Movie>(MOVIES_COLLECTION),
        }
    }

    pub async fn init_indexes(&self) -> CatalogResult<()> {
        self.collection.create_indexes(catalog_indexes("title")).await?;
        info!(collection = MOVIES_COLLECTION, "Indexes ensured");
        Ok(())
    }
}

#[async_trait]
impl MovieRepository for MongoMovieRepository {
    #[instrument(skip(self))]
    async fn search_by_title(&self, title: &str) -> CatalogResult<Vec<SearchResult>> {
        let movies: Vec<Movie> = self
            .collection
            .find(doc! { "$text": { "$search": title } })
            .await?
            .try_collect()
            .await?;

        Ok(movies.iter().map(SearchResult::from).collect())
    }

    #[instrument(skip(self))]
    async fn get_with_characters(&self, uid: i32) -> CatalogResult<Option<MovieWithCharacters>> {
        let mut cursor = self
            .collection
            .aggregate(movie_detail_pipeline(uid))
            .await?;

        match cursor.try_next().await? {
            Some(document) => Ok(Some(from_document(document)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, input), fields(uid = input.uid))]
    async fn create(&self, input: CreateMovie) -> CatalogResult<Movie> {
        let movie = Movie::new(input);
        self.collection.insert_one(&movie).await?;
        Ok(movie)
    }

    #[instrument(skip(self))]
    async fn has_any(&self) -> CatalogResult<bool> {
        let count = self.collection.count_documents(doc! {}).limit(1).await?;
        Ok(count > 0)
    }
}
