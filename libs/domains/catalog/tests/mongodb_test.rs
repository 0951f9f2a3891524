//! Repository tests against a real MongoDB.
//!
//! Run with `cargo test -p domain_catalog -- --ignored` (requires Docker).

use domain_catalog::*;
use test_utils::{TestDataBuilder, TestMongo};

fn create_person(uid: i32, name: &str) -> CreatePerson {
    CreatePerson {
        uid,
        name: name.to_string(),
        url: format!("https://www.swapi.tech/api/people/{uid}"),
        ..Default::default()
    }
}

#[tokio::test]
#[ignore]
async fn test_detail_lookups_join_by_uid() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("test_detail_lookups_join_by_uid");
    let db = mongo.database(&builder.database_name());

    let people = MongoPeopleRepository::new(&db);
    let movies = MongoMovieRepository::new(&db);
    people.init_indexes().await.unwrap();
    movies.init_indexes().await.unwrap();

    let luke = builder.uid(1);
    let leia = builder.uid(5);
    let ghost = builder.uid(999);
    people.create(create_person(luke, "Luke Skywalker")).await.unwrap();
    people.create(create_person(leia, "Leia Organa")).await.unwrap();
    movies
        .create(CreateMovie {
            uid: 1,
            title: "A New Hope".to_string(),
            opening_crawl: "It is a period of civil war.".to_string(),
            characters: vec![luke, leia, ghost],
        })
        .await
        .unwrap();

    let movie = movies.get_with_characters(1).await.unwrap().unwrap();
    let mut names: Vec<_> = movie.characters.iter().map(|c| c.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec!["Leia Organa", "Luke Skywalker"]);

    let person = people.get_with_movies(leia).await.unwrap().unwrap();
    assert_eq!(person.movies.len(), 1);
    assert_eq!(person.movies[0].title, "A New Hope");

    assert!(movies.get_with_characters(2).await.unwrap().is_none());
}

#[tokio::test]
#[ignore]
async fn test_search_and_presence() {
    let mongo = TestMongo::new().await;
    let builder = TestDataBuilder::from_test_name("test_search_and_presence");
    let db = mongo.database(&builder.database_name());

    let people = MongoPeopleRepository::new(&db);
    let movies = MongoMovieRepository::new(&db);
    people.init_indexes().await.unwrap();
    movies.init_indexes().await.unwrap();

    assert!(!people.has_any().await.unwrap());

    people.create(create_person(builder.uid(0), "R2-D2")).await.unwrap();
    people.create(create_person(builder.uid(1), "C-3PO")).await.unwrap();
    movies
        .create(CreateMovie {
            uid: 6,
            title: "Return of the Jedi".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

    assert!(people.has_any().await.unwrap());

    let hits = people.search_by_name("r2-").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "R2-D2");
    assert!(people.search_by_name(".*").await.unwrap().is_empty());

    let hits = movies.search_by_title("jedi").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].kind, SearchKind::Movie);

    let duplicate = people.create(create_person(builder.uid(0), "R2-D2")).await;
    assert!(matches!(duplicate, Err(CatalogError::Database(_))));
}
