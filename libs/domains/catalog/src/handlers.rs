use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
};
use axum_helpers::errors::responses::{
    BadRequestValidationResponse, InternalServerErrorResponse, NotFoundResponse,
};
use domain_metrics::SearchMetrics;
use std::sync::Arc;
use std::time::Instant;
use utoipa::OpenApi;

use crate::error::CatalogResult;
use crate::models::{
    CharacterSummary, MovieSummary, MovieWithCharacters, PersonWithMovies, SearchKind,
    SearchQuery, SearchResult,
};
use crate::repository::{MovieRepository, PeopleRepository};
use crate::service::{MovieService, PeopleService};

/// OpenAPI documentation for the people endpoints, nested at `/api/people`
#[derive(OpenApi)]
#[openapi(
    paths(search_people, get_person),
    components(
        schemas(SearchResult, SearchKind, PersonWithMovies, MovieSummary),
        responses(NotFoundResponse, BadRequestValidationResponse, InternalServerErrorResponse)
    ),
    tags((name = "People", description = "Mirrored characters"))
)]
pub struct PeopleApiDoc;

/// OpenAPI documentation for the movie endpoints, nested at `/api/movies`
#[derive(OpenApi)]
#[openapi(
    paths(search_movies, get_movie),
    components(
        schemas(SearchResult, SearchKind, MovieWithCharacters, CharacterSummary),
        responses(NotFoundResponse, BadRequestValidationResponse, InternalServerErrorResponse)
    ),
    tags((name = "Movies", description = "Mirrored films"))
)]
pub struct MoviesApiDoc;

pub fn people_router<R: PeopleRepository + 'static>(service: PeopleService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/search", get(search_people))
        .route("/{uid}", get(get_person))
        .with_state(shared_service)
}

struct MoviesState<R: MovieRepository> {
    service: MovieService<R>,
    metrics: SearchMetrics,
}

/// Movies router; every search and lookup is recorded in `metrics`
/// with the status code actually returned.
pub fn movies_router<R: MovieRepository + 'static>(
    service: MovieService<R>,
    metrics: SearchMetrics,
) -> Router {
    let state = Arc::new(MoviesState { service, metrics });

    Router::new()
        .route("/search", get(search_movies))
        .route("/{uid}", get(get_movie))
        .with_state(state)
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

/// Search people by name
#[utoipa::path(
    get,
    path = "/search",
    tag = "People",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching people", body = Vec<SearchResult>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search_people<R: PeopleRepository>(
    State(service): State<Arc<PeopleService<R>>>,
    Query(params): Query<SearchQuery>,
) -> CatalogResult<Json<Vec<SearchResult>>> {
    let people = service.search(params.query.as_deref()).await?;
    Ok(Json(people))
}

/// Get a person with the movies they appear in
#[utoipa::path(
    get,
    path = "/{uid}",
    tag = "People",
    params(
        ("uid" = i32, Path, description = "Character uid")
    ),
    responses(
        (status = 200, description = "Character found", body = PersonWithMovies),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_person<R: PeopleRepository>(
    State(service): State<Arc<PeopleService<R>>>,
    Path(uid): Path<i32>,
) -> CatalogResult<Json<PersonWithMovies>> {
    let person = service.get_person(uid).await?;
    Ok(Json(person))
}

/// Search movies by title
#[utoipa::path(
    get,
    path = "/search",
    tag = "Movies",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching movies", body = Vec<SearchResult>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn search_movies<R: MovieRepository>(
    State(state): State<Arc<MoviesState<R>>>,
    Query(params): Query<SearchQuery>,
) -> Response {
    let started = Instant::now();
    let query = params.query.unwrap_or_default();

    let (response, result_count) = match state.service.search(Some(&query)).await {
        Ok(movies) => {
            let count = movies.len();
            (Json(movies).into_response(), count)
        }
        Err(e) => (e.into_response(), 0),
    };

    state.metrics.record_search(
        &query,
        elapsed_ms(started),
        response.status().as_u16(),
        result_count,
    );
    response
}

/// Get a movie with its characters' names
#[utoipa::path(
    get,
    path = "/{uid}",
    tag = "Movies",
    params(
        ("uid" = i32, Path, description = "Movie uid")
    ),
    responses(
        (status = 200, description = "Movie found", body = MovieWithCharacters),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_movie<R: MovieRepository>(
    State(state): State<Arc<MoviesState<R>>>,
    Path(uid): Path<i32>,
) -> Response {
    let started = Instant::now();

    let response = match state.service.get_movie(uid).await {
        Ok(movie) => Json(movie).into_response(),
        Err(e) => e.into_response(),
    };

    state
        .metrics
        .record_movie_by_id(uid, elapsed_ms(started), response.status().as_u16());
    response
}
