//! HTTP routes, nested under `/api` by `axum_helpers::create_router`.

pub mod health;
pub mod notifications;

use axum::Router;
use domain_catalog::{
    MongoMovieRepository, MongoPeopleRepository, MovieService, PeopleService, movies_router,
    people_router,
};
use domain_metrics::{MetricsService, VictoriaMetricsClient};

use crate::state::AppState;

/// `/people`, `/movies` (with `/movies/stats`) and `/notifications`.
pub fn routes(state: &AppState, stats: MetricsService<VictoriaMetricsClient>) -> Router {
    let people = PeopleService::new(MongoPeopleRepository::new(&state.db));
    let movies = MovieService::new(MongoMovieRepository::new(&state.db));
    let recorder = stats.recorder();

    Router::new()
        .nest("/people", people_router(people))
        .nest(
            "/movies",
            movies_router(movies, recorder).nest("/stats", domain_metrics::handlers::router(stats)),
        )
        .nest("/notifications", notifications::router(state.publisher()))
}
