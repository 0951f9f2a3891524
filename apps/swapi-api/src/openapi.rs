//! OpenAPI documentation for the whole service.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "SWAPI Mirror API",
        version = "0.1.0",
        description = "Star Wars people and films mirrored into MongoDB, with search statistics",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/people", api = domain_catalog::PeopleApiDoc),
        (path = "/api/movies", api = domain_catalog::MoviesApiDoc),
        (path = "/api/movies/stats", api = domain_metrics::ApiDoc),
        (path = "/api/notifications", api = crate::api::notifications::ApiDoc)
    )
)]
pub struct ApiDoc;
