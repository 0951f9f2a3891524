//! Metric series names and the queries built over them.

/// Search requests, labeled by normalized `query` and `status_code`.
pub const SEARCH_QUERIES: &str = "movie_search_queries_total";
/// Lookups by uid, labeled by `status_code`.
pub const BY_ID_QUERIES: &str = "movie_byid_queries_total";
/// Searches per local hour of day, labeled by `hour`.
pub const SEARCHES_BY_HOUR: &str = "movie_searches_by_hour_total";
/// Searches per result-count bucket, labeled by `result_count_range`.
pub const SEARCH_RESULTS: &str = "movie_search_results_total";
/// Request duration histogram (seconds) shared by searches and lookups.
pub const DURATION_HISTOGRAM: &str = "movie_search_duration_seconds";

/// Bucket bounds for [`DURATION_HISTOGRAM`], in seconds.
pub const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

pub const QUERY_LABEL: &str = "query";
pub const STATUS_CODE_LABEL: &str = "status_code";
pub const HOUR_LABEL: &str = "hour";
pub const RESULT_RANGE_LABEL: &str = "result_count_range";

/// Concrete series names for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesNames {
    pub search_queries: String,
    pub by_id_queries: String,
    pub searches_by_hour: String,
    pub search_results: String,
    pub duration: String,
}

impl SeriesNames {
    pub fn for_session(session: &str) -> Self {
        Self {
            search_queries: format!("{SEARCH_QUERIES}_{session}"),
            by_id_queries: format!("{BY_ID_QUERIES}_{session}"),
            searches_by_hour: format!("{SEARCHES_BY_HOUR}_{session}"),
            search_results: format!("{SEARCH_RESULTS}_{session}"),
            duration: format!("{DURATION_HISTOGRAM}_{session}"),
        }
    }

    pub fn total_searches(&self) -> String {
        format!("sum({})", self.search_queries)
    }

    pub fn total_by_id(&self) -> String {
        format!("sum({})", self.by_id_queries)
    }

    pub fn top_searches(&self, limit: usize) -> String {
        format!(
            "topk({limit}, sum by ({QUERY_LABEL}) ({}))",
            self.search_queries
        )
    }

    pub fn average_duration(&self) -> String {
        format!(
            "sum({d}_sum) / sum({d}_count)",
            d = self.duration
        )
    }

    pub fn p95_duration(&self) -> String {
        format!(
            "histogram_quantile(0.95, sum by (le) ({}_bucket))",
            self.duration
        )
    }

    pub fn total_requests(&self) -> String {
        format!("sum({}_count)", self.duration)
    }

    pub fn by_hour(&self) -> String {
        format!(
            "sum by ({HOUR_LABEL}) ({})",
            self.searches_by_hour
        )
    }

    /// Status codes across both the search and the by-id counters.
    pub fn by_status_code(&self) -> String {
        format!(
            "sum by ({STATUS_CODE_LABEL}) ({{__name__=~\"{}|{}\"}})",
            self.search_queries, self.by_id_queries
        )
    }

    pub fn by_result_range(&self) -> String {
        format!(
            "sum by ({RESULT_RANGE_LABEL}) ({})",
            self.search_results
        )
    }

    /// Searches per `step` window, for range queries.
    pub fn search_volume(&self, step: &str) -> String {
        format!("sum(increase({}[{step}]))", self.search_queries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_carry_session_suffix() {
        let names = SeriesNames::for_session("s_20250504_120000");

        assert_eq!(names.search_queries, "movie_search_queries_total_s_20250504_120000");
        assert_eq!(names.by_id_queries, "movie_byid_queries_total_s_20250504_120000");
        assert_eq!(names.duration, "movie_search_duration_seconds_s_20250504_120000");
    }

    #[test]
    fn test_query_expressions() {
        let names = SeriesNames::for_session("s_1");

        assert_eq!(
            names.top_searches(5),
            "topk(5, sum by (query) (movie_search_queries_total_s_1))"
        );
        assert_eq!(
            names.average_duration(),
            "sum(movie_search_duration_seconds_s_1_sum) / sum(movie_search_duration_seconds_s_1_count)"
        );
        assert_eq!(
            names.p95_duration(),
            "histogram_quantile(0.95, sum by (le) (movie_search_duration_seconds_s_1_bucket))"
        );
        assert_eq!(
            names.by_status_code(),
            "sum by (status_code) ({__name__=~\"movie_search_queries_total_s_1|movie_byid_queries_total_s_1\"})"
        );
        assert_eq!(
            names.search_volume("1h"),
            "sum(increase(movie_search_queries_total_s_1[1h]))"
        );
    }
}
