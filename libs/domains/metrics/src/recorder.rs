//! Write side: counter increments and duration observations.

use chrono::{Local, Timelike};
use metrics::{counter, histogram};
use std::sync::Arc;
use tracing::trace;

use crate::series::{
    HOUR_LABEL, QUERY_LABEL, RESULT_RANGE_LABEL, STATUS_CODE_LABEL, SeriesNames,
};
use crate::session::MetricsSession;

const MAX_QUERY_LABEL_CHARS: usize = 20;

/// Records search and lookup outcomes under the current session.
///
/// Cheap to clone; every clone shares the same session.
#[derive(Debug, Clone)]
pub struct SearchMetrics {
    session: Arc<MetricsSession>,
}

impl SearchMetrics {
    pub fn new(session: Arc<MetricsSession>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Arc<MetricsSession> {
        &self.session
    }

    /// Records one search request.
    pub fn record_search(
        &self,
        query: &str,
        duration_ms: f64,
        status_code: u16,
        result_count: usize,
    ) {
        let names = SeriesNames::for_session(&self.session.current());
        let query = normalize_query(query);
        let status = status_code.to_string();

        counter!(
            names.search_queries,
            QUERY_LABEL => query.clone(),
            STATUS_CODE_LABEL => status
        )
        .increment(1);
        histogram!(names.duration).record(duration_ms / 1000.0);
        counter!(
            names.searches_by_hour,
            HOUR_LABEL => Local::now().hour().to_string()
        )
        .increment(1);
        counter!(
            names.search_results,
            RESULT_RANGE_LABEL => result_count_range(result_count)
        )
        .increment(1);

        trace!(%query, status_code, result_count, duration_ms, "Search recorded");
    }

    /// Records one lookup by uid.
    pub fn record_movie_by_id(&self, uid: i32, duration_ms: f64, status_code: u16) {
        let names = SeriesNames::for_session(&self.session.current());

        counter!(
            names.by_id_queries,
            STATUS_CODE_LABEL => status_code.to_string()
        )
        .increment(1);
        histogram!(names.duration).record(duration_ms / 1000.0);

        trace!(uid, status_code, duration_ms, "Lookup recorded");
    }
}

/// Label form of a search term: trimmed, lowercased, at most 20 chars plus
/// `...`; blank input becomes `empty`.
pub fn normalize_query(query: &str) -> String {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return "empty".to_string();
    }

    let lowered = trimmed.to_lowercase();
    truncate_with_ellipsis(&lowered, MAX_QUERY_LABEL_CHARS)
}

/// `text` cut to `max_chars` characters with `...` appended when cut.
pub fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Bucket label for a search's result count.
pub fn result_count_range(count: usize) -> &'static str {
    match count {
        0 => "0",
        1 => "1",
        2..=5 => "2-5",
        6..=10 => "6-10",
        _ => "10+",
    }
}
