//! Metrics Service - session-scoped search statistics
//!
//! Writes go through [`SearchMetrics`]; reads build PromQL against the
//! current session's series and turn the samples into stat models.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

use crate::backend::{MetricsBackend, step_param};
use crate::error::{MetricsError, MetricsResult};
use crate::extract::{labeled_values, range_points, single_value};
use crate::models::{
    GeneralStats, HourlyStatItem, HourlyStats, OverviewStats, PerformanceStats, SearchTimeline,
    StatusCategory, StatusCodeStatItem, StatusCodeStats, TimelinePoint, TopSearchItem,
    TopSearches, UsageStats, describe_status, percentage, round_to,
};
use crate::recorder::{SearchMetrics, truncate_with_ellipsis};
use crate::series::{
    HOUR_LABEL, QUERY_LABEL, RESULT_RANGE_LABEL, STATUS_CODE_LABEL, SeriesNames,
};
use crate::session::MetricsSession;

pub const MAX_TOP_SEARCHES: usize = 100;
pub const MAX_TIMELINE_HOURS: u32 = 168;
const DISPLAY_QUERY_CHARS: usize = 15;

pub struct MetricsService<B: MetricsBackend> {
    backend: Arc<B>,
    session: Arc<MetricsSession>,
}

impl<B: MetricsBackend> Clone for MetricsService<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            session: self.session.clone(),
        }
    }
}

fn to_count(value: f64) -> u64 {
    value.round().max(0.0) as u64
}

impl<B: MetricsBackend> MetricsService<B> {
    pub fn new(backend: B, session: Arc<MetricsSession>) -> Self {
        Self {
            backend: Arc::new(backend),
            session,
        }
    }

    /// Write-side handle sharing this service's session.
    pub fn recorder(&self) -> SearchMetrics {
        SearchMetrics::new(self.session.clone())
    }

    pub fn current_session(&self) -> String {
        self.session.current()
    }

    fn names(&self) -> SeriesNames {
        SeriesNames::for_session(&self.session.current())
    }

    /// Instant scalar; failures and empty results read as 0.
    async fn scalar_or_zero(&self, expr: &str) -> f64 {
        match self.backend.query(expr).await {
            Ok(body) => single_value(&body).unwrap_or(0.0),
            Err(e) => {
                warn!(error = %e, expr, "Metrics query failed, using 0");
                0.0
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn general_stats(&self) -> MetricsResult<GeneralStats> {
        let names = self.names();
        let (searches_expr, by_id_expr) = (names.total_searches(), names.total_by_id());
        let (searches, by_id) = tokio::join!(
            self.scalar_or_zero(&searches_expr),
            self.scalar_or_zero(&by_id_expr),
        );
        let (performance, usage) = tokio::join!(self.performance_stats(), self.usage_stats());

        Ok(GeneralStats {
            session: self.session.current(),
            overview: OverviewStats::new(to_count(searches), to_count(by_id)),
            performance,
            usage,
            generated_at: Utc::now(),
        })
    }

    /// Most frequent normalized queries, highest count first.
    #[instrument(skip(self))]
    pub async fn top_searches(&self, limit: usize) -> MetricsResult<TopSearches> {
        let limit = limit.clamp(1, MAX_TOP_SEARCHES);
        let body = self.backend.query(&self.names().top_searches(limit)).await?;

        let mut entries: Vec<(String, u64)> = labeled_values(&body, QUERY_LABEL)
            .into_iter()
            .map(|(query, value)| (query, to_count(value)))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let total: u64 = entries.iter().map(|(_, count)| count).sum();
        let top_searches = entries
            .into_iter()
            .map(|(query, count)| TopSearchItem {
                normalized: truncate_with_ellipsis(&query, DISPLAY_QUERY_CHARS),
                percentage: percentage(count as f64, total as f64),
                query,
                count,
            })
            .collect();

        Ok(TopSearches {
            total_searches: total,
            top_searches,
            limit,
        })
    }

    /// Average and p95 response time. Any failed query yields all zeros.
    #[instrument(skip(self))]
    pub async fn performance_stats(&self) -> PerformanceStats {
        let names = self.names();
        let (average_expr, p95_expr, total_expr) = (
            names.average_duration(),
            names.p95_duration(),
            names.total_requests(),
        );
        let (average, p95, total) = tokio::join!(
            self.backend.query(&average_expr),
            self.backend.query(&p95_expr),
            self.backend.query(&total_expr),
        );

        match (average, p95, total) {
            (Ok(average), Ok(p95), Ok(total)) => PerformanceStats {
                average_response_time_ms: round_to(
                    single_value(&average).unwrap_or(0.0) * 1000.0,
                    2,
                ),
                p95_response_time_ms: round_to(single_value(&p95).unwrap_or(0.0) * 1000.0, 2),
                total_requests: to_count(single_value(&total).unwrap_or(0.0)),
            },
            (average, p95, total) => {
                let error = [average.err(), p95.err(), total.err()]
                    .into_iter()
                    .flatten()
                    .next()
                    .map(|e| e.to_string())
                    .unwrap_or_default();
                warn!(%error, "Performance stats unavailable");
                PerformanceStats::default()
            }
        }
    }

    /// Result-count distribution. Failures yield the empty default.
    #[instrument(skip(self))]
    pub async fn usage_stats(&self) -> UsageStats {
        let body = match self.backend.query(&self.names().by_result_range()).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Usage stats unavailable");
                return UsageStats::default();
            }
        };

        let mut usage = UsageStats::default();
        let mut best: Option<(String, u64)> = None;
        for (range, value) in labeled_values(&body, RESULT_RANGE_LABEL) {
            let count = to_count(value);
            if best.as_ref().is_none_or(|(_, top)| count > *top) {
                best = Some((range.clone(), count));
            }
            *usage.result_distribution.entry(range).or_default() += count;
        }
        if let Some((range, _)) = best {
            usage.most_common_result_range = range;
        }
        usage
    }

    /// Searches per local hour, ascending by hour.
    #[instrument(skip(self))]
    pub async fn hourly_stats(&self) -> MetricsResult<HourlyStats> {
        let body = self.backend.query(&self.names().by_hour()).await?;

        let mut items: Vec<HourlyStatItem> = labeled_values(&body, HOUR_LABEL)
            .into_iter()
            .filter_map(|(hour, value)| {
                let hour = hour.parse::<u32>().ok().filter(|h| *h < 24)?;
                Some(HourlyStatItem::new(hour, to_count(value)))
            })
            .collect();
        items.sort_by_key(|item| item.hour);

        let mut most_active: Option<&HourlyStatItem> = None;
        for item in &items {
            if most_active.is_none_or(|best| item.count > best.count) {
                most_active = Some(item);
            }
        }

        Ok(HourlyStats {
            most_active_hour: most_active.cloned(),
            total_hours: items.len(),
            hourly_distribution: items,
        })
    }

    /// Response status distribution over searches and lookups.
    #[instrument(skip(self))]
    pub async fn status_code_stats(&self) -> MetricsResult<StatusCodeStats> {
        let body = self.backend.query(&self.names().by_status_code()).await?;

        let mut counts: Vec<(u16, u64)> = labeled_values(&body, STATUS_CODE_LABEL)
            .into_iter()
            .filter_map(|(code, value)| Some((code.parse::<u16>().ok()?, to_count(value))))
            .collect();
        counts.sort_by_key(|(code, _)| *code);

        let total: u64 = counts.iter().map(|(_, count)| count).sum();
        let items: Vec<StatusCodeStatItem> = counts
            .into_iter()
            .map(|(code, count)| StatusCodeStatItem {
                status_code: code,
                count,
                description: describe_status(code).to_string(),
                category: StatusCategory::for_code(code),
                percentage: percentage(count as f64, total as f64),
            })
            .collect();

        let success_rate = round_to(
            items
                .iter()
                .filter(|item| (200..300).contains(&item.status_code))
                .map(|item| item.percentage)
                .sum(),
            2,
        );

        Ok(StatusCodeStats {
            status_distribution: items,
            total_requests: total,
            success_rate,
        })
    }

    /// Search volume over the last `hours`, one point per `step_minutes`.
    #[instrument(skip(self))]
    pub async fn search_timeline(
        &self,
        hours: u32,
        step_minutes: u32,
    ) -> MetricsResult<SearchTimeline> {
        if !(1..=MAX_TIMELINE_HOURS).contains(&hours) {
            return Err(MetricsError::Validation(format!(
                "hours must be between 1 and {MAX_TIMELINE_HOURS}"
            )));
        }
        if step_minutes == 0 || step_minutes > hours * 60 {
            return Err(MetricsError::Validation(
                "step_minutes must be positive and fit inside the window".to_string(),
            ));
        }

        let end = Utc::now();
        let start = end - chrono::Duration::hours(i64::from(hours));
        let step = Duration::from_secs(u64::from(step_minutes) * 60);
        let expr = self.names().search_volume(&step_param(step));

        let body = self.backend.query_range(&expr, start, end, step).await?;
        let points = range_points(&body)
            .into_iter()
            .filter_map(|(ts, count)| {
                Some(TimelinePoint {
                    timestamp: DateTime::from_timestamp(ts, 0)?,
                    count: round_to(count, 2),
                })
            })
            .collect();

        Ok(SearchTimeline {
            hours,
            step_minutes,
            points,
        })
    }

    /// Starts a fresh session so every statistic reads as empty.
    ///
    /// Old series stop receiving writes and age out of the exporter. Nothing
    /// is registered per session, so a rotation leaves no state behind.
    /// Always succeeds.
    #[instrument(skip(self))]
    pub fn delete_all_metrics(&self) -> bool {
        let previous = self.session.current();
        let session = self.session.rotate(Utc::now());

        info!(%previous, %session, "Metrics session rotated");
        true
    }
}
