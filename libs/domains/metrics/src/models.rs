use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};

/// Rounds to `places` decimal places.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Share of `part` in `total` as a percentage with 2 decimals; 0 when
/// `total` is 0.
pub(crate) fn percentage(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        round_to(part / total * 100.0, 2)
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TopSearchItem {
    pub query: String,
    pub count: u64,
    /// Display form, at most 15 chars plus `...`.
    pub normalized: String,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TopSearches {
    pub total_searches: u64,
    pub top_searches: Vec<TopSearchItem>,
    pub limit: usize,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
pub enum DayPeriod {
    #[serde(rename = "Early morning")]
    #[strum(serialize = "Early morning")]
    EarlyMorning,
    Morning,
    Afternoon,
    Evening,
}

impl DayPeriod {
    pub fn for_hour(hour: u32) -> Self {
        match hour {
            6..=11 => DayPeriod::Morning,
            12..=17 => DayPeriod::Afternoon,
            18..=23 => DayPeriod::Evening,
            _ => DayPeriod::EarlyMorning,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HourlyStatItem {
    pub hour: u32,
    /// `HH:00`
    pub hour_display: String,
    pub count: u64,
    pub period: DayPeriod,
}

impl HourlyStatItem {
    pub fn new(hour: u32, count: u64) -> Self {
        Self {
            hour,
            hour_display: format!("{hour:02}:00"),
            count,
            period: DayPeriod::for_hour(hour),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HourlyStats {
    pub hourly_distribution: Vec<HourlyStatItem>,
    pub most_active_hour: Option<HourlyStatItem>,
    pub total_hours: usize,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString,
)]
pub enum StatusCategory {
    Success,
    #[serde(rename = "Client Error")]
    #[strum(serialize = "Client Error")]
    ClientError,
    #[serde(rename = "Server Error")]
    #[strum(serialize = "Server Error")]
    ServerError,
    Unknown,
}

impl StatusCategory {
    pub fn for_code(code: u16) -> Self {
        match code {
            200..=299 => StatusCategory::Success,
            400..=499 => StatusCategory::ClientError,
            500.. => StatusCategory::ServerError,
            _ => StatusCategory::Unknown,
        }
    }
}

/// Short description of the status codes the API actually returns.
pub fn describe_status(code: u16) -> &'static str {
    match code {
        200 => "Success",
        400 => "Invalid request",
        404 => "Not found",
        500 => "Internal error",
        _ => "Others",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StatusCodeStatItem {
    pub status_code: u16,
    pub count: u64,
    pub description: String,
    pub category: StatusCategory,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StatusCodeStats {
    pub status_distribution: Vec<StatusCodeStatItem>,
    pub total_requests: u64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OverviewStats {
    pub total_searches: u64,
    pub total_movie_by_id: u64,
    pub avg_requests_per_day: f64,
}

impl OverviewStats {
    pub fn new(total_searches: u64, total_movie_by_id: u64) -> Self {
        Self {
            total_searches,
            total_movie_by_id,
            avg_requests_per_day: round_to((total_searches + total_movie_by_id) as f64 / 30.0, 1),
        }
    }
}

/// Response times in milliseconds; zeros when nothing is known.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PerformanceStats {
    pub average_response_time_ms: f64,
    pub p95_response_time_ms: f64,
    pub total_requests: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UsageStats {
    pub result_distribution: BTreeMap<String, u64>,
    pub most_common_result_range: String,
}

impl Default for UsageStats {
    fn default() -> Self {
        Self {
            result_distribution: BTreeMap::new(),
            most_common_result_range: "unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeneralStats {
    pub session: String,
    pub overview: OverviewStats,
    pub performance: PerformanceStats,
    pub usage: UsageStats,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TimelinePoint {
    pub timestamp: DateTime<Utc>,
    pub count: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SearchTimeline {
    pub hours: u32,
    pub step_minutes: u32,
    pub points: Vec<TimelinePoint>,
}

#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct TopSearchesQuery {
    /// Number of entries (1-100, default 10)
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    10
}

#[derive(Debug, Clone, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct TimelineQuery {
    /// Window length in hours (1-168, default 24)
    #[serde(default = "default_hours")]
    pub hours: u32,
    /// Point spacing in minutes (default 60)
    #[serde(default = "default_step_minutes")]
    pub step_minutes: u32,
}

fn default_hours() -> u32 {
    24
}

fn default_step_minutes() -> u32 {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ResetResponse {
    pub success: bool,
    pub session: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_category() {
        assert_eq!(StatusCategory::for_code(201), StatusCategory::Success);
        assert_eq!(StatusCategory::for_code(404), StatusCategory::ClientError);
        assert_eq!(StatusCategory::for_code(503), StatusCategory::ServerError);
        assert_eq!(StatusCategory::for_code(101), StatusCategory::Unknown);
        assert_eq!(StatusCategory::for_code(302), StatusCategory::Unknown);
    }

    #[test]
    fn test_status_category_serializes_as_label() {
        let json = serde_json::to_string(&StatusCategory::ClientError).unwrap();
        assert_eq!(json, "\"Client Error\"");
        assert_eq!(StatusCategory::ServerError.to_string(), "Server Error");
    }

    #[test]
    fn test_describe_status() {
        assert_eq!(describe_status(200), "Success");
        assert_eq!(describe_status(400), "Invalid request");
        assert_eq!(describe_status(404), "Not found");
        assert_eq!(describe_status(500), "Internal error");
        assert_eq!(describe_status(418), "Others");
    }

    #[test]
    fn test_day_period() {
        assert_eq!(DayPeriod::for_hour(0), DayPeriod::EarlyMorning);
        assert_eq!(DayPeriod::for_hour(5), DayPeriod::EarlyMorning);
        assert_eq!(DayPeriod::for_hour(6), DayPeriod::Morning);
        assert_eq!(DayPeriod::for_hour(12), DayPeriod::Afternoon);
        assert_eq!(DayPeriod::for_hour(18), DayPeriod::Evening);
        assert_eq!(DayPeriod::for_hour(23), DayPeriod::Evening);
    }

    #[test]
    fn test_hourly_item_display() {
        let item = HourlyStatItem::new(7, 3);
        assert_eq!(item.hour_display, "07:00");
        assert_eq!(item.period, DayPeriod::Morning);
    }

    #[test]
    fn test_overview_average_per_day() {
        let overview = OverviewStats::new(40, 7);
        assert_eq!(overview.avg_requests_per_day, 1.6);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(1.0, 3.0), 33.33);
        assert_eq!(percentage(5.0, 0.0), 0.0);
    }
}
