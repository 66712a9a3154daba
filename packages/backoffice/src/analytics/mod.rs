// ABOUTME: Read-only reporting queries, one aggregation per metric
// ABOUTME: Money-valued metrics are converted into a requested target currency

pub mod queries;
pub mod types;

pub use queries::AnalyticsService;
pub use types::{
    CurrencyBreakdown, DateRange, FeedbackSummary, HeadcountEntry, HiringFunnel, PayoutTotals,
    ProjectStatusSummary, StatusCount, SuggestionEngagement, SurveyParticipationEntry,
};
