// ABOUTME: Surveys with JSON question lists and collected responses
// ABOUTME: Draft/open/closed lifecycle; responses only accepted while open

pub mod storage;
pub mod types;

pub use storage::SurveyStorage;
pub use types::{
    QuestionKind, Survey, SurveyCreateInput, SurveyQuestion, SurveyResponse,
    SurveyResponseInput, SurveyStatus, SurveySummary, SurveyUpdateInput,
};
