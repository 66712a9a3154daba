// ABOUTME: Employee suggestion entity with up/down voting
// ABOUTME: One vote per voter; repeating a vote is rejected, the opposite flips it

pub mod storage;
pub mod types;

pub use storage::SuggestionStorage;
pub use types::{
    Suggestion, SuggestionCreateInput, SuggestionFilter, SuggestionStatus, VoteType,
};
