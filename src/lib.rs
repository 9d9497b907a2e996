pub mod analysis_export;
pub mod betting;
pub mod config;
pub mod fake_feed;
pub mod metrics;
pub mod parsing;
pub mod state;
pub mod streaks;
pub mod teams;
pub mod win_prob;
