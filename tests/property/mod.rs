//! Property-based tests for resolution and user-data guarantees

mod memoization;
mod user_data;
