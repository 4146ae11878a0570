// Shared constants used across the scheduling, grouping and configuration layers
pub mod constants;
