// src/analysis/mod.rs
//
// Bottleneck detection pipeline modules.
//
// Signal flow:
//   daily CSV → readings::ReadingTable → finder (seed selection) ─┐
//                                        scanner (outward walk) ──┼→ Detection rows
//   Detection rows (all days) → summary → StationSummary

pub mod finder;
pub mod scanner;
pub mod summary;

// Re-exports for ergonomic access from main.rs
pub use finder::{BottleneckFinder, FinderStats};
pub use scanner::SlowdownScanner;
pub use summary::summarize;
