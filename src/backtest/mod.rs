pub mod curves;
pub mod metrics;
pub mod runner;
pub mod sampler;
pub mod seed;
pub mod synthesizer;

pub use metrics::SummaryStats;
pub use runner::BacktestRunner;
pub use synthesizer::SynthesisOutcome;
