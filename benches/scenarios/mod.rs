//! Scenario benchmarks: complete voices and the polyphonic pool.

mod voices;

pub use voices::bench_voices;
