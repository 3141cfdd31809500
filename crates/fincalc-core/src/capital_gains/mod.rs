//! Capital-gains classification (short vs long term) and aggregation.

pub mod classification;
pub mod summary;

pub use classification::{
    classify_gain, holding_period, AssetType, CapitalGainsTransaction, ClassifiedGain, GainTerm,
};
pub use summary::{summarize_capital_gains, CapitalGainsSummary};
