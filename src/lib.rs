pub mod api;
pub mod config;
pub mod pipeline;

pub mod detection {
    pub mod engine;
    pub mod rules;
    pub mod types;
}

pub mod ingest {
    pub mod fetcher;
    pub mod types;
}

pub mod report {
    pub mod batch;
}

pub mod scoring {
    pub mod explainer;
    pub mod scorer;
}

pub use config::Config;
pub use detection::types::{Finding, Severity};
pub use ingest::types::{EntityType, InputPayload, Transaction};
pub use pipeline::{RiskAnalyzer, RiskReport};
