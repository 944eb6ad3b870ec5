pub mod assess;
pub mod data;
pub mod ingest;
pub mod pipeline;
pub mod report;
pub mod settings;

pub use assess::{
    scorer::RiskScorer, RiskComponents, RiskConfig, RiskTier, RiskWeights, ScoredSupplier,
    ThresholdValidationError, TierThresholds, WeightValidationError,
};
pub use data::{
    file_repository::FileDataRepository, DataError, GeoRiskRecord, MergedSupplier, RouteRecord,
    SanctionsEntity, SupplierDataSource, SupplierRecord,
};
pub use pipeline::{run_pipeline, PipelineOutputs};
pub use report::{render_brief, OutputFormat};
pub use settings::RiskSettings;
