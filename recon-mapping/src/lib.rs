pub mod aggregator;
pub mod machine;
pub mod submitter;
pub mod throttle;

pub use aggregator::{
    AggregationError, ConfigurationAggregator, FinalConfiguration, SummaryRecord,
};
pub use machine::{ExportMachine, ExportPhase};
pub use submitter::{CsvContext, RecordingSink, SequentialSubmitter, SubmitError, SubmitOutcome};
pub use throttle::Throttle;
