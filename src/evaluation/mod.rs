pub mod dataset;
pub mod metrics;

pub use dataset::{
    load_labeled_dir, load_labeled_file, parse_labeled_json, DatasetError, LabeledDataset,
    LabeledItem,
};
pub use metrics::{check_baseline, evaluate, ConfusionMatrix, Evaluation, ItemOutcome, Metrics, Verdict};

/// Default root for labeled data.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Golden set location, relative to the data directory.
pub const GOLDEN_SET_PATH: &str = "golden/golden-test-set.json";

/// Directory of labeled files, relative to the data directory.
pub const LABELED_DIR: &str = "labeled";
