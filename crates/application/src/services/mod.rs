pub mod probe_label;
mod result_classifier;

pub use probe_label::{probe_name, random_label, MAX_RANDOMIZABLE_LEN, PROBE_LABEL_LEN};
pub use result_classifier::{rcode_label, ResultClassifier, TOO_LONG_FOR_PROBE};
