//! Model ensemble adapter: classifiers, ensembles and outcomes.

mod ensemble;
mod model;
mod outcome;

pub use ensemble::ModelEnsemble;
pub use model::{ImageClassifier, OnnxClassifier, softmax, to_probabilities};
pub use outcome::{Candidate, ClassificationOutcome};
