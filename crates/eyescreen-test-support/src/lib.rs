//! Test support utilities for eyescreen.
//!
//! Provides port mocks, fixed-output classifiers, synthetic image builders
//! and safetensors weight writers for testing the screening pipeline.
//!
//! # Example
//!
//! ```
//! use eyescreen_core::Orchestrator;
//! use eyescreen_test_support::{FixedClassifier, SyntheticImageBuilder};
//!
//! let detection = FixedClassifier::detection(&[0.9, 0.1]);
//! let condition = FixedClassifier::condition(&[0.8, 0.05, 0.05, 0.05, 0.05]);
//! let image = SyntheticImageBuilder::eye_like(200, 160);
//!
//! let outcome = Orchestrator::new(&detection, &condition)
//!     .analyze_image(&image)
//!     .unwrap();
//! assert!(outcome.condition_result().is_some());
//! ```

mod builders;
mod classifiers;
mod mocks;
mod weights;

pub use builders::SyntheticImageBuilder;
pub use classifiers::{FailingClassifier, FixedClassifier};
pub use mocks::{MockImageSource, MockProgressSink, MockResultOutput};
pub use weights::{write_classifier_weights, write_model_pair, FAVOURED_LOGIT};
