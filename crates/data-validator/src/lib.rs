//! Data Validation and Frozen Transformers
//!
//! Provides range checking for raw store-day fields and the pre-fitted
//! scalers/encoders applied at serving time.

mod error;
mod normalizer;
mod validator;

pub use error::ValidationError;
pub use normalizer::{LabelEncoder, Scaler};
pub use validator::{ValidationConfig, Validator};
