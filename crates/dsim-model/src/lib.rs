//! Data model for district simulations.
//!
//! This crate holds the types shared by every layer of the simulator:
//!
//! - **Mapping**: the editable JSON text that maps canonical analysis fields
//!   (`labor`, `mobility`, `infiltration`, `weekend`) onto CSV columns
//! - **Payload**: a JSON tree that tolerates the `NaN`/`Infinity` tokens the
//!   prediction service emits
//! - **Sanitization**: the structural pass that replaces `NaN` leaves with `0`
//! - **Results**: typed views over a sanitized simulation response and the
//!   read-only dashboard endpoints
//!
//! # Example
//!
//! ```
//! use dsim_model::{Payload, SimulationResult};
//!
//! let payload = Payload::parse(r#"{"predictions":[{"district":"Pune","success_probability":NaN}]}"#)?;
//! let result = SimulationResult::from_payload(payload);
//! assert_eq!(result.predictions[0].success_probability, Some(0.0));
//! # Ok::<(), dsim_model::ModelError>(())
//! ```

mod dashboard;
mod decode;
mod error;
mod mapping;
mod payload;
mod result;
mod sanitize;

// === Error Types ===
pub use error::{ModelError, Result};

// === Mapping ===
pub use mapping::{CANONICAL_FIELDS, DEFAULT_MAPPING, MappingConfig};

// === Payload ===
pub use payload::{MAX_DEPTH, Number, Payload};

// === Sanitization ===
pub use sanitize::{contains_nan, sanitize, sanitize_in_place};

// === Decoding ===
pub use decode::{FromPayload, decode_list};

// === Simulation Results ===
pub use result::{ClusterRow, PredictionRow, Report, RiskPoint, SimulationResult};

// === Dashboard Endpoints ===
pub use dashboard::{
    AiReport, AnomalyAlert, ClusterPoint, FeatureImportance, ForecastPoint, HealthStatus,
};
