//! Simulation session for the district simulator.
//!
//! [`Session`] owns the selected file, the mapping text, the latest result,
//! the error banner and the loading flag. Views and the prediction search
//! read from it; only submissions and file selection write the result.
//!
//! # Example
//!
//! ```ignore
//! use dsim_client::{ApiClient, ClientConfig};
//! use dsim_core::{ActiveView, Session, SubmitOutcome};
//!
//! let client = ApiClient::new(ClientConfig::default())?;
//! let mut session = Session::default();
//! session.select_path(Path::new("districts.csv"))?;
//! if session.submit(&client) == SubmitOutcome::Succeeded {
//!     session.set_search_term("pu");
//!     for row in session.filtered_predictions() {
//!         println!("{} {}", row.district, row.state);
//!     }
//! }
//! ```

mod filter;
mod session;
mod view;

pub use filter::{SearchFilter, filter_predictions};
pub use session::{PendingSubmission, Session, SimulationBackend, SubmitOutcome};
pub use view::{ActiveView, IMPORTANCE_LIMIT, ParseViewError, ViewData, ranked_clusters};
