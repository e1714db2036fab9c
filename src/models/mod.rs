pub mod manager;
pub mod negotiation;
pub mod vacancy;

pub use manager::{Manager, NewManager, UpdateManager};
pub use negotiation::{Negotiation, NewNegotiation, UpdateNegotiation, DEFAULT_SORTING_STATUS};
pub use vacancy::{NewVacancy, UpdateVacancy, Vacancy};

/// Schemaless JSONB payload: hh.ru profile data, keyboard message history,
/// job descriptions, sourcing criteria, AI resume analysis.
pub type Document = serde_json::Value;
