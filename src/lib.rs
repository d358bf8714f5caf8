pub mod core;
pub mod dom;
pub mod errors;
pub mod forms;
pub mod testing;
pub mod types;

pub use crate::core::{Config, FormControl};
pub use dom::{DomElement, DomProcessor};
pub use errors::{FormError, Result};
pub use forms::{Field, Form, Payload, RequestArgs, Submission, Submit};
pub use types::*;
