pub mod fields;
pub mod form;
pub mod options;
pub mod parser;
pub mod payload;
pub mod submission;

pub use fields::{Field, FileInput, Input, Submit, Textarea};
pub use form::{FieldMap, Form};
pub use options::{Checkbox, MultiSelect, OptionField, Radio, Select};
pub use parser::parse_fields;
pub use payload::{Payload, RequestArgs};
pub use submission::Submission;
