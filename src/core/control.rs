use crate::errors::Result;
use crate::types::{FieldValue, Pairs};

/// Payload channel that file inputs serialize into.
pub const FILES_CHANNEL: &str = "files";

/// Uniform interface over every form control variant.
///
/// Implementations differ in how they read their initial state from markup and
/// in what shape of value they accept, but the form and payload builder only
/// ever talk to fields through this trait.
pub trait FormControl {
    /// Value of the `name` attribute the field was built from.
    fn name(&self) -> &str;

    /// Whether the control is excluded from serialization.
    fn disabled(&self) -> bool;

    /// Payload channel for this field's pairs; `None` is the default channel.
    fn payload_key(&self) -> Option<&str> {
        None
    }

    /// Current value.
    fn value(&self) -> FieldValue;

    /// Assign a new value, rejecting values the control cannot hold.
    fn set_value(&mut self, value: FieldValue) -> Result<()>;

    /// `(name, value)` pairs this field contributes to a payload.
    fn serialize(&self) -> Pairs;

    fn is_submit(&self) -> bool {
        false
    }
}
