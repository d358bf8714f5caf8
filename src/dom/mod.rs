pub mod element;
pub mod processor;

pub use element::DomElement;
pub use processor::DomProcessor;
