//! iCalendar serialization.
//!
//! - Escape: attribute value quoting
//! - Fold: content line folding at 75 octets
//! - Serializer: depth-first document serialization

mod escape;
mod fold;
mod serializer;

pub use escape::quote_attribute_value;
pub use fold::fold_line;
pub use serializer::{serialize, serialize_property};
