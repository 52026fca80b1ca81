#[doc(inline)]
pub use rb_map::{self, *};
