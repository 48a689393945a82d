//! Data models for the outreach website content.
//!
//! These models serialize exactly as the site frontend reads them (camelCase JSON).

mod article;
mod chapter;
mod person;
mod review;
mod stats;

pub use article::*;
pub use chapter::*;
pub use person::*;
pub use review::*;
pub use stats::*;

/// A record stored inside a whole-collection document.
pub trait Record {
    fn id(&self) -> &str;
}
