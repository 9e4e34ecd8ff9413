//! Stylesheet instrumentation.
//!
//! [`instrument_source`] rewrites an XSLT program so that, when executed,
//! every literal result element is preceded in the output by a marker
//! comment naming the program line that produced it. [`MarkerFormat`]
//! describes those markers and is shared with the splitter that removes
//! them again.

#![deny(unsafe_code)]

pub mod error;
pub mod marker;
pub mod program;

pub use error::InstrumentError;
pub use marker::{DEFAULT_SENTINEL, DELIMITER, FoundMarker, Marker, MarkerFormat};
pub use program::{instrument_file, instrument_source};
