//! Utility Functions
//!
//! User-friendly error formatting for the command line tool.
//!
//! ```rust,no_run
//! use lamco_motion_predict::utils::format_user_error;
//!
//! if let Err(e) = lamco_motion_predict::replay::load_trace("stroke.json") {
//!     eprintln!("{}", format_user_error(&e));
//! }
//! ```

pub mod errors;

pub use errors::format_user_error;
