//! License text classification.
//!
//! - [`detect`] — infers an SPDX identifier from full license text, used for
//!   dependencies whose metadata declares no license.

pub mod detect;
