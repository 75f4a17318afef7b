//! # API Module
//!
//! Business logic of the site server. Each submodule handles one concern.
//!
//! ## Modules
//!
//! - [`keys`] - Counter key naming shared by the recorder and the dashboard
//! - [`recorder`] - Visit and event recording (write path)
//! - [`dashboard`] - Analytics aggregation for the Admin console (read path)
//! - [`content`] - Schema-less site content edited from the Admin console

pub mod content;
pub mod dashboard;
pub mod keys;
pub mod recorder;

