//! Domain model for Quire, a form-builder backend.
//!
//! Forms, their field catalog, and the submission pipeline that turns a
//! client payload into a validated response. Persistence sits behind
//! [`store::FormStore`]; nothing here touches HTTP or SQL.

// `FormStore` declares `Send` futures explicitly; the lint doesn't see that.
#![allow(async_fn_in_trait)]

pub mod catalog;
pub mod enums;
pub mod error;
pub mod field;
pub mod form;
pub mod lifecycle;
pub mod locale;
pub mod response;
pub mod service;
pub mod store;
pub mod submission;
pub mod validate;

pub use error::{Classify, Error, ErrorKind, Result, ValidationError};
