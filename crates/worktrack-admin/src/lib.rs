//! # worktrack-admin
//!
//! The administration subsystem for worktrack custom fields. Custom fields
//! are admin-defined metadata fields attachable to work packages, projects,
//! users, and other domain entities; list-type fields additionally carry a
//! set of selectable options.
//!
//! The crate provides the data model ([`model`]), the closed subtype
//! registry ([`registry`]), the persistence abstraction ([`store`]), the
//! CRUD controller ([`controller`]) with its option reconciliation routine
//! ([`options`]), and an Axum router exposing the actions as a JSON API
//! ([`routes`]).

pub mod auth;
pub mod controller;
pub mod hooks;
pub mod license;
pub mod messages;
pub mod model;
pub mod options;
pub mod params;
pub mod redirect;
pub mod registry;
pub mod routes;
pub mod store;

pub use controller::{ControllerResponse, CustomFieldsController, RequestContext};
pub use model::{CustomField, CustomOption, CustomValue, FieldFormat};
pub use registry::CustomFieldType;
pub use store::{CustomFieldStore, InMemoryStore};
