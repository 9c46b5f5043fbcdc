//! JSON adapter over the service layer. Handlers only extract, call and wrap.

pub mod auth;
pub mod notes;
pub mod tags;
