//! Gift registry and event RSVP service
//!
//! Users create events, invite guests by email and coordinate the gifts
//! they plan to bring. The HTTP surface lives in [`routes`], business rules
//! in [`services`] and PostgreSQL access in [`repositories`].

use sqlx::migrate::Migrator;

pub mod config;
pub mod error;
pub mod images;
pub mod mailer;
pub mod models;
pub mod notifications;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod validation;

#[cfg(test)]
pub mod testing;

/// Schema migrations embedded at compile time
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");
