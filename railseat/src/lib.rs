//! # Railseat
//!
//! Terminal client for a train-seat booking demo.
//!
//! The backend owns seat allocation, accounts, and persistence. This crate
//! keeps a local view of the coach in sync with it:
//!
//! - [`seats`]: bitmap decoding, global seat numbering, free-seat counts
//! - [`sync`]: the seat map reducer, its poll timer, and the mounted view
//! - [`auth`]: sign-up, sign-in, logout
//! - [`session`]: the bearer token and where it is stored
//! - [`render`]: text grid output
//! - [`config`]: environment-driven settings
//! - [`cli`]: command dispatch, exit statuses, and the interactive watch
//! - [`mocks`]: an in-memory backend
//!
//! ## Example
//!
//! ```no_run
//! use railseat::seats::SeatCount;
//! use railseat::session::{CredentialStore, FileCredentialStore, Session};
//! use railseat::sync::{SeatMapView, SyncOptions};
//! use railseat_client::{BookingClient, DEFAULT_API_URL};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = FileCredentialStore::new(".railseat/token");
//! let session = credentials.load()?.map(Session::new);
//!
//! let api = Arc::new(BookingClient::new(DEFAULT_API_URL));
//! let view = SeatMapView::mount(session, api, SyncOptions::default()).await?;
//! view.loaded().await?;
//!
//! let booked = view.book(SeatCount::new(3)?).await?;
//! println!("{}", booked.success_message());
//!
//! view.teardown().await;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod mocks;
pub mod render;
pub mod seats;
pub mod session;
pub mod sync;

pub use config::Config;
pub use error::{DecodeError, ValidationError};
