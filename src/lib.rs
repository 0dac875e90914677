//! # Donezo
//!
//! Local interaction state for a task-management dashboard, plus a client for
//! the dashboard API it renders.
//!
//! ## Features
//!
//! - **Time tracker**: start/pause/stop stopwatch on a cancellable Tokio task
//! - **Optimistic collections**: users and products seeded from the API,
//!   added to locally, filtered by search term and status/category
//! - **Views**: per-page state objects that never fail to load
//!
//! ## Modules
//!
//! - [`tracker`]: Elapsed-time tracker
//! - [`collection`]: Optimistic collection store and filtering
//! - [`models`]: Records and payloads served by the API
//! - [`analytics`]: Chart and stat-card projections
//! - [`client`]: HTTP client and session
//! - [`views`]: Per-page state
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use donezo::client::{ClientConfig, DashboardClient};
//! use donezo::models::UserDraft;
//! use donezo::views::UsersView;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = DashboardClient::new(ClientConfig::default())?;
//!
//!     // Seed from the API; errors degrade to an empty list
//!     let mut users = UsersView::users();
//!     users.load(&client).await;
//!
//!     // Local-only insert, prepended to the list
//!     users.submit_add(UserDraft {
//!         name: "Gamma".to_string(),
//!         ..Default::default()
//!     })?;
//!
//!     users.set_search("gam");
//!     users.set_discriminator("active");
//!     for user in users.visible() {
//!         println!("{} <{}>", user.name, user.email);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod analytics;
pub mod client;
pub mod collection;
pub mod config;
pub mod models;
pub mod tracker;
pub mod views;

// Re-export top-level types for convenience
pub use tracker::{format_time, TimeTracker, TimerState, TimerWatch, TrackerPhase};

pub use collection::{CollectionStore, Discriminator, FilterCriteria, Record};

pub use models::{
    AnalyticsPoint, DashboardPayload, Overview, Product, ProductDraft, SessionUser, User,
    UserDraft,
};

pub use client::{ClientConfig, ClientError, DashboardApi, DashboardClient, Endpoint, Session};

pub use views::{
    AnalyticsView, ListView, OverviewView, ProductsView, UsersView, Validate, ValidationError,
};

pub use config::{ApiConfig, Config, ConfigError, LoggingConfig, TrackerConfig};
