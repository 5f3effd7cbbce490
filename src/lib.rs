// SPDX-License-Identifier: MIT

//! Fintrack: personal finance tracking backend
//!
//! This crate provides the REST API for managing transactions, categories,
//! monthly budgets and savings goals, gated by a cookie-based JWT session
//! layer with per-user subscription windows.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::BudgetAlertService;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub budget_alerts: BudgetAlertService,
}
