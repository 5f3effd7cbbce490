// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod budget_alerts;
pub mod export;
pub mod session;

pub use budget_alerts::BudgetAlertService;
