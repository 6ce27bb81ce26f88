//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into mark and report use-cases.
//! - Keep calendar and aggregation logic pure and storage-agnostic.

pub mod aggregate;
pub mod attendance_service;
pub mod calendar;
pub mod error;
pub mod report_service;
