//! # Exam Schedule Common Library
//!
//! Core of the exam schedule resolver, shared by the web service:
//! - Fuzzy subject matching (Levenshtein ratio)
//! - Raw table cleanup and schedule table construction
//! - The resolver pipeline producing dated exam records
//! - Input file loaders and configuration

pub mod config;
pub mod error;
pub mod matcher;
pub mod resolver;
pub mod schedule;
pub mod sources;
pub mod table;

pub use error::{Error, Result};
pub use matcher::{best_match, Match};
pub use resolver::{Resolution, ResolvedRecord, Resolver, SlotOverride, SubjectMatch};
pub use schedule::{Cell, ExamSession, Schedule, ScheduleLayout, ScheduleRow};
pub use table::RawTable;
