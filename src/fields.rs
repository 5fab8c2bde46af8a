//! Enumerations and field types for task tracking.
//!
//! This module defines the configuration choices that decide how the task store
//! behaves: how completion is modelled and which deadline convention is shown.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// How completed tasks are tracked.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CompletionModel {
    /// Each task carries a `completed` flag that can be toggled in place.
    Flag,
    /// Completing a task moves it into a separate, date-stamped completed list.
    #[default]
    SeparateList,
}

/// Display convention for deadlines and completion dates.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DateFormat {
    /// `D MonthName YYYY`, e.g. `5 Maret 2025`.
    Long,
    /// `DD/MM/YYYY`, e.g. `05/03/2025`.
    #[default]
    Numeric,
}

/// Form fields that are subject to validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Subject,
    Title,
}

impl fmt::Display for CompletionModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CompletionModel::Flag => "flag",
            CompletionModel::SeparateList => "separate-list",
        })
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DateFormat::Long => "long",
            DateFormat::Numeric => "numeric",
        })
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Subject => "Subject",
            Field::Title => "Title",
        })
    }
}
