// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! The UTRX rule format: type codes, pattern matching and the rule table.

pub mod matcher;
pub mod store;
pub mod types;

pub use matcher::{match_pattern, match_token};
pub use store::{Case, Rule, RuleSet};
pub use types::{is_subtype, ParamType};
