// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Outcomes of domain and repository operations.
//!
//! An [`Outcome`] is either a value or a [`Failure`] carrying a [`Status`] and
//! every message collected along the way. Failures travel up the call stack
//! with `?` and are inspected only where a caller can act on the status.

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

use serde::Serialize;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    Success,
    NotFound,
    Conflict,
    InvalidArguments,
    BusinessRuleViolated,
    Unknown,
    AggregatedErrors,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::NotFound => "not found",
            Status::Conflict => "conflict",
            Status::InvalidArguments => "invalid arguments",
            Status::BusinessRuleViolated => "business rule violated",
            Status::Unknown => "unknown error",
            Status::AggregatedErrors => "multiple errors",
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Failure {
    status: Status,
    messages: Vec<String>,
}

pub type Outcome<T> = Result<T, Failure>;

pub fn success<T>(value: T) -> Outcome<T> {
    Ok(value)
}

/// The status of an outcome. `Ok` is always [`Status::Success`].
pub fn status_of<T>(outcome: &Outcome<T>) -> Status {
    match outcome {
        Ok(_) => Status::Success,
        Err(failure) => failure.status(),
    }
}

/// Re-wrap a failed outcome under a different value type.
///
/// # Panics
///
/// Panics if `outcome` is a success: only failures can be propagated.
pub fn propagate_failure<T, U>(outcome: Outcome<T>) -> Outcome<U> {
    match outcome {
        Ok(_) => panic!("propagate_failure called on a successful outcome"),
        Err(failure) => failure.propagate(),
    }
}

impl Failure {
    /// # Panics
    ///
    /// Panics if `status` is [`Status::Success`].
    pub fn new<I, S>(status: Status, messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        assert_ne!(
            status,
            Status::Success,
            "a failure cannot have the success status"
        );
        Self {
            status,
            messages: messages.into_iter().map(Into::into).collect(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Status::NotFound, [message])
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(Status::Conflict, [message])
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::new(Status::InvalidArguments, [message])
    }

    pub fn business_rule_violated(message: impl Into<String>) -> Self {
        Self::new(Status::BusinessRuleViolated, [message])
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(Status::Unknown, [message])
    }

    /// Merge several failures into one. Messages accumulate in order. The
    /// status is shared by all inputs, or [`Status::AggregatedErrors`] when
    /// they disagree. Returns `None` for an empty input.
    pub fn aggregate(failures: impl IntoIterator<Item = Failure>) -> Option<Failure> {
        let mut merged: Option<Failure> = None;
        for failure in failures {
            merged = Some(match merged {
                None => failure,
                Some(mut acc) => {
                    if acc.status != failure.status {
                        acc.status = Status::AggregatedErrors;
                    }
                    acc.messages.extend(failure.messages);
                    acc
                }
            });
        }
        merged
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.messages.push(message.into());
        self
    }

    pub fn propagate<U>(self) -> Outcome<U> {
        Err(self)
    }
}

impl Display for Failure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.messages.is_empty() {
            write!(f, "{}", self.status)
        } else {
            write!(f, "{}: {}", self.status, self.messages.join("; "))
        }
    }
}

impl Error for Failure {}

/// Accumulates guard-clause violations so a caller can report every broken
/// rule at once. Each guard returns whether its check passed.
#[derive(Default, Debug)]
pub struct Validation {
    messages: Vec<String>,
}

impl Validation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, valid: bool, message: impl FnOnce() -> String) -> bool {
        if !valid {
            self.messages.push(message());
        }
        valid
    }

    pub fn not_none<T>(&mut self, field: &str, value: Option<&T>) -> bool {
        self.check(value.is_some(), || format!("{field} is required."))
    }

    pub fn not_blank(&mut self, field: &str, value: &str) -> bool {
        self.check(!value.trim().is_empty(), || {
            format!("{field} must not be empty.")
        })
    }

    pub fn max_chars(&mut self, field: &str, value: &str, max: usize) -> bool {
        self.check(value.chars().count() <= max, || {
            format!("{field} must be at most {max} characters long.")
        })
    }

    pub fn in_range<T: PartialOrd + Display>(
        &mut self,
        field: &str,
        value: T,
        min: T,
        max: T,
    ) -> bool {
        self.check(min <= value && value <= max, || {
            format!("{field} must be between {min} and {max}, got {value}.")
        })
    }

    pub fn positive<T: PartialOrd + Default + Display>(&mut self, field: &str, value: T) -> bool {
        self.check(value > T::default(), || {
            format!("{field} must be positive, got {value}.")
        })
    }

    pub fn not_negative<T: PartialOrd + Default + Display>(
        &mut self,
        field: &str,
        value: T,
    ) -> bool {
        self.check(value >= T::default(), || {
            format!("{field} must not be negative, got {value}.")
        })
    }

    pub fn greater_than<T: PartialOrd + Display>(&mut self, field: &str, value: T, bound: T) -> bool {
        self.check(value > bound, || {
            format!("{field} must be greater than {bound}, got {value}.")
        })
    }

    pub fn is_valid(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn finish(self, status: Status) -> Outcome<()> {
        if self.messages.is_empty() {
            Ok(())
        } else {
            Err(Failure::new(status, self.messages))
        }
    }
}

// Single-guard helpers for call sites that only check one thing.

pub fn validate_not_none<T>(field: &str, value: Option<&T>) -> Outcome<()> {
    let mut v = Validation::new();
    v.not_none(field, value);
    v.finish(Status::InvalidArguments)
}

pub fn validate_not_blank(field: &str, value: &str) -> Outcome<()> {
    let mut v = Validation::new();
    v.not_blank(field, value);
    v.finish(Status::InvalidArguments)
}

pub fn validate_in_range<T: PartialOrd + Display>(
    field: &str,
    value: T,
    min: T,
    max: T,
) -> Outcome<()> {
    let mut v = Validation::new();
    v.in_range(field, value, min, max);
    v.finish(Status::InvalidArguments)
}

pub fn validate_positive<T: PartialOrd + Default + Display>(field: &str, value: T) -> Outcome<()> {
    let mut v = Validation::new();
    v.positive(field, value);
    v.finish(Status::InvalidArguments)
}

pub fn validate_not_negative<T: PartialOrd + Default + Display>(
    field: &str,
    value: T,
) -> Outcome<()> {
    let mut v = Validation::new();
    v.not_negative(field, value);
    v.finish(Status::InvalidArguments)
}

pub fn validate_greater_than<T: PartialOrd + Display>(field: &str, value: T, bound: T) -> Outcome<()> {
    let mut v = Validation::new();
    v.greater_than(field, value, bound);
    v.finish(Status::InvalidArguments)
}
