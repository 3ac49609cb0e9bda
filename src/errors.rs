//! Error Types
//!
//! This module defines the error types used throughout the engine core.
//!
//! # Overview
//!
//! Failures come in two severities:
//!
//! - **Precondition violations**: the caller passed bad input or external
//!   state was invalid (a missing keyframe, an unknown bone, a zero-division
//!   procedural mesh). These surface as [`StrataError`] and are meant to be
//!   caught, typically at the application's top level.
//! - **Invariant violations**: internal state that can never occur when the
//!   engine is used correctly (an empty bone hierarchy, a pass pointing at a
//!   scene the pipeline does not own). These are reported with
//!   [`invariant!`](crate::invariant), which logs and then panics.
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, StrataError>`.
//!
//! ```rust,ignore
//! use strata::errors::{StrataError, Result};
//!
//! fn load() -> Result<()> {
//!     Err(StrataError::precondition("divisions must be non-zero"))
//! }
//! ```

use std::panic::Location;

use thiserror::Error;

/// The main error type for the engine core.
#[derive(Error, Debug)]
pub enum StrataError {
    // ========================================================================
    // Animation & Skeleton Errors
    // ========================================================================
    /// An animation has no keyframes for the requested bone.
    #[error("Animation '{animation}' has no keyframes for bone '{bone}'")]
    MissingKeyframes {
        /// Name of the animation
        animation: String,
        /// Name of the bone that was sampled
        bone: String,
    },

    /// Keyframes of a bone track are not sorted by time.
    #[error("Keyframes for bone '{bone}' are not in time order")]
    UnorderedKeyframes {
        /// Name of the offending bone track
        bone: String,
    },

    /// The bone list has no root bone (a bone with an empty parent name).
    #[error("Skeleton has no root bone")]
    NoRootBone,

    /// The bone list has more than one root bone.
    #[error("Skeleton has {count} root bones, expected exactly one")]
    MultipleRootBones {
        /// Number of roots found
        count: usize,
    },

    /// A bone names a parent that is not part of the skeleton.
    #[error("Bone '{bone}' refers to unknown parent '{parent}'")]
    UnknownParentBone {
        /// Child bone
        bone: String,
        /// Missing parent
        parent: String,
    },

    /// A bone lookup by name failed.
    #[error("Unknown bone: {0}")]
    UnknownBone(String),

    /// An animation state handle does not belong to the controller.
    #[error("Unknown animation state: {0}")]
    UnknownState(usize),

    // ========================================================================
    // Render Graph Errors
    // ========================================================================
    /// A node handle does not belong to the graph.
    #[error("Unknown render graph node")]
    UnknownNode,

    /// A variable reference names a variable that was never created.
    #[error("Unknown render graph variable: {0}")]
    UnknownVariable(String),

    /// Operand types of a node are incompatible.
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    // ========================================================================
    // Pipeline & Resource Errors
    // ========================================================================
    /// A render target handle is unknown to the render target manager.
    #[error("Unknown render target: {0:?}")]
    UnknownRenderTarget(crate::resources::RenderTargetId),

    /// A scene handle is unknown to the pipeline.
    #[error("Unknown scene")]
    UnknownScene,

    /// The requested asset was not found.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Settings could not be parsed.
    #[error("Invalid settings: {0}")]
    InvalidSettings(#[from] serde_json::Error),

    // ========================================================================
    // Generic
    // ========================================================================
    /// A generic precondition failure with the caller's source location.
    #[error("{message} (at {location})")]
    Precondition {
        /// Human readable description
        message: String,
        /// Source location of the failing call
        location: &'static Location<'static>,
    },
}

impl StrataError {
    /// Builds a [`StrataError::Precondition`] recording the caller's location.
    #[must_use]
    #[track_caller]
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
            location: Location::caller(),
        }
    }
}

/// Alias for `Result<T, StrataError>`.
pub type Result<T> = std::result::Result<T, StrataError>;

/// Reports a violated internal invariant: logs the message at error level
/// and panics.
#[cold]
#[track_caller]
pub fn invariant_violated(message: &str) -> ! {
    log::error!("invariant violated: {message}");
    panic!("invariant violated: {message}");
}

/// Asserts an internal invariant.
///
/// Invariant violations are not recoverable and are not meant to be caught.
#[macro_export]
macro_rules! invariant {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            $crate::errors::invariant_violated(&format!($($arg)+));
        }
    };
}
