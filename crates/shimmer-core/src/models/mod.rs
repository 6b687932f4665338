// ABOUTME: Core data models for shim requests, credentials, and normalized measurements
// ABOUTME: Re-exports request, time window, credential, data point, and response types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! Request-scoped values (`ShimDataRequest`, `TimeWindow`) are created and dropped
//! per fetch. `AccessCredential` lives per (shim, user) pair and is only mutated by
//! the token lifecycle. `NormalizedDataPoint` sequences are ephemeral output and are
//! never cached here.

mod credential;
mod data_point;
mod request;
mod response;
mod window;

pub use credential::{AccessCredential, CredentialKey};
pub use data_point::{
    MappedDataPoints, MeasureUnit, MeasureValue, Modality, NormalizedDataPoint, Provenance,
    TimeFrame,
};
pub use request::ShimDataRequest;
pub use response::{AuthorizationRedirect, FetchOutcome, ResponseBody, ShimDataResponse};
pub use window::{epoch_nanos, TimeWindow};
