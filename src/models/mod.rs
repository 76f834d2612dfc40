// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data models for masking regions and sessions.

pub mod payload;
pub mod region;
pub mod selector;
pub mod session;
