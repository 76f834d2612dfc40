// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations: backend transport, image loading and payload files.

pub mod backend;
pub mod media;
pub mod serialization;
