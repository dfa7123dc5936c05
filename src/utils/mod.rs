// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Utility functions

pub mod colors;
pub mod drill;
pub mod math;
pub mod units;
