// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Record id generation: `<kind>-<unix-ms>-<8 hex chars>`.

use crate::error::AppError;
use crate::time_utils::now_millis;
use ring::rand::{SecureRandom, SystemRandom};

pub const ORDER: &str = "order";
pub const TEST_RIDE: &str = "test-ride";
pub const SERVICE: &str = "service";
pub const MODEL: &str = "model";

/// Generate a new record id for the given kind.
pub fn new_id(kind: &str) -> Result<String, AppError> {
    let mut suffix = [0u8; 4];
    SystemRandom::new()
        .fill(&mut suffix)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG unavailable")))?;
    Ok(format!("{}-{}-{}", kind, now_millis(), hex::encode(suffix)))
}
