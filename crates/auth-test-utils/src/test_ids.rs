//! Fixed test IDs for deterministic tests
//!
//! Using fixed values prevents flaky tests caused by random data.

use uuid::Uuid;

// User IDs (100-199)
pub const TEST_USER_ALICE: Uuid = Uuid::from_u128(100);
pub const TEST_USER_BOB: Uuid = Uuid::from_u128(101);

// Token IDs (200-299)
pub const TEST_JTI_1: Uuid = Uuid::from_u128(200);
pub const TEST_JTI_2: Uuid = Uuid::from_u128(201);

// Team IDs (1000-1099)
pub const TEST_TEAM_MISSING: Uuid = Uuid::from_u128(1000);

// Credentials
pub const TEST_EMAIL_ALICE: &str = "alice@example.com";
pub const TEST_EMAIL_BOB: &str = "bob@example.com";
pub const TEST_PASSWORD: &str = "test-password-do-not-use-in-production";
