//! # relay-foundation
//!
//! Foundation layer for Task Relay:
//! - Error: 공통 에러 타입
//! - Config: 통합 설정 (RelayConfig - executor 연결, 추적 예산)
//! - Storage: JsonStore (설정 파일)

pub mod config;
pub mod error;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{
    ExecutorSettings, RelayConfig, TrackingSettings, DEFAULT_BASE_URL, ENV_AGENT_ID,
    ENV_API_KEY, ENV_API_URL, ENV_WORKSPACE_ID, RELAY_CONFIG_FILE,
};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::JsonStore;
