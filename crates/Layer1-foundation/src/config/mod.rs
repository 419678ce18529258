//! Config - 통합 설정 관리
//!
//! - `relay.rs` - RelayConfig 통합 설정 (executor 연결, 추적 예산)

mod relay;

pub use relay::{
    ExecutorSettings, RelayConfig, TrackingSettings, DEFAULT_BASE_URL, ENV_AGENT_ID,
    ENV_API_KEY, ENV_API_URL, ENV_WORKSPACE_ID, RELAY_CONFIG_FILE,
};
