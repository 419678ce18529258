//! Relay Config - 통합 설정
//!
//! 글로벌 + 프로젝트 JSON 파일을 병합한 뒤 환경 변수로 덮어쓴다.

use crate::storage::JsonStore;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 설정 파일명
pub const RELAY_CONFIG_FILE: &str = "config.json";

/// Executor API 키 환경 변수
pub const ENV_API_KEY: &str = "OPENSERV_API_KEY";
/// Workspace ID 환경 변수
pub const ENV_WORKSPACE_ID: &str = "WORKSPACE_ID";
/// 담당 Agent ID 환경 변수
pub const ENV_AGENT_ID: &str = "AGENT_ID";
/// Executor API 주소 환경 변수
pub const ENV_API_URL: &str = "OPENSERV_API_URL";

/// 기본 Executor API 주소
pub const DEFAULT_BASE_URL: &str = "https://api.openserv.ai";

// ============================================================================
// Relay Config (통합)
// ============================================================================

/// Task Relay 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayConfig {
    /// Executor 연결 설정
    #[serde(default)]
    pub executor: ExecutorSettings,

    /// 추적 (polling) 설정
    #[serde(default)]
    pub tracking: TrackingSettings,
}

impl RelayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Load / Save
    // ========================================================================

    /// 글로벌 + 프로젝트 병합 로드 후 환경 변수 적용
    pub fn load() -> Result<Self> {
        let mut config = Self::new();

        // 1. 글로벌 설정
        if let Ok(global) = JsonStore::global() {
            if let Some(global_config) = global.load_optional::<RelayConfig>(RELAY_CONFIG_FILE)? {
                config.merge(global_config);
            }
        }

        // 2. 프로젝트 설정
        if let Ok(project) = JsonStore::current_project() {
            if let Some(project_config) =
                project.load_optional::<RelayConfig>(RELAY_CONFIG_FILE)?
            {
                config.merge(project_config);
            }
        }

        // 3. 환경 변수
        config.apply_env_with(|key| std::env::var(key).ok())?;

        Ok(config)
    }

    /// 지정한 저장소에서만 로드 (환경 변수 미적용)
    pub fn load_from(store: &JsonStore) -> Result<Self> {
        Ok(store
            .load_optional::<RelayConfig>(RELAY_CONFIG_FILE)?
            .unwrap_or_default())
    }

    /// 다른 설정을 덮어쓰기 병합 (기본값이 아닌 항목만)
    pub fn merge(&mut self, other: RelayConfig) {
        self.executor.merge(other.executor);
        self.tracking.merge(other.tracking);
    }

    /// 환경 변수 적용. lookup 은 테스트에서 교체 가능.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(ENV_API_KEY) {
            self.executor.api_key = Some(key.trim().to_string());
        }
        if let Some(url) = non_empty(ENV_API_URL) {
            self.executor.base_url = url.trim().to_string();
        }
        if let Some(raw) = non_empty(ENV_WORKSPACE_ID) {
            self.executor.workspace_id = Some(parse_id(ENV_WORKSPACE_ID, &raw)?);
        }
        if let Some(raw) = non_empty(ENV_AGENT_ID) {
            self.executor.agent_id = Some(parse_id(ENV_AGENT_ID, &raw)?);
        }
        Ok(())
    }

    /// 필수 항목 검증. 누락된 항목을 한 번에 모두 보고한다.
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.executor.api_key.as_deref().map_or(true, str::is_empty) {
            missing.push(ENV_API_KEY.to_string());
        }
        if self.executor.workspace_id.is_none() {
            missing.push(ENV_WORKSPACE_ID.to_string());
        }
        if self.executor.agent_id.is_none() {
            missing.push(ENV_AGENT_ID.to_string());
        }
        if !missing.is_empty() {
            return Err(Error::MissingEnv(missing));
        }

        if self.tracking.poll_interval_secs == 0 {
            return Err(Error::Config("pollIntervalSecs must be greater than 0".into()));
        }
        if self.tracking.timeout_secs < self.tracking.poll_interval_secs {
            return Err(Error::Config(
                "timeoutSecs must not be shorter than pollIntervalSecs".into(),
            ));
        }
        Ok(())
    }
}

fn parse_id(key: &str, raw: &str) -> Result<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{} must be a numeric id, got '{}'", key, raw)))
}

// ============================================================================
// Executor Settings
// ============================================================================

/// Executor 연결 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutorSettings {
    /// API 주소
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API 키
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// 작업을 생성할 workspace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_id: Option<u64>,

    /// 작업을 맡을 agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<u64>,

    /// HTTP 요청 타임아웃 (초)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            workspace_id: None,
            agent_id: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ExecutorSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn merge(&mut self, other: ExecutorSettings) {
        if other.base_url != default_base_url() {
            self.base_url = other.base_url;
        }
        if other.request_timeout_secs != default_request_timeout() {
            self.request_timeout_secs = other.request_timeout_secs;
        }
        if other.api_key.is_some() {
            self.api_key = other.api_key;
        }
        if other.workspace_id.is_some() {
            self.workspace_id = other.workspace_id;
        }
        if other.agent_id.is_some() {
            self.agent_id = other.agent_id;
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

// ============================================================================
// Tracking Settings
// ============================================================================

/// 작업 완료 추적 설정
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingSettings {
    /// 전체 대기 예산 (초)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// 상태 조회 간격 (초)
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl TrackingSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    fn merge(&mut self, other: TrackingSettings) {
        if other.timeout_secs != default_timeout_secs() {
            self.timeout_secs = other.timeout_secs;
        }
        if other.poll_interval_secs != default_poll_interval_secs() {
            self.poll_interval_secs = other.poll_interval_secs;
        }
    }
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_poll_interval_secs() -> u64 {
    5
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RelayConfig::default();
        assert_eq!(config.executor.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.tracking.timeout(), Duration::from_secs(120));
        assert_eq!(config.tracking.poll_interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = RelayConfig::default();
        config
            .apply_env_with(env(&[
                (ENV_API_KEY, " secret "),
                (ENV_WORKSPACE_ID, "12"),
                (ENV_AGENT_ID, "34"),
                (ENV_API_URL, "http://localhost:9000"),
            ]))
            .unwrap();

        assert_eq!(config.executor.api_key.as_deref(), Some("secret"));
        assert_eq!(config.executor.workspace_id, Some(12));
        assert_eq!(config.executor.agent_id, Some(34));
        assert_eq!(config.executor.base_url, "http://localhost:9000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_non_numeric_workspace() {
        let mut config = RelayConfig::default();
        let result = config.apply_env_with(env(&[(ENV_WORKSPACE_ID, "abc")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_reports_all_missing() {
        let config = RelayConfig::default();
        match config.validate() {
            Err(Error::MissingEnv(missing)) => {
                assert_eq!(missing, vec![ENV_API_KEY, ENV_WORKSPACE_ID, ENV_AGENT_ID]);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_validate_tracking_bounds() {
        let mut config = RelayConfig::default();
        config
            .apply_env_with(env(&[
                (ENV_API_KEY, "k"),
                (ENV_WORKSPACE_ID, "1"),
                (ENV_AGENT_ID, "2"),
            ]))
            .unwrap();
        config.tracking.poll_interval_secs = 0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_from_store() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(RELAY_CONFIG_FILE),
            r#"{"executor":{"workspaceId":5,"agentId":6},"tracking":{"timeoutSecs":60}}"#,
        )
        .unwrap();

        let config = RelayConfig::load_from(&JsonStore::new(dir.path())).unwrap();
        assert_eq!(config.executor.workspace_id, Some(5));
        assert_eq!(config.executor.agent_id, Some(6));
        assert_eq!(config.executor.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.tracking.timeout_secs, 60);
        assert_eq!(config.tracking.poll_interval_secs, 5);
    }

    #[test]
    fn test_project_file_keeps_global_values() {
        let global_dir = tempfile::tempdir().unwrap();
        std::fs::write(
            global_dir.path().join(RELAY_CONFIG_FILE),
            r#"{"executor":{"baseUrl":"http://staging:9000","requestTimeoutSecs":60},
                "tracking":{"timeoutSecs":300,"pollIntervalSecs":10}}"#,
        )
        .unwrap();
        let project_dir = tempfile::tempdir().unwrap();
        std::fs::write(
            project_dir.path().join(RELAY_CONFIG_FILE),
            r#"{"executor":{"agentId":7},"tracking":{"pollIntervalSecs":15}}"#,
        )
        .unwrap();

        let mut config = RelayConfig::load_from(&JsonStore::new(global_dir.path())).unwrap();
        config.merge(RelayConfig::load_from(&JsonStore::new(project_dir.path())).unwrap());

        assert_eq!(config.executor.base_url, "http://staging:9000");
        assert_eq!(config.executor.request_timeout_secs, 60);
        assert_eq!(config.executor.agent_id, Some(7));
        assert_eq!(config.tracking.timeout_secs, 300);
        assert_eq!(config.tracking.poll_interval_secs, 15);
    }

    #[test]
    fn test_merge_keeps_existing_ids() {
        let mut base = RelayConfig::default();
        base.executor.workspace_id = Some(1);
        base.executor.api_key = Some("global".into());

        let mut project = RelayConfig::default();
        project.executor.agent_id = Some(9);
        base.merge(project);

        assert_eq!(base.executor.workspace_id, Some(1));
        assert_eq!(base.executor.agent_id, Some(9));
        assert_eq!(base.executor.api_key.as_deref(), Some("global"));
    }
}
