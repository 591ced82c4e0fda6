//! 诊断策略
//!
//! 软错误（uniform 找不到、GPU 错误作用域捕获到的验证错误）的处理方式
//! 在启动时选定一次：
//!
//! - `FailFast`：错误向上传播，帧循环随之结束
//! - `LogAndContinue`：记录 warn 日志，跳过这一次操作后继续运行

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use super::error::{FlightHeadingError, Result};

/// 软错误处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticPolicy {
    FailFast,
    LogAndContinue,
}

impl Default for DiagnosticPolicy {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            DiagnosticPolicy::FailFast
        } else {
            DiagnosticPolicy::LogAndContinue
        }
    }
}

/// 诊断上报器
#[derive(Debug, Clone, Copy)]
pub struct Diagnostics {
    policy: DiagnosticPolicy,
    check_gpu_errors: bool,
}

impl Diagnostics {
    pub fn new(policy: DiagnosticPolicy, check_gpu_errors: bool) -> Self {
        Self { policy, check_gpu_errors }
    }

    pub fn policy(&self) -> DiagnosticPolicy {
        self.policy
    }

    /// 是否需要为 GPU 调用建立错误作用域
    pub fn check_gpu_errors(&self) -> bool {
        self.check_gpu_errors
    }

    /// 上报一个软错误
    ///
    /// 返回 `Ok(())` 表示调用方应跳过当前操作并继续；
    /// fail-fast 策略下返回错误本身。
    pub fn report(&self, err: impl Into<FlightHeadingError>) -> Result<()> {
        let err = err.into();
        match self.policy {
            DiagnosticPolicy::FailFast => {
                error!("{}", err);
                Err(err)
            }
            DiagnosticPolicy::LogAndContinue => {
                warn!("{}", err);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::UniformError;

    #[test]
    fn test_fail_fast_propagates() {
        let diagnostics = Diagnostics::new(DiagnosticPolicy::FailFast, true);
        let result = diagnostics.report(UniformError::NotFound("rectTexture".into()));
        assert!(matches!(result, Err(FlightHeadingError::Uniform(_))));
    }

    #[test]
    fn test_log_and_continue_skips() {
        let diagnostics = Diagnostics::new(DiagnosticPolicy::LogAndContinue, false);
        let result = diagnostics.report(UniformError::NotFound("rectTexture".into()));
        assert!(result.is_ok());
        assert!(!diagnostics.check_gpu_errors());
    }

    #[test]
    fn test_policy_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: DiagnosticPolicy,
        }

        let w: Wrapper = toml::from_str("policy = \"log_and_continue\"").unwrap();
        assert_eq!(w.policy, DiagnosticPolicy::LogAndContinue);
        let w: Wrapper = toml::from_str("policy = \"fail_fast\"").unwrap();
        assert_eq!(w.policy, DiagnosticPolicy::FailFast);
    }
}
