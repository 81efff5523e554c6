//! Host tool availability checks.

use crate::config::{Config, ContainerStrategy};

use super::types::CheckResult;

/// Check the tools the configured pipeline will invoke.
pub fn check_host_tools(config: &Config) -> Vec<CheckResult> {
    let programs = &config.programs;
    let mut tools = vec![
        (programs.packer.as_str(), "Required to pack the staging directory"),
        (programs.zip.as_str(), "Required to build the runtime container"),
        (programs.installer.as_str(), "Required to install the runtime container"),
    ];
    if config.strategy == ContainerStrategy::Unpack {
        tools.push((programs.unzip.as_str(), "Required to unpack the base container"));
    }

    tools
        .into_iter()
        .map(|(tool, purpose)| check_tool_exists(tool, purpose))
        .collect()
}

/// Check the base runtime container is present.
pub fn check_base_runtime(config: &Config) -> CheckResult {
    let base = &config.base_runtime;
    if base.is_file() {
        CheckResult::pass_with("base runtime", &base.display().to_string())
    } else {
        CheckResult::fail(
            "base runtime",
            &format!("Not found at {} (set HPKG_BASE_RUNTIME)", base.display()),
        )
    }
}

/// Check if a tool exists in PATH (or at the given path).
fn check_tool_exists(tool: &str, purpose: &str) -> CheckResult {
    match which::which(tool) {
        Ok(path) => CheckResult::pass_with(tool, &path.display().to_string()),
        Err(_) => CheckResult::fail(tool, &format!("Not found in PATH. {}", purpose)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preflight::types::CheckStatus;

    #[test]
    fn test_present_and_missing_tools() {
        let mut config = Config::default();
        config.programs.packer = "sh".to_string();
        config.programs.zip = "nonexistent_program_12345".to_string();

        let results = check_host_tools(&config);
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].status, CheckStatus::Pass);
        assert_eq!(results[1].status, CheckStatus::Fail);
    }

    #[test]
    fn test_copy_strategy_skips_unzip() {
        let config = Config {
            strategy: ContainerStrategy::Copy,
            ..Config::default()
        };
        assert_eq!(check_host_tools(&config).len(), 3);
    }

    #[test]
    fn test_missing_base_runtime_fails() {
        let config = Config {
            base_runtime: "/nonexistent/base.hap".into(),
            ..Config::default()
        };
        assert_eq!(check_base_runtime(&config).status, CheckStatus::Fail);
    }
}
