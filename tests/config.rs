//! Configuration loading tests.

use devrig::{ConfigError, FailurePolicy, JobSchedule, ManagerConfig};
use std::io::Write;
use std::time::Duration;

#[test]
fn empty_document_yields_defaults() -> Result<(), ConfigError> {
    let config = ManagerConfig::from_toml_str("")?;
    assert_eq!(config, ManagerConfig::default());
    assert_eq!(config.schedule, JobSchedule::default());
    Ok(())
}

#[test]
fn partial_policy_keeps_other_defaults() -> Result<(), ConfigError> {
    let config = ManagerConfig::from_toml_str(
        r#"
        [policy]
        catch_open_failures = true
        catch_close_failures = false
        "#,
    )?;
    assert_eq!(
        config.policy,
        FailurePolicy {
            catch_open_failures: true,
            catch_update_failures: true,
            catch_close_failures: false,
        }
    );
    Ok(())
}

#[test]
fn full_schedule_parses() -> Result<(), ConfigError> {
    let config = ManagerConfig::from_toml_str(
        r#"
        [schedule]
        period_secs = 0.25
        phase = 100
        job_class = "input_processing"
        "#,
    )?;
    assert_eq!(config.schedule.period()?, Duration::from_millis(250));
    assert_eq!(config.schedule.phase, 100);
    assert_eq!(config.schedule.job_class, "input_processing");
    Ok(())
}

#[test]
fn non_positive_period_is_rejected() {
    for period in ["0.0", "-1.0", "nan"] {
        let text = format!("[schedule]\nperiod_secs = {period}\n");
        let err = ManagerConfig::from_toml_str(&text).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "period {period}: {err}");
    }
}

#[test]
fn period_too_large_for_duration_is_rejected() {
    let err = ManagerConfig::from_toml_str("[schedule]\nperiod_secs = 1e20\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
}

#[test]
fn unvalidated_schedule_reports_bad_period_instead_of_panicking() {
    let config = ManagerConfig {
        schedule: JobSchedule {
            period_secs: 1e20,
            ..JobSchedule::default()
        },
        ..ManagerConfig::default()
    };
    let mgr = devrig::DeviceManager::with_config(config);
    assert!(matches!(mgr.schedule().period(), Err(ConfigError::Invalid(_))));
}

#[test]
fn blank_job_class_is_rejected() {
    let err = ManagerConfig::from_toml_str("[schedule]\njob_class = \"  \"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn wrong_type_is_a_parse_error() {
    let err = ManagerConfig::from_toml_str("[policy]\ncatch_open_failures = \"yes\"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn load_reads_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "[policy]\ncatch_update_failures = false")?;

    let config = ManagerConfig::load(file.path())?;
    assert!(!config.policy.catch_update_failures);
    Ok(())
}

#[test]
fn load_missing_file_reports_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("missing.toml");

    let err = ManagerConfig::load(&path).unwrap_err();
    match err {
        ConfigError::Io { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected Io error, got {other:?}"),
    }
}
