//! Property-based tests for deadline enforcement and configuration.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use pipeguard_watchdog::config::{MAX_TIMEOUT_MS, MIN_TIMEOUT_MS};
use pipeguard_watchdog::prelude::*;
use proptest::prelude::*;
use tokio::time::Instant;

fn paused_runtime() -> Result<tokio::runtime::Runtime, TestCaseError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .map_err(|e| TestCaseError::fail(e.to_string()))
}

fn fail(e: WatchdogError) -> TestCaseError {
    TestCaseError::fail(e.to_string())
}

fn counting_watchdog(config: WatchdogConfig) -> (Arc<TaskWatchdog>, Arc<AtomicU32>) {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    let handler: Arc<dyn FaultHandler> = Arc::new(move |_: &FatalFault| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (Arc::new(TaskWatchdog::new(config, handler)), calls)
}

fn valid_config() -> impl Strategy<Value = WatchdogConfig> {
    (MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).prop_flat_map(|timeout_ms| {
        (1..timeout_ms).prop_map(move |check_interval_ms| WatchdogConfig {
            timeout_ms,
            check_interval_ms,
        })
    })
}

const TASKS: [TaskId; 3] = [
    TaskId::new("producer"),
    TaskId::new("consumer"),
    TaskId::new("supervisor"),
];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_reset_within_deadline_never_breaches(
        timeout_ms in 10_u32..=10_000,
        task_count in 1_usize..=3,
        gaps_percent in prop::collection::vec(1_u32..=100, 1..50),
    ) {
        let runtime = paused_runtime()?;
        runtime.block_on(async {
            let config = WatchdogConfig::builder()
                .timeout_ms(timeout_ms)
                .check_interval_ms(1)
                .build()
                .map_err(fail)?;
            let (watchdog, calls) = counting_watchdog(config);
            let handles = TASKS[..task_count]
                .iter()
                .map(|task| watchdog.register(*task))
                .collect::<Result<Vec<_>, _>>()
                .map_err(fail)?;
            watchdog.arm().map_err(fail)?;

            for percent in gaps_percent {
                let gap = u64::from(timeout_ms) * u64::from(percent) / 100;
                tokio::time::advance(Duration::from_millis(gap)).await;
                prop_assert_eq!(watchdog.check_at(Instant::now()), None);
                for handle in &handles {
                    handle.reset().map_err(fail)?;
                }
            }

            prop_assert_eq!(watchdog.status(), WatchdogStatus::Armed);
            prop_assert_eq!(calls.load(Ordering::SeqCst), 0);
            Ok::<(), TestCaseError>(())
        })?;
    }

    #[test]
    fn prop_silence_past_deadline_fires_once(
        timeout_ms in 10_u32..=10_000,
        overshoot_ms in 1_u64..1_000,
        later_checks in 1_usize..20,
    ) {
        let runtime = paused_runtime()?;
        runtime.block_on(async {
            let config = WatchdogConfig::builder()
                .timeout_ms(timeout_ms)
                .check_interval_ms(1)
                .build()
                .map_err(fail)?;
            let (watchdog, calls) = counting_watchdog(config);
            let _handle = watchdog.register(TASKS[1]).map_err(fail)?;
            watchdog.arm().map_err(fail)?;

            let silent_for = Duration::from_millis(u64::from(timeout_ms) + overshoot_ms);
            tokio::time::advance(silent_for).await;
            prop_assert_eq!(
                watchdog.check_at(Instant::now()),
                Some(Breach { task: TASKS[1], silent_for })
            );

            for _ in 0..later_checks {
                tokio::time::advance(config.check_interval()).await;
                prop_assert_eq!(watchdog.check_at(Instant::now()), None);
            }
            prop_assert_eq!(watchdog.status(), WatchdogStatus::Expired);
            prop_assert_eq!(calls.load(Ordering::SeqCst), 1);
            Ok::<(), TestCaseError>(())
        })?;
    }

    #[test]
    fn prop_config_survives_json(config in valid_config()) {
        let json = serde_json::to_string(&config)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let parsed: WatchdogConfig = serde_json::from_str(&json)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(parsed, config);
        prop_assert_eq!(parsed.validate(), Ok(()));
    }
}

#[test]
fn missing_config_fields_take_defaults() -> Result<(), serde_json::Error> {
    let empty: WatchdogConfig = serde_json::from_str("{}")?;
    assert_eq!(empty, WatchdogConfig::default());

    let partial: WatchdogConfig = serde_json::from_str(r#"{"timeout_ms": 2000}"#)?;
    assert_eq!(partial.timeout_ms, 2000);
    assert_eq!(partial.check_interval_ms, 100);
    Ok(())
}
