use std::sync::Arc;

use irrisync_mock::run;
use irrisync_mock::settings::Settings;

fn settings(initial_humidity: f32, dry_rate_per_min: f32, clock_start_ms: u32) -> Arc<Settings> {
    let source = format!(
        r#"
        [logger]
        level = "debug"

        [simulation]
        cycle_interval_ms = 1000
        time_scale = 1000.0
        max_cycles = 120
        clock_start_ms = {clock_start_ms}
        start_day_fraction = 0.5
        initial_humidity = {initial_humidity:.1}
        dry_rate_per_min = {dry_rate_per_min:.1}
        watering_rate_per_s = 6.0
        diffusion_ms = 2000
        noise = 0.0
        temp_fault_rate = 0.0
        dht_model = "Dht22"
        relay_active_low = true
        page_interval_ms = 3000
        echo_stdout = false
        seed = 42
        "#
    );

    Arc::new(Settings::from_toml(&source).unwrap())
}

#[tokio::test]
async fn test_dry_soil_gets_watered() {
    let report = run(&settings(22.0, 0.0, 0)).await.unwrap();

    assert_eq!(report.cycles, 120);
    assert!(report.waterings >= 2, "{report:?}");
    assert!(report.final_humidity > 30.0, "{report:?}");
    assert_eq!(report.temperature_faults, 0);
}

#[tokio::test]
async fn test_wet_soil_is_left_alone() {
    let report = run(&settings(70.0, 1.0, 0)).await.unwrap();

    assert_eq!(report.waterings, 0);
    assert!(report.final_humidity < 70.0);
}

#[tokio::test]
async fn test_clock_wrap_does_not_stall_watering() {
    let report = run(&settings(22.0, 0.0, u32::MAX - 30_000)).await.unwrap();

    assert!(report.waterings >= 2, "{report:?}");
}

#[tokio::test]
async fn test_display_repaints_as_pages_rotate() {
    let report = run(&settings(70.0, 1.0, 0)).await.unwrap();

    // 120 one-second cycles with a 3 s page interval.
    assert!(report.repaints >= 30, "{report:?}");
}
