//! Configuration defaults, overrides and validation.

use std::io::Write as _;

use desk_clock::{Config, Error, ErrorClass};
use embassy_time::Duration;

#[test]
fn defaults_describe_the_reference_board() {
    let config = Config::default();
    assert_eq!(config.thermometer.address, 0x18);
    assert_eq!(config.rtc.address, 0x51);
    assert_eq!(config.thermometer.i2c_bus, "/dev/i2c-1");
    assert_eq!(config.encoder.a_line, 16);
    assert_eq!(config.encoder.b_line, 20);
    assert_eq!(config.encoder.switch_line, 21);
    assert_eq!(config.led.name, "lwsw-led");
    assert_eq!(config.alarm.threshold, 28);
    assert_eq!(config.alarm.duration(), Duration::from_secs(20));
    config.validate().unwrap();
}

#[test]
fn empty_file_is_the_default() {
    assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
}

#[test]
fn partial_file_overrides_only_its_keys() {
    let config = Config::from_toml_str(
        r#"
        [alarm]
        threshold = 31

        [rtc]
        i2c_bus = "/dev/i2c-3"
        "#,
    )
    .unwrap();

    assert_eq!(config.alarm.threshold, 31);
    assert_eq!(config.alarm.duration_secs, 20);
    assert_eq!(config.rtc.i2c_bus, "/dev/i2c-3");
    assert_eq!(config.rtc.address, 0x51);
    assert_eq!(config.thermometer, Config::default().thermometer);
}

#[test]
fn unknown_keys_are_rejected() {
    let err = Config::from_toml_str("[alarm]\nthreshhold = 30\n").unwrap_err();
    assert!(matches!(err, Error::ConfigParse(_)));
    assert_eq!(err.class(), ErrorClass::Config);
}

#[test]
fn out_of_range_values_are_rejected() {
    let cases = [
        ("[alarm]\nthreshold = 61\n", "alarm.threshold"),
        ("[alarm]\nduration_secs = 0\n", "alarm.duration_secs"),
        ("[servo]\nmin_angle = 10.0\nmax_angle = 10.0\n", "servo.min_angle"),
        ("[display]\nspeed_hz = 0\n", "display.speed_hz"),
        ("[led]\nname = \"\"\n", "led.name"),
    ];
    for (text, key) in cases {
        match Config::from_toml_str(text) {
            Err(Error::Config(message)) => assert!(message.contains(key), "{message}"),
            other => panic!("{key}: expected a config error, got {other:?}"),
        }
    }
}

#[test]
fn load_reads_a_file() {
    let path = std::env::temp_dir().join(format!("desk-clock-{}.toml", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "[servo]\nchip = 4").unwrap();
    drop(file);

    let config = Config::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(config.servo.chip, 4);

    let missing = Config::load(&path).unwrap_err();
    assert!(matches!(missing, Error::Io { .. }));
}

#[test]
fn servo_range_must_cover_the_alarm_swing() {
    for text in [
        "[servo]\nmin_angle = -30.0\nmax_angle = 30.0\n",
        "[servo]\nmin_angle = 10.0\nmax_angle = 80.0\n",
        "[servo]\nmin_angle = -90.0\nmax_angle = 44.5\n",
    ] {
        match Config::from_toml_str(text) {
            Err(Error::Config(message)) => assert!(message.contains("servo range"), "{message}"),
            other => panic!("{text:?}: expected a config error, got {other:?}"),
        }
    }

    let wide = Config::from_toml_str("[servo]\nmin_angle = -90.0\nmax_angle = 90.0\n").unwrap();
    assert!((wide.servo.max_angle - 90.0).abs() < f32::EPSILON);
}
