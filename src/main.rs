//! Desk clock and temperature alarm for a Linux single-board computer.
//!
//! One thread per device loop, all borrowing one `AppState`; the supervisor
//! runs on the main thread. Ctrl+C or a long press of the exit button stops
//! everything.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;

use clap::Parser;
use desk_clock::linux::{hardware, LocalClock, RtcOnDemand};
use desk_clock::worker::spawn;
use desk_clock::{
    logger, run_actuator, run_clock, run_display, run_thermometer, AppState, BacklightPulse,
    Button, ButtonRole, Config, Error, LedAlarm, Result, RotaryEncoder, ServoWave, Supervisor,
    ACTUATOR_POLL, BUTTON_TIMEOUT, DISPLAY_REFRESH, INPUT_TIMEOUT, SENSOR_PERIOD, SUPERVISOR_POLL,
};
use log::{error, info, LevelFilter};

#[derive(Parser)]
#[command(name = "desk-clock")]
#[command(about = "Desk clock and temperature alarm controller", long_about = None)]
struct Cli {
    /// TOML file overriding the board defaults
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = logger::init(cli.log_level) {
        eprintln!("Cannot install logger: {err}");
        return ExitCode::FAILURE;
    }
    match inner_main(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn inner_main(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    // Must happen while this is still the only thread.
    let local_clock = LocalClock::detect();

    let state = Arc::new(AppState::new(config.alarm.threshold));
    let handler_state = Arc::clone(&state);
    ctrlc::set_handler(move || {
        info!("Interrupt signal received.");
        handler_state.request_shutdown();
    })
    .map_err(Error::Signal)?;

    let state: &AppState = &state;
    let config = &config;
    let result = thread::scope(|scope| {
        let spawned = spawn_workers(scope, state, config, local_clock);
        if spawned.is_ok() {
            let mut supervisor =
                Supervisor::new(RtcOnDemand::new(config), local_clock, config.alarm.duration());
            supervisor.run(state, SUPERVISOR_POLL);
        }
        // Let every loop drain before the scope joins them.
        state.request_shutdown();
        spawned
    });
    result?;
    info!("Application gracefully stopped.");
    Ok(())
}

fn spawn_workers<'scope>(
    scope: &'scope thread::Scope<'scope, '_>,
    state: &'scope AppState,
    config: &'scope Config,
    local_clock: LocalClock,
) -> Result<()> {
    spawn(scope, "display", move || {
        let mut display = hardware::open_display(&config.display)?;
        run_display(state, &mut display, &local_clock, DISPLAY_REFRESH)
    })?;
    spawn(scope, "mcp9808", move || {
        let mut sensor = hardware::open_thermometer(&config.thermometer)?;
        run_thermometer(state, &mut sensor, SENSOR_PERIOD)
    })?;
    spawn(scope, "pcf8563", move || {
        let mut rtc = hardware::open_rtc(&config.rtc)?;
        run_clock(state, &mut rtc, SENSOR_PERIOD)
    })?;
    spawn(scope, "button", move || {
        let keys = hardware::open_exit_button(&config.button)?;
        Button::new(keys, ButtonRole::Exit).run(state, INPUT_TIMEOUT)
    })?;
    spawn(scope, "rotary_encoder", move || {
        let lines = hardware::open_encoder(&config.encoder)?;
        RotaryEncoder::new(lines).run(state, INPUT_TIMEOUT)
    })?;
    spawn(scope, "rotary_button", move || {
        let switch = hardware::open_rotary_switch(&config.encoder)?;
        Button::new(switch, ButtonRole::Rotary).run(state, BUTTON_TIMEOUT)
    })?;
    spawn(scope, "led", move || {
        let led = hardware::open_led(&config.led)?;
        run_actuator(state, LedAlarm::new(led), ACTUATOR_POLL).map(drop)
    })?;
    spawn(scope, "servo", move || {
        let servo = hardware::open_servo(&config.servo)?;
        run_actuator(state, ServoWave::new(servo), ACTUATOR_POLL).map(drop)
    })?;
    spawn(scope, "backlight", move || {
        let backlight = hardware::open_backlight(&config.backlight)?;
        run_actuator(state, BacklightPulse::new(backlight), ACTUATOR_POLL).map(drop)
    })?;
    Ok(())
}
