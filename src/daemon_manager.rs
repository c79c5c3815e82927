use core::fmt;
use std::sync::Arc;

use tokio::{
    select,
    time::{MissedTickBehavior, interval},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace_span, warn};

use crate::{
    button::ButtonMonitor,
    config_manager::Config,
    dispatcher::Dispatcher,
    errors::DaemonError,
    link::McuLink,
    protocol::{DEVICE_READY, Frame, McuRequest, THERMAL_CODE_OFFSET, shutdown_frame},
    thermal::{FanLevel, ThermalController, Thresholds, celsius},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonState {
    Starting,
    Running,
    ShuttingDown,
    Failed,
}

// What the hosting process has to do once the control loop returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalEffect {
    // A termination signal was received
    Terminated,
    // The power button was pressed and the MCU was told to shut down
    PowerOff,
}

// Answer to a single on demand request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Acknowledged,
    Temperature(i32),
    Data(Frame),
}

pub struct DaemonManager<L: McuLink> {
    config: Arc<Config>,

    dispatcher: Dispatcher<L>,
    thermal: ThermalController,
    button: Option<ButtonMonitor>,

    // Last level the MCU accepted, unknown until the first fan command
    fan_level: Option<FanLevel>,

    state: DaemonState,
}

impl<L: McuLink> DaemonManager<L> {
    pub fn new(config: Arc<Config>, link: L) -> Self {
        let dispatcher = Dispatcher::new(link, config.retries);
        let thermal = ThermalController::new(Thresholds::from(&config.fan));

        let button = config
            .button
            .enabled
            .then(|| ButtonMonitor::new(&config.button.value_path()));

        Self {
            config,

            dispatcher,
            thermal,
            button,

            fan_level: None,

            state: DaemonState::Starting,
        }
    }

    pub fn state(&self) -> DaemonState {
        self.state
    }

    pub fn fan_level(&self) -> Option<FanLevel> {
        self.fan_level
    }

    // Tell the MCU the system is up, the control loop can't run without it
    pub fn start(&mut self) -> Result<(), DaemonError> {
        if let Err(err) = self.dispatcher.send(&DEVICE_READY, false) {
            error!("MCU did not acknowledge the device ready request");
            self.state = DaemonState::Failed;

            return Err(DaemonError::Startup(err));
        }

        info!("Startup complete, going to fan control mode");
        self.state = DaemonState::Running;

        Ok(())
    }

    // Run the control loop until a termination signal or a button press
    pub async fn run(
        &mut self,
        run_token: CancellationToken,
    ) -> Result<TerminalEffect, DaemonError> {
        match self.state {
            DaemonState::Starting => self.start()?,
            DaemonState::Running => {}
            state @ (DaemonState::ShuttingDown | DaemonState::Failed) => {
                return Err(DaemonError::NotRunnable(state));
            }
        }

        let mut fan_timer = interval(self.config.fan.poll_interval());
        fan_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut button_timer = interval(self.config.button.poll_interval());
        button_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let poll_button = self.button.is_some();

        loop {
            select! {
                biased;

                _ = run_token.cancelled() => {
                    info!("Daemon manager: Quitting");

                    return Ok(TerminalEffect::Terminated);
                },
                _ = fan_timer.tick() => {
                    let _guard = trace_span!("fan update").entered();

                    self.fan_cycle();
                },
                _ = button_timer.tick(), if poll_button => {
                    if let Some(effect) = self.button_cycle() {
                        return Ok(effect);
                    }
                }
            }
        }
    }

    // Read the temperature and switch the fan level when needed
    pub fn fan_cycle(&mut self) {
        let Some(temp) = self.thermal.read_temperature(&mut self.dispatcher) else {
            error!("Error reading temperature");
            return;
        };

        let Some(level) = self.thermal.next_fan_level(temp, self.fan_level) else {
            return;
        };

        // Avoid redundant traffic when nothing changes
        if Some(level) == self.fan_level {
            return;
        }

        debug!("Set fan {level:?} at {temp}°C");

        match self.dispatcher.send(&level.frame(), false) {
            Ok(_) => self.fan_level = Some(level),
            Err(err) => error!("Failed to set fan {level:?}: {err}"),
        }
    }

    // Sample the power button, a press starts the shutdown
    pub fn button_cycle(&mut self) -> Option<TerminalEffect> {
        let button = self.button.as_mut()?;

        match button.poll_press() {
            Ok(true) => Some(self.shutdown()),
            Ok(false) => None,
            Err(err) => {
                warn!("Failed to read power button: {err}");
                None
            }
        }
    }

    fn shutdown(&mut self) -> TerminalEffect {
        info!("Power button pressed, shutting down system");
        self.state = DaemonState::ShuttingDown;

        match shutdown_frame(self.config.delay_shutdown) {
            Ok(frame) => {
                if let Err(err) = self.dispatcher.send(&frame, false) {
                    error!("MCU did not accept the shutdown request: {err}");
                }
            }
            Err(err) => error!("Can't build the shutdown request: {err}"),
        }

        TerminalEffect::PowerOff
    }

    // Send a single request outside of the control loop
    pub fn request(&mut self, request: McuRequest) -> Result<Reply, DaemonError> {
        let reply = self
            .dispatcher
            .send(&request.frame(), request.expects_response())?;

        let Some(frame) = reply else {
            return Ok(Reply::Acknowledged);
        };

        if request != McuRequest::Temperature {
            return Ok(Reply::Data(frame));
        }

        let code = frame
            .get(THERMAL_CODE_OFFSET)
            .ok_or(DaemonError::ShortResponse(frame))?;
        let temp = celsius(code).ok_or(DaemonError::InvalidReading(code))?;

        Ok(Reply::Temperature(temp))
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Acknowledged => write!(f, "OK"),
            Self::Temperature(temp) => write!(f, "{temp}"),
            Self::Data(frame) => write!(f, "{frame}"),
        }
    }
}
