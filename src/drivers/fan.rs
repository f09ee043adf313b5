//! Ventilation fan driver.
//!
//! Speed is commanded in percent and mapped to an 8-bit PWM duty.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanState {
    Stopped,
    Running { percent: u8 },
}

pub struct FanDriver {
    state: FanState,
    pwm_duty: u8,
}

impl Default for FanDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl FanDriver {
    pub fn new() -> Self {
        Self {
            state: FanState::Stopped,
            pwm_duty: 0,
        }
    }

    pub fn set(&mut self, percent: u8) {
        let percent = percent.min(100);
        if percent == 0 {
            self.stop();
            return;
        }
        self.pwm_duty = percent_to_duty(percent);
        self.state = FanState::Running { percent };
    }

    pub fn stop(&mut self) {
        self.pwm_duty = 0;
        self.state = FanState::Stopped;
    }

    pub fn state(&self) -> FanState {
        self.state
    }

    pub fn speed_percent(&self) -> u8 {
        match self.state {
            FanState::Stopped => 0,
            FanState::Running { percent } => percent,
        }
    }

    /// Raw PWM duty (0-255).
    pub fn pwm_duty(&self) -> u8 {
        self.pwm_duty
    }
}

fn percent_to_duty(percent: u8) -> u8 {
    ((percent as u16) * 255 / 100) as u8
}
