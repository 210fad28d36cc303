use serde::{Deserialize, Serialize};

/// Whether per-tick quantities (invulnerability windows, cooldowns) scale with the server's
/// actual tick rate or stay pinned to the vanilla 20 TPS assumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TickScalingMode {
    /// Ticks are converted to wall-clock time using the server's current TPS.
    Scaled,
    /// Ticks are counted at a fixed 20 TPS regardless of the server's actual rate.
    #[default]
    Unscaled,
}

impl TickScalingMode {
    /// Converts a tick count expressed at vanilla (20 TPS) rate into the number of ticks
    /// that should actually elapse at `current_tps`.
    #[must_use]
    pub fn scale_ticks(self, vanilla_ticks: u32, current_tps: f64) -> u32 {
        match self {
            Self::Unscaled => vanilla_ticks,
            Self::Scaled => {
                if current_tps <= 0.0 {
                    return vanilla_ticks;
                }
                let scaled = f64::from(vanilla_ticks) * (20.0 / current_tps);
                scaled.round().max(0.0) as u32
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unscaled_mode_passes_through() {
        assert_eq!(TickScalingMode::Unscaled.scale_ticks(10, 10.0), 10);
    }

    #[test]
    fn scaled_mode_stretches_ticks_on_slow_server() {
        assert_eq!(TickScalingMode::Scaled.scale_ticks(10, 10.0), 20);
    }

    #[test]
    fn scaled_mode_handles_zero_tps_without_panicking() {
        assert_eq!(TickScalingMode::Scaled.scale_ticks(10, 0.0), 10);
    }
}
