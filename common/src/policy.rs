use crate::{
    config::Thresholds,
    types::{TelemetryField, TelemetryRecord},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyAction {
    SoundAlarm { duration_ms: u64 },
    Report(TelemetryRecord),
    Delay(u64),
}

pub fn sound_rule(sound: u16, thresholds: &Thresholds) -> Vec<PolicyAction> {
    let mut actions = Vec::new();

    if sound > thresholds.sound_threshold {
        actions.push(PolicyAction::SoundAlarm {
            duration_ms: thresholds.buzzer_hold_ms,
        });
        actions.push(PolicyAction::Report(TelemetryRecord::new(
            TelemetryField::Sound,
            i32::from(sound),
        )));
    }

    actions.push(PolicyAction::Delay(thresholds.rule_settle_ms));
    actions
}

/// The band is inclusive on both ends.
pub fn temperature_band_rule(temp_c: i32, thresholds: &Thresholds) -> Vec<PolicyAction> {
    let mut actions = Vec::new();

    if temp_c < thresholds.temp_low_c || temp_c > thresholds.temp_high_c {
        actions.push(PolicyAction::Report(TelemetryRecord::new(
            TelemetryField::TemperatureOutOfBand,
            temp_c,
        )));
    }

    actions.push(PolicyAction::Delay(thresholds.rule_settle_ms));
    actions
}

/// Interval tick keyed on whole seconds of uptime.
///
/// Fires once per interval boundary crossed, so a fast loop doesn't repeat
/// within the boundary second and a slow loop can't step over a boundary.
/// The first poll only sets the baseline unless it lands exactly on a
/// boundary past zero.
#[derive(Debug, Clone)]
pub struct PeriodicSchedule {
    interval_secs: u64,
    last_boundary: Option<u64>,
}

impl PeriodicSchedule {
    pub fn new(interval_secs: u64) -> Self {
        Self {
            interval_secs: interval_secs.max(1),
            last_boundary: None,
        }
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
    }

    pub fn is_due(&self, uptime_secs: u64) -> bool {
        let boundary = uptime_secs / self.interval_secs;
        match self.last_boundary {
            Some(last) => boundary > last,
            None => boundary > 0 && uptime_secs % self.interval_secs == 0,
        }
    }

    pub fn poll(&mut self, uptime_secs: u64) -> bool {
        let due = self.is_due(uptime_secs);
        if due || self.last_boundary.is_none() {
            self.last_boundary = Some(uptime_secs / self.interval_secs);
        }
        due
    }

    pub fn rule(
        &mut self,
        uptime_secs: u64,
        temp_c: i32,
        thresholds: &Thresholds,
    ) -> Vec<PolicyAction> {
        let mut actions = Vec::new();

        if self.poll(uptime_secs) {
            actions.push(PolicyAction::Report(TelemetryRecord::new(
                TelemetryField::PeriodicTemperature,
                temp_c,
            )));
        }

        actions.push(PolicyAction::Delay(thresholds.rule_settle_ms));
        actions
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn reports(actions: &[PolicyAction]) -> Vec<TelemetryRecord> {
        actions
            .iter()
            .filter_map(|action| match action {
                PolicyAction::Report(record) => Some(*record),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn loud_sound_alarms_and_reports() {
        let thresholds = Thresholds::default();
        let actions = sound_rule(751, &thresholds);

        assert_eq!(
            actions,
            vec![
                PolicyAction::SoundAlarm { duration_ms: 1_000 },
                PolicyAction::Report(TelemetryRecord::new(TelemetryField::Sound, 751)),
                PolicyAction::Delay(500),
            ]
        );
    }

    #[test]
    fn sound_at_threshold_is_quiet() {
        let actions = sound_rule(750, &Thresholds::default());
        assert_eq!(actions, vec![PolicyAction::Delay(500)]);
    }

    #[test]
    fn band_is_inclusive() {
        let thresholds = Thresholds::default();

        assert_eq!(
            reports(&temperature_band_rule(51, &thresholds)),
            vec![TelemetryRecord::new(TelemetryField::TemperatureOutOfBand, 51)]
        );
        assert!(reports(&temperature_band_rule(50, &thresholds)).is_empty());
        assert!(reports(&temperature_band_rule(0, &thresholds)).is_empty());
        assert_eq!(
            reports(&temperature_band_rule(-1, &thresholds)),
            vec![TelemetryRecord::new(TelemetryField::TemperatureOutOfBand, -1)]
        );
    }

    #[test]
    fn periodic_fires_once_per_boundary() {
        let mut schedule = PeriodicSchedule::new(600);

        assert!(!schedule.poll(0));
        assert!(!schedule.poll(599));
        assert!(schedule.poll(600));
        assert!(!schedule.poll(1199));
        assert!(schedule.poll(1200));
        assert!(!schedule.poll(1200));
    }

    #[test]
    fn fresh_schedule_waits_for_first_interval() {
        let thresholds = Thresholds::default();

        let mut after_slow_connect = PeriodicSchedule::new(600);
        assert!(!after_slow_connect.poll(37));
        assert!(!after_slow_connect.poll(599));
        assert!(after_slow_connect.poll(600));

        let mut schedule = PeriodicSchedule::new(600);
        assert!(reports(&schedule.rule(1199, 22, &thresholds)).is_empty());
        assert_eq!(
            reports(&schedule.rule(1200, 22, &thresholds)),
            vec![TelemetryRecord::new(TelemetryField::PeriodicTemperature, 22)]
        );
    }

    #[test]
    fn periodic_catches_up_after_slow_cycle() {
        let mut schedule = PeriodicSchedule::new(600);
        assert!(!schedule.poll(599));

        // A cycle that stalls across the boundary still fires once.
        assert!(schedule.poll(603));
        assert!(!schedule.poll(610));
    }

    #[test]
    fn periodic_rule_reports_temperature() {
        let thresholds = Thresholds::default();
        let mut schedule = PeriodicSchedule::new(thresholds.periodic_interval_secs);
        assert!(schedule.poll(600));

        assert!(reports(&schedule.rule(1199, 22, &thresholds)).is_empty());
        assert_eq!(
            reports(&schedule.rule(1200, 22, &thresholds)),
            vec![TelemetryRecord::new(TelemetryField::PeriodicTemperature, 22)]
        );
    }
}
