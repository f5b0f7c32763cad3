// Tick engine - One simulated step of every tracked quantity
use crate::application::metrics_store::MetricsStore;
use crate::application::random_source::RandomSource;
use crate::domain::audience::MetricsSnapshot;
use crate::domain::channel::{Trend, relative_change};
use crate::domain::error::{MetricsError, MetricsResult};
use crate::domain::volatility::volatility_for_hour;
use crate::infrastructure::config::{SimulationConfig, TickPolicy};
use chrono::{NaiveDateTime, Timelike};

#[derive(Debug, Clone)]
pub struct TickEngine {
    policy: TickPolicy,
    reset_peak_daily: bool,
}

impl TickEngine {
    pub fn new(policy: TickPolicy, reset_peak_daily: bool) -> Self {
        Self {
            policy,
            reset_peak_daily,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(config.policy.clone(), config.reset_peak_daily)
    }

    /// Advance the store to `now`.
    ///
    /// Draw order: one change per channel, the audience supplement, the
    /// digital change, the rotation gate, then per channel a rotation gate
    /// and (when it passes) a catalog index.
    pub fn tick(
        &self,
        store: &mut MetricsStore,
        now: NaiveDateTime,
        rng: &mut dyn RandomSource,
    ) -> MetricsResult<MetricsSnapshot> {
        if let Some(last) = store.history.last_timestamp() {
            if now <= last {
                return Err(MetricsError::StaleTimestamp { now, last });
            }
        }

        let policy = &self.policy;
        let volatility = volatility_for_hour(now.hour());
        let new_day = self.reset_peak_daily
            && store
                .last_tick
                .is_some_and(|last| last.date() != now.date());

        let mut channel_total: u64 = 0;
        for channel in &mut store.channels {
            let before = channel.viewers;
            let spread = (before as f64 * volatility) as i64;
            let change = rng.int_between(-spread, spread);

            let floor = (before as f64 * policy.floor_ratio) as u64;
            let moved = (before as i64).saturating_add(change).max(0) as u64;
            let viewers = moved.max(floor);

            channel.viewers = viewers;
            channel.relative_change = relative_change(change, before);
            channel.trend = Trend::classify(change, channel.relative_change);
            channel.peak_today = if new_day {
                viewers
            } else {
                channel.peak_today.max(viewers)
            };

            channel_total = channel_total.saturating_add(viewers);
        }

        let supplement = rng
            .int_between(policy.supplement_min as i64, policy.supplement_max as i64)
            .max(0) as u64;
        store.aggregate.total_viewers = channel_total.saturating_add(supplement);

        let digital_change = rng.int_between(policy.digital_change_min, policy.digital_change_max);
        store.aggregate.digital_traffic = (store.aggregate.digital_traffic as i64)
            .saturating_add(digital_change)
            .max(policy.digital_floor as i64) as u64;

        if rng.chance(policy.rotation_probability) {
            for (channel, catalog) in store.channels.iter_mut().zip(&store.catalogs) {
                if rng.chance(policy.channel_rotation_probability) {
                    let program = &catalog[rng.index(catalog.len())];
                    if *program != channel.program {
                        tracing::debug!("{} now airing {}", channel.name, program);
                    }
                    channel.program = program.clone();
                }
            }
        }

        let row = store.current_row();
        store.history.push(now, &row)?;
        store.last_tick = Some(now);

        tracing::debug!(
            "Tick at {} (volatility {:.2}): total {} digital {}",
            now,
            volatility,
            store.aggregate.total_viewers,
            store.aggregate.digital_traffic
        );

        Ok(store.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::random_source::SeededRandom;
    use crate::application::random_source::scripted::ScriptedRandom;
    use crate::infrastructure::config::fixtures::{channel, simulation};
    use chrono::{Duration, NaiveDate};

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn setup(channels: Vec<crate::infrastructure::config::ChannelBaseline>) -> (TickEngine, MetricsStore) {
        let config = simulation(channels);
        let store = MetricsStore::initialize(&config, at(9, 0), &mut ScriptedRandom::new()).unwrap();
        (TickEngine::from_config(&config), store)
    }

    /// Records the bounds of every integer draw and answers zero.
    #[derive(Default)]
    struct RecordingRandom {
        ranges: Vec<(i64, i64)>,
    }

    impl RandomSource for RecordingRandom {
        fn int_between(&mut self, low: i64, high: i64) -> i64 {
            self.ranges.push((low, high));
            0
        }

        fn chance(&mut self, _probability: f64) -> bool {
            false
        }

        fn index(&mut self, _len: usize) -> usize {
            0
        }
    }

    #[test]
    fn test_forced_gain() {
        let (engine, mut store) = setup(vec![channel("France 2", 1_000_000, &["Journal"])]);
        let mut rng = ScriptedRandom::new().with_ints(&[50_000, 600_000, 0]);

        let snapshot = engine.tick(&mut store, at(12, 0), &mut rng).unwrap();
        let france2 = snapshot.channel("France 2").unwrap();

        assert_eq!(france2.viewers, 1_050_000);
        assert_eq!(france2.trend, Trend::Up);
        assert_eq!(france2.change_text(), "+5.0%");
        assert!(france2.peak_today >= 1_050_000);
    }

    #[test]
    fn test_floor_at_thirty_percent() {
        let (engine, mut store) = setup(vec![channel("Culturebox", 100, &["Concert"])]);
        let mut rng = ScriptedRandom::new().with_ints(&[-95]);

        let snapshot = engine.tick(&mut store, at(3, 0), &mut rng).unwrap();
        let culturebox = &snapshot.channels[0];

        assert_eq!(culturebox.viewers, 30);
        assert_eq!(culturebox.trend, Trend::Down);
        assert_eq!(culturebox.change_text(), "-95.0%");
    }

    #[test]
    fn test_trend_stable_below_half_percent() {
        let (engine, mut store) = setup(vec![
            channel("France 2", 1_000_000, &["Journal"]),
            channel("France 3", 1_000_000, &["Jeu"]),
        ]);
        let mut rng = ScriptedRandom::new().with_ints(&[4_900, 5_000]);

        let snapshot = engine.tick(&mut store, at(12, 0), &mut rng).unwrap();
        assert_eq!(snapshot.channels[0].trend, Trend::Stable);
        assert_eq!(snapshot.channels[1].trend, Trend::Up);
    }

    #[test]
    fn test_volatility_bucket_changes_draw_range() {
        let (engine, mut store) = setup(vec![channel("France 2", 1_000_000, &["Journal"])]);

        let mut rng = RecordingRandom::default();
        engine.tick(&mut store, at(7, 59), &mut rng).unwrap();
        assert_eq!(rng.ranges[0], (-40_000, 40_000));

        let mut rng = RecordingRandom::default();
        engine.tick(&mut store, at(8, 0), &mut rng).unwrap();
        assert_eq!(rng.ranges[0], (-70_000, 70_000));
    }

    #[test]
    fn test_total_is_channel_sum_plus_supplement() {
        let (engine, mut store) = setup(vec![
            channel("France 2", 2_000_000, &["Journal"]),
            channel("France 5", 800_000, &["Histoire"]),
        ]);
        let mut rng = ScriptedRandom::new().with_ints(&[10_000, -8_000, 650_000, 0]);

        let snapshot = engine.tick(&mut store, at(12, 0), &mut rng).unwrap();
        assert_eq!(
            snapshot.aggregate.total_viewers,
            2_010_000 + 792_000 + 650_000
        );
    }

    #[test]
    fn test_digital_floor() {
        let mut config = simulation(vec![channel("France 2", 1_000_000, &["Journal"])]);
        config.aggregate.digital_traffic = 8_200_000;
        let mut store = MetricsStore::initialize(&config, at(9, 0), &mut ScriptedRandom::new()).unwrap();
        let engine = TickEngine::from_config(&config);
        let mut rng = ScriptedRandom::new().with_ints(&[0, 500_000, -1_000_000]);

        let snapshot = engine.tick(&mut store, at(12, 0), &mut rng).unwrap();
        assert_eq!(snapshot.aggregate.digital_traffic, 8_000_000);
    }

    #[test]
    fn test_program_rotation() {
        let (engine, mut store) = setup(vec![
            channel("France 2", 1_000_000, &["Journal", "Sport", "Feuilleton"]),
            channel("France 5", 800_000, &["Histoire", "Environnement"]),
        ]);
        let mut rng = ScriptedRandom::new()
            .with_chances(&[true, true, false])
            .with_indices(&[2]);

        let snapshot = engine.tick(&mut store, at(12, 0), &mut rng).unwrap();
        assert_eq!(snapshot.channels[0].program, "Feuilleton");
        assert_eq!(snapshot.channels[1].program, "Histoire");
    }

    #[test]
    fn test_no_rotation_when_gate_closed() {
        let (engine, mut store) = setup(vec![channel("France 2", 1_000_000, &["Journal", "Sport"])]);
        let mut rng = ScriptedRandom::new()
            .with_chances(&[false, true])
            .with_indices(&[1]);

        let snapshot = engine.tick(&mut store, at(12, 0), &mut rng).unwrap();
        assert_eq!(snapshot.channels[0].program, "Journal");
    }

    #[test]
    fn test_history_window_after_65_ticks() {
        let (engine, mut store) = setup(vec![channel("France 2", 1_000_000, &["Journal"])]);
        let start = at(10, 0);
        let mut rng = SeededRandom::new(Some(11));

        for i in 1..=65 {
            engine
                .tick(&mut store, start + Duration::minutes(i), &mut rng)
                .unwrap();
            let len = store.history("France 2").unwrap().len();
            assert_eq!(len, (i as usize).min(60));
        }

        for series in ["France 2", "total", "digital"] {
            let samples = store.history(series).unwrap();
            assert_eq!(samples.len(), 60);
            assert_eq!(samples[0].0, start + Duration::minutes(6));
        }
    }

    #[test]
    fn test_history_records_tick_values() {
        let (engine, mut store) = setup(vec![channel("France 2", 1_000_000, &["Journal"])]);
        let mut rng = ScriptedRandom::new().with_ints(&[20_000, 700_000, 100_000]);

        engine.tick(&mut store, at(12, 0), &mut rng).unwrap();
        assert_eq!(store.history("France 2").unwrap(), vec![(at(12, 0), 1_020_000)]);
        assert_eq!(store.history("total").unwrap(), vec![(at(12, 0), 1_720_000)]);
        assert_eq!(store.history("digital").unwrap(), vec![(at(12, 0), 12_600_000)]);
    }

    #[test]
    fn test_stale_tick_leaves_state_untouched() {
        let (engine, mut store) = setup(vec![channel("France 2", 1_000_000, &["Journal"])]);
        engine
            .tick(&mut store, at(12, 0), &mut ScriptedRandom::new())
            .unwrap();
        let before = store.snapshot();

        let mut rng = ScriptedRandom::new().with_ints(&[90_000]);
        let err = engine.tick(&mut store, at(12, 0), &mut rng).unwrap_err();

        assert!(matches!(err, MetricsError::StaleTimestamp { .. }));
        assert_eq!(store.snapshot(), before);
        assert_eq!(store.history("total").unwrap().len(), 1);
    }

    #[test]
    fn test_invariants_hold_over_long_run() {
        let (engine, mut store) = setup(vec![
            channel("France 2", 2_100_000, &["Journal", "Sport"]),
            channel("France Ô", 180_000, &["Débats"]),
            channel("Culturebox", 280_000, &["Opéra", "Concert"]),
        ]);
        let mut rng = SeededRandom::new(Some(2024));
        let start = at(0, 0);

        for i in 1..=1_440 {
            let before = store.snapshot();
            let after = engine
                .tick(&mut store, start + Duration::minutes(i), &mut rng)
                .unwrap();

            assert!(after.aggregate.digital_traffic >= 8_000_000);
            for (old, new) in before.channels.iter().zip(&after.channels) {
                assert!(new.viewers >= (old.viewers as f64 * 0.3) as u64);
                assert!(new.peak_today >= old.peak_today);
                assert!(new.peak_today >= new.viewers);
            }
            assert!(store.history("total").unwrap().len() <= 60);
        }
    }

    #[test]
    fn test_daily_peak_reset() {
        let mut config = simulation(vec![channel("France 2", 1_000_000, &["Journal"])]);
        config.reset_peak_daily = true;
        let engine = TickEngine::from_config(&config);
        let mut store =
            MetricsStore::initialize(&config, at(23, 0), &mut ScriptedRandom::new()).unwrap();

        let mut rng = ScriptedRandom::new().with_ints(&[50_000, 600_000, 0, -100_000, 600_000, 0]);
        engine.tick(&mut store, at(23, 58), &mut rng).unwrap();
        assert_eq!(store.snapshot().channels[0].peak_today, 1_050_000);

        let after_midnight = at(23, 58) + Duration::minutes(4);
        let snapshot = engine.tick(&mut store, after_midnight, &mut rng).unwrap();
        assert_eq!(snapshot.channels[0].viewers, 950_000);
        assert_eq!(snapshot.channels[0].peak_today, 950_000);
    }
}
