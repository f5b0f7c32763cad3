// Time-of-day volatility schedule

/// News bulletin hours.
pub const NEWS_PEAK_VOLATILITY: f64 = 0.07;
/// 20h-23h.
pub const PRIME_TIME_VOLATILITY: f64 = 0.05;
/// 0h-6h.
pub const NIGHT_VOLATILITY: f64 = 0.12;
pub const DAYTIME_VOLATILITY: f64 = 0.04;

const NEWS_PEAK_HOURS: [u32; 3] = [8, 13, 20];

/// Fraction of current viewers a channel may gain or lose in one tick.
///
/// Step function over the 24 hourly buckets, evaluated per tick with no
/// smoothing between buckets. 20h is both a news peak and prime time; the
/// news peak wins.
pub fn volatility_for_hour(hour: u32) -> f64 {
    if NEWS_PEAK_HOURS.contains(&hour) {
        NEWS_PEAK_VOLATILITY
    } else if (20..=23).contains(&hour) {
        PRIME_TIME_VOLATILITY
    } else if hour <= 6 {
        NIGHT_VOLATILITY
    } else {
        DAYTIME_VOLATILITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_news_peaks() {
        for hour in [8, 13, 20] {
            assert_eq!(volatility_for_hour(hour), NEWS_PEAK_VOLATILITY);
        }
    }

    #[test]
    fn test_prime_time_and_night() {
        for hour in 21..=23 {
            assert_eq!(volatility_for_hour(hour), PRIME_TIME_VOLATILITY);
        }
        for hour in 0..=6 {
            assert_eq!(volatility_for_hour(hour), NIGHT_VOLATILITY);
        }
    }

    #[test]
    fn test_bucket_boundaries_jump() {
        assert_eq!(volatility_for_hour(7), 0.04);
        assert_eq!(volatility_for_hour(8), 0.07);
        assert_eq!(volatility_for_hour(9), 0.04);
        assert_eq!(volatility_for_hour(6), 0.12);
        assert_eq!(volatility_for_hour(19), 0.04);
    }
}
