//! Order number allocation

use chrono::{DateTime, Utc};

/// Source of human-facing order numbers
///
/// Swappable so hosts can plug in a collision-free allocator. The default
/// keeps the historical epoch-second scheme; two orders created within the
/// same second receive the same number, so treat numbers as display labels,
/// never as identifiers.
pub trait OrderNumberSource: Send + Sync {
    fn next(&self, now: DateTime<Utc>) -> String;
}

/// Epoch-seconds order numbers
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampNumberSource;

impl OrderNumberSource for TimestampNumberSource {
    fn next(&self, now: DateTime<Utc>) -> String {
        now.timestamp().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_number_is_epoch_seconds() {
        let now = Utc.with_ymd_and_hms(2025, 8, 25, 12, 0, 0).unwrap();
        let number = TimestampNumberSource.next(now);
        assert_eq!(number, now.timestamp().to_string());
    }

    #[test]
    fn test_same_second_collides() {
        // documented limitation of the epoch-second scheme
        let now = Utc.with_ymd_and_hms(2025, 8, 25, 12, 0, 0).unwrap();
        let source = TimestampNumberSource;
        assert_eq!(source.next(now), source.next(now));
    }
}
