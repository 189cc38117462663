use time::{OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

/// Source of minute-precision timestamps for new and completed tasks.
pub trait Clock {
    fn now(&self) -> PrimitiveDateTime;
}

/// Local wall-clock time, falling back to UTC when the offset is unknown.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> PrimitiveDateTime {
        let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
        let now = OffsetDateTime::now_utc().to_offset(offset);
        truncate_to_minute(PrimitiveDateTime::new(now.date(), now.time()))
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub PrimitiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> PrimitiveDateTime {
        self.0
    }
}

pub fn truncate_to_minute(stamp: PrimitiveDateTime) -> PrimitiveDateTime {
    let time = stamp.time();
    match Time::from_hms(time.hour(), time.minute(), 0) {
        Ok(minute) => stamp.replace_time(minute),
        Err(_) => stamp,
    }
}
