use time::{OffsetDateTime, UtcOffset, macros::format_description};

/// Wall clock in the host's local offset, formatted `YYYY-MM-DD HH:MM:SS`.
///
/// The offset is captured once. On Unix the local offset can only be read
/// reliably while the process is single-threaded, so [`LocalClock::detect`]
/// must run before the async runtime starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocalClock {
    offset: UtcOffset,
}

impl LocalClock {
    pub fn detect() -> Self {
        match UtcOffset::current_local_offset() {
            Ok(offset) => Self { offset },
            Err(e) => {
                tracing::warn!(
                    name = "clock.detect.offset_unavailable",
                    target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                    error = %e,
                    message = "Local UTC offset unavailable, timestamps will be in UTC"
                );
                Self::utc()
            }
        }
    }

    pub fn utc() -> Self {
        Self::with_offset(UtcOffset::UTC)
    }

    pub fn with_offset(offset: UtcOffset) -> Self {
        Self { offset }
    }

    pub fn offset(&self) -> UtcOffset {
        self.offset
    }

    pub fn now(&self) -> String {
        self.format(OffsetDateTime::now_utc())
    }

    pub fn format(&self, at: OffsetDateTime) -> String {
        let local = at.to_offset(self.offset);
        match local.format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second]"
        )) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(
                    name = "clock.format.failed",
                    target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
                    error = %e,
                    message = "Failed to format timestamp"
                );
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{datetime, offset};

    #[test]
    fn formats_fixed_precision() {
        let clock = LocalClock::utc();
        assert_eq!(
            clock.format(datetime!(2024-03-05 07:08:09.987 UTC)),
            "2024-03-05 07:08:09"
        );
    }

    #[test]
    fn applies_local_offset() {
        let clock = LocalClock::with_offset(offset!(+8));
        assert_eq!(
            clock.format(datetime!(2024-12-31 20:30:00 UTC)),
            "2025-01-01 04:30:00"
        );
    }

    #[test]
    fn now_has_expected_shape() {
        let stamp = LocalClock::utc().now();
        assert_eq!(stamp.len(), 19);
        assert_eq!(&stamp[4..5], "-");
        assert_eq!(&stamp[10..11], " ");
    }
}
