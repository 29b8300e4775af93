use chrono::{DateTime, Local};

/// Full date+time stamp for the port-open banner: `YYYY-MM-DD HH:MM:SS`.
pub fn date_time_stamp() -> String {
    format_date_time(Local::now())
}

/// Per-line time stamp, including the literal brackets and trailing space:
/// `[HH:MM:SS] `.
pub fn time_stamp() -> String {
    format_time(Local::now())
}

fn format_date_time(now: DateTime<Local>) -> String {
    now.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn format_time(now: DateTime<Local>) -> String {
    now.format("[%H:%M:%S] ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 7, h, m, s).unwrap()
    }

    #[test]
    fn date_time_is_zero_padded() {
        assert_eq!(format_date_time(fixed(9, 5, 1)), "2024-03-07 09:05:01");
    }

    #[test]
    fn time_stamp_has_brackets_and_trailing_space() {
        assert_eq!(format_time(fixed(14, 5, 9)), "[14:05:09] ");
    }

    #[test]
    fn midnight_formats_as_zeros() {
        assert_eq!(format_time(fixed(0, 0, 0)), "[00:00:00] ");
    }
}
