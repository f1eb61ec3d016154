use chrono::NaiveTime;

use skillbook_shared::errors::{AppError, AppResult, ErrorCode};

/// First and last bookable hour of the fixed hourly grid.
pub const FIRST_SLOT_HOUR: u32 = 9;
pub const LAST_SLOT_HOUR: u32 = 20;

/// The fixed hourly candidate slots (09:00 through 20:00 inclusive).
pub fn candidate_slots() -> Vec<NaiveTime> {
    (FIRST_SLOT_HOUR..=LAST_SLOT_HOUR)
        .map(|h| NaiveTime::from_hms_opt(h, 0, 0).unwrap())
        .collect()
}

/// Normalize a user-supplied time to the stored `HH:MM:SS` form.
///
/// Accepts `HH:MM AM/PM`, `HH:MM`, and `HH:MM:SS`. This is the one wire
/// format the rest of the system relies on; bookings are always stored
/// with the normalized 24-hour representation.
pub fn normalize_to_24h(input: &str) -> AppResult<String> {
    let raw = input.trim();
    if raw.is_empty() {
        return Err(AppError::new(ErrorCode::InvalidTimeFormat, "empty time value"));
    }

    let upper = raw.to_uppercase();
    let meridiem = if upper.ends_with("AM") {
        Some(false)
    } else if upper.ends_with("PM") {
        Some(true)
    } else {
        None
    };

    let (clock_part, is_pm) = match meridiem {
        Some(pm) => (upper[..upper.len() - 2].trim_end(), Some(pm)),
        None => (raw, None),
    };

    let parts: Vec<&str> = clock_part.split(':').collect();
    if parts.len() != 2 && parts.len() != 3 {
        return Err(AppError::new(
            ErrorCode::InvalidTimeFormat,
            format!("unrecognized time format: {input}"),
        ));
    }

    let mut hours: u32 = parts[0].trim().parse().map_err(|_| {
        AppError::new(ErrorCode::InvalidTimeFormat, format!("invalid hour in: {input}"))
    })?;
    let minutes: u32 = parts[1].trim().parse().map_err(|_| {
        AppError::new(ErrorCode::InvalidTimeFormat, format!("invalid minute in: {input}"))
    })?;
    let seconds: u32 = if parts.len() == 3 {
        parts[2].trim().parse().map_err(|_| {
            AppError::new(ErrorCode::InvalidTimeFormat, format!("invalid second in: {input}"))
        })?
    } else {
        0
    };

    match is_pm {
        Some(pm) => {
            if hours == 0 || hours > 12 {
                return Err(AppError::new(
                    ErrorCode::InvalidTimeFormat,
                    format!("12-hour time out of range: {input}"),
                ));
            }
            if pm && hours != 12 {
                hours += 12;
            }
            if !pm && hours == 12 {
                hours = 0;
            }
        }
        None => {
            if hours > 23 {
                return Err(AppError::new(
                    ErrorCode::InvalidTimeFormat,
                    format!("hour out of range: {input}"),
                ));
            }
        }
    }

    if minutes > 59 || seconds > 59 {
        return Err(AppError::new(
            ErrorCode::InvalidTimeFormat,
            format!("time out of range: {input}"),
        ));
    }

    Ok(format!("{hours:02}:{minutes:02}:{seconds:02}"))
}

/// Normalize and parse in one step; handlers store times as `NaiveTime`.
pub fn parse_booking_time(input: &str) -> AppResult<NaiveTime> {
    let normalized = normalize_to_24h(input)?;
    NaiveTime::parse_from_str(&normalized, "%H:%M:%S").map_err(|_| {
        AppError::new(
            ErrorCode::InvalidTimeFormat,
            format!("unparseable time: {input}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_12_hour_pm() {
        assert_eq!(normalize_to_24h("02:30 PM").unwrap(), "14:30:00");
        assert_eq!(normalize_to_24h("09:00 AM").unwrap(), "09:00:00");
        assert_eq!(normalize_to_24h("08:00 PM").unwrap(), "20:00:00");
    }

    #[test]
    fn normalizes_midnight_and_noon() {
        assert_eq!(normalize_to_24h("12:00 AM").unwrap(), "00:00:00");
        assert_eq!(normalize_to_24h("12:00 PM").unwrap(), "12:00:00");
    }

    #[test]
    fn passes_through_24_hour_forms() {
        assert_eq!(normalize_to_24h("14:30").unwrap(), "14:30:00");
        assert_eq!(normalize_to_24h("14:30:00").unwrap(), "14:30:00");
        assert_eq!(normalize_to_24h("9:05").unwrap(), "09:05:00");
    }

    #[test]
    fn rejects_garbage() {
        assert!(normalize_to_24h("").is_err());
        assert!(normalize_to_24h("25:00").is_err());
        assert!(normalize_to_24h("14:61").is_err());
        assert!(normalize_to_24h("half past two").is_err());
    }

    #[test]
    fn rejects_out_of_range_12_hour() {
        assert!(normalize_to_24h("00:30 PM").is_err());
        assert!(normalize_to_24h("13:30 AM").is_err());
    }

    #[test]
    fn candidate_grid_is_hourly_nine_to_twenty() {
        let slots = candidate_slots();
        assert_eq!(slots.len(), 12);
        assert_eq!(slots[0], NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(slots[11], NaiveTime::from_hms_opt(20, 0, 0).unwrap());
    }

    #[test]
    fn parse_booking_time_accepts_all_forms() {
        let expected = NaiveTime::from_hms_opt(14, 30, 0).unwrap();
        assert_eq!(parse_booking_time("02:30 PM").unwrap(), expected);
        assert_eq!(parse_booking_time("14:30").unwrap(), expected);
        assert_eq!(parse_booking_time("14:30:00").unwrap(), expected);
    }
}
