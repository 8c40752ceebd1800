//! Выбор самого сильного сигнала из вывода `hackrf_sweep`.

use log::trace;
use rfscout_types::{SignalObservation, SweepRow};

/// Минимальное кол-во полей в строке данных.
pub const MIN_ROW_FIELDS: usize = 7;

/// Разбирает одну строку данных. `None` — строка битая.
pub fn parse_row(line: &str) -> Option<SweepRow> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();

    if fields.len() < MIN_ROW_FIELDS {
        return None;
    }

    let power_db: f64 = fields[6].parse().ok()?;

    if !power_db.is_finite() {
        return None;
    }

    Some(SweepRow {
        hz_low: fields[2].parse().ok()?,
        hz_high: fields[3].parse().ok()?,
        bin_width_hz: fields[4].parse().ok()?,
        num_samples: fields[5].parse().ok(),
        power_db,
    })
}

/// Все корректные строки после заголовка. Битые строки молча пропускаются.
pub fn parse_rows(raw: &str) -> impl Iterator<Item = SweepRow> + '_ {
    raw.trim()
        .lines()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .filter_map(|line| {
            let row = parse_row(line);
            if row.is_none() {
                trace!("Skipping malformed sweep row: {line:?}");
            }
            row
        })
}

/// Строка с максимальной мощностью; при равенстве — первая встреченная.
pub fn strongest_row(raw: &str) -> Option<SweepRow> {
    parse_rows(raw).fold(None, |best: Option<SweepRow>, row| match best {
        Some(b) if row.power_db <= b.power_db => Some(b),
        _ => Some(row),
    })
}

/// Самый сильный сигнал прохода. `None`, если нет ни одной корректной строки
/// (в т.ч. пустой вывод или только заголовок).
pub fn select_strongest(raw: &str) -> Option<SignalObservation> {
    strongest_row(raw).map(|row| SignalObservation::from_row(&row))
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "date, time, hz_low, hz_high, hz_bin_width, num_samples, dB";

    #[test]
    fn test_single_row_observation() {
        let raw = "header\n2024-01-01,00:00:00,100000000,100100000,100000,131072,-20.5";
        let obs = select_strongest(raw).unwrap();

        assert!((obs.frequency_mhz - 100.05).abs() < 1e-9);
        assert_eq!(obs.power_db, -20.5);
        assert_eq!(obs.bandwidth_hz, 100_000);
    }

    #[test]
    fn test_strongest_row_wins() {
        let raw = format!(
            "{HEADER}\n\
             2024-01-01, 00:00:00, 100000000, 105000000, 100000, 20, -60.1, -61.0\n\
             2024-01-01, 00:00:00, 105000000, 110000000, 100000, 20, -12.3, -40.0\n\
             2024-01-01, 00:00:00, 110000000, 115000000, 100000, 20, -45.0, -12.0\n"
        );
        let obs = select_strongest(&raw).unwrap();

        assert!((obs.frequency_mhz - 107.5).abs() < 1e-9);
        assert_eq!(obs.power_db, -12.3);
    }

    #[test]
    fn test_tie_keeps_first_row() {
        let raw = format!(
            "{HEADER}\n\
             d,t,200000000,200100000,100000,8,-30.0\n\
             d,t,300000000,300100000,100000,8,-30.0\n"
        );
        let row = strongest_row(&raw).unwrap();

        assert_eq!(row.hz_low, 200_000_000);
    }

    #[test]
    fn test_malformed_rows_skipped() {
        let raw = format!(
            "{HEADER}\n\
             d,t,100000000,100100000,100000,8\n\
             d,t,100000000,100100000,100000,8,loud\n\
             d,t,abc,100100000,100000,8,-1.0\n\
             d,t,100000000,100100000,100000,8,NaN\n\
             \n\
             d,t,150000000,150100000,100000,8,-33.3\n\
             garbage line\n"
        );

        let rows: Vec<SweepRow> = parse_rows(&raw).collect();
        assert_eq!(rows.len(), 1);

        let obs = select_strongest(&raw).unwrap();
        assert_eq!(obs.power_db, -33.3);
    }

    #[test]
    fn test_missing_sample_count_tolerated() {
        let row = parse_row("d,t,100000000,100100000,100000,,-50.0").unwrap();

        assert_eq!(row.num_samples, None);
        assert_eq!(row.power_db, -50.0);
    }

    #[test]
    fn test_no_data_yields_none() {
        assert!(select_strongest("").is_none());
        assert!(select_strongest(HEADER).is_none());
        assert!(select_strongest(&format!("{HEADER}\n\n")).is_none());
        assert!(select_strongest(&format!("{HEADER}\nonly,junk\n")).is_none());
    }
}
