use chrono::NaiveDateTime;
use csv::StringRecord;
use rfscout_types::{LogRecord, Modulation, RfError, RfResult, TIMESTAMP_FORMAT};

/// Колонки журнала в фиксированном порядке.
pub const LOG_COLUMNS: [&str; 9] = [
    "Timestamp",
    "Frequency (MHz)",
    "Modulation",
    "LNA Gain",
    "VGA Gain",
    "AMP Enabled",
    "Description",
    "Suggestions",
    "Decoded Data",
];

/// Проверяет заголовок существующего журнала.
pub fn validate_header(headers: &StringRecord) -> RfResult<()> {
    if headers.len() != LOG_COLUMNS.len() || headers.iter().zip(LOG_COLUMNS).any(|(h, c)| h != c)
    {
        return Err(RfError::malformed(
            1,
            format!("unexpected header {:?}", headers.iter().collect::<Vec<_>>()),
        ));
    }

    Ok(())
}

/// Поля записи в порядке [`LOG_COLUMNS`]. Экранирование делает `csv::Writer`.
pub fn record_fields(record: &LogRecord) -> [String; 9] {
    [
        record.timestamp_str(),
        record.frequency_str(),
        record.modulation.to_string(),
        record.lna_gain.to_string(),
        record.vga_gain.to_string(),
        record.amp_enabled.to_string(),
        record.description.clone(),
        record.suggestions.clone(),
        record.decoded.clone(),
    ]
}

/// Восстанавливает запись из полей одной строки журнала.
pub fn decode_record(
    line: usize,
    fields: &StringRecord,
) -> RfResult<LogRecord> {
    if fields.len() != LOG_COLUMNS.len() {
        return Err(RfError::malformed(
            line,
            format!("expected {} fields, found {}", LOG_COLUMNS.len(), fields.len()),
        ));
    }

    let timestamp = NaiveDateTime::parse_from_str(&fields[0], TIMESTAMP_FORMAT)
        .map_err(|e| RfError::malformed(line, format!("timestamp '{}': {e}", &fields[0])))?;

    let frequency_mhz: f64 = fields[1]
        .parse()
        .map_err(|e| RfError::malformed(line, format!("frequency '{}': {e}", &fields[1])))?;

    let modulation: Modulation = fields[2]
        .parse()
        .map_err(|e: String| RfError::malformed(line, e))?;

    let lna_gain: u32 = fields[3]
        .parse()
        .map_err(|e| RfError::malformed(line, format!("LNA gain '{}': {e}", &fields[3])))?;

    let vga_gain: u32 = fields[4]
        .parse()
        .map_err(|e| RfError::malformed(line, format!("VGA gain '{}': {e}", &fields[4])))?;

    let amp_enabled = match fields[5].to_lowercase().as_str() {
        "true" | "1" => true,
        "false" | "0" => false,
        other => {
            return Err(RfError::malformed(
                line,
                format!("amp flag '{other}' is not a boolean"),
            ))
        }
    };

    Ok(LogRecord {
        timestamp,
        frequency_mhz,
        modulation,
        lna_gain,
        vga_gain,
        amp_enabled,
        description: fields[6].to_string(),
        suggestions: fields[7].to_string(),
        decoded: fields[8].to_string(),
    })
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
