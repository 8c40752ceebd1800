use std::fmt;

/// Тип модуляции, распознанный в описании сигнала.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modulation {
    Fm,
    Nfm,
    Wfm,
    Am,
    Ssb,
    Lsb,
    Usb,
    Fsk,
    Psk,
    Qam,
    /// Ни один из известных токенов не найден
    Unknown,
}

impl Modulation {
    /// Все распознаваемые токены (без `Unknown`).
    pub const KNOWN: [Modulation; 10] = [
        Modulation::Fm,
        Modulation::Nfm,
        Modulation::Wfm,
        Modulation::Am,
        Modulation::Ssb,
        Modulation::Lsb,
        Modulation::Usb,
        Modulation::Fsk,
        Modulation::Psk,
        Modulation::Qam,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Modulation::Fm => "FM",
            Modulation::Nfm => "NFM",
            Modulation::Wfm => "WFM",
            Modulation::Am => "AM",
            Modulation::Ssb => "SSB",
            Modulation::Lsb => "LSB",
            Modulation::Usb => "USB",
            Modulation::Fsk => "FSK",
            Modulation::Psk => "PSK",
            Modulation::Qam => "QAM",
            Modulation::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Modulation {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Modulation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("unknown") {
            return Ok(Modulation::Unknown);
        }

        Modulation::KNOWN
            .iter()
            .copied()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown modulation token '{s}'"))
    }
}
