use log::Level;
use thiserror::Error;

/// Severity codes used by the probe, with info as the zero point.
/// Codes in between belong to the next named level up.
pub const LEVEL_DEBUG: i8 = -4;
pub const LEVEL_INFO: i8 = 0;
pub const LEVEL_WARN: i8 = 4;
pub const LEVEL_ERROR: i8 = 8;

/// The record was too short to carry a level byte.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("empty log record, missing level byte")]
pub struct DecodeError;

/// One decoded probe log record.
///
/// Wire format: one signed severity byte followed by the text bytes,
/// NUL-terminated when shorter than the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Raw severity code, byte 0 of the wire record.
    pub level: i8,
    /// Record text, truncated at the first NUL byte.
    pub text: String,
}

impl LogRecord {
    /// Decode one raw ring-buffer record.
    pub fn parse(raw: &[u8]) -> Result<Self, DecodeError> {
        let (&level, text) = raw.split_first().ok_or(DecodeError)?;
        let text = match text.iter().position(|&b| b == 0) {
            Some(nul) => &text[..nul],
            None => text,
        };
        Ok(Self {
            level: level as i8,
            text: String::from_utf8_lossy(text).into_owned(),
        })
    }

    /// The log level this record should be emitted at. Codes that fall
    /// between the named levels round up to the next one.
    pub fn severity(&self) -> Level {
        match self.level {
            i8::MIN..=-1 => Level::Debug,
            LEVEL_INFO => Level::Info,
            1..=LEVEL_WARN => Level::Warn,
            _ => Level::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_keeps_level_byte_verbatim() {
        let record = LogRecord::parse(&[8, b'x']).unwrap();
        assert_eq!(record.level, LEVEL_ERROR);
        assert_eq!(record.severity(), Level::Error);
    }

    #[test]
    fn parse_negative_level() {
        // -4 on the wire
        let record = LogRecord::parse(&[0xFC, b'x']).unwrap();
        assert_eq!(record.level, LEVEL_DEBUG);
        assert_eq!(record.severity(), Level::Debug);
    }

    #[test]
    fn parse_truncates_text_at_first_nul() {
        let raw = [2, b'h', b'e', b'l', b'l', b'o', 0, b'x', b'y'];
        let record = LogRecord::parse(&raw).unwrap();
        assert_eq!(record.level, 2);
        assert_eq!(record.text, "hello");
        assert_eq!(record.severity(), Level::Warn);
    }

    #[test]
    fn parse_without_nul_takes_all_bytes() {
        let record = LogRecord::parse(&[0, b'h', b'i']).unwrap();
        assert_eq!(record.text, "hi");
    }

    #[test]
    fn parse_level_only_record() {
        let record = LogRecord::parse(&[0]).unwrap();
        assert_eq!(record.level, 0);
        assert_eq!(record.text, "");
        assert_eq!(record.severity(), Level::Info);
    }

    #[test]
    fn parse_empty_record_fails() {
        assert_eq!(LogRecord::parse(&[]), Err(DecodeError));
    }

    #[test]
    fn parse_invalid_utf8_is_lossy() {
        let record = LogRecord::parse(&[0, 0xFF, b'a']).unwrap();
        assert_eq!(record.text, "\u{FFFD}a");
    }

    #[test]
    fn severity_at_named_levels() {
        for (code, level) in [
            (LEVEL_DEBUG, Level::Debug),
            (LEVEL_INFO, Level::Info),
            (LEVEL_WARN, Level::Warn),
            (LEVEL_ERROR, Level::Error),
        ] {
            let record = LogRecord {
                level: code,
                text: String::new(),
            };
            assert_eq!(record.severity(), level);
        }
    }
}
