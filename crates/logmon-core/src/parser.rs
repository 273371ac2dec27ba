//! Logcat line parser
//!
//! Recognizes the `threadtime` shape:
//!
//! ```text
//! 12-11 18:30:45.123  1234  5678 E ActivityManager: Error message
//! ```
//!
//! Anything else becomes a raw-only [`LogRecord`]. Parsing never fails.

use std::sync::LazyLock;

use regex::Regex;

use crate::record::{LogFields, LogRecord, PriorityCode};

/// Static regex for `<date> <time> <pid> <tid> <priority> <tag>: <message>`.
///
/// An optional `YYYY-` prefix covers `-v year` output. The tag runs up to the
/// first colon; a single separating space after the colon is consumed so that
/// `tag + ": " + message` rebuilds the original text.
static THREADTIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<timestamp>(?:\d{4}-)?\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2}\.\d{3})\s+(?P<pid>\S+)\s+(?P<tid>\S+)\s+(?P<priority>[VDIWEF])\s+(?P<tag>[^:]+):(?: )?(?P<message>.*)$",
    )
    .expect("Invalid threadtime pattern regex")
});

/// Parse one raw line (without its trailing newline) into a record
pub fn parse_line(line: &str) -> LogRecord {
    match parse_fields(line) {
        Some(fields) => LogRecord::parsed(line, fields),
        None => LogRecord::raw_only(line),
    }
}

fn parse_fields(line: &str) -> Option<LogFields> {
    let caps = THREADTIME_PATTERN.captures(line)?;

    let priority = caps
        .name("priority")
        .and_then(|m| m.as_str().chars().next())
        .and_then(PriorityCode::from_char)?;

    Some(LogFields {
        timestamp: caps.name("timestamp")?.as_str().to_string(),
        pid: caps.name("pid")?.as_str().to_string(),
        tid: caps.name("tid")?.as_str().to_string(),
        priority,
        tag: caps.name("tag")?.as_str().to_string(),
        message: caps.name("message")?.as_str().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(line: &str) -> LogFields {
        parse_line(line)
            .fields
            .unwrap_or_else(|| panic!("expected structured parse for {:?}", line))
    }

    #[test]
    fn test_parse_threadtime_line() {
        let f = fields("12-11 18:30:45.123  1234  5678 E ActivityManager: Error message");
        assert_eq!(f.timestamp, "12-11 18:30:45.123");
        assert_eq!(f.pid, "1234");
        assert_eq!(f.tid, "5678");
        assert_eq!(f.priority, PriorityCode::Error);
        assert_eq!(f.tag, "ActivityManager");
        assert_eq!(f.message, "Error message");
    }

    #[test]
    fn test_parse_all_priorities() {
        for (letter, expected) in [
            ('V', PriorityCode::Verbose),
            ('D', PriorityCode::Debug),
            ('I', PriorityCode::Info),
            ('W', PriorityCode::Warn),
            ('E', PriorityCode::Error),
            ('F', PriorityCode::Fatal),
        ] {
            let line = format!("01-01 00:00:00.000 1 1 {} Tag: msg", letter);
            assert_eq!(fields(&line).priority, expected);
        }
    }

    #[test]
    fn test_parse_year_prefixed_timestamp() {
        let f = fields("2024-03-02 10:11:12.345 42 43 W Net: slow");
        assert_eq!(f.timestamp, "2024-03-02 10:11:12.345");
        assert_eq!(f.message, "slow");
    }

    #[test]
    fn test_tag_and_message_round_trip() {
        let lines = [
            "01-01 00:00:00.000 1 1 E TagA: boom 1",
            "01-01 00:00:00.000 1 1 I chatty: uid=1000(system) Binder:1234_5 expire 3 lines",
            "01-01 00:00:00.000 1 1 D Some Tag: key: value: nested",
            "01-01 00:00:00.000 1 1 W Tag:  leading space kept",
            "01-01 00:00:00.000 1 1 E Tag: ",
        ];
        for line in lines {
            let f = fields(line);
            let rebuilt = format!("{}: {}", f.tag, f.message);
            let after_priority = &line[line.find(&format!(" {} ", f.priority)).unwrap() + 3..];
            assert_eq!(rebuilt, after_priority, "round trip failed for {:?}", line);
        }
    }

    #[test]
    fn test_message_may_contain_colons() {
        let f = fields("01-01 00:00:00.000 1 1 E Tag: java.lang.Error: boom");
        assert_eq!(f.tag, "Tag");
        assert_eq!(f.message, "java.lang.Error: boom");
    }

    #[test]
    fn test_non_numeric_pid_and_tid_tokens() {
        let f = fields("01-01 00:00:00.000 root  ?  I init: started");
        assert_eq!(f.pid, "root");
        assert_eq!(f.tid, "?");
    }

    #[test]
    fn test_malformed_lines_are_raw_only() {
        let lines = [
            "",
            "--------- beginning of main",
            "garbage",
            "01-01 00:00:00.000 1 1 X Tag: unknown priority",
            "01-01 00:00:00.000 1 1 E no colon here",
            "E/Tag( 1234): time format line",
            "01-01 00:00 1 1 E Tag: short time",
            "\u{1b}[31m01-01 00:00:00.000 1 1 E Tag: ansi\u{1b}[0m",
        ];
        for line in lines {
            let record = parse_line(line);
            assert!(!record.is_parsed(), "unexpected parse for {:?}", line);
            assert_eq!(record.raw, line);
        }
    }

    #[test]
    fn test_raw_is_preserved_for_parsed_lines() {
        let line = "01-01 00:00:00.000   77   78 I Tag: padded ids";
        assert_eq!(parse_line(line).raw, line);
    }
}
