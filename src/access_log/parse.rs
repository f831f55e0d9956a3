use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::trace;

static RECORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[[^\[]+\] ([A-Z]+) (.+) HTTP/1\.1 (\d+) (.+)").expect("record pattern is valid")
});

/// # Errors produced while parsing a log record.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The line does not match the record format.
    #[error("invalid log format")]
    InvalidFormat,
}

impl ParseError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ParseError::InvalidFormat => "invalid_format",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        self.to_string()
    }
}

/// What a request is counted by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestKey {
    /// HTTP method, e.g. `GET`.
    pub method: String,
    /// Request URI as logged.
    pub endpoint: String,
    /// Response status code.
    pub status: u16,
}

/// Number of occurrences of one [`RequestKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCount {
    pub key: RequestKey,
    pub count: usize,
}

/// How endpoints are grouped before counting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Grouping {
    /// Endpoints are compared verbatim.
    #[default]
    Exact,
    /// All-digit path segments are replaced by `#`: `/users/12345/locations` → `/users/#/locations`.
    NormalizeIds,
}

impl Grouping {
    fn apply(self, endpoint: String) -> String {
        match self {
            Grouping::Exact => endpoint,
            Grouping::NormalizeIds => endpoint
                .split('/')
                .map(|seg| {
                    if !seg.is_empty() && seg.bytes().all(|b| b.is_ascii_digit()) {
                        "#"
                    } else {
                        seg
                    }
                })
                .collect::<Vec<_>>()
                .join("/"),
        }
    }
}

/// Parses one record into its `(method, endpoint, status)` key.
///
/// ### Errors
/// [`ParseError::InvalidFormat`] if the line does not match the record format or
/// the status does not fit an HTTP status code.
pub fn parse_line(record: &str) -> Result<RequestKey, ParseError> {
    let caps = RECORD.captures(record).ok_or(ParseError::InvalidFormat)?;
    let status = caps[3]
        .parse::<u16>()
        .map_err(|_| ParseError::InvalidFormat)?;

    Ok(RequestKey {
        method: caps[1].to_owned(),
        endpoint: caps[2].to_owned(),
        status,
    })
}

/// Counts requests with exact endpoints. See [`count_requests_with`].
pub fn count_requests<I, S>(lines: I) -> Vec<RequestCount>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    count_requests_with(lines, Grouping::Exact)
}

/// Counts requests per key; lines that fail to parse are skipped.
///
/// The result is sorted by count (descending), then method, endpoint and status
/// (ascending), so equal inputs always render the same table.
pub fn count_requests_with<I, S>(lines: I, grouping: Grouping) -> Vec<RequestCount>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts: HashMap<RequestKey, usize> = HashMap::new();
    for line in lines {
        let line = line.as_ref();
        let Ok(mut key) = parse_line(line) else {
            trace!(line, "skipping unparsable log record");
            continue;
        };
        key.endpoint = grouping.apply(key.endpoint);
        *counts.entry(key).or_default() += 1;
    }

    let mut out: Vec<RequestCount> = counts
        .into_iter()
        .map(|(key, count)| RequestCount { key, count })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    out
}

/// Counts the requests in a whole log text, one record per line.
pub fn parse_log(text: &str) -> Vec<RequestCount> {
    count_requests(text.lines())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
[02/Nov/2018:21:46:31 +0000] PUT /users/12345/locations HTTP/1.1 204 iphone-3
[02/Nov/2018:21:46:31 +0000] PUT /users/6098/locations HTTP/1.1 204 iphone-3
[02/Nov/2018:21:46:32 +0000] PUT /users/3911/locations HTTP/1.1 204 moto-x
[02/Nov/2018:21:46:33 +0000] PUT /users/9933/locations HTTP/1.1 404 moto-x
[02/Nov/2018:21:46:33 +0000] PUT /users/3911/locations HTTP/1.1 500 moto-x
[02/Nov/2018:21:46:34 +0000] GET /rides/9943222/status HTTP/1.1 200 moto-x
[02/Nov/2018:21:46:34 +0000] POST /rides HTTP/1.1 202 iphone-2
[02/Nov/2018:21:46:35 +0000] POST /users HTTP/1.1 202 iphone-5
[02/Nov/2018:21:46:35 +0000] POST /rides HTTP/1.1 202 iphone-5
[02/Nov/2018:21:46:37 +0000] POST /rides HTTP/1.1 202 iphone-4
[02/Nov/2018:21:46:38 +0000] GET /users/994/ride/16 HTTP/1.1 200 iphone-5
[02/Nov/2018:21:46:39 +0000] POST /users HTTP/1.1 202 iphone-3
[02/Nov/2018:21:46:40 +0000] PUT /users/8384721/locations HTTP/1.1 204 iphone-3
[02/Nov/2018:21:46:41 +0000] GET /users/342111 HTTP/1.1 200 iphone-5
[02/Nov/2018:21:46:42 +0000] GET /users/9933 HTTP/1.1 200 iphone-5
[02/Nov/2018:21:46:43 +0000] GET /prices/20180103/geo/12 HTTP/1.1 200 iphone-5";

    fn key(method: &str, endpoint: &str, status: u16) -> RequestKey {
        RequestKey {
            method: method.into(),
            endpoint: endpoint.into(),
            status,
        }
    }

    #[test]
    fn test_parse_line() {
        let got = parse_line(
            "[02/Nov/2018:21:46:43 +0000] GET /prices/20180103/geo/12 HTTP/1.1 200 iphone-5",
        )
        .unwrap();
        assert_eq!(got, key("GET", "/prices/20180103/geo/12", 200));
    }

    #[test]
    fn test_parse_line_rejects_garbage() {
        assert_eq!(parse_line(""), Err(ParseError::InvalidFormat));
        assert_eq!(
            parse_line("GET /rides HTTP/1.1 200 iphone-5"),
            Err(ParseError::InvalidFormat)
        );
        assert_eq!(
            parse_line("[02/Nov/2018:21:46:43 +0000] get /rides HTTP/1.1 200 iphone-5"),
            Err(ParseError::InvalidFormat)
        );
        assert_eq!(
            parse_line("[02/Nov/2018:21:46:43 +0000] GET /rides HTTP/1.1 99999 iphone-5"),
            Err(ParseError::InvalidFormat)
        );
    }

    #[test]
    fn test_exact_counts_are_sorted() {
        let counts = parse_log(SAMPLE);
        assert_eq!(counts.iter().map(|c| c.count).sum::<usize>(), 16);
        assert_eq!(counts[0].key, key("POST", "/rides", 202));
        assert_eq!(counts[0].count, 3);
        assert_eq!(counts[1].key, key("POST", "/users", 202));
        assert_eq!(counts[1].count, 2);
        assert_eq!(counts[2].key, key("GET", "/prices/20180103/geo/12", 200));
        assert!(counts[2..].iter().all(|c| c.count == 1));
    }

    #[test]
    fn test_normalized_counts() {
        let counts = count_requests_with(SAMPLE.lines(), Grouping::NormalizeIds);
        let got: Vec<_> = counts
            .iter()
            .map(|c| (c.key.method.as_str(), c.key.endpoint.as_str(), c.key.status, c.count))
            .collect();
        assert_eq!(
            got,
            vec![
                ("PUT", "/users/#/locations", 204, 4),
                ("POST", "/rides", 202, 3),
                ("GET", "/users/#", 200, 2),
                ("POST", "/users", 202, 2),
                ("GET", "/prices/#/geo/#", 200, 1),
                ("GET", "/rides/#/status", 200, 1),
                ("GET", "/users/#/ride/#", 200, 1),
                ("PUT", "/users/#/locations", 404, 1),
                ("PUT", "/users/#/locations", 500, 1),
            ]
        );
    }

    #[test]
    fn test_invalid_lines_are_skipped() {
        let counts = count_requests(["", "garbage", SAMPLE.lines().next().unwrap_or_default()]);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].count, 1);
    }
}
