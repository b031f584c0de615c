//! `Accept` header handling.
//!
//! Every endpoint that can answer in more than one representation lists what
//! it offers, primary first, and [`Accept::negotiate`] picks one.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::ACCEPT;
use axum::http::request::Parts;
use mime::Mime;

use crate::error::AppError;

/// A response representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Html,
    Json,
}

impl Format {
    fn mime(&self) -> Mime {
        match self {
            Self::Html => mime::TEXT_HTML,
            Self::Json => mime::APPLICATION_JSON,
        }
    }
}

/// The media ranges a client accepts, with quality in thousandths.
#[derive(Debug, Clone, Default)]
pub struct Accept {
    ranges: Vec<(Mime, u16)>,
}

impl Accept {
    pub fn parse(header: &str) -> Self {
        let ranges = header
            .split(',')
            .filter_map(|part| part.trim().parse::<Mime>().ok())
            .map(|range| {
                let q = range
                    .get_param("q")
                    .and_then(|q| q.as_str().parse::<f32>().ok())
                    .map(|q| (q.clamp(0.0, 1.0) * 1000.0).round() as u16)
                    .unwrap_or(1000);
                (range, q)
            })
            .collect();

        Self { ranges }
    }

    /// Quality the client gives `format`; the most specific matching range decides.
    pub fn quality(&self, format: Format) -> u16 {
        if self.ranges.is_empty() {
            return 1000;
        }

        let target = format.mime();
        self.ranges
            .iter()
            .filter_map(|(range, q)| {
                let specificity = if range.type_() == mime::STAR {
                    0
                } else if range.type_() != target.type_() {
                    return None;
                } else if range.subtype() == mime::STAR {
                    1
                } else if range.subtype() != target.subtype() {
                    return None;
                } else {
                    2
                };
                Some((specificity, *q))
            })
            .max_by_key(|(specificity, _)| *specificity)
            .map(|(_, q)| q)
            .unwrap_or(0)
    }

    /// Picks the best of `offered`. Ties go to the earlier entry.
    pub fn negotiate(&self, offered: &[Format]) -> Result<Format, AppError> {
        let mut best: Option<(Format, u16)> = None;
        for &format in offered {
            let q = self.quality(format);
            if q > 0 && best.is_none_or(|(_, best_q)| q > best_q) {
                best = Some((format, q));
            }
        }

        best.map(|(format, _)| format).ok_or(AppError::NotAcceptable)
    }
}

impl<S> FromRequestParts<S> for Accept
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .headers
            .get(ACCEPT)
            .and_then(|value| value.to_str().ok())
            .map(Self::parse)
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML_FIRST: &[Format] = &[Format::Html, Format::Json];
    const JSON_FIRST: &[Format] = &[Format::Json, Format::Html];

    #[test]
    fn missing_header_picks_primary() {
        let accept = Accept::default();
        assert_eq!(accept.negotiate(HTML_FIRST).unwrap(), Format::Html);
        assert_eq!(accept.negotiate(JSON_FIRST).unwrap(), Format::Json);
    }

    #[test]
    fn wildcard_picks_primary() {
        let accept = Accept::parse("*/*");
        assert_eq!(accept.negotiate(JSON_FIRST).unwrap(), Format::Json);
    }

    #[test]
    fn browser_header_prefers_html() {
        let accept = Accept::parse(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        );
        assert_eq!(accept.negotiate(JSON_FIRST).unwrap(), Format::Html);
    }

    #[test]
    fn explicit_json() {
        let accept = Accept::parse("application/json");
        assert_eq!(accept.negotiate(HTML_FIRST).unwrap(), Format::Json);
        assert_eq!(accept.quality(Format::Html), 0);
    }

    #[test]
    fn quality_values_are_honoured() {
        let accept = Accept::parse("text/html;q=0.5, application/json");
        assert_eq!(accept.negotiate(HTML_FIRST).unwrap(), Format::Json);

        let accept = Accept::parse("text/*;q=0.2, application/*;q=0.1");
        assert_eq!(accept.quality(Format::Html), 200);
        assert_eq!(accept.negotiate(JSON_FIRST).unwrap(), Format::Html);
    }

    #[test]
    fn specific_range_overrides_wildcard() {
        let accept = Accept::parse("*/*, application/json;q=0");
        assert_eq!(accept.quality(Format::Json), 0);
        assert_eq!(accept.negotiate(JSON_FIRST).unwrap(), Format::Html);
    }

    #[test]
    fn nothing_acceptable() {
        let accept = Accept::parse("image/png");
        assert!(matches!(
            accept.negotiate(&[Format::Json]),
            Err(AppError::NotAcceptable)
        ));
    }
}
