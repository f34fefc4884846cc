use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid range '{0}'. Expected 'LB:UB' (e.g., '200:400', '-2:', ':5').")]
    MissingSeparator(String),

    #[error("Invalid {side} bound '{value}' in range '{range}'. Expected a number.")]
    InvalidNumber {
        side: &'static str,
        value: String,
        range: String,
    },
}

/// An inclusive range from the command line. An absent side keeps the default bound.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RangeSpec {
    pub lb: Option<f64>,
    pub ub: Option<f64>,
}

impl RangeSpec {
    /// Fills absent sides from `(lb, ub)`.
    pub fn resolve(self, defaults: (f64, f64)) -> (f64, f64) {
        (self.lb.unwrap_or(defaults.0), self.ub.unwrap_or(defaults.1))
    }
}

pub fn parse_range(s: &str) -> Result<RangeSpec, ParseError> {
    let (lb, ub) = s
        .split_once(':')
        .ok_or_else(|| ParseError::MissingSeparator(s.to_string()))?;

    let side = |value: &str, name: &'static str| -> Result<Option<f64>, ParseError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(None);
        }
        value
            .parse::<f64>()
            .map(Some)
            .map_err(|_| ParseError::InvalidNumber {
                side: name,
                value: value.to_string(),
                range: s.to_string(),
            })
    };

    Ok(RangeSpec {
        lb: side(lb, "lower")?,
        ub: side(ub, "upper")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_closed_range() {
        assert_eq!(
            parse_range("200:400").unwrap(),
            RangeSpec {
                lb: Some(200.0),
                ub: Some(400.0)
            }
        );
    }

    #[test]
    fn parses_negative_and_fractional_bounds() {
        assert_eq!(
            parse_range("-6:-0.5").unwrap(),
            RangeSpec {
                lb: Some(-6.0),
                ub: Some(-0.5)
            }
        );
    }

    #[test]
    fn open_sides_fall_back_to_defaults() {
        let spec = parse_range(":5").unwrap();
        assert_eq!(spec.lb, None);
        assert_eq!(spec.resolve((0.0, 20.0)), (0.0, 5.0));

        let spec = parse_range("3:").unwrap();
        assert_eq!(spec.resolve((0.0, 20.0)), (3.0, 20.0));
    }

    #[test]
    fn rejects_missing_separator() {
        assert_eq!(
            parse_range("200").unwrap_err(),
            ParseError::MissingSeparator("200".to_string())
        );
    }

    #[test]
    fn rejects_non_numeric_bound() {
        let err = parse_range("abc:400").unwrap_err();
        assert!(matches!(err, ParseError::InvalidNumber { side: "lower", .. }));
    }
}
