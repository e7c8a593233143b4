use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use super::params::{ParamOverrides, SessionParams, TargetSpec};
use crate::coord::{AltAz, RaDec};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("input ended before {0} was given")]
    UnexpectedEof(&'static str),
    #[error("invalid {field} {value:?}: {reason}")]
    Invalid {
        field: &'static str,
        value: String,
        reason: String,
    },
}

impl InputError {
    fn invalid(field: &'static str, value: impl Display, reason: impl Display) -> Self {
        InputError::Invalid {
            field,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Line-oriented question/answer over any reader and writer.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, question: &str, field: &'static str) -> Result<String, InputError> {
        write!(self.output, "{}: ", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(InputError::UnexpectedEof(field));
        }
        Ok(line.trim().to_string())
    }

    /// Only an answer of `yes` (any case) counts as yes.
    pub fn ask_yes_no(&mut self, question: &str, field: &'static str) -> Result<bool, InputError> {
        let answer = self.ask(&format!("{} (yes/no)", question), field)?;
        Ok(answer.eq_ignore_ascii_case("yes"))
    }

    pub fn ask_parsed<T>(&mut self, question: &str, field: &'static str) -> Result<T, InputError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let answer = self.ask(question, field)?;
        answer
            .parse()
            .map_err(|e| InputError::invalid(field, &answer, e))
    }
}

/// Collects the target and acquisition parameters, asking only for what
/// `overrides` leaves open. Fails on the first invalid answer.
pub fn gather<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    overrides: &ParamOverrides,
) -> Result<(TargetSpec, SessionParams), InputError> {
    let target = match overrides.target() {
        Some(target) => target,
        None => ask_target(prompter)?,
    };
    validate_target(&target)?;

    let nsamples = match overrides.nsamples {
        Some(n) => n,
        None => prompter.ask_parsed("Enter samples per block", "samples per block")?,
    };
    let nblocks = match overrides.nblocks {
        Some(n) => n,
        None => prompter.ask_parsed("Enter number of blocks", "number of blocks")?,
    };
    let duration_s: f64 = match overrides.duration_s {
        Some(d) => d,
        None => prompter.ask_parsed("Enter total duration (seconds)", "duration")?,
    };

    if nsamples == 0 {
        return Err(InputError::invalid("samples per block", nsamples, "must be positive"));
    }
    if nblocks == 0 {
        return Err(InputError::invalid("number of blocks", nblocks, "must be positive"));
    }
    let duration = Duration::try_from_secs_f64(duration_s)
        .map_err(|e| InputError::invalid("duration", duration_s, e))?;

    Ok((
        target,
        SessionParams {
            nsamples,
            nblocks,
            duration,
        },
    ))
}

fn ask_target<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
) -> Result<TargetSpec, InputError> {
    if prompter.ask_yes_no("Observe the Sun?", "sun selection")? {
        return Ok(TargetSpec::Sun);
    }

    if prompter.ask_yes_no("Process RA/Dec coordinates?", "coordinate selection")? {
        let ra_deg = prompter.ask_parsed("Enter RA (degrees)", "RA")?;
        let dec_deg = prompter.ask_parsed("Enter Dec (degrees)", "Dec")?;
        return Ok(TargetSpec::RaDec(RaDec { ra_deg, dec_deg }));
    }

    let altitude_deg = prompter.ask_parsed("Enter Altitude (degrees)", "altitude")?;
    let azimuth_deg = prompter.ask_parsed("Enter Azimuth (degrees)", "azimuth")?;
    Ok(TargetSpec::AltAz(AltAz {
        altitude_deg,
        azimuth_deg,
    }))
}

fn validate_target(target: &TargetSpec) -> Result<(), InputError> {
    let check = |field: &'static str, value: f64, limit: f64| {
        if !value.is_finite() {
            return Err(InputError::invalid(field, value, "must be finite"));
        }
        if value.abs() > limit {
            return Err(InputError::invalid(
                field,
                value,
                format!("must be within ±{limit} degrees"),
            ));
        }
        Ok(())
    };

    match target {
        TargetSpec::Sun => Ok(()),
        TargetSpec::RaDec(p) => {
            check("RA", p.ra_deg, 360.0)?;
            check("Dec", p.dec_deg, 90.0)
        }
        TargetSpec::AltAz(p) => {
            check("altitude", p.altitude_deg, 90.0)?;
            check("azimuth", p.azimuth_deg, 360.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    type Answers = Result<(TargetSpec, SessionParams), InputError>;

    fn run(answers: &str, overrides: &ParamOverrides) -> (Answers, String) {
        let mut out = Vec::new();
        let result = {
            let mut prompter = Prompter::new(Cursor::new(answers.to_string()), &mut out);
            gather(&mut prompter, overrides)
        };
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn altaz_flow() {
        let answers = "no\nno\n45\n180\n2048\n10\n60\n";
        let (result, transcript) = run(answers, &ParamOverrides::default());
        let (target, params) = result.unwrap();
        assert_eq!(
            target,
            TargetSpec::AltAz(AltAz {
                altitude_deg: 45.0,
                azimuth_deg: 180.0
            })
        );
        assert_eq!(params.nsamples, 2048);
        assert_eq!(params.nblocks, 10);
        assert_eq!(params.duration, Duration::from_secs(60));
        assert!(transcript.starts_with("Observe the Sun? (yes/no): "));
        assert!(transcript.contains("Enter Azimuth (degrees): "));
    }

    #[test]
    fn sun_flow_skips_coordinate_questions() {
        let (result, transcript) = run(" YES \n1024\n2\n3.5\n", &ParamOverrides::default());
        let (target, params) = result.unwrap();
        assert_eq!(target, TargetSpec::Sun);
        assert_eq!(params.duration, Duration::from_millis(3500));
        assert!(!transcript.contains("RA/Dec"));
    }

    #[test]
    fn radec_flow() {
        let (result, _) = run("no\nyes\n83.6\n22.0\n16\n1\n5\n", &ParamOverrides::default());
        let (target, _) = result.unwrap();
        assert_eq!(
            target,
            TargetSpec::RaDec(RaDec {
                ra_deg: 83.6,
                dec_deg: 22.0
            })
        );
    }

    #[test]
    fn anything_but_yes_is_no() {
        let (result, _) = run("y\nsure\n10\n20\n1\n1\n1\n", &ParamOverrides::default());
        assert!(matches!(result.unwrap().0, TargetSpec::AltAz(_)));
    }

    #[test]
    fn invalid_ra_aborts_before_parameters() {
        let (result, transcript) = run("no\nyes\nabc\n", &ParamOverrides::default());
        match result {
            Err(InputError::Invalid { field, value, .. }) => {
                assert_eq!(field, "RA");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(!transcript.contains("samples per block"));
    }

    #[test]
    fn non_integer_sample_count_is_rejected() {
        let (result, _) = run("no\nno\n10\n10\n12.5\n", &ParamOverrides::default());
        assert!(matches!(
            result,
            Err(InputError::Invalid { field: "samples per block", .. })
        ));
    }

    #[test]
    fn negative_duration_is_rejected() {
        let (result, _) = run("no\nno\n10\n10\n8\n8\n-1\n", &ParamOverrides::default());
        assert!(matches!(result, Err(InputError::Invalid { field: "duration", .. })));
    }

    #[test]
    fn out_of_range_altitude_is_rejected() {
        let (result, _) = run("no\nno\n95\n10\n8\n8\n1\n", &ParamOverrides::default());
        assert!(matches!(result, Err(InputError::Invalid { field: "altitude", .. })));
    }

    #[test]
    fn closed_input_is_an_error() {
        let (result, _) = run("no\n", &ParamOverrides::default());
        assert!(matches!(
            result,
            Err(InputError::UnexpectedEof("coordinate selection"))
        ));
    }

    #[test]
    fn overrides_skip_prompts() {
        let overrides = ParamOverrides {
            sun: true,
            nsamples: Some(256),
            nblocks: Some(4),
            duration_s: Some(10.0),
            ..Default::default()
        };
        let (result, transcript) = run("", &overrides);
        let (target, params) = result.unwrap();
        assert_eq!(target, TargetSpec::Sun);
        assert_eq!(params.nblocks, 4);
        assert!(transcript.is_empty());
    }
}
