use std::process::{Command as StdCommand, Stdio};

use super::{HardwareError, Pointer, SdrCapturer, SdrOpener, Spectrometer};
use crate::observation::{SdrCapture, SpectrometerReading};

/// Runs `cmd` through `sh -c` and returns its stdout.
/// A non-zero exit status is an adapter error.
pub fn run_driver(cmd: &str) -> Result<String, HardwareError> {
    log::debug!("Running driver command: {}", cmd);

    let output = StdCommand::new("sh")
        .arg("-c")
        .arg(cmd)
        .stdin(Stdio::null())
        .output()?;

    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        return Err(HardwareError::CommandFailed {
            cmd: cmd.to_string(),
            code,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Substitutes `{name}` placeholders.
fn render(template: &str, vars: &[(&str, String)]) -> String {
    vars.iter().fold(template.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{}}}", name), value)
    })
}

#[derive(Debug, Clone)]
pub struct CommandPointer {
    template: String,
}

impl CommandPointer {
    pub fn new(template: String) -> Self {
        Self { template }
    }
}

impl Pointer for CommandPointer {
    fn point(&self, altitude_deg: f64, azimuth_deg: f64) -> Result<(), HardwareError> {
        let cmd = render(
            &self.template,
            &[
                ("alt", format!("{altitude_deg:.4}")),
                ("az", format!("{azimuth_deg:.4}")),
            ],
        );
        run_driver(&cmd).map(|_| ())
    }
}

/// Spectrometer driver printing one JSON object per call.
#[derive(Debug, Clone)]
pub struct CommandSpectrometer {
    template: String,
}

impl CommandSpectrometer {
    pub fn new(template: String) -> Self {
        Self { template }
    }
}

impl Spectrometer for CommandSpectrometer {
    fn read_data(&self, prev_cnt: Option<u64>) -> Result<SpectrometerReading, HardwareError> {
        let prev = prev_cnt.map(|c| c.to_string()).unwrap_or_default();
        let cmd = render(&self.template, &[("prev", prev)]);
        let stdout = run_driver(&cmd)?;
        Ok(serde_json::from_str(stdout.trim())?)
    }
}

/// SDR driver printing the captured blocks as JSON.
#[derive(Debug, Clone)]
pub struct CommandSdr {
    template: String,
}

impl CommandSdr {
    pub fn new(template: String) -> Self {
        Self { template }
    }
}

impl SdrOpener for CommandSdr {
    fn open(&self) -> Result<Box<dyn SdrCapturer>, HardwareError> {
        Ok(Box::new(self.clone()))
    }
}

impl SdrCapturer for CommandSdr {
    fn capture_data(
        &mut self,
        nsamples: usize,
        nblocks: usize,
    ) -> Result<SdrCapture, HardwareError> {
        let cmd = render(
            &self.template,
            &[
                ("nsamples", nsamples.to_string()),
                ("nblocks", nblocks.to_string()),
            ],
        );
        let stdout = run_driver(&cmd)?;
        Ok(SdrCapture(serde_json::from_str(stdout.trim())?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn render_replaces_every_placeholder() {
        let cmd = render(
            "point {alt} {az} --again {alt}",
            &[("alt", "10".into()), ("az", "20".into())],
        );
        assert_eq!(cmd, "point 10 20 --again 10");
    }

    #[test]
    fn pointer_reports_failing_driver() {
        let pointer = CommandPointer::new("echo broken >&2; exit 3".into());
        match pointer.point(10.0, 20.0) {
            Err(HardwareError::CommandFailed { code, stderr, .. }) => {
                assert_eq!(code, 3);
                assert_eq!(stderr, "broken");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn spectrometer_parses_driver_json() {
        let spectrometer =
            CommandSpectrometer::new(r#"echo '{"acc_cnt": {prev}5, "corr": [1, 2]}'"#.into());
        let reading = spectrometer.read_data(Some(1)).unwrap();
        assert_eq!(reading.acc_cnt(), Some(15));
        assert_eq!(reading.fields["corr"], json!([1, 2]));
    }

    #[test]
    fn spectrometer_accepts_unusual_counters() {
        let spectrometer = CommandSpectrometer::new(r#"echo '{"acc_cnt": -1.5}'"#.into());
        let reading = spectrometer.read_data(None).unwrap();
        assert!(reading.has_counter());
        assert_eq!(reading.acc_cnt(), None);
    }

    #[test]
    fn spectrometer_rejects_garbage() {
        let spectrometer = CommandSpectrometer::new("echo not-json".into());
        assert!(matches!(
            spectrometer.read_data(None),
            Err(HardwareError::InvalidOutput(_))
        ));
    }

    #[test]
    fn sdr_passes_shape_to_driver() {
        let mut sdr = CommandSdr::new("echo '[{nsamples}, {nblocks}]'".into())
            .open()
            .unwrap();
        assert_eq!(
            sdr.capture_data(1024, 4).unwrap(),
            SdrCapture(json!([1024, 4]))
        );
    }
}
