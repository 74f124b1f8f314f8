//! Statistics over a finished run, printed to the console and optionally exported as CSV.
use crate::config::Mode;
use crate::err::{self, Error};
use crate::UploadRecord;
use snafu::ResultExt;
use std::io::Write;
use std::path::Path;

const CELL: usize = 18;

// Helpers for writing data
macro_rules! write_cell {
    ($out:expr, $x:expr) => {
        let _ = write!($out, "{0: >w$}", format!("{:.5}", $x), w = CELL);
    };
}

pub const CSV_HEADER: [&str; 4] = [
    "Normal",
    "Accelerated",
    "Normal Speed MB/s",
    "Accel Speed MB/s",
];

/// An upload that did not produce a sample.
#[derive(Clone, Debug)]
pub struct UploadFailure {
    pub iteration: usize,
    pub mode: Mode,
    pub message: String,
}

/// Mean time and speed of the successful uploads of one mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModeStats {
    pub mode: Mode,
    pub samples: usize,
    /// Seconds
    pub mean_time: f64,
    /// MB/s (2^20 bytes)
    pub mean_speed: f64,
}

/// Everything recorded during one run.
#[derive(Clone, Debug)]
pub struct RunSummary {
    pub byte_size: u64,
    pub iterations: usize,
    pub modes: Vec<Mode>,
    pub records: Vec<UploadRecord>,
    pub failures: Vec<UploadFailure>,
}

/// Arithmetic mean. An empty set has no mean.
pub fn mean(samples: &[f64]) -> Result<f64, Error> {
    if samples.is_empty() {
        return Err(Error::EmptySampleSet {
            what: "mean".to_string(),
        });
    }
    Ok(samples.iter().sum::<f64>() / samples.len() as f64)
}

impl RunSummary {
    pub fn record(&self, iteration: usize, mode: Mode) -> Option<&UploadRecord> {
        self.records
            .iter()
            .find(|r| r.iteration == iteration && r.mode == mode)
    }

    /// Elapsed seconds of every successful upload in `mode`, in iteration order
    pub fn times(&self, mode: Mode) -> Vec<f64> {
        self.samples(mode)
            .map(|r| r.elapsed.as_secs_f64())
            .collect()
    }

    pub fn speeds(&self, mode: Mode) -> Vec<f64> {
        self.samples(mode).map(|r| r.speed_mbps).collect()
    }

    fn samples(&self, mode: Mode) -> impl Iterator<Item = &UploadRecord> {
        self.records.iter().filter(move |r| r.mode == mode)
    }

    pub fn mode_stats(&self, mode: Mode) -> Result<ModeStats, Error> {
        let times = self.times(mode);
        if times.is_empty() {
            return Err(Error::EmptySampleSet {
                what: format!("no successful {} uploads", mode),
            });
        }
        Ok(ModeStats {
            mode,
            samples: times.len(),
            mean_time: mean(&times)?,
            mean_speed: mean(&self.speeds(mode))?,
        })
    }

    /// Print the per-iteration table followed by the means of every configured mode.
    ///
    /// Modes without any successful upload are reported as such, and the first of them is
    /// returned as an error once everything else has been printed.
    pub fn print<W: Write>(&self, out: &mut W) -> Result<(), Error> {
        let _ = write!(out, "{0: >w$}", "iteration", w = CELL);
        for mode in &self.modes {
            let _ = write!(out, "{0: >w$}", format!("{}_s", mode), w = CELL);
        }
        for mode in &self.modes {
            let _ = write!(out, "{0: >w$}", format!("{}_MBps", mode), w = CELL);
        }
        let _ = writeln!(out);

        for i in 0..self.iterations {
            write_cell!(out, i);
            for mode in &self.modes {
                match self.record(i, *mode) {
                    Some(r) => {
                        write_cell!(out, r.elapsed.as_secs_f64());
                    }
                    None => {
                        write_cell!(out, "-");
                    }
                }
            }
            for mode in &self.modes {
                match self.record(i, *mode) {
                    Some(r) => {
                        write_cell!(out, r.speed_mbps);
                    }
                    None => {
                        write_cell!(out, "-");
                    }
                }
            }
            let _ = writeln!(out);
        }

        let _ = writeln!(
            out,
            "\n{} iteration(s) of {} bytes, {} failed upload(s)",
            self.iterations,
            self.byte_size,
            self.failures.len()
        );
        let mut first_err = None;
        for mode in &self.modes {
            match self.mode_stats(*mode) {
                Ok(stats) => {
                    let _ = writeln!(
                        out,
                        "{: <12} mean time {:.5} s, mean speed {:.5} MB/s ({} of {} uploads)",
                        mode, stats.mean_time, stats.mean_speed, stats.samples, self.iterations
                    );
                }
                Err(e) => {
                    let _ = writeln!(out, "{: <12} no successful uploads", mode);
                    first_err.get_or_insert(e);
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Write one row per iteration to `path`, replacing whatever was there.
    pub fn write_csv(&self, path: &Path) -> Result<(), Error> {
        let writer = csv::Writer::from_path(path).context(err::Csv { path })?;
        self.write_csv_to(writer).context(err::Csv { path })
    }

    /// Columns are time normal, time accelerated, speed normal, speed accelerated. A missing
    /// sample is an empty cell.
    pub fn write_csv_to<W: Write>(&self, mut writer: csv::Writer<W>) -> Result<(), csv::Error> {
        writer.write_record(&CSV_HEADER)?;
        for i in 0..self.iterations {
            let normal = self.record(i, Mode::Normal);
            let accel = self.record(i, Mode::Accelerated);
            writer.write_record(&[
                cell(normal.map(|r| r.elapsed.as_secs_f64())),
                cell(accel.map(|r| r.elapsed.as_secs_f64())),
                cell(normal.map(|r| r.speed_mbps)),
                cell(accel.map(|r| r.speed_mbps)),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn cell(x: Option<f64>) -> String {
    x.map(|x| x.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod test {
    use super::*;
    use std::time::Duration;
    use tempdir::TempDir;

    fn summary(records: Vec<UploadRecord>, iterations: usize) -> RunSummary {
        RunSummary {
            byte_size: 1 << 20,
            iterations,
            modes: Mode::ALL.to_vec(),
            records,
            failures: Vec::new(),
        }
    }

    fn record(iteration: usize, mode: Mode, secs: f64, speed: f64) -> UploadRecord {
        UploadRecord {
            iteration,
            mode,
            elapsed: Duration::from_secs_f64(secs),
            speed_mbps: speed,
        }
    }

    #[test]
    fn mean_of_samples() {
        assert_eq!(mean(&[10.0, 20.0]).unwrap(), 15.0);
        assert_eq!(mean(&[4.0]).unwrap(), 4.0);
    }

    #[test]
    fn mean_of_nothing() {
        match mean(&[]) {
            Err(Error::EmptySampleSet { .. }) => {}
            other => panic!("{:?}", other),
        }
    }

    #[test]
    fn stats_per_mode() {
        let s = summary(
            vec![
                record(0, Mode::Normal, 1.0, 10.0),
                record(0, Mode::Accelerated, 0.5, 30.0),
                record(1, Mode::Normal, 3.0, 20.0),
            ],
            2,
        );
        let normal = s.mode_stats(Mode::Normal).unwrap();
        assert_eq!(normal.samples, 2);
        assert_eq!(normal.mean_speed, 15.0);
        assert!((normal.mean_time - 2.0).abs() < 1e-9);
        assert_eq!(s.mode_stats(Mode::Accelerated).unwrap().samples, 1);
    }

    #[test]
    fn print_fails_for_mode_without_samples() {
        let s = summary(vec![record(0, Mode::Normal, 1.0, 10.0)], 1);
        let mut out = Vec::new();
        match s.print(&mut out) {
            Err(Error::EmptySampleSet { what }) => assert!(what.contains("accelerated")),
            other => panic!("{:?}", other),
        }
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("normal       mean time 1.00000 s"));
        assert!(out.contains("accelerated  no successful uploads"));
    }

    #[test]
    fn print_table() {
        let s = summary(
            vec![
                record(0, Mode::Normal, 1.0, 10.0),
                record(0, Mode::Accelerated, 0.5, 20.0),
            ],
            1,
        );
        let mut out = Vec::new();
        s.print(&mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        let mut lines = out.lines();
        let header = lines.next().unwrap();
        assert!(header.contains("normal_s"));
        assert!(header.contains("accelerated_MBps"));
        let row = lines.next().unwrap();
        assert!(row.contains("10.00000"));
        assert!(row.contains("20.00000"));
    }

    #[test]
    fn csv_rows_and_columns() {
        let tmp_dir = TempDir::new("upload-speed").unwrap();
        let path = tmp_dir.path().join("out.csv");
        std::fs::write(&path, "stale contents\nthat are much longer than the new file\n\n\n\n").unwrap();
        let s = summary(
            vec![
                record(0, Mode::Normal, 1.0, 10.0),
                record(0, Mode::Accelerated, 0.5, 20.0),
                record(1, Mode::Normal, 2.0, 5.0),
                record(2, Mode::Normal, 4.0, 2.5),
                record(2, Mode::Accelerated, 2.0, 5.0),
            ],
            3,
        );
        s.write_csv(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 4);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(header, CSV_HEADER);
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][0], "1");
        assert_eq!(&rows[0][1], "0.5");
        assert_eq!(&rows[0][2], "10");
        assert_eq!(&rows[0][3], "20");
        assert_eq!(&rows[1][1], "");
        assert_eq!(&rows[1][3], "");
    }
}
