use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use crate::{Error, ParticleSnapshot, PinningSite, Result, State};

/// Layout of the trajectory file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrajectoryFormat {
    /// Binary frames for the cmovie plotter, in native byte order.
    CMovie,
    /// Text zones readable by tecplot.
    Tecplot,
}

impl TrajectoryFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            TrajectoryFormat::CMovie => "mvi",
            TrajectoryFormat::Tecplot => "dat",
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct CMovieHeader {
    particle_count: i32,
    step: i32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct CMovieRecord {
    color: i32,
    id: i32,
    x: f32,
    y: f32,
    cum_disp: f32,
}

/// cmovie reserves colors 0 and 1.
const CMOVIE_COLOR_OFFSET: i32 = 2;

/// cmovie stores counts and ids as 32-bit signed integers.
fn cmovie_int(value: usize, what: &str) -> Result<i32> {
    i32::try_from(value).map_err(|_| Error::InvalidConfig(format!(
        "{} {} does not fit a cmovie frame", what, value
    )))
}

/// Frame sink for particle snapshots.
pub struct TrajectoryWriter {
    format: TrajectoryFormat,
    writer: BufWriter<File>,
    frames: usize,
}

impl TrajectoryWriter {
    /// Create (or truncate) `path` and write the format header, if any.
    pub fn create(path: &Path, format: TrajectoryFormat) -> Result<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        if format == TrajectoryFormat::Tecplot {
            writeln!(writer, "VARIABLES = \"X\" , \"Y\", \"Z\", \"R\", \"G\", \"B\"")?;
        }
        Ok(Self {
            format,
            writer,
            frames: 0,
        })
    }

    pub fn write_frame(&mut self, step: usize, particles: &[ParticleSnapshot]) -> Result<()> {
        match self.format {
            TrajectoryFormat::CMovie => {
                let header = CMovieHeader {
                    particle_count: cmovie_int(particles.len(), "particle count")?,
                    step: cmovie_int(step, "step")?,
                };
                let records = particles
                    .iter()
                    .map(|p| {
                        Ok(CMovieRecord {
                            color: i32::from(p.class) + CMOVIE_COLOR_OFFSET,
                            id: cmovie_int(p.id, "particle id")?,
                            x: p.x as f32,
                            y: p.y as f32,
                            cum_disp: 1.0,
                        })
                    })
                    .collect::<Result<Vec<CMovieRecord>>>()?;
                self.writer.write_all(bytemuck::bytes_of(&header))?;
                self.writer.write_all(bytemuck::cast_slice(&records))?;
            }
            TrajectoryFormat::Tecplot => {
                writeln!(self.writer, "ZONE T=\"{}\"  I={} J={}, F=POINT ", step, particles.len(), 1)?;
                for p in particles {
                    let (r, g, b) = match p.class {
                        0 => (1.0, 0.0, 0.0),
                        1 => (0.0, 0.0, 1.0),
                        _ => (0.5, 0.5, 0.5),
                    };
                    writeln!(self.writer, "{:.6} {:.6} {:.6} {:.6} {:.6} {:.6}",
                             p.x, p.y, 0.0, r, g, b)?;
                }
            }
        }
        self.frames += 1;
        Ok(())
    }

    pub fn frames_written(&self) -> usize {
        self.frames
    }

    /// Flush buffered frames. Dropping the writer without calling this loses
    /// any write error.
    pub fn finish(mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[derive(Serialize)]
struct StatisticsRecord {
    step: usize,
    mean_force_x: f64,
}

/// Per-step scalar statistics in CSV.
pub struct StatisticsWriter {
    writer: csv::Writer<File>,
}

impl StatisticsWriter {
    pub fn create(path: &Path) -> Result<Self> {
        let writer = csv::Writer::from_path(path)?;
        Ok(Self { writer })
    }

    pub fn write(&mut self, step: usize, mean_force_x: f64) -> Result<()> {
        self.writer.serialize(StatisticsRecord { step, mean_force_x })?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Formats like C's `%e`: six digit mantissa and a signed two digit exponent.
fn format_scientific(value: f64) -> String {
    let formatted = format!("{:.6e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => formatted,
    }
}

/// Dump pinning site geometry: the site count, then `x y r r r` per site,
/// one value per line.
pub fn write_contour_file(path: &Path, sites: &[PinningSite]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "{}", sites.len())?;
    for site in sites {
        for value in [site.position.x, site.position.y, site.radius, site.radius, site.radius] {
            writeln!(writer, "{}", format_scientific(value))?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Save the whole state as pretty JSON.
pub fn save_state_to_file(state: &State, path: &Path) -> Result<()> {
    let file = OpenOptions::new().create(true).truncate(true).write(true).open(path)?;
    let mut buf_writer = BufWriter::new(file);
    serde_json::ser::to_writer_pretty(&mut buf_writer, state)?;
    buf_writer.flush()?;
    Ok(())
}

pub fn load_state_from_file(path: &Path) -> Result<State> {
    let file = File::open(path)?;
    let state = serde_json::de::from_reader(BufReader::new(file))?;
    Ok(state)
}

/// Append one `label particles seconds` line to a timing log.
pub fn append_timing(path: &Path, label: &str, particles: usize, seconds: f64) -> Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{} {} {:.6}", label, particles, seconds)?;
    Ok(())
}
