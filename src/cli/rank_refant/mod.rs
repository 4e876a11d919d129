// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Rank candidate reference antennas from a scenario file.
//!
//! A scenario file captures the metadata the ranking heuristics need (the
//! array layout, the spectral windows, and a flagging summary), so rankings
//! can be inspected offline without a pipeline run.


use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::Args;
use hifitime::Duration;
use indexmap::IndexMap;
use itertools::Itertools;
use log::{debug, warn};
use marlu::LatLngHeight;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use vec1::Vec1;

use super::{CaltuneError, InfoPrinter, ScenarioError};
use crate::context::{FlagSummary, ObsContext, Spw};
use crate::refant::{rank_refant, ExclusionSet, RefantHeuristics};

lazy_static::lazy_static! {
    static ref SCENARIO_TYPES_COMMA_SEPARATED: String = ScenarioFileType::iter().join(", ");

    static ref SCENARIO_HELP: String = format!(
        "Path to the scenario file describing the array, its spectral windows and its flagging summary. Supported formats: {}",
        *SCENARIO_TYPES_COMMA_SEPARATED
    );
}

#[derive(Debug, Display, EnumIter, EnumString)]
enum ScenarioFileType {
    #[strum(serialize = "toml")]
    Toml,

    #[strum(serialize = "json")]
    Json,
}

#[derive(Debug, Args)]
pub(super) struct RankRefantArgs {
    #[clap(name = "SCENARIO_FILE", help = SCENARIO_HELP.as_str())]
    scenario: PathBuf,

    /// The comma-separated observational intents to score flagging statistics
    /// against.
    #[clap(short, long, default_value = "BANDPASS")]
    intents: String,

    /// Don't score antennas by centrality in the array.
    #[clap(long)]
    no_geometry: bool,

    /// Don't score antennas by flagging statistics.
    #[clap(long)]
    no_flagging: bool,

    /// Antennas to exclude from the ranking.
    #[clap(short, long, use_value_delimiter = true)]
    exclude: Vec<String>,
}

impl RankRefantArgs {
    pub(super) fn run(self) -> Result<(), CaltuneError> {
        let (ctx, summary) = Scenario::load(&self.scenario)?.into_parts(&self.scenario)?;

        for name in &self.exclude {
            if !ctx.antenna_names.iter().any(|n| n == name) {
                warn!("Excluded antenna '{name}' is not in the scenario");
            }
        }
        let exclusion: ExclusionSet = self.exclude.into_iter().collect();
        let heuristics = RefantHeuristics {
            geometry: !self.no_geometry,
            flagging: !self.no_flagging,
        };

        let ranked = rank_refant(&ctx, &summary, &self.intents, heuristics, &exclusion);
        if ranked.is_empty() {
            warn!("No reference antenna could be nominated");
            return Ok(());
        }

        let mut printer = InfoPrinter::new("Ranked reference antennas".into());
        for (i_antenna, name) in ranked.iter().enumerate() {
            printer.push_line(format!("{:>3}: {name}", i_antenna + 1).into());
        }
        printer.display();
        Ok(())
    }
}

/// The on-disk description of an array and its flagging statistics.
#[derive(Debug, Deserialize, Serialize)]
pub(crate) struct Scenario {
    #[serde(default)]
    antenna: Vec<ScenarioAntenna>,

    #[serde(default)]
    spw: Vec<ScenarioSpw>,

    /// The nominal integration time \[seconds\].
    #[serde(default = "default_time_res_s")]
    time_res_s: f64,

    /// Intent -> antenna name -> unflagged sample count.
    #[serde(default)]
    flag_summary: IndexMap<String, IndexMap<String, u64>>,
}

fn default_time_res_s() -> f64 {
    8.0
}

#[derive(Debug, Deserialize, Serialize)]
struct ScenarioAntenna {
    name: String,
    longitude_deg: f64,
    latitude_deg: f64,
    #[serde(default)]
    height_m: f64,
}

#[derive(Debug, Deserialize, Serialize)]
struct ScenarioSpw {
    spw_id: usize,
    num_chans: usize,
    #[serde(default)]
    baseband: usize,
}

impl Scenario {
    pub(crate) fn load(path: &Path) -> Result<Scenario, ScenarioError> {
        let file_type = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| ScenarioFileType::from_str(&e).ok());

        let mut contents = String::new();
        match file_type {
            Some(ScenarioFileType::Toml) => {
                debug!("Parsing toml scenario {}", path.display());
                let mut fh = File::open(path)?;
                fh.read_to_string(&mut contents)?;
                toml::from_str(&contents).map_err(|err| ScenarioError::Toml {
                    path: path.display().to_string(),
                    err: err.to_string(),
                })
            }

            Some(ScenarioFileType::Json) => {
                debug!("Parsing json scenario {}", path.display());
                let mut fh = File::open(path)?;
                fh.read_to_string(&mut contents)?;
                serde_json::from_str(&contents).map_err(|err| ScenarioError::Json {
                    path: path.display().to_string(),
                    err: err.to_string(),
                })
            }

            None => Err(ScenarioError::UnrecognisedExtension {
                path: path.display().to_string(),
                supported: SCENARIO_TYPES_COMMA_SEPARATED.clone(),
            }),
        }
    }

    pub(crate) fn into_parts(
        self,
        path: &Path,
    ) -> Result<(ObsContext, FlagSummary), ScenarioError> {
        let antenna_names = Vec1::try_from_vec(
            self.antenna.iter().map(|a| a.name.clone()).collect(),
        )
        .map_err(|_| ScenarioError::NoAntennas {
            path: path.display().to_string(),
        })?;
        let antenna_positions = Vec1::try_from_vec(
            self.antenna
                .iter()
                .map(|a| LatLngHeight {
                    longitude_rad: a.longitude_deg.to_radians(),
                    latitude_rad: a.latitude_deg.to_radians(),
                    height_metres: a.height_m,
                })
                .collect(),
        )
        .expect("as long as the names");
        let spws = Vec1::try_from_vec(
            self.spw
                .iter()
                .map(|spw| Spw {
                    spw_id: spw.spw_id,
                    num_chans: spw.num_chans,
                    baseband: spw.baseband,
                })
                .collect(),
        )
        .map_err(|_| ScenarioError::NoSpws {
            path: path.display().to_string(),
        })?;

        let mut summary = FlagSummary::new();
        for (intent, counts) in &self.flag_summary {
            for (antenna, unflagged) in counts {
                summary.insert(intent, antenna, *unflagged);
            }
        }

        Ok((
            ObsContext {
                antenna_names,
                antenna_positions,
                time_res: Duration::from_seconds(self.time_res_s),
                spws,
            },
            summary,
        ))
    }
}
