// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Batch mastering front-end core around the Matchering Python library.
//!
//! The heavy lifting happens in an external `python3` process driven by a
//! generated script; this module owns availability probing, the optional
//! user-local install, job validation and worker submission.

use crate::command;
use crate::worker::TaskRunner;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

pub const ACTION_INSTALL: &str = "install-matchering";
pub const ACTION_MASTER: &str = "master";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JobError {
    #[error("No reference track selected")]
    MissingReference,
    #[error("No target track selected")]
    MissingTarget,
    #[error("No output location selected")]
    MissingOutput,
}

/// Processing quality, mapped to Matchering's internal sample rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Quality {
    Fast,
    #[default]
    Standard,
    High,
}

impl Quality {
    pub fn internal_sample_rate(&self) -> u32 {
        match self {
            Quality::Fast => 44100,
            Quality::Standard => 48000,
            Quality::High => 96000,
        }
    }
}

/// User-selectable mastering options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MasteringOptions {
    pub quality: Quality,
    pub normalize: bool,
    pub limiter: bool,
}

impl Default for MasteringOptions {
    fn default() -> Self {
        Self {
            quality: Quality::Standard,
            normalize: true,
            limiter: true,
        }
    }
}

/// One mastering run: match `target` against `reference`, write `output`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasteringJob {
    pub target: PathBuf,
    pub reference: PathBuf,
    pub output: PathBuf,
    pub options: MasteringOptions,
}

impl MasteringJob {
    /// All three paths are required before a run can start.
    pub fn validate(&self) -> Result<(), JobError> {
        if self.reference.as_os_str().is_empty() {
            return Err(JobError::MissingReference);
        }
        if self.target.as_os_str().is_empty() {
            return Err(JobError::MissingTarget);
        }
        if self.output.as_os_str().is_empty() {
            return Err(JobError::MissingOutput);
        }
        Ok(())
    }

    /// Generate the Python driver script fed to `python3 -c`.
    pub fn driver_script(&self) -> String {
        let mut script = String::from("import matchering as mg\nconfig = mg.Config()\n");
        script.push_str(&format!(
            "config.internal_sample_rate = {}\n",
            self.options.quality.internal_sample_rate()
        ));
        if !self.options.normalize {
            script.push_str("config.normalize_loudness = False\n");
        }
        if !self.options.limiter {
            script.push_str("config.use_limiter = False\n");
        }
        script.push_str(&format!(
            "mg.process(target={target:?}, reference={reference:?}, results=[mg.pcm16({output:?})], config=config)\n",
            target = self.target.to_string_lossy(),
            reference = self.reference.to_string_lossy(),
            output = self.output.to_string_lossy(),
        ));
        script
    }
}

/// Whether the Matchering library is importable by the system python3.
pub fn is_available() -> bool {
    command::run("python3", &["-c", "import matchering"]).success()
}

/// Install Matchering into the user's site-packages on a worker. Install
/// failure is terminal for the mastering window.
pub fn install(runner: &TaskRunner) -> bool {
    runner.submit(ACTION_INSTALL, || {
        let out = command::run("pip3", &["install", "--user", "matchering"]);
        if out.success() {
            info!("Matchering installed");
            Ok(String::new())
        } else {
            Err(out.error_text().to_string())
        }
    })
}

/// Validate and run a mastering job on a worker.
pub fn run_job(runner: &TaskRunner, job: MasteringJob) -> Result<bool, JobError> {
    job.validate()?;

    let submitted = runner.submit(ACTION_MASTER, move || {
        let script = job.driver_script();
        let out = command::run("python3", &["-c", &script]);
        if out.success() {
            info!("Mastered {} -> {}", job.target.display(), job.output.display());
            Ok(job.output.to_string_lossy().into_owned())
        } else {
            Err(out.error_text().to_string())
        }
    });

    Ok(submitted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_job() -> MasteringJob {
        MasteringJob {
            target: PathBuf::from("/music/demo.wav"),
            reference: PathBuf::from("/music/reference.flac"),
            output: PathBuf::from("/music/demo_mastered.wav"),
            options: MasteringOptions::default(),
        }
    }

    #[test]
    fn test_quality_sample_rates() {
        assert_eq!(Quality::Fast.internal_sample_rate(), 44100);
        assert_eq!(Quality::Standard.internal_sample_rate(), 48000);
        assert_eq!(Quality::High.internal_sample_rate(), 96000);
    }

    #[test]
    fn test_validation() {
        assert_eq!(test_job().validate(), Ok(()));

        let mut job = test_job();
        job.reference = PathBuf::new();
        assert_eq!(job.validate(), Err(JobError::MissingReference));

        let mut job = test_job();
        job.target = PathBuf::new();
        assert_eq!(job.validate(), Err(JobError::MissingTarget));

        let mut job = test_job();
        job.output = PathBuf::new();
        assert_eq!(job.validate(), Err(JobError::MissingOutput));
    }

    #[test]
    fn test_driver_script_defaults() {
        let script = test_job().driver_script();
        assert!(script.contains("import matchering as mg"));
        assert!(script.contains("config.internal_sample_rate = 48000"));
        // Defaults stay enabled, so no override lines.
        assert!(!script.contains("normalize_loudness"));
        assert!(!script.contains("use_limiter"));
        assert!(script.contains("mg.pcm16(\"/music/demo_mastered.wav\")"));
    }

    #[test]
    fn test_driver_script_overrides() {
        let mut job = test_job();
        job.options = MasteringOptions {
            quality: Quality::High,
            normalize: false,
            limiter: false,
        };
        let script = job.driver_script();
        assert!(script.contains("config.internal_sample_rate = 96000"));
        assert!(script.contains("config.normalize_loudness = False"));
        assert!(script.contains("config.use_limiter = False"));
    }
}
