// File: definitions.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

use crate::model::TestCase;
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("unable to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to parse file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Yields the tests to run.
pub trait TestSource {
    fn load(&self) -> Result<Vec<TestCase>, SourceError>;
}

#[derive(Debug, Deserialize)]
struct TestFile {
    #[serde(default)]
    tests: Vec<TestCase>,
}

/// Reads every regular file below a directory as a YAML document holding a
/// `tests` list. Symlinks are ignored and files are read in path order.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectorySource { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TestSource for DirectorySource {
    fn load(&self) -> Result<Vec<TestCase>, SourceError> {
        let mut files = Vec::new();
        collect_files(&self.root, &mut files)?;
        files.sort();

        let mut tests = Vec::new();
        for file in files {
            tests.extend(parse_test_file(&file)?);
        }
        debug!("Loaded {} tests from {}", tests.len(), self.root.display());
        Ok(tests)
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> SourceError + '_ {
    move |source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), SourceError> {
    for entry in fs::read_dir(dir).map_err(io_error(dir))? {
        let entry = entry.map_err(io_error(dir))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(io_error(&path))?;

        if file_type.is_symlink() {
            debug!("Skipping symlink {}", path.display());
        } else if file_type.is_dir() {
            collect_files(&path, files)?;
        } else if file_type.is_file() {
            files.push(path);
        }
    }
    Ok(())
}

pub fn parse_test_file(path: &Path) -> Result<Vec<TestCase>, SourceError> {
    let data = fs::read_to_string(path).map_err(io_error(path))?;
    if data.trim().is_empty() {
        return Ok(Vec::new());
    }
    let file: TestFile = serde_yaml::from_str(&data).map_err(|source| SourceError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(file
        .tests
        .into_iter()
        .map(|mut test| {
            test.filename = filename.clone();
            test
        })
        .collect())
}
