use std::{fs, io};
use std::path::Path;
use std::fmt::Debug;

use crate::error::{Result, Chainable};

/// Something text can be read from.
pub trait Source: Debug {
    fn read(self) -> Result<String>;

    fn path(&self) -> Option<&Path> {
        None
    }

    /// Like [`Source::read()`] but an absent source reads as `None`.
    fn read_if_exists(self) -> Result<Option<String>> where Self: Sized {
        match self.path() {
            Some(path) if !path.exists() => Ok(None),
            _ => self.read().map(Some),
        }
    }
}

impl Source for String {
    fn read(self) -> Result<String> {
        Ok(self)
    }
}

impl Source for &fs::File {
    fn read(self) -> Result<String> {
        use io::Read;

        let mut string = String::new();
        io::BufReader::new(self).read_to_string(&mut string)?;
        Ok(string)
    }
}

impl Source for &Path {
    fn read(self) -> Result<String> {
        let file = fs::File::open(self).chain(error! {
            "failed to open file for reading",
            "file path" => self.display()
        })?;

        file.read().chain_with(|| error! {
            "failed to read file as UTF-8 text",
            "file path" => self.display()
        })
    }

    fn path(&self) -> Option<&Path> {
        Some(self)
    }
}
