use std::{fs, io};
use std::path::{Path, PathBuf};
use std::fmt::Debug;

use crate::error::{Fault, Result, Chainable};

/// Something text can be written to.
pub trait Sink: Debug {
    fn write(&self, contents: &str) -> Result<()>;
}

impl Sink for fs::File {
    fn write(&self, contents: &str) -> Result<()> {
        use io::Write;

        let mut file = io::BufWriter::new(self);
        file.write_all(contents.as_bytes())?;
        Ok(file.flush()?)
    }
}

/// Writing to a path creates any missing parent directories first.
impl Sink for &Path {
    fn write(&self, contents: &str) -> Result<()> {
        if let Some(parent) = self.parent() {
            fs::create_dir_all(parent)
                .chain(error! {
                    "failed to create output directory",
                    "directory path" => parent.display()
                })
                .fault(Fault::OutputWrite)?;
        }

        fs::File::create(self)
            .chain(error! {
                "failed to open/create file for writing",
                "file path" => self.display()
            })
            .and_then(|file| file.write(contents))
            .fault(Fault::OutputWrite)
    }
}

impl Sink for PathBuf {
    fn write(&self, contents: &str) -> Result<()> {
        <&Path as Sink>::write(&self.as_path(), contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Source;

    #[test]
    fn path_sink_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("atoms-buttons").join("atoms-buttons.html");
        target.write("<button>").unwrap();

        let contents = target.as_path().read().unwrap();
        assert_eq!(contents, "<button>");
    }

    #[test]
    fn missing_source_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("data.json");
        assert!(missing.as_path().read_if_exists().unwrap().is_none());
        assert!(missing.as_path().read().is_err());
    }

    #[test]
    fn unwritable_destination_is_an_output_fault() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        blocker.write("file, not a directory").unwrap();

        let error = blocker.join("page.html").write("x").unwrap_err();
        assert_eq!(error.fault(), Some(Fault::OutputWrite));
        assert!(error.to_string().contains("blocker"));
    }
}
