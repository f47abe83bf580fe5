//! src/docno/trec.rs
use crate::docno::{DocnoMapping, LoadError, LookupError};
use crate::storage::FileSystem;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Docno mapping for TREC collections.
///
/// The artifact is the sorted list of every docid in the collection:
/// a big-endian `u32` count, then each docid as a big-endian `u16` byte
/// length followed by its UTF-8 bytes. A docid's docno is its 1-based rank.
#[derive(Debug, Default)]
pub struct TrecDocnoMapping {
    docids: Vec<String>,
}

crate::register_docno_mapping!(TrecDocnoMapping, "trec");

impl TrecDocnoMapping {
    /// Writes a mapping artifact covering `docids`. Duplicates are dropped.
    /// Returns the number of distinct docids written.
    #[tracing::instrument(name = "Write TREC docno mapping", skip(docids, fs))]
    pub fn write_mapping<I, S>(docids: I, path: &Path, fs: &dyn FileSystem) -> io::Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut docids: Vec<String> = docids.into_iter().map(Into::into).collect();
        docids.sort_unstable();
        docids.dedup();

        let count = u32::try_from(docids.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "too many docids"))?;
        let mut writer = BufWriter::new(fs.create(path)?);
        writer.write_all(&count.to_be_bytes())?;
        for docid in &docids {
            let len = u16::try_from(docid.len()).map_err(|_| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("docid '{docid}' is too long"),
                )
            })?;
            writer.write_all(&len.to_be_bytes())?;
            writer.write_all(docid.as_bytes())?;
        }
        writer.flush()?;
        Ok(docids.len())
    }

    fn read_docids(reader: &mut impl Read, path: &Path) -> Result<Vec<String>, LoadError> {
        let read_err = |source: io::Error| {
            if source.kind() == io::ErrorKind::UnexpectedEof {
                LoadError::corrupt(path, "unexpected end of file")
            } else {
                LoadError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        };

        let mut count = [0u8; 4];
        reader.read_exact(&mut count).map_err(read_err)?;
        let count = u32::from_be_bytes(count) as usize;

        let mut docids: Vec<String> = Vec::with_capacity(count.min(1 << 20));
        let mut len = [0u8; 2];
        for i in 0..count {
            reader.read_exact(&mut len).map_err(read_err)?;
            let mut bytes = vec![0u8; u16::from_be_bytes(len) as usize];
            reader.read_exact(&mut bytes).map_err(read_err)?;
            let docid = String::from_utf8(bytes)
                .map_err(|_| LoadError::corrupt(path, format!("entry {i} is not valid UTF-8")))?;
            if docids.last().is_some_and(|previous| *previous >= docid) {
                return Err(LoadError::corrupt(
                    path,
                    format!("entry {i} '{docid}' is out of order"),
                ));
            }
            docids.push(docid);
        }

        let mut trailing = [0u8; 1];
        match reader.read(&mut trailing) {
            Ok(0) => Ok(docids),
            Ok(_) => Err(LoadError::corrupt(path, "trailing bytes after last entry")),
            Err(source) => Err(read_err(source)),
        }
    }
}

impl DocnoMapping for TrecDocnoMapping {
    #[tracing::instrument(name = "Load TREC docno mapping", skip(self, fs))]
    fn load(&mut self, path: &Path, fs: &dyn FileSystem) -> Result<(), LoadError> {
        let file = fs.open(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.docids = Self::read_docids(&mut BufReader::new(file), path)?;
        tracing::debug!("Loaded {} docids", self.docids.len());
        Ok(())
    }

    fn docno(&self, docid: &str) -> Result<u32, LookupError> {
        self.docids
            .binary_search_by(|probe| probe.as_str().cmp(docid))
            .map(|index| index as u32 + 1)
            .map_err(|_| LookupError::UnknownDocid(docid.to_string()))
    }

    fn docid(&self, docno: u32) -> Option<&str> {
        let index = docno.checked_sub(1)? as usize;
        self.docids.get(index).map(String::as_str)
    }

    fn len(&self) -> usize {
        self.docids.len()
    }
}
