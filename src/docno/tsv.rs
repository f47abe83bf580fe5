//! src/docno/tsv.rs
use crate::docno::{DocnoMapping, LoadError, LookupError};
use crate::storage::FileSystem;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Docno mapping stored as `docid<TAB>docno` lines, for collections whose
/// numbering is assigned elsewhere. Blank lines are ignored.
#[derive(Debug, Default)]
pub struct TsvDocnoMapping {
    docnos: HashMap<String, u32>,
    docids: HashMap<u32, String>,
}

crate::register_docno_mapping!(TsvDocnoMapping, "tsv");

impl DocnoMapping for TsvDocnoMapping {
    #[tracing::instrument(name = "Load TSV docno mapping", skip(self, fs))]
    fn load(&mut self, path: &Path, fs: &dyn FileSystem) -> Result<(), LoadError> {
        let io_err = |source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        };
        let reader = BufReader::new(fs.open(path).map_err(io_err)?);

        let mut docnos = HashMap::new();
        let mut docids = HashMap::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line.map_err(io_err)?;
            let line_no = index + 1;
            if line.trim().is_empty() {
                continue;
            }
            let (docid, docno) = line
                .split_once('\t')
                .ok_or_else(|| LoadError::corrupt(path, format!("line {line_no} has no tab")))?;
            let docid = docid.trim();
            if docid.is_empty() {
                return Err(LoadError::corrupt(
                    path,
                    format!("line {line_no} has an empty docid"),
                ));
            }
            let docno: u32 = docno.trim().parse().map_err(|_| {
                LoadError::corrupt(path, format!("line {line_no} has an invalid docno"))
            })?;

            match docids.entry(docno) {
                Entry::Occupied(_) => {
                    return Err(LoadError::corrupt(
                        path,
                        format!("line {line_no} reuses docno {docno}"),
                    ));
                }
                Entry::Vacant(slot) => {
                    slot.insert(docid.to_string());
                }
            }
            if docnos.insert(docid.to_string(), docno).is_some() {
                return Err(LoadError::corrupt(
                    path,
                    format!("line {line_no} repeats docid '{docid}'"),
                ));
            }
        }

        tracing::debug!("Loaded {} docids", docnos.len());
        self.docnos = docnos;
        self.docids = docids;
        Ok(())
    }

    fn docno(&self, docid: &str) -> Result<u32, LookupError> {
        self.docnos
            .get(docid)
            .copied()
            .ok_or_else(|| LookupError::UnknownDocid(docid.to_string()))
    }

    fn docid(&self, docno: u32) -> Option<&str> {
        self.docids.get(&docno).map(String::as_str)
    }

    fn len(&self) -> usize {
        self.docnos.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalFileSystem;
    use claims::{assert_matches, assert_ok, assert_ok_eq};

    fn load(contents: &str) -> Result<TsvDocnoMapping, LoadError> {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("docno.tsv");
        std::fs::write(&path, contents).expect("Failed to write mapping");
        let mut mapping = TsvDocnoMapping::default();
        mapping.load(&path, &LocalFileSystem).map(|_| mapping)
    }

    #[test]
    fn resolves_both_directions() {
        let mapping = assert_ok!(load("clueweb-00\t17\n\nclueweb-01\t3\n"));
        assert_eq!(mapping.len(), 2);
        assert_ok_eq!(mapping.docno("clueweb-00"), 17);
        assert_eq!(mapping.docid(3), Some("clueweb-01"));
        assert_matches!(mapping.docno("clueweb-02"), Err(LookupError::UnknownDocid(_)));
    }

    #[test]
    fn whitespace_around_either_column_is_ignored() {
        let mapping = assert_ok!(load("A \t 1\n  B\t2 \n"));
        assert_ok_eq!(mapping.docno("A"), 1);
        assert_ok_eq!(mapping.docno("B"), 2);
        assert_eq!(mapping.docid(1), Some("A"));
        assert_matches!(load(" \t3\n"), Err(LoadError::Corrupt { .. }));
    }

    #[test]
    fn shared_docno_is_corrupt() {
        assert_matches!(load("a\t1\nb\t1\n"), Err(LoadError::Corrupt { .. }));
    }

    #[test]
    fn repeated_docid_is_corrupt() {
        assert_matches!(load("a\t1\na\t2\n"), Err(LoadError::Corrupt { .. }));
    }

    #[test]
    fn malformed_lines_are_corrupt() {
        assert_matches!(load("a 1\n"), Err(LoadError::Corrupt { .. }));
        assert_matches!(load("a\tone\n"), Err(LoadError::Corrupt { .. }));
    }
}
