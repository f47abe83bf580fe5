//! src/collection/trec.rs
use crate::collection::{CollectionError, Indexable, InputFormat};
use crate::file_splitter::InputSplit;
use crate::storage::{FileSystem, ReadSeek};
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::PathBuf;

const DOC_START: &[u8] = b"<DOC>";
const DOC_END: &[u8] = b"</DOC>";
const DOCNO_START: &str = "<DOCNO>";
const DOCNO_END: &str = "</DOCNO>";

/// One `<DOC> ... </DOC>` record of a TREC SGML collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrecDocument {
    docid: String,
    content: String,
}

impl TrecDocument {
    /// Parses a raw record; the docid is the trimmed `<DOCNO>` body.
    pub fn parse(content: String) -> Option<Self> {
        let start = content.find(DOCNO_START)? + DOCNO_START.len();
        let end = start + content[start..].find(DOCNO_END)?;
        let docid = content[start..end].trim();
        if docid.is_empty() {
            return None;
        }
        Some(TrecDocument {
            docid: docid.to_string(),
            content,
        })
    }
}

impl Indexable for TrecDocument {
    fn docid(&self) -> &str {
        &self.docid
    }

    fn content(&self) -> &str {
        &self.content
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TrecDocumentInputFormat;

impl InputFormat for TrecDocumentInputFormat {
    type Document = TrecDocument;
    type Reader = TrecDocumentReader;

    fn create_reader(
        &self,
        split: &InputSplit,
        fs: &dyn FileSystem,
    ) -> Result<TrecDocumentReader, CollectionError> {
        TrecDocumentReader::new(split, fs)
    }
}

/// Reads the documents whose `<DOC>` tag starts inside a split. The last
/// document may run past the end of the split; the next split skips it.
pub struct TrecDocumentReader {
    path: PathBuf,
    reader: BufReader<Box<dyn ReadSeek>>,
    pos: u64,
    end: u64,
    buffer: Vec<u8>,
    done: bool,
}

impl TrecDocumentReader {
    pub fn new(split: &InputSplit, fs: &dyn FileSystem) -> Result<Self, CollectionError> {
        let io_err = |source| CollectionError::Io {
            path: split.path().to_path_buf(),
            source,
        };
        let mut file = fs.open(split.path()).map_err(io_err)?;
        file.seek(SeekFrom::Start(split.start())).map_err(io_err)?;
        Ok(TrecDocumentReader {
            path: split.path().to_path_buf(),
            reader: BufReader::new(file),
            pos: split.start(),
            end: split.end(),
            buffer: Vec::new(),
            done: false,
        })
    }

    // Outside a record, give up as soon as the candidate tag would start at
    // or past the end of the split.
    fn read_until_match(&mut self, tag: &[u8], within_record: bool) -> io::Result<bool> {
        let mut matched = 0;
        let mut byte = [0u8; 1];
        loop {
            if self.reader.read(&mut byte)? == 0 {
                return Ok(false);
            }
            self.pos += 1;
            if within_record {
                self.buffer.push(byte[0]);
            }
            if byte[0] == tag[matched] {
                matched += 1;
                if matched == tag.len() {
                    return Ok(true);
                }
            } else {
                matched = usize::from(byte[0] == tag[0]);
            }
            if !within_record && self.pos - matched as u64 >= self.end {
                return Ok(false);
            }
        }
    }

    fn next_document(&mut self) -> Result<Option<(u64, TrecDocument)>, CollectionError> {
        let io_err = |path: &PathBuf| {
            let path = path.clone();
            move |source| CollectionError::Io { path, source }
        };
        if self.pos >= self.end {
            return Ok(None);
        }
        if !self
            .read_until_match(DOC_START, false)
            .map_err(io_err(&self.path))?
        {
            return Ok(None);
        }
        let offset = self.pos - DOC_START.len() as u64;

        self.buffer.clear();
        self.buffer.extend_from_slice(DOC_START);
        if !self
            .read_until_match(DOC_END, true)
            .map_err(io_err(&self.path))?
        {
            return Err(CollectionError::MalformedDocument {
                path: self.path.clone(),
                offset,
                reason: "missing </DOC>",
            });
        }

        let raw = String::from_utf8_lossy(&self.buffer).into_owned();
        let document =
            TrecDocument::parse(raw).ok_or_else(|| CollectionError::MalformedDocument {
                path: self.path.clone(),
                offset,
                reason: "missing or empty <DOCNO>",
            })?;
        Ok(Some((offset, document)))
    }
}

impl Iterator for TrecDocumentReader {
    type Item = Result<(u64, TrecDocument), CollectionError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_document() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
