//! # Data File - append-only record log
//!
//! The single source of truth for the todo key-value engine. Every mutation
//! (`PUT` or `DELETE`) is framed, checksummed and appended to the end of the
//! file; nothing is ever rewritten in place. The engine keeps an in-memory
//! key directory pointing at the latest record for each key and serves reads
//! by seeking straight to that record.
//!
//! ## Binary Record Format
//!
//! ```text
//! [record_len: u32 LE][crc32: u32 LE][body ...]
//! ```
//!
//! Body (Put): `[op=0: u8][key_len: u32][key][val_len: u32][value]`
//! Body (Del): `[op=1: u8][key_len: u32][key]`
//!
//! `record_len` includes the 4-byte CRC but **not** itself.
//!
//! ## Example
//!
//! ```rust,no_run
//! use datafile::{DataFileReader, DataFileWriter, Record};
//!
//! let mut w = DataFileWriter::open("data.log", true).unwrap();
//! let pos = w
//!     .append(&Record::Put {
//!         key: b"hello".to_vec(),
//!         value: b"world".to_vec(),
//!     })
//!     .unwrap();
//! drop(w);
//!
//! let file = std::fs::File::open("data.log").unwrap();
//! let rec = datafile::read_at(&file, pos).unwrap();
//! assert_eq!(rec.key(), b"hello");
//!
//! let mut r = DataFileReader::open("data.log").unwrap();
//! r.replay(|pos, rec| println!("{:?} @ {}", rec, pos.offset)).unwrap();
//! ```

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use crc32fast::Hasher as Crc32;
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;

use thiserror::Error;

/// Size of the frame header: `record_len` + `crc32`.
pub const HEADER_LEN: u64 = 8;

/// Upper bound on a single frame body. Anything larger is treated as corruption.
const MAX_RECORD_SIZE: u32 = 64 * 1024 * 1024;

const OP_PUT: u8 = 0;
const OP_DEL: u8 = 1;

/// A single record in the data file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// A key-value insertion or overwrite.
    Put {
        /// The lookup key.
        key: Vec<u8>,
        /// The payload value.
        value: Vec<u8>,
    },
    /// A key deletion (tombstone).
    Del {
        /// The key to delete.
        key: Vec<u8>,
    },
}

impl Record {
    /// Returns the key this record refers to.
    pub fn key(&self) -> &[u8] {
        match self {
            Record::Put { key, .. } | Record::Del { key } => key,
        }
    }
}

/// Location of one complete frame inside the data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordPos {
    /// Byte offset of the frame header.
    pub offset: u64,
    /// Total frame length, header included.
    pub len: u64,
}

impl RecordPos {
    /// Offset of the first byte after this frame.
    pub fn end(&self) -> u64 {
        self.offset + self.len
    }
}

/// Errors that can occur while reading or writing the data file.
#[derive(Debug, Error)]
pub enum DataFileError {
    /// An underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// A record failed CRC validation, carried an unknown op code, or had an
    /// impossible length.
    #[error("corrupt record")]
    Corrupt,
}

/// Append-only data file writer.
///
/// Records are serialized into an in-memory buffer, CRC-checksummed, and then
/// written in a single `write_all` call. When `sync` is `true`, every append
/// is followed by `sync_all()` so the record is durable before the call
/// returns.
pub struct DataFileWriter {
    file: File,
    sync: bool,
    /// Current file length; the offset the next frame will land at.
    len: u64,
    /// Reusable scratch buffer to avoid allocation on every append.
    buf: Vec<u8>,
}

impl DataFileWriter {
    /// Opens (or creates) a data file in append mode.
    ///
    /// # Arguments
    ///
    /// * `path` - file system path for the data file (created if missing).
    /// * `sync` - if true, every `append` call is followed by `fsync`.
    pub fn open<P: AsRef<Path>>(path: P, sync: bool) -> Result<Self, DataFileError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .read(true)
            .open(path)?;
        let len = file.metadata()?.len();
        Ok(Self {
            file,
            sync,
            len,
            buf: Vec::with_capacity(256),
        })
    }

    /// Number of bytes in the file, i.e. the offset of the next append.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Returns `true` when nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Serializes `record`, appends it and returns where it landed.
    pub fn append(&mut self, record: &Record) -> Result<RecordPos, DataFileError> {
        self.buf.clear();

        // Header placeholder, filled once the body is known.
        self.buf.extend_from_slice(&[0u8; HEADER_LEN as usize]);

        match record {
            Record::Put { key, value } => {
                self.buf.write_u8(OP_PUT)?;
                write_chunk(&mut self.buf, key)?;
                write_chunk(&mut self.buf, value)?;
            }
            Record::Del { key } => {
                self.buf.write_u8(OP_DEL)?;
                write_chunk(&mut self.buf, key)?;
            }
        }

        let body = &self.buf[HEADER_LEN as usize..];
        let mut hasher = Crc32::new();
        hasher.update(body);
        let crc = hasher.finalize();

        let record_len = (body.len() as u64) + 4;
        if record_len > u64::from(MAX_RECORD_SIZE) {
            return Err(DataFileError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "record too large for the data file frame",
            )));
        }

        self.buf[0..4].copy_from_slice(&(record_len as u32).to_le_bytes());
        self.buf[4..8].copy_from_slice(&crc.to_le_bytes());

        self.file.write_all(&self.buf)?;
        self.file.flush()?;

        if self.sync {
            self.file.sync_all()?;
        }

        let pos = RecordPos {
            offset: self.len,
            len: self.buf.len() as u64,
        };
        self.len = pos.end();
        Ok(pos)
    }

    /// Forces all written data to disk via `sync_all()`.
    ///
    /// Useful when `sync` is `false` and the caller wants durability at a
    /// specific point (before a rename, on shutdown).
    pub fn sync_to_disk(&mut self) -> Result<(), DataFileError> {
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }
}

fn write_chunk(buf: &mut Vec<u8>, bytes: &[u8]) -> io::Result<()> {
    let len = u32::try_from(bytes.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "chunk exceeds u32::MAX"))?;
    buf.write_u32::<LittleEndian>(len)?;
    buf.extend_from_slice(bytes);
    Ok(())
}

/// Sequential reader used at startup to rebuild the key directory.
///
/// Generic over any `Read` implementor so tests can replay in-memory buffers.
pub struct DataFileReader<R: Read> {
    rdr: BufReader<R>,
}

impl DataFileReader<File> {
    /// Opens an existing data file for sequential replay.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<DataFileReader<File>, DataFileError> {
        let f = File::open(path)?;
        Ok(DataFileReader {
            rdr: BufReader::new(f),
        })
    }
}

impl<R: Read> DataFileReader<R> {
    /// Constructs a reader from any `Read` implementor.
    pub fn from_reader(reader: R) -> Self {
        DataFileReader {
            rdr: BufReader::new(reader),
        }
    }

    /// Replays every complete record, calling `apply` with its position.
    ///
    /// Returns the offset just past the last complete record. When the file
    /// ends in a torn frame (crash mid-append) that offset is smaller than
    /// the file length and the caller is expected to truncate to it.
    ///
    /// - **Clean EOF** or **truncated tail** -> `Ok(valid_len)`.
    /// - **CRC mismatch**, **unknown op**, **bad length** -> `Err(Corrupt)`.
    /// - **I/O error** -> `Err(Io)`.
    pub fn replay<F>(&mut self, mut apply: F) -> Result<u64, DataFileError>
    where
        F: FnMut(RecordPos, Record),
    {
        let mut body = Vec::with_capacity(256);
        let mut offset = 0u64;

        loop {
            let record_len = match self.rdr.read_u32::<LittleEndian>() {
                Ok(v) => v,
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(offset),
                Err(e) => return Err(DataFileError::Io(e)),
            };

            if record_len <= 4 || record_len > MAX_RECORD_SIZE {
                return Err(DataFileError::Corrupt);
            }

            let crc = match self.rdr.read_u32::<LittleEndian>() {
                Ok(v) => v,
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(offset),
                Err(e) => return Err(DataFileError::Io(e)),
            };

            body.clear();
            body.resize((record_len - 4) as usize, 0);
            match self.rdr.read_exact(&mut body) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(offset),
                Err(e) => return Err(DataFileError::Io(e)),
            }

            let record = decode_body(&body, crc)?;
            let pos = RecordPos {
                offset,
                len: HEADER_LEN + u64::from(record_len) - 4,
            };
            offset = pos.end();
            apply(pos, record);
        }
    }
}

/// Reads and validates the single frame at `pos`.
///
/// Accepts anything that can seek and read, which includes `&File`, so a
/// shared file handle can serve point lookups without `&mut`.
pub fn read_at<S: Read + Seek>(mut source: S, pos: RecordPos) -> Result<Record, DataFileError> {
    if pos.len <= HEADER_LEN || pos.len > HEADER_LEN + u64::from(MAX_RECORD_SIZE) {
        return Err(DataFileError::Corrupt);
    }
    source.seek(SeekFrom::Start(pos.offset))?;

    let mut frame = vec![0u8; pos.len as usize];
    source.read_exact(&mut frame)?;

    let mut hdr = &frame[..HEADER_LEN as usize];
    let record_len = hdr.read_u32::<LittleEndian>()?;
    let crc = hdr.read_u32::<LittleEndian>()?;
    if u64::from(record_len) + 4 != pos.len {
        return Err(DataFileError::Corrupt);
    }

    decode_body(&frame[HEADER_LEN as usize..], crc)
}

fn decode_body(body: &[u8], crc: u32) -> Result<Record, DataFileError> {
    let mut hasher = Crc32::new();
    hasher.update(body);
    if hasher.finalize() != crc {
        return Err(DataFileError::Corrupt);
    }

    let mut br = body;
    let op = br.read_u8()?;
    let key = read_chunk(&mut br)?;

    let record = match op {
        OP_PUT => {
            let value = read_chunk(&mut br)?;
            Record::Put { key, value }
        }
        OP_DEL => Record::Del { key },
        _ => return Err(DataFileError::Corrupt),
    };

    // Trailing garbage inside a checksummed body means a writer bug.
    if !br.is_empty() {
        return Err(DataFileError::Corrupt);
    }
    Ok(record)
}

fn read_chunk(br: &mut &[u8]) -> Result<Vec<u8>, DataFileError> {
    let len = br.read_u32::<LittleEndian>()? as usize;
    if len > br.len() {
        return Err(DataFileError::Corrupt);
    }
    let (chunk, rest) = br.split_at(len);
    *br = rest;
    Ok(chunk.to_vec())
}
